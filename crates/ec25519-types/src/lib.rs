#![forbid(unsafe_code)]
#![doc = "Common error types for the ec25519 crates."]

pub mod error;

pub use error::*;
