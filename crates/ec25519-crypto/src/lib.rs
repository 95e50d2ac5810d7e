#![doc = "Edwards25519 group arithmetic, Ristretto255, Ed25519 and X25519."]
#![forbid(unsafe_code)]

// Core traits
pub mod provider;

// SHA-512 collaborator
pub mod hash;

// Curve arithmetic
#[cfg(any(feature = "ed25519", feature = "x25519", feature = "ristretto255"))]
pub mod curve25519;

// Protocols
#[cfg(feature = "ed25519")]
pub mod ed25519;
#[cfg(feature = "ristretto255")]
pub mod ristretto255;
#[cfg(feature = "x25519")]
pub mod x25519;
