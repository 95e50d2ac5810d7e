#![forbid(unsafe_code)]
#![doc = "Big number arithmetic for scalars modulo the Curve25519 group order."]

mod bignum;
mod ct;
mod gcd;
mod ops;
mod rand;

pub use bignum::{BigNum, Limb};
