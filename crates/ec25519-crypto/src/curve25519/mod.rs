//! Curve25519 primitives shared by Ed25519, X25519 and Ristretto255.
//!
//! Provides field arithmetic over GF(2^255 - 19), scalars modulo the group
//! order ℓ, and point operations on the twisted Edwards curve
//! edwards25519 in extended and affine coordinates.

pub mod affine;
pub mod edwards;
pub mod field;
pub mod scalar;

pub use affine::{AffinePoint, TORSION_SUBGROUP};
pub use edwards::{ExtendedPoint, PrecomputeTable, BASE_WINDOW_SIZE};
pub use field::{invert_batch, Fe25519};
pub use scalar::{adjust_bytes_25519, Scalar, COFACTOR, GROUP_ORDER_BYTES};
