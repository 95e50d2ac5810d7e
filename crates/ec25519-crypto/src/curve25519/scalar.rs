//! Scalars modulo the prime group order ℓ = 2^252 + 27742317777372353535851937790883648493.
//!
//! Scalars are arbitrary-precision integers (`BigNum`) kept in [0, ℓ). The
//! byte form used on the wire is 32 bytes little-endian.

use ec25519_bignum::BigNum;
use ec25519_types::CryptoError;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// ℓ in little-endian byte order.
pub const GROUP_ORDER_BYTES: [u8; 32] = [
    0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde, 0x14,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10,
];

/// The curve cofactor h.
pub const COFACTOR: u8 = 8;

/// Inputs accepted by `Scalar::hash_to_private_scalar` (FIPS 186 bounds).
const HASH_TO_SCALAR_MIN: usize = 40;
const HASH_TO_SCALAR_MAX: usize = 1024;

/// The group order ℓ as a big number.
pub fn group_order() -> BigNum {
    BigNum::from_bytes_le(&GROUP_ORDER_BYTES)
}

/// Check that `n` lies in [1, max) when `strict`, or [0, max) otherwise.
pub fn normalize_scalar(n: &BigNum, max: &BigNum, strict: bool) -> Result<BigNum, CryptoError> {
    let min_ok = if strict {
        !n.is_zero() && !n.is_negative()
    } else {
        !n.is_negative()
    };
    if min_ok && n < max {
        Ok(n.clone())
    } else {
        Err(CryptoError::ScalarOutOfRange)
    }
}

/// Clamp a 32-byte string for X25519 and Ed25519 (RFC 7748 §5, RFC 8032 §5.1.5).
///
/// Clears the low 3 bits, clears bit 255 and sets bit 254.
pub fn adjust_bytes_25519(bytes: &mut [u8; 32]) {
    bytes[0] &= 248;
    bytes[31] &= 127;
    bytes[31] |= 64;
}

/// An integer modulo ℓ.
#[derive(Clone, Zeroize)]
pub struct Scalar(BigNum);

impl Scalar {
    /// The scalar 0.
    pub fn zero() -> Scalar {
        Scalar(BigNum::zero())
    }

    /// The scalar 1.
    pub fn one() -> Scalar {
        Scalar(BigNum::one())
    }

    /// Reduce a little-endian byte string of any length modulo ℓ.
    pub fn from_bytes_mod_order(bytes: &[u8]) -> Result<Scalar, CryptoError> {
        Ok(Scalar(BigNum::from_bytes_le(bytes).mod_reduce(&group_order())?))
    }

    /// Parse 32 little-endian bytes, requiring 0 <= s < ℓ.
    pub fn from_canonical_bytes(bytes: &[u8; 32]) -> Result<Scalar, CryptoError> {
        let n = BigNum::from_bytes_le(bytes);
        Ok(Scalar(normalize_scalar(&n, &group_order(), false)?))
    }

    /// Map 40..=1024 bytes of hash output to a scalar in [1, ℓ).
    pub fn hash_to_private_scalar(hash: &[u8]) -> Result<Scalar, CryptoError> {
        if !(HASH_TO_SCALAR_MIN..=HASH_TO_SCALAR_MAX).contains(&hash.len()) {
            return Err(CryptoError::InvalidHashLength {
                min: HASH_TO_SCALAR_MIN,
                max: HASH_TO_SCALAR_MAX,
                got: hash.len(),
            });
        }
        let l_minus_one = group_order().sub(&BigNum::one());
        let n = BigNum::from_bytes_le(hash).mod_reduce(&l_minus_one)?;
        Ok(Scalar(n.add(&BigNum::one())))
    }

    /// A uniformly random non-zero scalar.
    pub fn random() -> Result<Scalar, CryptoError> {
        Ok(Scalar(BigNum::random_range(&group_order())?))
    }

    /// Canonical 32-byte little-endian encoding.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (chunk, limb) in out.chunks_exact_mut(8).zip(self.0.limbs().iter()) {
            chunk.copy_from_slice(&limb.to_le_bytes());
        }
        out
    }

    /// The underlying integer.
    pub fn as_bignum(&self) -> &BigNum {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// (self + other) mod ℓ.
    pub fn add(&self, other: &Scalar) -> Result<Scalar, CryptoError> {
        Ok(Scalar(self.0.mod_add(&other.0, &group_order())?))
    }

    /// (self - other) mod ℓ.
    pub fn sub(&self, other: &Scalar) -> Result<Scalar, CryptoError> {
        Ok(Scalar(self.0.mod_sub(&other.0, &group_order())?))
    }

    /// (self * other) mod ℓ.
    pub fn mul(&self, other: &Scalar) -> Result<Scalar, CryptoError> {
        Ok(Scalar(self.0.mod_mul(&other.0, &group_order())?))
    }

    /// -self mod ℓ.
    pub fn neg(&self) -> Result<Scalar, CryptoError> {
        Scalar::zero().sub(self)
    }

    /// Multiplicative inverse modulo ℓ (extended Euclid, public data only).
    pub fn invert(&self) -> Result<Scalar, CryptoError> {
        Ok(Scalar(self.0.mod_inv(&group_order())?))
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.to_bytes().ct_eq(&other.to_bytes())
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Scalar {}

impl std::fmt::Debug for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Scalar").field(&self.0).finish()
    }
}
