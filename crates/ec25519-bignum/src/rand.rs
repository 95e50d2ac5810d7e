//! Random big number generation using OS randomness.

use crate::bignum::BigNum;
use ec25519_types::CryptoError;
use zeroize::Zeroize;

impl BigNum {
    /// Generate a random BigNum uniformly in [1, upper).
    ///
    /// Uses rejection sampling over `bit_len(upper)` random bits.
    pub fn random_range(upper: &BigNum) -> Result<BigNum, CryptoError> {
        if upper.is_negative() || upper.is_zero() || upper.is_one() {
            return Err(CryptoError::InvalidArg);
        }

        let bits = upper.bit_len();
        let num_bytes = bits.div_ceil(8);
        let mut buf = vec![0u8; num_bytes];

        loop {
            getrandom::getrandom(&mut buf).map_err(|_| CryptoError::RandGenFail)?;
            let excess = num_bytes * 8 - bits;
            if excess > 0 {
                buf[num_bytes - 1] &= 0xFF >> excess;
            }

            let candidate = BigNum::from_bytes_le(&buf);
            if !candidate.is_zero() && candidate < *upper {
                buf.zeroize();
                return Ok(candidate);
            }
        }
    }
}
