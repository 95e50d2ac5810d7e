//! Modular inverse via the extended Euclidean algorithm.

use crate::bignum::BigNum;
use ec25519_types::CryptoError;

impl BigNum {
    /// Compute the modular inverse: self^(-1) mod modulus.
    ///
    /// Fails with `InvalidArg` if the modulus is not greater than one and with
    /// `BnNoInverse` if self is zero modulo the modulus or shares a factor
    /// with it. Running time depends on the operands; use only on public data.
    pub fn mod_inv(&self, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        if modulus.is_negative() || modulus.is_zero() || modulus.is_one() {
            return Err(CryptoError::InvalidArg);
        }

        let mut old_r = self.mod_reduce(modulus)?;
        if old_r.is_zero() {
            return Err(CryptoError::BnNoInverse);
        }
        let mut r = modulus.clone();
        let mut old_s = BigNum::one();
        let mut s = BigNum::zero();

        // Invariant: old_r ≡ old_s * self (mod modulus)
        while !r.is_zero() {
            let (quotient, remainder) = old_r.div_rem(&r)?;
            old_r = r;
            r = remainder;

            let new_s = old_s.sub(&quotient.mul(&s));
            old_s = s;
            s = new_s;
        }

        if !old_r.is_one() {
            return Err(CryptoError::BnNoInverse);
        }
        old_s.mod_reduce(modulus)
    }
}
