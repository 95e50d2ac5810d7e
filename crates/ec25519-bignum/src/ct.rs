//! Constant-time comparison for big numbers.

use crate::bignum::BigNum;
use subtle::{Choice, ConstantTimeEq};

impl ConstantTimeEq for BigNum {
    /// Compares sign and every limb up to the longer operand; the running
    /// time depends only on the limb counts.
    fn ct_eq(&self, other: &Self) -> Choice {
        let max_len = self.limbs().len().max(other.limbs().len());
        let mut result = (self.is_negative() as u8).ct_eq(&(other.is_negative() as u8));

        for i in 0..max_len {
            let a = self.limbs().get(i).copied().unwrap_or(0);
            let b = other.limbs().get(i).copied().unwrap_or(0);
            result &= a.ct_eq(&b);
        }

        result
    }
}
