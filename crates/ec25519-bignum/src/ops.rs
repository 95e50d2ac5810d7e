//! Basic arithmetic operations for BigNum.

use std::cmp::Ordering;

use crate::bignum::{BigNum, DoubleLimb, Limb, LIMB_BITS};
use ec25519_types::CryptoError;

impl BigNum {
    /// Add two BigNums: self + other.
    pub fn add(&self, other: &BigNum) -> BigNum {
        if self.is_negative() == other.is_negative() {
            let mut result = add_unsigned(self.limbs(), other.limbs());
            result.set_negative(self.is_negative());
            result.normalize();
            result
        } else if self.is_negative() {
            // (-a) + b = b - a
            sub_signed(other.limbs(), self.limbs())
        } else {
            // a + (-b) = a - b
            sub_signed(self.limbs(), other.limbs())
        }
    }

    /// Subtract: self - other.
    pub fn sub(&self, other: &BigNum) -> BigNum {
        if self.is_negative() != other.is_negative() {
            let mut result = add_unsigned(self.limbs(), other.limbs());
            result.set_negative(self.is_negative());
            result.normalize();
            result
        } else if self.is_negative() {
            // (-a) - (-b) = b - a
            sub_signed(other.limbs(), self.limbs())
        } else {
            sub_signed(self.limbs(), other.limbs())
        }
    }

    /// Multiply: self * other.
    pub fn mul(&self, other: &BigNum) -> BigNum {
        let mut result = mul_unsigned(self.limbs(), other.limbs());
        result.set_negative(self.is_negative() != other.is_negative());
        result.normalize();
        result
    }

    /// Truncating division of magnitudes: returns (|self| / |d|, |self| mod |d|).
    pub fn div_rem(&self, divisor: &BigNum) -> Result<(BigNum, BigNum), CryptoError> {
        if divisor.is_zero() {
            return Err(CryptoError::BnDivisionByZero);
        }
        Ok(div_rem_unsigned(self.limbs(), divisor.limbs()))
    }

    /// Modular reduction into `[0, modulus)`, also for negative inputs.
    pub fn mod_reduce(&self, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        if modulus.is_zero() || modulus.is_negative() {
            return Err(CryptoError::BnDivisionByZero);
        }
        let (_, r) = self.div_rem(modulus)?;
        if self.is_negative() && !r.is_zero() {
            Ok(modulus.sub(&r))
        } else {
            Ok(r)
        }
    }

    /// (self + other) mod modulus.
    pub fn mod_add(&self, other: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        self.add(other).mod_reduce(modulus)
    }

    /// (self - other) mod modulus.
    pub fn mod_sub(&self, other: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        self.sub(other).mod_reduce(modulus)
    }

    /// (self * other) mod modulus.
    pub fn mod_mul(&self, other: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        self.mul(other).mod_reduce(modulus)
    }

    /// Compare absolute values.
    pub fn cmp_abs(&self, other: &BigNum) -> Ordering {
        cmp_limbs(self.limbs(), other.limbs())
    }
}

fn limb_at(a: &[Limb], i: usize) -> Limb {
    a.get(i).copied().unwrap_or(0)
}

fn cmp_limbs(a: &[Limb], b: &[Limb]) -> Ordering {
    for i in (0..a.len().max(b.len())).rev() {
        match limb_at(a, i).cmp(&limb_at(b, i)) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Add two unsigned limb arrays.
fn add_unsigned(a: &[Limb], b: &[Limb]) -> BigNum {
    let max_len = a.len().max(b.len());
    let mut limbs = vec![0u64; max_len + 1];
    let mut carry: Limb = 0;

    for (i, limb) in limbs.iter_mut().take(max_len).enumerate() {
        let sum = limb_at(a, i) as DoubleLimb + limb_at(b, i) as DoubleLimb + carry as DoubleLimb;
        *limb = sum as Limb;
        carry = (sum >> LIMB_BITS) as Limb;
    }
    limbs[max_len] = carry;

    BigNum::from_limbs(limbs)
}

/// Subtract magnitudes, returning a signed result: a - b.
fn sub_signed(a: &[Limb], b: &[Limb]) -> BigNum {
    let (larger, smaller, negative) = match cmp_limbs(a, b) {
        Ordering::Less => (b, a, true),
        Ordering::Equal => return BigNum::zero(),
        Ordering::Greater => (a, b, false),
    };

    let mut limbs = vec![0u64; larger.len()];
    let mut borrow: Limb = 0;
    for (i, limb) in limbs.iter_mut().enumerate() {
        let (d1, b1) = larger[i].overflowing_sub(limb_at(smaller, i));
        let (d2, b2) = d1.overflowing_sub(borrow);
        *limb = d2;
        borrow = (b1 as Limb) + (b2 as Limb);
    }

    let mut bn = BigNum::from_limbs(limbs);
    bn.set_negative(negative);
    bn.normalize();
    bn
}

/// Schoolbook multiplication of two unsigned limb arrays.
fn mul_unsigned(a: &[Limb], b: &[Limb]) -> BigNum {
    let mut limbs = vec![0u64; a.len() + b.len()];

    for (i, &ai) in a.iter().enumerate() {
        let mut carry: Limb = 0;
        for (j, &bj) in b.iter().enumerate() {
            let prod = ai as DoubleLimb * bj as DoubleLimb
                + limbs[i + j] as DoubleLimb
                + carry as DoubleLimb;
            limbs[i + j] = prod as Limb;
            carry = (prod >> LIMB_BITS) as Limb;
        }
        limbs[i + b.len()] = carry;
    }

    BigNum::from_limbs(limbs)
}

/// Binary long division for unsigned values.
fn div_rem_unsigned(a: &[Limb], b: &[Limb]) -> (BigNum, BigNum) {
    if cmp_limbs(a, b) == Ordering::Less {
        return (BigNum::zero(), BigNum::from_limbs(a.to_vec()));
    }

    let bits = BigNum::from_limbs(a.to_vec()).bit_len();
    let mut quotient = vec![0u64; bits.div_ceil(LIMB_BITS)];
    // One spare limb so the shifted remainder never overflows.
    let mut remainder = vec![0u64; b.len() + 1];

    for i in (0..bits).rev() {
        let mut carry = (a[i / LIMB_BITS] >> (i % LIMB_BITS)) & 1;
        for limb in remainder.iter_mut() {
            let next = *limb >> (LIMB_BITS - 1);
            *limb = (*limb << 1) | carry;
            carry = next;
        }

        if cmp_limbs(&remainder, b) != Ordering::Less {
            let mut borrow: Limb = 0;
            for (j, limb) in remainder.iter_mut().enumerate() {
                let (d1, b1) = limb.overflowing_sub(limb_at(b, j));
                let (d2, b2) = d1.overflowing_sub(borrow);
                *limb = d2;
                borrow = (b1 as Limb) + (b2 as Limb);
            }
            quotient[i / LIMB_BITS] |= 1u64 << (i % LIMB_BITS);
        }
    }

    (BigNum::from_limbs(quotient), BigNum::from_limbs(remainder))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neg(v: u64) -> BigNum {
        let mut n = BigNum::from_u64(v);
        n.set_negative(true);
        n
    }

    #[test]
    fn test_add_sub() {
        let a = BigNum::from_u64(300);
        let b = BigNum::from_u64(100);
        assert_eq!(a.add(&b), BigNum::from_u64(400));
        assert_eq!(a.sub(&b), BigNum::from_u64(200));
        assert_eq!(b.sub(&a), neg(200));
        assert_eq!(neg(50).add(&b), BigNum::from_u64(50));
    }

    #[test]
    fn test_add_carry_across_limbs() {
        let a = BigNum::from_u64(u64::MAX);
        let c = a.add(&BigNum::one());
        assert_eq!(c.limbs(), &[0, 1]);
        assert_eq!(c.sub(&BigNum::one()), a);
    }

    #[test]
    fn test_mul() {
        let a = BigNum::from_u64(u64::MAX);
        let sq = a.mul(&a);
        // (2^64 - 1)^2 = 2^128 - 2^65 + 1
        assert_eq!(sq.limbs(), &[1, u64::MAX - 1]);
        assert_eq!(neg(3).mul(&BigNum::from_u64(4)), neg(12));
    }

    #[test]
    fn test_div_rem() {
        let a = BigNum::from_u64(100);
        let b = BigNum::from_u64(7);
        let (q, r) = a.div_rem(&b).unwrap();
        assert_eq!(q, BigNum::from_u64(14));
        assert_eq!(r, BigNum::from_u64(2));
    }

    #[test]
    fn test_div_rem_wide() {
        // (2^128 + 5) = (2^64 + 1)(2^64 - 1) + 6
        let a = BigNum::from_limbs(vec![5, 0, 1]);
        let b = BigNum::from_limbs(vec![1, 1]);
        let (q, r) = a.div_rem(&b).unwrap();
        assert_eq!(q, BigNum::from_u64(u64::MAX));
        assert_eq!(r, BigNum::from_u64(6));
        assert_eq!(q.mul(&b).add(&r), a);
    }

    #[test]
    fn test_div_by_zero() {
        assert_eq!(
            BigNum::from_u64(100).div_rem(&BigNum::zero()).unwrap_err(),
            CryptoError::BnDivisionByZero
        );
    }

    #[test]
    fn test_mod_reduce_negative() {
        let m = BigNum::from_u64(7);
        assert_eq!(neg(1).mod_reduce(&m).unwrap(), BigNum::from_u64(6));
        assert_eq!(neg(14).mod_reduce(&m).unwrap(), BigNum::zero());
        assert!(BigNum::from_u64(1).mod_reduce(&neg(7)).is_err());
    }

    #[test]
    fn test_mod_ops() {
        let m = BigNum::from_u64(97);
        let a = BigNum::from_u64(90);
        let b = BigNum::from_u64(10);
        assert_eq!(a.mod_add(&b, &m).unwrap(), BigNum::from_u64(3));
        assert_eq!(b.mod_sub(&a, &m).unwrap(), BigNum::from_u64(17));
        assert_eq!(a.mod_mul(&b, &m).unwrap(), BigNum::from_u64(27));
    }
}
