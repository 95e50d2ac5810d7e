//! Big number type and conversions.

use ec25519_types::CryptoError;
use zeroize::Zeroize;

/// Limb type for big number representation.
pub type Limb = u64;
/// Double-width type for multiplication intermediates.
pub(crate) type DoubleLimb = u128;

/// Bits per limb.
pub(crate) const LIMB_BITS: usize = 64;

/// A heap-allocated signed big number that is zeroized on drop.
///
/// Internally represented as a little-endian array of `u64` limbs with a
/// separate sign flag. Zero is never negative.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct BigNum {
    /// Little-endian limbs (limbs[0] is the least significant).
    limbs: Vec<Limb>,
    negative: bool,
}

impl BigNum {
    /// Create a zero-valued BigNum.
    pub fn zero() -> Self {
        Self {
            limbs: vec![0],
            negative: false,
        }
    }

    /// Create the value one.
    pub fn one() -> Self {
        Self::from_u64(1)
    }

    /// Create a BigNum from a `u64` value.
    pub fn from_u64(value: u64) -> Self {
        Self {
            limbs: vec![value],
            negative: false,
        }
    }

    /// Create a non-negative BigNum from a vector of little-endian limbs.
    pub fn from_limbs(limbs: Vec<Limb>) -> Self {
        let mut bn = Self {
            limbs: if limbs.is_empty() { vec![0] } else { limbs },
            negative: false,
        };
        bn.normalize();
        bn
    }

    /// Create a BigNum from little-endian bytes of any length.
    pub fn from_bytes_le(bytes: &[u8]) -> Self {
        let mut limbs = vec![0u64; bytes.len().div_ceil(8).max(1)];
        for (i, &byte) in bytes.iter().enumerate() {
            limbs[i / 8] |= (byte as u64) << ((i % 8) * 8);
        }
        Self::from_limbs(limbs)
    }

    /// Create a BigNum from big-endian bytes of any length.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        let mut le = bytes.to_vec();
        le.reverse();
        let bn = Self::from_bytes_le(&le);
        le.zeroize();
        bn
    }

    /// Export the magnitude as exactly `len` little-endian bytes.
    ///
    /// Fails with `InvalidArg` if the value does not fit.
    pub fn to_bytes_le(&self, len: usize) -> Result<Vec<u8>, CryptoError> {
        if self.bit_len() > len * 8 {
            return Err(CryptoError::InvalidArg);
        }
        let mut out = vec![0u8; len];
        for (i, byte) in out.iter_mut().enumerate() {
            let limb_idx = i / 8;
            if limb_idx < self.limbs.len() {
                *byte = (self.limbs[limb_idx] >> ((i % 8) * 8)) as u8;
            }
        }
        Ok(out)
    }

    /// Export the magnitude as exactly `len` big-endian bytes.
    pub fn to_bytes_be(&self, len: usize) -> Result<Vec<u8>, CryptoError> {
        let mut out = self.to_bytes_le(len)?;
        out.reverse();
        Ok(out)
    }

    /// Return the number of significant bits of the magnitude.
    pub fn bit_len(&self) -> usize {
        for i in (0..self.limbs.len()).rev() {
            if self.limbs[i] != 0 {
                return i * LIMB_BITS + (LIMB_BITS - self.limbs[i].leading_zeros() as usize);
            }
        }
        0
    }

    /// Return true if this number is zero.
    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    /// Return true if this number equals 1.
    pub fn is_one(&self) -> bool {
        !self.negative && self.limbs.len() == 1 && self.limbs[0] == 1
    }

    /// Return true if this number is negative.
    pub fn is_negative(&self) -> bool {
        self.negative && !self.is_zero()
    }

    /// Return the limbs as a slice.
    pub fn limbs(&self) -> &[Limb] {
        &self.limbs
    }

    pub(crate) fn set_negative(&mut self, neg: bool) {
        self.negative = neg;
    }

    /// Remove leading zero limbs.
    pub(crate) fn normalize(&mut self) {
        while self.limbs.len() > 1 && self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
        if self.is_zero() {
            self.negative = false;
        }
    }
}

impl std::fmt::Debug for BigNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let hex = self
            .limbs
            .iter()
            .rev()
            .map(|l| format!("{l:016x}"))
            .collect::<String>();
        write!(f, "BigNum({sign}0x{hex})")
    }
}

impl PartialEq for BigNum {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for BigNum {}

impl PartialOrd for BigNum {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigNum {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self.is_negative(), other.is_negative()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.cmp_abs(other),
            (true, true) => other.cmp_abs(self),
        }
    }
}
