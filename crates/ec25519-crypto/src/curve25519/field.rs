//! Field arithmetic over GF(2^255 - 19) using the Fp51 representation.
//!
//! Each field element is stored as 5 limbs of at most 51 bits each (a few
//! bits of headroom are tolerated between carries). Intermediate products
//! use u128 to avoid overflow.

use ec25519_types::CryptoError;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// A field element in GF(p) where p = 2^255 - 19.
///
/// Stored in radix-2^51 representation: value = l[0] + l[1]*2^51 + ... + l[4]*2^204.
#[derive(Clone, Copy, Debug)]
pub struct Fe25519(pub(crate) [u64; 5]);

const MASK51: u64 = (1u64 << 51) - 1;

/// sqrt(-1) mod p = 2^((p-1)/4) mod p.
pub(crate) const SQRT_M1: Fe25519 = Fe25519([
    0x00061B274A0EA0B0,
    0x0000D5A5FC8F189D,
    0x0007EF5E9CBD0C60,
    0x00078595A6804C9E,
    0x0002B8324804FC1D,
]);

impl Fe25519 {
    /// The zero element.
    pub const ZERO: Fe25519 = Fe25519([0; 5]);

    /// The one element.
    pub const ONE: Fe25519 = Fe25519([1, 0, 0, 0, 0]);

    /// Create a field element from a small integer.
    pub const fn from_u64(v: u64) -> Fe25519 {
        Fe25519([v & MASK51, v >> 51, 0, 0, 0])
    }

    /// Addition: h = f + g.
    pub fn add(&self, rhs: &Fe25519) -> Fe25519 {
        Fe25519([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
            self.0[3] + rhs.0[3],
            self.0[4] + rhs.0[4],
        ])
        .carry()
    }

    /// Subtraction: h = f - g.
    pub fn sub(&self, rhs: &Fe25519) -> Fe25519 {
        // 2p in Fp51, so every limb stays non-negative: rhs limbs are
        // always carried below 2^52 - 38.
        const TWO_P: [u64; 5] = [
            0xFFFFFFFFFFFDA, // 2*(2^51 - 19)
            0xFFFFFFFFFFFFE, // 2*(2^51 - 1)
            0xFFFFFFFFFFFFE,
            0xFFFFFFFFFFFFE,
            0xFFFFFFFFFFFFE,
        ];
        Fe25519([
            (self.0[0] + TWO_P[0]) - rhs.0[0],
            (self.0[1] + TWO_P[1]) - rhs.0[1],
            (self.0[2] + TWO_P[2]) - rhs.0[2],
            (self.0[3] + TWO_P[3]) - rhs.0[3],
            (self.0[4] + TWO_P[4]) - rhs.0[4],
        ])
        .carry()
    }

    /// Negation: h = -f (mod p).
    pub fn neg(&self) -> Fe25519 {
        Fe25519::ZERO.sub(self)
    }

    /// Multiplication: h = f * g.
    pub fn mul(&self, rhs: &Fe25519) -> Fe25519 {
        let f = &self.0;
        let g = &rhs.0;

        // Limbs above 2^255 fold back multiplied by 19.
        let g1_19 = 19u128 * g[1] as u128;
        let g2_19 = 19u128 * g[2] as u128;
        let g3_19 = 19u128 * g[3] as u128;
        let g4_19 = 19u128 * g[4] as u128;

        let h0 = f[0] as u128 * g[0] as u128
            + g1_19 * f[4] as u128
            + g2_19 * f[3] as u128
            + g3_19 * f[2] as u128
            + g4_19 * f[1] as u128;

        let h1 = f[0] as u128 * g[1] as u128
            + f[1] as u128 * g[0] as u128
            + g2_19 * f[4] as u128
            + g3_19 * f[3] as u128
            + g4_19 * f[2] as u128;

        let h2 = f[0] as u128 * g[2] as u128
            + f[1] as u128 * g[1] as u128
            + f[2] as u128 * g[0] as u128
            + g3_19 * f[4] as u128
            + g4_19 * f[3] as u128;

        let h3 = f[0] as u128 * g[3] as u128
            + f[1] as u128 * g[2] as u128
            + f[2] as u128 * g[1] as u128
            + f[3] as u128 * g[0] as u128
            + g4_19 * f[4] as u128;

        let h4 = f[0] as u128 * g[4] as u128
            + f[1] as u128 * g[3] as u128
            + f[2] as u128 * g[2] as u128
            + f[3] as u128 * g[1] as u128
            + f[4] as u128 * g[0] as u128;

        Self::carry128([h0, h1, h2, h3, h4])
    }

    /// Squaring: h = f^2 (symmetric terms doubled).
    pub fn square(&self) -> Fe25519 {
        let f = &self.0;

        let f0_2 = 2 * f[0] as u128;
        let f1_2 = 2 * f[1] as u128;
        let f3_2 = 2 * f[3] as u128;

        let f1_38 = 38u128 * f[1] as u128;
        let f2_19 = 19u128 * f[2] as u128;
        let f3_38 = 38u128 * f[3] as u128;
        let f4_19 = 19u128 * f[4] as u128;

        let h0 = f[0] as u128 * f[0] as u128 + f1_38 * f[4] as u128 + f2_19 * f3_2;
        let h1 =
            f0_2 * f[1] as u128 + f2_19 * f[4] as u128 * 2 + 19u128 * f[3] as u128 * f[3] as u128;
        let h2 = f0_2 * f[2] as u128 + f[1] as u128 * f[1] as u128 + f3_38 * f[4] as u128;
        let h3 = f0_2 * f[3] as u128 + f1_2 * f[2] as u128 + f4_19 * f[4] as u128;
        let h4 = f0_2 * f[4] as u128 + f1_2 * f[3] as u128 + f[2] as u128 * f[2] as u128;

        Self::carry128([h0, h1, h2, h3, h4])
    }

    /// Square `k` times in a row: h = f^(2^k).
    pub fn pow2k(&self, k: u32) -> Fe25519 {
        let mut t = *self;
        for _ in 0..k {
            t = t.square();
        }
        t
    }

    /// Multiply by a small constant such as the Montgomery a24 = 121665.
    pub fn mul_small(&self, c: u32) -> Fe25519 {
        let c = c as u128;
        Self::carry128([
            self.0[0] as u128 * c,
            self.0[1] as u128 * c,
            self.0[2] as u128 * c,
            self.0[3] as u128 * c,
            self.0[4] as u128 * c,
        ])
    }

    /// Carry propagation for u128 intermediate limbs.
    fn carry128(h: [u128; 5]) -> Fe25519 {
        let mut r = [0u64; 5];

        let mut c = h[0] >> 51;
        r[0] = (h[0] as u64) & MASK51;
        let h1 = h[1] + c;

        c = h1 >> 51;
        r[1] = (h1 as u64) & MASK51;
        let h2 = h[2] + c;

        c = h2 >> 51;
        r[2] = (h2 as u64) & MASK51;
        let h3 = h[3] + c;

        c = h3 >> 51;
        r[3] = (h3 as u64) & MASK51;
        let h4 = h[4] + c;

        c = h4 >> 51;
        r[4] = (h4 as u64) & MASK51;

        // Top carry folds back as *19
        r[0] += (c as u64) * 19;

        let c = r[0] >> 51;
        r[0] &= MASK51;
        r[1] += c;

        Fe25519(r)
    }

    /// Carry propagation for u64 limbs (used after add/sub).
    fn carry(&self) -> Fe25519 {
        let mut r = self.0;

        for i in 0..4 {
            let c = r[i] >> 51;
            r[i] &= MASK51;
            r[i + 1] += c;
        }

        let c = r[4] >> 51;
        r[4] &= MASK51;
        r[0] += c * 19;

        let c = r[0] >> 51;
        r[0] &= MASK51;
        r[1] += c;

        Fe25519(r)
    }

    /// Full reduction modulo p = 2^255 - 19.
    /// Ensures the result is in [0, p).
    pub fn reduce(&self) -> Fe25519 {
        let mut r = self.carry().0;

        // q = 1 iff r >= p, found by propagating the carry of r + 19 out of bit 255.
        let mut q = (r[0] + 19) >> 51;
        q = (r[1] + q) >> 51;
        q = (r[2] + q) >> 51;
        q = (r[3] + q) >> 51;
        q = (r[4] + q) >> 51;

        r[0] += 19 * q;
        for i in 0..4 {
            let c = r[i] >> 51;
            r[i] &= MASK51;
            r[i + 1] += c;
        }
        r[4] &= MASK51;

        Fe25519(r)
    }

    /// Shared prefix of the inversion and square-root chains.
    ///
    /// Returns (f^(2^250 - 1), f^11).
    fn pow_2_250_1(&self) -> (Fe25519, Fe25519) {
        let f = *self;

        let z2 = f.square();
        let z9 = f.mul(&z2.pow2k(2));
        let z11 = z2.mul(&z9);
        let z_5_0 = z9.mul(&z11.square()); // 2^5 - 1
        let z_10_0 = z_5_0.pow2k(5).mul(&z_5_0); // 2^10 - 1
        let z_20_0 = z_10_0.pow2k(10).mul(&z_10_0); // 2^20 - 1
        let z_40_0 = z_20_0.pow2k(20).mul(&z_20_0); // 2^40 - 1
        let z_50_0 = z_40_0.pow2k(10).mul(&z_10_0); // 2^50 - 1
        let z_100_0 = z_50_0.pow2k(50).mul(&z_50_0); // 2^100 - 1
        let z_200_0 = z_100_0.pow2k(100).mul(&z_100_0); // 2^200 - 1
        let z_250_0 = z_200_0.pow2k(50).mul(&z_50_0); // 2^250 - 1

        (z_250_0, z11)
    }

    /// f^(p-2) via the fixed addition chain; maps zero to zero.
    pub(crate) fn invert_unchecked(&self) -> Fe25519 {
        let (z_250_0, z11) = self.pow_2_250_1();
        z_250_0.pow2k(5).mul(&z11) // 2^255 - 32 + 11 = p - 2
    }

    /// Modular inversion: the unique h with f·h ≡ 1 (mod p).
    ///
    /// Uses Fermat's little theorem with a fixed addition chain, so the
    /// running time does not depend on the value. Fails on zero.
    pub fn invert(&self) -> Result<Fe25519, CryptoError> {
        if self.is_zero() {
            return Err(CryptoError::FieldInvertZero);
        }
        Ok(self.invert_unchecked())
    }

    /// Compute f^((p-5)/8) = f^(2^252 - 3), used for square roots.
    pub fn pow_2252_3(&self) -> Fe25519 {
        let (z_250_0, _) = self.pow_2_250_1();
        z_250_0.pow2k(2).mul(self) // 2^252 - 3
    }

    /// Square root of a ratio.
    ///
    /// Returns `(is_square, x)`: when u/v is a square, x is its non-negative
    /// root. Otherwise x is the non-negative root of sqrt(-1)·u/v and the
    /// choice is false. The result is always non-negative per `is_negative`.
    pub fn sqrt_ratio(u: &Fe25519, v: &Fe25519) -> (Choice, Fe25519) {
        let v3 = v.square().mul(v);
        let v7 = v3.square().mul(v);
        let x = u.mul(&v3).mul(&u.mul(&v7).pow_2252_3());
        let vx2 = v.mul(&x.square());

        let u_neg = u.neg();
        let correct_sign = vx2.ct_eq(u);
        let flipped_sign = vx2.ct_eq(&u_neg);
        let flipped_sign_i = vx2.ct_eq(&u_neg.mul(&SQRT_M1));

        let x_prime = x.mul(&SQRT_M1);
        let mut r = x;
        r.conditional_assign(&x_prime, flipped_sign | flipped_sign_i);
        let r_neg = r.neg();
        let r_is_negative = r.is_negative();
        r.conditional_assign(&r_neg, r_is_negative);

        (correct_sign | flipped_sign, r)
    }

    /// 1/sqrt(v), with the same conventions as `sqrt_ratio`.
    pub fn invert_sqrt(v: &Fe25519) -> (Choice, Fe25519) {
        Fe25519::sqrt_ratio(&Fe25519::ONE, v)
    }

    /// Decode a 32-byte little-endian representation into a field element.
    ///
    /// Bit 255 is ignored; values in [p, 2^255) are accepted unreduced.
    pub fn from_bytes(bytes: &[u8; 32]) -> Fe25519 {
        let load8 = |b: &[u8]| -> u64 {
            let mut r = 0u64;
            for (i, &byte) in b.iter().enumerate().take(8) {
                r |= (byte as u64) << (8 * i);
            }
            r
        };

        Fe25519([
            load8(&bytes[0..]) & MASK51,
            (load8(&bytes[6..]) >> 3) & MASK51,
            (load8(&bytes[12..]) >> 6) & MASK51,
            (load8(&bytes[19..]) >> 1) & MASK51,
            (load8(&bytes[24..]) >> 12) & MASK51,
        ])
    }

    /// Decode 32 bytes, rejecting bit 255 and values in [p, 2^255).
    pub fn from_canonical_bytes(bytes: &[u8; 32]) -> Result<Fe25519, CryptoError> {
        let fe = Fe25519::from_bytes(bytes);
        if !bool::from(fe.to_bytes().ct_eq(bytes)) {
            return Err(CryptoError::NonCanonicalEncoding);
        }
        Ok(fe)
    }

    /// Encode a field element to its canonical 32-byte little-endian representation.
    pub fn to_bytes(self) -> [u8; 32] {
        let h = self.reduce().0;

        // 4 × 64 = 256 bits, little-endian
        let bits = [
            h[0] | (h[1] << 51),
            (h[1] >> 13) | (h[2] << 38),
            (h[2] >> 26) | (h[3] << 25),
            (h[3] >> 39) | (h[4] << 12),
        ];

        let mut out = [0u8; 32];
        for (chunk, word) in out.chunks_exact_mut(8).zip(bits.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }

    /// Constant-time conditional swap: swap self and other if `swap` is set.
    pub fn conditional_swap(&mut self, other: &mut Fe25519, swap: Choice) {
        Fe25519::conditional_swap_limbs(&mut self.0, &mut other.0, swap);
    }

    fn conditional_swap_limbs(a: &mut [u64; 5], b: &mut [u64; 5], swap: Choice) {
        let mask = (swap.unwrap_u8() as u64).wrapping_neg();
        for i in 0..5 {
            let t = mask & (a[i] ^ b[i]);
            a[i] ^= t;
            b[i] ^= t;
        }
    }

    /// Replace self with -self when `choice` is set.
    pub fn conditional_negate(&mut self, choice: Choice) {
        let neg = self.neg();
        self.conditional_assign(&neg, choice);
    }

    /// Returns true if the field element is negative, i.e. the least
    /// significant bit of the canonical encoding is 1.
    pub fn is_negative(&self) -> Choice {
        Choice::from(self.to_bytes()[0] & 1)
    }

    /// Check if the element is zero modulo p.
    pub fn is_zero(&self) -> bool {
        self.ct_eq(&Fe25519::ZERO).into()
    }
}

/// Invert many elements with a single field inversion.
///
/// Zero entries are passed through unchanged; the output has the same
/// length and order as the input.
pub fn invert_batch(nums: &[Fe25519]) -> Vec<Fe25519> {
    let mut scratch = vec![Fe25519::ZERO; nums.len()];

    let mut acc = Fe25519::ONE;
    for (num, slot) in nums.iter().zip(scratch.iter_mut()) {
        if num.is_zero() {
            continue;
        }
        *slot = acc;
        acc = acc.mul(num);
    }

    // acc is a product of non-zero elements, so it is invertible.
    let mut acc = acc.invert_unchecked();
    for (num, slot) in nums.iter().zip(scratch.iter_mut()).rev() {
        if num.is_zero() {
            continue;
        }
        *slot = acc.mul(slot);
        acc = acc.mul(num);
    }

    scratch
}

impl ConstantTimeEq for Fe25519 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.to_bytes().ct_eq(&other.to_bytes())
    }
}

impl ConditionallySelectable for Fe25519 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mut out = *a;
        let mut other = *b;
        Fe25519::conditional_swap_limbs(&mut out.0, &mut other.0, choice);
        out
    }
}

impl PartialEq for Fe25519 {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Fe25519 {}
