//! Ristretto255 prime-order group (RFC 9496).
//!
//! A `RistrettoPoint` wraps an edwards25519 point but encodes and compares
//! cosets of the torsion subgroup, so every group element has exactly one
//! canonical 32-byte encoding.

use ec25519_types::CryptoError;
use subtle::{ConditionallySelectable, ConstantTimeEq};

use crate::curve25519::edwards::D;
use crate::curve25519::field::SQRT_M1;
use crate::curve25519::{ExtendedPoint, Fe25519, Scalar};

/// sqrt(a·d - 1) with a = -1.
const SQRT_AD_MINUS_ONE: Fe25519 = Fe25519([
    0x0007F6A0497B2E1B,
    0x0001836F0A97AFD2,
    0x0007D747F6BE7638,
    0x000456079E7E6498,
    0x000376931BF2B834,
]);

/// 1 / sqrt(a - d).
const INVSQRT_A_MINUS_D: Fe25519 = Fe25519([
    0x0000FDAA805D40EA,
    0x0002EB482E57D339,
    0x000007610274BC58,
    0x0006510B613DC8FF,
    0x000786C8905CFAFF,
]);

/// 1 - d².
const ONE_MINUS_D_SQ: Fe25519 = Fe25519([
    0x000409C1945FC176,
    0x000719ABC6A1FC4F,
    0x0001C37F90B20684,
    0x00006BCCCA55EEDF,
    0x000029072A8B2B3E,
]);

/// (d - 1)².
const D_MINUS_ONE_SQ: Fe25519 = Fe25519([
    0x00055AAA44ED4D20,
    0x00059603C3332635,
    0x00026D3BAF4A7928,
    0x000120A66E6997A9,
    0x0005968B37AF66C2,
]);

/// Input length of `RistrettoPoint::hash_to_curve`.
pub const HASH_TO_CURVE_INPUT_SIZE: usize = 64;

/// An element of the Ristretto255 group.
#[derive(Clone, Copy, Debug)]
pub struct RistrettoPoint(ExtendedPoint);

/// |x|: the non-negative one of x and -x.
fn abs(x: &Fe25519) -> Fe25519 {
    let mut r = *x;
    r.conditional_negate(x.is_negative());
    r
}

/// Elligator map from a field element to a curve point (RFC 9496 §4.3.4).
fn calc_elligator_ristretto_map(r0: &Fe25519) -> ExtendedPoint {
    let one = Fe25519::ONE;
    let r = SQRT_M1.mul(&r0.square());
    let ns = r.add(&one).mul(&ONE_MINUS_D_SQ);
    let mut c = one.neg();
    let d_val = c.sub(&D.mul(&r)).mul(&r.add(&D));
    let (ns_d_is_sq, mut s) = Fe25519::sqrt_ratio(&ns, &d_val);

    let mut s_prime = s.mul(r0);
    let s_prime_is_pos = !s_prime.is_negative();
    s_prime.conditional_negate(s_prime_is_pos);
    s.conditional_assign(&s_prime, !ns_d_is_sq);
    c.conditional_assign(&r, !ns_d_is_sq);

    let nt = c.mul(&r.sub(&one)).mul(&D_MINUS_ONE_SQ).sub(&d_val);
    let s2 = s.square();
    let w0 = s.add(&s).mul(&d_val);
    let w1 = nt.mul(&SQRT_AD_MINUS_ONE);
    let w2 = one.sub(&s2);
    let w3 = one.add(&s2);

    ExtendedPoint {
        x: w0.mul(&w3),
        y: w2.mul(&w1),
        z: w1.mul(&w3),
        t: w0.mul(&w2),
    }
}

impl RistrettoPoint {
    /// The Ristretto255 generator (the coset of the Ed25519 base point).
    pub const BASE: RistrettoPoint = RistrettoPoint(ExtendedPoint::BASE);

    /// The group identity.
    pub const ZERO: RistrettoPoint = RistrettoPoint(ExtendedPoint::ZERO);

    /// Wrap an edwards25519 point.
    pub fn from_extended(point: ExtendedPoint) -> RistrettoPoint {
        RistrettoPoint(point)
    }

    /// A representative of this element's coset on edwards25519.
    pub fn as_extended(&self) -> &ExtendedPoint {
        &self.0
    }

    /// Map 64 uniformly random bytes to a group element.
    ///
    /// Each 32-byte half has bit 255 cleared, is mapped through Elligator,
    /// and the two points are added. The map is one-way.
    pub fn hash_to_curve(bytes: &[u8]) -> Result<RistrettoPoint, CryptoError> {
        if bytes.len() != HASH_TO_CURVE_INPUT_SIZE {
            return Err(CryptoError::InvalidLength {
                expected: HASH_TO_CURVE_INPUT_SIZE,
                got: bytes.len(),
            });
        }
        let mut half = [0u8; 32];
        half.copy_from_slice(&bytes[..32]);
        let r1 = Fe25519::from_bytes(&half);
        half.copy_from_slice(&bytes[32..]);
        let r2 = Fe25519::from_bytes(&half);

        let p1 = calc_elligator_ristretto_map(&r1);
        let p2 = calc_elligator_ristretto_map(&r2);
        Ok(RistrettoPoint(p1.add(&p2)))
    }

    /// Decode a canonical 32-byte encoding (RFC 9496 §4.3.1).
    pub fn from_bytes(bytes: &[u8]) -> Result<RistrettoPoint, CryptoError> {
        let bytes: &[u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidLength {
            expected: 32,
            got: bytes.len(),
        })?;

        let s = Fe25519::from_canonical_bytes(bytes)
            .map_err(|_| CryptoError::RistrettoInvalidEncoding)?;
        if bool::from(s.is_negative()) {
            return Err(CryptoError::RistrettoInvalidEncoding);
        }

        let one = Fe25519::ONE;
        let ss = s.square();
        let u1 = one.sub(&ss); // 1 + a·s²
        let u2 = one.add(&ss); // 1 - a·s²
        let u2_sqr = u2.square();
        let v = D.mul(&u1.square()).neg().sub(&u2_sqr);
        let (was_square, invsqrt) = Fe25519::invert_sqrt(&v.mul(&u2_sqr));
        let den_x = invsqrt.mul(&u2);
        let den_y = invsqrt.mul(&den_x).mul(&v);

        let x = abs(&s.add(&s).mul(&den_x));
        let y = u1.mul(&den_y);
        let t = x.mul(&y);

        if !bool::from(was_square) || bool::from(t.is_negative()) || y.is_zero() {
            return Err(CryptoError::RistrettoInvalidEncoding);
        }

        Ok(RistrettoPoint(ExtendedPoint {
            x,
            y,
            z: one,
            t,
        }))
    }

    /// Canonical 32-byte encoding (RFC 9496 §4.3.2).
    pub fn to_bytes(&self) -> [u8; 32] {
        let ExtendedPoint { x, y, z, t } = self.0;

        let u1 = z.add(&y).mul(&z.sub(&y));
        let u2 = x.mul(&y);
        let (_, invsqrt) = Fe25519::invert_sqrt(&u1.mul(&u2.square()));
        let den1 = invsqrt.mul(&u1);
        let den2 = invsqrt.mul(&u2);
        let z_inv = den1.mul(&den2).mul(&t);

        let ix = x.mul(&SQRT_M1);
        let iy = y.mul(&SQRT_M1);
        let enchanted_denominator = den1.mul(&INVSQRT_A_MINUS_D);
        let rotate = t.mul(&z_inv).is_negative();

        let x = Fe25519::conditional_select(&x, &iy, rotate);
        let mut y = Fe25519::conditional_select(&y, &ix, rotate);
        let den_inv = Fe25519::conditional_select(&den2, &enchanted_denominator, rotate);

        y.conditional_negate(x.mul(&z_inv).is_negative());
        abs(&den_inv.mul(&z.sub(&y))).to_bytes()
    }

    /// Coset equality: x1·y2 = y1·x2 or y1·y2 = x1·x2.
    pub fn equals(&self, other: &RistrettoPoint) -> bool {
        let a = &self.0;
        let b = &other.0;
        let one = a.x.mul(&b.y).ct_eq(&a.y.mul(&b.x));
        let two = a.y.mul(&b.y).ct_eq(&a.x.mul(&b.x));
        (one | two).into()
    }

    pub fn add(&self, other: &RistrettoPoint) -> RistrettoPoint {
        RistrettoPoint(self.0.add(&other.0))
    }

    pub fn subtract(&self, other: &RistrettoPoint) -> RistrettoPoint {
        RistrettoPoint(self.0.subtract(&other.0))
    }

    pub fn negate(&self) -> RistrettoPoint {
        RistrettoPoint(self.0.negate())
    }

    /// Constant-time multiplication by a non-zero secret scalar.
    pub fn multiply(&self, scalar: &Scalar) -> Result<RistrettoPoint, CryptoError> {
        Ok(RistrettoPoint(self.0.multiply(scalar)?))
    }

    /// Variable-time multiplication by a public 256-bit integer.
    pub fn multiply_unsafe(&self, n: &[u8; 32]) -> Result<RistrettoPoint, CryptoError> {
        Ok(RistrettoPoint(self.0.multiply_unsafe(n)?))
    }
}

impl PartialEq for RistrettoPoint {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for RistrettoPoint {}
