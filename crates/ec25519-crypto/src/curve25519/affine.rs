//! Affine Edwards points and their 32-byte encoding (RFC 8032 §5.1.2).
//!
//! An `AffinePoint` optionally owns a precomputation table used to speed up
//! repeated constant-time multiplication by that point.

use std::sync::Arc;

use ec25519_types::CryptoError;
use subtle::{Choice, ConstantTimeEq};

use super::edwards::{
    base_table, check_window_size, ExtendedPoint, PrecomputeTable, BASE_WINDOW_SIZE, BASE_X, BASE_Y, D,
};
use super::field::Fe25519;
use super::scalar::Scalar;

/// Encodings of the eight points of the 8-torsion subgroup E[8].
///
/// Indices 0, 2, 4 and 6 form the 4-torsion subgroup E[4].
pub const TORSION_SUBGROUP: [[u8; 32]; 8] = [
    [
        0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ],
    [
        0xc7, 0x17, 0x6a, 0x70, 0x3d, 0x4d, 0xd8, 0x4f, 0xba, 0x3c, 0x0b, 0x76, 0x0d, 0x10, 0x67, 0x0f,
        0x2a, 0x20, 0x53, 0xfa, 0x2c, 0x39, 0xcc, 0xc6, 0x4e, 0xc7, 0xfd, 0x77, 0x92, 0xac, 0x03, 0x7a,
    ],
    [
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80,
    ],
    [
        0x26, 0xe8, 0x95, 0x8f, 0xc2, 0xb2, 0x27, 0xb0, 0x45, 0xc3, 0xf4, 0x89, 0xf2, 0xef, 0x98, 0xf0,
        0xd5, 0xdf, 0xac, 0x05, 0xd3, 0xc6, 0x33, 0x39, 0xb1, 0x38, 0x02, 0x88, 0x6d, 0x53, 0xfc, 0x05,
    ],
    [
        0xec, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f,
    ],
    [
        0x26, 0xe8, 0x95, 0x8f, 0xc2, 0xb2, 0x27, 0xb0, 0x45, 0xc3, 0xf4, 0x89, 0xf2, 0xef, 0x98, 0xf0,
        0xd5, 0xdf, 0xac, 0x05, 0xd3, 0xc6, 0x33, 0x39, 0xb1, 0x38, 0x02, 0x88, 0x6d, 0x53, 0xfc, 0x85,
    ],
    [
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ],
    [
        0xc7, 0x17, 0x6a, 0x70, 0x3d, 0x4d, 0xd8, 0x4f, 0xba, 0x3c, 0x0b, 0x76, 0x0d, 0x10, 0x67, 0x0f,
        0x2a, 0x20, 0x53, 0xfa, 0x2c, 0x39, 0xcc, 0xc6, 0x4e, 0xc7, 0xfd, 0x77, 0x92, 0xac, 0x03, 0xfa,
    ],
];

/// A point (x, y) on edwards25519 with an optional precomputation cache.
#[derive(Clone, Debug)]
pub struct AffinePoint {
    pub(crate) x: Fe25519,
    pub(crate) y: Fe25519,
    window: usize,
    table: Option<Arc<PrecomputeTable>>,
}

impl AffinePoint {
    /// The standard generator B.
    ///
    /// Its width-8 table is the shared one built on first use, so `BASE`
    /// carries no table of its own.
    pub const BASE: AffinePoint = AffinePoint {
        x: BASE_X,
        y: BASE_Y,
        window: BASE_WINDOW_SIZE,
        table: None,
    };

    /// The neutral element (0, 1).
    pub const ZERO: AffinePoint = AffinePoint {
        x: Fe25519::ZERO,
        y: Fe25519::ONE,
        window: 1,
        table: None,
    };

    pub(crate) fn from_coordinates(x: Fe25519, y: Fe25519) -> AffinePoint {
        AffinePoint {
            x,
            y,
            window: 1,
            table: None,
        }
    }

    /// Decode a point, rejecting y >= p and x = 0 with the sign bit set.
    pub fn from_bytes(bytes: &[u8]) -> Result<AffinePoint, CryptoError> {
        Self::decode(bytes, true)
    }

    /// Decode a point with ZIP-215 rules: y is read modulo p and the sign
    /// bit of a zero x is ignored.
    pub fn from_bytes_zip215(bytes: &[u8]) -> Result<AffinePoint, CryptoError> {
        Self::decode(bytes, false)
    }

    fn decode(bytes: &[u8], strict: bool) -> Result<AffinePoint, CryptoError> {
        let bytes: &[u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidLength {
            expected: 32,
            got: bytes.len(),
        })?;

        let sign = Choice::from(bytes[31] >> 7);
        let mut normed = *bytes;
        normed[31] &= 0x7f;
        let y = if strict {
            Fe25519::from_canonical_bytes(&normed)?
        } else {
            Fe25519::from_bytes(&normed)
        };

        // x² = (y² - 1) / (d·y² + 1)
        let y2 = y.square();
        let u = y2.sub(&Fe25519::ONE);
        let v = D.mul(&y2).add(&Fe25519::ONE);
        let (is_square, mut x) = Fe25519::sqrt_ratio(&u, &v);
        if !bool::from(is_square) {
            return Err(CryptoError::EccPointNotOnCurve);
        }

        if strict && x.is_zero() && bool::from(sign) {
            return Err(CryptoError::InvalidPointEncoding);
        }
        let flip = x.is_negative() ^ sign;
        x.conditional_negate(flip);

        Ok(AffinePoint::from_coordinates(x, y))
    }

    /// Encode as 32 bytes: y little-endian with the sign of x in bit 255.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = self.y.to_bytes();
        out[31] |= self.x.is_negative().unwrap_u8() << 7;
        out
    }

    /// Montgomery u-coordinate of this point: u = (1 + y) / (1 - y).
    pub fn to_x25519(&self) -> Result<[u8; 32], CryptoError> {
        let num = Fe25519::ONE.add(&self.y);
        let den = Fe25519::ONE.sub(&self.y).invert()?;
        Ok(num.mul(&den).to_bytes())
    }

    /// Compare coordinates; the precomputation cache is ignored.
    pub fn equals(&self, other: &AffinePoint) -> bool {
        (self.x.ct_eq(&other.x) & self.y.ct_eq(&other.y)).into()
    }

    pub fn negate(&self) -> AffinePoint {
        AffinePoint::from_coordinates(self.x.neg(), self.y)
    }

    pub fn add(&self, other: &AffinePoint) -> Result<AffinePoint, CryptoError> {
        ExtendedPoint::from_affine(self)
            .add(&ExtendedPoint::from_affine(other))
            .to_affine(None)
    }

    pub fn subtract(&self, other: &AffinePoint) -> Result<AffinePoint, CryptoError> {
        self.add(&other.negate())
    }

    /// Constant-time multiplication, using this point's table if it has one.
    pub fn multiply(&self, scalar: &Scalar) -> Result<AffinePoint, CryptoError> {
        ExtendedPoint::from_affine(self)
            .multiply_with_hint(scalar, Some(self))?
            .to_affine(None)
    }

    /// Change the precomputation window and rebuild the cached table.
    ///
    /// `window` must divide 256. A width of 1 drops the table.
    pub fn set_window_size(&mut self, window: usize) -> Result<(), CryptoError> {
        check_window_size(window)?;
        self.table = None;
        if window > 1 {
            let table = PrecomputeTable::new(&ExtendedPoint::from_affine(self), window)?;
            self.table = Some(Arc::new(table));
        }
        self.window = window;
        Ok(())
    }

    pub fn window_size(&self) -> usize {
        self.window
    }

    /// The precomputation table used when multiplying by this point.
    ///
    /// The generator at its default window reports the shared base table.
    /// Any other point has a table only after `set_window_size` with a
    /// width above 1.
    pub fn precomputes(&self) -> Option<&PrecomputeTable> {
        match self.table.as_deref() {
            Some(table) => Some(table),
            None if self.window == BASE_WINDOW_SIZE && self.equals(&AffinePoint::BASE) => {
                base_table().ok()
            }
            None => None,
        }
    }

    /// The Ed25519 public point for a 32-byte private key.
    #[cfg(feature = "ed25519")]
    pub fn from_private_key(key: &[u8]) -> Result<AffinePoint, CryptoError> {
        Ok(crate::ed25519::get_extended_public_key(key)?.point.clone())
    }
}

impl PartialEq for AffinePoint {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for AffinePoint {}
