//! Edwards curve point operations.
//!
//! Uses extended coordinates (X, Y, Z, T) where T = XY/Z on the twisted
//! Edwards curve: -x² + y² = 1 + d·x²·y² with d = -121665/121666.

use std::sync::OnceLock;

use ec25519_types::CryptoError;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use super::affine::AffinePoint;
use super::field::{invert_batch, Fe25519};
use super::scalar::{Scalar, COFACTOR, GROUP_ORDER_BYTES};

/// d = -121665/121666 mod p (the Edwards curve parameter).
pub(crate) const D: Fe25519 = Fe25519([
    0x00034DCA135978A3,
    0x0001A8283B156EBD,
    0x0005E7A26001C029,
    0x000739C663A03CBB,
    0x00052036CEE2B6FF,
]);

/// 2*d mod p.
pub(crate) const D2: Fe25519 = Fe25519([
    0x00069B9426B2F159,
    0x00035050762ADD7A,
    0x0003CF44C0038052,
    0x0006738CC7407977,
    0x0002406D9DC56DFF,
]);

/// Base point Y coordinate: y = 4/5 mod p.
pub(crate) const BASE_Y: Fe25519 = Fe25519([
    0x0006666666666658,
    0x0004CCCCCCCCCCCC,
    0x0001999999999999,
    0x0003333333333333,
    0x0006666666666666,
]);

/// Base point X coordinate (non-negative root for y = 4/5).
pub(crate) const BASE_X: Fe25519 = Fe25519([
    0x00062D608F25D51A,
    0x000412A4B4F6592A,
    0x00075B7171A4B31D,
    0x0001FF60527118FE,
    0x000216936D3CD6E5,
]);

/// BASE_X · BASE_Y.
const BASE_T: Fe25519 = Fe25519([
    0x00068AB3A5B7DDA3,
    0x00000EEA2A5EADBB,
    0x0002AF8DF483C27E,
    0x000332B375274732,
    0x00067875F0FD78B7,
]);

/// Window width of the shared base-point table.
pub const BASE_WINDOW_SIZE: usize = 8;

/// Widest window accepted by the precomputation (2^15 points per window).
const MAX_WINDOW_SIZE: usize = 16;

static BASE_TABLE: OnceLock<Result<PrecomputeTable, CryptoError>> = OnceLock::new();

/// A point on the twisted Edwards curve in extended coordinates.
/// Represents the affine point (X/Z, Y/Z) with T = XY/Z.
#[derive(Clone, Copy, Debug)]
pub struct ExtendedPoint {
    pub(crate) x: Fe25519,
    pub(crate) y: Fe25519,
    pub(crate) z: Fe25519,
    pub(crate) t: Fe25519,
}

/// Precomputed multiples of a point for windowed multiplication.
///
/// Holds `1 + 256/W` windows of `2^(W-1)` points each, all with Z = 1:
/// window i stores k·2^(iW)·P for k = 1..=2^(W-1).
#[derive(Clone, Debug)]
pub struct PrecomputeTable {
    window: usize,
    points: Vec<ExtendedPoint>,
}

impl PrecomputeTable {
    /// Build the table for `point` with window width `window`.
    pub fn new(point: &ExtendedPoint, window: usize) -> Result<PrecomputeTable, CryptoError> {
        check_window_size(window)?;
        let windows = 1 + 256 / window;
        let per_window = 1usize << (window - 1);

        let mut points = Vec::with_capacity(windows * per_window);
        let mut p = *point;
        for _ in 0..windows {
            let mut base = p;
            points.push(base);
            for _ in 1..per_window {
                base = base.add(&p);
                points.push(base);
            }
            p = base.double();
        }

        let points = ExtendedPoint::normalize_z(&points)?;
        tracing::debug!(window, points = points.len(), "built precomputation table");
        Ok(PrecomputeTable { window, points })
    }

    /// Window width W.
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Fail unless `window` divides 256 and is small enough to tabulate.
pub(crate) fn check_window_size(window: usize) -> Result<(), CryptoError> {
    if window == 0 || window > MAX_WINDOW_SIZE || 256 % window != 0 {
        return Err(CryptoError::InvalidWindowSize(window));
    }
    Ok(())
}

/// The shared W = 8 table for the base point, built on first use.
pub(crate) fn base_table() -> Result<&'static PrecomputeTable, CryptoError> {
    BASE_TABLE
        .get_or_init(|| PrecomputeTable::new(&ExtendedPoint::BASE, BASE_WINDOW_SIZE))
        .as_ref()
        .map_err(Clone::clone)
}

/// Read `width` bits of a little-endian 256-bit integer starting at `offset`.
fn window_bits(n: &[u8; 32], offset: usize, width: usize) -> i64 {
    let mut v = 0i64;
    for i in 0..width {
        let bit = offset + i;
        if bit < 256 {
            v |= (((n[bit / 8] >> (bit % 8)) & 1) as i64) << i;
        }
    }
    v
}

impl ExtendedPoint {
    /// The identity point (neutral element): (0, 1, 1, 0).
    pub const ZERO: ExtendedPoint = ExtendedPoint {
        x: Fe25519::ZERO,
        y: Fe25519::ONE,
        z: Fe25519::ONE,
        t: Fe25519::ZERO,
    };

    /// The Ed25519 base point B.
    pub const BASE: ExtendedPoint = ExtendedPoint {
        x: BASE_X,
        y: BASE_Y,
        z: Fe25519::ONE,
        t: BASE_T,
    };

    /// Lift an affine point: (x, y, 1, xy).
    pub fn from_affine(p: &AffinePoint) -> ExtendedPoint {
        ExtendedPoint {
            x: p.x,
            y: p.y,
            z: Fe25519::ONE,
            t: p.x.mul(&p.y),
        }
    }

    /// Projective equality: X1·Z2 = X2·Z1 and Y1·Z2 = Y2·Z1.
    pub fn equals(&self, other: &ExtendedPoint) -> bool {
        let x_eq = self.x.mul(&other.z).ct_eq(&other.x.mul(&self.z));
        let y_eq = self.y.mul(&other.z).ct_eq(&other.y.mul(&self.z));
        (x_eq & y_eq).into()
    }

    /// -P = (-X, Y, Z, -T).
    pub fn negate(&self) -> ExtendedPoint {
        ExtendedPoint {
            x: self.x.neg(),
            y: self.y,
            z: self.z,
            t: self.t.neg(),
        }
    }

    /// Doubling with the "dbl-2008-hwcd" formula for a = -1 (4M + 4S).
    pub fn double(&self) -> ExtendedPoint {
        let aa = self.x.square(); // A = X1²
        let bb = self.y.square(); // B = Y1²
        let z2 = self.z.square();
        let cc = z2.add(&z2); // C = 2·Z1²
        let d_val = aa.neg(); // D = a·A = -A
        let xy = self.x.add(&self.y);
        let e = xy.square().sub(&aa).sub(&bb); // E = (X1+Y1)² - A - B
        let g = d_val.add(&bb); // G = D + B
        let f = g.sub(&cc); // F = G - C
        let h = d_val.sub(&bb); // H = D - B

        ExtendedPoint {
            x: e.mul(&f), // X3 = E·F
            y: g.mul(&h), // Y3 = G·H
            z: f.mul(&g), // Z3 = F·G
            t: e.mul(&h), // T3 = E·H
        }
    }

    /// Addition with the unified "add-2008-hwcd-3" formula.
    ///
    /// The formula is complete on this curve: it is valid for P = Q and for
    /// torsion points, so no equality test is needed to fall back to doubling.
    pub fn add(&self, other: &ExtendedPoint) -> ExtendedPoint {
        let aa = self.y.sub(&self.x).mul(&other.y.sub(&other.x)); // A = (Y1-X1)·(Y2-X2)
        let bb = self.y.add(&self.x).mul(&other.y.add(&other.x)); // B = (Y1+X1)·(Y2+X2)
        let cc = self.t.mul(&D2).mul(&other.t); // C = T1·2d·T2
        let dd = self.z.add(&self.z).mul(&other.z); // D = 2·Z1·Z2

        let e = bb.sub(&aa); // E = B - A
        let f = dd.sub(&cc); // F = D - C
        let g = dd.add(&cc); // G = D + C
        let h = bb.add(&aa); // H = B + A

        ExtendedPoint {
            x: e.mul(&f), // X3 = E·F
            y: g.mul(&h), // Y3 = G·H
            z: f.mul(&g), // Z3 = F·G
            t: e.mul(&h), // T3 = E·H
        }
    }

    /// P - Q.
    pub fn subtract(&self, other: &ExtendedPoint) -> ExtendedPoint {
        self.add(&other.negate())
    }

    /// Negate in constant time when `choice` is set.
    fn conditional_negate(&self, choice: Choice) -> ExtendedPoint {
        ExtendedPoint::conditional_select(self, &self.negate(), choice)
    }

    /// Constant-time scalar multiplication for secret scalars.
    ///
    /// The scalar must be non-zero. Multiplying the base point uses the
    /// shared W = 8 table.
    pub fn multiply(&self, scalar: &Scalar) -> Result<ExtendedPoint, CryptoError> {
        self.multiply_with_hint(scalar, None)
    }

    /// Constant-time scalar multiplication, reusing the precomputation
    /// table cached on `hint` when it has one.
    pub fn multiply_with_hint(
        &self,
        scalar: &Scalar,
        hint: Option<&AffinePoint>,
    ) -> Result<ExtendedPoint, CryptoError> {
        if scalar.is_zero() {
            return Err(CryptoError::ScalarOutOfRange);
        }
        let hint = hint.filter(|h| ExtendedPoint::from_affine(h).equals(self));
        let table = match hint.and_then(AffinePoint::precomputes) {
            Some(table) => Some(table),
            None if self.equals(&ExtendedPoint::BASE) => Some(base_table()?),
            None => None,
        };
        self.wnaf(&scalar.to_bytes(), table)
    }

    /// Windowed NAF multiplication.
    ///
    /// Every window performs exactly one addition: zero digits add a
    /// table entry to the throwaway accumulator `f` instead of `p`.
    fn wnaf(
        &self,
        n: &[u8; 32],
        table: Option<&PrecomputeTable>,
    ) -> Result<ExtendedPoint, CryptoError> {
        let owned;
        let table = match table {
            Some(table) => table,
            None => {
                owned = PrecomputeTable::new(self, 1)?;
                &owned
            }
        };

        let w = table.window;
        let windows = 1 + 256 / w;
        let window_size = 1i64 << (w - 1);
        let max_number = 1i64 << w;

        let mut p = ExtendedPoint::ZERO;
        let mut f = ExtendedPoint::BASE;
        let mut carry = 0i64;

        for window in 0..windows {
            let offset = window * window_size as usize;
            let mut wbits = window_bits(n, window * w, w) + carry;
            carry = 0;
            if wbits > window_size {
                wbits -= max_number;
                carry = 1;
            }

            if wbits == 0 {
                let cond = Choice::from((window % 2) as u8);
                f = f.add(&table.points[offset].conditional_negate(cond));
            } else {
                let idx = offset + wbits.unsigned_abs() as usize - 1;
                let cond = Choice::from((wbits < 0) as u8);
                p = p.add(&table.points[idx].conditional_negate(cond));
            }
        }

        let normalized = ExtendedPoint::normalize_z(&[p, f])?;
        Ok(normalized[0])
    }

    /// Variable-time double-and-add for public scalars.
    ///
    /// Accepts any 256-bit little-endian integer, including values >= ℓ.
    pub fn multiply_unsafe(&self, n: &[u8; 32]) -> Result<ExtendedPoint, CryptoError> {
        let mut one = [0u8; 32];
        one[0] = 1;

        if n.iter().all(|&b| b == 0) {
            return Ok(ExtendedPoint::ZERO);
        }
        if self.equals(&ExtendedPoint::ZERO) || *n == one {
            return Ok(*self);
        }
        if self.equals(&ExtendedPoint::BASE) {
            return self.wnaf(n, Some(base_table()?));
        }

        let mut p = ExtendedPoint::ZERO;
        for i in (0..256).rev() {
            p = p.double();
            if (n[i / 8] >> (i % 8)) & 1 == 1 {
                p = p.add(self);
            }
        }
        Ok(p)
    }

    /// True if [8]P is the identity.
    pub fn is_small_order(&self) -> Result<bool, CryptoError> {
        let mut h = [0u8; 32];
        h[0] = COFACTOR;
        Ok(self.multiply_unsafe(&h)?.equals(&ExtendedPoint::ZERO))
    }

    /// True if [ℓ]P is the identity, i.e. P has no torsion component.
    pub fn is_torsion_free(&self) -> Result<bool, CryptoError> {
        Ok(self
            .multiply_unsafe(&GROUP_ORDER_BYTES)?
            .equals(&ExtendedPoint::ZERO))
    }

    /// Convert to affine coordinates, optionally with a precomputed 1/Z.
    ///
    /// Fails with `InvalidZCoordinate` if Z·(1/Z) is not exactly one.
    pub fn to_affine(&self, inv_z: Option<&Fe25519>) -> Result<AffinePoint, CryptoError> {
        let inv_z = match inv_z {
            Some(inv) => *inv,
            None => self.z.invert()?,
        };
        if self.z.mul(&inv_z) != Fe25519::ONE {
            return Err(CryptoError::InvalidZCoordinate);
        }
        Ok(AffinePoint::from_coordinates(
            self.x.mul(&inv_z),
            self.y.mul(&inv_z),
        ))
    }

    /// Bring many points to Z = 1 with one batch inversion.
    pub fn normalize_z(points: &[ExtendedPoint]) -> Result<Vec<ExtendedPoint>, CryptoError> {
        let zs: Vec<Fe25519> = points.iter().map(|p| p.z).collect();
        let inverses = invert_batch(&zs);
        points
            .iter()
            .zip(inverses.iter())
            .map(|(p, inv)| Ok(ExtendedPoint::from_affine(&p.to_affine(Some(inv))?)))
            .collect()
    }

    /// Encode as a 32-byte Ed25519 point.
    pub fn to_bytes(&self) -> Result<[u8; 32], CryptoError> {
        Ok(self.to_affine(None)?.to_bytes())
    }
}

impl ConditionallySelectable for ExtendedPoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        ExtendedPoint {
            x: Fe25519::conditional_select(&a.x, &b.x, choice),
            y: Fe25519::conditional_select(&a.y, &b.y, choice),
            z: Fe25519::conditional_select(&a.z, &b.z, choice),
            t: Fe25519::conditional_select(&a.t, &b.t, choice),
        }
    }
}

impl PartialEq for ExtendedPoint {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for ExtendedPoint {}
