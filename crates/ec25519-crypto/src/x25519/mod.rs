//! Montgomery-form Diffie-Hellman over Curve25519 (RFC 7748 §5).
//!
//! Only u-coordinates travel on the wire. Scalars are clamped on entry and
//! an all-zero output is reported as a non-contributory peer.

use ec25519_types::CryptoError;
use subtle::Choice;
use zeroize::{Zeroize, Zeroizing};

use crate::curve25519::adjust_bytes_25519;
use crate::curve25519::field::Fe25519;
use crate::provider::KeyAgreement;

/// Length of scalars, u-coordinates and shared secrets.
pub const X25519_KEY_SIZE: usize = 32;

/// a24 = (486662 - 2) / 4.
const A24: u32 = 121665;

/// u = 9, little-endian.
pub const BASEPOINT_U: [u8; X25519_KEY_SIZE] = {
    let mut u = [0u8; X25519_KEY_SIZE];
    u[0] = 9;
    u
};

type Bytes32 = [u8; X25519_KEY_SIZE];

/// A clamped secret scalar, wiped on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct X25519PrivateKey {
    scalar: Bytes32,
}

/// A peer's u-coordinate as received; the top bit is ignored when used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X25519PublicKey([u8; X25519_KEY_SIZE]);

impl X25519PrivateKey {
    /// Draw 32 bytes from the OS and clamp them.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut scalar = [0u8; X25519_KEY_SIZE];
        getrandom::getrandom(&mut scalar).map_err(|_| CryptoError::RandGenFail)?;
        Ok(Self::clamped(scalar))
    }

    /// Wrap caller-supplied bytes. Any 32-byte string is a valid key.
    pub fn new(bytes: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self::clamped(to_array(bytes)?))
    }

    fn clamped(mut scalar: Bytes32) -> Self {
        adjust_bytes_25519(&mut scalar);
        X25519PrivateKey { scalar }
    }

    /// X25519(k, 9).
    pub fn public_key(&self) -> X25519PublicKey {
        X25519PublicKey(montgomery_ladder(&self.scalar, &BASEPOINT_U))
    }

    /// X25519(k, u) for the peer's u, rejecting an all-zero result.
    pub fn diffie_hellman(&self, peer: &X25519PublicKey) -> Result<Vec<u8>, CryptoError> {
        checked_ladder(&self.scalar, &peer.0).map(|shared| shared.to_vec())
    }
}

impl KeyAgreement for X25519PrivateKey {
    fn compute_shared_secret(&self, peer_public_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.diffie_hellman(&X25519PublicKey::new(peer_public_key)?)
    }
}

impl X25519PublicKey {
    pub fn new(bytes: &[u8]) -> Result<Self, CryptoError> {
        to_array(bytes).map(X25519PublicKey)
    }

    pub fn as_bytes(&self) -> &[u8; X25519_KEY_SIZE] {
        &self.0
    }
}

fn to_array(bytes: &[u8]) -> Result<Bytes32, CryptoError> {
    bytes.try_into().map_err(|_| CryptoError::InvalidLength {
        expected: X25519_KEY_SIZE,
        got: bytes.len(),
    })
}

/// X25519(k, u): clamp `private_key` and multiply the point with
/// u-coordinate `public_key`.
///
/// Fails with `X25519NonContributory` when the result is all zero, which
/// happens exactly when the peer sent a small-order point.
pub fn scalar_mult(private_key: &[u8], public_key: &[u8]) -> Result<[u8; X25519_KEY_SIZE], CryptoError> {
    let mut scalar = Zeroizing::new(to_array(private_key)?);
    adjust_bytes_25519(&mut scalar);
    checked_ladder(&scalar, &to_array(public_key)?)
}

/// X25519(k, 9): the public key for `private_key`.
pub fn scalar_mult_base(private_key: &[u8]) -> Result<[u8; X25519_KEY_SIZE], CryptoError> {
    scalar_mult(private_key, &BASEPOINT_U)
}

fn checked_ladder(scalar: &Bytes32, u: &Bytes32) -> Result<Bytes32, CryptoError> {
    let shared = montgomery_ladder(scalar, u);
    if shared == [0u8; X25519_KEY_SIZE] {
        tracing::warn!("x25519: peer public key produced an all-zero shared secret");
        return Err(CryptoError::X25519NonContributory);
    }
    Ok(shared)
}

/// Projective (X : Z) on the Montgomery curve.
#[derive(Clone, Copy)]
struct XZ {
    x: Fe25519,
    z: Fe25519,
}

impl XZ {
    fn swap(&mut self, other: &mut XZ, choice: Choice) {
        self.x.conditional_swap(&mut other.x, choice);
        self.z.conditional_swap(&mut other.z, choice);
    }

    /// One ladder rung: `self` becomes 2·self and `other` becomes
    /// self + other, where `u` is the affine difference other - self.
    fn double_and_add(&mut self, other: &mut XZ, u: &Fe25519) {
        let sum = self.x.add(&self.z);
        let diff = self.x.sub(&self.z);
        let sum_sq = sum.square();
        let diff_sq = diff.square();
        let e = sum_sq.sub(&diff_sq);

        let cross_a = other.x.sub(&other.z).mul(&sum);
        let cross_b = other.x.add(&other.z).mul(&diff);
        other.x = cross_a.add(&cross_b).square();
        other.z = u.mul(&cross_a.sub(&cross_b).square());

        self.x = sum_sq.mul(&diff_sq);
        self.z = e.mul(&sum_sq.add(&e.mul_small(A24)));
    }
}

/// Constant-time ladder over bits 254..=0 of an already clamped scalar.
fn montgomery_ladder(scalar: &Bytes32, u_bytes: &Bytes32) -> Bytes32 {
    let mut masked = *u_bytes;
    masked[31] &= 0x7f;
    let u = Fe25519::from_bytes(&masked);

    let mut r0 = XZ {
        x: Fe25519::ONE,
        z: Fe25519::ZERO,
    };
    let mut r1 = XZ { x: u, z: Fe25519::ONE };
    let mut swapped = Choice::from(0);

    for bit in (0..255).rev() {
        let k_t = Choice::from((scalar[bit >> 3] >> (bit & 7)) & 1);
        r0.swap(&mut r1, swapped ^ k_t);
        swapped = k_t;
        r0.double_and_add(&mut r1, &u);
    }
    r0.swap(&mut r1, swapped);

    // Z^(p-2) = (Z^(2^252-3))^8 · Z^3; zero stays zero.
    let z = r0.z;
    let z_inv = z.pow_2252_3().pow2k(3).mul(&z.square().mul(&z));
    r0.x.mul(&z_inv).to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hex_to_bytes(s: &str) -> [u8; 32] {
        let bytes: Vec<u8> = (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect();
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        out
    }

    /// Alice and Bob from RFC 7748 §6.1.
    #[test]
    fn test_x25519_rfc7748_vector() {
        let alice_prv =
            hex_to_bytes("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a");
        let alice_pub_expected =
            hex_to_bytes("8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a");

        let bob_prv =
            hex_to_bytes("5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb");
        let bob_pub_expected =
            hex_to_bytes("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f");

        let shared_expected =
            hex_to_bytes("4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742");

        let alice = X25519PrivateKey::new(&alice_prv).unwrap();
        let alice_pub = alice.public_key();
        assert_eq!(alice_pub.as_bytes(), &alice_pub_expected);

        let bob = X25519PrivateKey::new(&bob_prv).unwrap();
        let bob_pub = bob.public_key();
        assert_eq!(bob_pub.as_bytes(), &bob_pub_expected);

        let shared_alice = alice.diffie_hellman(&bob_pub).unwrap();
        let shared_bob = bob.diffie_hellman(&alice_pub).unwrap();
        assert_eq!(shared_alice, shared_bob);
        assert_eq!(shared_alice.as_slice(), &shared_expected);

        assert_eq!(scalar_mult_base(&alice_prv).unwrap(), alice_pub_expected);
        assert_eq!(scalar_mult(&bob_prv, &alice_pub_expected).unwrap(), shared_expected);
    }

    /// RFC 7748 §5.2, first vector; u has bit 255 set.
    #[test]
    fn test_x25519_rfc7748_scalar_mult_vector() {
        let scalar =
            hex_to_bytes("a546e36bf0527c9d3b16154b82465edd62144c0ac1fc5a18506a2244ba449ac4");
        let u = hex_to_bytes("e6db6867583030db3594c1a424b15f7c726624ec26b3353b10a903a6d0ab1c4c");
        let expected =
            hex_to_bytes("c3da55379de9c6908e94ea4df28d084f32eccf03491c71f754b4075577a28552");
        assert_eq!(scalar_mult(&scalar, &u).unwrap(), expected);
    }

    #[test]
    fn test_x25519_rfc7748_iterated_1() {
        let k = BASEPOINT_U;
        let result = scalar_mult(&k, &k).unwrap();
        let expected =
            hex_to_bytes("422c8e7a6227d7bca1350b3e2bb7279f7897b87bb6854b783c60e80311ae3079");
        assert_eq!(result, expected);
    }

    /// RFC 7748 §5.2 iterated vector: k, u <- X25519(k, u), k.
    #[test]
    fn test_x25519_rfc7748_iterated_1000() {
        let mut k = BASEPOINT_U;
        let mut u = k;

        for _ in 0..1000 {
            let old_k = k;
            k = scalar_mult(&k, &u).unwrap();
            u = old_k;
        }

        let expected =
            hex_to_bytes("684cf59ba83309552800ef566f2f4d3c1c3887c49360e3875f2eb94d99532c51");
        assert_eq!(k, expected);
    }

    #[test]
    fn test_x25519_low_order_all_zero() {
        let prv = X25519PrivateKey::generate().unwrap();
        let zero_pub = X25519PublicKey::new(&[0u8; 32]).unwrap();
        assert_eq!(
            prv.diffie_hellman(&zero_pub).unwrap_err(),
            CryptoError::X25519NonContributory
        );
        // u = 1 has order 4
        let mut one = [0u8; 32];
        one[0] = 1;
        assert_eq!(
            scalar_mult(&[0x55; 32], &one).unwrap_err(),
            CryptoError::X25519NonContributory
        );
    }

    #[test]
    fn test_x25519_wrong_key_size() {
        assert!(X25519PrivateKey::new(&[0u8; 31]).is_err());
        assert!(X25519PrivateKey::new(&[0u8; 33]).is_err());
        assert!(X25519PublicKey::new(&[0u8; 31]).is_err());
        assert!(X25519PublicKey::new(&[0u8; 33]).is_err());
        assert!(matches!(
            scalar_mult(&[1u8; 32], &[9u8; 16]),
            Err(CryptoError::InvalidLength { expected: 32, got: 16 })
        ));
    }

    #[test]
    fn test_key_agreement_trait() {
        let alice = X25519PrivateKey::new(&[0x21; 32]).unwrap();
        let bob = X25519PrivateKey::new(&[0x42; 32]).unwrap();
        let agreement: &dyn KeyAgreement = &alice;
        let shared = agreement
            .compute_shared_secret(bob.public_key().as_bytes())
            .unwrap();
        assert_eq!(shared, bob.diffie_hellman(&alice.public_key()).unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn shared_secret_is_symmetric(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let alice = X25519PrivateKey::new(&a).unwrap();
            let bob = X25519PrivateKey::new(&b).unwrap();
            let ab = alice.diffie_hellman(&bob.public_key()).unwrap();
            let ba = bob.diffie_hellman(&alice.public_key()).unwrap();
            prop_assert_eq!(&ab, &ba);
            prop_assert_eq!(ab.len(), X25519_KEY_SIZE);
        }

        #[test]
        fn clamping_ignores_masked_bits(k in any::<[u8; 32]>(), low in 0u8..8, high in any::<bool>()) {
            let mut tweaked = k;
            tweaked[0] ^= low;
            tweaked[31] ^= if high { 0x80 } else { 0 };
            prop_assert_eq!(
                scalar_mult_base(&k).unwrap(),
                scalar_mult_base(&tweaked).unwrap()
            );
        }
    }
}
