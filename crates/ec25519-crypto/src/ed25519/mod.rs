//! Ed25519 digital signature algorithm.
//!
//! Ed25519 is an EdDSA signature scheme using SHA-512 and Curve25519,
//! as defined in RFC 8032. Verification follows ZIP-215: public keys and
//! the R component are decoded loosely (y may exceed p, x = 0 may carry a
//! sign bit) and the cofactored equation [8](sB - R - kA) = O is checked.
//! This accepts a superset of the signatures strict RFC 8032 verification
//! accepts, and the accepted set is identical across ZIP-215 verifiers.

use ec25519_bignum::BigNum;
use ec25519_types::CryptoError;
use zeroize::{Zeroize, Zeroizing};

use crate::curve25519::scalar::normalize_scalar;
use crate::curve25519::{adjust_bytes_25519, AffinePoint, ExtendedPoint, Scalar, COFACTOR};
use crate::hash::Sha512;
use crate::provider::{Signer, Verifier};

/// Ed25519 key size in bytes.
pub const ED25519_KEY_SIZE: usize = 32;

/// Ed25519 signature size in bytes.
pub const ED25519_SIGNATURE_SIZE: usize = 64;

/// A private key expanded per RFC 8032 §5.1.5.
///
/// `head` is the clamped first half of SHA-512(seed), `prefix` the second
/// half, `scalar` is `head` reduced modulo ℓ and `point` = scalar·B.
/// Secret parts are wiped on drop.
#[derive(Clone)]
pub struct ExtendedPublicKey {
    pub head: [u8; 32],
    pub prefix: [u8; 32],
    pub scalar: Scalar,
    pub point: AffinePoint,
    pub point_bytes: [u8; ED25519_KEY_SIZE],
}

impl Drop for ExtendedPublicKey {
    fn drop(&mut self) {
        self.head.zeroize();
        self.prefix.zeroize();
        self.scalar.zeroize();
    }
}

/// Expand a 32-byte private key.
pub fn get_extended_public_key(private_key: &[u8]) -> Result<ExtendedPublicKey, CryptoError> {
    if private_key.len() != ED25519_KEY_SIZE {
        return Err(CryptoError::InvalidLength {
            expected: ED25519_KEY_SIZE,
            got: private_key.len(),
        });
    }
    let hashed = Zeroizing::new(Sha512::digest(private_key));

    let mut head = [0u8; 32];
    head.copy_from_slice(&hashed[..32]);
    adjust_bytes_25519(&mut head);
    let mut prefix = [0u8; 32];
    prefix.copy_from_slice(&hashed[32..]);

    let scalar = Scalar::from_bytes_mod_order(&head)?;
    let point = AffinePoint::BASE.multiply(&scalar)?;
    let point_bytes = point.to_bytes();

    Ok(ExtendedPublicKey {
        head,
        prefix,
        scalar,
        point,
        point_bytes,
    })
}

/// Encode an integer private key in [1, 2^256) as 32 big-endian bytes.
pub fn private_key_from_bignum(n: &BigNum) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let mut bound = [0u8; 33];
    bound[0] = 1;
    let n = normalize_scalar(n, &BigNum::from_bytes_be(&bound), true)?;
    let bytes = Zeroizing::new(n.to_bytes_be(ED25519_KEY_SIZE)?);
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// The 32-byte public key for a private key.
pub fn get_public_key(private_key: &[u8]) -> Result<[u8; ED25519_KEY_SIZE], CryptoError> {
    Ok(get_extended_public_key(private_key)?.point_bytes)
}

/// A decoded Ed25519 public key that remembers its original encoding.
#[derive(Clone, Debug)]
pub struct Ed25519PublicKey {
    point: AffinePoint,
    bytes: [u8; ED25519_KEY_SIZE],
}

impl Ed25519PublicKey {
    /// Decode with ZIP-215 rules.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let point = AffinePoint::from_bytes_zip215(bytes)?;
        let mut raw = [0u8; ED25519_KEY_SIZE];
        raw.copy_from_slice(bytes);
        Ok(Ed25519PublicKey { point, bytes: raw })
    }

    pub fn point(&self) -> &AffinePoint {
        &self.point
    }

    pub fn as_bytes(&self) -> &[u8; ED25519_KEY_SIZE] {
        &self.bytes
    }
}

/// A parsed signature (R, s).
#[derive(Clone, Debug)]
pub struct Ed25519Signature {
    r: AffinePoint,
    r_bytes: [u8; 32],
    s: Scalar,
}

impl Ed25519Signature {
    /// Parse R ‖ s. R is decoded with ZIP-215 rules; s must be below ℓ.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != ED25519_SIGNATURE_SIZE {
            return Err(CryptoError::InvalidLength {
                expected: ED25519_SIGNATURE_SIZE,
                got: bytes.len(),
            });
        }
        let r = AffinePoint::from_bytes_zip215(&bytes[..32])?;
        let mut r_bytes = [0u8; 32];
        r_bytes.copy_from_slice(&bytes[..32]);
        let mut s_bytes = [0u8; 32];
        s_bytes.copy_from_slice(&bytes[32..]);
        let s = Scalar::from_canonical_bytes(&s_bytes).map_err(|_| CryptoError::InvalidSignature)?;
        Ok(Ed25519Signature { r, r_bytes, s })
    }

    pub fn r(&self) -> &AffinePoint {
        &self.r
    }

    pub fn s(&self) -> &Scalar {
        &self.s
    }

    pub fn to_bytes(&self) -> [u8; ED25519_SIGNATURE_SIZE] {
        let mut out = [0u8; ED25519_SIGNATURE_SIZE];
        out[..32].copy_from_slice(&self.r_bytes);
        out[32..].copy_from_slice(&self.s.to_bytes());
        out
    }
}

/// Sign with an expanded key.
fn sign_expanded(
    message: &[u8],
    key: &ExtendedPublicKey,
) -> Result<[u8; ED25519_SIGNATURE_SIZE], CryptoError> {
    let r = Scalar::from_bytes_mod_order(&Sha512::digest_parts(&[&key.prefix, message]))?;
    let r_point = AffinePoint::BASE.multiply(&r)?;
    let r_bytes = r_point.to_bytes();

    let k = Scalar::from_bytes_mod_order(&Sha512::digest_parts(&[
        &r_bytes,
        &key.point_bytes,
        message,
    ]))?;
    let s = r.add(&k.mul(&key.scalar)?)?;

    let mut sig = [0u8; ED25519_SIGNATURE_SIZE];
    sig[..32].copy_from_slice(&r_bytes);
    sig[32..].copy_from_slice(&s.to_bytes());
    Ok(sig)
}

/// Cofactored ZIP-215 check of a parsed signature.
///
/// The challenge hash covers the encodings exactly as received, so a
/// non-canonical R or A is hashed as-is.
pub fn verify_parsed(
    signature: &Ed25519Signature,
    message: &[u8],
    public_key: &Ed25519PublicKey,
) -> Result<bool, CryptoError> {
    let sb = ExtendedPoint::BASE.multiply_unsafe(&signature.s.to_bytes())?;
    let k = Scalar::from_bytes_mod_order(&Sha512::digest_parts(&[
        &signature.r_bytes,
        &public_key.bytes,
        message,
    ]))?;
    let ka = ExtendedPoint::from_affine(&public_key.point).multiply_unsafe(&k.to_bytes())?;
    let rka = ExtendedPoint::from_affine(&signature.r).add(&ka);

    let mut cofactor = [0u8; 32];
    cofactor[0] = COFACTOR;
    Ok(rka
        .subtract(&sb)
        .multiply_unsafe(&cofactor)?
        .equals(&ExtendedPoint::ZERO))
}

/// Sign `message` with a 32-byte private key.
pub fn sign(message: &[u8], private_key: &[u8]) -> Result<[u8; ED25519_SIGNATURE_SIZE], CryptoError> {
    sign_expanded(message, &get_extended_public_key(private_key)?)
}

/// Verify a 64-byte signature against a 32-byte public key.
///
/// Malformed encodings are errors; a well-formed signature that does not
/// verify is `Ok(false)`.
pub fn verify(signature: &[u8], message: &[u8], public_key: &[u8]) -> Result<bool, CryptoError> {
    let sig = Ed25519Signature::from_bytes(signature).map_err(|e| {
        tracing::debug!(error = %e, "ed25519: malformed signature");
        e
    })?;
    let pk = Ed25519PublicKey::from_bytes(public_key).map_err(|e| {
        tracing::debug!(error = %e, "ed25519: malformed public key");
        e
    })?;
    verify_parsed(&sig, message, &pk)
}

/// An Ed25519 key pair for signing and verification.
///
/// A key pair built with `from_public_key` can only verify.
#[derive(Clone)]
pub struct Ed25519KeyPair {
    /// The 32-byte private seed.
    seed: Option<Zeroizing<[u8; ED25519_KEY_SIZE]>>,
    expanded: Option<ExtendedPublicKey>,
    public_key: Ed25519PublicKey,
}

impl Ed25519KeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut seed = Zeroizing::new([0u8; ED25519_KEY_SIZE]);
        getrandom::getrandom(&mut seed[..]).map_err(|_| CryptoError::RandGenFail)?;
        Self::from_seed(&seed[..])
    }

    /// Create an Ed25519 key pair from a 32-byte private seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self, CryptoError> {
        let expanded = get_extended_public_key(seed)?;
        let mut raw = Zeroizing::new([0u8; ED25519_KEY_SIZE]);
        raw.copy_from_slice(seed);
        let public_key = Ed25519PublicKey {
            point: expanded.point.clone(),
            bytes: expanded.point_bytes,
        };
        Ok(Ed25519KeyPair {
            seed: Some(raw),
            expanded: Some(expanded),
            public_key,
        })
    }

    /// Create a key pair from an integer private key in [1, 2^256).
    pub fn from_seed_number(n: &BigNum) -> Result<Self, CryptoError> {
        let seed = private_key_from_bignum(n)?;
        Self::from_seed(&seed[..])
    }

    /// Create a verify-only key from a 32-byte public key.
    pub fn from_public_key(public_key: &[u8]) -> Result<Self, CryptoError> {
        Ok(Ed25519KeyPair {
            seed: None,
            expanded: None,
            public_key: Ed25519PublicKey::from_bytes(public_key)?,
        })
    }

    /// Sign a message, returning the 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; ED25519_SIGNATURE_SIZE], CryptoError> {
        let expanded = self.expanded.as_ref().ok_or(CryptoError::InvalidKey)?;
        sign_expanded(message, expanded)
    }

    /// Verify a signature against a message.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        let sig = Ed25519Signature::from_bytes(signature).map_err(|e| {
            tracing::debug!(error = %e, "ed25519: malformed signature");
            e
        })?;
        verify_parsed(&sig, message, &self.public_key)
    }

    /// Return the 32-byte public key.
    pub fn public_key(&self) -> &[u8; ED25519_KEY_SIZE] {
        &self.public_key.bytes
    }

    /// The private seed, if this key pair can sign.
    pub fn seed(&self) -> Option<&[u8; ED25519_KEY_SIZE]> {
        self.seed.as_deref()
    }

    /// X25519 agreement using this Ed25519 key.
    ///
    /// The peer's Ed25519 public key is mapped to its Montgomery
    /// u-coordinate and multiplied by this key's clamped head.
    #[cfg(feature = "x25519")]
    pub fn shared_secret(&self, peer_public_key: &[u8]) -> Result<[u8; 32], CryptoError> {
        let expanded = self.expanded.as_ref().ok_or(CryptoError::InvalidKey)?;
        let u = AffinePoint::from_bytes(peer_public_key)?.to_x25519()?;
        crate::x25519::scalar_mult(&expanded.head, &u)
    }
}

impl Signer for Ed25519KeyPair {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(Ed25519KeyPair::sign(self, message)?.to_vec())
    }
}

impl Verifier for Ed25519KeyPair {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        Ed25519KeyPair::verify(self, message, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve25519::TORSION_SUBGROUP;
    use proptest::prelude::*;

    fn hex_to_bytes(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    struct Rfc8032Case {
        secret: &'static str,
        public: &'static str,
        message: &'static str,
        signature: &'static str,
    }

    const RFC8032_CASES: [Rfc8032Case; 3] = [
        Rfc8032Case {
            secret: "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
            public: "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a",
            message: "",
            signature: "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b",
        },
        Rfc8032Case {
            secret: "4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb",
            public: "3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c",
            message: "72",
            signature: "92a009a9f0d4cab8720e820b5f642540a2b27b5416503f8fb3762223ebdb69da085ac1e43e15996e458f3613d0f11d8c387b2eaeb4302aeeb00d291612bb0c00",
        },
        Rfc8032Case {
            secret: "c5aa8df43f9f837bedb7442f31dcb7b166d38535076f094b85ce3a2e0b4458f7",
            public: "fc51cd8e6218a1a38da47ed00230f0580816ed13ba3303ac5deb911548908025",
            message: "af82",
            signature: "6291d657deec24024827e69c3abe01a30ce548a284743a445e3680d7db5ac3ac18ff9b538d16f290ae67f760984dc6594a7c15e9716ed28dc027beceea1ec40a",
        },
    ];

    #[test]
    fn test_rfc8032_vectors() {
        for case in RFC8032_CASES.iter() {
            let kp = Ed25519KeyPair::from_seed(&hex_to_bytes(case.secret)).unwrap();
            assert_eq!(kp.public_key().to_vec(), hex_to_bytes(case.public));

            let msg = hex_to_bytes(case.message);
            let sig = kp.sign(&msg).unwrap();
            assert_eq!(sig.to_vec(), hex_to_bytes(case.signature));
            assert!(verify(&sig, &msg, kp.public_key()).unwrap());
        }
    }

    #[test]
    fn test_verify_only_key() {
        let signer = Ed25519KeyPair::from_seed(&[1u8; 32]).unwrap();
        let verifier = Ed25519KeyPair::from_public_key(signer.public_key()).unwrap();
        let sig = signer.sign(b"hello").unwrap();
        assert!(verifier.verify(b"hello", &sig).unwrap());
        assert_eq!(verifier.sign(b"hello").unwrap_err(), CryptoError::InvalidKey);
        assert!(verifier.seed().is_none());
    }

    #[test]
    fn test_invalid_lengths() {
        assert!(matches!(
            Ed25519KeyPair::from_seed(&[0u8; 31]),
            Err(CryptoError::InvalidLength { expected: 32, got: 31 })
        ));
        let kp = Ed25519KeyPair::from_seed(&[0u8; 32]).unwrap();
        assert!(matches!(
            kp.verify(b"m", &[0u8; 63]),
            Err(CryptoError::InvalidLength { expected: 64, got: 63 })
        ));
    }

    #[test]
    fn test_s_out_of_range() {
        let kp = Ed25519KeyPair::from_seed(&[3u8; 32]).unwrap();
        let mut sig = kp.sign(b"m").unwrap();
        sig[32..].copy_from_slice(&crate::curve25519::GROUP_ORDER_BYTES);
        assert_eq!(
            kp.verify(b"m", &sig).unwrap_err(),
            CryptoError::InvalidSignature
        );
    }

    #[test]
    fn test_zip215_small_order_accepted() {
        // A and R of order 8 with s = 0 satisfy the cofactored equation.
        let pk = TORSION_SUBGROUP[1];
        let mut sig = [0u8; 64];
        sig[..32].copy_from_slice(&TORSION_SUBGROUP[1]);
        assert!(verify(&sig, b"zip215", &pk).unwrap());

        // Non-canonical A (y = p) is accepted under ZIP-215 decoding.
        let non_canonical =
            hex_to_bytes("edffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff7f");
        assert!(verify(&sig, b"zip215", &non_canonical).unwrap());
    }

    #[test]
    fn test_seed_number() {
        let seed = hex_to_bytes(RFC8032_CASES[0].secret);
        let n = BigNum::from_bytes_be(&seed);
        let kp = Ed25519KeyPair::from_seed_number(&n).unwrap();
        assert_eq!(kp.public_key().to_vec(), hex_to_bytes(RFC8032_CASES[0].public));
        assert!(Ed25519KeyPair::from_seed_number(&BigNum::zero()).is_err());
    }

    #[test]
    fn test_extended_public_key() {
        let ext = get_extended_public_key(&hex_to_bytes(RFC8032_CASES[0].secret)).unwrap();
        assert_eq!(ext.head[0] & 7, 0);
        assert_eq!(ext.head[31] & 0xc0, 0x40);
        assert_eq!(
            get_public_key(&hex_to_bytes(RFC8032_CASES[0].secret)).unwrap(),
            ext.point_bytes
        );
        assert_eq!(ext.point.to_bytes(), ext.point_bytes);
    }

    #[test]
    fn test_signature_parse_roundtrip() {
        let sig = hex_to_bytes(RFC8032_CASES[1].signature);
        let parsed = Ed25519Signature::from_bytes(&sig).unwrap();
        assert_eq!(parsed.to_bytes().to_vec(), sig);
        assert_eq!(parsed.r().to_bytes().to_vec(), sig[..32].to_vec());
    }

    #[cfg(feature = "x25519")]
    #[test]
    fn test_shared_secret_symmetry() {
        let alice = Ed25519KeyPair::from_seed(&[0x11; 32]).unwrap();
        let bob = Ed25519KeyPair::from_seed(&[0x22; 32]).unwrap();
        let ab = alice.shared_secret(bob.public_key()).unwrap();
        let ba = bob.shared_secret(alice.public_key()).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_provider_traits() {
        let kp = Ed25519KeyPair::from_seed(&[9u8; 32]).unwrap();
        let signer: &dyn Signer = &kp;
        let verifier: &dyn Verifier = &kp;
        let sig = signer.sign(b"trait").unwrap();
        assert_eq!(sig.len(), ED25519_SIGNATURE_SIZE);
        assert!(verifier.verify(b"trait", &sig).unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn sign_verify_roundtrip(
            seed in any::<[u8; 32]>(),
            msg in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            let kp = Ed25519KeyPair::from_seed(&seed).unwrap();
            let sig = kp.sign(&msg).unwrap();
            prop_assert!(kp.verify(&msg, &sig).unwrap());
            prop_assert!(verify(&sig, &msg, kp.public_key()).unwrap());
        }

        #[test]
        fn flipped_bits_fail(
            seed in any::<[u8; 32]>(),
            msg in prop::collection::vec(any::<u8>(), 1..128),
            sig_bit in 0usize..512,
            msg_bit in any::<prop::sample::Index>(),
        ) {
            let kp = Ed25519KeyPair::from_seed(&seed).unwrap();
            let sig = kp.sign(&msg).unwrap();

            // a flipped bit may break decoding or just the equation
            let mut bad_sig = sig;
            bad_sig[sig_bit / 8] ^= 1 << (sig_bit % 8);
            prop_assert!(!kp.verify(&msg, &bad_sig).unwrap_or(false));

            let at = msg_bit.index(msg.len() * 8);
            let mut bad_msg = msg.clone();
            bad_msg[at / 8] ^= 1 << (at % 8);
            prop_assert!(!kp.verify(&bad_msg, &sig).unwrap());
        }
    }
}
