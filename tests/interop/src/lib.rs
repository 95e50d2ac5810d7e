//! Integration tests for ec25519-rs.
//! Cross-module roundtrip and interoperability tests.

#[cfg(test)]
mod tests {
    use ec25519_crypto::curve25519::{
        AffinePoint, ExtendedPoint, Fe25519, Scalar, TORSION_SUBGROUP,
    };
    use ec25519_crypto::ed25519::{self, Ed25519KeyPair};
    use ec25519_crypto::hash::Sha512;
    use ec25519_crypto::provider::{KeyAgreement, Signer, Verifier};
    use ec25519_crypto::ristretto255::RistrettoPoint;
    use ec25519_crypto::x25519::{self, X25519PrivateKey};
    use ec25519_types::CryptoError;
    use proptest::prelude::*;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    // -------------------------------------------------------
    // 1. Ed25519 public key maps onto the X25519 public key
    // -------------------------------------------------------
    #[test]
    fn test_ed25519_key_birational_to_x25519() {
        let seed = [0x5eu8; 32];
        let ext = ed25519::get_extended_public_key(&seed).unwrap();

        // The clamped head is a valid X25519 private key for the same point.
        let mont_pub = x25519::scalar_mult_base(&ext.head).unwrap();
        assert_eq!(ext.point.to_x25519().unwrap(), mont_pub);
    }

    // -------------------------------------------------------
    // 2. Ed25519-derived agreement matches plain X25519
    // -------------------------------------------------------
    #[test]
    fn test_ed25519_shared_secret_matches_x25519() {
        let alice = Ed25519KeyPair::from_seed(&[0xa1; 32]).unwrap();
        let bob = Ed25519KeyPair::from_seed(&[0xb0; 32]).unwrap();

        let via_ed = alice.shared_secret(bob.public_key()).unwrap();

        let alice_head = ed25519::get_extended_public_key(&[0xa1; 32]).unwrap().head;
        let bob_u = AffinePoint::from_bytes(bob.public_key())
            .unwrap()
            .to_x25519()
            .unwrap();
        let alice_x = X25519PrivateKey::new(&alice_head).unwrap();
        let via_x = alice_x.compute_shared_secret(&bob_u).unwrap();
        assert_eq!(via_ed.to_vec(), via_x);
    }

    // -------------------------------------------------------
    // 3. Signer / Verifier trait objects
    // -------------------------------------------------------
    #[test]
    fn test_trait_object_sign_verify() {
        let kp = Ed25519KeyPair::generate().unwrap();
        let verifier = Ed25519KeyPair::from_public_key(kp.public_key()).unwrap();

        let signers: Vec<Box<dyn Signer>> = vec![Box::new(kp)];
        let sig = signers[0].sign(b"interop").unwrap();
        let v: &dyn Verifier = &verifier;
        assert!(v.verify(b"interop", &sig).unwrap());
        assert!(!v.verify(b"interop?", &sig).unwrap());
    }

    // -------------------------------------------------------
    // 4. Public key from AffinePoint::from_private_key
    // -------------------------------------------------------
    #[test]
    fn test_point_from_private_key() {
        let sk = hex("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60");
        let p = AffinePoint::from_private_key(&sk).unwrap();
        assert_eq!(
            p.to_bytes().to_vec(),
            hex("d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a")
        );
        assert_eq!(ed25519::get_public_key(&sk).unwrap(), p.to_bytes());
    }

    // -------------------------------------------------------
    // 5. Ristretto: torsion-shifted representatives compare equal
    // -------------------------------------------------------
    #[test]
    fn test_ristretto_hides_torsion() {
        let p = RistrettoPoint::hash_to_curve(&Sha512::digest(b"interop")).unwrap();
        let base = *p.as_extended();
        for i in [2usize, 4, 6] {
            let t = ExtendedPoint::from_affine(&AffinePoint::from_bytes(&TORSION_SUBGROUP[i]).unwrap());
            let shifted = RistrettoPoint::from_extended(base.add(&t));
            assert!(!shifted.as_extended().equals(&base));
            assert_eq!(shifted, p);
            assert_eq!(shifted.to_bytes(), p.to_bytes());
        }
    }

    // -------------------------------------------------------
    // 6. Scalar arithmetic agrees with point arithmetic
    // -------------------------------------------------------
    #[test]
    fn test_scalar_linearity() {
        let a = Scalar::from_bytes_mod_order(&Sha512::digest(b"a")).unwrap();
        let b = Scalar::from_bytes_mod_order(&Sha512::digest(b"b")).unwrap();
        let sum = a.add(&b).unwrap();
        let prod = a.mul(&b).unwrap();

        let g = ExtendedPoint::BASE;
        let ga = g.multiply(&a).unwrap();
        let gb = g.multiply(&b).unwrap();
        assert_eq!(g.multiply(&sum).unwrap(), ga.add(&gb));
        assert_eq!(ga.multiply(&b).unwrap(), g.multiply(&prod).unwrap());

        let a_inv = a.invert().unwrap();
        assert_eq!(ga.multiply(&a_inv).unwrap(), g);

        let r = RistrettoPoint::BASE;
        assert_eq!(
            r.multiply(&sum).unwrap(),
            r.multiply(&a).unwrap().add(&r.multiply(&b).unwrap())
        );
    }

    // -------------------------------------------------------
    // 7. Batch inversion feeds affine conversion
    // -------------------------------------------------------
    #[test]
    fn test_normalize_many_points() {
        let mut pts = Vec::new();
        let mut acc = ExtendedPoint::BASE;
        for _ in 0..10 {
            acc = acc.double().add(&ExtendedPoint::BASE);
            pts.push(acc);
        }
        let normalized = ExtendedPoint::normalize_z(&pts).unwrap();
        for (p, n) in pts.iter().zip(normalized.iter()) {
            assert_eq!(p.to_bytes().unwrap(), n.to_bytes().unwrap());
        }
        assert_eq!(Fe25519::ZERO.invert().unwrap_err(), CryptoError::FieldInvertZero);
    }

    // -------------------------------------------------------
    // 8. X25519 symmetry through free functions and key types
    // -------------------------------------------------------
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn x25519_symmetry(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let ab = x25519::scalar_mult(&a, &x25519::scalar_mult_base(&b).unwrap()).unwrap();
            let ba = x25519::scalar_mult(&b, &x25519::scalar_mult_base(&a).unwrap()).unwrap();
            prop_assert_eq!(ab, ba);

            let alice = X25519PrivateKey::new(&a).unwrap();
            let shared = alice.compute_shared_secret(&x25519::scalar_mult_base(&b).unwrap()).unwrap();
            prop_assert_eq!(shared.as_slice(), &ab[..]);
        }

        #[test]
        fn ed25519_keys_agree_over_x25519(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let alice = Ed25519KeyPair::from_seed(&a).unwrap();
            let bob = Ed25519KeyPair::from_seed(&b).unwrap();
            prop_assert_eq!(
                alice.shared_secret(bob.public_key()).unwrap(),
                bob.shared_secret(alice.public_key()).unwrap()
            );
        }
    }

    // -------------------------------------------------------
    // 9. Small-order Ed25519 keys cannot agree on a secret
    // -------------------------------------------------------
    #[test]
    fn test_small_order_peer_rejected() {
        let kp = Ed25519KeyPair::from_seed(&[0x77; 32]).unwrap();
        // (0, -1) maps to u = 0
        assert_eq!(
            kp.shared_secret(&TORSION_SUBGROUP[4]).unwrap_err(),
            CryptoError::X25519NonContributory
        );
    }
}
