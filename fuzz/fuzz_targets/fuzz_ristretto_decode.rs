#![no_main]
use libfuzzer_sys::fuzz_target;

use ec25519_crypto::ristretto255::RistrettoPoint;

fuzz_target!(|data: &[u8]| {
    if let Ok(p) = RistrettoPoint::from_bytes(data) {
        assert_eq!(&p.to_bytes()[..], data);
    }
    if data.len() == 64 {
        if let Ok(p) = RistrettoPoint::hash_to_curve(data) {
            assert!(RistrettoPoint::from_bytes(&p.to_bytes()).is_ok());
        }
    }
});
