#![no_main]
use libfuzzer_sys::fuzz_target;

use ec25519_crypto::curve25519::AffinePoint;

fuzz_target!(|data: &[u8]| {
    if let Ok(p) = AffinePoint::from_bytes(data) {
        assert_eq!(&p.to_bytes()[..], data);
    }
    if let Ok(p) = AffinePoint::from_bytes_zip215(data) {
        let _ = AffinePoint::from_bytes(&p.to_bytes());
    }
});
