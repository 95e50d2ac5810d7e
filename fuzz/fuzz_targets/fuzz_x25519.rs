#![no_main]
use libfuzzer_sys::fuzz_target;

use ec25519_crypto::x25519;

fuzz_target!(|data: &[u8]| {
    if data.len() != 64 {
        return;
    }
    let _ = x25519::scalar_mult(&data[..32], &data[32..]);
});
