#![no_main]
use libfuzzer_sys::fuzz_target;

use ec25519_crypto::ed25519;

fuzz_target!(|data: &[u8]| {
    if data.len() < 96 {
        return;
    }
    let (pk, rest) = data.split_at(32);
    let (sig, msg) = rest.split_at(64);
    let _ = ed25519::verify(sig, msg, pk);
});
