//! SHA-512 digest used by Ed25519 and the Ristretto255 hash-to-group map.
//!
//! The compression function comes from the `sha2` crate; this module adapts
//! it to the crate's `Digest` provider trait.

use ec25519_types::CryptoError;
use sha2::Digest as _;

pub use crate::provider::{Digest, HashAlgorithm};

/// SHA-512 output size in bytes.
pub const SHA512_OUTPUT_SIZE: usize = 64;

/// SHA-512 block size in bytes.
pub const SHA512_BLOCK_SIZE: usize = 128;

/// Incremental SHA-512 context.
#[derive(Clone, Default)]
pub struct Sha512 {
    inner: sha2::Sha512,
}

impl Sha512 {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-shot SHA-512 over the concatenation of `parts`.
    pub fn digest_parts(parts: &[&[u8]]) -> [u8; SHA512_OUTPUT_SIZE] {
        let mut hasher = sha2::Sha512::new();
        for part in parts {
            hasher.update(part);
        }
        let mut out = [0u8; SHA512_OUTPUT_SIZE];
        out.copy_from_slice(&hasher.finalize());
        out
    }

    /// One-shot SHA-512.
    pub fn digest(data: &[u8]) -> [u8; SHA512_OUTPUT_SIZE] {
        Self::digest_parts(&[data])
    }
}

impl Digest for Sha512 {
    fn output_size(&self) -> usize {
        SHA512_OUTPUT_SIZE
    }

    fn block_size(&self) -> usize {
        SHA512_BLOCK_SIZE
    }

    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        self.inner.update(data);
        Ok(())
    }

    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError> {
        if out.len() < SHA512_OUTPUT_SIZE {
            return Err(CryptoError::InvalidLength {
                expected: SHA512_OUTPUT_SIZE,
                got: out.len(),
            });
        }
        let hash = self.inner.finalize_reset();
        out[..SHA512_OUTPUT_SIZE].copy_from_slice(&hash);
        Ok(())
    }

    fn reset(&mut self) {
        self.inner = sha2::Sha512::new();
    }
}

/// Factory for `Sha512` digest contexts.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha512Algorithm;

impl HashAlgorithm for Sha512Algorithm {
    fn new_digest(&self) -> Box<dyn Digest> {
        Box::new(Sha512::new())
    }
}
