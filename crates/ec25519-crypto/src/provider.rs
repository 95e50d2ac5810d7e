//! Trait-based provider interfaces for the algorithms in this crate.
//!
//! Callers that only need "a signer" or "a key agreement" can hold these
//! as trait objects instead of naming the concrete Ed25519/X25519 types.

use ec25519_types::CryptoError;

/// A hash / message digest algorithm.
pub trait Digest: Send + Sync {
    /// The output size in bytes.
    fn output_size(&self) -> usize;

    /// The internal block size in bytes.
    fn block_size(&self) -> usize;

    /// Feed data into the hash state.
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;

    /// Finalize the hash and write the digest to `out`.
    /// The length of `out` must be at least `output_size()`.
    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError>;

    /// Reset the hash state to process a new message.
    fn reset(&mut self);
}

/// A convenience wrapper trait for creating digest instances.
pub trait HashAlgorithm: Send + Sync {
    /// Create a new digest context.
    fn new_digest(&self) -> Box<dyn Digest>;

    /// One-shot hash computation.
    fn hash(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut ctx = self.new_digest();
        ctx.update(data)?;
        let mut out = vec![0u8; ctx.output_size()];
        ctx.finish(&mut out)?;
        Ok(out)
    }
}

/// A digital signature algorithm.
pub trait Signer: Send + Sync {
    /// Sign a message, returning the encoded signature.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// A signature verifier.
///
/// A signature that does not verify is `Ok(false)`, not an error.
pub trait Verifier: Send + Sync {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, CryptoError>;
}

/// A key agreement / key exchange protocol.
pub trait KeyAgreement: Send + Sync {
    /// Compute the shared secret from the peer's public key.
    fn compute_shared_secret(&self, peer_public_key: &[u8]) -> Result<Vec<u8>, CryptoError>;
}
