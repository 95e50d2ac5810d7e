/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    // General errors
    #[error("invalid argument")]
    InvalidArg,
    #[error("invalid key")]
    InvalidKey,
    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },
    #[error("invalid hash length: expected {min}..={max} bytes, got {got}")]
    InvalidHashLength { min: usize, max: usize, got: usize },
    #[error("random generation failed")]
    RandGenFail,

    // BigNum errors
    #[error("big number: division by zero")]
    BnDivisionByZero,
    #[error("big number: no modular inverse")]
    BnNoInverse,

    // Field and scalar errors
    #[error("field: inversion of zero")]
    FieldInvertZero,
    #[error("scalar out of range")]
    ScalarOutOfRange,

    // Point errors
    #[error("ecc: point not on curve")]
    EccPointNotOnCurve,
    #[error("ecc: non-canonical encoding")]
    NonCanonicalEncoding,
    #[error("ecc: invalid point encoding")]
    InvalidPointEncoding,
    #[error("ecc: invalid z coordinate after normalization")]
    InvalidZCoordinate,
    #[error("ecc: precomputation window {0} does not divide 256")]
    InvalidWindowSize(usize),

    // Ristretto255 errors
    #[error("ristretto255: invalid encoding")]
    RistrettoInvalidEncoding,

    // Ed25519 errors
    #[error("ed25519: invalid signature encoding")]
    InvalidSignature,

    // X25519 errors
    #[error("x25519: shared secret is all zero")]
    X25519NonContributory,
}

impl CryptoError {
    /// Returns true for failures caused by malformed encoded input.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            CryptoError::InvalidLength { .. }
                | CryptoError::NonCanonicalEncoding
                | CryptoError::EccPointNotOnCurve
                | CryptoError::InvalidPointEncoding
                | CryptoError::RistrettoInvalidEncoding
                | CryptoError::InvalidSignature
        )
    }
}
