/// Errors produced by the cryptographic primitives.
///
/// Every variant is a bare tag: no lengths, offsets, key bytes or partial plaintext
/// are ever carried, so an authentication failure looks exactly like any other
/// failure to whoever receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// Key is not 16, 24 or 32 bytes (or not permitted by policy).
    #[error("invalid key length")]
    InvalidKeyLength,

    /// Nonce is not 12 bytes.
    #[error("invalid nonce length")]
    InvalidNonceLength,

    /// Tag is not 16 bytes.
    #[error("invalid tag length")]
    InvalidTagLength,

    /// Tag mismatch on decrypt. No plaintext is released.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// A streaming hash was used after it produced its digest.
    #[error("hash state already finalized")]
    AlreadyFinalized,

    /// An output buffer could not be reserved.
    #[error("allocation failure")]
    AllocationFailure,

    /// Plaintext or associated data exceeds the GCM (or configured) limit.
    #[error("message too long")]
    MessageTooLong,

    /// The operating system random source could not produce a nonce.
    #[error("random source unavailable")]
    RandomSourceUnavailable,
}

/// Result alias for the primitives.
pub type Result<T> = std::result::Result<T, CryptoError>;
