//! The seam between the facade and the cipher implementation.

use crypto::{AesGcm, Digest, Key, Nonce, Result, SecretBytes, Tag, hash_one_shot};

/// Cryptographic operations over inputs the facade has already validated.
///
/// Implementations must not log or otherwise retain keys, nonces or plaintext.
pub trait CryptoBackend: Send + Sync {
    /// AES-GCM encrypt. Returns the ciphertext and tag.
    fn seal(
        &self,
        key: &Key,
        nonce: &Nonce,
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<(Vec<u8>, Tag)>;

    /// AES-GCM decrypt, failing with `AuthenticationFailed` on a tag mismatch.
    fn open(
        &self,
        key: &Key,
        nonce: &Nonce,
        aad: &[u8],
        ciphertext: &[u8],
        tag: &Tag,
    ) -> Result<SecretBytes>;

    /// One-shot SHA-256 of `data`. Streaming sessions are not routed through here.
    fn digest(&self, data: &[u8]) -> Digest;
}

/// The portable implementation from the `crypto` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareBackend;

impl CryptoBackend for SoftwareBackend {
    fn seal(
        &self,
        key: &Key,
        nonce: &Nonce,
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<(Vec<u8>, Tag)> {
        AesGcm::new(key).seal(nonce, aad, plaintext)
    }

    fn open(
        &self,
        key: &Key,
        nonce: &Nonce,
        aad: &[u8],
        ciphertext: &[u8],
        tag: &Tag,
    ) -> Result<SecretBytes> {
        AesGcm::new(key).open(nonce, aad, ciphertext, tag)
    }

    fn digest(&self, data: &[u8]) -> Digest {
        hash_one_shot(data)
    }
}
