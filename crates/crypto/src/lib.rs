/// Constant-time cryptographic primitives.
///
/// All implementations are from scratch. The dependencies only cover secret hygiene
/// (zeroing, constant-time comparison) and the OS random source.
///
/// # Modules
///
/// - [`sha256`]: SHA-256 hash function (FIPS 180-4), one-shot and streaming
/// - [`aes`]: AES-128/192/256 block cipher (FIPS 197) without lookup tables
/// - [`gcm`]: AES-GCM authenticated encryption (NIST SP 800-38D)
/// - [`buffer`]: zero-on-drop key, nonce, tag and plaintext buffers
/// - [`constant_time`]: comparison and masking helpers
/// - [`error`]: the shared error type

pub mod aes;
pub mod buffer;
pub mod constant_time;
pub mod error;
pub mod gcm;
pub mod sha256;

// Re-export the most commonly used items at the crate root for convenience.

pub use aes::{RoundKeys, decrypt_block, encrypt_block, expand_key};
pub use buffer::{BufferRole, Key, KeySize, NONCE_LEN, Nonce, SecretBytes, TAG_LEN, Tag};
pub use constant_time::ct_eq;
pub use error::{CryptoError, Result};
pub use gcm::{AesGcm, MAX_AAD_LEN, MAX_PLAINTEXT_LEN};
pub use sha256::{DIGEST_LEN, Digest, HashState, Sha256, hash_one_shot};
