//! `CryptoModule`: the public entry points.
//!
//! Every call validates its raw inputs, converts them into typed buffers and only
//! then hands them to the backend. No cryptographic math happens here.

use crypto::{CryptoError, Digest, HashState, Key, Nonce, Result, SecretBytes, Tag};
use tracing::{debug, warn};

use crate::backend::{CryptoBackend, SoftwareBackend};
use crate::config::ModuleConfig;
use crate::module_info::{ModuleInfo, module_info};

/// Output of [`CryptoModule::encrypt`].
#[derive(Debug, Clone)]
pub struct Sealed {
    /// The nonce used; generated when the caller did not supply one.
    pub nonce: Nonce,
    pub ciphertext: Vec<u8>,
    pub tag: Tag,
}

/// Encrypt, decrypt and hash through a configurable backend.
#[derive(Debug, Clone)]
pub struct CryptoModule<B: CryptoBackend = SoftwareBackend> {
    backend: B,
    config: ModuleConfig,
}

impl CryptoModule {
    /// Software backend, default policy.
    pub fn new() -> Self {
        Self::with_config(ModuleConfig::default())
    }

    pub fn with_config(config: ModuleConfig) -> Self {
        Self::with_backend(SoftwareBackend, config)
    }
}

impl Default for CryptoModule {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: CryptoBackend> CryptoModule<B> {
    pub fn with_backend(backend: B, config: ModuleConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// AES-GCM encrypt `plaintext` under `key`.
    ///
    /// A fresh nonce is drawn from the OS when `nonce` is `None`; the one used is
    /// returned in [`Sealed::nonce`]. A caller-supplied nonce must never repeat
    /// under the same key.
    pub fn encrypt(
        &self,
        key: &[u8],
        nonce: Option<&[u8]>,
        plaintext: &[u8],
        aad: Option<&[u8]>,
    ) -> Result<Sealed> {
        let key = self.parse_key(key)?;
        self.check_message_len(plaintext.len())?;
        let nonce = match nonce {
            Some(bytes) => Nonce::from_slice(bytes)?,
            None => Nonce::generate()?,
        };
        let aad = aad.unwrap_or_default();

        debug!(
            key_bits = key.size().bits(),
            plaintext_len = plaintext.len(),
            aad_len = aad.len(),
            "encrypt"
        );

        let (ciphertext, tag) = self.backend.seal(&key, &nonce, aad, plaintext)?;
        Ok(Sealed {
            nonce,
            ciphertext,
            tag,
        })
    }

    /// Verify and decrypt. The tag is mandatory; no plaintext is returned unless it
    /// matches.
    pub fn decrypt(
        &self,
        key: &[u8],
        nonce: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: Option<&[u8]>,
    ) -> Result<SecretBytes> {
        let key = self.parse_key(key)?;
        let nonce = Nonce::from_slice(nonce)?;
        let tag = Tag::from_slice(tag)?;
        self.check_message_len(ciphertext.len())?;
        let aad = aad.unwrap_or_default();

        debug!(
            key_bits = key.size().bits(),
            ciphertext_len = ciphertext.len(),
            aad_len = aad.len(),
            "decrypt"
        );

        self.backend
            .open(&key, &nonce, aad, ciphertext, &tag)
            .inspect_err(|err| {
                if *err == CryptoError::AuthenticationFailed {
                    warn!(ciphertext_len = ciphertext.len(), "authentication failed");
                }
            })
    }

    /// SHA-256 of `data`.
    pub fn hash(&self, data: &[u8]) -> Digest {
        debug!(data_len = data.len(), "hash");
        self.backend.digest(data)
    }

    /// Start an incremental SHA-256 session.
    ///
    /// Streaming always runs on the portable engine in `crypto`; the backend only
    /// serves one-shot [`hash`](Self::hash) calls.
    pub fn hash_stream(&self) -> HashState {
        HashState::new()
    }

    pub fn module_info(&self) -> &'static ModuleInfo {
        module_info()
    }

    fn parse_key(&self, bytes: &[u8]) -> Result<Key> {
        let key = Key::from_slice(bytes)?;
        if !self.config.allows_key_size(key.size()) {
            return Err(CryptoError::InvalidKeyLength);
        }
        Ok(key)
    }

    fn check_message_len(&self, len: usize) -> Result<()> {
        if len as u64 > self.config.max_message_len {
            return Err(CryptoError::MessageTooLong);
        }
        Ok(())
    }
}
