/// Secret-bearing byte buffers.
///
/// Keys, nonces, tags and recovered plaintext live in the types below. Each one is
/// overwritten with zeros when it goes out of scope, prints only its role and length
/// through `Debug`, and compares in constant time.
use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{CryptoError, Result};

/// Nonce length for GCM.
pub const NONCE_LEN: usize = 12;
/// Authentication tag length for GCM.
pub const TAG_LEN: usize = 16;
/// Largest supported key (AES-256).
pub const MAX_KEY_LEN: usize = 32;

/// What a buffer is used for. Each role has a fixed set of legal lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRole {
    Key,
    Nonce,
    Tag,
}

impl BufferRole {
    /// Check `len` against the role, failing with the role's length error.
    pub fn validate_len(self, len: usize) -> Result<()> {
        match self {
            Self::Key => KeySize::from_len(len).map(|_| ()),
            Self::Nonce if len == NONCE_LEN => Ok(()),
            Self::Nonce => Err(CryptoError::InvalidNonceLength),
            Self::Tag if len == TAG_LEN => Ok(()),
            Self::Tag => Err(CryptoError::InvalidTagLength),
        }
    }
}

/// AES key sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySize {
    Aes128,
    Aes192,
    Aes256,
}

impl KeySize {
    /// Map a byte length to a key size.
    pub fn from_len(len: usize) -> Result<Self> {
        match len {
            16 => Ok(Self::Aes128),
            24 => Ok(Self::Aes192),
            32 => Ok(Self::Aes256),
            _ => Err(CryptoError::InvalidKeyLength),
        }
    }

    pub fn len(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }

    pub fn bits(self) -> usize {
        self.len() * 8
    }

    /// Number of AES rounds for this key size.
    pub fn rounds(self) -> usize {
        match self {
            Self::Aes128 => 10,
            Self::Aes192 => 12,
            Self::Aes256 => 14,
        }
    }
}

/// An AES key. Immutable after construction and wiped on drop.
///
/// The bytes are cleared only on drop, so `size` always describes them.
#[derive(Clone)]
pub struct Key {
    bytes: [u8; MAX_KEY_LEN],
    size: KeySize,
}

impl Key {
    /// Copy a key out of `bytes`, which must be 16, 24 or 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let size = KeySize::from_len(bytes.len())?;
        let mut key = Self {
            bytes: [0u8; MAX_KEY_LEN],
            size,
        };
        key.bytes[..bytes.len()].copy_from_slice(bytes);
        Ok(key)
    }

    pub fn size(&self) -> KeySize {
        self.size
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.size.len()]
    }

    fn wipe(&mut self) {
        self.bytes.zeroize();
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl ZeroizeOnDrop for Key {}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({} bits, [REDACTED])", self.size.bits())
    }
}

/// A 96-bit GCM nonce.
///
/// Must never repeat under the same key. Reuse is not detectable here; callers
/// either supply fresh values or let [`Nonce::generate`] draw one from the OS.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        BufferRole::Nonce.validate_len(bytes.len())?;
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(bytes);
        Ok(Self(nonce))
    }

    pub fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Draw a fresh nonce from the operating system CSPRNG.
    pub fn generate() -> Result<Self> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|_| CryptoError::RandomSourceUnavailable)?;
        Ok(Self(nonce))
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nonce([REDACTED])")
    }
}

/// A 128-bit authentication tag. Equality is constant-time.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Tag([u8; TAG_LEN]);

impl Tag {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        BufferRole::Tag.validate_len(bytes.len())?;
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(bytes);
        Ok(Self(tag))
    }

    pub fn from_bytes(bytes: [u8; TAG_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TAG_LEN] {
        &self.0
    }
}

impl ConstantTimeEq for Tag {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Tag {}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", hex::encode(self.0))
    }
}

/// A growable byte buffer for secret data (recovered plaintext), wiped on drop.
#[derive(Clone, Default)]
pub struct SecretBytes {
    inner: Zeroizing<Vec<u8>>,
}

impl SecretBytes {
    /// Allocate `len` zero bytes, reporting exhaustion instead of aborting.
    pub fn try_zeroed(len: usize) -> Result<Self> {
        let mut inner = try_alloc(len)?;
        inner.resize(len, 0);
        Ok(Self {
            inner: Zeroizing::new(inner),
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.inner
    }

    /// Move the bytes out. The returned vector is no longer wiped automatically.
    pub fn into_vec(mut self) -> Vec<u8> {
        std::mem::take(&mut *self.inner)
    }
}

impl From<Vec<u8>> for SecretBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            inner: Zeroizing::new(bytes),
        }
    }
}

impl AsRef<[u8]> for SecretBytes {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl PartialEq for SecretBytes {
    fn eq(&self, other: &Self) -> bool {
        crate::constant_time::ct_eq(&self.inner, &other.inner)
    }
}

impl Eq for SecretBytes {}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes([REDACTED; {} bytes])", self.len())
    }
}

/// Reserve exactly `len` bytes of capacity, mapping failure to `AllocationFailure`.
pub(crate) fn try_alloc(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| CryptoError::AllocationFailure)?;
    Ok(buf)
}
