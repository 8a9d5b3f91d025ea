/// AES-GCM authenticated encryption per NIST SP 800-38D.
///
/// Confidentiality comes from AES in counter mode starting at inc32(J0); integrity
/// from GHASH, a polynomial hash over GF(2^128) keyed with H = E_K(0^128), whose
/// output is masked with E_K(J0). Only 96-bit nonces are accepted, so
/// J0 = nonce || 0^31 || 1.
///
/// Nonce uniqueness per key is a precondition. It cannot be checked here without
/// keeping state across calls; reusing a nonce leaks the XOR of the plaintexts and
/// allows tag forgery.
use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::aes::{BLOCK_LEN, RoundKeys, encrypt_block};
use crate::buffer::{Key, Nonce, SecretBytes, Tag, try_alloc};
use crate::constant_time::mask_u128;
use crate::error::{CryptoError, Result};

/// Longest plaintext a single (key, nonce) pair may encrypt: 2^39 - 256 bits.
pub const MAX_PLAINTEXT_LEN: u64 = (1 << 36) - 32;
/// Longest associated data: 2^64 - 1 bits, rounded down to whole bytes.
pub const MAX_AAD_LEN: u64 = (1 << 61) - 1;

/// GHASH reduction constant R = 11100001 || 0^120.
const R: u128 = 0xe1 << 120;

/// An AES-GCM key context. Holds the round keys and the GHASH key, both wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AesGcm {
    keys: RoundKeys,
    h: u128,
}

impl AesGcm {
    pub fn new(key: &Key) -> Self {
        let keys = RoundKeys::new(key);
        let mut zero = Zeroizing::new([0u8; BLOCK_LEN]);
        encrypt_block(&keys, &mut zero);
        let h = u128::from_be_bytes(*zero);
        Self { keys, h }
    }

    /// Build from raw key bytes (16, 24 or 32).
    pub fn from_slice(key: &[u8]) -> Result<Self> {
        Ok(Self::new(&Key::from_slice(key)?))
    }

    /// Encrypt and authenticate. Returns the ciphertext (same length as the
    /// plaintext) and the 16-byte tag.
    pub fn seal(&self, nonce: &Nonce, aad: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, Tag)> {
        check_limits(aad, plaintext)?;

        let mut ciphertext = try_alloc(plaintext.len())?;
        ciphertext.resize(plaintext.len(), 0);

        let mut op = GcmOperation::begin(self, nonce);
        op.authenticate(aad);
        op.seal(plaintext, &mut ciphertext);
        let tag = op.finalize();

        Ok((ciphertext, tag))
    }

    /// Verify and decrypt.
    ///
    /// Plaintext is only returned when the tag matches. On mismatch the decrypted
    /// buffer is wiped before `AuthenticationFailed` is returned.
    pub fn open(
        &self,
        nonce: &Nonce,
        aad: &[u8],
        ciphertext: &[u8],
        tag: &Tag,
    ) -> Result<SecretBytes> {
        check_limits(aad, ciphertext)?;

        let mut plaintext = SecretBytes::try_zeroed(ciphertext.len())?;

        let mut op = GcmOperation::begin(self, nonce);
        op.authenticate(aad);
        op.open(ciphertext, plaintext.as_mut_slice());
        let expected = op.finalize();

        if bool::from(expected.ct_eq(tag)) {
            Ok(plaintext)
        } else {
            // SecretBytes zeroes itself on drop.
            drop(plaintext);
            Err(CryptoError::AuthenticationFailed)
        }
    }
}

impl fmt::Debug for AesGcm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcm")
            .field("rounds", &self.keys.rounds())
            .finish_non_exhaustive()
    }
}

fn check_limits(aad: &[u8], data: &[u8]) -> Result<()> {
    if data.len() as u64 > MAX_PLAINTEXT_LEN || aad.len() as u64 > MAX_AAD_LEN {
        return Err(CryptoError::MessageTooLong);
    }
    Ok(())
}

/// Where a single GCM operation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    Authenticated,
    Processed,
}

/// One encryption or decryption: `begin` → `authenticate` → `seal`/`open` → `finalize`.
///
/// `authenticate` may be skipped for empty AAD. Counter, J0 and the GHASH
/// accumulator are wiped when the operation is dropped.
struct GcmOperation<'a> {
    gcm: &'a AesGcm,
    phase: Phase,
    j0: [u8; BLOCK_LEN],
    counter: [u8; BLOCK_LEN],
    ghash: u128,
    aad_len: u64,
    data_len: u64,
}

impl<'a> GcmOperation<'a> {
    fn begin(gcm: &'a AesGcm, nonce: &Nonce) -> Self {
        let mut j0 = [0u8; BLOCK_LEN];
        j0[..nonce.as_bytes().len()].copy_from_slice(nonce.as_bytes());
        j0[BLOCK_LEN - 1] = 1;
        Self {
            gcm,
            phase: Phase::Init,
            j0,
            counter: j0,
            ghash: 0,
            aad_len: 0,
            data_len: 0,
        }
    }

    fn authenticate(&mut self, aad: &[u8]) {
        debug_assert_eq!(self.phase, Phase::Init);
        self.absorb(aad);
        self.aad_len = aad.len() as u64;
        self.phase = Phase::Authenticated;
    }

    /// Encrypt `input` into `output`, hashing the ciphertext.
    fn seal(&mut self, input: &[u8], output: &mut [u8]) {
        debug_assert_ne!(self.phase, Phase::Processed);
        self.apply_keystream(input, output);
        self.absorb(output);
        self.data_len = input.len() as u64;
        self.phase = Phase::Processed;
    }

    /// Hash `input` as ciphertext and decrypt it into `output`.
    fn open(&mut self, input: &[u8], output: &mut [u8]) {
        debug_assert_ne!(self.phase, Phase::Processed);
        self.absorb(input);
        self.apply_keystream(input, output);
        self.data_len = input.len() as u64;
        self.phase = Phase::Processed;
    }

    /// Fold in the length block and mask with E_K(J0).
    fn finalize(mut self) -> Tag {
        let lengths = (u128::from(self.aad_len * 8) << 64) | u128::from(self.data_len * 8);
        let s = gf_mul(self.ghash ^ lengths, self.gcm.h);

        let mut mask = Zeroizing::new(self.j0);
        encrypt_block(&self.gcm.keys, &mut mask);

        self.ghash = 0;
        Tag::from_bytes((s ^ u128::from_be_bytes(*mask)).to_be_bytes())
    }

    /// GHASH `data`, zero-padding the final partial block.
    fn absorb(&mut self, data: &[u8]) {
        for chunk in data.chunks(BLOCK_LEN) {
            let mut block = [0u8; BLOCK_LEN];
            block[..chunk.len()].copy_from_slice(chunk);
            self.ghash = gf_mul(self.ghash ^ u128::from_be_bytes(block), self.gcm.h);
        }
    }

    /// GCTR: XOR `input` with E_K(inc32(counter)), E_K(inc32^2(counter)), ...
    fn apply_keystream(&mut self, input: &[u8], output: &mut [u8]) {
        debug_assert_eq!(input.len(), output.len());
        let mut keystream = Zeroizing::new([0u8; BLOCK_LEN]);
        for (src, dst) in input.chunks(BLOCK_LEN).zip(output.chunks_mut(BLOCK_LEN)) {
            inc32(&mut self.counter);
            *keystream = self.counter;
            encrypt_block(&self.gcm.keys, &mut keystream);
            for ((d, s), k) in dst.iter_mut().zip(src).zip(keystream.iter()) {
                *d = s ^ k;
            }
        }
    }
}

impl Drop for GcmOperation<'_> {
    fn drop(&mut self) {
        self.j0.zeroize();
        self.counter.zeroize();
        self.ghash.zeroize();
    }
}

/// Increment the low 32 bits of the counter block, big-endian, wrapping.
fn inc32(counter: &mut [u8; BLOCK_LEN]) {
    let mut low = [0u8; 4];
    low.copy_from_slice(&counter[12..]);
    let next = u32::from_be_bytes(low).wrapping_add(1);
    counter[12..].copy_from_slice(&next.to_be_bytes());
}

/// Multiply in GF(2^128) with the GCM bit order (bit 0 is the MSB of byte 0).
///
/// All 128 iterations run for every input and the conditional steps are masks.
fn gf_mul(x: u128, y: u128) -> u128 {
    let mut z = 0u128;
    let mut v = y;
    for i in 0..128 {
        z ^= v & mask_u128(x >> (127 - i));
        v = (v >> 1) ^ (R & mask_u128(v));
    }
    z
}
