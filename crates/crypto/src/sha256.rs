/// SHA-256 per FIPS 180-4.
///
/// Three entry points share one compression function:
///
/// - [`hash_one_shot`] for a complete message,
/// - [`Sha256`], the incremental engine whose `finalize` consumes it,
/// - [`HashState`], a session handle that reports [`CryptoError::AlreadyFinalized`]
///   on misuse instead of relying on move semantics.
use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, Result};

/// Round constants: fractional parts of the cube roots of the first 64 primes.
const K: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// Initial hash value: fractional parts of the square roots of the first 8 primes.
const H0: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// Block size in bytes.
pub const BLOCK_LEN: usize = 64;
/// Digest size in bytes.
pub const DIGEST_LEN: usize = 32;

/// A SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<Digest> for [u8; DIGEST_LEN] {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::LowerHex for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

/// Incremental SHA-256. Buffered input is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Sha256 {
    state: [u32; 8],
    buf: [u8; BLOCK_LEN],
    buf_len: usize,
    /// Total bytes absorbed; the padded length field is this times 8, mod 2^64.
    total_len: u64,
}

impl Default for Sha256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha256 {
    pub fn new() -> Self {
        Self {
            state: H0,
            buf: [0u8; BLOCK_LEN],
            buf_len: 0,
            total_len: 0,
        }
    }

    /// Absorb `data`. May be called any number of times with any chunk size.
    pub fn update(&mut self, mut data: &[u8]) {
        self.total_len = self.total_len.wrapping_add(data.len() as u64);

        if self.buf_len > 0 {
            let take = data.len().min(BLOCK_LEN - self.buf_len);
            self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
            self.buf_len += take;
            data = &data[take..];

            if self.buf_len < BLOCK_LEN {
                return;
            }
            compress(&mut self.state, &self.buf);
            self.buf_len = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_LEN);
        for block in &mut blocks {
            compress(&mut self.state, block);
        }

        let rest = blocks.remainder();
        self.buf[..rest.len()].copy_from_slice(rest);
        self.buf_len = rest.len();
    }

    /// Pad, process the final block(s) and return the digest.
    pub fn finalize(mut self) -> Digest {
        let bit_len = self.total_len.wrapping_mul(8);

        self.buf[self.buf_len] = 0x80;
        self.buf[self.buf_len + 1..].fill(0);

        // No room left for the 64-bit length: flush and start an all-zero block.
        if self.buf_len + 1 > BLOCK_LEN - 8 {
            compress(&mut self.state, &self.buf);
            self.buf.fill(0);
        }

        self.buf[BLOCK_LEN - 8..].copy_from_slice(&bit_len.to_be_bytes());
        compress(&mut self.state, &self.buf);

        let mut out = [0u8; DIGEST_LEN];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        Digest(out)
    }
}

/// Hash a complete message.
pub fn hash_one_shot(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize()
}

/// A streaming hash session: `new` → `update`* → `finalize`, exactly once.
///
/// Exclusively owned by its session; clone it to fork a pre-finalize state.
#[derive(Clone)]
pub struct HashState {
    engine: Option<Sha256>,
}

impl Default for HashState {
    fn default() -> Self {
        Self::new()
    }
}

impl HashState {
    pub fn new() -> Self {
        Self {
            engine: Some(Sha256::new()),
        }
    }

    pub fn update(&mut self, chunk: &[u8]) -> Result<()> {
        let engine = self.engine.as_mut().ok_or(CryptoError::AlreadyFinalized)?;
        engine.update(chunk);
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<Digest> {
        let engine = self.engine.take().ok_or(CryptoError::AlreadyFinalized)?;
        Ok(engine.finalize())
    }

    pub fn is_finalized(&self) -> bool {
        self.engine.is_none()
    }
}

impl fmt::Debug for HashState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashState")
            .field("finalized", &self.is_finalized())
            .finish_non_exhaustive()
    }
}

// --- FIPS 180-4 §4.1.2 functions ---

#[inline(always)]
fn ch(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (!x & z)
}

#[inline(always)]
fn maj(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (x & z) ^ (y & z)
}

#[inline(always)]
fn big_sigma0(x: u32) -> u32 {
    x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

#[inline(always)]
fn big_sigma1(x: u32) -> u32 {
    x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

#[inline(always)]
fn small_sigma0(x: u32) -> u32 {
    x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

#[inline(always)]
fn small_sigma1(x: u32) -> u32 {
    x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}

/// Process one 64-byte block into `state`.
fn compress(state: &mut [u32; 8], block: &[u8]) {
    debug_assert_eq!(block.len(), BLOCK_LEN);

    let mut w = [0u32; 64];
    for (word, chunk) in w.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    for t in 16..64 {
        w[t] = small_sigma1(w[t - 2])
            .wrapping_add(w[t - 7])
            .wrapping_add(small_sigma0(w[t - 15]))
            .wrapping_add(w[t - 16]);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;
    for t in 0..64 {
        let t1 = h
            .wrapping_add(big_sigma1(e))
            .wrapping_add(ch(e, f, g))
            .wrapping_add(K[t])
            .wrapping_add(w[t]);
        let t2 = big_sigma0(a).wrapping_add(maj(a, b, c));
        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    for (s, v) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *s = s.wrapping_add(v);
    }
    w.zeroize();
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_string() {
        assert_eq!(
            hash_one_shot(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_abc() {
        assert_eq!(
            hash_one_shot(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_two_block_message() {
        assert_eq!(
            hash_one_shot(b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq").to_hex(),
            "248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1"
        );
    }

    #[test]
    fn test_896_bit_message() {
        let digest = hash_one_shot(
            b"abcdefghbcdefghicdefghijdefghijkefghijklfghijklmghijklmnhijklmnoijklmnopjklmnopqklmnopqrlmnopqrsmnopqrstnopqrstu",
        );
        assert_eq!(
            digest.to_hex(),
            "cf5b16a778af8380036ce59e7b0492370b249b11e8f07a51afac45037afee9d1"
        );
    }

    #[test]
    fn test_one_million_a() {
        let mut state = HashState::new();
        let chunk = [b'a'; 1000];
        for _ in 0..1000 {
            state.update(&chunk).unwrap();
        }
        assert_eq!(
            state.finalize().unwrap().to_hex(),
            "cdc76e5c9914fb9281a1c7e284d73e67f1809a48a497200e046d39ccc7112cd0"
        );
    }

    #[test]
    fn test_padding_boundaries() {
        // 55 bytes fit the length in one block, 56 and 64 spill into a second.
        for len in [55usize, 56, 63, 64, 65, 119, 120] {
            let data = vec![0x61u8; len];
            let mut hasher = Sha256::new();
            for byte in &data {
                hasher.update(std::slice::from_ref(byte));
            }
            assert_eq!(hasher.finalize(), hash_one_shot(&data), "len {len}");
        }
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let data = b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq";
        let mut state = HashState::new();
        state.update(&data[..10]).unwrap();
        state.update(&[]).unwrap();
        state.update(&data[10..30]).unwrap();
        state.update(&data[30..]).unwrap();
        assert_eq!(state.finalize().unwrap(), hash_one_shot(data));
    }

    #[test]
    fn test_finalize_without_update_is_empty_digest() {
        let mut state = HashState::new();
        assert_eq!(state.finalize().unwrap(), hash_one_shot(b""));
    }

    #[test]
    fn test_already_finalized() {
        let mut state = HashState::new();
        state.update(b"abc").unwrap();
        state.finalize().unwrap();
        assert!(state.is_finalized());
        assert_eq!(state.finalize(), Err(CryptoError::AlreadyFinalized));
        assert_eq!(state.update(b"more"), Err(CryptoError::AlreadyFinalized));
    }

    #[test]
    fn test_default_state_is_fresh() {
        let mut state = HashState::default();
        assert!(!state.is_finalized());
        state.update(b"abc").unwrap();
        assert_eq!(state.finalize().unwrap(), hash_one_shot(b"abc"));
    }

    #[test]
    fn test_clone_forks_session() {
        let mut state = HashState::new();
        state.update(b"ab").unwrap();
        let mut fork = state.clone();
        state.update(b"c").unwrap();
        fork.update(b"d").unwrap();
        assert_eq!(state.finalize().unwrap(), hash_one_shot(b"abc"));
        assert_eq!(fork.finalize().unwrap(), hash_one_shot(b"abd"));
    }

    #[test]
    fn test_digest_formatting() {
        let digest = hash_one_shot(b"abc");
        assert_eq!(format!("{digest}"), digest.to_hex());
        assert_eq!(format!("{digest:x}"), digest.to_hex());
        assert!(format!("{digest:?}").starts_with("Digest(ba7816bf"));
        let raw: [u8; DIGEST_LEN] = digest.into();
        assert_eq!(&raw, digest.as_bytes());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_any_chunking_matches_one_shot(
            data in prop::collection::vec(any::<u8>(), 0..600),
            cuts in prop::collection::vec(any::<usize>(), 0..8),
        ) {
            let mut points: Vec<usize> = cuts.iter().map(|c| c % (data.len() + 1)).collect();
            points.sort_unstable();

            let mut state = HashState::new();
            let mut start = 0;
            for point in points {
                state.update(&data[start..point]).unwrap();
                start = point;
            }
            state.update(&data[start..]).unwrap();

            prop_assert_eq!(state.finalize().unwrap(), hash_one_shot(&data));
        }
    }
}
