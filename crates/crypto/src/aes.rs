/// AES-128 / AES-192 / AES-256 block cipher per FIPS 197.
///
/// Key schedule expansion plus single-block encryption and decryption, used as the
/// primitive underneath GCM. The S-box is computed arithmetically (inversion in
/// GF(2^8) followed by the affine map) instead of being read from a table, and every
/// field multiplication is masked, so neither memory access patterns nor branches
/// depend on key or data bytes.
use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::buffer::Key;
use crate::constant_time::{ct_select_u8, mask_u8};
use crate::error::Result;

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// Round constants for the key schedule. Indexed by round number only.
const RCON: [u8; 11] = [
    0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36,
];

/// Expanded round keys. Up to 60 words for AES-256; wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RoundKeys {
    words: [u32; 60],
    #[zeroize(skip)]
    rounds: usize,
}

impl RoundKeys {
    /// Run the FIPS 197 key expansion for `key`.
    pub fn new(key: &Key) -> Self {
        let size = key.size();
        let nk = size.len() / 4;
        let rounds = size.rounds();
        let total_words = 4 * (rounds + 1);

        let mut words = [0u32; 60];
        for (word, chunk) in words.iter_mut().zip(key.as_bytes().chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        for i in nk..total_words {
            let mut temp = words[i - 1];
            if i % nk == 0 {
                temp = sub_word(temp.rotate_left(8)) ^ (u32::from(RCON[i / nk]) << 24);
            } else if nk > 6 && i % nk == 4 {
                temp = sub_word(temp);
            }
            words[i] = words[i - nk] ^ temp;
        }

        Self { words, rounds }
    }

    /// 10, 12 or 14.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// The expanded schedule, `4 * (rounds + 1)` words.
    pub fn words(&self) -> &[u32] {
        &self.words[..4 * (self.rounds + 1)]
    }

    #[inline]
    fn round_key(&self, round: usize) -> [u32; 4] {
        let base = round * 4;
        [
            self.words[base],
            self.words[base + 1],
            self.words[base + 2],
            self.words[base + 3],
        ]
    }
}

impl fmt::Debug for RoundKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoundKeys({} rounds, [REDACTED])", self.rounds)
    }
}

/// Expand raw key bytes (16, 24 or 32 of them) into round keys.
pub fn expand_key(key: &[u8]) -> Result<RoundKeys> {
    let key = Key::from_slice(key)?;
    Ok(RoundKeys::new(&key))
}

/// Encrypt one block in place.
pub fn encrypt_block(keys: &RoundKeys, block: &mut [u8; BLOCK_LEN]) {
    let mut state = load_state(block);

    add_round_key(&mut state, &keys.round_key(0));
    for round in 1..keys.rounds {
        sub_bytes(&mut state);
        shift_rows(&mut state);
        mix_columns(&mut state);
        add_round_key(&mut state, &keys.round_key(round));
    }
    sub_bytes(&mut state);
    shift_rows(&mut state);
    add_round_key(&mut state, &keys.round_key(keys.rounds));

    store_state(&state, block);
    state.zeroize();
}

/// Decrypt one block in place.
pub fn decrypt_block(keys: &RoundKeys, block: &mut [u8; BLOCK_LEN]) {
    let mut state = load_state(block);

    add_round_key(&mut state, &keys.round_key(keys.rounds));
    for round in (1..keys.rounds).rev() {
        inv_shift_rows(&mut state);
        inv_sub_bytes(&mut state);
        add_round_key(&mut state, &keys.round_key(round));
        inv_mix_columns(&mut state);
    }
    inv_shift_rows(&mut state);
    inv_sub_bytes(&mut state);
    add_round_key(&mut state, &keys.round_key(0));

    store_state(&state, block);
    state.zeroize();
}

// --- GF(2^8) arithmetic, branch-free ---

/// Multiply by {02} modulo x^8 + x^4 + x^3 + x + 1.
#[inline]
fn xtime(a: u8) -> u8 {
    (a << 1) ^ ct_select_u8(0x00, 0x1b, a >> 7)
}

/// Multiply two field elements. Runs all 8 iterations for every input.
#[inline]
fn gmul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    for _ in 0..8 {
        product ^= a & mask_u8(b);
        a = xtime(a);
        b >>= 1;
    }
    product
}

/// Multiplicative inverse as a^254 (so 0 maps to 0).
#[inline]
fn gf_inv(a: u8) -> u8 {
    let a2 = gmul(a, a);
    let a3 = gmul(a2, a);
    let a6 = gmul(a3, a3);
    let a12 = gmul(a6, a6);
    let a15 = gmul(a12, a3);
    let a30 = gmul(a15, a15);
    let a60 = gmul(a30, a30);
    let a120 = gmul(a60, a60);
    let a240 = gmul(a120, a120);
    let a252 = gmul(a240, a12);
    gmul(a252, a2)
}

/// Forward S-box.
#[inline]
fn sub_byte(a: u8) -> u8 {
    let b = gf_inv(a);
    b ^ b.rotate_left(1) ^ b.rotate_left(2) ^ b.rotate_left(3) ^ b.rotate_left(4) ^ 0x63
}

/// Inverse S-box.
#[inline]
fn inv_sub_byte(s: u8) -> u8 {
    gf_inv(s.rotate_left(1) ^ s.rotate_left(3) ^ s.rotate_left(6) ^ 0x05)
}

#[inline]
fn sub_word(w: u32) -> u32 {
    u32::from_be_bytes(w.to_be_bytes().map(sub_byte))
}

#[inline]
fn inv_sub_word(w: u32) -> u32 {
    u32::from_be_bytes(w.to_be_bytes().map(inv_sub_byte))
}

// --- State handling ---
//
// The state is column-major: state[c] packs rows 0..4 of column c big-endian.

#[inline]
fn load_state(block: &[u8; BLOCK_LEN]) -> [u32; 4] {
    let mut state = [0u32; 4];
    for (col, chunk) in state.iter_mut().zip(block.chunks_exact(4)) {
        *col = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    state
}

#[inline]
fn store_state(state: &[u32; 4], block: &mut [u8; BLOCK_LEN]) {
    for (col, chunk) in state.iter().zip(block.chunks_exact_mut(4)) {
        chunk.copy_from_slice(&col.to_be_bytes());
    }
}

#[inline]
fn row_byte(col: u32, row: usize) -> u8 {
    col.to_be_bytes()[row]
}

fn sub_bytes(state: &mut [u32; 4]) {
    for col in state.iter_mut() {
        *col = sub_word(*col);
    }
}

fn inv_sub_bytes(state: &mut [u32; 4]) {
    for col in state.iter_mut() {
        *col = inv_sub_word(*col);
    }
}

/// Row r moves r columns to the left.
fn shift_rows(state: &mut [u32; 4]) {
    let src = *state;
    for (c, col) in state.iter_mut().enumerate() {
        *col = u32::from_be_bytes([
            row_byte(src[c], 0),
            row_byte(src[(c + 1) % 4], 1),
            row_byte(src[(c + 2) % 4], 2),
            row_byte(src[(c + 3) % 4], 3),
        ]);
    }
}

/// Row r moves r columns to the right.
fn inv_shift_rows(state: &mut [u32; 4]) {
    let src = *state;
    for (c, col) in state.iter_mut().enumerate() {
        *col = u32::from_be_bytes([
            row_byte(src[c], 0),
            row_byte(src[(c + 3) % 4], 1),
            row_byte(src[(c + 2) % 4], 2),
            row_byte(src[(c + 1) % 4], 3),
        ]);
    }
}

/// Multiply each column by {03}x^3 + {01}x^2 + {01}x + {02}.
fn mix_columns(state: &mut [u32; 4]) {
    for col in state.iter_mut() {
        let [s0, s1, s2, s3] = col.to_be_bytes();
        // 2a ^ 3b == xtime(a ^ b) ^ b
        let r0 = xtime(s0 ^ s1) ^ s1 ^ s2 ^ s3;
        let r1 = s0 ^ xtime(s1 ^ s2) ^ s2 ^ s3;
        let r2 = s0 ^ s1 ^ xtime(s2 ^ s3) ^ s3;
        let r3 = xtime(s3 ^ s0) ^ s0 ^ s1 ^ s2;
        *col = u32::from_be_bytes([r0, r1, r2, r3]);
    }
}

/// Multiply each column by {0b}x^3 + {0d}x^2 + {09}x + {0e}.
fn inv_mix_columns(state: &mut [u32; 4]) {
    for col in state.iter_mut() {
        let [s0, s1, s2, s3] = col.to_be_bytes();
        let r0 = gmul(0x0e, s0) ^ gmul(0x0b, s1) ^ gmul(0x0d, s2) ^ gmul(0x09, s3);
        let r1 = gmul(0x09, s0) ^ gmul(0x0e, s1) ^ gmul(0x0b, s2) ^ gmul(0x0d, s3);
        let r2 = gmul(0x0d, s0) ^ gmul(0x09, s1) ^ gmul(0x0e, s2) ^ gmul(0x0b, s3);
        let r3 = gmul(0x0b, s0) ^ gmul(0x0d, s1) ^ gmul(0x09, s2) ^ gmul(0x0e, s3);
        *col = u32::from_be_bytes([r0, r1, r2, r3]);
    }
}

#[inline]
fn add_round_key(state: &mut [u32; 4], rk: &[u32; 4]) {
    for (col, k) in state.iter_mut().zip(rk) {
        *col ^= k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CryptoError;

    fn block(s: &str) -> [u8; BLOCK_LEN] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    fn encrypt_hex(key: &str, pt: &str) -> String {
        let keys = expand_key(&hex::decode(key).unwrap()).unwrap();
        let mut b = block(pt);
        encrypt_block(&keys, &mut b);
        hex::encode(b)
    }

    fn decrypt_hex(key: &str, ct: &str) -> String {
        let keys = expand_key(&hex::decode(key).unwrap()).unwrap();
        let mut b = block(ct);
        decrypt_block(&keys, &mut b);
        hex::encode(b)
    }

    #[test]
    fn test_sbox_known_values() {
        assert_eq!(sub_byte(0x00), 0x63);
        assert_eq!(sub_byte(0x01), 0x7c);
        assert_eq!(sub_byte(0x53), 0xed);
        assert_eq!(sub_byte(0xff), 0x16);
        assert_eq!(inv_sub_byte(0x63), 0x00);
        assert_eq!(inv_sub_byte(0xed), 0x53);
    }

    #[test]
    fn test_sbox_is_a_permutation() {
        let mut seen = [false; 256];
        for x in 0..=255u8 {
            let s = sub_byte(x);
            assert!(!seen[s as usize], "duplicate S-box output {s:#04x}");
            seen[s as usize] = true;
            assert_eq!(inv_sub_byte(s), x);
        }
    }

    #[test]
    fn test_xtime() {
        assert_eq!(xtime(0x57), 0xae);
        assert_eq!(xtime(0xae), 0x47);
        assert_eq!(xtime(0x47), 0x8e);
        assert_eq!(xtime(0x8e), 0x07);
    }

    #[test]
    fn test_gmul_and_inverse() {
        // FIPS 197 §4.2: {57} • {83} = {c1}
        assert_eq!(gmul(0x57, 0x83), 0xc1);
        assert_eq!(gf_inv(0), 0);
        for x in 1..=255u8 {
            assert_eq!(gmul(x, gf_inv(x)), 1);
        }
    }

    // FIPS 197 Appendix C
    #[test]
    fn test_fips197_appendix_c() {
        let pt = "00112233445566778899aabbccddeeff";
        let cases = [
            ("000102030405060708090a0b0c0d0e0f", "69c4e0d86a7b0430d8cdb78070b4c55a"),
            (
                "000102030405060708090a0b0c0d0e0f1011121314151617",
                "dda97ca4864cdfe06eaf70a0ec0d7191",
            ),
            (
                "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
                "8ea2b7ca516745bfeafc49904b496089",
            ),
        ];
        for (key, ct) in cases {
            assert_eq!(encrypt_hex(key, pt), ct);
            assert_eq!(decrypt_hex(key, ct), pt);
        }
    }

    // FIPS 197 Appendix B
    #[test]
    fn test_aes128_appendix_b() {
        let key = "2b7e151628aed2a6abf7158809cf4f3c";
        assert_eq!(
            encrypt_hex(key, "3243f6a8885a308d313198a2e0370734"),
            "3925841d02dc09fbdc118597196a0b32"
        );
        assert_eq!(
            decrypt_hex(key, "3925841d02dc09fbdc118597196a0b32"),
            "3243f6a8885a308d313198a2e0370734"
        );
    }

    // NIST SP 800-38A F.1.1, F.1.3, F.1.5 (ECB)
    #[test]
    fn test_sp800_38a_ecb() {
        let aes128 = "2b7e151628aed2a6abf7158809cf4f3c";
        assert_eq!(
            encrypt_hex(aes128, "6bc1bee22e409f96e93d7e117393172a"),
            "3ad77bb40d7a3660a89ecaf32466ef97"
        );
        assert_eq!(
            encrypt_hex(aes128, "ae2d8a571e03ac9c9eb76fac45af8e51"),
            "f5d3d58503b9699de785895a96fdbaaf"
        );
        assert_eq!(
            encrypt_hex(aes128, "30c81c46a35ce411e5fbc1191a0a52ef"),
            "43b1cd7f598ece23881b00e3ed030688"
        );
        assert_eq!(
            encrypt_hex(aes128, "f69f2445df4f9b17ad2b417be66c3710"),
            "7b0c785e27e8ad3f8223207104725dd4"
        );

        let aes192 = "8e73b0f7da0e6452c810f32b809079e562f8ead2522c6b7b";
        assert_eq!(
            encrypt_hex(aes192, "6bc1bee22e409f96e93d7e117393172a"),
            "bd334f1d6e45f25ff712a214571fa5cc"
        );

        let aes256 = "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4";
        assert_eq!(
            encrypt_hex(aes256, "6bc1bee22e409f96e93d7e117393172a"),
            "f3eed1bdb5d2a03c064b5a7e3db181f8"
        );
        assert_eq!(
            encrypt_hex(aes256, "ae2d8a571e03ac9c9eb76fac45af8e51"),
            "591ccb10d410ed26dc5ba74a31362870"
        );
        assert_eq!(
            decrypt_hex(aes256, "f3eed1bdb5d2a03c064b5a7e3db181f8"),
            "6bc1bee22e409f96e93d7e117393172a"
        );
    }

    #[test]
    fn test_key_schedule_aes128() {
        let keys = expand_key(&hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap()).unwrap();
        assert_eq!(keys.rounds(), 10);
        assert_eq!(keys.words().len(), 44);
        assert_eq!(&keys.words()[..4], &[0x2b7e1516, 0x28aed2a6, 0xabf71588, 0x09cf4f3c]);
        // FIPS 197 A.1: w[43]
        assert_eq!(keys.words()[43], 0xb6630ca6);
    }

    #[test]
    fn test_round_counts() {
        assert_eq!(expand_key(&[0u8; 16]).unwrap().rounds(), 10);
        assert_eq!(expand_key(&[0u8; 24]).unwrap().rounds(), 12);
        assert_eq!(expand_key(&[0u8; 32]).unwrap().rounds(), 14);
        assert_eq!(expand_key(&[0u8; 24]).unwrap().words().len(), 52);
    }

    #[test]
    fn test_key_schedule_is_deterministic() {
        let key: Vec<u8> = (0u8..32).map(|b| b.wrapping_mul(37)).collect();
        let first = expand_key(&key).unwrap();
        for _ in 0..5 {
            assert_eq!(expand_key(&key).unwrap().words(), first.words());
        }
    }

    #[test]
    fn test_invalid_key_length() {
        for len in [0, 15, 17, 23, 25, 31, 33] {
            assert_eq!(
                expand_key(&vec![0u8; len]).unwrap_err(),
                CryptoError::InvalidKeyLength
            );
        }
    }

    #[test]
    fn test_roundtrip_all_sizes() {
        let original = *b"test block data!";
        for len in [16, 24, 32] {
            let key: Vec<u8> = (0..len as u8).collect();
            let keys = expand_key(&key).unwrap();
            let mut b = original;
            encrypt_block(&keys, &mut b);
            assert_ne!(b, original);
            decrypt_block(&keys, &mut b);
            assert_eq!(b, original);
        }
    }

    #[test]
    fn test_debug_redacted() {
        let keys = expand_key(&[0x11u8; 16]).unwrap();
        assert_eq!(format!("{keys:?}"), "RoundKeys(10 rounds, [REDACTED])");
    }
}
