/// Constant-time helpers shared by the cipher core and the buffer types.
///
/// Nothing in here branches on, or indexes memory with, the values it is given.
use subtle::ConstantTimeEq;

/// Constant-time equality of two byte slices.
///
/// Slices of different length compare unequal; the length itself is treated as
/// public. For equal lengths every byte is examined regardless of where the first
/// difference sits.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Expand the low bit of `bit` into a full byte mask: `0x00` or `0xff`.
#[inline(always)]
pub fn mask_u8(bit: u8) -> u8 {
    0u8.wrapping_sub(bit & 1)
}

/// Expand the low bit of `bit` into a full 128-bit mask.
#[inline(always)]
pub fn mask_u128(bit: u128) -> u128 {
    0u128.wrapping_sub(bit & 1)
}

/// Select `a` when `choice == 0` and `b` when `choice == 1`, without branching.
#[inline(always)]
pub fn ct_select_u8(a: u8, b: u8, choice: u8) -> u8 {
    a ^ (mask_u8(choice) & (a ^ b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ct_eq_equal() {
        assert!(ct_eq(&[1, 2, 3, 4, 5], &[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_ct_eq_last_byte_differs() {
        assert!(!ct_eq(&[1, 2, 3, 4, 5], &[1, 2, 3, 4, 6]));
    }

    #[test]
    fn test_ct_eq_first_byte_differs() {
        assert!(!ct_eq(&[0, 2, 3, 4, 5], &[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_ct_eq_different_lengths() {
        assert!(!ct_eq(&[1, 2, 3], &[1, 2, 3, 4]));
    }

    #[test]
    fn test_ct_eq_empty() {
        assert!(ct_eq(&[], &[]));
    }

    #[test]
    fn test_masks() {
        assert_eq!(mask_u8(0), 0x00);
        assert_eq!(mask_u8(1), 0xff);
        // Only the low bit counts.
        assert_eq!(mask_u8(0xfe), 0x00);
        assert_eq!(mask_u128(0), 0);
        assert_eq!(mask_u128(1), u128::MAX);
    }

    #[test]
    fn test_ct_select_u8() {
        assert_eq!(ct_select_u8(0xaa, 0xbb, 0), 0xaa);
        assert_eq!(ct_select_u8(0xaa, 0xbb, 1), 0xbb);
    }
}
