// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Accessors for sub-fields packed into a single byte and described by a mask.

/// Returns the value of the sub-field selected by `mask`, shifted down to bit 0.
pub fn extract(byte: u8, mask: u8) -> u8 {
    if mask == 0 {
        return 0;
    }
    (byte & mask) >> mask.trailing_zeros()
}

/// Positions `value` at the lowest set bit of `mask`. Bits of `value` that do not fit in the
/// mask are dropped.
pub fn pack(value: u8, mask: u8) -> u8 {
    if mask == 0 {
        return 0;
    }
    mask & value.wrapping_shl(mask.trailing_zeros())
}

/// Overwrites the `mask` bits of `dst` with the corresponding bits of `src`.
pub fn merge_masked(dst: u8, src: u8, mask: u8) -> u8 {
    (dst & !mask) | (src & mask)
}

pub fn is_set(byte: u8, mask: u8) -> bool {
    byte & mask != 0
}

pub fn count_bits(byte: u8) -> usize {
    byte.count_ones() as usize
}

/// Number of bytes needed to hold `bits` bits.
pub fn bits_to_bytes(bits: usize) -> usize {
    (bits + 7) / 8
}

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    #[test_case(0b1011_0110, 0b0011_1000, 0b110 ; "middle")]
    #[test_case(0b1011_0110, 0b0000_0001, 0 ; "lowest")]
    #[test_case(0b1011_0110, 0b1000_0000, 1 ; "highest")]
    #[test_case(0xff, 0, 0 ; "empty mask")]
    fn extract_field(byte: u8, mask: u8, expected: u8) {
        assert_eq!(expected, extract(byte, mask));
    }

    #[test]
    fn pack_positions_value() {
        assert_eq!(0b0010_1000, pack(0b101, 0b0011_1000));
        assert_eq!(0b1000_0000, pack(1, 0b1000_0000));
    }

    #[test]
    fn pack_truncates_wide_value() {
        // Only the low two bits of 0b111 fit into a two bit mask.
        assert_eq!(0b0000_1100, pack(0b111, 0b0000_1100));
        assert_eq!(0, pack(0b100, 0b0000_0011));
    }

    #[test]
    fn pack_extract_agree_within_mask() {
        for value in 0..8 {
            assert_eq!(value, extract(pack(value, 0b0111_0000), 0b0111_0000));
        }
    }

    #[test]
    fn merge_masked_is_overwrite_not_or() {
        assert_eq!(0b1100_0011, merge_masked(0b1111_1111, 0b0000_0011, 0b0011_1100));
        assert_eq!(0b0011_1100, merge_masked(0b0000_0000, 0b1111_1111, 0b0011_1100));
    }

    #[test]
    fn ppe_helpers() {
        assert_eq!(1, count_bits(0b0000_1000));
        assert_eq!(4, count_bits(0b0111_1000));
        assert_eq!(3, bits_to_bytes(19));
        assert_eq!(1, bits_to_bytes(8));
        assert_eq!(0, bits_to_bytes(0));
    }

    #[test]
    fn is_set_any_bit() {
        assert!(is_set(0b0000_0100, 0b0000_0110));
        assert!(!is_set(0b0000_1000, 0b0000_0110));
    }
}
