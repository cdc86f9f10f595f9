//! Fixed tables of the DEFLATE format (RFC 1951).
//!
//! Length and distance values are always taken from these tables. The
//! extra-bit counts are not derived arithmetically from the symbol number.

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// Length code base values (RFC 1951 Section 3.2.5).
///
/// For length codes 257-285, this gives the base length value.
/// Extra bits are added to get the final length.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, // 257-264: 0 extra bits
    11, 13, 15, 17, // 265-268: 1 extra bit
    19, 23, 27, 31, // 269-272: 2 extra bits
    35, 43, 51, 59, // 273-276: 3 extra bits
    67, 83, 99, 115, // 277-280: 4 extra bits
    131, 163, 195, 227, // 281-284: 5 extra bits
    258, // 285: 0 extra bits (special case)
];

/// Number of extra bits for length codes 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 257-264
    1, 1, 1, 1, // 265-268
    2, 2, 2, 2, // 269-272
    3, 3, 3, 3, // 273-276
    4, 4, 4, 4, // 277-280
    5, 5, 5, 5, // 281-284
    0, // 285
];

/// Distance code base values (RFC 1951 Section 3.2.5).
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, // 0-3: 0 extra bits
    5, 7, // 4-5: 1 extra bit
    9, 13, // 6-7: 2 extra bits
    17, 25, // 8-9: 3 extra bits
    33, 49, // 10-11: 4 extra bits
    65, 97, // 12-13: 5 extra bits
    129, 193, // 14-15: 6 extra bits
    257, 385, // 16-17: 7 extra bits
    513, 769, // 18-19: 8 extra bits
    1025, 1537, // 20-21: 9 extra bits
    2049, 3073, // 22-23: 10 extra bits
    4097, 6145, // 24-25: 11 extra bits
    8193, 12289, // 26-27: 12 extra bits
    16385, 24577, // 28-29: 13 extra bits
];

/// Number of extra bits for distance codes 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, // 0-3
    1, 1, // 4-5
    2, 2, // 6-7
    3, 3, // 8-9
    4, 4, // 10-11
    5, 5, // 12-13
    6, 6, // 14-15
    7, 7, // 16-17
    8, 8, // 18-19
    9, 9, // 20-21
    10, 10, // 22-23
    11, 11, // 24-25
    12, 12, // 26-27
    13, 13, // 28-29
];

/// Order of code length codes in dynamic block header.
///
/// Code length codes are transmitted in this order (RFC 1951 Section 3.2.7).
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Base length and extra-bit count for a length symbol (257-285).
pub fn length_entry(symbol: u16) -> Option<(u16, u8)> {
    let index = symbol.checked_sub(257)? as usize;
    Some((*LENGTH_BASE.get(index)?, LENGTH_EXTRA_BITS[index]))
}

/// Base distance and extra-bit count for a distance symbol (0-29).
pub fn distance_entry(symbol: u16) -> Option<(u16, u8)> {
    let index = symbol as usize;
    Some((*DISTANCE_BASE.get(index)?, DISTANCE_EXTRA_BITS[index]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_boundaries() {
        assert_eq!(length_entry(256), None);
        assert_eq!(length_entry(257), Some((3, 0)));
        assert_eq!(length_entry(264), Some((10, 0)));
        assert_eq!(length_entry(265), Some((11, 1)));
        assert_eq!(length_entry(268), Some((17, 1)));
        assert_eq!(length_entry(269), Some((19, 2)));
        assert_eq!(length_entry(284), Some((227, 5)));
        assert_eq!(length_entry(285), Some((258, 0)));
        assert_eq!(length_entry(286), None);
    }

    #[test]
    fn test_distance_boundaries() {
        assert_eq!(distance_entry(0), Some((1, 0)));
        assert_eq!(distance_entry(3), Some((4, 0)));
        assert_eq!(distance_entry(4), Some((5, 1)));
        assert_eq!(distance_entry(29), Some((24577, 13)));
        assert_eq!(distance_entry(30), None);
    }

    #[test]
    fn test_length_ranges_are_contiguous() {
        // Each code covers [base, base + 2^extra) and the next code starts
        // right after it, except for 284/285 where 258 has its own code.
        for i in 0..27 {
            let end = LENGTH_BASE[i] + (1 << LENGTH_EXTRA_BITS[i]);
            assert_eq!(end, LENGTH_BASE[i + 1], "length code {}", 257 + i);
        }
        assert_eq!(LENGTH_BASE[27] + (1 << LENGTH_EXTRA_BITS[27]) - 1, 258);
    }

    #[test]
    fn test_distance_ranges_are_contiguous() {
        for i in 0..29 {
            let end = DISTANCE_BASE[i] as u32 + (1u32 << DISTANCE_EXTRA_BITS[i]);
            assert_eq!(end, DISTANCE_BASE[i + 1] as u32, "distance code {}", i);
        }
        assert_eq!(DISTANCE_BASE[29] as u32 + (1 << 13) - 1, 32768);
    }

    #[test]
    fn test_code_length_order_is_permutation() {
        let mut seen = [false; 19];
        for &slot in &CODE_LENGTH_ORDER {
            assert!(!seen[slot]);
            seen[slot] = true;
        }
    }
}
