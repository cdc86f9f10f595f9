//! Dynamic-Huffman block writer.
//!
//! Codes are not frequency-optimal: every used symbol gets one of two
//! adjacent lengths, which always yields a complete prefix code. That is all
//! a decoder test needs.

use crate::lz77::{Token, tokenize};
use dynflate_core::error::{DynflateError, Result};
use dynflate_core::BitWriter;

/// Order of code length codes in a dynamic block header.
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115,
    131, 163, 195, 227, 258,
];

const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// A code-length instruction: symbol, extra-bit value, extra-bit count.
pub type LengthSymbol = (u8, u32, u8);

/// Length symbol (257-285), extra-bit count and extra-bit value.
pub fn length_to_code(length: u16) -> (u16, u8, u32) {
    let index = if length == 258 {
        28
    } else {
        LENGTH_BASE[..28]
            .iter()
            .rposition(|&base| base <= length)
            .unwrap_or(0)
    };
    (
        257 + index as u16,
        LENGTH_EXTRA_BITS[index],
        (length - LENGTH_BASE[index]) as u32,
    )
}

/// Distance symbol (0-29), extra-bit count and extra-bit value.
pub fn distance_to_code(distance: u16) -> (u16, u8, u32) {
    let index = DISTANCE_BASE
        .iter()
        .rposition(|&base| base <= distance)
        .unwrap_or(0);
    (
        index as u16,
        DISTANCE_EXTRA_BITS[index],
        (distance - DISTANCE_BASE[index]) as u32,
    )
}

/// Complete code lengths for the symbols flagged in `used`.
///
/// With `n >= 2` used symbols and `k = ceil(log2(n))`, the first
/// `2^k - n` used symbols get length `k - 1` and the rest length `k`.
/// A lone symbol is paired with an unused neighbour so the code stays
/// complete.
pub fn complete_lengths(used: &[bool]) -> Vec<u8> {
    let mut used = used.to_vec();
    let count = used.iter().filter(|&&u| u).count();
    if count == 1 && used.len() > 1 {
        if let Some(slot) = used.iter().position(|&u| !u) {
            used[slot] = true;
        }
    }

    let symbols: Vec<usize> = (0..used.len()).filter(|&i| used[i]).collect();
    let n = symbols.len();
    let mut lengths = vec![0u8; used.len()];
    if n < 2 {
        return lengths;
    }

    let k = usize::BITS - (n - 1).leading_zeros();
    let short = (1usize << k) - n;
    for (i, &symbol) in symbols.iter().enumerate() {
        lengths[symbol] = if i < short { k as u8 - 1 } else { k as u8 };
    }
    lengths
}

/// Canonical codewords `(code, len)` for a set of lengths.
pub fn canonical_codes(lengths: &[u8]) -> Vec<(u16, u8)> {
    let mut bl_count = [0u32; 16];
    for &len in lengths {
        bl_count[len as usize] += 1;
    }
    bl_count[0] = 0;

    let mut next_code = [0u32; 16];
    let mut code = 0u32;
    for bits in 1..16 {
        code = (code + bl_count[bits - 1]) << 1;
        next_code[bits] = code;
    }

    lengths
        .iter()
        .map(|&len| {
            if len == 0 {
                return (0, 0);
            }
            let code = next_code[len as usize];
            next_code[len as usize] += 1;
            (code as u16, len)
        })
        .collect()
}

/// Run-length encode code lengths with symbols 16, 17 and 18.
pub fn rle_lengths(lengths: &[u8]) -> Vec<LengthSymbol> {
    let mut symbols = Vec::new();
    let mut i = 0;

    while i < lengths.len() {
        let len = lengths[i];
        let run = lengths[i..].iter().take_while(|&&l| l == len).count();
        let mut left = run;

        if len == 0 {
            while left > 0 {
                if left >= 11 {
                    let n = left.min(138);
                    symbols.push((18, (n - 11) as u32, 7));
                    left -= n;
                } else if left >= 3 {
                    let n = left.min(10);
                    symbols.push((17, (n - 3) as u32, 3));
                    left -= n;
                } else {
                    symbols.push((0, 0, 0));
                    left -= 1;
                }
            }
        } else {
            symbols.push((len, 0, 0));
            left -= 1;
            while left > 0 {
                if left >= 3 {
                    let n = left.min(6);
                    symbols.push((16, (n - 3) as u32, 2));
                    left -= n;
                } else {
                    symbols.push((len, 0, 0));
                    left -= 1;
                }
            }
        }

        i += run;
    }

    symbols
}

fn trim(lengths: &[u8], min: usize) -> &[u8] {
    let end = lengths
        .iter()
        .rposition(|&l| l != 0)
        .map_or(0, |i| i + 1)
        .max(min);
    &lengths[..end]
}

/// Builder for a raw DEFLATE stream.
#[derive(Debug)]
pub struct DeflateBuilder {
    writer: BitWriter<Vec<u8>>,
}

impl DeflateBuilder {
    /// Start an empty stream.
    pub fn new() -> Self {
        Self {
            writer: BitWriter::new(Vec::new()),
        }
    }

    /// Bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.writer.bits_written()
    }

    /// Write raw bits, LSB first.
    pub fn bits(&mut self, value: u32, count: u8) -> Result<&mut Self> {
        self.writer.write_bits(value, count)?;
        Ok(self)
    }

    /// Write a dynamic block for `tokens` with code lengths chosen from the
    /// symbols the tokens use.
    pub fn block(&mut self, tokens: &[Token], is_final: bool) -> Result<&mut Self> {
        let mut litlen_used = vec![false; 286];
        let mut distance_used = vec![false; 30];
        litlen_used[256] = true;

        for token in tokens {
            match *token {
                Token::Literal(byte) => litlen_used[byte as usize] = true,
                Token::Match { length, distance } => {
                    litlen_used[length_to_code(length).0 as usize] = true;
                    distance_used[distance_to_code(distance).0 as usize] = true;
                }
            }
        }

        let litlen = complete_lengths(&litlen_used);
        let distance = complete_lengths(&distance_used);
        self.block_with_lengths(tokens, trim(&litlen, 257), trim(&distance, 1), is_final)
    }

    /// Write a dynamic block with caller-chosen code lengths.
    ///
    /// `litlen` and `distance` are sent as-is, so their lengths set HLIT and
    /// HDIST.
    pub fn block_with_lengths(
        &mut self,
        tokens: &[Token],
        litlen: &[u8],
        distance: &[u8],
        is_final: bool,
    ) -> Result<&mut Self> {
        let combined: Vec<u8> = litlen.iter().chain(distance).copied().collect();
        let symbols = rle_lengths(&combined);

        let mut used = [false; 19];
        for &(symbol, _, _) in &symbols {
            used[symbol as usize] = true;
        }
        let mut code_length_lengths = [0u8; 19];
        code_length_lengths.copy_from_slice(&complete_lengths(&used));

        self.header(
            is_final,
            litlen.len(),
            distance.len(),
            &code_length_lengths,
            &symbols,
        )?;
        self.body(tokens, litlen, distance)
    }

    /// Write BFINAL, BTYPE=2 and a dynamic header from explicit parts.
    ///
    /// HCLEN is trimmed to the last non-zero code-length length (at least
    /// 4). Every instruction in `symbols` must have a code.
    pub fn header(
        &mut self,
        is_final: bool,
        hlit: usize,
        hdist: usize,
        code_length_lengths: &[u8; 19],
        symbols: &[LengthSymbol],
    ) -> Result<&mut Self> {
        let hclen = CODE_LENGTH_ORDER
            .iter()
            .rposition(|&slot| code_length_lengths[slot] != 0)
            .map_or(0, |i| i + 1)
            .max(4);

        self.writer.write_bit(is_final)?;
        self.writer.write_bits(2, 2)?;
        self.writer.write_bits((hlit - 257) as u32, 5)?;
        self.writer.write_bits((hdist - 1) as u32, 5)?;
        self.writer.write_bits((hclen - 4) as u32, 4)?;
        for &slot in &CODE_LENGTH_ORDER[..hclen] {
            self.writer.write_bits(code_length_lengths[slot] as u32, 3)?;
        }

        let codes = canonical_codes(code_length_lengths);
        for &(symbol, extra, bits) in symbols {
            self.code(&codes, symbol as u16)?;
            self.writer.write_bits(extra, bits)?;
        }
        Ok(self)
    }

    /// Write tokens and the end-of-block symbol with the given code lengths.
    pub fn body(&mut self, tokens: &[Token], litlen: &[u8], distance: &[u8]) -> Result<&mut Self> {
        let litlen_codes = canonical_codes(litlen);
        let distance_codes = canonical_codes(distance);

        for token in tokens {
            match *token {
                Token::Literal(byte) => self.code(&litlen_codes, byte as u16)?,
                Token::Match { length, distance } => {
                    let (symbol, bits, extra) = length_to_code(length);
                    self.code(&litlen_codes, symbol)?;
                    self.writer.write_bits(extra, bits)?;

                    let (symbol, bits, extra) = distance_to_code(distance);
                    self.code(&distance_codes, symbol)?;
                    self.writer.write_bits(extra, bits)?;
                }
            }
        }
        self.code(&litlen_codes, 256)?;
        Ok(self)
    }

    fn code(&mut self, codes: &[(u16, u8)], symbol: u16) -> Result<()> {
        match codes.get(symbol as usize) {
            Some(&(code, len)) if len > 0 => self.writer.write_code(code, len),
            _ => Err(DynflateError::malformed_tree(format!(
                "symbol {symbol} has no code"
            ))),
        }
    }

    /// Pad the last byte and return the stream.
    pub fn finish(self) -> Result<Vec<u8>> {
        self.writer.finish()
    }
}

impl Default for DeflateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Compress `data` into dynamic blocks of at most `tokens_per_block` tokens.
///
/// Back-references may reach into earlier blocks.
pub fn deflate(data: &[u8], tokens_per_block: usize) -> Result<Vec<u8>> {
    let tokens = tokenize(data);
    let mut builder = DeflateBuilder::new();

    if tokens.is_empty() {
        builder.block(&[], true)?;
    } else {
        let blocks: Vec<&[Token]> = tokens.chunks(tokens_per_block.max(1)).collect();
        for (i, block) in blocks.iter().enumerate() {
            builder.block(block, i + 1 == blocks.len())?;
        }
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_codes() {
        assert_eq!(length_to_code(3), (257, 0, 0));
        assert_eq!(length_to_code(10), (264, 0, 0));
        assert_eq!(length_to_code(12), (265, 1, 1));
        assert_eq!(length_to_code(257), (284, 5, 30));
        assert_eq!(length_to_code(258), (285, 0, 0));
    }

    #[test]
    fn test_distance_codes() {
        assert_eq!(distance_to_code(1), (0, 0, 0));
        assert_eq!(distance_to_code(6), (4, 1, 1));
        assert_eq!(distance_to_code(32768), (29, 13, 8191));
    }

    #[test]
    fn test_complete_lengths() {
        let kraft = |lengths: &[u8]| -> f64 {
            lengths
                .iter()
                .filter(|&&l| l > 0)
                .map(|&l| 0.5f64.powi(l as i32))
                .sum()
        };

        for n in 2..=286 {
            let mut used = vec![false; 286];
            used[..n].fill(true);
            let lengths = complete_lengths(&used);
            assert!((kraft(&lengths) - 1.0).abs() < 1e-12, "n = {n}");
            assert!(lengths.iter().all(|&l| l <= 9));
        }

        let mut used = vec![false; 30];
        used[7] = true;
        let lengths = complete_lengths(&used);
        assert_eq!(lengths.iter().filter(|&&l| l == 1).count(), 2);
        assert_eq!(lengths[7], 1);

        assert!(complete_lengths(&[false; 30]).iter().all(|&l| l == 0));
    }

    #[test]
    fn test_rle_lengths() {
        let mut lengths = vec![8u8; 10];
        lengths.extend([0; 150]);
        lengths.extend([5, 5]);

        let symbols = rle_lengths(&lengths);
        assert_eq!(
            symbols,
            [
                (8, 0, 0),
                (16, 3, 2),
                (16, 0, 2),
                (18, 127, 7),
                (18, 1, 7),
                (5, 0, 0),
                (5, 0, 0),
            ]
        );
    }
}
