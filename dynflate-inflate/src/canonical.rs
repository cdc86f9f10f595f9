//! Canonical Huffman code construction (RFC 1951 Section 3.2.2).
//!
//! A canonical code is fully determined by its code lengths: codes of equal
//! length are consecutive integers assigned in symbol order, and every code
//! of length `L` sorts before the codes of length `L + 1` sharing its prefix.

use crate::huffman::{Codeword, HuffmanTree};
use crate::tables::END_OF_BLOCK;
use dynflate_core::error::{DynflateError, Result};
use std::fmt;

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LENGTH: usize = 15;

/// Number of code-length codes (0-18).
pub const CODELEN_ALPHABET_SIZE: usize = 19;

/// The three Huffman alphabets of a dynamic block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alphabet {
    /// Code lengths 0-15 and repeat instructions 16-18.
    CodeLength,
    /// Literals, end of block, and length codes.
    LiteralLength,
    /// Distance codes.
    Distance,
}

impl Alphabet {
    /// Longest code this alphabet may use.
    pub fn max_code_length(self) -> u8 {
        match self {
            // Transmitted in 3-bit fields.
            Self::CodeLength => 7,
            Self::LiteralLength | Self::Distance => MAX_CODE_LENGTH as u8,
        }
    }

    /// Largest number of code lengths a valid block header can transmit.
    ///
    /// The HLIT field can describe 288 literal/length lengths, but symbols
    /// 286 and 287 are reserved.
    pub fn max_symbols(self) -> usize {
        match self {
            Self::CodeLength => CODELEN_ALPHABET_SIZE,
            Self::LiteralLength => 286,
            Self::Distance => 32,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::CodeLength => "code-length",
            Self::LiteralLength => "literal/length",
            Self::Distance => "distance",
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Codewords assigned to each symbol of an alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCode {
    alphabet: Alphabet,
    /// `codes[symbol]`; `None` for symbols with length 0.
    codes: Vec<Option<Codeword>>,
    max_length: u8,
}

impl CanonicalCode {
    /// Assign canonical codes from code lengths.
    ///
    /// `lengths[i]` is the bit length of symbol `i`; 0 means unused.
    ///
    /// The lengths must describe a prefix-free code. Incomplete codes are
    /// rejected, except a single code of length 1 in the literal/length or
    /// distance alphabet. All-zero lengths give an empty code. A
    /// literal/length code must include the end-of-block symbol.
    pub fn from_lengths(lengths: &[u8], alphabet: Alphabet) -> Result<Self> {
        Self::build(lengths, alphabet, true)
    }

    /// Assign canonical codes, checking only that they are prefix-free.
    ///
    /// Unlike [`from_lengths`](Self::from_lengths), incomplete sets are
    /// accepted as they are.
    pub fn assign(lengths: &[u8], alphabet: Alphabet) -> Result<Self> {
        Self::build(lengths, alphabet, false)
    }

    fn build(lengths: &[u8], alphabet: Alphabet, strict: bool) -> Result<Self> {
        if lengths.len() > alphabet.max_symbols() {
            return Err(DynflateError::malformed_tree(format!(
                "{} {alphabet} code lengths, at most {} allowed",
                lengths.len(),
                alphabet.max_symbols()
            )));
        }

        // Count codes of each length
        let mut bl_count = [0u32; MAX_CODE_LENGTH + 1];
        let mut max_length = 0u8;
        for (symbol, &len) in lengths.iter().enumerate() {
            if len > alphabet.max_code_length() {
                return Err(DynflateError::malformed_tree(format!(
                    "{alphabet} code length {len} for symbol {symbol} exceeds {}",
                    alphabet.max_code_length()
                )));
            }
            bl_count[len as usize] += 1;
            max_length = max_length.max(len);
        }
        bl_count[0] = 0;

        // Kraft check: `left` is the number of unused codes at each length.
        let mut left: i64 = 1;
        for &count in &bl_count[1..] {
            left = (left << 1) - count as i64;
            if left < 0 {
                return Err(DynflateError::malformed_tree(format!(
                    "over-subscribed {alphabet} code"
                )));
            }
        }

        if strict {
            let used: u32 = bl_count.iter().sum();
            if used > 0 && left > 0 {
                let single = used == 1 && max_length == 1;
                if alphabet == Alphabet::CodeLength || !single {
                    return Err(DynflateError::malformed_tree(format!(
                        "incomplete {alphabet} code"
                    )));
                }
            }

            if alphabet == Alphabet::LiteralLength
                && lengths.get(END_OF_BLOCK as usize).copied().unwrap_or(0) == 0
            {
                return Err(DynflateError::malformed_tree(
                    "literal/length code has no end-of-block symbol",
                ));
            }
        }

        // First code of each length
        let mut next_code = [0u32; MAX_CODE_LENGTH + 1];
        let mut code = 0u32;
        for bits in 1..=MAX_CODE_LENGTH {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
        }

        let codes = lengths
            .iter()
            .map(|&len| {
                (len != 0).then(|| {
                    let bits = next_code[len as usize];
                    next_code[len as usize] += 1;
                    Codeword::new(bits as u16, len)
                })
            })
            .collect();

        Ok(Self {
            alphabet,
            codes,
            max_length,
        })
    }

    /// The alphabet this code belongs to.
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    /// Longest code length in use (0 for an empty code).
    pub fn max_length(&self) -> u8 {
        self.max_length
    }

    /// Codeword of `symbol`, if it has one.
    pub fn codeword(&self, symbol: usize) -> Option<Codeword> {
        self.codes.get(symbol).copied().flatten()
    }

    /// Codewords indexed by symbol.
    pub fn codes(&self) -> &[Option<Codeword>] {
        &self.codes
    }

    /// Codewords rendered as zero-padded binary strings, "" when unused.
    pub fn binary_strings(&self) -> Vec<String> {
        self.codes
            .iter()
            .map(|code| code.map(|c| c.to_string()).unwrap_or_default())
            .collect()
    }

    /// Build the decode tree for this code.
    pub fn tree(&self) -> Result<HuffmanTree> {
        let mut tree = HuffmanTree::new();
        for (symbol, code) in self.codes.iter().enumerate() {
            if let Some(code) = code {
                tree.insert(*code, symbol as u16)?;
            }
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynflate_core::ErrorKind;

    fn strings(lengths: &[u8], alphabet: Alphabet) -> Vec<String> {
        CanonicalCode::from_lengths(lengths, alphabet)
            .unwrap()
            .binary_strings()
    }

    #[test]
    fn test_rfc1951_example() {
        // RFC 1951 Section 3.2.2: lengths (3, 3, 3, 3, 3, 2, 4, 4) for A-H.
        let codes = strings(&[3, 3, 3, 3, 3, 2, 4, 4], Alphabet::Distance);
        assert_eq!(
            codes,
            ["010", "011", "100", "101", "110", "00", "1110", "1111"]
        );
    }

    #[test]
    fn test_two_threes_three_fours() {
        // Two codes of length 3 and three of length 4.
        let lengths = [0, 3, 4, 0, 3, 4, 4];

        // 2/8 + 3/16 < 1: not a complete code.
        let err = CanonicalCode::from_lengths(&lengths, Alphabet::Distance).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHuffmanTree);

        let code = CanonicalCode::assign(&lengths, Alphabet::Distance).unwrap();
        assert_eq!(code.binary_strings(), ["", "000", "0100", "", "001", "0101", "0110"]);

        let threes: Vec<_> = [1, 4].iter().filter_map(|&s| code.codeword(s)).collect();
        let fours: Vec<_> = [2, 5, 6].iter().filter_map(|&s| code.codeword(s)).collect();
        assert_eq!(threes.len(), 2);
        assert_eq!(fours.len(), 3);

        // Strictly increasing within each length group.
        assert!(threes.windows(2).all(|w| w[0].bits < w[1].bits));
        assert!(fours.windows(2).all(|w| w[0].bits < w[1].bits));

        // No shorter code is a prefix of a longer one.
        let all = code.binary_strings();
        for a in all.iter().filter(|s| !s.is_empty()) {
            for b in all.iter().filter(|b| b.len() > a.len()) {
                assert!(!b.starts_with(a.as_str()), "{a} is a prefix of {b}");
            }
        }

        // The partial code still builds a usable tree.
        assert_eq!(code.tree().unwrap().len(), 5);
    }

    #[test]
    fn test_assign_rejects_over_subscription() {
        assert!(CanonicalCode::assign(&[1, 1, 2], Alphabet::Distance).is_err());
    }

    #[test]
    fn test_zero_lengths_get_no_code() {
        let code = CanonicalCode::from_lengths(&[0, 1, 0, 1], Alphabet::CodeLength).unwrap();
        assert_eq!(code.binary_strings(), ["", "0", "", "1"]);
        assert_eq!(code.codeword(0), None);
        assert_eq!(code.max_length(), 1);
    }

    #[test]
    fn test_over_subscribed() {
        let err = CanonicalCode::from_lengths(&[1, 1, 1], Alphabet::Distance).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHuffmanTree);
    }

    #[test]
    fn test_single_code_rules() {
        // One distance code of length 1 is accepted.
        let code = CanonicalCode::from_lengths(&[0, 1], Alphabet::Distance).unwrap();
        assert_eq!(code.binary_strings(), ["", "0"]);

        // Not for the code-length alphabet.
        assert!(CanonicalCode::from_lengths(&[1, 0, 0], Alphabet::CodeLength).is_err());

        // Nor a single longer code.
        assert!(CanonicalCode::from_lengths(&[2, 0], Alphabet::Distance).is_err());
    }

    #[test]
    fn test_empty_code() {
        let code = CanonicalCode::from_lengths(&[0; 30], Alphabet::Distance).unwrap();
        assert!(code.tree().unwrap().is_empty());
    }

    #[test]
    fn test_literal_length_needs_end_of_block() {
        let mut lengths = vec![0u8; 257];
        lengths[b'a' as usize] = 1;
        lengths[b'b' as usize] = 1;
        let err = CanonicalCode::from_lengths(&lengths, Alphabet::LiteralLength).unwrap_err();
        assert!(err.to_string().contains("end-of-block"));

        lengths[b'b' as usize] = 0;
        lengths[256] = 1;
        assert!(CanonicalCode::from_lengths(&lengths, Alphabet::LiteralLength).is_ok());
    }

    #[test]
    fn test_length_limits() {
        assert!(CanonicalCode::from_lengths(&[8, 8], Alphabet::CodeLength).is_err());
        assert!(CanonicalCode::from_lengths(&[16, 1], Alphabet::Distance).is_err());
        assert!(CanonicalCode::from_lengths(&[1; 33], Alphabet::Distance).is_err());

        let mut lengths = vec![0u8; 287];
        lengths[256] = 1;
        lengths[286] = 1;
        let err = CanonicalCode::assign(&lengths, Alphabet::LiteralLength).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHuffmanTree);
    }

    #[test]
    fn test_tree_matches_codes() {
        let code = CanonicalCode::from_lengths(&[3, 3, 3, 3, 3, 2, 4, 4], Alphabet::Distance)
            .unwrap();
        let mut tree = code.tree().unwrap();
        assert_eq!(tree.len(), 8);

        // "1110" is symbol 6 (G).
        for bit in [true, true, true] {
            assert_eq!(tree.step(bit), crate::huffman::Step::Pending);
        }
        assert_eq!(tree.step(false), crate::huffman::Step::Leaf(6));
    }
}
