//! Dynamic block header parsing (RFC 1951 Section 3.2.7).
//!
//! A dynamic block starts with three counts, the lengths of the code-length
//! code in a fixed permuted order, and then the run-length encoded lengths
//! of the literal/length and distance codes.

use crate::canonical::{Alphabet, CODELEN_ALPHABET_SIZE, CanonicalCode};
use crate::codelen::CodeLengthDecoder;
use crate::huffman::HuffmanTree;
use crate::tables::CODE_LENGTH_ORDER;
use dynflate_core::BitReader;
use dynflate_core::error::{DynflateError, Result};
use std::io::Read;

/// Header of a dynamic Huffman block, after BFINAL and BTYPE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicHeader {
    /// Number of literal/length code lengths (257-286).
    pub hlit: usize,
    /// Number of distance code lengths (1-32).
    pub hdist: usize,
    /// Number of code-length code lengths sent (4-19).
    pub hclen: usize,
    /// Code-length code lengths, indexed by symbol.
    pub code_length_lengths: [u8; CODELEN_ALPHABET_SIZE],
    /// Literal/length code lengths.
    pub litlen_lengths: Vec<u8>,
    /// Distance code lengths.
    pub distance_lengths: Vec<u8>,
}

impl DynamicHeader {
    /// Read a dynamic block header.
    pub fn read<R: Read>(reader: &mut BitReader<R>) -> Result<Self> {
        let hlit = reader.read_bits(5)? as usize + 257;
        let hdist = reader.read_bits(5)? as usize + 1;
        let hclen = reader.read_bits(4)? as usize + 4;

        // Literal/length symbols 286 and 287 never occur in compressed data.
        if hlit > Alphabet::LiteralLength.max_symbols() {
            return Err(DynflateError::malformed_tree(format!(
                "{hlit} literal/length code lengths, at most {} allowed",
                Alphabet::LiteralLength.max_symbols()
            )));
        }

        let mut code_length_lengths = [0u8; CODELEN_ALPHABET_SIZE];
        for &slot in &CODE_LENGTH_ORDER[..hclen] {
            code_length_lengths[slot] = reader.read_bits(3)? as u8;
        }

        let mut tree =
            CanonicalCode::from_lengths(&code_length_lengths, Alphabet::CodeLength)?.tree()?;
        log::trace!("code-length lengths: {code_length_lengths:?}");

        let mut decoder = CodeLengthDecoder::new(&mut tree, hlit + hdist);
        let litlen_lengths = decoder.decode(reader, hlit)?;
        let distance_lengths = decoder.decode(reader, hdist)?;

        log::trace!("literal/length lengths: {litlen_lengths:?}");
        log::trace!("distance lengths: {distance_lengths:?}");

        Ok(Self {
            hlit,
            hdist,
            hclen,
            code_length_lengths,
            litlen_lengths,
            distance_lengths,
        })
    }

    /// Canonical literal/length code.
    pub fn litlen_code(&self) -> Result<CanonicalCode> {
        CanonicalCode::from_lengths(&self.litlen_lengths, Alphabet::LiteralLength)
    }

    /// Canonical distance code.
    pub fn distance_code(&self) -> Result<CanonicalCode> {
        CanonicalCode::from_lengths(&self.distance_lengths, Alphabet::Distance)
    }

    /// Build the literal/length and distance decode trees.
    pub fn trees(&self) -> Result<(HuffmanTree, HuffmanTree)> {
        Ok((self.litlen_code()?.tree()?, self.distance_code()?.tree()?))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use dynflate_core::{BitWriter, ErrorKind};
    use std::io::Cursor;

    /// Write a header whose literal/length code is 'A' -> 0, EOB -> 1 and
    /// whose distance code is a single length-1 code for symbol 0.
    ///
    /// The code-length code is 1 -> 0, 18 -> 1.
    pub(crate) fn write_tiny_header(writer: &mut BitWriter<Vec<u8>>) {
        writer.write_bits(0, 5).unwrap(); // HLIT = 257
        writer.write_bits(0, 5).unwrap(); // HDIST = 1
        writer.write_bits(15, 4).unwrap(); // HCLEN = 19
        for &slot in &CODE_LENGTH_ORDER {
            let len = if slot == 1 || slot == 18 { 1 } else { 0 };
            writer.write_bits(len, 3).unwrap();
        }

        fn zeros(writer: &mut BitWriter<Vec<u8>>, count: u32) {
            writer.write_code(1, 1).unwrap();
            writer.write_bits(count - 11, 7).unwrap();
        }
        zeros(writer, 65);
        writer.write_code(0, 1).unwrap(); // 'A'
        zeros(writer, 138);
        zeros(writer, 52);
        writer.write_code(0, 1).unwrap(); // 256
        writer.write_code(0, 1).unwrap(); // distance 0
    }

    #[test]
    fn test_read_tiny_header() {
        let mut writer = BitWriter::new(Vec::new());
        write_tiny_header(&mut writer);
        let data = writer.finish().unwrap();

        let mut reader = BitReader::new(Cursor::new(data));
        let header = DynamicHeader::read(&mut reader).unwrap();

        assert_eq!(header.hlit, 257);
        assert_eq!(header.hdist, 1);
        assert_eq!(header.hclen, 19);
        assert_eq!(header.code_length_lengths[1], 1);
        assert_eq!(header.code_length_lengths[18], 1);
        assert_eq!(header.litlen_lengths.len(), 257);
        assert_eq!(header.litlen_lengths[b'A' as usize], 1);
        assert_eq!(header.litlen_lengths[256], 1);
        assert_eq!(header.litlen_lengths.iter().filter(|&&l| l != 0).count(), 2);
        assert_eq!(header.distance_lengths, [1]);

        let litlen = header.litlen_code().unwrap();
        assert_eq!(litlen.codeword(b'A' as usize).unwrap().to_string(), "0");
        assert_eq!(litlen.codeword(256).unwrap().to_string(), "1");

        let (litlen_tree, distance_tree) = header.trees().unwrap();
        assert_eq!(litlen_tree.len(), 2);
        assert_eq!(distance_tree.len(), 1);
    }

    #[test]
    fn test_incomplete_code_length_code() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0, 5).unwrap();
        writer.write_bits(0, 5).unwrap();
        writer.write_bits(0, 4).unwrap(); // HCLEN = 4: symbols 16, 17, 18, 0
        for len in [0, 0, 2, 2] {
            writer.write_bits(len, 3).unwrap();
        }
        let data = writer.finish().unwrap();

        let mut reader = BitReader::new(Cursor::new(data));
        let err = DynamicHeader::read(&mut reader).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHuffmanTree);
    }

    #[test]
    fn test_too_many_literal_lengths() {
        for field in [30, 31] {
            let mut writer = BitWriter::new(Vec::new());
            writer.write_bits(field, 5).unwrap(); // HLIT = 287 or 288
            writer.write_bits(0, 5).unwrap();
            writer.write_bits(15, 4).unwrap();
            for &slot in &CODE_LENGTH_ORDER {
                let len = if slot == 1 || slot == 18 { 1 } else { 0 };
                writer.write_bits(len, 3).unwrap();
            }
            writer.write_bits(0, 16).unwrap();
            let data = writer.finish().unwrap();

            let mut reader = BitReader::new(Cursor::new(data));
            let err = DynamicHeader::read(&mut reader).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedHuffmanTree);
            assert!(err.to_string().contains(&format!("{}", field + 257)));
            assert_eq!(reader.bit_position(), 14);
        }
    }

    #[test]
    fn test_truncated_header() {
        let mut reader = BitReader::new(Cursor::new(vec![0xFF]));
        let err = DynamicHeader::read(&mut reader).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEndOfStream);
    }
}
