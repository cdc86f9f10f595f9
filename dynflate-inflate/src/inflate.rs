//! DEFLATE decompression session.
//!
//! [`Inflater`] reads blocks until the one flagged final. Only dynamic
//! Huffman blocks (BTYPE 2) are decoded; stored, fixed and reserved blocks
//! are rejected with [`DynflateError::UnsupportedBlockType`].
//!
//! Every error raised while a block is decoded carries the block's index.

use crate::block::BlockDecoder;
use crate::header::DynamicHeader;
use dynflate_core::error::{DynflateError, Result};
use dynflate_core::{BitReader, OutputWindow};
use std::io::{Read, Write};

/// BTYPE of a dynamic Huffman block.
pub const BTYPE_DYNAMIC: u8 = 2;

/// How much output the session keeps in memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Retention {
    /// Keep every byte produced.
    #[default]
    Full,
    /// Keep only the last 32 KiB once it has been flushed.
    Window,
}

/// Options for an [`Inflater`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InflateOptions {
    /// Output retention policy.
    pub retention: Retention,
    /// Maximum number of bytes to produce.
    pub output_limit: Option<u64>,
}

impl InflateOptions {
    /// Default options: full retention, no limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retention policy.
    pub fn retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }

    /// Set the output limit.
    pub fn output_limit(mut self, limit: Option<u64>) -> Self {
        self.output_limit = limit;
        self
    }
}

/// What one block contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSummary {
    /// Zero-based block index.
    pub index: usize,
    /// BFINAL was set.
    pub is_final: bool,
    /// Literal/length code lengths sent.
    pub hlit: usize,
    /// Distance code lengths sent.
    pub hdist: usize,
    /// Code-length code lengths sent.
    pub hclen: usize,
    /// Literal bytes emitted.
    pub literals: u64,
    /// Back-references replayed.
    pub matches: u64,
    /// Bytes produced by this block.
    pub bytes: u64,
    /// Bytes produced by the session after this block.
    pub total_out: u64,
    /// Bit offset of the block header.
    pub start_bit: u64,
    /// Bit offset just past the end-of-block symbol.
    pub end_bit: u64,
}

/// DEFLATE decompressor for dynamic Huffman streams.
#[derive(Debug, Default)]
pub struct Inflater {
    options: InflateOptions,
    window: OutputWindow,
    blocks: usize,
    finished: bool,
}

impl Inflater {
    /// Create a decompressor with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decompressor with the given options.
    pub fn with_options(options: InflateOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// The session's options.
    pub fn options(&self) -> &InflateOptions {
        &self.options
    }

    /// Number of blocks decoded so far.
    pub fn blocks_decoded(&self) -> usize {
        self.blocks
    }

    /// Total bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.window.position()
    }

    /// Whether the final block has been decoded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The output window.
    pub fn window(&self) -> &OutputWindow {
        &self.window
    }

    /// Reset for a new stream, keeping the options.
    pub fn reset(&mut self) {
        self.window.clear();
        self.blocks = 0;
        self.finished = false;
    }

    /// Decode one block.
    pub fn inflate_block<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<BlockSummary> {
        let index = self.blocks;
        let summary = self
            .decode_block(reader, index)
            .map_err(|e| e.in_block(index))?;

        self.blocks += 1;
        self.finished = summary.is_final;

        log::debug!(
            "block {index}: HLIT={} HDIST={} HCLEN={}, {} bytes ({} literals, {} matches){}",
            summary.hlit,
            summary.hdist,
            summary.hclen,
            summary.bytes,
            summary.literals,
            summary.matches,
            if summary.is_final { ", final" } else { "" }
        );

        Ok(summary)
    }

    fn decode_block<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        index: usize,
    ) -> Result<BlockSummary> {
        let start_bit = reader.bit_position();
        let is_final = reader.read_bit()?;
        let btype = reader.read_bits(2)? as u8;

        if btype != BTYPE_DYNAMIC {
            return Err(DynflateError::unsupported_block(btype));
        }

        if self.options.retention == Retention::Window {
            let dropped = self.window.slide();
            if dropped > 0 {
                log::trace!("window slid by {dropped} bytes, base {}", self.window.base());
            }
        }

        let header = DynamicHeader::read(reader)?;
        let (mut litlen, mut distance) = header.trees()?;

        let stats = BlockDecoder::new(&mut litlen, &mut distance)
            .with_output_limit(self.options.output_limit)
            .run(reader, &mut self.window)?;

        Ok(BlockSummary {
            index,
            is_final,
            hlit: header.hlit,
            hdist: header.hdist,
            hclen: header.hclen,
            literals: stats.literals,
            matches: stats.matches,
            bytes: stats.bytes,
            total_out: self.window.position(),
            start_bit,
            end_bit: reader.bit_position(),
        })
    }

    /// Decode until the final block and return the output.
    pub fn inflate<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<Vec<u8>> {
        self.inflate_with(reader, |_| {})
    }

    /// Like [`inflate`](Self::inflate), calling `observer` after each block.
    pub fn inflate_with<R, F>(
        &mut self,
        reader: &mut BitReader<R>,
        mut observer: F,
    ) -> Result<Vec<u8>>
    where
        R: Read,
        F: FnMut(&BlockSummary),
    {
        while !self.finished {
            let summary = self.inflate_block(reader)?;
            observer(&summary);
        }

        Ok(self.window.output().to_vec())
    }

    /// Decode until the final block, writing each block's output to `writer`
    /// as soon as the block is complete.
    ///
    /// With [`Retention::Window`] memory use stays bounded by the largest
    /// block plus 32 KiB. Returns the total number of bytes written.
    pub fn inflate_to<R, W, F>(
        &mut self,
        reader: &mut BitReader<R>,
        writer: &mut W,
        mut observer: F,
    ) -> Result<u64>
    where
        R: Read,
        W: Write,
        F: FnMut(&BlockSummary),
    {
        let mut written = 0u64;
        while !self.finished {
            let summary = self.inflate_block(reader)?;
            written += self.window.flush_to(writer)? as u64;
            observer(&summary);
        }

        writer.flush()?;
        Ok(written)
    }

    /// Decode from a plain reader.
    pub fn inflate_reader<R: Read>(&mut self, reader: R) -> Result<Vec<u8>> {
        let mut bit_reader = BitReader::new(reader);
        self.inflate(&mut bit_reader)
    }
}

/// Decompress a raw DEFLATE stream of dynamic Huffman blocks.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    Inflater::new().inflate_reader(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::tests::write_tiny_header;
    use dynflate_core::{BitWriter, ErrorKind};
    use std::io::Cursor;

    /// One dynamic block: 'A' x `count`, then end of block.
    fn tiny_block(writer: &mut BitWriter<Vec<u8>>, is_final: bool, count: usize) {
        writer.write_bit(is_final).unwrap();
        writer.write_bits(2, 2).unwrap();
        write_tiny_header(writer);
        for _ in 0..count {
            writer.write_code(0, 1).unwrap();
        }
        writer.write_code(1, 1).unwrap();
    }

    #[test]
    fn test_single_block() {
        let mut writer = BitWriter::new(Vec::new());
        tiny_block(&mut writer, true, 3);
        let data = writer.finish().unwrap();

        assert_eq!(inflate(&data).unwrap(), b"AAA");
    }

    #[test]
    fn test_blocks_and_summaries() {
        let mut writer = BitWriter::new(Vec::new());
        tiny_block(&mut writer, false, 2);
        tiny_block(&mut writer, true, 1);
        let data = writer.finish().unwrap();

        let mut inflater = Inflater::new();
        let mut summaries = Vec::new();
        let output = inflater
            .inflate_with(&mut BitReader::new(Cursor::new(data)), |s| {
                summaries.push(*s)
            })
            .unwrap();

        assert_eq!(output, b"AAA");
        assert!(inflater.is_finished());
        assert_eq!(inflater.blocks_decoded(), 2);
        assert_eq!(summaries.len(), 2);
        assert!(!summaries[0].is_final);
        assert!(summaries[1].is_final);
        assert_eq!(summaries[0].bytes, 2);
        assert_eq!(summaries[1].total_out, 3);
        assert_eq!(summaries[0].end_bit, summaries[1].start_bit);
        assert_eq!((summaries[1].hlit, summaries[1].hdist), (257, 1));
    }

    #[test]
    fn test_unsupported_block_types() {
        for btype in [0u32, 1, 3] {
            let mut writer = BitWriter::new(Vec::new());
            writer.write_bit(true).unwrap();
            writer.write_bits(btype, 2).unwrap();
            let data = writer.finish().unwrap();

            let err = inflate(&data).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedBlockType);
            assert_eq!(err.block_index(), Some(0));
        }
    }

    #[test]
    fn test_error_names_block() {
        let mut writer = BitWriter::new(Vec::new());
        tiny_block(&mut writer, false, 1);
        // Second block is fixed Huffman.
        writer.write_bit(true).unwrap();
        writer.write_bits(1, 2).unwrap();
        let data = writer.finish().unwrap();

        let err = inflate(&data).unwrap_err();
        assert_eq!(err.block_index(), Some(1));
        assert!(err.to_string().starts_with("block 1: "));
    }

    #[test]
    fn test_missing_final_block() {
        let mut writer = BitWriter::new(Vec::new());
        tiny_block(&mut writer, false, 1);
        let data = writer.finish().unwrap();

        let err = inflate(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEndOfStream);
        assert_eq!(err.block_index(), Some(1));
    }

    #[test]
    fn test_inflate_to_writer() {
        let mut writer = BitWriter::new(Vec::new());
        tiny_block(&mut writer, false, 4);
        tiny_block(&mut writer, true, 2);
        let data = writer.finish().unwrap();

        let mut inflater =
            Inflater::with_options(InflateOptions::new().retention(Retention::Window));
        let mut sink = Vec::new();
        let mut blocks = 0;
        let written = inflater
            .inflate_to(&mut BitReader::new(Cursor::new(data)), &mut sink, |_| {
                blocks += 1
            })
            .unwrap();

        assert_eq!(written, 6);
        assert_eq!(sink, b"AAAAAA");
        assert_eq!(blocks, 2);
        assert_eq!(inflater.total_out(), 6);
    }

    #[test]
    fn test_output_limit_option() {
        let mut writer = BitWriter::new(Vec::new());
        tiny_block(&mut writer, true, 10);
        let data = writer.finish().unwrap();

        let mut inflater =
            Inflater::with_options(InflateOptions::new().output_limit(Some(9)));
        let err = inflater.inflate_reader(Cursor::new(data)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutputLimitExceeded);
    }

    #[test]
    fn test_reset() {
        let mut writer = BitWriter::new(Vec::new());
        tiny_block(&mut writer, true, 2);
        let data = writer.finish().unwrap();

        let mut inflater = Inflater::new();
        assert_eq!(inflater.inflate_reader(Cursor::new(&data)).unwrap(), b"AA");
        inflater.reset();
        assert!(!inflater.is_finished());
        assert_eq!(inflater.inflate_reader(Cursor::new(&data)).unwrap(), b"AA");
    }
}
