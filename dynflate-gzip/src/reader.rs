//! GZIP member decoding.

use crate::header::{GzipHeader, GzipTrailer};
use dynflate_core::BitReader;
use dynflate_core::error::{DynflateError, Result};
use dynflate_inflate::{BlockSummary, InflateOptions, Inflater};
use std::io::{Read, Write};

/// Decoder for a single GZIP member.
///
/// The header is parsed on construction. The rest of the input (DEFLATE
/// stream plus the eight-byte trailer) is read the first time it is needed.
pub struct GzipReader<R: Read> {
    /// Underlying reader, positioned after the header.
    reader: R,
    /// Parsed header.
    header: GzipHeader,
    /// Options for the inflater.
    options: InflateOptions,
    /// DEFLATE bytes and trailer, once loaded.
    body: Option<(Vec<u8>, GzipTrailer)>,
}

impl<R: Read> GzipReader<R> {
    /// Create a new GZIP reader.
    pub fn new(mut reader: R) -> Result<Self> {
        let header = GzipHeader::read(&mut reader)?;
        log::trace!(
            "gzip header: flags={:#04x} mtime={} xfl={} os={} ({} bytes)",
            header.flags,
            header.mtime,
            header.xfl,
            header.os,
            header.header_len
        );
        Ok(Self {
            reader,
            header,
            options: InflateOptions::default(),
            body: None,
        })
    }

    /// Set the options used when inflating.
    pub fn options(mut self, options: InflateOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the header.
    pub fn header(&self) -> &GzipHeader {
        &self.header
    }

    /// Get the trailer, reading the rest of the input if needed.
    pub fn trailer(&mut self) -> Result<GzipTrailer> {
        Ok(self.load()?.1)
    }

    fn load(&mut self) -> Result<&(Vec<u8>, GzipTrailer)> {
        let body = match self.body.take() {
            Some(body) => body,
            None => self.read_body()?,
        };
        Ok(self.body.insert(body))
    }

    fn read_body(&mut self) -> Result<(Vec<u8>, GzipTrailer)> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;

        let Some(split) = data.len().checked_sub(GzipTrailer::LEN) else {
            let consumed = (self.header.header_len + data.len()) as u64;
            return Err(DynflateError::unexpected_end(consumed * 8));
        };

        let mut tail = [0u8; GzipTrailer::LEN];
        tail.copy_from_slice(&data[split..]);
        data.truncate(split);

        Ok((data, GzipTrailer::from_bytes(tail)))
    }

    /// Decompress the member into memory.
    pub fn decompress(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.decompress_to(&mut output, |_| {})?;
        Ok(output)
    }

    /// Decompress the member into `writer`, calling `observer` after each
    /// block. Returns the number of bytes written.
    ///
    /// The CRC-32 in the trailer is not checked. A size that disagrees with
    /// ISIZE is logged and otherwise ignored.
    pub fn decompress_to<W, F>(&mut self, writer: &mut W, observer: F) -> Result<u64>
    where
        W: Write,
        F: FnMut(&BlockSummary),
    {
        let mut inflater = Inflater::with_options(self.options);
        let (deflate, trailer) = self.load()?;
        let mut bits = BitReader::new(deflate.as_slice());
        let written = inflater.inflate_to(&mut bits, writer, observer)?;

        if !trailer.size_matches(written) {
            log::warn!(
                "ISIZE mismatch: trailer records {} bytes, decoded {written}",
                trailer.isize
            );
        }

        let unused = deflate.len() as u64 - bits.bytes_consumed();
        if unused > 0 {
            log::debug!("{unused} bytes between the final block and the trailer ignored");
        }

        log::debug!(
            "gzip member: {} blocks, {written} bytes, crc32 {:#010x}",
            inflater.blocks_decoded(),
            trailer.crc32
        );

        Ok(written)
    }
}
