//! Bit-level I/O for the DEFLATE bitstream.
//!
//! DEFLATE packs data LSB-first: the first bit of the stream is the least
//! significant bit of the first byte. Multi-bit fields are assembled by
//! shifting each newly pulled byte left by the number of bits already
//! buffered, so a field may straddle any number of byte boundaries.
//!
//! # Example
//!
//! ```
//! use dynflate_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! let mut output = Vec::new();
//! let mut writer = BitWriter::new(&mut output);
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0b1100, 4).unwrap();
//! writer.finish().unwrap();
//!
//! let mut reader = BitReader::new(Cursor::new(&output));
//! assert_eq!(reader.peek_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::{DynflateError, Result};
use std::io::{self, Read, Write};

/// A bit-level reader that wraps any `Read` implementation.
///
/// Bytes are pulled from the source only when a read needs more bits than
/// are buffered. Bits that have been pulled but not consumed stay in the
/// accumulator for the next read.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    /// Underlying reader.
    reader: R,
    /// Bit accumulator (LSB-first).
    buffer: u64,
    /// Number of valid bits in the accumulator.
    bits_in_buffer: u8,
    /// Total bits consumed (for error reporting).
    total_bits_read: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_read: 0,
        }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Consume this `BitReader` and return the underlying reader.
    ///
    /// Bits still buffered are lost.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Number of bits consumed so far.
    pub fn bit_position(&self) -> u64 {
        self.total_bits_read
    }

    /// Number of bits buffered but not yet consumed.
    pub fn buffered_bits(&self) -> u8 {
        self.bits_in_buffer
    }

    /// Number of whole bytes touched by consumed bits.
    ///
    /// A partially consumed byte counts as consumed.
    pub fn bytes_consumed(&self) -> u64 {
        self.total_bits_read.div_ceil(8)
    }

    /// Pull bytes until at least `count` bits are buffered.
    fn fill_buffer(&mut self, count: u8) -> Result<()> {
        debug_assert!(count <= 57, "Cannot fill more than 57 bits at once");

        while self.bits_in_buffer < count {
            let bits_needed = count - self.bits_in_buffer;
            let bytes_needed = bits_needed.div_ceil(8) as usize;

            let mut temp_buf = [0u8; 8];
            match self.reader.read(&mut temp_buf[..bytes_needed]) {
                Ok(0) => {
                    return Err(DynflateError::unexpected_end(self.total_bits_read));
                }
                Ok(n) => {
                    for byte in temp_buf.iter().take(n) {
                        self.buffer |= (*byte as u64) << self.bits_in_buffer;
                        self.bits_in_buffer += 8;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Read and consume up to 32 bits.
    ///
    /// The first bit read ends up in the least significant position of the
    /// result.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        let value = self.peek_bits(count)?;
        self.consume(count);
        Ok(value)
    }

    /// Read up to 32 bits without consuming them.
    ///
    /// The bits stay buffered and are returned again by the next read.
    #[inline]
    pub fn peek_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32, "Cannot read more than 32 bits at once");

        if count == 0 {
            return Ok(0);
        }

        self.fill_buffer(count)?;

        let mask = (1u64 << count).wrapping_sub(1);
        Ok((self.buffer & mask) as u32)
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Drop `count` buffered bits. Callers must have peeked them first.
    fn consume(&mut self, count: u8) {
        debug_assert!(count <= self.bits_in_buffer);
        self.buffer >>= count;
        self.bits_in_buffer -= count;
        self.total_bits_read += count as u64;
    }

    /// Discard bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        let remainder = (self.total_bits_read % 8) as u8;
        if remainder > 0 {
            self.consume(8 - remainder);
        }
    }
}

/// A bit-level writer that wraps any `Write` implementation.
///
/// Bits are packed LSB-first, mirroring [`BitReader`]. Call
/// [`finish`](BitWriter::finish) to pad and emit the final partial byte.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Underlying writer.
    writer: W,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of bits in buffer.
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new `BitWriter` wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_written: 0,
        }
    }

    /// Get the total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    fn flush_bytes(&mut self) -> Result<()> {
        while self.bits_in_buffer >= 8 {
            let byte = (self.buffer & 0xFF) as u8;
            self.writer.write_all(&[byte])?;
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
        }
        Ok(())
    }

    /// Write up to 32 bits, LSB first.
    pub fn write_bits(&mut self, value: u32, count: u8) -> Result<()> {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");

        if count == 0 {
            return Ok(());
        }

        let mask = if count == 32 {
            u32::MAX
        } else {
            (1u32 << count).wrapping_sub(1)
        };

        self.buffer |= ((value & mask) as u64) << self.bits_in_buffer;
        self.bits_in_buffer += count;
        self.total_bits_written += count as u64;

        self.flush_bytes()
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u32, 1)
    }

    /// Write a Huffman codeword, most significant code bit first.
    ///
    /// DEFLATE transmits Huffman codes starting from their MSB even though
    /// every other field is LSB-first.
    pub fn write_code(&mut self, code: u16, len: u8) -> Result<()> {
        for shift in (0..len).rev() {
            self.write_bit((code >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    /// Pad to a byte boundary with zero bits.
    pub fn align_to_byte(&mut self) -> Result<()> {
        if self.bits_in_buffer % 8 != 0 {
            let padding = 8 - (self.bits_in_buffer % 8);
            self.write_bits(0, padding)?;
        }
        Ok(())
    }

    /// Pad the last byte, flush, and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.align_to_byte()?;
        self.flush_bytes()?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}
