//! Decoding of run-length encoded code lengths (RFC 1951 Section 3.2.7).
//!
//! The literal/length and distance code lengths of a dynamic block are sent
//! as one sequence of code-length symbols:
//!
//! | symbol | meaning                                   |
//! |--------|-------------------------------------------|
//! | 0-15   | a code length                             |
//! | 16     | repeat the previous length 3-6 times      |
//! | 17     | repeat a zero length 3-10 times           |
//! | 18     | repeat a zero length 11-138 times         |
//!
//! The two arrays are decoded by separate calls to
//! [`CodeLengthDecoder::decode`], but the previous length and any run that
//! has not been fully written carry over from the first call to the second.

use crate::huffman::HuffmanTree;
use dynflate_core::BitReader;
use dynflate_core::error::{DynflateError, Result};
use std::io::Read;
use std::iter;

/// Decodes code-length arrays with a code-length alphabet tree.
#[derive(Debug)]
pub struct CodeLengthDecoder<'a> {
    tree: &'a mut HuffmanTree,
    /// Slots not yet claimed by a decoded symbol.
    remaining: usize,
    /// Last length written, for symbol 16.
    previous: Option<u8>,
    /// Part of a run that did not fit into the previous array.
    pending: Option<(u8, usize)>,
}

impl<'a> CodeLengthDecoder<'a> {
    /// Create a decoder that will fill `total` slots across all calls.
    pub fn new(tree: &'a mut HuffmanTree, total: usize) -> Self {
        Self {
            tree,
            remaining: total,
            previous: None,
            pending: None,
        }
    }

    /// Slots left to decode across all future calls.
    pub fn remaining(&self) -> usize {
        self.remaining + self.pending.map_or(0, |(_, count)| count)
    }

    /// Decode exactly `size` code lengths.
    pub fn decode<R: Read>(&mut self, reader: &mut BitReader<R>, size: usize) -> Result<Vec<u8>> {
        let mut lengths = Vec::with_capacity(size);

        if let Some((value, count)) = self.pending.take() {
            self.write_run(&mut lengths, size, value, count);
        }

        while lengths.len() < size {
            let symbol = self.tree.decode(reader)?;

            let (value, count) = match symbol {
                0..=15 => (symbol as u8, 1),
                16 => {
                    let previous = self.previous.ok_or(DynflateError::InvalidRepeatAtStart)?;
                    (previous, 3 + reader.read_bits(2)? as usize)
                }
                17 => (0, 3 + reader.read_bits(3)? as usize),
                18 => (0, 11 + reader.read_bits(7)? as usize),
                _ => {
                    return Err(DynflateError::malformed_tree(format!(
                        "code-length symbol {symbol} out of range"
                    )));
                }
            };

            if count > self.remaining {
                return Err(DynflateError::code_length_overflow(count, self.remaining));
            }
            self.remaining -= count;
            self.previous = Some(value);
            self.write_run(&mut lengths, size, value, count);
        }

        Ok(lengths)
    }

    /// Write as much of a run as fits into `lengths` and keep the rest.
    fn write_run(&mut self, lengths: &mut Vec<u8>, size: usize, value: u8, count: usize) {
        let now = count.min(size - lengths.len());
        lengths.extend(iter::repeat_n(value, now));
        if count > now {
            self.pending = Some((value, count - now));
        }
    }
}
