//! Block body decoding.
//!
//! The body of a compressed block is a sequence of literal/length symbols,
//! each length followed by a distance, terminated by the end-of-block
//! symbol. [`BlockDecoder`] walks it as an explicit state machine so every
//! intermediate step (extra bits, distance lookup, copy) is observable.
//!
//! ```text
//!                  literal
//!                ┌────────┐
//!                ▼        │
//!   ──► DecodingSymbol ───┘──── 256 ────► BlockDone
//!            ▲     │
//!            │     └─ 257..=285 ─► ResolvingLengthExtra
//!            │                          │ length, distance symbol
//!            │                          ▼
//!            │                   ResolvingDistanceExtra
//!            │                          │ distance
//!            │                          ▼
//!            └───────────────────── CopyingBackref
//! ```

use crate::huffman::HuffmanTree;
use crate::tables::{END_OF_BLOCK, distance_entry, length_entry};
use dynflate_core::error::{DynflateError, Result};
use dynflate_core::{BitReader, OutputWindow};
use std::io::Read;

/// Where the block decoder is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for the next literal/length symbol.
    DecodingSymbol,
    /// A length symbol was decoded; its extra bits follow.
    ResolvingLengthExtra {
        /// Length symbol (257-285).
        symbol: u16,
    },
    /// The length is known and a distance symbol was decoded.
    ResolvingDistanceExtra {
        /// Match length (3-258).
        length: u16,
        /// Distance symbol (0-29).
        symbol: u16,
    },
    /// A complete back-reference is ready to be copied.
    CopyingBackref {
        /// Match length (3-258).
        length: u16,
        /// Match distance (1-32768).
        distance: u16,
    },
    /// The end-of-block symbol was decoded.
    BlockDone,
}

/// Counters collected while decoding one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockStats {
    /// Literal bytes emitted.
    pub literals: u64,
    /// Back-references replayed.
    pub matches: u64,
    /// Total bytes produced by the block.
    pub bytes: u64,
}

/// Decoder for the body of one dynamic Huffman block.
#[derive(Debug)]
pub struct BlockDecoder<'a> {
    litlen: &'a mut HuffmanTree,
    distance: &'a mut HuffmanTree,
    state: State,
    stats: BlockStats,
    output_limit: Option<u64>,
}

impl<'a> BlockDecoder<'a> {
    /// Create a decoder over a block's literal/length and distance trees.
    pub fn new(litlen: &'a mut HuffmanTree, distance: &'a mut HuffmanTree) -> Self {
        Self {
            litlen,
            distance,
            state: State::DecodingSymbol,
            stats: BlockStats::default(),
            output_limit: None,
        }
    }

    /// Fail once the window's absolute position would pass `limit`.
    pub fn with_output_limit(mut self, limit: Option<u64>) -> Self {
        self.output_limit = limit;
        self
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Counters so far.
    pub fn stats(&self) -> BlockStats {
        self.stats
    }

    /// Perform one transition and return the new state.
    pub fn step<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        window: &mut OutputWindow,
    ) -> Result<State> {
        self.state = match self.state {
            State::DecodingSymbol => {
                let symbol = self.litlen.decode(reader)?;
                match symbol {
                    0..=255 => {
                        self.check_limit(window, 1)?;
                        window.push(symbol as u8);
                        self.stats.literals += 1;
                        self.stats.bytes += 1;
                        State::DecodingSymbol
                    }
                    END_OF_BLOCK => State::BlockDone,
                    257..=285 => State::ResolvingLengthExtra { symbol },
                    _ => {
                        return Err(DynflateError::malformed_tree(format!(
                            "invalid literal/length symbol {symbol}"
                        )));
                    }
                }
            }

            State::ResolvingLengthExtra { symbol } => {
                let (base, extra_bits) = length_entry(symbol).ok_or_else(|| {
                    DynflateError::malformed_tree(format!("invalid length symbol {symbol}"))
                })?;
                let length = base + reader.read_bits(extra_bits)? as u16;
                let symbol = self.distance.decode(reader)?;
                State::ResolvingDistanceExtra { length, symbol }
            }

            State::ResolvingDistanceExtra { length, symbol } => {
                let (base, extra_bits) = distance_entry(symbol).ok_or_else(|| {
                    DynflateError::malformed_tree(format!("invalid distance symbol {symbol}"))
                })?;
                let distance = base + reader.read_bits(extra_bits)? as u16;
                State::CopyingBackref { length, distance }
            }

            State::CopyingBackref { length, distance } => {
                self.check_limit(window, length as u64)?;
                window.copy_match(distance as usize, length as usize)?;
                self.stats.matches += 1;
                self.stats.bytes += length as u64;
                State::DecodingSymbol
            }

            State::BlockDone => State::BlockDone,
        };

        Ok(self.state)
    }

    /// Step until the end-of-block symbol.
    pub fn run<R: Read>(
        &mut self,
        reader: &mut BitReader<R>,
        window: &mut OutputWindow,
    ) -> Result<BlockStats> {
        while self.step(reader, window)? != State::BlockDone {}
        Ok(self.stats)
    }

    fn check_limit(&self, window: &OutputWindow, adding: u64) -> Result<()> {
        match self.output_limit {
            Some(limit) if window.position() + adding > limit => {
                Err(DynflateError::output_limit(limit))
            }
            _ => Ok(()),
        }
    }
}
