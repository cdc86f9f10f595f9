//! # dynflate testkit
//!
//! Builds exact dynamic-Huffman DEFLATE streams and GZIP members for the
//! dynflate test suites.
//!
//! ```rust
//! use dynflate_testkit::{DeflateBuilder, Token};
//!
//! let tokens = [
//!     Token::Literal(b'a'),
//!     Token::Match { length: 5, distance: 1 },
//! ];
//! let mut builder = DeflateBuilder::new();
//! builder.block(&tokens, true).unwrap();
//! let stream = builder.finish().unwrap();
//! assert!(!stream.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoder;
pub mod gzip;
pub mod lz77;

pub use encoder::{
    CODE_LENGTH_ORDER, DeflateBuilder, LengthSymbol, canonical_codes, complete_lengths, deflate,
    distance_to_code, length_to_code, rle_lengths,
};
pub use gzip::GzipFrame;
pub use lz77::{Token, replay, tokenize};

/// Deterministic text-like sample data.
pub fn sample_text(size: usize) -> Vec<u8> {
    const WORDS: &[&str] = &[
        "block", "huffman", "window", "literal", "distance", "length", "stream", "header",
        "canonical", "symbol", "the", "a", "of", "and", "to", "in",
    ];

    let mut out = Vec::with_capacity(size + 16);
    let mut state = 0x2545_F491u32;
    while out.len() < size {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        out.extend_from_slice(WORDS[state as usize % WORDS.len()].as_bytes());
        out.push(if state % 11 == 0 { b'\n' } else { b' ' });
    }
    out.truncate(size);
    out
}

/// Deterministic high-entropy sample data.
pub fn sample_noise(size: usize) -> Vec<u8> {
    let mut state = 0x9E37_79B9u32;
    (0..size)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        })
        .collect()
}
