//! # dynflate core
//!
//! Core components shared by the dynflate crates:
//!
//! - [`bitstream`]: LSB-first bit-level reading (and writing, for test
//!   fixtures)
//! - [`window`]: Output buffer with the 32 KiB back-reference window
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: dynflate CLI                                        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: GZIP container (header, trailer)                    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Inflate (Huffman trees, block decoding)             │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream, OutputWindow (this crate)                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use dynflate_core::bitstream::BitReader;
//! use dynflate_core::window::OutputWindow;
//! use std::io::Cursor;
//!
//! let mut reader = BitReader::new(Cursor::new(vec![0xAB, 0xCD]));
//! assert_eq!(reader.read_bits(12).unwrap(), 0xDAB);
//!
//! let mut window = OutputWindow::new();
//! window.push(b'X');
//! window.copy_match(1, 4).unwrap();
//! assert_eq!(window.output(), b"XXXXX");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use error::{DynflateError, ErrorKind, Result};
pub use window::{OutputWindow, WINDOW_SIZE};
