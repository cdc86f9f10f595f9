//! # dynflate inflate
//!
//! Decoder for DEFLATE streams (RFC 1951) made of dynamic Huffman blocks.
//!
//! Each block carries its own Huffman codes. The decoder rebuilds them from
//! the run-length encoded code lengths in the block header, then walks the
//! block body as a state machine, replaying LZ77 back-references against the
//! output window.
//!
//! ## Layout
//!
//! - [`tables`]: length and distance base/extra-bit tables
//! - [`huffman`]: binary decode trie with a bit-by-bit cursor
//! - [`canonical`]: canonical code assignment from code lengths
//! - [`codelen`]: code-length run decoding (symbols 16, 17, 18)
//! - [`header`]: dynamic block header parsing
//! - [`block`]: block body state machine
//! - [`inflate`]: multi-block session
//!
//! Stored (type 0) and fixed Huffman (type 1) blocks are reported as
//! unsupported.
//!
//! ## Example
//!
//! ```rust
//! use dynflate_inflate::{Inflater, InflateOptions, Retention};
//!
//! // A single empty final block of type 0 is rejected.
//! let err = dynflate_inflate::inflate(&[0x01, 0x00, 0x00, 0xFF, 0xFF]).unwrap_err();
//! assert_eq!(err.block_index(), Some(0));
//!
//! let options = InflateOptions::new()
//!     .retention(Retention::Window)
//!     .output_limit(Some(1 << 30));
//! let inflater = Inflater::with_options(options);
//! assert_eq!(inflater.blocks_decoded(), 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod block;
pub mod canonical;
pub mod codelen;
pub mod header;
pub mod huffman;
pub mod inflate;
pub mod tables;

// Re-exports
pub use block::{BlockDecoder, BlockStats, State};
pub use canonical::{Alphabet, CanonicalCode};
pub use codelen::CodeLengthDecoder;
pub use header::DynamicHeader;
pub use huffman::{Codeword, HuffmanTree, Step};
pub use inflate::{BlockSummary, InflateOptions, Inflater, Retention, inflate};
