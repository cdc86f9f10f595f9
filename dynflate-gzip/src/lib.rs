//! # dynflate gzip
//!
//! GZIP container support (RFC 1952) on top of the dynamic-Huffman
//! inflater.
//!
//! The header is parsed in full (optional fields included), the DEFLATE
//! stream is decoded with [`dynflate_inflate::Inflater`] and the trailer is
//! read. Only the first member of a file is decoded. The CRC-32 is reported
//! but never verified; an ISIZE mismatch is logged as a warning.
//!
//! ## Example
//!
//! ```rust
//! use dynflate_gzip::GzipReader;
//! use std::io::Cursor;
//!
//! // Not a GZIP file.
//! assert!(GzipReader::new(Cursor::new(b"PK\x03\x04 not gzip")).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod header;
pub mod reader;

pub use header::{CM_DEFLATE, GZIP_MAGIC, GzipHeader, GzipTrailer, flags};
pub use reader::GzipReader;

pub use dynflate_core::{DynflateError, ErrorKind};

use dynflate_core::error::Result;
use std::io::Read;

/// Decompress a GZIP member.
pub fn decompress<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut gzip_reader = GzipReader::new(reader)?;
    gzip_reader.decompress()
}
