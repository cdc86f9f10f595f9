//! Error types for dynflate operations.
//!
//! Every failure in the decoder is fatal for the session: nothing is retried
//! and no partial output is handed back as if it were complete. Errors raised
//! while a DEFLATE block is being decoded are wrapped in
//! [`DynflateError::InBlock`] so the caller can tell which block failed.

use std::fmt;
use std::io;
use thiserror::Error;

/// The main error type for dynflate operations.
#[derive(Debug, Error)]
pub enum DynflateError {
    /// I/O error from the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The byte source ran dry while bits were still required.
    #[error("Unexpected end of stream at bit position {bit_position}")]
    UnexpectedEndOfStream {
        /// Number of bits consumed when the source was exhausted.
        bit_position: u64,
    },

    /// Stored, fixed-Huffman and reserved blocks are not decoded.
    #[error("Unsupported block type {btype}: only dynamic Huffman blocks (type 2) are decoded")]
    UnsupportedBlockType {
        /// The BTYPE field of the block header.
        btype: u8,
    },

    /// A Huffman code could not be built or a bit path led nowhere.
    #[error("Malformed Huffman tree: {reason}")]
    MalformedHuffmanTree {
        /// What was wrong with the code.
        reason: String,
    },

    /// Code-length symbol 16 appeared before any length was decoded.
    #[error("Repeat instruction 16 with no previous code length")]
    InvalidRepeatAtStart,

    /// A repeat instruction would write past the end of the code-length array.
    #[error("Code length overflow: run of {requested} exceeds {remaining} remaining slots")]
    CodeLengthOverflow {
        /// Length of the run requested by the instruction.
        requested: usize,
        /// Slots left in the array.
        remaining: usize,
    },

    /// A distance reaches back before the first byte of output.
    #[error("Back-reference distance {distance} exceeds {available} bytes of history")]
    BackReferenceOutOfRange {
        /// The decoded distance.
        distance: usize,
        /// Bytes of history available at that point.
        available: usize,
    },

    /// Invalid magic number in a container header.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Unsupported container compression method.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The compression method identifier.
        method: String,
    },

    /// Invalid container header.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// The configured output limit was reached.
    #[error("Output limit of {limit} bytes exceeded")]
    OutputLimitExceeded {
        /// The configured limit.
        limit: u64,
    },

    /// An error raised while decoding a particular block.
    #[error("block {index}: {source}")]
    InBlock {
        /// Zero-based index of the block.
        index: usize,
        /// The underlying error.
        #[source]
        source: Box<DynflateError>,
    },
}

/// Result type alias for dynflate operations.
pub type Result<T> = std::result::Result<T, DynflateError>;

/// Coarse classification of a [`DynflateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// I/O failure other than running out of input.
    Io,
    /// Input exhausted mid-read.
    UnexpectedEndOfStream,
    /// Block type other than dynamic Huffman.
    UnsupportedBlockType,
    /// Invalid or unusable Huffman code.
    MalformedHuffmanTree,
    /// Copy-previous instruction with nothing to copy.
    InvalidRepeatAtStart,
    /// Repeat instruction runs past the code-length array.
    CodeLengthOverflow,
    /// Distance reaches before the start of output.
    BackReferenceOutOfRange,
    /// GZIP container rejected the input.
    InvalidContainer,
    /// Output limit reached.
    OutputLimitExceeded,
}

impl ErrorKind {
    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Io => "I/O error",
            Self::UnexpectedEndOfStream => "unexpected end of stream",
            Self::UnsupportedBlockType => "unsupported block type",
            Self::MalformedHuffmanTree => "malformed Huffman tree",
            Self::InvalidRepeatAtStart => "repeat with no previous length",
            Self::CodeLengthOverflow => "code length overflow",
            Self::BackReferenceOutOfRange => "back-reference out of range",
            Self::InvalidContainer => "invalid GZIP container",
            Self::OutputLimitExceeded => "output limit exceeded",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DynflateError {
    /// Create an unexpected end-of-stream error.
    pub fn unexpected_end(bit_position: u64) -> Self {
        Self::UnexpectedEndOfStream { bit_position }
    }

    /// Create an unsupported block type error.
    pub fn unsupported_block(btype: u8) -> Self {
        Self::UnsupportedBlockType { btype }
    }

    /// Create a malformed Huffman tree error.
    pub fn malformed_tree(reason: impl Into<String>) -> Self {
        Self::MalformedHuffmanTree {
            reason: reason.into(),
        }
    }

    /// Create a code-length overflow error.
    pub fn code_length_overflow(requested: usize, remaining: usize) -> Self {
        Self::CodeLengthOverflow {
            requested,
            remaining,
        }
    }

    /// Create a back-reference out-of-range error.
    pub fn back_reference(distance: usize, available: usize) -> Self {
        Self::BackReferenceOutOfRange {
            distance,
            available,
        }
    }

    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unsupported method error.
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an output limit error.
    pub fn output_limit(limit: u64) -> Self {
        Self::OutputLimitExceeded { limit }
    }

    /// Attach a block index to this error.
    ///
    /// An error that already carries a block index is returned unchanged.
    pub fn in_block(self, index: usize) -> Self {
        match self {
            Self::InBlock { .. } => self,
            other => Self::InBlock {
                index,
                source: Box::new(other),
            },
        }
    }

    /// The index of the block that failed, if the error came from one.
    pub fn block_index(&self) -> Option<usize> {
        match self {
            Self::InBlock { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Classify this error, looking through any block context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                ErrorKind::UnexpectedEndOfStream
            }
            Self::Io(_) => ErrorKind::Io,
            Self::UnexpectedEndOfStream { .. } => ErrorKind::UnexpectedEndOfStream,
            Self::UnsupportedBlockType { .. } => ErrorKind::UnsupportedBlockType,
            Self::MalformedHuffmanTree { .. } => ErrorKind::MalformedHuffmanTree,
            Self::InvalidRepeatAtStart => ErrorKind::InvalidRepeatAtStart,
            Self::CodeLengthOverflow { .. } => ErrorKind::CodeLengthOverflow,
            Self::BackReferenceOutOfRange { .. } => ErrorKind::BackReferenceOutOfRange,
            Self::InvalidMagic { .. }
            | Self::UnsupportedMethod { .. }
            | Self::InvalidHeader { .. } => ErrorKind::InvalidContainer,
            Self::OutputLimitExceeded { .. } => ErrorKind::OutputLimitExceeded,
            Self::InBlock { source, .. } => source.kind(),
        }
    }
}
