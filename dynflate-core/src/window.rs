//! Output buffer and sliding window for LZ77 back-references.
//!
//! [`OutputWindow`] is the append-only output of a decompression session.
//! Positions are tracked in absolute terms (bytes produced since the start of
//! the stream), while the bytes themselves live in a physical buffer whose
//! first byte sits at absolute offset [`base`](OutputWindow::base).
//!
//! In full-retention mode nothing is ever dropped. When the caller streams
//! output elsewhere it can [`slide`](OutputWindow::slide) the window at a
//! block boundary: everything older than [`WINDOW_SIZE`] bytes that has
//! already been flushed is discarded and `base` advances by the same amount,
//! so an absolute position `p` is always found at physical index `p - base`.

use crate::error::{DynflateError, Result};
use std::io::Write;

/// Maximum back-reference distance in DEFLATE (32 KiB).
pub const WINDOW_SIZE: usize = 32768;

/// Append-only output buffer with a bounded back-reference window.
#[derive(Debug, Clone, Default)]
pub struct OutputWindow {
    /// Retained bytes; `buffer[0]` is at absolute offset `base`.
    buffer: Vec<u8>,
    /// Absolute offset of the first retained byte.
    base: u64,
    /// Absolute offset up to which bytes have been handed out.
    flushed: u64,
}

impl OutputWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty window with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Absolute write position: total bytes produced so far.
    pub fn position(&self) -> u64 {
        self.base + self.buffer.len() as u64
    }

    /// Absolute offset of the first retained byte.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Number of bytes currently addressable by a back-reference.
    pub fn history_len(&self) -> usize {
        self.buffer.len().min(WINDOW_SIZE)
    }

    /// Append a literal byte.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    /// Append several literal bytes.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Replay a back-reference: copy `length` bytes starting `distance`
    /// bytes behind the write position.
    ///
    /// Bytes are copied one at a time, so a distance shorter than the length
    /// repeats the tail (`distance = 1` smears the last byte).
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        let available = self.history_len();
        if distance == 0 || distance > available {
            return Err(DynflateError::back_reference(distance, available));
        }

        self.buffer.reserve(length);
        let mut src = self.buffer.len() - distance;
        for _ in 0..length {
            let byte = self.buffer[src];
            self.buffer.push(byte);
            src += 1;
        }

        Ok(())
    }

    /// Look up the byte at an absolute position, if it is still retained.
    pub fn byte_at(&self, absolute: u64) -> Option<u8> {
        let index = absolute.checked_sub(self.base)?;
        self.buffer.get(usize::try_from(index).ok()?).copied()
    }

    /// Bytes produced since the last flush.
    pub fn pending(&self) -> &[u8] {
        let start = (self.flushed - self.base) as usize;
        &self.buffer[start..]
    }

    /// Write the pending bytes to `writer` and mark them as flushed.
    ///
    /// Returns the number of bytes written.
    pub fn flush_to<W: Write>(&mut self, writer: &mut W) -> Result<usize> {
        let pending = self.pending();
        let count = pending.len();
        writer.write_all(pending)?;
        self.flushed = self.position();
        Ok(count)
    }

    /// Drop flushed bytes that can no longer be referenced.
    ///
    /// Keeps the last [`WINDOW_SIZE`] bytes plus anything not yet flushed, and
    /// advances `base` by the number of bytes discarded. Returns that number.
    pub fn slide(&mut self) -> usize {
        let keep_from = self
            .position()
            .saturating_sub(WINDOW_SIZE as u64)
            .min(self.flushed)
            .max(self.base);
        let discard = (keep_from - self.base) as usize;
        if discard > 0 {
            self.buffer.drain(..discard);
            self.base = keep_from;
        }
        discard
    }

    /// All retained bytes.
    pub fn output(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the window and return the retained bytes.
    pub fn into_output(self) -> Vec<u8> {
        self.buffer
    }

    /// Forget all output.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.base = 0;
        self.flushed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_copy_match() {
        let mut window = OutputWindow::new();
        window.extend_from_slice(b"Hello");
        window.copy_match(5, 5).unwrap();
        assert_eq!(window.output(), b"HelloHello");
    }

    #[test]
    fn test_copy_overlap() {
        // "AB" -> distance=2, length=6 -> "ABABAB"
        let mut window = OutputWindow::new();
        window.extend_from_slice(b"AB");
        window.copy_match(2, 6).unwrap();
        assert_eq!(window.output(), b"ABABABAB");
    }

    #[test]
    fn test_single_byte_repeat() {
        let mut window = OutputWindow::new();
        window.extend_from_slice(b"..X");
        window.copy_match(1, 5).unwrap();
        assert_eq!(window.output(), b"..XXXXXX");
    }

    #[test]
    fn test_distance_out_of_range() {
        let mut window = OutputWindow::new();
        assert_eq!(
            window.copy_match(1, 3).unwrap_err().kind(),
            ErrorKind::BackReferenceOutOfRange
        );

        window.extend_from_slice(b"abc");
        let err = window.copy_match(4, 3).unwrap_err();
        assert!(matches!(
            err,
            DynflateError::BackReferenceOutOfRange {
                distance: 4,
                available: 3
            }
        ));
        // Nothing was written by the failed copy.
        assert_eq!(window.output(), b"abc");

        assert!(window.copy_match(0, 3).is_err());
    }

    #[test]
    fn test_slide_keeps_unflushed() {
        let mut window = OutputWindow::new();
        window.extend_from_slice(&vec![7u8; WINDOW_SIZE + 100]);

        // Nothing flushed yet: nothing may be dropped.
        assert_eq!(window.slide(), 0);

        let mut sink = Vec::new();
        assert_eq!(window.flush_to(&mut sink).unwrap(), WINDOW_SIZE + 100);
        assert_eq!(window.slide(), 100);
        assert_eq!(window.base(), 100);
        assert_eq!(window.output().len(), WINDOW_SIZE);
        assert_eq!(window.position(), (WINDOW_SIZE + 100) as u64);
        assert!(window.pending().is_empty());
    }

    #[test]
    fn test_slide_translates_positions() {
        let mut window = OutputWindow::new();
        let data: Vec<u8> = (0..WINDOW_SIZE * 2).map(|i| (i % 251) as u8).collect();
        window.extend_from_slice(&data);

        let mut sink = Vec::new();
        window.flush_to(&mut sink).unwrap();
        window.slide();

        // Absolute positions still resolve to the same bytes.
        let last = (WINDOW_SIZE * 2 - 1) as u64;
        assert_eq!(window.byte_at(last), Some(data[WINDOW_SIZE * 2 - 1]));
        assert_eq!(window.byte_at(WINDOW_SIZE as u64), Some(data[WINDOW_SIZE]));
        assert_eq!(window.byte_at(0), None);

        // A maximum-distance copy reaches the oldest retained byte.
        window.copy_match(WINDOW_SIZE, 2).unwrap();
        assert_eq!(window.pending(), &data[WINDOW_SIZE..WINDOW_SIZE + 2]);
    }

    #[test]
    fn test_flush_only_new_bytes() {
        let mut window = OutputWindow::new();
        let mut sink = Vec::new();

        window.extend_from_slice(b"abc");
        window.flush_to(&mut sink).unwrap();
        window.copy_match(3, 3).unwrap();
        window.flush_to(&mut sink).unwrap();

        assert_eq!(sink, b"abcabc");
    }
}
