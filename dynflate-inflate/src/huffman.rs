//! Huffman decode trees.
//!
//! A [`HuffmanTree`] is a binary trie built one codeword at a time. Decoding
//! walks it bit by bit with an explicit cursor, so the caller never needs to
//! know code lengths in advance: each bit either lands on a leaf, lands on an
//! internal node (more bits needed), or falls off the tree.
//!
//! # Alphabets
//!
//! DEFLATE uses three Huffman alphabets:
//! - **Literal/Length**: 0-285 (0-255 literals, 256 EOB, 257-285 lengths)
//! - **Distance**: 0-29 (back-reference distances)
//! - **Code Length**: 0-18 (for encoding dynamic Huffman trees)

use dynflate_core::BitReader;
use dynflate_core::error::{DynflateError, Result};
use std::fmt;
use std::io::Read;

/// A codeword: the `len` low bits of `bits`, read most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Codeword {
    /// Code value.
    pub bits: u16,
    /// Code length in bits (1-15).
    pub len: u8,
}

impl Codeword {
    /// Create a codeword.
    pub fn new(bits: u16, len: u8) -> Self {
        debug_assert!(len <= 16);
        Self { bits, len }
    }

    /// The `index`-th bit of the path from the root, MSB first.
    #[inline]
    pub fn bit(&self, index: u8) -> bool {
        (self.bits >> (self.len - 1 - index)) & 1 == 1
    }
}

impl fmt::Display for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.len == 0 {
            return Ok(());
        }
        write!(f, "{:0width$b}", self.bits, width = self.len as usize)
    }
}

/// Outcome of advancing the cursor by one bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A leaf was reached; the cursor is back at the root.
    Leaf(u16),
    /// An internal node was reached; more bits are needed.
    Pending,
    /// No codeword continues with this bit.
    Invalid,
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Branch([Option<u32>; 2]),
    Leaf(u16),
}

/// A Huffman decode tree with a traversal cursor.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    /// Node arena; index 0 is the root.
    nodes: Vec<Node>,
    /// Node the cursor is on.
    cursor: u32,
    /// Number of leaves inserted.
    leaves: usize,
}

impl HuffmanTree {
    /// Create an empty tree (a bare root).
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::Branch([None, None])],
            cursor: 0,
            leaves: 0,
        }
    }

    /// Number of symbols in the tree.
    pub fn len(&self) -> usize {
        self.leaves
    }

    /// Check if the tree has no symbols.
    pub fn is_empty(&self) -> bool {
        self.leaves == 0
    }

    /// Insert `symbol` as a leaf at the path spelled by `code`.
    ///
    /// Fails if the path runs through an existing leaf or ends on a node
    /// that is already in use, since either would break the prefix-free
    /// property.
    pub fn insert(&mut self, code: Codeword, symbol: u16) -> Result<()> {
        if code.len == 0 {
            return Err(DynflateError::malformed_tree(format!(
                "empty codeword for symbol {symbol}"
            )));
        }

        let mut node = 0usize;
        for i in 0..code.len {
            let bit = code.bit(i) as usize;
            let last = i + 1 == code.len;

            let children = match self.nodes[node] {
                Node::Branch(children) => children,
                Node::Leaf(other) => {
                    return Err(DynflateError::malformed_tree(format!(
                        "code {code} for symbol {symbol} extends the code of symbol {other}"
                    )));
                }
            };

            node = match children[bit] {
                Some(_) if last => {
                    return Err(DynflateError::malformed_tree(format!(
                        "code {code} for symbol {symbol} is already in use"
                    )));
                }
                Some(child) => child as usize,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(if last {
                        Node::Leaf(symbol)
                    } else {
                        Node::Branch([None, None])
                    });
                    if let Node::Branch(links) = &mut self.nodes[node] {
                        links[bit] = Some(child as u32);
                    }
                    child
                }
            };
        }

        self.leaves += 1;
        Ok(())
    }

    /// Move the cursor back to the root.
    #[inline]
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Advance the cursor by one bit.
    ///
    /// On [`Step::Leaf`] and [`Step::Invalid`] the cursor returns to the root.
    pub fn step(&mut self, bit: bool) -> Step {
        let next = match self.nodes[self.cursor as usize] {
            Node::Branch(children) => children[bit as usize],
            Node::Leaf(_) => None,
        };

        match next {
            None => {
                self.cursor = 0;
                Step::Invalid
            }
            Some(child) => match self.nodes[child as usize] {
                Node::Leaf(symbol) => {
                    self.cursor = 0;
                    Step::Leaf(symbol)
                }
                Node::Branch(_) => {
                    self.cursor = child;
                    Step::Pending
                }
            },
        }
    }

    /// Decode one symbol, reading a bit at a time.
    pub fn decode<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<u16> {
        self.reset();
        loop {
            match self.step(reader.read_bit()?) {
                Step::Leaf(symbol) => return Ok(symbol),
                Step::Pending => continue,
                Step::Invalid => {
                    return Err(DynflateError::malformed_tree(format!(
                        "no codeword matches the bits ending at position {}",
                        reader.bit_position()
                    )));
                }
            }
        }
    }
}

impl Default for HuffmanTree {
    fn default() -> Self {
        Self::new()
    }
}
