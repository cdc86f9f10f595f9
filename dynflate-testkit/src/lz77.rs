//! Greedy LZ77 tokenizer with hash chains.

/// Maximum back-reference distance (32 KiB).
pub const WINDOW_SIZE: usize = 32768;

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const MAX_CHAIN: usize = 64;
const NIL: usize = usize::MAX;

/// A token of the LZ77 stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference.
    Match {
        /// Number of bytes to copy (3-258).
        length: u16,
        /// Distance back into the output (1-32768).
        distance: u16,
    },
}

impl Token {
    /// Number of output bytes this token produces.
    pub fn output_len(&self) -> usize {
        match self {
            Token::Literal(_) => 1,
            Token::Match { length, .. } => *length as usize,
        }
    }
}

fn hash(data: &[u8], pos: usize) -> usize {
    let h = (data[pos] as u32) << 16 | (data[pos + 1] as u32) << 8 | data[pos + 2] as u32;
    (h.wrapping_mul(2654435761) >> (32 - HASH_BITS)) as usize
}

struct Chains {
    head: Vec<usize>,
    prev: Vec<usize>,
}

impl Chains {
    fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + MIN_MATCH <= data.len() {
            let h = hash(data, pos);
            self.prev[pos] = self.head[h];
            self.head[h] = pos;
        }
    }

    fn longest_match(&self, data: &[u8], pos: usize) -> Option<(usize, usize)> {
        if pos + MIN_MATCH > data.len() {
            return None;
        }

        let max_len = (data.len() - pos).min(MAX_MATCH);
        let mut candidate = self.head[hash(data, pos)];
        let mut best = (0, 0);

        for _ in 0..MAX_CHAIN {
            if candidate == NIL || pos - candidate > WINDOW_SIZE {
                break;
            }
            let len = data[candidate..]
                .iter()
                .zip(&data[pos..pos + max_len])
                .take_while(|(a, b)| a == b)
                .count();
            if len > best.0 {
                best = (len, pos - candidate);
                if len == max_len {
                    break;
                }
            }
            candidate = self.prev[candidate];
        }

        (best.0 >= MIN_MATCH).then_some(best)
    }
}

/// Split `data` into literals and back-references.
pub fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut chains = Chains {
        head: vec![NIL; HASH_SIZE],
        prev: vec![NIL; data.len()],
    };
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        match chains.longest_match(data, pos) {
            Some((length, distance)) => {
                for p in pos..pos + length {
                    chains.insert(data, p);
                }
                tokens.push(Token::Match {
                    length: length as u16,
                    distance: distance as u16,
                });
                pos += length;
            }
            None => {
                chains.insert(data, pos);
                tokens.push(Token::Literal(data[pos]));
                pos += 1;
            }
        }
    }

    tokens
}

/// Replay tokens into bytes.
pub fn replay(tokens: &[Token]) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    for token in tokens {
        match *token {
            Token::Literal(byte) => out.push(byte),
            Token::Match { length, distance } => {
                let start = out.len() - distance as usize;
                for i in 0..length as usize {
                    out.push(out[start + i]);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_repeats() {
        let data = b"abcabcabcabcabc";
        let tokens = tokenize(data);

        assert_eq!(tokens[..3], [
            Token::Literal(b'a'),
            Token::Literal(b'b'),
            Token::Literal(b'c')
        ]);
        assert_eq!(tokens[3], Token::Match {
            length: 12,
            distance: 3
        });
        assert_eq!(replay(&tokens), data);
    }

    #[test]
    fn test_run_of_one_byte() {
        let data = vec![b'z'; 1000];
        let tokens = tokenize(&data);
        assert_eq!(tokens[0], Token::Literal(b'z'));
        assert!(matches!(tokens[1], Token::Match { distance: 1, .. }));
        assert_eq!(replay(&tokens), data);
    }

    #[test]
    fn test_long_distances() {
        let unit: Vec<u8> = (0..40_000u32).map(|i| (i * 7 % 253) as u8).collect();
        let mut data = unit.clone();
        data.extend_from_slice(&unit[..1000]);

        let tokens = tokenize(&data);
        assert_eq!(replay(&tokens), data);
        for token in &tokens {
            if let Token::Match { distance, .. } = token {
                assert!(*distance as usize <= WINDOW_SIZE);
            }
        }
    }
}
