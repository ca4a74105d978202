//! In-order leaf traversal: chunk iterator and byte reader
//!
//! Both walk the tree with an explicit stack of pending right subtrees, so
//! memory use is bounded by tree depth and nothing is materialized. They
//! borrow the rope, which rules out mutation while a walk is in progress.

use std::io::{self, BufRead, Read};
use std::iter::FusedIterator;

use crate::node::Node;

/// Leaf fragments of a rope, in order. Every chunk is non-empty and
/// char-aligned.
#[derive(Clone, Debug)]
pub struct Chunks<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Chunks<'a> {
    pub(crate) fn new(root: &'a Node) -> Self {
        let mut stack = Vec::with_capacity(root.depth() as usize + 1);
        stack.push(root);
        Self { stack }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while let Some(mut node) = self.stack.pop() {
            loop {
                match node {
                    Node::Leaf { text, .. } => {
                        if text.is_empty() {
                            break;
                        }
                        return Some(&text[..]);
                    }
                    Node::Internal { left, right, .. } => {
                        self.stack.push(&**right);
                        node = &**left;
                    }
                }
            }
        }
        None
    }
}

impl FusedIterator for Chunks<'_> {}

/// Single-pass byte stream over a rope.
///
/// Reads stop at leaf boundaries, so a single `read` may return fewer bytes
/// than the buffer holds; `Ok(0)` means the text is exhausted. Chunk edges
/// seen through `read` can fall inside a multi-byte char when the caller's
/// buffer is small; [`BufRead::fill_buf`] always hands out whole leaves.
#[derive(Clone, Debug)]
pub struct RopeReader<'a> {
    chunks: Chunks<'a>,
    current: &'a [u8],
}

impl<'a> RopeReader<'a> {
    pub(crate) fn new(root: &'a Node) -> Self {
        Self {
            chunks: Chunks::new(root),
            current: &[],
        }
    }
}

impl BufRead for RopeReader<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.current.is_empty() {
            if let Some(chunk) = self.chunks.next() {
                self.current = chunk.as_bytes();
            }
        }
        Ok(self.current)
    }

    fn consume(&mut self, amt: usize) {
        self.current = &self.current[amt.min(self.current.len())..];
    }
}

impl Read for RopeReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RopeConfig;
    use pretty_assertions::assert_eq;

    fn node(text: &str) -> Node {
        Node::from_str(text, &RopeConfig::new(2, 8).unwrap())
    }

    #[test]
    fn chunks_follow_leaf_order() {
        let root = node("abcdefghijklmnopq");
        let chunks: Vec<&str> = Chunks::new(&root).collect();
        assert_eq!(chunks.concat(), "abcdefghijklmnopq");
        assert_eq!(chunks.len(), root.leaf_count());
    }

    #[test]
    fn empty_root_yields_nothing() {
        let root = Node::empty();
        assert_eq!(Chunks::new(&root).next(), None);

        let mut reader = RopeReader::new(&root);
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn small_buffer_reads_split_chars_but_reassemble() {
        let text = "🐿a🐿b🐿c🐿d";
        let root = node(text);
        let mut reader = RopeReader::new(&root);

        let mut out = Vec::new();
        let mut buf = [0u8; 3];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            assert!(n <= 3);
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(String::from_utf8(out).unwrap(), text);

        // Exhausted stays exhausted
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn fill_buf_hands_out_whole_leaves() {
        let root = node("™™™™™™");
        let mut reader = RopeReader::new(&root);

        let first = reader.fill_buf().unwrap().to_vec();
        assert!(std::str::from_utf8(&first).is_ok());
        reader.consume(first.len());

        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert_eq!(String::from_utf8(first).unwrap() + &rest, "™™™™™™");
    }
}
