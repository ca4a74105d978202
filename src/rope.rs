//! The public rope handle
//!
//! `Rope` owns the root node and its leaf configuration. Every edit takes the
//! root out, rebuilds it through split and concat, runs the rebalancer over
//! the result and puts it back. Validation happens before the root is taken,
//! so a returned error leaves the rope exactly as it was.

use std::fmt;
use std::ops::Range;

use crate::balance;
use crate::config::RopeConfig;
use crate::error::{Result, RopeError};
use crate::node::Node;
use crate::reader::{Chunks, RopeReader};
use crate::utf8;

/// Mutable UTF-8 text indexed by char (Unicode scalar value)
#[derive(Clone)]
pub struct Rope {
    root: Node,
    config: RopeConfig,
}

// === Construction ===

impl Rope {
    pub fn new() -> Self {
        Self {
            root: Node::empty(),
            config: RopeConfig::default(),
        }
    }

    pub fn from_str(text: &str) -> Self {
        Self::with_config(text, RopeConfig::default())
    }

    /// Build under custom leaf bounds, which every later edit also uses
    pub fn with_config(text: &str, config: RopeConfig) -> Self {
        let root = Node::from_str(text, &config);
        debug_assert!(root.validate(&config));
        Self { root, config }
    }

    /// Build from raw bytes, rejecting anything that is not UTF-8
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_str(utf8::validate(bytes)?))
    }

    #[inline]
    pub fn config(&self) -> &RopeConfig {
        &self.config
    }
}

// === Queries ===

impl Rope {
    /// Number of chars, O(1)
    #[inline]
    pub fn len_chars(&self) -> usize {
        self.root.char_count()
    }

    /// Number of bytes, O(1)
    #[inline]
    pub fn len_bytes(&self) -> usize {
        self.root.byte_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Depth of the tree; a single leaf has depth 0
    #[inline]
    pub fn depth(&self) -> usize {
        self.root.depth() as usize
    }

    /// Byte offset where char `char_idx` starts. `len_chars()` maps to
    /// `len_bytes()`.
    pub fn char_to_byte(&self, char_idx: usize) -> Result<usize> {
        let len = self.len_chars();
        if char_idx > len {
            return Err(RopeError::index(char_idx, len));
        }
        let (text, leaf_chars, local, byte_base) = self.root.locate_char(char_idx);
        Ok(byte_base + utf8::char_to_byte(text, leaf_chars, local))
    }

    /// Index of the char containing byte `byte_idx`. Offsets inside a
    /// multi-byte char round down to that char.
    pub fn byte_to_char(&self, byte_idx: usize) -> Result<usize> {
        let len = self.len_bytes();
        if byte_idx > len {
            return Err(RopeError::index(byte_idx, len));
        }
        let (text, local, char_base) = self.root.locate_byte(byte_idx);
        Ok(char_base + utf8::byte_to_char(text, local))
    }

    pub fn char(&self, char_idx: usize) -> Result<char> {
        let len = self.len_chars();
        if char_idx >= len {
            return Err(RopeError::index(char_idx, len));
        }
        let (text, leaf_chars, local, _) = self.root.locate_char(char_idx);
        let byte = utf8::char_to_byte(text, leaf_chars, local);
        text[byte..]
            .chars()
            .next()
            .ok_or_else(|| RopeError::index(char_idx, len))
    }

    /// Leaf fragments in order
    pub fn chunks(&self) -> Chunks<'_> {
        Chunks::new(&self.root)
    }

    /// Byte stream over the text as it is now. The rope cannot be edited
    /// while the reader is alive.
    pub fn reader(&self) -> RopeReader<'_> {
        RopeReader::new(&self.root)
    }
}

// === Edits ===

impl Rope {
    /// Insert `text` so that it starts at char `char_idx`
    pub fn insert(&mut self, char_idx: usize, text: &str) -> Result<()> {
        let len = self.len_chars();
        if char_idx > len {
            return Err(RopeError::index(char_idx, len));
        }
        if text.is_empty() {
            return Ok(());
        }

        let inserted = Node::from_str(text, &self.config);
        tracing::trace!(
            char_idx,
            bytes = inserted.byte_count(),
            chars = inserted.char_count(),
            "rope insert"
        );

        let max_leaf = self.config.max_leaf();
        let (before, after) = self.take_root().split(char_idx, max_leaf);
        let root = Node::concat(Node::concat(before, inserted, max_leaf), after, max_leaf);
        self.replace_root(root);
        Ok(())
    }

    /// [`Rope::insert`] for raw bytes; fails before touching the rope if they
    /// are not UTF-8
    pub fn insert_bytes(&mut self, char_idx: usize, bytes: &[u8]) -> Result<()> {
        let len = self.len_chars();
        if char_idx > len {
            return Err(RopeError::index(char_idx, len));
        }
        self.insert(char_idx, utf8::validate(bytes)?)
    }

    /// Remove the chars in `range`. An empty range is a no-op.
    pub fn remove(&mut self, range: Range<usize>) -> Result<()> {
        let Range { start, end } = range;
        let len = self.len_chars();
        if start > end || end > len {
            return Err(RopeError::IndexOutOfRange { start, end, len });
        }
        if start == end {
            return Ok(());
        }

        let max_leaf = self.config.max_leaf();
        let (before, rest) = self.take_root().split(start, max_leaf);
        let (removed, after) = rest.split(end - start, max_leaf);
        tracing::trace!(start, end, bytes = removed.byte_count(), "rope remove");

        self.replace_root(Node::concat(before, after, max_leaf));
        Ok(())
    }

    /// Move all of `other` onto the end of this rope
    pub fn append(&mut self, other: Rope) {
        if other.is_empty() {
            return;
        }
        tracing::trace!(
            bytes = other.len_bytes(),
            chars = other.len_chars(),
            "rope append"
        );

        // Leaves built under a larger max_leaf have to be cut down first
        let other = if other.config.max_leaf() > self.config.max_leaf() {
            Node::from_str(&String::from(&other), &self.config)
        } else {
            other.root
        };
        let root = Node::concat(self.take_root(), other, self.config.max_leaf());
        self.replace_root(root);
    }

    fn take_root(&mut self) -> Node {
        std::mem::replace(&mut self.root, Node::empty())
    }

    fn replace_root(&mut self, root: Node) {
        self.root = balance::rebalance(root, &self.config);
        debug_assert!(self.root.validate(&self.config));
    }
}

// === Trait impls ===

impl Default for Rope {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Rope {
    fn from(text: &str) -> Self {
        Self::from_str(text)
    }
}

impl From<String> for Rope {
    fn from(text: String) -> Self {
        Self::from_str(&text)
    }
}

impl From<&Rope> for String {
    /// One pre-sized pass over the leaves
    fn from(rope: &Rope) -> Self {
        let mut out = String::with_capacity(rope.len_bytes());
        rope.chunks().for_each(|chunk| out.push_str(chunk));
        out
    }
}

impl fmt::Display for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chunks().try_for_each(|chunk| f.write_str(chunk))
    }
}

impl fmt::Debug for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.chunks()).finish()
    }
}

/// Compare chunk streams whose boundaries need not line up
fn chunks_eq<'a, 'b>(
    mut a: impl Iterator<Item = &'a str>,
    mut b: impl Iterator<Item = &'b str>,
) -> bool {
    let (mut x, mut y): (&[u8], &[u8]) = (&[], &[]);
    loop {
        if x.is_empty() {
            x = match a.next() {
                Some(chunk) => chunk.as_bytes(),
                None => return y.is_empty() && b.all(str::is_empty),
            };
        }
        if y.is_empty() {
            y = match b.next() {
                Some(chunk) => chunk.as_bytes(),
                None => return x.is_empty() && a.all(str::is_empty),
            };
        }
        let n = x.len().min(y.len());
        if x[..n] != y[..n] {
            return false;
        }
        x = &x[n..];
        y = &y[n..];
    }
}

impl PartialEq for Rope {
    fn eq(&self, other: &Rope) -> bool {
        self.len_bytes() == other.len_bytes() && chunks_eq(self.chunks(), other.chunks())
    }
}

impl Eq for Rope {}

impl PartialEq<str> for Rope {
    fn eq(&self, other: &str) -> bool {
        self.len_bytes() == other.len() && chunks_eq(self.chunks(), std::iter::once(other))
    }
}

impl PartialEq<&str> for Rope {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl PartialEq<Rope> for str {
    fn eq(&self, other: &Rope) -> bool {
        *other == *self
    }
}

impl PartialEq<Rope> for &str {
    fn eq(&self, other: &Rope) -> bool {
        *other == **self
    }
}
