//! Binary rope nodes with cached char/byte sums
//!
//! A leaf owns one UTF-8 fragment. An internal node owns exactly two children
//! and caches the sums of its left subtree next to the totals of the whole
//! subtree, so descending by char or byte index never has to look further
//! than the node it is standing on.

use std::ops::Add;

use crate::config::RopeConfig;
use crate::utf8;

/// Aggregated metadata for O(log n) queries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Sums {
    pub bytes: usize,
    pub chars: usize,
    /// Number of leaves underneath (1 for a leaf, even an empty one)
    pub leaves: usize,
}

impl Sums {
    fn of_text(bytes: usize, chars: usize) -> Self {
        Sums {
            bytes,
            chars,
            leaves: 1,
        }
    }
}

impl Add for Sums {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Sums {
            bytes: self.bytes + rhs.bytes,
            chars: self.chars + rhs.chars,
            leaves: self.leaves + rhs.leaves,
        }
    }
}

/// Tree node - either a text fragment or a pair of owned subtrees
#[derive(Clone, Debug)]
pub(crate) enum Node {
    Leaf {
        text: Box<str>,
        sums: Sums,
    },
    Internal {
        left: Box<Node>,
        right: Box<Node>,
        left_sums: Sums,
        sums: Sums,
        depth: u32,
    },
}

impl Node {
    pub fn empty() -> Self {
        Node::Leaf {
            text: Box::from(""),
            sums: Sums::of_text(0, 0),
        }
    }

    pub fn leaf(text: &str) -> Self {
        Self::leaf_with_chars(Box::from(text), utf8::count_chars(text))
    }

    pub fn leaf_with_chars(text: Box<str>, chars: usize) -> Self {
        Node::Leaf {
            sums: Sums::of_text(text.len(), chars),
            text,
        }
    }

    pub fn internal(left: Node, right: Node) -> Self {
        let left_sums = *left.sums();
        Node::Internal {
            sums: left_sums + *right.sums(),
            depth: left.depth().max(right.depth()) + 1,
            left_sums,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Chunk `text` into leaves and assemble a balanced tree over them
    pub fn from_str(text: &str, config: &RopeConfig) -> Self {
        let leaves: Vec<Node> = utf8::chunks(text, config.max_leaf())
            .into_iter()
            .map(Node::leaf)
            .collect();
        Self::from_leaves(leaves)
    }

    /// Assemble leaves, in order, into a tree whose every pair of sibling
    /// subtrees differs by at most one leaf. Depth is `ceil(log2(n))`.
    pub fn from_leaves(leaves: Vec<Node>) -> Self {
        let count = leaves.len();
        if count == 0 {
            return Self::empty();
        }
        let mut leaves = leaves.into_iter();
        Self::build(&mut leaves, count).unwrap_or_else(Self::empty)
    }

    fn build(leaves: &mut impl Iterator<Item = Node>, count: usize) -> Option<Self> {
        if count <= 1 {
            return leaves.next();
        }
        let half = count / 2;
        let left = Self::build(leaves, half)?;
        let right = Self::build(leaves, count - half)?;
        Some(Self::internal(left, right))
    }

    /// Move every non-empty leaf, in order, into `out`
    pub fn into_leaves(self, out: &mut Vec<Node>) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf { ref text, .. } if text.is_empty() => {}
                leaf @ Node::Leaf { .. } => out.push(leaf),
                Node::Internal { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }
    }

    /// Get reference to sums regardless of node type
    #[inline]
    pub fn sums(&self) -> &Sums {
        match self {
            Node::Leaf { sums, .. } | Node::Internal { sums, .. } => sums,
        }
    }

    #[inline]
    pub fn byte_count(&self) -> usize {
        self.sums().bytes
    }

    #[inline]
    pub fn char_count(&self) -> usize {
        self.sums().chars
    }

    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.sums().leaves
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { depth, .. } => *depth,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.byte_count() == 0
    }

    /// Descend to the leaf holding global char `char_idx`.
    ///
    /// Returns the leaf text, its char count, the char offset inside it, and
    /// the global byte offset where the leaf starts. `char_idx == char_count()`
    /// lands at the end of the last leaf.
    pub fn locate_char(&self, char_idx: usize) -> (&str, usize, usize, usize) {
        let mut node = self;
        let mut char_idx = char_idx;
        let mut byte_base = 0;
        loop {
            match node {
                Node::Leaf { text, sums } => return (&text[..], sums.chars, char_idx, byte_base),
                Node::Internal {
                    left,
                    right,
                    left_sums,
                    ..
                } => {
                    if char_idx < left_sums.chars {
                        node = left;
                    } else {
                        char_idx -= left_sums.chars;
                        byte_base += left_sums.bytes;
                        node = right;
                    }
                }
            }
        }
    }

    /// Byte-indexed counterpart of [`Node::locate_char`]; returns the leaf
    /// text, the byte offset inside it and the global char offset of the leaf.
    pub fn locate_byte(&self, byte_idx: usize) -> (&str, usize, usize) {
        let mut node = self;
        let mut byte_idx = byte_idx;
        let mut char_base = 0;
        loop {
            match node {
                Node::Leaf { text, .. } => return (&text[..], byte_idx, char_base),
                Node::Internal {
                    left,
                    right,
                    left_sums,
                    ..
                } => {
                    if byte_idx < left_sums.bytes {
                        node = left;
                    } else {
                        byte_idx -= left_sums.bytes;
                        char_base += left_sums.chars;
                        node = right;
                    }
                }
            }
        }
    }

    /// Bytes in the rightmost leaf
    pub fn last_leaf_bytes(&self) -> usize {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { sums, .. } => return sums.bytes,
                Node::Internal { right, .. } => node = right,
            }
        }
    }

    /// Bytes in the leftmost leaf
    pub fn first_leaf_bytes(&self) -> usize {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { sums, .. } => return sums.bytes,
                Node::Internal { left, .. } => node = left,
            }
        }
    }

    /// Replace the rightmost leaf with one that has `suffix` appended,
    /// refreshing sums along the right spine. Shape and depth are unchanged.
    pub fn append_to_last_leaf(&mut self, suffix: &str, suffix_sums: Sums) {
        match self {
            Node::Leaf { text, sums } => {
                let mut joined = String::with_capacity(text.len() + suffix.len());
                joined.push_str(text);
                joined.push_str(suffix);
                *text = joined.into_boxed_str();
                sums.bytes += suffix_sums.bytes;
                sums.chars += suffix_sums.chars;
            }
            Node::Internal { right, sums, .. } => {
                right.append_to_last_leaf(suffix, suffix_sums);
                sums.bytes += suffix_sums.bytes;
                sums.chars += suffix_sums.chars;
            }
        }
    }

    /// Replace the leftmost leaf with one that has `prefix` prepended,
    /// refreshing sums along the left spine. Shape and depth are unchanged.
    pub fn prepend_to_first_leaf(&mut self, prefix: &str, prefix_sums: Sums) {
        match self {
            Node::Leaf { text, sums } => {
                let mut joined = String::with_capacity(prefix.len() + text.len());
                joined.push_str(prefix);
                joined.push_str(text);
                *text = joined.into_boxed_str();
                sums.bytes += prefix_sums.bytes;
                sums.chars += prefix_sums.chars;
            }
            Node::Internal {
                left,
                left_sums,
                sums,
                ..
            } => {
                left.prepend_to_first_leaf(prefix, prefix_sums);
                left_sums.bytes += prefix_sums.bytes;
                left_sums.chars += prefix_sums.chars;
                sums.bytes += prefix_sums.bytes;
                sums.chars += prefix_sums.chars;
            }
        }
    }

    /// Check structural invariants (debug builds only)
    #[cfg(debug_assertions)]
    pub fn validate(&self, config: &RopeConfig) -> bool {
        self.validate_subtree(config, true)
    }

    #[cfg(not(debug_assertions))]
    pub fn validate(&self, _config: &RopeConfig) -> bool {
        true // No-op in release builds
    }

    #[cfg(debug_assertions)]
    fn validate_subtree(&self, config: &RopeConfig, is_root: bool) -> bool {
        match self {
            Node::Leaf { text, sums } => {
                let computed = Sums::of_text(text.len(), utf8::count_chars(text));
                if *sums != computed {
                    tracing::error!(stored = ?sums, ?computed, "leaf sums mismatch");
                    return false;
                }
                if text.is_empty() && !is_root {
                    tracing::error!("empty leaf below an internal node");
                    return false;
                }
                if text.len() > config.max_leaf() {
                    tracing::error!(
                        bytes = text.len(),
                        max_leaf = config.max_leaf(),
                        "leaf exceeds max_leaf"
                    );
                    return false;
                }
                true
            }
            Node::Internal {
                left,
                right,
                left_sums,
                sums,
                depth,
            } => {
                if !left.validate_subtree(config, false) || !right.validate_subtree(config, false) {
                    return false;
                }
                if left_sums != left.sums() {
                    tracing::error!(stored = ?left_sums, computed = ?left.sums(), "left sums mismatch");
                    return false;
                }
                let computed = *left.sums() + *right.sums();
                if *sums != computed {
                    tracing::error!(stored = ?sums, ?computed, "internal sums mismatch");
                    return false;
                }
                let computed_depth = left.depth().max(right.depth()) + 1;
                if *depth != computed_depth {
                    tracing::error!(stored = depth, computed = computed_depth, "depth mismatch");
                    return false;
                }
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn small() -> RopeConfig {
        RopeConfig::new(2, 8).unwrap()
    }

    fn collect(node: &Node) -> String {
        let mut leaves = Vec::new();
        node.clone().into_leaves(&mut leaves);
        leaves
            .iter()
            .map(|leaf| match leaf {
                Node::Leaf { text, .. } => text.to_string(),
                Node::Internal { .. } => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn empty_text_is_a_single_empty_leaf() {
        let node = Node::from_str("", &small());
        assert!(matches!(node, Node::Leaf { .. }));
        assert_eq!(node.char_count(), 0);
        assert_eq!(node.byte_count(), 0);
        assert_eq!(node.depth(), 0);
        assert!(node.validate(&small()));
    }

    #[test]
    fn build_is_balanced() {
        let text = "abcdefgh".repeat(9); // 72 bytes -> 9 leaves of 8
        let node = Node::from_str(&text, &small());

        assert_eq!(node.leaf_count(), 9);
        assert_eq!(node.depth(), 4); // ceil(log2(9))
        assert_eq!(node.char_count(), 72);
        assert_eq!(collect(&node), text);
        assert!(node.validate(&small()));
    }

    #[test]
    fn sums_count_chars_and_bytes_separately() {
        let text = "🐿🐿🐿🐿🐿";
        let node = Node::from_str(text, &small());

        assert_eq!(node.char_count(), 5);
        assert_eq!(node.byte_count(), 20);
        assert_eq!(node.leaf_count(), 3);
        assert!(node.validate(&small()));
    }

    #[test]
    fn locate_char_descends_left_then_right() {
        let node = Node::from_str("abcdefghijklmnop", &small());

        let (text, chars, local, byte_base) = node.locate_char(0);
        assert_eq!((text, chars, local, byte_base), ("abcdefgh", 8, 0, 0));

        let (text, _, local, byte_base) = node.locate_char(8);
        assert_eq!((text, local, byte_base), ("ijklmnop", 0, 8));

        // One past the end lands at the end of the last leaf
        let (text, _, local, byte_base) = node.locate_char(16);
        assert_eq!((text, local, byte_base), ("ijklmnop", 8, 8));
    }

    #[test]
    fn locate_byte_reports_char_base() {
        let node = Node::from_str("🐿🐿🐿🐿", &small());
        let (text, local, char_base) = node.locate_byte(9);
        assert_eq!((text, local, char_base), ("🐿🐿", 1, 2));
    }

    #[test]
    fn append_and_prepend_keep_shape() {
        let config = small();
        let mut node = Node::from_str("abcdefghijk", &config);
        let depth = node.depth();

        node.append_to_last_leaf("Z", Sums::of_text(1, 1));
        node.prepend_to_first_leaf("™", Sums::of_text(3, 1));

        assert_eq!(node.depth(), depth);
        assert_eq!(collect(&node), "™abcdefghijkZ");
        assert_eq!(node.char_count(), 13);
        assert_eq!(node.byte_count(), 15);
        match &node {
            Node::Internal { left_sums, left, .. } => assert_eq!(left_sums, left.sums()),
            Node::Leaf { .. } => panic!("expected an internal root"),
        }
    }

    #[test]
    fn into_leaves_skips_empty_leaves() {
        let node = Node::internal(Node::leaf("ab"), Node::internal(Node::empty(), Node::leaf("c")));
        let mut leaves = Vec::new();
        node.into_leaves(&mut leaves);
        assert_eq!(leaves.len(), 2);
    }
}
