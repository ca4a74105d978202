//! Tree surgery: split and concatenate
//!
//! Both operations consume their inputs and return new roots. Concatenation
//! joins by depth (AVL style) so that splitting and re-joining a balanced tree
//! keeps it balanced; only the leaf straddling a split point is ever copied.

use crate::node::Node;
use crate::utf8;

impl Node {
    /// Partition into text before and after global char `char_idx`
    pub fn split(self, char_idx: usize, max_leaf: usize) -> (Node, Node) {
        match self {
            Node::Leaf { text, sums } => {
                if char_idx == 0 {
                    return (Node::empty(), Node::Leaf { text, sums });
                }
                if char_idx >= sums.chars {
                    return (Node::Leaf { text, sums }, Node::empty());
                }
                let byte = utf8::char_to_byte(&text, sums.chars, char_idx);
                let (head, tail) = text.split_at(byte);
                (
                    Node::leaf_with_chars(Box::from(head), char_idx),
                    Node::leaf_with_chars(Box::from(tail), sums.chars - char_idx),
                )
            }
            Node::Internal {
                left,
                right,
                left_sums,
                ..
            } => {
                if char_idx < left_sums.chars {
                    let (head, tail) = left.split(char_idx, max_leaf);
                    (head, Node::concat(tail, *right, max_leaf))
                } else if char_idx == left_sums.chars {
                    (*left, *right)
                } else {
                    let (head, tail) = right.split(char_idx - left_sums.chars, max_leaf);
                    (Node::concat(*left, head, max_leaf), tail)
                }
            }
        }
    }

    /// Join two trees, `left` text first.
    ///
    /// Empty sides vanish. A leaf that fits into the neighbouring edge leaf of
    /// the other tree is merged into it instead of growing a new internal node.
    pub fn concat(left: Node, right: Node, max_leaf: usize) -> Node {
        if left.is_empty() {
            return right;
        }
        if right.is_empty() {
            return left;
        }

        if let Node::Leaf { text, sums } = &right {
            if left.last_leaf_bytes() + sums.bytes <= max_leaf {
                let mut left = left;
                left.append_to_last_leaf(text, *sums);
                return left;
            }
        }
        if let Node::Leaf { text, sums } = &left {
            if right.first_leaf_bytes() + sums.bytes <= max_leaf {
                let mut right = right;
                right.prepend_to_first_leaf(text, *sums);
                return right;
            }
        }

        join(left, right)
    }
}

/// Join by depth: descend the spine of the deeper tree until the depths are
/// within one, link there, and rotate on the way back up where needed.
fn join(left: Node, right: Node) -> Node {
    let (left_depth, right_depth) = (left.depth(), right.depth());
    if left_depth > right_depth + 1 {
        join_right(left, right)
    } else if right_depth > left_depth + 1 {
        join_left(left, right)
    } else {
        Node::internal(left, right)
    }
}

/// `left` is the deeper tree; `right` is hung off its right spine
fn join_right(left: Node, right: Node) -> Node {
    match left {
        Node::Internal {
            left: outer,
            right: inner,
            ..
        } => {
            let (outer, inner) = (*outer, *inner);
            if inner.depth() <= right.depth() + 1 {
                let joined = Node::internal(inner, right);
                if joined.depth() <= outer.depth() + 1 {
                    Node::internal(outer, joined)
                } else {
                    rotate_left(Node::internal(outer, rotate_right(joined)))
                }
            } else {
                let joined = join_right(inner, right);
                let rotate = joined.depth() > outer.depth() + 1;
                let node = Node::internal(outer, joined);
                if rotate {
                    rotate_left(node)
                } else {
                    node
                }
            }
        }
        leaf => Node::internal(leaf, right),
    }
}

/// Mirror of [`join_right`]: `right` is the deeper tree
fn join_left(left: Node, right: Node) -> Node {
    match right {
        Node::Internal {
            left: inner,
            right: outer,
            ..
        } => {
            let (inner, outer) = (*inner, *outer);
            if inner.depth() <= left.depth() + 1 {
                let joined = Node::internal(left, inner);
                if joined.depth() <= outer.depth() + 1 {
                    Node::internal(joined, outer)
                } else {
                    rotate_right(Node::internal(rotate_left(joined), outer))
                }
            } else {
                let joined = join_left(left, inner);
                let rotate = joined.depth() > outer.depth() + 1;
                let node = Node::internal(joined, outer);
                if rotate {
                    rotate_right(node)
                } else {
                    node
                }
            }
        }
        leaf => Node::internal(left, leaf),
    }
}

/// `(a, (b, c))` becomes `((a, b), c)`
fn rotate_left(node: Node) -> Node {
    match node {
        Node::Internal { left, right, .. } => match *right {
            Node::Internal {
                left: middle,
                right: far,
                ..
            } => Node::internal(Node::internal(*left, *middle), *far),
            leaf => Node::internal(*left, leaf),
        },
        leaf => leaf,
    }
}

/// `((a, b), c)` becomes `(a, (b, c))`
fn rotate_right(node: Node) -> Node {
    match node {
        Node::Internal { left, right, .. } => match *left {
            Node::Internal {
                left: far,
                right: middle,
                ..
            } => Node::internal(*far, Node::internal(*middle, *right)),
            leaf => Node::internal(leaf, *right),
        },
        leaf => leaf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RopeConfig;
    use pretty_assertions::assert_eq;

    const MAX: usize = 8;

    fn config() -> RopeConfig {
        RopeConfig::new(2, MAX).unwrap()
    }

    fn text_of(node: &Node) -> String {
        let mut leaves = Vec::new();
        node.clone().into_leaves(&mut leaves);
        leaves
            .into_iter()
            .map(|leaf| match leaf {
                Node::Leaf { text, .. } => text.into_string(),
                Node::Internal { .. } => unreachable!(),
            })
            .collect()
    }

    /// Every internal node's children differ in depth by at most one
    fn is_avl(node: &Node) -> bool {
        match node {
            Node::Leaf { .. } => true,
            Node::Internal { left, right, .. } => {
                left.depth().abs_diff(right.depth()) <= 1 && is_avl(left) && is_avl(right)
            }
        }
    }

    #[test]
    fn split_leaf_on_char_boundary() {
        let (head, tail) = Node::leaf("🐿a🐿").split(1, MAX);
        assert_eq!(text_of(&head), "🐿");
        assert_eq!(text_of(&tail), "a🐿");
        assert_eq!(head.char_count(), 1);
        assert_eq!(tail.char_count(), 2);
        assert_eq!(tail.byte_count(), 5);
    }

    #[test]
    fn split_at_ends_yields_empty_side() {
        let node = Node::from_str("hello world", &config());
        let (head, tail) = node.clone().split(0, MAX);
        assert!(head.is_empty());
        assert_eq!(text_of(&tail), "hello world");

        let (head, tail) = node.split(11, MAX);
        assert_eq!(text_of(&head), "hello world");
        assert!(tail.is_empty());
    }

    #[test]
    fn split_every_index_preserves_text_and_sums() {
        let text = "ab™cd🐿efgh¥ijklΩmnop";
        let chars: Vec<char> = text.chars().collect();
        let node = Node::from_str(text, &config());

        for i in 0..=chars.len() {
            let (head, tail) = node.clone().split(i, MAX);
            let expected_head: String = chars[..i].iter().collect();
            let expected_tail: String = chars[i..].iter().collect();

            assert_eq!(text_of(&head), expected_head);
            assert_eq!(text_of(&tail), expected_tail);
            assert_eq!(head.char_count(), i);
            assert_eq!(head.byte_count(), expected_head.len());
            assert!(head.validate(&config()));
            assert!(tail.validate(&config()));
        }
    }

    #[test]
    fn concat_merges_small_leaves() {
        let node = Node::concat(Node::leaf("abc"), Node::leaf("de"), MAX);
        assert!(matches!(node, Node::Leaf { .. }));
        assert_eq!(text_of(&node), "abcde");
        assert_eq!(node.char_count(), 5);
    }

    #[test]
    fn concat_absorbs_leaf_into_edge_of_tree() {
        let tree = Node::from_str("abcdefghijk", &config()); // "abcdef" + "ghijk"
        let depth = tree.depth();

        let appended = Node::concat(tree.clone(), Node::leaf("Z"), MAX);
        assert_eq!(appended.depth(), depth);
        assert_eq!(appended.leaf_count(), 2);
        assert_eq!(text_of(&appended), "abcdefghijkZ");

        let prepended = Node::concat(Node::leaf("Z"), tree, MAX);
        assert_eq!(prepended.leaf_count(), 2);
        assert_eq!(text_of(&prepended), "Zabcdefghijk");
        assert!(prepended.validate(&config()));
    }

    #[test]
    fn concat_drops_empty_sides() {
        let node = Node::concat(Node::empty(), Node::leaf("abc"), MAX);
        assert_eq!(text_of(&node), "abc");
        let node = Node::concat(Node::leaf("abc"), Node::empty(), MAX);
        assert_eq!(text_of(&node), "abc");
    }

    #[test]
    fn join_of_uneven_trees_stays_avl() {
        let tall = Node::from_str(&"x".repeat(8 * 64), &config()); // depth 6
        let short = Node::from_str(&"y".repeat(16), &config()); // depth 1

        let joined = Node::concat(tall.clone(), short.clone(), MAX);
        assert!(is_avl(&joined));
        assert!(joined.validate(&config()));
        assert_eq!(joined.char_count(), 8 * 64 + 16);
        assert_eq!(text_of(&joined), "x".repeat(8 * 64) + &"y".repeat(16));

        let joined = Node::concat(short, tall, MAX);
        assert!(is_avl(&joined));
        assert!(joined.validate(&config()));
        assert_eq!(text_of(&joined), "y".repeat(16) + &"x".repeat(8 * 64));
    }

    #[test]
    fn repeated_single_leaf_joins_stay_shallow() {
        let mut node = Node::empty();
        for i in 0..200 {
            // Full leaves so nothing gets absorbed
            let piece = if i % 2 == 0 { "abcdefgh" } else { "ABCDEFGH" };
            node = Node::concat(node, Node::leaf(piece), MAX);
        }
        assert_eq!(node.leaf_count(), 200);
        assert!(is_avl(&node));
        // AVL: depth <= 1.44 * log2(200)
        assert!(node.depth() <= 11, "depth {}", node.depth());
        assert!(node.validate(&config()));
    }

    #[test]
    fn rotations_preserve_order() {
        let node = Node::internal(
            Node::leaf("a"),
            Node::internal(Node::leaf("b"), Node::leaf("c")),
        );
        let rotated = rotate_left(node);
        assert_eq!(text_of(&rotated), "abc");
        assert!(matches!(&rotated, Node::Internal { left, .. } if left.depth() == 1));

        let back = rotate_right(rotated);
        assert_eq!(text_of(&back), "abc");
        assert!(matches!(&back, Node::Internal { right, .. } if right.depth() == 1));
    }
}
