//! Depth and fragmentation bounds, and the rebuild that restores them
//!
//! A subtree of depth `d` is in bounds when it holds at least `F(d + 2)`
//! chars (`F` being Fibonacci with `F(1) = F(2) = 1`), the minimum an AVL
//! tree of that depth with non-empty leaves can hold. A subtree is also
//! rebuilt when its leaves average less than a quarter of `min_leaf`, which
//! compacts the slivers that splits leave behind.

use crate::config::RopeConfig;
use crate::node::Node;

/// `MIN_CHARS[d]` is `F(d + 2)`; anything deeper than the table is never in bounds
const MIN_CHARS: [usize; 92] = min_chars_table();

const fn min_chars_table() -> [usize; 92] {
    let mut table = [0usize; 92];
    let (mut a, mut b) = (1usize, 1usize); // F(1), F(2)
    let mut d = 0;
    while d < table.len() {
        table[d] = b;
        let next = a.saturating_add(b);
        a = b;
        b = next;
        d += 1;
    }
    table
}

/// Deepest subtree allowed to hold `chars` chars
pub(crate) fn max_depth(chars: usize) -> u32 {
    // MIN_CHARS is increasing, so this is the last depth whose minimum fits
    MIN_CHARS.partition_point(|&min| min <= chars).saturating_sub(1) as u32
}

fn is_too_deep(node: &Node) -> bool {
    node.depth() > max_depth(node.char_count())
}

fn is_fragmented(node: &Node, config: &RopeConfig) -> bool {
    node.leaf_count() > 1 && node.byte_count() * 4 < node.leaf_count() * config.min_leaf()
}

pub(crate) fn needs_rebuild(node: &Node, config: &RopeConfig) -> bool {
    matches!(node, Node::Internal { .. }) && (is_too_deep(node) || is_fragmented(node, config))
}

/// Restore the bounds beneath `node`.
///
/// Out-of-bounds children are fixed first; a node is only flattened and
/// rebuilt if it is still out of bounds afterwards, which keeps rebuilds as
/// small as the damage allows. In-bounds subtrees are returned untouched.
pub(crate) fn rebalance(node: Node, config: &RopeConfig) -> Node {
    if !needs_rebuild(&node, config) {
        return node;
    }

    let node = match node {
        Node::Internal { left, right, .. } => {
            Node::internal(rebalance(*left, config), rebalance(*right, config))
        }
        leaf => return leaf,
    };
    if !needs_rebuild(&node, config) {
        return node;
    }
    rebuild(node, config)
}

/// Flatten into leaves, merge undersized neighbours and reassemble the same
/// way construction does
pub(crate) fn rebuild(node: Node, config: &RopeConfig) -> Node {
    let depth = node.depth();
    let chars = node.char_count();

    let mut leaves = Vec::with_capacity(node.leaf_count());
    node.into_leaves(&mut leaves);
    let before = leaves.len();
    let leaves = compact(leaves, config);

    tracing::debug!(
        depth,
        chars,
        leaves_before = before,
        leaves_after = leaves.len(),
        "rebuilding out-of-bounds subtree"
    );

    Node::from_leaves(leaves)
}

/// Merge each leaf into its predecessor while the pair fits in `max_leaf`
/// and at least one of them is below `min_leaf`
fn compact(leaves: Vec<Node>, config: &RopeConfig) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(leaves.len());

    for leaf in leaves {
        if let Some(last) = out.last_mut() {
            let (last_bytes, bytes) = (last.byte_count(), leaf.byte_count());
            let undersized = last_bytes < config.min_leaf() || bytes < config.min_leaf();
            if undersized && last_bytes + bytes <= config.max_leaf() {
                if let Node::Leaf { text, sums } = &leaf {
                    last.append_to_last_leaf(text, *sums);
                    continue;
                }
            }
        }
        out.push(leaf);
    }

    out
}
