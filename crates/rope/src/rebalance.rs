//! Height restoration after concatenation

use crate::builder::Chunker;
use crate::env::Env;
use crate::node::{Kind, Node};
use std::sync::Arc;

/// Acceptable height for `len` bytes cut into leaves of `max_leaf_bytes`:
/// `ceil(1.5 * (log2(len / max_leaf_bytes + 1) + 1))`.
pub fn max_height(len: usize, max_leaf_bytes: usize) -> usize {
    let leaves = len as f64 / max_leaf_bytes.max(1) as f64;
    (1.5 * ((leaves + 1.0).log2() + 1.0)).ceil() as usize
}

/// Rebuild `root` so its height is back near the minimum for its length.
///
/// Balanced subtrees are handed to the carry slots as they are; only the
/// bytes of small leaves under unbalanced nodes are copied and re-cut. A
/// balanced root comes back unchanged.
pub(crate) fn rebalance(env: &Env, root: &Arc<Node>) -> Arc<Node> {
    if root.is_balanced() {
        return Arc::clone(root);
    }

    let mut chunker = Chunker::new(env);
    let mut reused = 0usize;
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node.is_balanced() {
            chunker.push_piece(Arc::clone(node));
            reused += 1;
            continue;
        }
        match node.kind() {
            Kind::Leaf(content) => chunker.push_bytes(content),
            Kind::Branch { left, right } => {
                stack.push(right);
                stack.push(left);
            }
        }
    }

    let Some(rebuilt) = chunker.finish() else {
        return Arc::clone(root);
    };

    tracing::debug!(
        len = rebuilt.len(),
        height_before = root.height(),
        height_after = rebuilt.height(),
        bound = max_height(rebuilt.len(), env.max_leaf_bytes()),
        reused,
        "rebalanced rope"
    );
    rebuilt
}
