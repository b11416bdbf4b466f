//! Immutable tree cells shared between rope versions

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of process-unique node handles
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identity of a node, used as the structural key of its parents
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Tree cell - never mutated after construction, shared by reference
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    /// Leaf: own content length. Branch: length of the left subtree
    weight: usize,
    /// Edge count of the longest path down to a leaf
    height: u32,
    /// Perfectly shaped subtree the rebalancer may reuse verbatim
    balanced: bool,
    kind: Kind,
}

/// Leaf with raw bytes, or branch with two children
#[derive(Debug)]
pub enum Kind {
    Leaf(Arc<[u8]>),
    Branch { left: Arc<Node>, right: Arc<Node> },
}

impl Node {
    /// Leaf over `content`. Only full leaves count as balanced; the
    /// rebalancer merges the bytes of partial ones into fresh leaves.
    pub(crate) fn leaf(content: Arc<[u8]>, max_leaf_bytes: usize) -> Self {
        Self {
            id: NodeId::next(),
            weight: content.len(),
            height: 0,
            balanced: content.len() >= max_leaf_bytes,
            kind: Kind::Leaf(content),
        }
    }

    /// Branch over two children. Balanced only when both children are
    /// balanced and of equal height, so the flag depends on structure alone.
    pub(crate) fn branch(left: Arc<Node>, right: Arc<Node>) -> Self {
        Self {
            id: NodeId::next(),
            weight: left.len(),
            height: 1 + left.height.max(right.height),
            balanced: left.balanced && right.balanced && left.height == right.height,
            kind: Kind::Branch { left, right },
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn weight(&self) -> usize {
        self.weight
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height as usize
    }

    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.balanced
    }

    #[inline]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Leaf content, `None` for branches
    pub fn content(&self) -> Option<&[u8]> {
        match &self.kind {
            Kind::Leaf(content) => Some(&content[..]),
            Kind::Branch { .. } => None,
        }
    }

    /// Both children, `None` for leaves
    pub fn children(&self) -> Option<(&Arc<Node>, &Arc<Node>)> {
        match &self.kind {
            Kind::Leaf(_) => None,
            Kind::Branch { left, right } => Some((left, right)),
        }
    }

    /// Total byte length: weights summed down the right spine, O(height)
    pub fn len(&self) -> usize {
        let mut len = 0;
        let mut node = self;
        loop {
            len += node.weight;
            match &node.kind {
                Kind::Leaf(_) => return len,
                Kind::Branch { right, .. } => node = right,
            }
        }
    }

    /// Byte at `i`, routed by weight. `None` past the end
    pub(crate) fn byte_at(&self, mut i: usize) -> Option<u8> {
        let mut node = self;
        loop {
            match &node.kind {
                Kind::Leaf(content) => return content.get(i).copied(),
                Kind::Branch { left, right } => {
                    if i >= node.weight {
                        i -= node.weight;
                        node = right;
                    } else {
                        node = left;
                    }
                }
            }
        }
    }
}
