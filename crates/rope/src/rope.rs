//! Persistent rope values and their operations
//!
//! Every operation returns a new [`Rope`] and leaves its inputs untouched.
//! Unchanged subtrees are shared between versions, so old values stay cheap
//! to keep around for undo histories and concurrent readers.

use crate::builder;
use crate::env::Env;
use crate::error::{Result, RopeError};
use crate::iter::Chunks;
use crate::node::{Kind, Node};
use crate::rebalance::{self, max_height};
use std::io::Read;
use std::sync::Arc;

/// Immutable byte sequence backed by a shared binary tree
#[derive(Clone)]
pub struct Rope {
    root: Option<Arc<Node>>,
    env: Env,
}

impl Rope {
    /// Empty rope in the global environment
    pub fn new() -> Self {
        Env::global().empty()
    }

    /// Rope over `bytes` in the global environment
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Env::global().from_bytes(bytes)
    }

    /// Rope over everything `reader` yields, in the global environment
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Env::global().from_reader(reader)
    }

    pub(crate) fn from_root(env: Env, root: Option<Arc<Node>>) -> Self {
        Self { root, env }
    }

    /// New version sharing this rope's environment
    fn derive(&self, root: Option<Arc<Node>>) -> Self {
        Self {
            root,
            env: self.env.clone(),
        }
    }

    // === Inspection ===

    /// Byte length, O(height)
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.len())
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.height())
    }

    /// Whether the height is within [`max_height`] for the current length
    pub fn is_balanced(&self) -> bool {
        self.height() <= max_height(self.len(), self.env.max_leaf_bytes())
    }

    pub fn root(&self) -> Option<&Arc<Node>> {
        self.root.as_ref()
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Both ropes share the same root allocation
    pub fn ptr_eq(&self, other: &Rope) -> bool {
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn check_offset(&self, offset: usize) -> Result<usize> {
        let len = self.len();
        if offset > len {
            return Err(RopeError::out_of_range(offset, len));
        }
        Ok(len)
    }

    // === Algebra ===

    /// Byte at `i`, O(log n)
    pub fn index(&self, i: usize) -> Result<u8> {
        self.root
            .as_ref()
            .and_then(|root| root.byte_at(i))
            .ok_or_else(|| RopeError::out_of_range(i, self.len()))
    }

    /// Whole content as one contiguous buffer, O(n)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for chunk in Chunks::new(self.root.as_deref(), 0) {
            out.extend_from_slice(chunk);
        }
        out
    }

    /// `self ++ other`. Rebalances when the joined tree gets too tall
    pub fn concat(&self, other: &Rope) -> Rope {
        match (&self.root, &other.root) {
            (None, _) => other.clone(),
            (_, None) => self.clone(),
            (Some(left), Some(right)) => {
                self.derive(Some(concat_nodes(&self.env, Arc::clone(left), Arc::clone(right))))
            }
        }
    }

    /// `(self[..n], self[n..])`
    pub fn split(&self, n: usize) -> Result<(Rope, Rope)> {
        self.check_offset(n)?;
        let Some(root) = &self.root else {
            return Ok((self.clone(), self.clone()));
        };
        let (left, right) = split_node(&self.env, root, n);
        Ok((self.derive(left), self.derive(right)))
    }

    /// New rope with `data` inserted at `n`
    pub fn insert(&self, n: usize, data: impl AsRef<[u8]>) -> Result<Rope> {
        let (left, right) = self.split(n)?;
        let middle = self.derive(builder::build(&self.env, data.as_ref()));
        Ok(left.concat(&middle).concat(&right))
    }

    /// New rope without `[n, n + length)`. `length` is clamped to the end
    pub fn delete(&self, n: usize, length: usize) -> Result<Rope> {
        let (left, rest) = self.split(n)?;
        let (_, right) = rest.split(length.min(rest.len()))?;
        Ok(left.concat(&right))
    }

    /// Copy of `[n, min(n + length, len))`, read straight off the leaves
    pub fn sub(&self, n: usize, length: usize) -> Result<Vec<u8>> {
        let len = self.check_offset(n)?;
        let want = n.saturating_add(length).min(len) - n;

        let mut out = Vec::with_capacity(want);
        if want == 0 {
            return Ok(out);
        }
        for chunk in Chunks::new(self.root.as_deref(), n) {
            let take = (want - out.len()).min(chunk.len());
            out.extend_from_slice(&chunk[..take]);
            if out.len() == want {
                break;
            }
        }
        Ok(out)
    }

    /// Same content with the height restored to near minimum. A rope already
    /// within [`max_height`] comes back as is.
    pub fn rebalance(&self) -> Rope {
        match &self.root {
            Some(root) if !self.is_balanced() => {
                self.derive(Some(rebalance::rebalance(&self.env, root)))
            }
            _ => self.clone(),
        }
    }
}

/// Branch over `left` and `right`, rebalanced if it breaks the height bound
pub(crate) fn concat_nodes(env: &Env, left: Arc<Node>, right: Arc<Node>) -> Arc<Node> {
    let len = left.len() + right.len();
    let joined = env.join(left, right);
    if joined.height() > max_height(len, env.max_leaf_bytes()) {
        rebalance::rebalance(env, &joined)
    } else {
        joined
    }
}

fn concat_opt(env: &Env, left: Option<Arc<Node>>, right: Option<Arc<Node>>) -> Option<Arc<Node>> {
    match (left, right) {
        (None, right) => right,
        (left, None) => left,
        (Some(left), Some(right)) => Some(concat_nodes(env, left, right)),
    }
}

/// Sibling left behind while descending toward the cut
enum Sibling<'a> {
    /// Lies before the cut, joins the left result
    Before(&'a Arc<Node>),
    /// Lies after the cut, joins the right result
    After(&'a Arc<Node>),
}

/// Split below `root` at `n` (`n <= len` checked by the caller).
///
/// Walks down by weight, cuts the leaf it lands in by rebuilding both
/// halves, then reattaches the skipped siblings bottom-up.
fn split_node(env: &Env, root: &Arc<Node>, n: usize) -> (Option<Arc<Node>>, Option<Arc<Node>>) {
    let mut path = Vec::with_capacity(root.height());
    let mut node = root;
    let mut n = n;

    let (mut left, mut right) = loop {
        match node.kind() {
            Kind::Leaf(content) => {
                break if n == 0 {
                    (None, Some(Arc::clone(node)))
                } else if n >= content.len() {
                    (Some(Arc::clone(node)), None)
                } else {
                    (builder::build(env, &content[..n]), builder::build(env, &content[n..]))
                };
            }
            Kind::Branch { left: l, right: r } => {
                if n >= node.weight() {
                    n -= node.weight();
                    path.push(Sibling::Before(l));
                    node = r;
                } else {
                    path.push(Sibling::After(r));
                    node = l;
                }
            }
        }
    };

    while let Some(sibling) = path.pop() {
        match sibling {
            Sibling::Before(l) => left = concat_opt(env, Some(Arc::clone(l)), left),
            Sibling::After(r) => right = concat_opt(env, right, Some(Arc::clone(r))),
        }
    }
    (left, right)
}

// === Trait impls ===

impl Default for Rope {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&[u8]> for Rope {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&str> for Rope {
    fn from(text: &str) -> Self {
        Self::from_bytes(text)
    }
}

impl From<Vec<u8>> for Rope {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

/// Content equality. Versions sharing a root compare in O(1)
impl PartialEq for Rope {
    fn eq(&self, other: &Rope) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.len() != other.len() {
            return false;
        }

        let mut a = Chunks::new(self.root.as_deref(), 0);
        let mut b = Chunks::new(other.root.as_deref(), 0);
        let mut x: &[u8] = &[];
        let mut y: &[u8] = &[];
        loop {
            if x.is_empty() {
                match a.next() {
                    Some(chunk) => x = chunk,
                    None => return y.is_empty() && b.next().is_none(),
                }
            }
            if y.is_empty() {
                match b.next() {
                    Some(chunk) => y = chunk,
                    None => return false,
                }
            }
            let n = x.len().min(y.len());
            if x[..n] != y[..n] {
                return false;
            }
            x = &x[n..];
            y = &y[n..];
        }
    }
}

impl Eq for Rope {}

impl std::fmt::Debug for Rope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rope")
            .field("len", &self.len())
            .field("height", &self.height())
            .finish()
    }
}
