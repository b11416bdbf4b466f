//! Bulk construction through carry slots
//!
//! Leaves enter slot 0. Whenever a slot is already taken, its occupant and
//! the newcomer merge into a branch one level up, like carry propagation in
//! a binary counter. A single pass therefore produces a tree whose height is
//! within one of the minimum for its leaf count. The rebalancer reuses the
//! same machinery and also feeds it whole balanced subtrees.

use crate::env::Env;
use crate::error::Result;
use crate::node::Node;
use std::io::{ErrorKind, Read};
use std::sync::Arc;

/// Read buffer for streaming construction
const READ_CHUNK: usize = 8 * 1024;

/// Slot `k` holds either nothing or a perfectly shaped subtree of height `k`.
/// Occupied slots are ordered: a higher slot holds earlier content.
pub(crate) struct CarrySlots<'e> {
    env: &'e Env,
    slots: Vec<Option<Arc<Node>>>,
}

impl<'e> CarrySlots<'e> {
    pub(crate) fn new(env: &'e Env) -> Self {
        Self {
            env,
            slots: Vec::new(),
        }
    }

    /// Append a leaf or a balanced subtree after everything pushed so far.
    ///
    /// A subtree of height `h` may only enter slot `h` when every lower slot
    /// is empty, otherwise it would jump ahead of content still waiting
    /// there. In that case it is taken apart into its two children.
    pub(crate) fn push(&mut self, piece: Arc<Node>) {
        let mut pending = vec![piece];
        while let Some(node) = pending.pop() {
            if self.occupied_below(node.height()) {
                if let Some((left, right)) = node.children() {
                    pending.push(Arc::clone(right));
                    pending.push(Arc::clone(left));
                    continue;
                }
            }
            self.carry(node);
        }
    }

    fn occupied_below(&self, height: usize) -> bool {
        self.slots.iter().take(height).any(Option::is_some)
    }

    fn carry(&mut self, mut node: Arc<Node>) {
        let mut height = node.height();
        loop {
            if self.slots.len() <= height {
                self.slots.resize(height + 1, None);
            }
            match self.slots[height].take() {
                Some(prev) => {
                    node = self.env.join(prev, node);
                    height = node.height();
                }
                None => {
                    self.slots[height] = Some(node);
                    return;
                }
            }
        }
    }

    /// Fold the remaining slots right to left into the final root
    pub(crate) fn finish(self) -> Option<Arc<Node>> {
        let env = self.env;
        self.slots.into_iter().flatten().fold(None, |acc, node| {
            Some(match acc {
                None => node,
                Some(acc) => env.join(node, acc),
            })
        })
    }
}

/// Cuts raw bytes into leaves of `max_leaf_bytes` and feeds carry slots
pub(crate) struct Chunker<'e> {
    env: &'e Env,
    slots: CarrySlots<'e>,
    pending: Vec<u8>,
    max_leaf_bytes: usize,
}

impl<'e> Chunker<'e> {
    pub(crate) fn new(env: &'e Env) -> Self {
        let max_leaf_bytes = env.max_leaf_bytes();
        Self {
            env,
            slots: CarrySlots::new(env),
            pending: Vec::with_capacity(max_leaf_bytes),
            max_leaf_bytes,
        }
    }

    /// Append raw bytes. Full leaves are emitted as soon as they fill up
    pub(crate) fn push_bytes(&mut self, mut bytes: &[u8]) {
        if !self.pending.is_empty() {
            let take = (self.max_leaf_bytes - self.pending.len()).min(bytes.len());
            self.pending.extend_from_slice(&bytes[..take]);
            bytes = &bytes[take..];
            if self.pending.len() < self.max_leaf_bytes {
                return;
            }
            self.flush_pending();
        }

        let mut chunks = bytes.chunks_exact(self.max_leaf_bytes);
        for chunk in &mut chunks {
            let leaf = self.env.leaf(chunk, self.max_leaf_bytes);
            self.slots.push(leaf);
        }
        self.pending.extend_from_slice(chunks.remainder());
    }

    /// Append a subtree verbatim, after whatever bytes are still pending
    pub(crate) fn push_piece(&mut self, piece: Arc<Node>) {
        self.flush_pending();
        self.slots.push(piece);
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let leaf = self.env.leaf(&self.pending, self.max_leaf_bytes);
        self.pending.clear();
        self.slots.push(leaf);
    }

    pub(crate) fn finish(mut self) -> Option<Arc<Node>> {
        self.flush_pending();
        self.slots.finish()
    }
}

/// Tree over `bytes`, `None` when empty
pub(crate) fn build(env: &Env, bytes: &[u8]) -> Option<Arc<Node>> {
    let mut chunker = Chunker::new(env);
    chunker.push_bytes(bytes);
    chunker.finish()
}

/// Tree over everything `reader` yields until end of stream
pub(crate) fn build_from_reader<R: Read>(env: &Env, mut reader: R) -> Result<Option<Arc<Node>>> {
    let mut chunker = Chunker::new(env);
    let mut buf = vec![0u8; READ_CHUNK];
    let mut total = 0usize;

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                chunker.push_bytes(&buf[..n]);
                total += n;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    tracing::debug!(bytes = total, "built rope from reader");
    Ok(chunker.finish())
}
