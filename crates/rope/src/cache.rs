//! Hash-consing: structurally identical nodes collapse to one allocation
//!
//! Builder, concatenation and the rebalancer hand every node they construct
//! to a [`NodeCache`] before keeping it. A branch is keyed by the identities
//! of its two children, a leaf by its bytes and whether it counts as full,
//! so an identical key always describes an identical subtree.

use crate::node::{Kind, Node, NodeId};
use ahash::RandomState;
use crossbeam::utils::CachePadded;
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Structural key of a node
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// Content plus the leaf's balanced flag, which depends on the leaf
    /// size the leaf was cut under
    Leaf(Arc<[u8]>, bool),
    Branch(NodeId, NodeId),
}

impl NodeKey {
    pub fn of(node: &Node) -> Self {
        match node.kind() {
            Kind::Leaf(content) => NodeKey::Leaf(Arc::clone(content), node.is_balanced()),
            Kind::Branch { left, right } => NodeKey::Branch(left.id(), right.id()),
        }
    }
}

/// Counters reported by a cache
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Lookup-or-insert store for freshly constructed nodes.
///
/// Must tolerate concurrent callers. Two threads racing on the same key may
/// both build a node; only one of them is kept and returned to both.
pub trait NodeCache: Send + Sync {
    /// Return the retained node structurally equal to `node`, retaining
    /// `node` itself when there is none.
    fn intern(&self, node: Node) -> Arc<Node>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. Ropes keep the nodes they already reference.
    fn clear(&self);

    fn stats(&self) -> CacheStats;
}

/// Hash-consing switched off: every node is its own allocation
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl NodeCache for NoCache {
    fn intern(&self, node: Node) -> Arc<Node> {
        Arc::new(node)
    }

    fn len(&self) -> usize {
        0
    }

    fn clear(&self) {}

    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

type Shard = RwLock<HashMap<NodeKey, Arc<Node>, RandomState>>;

/// Sharded, unbounded intern table.
///
/// Entries hold strong references, so nodes stay alive until
/// [`InternTable::purge_unshared`] or [`NodeCache::clear`] drops them.
pub struct InternTable {
    shards: Box<[CachePadded<Shard>]>,
    hasher: RandomState,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InternTable {
    pub fn new(shards: usize) -> Self {
        let shards = (0..shards.max(1))
            .map(|_| CachePadded::new(RwLock::new(HashMap::with_hasher(RandomState::new()))))
            .collect();
        Self {
            shards,
            hasher: RandomState::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[inline]
    fn shard(&self, key: &NodeKey) -> &Shard {
        let hash = self.hasher.hash_one(key);
        &self.shards[(hash as usize) % self.shards.len()]
    }

    /// Drop entries that nothing outside the table refers to any more.
    ///
    /// Removing a parent releases its children, so passes repeat until one
    /// removes nothing. Returns the number of entries dropped.
    pub fn purge_unshared(&self) -> usize {
        let mut removed = 0;
        loop {
            let mut pass = 0;
            for shard in self.shards.iter() {
                let mut map = shard.write();
                let before = map.len();
                map.retain(|_, node| Arc::strong_count(node) > 1);
                pass += before - map.len();
            }
            if pass == 0 {
                break;
            }
            removed += pass;
        }
        tracing::debug!(removed, remaining = self.len(), "purged unshared intern entries");
        removed
    }
}

impl Default for InternTable {
    fn default() -> Self {
        Self::new(16)
    }
}

impl NodeCache for InternTable {
    fn intern(&self, node: Node) -> Arc<Node> {
        let key = NodeKey::of(&node);
        let shard = self.shard(&key);

        {
            let map = shard.read();
            if let Some(found) = map.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Arc::clone(found);
            }
        }

        // Another writer may have won the race since the read lock dropped
        let mut map = shard.write();
        match map.entry(key) {
            Entry::Occupied(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Arc::clone(entry.insert(Arc::new(node)))
            }
        }
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    fn clear(&self) {
        let mut removed = 0;
        for shard in self.shards.iter() {
            let mut map = shard.write();
            removed += map.len();
            map.clear();
        }
        tracing::debug!(removed, "cleared intern table");
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
