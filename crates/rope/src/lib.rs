//! Persistent byte ropes with hash-consed nodes and bounded height
//!
//! A [`Rope`] is an immutable byte sequence stored as a binary tree. Edits
//! return new ropes that share every untouched subtree with their source,
//! so snapshots cost nothing and old versions can be read from any thread.
//!
//! ```
//! use strand_rope::Rope;
//!
//! let rope = Rope::from_bytes("foobar");
//! let edited = rope.insert(6, "baz").unwrap();
//! assert_eq!(edited.to_bytes(), b"foobarbaz");
//! assert_eq!(rope.to_bytes(), b"foobar");
//! ```

mod builder;
mod debug;
mod iter;
mod reader;
mod rebalance;
mod rope;

pub mod cache;
pub mod config;
pub mod env;
pub mod error;
pub mod node;

// Re-export main types
pub use cache::{CacheStats, InternTable, NoCache, NodeCache, NodeKey};
pub use config::{CacheConfig, RopeConfig, DEFAULT_MAX_LEAF_BYTES};
pub use env::Env;
pub use error::{Result, RopeError};
pub use iter::{Chunks, ChunksRev};
pub use node::{Kind, Node, NodeId};
pub use reader::ByteReader;
pub use rebalance::max_height;
pub use rope::Rope;

/// Change the leaf size of the global environment.
///
/// Meant to be called once at startup. Ropes built earlier keep their
/// leaves; only later constructions use the new size.
pub fn set_max_leaf_bytes(max_leaf_bytes: usize) -> Result<()> {
    Env::global().set_max_leaf_bytes(max_leaf_bytes)
}
