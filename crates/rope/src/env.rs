//! Construction environment: live configuration plus the node cache
//!
//! Every rope remembers the [`Env`] it was built in and allocates its
//! derived versions through it. The process-wide default is
//! [`Env::global`]; tests and embedders that want their own leaf size or a
//! private cache create one with [`Env::new`] or [`Env::with_cache`].

use crate::builder;
use crate::cache::{InternTable, NoCache, NodeCache};
use crate::config::RopeConfig;
use crate::error::Result;
use crate::node::Node;
use crate::rope::Rope;
use arc_swap::ArcSwap;
use std::io::Read;
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<Env> = OnceLock::new();

#[derive(Clone)]
pub struct Env {
    inner: Arc<EnvInner>,
}

struct EnvInner {
    /// Swapped wholesale on reconfiguration; builders load it once per run
    config: ArcSwap<RopeConfig>,
    cache: Box<dyn NodeCache>,
}

impl Env {
    /// Environment with the cache `config` asks for
    pub fn new(config: RopeConfig) -> Result<Self> {
        config.validate()?;
        let cache: Box<dyn NodeCache> = if config.cache.enabled {
            Box::new(InternTable::new(config.cache.shards))
        } else {
            Box::new(NoCache)
        };
        Ok(Self::from_parts(config, cache))
    }

    /// Environment with an injected cache implementation
    pub fn with_cache(config: RopeConfig, cache: impl NodeCache + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, Box::new(cache)))
    }

    fn from_parts(config: RopeConfig, cache: Box<dyn NodeCache>) -> Self {
        Self {
            inner: Arc::new(EnvInner {
                config: ArcSwap::from_pointee(config),
                cache,
            }),
        }
    }

    /// Process-wide default environment
    pub fn global() -> &'static Env {
        GLOBAL.get_or_init(|| Self::from_parts(RopeConfig::default(), Box::new(InternTable::default())))
    }

    pub fn config(&self) -> Arc<RopeConfig> {
        self.inner.config.load_full()
    }

    #[inline]
    pub fn max_leaf_bytes(&self) -> usize {
        self.inner.config.load().max_leaf_bytes
    }

    /// Change the leaf size for future constructions.
    ///
    /// Meant to be set once before the environment is used. Builds already
    /// running finish under the size they started with; their leaves are
    /// keyed by their balanced flag, so cache hits still match a fresh build.
    /// The cache is cleared and existing ropes are untouched.
    pub fn set_max_leaf_bytes(&self, max_leaf_bytes: usize) -> Result<()> {
        let mut config = (*self.config()).clone();
        config.max_leaf_bytes = max_leaf_bytes;
        config.validate()?;

        self.inner.config.store(Arc::new(config));
        self.inner.cache.clear();
        tracing::trace!(max_leaf_bytes, "leaf size changed");
        Ok(())
    }

    pub fn cache(&self) -> &dyn NodeCache {
        self.inner.cache.as_ref()
    }

    /// Whether both handles point at the same environment
    pub fn same(&self, other: &Env) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // === Constructors ===

    pub fn empty(&self) -> Rope {
        Rope::from_root(self.clone(), None)
    }

    pub fn from_bytes(&self, bytes: impl AsRef<[u8]>) -> Rope {
        Rope::from_root(self.clone(), builder::build(self, bytes.as_ref()))
    }

    /// Drain `reader` into a rope. Read failures are propagated.
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<Rope> {
        let root = builder::build_from_reader(self, reader)?;
        Ok(Rope::from_root(self.clone(), root))
    }

    // === Node allocation ===

    #[inline]
    pub(crate) fn intern(&self, node: Node) -> Arc<Node> {
        self.inner.cache.intern(node)
    }

    pub(crate) fn leaf(&self, bytes: &[u8], max_leaf_bytes: usize) -> Arc<Node> {
        self.intern(Node::leaf(Arc::from(bytes), max_leaf_bytes))
    }

    /// Plain branch over two nodes, no height check
    pub(crate) fn join(&self, left: Arc<Node>, right: Arc<Node>) -> Arc<Node> {
        self.intern(Node::branch(left, right))
    }
}

impl std::fmt::Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("config", &*self.config())
            .field("cache", &self.cache().stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RopeError;

    #[test]
    fn test_invalid_config_rejected() {
        let err = Env::new(RopeConfig::with_max_leaf_bytes(0)).unwrap_err();
        assert!(matches!(err, RopeError::Config(_)));
    }

    #[test]
    fn test_set_max_leaf_bytes_affects_only_new_ropes() {
        let env = Env::new(RopeConfig::with_max_leaf_bytes(4)).unwrap();
        let before = env.from_bytes("abcdefgh");
        assert_eq!(before.height(), 1);

        env.set_max_leaf_bytes(16).unwrap();
        assert_eq!(env.max_leaf_bytes(), 16);
        assert!(env.cache().is_empty());

        let after = env.from_bytes("abcdefgh");
        assert_eq!(after.height(), 0);
        assert_eq!(before.height(), 1);
        assert_eq!(before, after);
    }

    #[test]
    fn test_set_max_leaf_bytes_rejects_zero() {
        let env = Env::new(RopeConfig::default()).unwrap();
        assert!(env.set_max_leaf_bytes(0).is_err());
        assert_eq!(env.max_leaf_bytes(), 128);
    }

    #[test]
    fn test_disabled_cache() {
        let env = Env::new(RopeConfig::with_max_leaf_bytes(8).without_cache()).unwrap();
        let a = env.from_bytes("foobarbaz");
        let b = env.from_bytes("foobarbaz");
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert!(env.cache().is_empty());
    }

    #[test]
    fn test_injected_cache() {
        let env = Env::with_cache(RopeConfig::with_max_leaf_bytes(8), InternTable::new(1)).unwrap();
        let a = env.from_bytes("foobarbaz");
        let b = env.from_bytes("foobarbaz");
        assert!(a.ptr_eq(&b));
        // Two leaves plus their parent
        assert_eq!(env.cache().len(), 3);
    }
}
