//! Resource configuration — the subset of the out-of-scope resource-session
//! model that the node layer needs to conform to (§6 "Consumed interfaces").

use std::sync::Arc;

/// Whether per-node content hashes are stored inline in the record or
/// computed on demand by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    /// No hash is persisted; `getHash` always recomputes.
    None,
    /// A hash function is configured and the hash is persisted in the record.
    Configured,
}

/// 64-bit deterministic hash function over an arbitrary byte stream.
///
/// Implementations MUST be pure: identical input bytes always produce the
/// same output, with no hidden state (required by the hash invariant, §3).
pub trait NodeHashFn: Send + Sync {
    fn hash(&self, bytes: &[u8]) -> u64;
}

/// Default hash function: xxHash64, a fast non-cryptographic content hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct XxHash64;

impl NodeHashFn for XxHash64 {
    fn hash(&self, bytes: &[u8]) -> u64 {
        xxhash_rust::xxh64::xxh64(bytes, 0)
    }
}

/// Per-resource configuration the node layer needs to conform to.
#[derive(Clone)]
pub struct ResourceConfiguration {
    pub hash_type: HashType,
    pub store_child_count: bool,
    pub node_hash_fn: Arc<dyn NodeHashFn>,
    pub are_dewey_ids_stored: bool,
}

impl ResourceConfiguration {
    pub fn new(hash_type: HashType) -> Self {
        Self {
            hash_type,
            store_child_count: true,
            node_hash_fn: Arc::new(XxHash64),
            are_dewey_ids_stored: false,
        }
    }

    pub fn with_store_child_count(mut self, store_child_count: bool) -> Self {
        self.store_child_count = store_child_count;
        self
    }

    pub fn with_node_hash_fn(mut self, hash_fn: Arc<dyn NodeHashFn>) -> Self {
        self.node_hash_fn = hash_fn;
        self
    }

    pub fn with_dewey_ids_stored(mut self, stored: bool) -> Self {
        self.are_dewey_ids_stored = stored;
        self
    }

    pub fn hash(&self, bytes: &[u8]) -> u64 {
        self.node_hash_fn.hash(bytes)
    }
}

impl Default for ResourceConfiguration {
    fn default() -> Self {
        Self::new(HashType::Configured)
    }
}

impl std::fmt::Debug for ResourceConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceConfiguration")
            .field("hash_type", &self.hash_type)
            .field("store_child_count", &self.store_child_count)
            .field("are_dewey_ids_stored", &self.are_dewey_ids_stored)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xxhash_is_deterministic() {
        let h = XxHash64;
        let a = h.hash(b"hello");
        let b = h.hash(b"hello");
        assert_eq!(a, b);
        assert_ne!(a, h.hash(b"world"));
    }

    #[test]
    fn builder_defaults() {
        let cfg = ResourceConfiguration::default();
        assert_eq!(cfg.hash_type, HashType::Configured);
        assert!(cfg.store_child_count);
        assert!(!cfg.are_dewey_ids_stored);
    }
}
