//! Canonical content hash.
//!
//! The hash always covers a fixed canonical byte stream built from the
//! node's logical field values — never the on-disk encoding — so it is
//! stable across storage modes (owned / bound / lazy) and across a
//! serialize/deserialize round trip.

use std::cell::RefCell;

use crate::kind::NodeKind;
use crate::sentinels::INVALID_KEY_FOR_TYPE_CHECK;

thread_local! {
    /// Reused across `compute_hash` calls on the same thread so the hot
    /// path (§5: "computeHash is allocation-free") does not allocate once
    /// warmed up.
    static HASH_SCRATCH: RefCell<Vec<u8>> = RefCell::new(Vec::with_capacity(128));
}

/// Structural inputs to the canonical hash, common to every kind.
#[derive(Debug, Clone, Copy)]
pub struct HashableStructure {
    pub node_key: i64,
    pub parent_key: i64,
    pub kind: NodeKind,
    pub child_count: i64,
    pub descendant_count: i64,
    pub left_sibling: i64,
    pub right_sibling: i64,
    pub first_child: i64,
    pub last_child: i64,
}

/// Computes the canonical hash, invoking `hash_fn` on the built byte
/// stream. `tail` is the kind-specific suffix: the nameKey bytes for
/// `OBJECT_KEY`, the serialized payload for value kinds, or empty for
/// `OBJECT`/`ARRAY`/the document root.
pub fn compute_hash(
    structure: &HashableStructure,
    tail: &[u8],
    hash_fn: &dyn Fn(&[u8]) -> u64,
) -> u64 {
    HASH_SCRATCH.with(|cell| {
        let mut buf = cell.borrow_mut();
        buf.clear();
        write_canonical_input(&mut buf, structure, tail);
        hash_fn(&buf)
    })
}

/// Builds the canonical byte stream without hashing it — exposed
/// separately so tests can assert on its exact shape (testable property 8:
/// determinism as a pure function of logical state).
pub fn canonical_input(structure: &HashableStructure, tail: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    write_canonical_input(&mut buf, structure, tail);
    buf
}

fn write_canonical_input(buf: &mut Vec<u8>, s: &HashableStructure, tail: &[u8]) {
    buf.extend_from_slice(&s.node_key.to_le_bytes());
    buf.extend_from_slice(&s.parent_key.to_le_bytes());
    buf.push(s.kind.tag());
    buf.extend_from_slice(&s.child_count.to_le_bytes());
    buf.extend_from_slice(&s.descendant_count.to_le_bytes());
    buf.extend_from_slice(&s.left_sibling.to_le_bytes());
    buf.extend_from_slice(&s.right_sibling.to_le_bytes());
    buf.extend_from_slice(&s.first_child.to_le_bytes());
    if s.last_child != INVALID_KEY_FOR_TYPE_CHECK {
        buf.extend_from_slice(&s.last_child.to_le_bytes());
    }
    buf.extend_from_slice(tail);
}
