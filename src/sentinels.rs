//! Sentinel values shared across the node layer.
//!
//! `NULL_NODE_KEY` and `INVALID_KEY_FOR_TYPE_CHECK` are kept distinct: two
//! different "this pointer is absent" markers for two different purposes
//! (a genuinely missing relation vs. "not a legal key for this node's
//! type", used to flag an absent last-child pointer specifically).
//! Collapsing them to one sentinel would make the canonical hash input
//! ambiguous about which case it is in.

/// All relation fields are carried as `i64` through the varint codec, so
/// this is `0xFFFF_FFFF_FFFF_FFFE` (u64) reinterpreted as a negative `i64`.
pub const NULL_NODE_KEY: i64 = 0xFFFF_FFFF_FFFF_FFFEu64 as i64;

/// Distinct from `NULL_NODE_KEY`; used specifically to signal "no
/// last-child pointer for this node's type" in the canonical hash input.
/// `lastChild` is omitted from the hash stream entirely when equal to this
/// sentinel, rather than written as a null marker.
pub const INVALID_KEY_FOR_TYPE_CHECK: i64 = 0xFFFF_FFFF_FFFF_FFFDu64 as i64;
