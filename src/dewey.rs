//! DeweyID — opaque path-order label, decoded lazily.
//!
//! A DeweyID is a sequence of per-level numbers (like a Dewey decimal
//! outline: `1.3.2`) that places a node relative to its siblings and
//! ancestors without needing a tree walk to compare positions. The node
//! layer treats it as an opaque byte string end to end; only the (rare)
//! caller that actually needs the decoded component sequence pays to parse
//! it, and a proxy never holds both the raw bytes and the decoded form —
//! parsing replaces the raw copy (`record.rs`'s "never wrap in a
//! future/promise" design note applies here too).

use std::cell::OnceCell;

use crate::error::{NodeError, Result};
use crate::varint::{read_signed_long_at, write_signed_long};

/// A DeweyID, holding either its raw wire bytes or its decoded levels, never
/// both. Decoding is at-most-once and triggered by [`DeweyId::levels`].
pub struct DeweyId {
    raw: Vec<u8>,
    levels: OnceCell<Vec<i64>>,
}

impl DeweyId {
    /// Wrap raw, not-yet-parsed DeweyID bytes.
    pub fn from_bytes(raw: Vec<u8>) -> Self {
        Self {
            raw,
            levels: OnceCell::new(),
        }
    }

    /// Build a DeweyID from its decoded per-level sequence (e.g. when the
    /// caller constructs a brand-new node rather than reading one back).
    pub fn from_levels(levels: Vec<i64>) -> Self {
        let mut raw = Vec::new();
        for &level in &levels {
            // Infallible: writing into a Vec<u8> sink never produces I/O errors.
            write_signed_long(&mut raw, level).expect("in-memory sink is infallible");
        }
        let cell = OnceCell::new();
        let _ = cell.set(levels);
        Self { raw, levels: cell }
    }

    /// Raw wire bytes, without triggering a parse.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Decoded per-level sequence. Parses on first access, then caches.
    /// Errors if the DeweyID carries no levels at all — every real node
    /// position has at least one.
    pub fn levels(&self) -> Result<&[i64]> {
        if let Some(levels) = self.levels.get() {
            return Ok(levels);
        }
        if self.raw.is_empty() {
            return Err(empty_dewey_error());
        }
        let mut levels = Vec::new();
        let mut offset = 0usize;
        while offset < self.raw.len() {
            let (value, width) = read_signed_long_at(&self.raw, offset)?;
            levels.push(value);
            offset += width;
        }
        // OnceCell::set only fails if already set; a concurrent second
        // parse would just discard its own result and read the winner's.
        let _ = self.levels.set(levels);
        Ok(self.levels.get().unwrap())
    }

    /// Number of path levels, parsing if not already decoded.
    pub fn depth(&self) -> Result<usize> {
        Ok(self.levels()?.len())
    }

    /// Whether `self` is a path-order ancestor of `other`, i.e. `other`'s
    /// levels extend `self`'s.
    pub fn is_ancestor_of(&self, other: &DeweyId) -> Result<bool> {
        let a = self.levels()?;
        let b = other.levels()?;
        Ok(a.len() < b.len() && a == &b[..a.len()])
    }
}

impl Clone for DeweyId {
    fn clone(&self) -> Self {
        let cell = OnceCell::new();
        if let Some(levels) = self.levels.get() {
            let _ = cell.set(levels.clone());
        }
        Self {
            raw: self.raw.clone(),
            levels: cell,
        }
    }
}

impl std::fmt::Debug for DeweyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.levels.get() {
            Some(levels) => write!(f, "DeweyId({:?})", levels),
            None => write!(f, "DeweyId(<{} raw bytes, unparsed>)", self.raw.len()),
        }
    }
}

impl PartialEq for DeweyId {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

/// Error returned by [`DeweyId::levels`] (and so [`DeweyId::depth`],
/// [`DeweyId::is_ancestor_of`]) when the DeweyID has zero levels.
pub fn empty_dewey_error() -> NodeError {
    NodeError::corrupt(0, 0, "empty DeweyID")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_access_does_not_parse() {
        let id = DeweyId::from_bytes(vec![2, 6, 4]);
        assert_eq!(id.as_bytes(), &[2, 6, 4]);
        assert!(id.levels.get().is_none());
    }

    #[test]
    fn levels_roundtrip() {
        let id = DeweyId::from_levels(vec![1, 3, 2]);
        assert_eq!(id.levels().unwrap(), &[1, 3, 2]);

        let reparsed = DeweyId::from_bytes(id.as_bytes().to_vec());
        assert_eq!(reparsed.levels().unwrap(), &[1, 3, 2]);
    }

    #[test]
    fn ancestor_relationship() {
        let parent = DeweyId::from_levels(vec![1, 3]);
        let child = DeweyId::from_levels(vec![1, 3, 2]);
        assert!(parent.is_ancestor_of(&child).unwrap());
        assert!(!child.is_ancestor_of(&parent).unwrap());
    }

    #[test]
    fn empty_dewey_id_errors_on_levels() {
        let id = DeweyId::from_bytes(Vec::new());
        assert!(matches!(id.levels(), Err(NodeError::CorruptRecord { .. })));
        assert!(id.depth().is_err());
    }
}
