//! Node Kind Registry — tag bytes, field counts, and the per-kind field
//! layout descriptor that drives the serializer, deserializer, and proxy
//! getters/setters (§4.1, §4.3).

use crate::error::{NodeError, Result};

/// Closed enumeration of every concrete node variant. The discriminant is
/// the on-disk tag byte stored as the first byte of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeKind {
    JsonDocument = 0,
    Object = 1,
    Array = 2,
    ObjectKey = 3,
    StringValue = 4,
    NumberValue = 5,
    BooleanValue = 6,
    NullValue = 7,
    ObjectStringValue = 8,
    ObjectNumberValue = 9,
    ObjectBooleanValue = 10,
    ObjectNullValue = 11,
}

impl NodeKind {
    pub const ALL: [NodeKind; 12] = [
        NodeKind::JsonDocument,
        NodeKind::Object,
        NodeKind::Array,
        NodeKind::ObjectKey,
        NodeKind::StringValue,
        NodeKind::NumberValue,
        NodeKind::BooleanValue,
        NodeKind::NullValue,
        NodeKind::ObjectStringValue,
        NodeKind::ObjectNumberValue,
        NodeKind::ObjectBooleanValue,
        NodeKind::ObjectNullValue,
    ];

    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        NodeKind::ALL
            .into_iter()
            .find(|k| k.tag() == tag)
            .ok_or(NodeError::CorruptRecord {
                tag,
                offset: 0,
                reason: "unknown node kind tag".into(),
            })
    }

    /// `true` for kinds that are a child of `OBJECT_KEY` (no siblings).
    pub fn is_object_child_leaf(self) -> bool {
        matches!(
            self,
            NodeKind::ObjectStringValue
                | NodeKind::ObjectNumberValue
                | NodeKind::ObjectBooleanValue
                | NodeKind::ObjectNullValue
        )
    }

    /// `true` for top-level value leaves (can have siblings).
    pub fn is_top_level_leaf(self) -> bool {
        matches!(
            self,
            NodeKind::StringValue
                | NodeKind::NumberValue
                | NodeKind::BooleanValue
                | NodeKind::NullValue
        )
    }

    /// `true` for any leaf kind (invariant 3: always childless).
    pub fn is_value_leaf(self) -> bool {
        self.is_top_level_leaf() || self.is_object_child_leaf()
    }

    /// `true` for the container kinds (document root, OBJECT, ARRAY, OBJECT_KEY).
    pub fn is_container(self) -> bool {
        !self.is_value_leaf()
    }

    pub fn field_count(self) -> usize {
        self.field_table().len()
    }

    /// Ordered field descriptor for this kind, field-index order (§4.3).
    pub fn field_table(self) -> &'static [FieldKind] {
        use FieldKind::*;
        match self {
            NodeKind::JsonDocument => &[
                FirstChild,
                LastChild,
                PrevRevision,
                LastModifiedRevision,
                Hash,
                ChildCount,
                DescendantCount,
            ],
            NodeKind::Object | NodeKind::Array => &[
                ParentKey,
                RightSibling,
                LeftSibling,
                FirstChild,
                LastChild,
                PrevRevision,
                LastModifiedRevision,
                Hash,
                ChildCount,
                DescendantCount,
            ],
            NodeKind::ObjectKey => &[
                ParentKey,
                RightSibling,
                LeftSibling,
                FirstChild,
                NameKey,
                PathNodeKey,
                PrevRevision,
                LastModifiedRevision,
                Hash,
                DescendantCount,
            ],
            k if k.is_top_level_leaf() => &[
                ParentKey,
                RightSibling,
                LeftSibling,
                PrevRevision,
                LastModifiedRevision,
                Hash,
                Payload,
            ],
            k if k.is_object_child_leaf() => {
                &[ParentKey, PrevRevision, LastModifiedRevision, Hash, Payload]
            }
            _ => unreachable!("NodeKind::ALL is exhaustive"),
        }
    }

    pub fn field_index(self, field: FieldKind) -> Option<usize> {
        self.field_table().iter().position(|&f| f == field)
    }
}

/// One entry in a kind's field descriptor. The encoding each variant uses is
/// fixed (§4.3's `Δ`/`s`/`sL`/`8`/payload tags) and never varies by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Δ — delta varlong against the record's own nodeKey.
    ParentKey,
    RightSibling,
    LeftSibling,
    FirstChild,
    LastChild,
    /// s — signed 32-bit varint.
    NameKey,
    /// Δ — delta varlong against the record's own nodeKey.
    PathNodeKey,
    /// s — signed 32-bit varint.
    PrevRevision,
    LastModifiedRevision,
    /// 8 — fixed eight-byte long.
    Hash,
    /// sL — signed 64-bit varint.
    ChildCount,
    DescendantCount,
    /// kind-specific payload (boolean / number / string).
    Payload,
}

impl FieldKind {
    /// `true` for the relation fields that are delta-encoded against nodeKey.
    pub fn is_delta(self) -> bool {
        matches!(
            self,
            FieldKind::ParentKey
                | FieldKind::RightSibling
                | FieldKind::LeftSibling
                | FieldKind::FirstChild
                | FieldKind::LastChild
                | FieldKind::PathNodeKey
        )
    }

    /// Which lazy-deserialization stage decodes this field (§4.5 "Lazy
    /// deserialization"): structural delta fields are always eager, the
    /// rest defer to first touch.
    pub fn stage(self) -> FieldStage {
        if self.is_delta() {
            FieldStage::Structural
        } else if self == FieldKind::Payload {
            FieldStage::Value
        } else {
            FieldStage::Metadata
        }
    }
}

/// Lazy-deserialization stage a field belongs to (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStage {
    Structural,
    Metadata,
    Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_unique_and_roundtrip() {
        let mut seen = std::collections::HashSet::new();
        for kind in NodeKind::ALL {
            assert!(seen.insert(kind.tag()), "duplicate tag for {:?}", kind);
            assert_eq!(NodeKind::from_tag(kind.tag()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_tag_is_corrupt_record() {
        assert!(matches!(
            NodeKind::from_tag(200),
            Err(NodeError::CorruptRecord { tag: 200, .. })
        ));
    }

    #[test]
    fn object_field_count_matches_s1_scenario() {
        assert_eq!(NodeKind::Object.field_count(), 10);
        assert_eq!(NodeKind::ObjectKey.field_count(), 10);
    }

    #[test]
    fn leaf_field_counts() {
        assert_eq!(NodeKind::StringValue.field_count(), 7);
        assert_eq!(NodeKind::ObjectStringValue.field_count(), 5);
        assert_eq!(NodeKind::JsonDocument.field_count(), 7);
    }

    #[test]
    fn classification_helpers_are_exhaustive_and_disjoint() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.is_container(), !kind.is_value_leaf());
            assert_eq!(
                kind.is_value_leaf(),
                kind.is_top_level_leaf() || kind.is_object_child_leaf()
            );
        }
    }
}
