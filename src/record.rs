//! Per-kind binary record layout: kind byte + offset table + data region
//! (§4.3), and the serializer that writes a whole populated record in one
//! pass (§4.4 "Serialize").
//!
//! Field decoding that needs to work against *either* a live, possibly
//! mutable page or an immutable owned byte buffer is expressed here as free
//! functions over a plain `&[u8]` plus a `record_base` offset — both
//! `node_core::BindState::Bound` (via `PageAccessor::as_bytes`) and
//! `BindState::Lazy` (an owned `Arc<[u8]>`) funnel through the same code.

use std::io::{Seek, SeekFrom, Write};

use crate::error::{NodeError, Result};
use crate::kind::{FieldKind, NodeKind};
use crate::sentinels::{INVALID_KEY_FOR_TYPE_CHECK, NULL_NODE_KEY};
use crate::value::NodeValue;
use crate::varint::{
    read_delta_at, read_delta_encoded_width, read_long_at, read_signed_at,
    read_signed_varint_width, write_delta, write_long, write_signed, write_signed_long,
};

/// Offset-table sentinel meaning "field absent in this record" (§4.3).
pub const ABSENT_OFFSET: u8 = 0xFF;

/// Fully materialized, logically-typed field values for a node — the
/// backing store for `Owned` proxies and for the eagerly-decoded structural
/// fields of a `Lazy` proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFields {
    pub parent_key: i64,
    pub left_sibling: i64,
    pub right_sibling: i64,
    pub first_child: i64,
    pub last_child: i64,
    pub name_key: i32,
    pub path_node_key: i64,
    pub prev_revision: i32,
    pub last_modified_revision: i32,
    pub hash: u64,
    pub child_count: i64,
    pub descendant_count: i64,
    pub value: Option<NodeValue>,
}

impl RecordFields {
    /// Defaults matching invariant 2/3: relation fields absent (`NULL`),
    /// `lastChild` absent-for-type-check where a kind never has one,
    /// counts zero, revisions zero (document-root creation values).
    pub fn new_defaults(kind: NodeKind) -> Self {
        Self {
            parent_key: NULL_NODE_KEY,
            left_sibling: NULL_NODE_KEY,
            right_sibling: NULL_NODE_KEY,
            first_child: NULL_NODE_KEY,
            last_child: if kind.is_value_leaf() {
                INVALID_KEY_FOR_TYPE_CHECK
            } else {
                NULL_NODE_KEY
            },
            name_key: -1,
            path_node_key: NULL_NODE_KEY,
            prev_revision: 0,
            last_modified_revision: 0,
            hash: 0,
            child_count: 0,
            descendant_count: 0,
            value: None,
        }
    }

    fn get_relation(&self, field: FieldKind) -> i64 {
        match field {
            FieldKind::ParentKey => self.parent_key,
            FieldKind::LeftSibling => self.left_sibling,
            FieldKind::RightSibling => self.right_sibling,
            FieldKind::FirstChild => self.first_child,
            FieldKind::LastChild => self.last_child,
            FieldKind::PathNodeKey => self.path_node_key,
            other => panic!("{:?} is not a relation field", other),
        }
    }

    /// Generic read keyed by [`FieldKind`], for callers (the proxy layer)
    /// that walk a kind's field table rather than naming a Rust field.
    pub fn get(&self, field: FieldKind) -> FieldDecoded {
        field_decoded_of(self, field)
    }

    /// Generic write keyed by [`FieldKind`]; panics on a field/value kind
    /// mismatch, same as [`encode_field_value`].
    pub fn set(&mut self, field: FieldKind, decoded: FieldDecoded) {
        apply_decoded(self, field, decoded)
    }

    fn set_relation(&mut self, field: FieldKind, value: i64) {
        match field {
            FieldKind::ParentKey => self.parent_key = value,
            FieldKind::LeftSibling => self.left_sibling = value,
            FieldKind::RightSibling => self.right_sibling = value,
            FieldKind::FirstChild => self.first_child = value,
            FieldKind::LastChild => self.last_child = value,
            FieldKind::PathNodeKey => self.path_node_key = value,
            other => panic!("{:?} is not a relation field", other),
        }
    }
}

/// A single field's decoded value, typed generically enough to cover every
/// `FieldKind` (§4.3's `Δ`/`s`/`sL`/`8`/payload tags).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDecoded {
    Relation(i64),
    Scalar32(i32),
    Scalar64(i64),
    Hash(u64),
    Value(NodeValue),
}

/// Resolve the offset-table entry for `field_index` into an absolute byte
/// offset within `bytes`, or `None` if the table marks the field absent.
/// The value an absent field (not in this kind's table, or present-but-
/// marked-absent via the `0xFF` offset sentinel) decodes to.
pub(crate) fn default_decoded(field: FieldKind) -> FieldDecoded {
    match field {
        FieldKind::ParentKey
        | FieldKind::LeftSibling
        | FieldKind::RightSibling
        | FieldKind::FirstChild
        | FieldKind::LastChild
        | FieldKind::PathNodeKey => FieldDecoded::Relation(NULL_NODE_KEY),
        FieldKind::NameKey | FieldKind::PrevRevision | FieldKind::LastModifiedRevision => {
            FieldDecoded::Scalar32(0)
        }
        FieldKind::Hash => FieldDecoded::Hash(0),
        FieldKind::ChildCount | FieldKind::DescendantCount => FieldDecoded::Scalar64(0),
        FieldKind::Payload => FieldDecoded::Value(NodeValue::Null),
    }
}

pub(crate) fn field_abs_offset(
    bytes: &[u8],
    record_base: usize,
    kind: NodeKind,
    field_index: usize,
) -> Result<Option<usize>> {
    let table_pos = record_base + 1 + field_index;
    let rel = *bytes
        .get(table_pos)
        .ok_or(NodeError::TruncatedRecord {
            offset: table_pos,
            expected: 1,
        })?;
    if rel == ABSENT_OFFSET {
        return Ok(None);
    }
    let data_start = record_base + 1 + kind.field_count();
    Ok(Some(data_start + rel as usize))
}

/// Decode the field at `field_index` of the record starting at
/// `record_base` within `bytes`. Returns the decoded value and the number
/// of bytes its encoding occupies (needed by the in-place width check).
pub fn decode_field_at(
    bytes: &[u8],
    record_base: usize,
    kind: NodeKind,
    field_index: usize,
    node_key: i64,
) -> Result<(FieldDecoded, usize)> {
    let field = kind.field_table()[field_index];
    let abs = field_abs_offset(bytes, record_base, kind, field_index)?;
    let abs = match abs {
        Some(abs) => abs,
        None => {
            // Absent-by-table: default value, zero width (nothing written).
            return Ok((default_decoded(field), 0));
        }
    };

    match field {
        FieldKind::ParentKey
        | FieldKind::LeftSibling
        | FieldKind::RightSibling
        | FieldKind::FirstChild
        | FieldKind::LastChild
        | FieldKind::PathNodeKey => {
            let (value, width) = read_delta_at(bytes, abs, node_key)?;
            Ok((FieldDecoded::Relation(value), width))
        }
        FieldKind::NameKey | FieldKind::PrevRevision | FieldKind::LastModifiedRevision => {
            let (value, width) = read_signed_at(bytes, abs)?;
            Ok((FieldDecoded::Scalar32(value), width))
        }
        FieldKind::Hash => Ok((FieldDecoded::Hash(read_long_at(bytes, abs)? as u64), 8)),
        FieldKind::ChildCount | FieldKind::DescendantCount => {
            let (value, width) = crate::varint::read_signed_long_at(bytes, abs)?;
            Ok((FieldDecoded::Scalar64(value), width))
        }
        FieldKind::Payload => {
            let mut cursor = &bytes[abs..];
            let before = cursor.len();
            let value = decode_payload(kind, &mut cursor)?;
            let width = before - cursor.len();
            Ok((FieldDecoded::Value(value), width))
        }
    }
}

fn decode_payload(kind: NodeKind, cursor: &mut &[u8]) -> Result<NodeValue> {
    match kind {
        NodeKind::BooleanValue | NodeKind::ObjectBooleanValue => {
            let mut b = [0u8; 1];
            std::io::Read::read_exact(cursor, &mut b)?;
            Ok(NodeValue::Boolean(b[0] != 0))
        }
        NodeKind::NullValue | NodeKind::ObjectNullValue => Ok(NodeValue::Null),
        NodeKind::NumberValue | NodeKind::ObjectNumberValue => {
            Ok(NodeValue::Number(crate::value::NumberValue::decode(cursor)?))
        }
        NodeKind::StringValue | NodeKind::ObjectStringValue => Ok(NodeValue::String(
            crate::value::StringPayload::decode(cursor)?,
        )),
        _ => unreachable!("only value leaves carry a payload"),
    }
}

/// Just the width of the field at `field_index`, without allocating the
/// decoded value into owned storage (used by the in-place width check).
pub fn field_width_at(
    bytes: &[u8],
    record_base: usize,
    kind: NodeKind,
    field_index: usize,
) -> Result<usize> {
    let field = kind.field_table()[field_index];
    let abs = match field_abs_offset(bytes, record_base, kind, field_index)? {
        Some(abs) => abs,
        None => return Ok(0),
    };
    match field {
        FieldKind::ParentKey
        | FieldKind::LeftSibling
        | FieldKind::RightSibling
        | FieldKind::FirstChild
        | FieldKind::LastChild
        | FieldKind::PathNodeKey => read_delta_encoded_width(bytes, abs),
        FieldKind::NameKey | FieldKind::PrevRevision | FieldKind::LastModifiedRevision => {
            read_signed_varint_width(bytes, abs)
        }
        FieldKind::Hash => Ok(8),
        FieldKind::ChildCount | FieldKind::DescendantCount => {
            Ok(crate::varint::read_signed_long_at(bytes, abs)?.1)
        }
        FieldKind::Payload => match kind {
            NodeKind::BooleanValue | NodeKind::ObjectBooleanValue => {
                Ok(crate::value::boolean_payload_width(bytes, abs))
            }
            NodeKind::NullValue | NodeKind::ObjectNullValue => Ok(0),
            NodeKind::NumberValue | NodeKind::ObjectNumberValue => {
                crate::value::number_payload_width(bytes, abs)
            }
            NodeKind::StringValue | NodeKind::ObjectStringValue => {
                let (len, len_width) = read_signed_at(bytes, abs + 1)?;
                Ok(1 + len_width + len as usize)
            }
            _ => unreachable!(),
        },
    }
}

/// Encode a single field's new logical value into a byte buffer (used both
/// by the full serializer and by the in-place setter's width check/commit).
pub fn encode_field_value(field: FieldKind, node_key: i64, value: &FieldDecoded) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match (field, value) {
        (
            FieldKind::ParentKey
            | FieldKind::LeftSibling
            | FieldKind::RightSibling
            | FieldKind::FirstChild
            | FieldKind::LastChild
            | FieldKind::PathNodeKey,
            FieldDecoded::Relation(v),
        ) => {
            write_delta(&mut buf, *v, node_key)?;
        }
        (
            FieldKind::NameKey | FieldKind::PrevRevision | FieldKind::LastModifiedRevision,
            FieldDecoded::Scalar32(v),
        ) => {
            write_signed(&mut buf, *v)?;
        }
        (FieldKind::Hash, FieldDecoded::Hash(v)) => {
            write_long(&mut buf, *v as i64)?;
        }
        (FieldKind::ChildCount | FieldKind::DescendantCount, FieldDecoded::Scalar64(v)) => {
            write_signed_long(&mut buf, *v)?;
        }
        (FieldKind::Payload, FieldDecoded::Value(v)) => {
            v.encode(&mut buf)?;
        }
        (field, value) => panic!("field/value kind mismatch: {:?} / {:?}", field, value),
    }
    Ok(buf)
}

/// Predicted byte width of `value` if it were encoded for `field`, without
/// allocating — used to decide whether an in-place overwrite is legal.
pub fn predicted_width(field: FieldKind, node_key: i64, value: &FieldDecoded) -> usize {
    match (field, value) {
        (
            FieldKind::ParentKey
            | FieldKind::LeftSibling
            | FieldKind::RightSibling
            | FieldKind::FirstChild
            | FieldKind::LastChild
            | FieldKind::PathNodeKey,
            FieldDecoded::Relation(v),
        ) => crate::varint::compute_delta_encoded_width(*v, node_key),
        (
            FieldKind::NameKey | FieldKind::PrevRevision | FieldKind::LastModifiedRevision,
            FieldDecoded::Scalar32(v),
        ) => crate::varint::compute_signed_encoded_width(*v),
        (FieldKind::Hash, FieldDecoded::Hash(_)) => 8,
        (FieldKind::ChildCount | FieldKind::DescendantCount, FieldDecoded::Scalar64(v)) => {
            crate::varint::compute_signed_long_encoded_width(*v)
        }
        (FieldKind::Payload, FieldDecoded::Value(v)) => v.encoded_width(),
        (field, value) => panic!("field/value kind mismatch: {:?} / {:?}", field, value),
    }
}

/// Decode every field of the record starting at `record_base` into an owned
/// [`RecordFields`] — used by `unbind`, `toSnapshot`, and materializing a
/// `Lazy` proxy on first metadata/value touch.
pub fn materialize_all(
    bytes: &[u8],
    record_base: usize,
    kind: NodeKind,
    node_key: i64,
) -> Result<RecordFields> {
    let mut fields = RecordFields::new_defaults(kind);
    for (index, field) in kind.field_table().iter().enumerate() {
        let (decoded, _) = decode_field_at(bytes, record_base, kind, index, node_key)?;
        apply_decoded(&mut fields, *field, decoded);
    }
    Ok(fields)
}

fn apply_decoded(fields: &mut RecordFields, field: FieldKind, decoded: FieldDecoded) {
    match (field, decoded) {
        (
            FieldKind::ParentKey
            | FieldKind::LeftSibling
            | FieldKind::RightSibling
            | FieldKind::FirstChild
            | FieldKind::LastChild
            | FieldKind::PathNodeKey,
            FieldDecoded::Relation(v),
        ) => fields.set_relation(field, v),
        (FieldKind::NameKey, FieldDecoded::Scalar32(v)) => fields.name_key = v,
        (FieldKind::PrevRevision, FieldDecoded::Scalar32(v)) => fields.prev_revision = v,
        (FieldKind::LastModifiedRevision, FieldDecoded::Scalar32(v)) => {
            fields.last_modified_revision = v
        }
        (FieldKind::Hash, FieldDecoded::Hash(v)) => fields.hash = v,
        (FieldKind::ChildCount, FieldDecoded::Scalar64(v)) => fields.child_count = v,
        (FieldKind::DescendantCount, FieldDecoded::Scalar64(v)) => fields.descendant_count = v,
        (FieldKind::Payload, FieldDecoded::Value(v)) => fields.value = Some(v),
        (field, decoded) => panic!("field/decoded mismatch: {:?} / {:?}", field, decoded),
    }
}

fn field_decoded_of(fields: &RecordFields, field: FieldKind) -> FieldDecoded {
    match field {
        FieldKind::ParentKey
        | FieldKind::LeftSibling
        | FieldKind::RightSibling
        | FieldKind::FirstChild
        | FieldKind::LastChild
        | FieldKind::PathNodeKey => FieldDecoded::Relation(fields.get_relation(field)),
        FieldKind::NameKey => FieldDecoded::Scalar32(fields.name_key),
        FieldKind::PrevRevision => FieldDecoded::Scalar32(fields.prev_revision),
        FieldKind::LastModifiedRevision => FieldDecoded::Scalar32(fields.last_modified_revision),
        FieldKind::Hash => FieldDecoded::Hash(fields.hash),
        FieldKind::ChildCount => FieldDecoded::Scalar64(fields.child_count),
        FieldKind::DescendantCount => FieldDecoded::Scalar64(fields.descendant_count),
        FieldKind::Payload => FieldDecoded::Value(
            fields
                .value
                .clone()
                .unwrap_or(NodeValue::Null),
        ),
    }
}

/// Serialize a whole populated record (§4.4 "Serialize"):
/// 1. write the kind byte,
/// 2. reserve `FIELD_COUNT(kind)` offset-table bytes,
/// 3. encode each field in order, recording its relative offset,
/// 4. back-patch the offset table,
/// 5. return the total bytes written.
///
/// Deterministic: identical `fields` always produce identical bytes.
pub fn write_record<W: Write + Seek>(
    sink: &mut W,
    kind: NodeKind,
    node_key: i64,
    fields: &RecordFields,
) -> Result<usize> {
    write_record_with_options(sink, kind, node_key, fields, true)
}

/// As [`write_record`], but honors `storeChildCount` (§6 "Resource
/// configuration"): when `false`, `childCount` is omitted from container
/// records (its offset-table entry is the absent sentinel) and a reader
/// sees it as `0`, the same default any absent field decodes to.
pub fn write_record_with_options<W: Write + Seek>(
    sink: &mut W,
    kind: NodeKind,
    node_key: i64,
    fields: &RecordFields,
    store_child_count: bool,
) -> Result<usize> {
    let start = sink.stream_position()?;
    sink.write_all(&[kind.tag()])?;

    let field_table = kind.field_table();
    let offset_table_pos = sink.stream_position()?;
    sink.write_all(&vec![ABSENT_OFFSET; field_table.len()])?;
    let data_start = sink.stream_position()?;

    let mut offsets = vec![ABSENT_OFFSET; field_table.len()];
    for (index, field) in field_table.iter().enumerate() {
        if *field == FieldKind::ChildCount && !store_child_count {
            continue;
        }
        let before = sink.stream_position()?;
        let rel = before - data_start;
        debug_assert!(rel < 256, "record field offset exceeds the u8 offset table");
        offsets[index] = rel as u8;
        let decoded = field_decoded_of(fields, *field);
        let bytes = encode_field_value(*field, node_key, &decoded)?;
        sink.write_all(&bytes)?;
    }

    let end = sink.stream_position()?;
    sink.seek(SeekFrom::Start(offset_table_pos))?;
    sink.write_all(&offsets)?;
    sink.seek(SeekFrom::Start(end))?;
    Ok((end - start) as usize)
}

/// `writeEndPadding`: pad `buf` so its length becomes a multiple of
/// `alignment` (page layout helper, §4.4).
pub fn write_end_padding(buf: &mut Vec<u8>, alignment: usize) {
    let rem = buf.len() % alignment;
    if rem != 0 {
        buf.resize(buf.len() + (alignment - rem), 0);
    }
}

/// `[size:4][pad:3]` record-size header so that, combined with the 1-byte
/// kind byte that follows, node data starts on an 8-byte boundary (§4.4).
pub fn write_size_header<W: Write>(sink: &mut W, record_size: u32) -> Result<()> {
    sink.write_all(&record_size.to_le_bytes())?;
    sink.write_all(&[0u8; 3])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn s1_object_round_trip_and_exact_size() {
        let mut fields = RecordFields::new_defaults(NodeKind::Object);
        fields.parent_key = NULL_NODE_KEY;
        fields.left_sibling = NULL_NODE_KEY;
        fields.right_sibling = NULL_NODE_KEY;
        fields.first_child = 2;
        fields.last_child = 7;
        fields.child_count = 3;
        fields.descendant_count = 5;
        fields.hash = 0xDEAD;
        fields.prev_revision = 0;
        fields.last_modified_revision = 0;

        let mut buf = Cursor::new(Vec::new());
        let written = write_record(&mut buf, NodeKind::Object, 1, &fields).unwrap();
        assert_eq!(written, 28);

        let bytes = buf.into_inner();
        let decoded = materialize_all(&bytes, 0, NodeKind::Object, 1).unwrap();
        assert_eq!(decoded, fields);
    }

    #[test]
    fn offset_table_entries_strictly_increase() {
        let mut fields = RecordFields::new_defaults(NodeKind::ObjectKey);
        fields.parent_key = 1;
        fields.name_key = 9;
        fields.path_node_key = 4;
        fields.descendant_count = 1;

        let mut buf = Cursor::new(Vec::new());
        write_record(&mut buf, NodeKind::ObjectKey, 10, &fields).unwrap();
        let bytes = buf.into_inner();

        let field_count = NodeKind::ObjectKey.field_count();
        let mut last = -1i32;
        for i in 0..field_count {
            let rel = bytes[1 + i];
            assert_ne!(rel, ABSENT_OFFSET);
            assert!((rel as i32) > last, "offsets must strictly increase");
            assert!(rel < 255);
            last = rel as i32;
        }
    }

    #[test]
    fn s4_in_place_width_prediction() {
        let mut fields = RecordFields::new_defaults(NodeKind::Object);
        fields.child_count = 3;
        let mut buf = Cursor::new(Vec::new());
        write_record(&mut buf, NodeKind::Object, 1, &fields).unwrap();
        let bytes = buf.into_inner();

        let idx = NodeKind::Object.field_index(FieldKind::ChildCount).unwrap();
        let current_width = field_width_at(&bytes, 0, NodeKind::Object, idx).unwrap();
        assert_eq!(current_width, 1);

        let same_width = predicted_width(FieldKind::ChildCount, 1, &FieldDecoded::Scalar64(4));
        assert_eq!(same_width, current_width);

        let bigger_width = predicted_width(FieldKind::ChildCount, 1, &FieldDecoded::Scalar64(200));
        assert_ne!(bigger_width, current_width);
    }
}
