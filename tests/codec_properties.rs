//! Property 6 (delta codec round-trip) and property 7 (offset-table
//! monotonicity), exercised from outside the crate the way a consumer
//! would.

use proptest::prelude::*;
use sirix_nodes::kind::{FieldKind, NodeKind};
use sirix_nodes::record::{write_record, RecordFields};
use sirix_nodes::sentinels::NULL_NODE_KEY;
use sirix_nodes::varint::{compute_delta_encoded_width, decode_delta, read_delta_at, write_delta};
use std::io::Cursor;

proptest! {
    #[test]
    fn delta_round_trip_any_i64_pair(target: i64, base: i64) {
        let mut buf = Vec::new();
        let written = write_delta(&mut buf, target, base).unwrap();
        prop_assert_eq!(written, compute_delta_encoded_width(target, base));

        let mut cursor = &buf[..];
        prop_assert_eq!(decode_delta(&mut cursor, base).unwrap(), target);

        let (random, width) = read_delta_at(&buf, 0, base).unwrap();
        prop_assert_eq!(random, target);
        prop_assert_eq!(width, written);
    }

    #[test]
    fn offset_table_is_monotonic_for_object(
        first_child in any::<i64>(),
        last_child in any::<i64>(),
        child_count in any::<i64>(),
        descendant_count in any::<i64>(),
    ) {
        let mut fields = RecordFields::new_defaults(NodeKind::Object);
        fields.parent_key = NULL_NODE_KEY;
        fields.first_child = first_child;
        fields.last_child = last_child;
        fields.child_count = child_count;
        fields.descendant_count = descendant_count;

        let mut buf = Cursor::new(Vec::new());
        write_record(&mut buf, NodeKind::Object, 1, &fields).unwrap();
        let bytes = buf.into_inner();

        let field_count = NodeKind::Object.field_count();
        let mut last: i32 = -1;
        for i in 0..field_count {
            let rel = bytes[1 + i];
            prop_assert_ne!(rel, 0xFF);
            prop_assert!((rel as i32) > last);
            last = rel as i32;
        }
    }
}

#[test]
fn field_stage_classification_matches_delta_set() {
    for field in [
        FieldKind::ParentKey,
        FieldKind::RightSibling,
        FieldKind::LeftSibling,
        FieldKind::FirstChild,
        FieldKind::LastChild,
        FieldKind::PathNodeKey,
    ] {
        assert!(field.is_delta());
    }
    for field in [FieldKind::NameKey, FieldKind::PrevRevision, FieldKind::Hash] {
        assert!(!field.is_delta());
    }
}
