//! Node Kind Registry (§4.1): tag-dispatched construction of the concrete
//! per-kind proxy, and the `serialize`/`deserialize` entry points every
//! other component reaches through rather than matching on `NodeKind`
//! directly.

use std::io::{Seek, Write};
use std::sync::Arc;

use crate::config::ResourceConfiguration;
use crate::dewey::DeweyId;
use crate::error::Result;
use crate::kind::NodeKind;
use crate::proxy::container::{ArrayNode, DocumentNode, ObjectKeyNode, ObjectNode};
use crate::proxy::leaf::{BooleanValueNode, NullValueNode, NumberValueNode, StringValueNode};
use crate::proxy::object_child::{
    ObjectBooleanValueNode, ObjectNullValueNode, ObjectNumberValueNode, ObjectStringValueNode,
};
use crate::proxy::{NodeCore, NodeProxy};
use crate::record;

/// Allocate an empty, `Owned` proxy of `kind` (the pool's allocation path
/// and a cursor building a brand-new node both go through this).
pub fn new_empty(kind: NodeKind, node_key: i64, config: ResourceConfiguration) -> Box<dyn NodeProxy> {
    match kind {
        NodeKind::JsonDocument => Box::new(DocumentNode::new(node_key, config)),
        NodeKind::Object => Box::new(ObjectNode::new(node_key, config)),
        NodeKind::Array => Box::new(ArrayNode::new(node_key, config)),
        NodeKind::ObjectKey => Box::new(ObjectKeyNode::new(node_key, config)),
        NodeKind::StringValue => Box::new(StringValueNode::new(node_key, config)),
        NodeKind::NumberValue => Box::new(NumberValueNode::new(node_key, config)),
        NodeKind::BooleanValue => Box::new(BooleanValueNode::new(node_key, config)),
        NodeKind::NullValue => Box::new(NullValueNode::new(node_key, config)),
        NodeKind::ObjectStringValue => Box::new(ObjectStringValueNode::new(node_key, config)),
        NodeKind::ObjectNumberValue => Box::new(ObjectNumberValueNode::new(node_key, config)),
        NodeKind::ObjectBooleanValue => Box::new(ObjectBooleanValueNode::new(node_key, config)),
        NodeKind::ObjectNullValue => Box::new(ObjectNullValueNode::new(node_key, config)),
    }
}

/// Wrap an already-constructed [`NodeCore`] in the proxy type matching its
/// kind. Used by [`deserialize`] once the structural fields have been
/// eagerly decoded.
fn wrap(core: NodeCore) -> Box<dyn NodeProxy> {
    match core.kind {
        NodeKind::JsonDocument => Box::new(DocumentNode(core)),
        NodeKind::Object => Box::new(ObjectNode(core)),
        NodeKind::Array => Box::new(ArrayNode(core)),
        NodeKind::ObjectKey => Box::new(ObjectKeyNode(core)),
        NodeKind::StringValue => Box::new(StringValueNode(core)),
        NodeKind::NumberValue => Box::new(NumberValueNode(core)),
        NodeKind::BooleanValue => Box::new(BooleanValueNode(core)),
        NodeKind::NullValue => Box::new(NullValueNode(core)),
        NodeKind::ObjectStringValue => Box::new(ObjectStringValueNode(core)),
        NodeKind::ObjectNumberValue => Box::new(ObjectNumberValueNode(core)),
        NodeKind::ObjectBooleanValue => Box::new(ObjectBooleanValueNode(core)),
        NodeKind::ObjectNullValue => Box::new(ObjectNullValueNode(core)),
    }
}

/// Dispatch by the record's own tag byte: decode the structural fields
/// eagerly and return a `Lazy` proxy of the matching kind (§4.1 "Dispatch
/// is by the tag byte").
pub fn deserialize(
    source: Arc<[u8]>,
    node_key: i64,
    dewey_id: Option<DeweyId>,
    config: ResourceConfiguration,
) -> Result<Box<dyn NodeProxy>> {
    let core = NodeCore::read_from(source, node_key, dewey_id, config)?;
    Ok(wrap(core))
}

/// Serialize `proxy`'s current logical field values as a whole record
/// (§4.4), returning the number of bytes written. Does not change the
/// proxy's lifecycle state.
pub fn serialize<W: Write + Seek>(proxy: &dyn NodeProxy, sink: &mut W) -> Result<usize> {
    let fields = proxy.core().to_snapshot()?;
    record::write_record_with_options(
        sink,
        proxy.kind(),
        proxy.node_key(),
        &fields,
        proxy.core().config.store_child_count,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trip_through_registry() {
        let mut object = ObjectNode::new(1, ResourceConfiguration::default());
        object.set_first_child(2).unwrap();
        object.set_child_count(3).unwrap();
        object.set_descendant_count(5).unwrap();

        let mut buf = Cursor::new(Vec::new());
        serialize(&object, &mut buf).unwrap();
        let bytes: Arc<[u8]> = Arc::from(buf.into_inner().into_boxed_slice());

        let mut proxy = deserialize(bytes, 1, None, ResourceConfiguration::default()).unwrap();
        assert_eq!(proxy.kind(), NodeKind::Object);
        let restored = proxy
            .as_any_mut()
            .downcast_mut::<ObjectNode>()
            .unwrap();
        assert_eq!(restored.first_child().unwrap(), 2);
        assert_eq!(restored.child_count().unwrap(), 3);
        assert_eq!(restored.descendant_count().unwrap(), 5);
    }

    #[test]
    fn new_empty_matches_requested_kind() {
        for kind in NodeKind::ALL {
            let proxy = new_empty(kind, 1, ResourceConfiguration::default());
            assert_eq!(proxy.kind(), kind);
        }
    }
}
