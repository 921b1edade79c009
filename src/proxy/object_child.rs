//! Object-child value leaf wrappers: `OBJECT_STRING_VALUE`,
//! `OBJECT_NUMBER_VALUE`, `OBJECT_BOOLEAN_VALUE`, `OBJECT_NULL_VALUE`.
//!
//! These sit as the sole child of an `OBJECT_KEY` and so never carry
//! sibling pointers — `OBJECT_KEY` permits at most one child (§3).

use crate::config::ResourceConfiguration;
use crate::error::Result;
use crate::kind::{FieldKind, NodeKind};
use crate::proxy::{impl_node_proxy, NodeCore};
use crate::value::{NodeValue, NumberValue};

macro_rules! impl_object_child_leaf {
    ($ty:ident, $kind:expr) => {
        pub struct $ty(pub(crate) NodeCore);
        impl_node_proxy!($ty);

        impl $ty {
            pub fn new(node_key: i64, config: ResourceConfiguration) -> Self {
                Self(NodeCore::new_owned($kind, node_key, config))
            }

            pub fn parent_key(&mut self) -> Result<i64> {
                self.0.get_relation(FieldKind::ParentKey)
            }
            pub fn set_parent_key(&mut self, key: i64) -> Result<()> {
                self.0.set_relation(FieldKind::ParentKey, key)
            }
            pub fn revisions(&mut self) -> Result<(i32, i32)> {
                self.0.revisions()
            }
            pub fn hash(&mut self) -> Result<u64> {
                self.0.get_hash()
            }
            pub fn set_hash(&mut self, value: u64) -> Result<()> {
                self.0.set_hash(value)
            }
        }
    };
}

impl_object_child_leaf!(ObjectBooleanValueNode, NodeKind::ObjectBooleanValue);
impl_object_child_leaf!(ObjectNullValueNode, NodeKind::ObjectNullValue);

impl ObjectBooleanValueNode {
    pub fn value(&mut self) -> Result<bool> {
        match self.0.get_value()? {
            NodeValue::Boolean(b) => Ok(b),
            other => panic!("ObjectBooleanValueNode held a non-boolean payload: {:?}", other),
        }
    }

    pub fn set_value(&mut self, value: bool) -> Result<()> {
        self.0.set_value(NodeValue::Boolean(value))
    }
}

pub struct ObjectStringValueNode(pub(crate) NodeCore);
impl_node_proxy!(ObjectStringValueNode);

impl ObjectStringValueNode {
    pub fn new(node_key: i64, config: ResourceConfiguration) -> Self {
        Self(NodeCore::new_owned(NodeKind::ObjectStringValue, node_key, config))
    }

    pub fn parent_key(&mut self) -> Result<i64> {
        self.0.get_relation(FieldKind::ParentKey)
    }
    pub fn set_parent_key(&mut self, key: i64) -> Result<()> {
        self.0.set_relation(FieldKind::ParentKey, key)
    }
    pub fn revisions(&mut self) -> Result<(i32, i32)> {
        self.0.revisions()
    }
    pub fn hash(&mut self) -> Result<u64> {
        self.0.get_hash()
    }

    pub fn resolved_bytes(&mut self) -> Result<Vec<u8>> {
        self.0.resolve_string()
    }

    pub fn set_plain(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.0
            .set_value(NodeValue::String(crate::value::StringPayload::plain(bytes)))
    }
}

pub struct ObjectNumberValueNode(pub(crate) NodeCore);
impl_node_proxy!(ObjectNumberValueNode);

impl ObjectNumberValueNode {
    pub fn new(node_key: i64, config: ResourceConfiguration) -> Self {
        Self(NodeCore::new_owned(NodeKind::ObjectNumberValue, node_key, config))
    }

    pub fn parent_key(&mut self) -> Result<i64> {
        self.0.get_relation(FieldKind::ParentKey)
    }
    pub fn set_parent_key(&mut self, key: i64) -> Result<()> {
        self.0.set_relation(FieldKind::ParentKey, key)
    }
    pub fn revisions(&mut self) -> Result<(i32, i32)> {
        self.0.revisions()
    }
    pub fn hash(&mut self) -> Result<u64> {
        self.0.get_hash()
    }

    pub fn number(&mut self) -> Result<NumberValue> {
        match self.0.get_value()? {
            NodeValue::Number(n) => Ok(n),
            other => panic!("ObjectNumberValueNode held a non-number payload: {:?}", other),
        }
    }

    pub fn set_number(&mut self, value: NumberValue) -> Result<()> {
        self.0.set_value(NodeValue::Number(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_string_value_round_trip() {
        let mut node = ObjectStringValueNode::new(1, ResourceConfiguration::default());
        node.set_plain(b"v".to_vec()).unwrap();
        assert_eq!(node.resolved_bytes().unwrap(), b"v".to_vec());
    }

    #[test]
    fn object_child_leaves_have_no_sibling_fields() {
        let node = ObjectBooleanValueNode::new(1, ResourceConfiguration::default());
        assert!(node.0.kind.field_index(FieldKind::LeftSibling).is_none());
        assert!(node.0.kind.field_index(FieldKind::RightSibling).is_none());
    }
}
