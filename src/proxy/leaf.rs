//! Top-level value leaf wrappers: `STRING_VALUE`, `NUMBER_VALUE`,
//! `BOOLEAN_VALUE`, `NULL_VALUE`. Unlike their `OBJECT_*` counterparts,
//! these can have siblings (they sit directly under `ARRAY` or the
//! document root) but, like every leaf, never children (invariant 3).

use crate::config::ResourceConfiguration;
use crate::error::Result;
use crate::kind::{FieldKind, NodeKind};
use crate::proxy::{impl_node_proxy, NodeCore};
use crate::value::{NodeValue, NumberValue};

macro_rules! impl_top_level_leaf {
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
            pub fn left_sibling(&mut self) -> Result<i64> {
                self.0.get_relation(FieldKind::LeftSibling)
            }
            pub fn set_left_sibling(&mut self, key: i64) -> Result<()> {
                self.0.set_relation(FieldKind::LeftSibling, key)
            }
            pub fn right_sibling(&mut self) -> Result<i64> {
                self.0.get_relation(FieldKind::RightSibling)
            }
            pub fn set_right_sibling(&mut self, key: i64) -> Result<()> {
                self.0.set_relation(FieldKind::RightSibling, key)
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

impl_top_level_leaf!(BooleanValueNode, NodeKind::BooleanValue);
impl_top_level_leaf!(NullValueNode, NodeKind::NullValue);

pub struct StringValueNode(pub(crate) NodeCore);
impl_node_proxy!(StringValueNode);

impl StringValueNode {
    pub fn new(node_key: i64, config: ResourceConfiguration) -> Self {
        Self(NodeCore::new_owned(NodeKind::StringValue, node_key, config))
    }

    pub fn parent_key(&mut self) -> Result<i64> {
        self.0.get_relation(FieldKind::ParentKey)
    }
    pub fn set_parent_key(&mut self, key: i64) -> Result<()> {
        self.0.set_relation(FieldKind::ParentKey, key)
    }
    pub fn left_sibling(&mut self) -> Result<i64> {
        self.0.get_relation(FieldKind::LeftSibling)
    }
    pub fn right_sibling(&mut self) -> Result<i64> {
        self.0.get_relation(FieldKind::RightSibling)
    }
    pub fn revisions(&mut self) -> Result<(i32, i32)> {
        self.0.revisions()
    }
    pub fn hash(&mut self) -> Result<u64> {
        self.0.get_hash()
    }

    /// Raw stored bytes (still FSST-compressed if `compressed` is set).
    pub fn raw_bytes(&mut self) -> Result<Vec<u8>> {
        match self.0.get_value()? {
            NodeValue::String(s) => Ok(s.bytes),
            other => panic!("StringValueNode held a non-string payload: {:?}", other),
        }
    }

    /// Logical string content, decompressed through the bound FSST table
    /// when present.
    pub fn resolved_bytes(&mut self) -> Result<Vec<u8>> {
        self.0.resolve_string()
    }

    pub fn set_plain(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.0
            .set_value(NodeValue::String(crate::value::StringPayload::plain(bytes)))
    }
}

pub struct NumberValueNode(pub(crate) NodeCore);
impl_node_proxy!(NumberValueNode);

impl NumberValueNode {
    pub fn new(node_key: i64, config: ResourceConfiguration) -> Self {
        Self(NodeCore::new_owned(NodeKind::NumberValue, node_key, config))
    }

    pub fn parent_key(&mut self) -> Result<i64> {
        self.0.get_relation(FieldKind::ParentKey)
    }
    pub fn set_parent_key(&mut self, key: i64) -> Result<()> {
        self.0.set_relation(FieldKind::ParentKey, key)
    }
    pub fn left_sibling(&mut self) -> Result<i64> {
        self.0.get_relation(FieldKind::LeftSibling)
    }
    pub fn right_sibling(&mut self) -> Result<i64> {
        self.0.get_relation(FieldKind::RightSibling)
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
            other => panic!("NumberValueNode held a non-number payload: {:?}", other),
        }
    }

    pub fn set_number(&mut self, value: NumberValue) -> Result<()> {
        self.0.set_value(NodeValue::Number(value))
    }
}

impl BooleanValueNode {
    pub fn value(&mut self) -> Result<bool> {
        match self.0.get_value()? {
            NodeValue::Boolean(b) => Ok(b),
            other => panic!("BooleanValueNode held a non-boolean payload: {:?}", other),
        }
    }

    pub fn set_value(&mut self, value: bool) -> Result<()> {
        self.0.set_value(NodeValue::Boolean(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_value_round_trip() {
        let mut node = BooleanValueNode::new(1, ResourceConfiguration::default());
        node.set_value(true).unwrap();
        assert!(node.value().unwrap());
    }

    #[test]
    fn string_value_plain_round_trip() {
        let mut node = StringValueNode::new(1, ResourceConfiguration::default());
        node.set_plain(b"hi".to_vec()).unwrap();
        assert_eq!(node.resolved_bytes().unwrap(), b"hi".to_vec());
    }

    #[test]
    fn number_value_round_trip() {
        let mut node = NumberValueNode::new(1, ResourceConfiguration::default());
        node.set_number(NumberValue::Long(-42)).unwrap();
        assert_eq!(node.number().unwrap(), NumberValue::Long(-42));
    }
}
