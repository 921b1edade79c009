//! Container node wrappers: the document root, `OBJECT`, `ARRAY`, and
//! `OBJECT_KEY` (§3 node kind enumeration, §4.3 field tables).

use crate::config::ResourceConfiguration;
use crate::error::Result;
use crate::kind::{FieldKind, NodeKind};
use crate::proxy::{impl_node_proxy, NodeCore};

/// The JSON document root. No parent, no siblings — it is the tree.
pub struct DocumentNode(pub(crate) NodeCore);
impl_node_proxy!(DocumentNode);

impl DocumentNode {
    pub fn new(node_key: i64, config: ResourceConfiguration) -> Self {
        Self(NodeCore::new_owned(NodeKind::JsonDocument, node_key, config))
    }

    pub fn first_child(&mut self) -> Result<i64> {
        self.0.get_relation(FieldKind::FirstChild)
    }
    pub fn set_first_child(&mut self, key: i64) -> Result<()> {
        self.0.set_relation(FieldKind::FirstChild, key)
    }
    pub fn last_child(&mut self) -> Result<i64> {
        self.0.get_relation(FieldKind::LastChild)
    }
    pub fn set_last_child(&mut self, key: i64) -> Result<()> {
        self.0.set_relation(FieldKind::LastChild, key)
    }
    pub fn child_count(&mut self) -> Result<i64> {
        self.0.get_scalar64(FieldKind::ChildCount)
    }
    pub fn set_child_count(&mut self, count: i64) -> Result<()> {
        self.0.set_scalar64(FieldKind::ChildCount, count)
    }
    pub fn descendant_count(&mut self) -> Result<i64> {
        self.0.get_scalar64(FieldKind::DescendantCount)
    }
    pub fn set_descendant_count(&mut self, count: i64) -> Result<()> {
        self.0.set_scalar64(FieldKind::DescendantCount, count)
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

/// Shared accessor set for `OBJECT` and `ARRAY`: both carry the full
/// container field table (parent, siblings, first/last child, counts).
macro_rules! impl_full_container {
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
            pub fn first_child(&mut self) -> Result<i64> {
                self.0.get_relation(FieldKind::FirstChild)
            }
            pub fn set_first_child(&mut self, key: i64) -> Result<()> {
                self.0.set_relation(FieldKind::FirstChild, key)
            }
            pub fn last_child(&mut self) -> Result<i64> {
                self.0.get_relation(FieldKind::LastChild)
            }
            pub fn set_last_child(&mut self, key: i64) -> Result<()> {
                self.0.set_relation(FieldKind::LastChild, key)
            }
            pub fn child_count(&mut self) -> Result<i64> {
                self.0.get_scalar64(FieldKind::ChildCount)
            }
            pub fn set_child_count(&mut self, count: i64) -> Result<()> {
                self.0.set_scalar64(FieldKind::ChildCount, count)
            }
            pub fn descendant_count(&mut self) -> Result<i64> {
                self.0.get_scalar64(FieldKind::DescendantCount)
            }
            pub fn set_descendant_count(&mut self, count: i64) -> Result<()> {
                self.0.set_scalar64(FieldKind::DescendantCount, count)
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

impl_full_container!(ObjectNode, NodeKind::Object);
impl_full_container!(ArrayNode, NodeKind::Array);

/// `OBJECT_KEY`: a named slot holding exactly zero or one child, never
/// siblings of its own child and never a `childCount` (at most one).
pub struct ObjectKeyNode(pub(crate) NodeCore);
impl_node_proxy!(ObjectKeyNode);

impl ObjectKeyNode {
    pub fn new(node_key: i64, config: ResourceConfiguration) -> Self {
        Self(NodeCore::new_owned(NodeKind::ObjectKey, node_key, config))
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
    pub fn first_child(&mut self) -> Result<i64> {
        self.0.get_relation(FieldKind::FirstChild)
    }
    pub fn set_first_child(&mut self, key: i64) -> Result<()> {
        self.0.set_relation(FieldKind::FirstChild, key)
    }
    pub fn name_key(&mut self) -> Result<i32> {
        self.0.name_key()
    }
    pub fn set_name_key(&mut self, value: i32) -> Result<()> {
        self.0.set_name_key(value)
    }
    pub fn path_node_key(&mut self) -> Result<i64> {
        self.0.get_relation(FieldKind::PathNodeKey)
    }
    pub fn set_path_node_key(&mut self, key: i64) -> Result<()> {
        self.0.set_relation(FieldKind::PathNodeKey, key)
    }
    pub fn descendant_count(&mut self) -> Result<i64> {
        self.0.get_scalar64(FieldKind::DescendantCount)
    }
    pub fn set_descendant_count(&mut self, count: i64) -> Result<()> {
        self.0.set_scalar64(FieldKind::DescendantCount, count)
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
