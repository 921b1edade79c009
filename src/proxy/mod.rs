//! Node proxies: per-kind flyweights over [`core::NodeCore`]'s lifecycle
//! state machine (§4.5).

pub mod container;
pub mod core;
pub mod leaf;
pub mod object_child;

pub use core::{BindState, NodeCore, SharedPage};

use std::any::Any;

use crate::error::Result;
use crate::kind::NodeKind;

/// Identity and lifecycle operations common to every per-kind proxy type.
/// Object-safe so a [`crate::pool::NodePool`] and a dispatching cursor can
/// hold `Box<dyn NodeProxy>` without knowing the concrete kind.
pub trait NodeProxy: Any {
    fn kind(&self) -> NodeKind;
    fn node_key(&self) -> i64;
    fn core(&self) -> &NodeCore;
    fn core_mut(&mut self) -> &mut NodeCore;

    fn unbind(&mut self) -> Result<()> {
        self.core_mut().unbind()
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Double-dispatch visitor over the closed kind enumeration.
/// Object-safe: a caller holding `&mut dyn NodeProxy` can `downcast` through
/// `as_any_mut` inside each `visit_*` without the visitor itself being
/// generic over the concrete proxy type.
pub trait NodeVisitor {
    fn visit_document(&mut self, node: &mut container::DocumentNode) -> Result<()>;
    fn visit_object(&mut self, node: &mut container::ObjectNode) -> Result<()>;
    fn visit_array(&mut self, node: &mut container::ArrayNode) -> Result<()>;
    fn visit_object_key(&mut self, node: &mut container::ObjectKeyNode) -> Result<()>;

    fn visit_string_value(&mut self, node: &mut leaf::StringValueNode) -> Result<()>;
    fn visit_number_value(&mut self, node: &mut leaf::NumberValueNode) -> Result<()>;
    fn visit_boolean_value(&mut self, node: &mut leaf::BooleanValueNode) -> Result<()>;
    fn visit_null_value(&mut self, node: &mut leaf::NullValueNode) -> Result<()>;

    fn visit_object_string_value(&mut self, node: &mut object_child::ObjectStringValueNode) -> Result<()>;
    fn visit_object_number_value(&mut self, node: &mut object_child::ObjectNumberValueNode) -> Result<()>;
    fn visit_object_boolean_value(&mut self, node: &mut object_child::ObjectBooleanValueNode) -> Result<()>;
    fn visit_object_null_value(&mut self, node: &mut object_child::ObjectNullValueNode) -> Result<()>;
}

/// Dispatch a boxed proxy to the matching `visit_*` method by downcasting
/// on its runtime [`NodeKind`] (§4.5.1 "Visitor dispatch").
pub fn accept(proxy: &mut dyn NodeProxy, visitor: &mut dyn NodeVisitor) -> Result<()> {
    macro_rules! dispatch {
        ($ty:ty, $method:ident) => {
            if let Some(node) = proxy.as_any_mut().downcast_mut::<$ty>() {
                return visitor.$method(node);
            }
        };
    }
    dispatch!(container::DocumentNode, visit_document);
    dispatch!(container::ObjectNode, visit_object);
    dispatch!(container::ArrayNode, visit_array);
    dispatch!(container::ObjectKeyNode, visit_object_key);
    dispatch!(leaf::StringValueNode, visit_string_value);
    dispatch!(leaf::NumberValueNode, visit_number_value);
    dispatch!(leaf::BooleanValueNode, visit_boolean_value);
    dispatch!(leaf::NullValueNode, visit_null_value);
    dispatch!(object_child::ObjectStringValueNode, visit_object_string_value);
    dispatch!(object_child::ObjectNumberValueNode, visit_object_number_value);
    dispatch!(object_child::ObjectBooleanValueNode, visit_object_boolean_value);
    dispatch!(object_child::ObjectNullValueNode, visit_object_null_value);
    unreachable!("NodeKind::ALL is exhaustive and every variant has a wrapper type")
}

/// Implements [`NodeProxy`] for a tuple-struct wrapper around [`NodeCore`].
macro_rules! impl_node_proxy {
    ($ty:ident) => {
        impl crate::proxy::NodeProxy for $ty {
            fn kind(&self) -> crate::kind::NodeKind {
                self.0.kind
            }
            fn node_key(&self) -> i64 {
                self.0.node_key
            }
            fn core(&self) -> &crate::proxy::NodeCore {
                &self.0
            }
            fn core_mut(&mut self) -> &mut crate::proxy::NodeCore {
                &mut self.0
            }
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
                self
            }
        }
    };
}
pub(crate) use impl_node_proxy;
