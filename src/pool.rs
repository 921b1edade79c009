//! Per-kind proxy pool (§4.1.1, derived from §3 Lifecycle "Destruction").
//!
//! A proxy carries no state worth keeping once its cursor is done with it,
//! so rather than allocate and drop one per node visited, a cursor checks
//! one out of the pool, binds or populates it, and releases it back when
//! finished. Pool growth — allocating beyond what was handed out at
//! construction — is the one place this crate logs anything; every other
//! path (getters, setters, the codec, the serializer) never does (§7).

use std::collections::HashMap;

use tracing::trace;

use crate::config::ResourceConfiguration;
use crate::kind::NodeKind;
use crate::proxy::container::{ArrayNode, DocumentNode, ObjectKeyNode, ObjectNode};
use crate::proxy::leaf::{BooleanValueNode, NullValueNode, NumberValueNode, StringValueNode};
use crate::proxy::object_child::{
    ObjectBooleanValueNode, ObjectNullValueNode, ObjectNumberValueNode, ObjectStringValueNode,
};
use crate::proxy::NodeProxy;

fn new_proxy_for(kind: NodeKind, config: ResourceConfiguration) -> Box<dyn NodeProxy> {
    match kind {
        NodeKind::JsonDocument => Box::new(DocumentNode::new(0, config)),
        NodeKind::Object => Box::new(ObjectNode::new(0, config)),
        NodeKind::Array => Box::new(ArrayNode::new(0, config)),
        NodeKind::ObjectKey => Box::new(ObjectKeyNode::new(0, config)),
        NodeKind::StringValue => Box::new(StringValueNode::new(0, config)),
        NodeKind::NumberValue => Box::new(NumberValueNode::new(0, config)),
        NodeKind::BooleanValue => Box::new(BooleanValueNode::new(0, config)),
        NodeKind::NullValue => Box::new(NullValueNode::new(0, config)),
        NodeKind::ObjectStringValue => Box::new(ObjectStringValueNode::new(0, config)),
        NodeKind::ObjectNumberValue => Box::new(ObjectNumberValueNode::new(0, config)),
        NodeKind::ObjectBooleanValue => Box::new(ObjectBooleanValueNode::new(0, config)),
        NodeKind::ObjectNullValue => Box::new(ObjectNullValueNode::new(0, config)),
    }
}

/// Free-list pool of per-kind node proxies.
pub struct NodePool {
    config: ResourceConfiguration,
    free: HashMap<NodeKind, Vec<Box<dyn NodeProxy>>>,
    initial_capacity_per_kind: usize,
    allocated: HashMap<NodeKind, usize>,
}

impl NodePool {
    pub fn new(config: ResourceConfiguration, initial_capacity_per_kind: usize) -> Self {
        let mut free = HashMap::new();
        let mut allocated = HashMap::new();
        for kind in NodeKind::ALL {
            let mut bucket = Vec::with_capacity(initial_capacity_per_kind);
            for _ in 0..initial_capacity_per_kind {
                bucket.push(new_proxy_for(kind, config.clone()));
            }
            free.insert(kind, bucket);
            allocated.insert(kind, initial_capacity_per_kind);
        }
        Self {
            config,
            free,
            initial_capacity_per_kind,
            allocated,
        }
    }

    /// Pop a free proxy of `kind`, or allocate a new one if the free-list
    /// is empty.
    pub fn checkout(&mut self, kind: NodeKind) -> Box<dyn NodeProxy> {
        if let Some(proxy) = self.free.get_mut(&kind).and_then(Vec::pop) {
            return proxy;
        }
        let total = self.allocated.entry(kind).or_insert(0);
        *total += 1;
        if *total > self.initial_capacity_per_kind {
            trace!(?kind, total, "node proxy pool grew beyond initial capacity");
        }
        new_proxy_for(kind, self.config.clone())
    }

    /// Reset `proxy` to `Owned` with default field values for its kind and
    /// return it to the free-list. Replacing the core outright (rather than
    /// unbinding/materializing first) is the reset — whatever the proxy was
    /// aliasing or had cached is simply dropped, never decoded.
    pub fn release(&mut self, mut proxy: Box<dyn NodeProxy>) {
        let kind = proxy.kind();
        *proxy.core_mut() = crate::proxy::NodeCore::new_owned(kind, 0, self.config.clone());
        self.free.entry(kind).or_default().push(proxy);
    }

    pub fn free_count(&self, kind: NodeKind) -> usize {
        self.free.get(&kind).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_and_release_reuses_proxy() {
        let mut pool = NodePool::new(ResourceConfiguration::default(), 1);
        assert_eq!(pool.free_count(NodeKind::Object), 1);
        let proxy = pool.checkout(NodeKind::Object);
        assert_eq!(pool.free_count(NodeKind::Object), 0);
        pool.release(proxy);
        assert_eq!(pool.free_count(NodeKind::Object), 1);
    }

    #[test]
    fn release_resets_a_bound_proxy_without_materializing_it() {
        use crate::page::InMemoryPage;
        use crate::record::{write_record, RecordFields};
        use std::cell::RefCell;
        use std::io::Cursor;
        use std::rc::Rc;

        let mut fields = RecordFields::new_defaults(NodeKind::Object);
        fields.child_count = 3;
        let mut sink = Cursor::new(Vec::new());
        write_record(&mut sink, NodeKind::Object, 1, &fields).unwrap();
        let page = Rc::new(RefCell::new(InMemoryPage::new(sink.into_inner())));

        let mut pool = NodePool::new(ResourceConfiguration::default(), 1);
        let mut proxy = pool.checkout(NodeKind::Object);
        proxy.core_mut().bind(page, 0, 1, None).unwrap();
        assert!(proxy.core().is_bound());

        pool.release(proxy);
        let reused = pool.checkout(NodeKind::Object);
        assert!(reused.core().is_owned());
    }

    #[test]
    fn checkout_beyond_capacity_allocates_fresh() {
        // Installs a subscriber so the `trace!` pool-growth log below is
        // actually observed rather than discarded with no subscriber set.
        let _ = tracing_subscriber::fmt::try_init();

        let mut pool = NodePool::new(ResourceConfiguration::default(), 0);
        let a = pool.checkout(NodeKind::Object);
        let b = pool.checkout(NodeKind::Object);
        assert_eq!(a.kind(), NodeKind::Object);
        assert_eq!(b.kind(), NodeKind::Object);
    }
}
