use crate::node::{Node, NodeKey};
use crate::registry::NodeRegistry;
use slotmap::SlotMap;
use weave_bridge::{RawEvent, Value};

/// `view_id → handler` lookup and invocation (spec §2, §6.2 `dispatch_event`).
///
/// Stateless by design: every call re-resolves through the registry and
/// arena it's handed, since the live binding can change between any two
/// dispatches (I1, I5 — no stale references).
pub struct EventRouter;

impl EventRouter {
    /// Looks up the Element currently bound to `event.view_id` and, if it
    /// carries a handler for `event.event_type`, invokes it. Returns `false`
    /// if the view is gone or has no matching handler — dispatching to a
    /// view deleted between the host raising the event and the engine
    /// processing it is a no-op, not an error.
    pub fn dispatch(arena: &SlotMap<NodeKey, Node>, registry: &NodeRegistry, event: &RawEvent) -> bool {
        let Some(node_key) = registry.lookup(event.view_id) else {
            return false;
        };
        let Node::Element(element) = &arena[node_key] else {
            return false;
        };
        match element.props.get(&event.event_type) {
            Some(Value::Handler(handler)) => {
                handler.call(event);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Children, ElementNode};
    use rustc_hash::FxHashSet;
    use std::cell::RefCell;
    use std::rc::Rc;
    use weave_bridge::{EventHandler, PropMap, ViewId};

    #[test]
    fn dispatches_to_the_bound_handler() {
        let mut arena: SlotMap<NodeKey, Node> = SlotMap::with_key();
        let mut registry = NodeRegistry::new();
        let calls = Rc::new(RefCell::new(0));
        let calls2 = calls.clone();

        let mut props = PropMap::default();
        props.insert("click".to_string(), Value::Handler(EventHandler::new(move |_| *calls2.borrow_mut() += 1)));

        let view_id = ViewId::new(1);
        let key = arena.insert(Node::Element(ElementNode {
            type_name: "Button".into(),
            key: None,
            props,
            children: Children::new(),
            view_id: Some(view_id),
            parent: None,
            listening: FxHashSet::default(),
        }));
        registry.bind(view_id, key);

        let event = RawEvent {
            view_id,
            event_type: "click".to_string(),
            data: Default::default(),
        };
        assert!(EventRouter::dispatch(&arena, &registry, &event));
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn unbound_view_id_is_a_no_op() {
        let arena: SlotMap<NodeKey, Node> = SlotMap::with_key();
        let registry = NodeRegistry::new();
        let event = RawEvent {
            view_id: ViewId::new(42),
            event_type: "click".to_string(),
            data: Default::default(),
        };
        assert!(!EventRouter::dispatch(&arena, &registry, &event));
    }
}
