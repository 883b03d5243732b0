use crate::error::ReconcileError;
use slotmap::new_key_type;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;
use weave_bridge::{PropMap, ViewId};

new_key_type! {
    /// The arena identity of a [`Node`] (spec §9: "represent nodes in an
    /// arena; each node holds its parent as an arena index"). Distinct from
    /// [`weave_bridge::ViewId`]: only `Element`s ever carry the latter.
    pub struct NodeKey;
}

/// Small, inline-friendly child list (teacher: `SmallVec` throughout
/// `vdom.rs` for element children).
pub type Children = SmallVec<[NodeKey; 4]>;

/// The capability an `ErrorBoundary`-capable stateful component exposes
/// (spec §7 E2).
pub trait ErrorBoundary {
    fn on_error(&mut self, error: &ReconcileError, render_stack: &[String]);
}

/// User-authored stateful component logic (spec §3.1).
///
/// An instance is held behind `ComponentHandle` (`Rc<RefCell<dyn
/// StatefulComponent>>`); the same `Rc` passed twice into successive
/// `render()` calls is what the engine treats as "the same Component
/// instance" for R1's fast path (identity compared via `Rc::ptr_eq`). A
/// parent that constructs a *new* `Rc` of the same `runtime_type` for the
/// same tree position exercises R7 instead: the engine carries over
/// bookkeeping (view-id, scheduleUpdate wiring) but not in-object state,
/// since transplanting arbitrary user state across distinct instances is
/// explicitly out of the component programming model's minimal contract
/// (spec §1).
pub trait StatefulComponent {
    /// Stable across the component's lifetime; used for diagnostics and as
    /// a fallback key component (spec §3.1: "instance_id: stable string").
    fn instance_id(&self) -> &str;

    /// Distinguishes component *types* the way an Element's `type_name`
    /// distinguishes view types (spec §4.4 R4: "same runtime type").
    fn runtime_type(&self) -> &'static str;

    /// Invoked immediately before `render()` on an update cycle (spec §4.8
    /// step 3). Default no-op; components that stage derived state override it.
    fn prepare_for_render(&mut self) {}

    fn render(&self) -> NodeTemplate;

    fn component_did_mount(&mut self) {}
    fn component_did_update(&mut self) {}
    fn component_will_unmount(&mut self) {}

    /// Opt-in error boundary capability (spec §7 E2). Most components leave
    /// this `None`.
    fn as_error_boundary(&mut self) -> Option<&mut dyn ErrorBoundary> {
        None
    }
}

/// User-authored stateless component logic: "same shape as StatefulComponent
/// minus instance state and scheduleUpdate" (spec §3.1).
pub trait StatelessComponent {
    fn runtime_type(&self) -> &'static str;
    fn render(&self) -> NodeTemplate;
}

/// Shared handle to a persistent stateful-component instance.
pub type ComponentHandle = Rc<RefCell<dyn StatefulComponent>>;

/// `Rc::as_ptr`-derived identity for a [`ComponentHandle`], used as the key
/// into the scheduler's and engine's per-component tracking maps (spec
/// §5: "instance-by-position, instance-by-props").
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ComponentId(usize);

impl ComponentId {
    pub fn of(handle: &ComponentHandle) -> Self {
        ComponentId(Rc::as_ptr(handle) as *const () as usize)
    }
}

/// The description a `render()` call hands back, before the engine has
/// assigned it a `NodeKey`/`view_id`. Mounting a template materializes it,
/// recursively, into fresh [`Node`] arena entries (calling `render()` on any
/// component templates it contains), matching the teacher's `create_tree`
/// eagerly materializing a freshly-rendered subtree before diffing it
/// against the previous one.
pub enum NodeTemplate {
    Element {
        type_name: String,
        key: Option<String>,
        props: PropMap,
        children: Vec<NodeTemplate>,
    },
    Stateful {
        key: Option<String>,
        instance: ComponentHandle,
    },
    Stateless {
        key: Option<String>,
        component: Rc<dyn StatelessComponent>,
    },
    Fragment {
        key: Option<String>,
        children: Vec<NodeTemplate>,
    },
    Empty,
}

impl NodeTemplate {
    pub fn key(&self) -> Option<&str> {
        match self {
            NodeTemplate::Element { key, .. }
            | NodeTemplate::Stateful { key, .. }
            | NodeTemplate::Stateless { key, .. }
            | NodeTemplate::Fragment { key, .. } => key.as_deref(),
            NodeTemplate::Empty => None,
        }
    }

    pub fn runtime_type(&self) -> &str {
        match self {
            NodeTemplate::Element { type_name, .. } => type_name.as_str(),
            NodeTemplate::Stateful { instance, .. } => instance.borrow().runtime_type(),
            NodeTemplate::Stateless { component, .. } => component.runtime_type(),
            NodeTemplate::Fragment { .. } => "Fragment",
            NodeTemplate::Empty => "Empty",
        }
    }
}

/// A live, arena-resident node (spec §3.1). Every variant carries the
/// mutable bookkeeping the spec attributes to it; `parent` is a "weak"
/// relation only (an arena index, not an owning reference — spec §3.3).
pub enum Node {
    Element(ElementNode),
    Stateful(StatefulNode),
    Stateless(StatelessNode),
    Fragment(FragmentNode),
    Empty(EmptyNode),
}

pub struct ElementNode {
    pub type_name: String,
    pub key: Option<String>,
    pub props: PropMap,
    pub children: Children,
    pub view_id: Option<ViewId>,
    pub parent: Option<NodeKey>,
    /// Event types currently registered on the bridge for this view, so
    /// `add_event_listeners`/`remove_event_listeners` can be diffed as a set
    /// (spec §4.4 R6).
    pub listening: rustc_hash::FxHashSet<String>,
}

pub struct StatefulNode {
    pub key: Option<String>,
    pub instance: ComponentHandle,
    pub runtime_type: &'static str,
    pub rendered: Option<NodeKey>,
    pub content_view_id: Option<ViewId>,
    pub parent: Option<NodeKey>,
    pub mounted: bool,
}

pub struct StatelessNode {
    pub key: Option<String>,
    pub component: Rc<dyn StatelessComponent>,
    pub runtime_type: &'static str,
    pub rendered: Option<NodeKey>,
    pub content_view_id: Option<ViewId>,
    pub parent: Option<NodeKey>,
    pub mounted: bool,
}

pub struct FragmentNode {
    pub key: Option<String>,
    pub children: Children,
    pub child_view_ids: SmallVec<[ViewId; 4]>,
    pub parent: Option<NodeKey>,
    pub mounted: bool,
}

pub struct EmptyNode {
    pub parent: Option<NodeKey>,
}

/// The kind tag the Reconciler dispatches on (spec §4.4 R4).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeKind {
    Element,
    Stateful,
    Stateless,
    Fragment,
    Empty,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Element(_) => NodeKind::Element,
            Node::Stateful(_) => NodeKind::Stateful,
            Node::Stateless(_) => NodeKind::Stateless,
            Node::Fragment(_) => NodeKind::Fragment,
            Node::Empty(_) => NodeKind::Empty,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Node::Element(n) => n.key.as_deref(),
            Node::Stateful(n) => n.key.as_deref(),
            Node::Stateless(n) => n.key.as_deref(),
            Node::Fragment(n) => n.key.as_deref(),
            Node::Empty(_) => None,
        }
    }

    pub fn runtime_type(&self) -> &str {
        match self {
            Node::Element(n) => n.type_name.as_str(),
            Node::Stateful(n) => n.runtime_type,
            Node::Stateless(n) => n.runtime_type,
            Node::Fragment(_) => "Fragment",
            Node::Empty(_) => "Empty",
        }
    }

    pub fn parent(&self) -> Option<NodeKey> {
        match self {
            Node::Element(n) => n.parent,
            Node::Stateful(n) => n.parent,
            Node::Stateless(n) => n.parent,
            Node::Fragment(n) => n.parent,
            Node::Empty(n) => n.parent,
        }
    }

    pub fn set_parent(&mut self, parent: Option<NodeKey>) {
        match self {
            Node::Element(n) => n.parent = parent,
            Node::Stateful(n) => n.parent = parent,
            Node::Stateless(n) => n.parent = parent,
            Node::Fragment(n) => n.parent = parent,
            Node::Empty(n) => n.parent = parent,
        }
    }

    /// "Own view-id if Element; rendered subtree's view-id if Component;
    /// absent for Fragment/Empty" (spec §3.1, I4, GLOSSARY "Effective
    /// view-id"). `content_view_id` is kept in sync by the reconciler and
    /// `render_to_native`, so this is O(1), not a recursive unwrap.
    pub fn effective_view_id(&self) -> Option<ViewId> {
        match self {
            Node::Element(n) => n.view_id,
            Node::Stateful(n) => n.content_view_id,
            Node::Stateless(n) => n.content_view_id,
            Node::Fragment(_) | Node::Empty(_) => None,
        }
    }

    /// `Some(children)` for Element/Fragment, `None` for Component/Empty
    /// (spec §3.1 capability set).
    pub fn children(&self) -> Option<&Children> {
        match self {
            Node::Element(n) => Some(&n.children),
            Node::Fragment(n) => Some(&n.children),
            _ => None,
        }
    }

    pub fn rendered_node(&self) -> Option<NodeKey> {
        match self {
            Node::Stateful(n) => n.rendered,
            Node::Stateless(n) => n.rendered,
            _ => None,
        }
    }

    pub fn component_id(&self) -> Option<ComponentId> {
        match self {
            Node::Stateful(n) => Some(ComponentId::of(&n.instance)),
            _ => None,
        }
    }
}
