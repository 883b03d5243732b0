//! Shared fixtures for `weave-core`'s integration tests, in the style of
//! the teacher's `tests/` helper modules: a tiny current-thread runtime, a
//! couple of trivial `StatefulComponent`s, and template-building shorthand
//! so each scenario/property file can stay focused on the assertion it
//! names.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use weave_core::{ComponentHandle, Engine, EngineConfig, ManualClock, StatefulComponent};
use weave_bridge::{MockBridge, PropMap, Value};
use weave_core::NodeTemplate;

pub fn rt() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

pub fn new_engine() -> (Engine<MockBridge, ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let engine = Engine::with_clock(MockBridge::new(), clock.clone(), EngineConfig::default());
    (engine, clock)
}

pub fn props(pairs: &[(&str, Value)]) -> PropMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

pub fn text_props(s: impl Into<String>) -> PropMap {
    props(&[("text", Value::Text(s.into()))])
}

/// A leaf `Text` element, analogous to the teacher demos' `Text`/`span`
/// leaves.
pub fn text(s: impl Into<String>) -> NodeTemplate {
    NodeTemplate::Element {
        type_name: "Text".to_string(),
        key: None,
        props: text_props(s),
        children: vec![],
    }
}

/// An unkeyed Element with a caller-chosen `type_name`, for the unkeyed
/// child-list tests where what matters is that each item's runtime type is
/// distinct (spec §4.5.2's matcher keys on runtime type first).
pub fn leaf(type_name: &str) -> NodeTemplate {
    NodeTemplate::Element {
        type_name: type_name.to_string(),
        key: None,
        props: PropMap::default(),
        children: vec![],
    }
}

pub fn keyed_leaf(type_name: &str, key: &str) -> NodeTemplate {
    NodeTemplate::Element {
        type_name: type_name.to_string(),
        key: Some(key.to_string()),
        props: PropMap::default(),
        children: vec![],
    }
}

/// Wraps `children` in a stable-type root container so a test can swap the
/// *children* without ever tripping the root-level structural-shock check
/// (spec §4.7), which only looks at the root's own runtime type and its
/// resolved element's similarity scores.
pub fn root(children: Vec<NodeTemplate>) -> NodeTemplate {
    NodeTemplate::Element {
        type_name: "Root".to_string(),
        key: None,
        props: PropMap::default(),
        children,
    }
}

/// A minimal counter component: `render()` emits a `Text` leaf showing the
/// current value of a shared `Rc<Cell<i64>>`, the way `demos/console-counter`
/// wires a counter through `weave-core` for a smoke test. The test keeps its
/// own clone of the `Rc<Cell<i64>>` to mutate directly before calling
/// `Engine::schedule_update`, standing in for a real signal/setState call.
pub struct Counter {
    pub value: Rc<Cell<i64>>,
    pub render_calls: Rc<Cell<u32>>,
}

impl StatefulComponent for Counter {
    fn instance_id(&self) -> &str {
        "counter"
    }

    fn runtime_type(&self) -> &'static str {
        "Counter"
    }

    fn render(&self) -> NodeTemplate {
        self.render_calls.set(self.render_calls.get() + 1);
        text(self.value.get().to_string())
    }
}

/// Returns the handle plus the shared value cell and a render-call counter,
/// so a test can both drive state changes and assert exactly how many
/// times `render()` actually ran (spec §8 S6).
pub fn counter(initial: i64) -> (ComponentHandle, Rc<Cell<i64>>, Rc<Cell<u32>>) {
    let value = Rc::new(Cell::new(initial));
    let render_calls = Rc::new(Cell::new(0));
    let handle: ComponentHandle = Rc::new(RefCell::new(Counter {
        value: value.clone(),
        render_calls: render_calls.clone(),
    }));
    (handle, value, render_calls)
}

pub fn root_with_props(props: PropMap, children: Vec<NodeTemplate>) -> NodeTemplate {
    NodeTemplate::Element {
        type_name: "Root".to_string(),
        key: None,
        props,
        children,
    }
}

/// A component whose first `render()` succeeds and every subsequent call
/// panics, used to exercise E2/P4 (a fatal mid-batch failure must cancel
/// the whole batch, not just the one component).
pub struct PanicsAfterFirstRender {
    pub calls: Cell<u32>,
}

impl StatefulComponent for PanicsAfterFirstRender {
    fn instance_id(&self) -> &str {
        "panics-after-first-render"
    }

    fn runtime_type(&self) -> &'static str {
        "Flaky"
    }

    fn render(&self) -> NodeTemplate {
        let n = self.calls.get();
        self.calls.set(n + 1);
        if n == 0 {
            text("ok")
        } else {
            panic!("boom: render() invoked a second time");
        }
    }
}

pub fn panics_after_first_render() -> ComponentHandle {
    Rc::new(RefCell::new(PanicsAfterFirstRender { calls: Cell::new(0) }))
}
