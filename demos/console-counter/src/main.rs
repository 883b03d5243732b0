//! Smoke test of the public `weave-core` API: a single stateful `Counter`
//! mounted onto a [`ConsoleBridge`] that prints every bridge effect as it
//! is issued. Not a product surface — there is no real platform target in
//! this workspace (spec §1) — just a tiny demonstration that mirrors the
//! teacher's `examples/*-counter` binaries.

mod bridge;

use bridge::ConsoleBridge;
use std::cell::Cell;
use std::rc::Rc;
use weave_core::{ComponentHandle, Engine, EngineConfig, NodeTemplate, StatefulComponent};

struct Counter {
    value: Rc<Cell<i64>>,
}

impl StatefulComponent for Counter {
    fn instance_id(&self) -> &str {
        "counter"
    }

    fn runtime_type(&self) -> &'static str {
        "Counter"
    }

    fn render(&self) -> NodeTemplate {
        let mut props = weave_bridge::PropMap::default();
        props.insert("text".to_string(), weave_bridge::Value::Text(self.value.get().to_string()));
        NodeTemplate::Element {
            type_name: "Text".to_string(),
            key: None,
            props,
            children: vec![],
        }
    }

    fn component_did_mount(&mut self) {
        println!("Counter mounted at {}", self.value.get());
    }

    fn component_did_update(&mut self) {
        println!("Counter updated to {}", self.value.get());
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut engine = Engine::new(ConsoleBridge::default(), EngineConfig::default());
    engine.initialize_bridge().await;

    let value = Rc::new(Cell::new(0));
    let counter: ComponentHandle = Rc::new(std::cell::RefCell::new(Counter { value: value.clone() }));

    engine
        .mount(NodeTemplate::Stateful { key: None, instance: counter.clone() })
        .await
        .expect("initial mount should not fail");

    for n in 1..=3 {
        value.set(n);
        engine.schedule_update(&counter);
        // Drain the debounce window deterministically; a real host would
        // instead call `poll` from its own frame/tick loop.
        loop {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            if engine.poll().await.expect("batch should not fail") {
                break;
            }
        }
    }

    engine.shutdown().await;
}
