use async_trait::async_trait;
use weave_bridge::{Bridge, BridgeError, ChangedProps, HostEventHandler, PropMap, ViewId};

/// A trivial [`Bridge`] that prints every call instead of touching a real
/// platform. Stands in for the native renderer a real host (desktop, web,
/// mobile) would provide; see spec §6.1 — the bridge is always an external
/// collaborator, never part of the engine itself.
#[derive(Default)]
pub struct ConsoleBridge {
    _handler: Option<HostEventHandler>,
}

#[async_trait(?Send)]
impl Bridge for ConsoleBridge {
    async fn initialize(&mut self) -> bool {
        println!("bridge: initialize");
        true
    }

    fn set_event_handler(&mut self, handler: HostEventHandler) {
        self._handler = Some(handler);
    }

    async fn begin_batch(&mut self) {
        println!("bridge: begin_batch");
    }

    async fn commit_batch(&mut self) -> Result<(), BridgeError> {
        println!("bridge: commit_batch");
        Ok(())
    }

    async fn cancel_batch(&mut self) {
        println!("bridge: cancel_batch");
    }

    async fn create_view(&mut self, view_id: ViewId, type_name: &str, props: &PropMap) -> bool {
        println!("bridge: create_view({view_id:?}, {type_name:?}, {props:?})");
        true
    }

    async fn update_view(&mut self, view_id: ViewId, changed_props: &ChangedProps) -> bool {
        println!("bridge: update_view({view_id:?}, {changed_props:?})");
        true
    }

    async fn delete_view(&mut self, view_id: ViewId) {
        println!("bridge: delete_view({view_id:?})");
    }

    async fn attach_view(&mut self, child: ViewId, parent: ViewId, index: usize) {
        println!("bridge: attach_view({child:?}, {parent:?}, {index})");
    }

    async fn detach_view(&mut self, child: ViewId) {
        println!("bridge: detach_view({child:?})");
    }

    async fn set_children(&mut self, parent: ViewId, children: &[ViewId]) {
        println!("bridge: set_children({parent:?}, {children:?})");
    }

    async fn add_event_listeners(&mut self, view_id: ViewId, types: &[String]) {
        println!("bridge: add_event_listeners({view_id:?}, {types:?})");
    }

    async fn remove_event_listeners(&mut self, view_id: ViewId, types: &[String]) {
        println!("bridge: remove_event_listeners({view_id:?}, {types:?})");
    }
}
