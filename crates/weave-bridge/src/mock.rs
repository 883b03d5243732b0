use crate::bridge::Bridge;
use crate::error::BridgeError;
use crate::event::HostEventHandler;
use crate::value::{ChangedProps, PropMap};
use crate::view_id::ViewId;
use async_trait::async_trait;
use rustc_hash::FxHashSet;
use std::cell::RefCell;
use std::rc::Rc;

/// One recorded bridge invocation, in call order.
///
/// `weave-core`'s test suite asserts on `Vec<BridgeCall>` slices to check
/// properties like P10 ("delete precedes create") and the seed scenarios
/// S1-S6, the same way the teacher's `runtime_test.rs` asserts on
/// `Vec<Mutation>`.
#[derive(Clone, Debug, PartialEq)]
pub enum BridgeCall {
    Initialize,
    BeginBatch,
    CommitBatch,
    CancelBatch,
    CreateView {
        view_id: ViewId,
        type_name: String,
        props: PropMap,
    },
    UpdateView {
        view_id: ViewId,
        changed_props: ChangedProps,
    },
    DeleteView {
        view_id: ViewId,
    },
    AttachView {
        child: ViewId,
        parent: ViewId,
        index: usize,
    },
    DetachView {
        child: ViewId,
    },
    SetChildren {
        parent: ViewId,
        children: Vec<ViewId>,
    },
    AddEventListeners {
        view_id: ViewId,
        types: Vec<String>,
    },
    RemoveEventListeners {
        view_id: ViewId,
        types: Vec<String>,
    },
}

/// An in-memory, recording [`Bridge`] used by tests. Never shipped as a
/// platform target — per spec §1 the real bridge is an external
/// collaborator whose contract only is specified here.
#[derive(Default)]
pub struct MockBridge {
    log: Rc<RefCell<Vec<BridgeCall>>>,
    fail_create: RefCell<FxHashSet<ViewId>>,
    handler: Option<HostEventHandler>,
}

impl MockBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<BridgeCall> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    /// Makes the next `create_view` for this id report failure, simulating
    /// an E1 `BridgeFailure`.
    pub fn fail_next_create(&self, view_id: ViewId) {
        self.fail_create.borrow_mut().insert(view_id);
    }

    pub fn dispatch(&mut self, view_id: ViewId, event_type: String, data: rustc_hash::FxHashMap<String, crate::value::Value>) {
        if let Some(handler) = self.handler.as_mut() {
            handler(view_id, event_type, data);
        }
    }
}

#[async_trait(?Send)]
impl Bridge for MockBridge {
    async fn initialize(&mut self) -> bool {
        self.log.borrow_mut().push(BridgeCall::Initialize);
        true
    }

    fn set_event_handler(&mut self, handler: HostEventHandler) {
        self.handler = Some(handler);
    }

    async fn begin_batch(&mut self) {
        self.log.borrow_mut().push(BridgeCall::BeginBatch);
    }

    async fn commit_batch(&mut self) -> Result<(), BridgeError> {
        self.log.borrow_mut().push(BridgeCall::CommitBatch);
        Ok(())
    }

    async fn cancel_batch(&mut self) {
        self.log.borrow_mut().push(BridgeCall::CancelBatch);
    }

    async fn create_view(&mut self, view_id: ViewId, type_name: &str, props: &PropMap) -> bool {
        if self.fail_create.borrow_mut().remove(&view_id) {
            return false;
        }
        self.log.borrow_mut().push(BridgeCall::CreateView {
            view_id,
            type_name: type_name.to_string(),
            props: props.clone(),
        });
        true
    }

    async fn update_view(&mut self, view_id: ViewId, changed_props: &ChangedProps) -> bool {
        self.log.borrow_mut().push(BridgeCall::UpdateView {
            view_id,
            changed_props: changed_props.clone(),
        });
        true
    }

    async fn delete_view(&mut self, view_id: ViewId) {
        self.log.borrow_mut().push(BridgeCall::DeleteView { view_id });
    }

    async fn attach_view(&mut self, child: ViewId, parent: ViewId, index: usize) {
        self.log.borrow_mut().push(BridgeCall::AttachView {
            child,
            parent,
            index,
        });
    }

    async fn detach_view(&mut self, child: ViewId) {
        self.log.borrow_mut().push(BridgeCall::DetachView { child });
    }

    async fn set_children(&mut self, parent: ViewId, children: &[ViewId]) {
        self.log.borrow_mut().push(BridgeCall::SetChildren {
            parent,
            children: children.to_vec(),
        });
    }

    async fn add_event_listeners(&mut self, view_id: ViewId, types: &[String]) {
        self.log.borrow_mut().push(BridgeCall::AddEventListeners {
            view_id,
            types: types.to_vec(),
        });
    }

    async fn remove_event_listeners(&mut self, view_id: ViewId, types: &[String]) {
        self.log.borrow_mut().push(BridgeCall::RemoveEventListeners {
            view_id,
            types: types.to_vec(),
        });
    }
}
