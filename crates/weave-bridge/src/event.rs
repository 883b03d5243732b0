use crate::value::Value;
use crate::view_id::ViewId;
use rustc_hash::FxHashMap;

/// A raw event as delivered by the host, before `EventRouter` dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct RawEvent {
    pub view_id: ViewId,
    pub event_type: String,
    pub data: FxHashMap<String, Value>,
}

/// The callback the engine installs once via `Bridge::set_event_handler`
/// (spec §6.1); the host invokes it whenever a native event occurs.
pub type HostEventHandler = Box<dyn FnMut(ViewId, String, FxHashMap<String, Value>)>;
