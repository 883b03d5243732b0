//! Platform bridge contract consumed by the weave reconciliation engine.
//!
//! This crate intentionally contains no platform target (web, desktop,
//! mobile). It specifies the `Bridge` trait the engine drives (spec §6.1)
//! and ships a recording [`MockBridge`] for tests.

mod bridge;
mod error;
mod event;
mod mock;
mod value;
mod view_id;

pub use bridge::Bridge;
pub use error::BridgeError;
pub use event::{HostEventHandler, RawEvent};
pub use mock::{BridgeCall, MockBridge};
pub use value::{ChangedProps, EventHandler, PropMap, Value};
pub use view_id::{ViewId, ViewIdAllocator};
