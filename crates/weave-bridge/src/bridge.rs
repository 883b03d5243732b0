use crate::error::BridgeError;
use crate::event::HostEventHandler;
use crate::value::{ChangedProps, PropMap};
use crate::view_id::ViewId;
use async_trait::async_trait;

/// The sole route to native mutation (spec §6.1).
///
/// Every operation is awaitable and, per the spec, idempotent on failure:
/// a failed `create_view` leaves no partial view behind, a repeated
/// `add_event_listeners` over the same type set is a no-op, and so on. The
/// engine is the only caller; nothing here assumes a particular transport
/// (in-process, IPC, or otherwise).
///
/// `?Send`: the engine is single-threaded and cooperative (spec §5), and
/// props may carry `Rc`-based event handlers, so bridge futures are not
/// required to be `Send`.
#[async_trait(?Send)]
pub trait Bridge {
    /// Idempotent; must succeed before any other call is made.
    async fn initialize(&mut self) -> bool;

    /// Installed once, for the lifetime of the bridge.
    fn set_event_handler(&mut self, handler: HostEventHandler);

    async fn begin_batch(&mut self);

    /// Makes every effect issued since `begin_batch` observable.
    async fn commit_batch(&mut self) -> Result<(), BridgeError>;

    /// Discards every effect issued since `begin_batch`; the native side is
    /// left exactly as it was before the batch opened.
    async fn cancel_batch(&mut self);

    /// Allocates a host view with the given id. Returns `false` on failure
    /// rather than erroring so the caller can apply its own retry policy.
    async fn create_view(&mut self, view_id: ViewId, type_name: &str, props: &PropMap) -> bool;

    /// Applies a partial prop delta; unmentioned keys are left alone. A
    /// `None` value means "remove this prop."
    async fn update_view(&mut self, view_id: ViewId, changed_props: &ChangedProps) -> bool;

    /// Recursive on children; the id is retired and must never be reused.
    async fn delete_view(&mut self, view_id: ViewId);

    /// Attaches `child` to `parent` at position `index` among its current
    /// children.
    async fn attach_view(&mut self, child: ViewId, parent: ViewId, index: usize);

    /// Leaves the view alive, out of the hierarchy.
    async fn detach_view(&mut self, child: ViewId);

    /// Replaces the full child list; any view not present in `children` is
    /// removed from the hierarchy (but not deleted).
    async fn set_children(&mut self, parent: ViewId, children: &[ViewId]);

    /// Idempotent over the same type set.
    async fn add_event_listeners(&mut self, view_id: ViewId, types: &[String]);

    /// Idempotent over the same type set.
    async fn remove_event_listeners(&mut self, view_id: ViewId, types: &[String]);
}
