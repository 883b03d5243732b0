use crate::view_id::ViewId;
use thiserror::Error;

/// Failures surfaced by a [`crate::Bridge`] implementation.
///
/// These are distinct from `weave-core`'s `ReconcileError`: a `BridgeError`
/// describes *why the bridge call itself failed*; the engine maps it onto
/// the E1 (`BridgeFailure`) taxonomy entry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BridgeError {
    #[error("create_view timed out for view {0:?}")]
    Timeout(ViewId),
    #[error("bridge call failed for view {view:?}: {reason}")]
    CallFailed { view: ViewId, reason: String },
    #[error("batch was cancelled")]
    BatchCancelled,
}
