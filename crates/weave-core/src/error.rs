use weave_bridge::ViewId;

/// The error taxonomy from spec §7, kinds rather than exhaustive payloads.
///
/// Most of these are *handled* inline by the engine (E1, E3, E5, E6 are
/// logged and recovered from); only E2 and E4 ever reach a caller of
/// [`crate::Engine::schedule_update`] or [`crate::Engine::mount`] as an
/// `Err`, because both are defined as fatal-within-the-batch.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ReconcileError {
    /// E1: `create_view` returned `false` or timed out. Carried as data for
    /// logging; the engine itself does not propagate this as `Err` because
    /// the failing subtree is simply abandoned and ancestors continue.
    #[error("bridge failed to create view for {type_name:?}")]
    BridgeFailure { type_name: String },

    /// E2: a component's `render()` panicked or returned an error, and no
    /// enclosing `ErrorBoundary` claimed it.
    #[error("render() failed with no enclosing error boundary: {message}")]
    RenderThrew { message: String },

    /// E4: `update_component_by_id` re-entered >100 times in one batch, or
    /// `render_to_native` re-entered on a node already in flight.
    #[error("infinite render suspected: {diagnosis}")]
    InfiniteRender { diagnosis: String },

    /// Surfaced from [`crate::BridgeClient`] when `commit_batch` itself
    /// fails after every effect was issued; distinct from E1 (a single
    /// `create_view` failing) because this aborts the whole batch.
    #[error("bridge rejected commit_batch: {0}")]
    CommitFailed(String),
}

/// E6: after a commit, `nodes_by_view_id[v] != expected_element`. This is a
/// safety net finding, not a `Result::Err` — callers observe it through
/// [`crate::Engine::last_registry_repair`] so tests can assert it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryRepair {
    pub view_id: ViewId,
    pub reason: &'static str,
}
