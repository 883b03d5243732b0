/// Tunables the teacher hardcodes inside `LocalScheduler`/`Runtime::new`;
/// lifted into an explicit, constructible struct per the §9 design note on
/// scoping "global mutable state" to the engine instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Hard ceiling on queued-but-undrained component updates (spec §4.6).
    pub scheduler_queue_ceiling: usize,
    /// Minimum gap between consecutive batch commits (spec §4.6, §5: "≈8 ms").
    pub batch_cooldown_ms: u64,
    /// Number of children reconciled before yielding to the host (spec §5: "k≈3").
    pub yield_every_k_children: usize,
    /// `update_component_by_id` calls for one component within a batch before
    /// E4 `InfiniteRender` fires (spec §4.7: "100").
    pub render_guard_ceiling: u32,
    /// Max entries retained by the `SimilarityCache` LRU (spec §4.3: "1000").
    pub similarity_cache_capacity: usize,
    /// Timeout applied to each `bridge.create_view` (spec §5: "5 s").
    pub create_view_timeout_ms: u64,
    /// Exponential-backoff retry budget for bridge calls (spec §7: "up to 3
    /// attempts, 100 ms base").
    pub bridge_retry_attempts: u32,
    pub bridge_retry_base_ms: u64,
    /// Tree size at/above which diffing may be offloaded to `weave-worker`
    /// (spec §5: "≥20 nodes, non-initial render").
    pub worker_offload_threshold_nodes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scheduler_queue_ceiling: 10,
            batch_cooldown_ms: 8,
            yield_every_k_children: 3,
            render_guard_ceiling: 100,
            similarity_cache_capacity: 1000,
            create_view_timeout_ms: 5_000,
            bridge_retry_attempts: 3,
            bridge_retry_base_ms: 100,
            worker_offload_threshold_nodes: 20,
        }
    }
}
