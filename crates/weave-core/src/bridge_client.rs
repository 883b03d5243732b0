use crate::config::EngineConfig;
use crate::effects::BridgeEffect;
use crate::error::ReconcileError;
use weave_bridge::{Bridge, ViewId};

/// Thin client over [`weave_bridge::Bridge`] (spec §4.9's `bridge.*` calls,
/// §7's retry policy). Adds the one behavior the raw trait contract doesn't
/// specify: timeout + exponential-backoff retry around `create_view`, plus
/// structured logging at batch boundaries. Mirrors the teacher's pattern of
/// wrapping `Mutation` application in a thin runtime-owned client rather than
/// letting `diff.rs` talk to the host directly.
pub struct BridgeClient<B: Bridge> {
    bridge: B,
    config: EngineConfig,
}

impl<B: Bridge> BridgeClient<B> {
    pub fn new(bridge: B, config: EngineConfig) -> Self {
        Self { bridge, config }
    }

    pub fn inner(&self) -> &B {
        &self.bridge
    }

    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub async fn initialize(&mut self) -> bool {
        let ok = self.bridge.initialize().await;
        tracing::info!(ok, "bridge initialized");
        ok
    }

    pub async fn begin_batch(&mut self) {
        self.bridge.begin_batch().await;
    }

    pub async fn commit_batch(&mut self) -> Result<(), ReconcileError> {
        match self.bridge.commit_batch().await {
            Ok(()) => {
                tracing::debug!("commit_batch");
                Ok(())
            }
            Err(err) => {
                tracing::error!(%err, "commit_batch failed");
                Err(ReconcileError::CommitFailed(err.to_string()))
            }
        }
    }

    pub async fn cancel_batch(&mut self) {
        tracing::warn!("cancel_batch");
        self.bridge.cancel_batch().await;
    }

    /// Issues one [`BridgeEffect`], retrying `create_view` with exponential
    /// backoff on bridge-reported failure or timeout (spec §7: "up to 3
    /// attempts, 100 ms base"). Every other effect is fire-and-forget per the
    /// bridge contract's own idempotence guarantee. Returns `Some(error)`
    /// only for E1 (`create_view` exhausted its retries) — every other
    /// effect cannot itself fail the reconciliation.
    pub async fn apply(&mut self, effect: BridgeEffect) -> Option<ReconcileError> {
        match effect {
            BridgeEffect::CreateView { view_id, type_name, props } => {
                if !self.create_view_with_retry(view_id, &type_name, &props).await {
                    tracing::error!(?view_id, type_name, "E1 BridgeFailure: create_view exhausted retries");
                    return Some(ReconcileError::BridgeFailure { type_name });
                }
                None
            }
            BridgeEffect::UpdateView { view_id, changed_props } => {
                self.bridge.update_view(view_id, &changed_props).await;
                None
            }
            BridgeEffect::DeleteView { view_id } => {
                self.bridge.delete_view(view_id).await;
                None
            }
            BridgeEffect::AttachView { child, parent, index } => {
                self.bridge.attach_view(child, parent, index).await;
                None
            }
            BridgeEffect::DetachView { child } => {
                self.bridge.detach_view(child).await;
                None
            }
            BridgeEffect::SetChildren { parent, children } => {
                self.bridge.set_children(parent, &children).await;
                None
            }
            BridgeEffect::AddEventListeners { view_id, types } => {
                self.bridge.add_event_listeners(view_id, &types).await;
                None
            }
            BridgeEffect::RemoveEventListeners { view_id, types } => {
                self.bridge.remove_event_listeners(view_id, &types).await;
                None
            }
        }
    }

    async fn create_view_with_retry(&mut self, view_id: ViewId, type_name: &str, props: &weave_bridge::PropMap) -> bool {
        let mut attempt = 0u32;
        loop {
            let outcome = tokio::time::timeout(
                std::time::Duration::from_millis(self.config.create_view_timeout_ms),
                self.bridge.create_view(view_id, type_name, props),
            )
            .await;

            match outcome {
                Ok(true) => return true,
                Ok(false) | Err(_) => {
                    attempt += 1;
                    if attempt >= self.config.bridge_retry_attempts {
                        return false;
                    }
                    let backoff = self.config.bridge_retry_base_ms * 2u64.saturating_pow(attempt - 1);
                    tracing::warn!(?view_id, attempt, backoff, "retrying create_view after failure/timeout");
                    if backoff > 0 {
                        tokio::time::sleep(std::time::Duration::from_millis(backoff)).await;
                    }
                }
            }
        }
    }
}
