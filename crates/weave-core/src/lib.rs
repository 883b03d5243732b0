//! Virtual-tree reconciliation engine (spec §1): diffs component-authored
//! [`NodeTemplate`] trees against a previously committed arena of
//! [`Node`]s, producing the minimal [`weave_bridge::Bridge`] effect
//! sequence needed to bring the native side into agreement.
//!
//! `weave-core` owns the algorithm and all engine-side bookkeeping; it
//! never talks to a real platform. `weave-bridge` specifies the contract
//! it drives, and `weave-worker` is the optional background diff-offload
//! collaborator. See `DESIGN.md` at the workspace root for the grounding
//! ledger and Open Question decisions.

mod bridge_client;
mod child_list;
mod clock;
mod config;
mod ctx;
mod effects;
mod engine;
mod error;
mod events;
mod extension;
mod node;
mod props;
mod reconciler;
mod registry;
mod scheduler;
mod similarity;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use effects::BridgeEffect;
pub use engine::Engine;
pub use error::{ReconcileError, RegistryRepair};
pub use extension::ReconcileExtension;
pub use node::{
    ComponentHandle, ComponentId, ErrorBoundary, NodeTemplate, StatefulComponent, StatelessComponent,
};
pub use props::PropsInterceptor;
pub use scheduler::Priority;
