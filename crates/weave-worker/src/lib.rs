//! Experimental background diff-offload pool (spec §5, §7 E5).
//!
//! Thin by design: this crate only computes [`WorkerChange`] lists from a
//! serialized, function-free snapshot of two trees. Applying those changes
//! to native views is entirely the caller's (`weave-core::Engine`)
//! responsibility, and always happens back on the engine's own task.

mod pool;
mod tree;

pub use pool::{diff_serialized, WorkerError, WorkerPool};
pub use tree::{structural_fingerprint, SerializedNode, SerializedValue, WorkerChange};
