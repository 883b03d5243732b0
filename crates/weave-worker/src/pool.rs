use crate::tree::{SerializedNode, SerializedValue, WorkerChange};
use futures::channel::oneshot;
use std::collections::BTreeMap;
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use thiserror::Error;

/// Failure modes of the offload path (spec §7 E5). The engine treats any
/// of these as "fall back to in-task reconciliation for the remainder of
/// this reconciliation," never as a reason to trust a worker's own
/// "nothing changed" answer (spec §9).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkerError {
    #[error("worker pool has no live threads")]
    PoolUnavailable,
    #[error("worker thread dropped the reply channel")]
    Disconnected,
}

struct Job {
    old: SerializedNode,
    new: SerializedNode,
    reply: oneshot::Sender<Vec<WorkerChange>>,
}

/// A small fixed-size thread pool that computes [`WorkerChange`] lists for
/// trees the engine judged too large to diff in-task (spec §5: "≥20
/// nodes, non-initial render"). Kept deliberately thin: no retry policy,
/// no work-stealing, no priority — large-tree offload is the only job it
/// does.
pub struct WorkerPool {
    sender: Option<std_mpsc::Sender<Job>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(worker_count: usize) -> Self {
        let (sender, receiver) = std_mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let handles = (0..worker_count.max(1))
            .map(|_| {
                let receiver = Arc::clone(&receiver);
                std::thread::spawn(move || {
                    loop {
                        let job = {
                            let guard = receiver.lock().unwrap_or_else(|e| e.into_inner());
                            guard.recv()
                        };
                        match job {
                            Ok(job) => {
                                let changes = diff_serialized(&job.old, &job.new, &[]);
                                let _ = job.reply.send(changes);
                            }
                            Err(_) => break,
                        }
                    }
                })
            })
            .collect();

        Self {
            sender: Some(sender),
            handles,
        }
    }

    /// Submits a diff job and awaits its result. Returns
    /// [`WorkerError::Disconnected`] if the worker thread panicked or the
    /// pool was shut down mid-flight.
    pub async fn diff(
        &self,
        old: SerializedNode,
        new: SerializedNode,
    ) -> Result<Vec<WorkerChange>, WorkerError> {
        let sender = self.sender.as_ref().ok_or(WorkerError::PoolUnavailable)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        sender
            .send(Job {
                old,
                new,
                reply: reply_tx,
            })
            .map_err(|_| WorkerError::PoolUnavailable)?;
        reply_rx.await.map_err(|_| WorkerError::Disconnected)
    }

    pub fn shutdown(&mut self) {
        self.sender.take();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The in-task equivalent the engine falls back to on [`WorkerError`], and
/// also what each worker thread runs. Kept as a free function so both
/// paths are provably the same algorithm.
pub fn diff_serialized(old: &SerializedNode, new: &SerializedNode, path: &[usize]) -> Vec<WorkerChange> {
    let mut changes = Vec::new();
    diff_rec(old, new, path, &mut changes);
    changes
}

fn diff_rec(old: &SerializedNode, new: &SerializedNode, path: &[usize], out: &mut Vec<WorkerChange>) {
    match (old, new) {
        (
            SerializedNode::Element {
                type_name: old_ty,
                props: old_props,
                children: old_children,
                ..
            },
            SerializedNode::Element {
                type_name: new_ty,
                props: new_props,
                children: new_children,
                ..
            },
        ) if old_ty == new_ty => {
            let changed = diff_props(old_props, new_props);
            if !changed.is_empty() {
                out.push(WorkerChange::PropsChanged {
                    path: path.to_vec(),
                    changed,
                });
            }
            diff_child_slices(old_children, new_children, path, out);
        }
        (SerializedNode::Fragment { children: old_children }, SerializedNode::Fragment { children: new_children }) => {
            diff_child_slices(old_children, new_children, path, out);
        }
        (SerializedNode::Empty, SerializedNode::Empty) => {}
        _ => out.push(WorkerChange::Replaced { path: path.to_vec() }),
    }
}

fn diff_child_slices(
    old_children: &[SerializedNode],
    new_children: &[SerializedNode],
    path: &[usize],
    out: &mut Vec<WorkerChange>,
) {
    let max = old_children.len().max(new_children.len());
    for i in 0..max {
        match (old_children.get(i), new_children.get(i)) {
            (Some(o), Some(n)) => {
                let mut child_path = path.to_vec();
                child_path.push(i);
                diff_rec(o, n, &child_path, out);
            }
            (None, Some(_)) => out.push(WorkerChange::ChildInserted {
                path: path.to_vec(),
                index: i,
            }),
            (Some(_), None) => out.push(WorkerChange::ChildRemoved {
                path: path.to_vec(),
                index: i,
            }),
            (None, None) => unreachable!(),
        }
    }
}

fn diff_props(
    old_props: &BTreeMap<String, SerializedValue>,
    new_props: &BTreeMap<String, SerializedValue>,
) -> BTreeMap<String, Option<SerializedValue>> {
    let mut changed = BTreeMap::new();
    for (key, new_value) in new_props {
        match old_props.get(key) {
            Some(old_value) if old_value == new_value => {}
            _ => {
                changed.insert(key.clone(), Some(new_value.clone()));
            }
        }
    }
    for key in old_props.keys() {
        if !new_props.contains_key(key) {
            changed.insert(key.clone(), None);
        }
    }
    changed
}
