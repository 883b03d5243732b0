use crate::node::ComponentId;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// The five priority levels (spec §4.6), ordered low to high so `Ord`
/// derives the comparisons the interrupt rule needs directly.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Priority {
    Idle,
    Low,
    Normal,
    High,
    Immediate,
}

impl Priority {
    /// Per-priority debounce window in milliseconds.
    pub fn debounce_ms(self) -> u64 {
        match self {
            Priority::Immediate => 0,
            Priority::High => 4,
            Priority::Normal => 16,
            Priority::Low => 48,
            Priority::Idle => 120,
        }
    }

    /// Tie-break weight (spec §4.6: "each carrying... a `weight` used for
    /// tie-break"); equal to the priority's ordinal since the levels are
    /// already a total order and stable sorting on it preserves arrival
    /// order within a level.
    pub fn weight(self) -> u8 {
        self as u8
    }
}

/// Priority-queue + debounce + batch driver (spec §4.6). Deliberately
/// synchronous and pull-based: instead of arming an OS timer, the engine's
/// own task calls [`UpdateScheduler::poll`] each tick and is told whether a
/// batch is due, the way the teacher's `LocalScheduler::tick()` drains
/// whatever's ready rather than owning a callback timer. This keeps
/// debounce/cooldown fully deterministic under a [`crate::clock::Clock`]
/// test double.
#[derive(Default)]
pub struct UpdateScheduler {
    pending: FxHashMap<ComponentId, Priority>,
    arrival_order: VecDeque<ComponentId>,
    deadline_ms: Option<u64>,
    armed_priority: Option<Priority>,
    last_batch_at_ms: Option<u64>,
    queue_ceiling: usize,
    cooldown_ms: u64,
}

impl UpdateScheduler {
    pub fn new(queue_ceiling: usize, cooldown_ms: u64) -> Self {
        Self {
            queue_ceiling,
            cooldown_ms,
            ..Self::default()
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: ComponentId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Spec §4.6 `schedule(component)`.
    pub fn schedule(&mut self, id: ComponentId, priority: Priority, now_ms: u64) {
        if self.pending.contains_key(&id) {
            // "if already queued, deduplicate and return."
            return;
        }

        if self.arrival_order.len() >= self.queue_ceiling {
            // Runaway safety: drop every previously queued id except the
            // newest one about to be inserted below.
            self.pending.clear();
            self.arrival_order.clear();
            self.deadline_ms = None;
            self.armed_priority = None;
        }

        self.pending.insert(id, priority);
        self.arrival_order.push_back(id);

        match self.armed_priority {
            None => {
                self.armed_priority = Some(priority);
                self.deadline_ms = Some(now_ms + priority.debounce_ms());
            }
            Some(current_max) if priority > current_max => {
                // Interrupt rule: cancel the timer and re-arm shorter.
                self.armed_priority = Some(priority);
                self.deadline_ms = Some(now_ms + priority.debounce_ms());
            }
            _ => {}
        }
    }

    /// Returns the component-ids to drain, priority-descending with
    /// arrival order preserved for ties, if the debounce window has
    /// elapsed and the rate limit allows it; otherwise `None` and the
    /// caller should poll again later.
    pub fn poll(&mut self, now_ms: u64) -> Option<Vec<ComponentId>> {
        if self.pending.is_empty() {
            return None;
        }
        let deadline = self.deadline_ms?;
        if now_ms < deadline {
            return None;
        }
        if let Some(last) = self.last_batch_at_ms {
            if now_ms.saturating_sub(last) < self.cooldown_ms {
                return None;
            }
        }

        let mut ordered: Vec<ComponentId> = self.arrival_order.drain(..).collect();
        let priorities = std::mem::take(&mut self.pending);
        ordered.sort_by(|a, b| priorities[b].cmp(&priorities[a]));

        self.deadline_ms = None;
        self.armed_priority = None;
        self.last_batch_at_ms = Some(now_ms);

        Some(ordered)
    }

    /// Cancels the debounce timer and clears all queues (spec §5:
    /// `cancel_all_pending_work`).
    pub fn cancel_all(&mut self) {
        self.pending.clear();
        self.arrival_order.clear();
        self.deadline_ms = None;
        self.armed_priority = None;
    }
}
