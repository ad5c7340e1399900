//! Run-scoped shared state
//!
//! The layer-id allocator and the cumulative counters are the only state
//! shared between concurrently running branches. All of it sits behind one
//! mutex so every update is serialized.

use crate::config::BudgetConfig;
use crate::hypothesis::GenerationBudget;
use std::ops::Range;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Debug, Default)]
struct Counters {
    next_layer_id: usize,
    generation_calls: usize,
    generation_failures: usize,
    accepted: usize,
    exhausted: bool,
}

/// Counter values at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub layers_allocated: usize,
    pub generation_calls: usize,
    pub generation_failures: usize,
    pub total_hypotheses: usize,
    pub budget_exhausted: bool,
}

pub struct RunContext {
    counters: Mutex<Counters>,
    max_total_hypotheses: Option<usize>,
    max_generation_calls: Option<usize>,
    time_limit: Option<Duration>,
    started: Instant,
}

impl RunContext {
    /// Fresh context; layer id 0 is reserved for the root
    pub fn new(budget: &BudgetConfig) -> Self {
        Self {
            counters: Mutex::new(Counters {
                next_layer_id: 1,
                ..Default::default()
            }),
            max_total_hypotheses: budget.max_total_hypotheses,
            max_generation_calls: budget.max_generation_calls,
            time_limit: budget.time_limit_secs.map(Duration::from_secs),
            started: Instant::now(),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(&BudgetConfig::default())
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        // Counters stay consistent even if a holder panicked
        self.counters.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Reserve `count` contiguous layer ids
    pub fn allocate_layer_ids(&self, count: usize) -> Range<usize> {
        let mut counters = self.lock();
        let start = counters.next_layer_id;
        counters.next_layer_id += count;
        start..start + count
    }

    /// Whether any limit has been reached; latches once true
    pub fn is_exhausted(&self) -> bool {
        let mut counters = self.lock();
        if counters.exhausted {
            return true;
        }
        let reason = if self
            .max_generation_calls
            .is_some_and(|max| counters.generation_calls >= max)
        {
            Some("generation call limit")
        } else if self
            .max_total_hypotheses
            .is_some_and(|max| counters.accepted >= max)
        {
            Some("hypothesis limit")
        } else if self.time_limit.is_some_and(|limit| self.started.elapsed() >= limit) {
            Some("time limit")
        } else {
            None
        };

        if let Some(reason) = reason {
            warn!("Run budget exhausted: {}", reason);
            counters.exhausted = true;
        }
        counters.exhausted
    }

    pub fn snapshot(&self) -> RunCounters {
        let counters = self.lock();
        RunCounters {
            layers_allocated: counters.next_layer_id,
            generation_calls: counters.generation_calls,
            generation_failures: counters.generation_failures,
            total_hypotheses: counters.accepted,
            budget_exhausted: counters.exhausted,
        }
    }
}

impl GenerationBudget for RunContext {
    fn allows_generation(&self) -> bool {
        !self.is_exhausted()
    }

    fn record_calls(&self, calls: usize) {
        self.lock().generation_calls += calls;
    }

    fn record_failure(&self) {
        self.lock().generation_failures += 1;
    }

    fn record_accepted(&self) -> bool {
        let mut counters = self.lock();
        if self
            .max_total_hypotheses
            .is_some_and(|max| counters.accepted >= max)
        {
            counters.exhausted = true;
            return false;
        }
        counters.accepted += 1;
        true
    }
}
