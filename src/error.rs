//! Run-level error taxonomy.
//!
//! Mirrors the recovery semantics in spec §7: each variant carries enough
//! structured payload to populate the matching `RunReport` field without
//! the caller having to re-parse a message string.

use crate::model::ActivityCode;
use crate::model::Slot;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Errors that can terminate a scheduling run before a `RunReport` is
/// produced, or that are wrapped into one. See spec §7 for the taxonomy and
/// recovery policy.
#[derive(Debug, thiserror::Error, Clone)]
pub enum SchedulingError {
    /// Preload conflict, duplicate key, or unknown activity code. Fatal for
    /// the run; no writes occur.
    #[error("data consistency violation: {message}")]
    DataConsistency { message: String },

    /// The solver reported `infeasible`, or hard constraints are
    /// unsatisfiable given the preloads. Surfaced, no writes.
    #[error("infeasible: {message}")]
    Infeasibility { message: String },

    /// A solver backend exceeded its wall-clock budget.
    #[error("timeout after {elapsed_seconds:.1}s (budget {budget_seconds:.1}s)")]
    Timeout {
        elapsed_seconds: f64,
        budget_seconds: f64,
    },

    /// The resilience gate (§4.9) refused generation.
    #[error("resilience gate refused generation at level {level:?} without override")]
    ResilienceRefusal { level: crate::resilience::ResilienceLevel },

    /// An external cancellation request was observed.
    #[error("run was cancelled")]
    Cancelled,

    /// Row-level lock over the target date range could not be acquired.
    #[error("could not acquire lock for {start}..={end}")]
    LockUnavailable { start: NaiveDate, end: NaiveDate },

    /// Repository-layer failure surfaced up to the engine.
    #[error(transparent)]
    Repository(#[from] crate::repository::RepositoryError),
}

impl SchedulingError {
    pub fn unknown_activity_code(code: impl Into<String>) -> Self {
        Self::DataConsistency {
            message: format!("unknown activity code: {}", code.into()),
        }
    }

    pub fn preload_conflict(person: crate::model::PersonId, slot: Slot) -> Self {
        Self::DataConsistency {
            message: format!(
                "preload conflict for person {person} at {:?}/{:?}",
                slot.date, slot.period
            ),
        }
    }

    pub fn duplicate_activity(existing: ActivityCode, incoming: ActivityCode) -> Self {
        Self::DataConsistency {
            message: format!("duplicate activity: existing={existing:?} incoming={incoming:?}"),
        }
    }
}

/// Cooperative cancellation flag shared between the engine and a running
/// solver backend. The solver callback polls `is_cancelled()` between
/// incumbents/nodes; the engine checks it between orchestration steps.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_token_observes_cancel_across_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
