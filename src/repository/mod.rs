//! Repository (abstract persistence boundary).
//!
//! The core treats storage as an external collaborator (spec §1 "Out of
//! scope"): this module defines the trait every backend must implement and
//! ships the one backend the core needs to run standalone, an in-memory
//! implementation behind the `local-repo` feature — mirroring the teacher's
//! `db` module layering of trait -> backend implementations -> factory.

mod error;
mod factory;
mod memory;

pub use error::{ErrorContext, RepositoryError};
pub use factory::{RepositoryBackend, RepositoryConfig};
pub use memory::InMemoryRepository;

use crate::model::{Assignment, PersonId, ResidentBlockRotation, RunId, ScheduleRun, Slot};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Spec §6 "call_assignments keyed by (date, person, call_type); unique".
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Overnight,
    Weekend,
    Backup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CallAssignment {
    pub date: NaiveDate,
    pub person: PersonId,
    pub call_type: CallType,
}

/// A held row-level lock over a date range, released on `Drop` if not
/// already released explicitly (spec §5 "A row-level lock over all slots
/// in the target range is acquired ... and released only on commit or
/// abort").
pub struct RangeLock {
    pub start: NaiveDate,
    pub end: NaiveDate,
    release: Box<dyn FnOnce() + Send>,
}

impl std::fmt::Debug for RangeLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeLock")
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}

impl RangeLock {
    pub fn new(start: NaiveDate, end: NaiveDate, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            start,
            end,
            release: Box::new(release),
        }
    }

    pub fn release(self) {
        (self.release)();
    }
}

/// The abstract persistence boundary the engine depends on (spec §6
/// "Persisted state layout"). Every write that crosses a commit point must
/// be atomic: either all of a run's non-preload assignments land, or none
/// do (spec §3 "ScheduleRun" invariant).
#[async_trait]
pub trait SchedulingRepository: Send + Sync {
    async fn acquire_range_lock(&self, start: NaiveDate, end: NaiveDate) -> Result<RangeLock, RepositoryError>;

    async fn assignments_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Assignment>, RepositoryError>;

    /// Writes `preload` assignments. Two preloads targeting the same
    /// `(person, slot)` is a caller-level data-consistency error (spec
    /// §4.3); the repository only enforces storage-level uniqueness.
    async fn write_preloads(&self, preloads: Vec<Assignment>) -> Result<(), RepositoryError>;

    /// Atomically replaces all solver-sourced assignments in `[start, end]`
    /// with `new_assignments`, leaving preload/manual assignments untouched
    /// (spec §4.7 "Atomicity").
    async fn commit_solver_assignments(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        new_assignments: Vec<Assignment>,
    ) -> Result<(), RepositoryError>;

    async fn resident_block_rotations(
        &self,
        academic_year: i32,
    ) -> Result<Vec<ResidentBlockRotation>, RepositoryError>;

    async fn upsert_resident_block_rotation(&self, rotation: ResidentBlockRotation) -> Result<(), RepositoryError>;

    async fn save_run(&self, run: ScheduleRun) -> Result<(), RepositoryError>;

    async fn get_run(&self, id: RunId) -> Result<Option<ScheduleRun>, RepositoryError>;

    async fn call_assignments_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CallAssignment>, RepositoryError>;
}
