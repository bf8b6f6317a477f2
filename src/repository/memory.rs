//! In-memory `SchedulingRepository`, the only backend shipped under the
//! `local-repo` feature. Mirrors the shape of the teacher's local backend:
//! interior-mutable state behind `parking_lot::RwLock`, no I/O.

use super::{CallAssignment, ErrorContext, RangeLock, RepositoryError, SchedulingRepository};
use crate::model::{Assignment, AssignmentSource, ResidentBlockRotation, RunId, ScheduleRun};
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Store {
    assignments: Vec<Assignment>,
    rotations: Vec<ResidentBlockRotation>,
    runs: Vec<ScheduleRun>,
    locked_ranges: HashSet<(NaiveDate, NaiveDate)>,
}

/// Backed by a single `RwLock`-guarded store. Range locking is approximated
/// with a poll loop rather than a wait queue, adequate for the single
/// in-process deployment this backend targets.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn overlaps(a: (NaiveDate, NaiveDate), b: (NaiveDate, NaiveDate)) -> bool {
        a.0 <= b.1 && b.0 <= a.1
    }
}

#[async_trait]
impl SchedulingRepository for InMemoryRepository {
    async fn acquire_range_lock(&self, start: NaiveDate, end: NaiveDate) -> Result<RangeLock, RepositoryError> {
        loop {
            {
                let mut store = self.store.write();
                let busy = store.locked_ranges.iter().any(|r| Self::overlaps(*r, (start, end)));
                if !busy {
                    store.locked_ranges.insert((start, end));
                    let store_ref = self.store.clone();
                    return Ok(RangeLock::new(start, end, move || {
                        store_ref.write().locked_ranges.remove(&(start, end));
                    }));
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    async fn assignments_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Assignment>, RepositoryError> {
        let store = self.store.read();
        Ok(store
            .assignments
            .iter()
            .filter(|a| a.slot.date >= start && a.slot.date <= end)
            .cloned()
            .collect())
    }

    async fn write_preloads(&self, preloads: Vec<Assignment>) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        let mut to_insert = Vec::with_capacity(preloads.len());
        for p in preloads {
            match store.assignments.iter().find(|a| a.person == p.person && a.slot == p.slot) {
                // Re-running the same preload phase over an already-preloaded
                // range is a no-op (spec §8 idempotence), not a conflict.
                Some(existing) if existing.source == AssignmentSource::Preload && existing.activity == p.activity => {}
                Some(_) => {
                    return Err(RepositoryError::UniquenessViolation {
                        context: ErrorContext::new("write_preloads", "assignment")
                            .with_entity_id(format!("{}@{:?}", p.person, p.slot))
                            .with_details("preload targets an already-occupied (person, slot)"),
                    });
                }
                None => to_insert.push(p),
            }
        }
        store.assignments.extend(to_insert);
        Ok(())
    }

    async fn commit_solver_assignments(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        new_assignments: Vec<Assignment>,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        store
            .assignments
            .retain(|a| !(a.source == AssignmentSource::Solver && a.slot.date >= start && a.slot.date <= end));
        store.assignments.extend(new_assignments);
        Ok(())
    }

    async fn resident_block_rotations(&self, academic_year: i32) -> Result<Vec<ResidentBlockRotation>, RepositoryError> {
        let store = self.store.read();
        Ok(store
            .rotations
            .iter()
            .filter(|r| r.academic_year == academic_year)
            .copied()
            .collect())
    }

    async fn upsert_resident_block_rotation(&self, rotation: ResidentBlockRotation) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        if let Some(existing) = store.rotations.iter_mut().find(|r| {
            r.person == rotation.person
                && r.block_number == rotation.block_number
                && r.academic_year == rotation.academic_year
                && r.block_half == rotation.block_half
        }) {
            *existing = rotation;
        } else {
            store.rotations.push(rotation);
        }
        Ok(())
    }

    async fn save_run(&self, run: ScheduleRun) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        if let Some(existing) = store.runs.iter_mut().find(|r| r.id == run.id) {
            *existing = run;
        } else {
            store.runs.push(run);
        }
        Ok(())
    }

    async fn get_run(&self, id: RunId) -> Result<Option<ScheduleRun>, RepositoryError> {
        let store = self.store.read();
        Ok(store.runs.iter().find(|r| r.id == id).cloned())
    }

    async fn call_assignments_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CallAssignment>, RepositoryError> {
        let store = self.store.read();
        Ok(store
            .assignments
            .iter()
            .filter(|a| {
                a.activity == crate::model::ActivityCode::Call && a.slot.date >= start && a.slot.date <= end
            })
            .map(|a| CallAssignment {
                date: a.slot.date,
                person: a.person,
                call_type: super::CallType::Overnight,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use crate::config::Block0Policy;
    use crate::model::{ActivityCode, Period, PersonId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn write_preloads_rejects_duplicate_person_slot() {
        let repo = InMemoryRepository::new();
        let cal = Calendar::new(Block0Policy::RollForward);
        let slot = cal.slot_for(date(2026, 4, 6), Period::Am);
        let person = PersonId::new(1);
        let a = Assignment::new(person, slot, ActivityCode::LvAm, AssignmentSource::Preload);
        repo.write_preloads(vec![a.clone()]).await.unwrap();
        let result = repo.write_preloads(vec![a]).await;
        assert!(matches!(result, Err(RepositoryError::UniquenessViolation { .. })));
    }

    #[tokio::test]
    async fn commit_solver_assignments_replaces_only_solver_source_in_range() {
        let repo = InMemoryRepository::new();
        let cal = Calendar::new(Block0Policy::RollForward);
        let slot = cal.slot_for(date(2026, 4, 6), Period::Am);
        let person = PersonId::new(1);
        let preload = Assignment::new(person, slot, ActivityCode::LvAm, AssignmentSource::Preload);
        repo.write_preloads(vec![preload]).await.unwrap();

        let solver_slot = cal.slot_for(date(2026, 4, 7), Period::Am);
        let solver_assignment = Assignment::new(person, solver_slot, ActivityCode::FmClinic, AssignmentSource::Solver);
        repo.commit_solver_assignments(date(2026, 4, 1), date(2026, 4, 30), vec![solver_assignment])
            .await
            .unwrap();

        let all = repo.assignments_in_range(date(2026, 4, 1), date(2026, 4, 30)).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn acquire_range_lock_blocks_overlapping_range_until_release() {
        let repo = Arc::new(InMemoryRepository::new());
        let lock = repo.acquire_range_lock(date(2026, 4, 1), date(2026, 4, 30)).await.unwrap();

        let repo2 = repo.clone();
        let handle = tokio::spawn(async move {
            repo2.acquire_range_lock(date(2026, 4, 15), date(2026, 5, 1)).await.unwrap();
        });

        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        assert!(!handle.is_finished());

        lock.release();
        handle.await.unwrap();
    }
}
