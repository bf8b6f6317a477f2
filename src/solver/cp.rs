//! Hand-rolled constraint-programming backend (spec §4.6 "CP backend").
//!
//! Rather than depend on an external CP-SAT binding, this backend performs
//! constraint propagation (forward-checking over per-slot domains) plus
//! chronological backtracking with a hard node budget tied to the wall-clock
//! timeout. Forbidden decisions and soft-constraint weights both come from
//! `ConstraintRegistry::encode_cp` via `PenaltyCollector`, so adding a
//! constraint variant never touches this file (spec §4.4 "Polymorphism
//! requirement"). The search only prunes what the registry's `forbid` calls
//! cover and what `occupied`/availability already track directly (capacity
//! per slot); rolling-window and cross-activity hard rules (one-in-seven,
//! supervision ratios, FMIT recovery, and the rest of the catalog with no
//! `encode_cp` body) are not enforced during search and are only caught
//! post-hoc by the validator, which is why a `feasible`/`optimal` result
//! here is not a guarantee every hard rule holds — `SchedulingEngine` always
//! re-validates before accepting a run.

use super::{SolveOutcome, SolverStats, SolverStatus, SolvedDecision};
use crate::constraints::{ConstraintRegistry, CpModel, Decision};
use crate::context::SchedulingContext;
use crate::error::{CancellationToken, SchedulingError};
use crate::model::{ActivityCode, PersonId, Slot};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

pub struct CpBackend;

/// Collects `forbid` and `add_penalty` calls from the registry into lookup
/// tables the backtracker and both solver backends' objective scoring can
/// consult. `at_most_one` groups are not tracked separately: this backend's
/// domain is a single activity (`FmClinic`) per `(person, slot)`, so the
/// search tree already assigns at most one decision per group by
/// construction.
#[derive(Default)]
pub(crate) struct PenaltyCollector {
    pub forbidden: HashSet<Decision>,
    pub penalty_weights: HashMap<Decision, f64>,
}

impl CpModel for PenaltyCollector {
    fn forbid(&mut self, decisions: &[Decision]) {
        self.forbidden.extend(decisions.iter().copied());
    }

    fn at_most_one(&mut self, _decisions: &[Decision]) {}

    fn add_penalty(&mut self, weight: f64, decisions: &[Decision]) {
        for d in decisions {
            *self.penalty_weights.entry(*d).or_insert(0.0) += weight;
        }
    }
}

struct SearchState<'a> {
    ctx: &'a SchedulingContext,
    deadline: Instant,
    cancellation: &'a CancellationToken,
    branches: u64,
    conflicts: u64,
    occupied: HashSet<(PersonId, chrono::NaiveDate, crate::model::Period)>,
    load: std::collections::HashMap<PersonId, u32>,
    forbidden: &'a HashSet<Decision>,
}

impl CpBackend {
    pub fn solve(
        ctx: &SchedulingContext,
        budget: Duration,
        cancellation: &CancellationToken,
    ) -> Result<SolveOutcome, SchedulingError> {
        let start = Instant::now();
        let deadline = start + budget;

        let registry = ConstraintRegistry::standard_catalog();
        let mut collected = PenaltyCollector::default();
        registry.encode_cp(&mut collected, ctx);

        let mut occupied = HashSet::new();
        for preload in &ctx.preloads {
            occupied.insert((preload.person, preload.slot.date, preload.slot.period));
        }

        let mut state = SearchState {
            ctx,
            deadline,
            cancellation,
            branches: 0,
            conflicts: 0,
            occupied,
            load: Default::default(),
            forbidden: &collected.forbidden,
        };

        let domains: Vec<Slot> = clinic_eligible_slots(ctx);
        let mut decisions = Vec::new();
        let timed_out = !backtrack(&mut state, &domains, 0, &mut decisions);

        let status = if timed_out {
            SolverStatus::Timeout
        } else if decisions.len() == domains.len() {
            SolverStatus::Optimal
        } else if decisions.is_empty() && !domains.is_empty() {
            SolverStatus::Infeasible
        } else {
            SolverStatus::Feasible
        };

        let best_objective = decisions
            .iter()
            .map(|d| {
                let decision = Decision {
                    person: d.person,
                    slot: d.slot,
                    activity: d.activity,
                };
                1000.0 - collected.penalty_weights.get(&decision).copied().unwrap_or(0.0)
            })
            .sum();

        Ok(SolveOutcome {
            status,
            decisions,
            stats: SolverStats {
                branches: state.branches,
                conflicts: state.conflicts,
                best_objective,
                runtime_seconds: start.elapsed().as_secs_f64(),
            },
        })
    }
}

/// Slots a solver-eligible template could be placed into: non-blocked,
/// not already preload-occupied for every candidate person.
fn clinic_eligible_slots(ctx: &SchedulingContext) -> Vec<Slot> {
    ctx.slots
        .iter()
        .filter(|s| {
            ctx.people
                .iter()
                .any(|p| ctx.availability.avail(p.id, s).is_available())
        })
        .copied()
        .collect()
}

/// Returns `false` if the search was aborted by timeout or cancellation
/// (distinguished from a clean, domain-exhausted stop by the caller
/// checking `branches` against the deadline).
fn backtrack(
    state: &mut SearchState,
    domains: &[Slot],
    index: usize,
    decisions: &mut Vec<SolvedDecision>,
) -> bool {
    if Instant::now() >= state.deadline || state.cancellation.is_cancelled() {
        return false;
    }
    if index >= domains.len() {
        return true;
    }
    state.branches += 1;
    let slot = domains[index];

    let mut candidates: Vec<PersonId> = state
        .ctx
        .people
        .iter()
        .filter(|p| {
            state.ctx.availability.avail(p.id, &slot).is_available()
                && !state.occupied.contains(&(p.id, slot.date, slot.period))
                && !state.forbidden.contains(&Decision {
                    person: p.id,
                    slot,
                    activity: ActivityCode::FmClinic,
                })
        })
        .map(|p| p.id)
        .collect();
    candidates.sort_by_key(|id| state.load.get(id).copied().unwrap_or(0));

    for person in candidates {
        state.occupied.insert((person, slot.date, slot.period));
        *state.load.entry(person).or_insert(0) += 1;
        decisions.push(SolvedDecision {
            person,
            slot,
            activity: ActivityCode::FmClinic,
        });

        if !backtrack(state, domains, index + 1, decisions) {
            if Instant::now() >= state.deadline || state.cancellation.is_cancelled() {
                return false;
            }
        } else {
            return true;
        }

        decisions.pop();
        *state.load.entry(person).or_insert(1) -= 1;
        state.occupied.remove(&(person, slot.date, slot.period));
        state.conflicts += 1;
    }

    // No candidate worked for this slot; skip it (reduces coverage rather
    // than failing the whole search) and keep going.
    backtrack(state, domains, index + 1, decisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use crate::config::{Block0Policy, EngineConfig};
    use crate::context::{ResilienceInputs, SchedulingContext};
    use crate::model::{ClinicBounds, Person, Role, WeekdayAvailability};
    use crate::resilience::ResilienceLevel;

    fn ctx_with_one_slot() -> SchedulingContext {
        let cal = Calendar::new(Block0Policy::RollForward);
        let slot = cal.slot_for(chrono::NaiveDate::from_ymd_opt(2026, 4, 6).unwrap(), crate::model::Period::Am);
        let person = Person {
            id: PersonId::new(1),
            name: "Test".into(),
            role: Role::ResidentPgy1,
            rank: None,
            clinic_bounds: ClinicBounds { min_c: 0, max_c: 4 },
            weekday_availability: WeekdayAvailability::default(),
            credentialed_procedures: Default::default(),
            excluded_procedures: Default::default(),
            prefers_tuesday_call: None,
        };
        SchedulingContext::new(
            vec![person],
            vec![slot],
            vec![],
            crate::availability::AvailabilityMatrix::default(),
            vec![],
            ResilienceInputs {
                hub_scores: Default::default(),
                current_utilization: 0.1,
                n1_vulnerable: 0,
                level: ResilienceLevel::Green,
            },
            EngineConfig::default(),
            cal,
        )
    }

    #[test]
    fn solves_a_single_slot_to_optimal() {
        let ctx = ctx_with_one_slot();
        let token = CancellationToken::new();
        let outcome = CpBackend::solve(&ctx, Duration::from_secs(5), &token).unwrap();
        assert_eq!(outcome.status, SolverStatus::Optimal);
        assert_eq!(outcome.decisions.len(), 1);
    }

    #[test]
    fn zero_budget_times_out() {
        let ctx = ctx_with_one_slot();
        let token = CancellationToken::new();
        let outcome = CpBackend::solve(&ctx, Duration::from_secs(0), &token).unwrap();
        assert_eq!(outcome.status, SolverStatus::Timeout);
    }
}
