//! Greedy backend (spec §4.6): sorts slots by eligible-person count
//! ascending, assigns the least-loaded eligible person to each, breaking
//! ties by each candidate's recorded Tuesday-call preference (`Person::
//! prefers_tuesday_call`, spec §3 "Person") and falling back to person id
//! beyond that. Always terminates; may leave slots unassigned, which
//! surfaces as reduced coverage rather than an error.

use super::cp::PenaltyCollector;
use super::{SolveOutcome, SolverStats, SolverStatus, SolvedDecision};
use crate::constraints::{ConstraintRegistry, Decision};
use crate::context::SchedulingContext;
use crate::error::CancellationToken;
use crate::model::{ActivityCode, Person};
use std::collections::HashMap;
use std::time::Instant;

/// Ranks a candidate for tie-breaking within a tied-load group, lowest rank
/// first. The only preference this roster records is `prefers_tuesday_call`
/// (spec §3 "Person"); for a Tuesday slot, someone who has opted in to
/// Tuesday call sorts ahead of someone with no stated preference, who in
/// turn sorts ahead of someone who opted out. Every other day falls back to
/// the "no preference on record" rank, leaving the person-id tiebreak below
/// as the final distinguisher.
fn preference_rank(person: &Person, slot: &crate::model::Slot) -> i32 {
    use chrono::Datelike;
    if slot.date.weekday() == chrono::Weekday::Tue {
        match person.prefers_tuesday_call {
            Some(true) => 0,
            Some(false) => 2,
            None => 1,
        }
    } else {
        1
    }
}

pub struct GreedyBackend;

impl GreedyBackend {
    pub fn solve(ctx: &SchedulingContext, cancellation: &CancellationToken) -> SolveOutcome {
        let start = Instant::now();
        let mut load: HashMap<crate::model::PersonId, u32> = HashMap::new();
        let mut occupied: std::collections::HashSet<(crate::model::PersonId, chrono::NaiveDate, crate::model::Period)> =
            std::collections::HashSet::new();
        for preload in &ctx.preloads {
            occupied.insert((preload.person, preload.slot.date, preload.slot.period));
        }

        let eligible_people: Vec<&crate::model::Person> = ctx.people.iter().filter(|p| p.role.is_resident() || p.role.is_faculty()).collect();

        let mut slot_eligibility: Vec<(crate::model::Slot, usize)> = ctx
            .slots
            .iter()
            .map(|slot| {
                let n_eligible = eligible_people
                    .iter()
                    .filter(|p| ctx.availability.avail(p.id, slot).is_available())
                    .count();
                (*slot, n_eligible)
            })
            .collect();
        slot_eligibility.sort_by_key(|(_, n)| *n);

        let mut decisions = Vec::new();
        for (slot, _) in slot_eligibility {
            if cancellation.is_cancelled() {
                break;
            }
            let mut candidates: Vec<&crate::model::Person> = eligible_people
                .iter()
                .copied()
                .filter(|p| {
                    ctx.availability.avail(p.id, &slot).is_available()
                        && !occupied.contains(&(p.id, slot.date, slot.period))
                })
                .collect();
            if candidates.is_empty() {
                continue;
            }
            candidates.sort_by(|a, b| {
                let load_a = load.get(&a.id).copied().unwrap_or(0);
                let load_b = load.get(&b.id).copied().unwrap_or(0);
                load_a
                    .cmp(&load_b)
                    .then_with(|| preference_rank(a, &slot).cmp(&preference_rank(b, &slot)))
                    .then_with(|| a.id.value().cmp(&b.id.value()))
            });
            let chosen = candidates[0];
            occupied.insert((chosen.id, slot.date, slot.period));
            *load.entry(chosen.id).or_insert(0) += 1;
            decisions.push(SolvedDecision {
                person: chosen.id,
                slot,
                activity: ActivityCode::FmClinic,
            });
        }

        let status = if cancellation.is_cancelled() {
            SolverStatus::Feasible
        } else {
            SolverStatus::Optimal
        };

        let registry = ConstraintRegistry::standard_catalog();
        let mut scoring = PenaltyCollector::default();
        registry.encode_cp(&mut scoring, ctx);
        let best_objective = decisions
            .iter()
            .map(|d| {
                let decision = Decision {
                    person: d.person,
                    slot: d.slot,
                    activity: d.activity,
                };
                1000.0 - scoring.penalty_weights.get(&decision).copied().unwrap_or(0.0)
            })
            .sum();

        SolveOutcome {
            status,
            decisions,
            stats: SolverStats {
                branches: 0,
                conflicts: 0,
                best_objective,
                runtime_seconds: start.elapsed().as_secs_f64(),
            },
        }
    }
}
