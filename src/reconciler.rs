//! Assignment Reconciler (C7): merges solver output with preloads by
//! `(person, slot)`, respecting source priority, then runs the faculty
//! supervision pass (spec §4.7).

use crate::context::SchedulingContext;
use crate::model::{ActivityCode, Assignment, AssignmentRole, AssignmentSource, PersonId, Role, Slot};
use crate::solver::SolvedDecision;
use std::collections::{HashMap, HashSet};

/// Diagnostics produced alongside the reconciled assignment set.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationReport {
    pub dropped_for_preload: usize,
    pub supervising_assignments_added: usize,
}

/// Reconciles `solver_result` against `ctx.preloads`, then performs the
/// faculty supervision pass. Returns the full committed-candidate
/// assignment set (preloads + solver-sourced + supervising) and diagnostics.
pub fn reconcile(
    solver_result: &[SolvedDecision],
    ctx: &SchedulingContext,
) -> (Vec<Assignment>, ReconciliationReport) {
    let mut report = ReconciliationReport::default();
    let mut occupied: HashSet<(PersonId, chrono::NaiveDate, crate::model::Period)> = HashSet::new();

    let mut out: Vec<Assignment> = ctx.preloads.clone();
    for a in &out {
        occupied.insert((a.person, a.slot.date, a.slot.period));
    }

    for decision in solver_result {
        let key = (decision.person, decision.slot.date, decision.slot.period);
        if occupied.contains(&key) {
            report.dropped_for_preload += 1;
            continue;
        }
        occupied.insert(key);
        out.push(Assignment::new(
            decision.person,
            decision.slot,
            decision.activity,
            AssignmentSource::Solver,
        ));
    }

    supervision_pass(&mut out, &mut occupied, ctx, &mut report);

    (out, report)
}

/// For each clinic slot, computes the required faculty count from the
/// supervision ratios and assigns the least-loaded available faculty not
/// already occupied that slot, with `role=supervising` (spec §4.7).
fn supervision_pass(
    out: &mut Vec<Assignment>,
    occupied: &mut HashSet<(PersonId, chrono::NaiveDate, crate::model::Period)>,
    ctx: &SchedulingContext,
    report: &mut ReconciliationReport,
) {
    let mut clinic_by_slot: HashMap<(chrono::NaiveDate, crate::model::Period), Vec<PersonId>> = HashMap::new();
    for a in out.iter().filter(|a| a.activity == ActivityCode::FmClinic) {
        clinic_by_slot.entry((a.slot.date, a.slot.period)).or_default().push(a.person);
    }

    let mut faculty_load: HashMap<PersonId, u32> = HashMap::new();
    for a in out.iter() {
        if ctx.person(a.person).map(|p| p.role.is_faculty()).unwrap_or(false) {
            *faculty_load.entry(a.person).or_insert(0) += 1;
        }
    }

    for ((date, period), residents) in clinic_by_slot {
        let mut n_pgy1 = 0u32;
        let mut n_pgy2 = 0u32;
        let mut n_pgy3 = 0u32;
        for person_id in &residents {
            if let Some(person) = ctx.person(*person_id) {
                match person.role {
                    Role::ResidentPgy1 => n_pgy1 += 1,
                    Role::ResidentPgy2 => n_pgy2 += 1,
                    Role::ResidentPgy3 => n_pgy3 += 1,
                    _ => {}
                }
            }
        }
        let required = div_ceil(n_pgy1, 2) + div_ceil(n_pgy2, 4) + div_ceil(n_pgy3, 4);
        let already_present: u32 = residents
            .iter()
            .filter(|id| ctx.person(**id).map(|p| p.role.is_faculty()).unwrap_or(false))
            .count() as u32;

        let mut needed = required.saturating_sub(already_present);
        if needed == 0 {
            continue;
        }

        let slot = match ctx.slots.iter().find(|s| s.date == date && s.period == period) {
            Some(s) => *s,
            None => continue,
        };

        let mut candidates: Vec<PersonId> = ctx
            .call_eligible_people()
            .filter(|p| {
                !occupied.contains(&(p.id, date, period)) && ctx.availability.avail(p.id, &slot).is_available()
            })
            .map(|p| p.id)
            .collect();
        candidates.sort_by_key(|id| faculty_load.get(id).copied().unwrap_or(0));

        for person_id in candidates {
            if needed == 0 {
                break;
            }
            occupied.insert((person_id, date, period));
            *faculty_load.entry(person_id).or_insert(0) += 1;
            let mut assignment = Assignment::new(person_id, slot, ActivityCode::FmClinic, AssignmentSource::Solver);
            assignment.role = AssignmentRole::Supervising;
            out.push(assignment);
            report.supervising_assignments_added += 1;
            needed -= 1;
        }
    }
}

fn div_ceil(a: u32, b: u32) -> u32 {
    if a == 0 {
        0
    } else {
        (a + b - 1) / b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use crate::config::{Block0Policy, EngineConfig};
    use crate::context::ResilienceInputs;
    use crate::model::{ClinicBounds, Person, WeekdayAvailability};
    use crate::resilience::ResilienceLevel;
    use crate::solver::SolvedDecision;

    fn person(id: u64, role: Role) -> Person {
        Person {
            id: PersonId::new(id),
            name: format!("p{id}"),
            role,
            rank: None,
            clinic_bounds: ClinicBounds { min_c: 0, max_c: 4 },
            weekday_availability: WeekdayAvailability::default(),
            credentialed_procedures: Default::default(),
            excluded_procedures: Default::default(),
            prefers_tuesday_call: None,
        }
    }

    fn ctx_with(preloads: Vec<Assignment>, people: Vec<Person>, slot: Slot) -> SchedulingContext {
        let cal = Calendar::new(Block0Policy::RollForward);
        SchedulingContext::new(
            people,
            vec![slot],
            vec![],
            crate::availability::AvailabilityMatrix::default(),
            preloads,
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
    fn solver_result_colliding_with_preload_is_dropped() {
        let cal = Calendar::new(Block0Policy::RollForward);
        let slot = cal.slot_for(chrono::NaiveDate::from_ymd_opt(2026, 4, 6).unwrap(), crate::model::Period::Am);
        let resident = person(1, Role::ResidentPgy1);
        let preload = Assignment::new(resident.id, slot, ActivityCode::LvAm, AssignmentSource::Preload);
        let ctx = ctx_with(vec![preload.clone()], vec![resident.clone()], slot);

        let decisions = vec![SolvedDecision {
            person: resident.id,
            slot,
            activity: ActivityCode::FmClinic,
        }];
        let (out, report) = reconcile(&decisions, &ctx);
        assert_eq!(report.dropped_for_preload, 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].activity, ActivityCode::LvAm);
    }

    #[test]
    fn non_colliding_solver_result_is_kept_with_solver_source() {
        let cal = Calendar::new(Block0Policy::RollForward);
        let slot = cal.slot_for(chrono::NaiveDate::from_ymd_opt(2026, 4, 6).unwrap(), crate::model::Period::Am);
        let resident = person(1, Role::ResidentPgy1);
        let ctx = ctx_with(vec![], vec![resident.clone()], slot);

        let decisions = vec![SolvedDecision {
            person: resident.id,
            slot,
            activity: ActivityCode::FmClinic,
        }];
        let (out, report) = reconcile(&decisions, &ctx);
        assert_eq!(report.dropped_for_preload, 0);
        assert!(out.iter().any(|a| a.source == AssignmentSource::Solver));
    }
}
