//! ACGME Validator (C8): post-hoc validation of a committed schedule,
//! without access to solver internals (spec §4.8). Reuses the hard
//! constraint catalog's `validate` methods and adds the NF->PC audit.

use crate::constraints::{ConstraintRegistry, Violation};
use crate::context::SchedulingContext;
use crate::model::{ActivityCode, Assignment, PersonId};
use serde::{Deserialize, Serialize};

/// One NF->PC audit entry: did a resident's night-float block end into a
/// fully unassigned next day (spec §4.8 "NF->PC audit")?
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NfAuditEntry {
    pub person: PersonId,
    pub nf_block_end: chrono::NaiveDate,
    pub next_day_clear: bool,
}

/// Machine-readable validation output (spec §4.8). A run with any hard
/// violation is marked `partial`, never `success`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<ViolationRecord>,
    pub nf_audit: Vec<NfAuditEntry>,
}

/// A serializable projection of [`Violation`] (which borrows a `&'static
/// str` name but otherwise owns its data).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub constraint_name: String,
    pub detail: String,
}

impl From<&Violation> for ViolationRecord {
    fn from(v: &Violation) -> Self {
        Self {
            constraint_name: v.constraint_name.to_string(),
            detail: v.detail.clone(),
        }
    }
}

impl ValidationReport {
    pub fn has_hard_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}

/// Validates a committed schedule end to end.
pub fn validate(
    assignments: &[Assignment],
    ctx: &SchedulingContext,
    registry: &ConstraintRegistry,
) -> ValidationReport {
    let violations = registry
        .validate_hard(assignments, ctx)
        .iter()
        .map(ViolationRecord::from)
        .collect();

    ValidationReport {
        violations,
        nf_audit: nf_to_pc_audit(assignments),
    }
}

/// For each resident whose night-float block ends, confirms the next day
/// is a full off day (both AM and PM unoccupied or `off`/`recovery`).
fn nf_to_pc_audit(assignments: &[Assignment]) -> Vec<NfAuditEntry> {
    let mut block_ends: std::collections::HashMap<PersonId, chrono::NaiveDate> = std::collections::HashMap::new();
    for a in assignments.iter().filter(|a| a.activity == ActivityCode::Nf) {
        block_ends
            .entry(a.person)
            .and_modify(|end| {
                if a.slot.date > *end {
                    *end = a.slot.date;
                }
            })
            .or_insert(a.slot.date);
    }

    block_ends
        .into_iter()
        .map(|(person, end)| {
            let next_day = end + chrono::Duration::days(1);
            let next_day_clear = !assignments.iter().any(|a| {
                a.person == person
                    && a.slot.date == next_day
                    && !matches!(a.activity, ActivityCode::Off | ActivityCode::Recovery)
            });
            NfAuditEntry {
                person,
                nf_block_end: end,
                next_day_clear,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use crate::config::{Block0Policy, EngineConfig};
    use crate::context::ResilienceInputs;
    use crate::model::{AssignmentSource, ClinicBounds, Person, Role, WeekdayAvailability};
    use crate::resilience::ResilienceLevel;

    fn ctx() -> SchedulingContext {
        let cal = Calendar::new(Block0Policy::RollForward);
        SchedulingContext::new(
            vec![Person {
                id: PersonId::new(1),
                name: "Test".into(),
                role: Role::ResidentPgy2,
                rank: None,
                clinic_bounds: ClinicBounds { min_c: 0, max_c: 4 },
                weekday_availability: WeekdayAvailability::default(),
                credentialed_procedures: Default::default(),
                excluded_procedures: Default::default(),
                prefers_tuesday_call: None,
            }],
            vec![],
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
    fn nf_block_followed_by_off_day_is_clear() {
        let cal = Calendar::new(Block0Policy::RollForward);
        let nf_day = chrono::NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
        let next_day = nf_day + chrono::Duration::days(1);
        let person = PersonId::new(1);
        let assignments = vec![
            Assignment::new(person, cal.slot_for(nf_day, crate::model::Period::Am), ActivityCode::Nf, AssignmentSource::Preload),
            Assignment::new(person, cal.slot_for(next_day, crate::model::Period::Am), ActivityCode::Off, AssignmentSource::Preload),
            Assignment::new(person, cal.slot_for(next_day, crate::model::Period::Pm), ActivityCode::Off, AssignmentSource::Preload),
        ];
        let audit = nf_to_pc_audit(&assignments);
        assert_eq!(audit.len(), 1);
        assert!(audit[0].next_day_clear);
    }

    #[test]
    fn nf_block_followed_by_clinic_is_not_clear() {
        let cal = Calendar::new(Block0Policy::RollForward);
        let nf_day = chrono::NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
        let next_day = nf_day + chrono::Duration::days(1);
        let person = PersonId::new(1);
        let assignments = vec![
            Assignment::new(person, cal.slot_for(nf_day, crate::model::Period::Am), ActivityCode::Nf, AssignmentSource::Preload),
            Assignment::new(person, cal.slot_for(next_day, crate::model::Period::Am), ActivityCode::FmClinic, AssignmentSource::Solver),
        ];
        let audit = nf_to_pc_audit(&assignments);
        assert!(!audit[0].next_day_clear);
    }

    #[test]
    fn empty_schedule_has_no_violations() {
        let registry = ConstraintRegistry::standard_catalog();
        let report = validate(&[], &ctx(), &registry);
        assert!(!report.has_hard_violations());
    }
}
