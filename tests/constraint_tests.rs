//! Integration coverage for the hard-constraint catalog (spec §4.4, §4.8):
//! exercised through `ConstraintRegistry::validate_hard` over hand-built
//! schedules, rather than one function per rule in isolation.

mod support;

use chrono::{Datelike, NaiveDate};
use resident_scheduling_core::availability::AvailabilityMatrix;
use resident_scheduling_core::calendar::Calendar;
use resident_scheduling_core::config::EngineConfig;
use resident_scheduling_core::constraints::ConstraintRegistry;
use resident_scheduling_core::context::{ResilienceInputs, SchedulingContext};
use resident_scheduling_core::model::{ActivityCode, Assignment, AssignmentSource, Period};
use resident_scheduling_core::resilience::ResilienceLevel;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ctx_for(cal: Calendar, slots: Vec<resident_scheduling_core::model::Slot>) -> SchedulingContext {
    SchedulingContext::new(
        support::small_roster(),
        slots,
        vec![],
        AvailabilityMatrix::default(),
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

/// S2 — Wednesday PM single faculty: two faculty in Wed PM clinic is a
/// violation, exactly one is clean.
#[test]
fn wednesday_pm_requires_exactly_one_faculty() {
    let cal = Calendar::default();
    let wed = date(2026, 4, 8);
    assert_eq!(wed.weekday(), chrono::Weekday::Wed);
    let slot = cal.slot_for(wed, Period::Pm);
    let ctx = ctx_for(cal, vec![slot]);

    let faculty_a = resident_scheduling_core::model::PersonId::new(1); // LaBounty, faculty_core
    let faculty_b = resident_scheduling_core::model::PersonId::new(5); // Dept Chief, faculty

    let two_faculty = vec![
        Assignment::new(faculty_a, slot, ActivityCode::FmClinic, AssignmentSource::Solver),
        Assignment::new(faculty_b, slot, ActivityCode::FmClinic, AssignmentSource::Solver),
    ];
    let registry = ConstraintRegistry::standard_catalog();
    let violations = registry.validate_hard(&two_faculty, &ctx);
    assert!(violations.iter().any(|v| v.constraint_name == "WednesdayPmSingleFaculty"));

    let one_faculty = vec![Assignment::new(faculty_a, slot, ActivityCode::FmClinic, AssignmentSource::Solver)];
    let violations = registry.validate_hard(&one_faculty, &ctx);
    assert!(!violations.iter().any(|v| v.constraint_name == "WednesdayPmSingleFaculty"));
}

/// S3 — post-call PCAT/DO: a call assignment with no next-day PCAT/DO is a
/// violation, even across a block boundary.
#[test]
fn call_without_next_day_pcat_do_is_flagged() {
    let cal = Calendar::default();
    let wed_night = date(2026, 4, 8);
    let thu = wed_night + chrono::Duration::days(1);
    let slots = vec![
        cal.slot_for(wed_night, Period::Pm),
        cal.slot_for(thu, Period::Am),
        cal.slot_for(thu, Period::Pm),
    ];
    let ctx = ctx_for(cal, slots.clone());
    let faculty = resident_scheduling_core::model::PersonId::new(1);

    let missing = vec![Assignment::new(faculty, slots[0], ActivityCode::Call, AssignmentSource::Preload)];
    let registry = ConstraintRegistry::standard_catalog();
    let violations = registry.validate_hard(&missing, &ctx);
    assert!(violations.iter().any(|v| v.constraint_name == "PostCallPcatDo"));

    let complete = vec![
        Assignment::new(faculty, slots[0], ActivityCode::Call, AssignmentSource::Preload),
        Assignment::new(faculty, slots[1], ActivityCode::Pcat, AssignmentSource::Preload),
        Assignment::new(faculty, slots[2], ActivityCode::Do, AssignmentSource::Preload),
    ];
    let violations = registry.validate_hard(&complete, &ctx);
    assert!(!violations.iter().any(|v| v.constraint_name == "PostCallPcatDo"));
}

/// S4 — faculty weekly clinic bounds: exceeding `max_c` is a violation.
#[test]
fn faculty_clinic_count_outside_bounds_is_flagged() {
    let cal = Calendar::default();
    let week_start = date(2026, 4, 6); // Monday
    let mut slots = Vec::new();
    let mut assignments = Vec::new();
    let faculty = resident_scheduling_core::model::PersonId::new(1); // LaBounty, max_c=4
    for i in 0..5 {
        let d = week_start + chrono::Duration::days(i);
        let slot = cal.slot_for(d, Period::Am);
        slots.push(slot);
        assignments.push(Assignment::new(faculty, slot, ActivityCode::FmClinic, AssignmentSource::Solver));
    }
    let ctx = ctx_for(cal, slots);
    let registry = ConstraintRegistry::standard_catalog();
    let violations = registry.validate_hard(&assignments, &ctx);
    assert!(violations.iter().any(|v| v.constraint_name == "FacultyWeeklyClinicBounds"));
}

/// S5 — infeasibility surfaces cleanly: zero call coverage on an overnight
/// night is an `OvernightCallCoverage` violation.
#[test]
fn missing_overnight_call_coverage_is_flagged() {
    let cal = Calendar::default();
    let tue = date(2026, 4, 7);
    assert_eq!(tue.weekday(), chrono::Weekday::Tue);
    let slot = cal.slot_for(tue, Period::Pm);
    let ctx = ctx_for(cal, vec![slot]);
    let registry = ConstraintRegistry::standard_catalog();
    let violations = registry.validate_hard(&[], &ctx);
    assert!(violations.iter().any(|v| v.constraint_name == "OvernightCallCoverage"));
}
