//! Shared fixtures for integration tests: a small roster and a helper to
//! build a `SchedulingContext` over a date range without a repository.

use resident_scheduling_core::availability::AvailabilityMatrix;
use resident_scheduling_core::calendar::Calendar;
use resident_scheduling_core::config::{Block0Policy, EngineConfig};
use resident_scheduling_core::context::{ResilienceInputs, SchedulingContext};
use resident_scheduling_core::model::{ClinicBounds, Period, Person, PersonId, Role, WeekdayAvailability};
use resident_scheduling_core::resilience::ResilienceLevel;

pub fn person(id: u64, name: &str, role: Role) -> Person {
    Person {
        id: PersonId::new(id),
        name: name.into(),
        role,
        rank: None,
        clinic_bounds: ClinicBounds { min_c: 0, max_c: 4 },
        weekday_availability: WeekdayAvailability::default(),
        credentialed_procedures: Default::default(),
        excluded_procedures: Default::default(),
        prefers_tuesday_call: None,
    }
}

pub fn small_roster() -> Vec<Person> {
    vec![
        person(1, "LaBounty", Role::FacultyCore),
        person(2, "Resident One", Role::ResidentPgy1),
        person(3, "Resident Two", Role::ResidentPgy2),
        person(4, "Resident Three", Role::ResidentPgy3),
        person(5, "Dept Chief", Role::FacultyDeptChief),
    ]
}

pub fn context_over_range(
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    people: Vec<Person>,
) -> SchedulingContext {
    let cal = Calendar::new(Block0Policy::RollForward);
    let mut slots = Vec::new();
    let mut day = start;
    while day <= end {
        slots.push(cal.slot_for(day, Period::Am));
        slots.push(cal.slot_for(day, Period::Pm));
        day += chrono::Duration::days(1);
    }
    SchedulingContext::new(
        people,
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
