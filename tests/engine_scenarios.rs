//! End-to-end scenarios from spec §8, driven through `SchedulingEngine`
//! against the in-memory repository.

mod support;

use chrono::NaiveDate;
use resident_scheduling_core::config::EngineConfig;
use resident_scheduling_core::engine::{GenerateOptions, GenerationInputs, SchedulingEngine};
use resident_scheduling_core::error::SchedulingError;
use resident_scheduling_core::model::{ActivityCode, Assignment, AssignmentSource, Period};
use resident_scheduling_core::preload::PreloadInputs;
use resident_scheduling_core::repository::{InMemoryRepository, SchedulingRepository};
use resident_scheduling_core::resilience::ResilienceLevel;
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn generate_over_a_short_range_produces_a_run_report() {
    let repo = Arc::new(InMemoryRepository::new());
    let engine = SchedulingEngine::new(repo, EngineConfig::default());
    let people = support::small_roster();

    let report = engine
        .generate(
            (date(2026, 4, 1), date(2026, 4, 2)),
            GenerateOptions::default(),
            GenerationInputs {
                people,
                templates: vec![],
                preload_inputs: PreloadInputs::default(),
            },
        )
        .await
        .unwrap();

    assert_eq!(report.total_slots, 4); // 2 days * 2 periods
    assert!(report.resilience_pre.is_some());
    assert!(report.validation_report.is_some());
}

#[tokio::test]
async fn cancellation_before_dispatch_yields_no_writes() {
    let repo = Arc::new(InMemoryRepository::new());
    let engine = SchedulingEngine::new(repo.clone(), EngineConfig::default());
    let mut options = GenerateOptions::default();
    options.cancellation.cancel();

    let result = engine
        .generate(
            (date(2026, 4, 1), date(2026, 4, 2)),
            options,
            GenerationInputs {
                people: support::small_roster(),
                templates: vec![],
                preload_inputs: PreloadInputs::default(),
            },
        )
        .await;

    assert!(matches!(result, Err(SchedulingError::Cancelled)));
    let written = repo.assignments_in_range(date(2026, 4, 1), date(2026, 4, 2)).await.unwrap();
    assert!(written.is_empty());
}

/// S6 — resilience gate RED: at ~0.92 utilization the engine refuses without
/// override and proceeds (reporting RED) with it.
#[tokio::test]
async fn resilience_red_gates_generation_unless_overridden() {
    let start = date(2026, 4, 1);
    let end = date(2026, 4, 3);
    let people = support::small_roster();

    let repo = Arc::new(InMemoryRepository::new());
    let cal = resident_scheduling_core::calendar::Calendar::default();
    let mut existing = Vec::new();
    'outer: for day_offset in 0..3 {
        for period in [Period::Am, Period::Pm] {
            for person in &people {
                if existing.len() >= 28 {
                    break 'outer;
                }
                let slot = cal.slot_for(start + chrono::Duration::days(day_offset), period);
                existing.push(Assignment::new(person.id, slot, ActivityCode::FmClinic, AssignmentSource::Manual));
            }
        }
    }
    assert_eq!(existing.len(), 28);
    repo.commit_solver_assignments(start, end, existing).await.unwrap();

    let mut refusing_config = EngineConfig::default();
    refusing_config.resilience_override = false;
    let engine = SchedulingEngine::new(repo.clone(), refusing_config);
    let result = engine
        .generate(
            (start, end),
            GenerateOptions::default(),
            GenerationInputs {
                people: people.clone(),
                templates: vec![],
                preload_inputs: PreloadInputs::default(),
            },
        )
        .await;
    assert!(matches!(result, Err(SchedulingError::ResilienceRefusal { level }) if level == ResilienceLevel::Red));

    let mut override_config = EngineConfig::default();
    override_config.resilience_override = true;
    let engine = SchedulingEngine::new(repo, override_config);
    let report = engine
        .generate(
            (start, end),
            GenerateOptions::default(),
            GenerationInputs {
                people,
                templates: vec![],
                preload_inputs: PreloadInputs::default(),
            },
        )
        .await
        .unwrap();
    assert_eq!(report.resilience_pre, Some(ResilienceLevel::Red));
}

/// S1 — FMIT week straddling blocks: call falls only on the Friday/Saturday
/// nights of the FMIT week, derived purely from the preload pipeline.
#[tokio::test]
async fn fmit_preload_assigns_call_only_on_friday_and_saturday() {
    use resident_scheduling_core::preload::FmitAssignment;

    let cal = resident_scheduling_core::calendar::Calendar::default();
    let friday = date(2026, 4, 3);
    let person = resident_scheduling_core::model::PersonId::new(1);
    let inputs = PreloadInputs {
        fmit_assignments: vec![FmitAssignment { person, friday }],
        ..Default::default()
    };
    let mut slots = Vec::new();
    let mut day = friday;
    while day <= friday + chrono::Duration::days(9) {
        slots.push(cal.slot_for(day, Period::Am));
        slots.push(cal.slot_for(day, Period::Pm));
        day += chrono::Duration::days(1);
    }

    let preloaded = resident_scheduling_core::preload::run(&inputs, &slots, &cal).unwrap();

    let call_dates: Vec<NaiveDate> = preloaded
        .iter()
        .filter(|a| a.person == person && a.activity == ActivityCode::Call)
        .map(|a| a.slot.date)
        .collect();
    assert_eq!(call_dates.len(), 2);
    assert!(call_dates.contains(&friday));
    assert!(call_dates.contains(&(friday + chrono::Duration::days(1))));

    let next_friday = friday + chrono::Duration::days(7);
    assert!(!preloaded.iter().any(|a| a.person == person && a.slot.date == next_friday));
}
