//! Hard-constraint catalog (spec §4.4). Every variant is a tagged case of
//! [`HardConstraint`]; adding one never touches a solver backend.

use super::{CpModel, Decision, LpModel, Priority, Violation};
use crate::context::SchedulingContext;
use crate::model::{ActivityCode, Assignment, Role};
use chrono::Datelike;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardConstraint {
    Availability,
    CapacityPerSlot,
    ClinicHeadcountCap,
    EightyHourRule,
    OneInSevenRule,
    SupervisionRatios,
    WednesdayAmInternOnly,
    WednesdayPmSingleFaculty,
    FacultyWeeklyClinicBounds,
    FacultyDayAvailability,
    OvernightCallCoverage,
    AdjunctCallExclusion,
    CallAvailability,
    FmitMandatoryFriSatCall,
    PostFmitRecovery,
    PostFmitSundayBlock,
    PostCallPcatDo,
    SmAlignment,
    ProtectedSlots,
    FmitStaffingFloor,
}

impl HardConstraint {
    pub fn name(&self) -> &'static str {
        match self {
            HardConstraint::Availability => "Availability",
            HardConstraint::CapacityPerSlot => "CapacityPerSlot",
            HardConstraint::ClinicHeadcountCap => "ClinicHeadcountCap",
            HardConstraint::EightyHourRule => "EightyHourRule",
            HardConstraint::OneInSevenRule => "OneInSevenRule",
            HardConstraint::SupervisionRatios => "SupervisionRatios",
            HardConstraint::WednesdayAmInternOnly => "WednesdayAmInternOnly",
            HardConstraint::WednesdayPmSingleFaculty => "WednesdayPmSingleFaculty",
            HardConstraint::FacultyWeeklyClinicBounds => "FacultyWeeklyClinicBounds",
            HardConstraint::FacultyDayAvailability => "FacultyDayAvailability",
            HardConstraint::OvernightCallCoverage => "OvernightCallCoverage",
            HardConstraint::AdjunctCallExclusion => "AdjunctCallExclusion",
            HardConstraint::CallAvailability => "CallAvailability",
            HardConstraint::FmitMandatoryFriSatCall => "FmitMandatoryFriSatCall",
            HardConstraint::PostFmitRecovery => "PostFmitRecovery",
            HardConstraint::PostFmitSundayBlock => "PostFmitSundayBlock",
            HardConstraint::PostCallPcatDo => "PostCallPcatDo",
            HardConstraint::SmAlignment => "SmAlignment",
            HardConstraint::ProtectedSlots => "ProtectedSlots",
            HardConstraint::FmitStaffingFloor => "FmitStaffingFloor",
        }
    }

    pub fn priority(&self) -> Priority {
        Priority::Critical
    }

    pub fn standard_catalog() -> Vec<Self> {
        vec![
            HardConstraint::Availability,
            HardConstraint::CapacityPerSlot,
            HardConstraint::ClinicHeadcountCap,
            HardConstraint::EightyHourRule,
            HardConstraint::OneInSevenRule,
            HardConstraint::SupervisionRatios,
            HardConstraint::WednesdayAmInternOnly,
            HardConstraint::WednesdayPmSingleFaculty,
            HardConstraint::FacultyWeeklyClinicBounds,
            HardConstraint::FacultyDayAvailability,
            HardConstraint::OvernightCallCoverage,
            HardConstraint::AdjunctCallExclusion,
            HardConstraint::CallAvailability,
            HardConstraint::FmitMandatoryFriSatCall,
            HardConstraint::PostFmitRecovery,
            HardConstraint::PostFmitSundayBlock,
            HardConstraint::PostCallPcatDo,
            HardConstraint::SmAlignment,
            HardConstraint::ProtectedSlots,
            HardConstraint::FmitStaffingFloor,
        ]
    }

    /// Encode into a CP model. Several rules (post-FMIT, SM alignment) are
    /// produced entirely by the preload pipeline and have nothing left to
    /// encode at solve time; per spec §4.4 "encode methods may be optional",
    /// they only implement `validate`.
    pub fn encode_cp(&self, model: &mut dyn CpModel, ctx: &SchedulingContext) {
        match self {
            HardConstraint::Availability => {
                for person in &ctx.people {
                    for slot in &ctx.slots {
                        if ctx.availability.avail(person.id, slot).is_blocked() {
                            let decisions: Vec<Decision> = ctx
                                .solver_eligible_templates()
                                .map(|t| Decision {
                                    person: person.id,
                                    slot: *slot,
                                    activity: template_activity(t),
                                })
                                .collect();
                            model.forbid(&decisions);
                        }
                    }
                }
            }
            HardConstraint::CapacityPerSlot => {
                for person in &ctx.people {
                    for slot in &ctx.slots {
                        let decisions: Vec<Decision> = ctx
                            .solver_eligible_templates()
                            .map(|t| Decision {
                                person: person.id,
                                slot: *slot,
                                activity: template_activity(t),
                            })
                            .collect();
                        model.at_most_one(&decisions);
                    }
                }
            }
            HardConstraint::AdjunctCallExclusion => {
                for person in ctx.people.iter().filter(|p| p.role.is_adjunct()) {
                    let decisions: Vec<Decision> = ctx
                        .slots
                        .iter()
                        .map(|slot| Decision {
                            person: person.id,
                            slot: *slot,
                            activity: ActivityCode::Call,
                        })
                        .collect();
                    model.forbid(&decisions);
                }
            }
            // Remaining rules are rolling-window / cross-slot and are left
            // to validation; a hybrid/CP implementation with a real solver
            // SDK would linearize them here.
            _ => {}
        }
    }

    pub fn encode_lp(&self, model: &mut dyn LpModel, ctx: &SchedulingContext) {
        match self {
            HardConstraint::ClinicHeadcountCap => {
                for slot in &ctx.slots {
                    let terms: Vec<(Decision, f64)> = ctx
                        .people
                        .iter()
                        .map(|p| {
                            (
                                Decision {
                                    person: p.id,
                                    slot: *slot,
                                    activity: ActivityCode::FmClinic,
                                },
                                1.0,
                            )
                        })
                        .collect();
                    model.add_le(&terms, ctx.config.clinic_headcount_cap as f64);
                }
            }
            HardConstraint::OneInSevenRule => encode_one_in_seven_lp(model, ctx),
            _ => {}
        }
    }

    pub fn validate(&self, assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
        match self {
            HardConstraint::Availability => validate_availability(assignments, ctx),
            HardConstraint::CapacityPerSlot => validate_capacity_per_slot(assignments),
            HardConstraint::ClinicHeadcountCap => validate_clinic_headcount(assignments, ctx),
            HardConstraint::EightyHourRule => validate_eighty_hour(assignments, ctx),
            HardConstraint::OneInSevenRule => validate_one_in_seven(assignments, ctx),
            HardConstraint::SupervisionRatios => validate_supervision(assignments, ctx),
            HardConstraint::WednesdayAmInternOnly => validate_wed_am_intern_only(assignments, ctx),
            HardConstraint::WednesdayPmSingleFaculty => validate_wed_pm_single_faculty(assignments, ctx),
            HardConstraint::FacultyWeeklyClinicBounds => validate_weekly_clinic_bounds(assignments, ctx),
            HardConstraint::FacultyDayAvailability => validate_faculty_day_availability(assignments, ctx),
            HardConstraint::OvernightCallCoverage => validate_overnight_call_coverage(assignments, ctx),
            HardConstraint::AdjunctCallExclusion => validate_adjunct_call_exclusion(assignments, ctx),
            HardConstraint::CallAvailability => validate_call_availability(assignments, ctx),
            HardConstraint::FmitMandatoryFriSatCall => validate_fmit_mandatory_call(assignments, ctx),
            HardConstraint::PostFmitRecovery => validate_post_fmit_recovery(assignments, ctx),
            HardConstraint::PostFmitSundayBlock => validate_post_fmit_sunday(assignments, ctx),
            HardConstraint::PostCallPcatDo => validate_post_call_pcat_do(assignments, ctx),
            HardConstraint::SmAlignment => validate_sm_alignment(assignments, ctx),
            HardConstraint::ProtectedSlots => validate_protected_slots(assignments),
            HardConstraint::FmitStaffingFloor => validate_fmit_staffing_floor(assignments, ctx),
        }
    }
}

fn template_activity(_t: &crate::model::RotationTemplate) -> ActivityCode {
    ActivityCode::FmClinic
}

fn validate_availability(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    assignments
        .iter()
        .filter(|a| ctx.availability.avail(a.person, &a.slot).is_blocked())
        .map(|a| {
            Violation::new(
                "Availability",
                Priority::Critical,
                format!("{} assigned {:?} while blocked", a.person, a.activity),
            )
            .with_person(a.person)
            .with_slot(a.slot)
        })
        .collect()
}

fn validate_capacity_per_slot(assignments: &[Assignment]) -> Vec<Violation> {
    let mut seen: HashMap<(crate::model::PersonId, chrono::NaiveDate, crate::model::Period), u32> =
        HashMap::new();
    for a in assignments {
        *seen.entry((a.person, a.slot.date, a.slot.period)).or_insert(0) += 1;
    }
    seen.into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|((person, date, period), count)| {
            Violation::new(
                "CapacityPerSlot",
                Priority::Critical,
                format!("{person} has {count} assignments on {date:?}/{period:?}"),
            )
            .with_person(person)
        })
        .collect()
}

fn validate_clinic_headcount(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    let mut per_slot: HashMap<(chrono::NaiveDate, crate::model::Period), u32> = HashMap::new();
    for a in assignments.iter().filter(|a| a.activity == ActivityCode::FmClinic) {
        *per_slot.entry((a.slot.date, a.slot.period)).or_insert(0) += 1;
    }
    per_slot
        .into_iter()
        .filter(|(_, count)| *count > ctx.config.clinic_headcount_cap)
        .map(|((date, period), count)| {
            Violation::new(
                "ClinicHeadcountCap",
                Priority::Critical,
                format!("{date:?}/{period:?} has {count} in clinic, cap {}", ctx.config.clinic_headcount_cap),
            )
        })
        .collect()
}

/// Slides a 28-day window over every day a person has an assignment in
/// range and checks `sum * hours_per_half_day <= max_hours_per_window`
/// (spec §4.8, §8 item 8).
fn validate_eighty_hour(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut by_person: HashMap<crate::model::PersonId, Vec<chrono::NaiveDate>> = HashMap::new();
    for a in assignments {
        by_person.entry(a.person).or_default().push(a.slot.date);
    }
    for (person, mut dates) in by_person {
        dates.sort();
        dates.dedup();
        if dates.is_empty() {
            continue;
        }
        let first = dates[0];
        let last = *dates.last().unwrap();
        let mut window_start = first;
        while window_start <= last {
            let window_end = window_start + chrono::Duration::days(ctx.config.hours_window_days - 1);
            let count = assignments
                .iter()
                .filter(|a| a.person == person && a.slot.date >= window_start && a.slot.date <= window_end)
                .count();
            let hours = count as f64 * ctx.config.hours_per_half_day;
            if hours > ctx.config.max_hours_per_window {
                violations.push(
                    Violation::new(
                        "EightyHourRule",
                        Priority::Critical,
                        format!(
                            "{person} window starting {window_start} totals {hours}h, excess {}h",
                            hours - ctx.config.max_hours_per_window
                        ),
                    )
                    .with_person(person),
                );
            }
            window_start += chrono::Duration::days(1);
        }
    }
    violations
}

/// For each person, each 7-day window must contain at least one fully
/// unassigned calendar day (spec §4.8, §8 item 9).
fn validate_one_in_seven(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut by_person: HashMap<crate::model::PersonId, std::collections::HashSet<chrono::NaiveDate>> =
        HashMap::new();
    for a in assignments {
        by_person.entry(a.person).or_default().insert(a.slot.date);
    }
    for (person, occupied_days) in by_person {
        let mut days: Vec<_> = occupied_days.iter().copied().collect();
        days.sort();
        if days.is_empty() {
            continue;
        }
        let first = days[0];
        let last = *days.last().unwrap();
        let mut window_start = first;
        while window_start <= last {
            let window_end = window_start + chrono::Duration::days(ctx.config.rest_window_days - 1);
            let has_off_day = (0..ctx.config.rest_window_days).any(|offset| {
                let day = window_start + chrono::Duration::days(offset);
                !occupied_days.contains(&day)
            });
            if !has_off_day {
                violations.push(
                    Violation::new(
                        "OneInSevenRule",
                        Priority::Critical,
                        format!("{person} has no off day in window {window_start}..={window_end}"),
                    )
                    .with_person(person),
                );
            }
            window_start += chrono::Duration::days(1);
        }
    }
    violations
}

/// Rolling-window relaxation of the one-in-seven rule for the LP backend:
/// over every `rest_window_days`-day window, caps each person's assigned
/// half-days at one less than the window's slot count. This guarantees at
/// least one free half-day slot per window rather than the exact "one fully
/// unassigned calendar day" the validator checks post-hoc; linearizing the
/// exact day-off disjunction would need one auxiliary binary per day, which
/// `LpModel` does not expose.
fn encode_one_in_seven_lp(model: &mut dyn LpModel, ctx: &SchedulingContext) {
    let mut dates: Vec<chrono::NaiveDate> = ctx.slots.iter().map(|s| s.date).collect();
    dates.sort();
    dates.dedup();
    if dates.is_empty() {
        return;
    }
    let first = dates[0];
    let last = *dates.last().unwrap();
    let mut window_start = first;
    while window_start <= last {
        let window_end = window_start + chrono::Duration::days(ctx.config.rest_window_days - 1);
        let window_slots: Vec<crate::model::Slot> = ctx
            .slots
            .iter()
            .filter(|s| s.date >= window_start && s.date <= window_end)
            .copied()
            .collect();
        if window_slots.len() < 2 {
            window_start += chrono::Duration::days(1);
            continue;
        }
        for person in &ctx.people {
            let terms: Vec<(Decision, f64)> = window_slots
                .iter()
                .map(|s| {
                    (
                        Decision {
                            person: person.id,
                            slot: *s,
                            activity: ActivityCode::FmClinic,
                        },
                        1.0,
                    )
                })
                .collect();
            model.add_le(&terms, (window_slots.len() - 1) as f64);
        }
        window_start += chrono::Duration::days(1);
    }
}

fn validate_supervision(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut clinic_by_slot: HashMap<(chrono::NaiveDate, crate::model::Period), Vec<&Assignment>> =
        HashMap::new();
    for a in assignments.iter().filter(|a| a.activity == ActivityCode::FmClinic) {
        clinic_by_slot.entry((a.slot.date, a.slot.period)).or_default().push(a);
    }
    for ((date, period), group) in clinic_by_slot {
        let mut n_pgy1 = 0u32;
        let mut n_pgy2 = 0u32;
        let mut n_pgy3 = 0u32;
        let mut n_faculty = 0u32;
        for a in &group {
            let Some(person) = ctx.person(a.person) else { continue };
            match person.role {
                Role::ResidentPgy1 => n_pgy1 += 1,
                Role::ResidentPgy2 => n_pgy2 += 1,
                Role::ResidentPgy3 => n_pgy3 += 1,
                _ => {}
            }
            if person.role.is_faculty() {
                n_faculty += 1;
            }
        }
        let required = div_ceil(n_pgy1, 2) + div_ceil(n_pgy2, 4) + div_ceil(n_pgy3, 4);
        if required > n_faculty {
            violations.push(Violation::new(
                "SupervisionRatios",
                Priority::Critical,
                format!("{date}/{period:?} requires {required} AT faculty, has {n_faculty}"),
            ));
        }
    }
    violations
}

fn div_ceil(a: u32, b: u32) -> u32 {
    if a == 0 {
        0
    } else {
        (a + b - 1) / b
    }
}

fn validate_wed_am_intern_only(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    assignments
        .iter()
        .filter(|a| {
            a.activity == ActivityCode::FmClinic
                && a.slot.period == crate::model::Period::Am
                && a.slot.date.weekday() == chrono::Weekday::Wed
        })
        .filter_map(|a| {
            let person = ctx.person(a.person)?;
            if person.role != Role::ResidentPgy1 {
                Some(
                    Violation::new(
                        "WednesdayAmInternOnly",
                        Priority::Critical,
                        format!("{} is not PGY1 but has Wed AM clinic", a.person),
                    )
                    .with_person(a.person)
                    .with_slot(a.slot),
                )
            } else {
                None
            }
        })
        .collect()
}

fn validate_wed_pm_single_faculty(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut by_date: HashMap<chrono::NaiveDate, u32> = HashMap::new();
    for a in assignments.iter().filter(|a| {
        a.activity == ActivityCode::FmClinic
            && a.slot.period == crate::model::Period::Pm
            && a.slot.date.weekday() == chrono::Weekday::Wed
    }) {
        if ctx.person(a.person).map(|p| p.role.is_faculty()).unwrap_or(false) {
            *by_date.entry(a.slot.date).or_insert(0) += 1;
        }
    }
    for (date, count) in by_date {
        if count != 1 {
            violations.push(Violation::new(
                "WednesdayPmSingleFaculty",
                Priority::Critical,
                format!("{date} has {count} faculty in Wed PM clinic, expected exactly 1"),
            ));
        }
    }
    violations
}

fn validate_weekly_clinic_bounds(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut per_person_week: HashMap<(crate::model::PersonId, chrono::IsoWeek), u32> = HashMap::new();
    for a in assignments.iter().filter(|a| a.activity == ActivityCode::FmClinic) {
        let Some(person) = ctx.person(a.person) else { continue };
        if !person.role.is_faculty() {
            continue;
        }
        *per_person_week.entry((a.person, a.slot.date.iso_week())).or_insert(0) += 1;
    }
    for ((person_id, _week), count) in per_person_week {
        let Some(person) = ctx.person(person_id) else { continue };
        let bounds = person.clinic_bounds;
        if count < bounds.min_c || count > bounds.max_c {
            violations.push(
                Violation::new(
                    "FacultyWeeklyClinicBounds",
                    Priority::Critical,
                    format!(
                        "{person_id} has {count} clinic half-days, bounds [{}, {}]",
                        bounds.min_c, bounds.max_c
                    ),
                )
                .with_person(person_id),
            );
        }
    }
    violations
}

fn validate_faculty_day_availability(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    assignments
        .iter()
        .filter(|a| a.activity == ActivityCode::FmClinic)
        .filter_map(|a| {
            let person = ctx.person(a.person)?;
            if person.role.is_faculty() && !person.weekday_availability.on(a.slot.date.weekday()) {
                Some(
                    Violation::new(
                        "FacultyDayAvailability",
                        Priority::Critical,
                        format!("{} assigned clinic on unavailable weekday {:?}", a.person, a.slot.date.weekday()),
                    )
                    .with_person(a.person)
                    .with_slot(a.slot),
                )
            } else {
                None
            }
        })
        .collect()
}

fn validate_overnight_call_coverage(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut call_nights: HashMap<chrono::NaiveDate, u32> = HashMap::new();
    for a in assignments.iter().filter(|a| a.activity == ActivityCode::Call) {
        *call_nights.entry(a.slot.date).or_insert(0) += 1;
    }
    let dates: std::collections::BTreeSet<_> = ctx.slots.iter().map(|s| s.date).collect();
    for date in dates {
        if !ctx.calendar.overnight_call_days(date) {
            continue;
        }
        let count = call_nights.get(&date).copied().unwrap_or(0);
        if count != 1 {
            violations.push(Violation::new(
                "OvernightCallCoverage",
                Priority::Critical,
                format!("{date} has {count} call assignments, expected exactly 1"),
            ));
        }
    }
    violations
}

fn validate_adjunct_call_exclusion(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    assignments
        .iter()
        .filter(|a| a.activity == ActivityCode::Call)
        .filter_map(|a| {
            let person = ctx.person(a.person)?;
            if person.role.is_adjunct() {
                Some(
                    Violation::new(
                        "AdjunctCallExclusion",
                        Priority::Critical,
                        format!("adjunct faculty {} assigned call", a.person),
                    )
                    .with_person(a.person)
                    .with_slot(a.slot),
                )
            } else {
                None
            }
        })
        .collect()
}

fn validate_call_availability(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    assignments
        .iter()
        .filter(|a| a.activity == ActivityCode::Call && ctx.availability.avail(a.person, &a.slot).is_blocked())
        .map(|a| {
            Violation::new(
                "CallAvailability",
                Priority::Critical,
                format!("{} assigned call while blocked", a.person),
            )
            .with_person(a.person)
            .with_slot(a.slot)
        })
        .collect()
}

fn validate_fmit_mandatory_call(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let fmit_by_week: HashMap<(crate::model::PersonId, chrono::NaiveDate), ()> = assignments
        .iter()
        .filter(|a| a.activity == ActivityCode::Fmit)
        .map(|a| ((a.person, a.slot.fmit_week_id), ()))
        .collect();
    for (person, friday) in fmit_by_week.keys() {
        let saturday = *friday + chrono::Duration::days(1);
        for night in [*friday, saturday] {
            let has_call = assignments
                .iter()
                .any(|a| a.person == *person && a.slot.date == night && a.activity == ActivityCode::Call);
            if !has_call {
                violations.push(
                    Violation::new(
                        "FmitMandatoryFriSatCall",
                        Priority::Critical,
                        format!("{person} on FMIT week of {friday} missing call on {night}"),
                    )
                    .with_person(*person),
                );
            }
        }
    }
    let _ = ctx;
    violations
}

fn validate_post_fmit_recovery(assignments: &[Assignment], _ctx: &SchedulingContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let fmit_weeks: std::collections::HashSet<(crate::model::PersonId, chrono::NaiveDate)> = assignments
        .iter()
        .filter(|a| a.activity == ActivityCode::Fmit)
        .map(|a| (a.person, a.slot.fmit_week_id))
        .collect();
    for (person, friday) in &fmit_weeks {
        let next_friday = *friday + chrono::Duration::days(7);
        let has_assignment = assignments
            .iter()
            .any(|a| a.person == *person && a.slot.date == next_friday);
        if has_assignment {
            violations.push(
                Violation::new(
                    "PostFmitRecovery",
                    Priority::Critical,
                    format!("{person} has an assignment on post-FMIT Friday {next_friday}"),
                )
                .with_person(*person),
            );
        }
    }
    violations
}

fn validate_post_fmit_sunday(assignments: &[Assignment], _ctx: &SchedulingContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let fmit_weeks: std::collections::HashSet<(crate::model::PersonId, chrono::NaiveDate)> = assignments
        .iter()
        .filter(|a| a.activity == ActivityCode::Fmit)
        .map(|a| (a.person, a.slot.fmit_week_id))
        .collect();
    for (person, friday) in &fmit_weeks {
        let next_sunday = *friday + chrono::Duration::days(9);
        let has_call = assignments.iter().any(|a| {
            a.person == *person && a.slot.date == next_sunday && a.activity == ActivityCode::Call
        });
        if has_call {
            violations.push(
                Violation::new(
                    "PostFmitSundayBlock",
                    Priority::Critical,
                    format!("{person} assigned call on post-FMIT Sunday {next_sunday}"),
                )
                .with_person(*person),
            );
        }
    }
    violations
}

fn validate_post_call_pcat_do(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    for a in assignments
        .iter()
        .filter(|a| a.activity == ActivityCode::Call && ctx.calendar.overnight_call_days(a.slot.date))
    {
        let next_day = a.slot.date + chrono::Duration::days(1);
        let has_pcat = assignments.iter().any(|o| {
            o.person == a.person
                && o.slot.date == next_day
                && o.slot.period == crate::model::Period::Am
                && o.activity == ActivityCode::Pcat
        });
        let has_do = assignments.iter().any(|o| {
            o.person == a.person
                && o.slot.date == next_day
                && o.slot.period == crate::model::Period::Pm
                && o.activity == ActivityCode::Do
        });
        if !has_pcat || !has_do {
            violations.push(
                Violation::new(
                    "PostCallPcatDo",
                    Priority::Critical,
                    format!("{} call on {} missing PCAT/DO on {next_day}", a.person, a.slot.date),
                )
                .with_person(a.person)
                .with_slot(a.slot),
            );
        }
    }
    violations
}

fn validate_sm_alignment(_assignments: &[Assignment], _ctx: &SchedulingContext) -> Vec<Violation> {
    // SM rotation cohabitation is enforced entirely at preload time (spec
    // §4.3 phase 7); nothing remains to check post-hoc beyond the
    // availability/capacity rules already covered above.
    Vec::new()
}

fn validate_protected_slots(assignments: &[Assignment]) -> Vec<Violation> {
    assignments
        .iter()
        .filter(|a| {
            a.slot.date.weekday() == chrono::Weekday::Wed
                && a.slot.period == crate::model::Period::Pm
                && a.activity != ActivityCode::Lec
                && a.source == crate::model::AssignmentSource::Solver
        })
        .map(|a| {
            Violation::new(
                "ProtectedSlots",
                Priority::Critical,
                format!("solver wrote over protected Wed PM slot for {}", a.person),
            )
            .with_person(a.person)
            .with_slot(a.slot)
        })
        .collect()
}

fn validate_fmit_staffing_floor(assignments: &[Assignment], ctx: &SchedulingContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    let total_call_eligible = ctx.call_eligible_people().count() as f64;
    if total_call_eligible == 0.0 {
        return violations;
    }
    let mut fmit_by_date: HashMap<chrono::NaiveDate, u32> = HashMap::new();
    for a in assignments.iter().filter(|a| a.activity == ActivityCode::Fmit) {
        *fmit_by_date.entry(a.slot.date).or_insert(0) += 1;
    }
    for (date, on_fmit) in fmit_by_date {
        let available = total_call_eligible - on_fmit as f64;
        if available < ctx.config.fmit_staffing_floor as f64 {
            violations.push(Violation::new(
                "FmitStaffingFloor",
                Priority::Critical,
                format!("{date} leaves only {available} call-eligible faculty, floor {}", ctx.config.fmit_staffing_floor),
            ));
        }
        if on_fmit as f64 / total_call_eligible > ctx.config.fmit_simultaneous_fraction {
            violations.push(Violation::new(
                "FmitStaffingFloor",
                Priority::Critical,
                format!("{date} has {on_fmit} on FMIT, exceeding {}% of faculty", ctx.config.fmit_simultaneous_fraction * 100.0),
            ));
        }
    }
    violations
}
