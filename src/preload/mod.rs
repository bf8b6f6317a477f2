//! Preload Pipeline (C3): the seven ordered phases that collect immutable
//! half-day assignments and write them with `source=preload` (spec §4.3).
//!
//! `run` is deterministic and idempotent; running it twice over the same
//! inputs produces the same set. Two phases must never target the same
//! `(person, slot)` — a conflict is a hard [`SchedulingError`] surfaced to
//! the engine, never silently dropped (spec §4.3 contract).

mod phases;

use crate::error::SchedulingError;
use crate::model::{Assignment, AssignmentSource, PersonId, Slot};
use std::collections::HashMap;

pub use phases::*;

/// Raw inputs the pipeline phases read from source-of-truth tables. In a
/// full deployment these would be repository queries; the core takes them
/// as plain data so the pipeline stays a pure function of its inputs.
#[derive(Debug, Clone, Default)]
pub struct PreloadInputs {
    pub absences: Vec<crate::availability::AbsenceRecord>,
    pub inpatient_rotations: Vec<InpatientRotationAssignment>,
    pub fmit_assignments: Vec<FmitAssignment>,
    pub resident_call: Vec<ResidentCallAssignment>,
    pub faculty_call: Vec<FacultyCallAssignment>,
    pub sm_rotation_faculty: Vec<PersonId>,
    pub sm_rotation_residents: Vec<PersonId>,
}

/// Runs all seven ordered phases against `inputs` and the slots/calendar in
/// `ctx_slots`, returning the combined preload set or the first conflict
/// encountered.
pub fn run(
    inputs: &PreloadInputs,
    slots: &[Slot],
    calendar: &crate::calendar::Calendar,
) -> Result<Vec<Assignment>, SchedulingError> {
    let mut seen: HashMap<(PersonId, chrono::NaiveDate, crate::model::Period), ()> = HashMap::new();
    let mut out = Vec::new();

    let mut insert = |out: &mut Vec<Assignment>, a: Assignment| -> Result<(), SchedulingError> {
        let key = (a.person, a.slot.date, a.slot.period);
        if seen.contains_key(&key) {
            return Err(SchedulingError::preload_conflict(a.person, a.slot));
        }
        seen.insert(key, ());
        out.push(a);
        Ok(())
    };

    for a in phases::absences_phase(&inputs.absences, slots) {
        insert(&mut out, a)?;
    }
    for a in phases::inpatient_rotations_phase(&inputs.inpatient_rotations, slots) {
        insert(&mut out, a)?;
    }
    for a in phases::fmit_call_phase(&inputs.fmit_assignments, calendar) {
        insert(&mut out, a)?;
    }
    for a in phases::inpatient_continuity_clinic_phase(&inputs.fmit_assignments, calendar) {
        insert(&mut out, a)?;
    }
    for a in phases::resident_call_phase(&inputs.resident_call) {
        insert(&mut out, a)?;
    }
    for a in phases::faculty_call_phase(&inputs.faculty_call, calendar) {
        insert(&mut out, a)?;
    }
    for a in phases::sports_medicine_clinic_phase(
        &inputs.sm_rotation_faculty,
        &inputs.fmit_assignments,
        slots,
    ) {
        insert(&mut out, a)?;
    }

    let _ = AssignmentSource::Preload;
    Ok(out)
}
