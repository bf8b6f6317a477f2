//! Availability Matrix (C2): derives `available / partial / blocked` for
//! every `(person, slot)` pair from absence records, FMIT assignment, and
//! rotation-based unavailability.

use crate::model::{ActivityCode, PersonId, Slot};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Classification of an absence record (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsenceType {
    Deployment,
    Tdy,
    ExtendedMedical,
    Fmit,
    NightFloat,
    OffsiteRotation,
    Vacation,
    Conference,
    Meeting,
}

impl AbsenceType {
    /// Blocking absences make the slot wholly unavailable; partial ones
    /// allow a replacement activity (spec §4.2).
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            AbsenceType::Deployment
                | AbsenceType::Tdy
                | AbsenceType::ExtendedMedical
                | AbsenceType::Fmit
                | AbsenceType::NightFloat
                | AbsenceType::OffsiteRotation
        )
    }
}

/// A raw absence record as read from source-of-truth tables. FMIT and
/// rotation-based unavailability are derived elsewhere and must not be
/// entered here (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsenceRecord {
    pub person: PersonId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub kind: AbsenceType,
}

/// Availability verdict for one `(person, slot)` pair (spec §3 "Availability
/// entry").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Partial(ActivityCode),
    Blocked,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Availability::Blocked)
    }
}

/// Precomputed, O(1)-queryable availability for every `(person, slot)` pair
/// observed at construction time. Cached per run (spec §3).
#[derive(Debug, Clone, Default)]
pub struct AvailabilityMatrix {
    entries: HashMap<(PersonId, NaiveDate, crate::model::Period), Availability>,
}

impl AvailabilityMatrix {
    /// Build the matrix from absence records and any blocking activities
    /// already preloaded (e.g. FMIT, night-float). `preloaded_blocking`
    /// enumerates `(person, slot)` pairs carrying a blocking preload; the
    /// matrix used by the solver must report these as `Blocked` (spec §4.2
    /// invariant).
    pub fn build(
        absences: &[AbsenceRecord],
        slots: &[Slot],
        preloaded_blocking: &[(PersonId, Slot)],
    ) -> Self {
        let mut entries = HashMap::new();

        for absence in absences {
            let mut day = absence.start;
            while day <= absence.end {
                for slot in slots.iter().filter(|s| s.date == day) {
                    let key = (absence.person, slot.date, slot.period);
                    let verdict = if absence.kind.is_blocking() {
                        Availability::Blocked
                    } else {
                        Availability::Partial(partial_replacement(absence.kind))
                    };
                    entries.insert(key, verdict);
                }
                day += chrono::Duration::days(1);
            }
        }

        for (person, slot) in preloaded_blocking {
            entries.insert((*person, slot.date, slot.period), Availability::Blocked);
        }

        Self { entries }
    }

    /// `avail(person, slot)`, defaulting to `Available` when no record
    /// applies (spec §4.2 contract).
    pub fn avail(&self, person: PersonId, slot: &Slot) -> Availability {
        self.entries
            .get(&(person, slot.date, slot.period))
            .copied()
            .unwrap_or(Availability::Available)
    }
}

fn partial_replacement(kind: AbsenceType) -> ActivityCode {
    match kind {
        AbsenceType::Vacation | AbsenceType::Conference | AbsenceType::Meeting => ActivityCode::LvAm,
        _ => ActivityCode::Off,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use crate::config::Block0Policy;
    use crate::model::Period;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn blocking_absence_blocks_both_periods() {
        let cal = Calendar::new(Block0Policy::RollForward);
        let d = date(2026, 4, 6);
        let slots = vec![cal.slot_for(d, Period::Am), cal.slot_for(d, Period::Pm)];
        let person = PersonId::new(1);
        let absences = vec![AbsenceRecord {
            person,
            start: d,
            end: d,
            kind: AbsenceType::Deployment,
        }];
        let matrix = AvailabilityMatrix::build(&absences, &slots, &[]);
        assert!(matrix.avail(person, &slots[0]).is_blocked());
        assert!(matrix.avail(person, &slots[1]).is_blocked());
    }

    #[test]
    fn partial_absence_yields_replacement_activity() {
        let cal = Calendar::new(Block0Policy::RollForward);
        let d = date(2026, 4, 6);
        let slots = vec![cal.slot_for(d, Period::Am)];
        let person = PersonId::new(1);
        let absences = vec![AbsenceRecord {
            person,
            start: d,
            end: d,
            kind: AbsenceType::Vacation,
        }];
        let matrix = AvailabilityMatrix::build(&absences, &slots, &[]);
        match matrix.avail(person, &slots[0]) {
            Availability::Partial(_) => {}
            other => panic!("expected Partial, got {other:?}"),
        }
    }

    #[test]
    fn unrecorded_slot_defaults_to_available() {
        let cal = Calendar::new(Block0Policy::RollForward);
        let d = date(2026, 4, 6);
        let slot = cal.slot_for(d, Period::Am);
        let matrix = AvailabilityMatrix::build(&[], &[slot], &[]);
        assert!(matrix.avail(PersonId::new(2), &slot).is_available());
    }

    #[test]
    fn preloaded_blocking_activity_forces_blocked() {
        let cal = Calendar::new(Block0Policy::RollForward);
        let d = date(2026, 4, 6);
        let slot = cal.slot_for(d, Period::Am);
        let person = PersonId::new(3);
        let matrix = AvailabilityMatrix::build(&[], &[slot], &[(person, slot)]);
        assert!(matrix.avail(person, &slot).is_blocked());
    }
}
