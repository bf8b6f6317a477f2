//! Calendar Service (C1): civil date <-> academic block / FMIT week mapping.
//!
//! Pure functions only, per spec §4.1. Block boundaries never drive inter-
//! block effects directly; every caller wanting a post-call or post-FMIT
//! consequence computes it from absolute dates (spec §9 "Date arithmetic").

use crate::config::Block0Policy;
use crate::model::{Period, Slot};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub const BLOCK_LENGTH_DAYS: i64 = 28;
pub const BLOCKS_PER_YEAR: u32 = 13;

/// Identifies an academic year by its starting calendar year: AY 2025-26 is
/// `AcademicYear(2025)`, running July 1 2025 through June 30 2026.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AcademicYear(pub i32);

impl AcademicYear {
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= 7 {
            AcademicYear(date.year())
        } else {
            AcademicYear(date.year() - 1)
        }
    }

    pub fn start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, 7, 1).expect("valid July 1")
    }

    pub fn end(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0 + 1, 6, 30).expect("valid June 30")
    }
}

/// Calendar service. Carries only the Block-0 policy: everything else is
/// pure date arithmetic and needs no other state.
#[derive(Debug, Clone, Copy)]
pub struct Calendar {
    pub block0_policy: Block0Policy,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            block0_policy: Block0Policy::RollForward,
        }
    }
}

impl Calendar {
    pub fn new(block0_policy: Block0Policy) -> Self {
        Self { block0_policy }
    }

    /// Build the `Slot` for a given date/period, including its derived
    /// attributes.
    pub fn slot_for(&self, date: NaiveDate, period: Period) -> Slot {
        let ay = AcademicYear::containing(date);
        let (block_number, block_half) = self.block_and_half_of(date, ay);
        let fmit_week_id = self.fmit_week_of(date).0;
        Slot {
            date,
            period,
            block_number,
            block_half,
            fmit_week_id,
            is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
            is_holiday: false,
        }
    }

    /// The academic block number containing `date` (0 for the Block-0 gap,
    /// if active; 1..=13 otherwise).
    pub fn block_of(&self, date: NaiveDate) -> u32 {
        self.block_and_half_of(date, AcademicYear::containing(date)).0
    }

    fn block_and_half_of(&self, date: NaiveDate, ay: AcademicYear) -> (u32, u8) {
        let ay_start = ay.start();
        if date < ay_start {
            // Belongs to the previous academic year's tail (Block 13 remainder).
            let prev = AcademicYear(ay.0 - 1);
            return self.block_and_half_of(date, prev);
        }
        let days_since_start = (date - ay_start).num_days();

        let block0_len = self.block0_length(ay);
        if self.block0_policy == Block0Policy::RollForward && days_since_start < block0_len {
            return (0, 1);
        }
        let offset = if self.block0_policy == Block0Policy::RollForward {
            days_since_start - block0_len
        } else {
            days_since_start
        };

        let block_index = (offset / BLOCK_LENGTH_DAYS) as u32;
        if block_index >= BLOCKS_PER_YEAR - 1 {
            // Block 13 absorbs the remainder (28-35 days).
            let day_in_block = offset - (BLOCKS_PER_YEAR as i64 - 1) * BLOCK_LENGTH_DAYS;
            let half = if day_in_block < BLOCK_LENGTH_DAYS / 2 { 1 } else { 2 };
            (BLOCKS_PER_YEAR, half)
        } else {
            let day_in_block = offset % BLOCK_LENGTH_DAYS;
            let half = if day_in_block < BLOCK_LENGTH_DAYS / 2 { 1 } else { 2 };
            (block_index + 1, half)
        }
    }

    /// Length, in days, of the Block-0 gap between July 1 and the first
    /// weekday start of Block 1. Variable (1-6 days); approximated here as
    /// the number of days until the following Monday (the common weekday
    /// start convention), clamped to the 1-6 day range the spec allows.
    fn block0_length(&self, ay: AcademicYear) -> i64 {
        if self.block0_policy != Block0Policy::RollForward {
            return 0;
        }
        let start = ay.start();
        let days_to_monday = match start.weekday() {
            Weekday::Mon => 0,
            other => (7 - other.num_days_from_monday() as i64) % 7,
        };
        days_to_monday.clamp(0, 6)
    }

    /// The inclusive `(start, end)` date range of `block_number` within `ay`.
    pub fn block_range(&self, block_number: u32, ay: AcademicYear) -> (NaiveDate, NaiveDate) {
        assert!(block_number >= 1 && block_number <= BLOCKS_PER_YEAR, "block out of range");
        let block0_len = self.block0_length(ay);
        let base = ay.start() + Duration::days(block0_len);
        let start = base + Duration::days((block_number as i64 - 1) * BLOCK_LENGTH_DAYS);
        let end = if block_number == BLOCKS_PER_YEAR {
            ay.end()
        } else {
            start + Duration::days(BLOCK_LENGTH_DAYS - 1)
        };
        (start, end)
    }

    /// The Friday-Thursday FMIT week containing `date`, as `(friday, thursday)`.
    /// Independent of block boundaries (spec §4.1).
    pub fn fmit_week_of(&self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        let days_since_friday = (date.weekday().num_days_from_monday() as i64 + 3) % 7;
        let friday = date - Duration::days(days_since_friday);
        (friday, friday + Duration::days(6))
    }

    /// True for Sun-Thu, the nights that carry overnight call (spec §4.1).
    pub fn overnight_call_days(&self, date: NaiveDate) -> bool {
        matches!(
            date.weekday(),
            Weekday::Sun | Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cal() -> Calendar {
        Calendar::new(Block0Policy::RollForward)
    }

    #[test]
    fn academic_year_containing_before_july_is_prior_year() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(AcademicYear::containing(d).0, 2025);
    }

    #[test]
    fn academic_year_containing_on_or_after_july_is_same_year() {
        let d = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert_eq!(AcademicYear::containing(d).0, 2025);
    }

    #[test]
    fn block_range_round_trips_for_every_block() {
        let c = cal();
        let ay = AcademicYear(2025);
        for b in 1..=13u32 {
            let (start, _end) = c.block_range(b, ay);
            let slot = c.slot_for(start, Period::Am);
            assert_eq!(slot.block_number, b, "block {b} did not round-trip");
        }
    }

    #[test]
    fn block_13_absorbs_the_remainder() {
        let c = cal();
        let ay = AcademicYear(2025);
        let (start, end) = c.block_range(13, ay);
        let len = (end - start).num_days() + 1;
        assert!((28..=35).contains(&len), "block 13 length {len} out of range");
        assert_eq!(end, ay.end());
    }

    #[test]
    fn fmit_week_round_trips_for_any_day_in_the_week() {
        let c = cal();
        let friday = NaiveDate::from_ymd_opt(2026, 4, 3).unwrap();
        for offset in 0..7 {
            let d = friday + Duration::days(offset);
            let (f, th) = c.fmit_week_of(d);
            assert_eq!(f, friday);
            assert_eq!(th, friday + Duration::days(6));
            assert!(d >= f && d <= th);
        }
    }

    #[test]
    fn overnight_call_days_are_sun_thu() {
        let c = cal();
        let sun = NaiveDate::from_ymd_opt(2026, 4, 5).unwrap();
        assert!(c.overnight_call_days(sun));
        let fri = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();
        assert!(!c.overnight_call_days(fri));
        let sat = NaiveDate::from_ymd_opt(2026, 4, 11).unwrap();
        assert!(!c.overnight_call_days(sat));
    }

    #[test]
    fn a_calendar_year_produces_730_to_732_slots() {
        let c = cal();
        for year in [2024, 2025, 2026] {
            let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
            let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap();
            let days = (end - start).num_days() + 1;
            let slots = days * 2;
            assert!((730..=732).contains(&slots), "year {year} had {slots} slots");
            // exercise slot_for across the full range to ensure it never panics
            let mut d = start;
            while d <= end {
                let _ = c.slot_for(d, Period::Am);
                let _ = c.slot_for(d, Period::Pm);
                d += Duration::days(1);
            }
        }
    }
}
