//! The data model (spec §3): people, slots, templates, rotations,
//! assignments, runs, and the fixed activity-code enumeration.

mod ids;

pub use ids::{ConstraintId, PersonId, RunId, TemplateId};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A person's role in the program. Military rank (`rank`) is optional and
/// only meaningful for calibration, not eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ResidentPgy1,
    ResidentPgy2,
    ResidentPgy3,
    FacultyPd,
    FacultyApd,
    FacultyOic,
    FacultyDeptChief,
    FacultySportsMed,
    FacultyCore,
    FacultyAdjunct,
}

impl Role {
    pub fn is_resident(&self) -> bool {
        matches!(self, Role::ResidentPgy1 | Role::ResidentPgy2 | Role::ResidentPgy3)
    }

    pub fn is_faculty(&self) -> bool {
        !self.is_resident()
    }

    pub fn is_adjunct(&self) -> bool {
        matches!(self, Role::FacultyAdjunct)
    }
}

/// Weekly clinic bounds for a faculty person: `(min_c, max_c)` per spec §3,
/// §4.4 "Faculty weekly clinic bounds". `min_c` may be globally overridden
/// to 0 (spec §4.4); that override is applied by the constraint, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClinicBounds {
    pub min_c: u32,
    pub max_c: u32,
}

/// Per-weekday availability flags, Monday through Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayAvailability {
    pub mon: bool,
    pub tue: bool,
    pub wed: bool,
    pub thu: bool,
    pub fri: bool,
    pub sat: bool,
    pub sun: bool,
}

impl Default for WeekdayAvailability {
    fn default() -> Self {
        Self {
            mon: true,
            tue: true,
            wed: true,
            thu: true,
            fri: true,
            sat: true,
            sun: true,
        }
    }
}

impl WeekdayAvailability {
    pub fn on(&self, weekday: chrono::Weekday) -> bool {
        use chrono::Weekday::*;
        match weekday {
            Mon => self.mon,
            Tue => self.tue,
            Wed => self.wed,
            Thu => self.thu,
            Fri => self.fri,
            Sat => self.sat,
            Sun => self.sun,
        }
    }
}

/// Identity, role, and scheduling attributes for a program member. Created
/// externally; the core treats it as read-only (spec §3 "Lifecycle").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub role: Role,
    pub rank: Option<String>,
    pub clinic_bounds: ClinicBounds,
    pub weekday_availability: WeekdayAvailability,
    pub credentialed_procedures: BTreeSet<String>,
    pub excluded_procedures: BTreeSet<String>,
    /// Per-person Tuesday call preference (spec §4.4 "Call: Tuesday preference").
    pub prefers_tuesday_call: Option<bool>,
}

impl Person {
    pub fn is_call_eligible_role(&self) -> bool {
        self.role.is_faculty() && !self.role.is_adjunct()
    }
}

/// AM/PM half-day period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Am,
    Pm,
}

/// A half-day slot with derived calendar attributes (spec §3 "Slot").
/// Exactly 2 slots exist per calendar day; built by [`crate::calendar::Calendar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub period: Period,
    pub block_number: u32,
    pub block_half: u8,
    pub fmit_week_id: NaiveDate,
    pub is_weekend: bool,
    pub is_holiday: bool,
}

/// Coarse rotation family; only `Outpatient` rotations are solver-eligible
/// (spec §3 "RotationTemplate" invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationType {
    Outpatient,
    Inpatient,
    Off,
    Education,
    Absence,
    Recovery,
}

/// Week-boundary convention a template's activities are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStructure {
    /// Friday through Thursday, the FMIT week convention.
    FridayThursday,
    /// Monday through Sunday, the ordinary calendar week.
    MondaySunday,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationTemplate {
    pub id: TemplateId,
    pub short_code: String,
    pub long_name: String,
    pub rotation_type: RotationType,
    pub calendar_mode: crate::config::CalendarMode,
    pub is_solver_eligible: bool,
    pub is_block_half_rotation: bool,
    pub week_structure: Option<WeekStructure>,
    pub min_activities_per_week: Option<u32>,
    pub max_activities_per_week: Option<u32>,
}

impl RotationTemplate {
    /// Spec §3 invariant: only `outpatient` rotations are solver-eligible.
    pub fn invariant_holds(&self) -> bool {
        self.is_solver_eligible == matches!(self.rotation_type, RotationType::Outpatient)
    }
}

/// `(person, block_number, academic_year, block_half?) -> template` mapping
/// produced by Phase 1 of generation or externally (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResidentBlockRotation {
    pub person: PersonId,
    pub block_number: u32,
    pub academic_year: i32,
    pub block_half: Option<u8>,
    pub template: TemplateId,
}

/// Source of an assignment, in ascending priority order (spec §3):
/// `preload > manual > solver > template`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentSource {
    Template = 0,
    Solver = 1,
    Manual = 2,
    Preload = 3,
}

/// The fixed activity-code enumeration (spec §6 "Activity code space").
/// Ad-hoc codes are rejected: every assignment must carry one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCode {
    // Clinical
    FmClinic,
    Specialty,
    Call,
    Fmit,
    Nf,
    PedW,
    PedNf,
    Kap,
    Im,
    LdNf,
    SmClinic,
    // Educational
    Lec,
    Conf,
    Sim,
    // Time-off
    Off,
    Recovery,
    W,
    Hol,
    LvAm,
    LvPm,
    // Administrative
    Gme,
    Dfm,
    At,
    Pcat,
    Do,
    Dep,
    Flx,
    Adm,
}

impl ActivityCode {
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            ActivityCode::Fmit
                | ActivityCode::Nf
                | ActivityCode::PedW
                | ActivityCode::PedNf
                | ActivityCode::Kap
                | ActivityCode::Im
                | ActivityCode::LdNf
                | ActivityCode::LvAm
                | ActivityCode::LvPm
        )
    }
}

/// The role a person plays in a given assignment, distinct from their
/// program `Role` (spec §4.7 "Faculty supervision pass" introduces
/// `role=supervising`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentRole {
    Primary,
    Supervising,
}

/// `(person, slot) -> activity`, with source and audit fields (spec §3).
/// At most one assignment may exist per `(person, slot)` (uniqueness).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub person: PersonId,
    pub slot: Slot,
    pub activity: ActivityCode,
    pub source: AssignmentSource,
    pub role: AssignmentRole,
    pub template: Option<TemplateId>,
    pub override_actor: Option<String>,
    pub override_reason: Option<String>,
}

impl Assignment {
    pub fn new(person: PersonId, slot: Slot, activity: ActivityCode, source: AssignmentSource) -> Self {
        Self {
            person,
            slot,
            activity,
            source,
            role: AssignmentRole::Primary,
            template: None,
            override_actor: None,
            override_reason: None,
        }
    }
}

/// Status of a single generation run (spec §4.10 "State machine per run").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    InProgress,
    Success,
    Partial,
    Failed,
}

/// One row per generation, carrying solver statistics and the validation
/// report (spec §3 "ScheduleRun", §6 "RunReport").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRun {
    pub id: RunId,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub algorithm: String,
    pub status: RunStatus,
    pub solver_stats: Option<crate::solver::SolverStats>,
    pub validation_report: Option<crate::validator::ValidationReport>,
}
