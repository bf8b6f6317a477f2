//! Constraint Registry (C4): typed constraint variants, each able to encode
//! itself into a CP model, an LP model, or validate itself against a
//! concrete schedule. Spec §9 calls for a tagged-variant registry instead of
//! ecosystem-style dynamic dispatch; backends iterate and match on the tag,
//! so adding a constraint never touches a solver backend (spec §4.4
//! "Polymorphism requirement").

mod hard;
mod soft;

pub use hard::HardConstraint;
pub use soft::SoftConstraint;

use crate::context::SchedulingContext;
use crate::model::{ActivityCode, PersonId, Slot};

/// Priority ordering for hard constraints (spec §3 "Constraint").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low = 25,
    Medium = 50,
    High = 75,
    Critical = 100,
}

/// A concrete rule violation found by `validate`, carrying enough context
/// to localize it in a `RunReport` (spec §4.8).
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub constraint_name: &'static str,
    pub priority: Priority,
    pub person: Option<PersonId>,
    pub slot: Option<Slot>,
    pub detail: String,
}

impl Violation {
    pub fn new(constraint_name: &'static str, priority: Priority, detail: impl Into<String>) -> Self {
        Self {
            constraint_name,
            priority,
            person: None,
            slot: None,
            detail: detail.into(),
        }
    }

    pub fn with_person(mut self, person: PersonId) -> Self {
        self.person = Some(person);
        self
    }

    pub fn with_slot(mut self, slot: Slot) -> Self {
        self.slot = Some(slot);
        self
    }
}

/// A single `x[p,s,t]` decision, the unit the CP/LP encoders reason about
/// (spec §4.6 "Decision-variable model").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decision {
    pub person: PersonId,
    pub slot: Slot,
    pub activity: ActivityCode,
}

/// A minimal CP model surface: the hard/soft constraints only need to add
/// clauses over decision indices and register penalty terms, never touch
/// solver internals directly.
pub trait CpModel {
    fn forbid(&mut self, decisions: &[Decision]);
    fn at_most_one(&mut self, decisions: &[Decision]);
    fn add_penalty(&mut self, weight: f64, decisions: &[Decision]);
}

/// A minimal LP model surface: linear inequalities over decision
/// coefficients (spec §4.6 "LP backend").
pub trait LpModel {
    fn add_le(&mut self, terms: &[(Decision, f64)], bound: f64);
    fn add_eq(&mut self, terms: &[(Decision, f64)], bound: f64);
    fn add_objective_term(&mut self, weight: f64, terms: &[(Decision, f64)]);
}

/// The full catalog of hard and soft constraints, held as an ordered
/// collection so the dispatcher and validator can iterate once and apply
/// every rule without a new match arm per backend (spec §4.4, §9).
#[derive(Debug, Clone)]
pub struct ConstraintRegistry {
    pub hard: Vec<HardConstraint>,
    pub soft: Vec<SoftConstraint>,
}

impl ConstraintRegistry {
    /// The standard catalog from spec §4.4, in the order the table lists
    /// them. Weight defaults match the table; callers may re-weight soft
    /// constraints after construction.
    pub fn standard_catalog() -> Self {
        Self {
            hard: HardConstraint::standard_catalog(),
            soft: SoftConstraint::standard_catalog(),
        }
    }

    pub fn encode_cp(&self, model: &mut dyn CpModel, ctx: &SchedulingContext) {
        for c in &self.hard {
            c.encode_cp(model, ctx);
        }
        for c in &self.soft {
            c.encode_cp(model, ctx);
        }
    }

    pub fn encode_lp(&self, model: &mut dyn LpModel, ctx: &SchedulingContext) {
        for c in &self.hard {
            c.encode_lp(model, ctx);
        }
        for c in &self.soft {
            c.encode_lp(model, ctx);
        }
    }

    /// Validate every hard constraint against a concrete schedule. Soft
    /// constraints are not validated here; they only shape the objective
    /// (spec §4.4 "Priority composition").
    pub fn validate_hard(
        &self,
        assignments: &[crate::model::Assignment],
        ctx: &SchedulingContext,
    ) -> Vec<Violation> {
        self.hard
            .iter()
            .flat_map(|c| c.validate(assignments, ctx))
            .collect()
    }
}
