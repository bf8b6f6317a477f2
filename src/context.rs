//! Scheduling Context (C5): the immutable bundle passed to solvers and the
//! validator. Built once per run; solver backends must not mutate it (spec
//! §4.5, §5 "Shared resources").

use crate::availability::AvailabilityMatrix;
use crate::calendar::Calendar;
use crate::config::EngineConfig;
use crate::model::{Assignment, Person, PersonId, RotationTemplate, Slot, TemplateId};
use std::collections::HashMap;

/// Resilience scalars computed by C9 and consumed by §4.4 soft constraints.
#[derive(Debug, Clone)]
pub struct ResilienceInputs {
    pub hub_scores: HashMap<PersonId, f64>,
    pub current_utilization: f64,
    pub n1_vulnerable: usize,
    pub level: crate::resilience::ResilienceLevel,
}

/// The read-only bundle every solver backend and the validator receive.
/// Carries integer indices for every id so solvers can address decision
/// variables as `(i_person, i_slot, i_template)` without hashing at solve
/// time (spec §4.5).
#[derive(Debug, Clone)]
pub struct SchedulingContext {
    pub people: Vec<Person>,
    pub slots: Vec<Slot>,
    pub templates: Vec<RotationTemplate>,
    pub availability: AvailabilityMatrix,
    pub preloads: Vec<Assignment>,
    pub resilience: ResilienceInputs,
    pub config: EngineConfig,
    pub calendar: Calendar,

    person_index: HashMap<PersonId, usize>,
    slot_index: HashMap<(chrono::NaiveDate, crate::model::Period), usize>,
    template_index: HashMap<TemplateId, usize>,
}

impl SchedulingContext {
    pub fn new(
        people: Vec<Person>,
        slots: Vec<Slot>,
        templates: Vec<RotationTemplate>,
        availability: AvailabilityMatrix,
        preloads: Vec<Assignment>,
        resilience: ResilienceInputs,
        config: EngineConfig,
        calendar: Calendar,
    ) -> Self {
        let person_index = people.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        let slot_index = slots
            .iter()
            .enumerate()
            .map(|(i, s)| ((s.date, s.period), i))
            .collect();
        let template_index = templates.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

        Self {
            people,
            slots,
            templates,
            availability,
            preloads,
            resilience,
            config,
            calendar,
            person_index,
            slot_index,
            template_index,
        }
    }

    pub fn person_index(&self, id: PersonId) -> Option<usize> {
        self.person_index.get(&id).copied()
    }

    pub fn slot_index(&self, slot: &Slot) -> Option<usize> {
        self.slot_index.get(&(slot.date, slot.period)).copied()
    }

    pub fn template_index(&self, id: TemplateId) -> Option<usize> {
        self.template_index.get(&id).copied()
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.person_index(id).map(|i| &self.people[i])
    }

    pub fn template(&self, id: TemplateId) -> Option<&RotationTemplate> {
        self.template_index(id).map(|i| &self.templates[i])
    }

    /// Preloaded assignments already occupying `(person, slot)`, if any.
    pub fn preload_at(&self, person: PersonId, slot: &Slot) -> Option<&Assignment> {
        self.preloads
            .iter()
            .find(|a| a.person == person && a.slot == *slot)
    }

    pub fn solver_eligible_templates(&self) -> impl Iterator<Item = &RotationTemplate> {
        self.templates.iter().filter(|t| t.is_solver_eligible)
    }

    pub fn call_eligible_people(&self) -> impl Iterator<Item = &Person> {
        self.people.iter().filter(|p| p.is_call_eligible_role())
    }

    /// Complexity estimate feeding the solver dispatcher (spec §4.6): a
    /// function of availability-matrix sparsity and decision-variable count.
    pub fn complexity_score(&self) -> f64 {
        let n_vars = (self.people.len() * self.slots.len() * self.templates.len()).max(1) as f64;
        let mut blocked = 0usize;
        let mut total = 0usize;
        for person in &self.people {
            for slot in &self.slots {
                total += 1;
                if self.availability.avail(person.id, slot).is_blocked() {
                    blocked += 1;
                }
            }
        }
        let sparsity = if total == 0 {
            0.0
        } else {
            1.0 - (blocked as f64 / total as f64)
        };
        // Scaled so typical small rosters land under 20 and large, dense
        // rosters land above 75 (spec §4.6 threshold table).
        (n_vars.ln().max(0.0)) * sparsity.max(0.05) * 3.0
    }
}
