//! Resilience Gate (C9): pre-generation health scalars that gate whether
//! generation may proceed and feed the hub-protection / utilization-buffer
//! soft constraints (spec §4.9).
//!
//! The exotic resilience analytics named in spec §1 (spin-glass, Penrose,
//! persistent homology, etc.) are explicitly out of scope; only the three
//! scalars below and the discrete gate level are carried into the core.

use crate::model::{Assignment, Person, PersonId};
use std::collections::HashMap;

/// Discrete resilience level, gating generation (spec §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResilienceLevel {
    Green,
    Yellow,
    Orange,
    Red,
    Black,
}

impl ResilienceLevel {
    /// True when generation should be refused without an explicit override
    /// (RED), or refused unconditionally (BLACK handled by the caller).
    pub fn requires_override(&self) -> bool {
        matches!(self, ResilienceLevel::Red)
    }

    pub fn is_unconditional_refusal(&self) -> bool {
        matches!(self, ResilienceLevel::Black)
    }

    /// Derive the level from utilization, matching the thresholds implied
    /// by spec §8 scenario S6 (0.92 utilization => RED).
    pub fn from_utilization(utilization: f64) -> Self {
        if utilization >= 0.97 {
            ResilienceLevel::Black
        } else if utilization >= 0.90 {
            ResilienceLevel::Red
        } else if utilization >= 0.85 {
            ResilienceLevel::Orange
        } else if utilization >= 0.75 {
            ResilienceLevel::Yellow
        } else {
            ResilienceLevel::Green
        }
    }
}

/// Computes the three pre-generation scalars named in spec §4.9 over the
/// committed history of the last 28 days.
#[derive(Debug, Clone, Default)]
pub struct ResilienceGate;

impl ResilienceGate {
    pub fn new() -> Self {
        Self
    }

    /// Fraction of solver-eligible half-day capacity occupied over the
    /// trailing window of committed assignments.
    pub fn utilization(&self, people: &[Person], assignments: &[Assignment], total_slots: usize) -> f64 {
        if people.is_empty() || total_slots == 0 {
            return 0.0;
        }
        let capacity = people.len() * total_slots;
        let occupied = assignments.len().min(capacity);
        occupied as f64 / capacity as f64
    }

    /// Degree centrality of each faculty member on the person<->slot
    /// assignment graph: how many of the range's slots they cover, as a
    /// share of all assignments. A simple, auditable proxy for hub score.
    pub fn hub_scores(&self, assignments: &[Assignment]) -> HashMap<PersonId, f64> {
        let mut counts: HashMap<PersonId, usize> = HashMap::new();
        for a in assignments {
            *counts.entry(a.person).or_insert(0) += 1;
        }
        let total = assignments.len().max(1) as f64;
        counts
            .into_iter()
            .map(|(person, count)| (person, count as f64 / total))
            .collect()
    }

    /// Count of people whose removal would leave at least one overnight-call
    /// slot uncovered: call-eligible faculty with no other call-eligible
    /// covering the same nights in the assigned range.
    pub fn n1_vulnerable(&self, people: &[Person], assignments: &[Assignment]) -> usize {
        let call_eligible: Vec<&Person> = people.iter().filter(|p| p.is_call_eligible_role()).collect();
        if call_eligible.len() <= 1 {
            return call_eligible.len();
        }
        let mut nights: HashMap<chrono::NaiveDate, Vec<PersonId>> = HashMap::new();
        for a in assignments {
            if a.activity == crate::model::ActivityCode::Call {
                nights.entry(a.slot.date).or_default().push(a.person);
            }
        }
        nights.values().filter(|covering| covering.len() <= 1).count()
    }

    pub fn level(&self, utilization: f64) -> ResilienceLevel {
        ResilienceLevel::from_utilization(utilization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utilization_0_92_maps_to_red() {
        assert_eq!(ResilienceLevel::from_utilization(0.92), ResilienceLevel::Red);
    }

    #[test]
    fn utilization_below_0_75_is_green() {
        assert_eq!(ResilienceLevel::from_utilization(0.5), ResilienceLevel::Green);
    }

    #[test]
    fn red_requires_override_but_is_not_unconditional() {
        let level = ResilienceLevel::Red;
        assert!(level.requires_override());
        assert!(!level.is_unconditional_refusal());
    }

    #[test]
    fn black_is_unconditional_refusal() {
        assert!(ResilienceLevel::Black.is_unconditional_refusal());
    }
}
