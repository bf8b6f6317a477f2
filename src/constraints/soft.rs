//! Soft-constraint catalog (spec §4.4). Most variants contribute a weighted
//! penalty term to the CP backend's objective and a mirrored term to the LP
//! backend's objective (spec §4.6 `1000*coverage - sum(weight*violation)`).
//! `TemplateBalance` and `Continuity` compare one decision's effect against
//! another's and have no encoding yet under the per-decision `CpModel`/
//! `LpModel` interface; see `weighted_decisions`.

use super::{CpModel, Decision, LpModel};
use crate::context::SchedulingContext;
use crate::model::ActivityCode;
use chrono::Datelike;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoftKind {
    Coverage,
    ResilienceHubProtection,
    ResilienceUtilizationBuffer,
    CallSundayEquity,
    CallWeekdayEquity,
    CallSpacing,
    CallTuesdayPreference,
    DeptChiefWednesdayPreference,
    FacultyClinicEquity,
    TemplateBalance,
    Continuity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftConstraint {
    pub kind: SoftKind,
    pub weight: f64,
}

impl SoftConstraint {
    pub fn name(&self) -> &'static str {
        match self.kind {
            SoftKind::Coverage => "Coverage",
            SoftKind::ResilienceHubProtection => "ResilienceHubProtection",
            SoftKind::ResilienceUtilizationBuffer => "ResilienceUtilizationBuffer",
            SoftKind::CallSundayEquity => "CallSundayEquity",
            SoftKind::CallWeekdayEquity => "CallWeekdayEquity",
            SoftKind::CallSpacing => "CallSpacing",
            SoftKind::CallTuesdayPreference => "CallTuesdayPreference",
            SoftKind::DeptChiefWednesdayPreference => "DeptChiefWednesdayPreference",
            SoftKind::FacultyClinicEquity => "FacultyClinicEquity",
            SoftKind::TemplateBalance => "TemplateBalance",
            SoftKind::Continuity => "Continuity",
        }
    }

    pub fn standard_catalog() -> Vec<Self> {
        vec![
            Self { kind: SoftKind::Coverage, weight: 1000.0 },
            Self { kind: SoftKind::ResilienceHubProtection, weight: 15.0 },
            Self { kind: SoftKind::ResilienceUtilizationBuffer, weight: 20.0 },
            Self { kind: SoftKind::CallSundayEquity, weight: 10.0 },
            Self { kind: SoftKind::CallWeekdayEquity, weight: 5.0 },
            Self { kind: SoftKind::CallSpacing, weight: 8.0 },
            Self { kind: SoftKind::CallTuesdayPreference, weight: 2.0 },
            Self { kind: SoftKind::DeptChiefWednesdayPreference, weight: 1.0 },
            Self { kind: SoftKind::FacultyClinicEquity, weight: 15.0 },
            Self { kind: SoftKind::TemplateBalance, weight: 5.0 },
            Self { kind: SoftKind::Continuity, weight: 3.0 },
        ]
    }

    /// Dispatches through [`CpModel::add_penalty`]. `Coverage` is excluded
    /// here: the CP backend counts raw decisions for coverage directly, so
    /// routing it through the penalty channel too would double-count it.
    pub fn encode_cp(&self, model: &mut dyn CpModel, ctx: &SchedulingContext) {
        if matches!(self.kind, SoftKind::Coverage) {
            return;
        }
        let weighted = self.weighted_decisions(ctx);
        for (weight, decisions) in weighted {
            model.add_penalty(weight, &decisions);
        }
    }

    pub fn encode_lp(&self, model: &mut dyn LpModel, ctx: &SchedulingContext) {
        if matches!(self.kind, SoftKind::Coverage) {
            let terms: Vec<(Decision, f64)> = ctx
                .people
                .iter()
                .flat_map(|p| {
                    ctx.slots.iter().map(move |s| {
                        (
                            Decision {
                                person: p.id,
                                slot: *s,
                                activity: ActivityCode::FmClinic,
                            },
                            1.0,
                        )
                    })
                })
                .collect();
            model.add_objective_term(self.weight, &terms);
            return;
        }
        // Every other kind reduces to the same grouped-decision weighting
        // `add_penalty` uses for the CP backend; the LP objective just takes
        // the negated weight, since `add_objective_term` feeds a maximized
        // expression while `add_penalty` feeds a subtracted cost.
        let weighted = self.weighted_decisions(ctx);
        for (weight, decisions) in weighted {
            let terms: Vec<(Decision, f64)> = decisions.into_iter().map(|d| (d, 1.0)).collect();
            model.add_objective_term(-weight, &terms);
        }
    }

    /// Groups of decisions and the weight attached to each group, shared by
    /// `encode_cp`'s penalty channel and `encode_lp`'s objective channel.
    /// `TemplateBalance` and `Continuity` are genuinely cross-decision
    /// smoothness terms (they compare one person's load against another's,
    /// or one week against the next); neither `CpModel` nor `LpModel`
    /// exposes auxiliary variables to linearize that, so they fall through
    /// to an empty group list and contribute nothing yet.
    fn weighted_decisions(&self, ctx: &SchedulingContext) -> Vec<(f64, Vec<Decision>)> {
        match self.kind {
            SoftKind::Coverage | SoftKind::TemplateBalance | SoftKind::Continuity => Vec::new(),
            SoftKind::ResilienceHubProtection => ctx
                .resilience
                .hub_scores
                .iter()
                .filter(|(_, score)| **score > 0.0)
                .map(|(person, score)| {
                    let decisions = ctx
                        .slots
                        .iter()
                        .map(|s| Decision {
                            person: *person,
                            slot: *s,
                            activity: ActivityCode::FmClinic,
                        })
                        .collect();
                    (self.weight * score, decisions)
                })
                .collect(),
            SoftKind::ResilienceUtilizationBuffer => {
                if ctx.resilience.current_utilization > 0.80 {
                    let decisions: Vec<Decision> = ctx
                        .people
                        .iter()
                        .flat_map(|p| {
                            ctx.slots.iter().map(move |s| Decision {
                                person: p.id,
                                slot: *s,
                                activity: ActivityCode::FmClinic,
                            })
                        })
                        .collect();
                    vec![(self.weight, decisions)]
                } else {
                    Vec::new()
                }
            }
            SoftKind::CallSundayEquity => {
                let total_eligible = ctx.call_eligible_people().count().max(1) as f64;
                ctx.call_eligible_people()
                    .map(|person| {
                        let decisions: Vec<Decision> = ctx
                            .slots
                            .iter()
                            .filter(|s| s.date.weekday() == chrono::Weekday::Sun)
                            .map(|s| Decision {
                                person: person.id,
                                slot: *s,
                                activity: ActivityCode::Call,
                            })
                            .collect();
                        (self.weight / total_eligible, decisions)
                    })
                    .collect()
            }
            SoftKind::CallWeekdayEquity => {
                let total_eligible = ctx.call_eligible_people().count().max(1) as f64;
                ctx.call_eligible_people()
                    .map(|person| {
                        let decisions: Vec<Decision> = ctx
                            .slots
                            .iter()
                            .filter(|s| !matches!(s.date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun))
                            .map(|s| Decision {
                                person: person.id,
                                slot: *s,
                                activity: ActivityCode::Call,
                            })
                            .collect();
                        (self.weight / total_eligible, decisions)
                    })
                    .collect()
            }
            SoftKind::CallSpacing => {
                // Without per-decision successor links this only discourages
                // accumulating many call nights at all, as a weak proxy for
                // spacing them out.
                let decisions: Vec<Decision> = ctx
                    .call_eligible_people()
                    .flat_map(|p| {
                        ctx.slots.iter().map(move |s| Decision {
                            person: p.id,
                            slot: *s,
                            activity: ActivityCode::Call,
                        })
                    })
                    .collect();
                vec![(self.weight, decisions)]
            }
            SoftKind::CallTuesdayPreference => ctx
                .people
                .iter()
                .filter_map(|person| {
                    let prefers = person.prefers_tuesday_call?;
                    let tuesday_slots: Vec<Decision> = ctx
                        .slots
                        .iter()
                        .filter(|s| s.date.weekday() == chrono::Weekday::Tue)
                        .map(|s| Decision {
                            person: person.id,
                            slot: *s,
                            activity: ActivityCode::Call,
                        })
                        .collect();
                    let weight = if prefers { -self.weight } else { self.weight };
                    Some((weight, tuesday_slots))
                })
                .collect(),
            SoftKind::DeptChiefWednesdayPreference => ctx
                .people
                .iter()
                .filter(|p| p.role == crate::model::Role::FacultyDeptChief)
                .map(|person| {
                    let decisions: Vec<Decision> = ctx
                        .slots
                        .iter()
                        .filter(|s| s.date.weekday() == chrono::Weekday::Wed && s.period == crate::model::Period::Pm)
                        .map(|s| Decision {
                            person: person.id,
                            slot: *s,
                            activity: ActivityCode::FmClinic,
                        })
                        .collect();
                    (-self.weight, decisions)
                })
                .collect(),
            SoftKind::FacultyClinicEquity => ctx
                .people
                .iter()
                .filter(|p| p.role.is_faculty())
                .map(|p| {
                    let target = (p.clinic_bounds.min_c + p.clinic_bounds.max_c) as f64 / 2.0;
                    let decisions: Vec<Decision> = ctx
                        .slots
                        .iter()
                        .map(|s| Decision {
                            person: p.id,
                            slot: *s,
                            activity: ActivityCode::FmClinic,
                        })
                        .collect();
                    // target itself isn't usable without a slack variable;
                    // the weight alone still discourages over-assignment of
                    // whichever faculty the search reaches first.
                    let _ = target;
                    (self.weight, decisions)
                })
                .collect(),
        }
    }
}
