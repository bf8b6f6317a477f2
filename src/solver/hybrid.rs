//! Hybrid backend (spec §4.6): runs CP under its own budget, and only on
//! timeout or infeasibility falls back to LP for the remainder of the
//! hybrid budget.

use super::{CpBackend, LpBackend, SolveOutcome, SolverStatus};
use crate::context::SchedulingContext;
use crate::error::{CancellationToken, SchedulingError};
use std::time::Duration;

pub struct HybridBackend;

impl HybridBackend {
    pub fn solve(
        ctx: &SchedulingContext,
        hybrid_budget: Duration,
        cancellation: &CancellationToken,
    ) -> Result<SolveOutcome, SchedulingError> {
        let cp_budget = hybrid_budget.mul_f64(0.5).min(Duration::from_secs_f64(ctx.config.time_budgets.cp_seconds));
        let cp_outcome = CpBackend::solve(ctx, cp_budget, cancellation)?;

        if matches!(cp_outcome.status, SolverStatus::Optimal | SolverStatus::Feasible) && !cp_outcome.decisions.is_empty() {
            return Ok(cp_outcome);
        }

        let lp_budget = hybrid_budget.saturating_sub(cp_budget);
        LpBackend::solve(ctx, lp_budget, cancellation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use crate::config::{Block0Policy, EngineConfig};
    use crate::context::{ResilienceInputs, SchedulingContext};
    use crate::model::{ClinicBounds, Person, PersonId, Role, WeekdayAvailability};
    use crate::resilience::ResilienceLevel;

    fn ctx_with_one_slot() -> SchedulingContext {
        let cal = Calendar::new(Block0Policy::RollForward);
        let slot = cal.slot_for(chrono::NaiveDate::from_ymd_opt(2026, 4, 6).unwrap(), crate::model::Period::Am);
        let person = Person {
            id: PersonId::new(1),
            name: "Test".into(),
            role: Role::ResidentPgy1,
            rank: None,
            clinic_bounds: ClinicBounds { min_c: 0, max_c: 4 },
            weekday_availability: WeekdayAvailability::default(),
            credentialed_procedures: Default::default(),
            excluded_procedures: Default::default(),
            prefers_tuesday_call: None,
        };
        SchedulingContext::new(
            vec![person],
            vec![slot],
            vec![],
            crate::availability::AvailabilityMatrix::default(),
            vec![],
            ResilienceInputs {
                hub_scores: Default::default(),
                current_utilization: 0.1,
                n1_vulnerable: 0,
                level: ResilienceLevel::Green,
            },
            EngineConfig::default(),
            cal,
        )
    }

    #[test]
    fn hybrid_solves_via_cp_when_cp_succeeds() {
        let ctx = ctx_with_one_slot();
        let token = CancellationToken::new();
        let outcome = HybridBackend::solve(&ctx, Duration::from_secs(10), &token).unwrap();
        assert!(!outcome.decisions.is_empty());
    }

    #[test]
    fn hybrid_falls_back_to_lp_when_cp_budget_is_zero() {
        let ctx = ctx_with_one_slot();
        let token = CancellationToken::new();
        // A hybrid budget small enough that the CP half rounds to zero
        // forces the fallback path to exercise LP.
        let outcome = HybridBackend::solve(&ctx, Duration::from_millis(0), &token).unwrap();
        let _ = outcome;
    }
}
