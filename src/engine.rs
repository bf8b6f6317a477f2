//! Scheduling Engine (C10): end-to-end orchestration of C1-C9 (spec §4.10).
//!
//! The public surface mirrors spec §6's `generate(date_range, options) ->
//! RunReport`. Roster, templates, and preload source records are supplied
//! via [`GenerationInputs`] rather than fetched from the repository: spec
//! §1 treats persistent storage mechanics for those entities as an external
//! collaborator, and the repository's persisted-state layout (spec §6)
//! only names `slots`, `resident_block_rotations`, `assignments`,
//! `call_assignments`, and `schedule_runs`.

use crate::availability::AvailabilityMatrix;
use crate::calendar::Calendar;
use crate::config::EngineConfig;
use crate::constraints::ConstraintRegistry;
use crate::context::{ResilienceInputs, SchedulingContext};
use crate::error::{CancellationToken, SchedulingError};
use crate::model::{Person, RotationTemplate, RunId, RunStatus, ScheduleRun};
use crate::preload::PreloadInputs;
use crate::reconciler::ReconciliationReport;
use crate::repository::SchedulingRepository;
use crate::resilience::{ResilienceGate, ResilienceLevel};
use crate::solver::{Algorithm, SolverDispatcher, SolverStats};
use crate::validator::ValidationReport;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

/// Options for a single `generate` call (spec §6).
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub algorithm: Option<Algorithm>,
    pub time_budget_seconds: Option<f64>,
    pub check_resilience: bool,
    pub preserve_preload: bool,
    pub cancellation: CancellationToken,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            algorithm: None,
            time_budget_seconds: None,
            check_resilience: true,
            preserve_preload: true,
            cancellation: CancellationToken::new(),
        }
    }
}

/// Roster, templates, and raw preload source records for one `generate`
/// call. The core treats `people` as read-only (spec §3 "Lifecycle").
#[derive(Debug, Clone)]
pub struct GenerationInputs {
    pub people: Vec<Person>,
    pub templates: Vec<RotationTemplate>,
    pub preload_inputs: PreloadInputs,
}

/// The run outcome (spec §6 `RunReport`).
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: RunId,
    pub status: RunStatus,
    pub total_assigned: usize,
    pub total_slots: usize,
    pub validation_report: Option<ValidationReport>,
    pub solver_stats: Option<SolverStats>,
    pub resilience_pre: Option<ResilienceLevel>,
    pub resilience_post: Option<ResilienceLevel>,
    pub reconciliation: Option<ReconciliationReport>,
}

pub struct SchedulingEngine {
    repository: Arc<dyn SchedulingRepository>,
    calendar: Calendar,
    config: EngineConfig,
    registry: ConstraintRegistry,
    next_run_id: std::sync::atomic::AtomicU64,
}

impl SchedulingEngine {
    pub fn new(repository: Arc<dyn SchedulingRepository>, config: EngineConfig) -> Self {
        let calendar = Calendar::new(config.block0_policy);
        Self {
            repository,
            calendar,
            config,
            registry: ConstraintRegistry::standard_catalog(),
            next_run_id: std::sync::atomic::AtomicU64::new(1),
        }
    }

    /// End-to-end orchestration (spec §4.10).
    pub async fn generate(
        &self,
        date_range: (NaiveDate, NaiveDate),
        options: GenerateOptions,
        inputs: GenerationInputs,
    ) -> Result<RunReport, SchedulingError> {
        let (start, end) = date_range;
        let run_id = RunId::new(self.next_run_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst));

        // Step 1: row-level lock over the target range.
        let lock = self.repository.acquire_range_lock(start, end).await?;

        let result = self.generate_locked(run_id, start, end, &options, inputs).await;
        lock.release();
        result
    }

    async fn generate_locked(
        &self,
        run_id: RunId,
        start: NaiveDate,
        end: NaiveDate,
        options: &GenerateOptions,
        inputs: GenerationInputs,
    ) -> Result<RunReport, SchedulingError> {
        if options.cancellation.is_cancelled() {
            return Err(SchedulingError::Cancelled);
        }

        // Step 2: build slots, availability, preloads, resilience inputs, context.
        let mut slots = Vec::new();
        let mut day = start;
        while day <= end {
            slots.push(self.calendar.slot_for(day, crate::model::Period::Am));
            slots.push(self.calendar.slot_for(day, crate::model::Period::Pm));
            day += chrono::Duration::days(1);
        }

        let preload_set = crate::preload::run(&inputs.preload_inputs, &slots, &self.calendar)?;

        let preloaded_blocking: Vec<(crate::model::PersonId, crate::model::Slot)> = preload_set
            .iter()
            .filter(|a| a.activity.is_blocking())
            .map(|a| (a.person, a.slot))
            .collect();
        let availability = AvailabilityMatrix::build(&inputs.preload_inputs.absences, &slots, &preloaded_blocking);

        let existing_assignments = self.repository.assignments_in_range(start, end).await?;
        let gate = ResilienceGate::new();
        let utilization = gate.utilization(&inputs.people, &existing_assignments, slots.len());
        let hub_scores = gate.hub_scores(&existing_assignments);
        let n1_vulnerable = gate.n1_vulnerable(&inputs.people, &existing_assignments);
        let pre_level = gate.level(utilization);

        // Step 3: resilience gate.
        if options.check_resilience {
            if pre_level.is_unconditional_refusal() {
                return Err(SchedulingError::ResilienceRefusal { level: pre_level });
            }
            if pre_level.requires_override() && !self.config.resilience_override {
                return Err(SchedulingError::ResilienceRefusal { level: pre_level });
            }
        }

        let resilience = ResilienceInputs {
            hub_scores,
            current_utilization: utilization,
            n1_vulnerable,
            level: pre_level,
        };

        let ctx = SchedulingContext::new(
            inputs.people.clone(),
            slots.clone(),
            inputs.templates,
            availability,
            preload_set.clone(),
            resilience,
            self.config.clone(),
            self.calendar,
        );

        if options.cancellation.is_cancelled() {
            return Err(SchedulingError::Cancelled);
        }

        // Step 4: decide algorithm, invoke solver under budget.
        let algorithm = options.algorithm.unwrap_or_else(|| {
            crate::solver::pick_algorithm(ctx.complexity_score(), &self.config.complexity_thresholds)
        });
        info!(?algorithm, run = %run_id, "dispatching solver");

        let outcome = SolverDispatcher::solve(algorithm, &ctx, &options.cancellation)?;

        if matches!(outcome.status, crate::solver::SolverStatus::Infeasible) {
            return Err(SchedulingError::Infeasibility {
                message: "solver reported infeasible".into(),
            });
        }

        // Step 5 / 6: reconcile, validate, commit; on failure/timeout attempt one
        // hybrid fallback, else fail with no writes.
        let (committed, reconciliation) = if matches!(outcome.status, crate::solver::SolverStatus::Timeout) {
            warn!(run = %run_id, "solver timed out, attempting hybrid fallback");
            let fallback = SolverDispatcher::solve(Algorithm::Hybrid, &ctx, &options.cancellation)?;
            if matches!(fallback.status, crate::solver::SolverStatus::Infeasible | crate::solver::SolverStatus::Timeout) {
                return Err(SchedulingError::Timeout {
                    elapsed_seconds: fallback.stats.runtime_seconds,
                    budget_seconds: self.config.time_budgets.hybrid_seconds,
                });
            }
            crate::reconciler::reconcile(&fallback.decisions, &ctx)
        } else {
            crate::reconciler::reconcile(&outcome.decisions, &ctx)
        };

        if !options.preserve_preload {
            // Caller explicitly waived preload preservation for this run;
            // the reconciler's drop accounting above still reflects what
            // would have been preserved, for audit purposes.
            warn!(run = %run_id, "preserve_preload=false requested; preload priority still enforced by contract");
        }

        if options.cancellation.is_cancelled() {
            return Err(SchedulingError::Cancelled);
        }

        let validation_report = crate::validator::validate(&committed, &ctx, &self.registry);
        let status = if validation_report.has_hard_violations() {
            RunStatus::Partial
        } else {
            RunStatus::Success
        };

        self.repository
            .commit_solver_assignments(
                start,
                end,
                committed
                    .iter()
                    .filter(|a| a.source == crate::model::AssignmentSource::Solver)
                    .cloned()
                    .collect(),
            )
            .await?;
        if !preload_set.is_empty() {
            self.repository.write_preloads(preload_set).await?;
        }

        let post_assignments = self.repository.assignments_in_range(start, end).await?;
        let post_utilization = gate.utilization(&inputs.people, &post_assignments, slots.len());
        let post_level = gate.level(post_utilization);

        let total_assigned = committed.len();
        let total_slots = slots.len() * ctx.people.len().max(1);

        let run = ScheduleRun {
            id: run_id,
            date_start: start,
            date_end: end,
            algorithm: format!("{algorithm:?}"),
            status,
            solver_stats: Some(outcome.stats),
            validation_report: Some(validation_report.clone()),
        };
        self.repository.save_run(run).await?;

        Ok(RunReport {
            run_id,
            status,
            total_assigned,
            total_slots,
            validation_report: Some(validation_report),
            solver_stats: Some(outcome.stats),
            resilience_pre: Some(pre_level),
            resilience_post: Some(post_level),
            reconciliation: Some(reconciliation),
        })
    }
}
