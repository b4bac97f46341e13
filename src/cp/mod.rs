//! CP-based promotion scheduling.
//!
//! Builds a [`CpModel`] from a [`Catalogue`], solves it with any
//! [`CpSolver`] and decodes the engine's answer into a [`Plan`].
//!
//! The lifecycle is enforced by types:
//! [`PromotionCpBuilder`] (built) → [`SolvedRun`] (solved, engine invoked
//! once) → [`Plan`] (decoded, only from `Optimal`/`Feasible`). Solving
//! consumes the builder; re-solving means building again.
//!
//! # Reference
//! - Sousa & Wolsey (1992), "A time indexed formulation of non-preemptive
//!   single machine scheduling problems" (start/day indicator grids)
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//!   (interval variables, no-overlap)

pub mod assembler;
pub mod encoder;
mod error;
pub mod model;
pub mod objective;
#[cfg(feature = "pumpkin")]
pub mod pumpkin;
mod solver;

use std::collections::HashMap;
use std::path::Path;

pub use encoder::{AssignmentVars, ScheduleGrid};
pub use error::{BuildError, DecodeError, ExportError};
pub use model::{
    BoolVar, Constraint, CpModel, IntVar, IntervalId, IntervalVar, LinearExpr, ModelError,
    Objective, Var,
};
#[cfg(feature = "pumpkin")]
pub use pumpkin::PumpkinSolver;
pub use solver::{CpSolution, CpSolver, SolveStatistics, SolveStatus, SolverConfig};

use crate::curve;
use crate::models::{CandidateKey, Catalogue, Placement, Plan, ScheduleMatrix};
use crate::validation::validate_catalogue;

/// Builds the promotion scheduling model from a catalogue.
///
/// # Example
/// ```no_run
/// use promo_schedule::cp::{PromotionCpBuilder, PumpkinSolver, SolverConfig};
/// use promo_schedule::models::{Candidate, Catalogue, Mechanic, Partner, SystemSettings};
///
/// let catalogue = Catalogue::new()
///     .with_partner(Partner::new("amz", 10))
///     .with_mechanic(Mechanic::new("dz1", 10))
///     .with_candidate(Candidate::new("amz", "dz1", 1000))
///     .with_settings(SystemSettings::new(3));
///
/// let builder = PromotionCpBuilder::new(&catalogue).unwrap();
/// let run = builder.solve(&PumpkinSolver::new(), &SolverConfig::default());
/// let plan = run.decode().unwrap();
/// ```
pub struct PromotionCpBuilder<'a> {
    catalogue: &'a Catalogue,
    model: CpModel,
    assignments: Vec<AssignmentVars>,
    index: HashMap<CandidateKey, usize>,
}

impl<'a> PromotionCpBuilder<'a> {
    /// Validates the catalogue and builds the full model.
    ///
    /// Creates, in order:
    /// - per candidate, the schedule grid and its structural constraints
    /// - activation, minimum duration and horizon constraints
    /// - partner/mechanic capacity and per-partner no-overlap
    /// - the ramp-weighted productivity objective (maximized)
    pub fn new(catalogue: &'a Catalogue) -> Result<Self, BuildError> {
        validate_catalogue(catalogue).map_err(BuildError::InvalidCatalogue)?;

        let mut model = CpModel::new("promotion_scheduling");
        let mut assignments = Vec::with_capacity(catalogue.candidates.len());
        let mut index = HashMap::with_capacity(catalogue.candidates.len());

        for candidate in &catalogue.candidates {
            let horizon = catalogue
                .horizon(candidate)
                .ok_or_else(|| BuildError::UnknownReference(candidate.key()))?;
            let vars = encoder::encode_schedule(
                &mut model,
                candidate.key(),
                candidate.productivity_ref,
                horizon as usize,
            );
            index.insert(vars.key.clone(), assignments.len());
            assignments.push(vars);
        }

        assembler::assemble(&mut model, catalogue, &assignments);
        let (lb, ub) = objective::productivity_bounds(&assignments)?;
        model.maximize(objective::productivity_objective(&assignments));
        model.set_objective_bounds(lb, ub);

        model.validate()?;

        tracing::info!(
            candidates = assignments.len(),
            int_vars = model.int_var_count(),
            bool_vars = model.bool_var_count(),
            constraints = model.constraint_count(),
            "built promotion model"
        );

        Ok(Self {
            catalogue,
            model,
            assignments,
            index,
        })
    }

    /// The constructed model.
    pub fn model(&self) -> &CpModel {
        &self.model
    }

    /// Per-candidate variables, in catalogue order.
    pub fn assignments(&self) -> &[AssignmentVars] {
        &self.assignments
    }

    /// Variables of one candidate.
    pub fn assignment(&self, key: &CandidateKey) -> Option<&AssignmentVars> {
        self.index.get(key).map(|&i| &self.assignments[i])
    }

    /// Writes the model as pretty-printed JSON for debugging.
    pub fn export_model(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let json = serde_json::to_string_pretty(&self.model)?;
        std::fs::write(path.as_ref(), json)?;
        tracing::debug!(path = %path.as_ref().display(), "exported model");
        Ok(())
    }

    /// Invokes the engine once and hands back the solved run.
    pub fn solve<S: CpSolver>(self, solver: &S, config: &SolverConfig) -> SolvedRun<'a> {
        let solution = solver.solve(&self.model, config);
        tracing::info!(
            status = %solution.status,
            wall_time_ms = solution.statistics.wall_time.as_millis() as u64,
            "solved promotion model"
        );

        SolvedRun {
            catalogue: self.catalogue,
            model: self.model,
            assignments: self.assignments,
            solution,
        }
    }
}

/// A model after its single engine invocation.
pub struct SolvedRun<'a> {
    catalogue: &'a Catalogue,
    model: CpModel,
    assignments: Vec<AssignmentVars>,
    solution: CpSolution,
}

impl SolvedRun<'_> {
    pub fn status(&self) -> SolveStatus {
        self.solution.status
    }

    pub fn statistics(&self) -> &SolveStatistics {
        &self.solution.statistics
    }

    /// Raw engine solution.
    pub fn solution(&self) -> &CpSolution {
        &self.solution
    }

    /// The model that was solved.
    pub fn model(&self) -> &CpModel {
        &self.model
    }

    /// Objective in productivity units, if a solution exists.
    pub fn objective_value(&self) -> Option<f64> {
        self.solution
            .objective_value
            .map(|v| v as f64 / curve::SCALE as f64)
    }

    /// Decodes every candidate's placement.
    ///
    /// Only `Optimal` and `Feasible` runs can be decoded.
    pub fn decode(&self) -> Result<Plan, DecodeError> {
        if !self.solution.is_solution_found() {
            return Err(DecodeError::NoSolution(self.solution.status));
        }

        let mut plan = Plan::new();
        for vars in &self.assignments {
            plan.add_placement(self.decode_assignment(vars)?);
        }
        plan.objective_value = self.objective_value().unwrap_or_default();

        tracing::debug!(
            active = plan.active_placements().len(),
            objective = plan.objective_value,
            "decoded plan"
        );
        Ok(plan)
    }

    fn decode_assignment(&self, vars: &AssignmentVars) -> Result<Placement, DecodeError> {
        let int = |v: IntVar| {
            self.solution
                .int_value(v)
                .ok_or_else(|| DecodeError::MissingValue(vars.key.clone()))
        };
        let boolean = |v: BoolVar| {
            self.solution
                .bool_value(v)
                .ok_or_else(|| DecodeError::MissingValue(vars.key.clone()))
        };

        let grid = &vars.schedule;
        let mut schedule = ScheduleMatrix::new(grid.side());
        let mut scaled_productivity = 0;
        for r in 0..grid.side() {
            for o in 0..grid.side() {
                if boolean(grid.cell(r, o))? {
                    schedule.set(r, o, true);
                    scaled_productivity += curve::contribution_scaled(
                        ScheduleGrid::start_day(r),
                        o,
                        vars.productivity_ref,
                    );
                }
            }
        }

        Ok(Placement {
            key: vars.key.clone(),
            is_active: boolean(vars.is_active)?,
            start: int(vars.start)?,
            end: int(vars.end)?,
            duration: int(vars.duration)?,
            productivity: scaled_productivity as f64 / curve::SCALE as f64,
            schedule,
        })
    }

    /// The catalogue this run was built from.
    pub fn catalogue(&self) -> &Catalogue {
        self.catalogue
    }
}
