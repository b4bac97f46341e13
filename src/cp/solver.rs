//! Engine boundary: solver trait, configuration and solutions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::model::{BoolVar, CpModel, IntVar, LinearExpr, Objective, Var};

/// Terminal status of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// A solution was found and proven optimal.
    Optimal,
    /// A solution was found; optimality was not proven.
    Feasible,
    /// The model is well-formed but has no solution.
    Infeasible,
    /// The engine stopped without deciding (e.g. time limit).
    Unknown,
    /// The model is contradictory or cannot be expressed by the engine.
    ModelInvalid,
}

impl SolveStatus {
    /// Whether a solution is available for decoding.
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unknown => "UNKNOWN",
            SolveStatus::ModelInvalid => "MODEL_INVALID",
        };
        f.write_str(s)
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Wall-clock budget. `None` = run to completion.
    pub time_limit: Option<Duration>,
}

impl SolverConfig {
    /// Sets the time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// Run statistics reported by the engine.
///
/// Counters an engine doesn't expose are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStatistics {
    pub conflicts: Option<u64>,
    pub branches: Option<u64>,
    pub wall_time: Duration,
}

/// The outcome of one solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpSolution {
    pub status: SolveStatus,
    /// Values indexed like `CpModel::int_vars`; empty without a solution.
    pub int_values: Vec<i64>,
    /// Values indexed like `CpModel::bool_vars`; empty without a solution.
    pub bool_values: Vec<bool>,
    /// Objective evaluated on the model's own expression.
    pub objective_value: Option<i64>,
    pub statistics: SolveStatistics,
}

impl CpSolution {
    /// A solution-less outcome.
    pub fn without_solution(status: SolveStatus, statistics: SolveStatistics) -> Self {
        Self {
            status,
            int_values: Vec::new(),
            bool_values: Vec::new(),
            objective_value: None,
            statistics,
        }
    }

    /// Builds a solution from variable values and evaluates the model's
    /// objective on them.
    pub fn with_values(
        model: &CpModel,
        status: SolveStatus,
        int_values: Vec<i64>,
        bool_values: Vec<bool>,
        statistics: SolveStatistics,
    ) -> Self {
        let mut solution = Self {
            status,
            int_values,
            bool_values,
            objective_value: None,
            statistics,
        };
        solution.objective_value = match &model.objective {
            Objective::None => None,
            Objective::Maximize(expr) | Objective::Minimize(expr) => solution.eval(expr),
        };
        solution
    }

    /// Whether a solution was found.
    pub fn is_solution_found(&self) -> bool {
        self.status.has_solution()
    }

    pub fn int_value(&self, var: IntVar) -> Option<i64> {
        self.int_values.get(var.index()).copied()
    }

    pub fn bool_value(&self, var: BoolVar) -> Option<bool> {
        self.bool_values.get(var.index()).copied()
    }

    /// Value of a term variable (booleans as 0/1).
    pub fn value(&self, var: Var) -> Option<i64> {
        match var {
            Var::Int(v) => self.int_value(v),
            Var::Bool(b) => self.bool_value(b).map(i64::from),
        }
    }

    /// Evaluates an expression on this solution.
    pub fn eval(&self, expr: &LinearExpr) -> Option<i64> {
        expr.terms
            .iter()
            .try_fold(expr.constant, |acc, &(var, coef)| {
                Some(acc + coef * self.value(var)?)
            })
    }
}

/// A constraint engine.
///
/// `solve` blocks until the engine terminates; no partial results are
/// streamed back.
pub trait CpSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_has_solution() {
        assert!(SolveStatus::Optimal.has_solution());
        assert!(SolveStatus::Feasible.has_solution());
        assert!(!SolveStatus::Infeasible.has_solution());
        assert!(!SolveStatus::Unknown.has_solution());
        assert!(!SolveStatus::ModelInvalid.has_solution());
        assert_eq!(SolveStatus::ModelInvalid.to_string(), "MODEL_INVALID");
    }

    #[test]
    fn test_eval_and_objective() {
        let mut model = CpModel::new("eval");
        let x = model.new_int_var(0, 10, "x");
        let b = model.new_bool_var("b");
        model.maximize(LinearExpr::constant(2).with_term(x, 3).with_term(b, 10));

        let sol = CpSolution::with_values(
            &model,
            SolveStatus::Optimal,
            vec![4],
            vec![true],
            SolveStatistics::default(),
        );
        assert_eq!(sol.objective_value, Some(24));
        assert_eq!(sol.int_value(x), Some(4));
        assert_eq!(sol.bool_value(b), Some(true));
    }

    #[test]
    fn test_without_solution() {
        let sol = CpSolution::without_solution(SolveStatus::Infeasible, SolveStatistics::default());
        assert!(!sol.is_solution_found());
        assert_eq!(sol.eval(&LinearExpr::constant(5)), Some(5));
        assert_eq!(sol.int_value(IntVar(0)), None);
    }

    #[test]
    fn test_config_builder() {
        let config = SolverConfig::default().with_time_limit(Duration::from_secs(5));
        assert_eq!(config.time_limit, Some(Duration::from_secs(5)));
    }
}
