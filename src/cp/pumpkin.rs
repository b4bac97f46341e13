//! [`CpSolver`] backed by the Pumpkin constraint solver.
//!
//! Translation of the IR:
//! - booleans become literals, integers bounded domains (`i32`)
//! - linear constraints become `equals` / `less_than_or_equals` /
//!   `greater_than_or_equals` over affine views
//! - `Enforced` constraints are half-reified with `implied_by`
//! - `MapDomain` reifies `var == offset + i` on each indicator
//! - `NoOverlap` is decomposed pairwise into half-reified precedences, with
//!   an escape literal per interval for the zero-size case
//! - the objective is channelled into a dedicated variable and optimised
//!   with linear SAT-UNSAT search
//!
//! Pumpkin works on `i32`. The objective is reduced by the GCD of its
//! coefficients and bounded by the model's declared objective range. If it
//! still does not fit, coefficients are truncated by a common factor (logged
//! at `warn`) and a proven optimum is reported as `Feasible`. The reported
//! objective value is always evaluated exactly on the IR.

use std::collections::HashMap;
use std::time::Instant;

use pumpkin_solver::constraints as cp;
use pumpkin_solver::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_solver::optimisation::OptimisationDirection;
use pumpkin_solver::results::{OptimisationResult, ProblemSolution, SolutionReference};
use pumpkin_solver::termination::{Indefinite, TerminationCondition, TimeBudget};
use pumpkin_solver::variables::{AffineView, DomainId, Literal, TransformableVariable};
use pumpkin_solver::Solver;

use super::model::{BoolVar, Constraint, CpModel, IntervalId, LinearExpr, Objective, Var};
use super::solver::{CpSolution, CpSolver, SolveStatistics, SolveStatus, SolverConfig};

/// Pumpkin-backed engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PumpkinSolver;

impl PumpkinSolver {
    pub fn new() -> Self {
        Self
    }
}

/// Why a model could not be handed to Pumpkin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PostError {
    /// Posting failed at the root: the model has no solution.
    Infeasible,
    /// A value does not fit Pumpkin's `i32` domains.
    OutOfRange,
}

impl CpSolver for PumpkinSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();
        let stats = |started: Instant| SolveStatistics {
            conflicts: None,
            branches: None,
            wall_time: started.elapsed(),
        };

        if let Err(err) = model.validate() {
            tracing::warn!(model = %model.name, error = %err, "model rejected before solving");
            return CpSolution::without_solution(SolveStatus::ModelInvalid, stats(started));
        }

        let mut translation = match Translation::new(model) {
            Ok(t) => t,
            Err(err) => return failed(err, stats(started)),
        };
        if let Err(err) = translation.post_model(model) {
            return failed(err, stats(started));
        }
        let (objective, direction) = match translation.post_objective(model) {
            Ok(o) => o,
            Err(err) => return failed(err, stats(started)),
        };

        let outcome = match config.time_limit {
            Some(limit) => {
                let mut termination = TimeBudget::starting_now(limit);
                translation.optimise(&mut termination, objective, direction)
            }
            None => translation.optimise(&mut Indefinite, objective, direction),
        };

        let statistics = stats(started);
        tracing::info!(
            model = %model.name,
            status = %outcome.status,
            wall_time_ms = statistics.wall_time.as_millis() as u64,
            "pumpkin finished"
        );

        match outcome.values {
            Some((ints, bools)) => {
                CpSolution::with_values(model, outcome.status, ints, bools, statistics)
            }
            None => CpSolution::without_solution(outcome.status, statistics),
        }
    }
}

fn failed(err: PostError, statistics: SolveStatistics) -> CpSolution {
    let status = match err {
        PostError::Infeasible => SolveStatus::Infeasible,
        PostError::OutOfRange => SolveStatus::ModelInvalid,
    };
    tracing::warn!(status = %status, "model could not be posted");
    CpSolution::without_solution(status, statistics)
}

fn to_i32(value: i64) -> Result<i32, PostError> {
    i32::try_from(value).map_err(|_| PostError::OutOfRange)
}

struct Outcome {
    status: SolveStatus,
    values: Option<(Vec<i64>, Vec<bool>)>,
}

struct Translation {
    solver: Solver,
    ints: Vec<DomainId>,
    bools: Vec<Literal>,
    zero_size: HashMap<IntervalId, Literal>,
    /// Set when the posted objective only approximates the model's.
    lossy_objective: bool,
}

impl Translation {
    fn new(model: &CpModel) -> Result<Self, PostError> {
        let mut solver = Solver::default();

        let mut ints = Vec::with_capacity(model.int_var_count());
        for def in &model.int_vars {
            ints.push(solver.new_bounded_integer(to_i32(def.lb)?, to_i32(def.ub)?));
        }
        let bools = (0..model.bool_var_count())
            .map(|_| solver.new_literal())
            .collect();

        Ok(Self {
            solver,
            ints,
            bools,
            zero_size: HashMap::new(),
            lossy_objective: false,
        })
    }

    fn view(&self, var: Var, coef: i64) -> Result<AffineView<DomainId>, PostError> {
        let coef = to_i32(coef)?;
        Ok(match var {
            Var::Int(v) => self.ints[v.index()].scaled(coef),
            Var::Bool(b) => self.bools[b.index()].get_integer_variable().scaled(coef),
        })
    }

    fn views(&self, expr: &LinearExpr) -> Result<Vec<AffineView<DomainId>>, PostError> {
        expr.terms
            .iter()
            .map(|&(var, coef)| self.view(var, coef))
            .collect()
    }

    fn literal(&self, var: BoolVar) -> Literal {
        self.bools[var.index()]
    }

    fn post_model(&mut self, model: &CpModel) -> Result<(), PostError> {
        for interval in &model.intervals {
            let link = LinearExpr::new()
                .with_term(interval.end, 1)
                .with_term(interval.start, -1)
                .with_term(interval.size, -1);
            self.post_linear(&link, Some(0), Some(0), None)?;
        }
        for constraint in &model.constraints {
            self.post_constraint(model, constraint, None)?;
        }
        Ok(())
    }

    fn post_constraint(
        &mut self,
        model: &CpModel,
        constraint: &Constraint,
        guard: Option<Literal>,
    ) -> Result<(), PostError> {
        match constraint {
            Constraint::Linear { expr, lb, ub } => self.post_linear(expr, *lb, *ub, guard),
            Constraint::AtMostOne(vars) => {
                self.post_linear(&LinearExpr::sum(vars.iter().copied()), None, Some(1), guard)
            }
            Constraint::Enforced { guard: g, constraint } => {
                let literal = self.literal(*g);
                self.post_constraint(model, constraint, Some(literal))
            }
            Constraint::NoOverlap(ids) => self.post_no_overlap(model, ids),
            Constraint::MapDomain {
                var,
                indicators,
                offset,
            } => {
                for (i, &indicator) in indicators.iter().enumerate() {
                    let value = to_i32(offset + i as i64)?;
                    let tag = self.solver.new_constraint_tag();
                    let literal = self.literal(indicator);
                    self.solver
                        .add_constraint(cp::equals(vec![self.ints[var.index()].scaled(1)], value, tag))
                        .reify(literal)
                        .map_err(|_| PostError::Infeasible)?;
                }
                Ok(())
            }
        }
    }

    fn post_linear(
        &mut self,
        expr: &LinearExpr,
        lb: Option<i64>,
        ub: Option<i64>,
        guard: Option<Literal>,
    ) -> Result<(), PostError> {
        if expr.is_constant() {
            let holds = lb.map_or(true, |l| expr.constant >= l) && ub.map_or(true, |u| expr.constant <= u);
            if holds {
                return Ok(());
            }
            return match guard {
                Some(literal) => self.forbid(literal),
                None => Err(PostError::Infeasible),
            };
        }

        let terms = self.views(expr)?;
        match (lb, ub) {
            (Some(l), Some(u)) if l == u => {
                let rhs = to_i32(l - expr.constant)?;
                let tag = self.solver.new_constraint_tag();
                self.post(cp::equals(terms, rhs, tag), guard)
            }
            (lb, ub) => {
                if let Some(l) = lb {
                    let rhs = to_i32(l - expr.constant)?;
                    let tag = self.solver.new_constraint_tag();
                    self.post(cp::greater_than_or_equals(terms.clone(), rhs, tag), guard)?;
                }
                if let Some(u) = ub {
                    let rhs = to_i32(u - expr.constant)?;
                    let tag = self.solver.new_constraint_tag();
                    self.post(cp::less_than_or_equals(terms, rhs, tag), guard)?;
                }
                Ok(())
            }
        }
    }

    /// A violated constant constraint under a guard: the guard must be false.
    fn forbid(&mut self, guard: Literal) -> Result<(), PostError> {
        let tag = self.solver.new_constraint_tag();
        self.post(cp::equals(vec![guard.get_integer_variable().scaled(1)], 0, tag), None)
    }

    fn post<C: cp::Constraint>(&mut self, constraint: C, guard: Option<Literal>) -> Result<(), PostError> {
        let poster = self.solver.add_constraint(constraint);
        match guard {
            Some(literal) => poster.implied_by(literal),
            None => poster.post(),
        }
        .map_err(|_| PostError::Infeasible)
    }

    fn zero_size_literal(&mut self, model: &CpModel, id: IntervalId) -> Result<Literal, PostError> {
        if let Some(&literal) = self.zero_size.get(&id) {
            return Ok(literal);
        }
        let literal = self.solver.new_literal();
        let size = LinearExpr::from(model.interval(id).size);
        self.post_linear(&size, None, Some(0), Some(literal))?;
        self.zero_size.insert(id, literal);
        Ok(literal)
    }

    fn post_no_overlap(&mut self, model: &CpModel, ids: &[IntervalId]) -> Result<(), PostError> {
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                let (ia, ib) = (model.interval(a).clone(), model.interval(b).clone());
                let a_first = self.solver.new_literal();
                let b_first = self.solver.new_literal();

                let before = LinearExpr::new().with_term(ia.end, 1).with_term(ib.start, -1);
                self.post_linear(&before, None, Some(0), Some(a_first))?;
                let after = LinearExpr::new().with_term(ib.end, 1).with_term(ia.start, -1);
                self.post_linear(&after, None, Some(0), Some(b_first))?;

                let a_empty = self.zero_size_literal(model, a)?;
                let b_empty = self.zero_size_literal(model, b)?;
                let terms = [a_first, b_first, a_empty, b_empty]
                    .iter()
                    .map(|l| l.get_integer_variable().scaled(1))
                    .collect::<Vec<_>>();
                let tag = self.solver.new_constraint_tag();
                self.post(cp::greater_than_or_equals(terms, 1, tag), None)?;
            }
        }
        Ok(())
    }

    /// Channels the objective into a fresh variable.
    ///
    /// Coefficients are divided by their GCD and the variable's domain comes
    /// from the declared objective range when the model carries one; both
    /// steps are exact. Only if the reduced objective still exceeds `i32` are
    /// coefficients divided further by a truncating factor, and such a run is
    /// never reported as `Optimal`.
    fn post_objective(
        &mut self,
        model: &CpModel,
    ) -> Result<(DomainId, OptimisationDirection), PostError> {
        let (expr, direction) = match &model.objective {
            Objective::None => {
                return Ok((self.solver.new_bounded_integer(0, 0), OptimisationDirection::Maximise))
            }
            Objective::Maximize(expr) => (expr, OptimisationDirection::Maximise),
            Objective::Minimize(expr) => (expr, OptimisationDirection::Minimise),
        };

        let divisor = expr
            .terms
            .iter()
            .fold(0, |g, &(_, coef)| gcd(g, coef.unsigned_abs()))
            .max(1);
        let divisor = i64::try_from(divisor).map_err(|_| PostError::OutOfRange)?;
        let mut reduced = LinearExpr::new();
        for &(var, coef) in &expr.terms {
            reduced.add_term(var, coef / divisor);
        }

        let (mut lo, mut hi) = model.expr_bounds(&reduced).map_err(|_| PostError::OutOfRange)?;
        if let Some((lb, ub)) = model.objective_bounds {
            let shift = |v: i64| {
                v.checked_sub(expr.constant)
                    .map(|v| v.div_euclid(divisor))
                    .ok_or(PostError::OutOfRange)
            };
            lo = lo.max(shift(lb)?);
            hi = hi.min(shift(ub)?);
            if lo > hi {
                return Err(PostError::Infeasible);
            }
        }

        let fits = |v: i64| i32::try_from(v).is_ok();
        let exact = fits(lo) && fits(hi) && reduced.terms.iter().all(|&(_, coef)| fits(coef));
        let scaled = if exact {
            reduced
        } else {
            let factor = lossy_factor(model, &reduced)?;
            tracing::warn!(
                model = %model.name,
                divisor,
                factor,
                "objective range exceeds i32; coefficients truncated, optimality will not be claimed"
            );
            let mut scaled = LinearExpr::new();
            for &(var, coef) in &reduced.terms {
                scaled.add_term(var, coef / factor);
            }
            (lo, hi) = model.expr_bounds(&scaled).map_err(|_| PostError::OutOfRange)?;
            self.lossy_objective = true;
            scaled
        };

        let objective = self.solver.new_bounded_integer(to_i32(lo)?, to_i32(hi)?);
        let mut terms = self.views(&scaled)?;
        terms.push(objective.scaled(-1));
        let tag = self.solver.new_constraint_tag();
        self.post(cp::equals(terms, 0, tag), None)?;

        Ok((objective, direction))
    }

    fn optimise<T: TerminationCondition>(
        mut self,
        termination: &mut T,
        objective: DomainId,
        direction: OptimisationDirection,
    ) -> Outcome {
        fn noop_callback<B>(_: &Solver, _: SolutionReference, _: &B) {}

        let optimal = if self.lossy_objective {
            SolveStatus::Feasible
        } else {
            SolveStatus::Optimal
        };

        let mut brancher = self.solver.default_brancher();
        let result = self.solver.optimise(
            &mut brancher,
            termination,
            LinearSatUnsat::new(direction, objective, noop_callback),
        );

        match result {
            OptimisationResult::Optimal(solution) => Outcome {
                status: optimal,
                values: Some(extract(&self.ints, &self.bools, &solution)),
            },
            OptimisationResult::Satisfiable(solution) => Outcome {
                status: SolveStatus::Feasible,
                values: Some(extract(&self.ints, &self.bools, &solution)),
            },
            OptimisationResult::Unsatisfiable => Outcome {
                status: SolveStatus::Infeasible,
                values: None,
            },
            OptimisationResult::Unknown => Outcome {
                status: SolveStatus::Unknown,
                values: None,
            },
        }
    }
}

/// Smallest divisor that brings `Σ |coef · bound|` into `i32`.
fn lossy_factor(model: &CpModel, expr: &LinearExpr) -> Result<i64, PostError> {
    let magnitude: u128 = expr
        .terms
        .iter()
        .map(|&(var, coef)| {
            let (lb, ub) = model.var_bounds(var);
            coef.unsigned_abs() as u128 * lb.unsigned_abs().max(ub.unsigned_abs()) as u128
        })
        .sum();
    let factor = magnitude.div_ceil(i32::MAX as u128).max(1);
    i64::try_from(factor).map_err(|_| PostError::OutOfRange)
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn extract<S: ProblemSolution>(ints: &[DomainId], bools: &[Literal], solution: &S) -> (Vec<i64>, Vec<bool>) {
    let ints = ints
        .iter()
        .map(|&d| solution.get_integer_value(d) as i64)
        .collect();
    let bools = bools
        .iter()
        .map(|l| solution.get_integer_value(l.get_integer_variable()) == 1)
        .collect();
    (ints, bools)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(model: &CpModel) -> CpSolution {
        PumpkinSolver::new().solve(model, &SolverConfig::default())
    }

    #[test]
    fn test_maximize_linear() {
        let mut model = CpModel::new("linear");
        let x = model.new_int_var(0, 10, "x");
        let y = model.new_int_var(0, 10, "y");
        model.add(Constraint::le(LinearExpr::sum([x, y]), 7));
        model.maximize(LinearExpr::new().with_term(x, 2).with_term(y, 1));

        let sol = solve(&model);
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.int_value(x), Some(7));
        assert_eq!(sol.objective_value, Some(14));
    }

    #[test]
    fn test_enforced_constraint() {
        let mut model = CpModel::new("enforced");
        let x = model.new_int_var(0, 10, "x");
        let b = model.new_bool_var("b");
        model.add(Constraint::le(x, 3).only_enforce_if(b));
        model.maximize(LinearExpr::new().with_term(x, 1).with_term(b, 20));

        let sol = solve(&model);
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.bool_value(b), Some(true));
        assert_eq!(sol.int_value(x), Some(3));
    }

    #[test]
    fn test_map_domain() {
        let mut model = CpModel::new("map");
        let x = model.new_int_var(0, 3, "x");
        let flags: Vec<BoolVar> = (0..3).map(|i| model.new_bool_var(format!("f{i}"))).collect();
        model.add(Constraint::MapDomain {
            var: x,
            indicators: flags.clone(),
            offset: 1,
        });
        model.add(Constraint::equals(flags[1], 1));

        let sol = solve(&model);
        assert!(sol.is_solution_found());
        assert_eq!(sol.int_value(x), Some(2));
        assert_eq!(sol.bool_value(flags[0]), Some(false));
    }

    #[test]
    fn test_no_overlap() {
        let mut model = CpModel::new("no_overlap");
        let mut intervals = Vec::new();
        for i in 0..2 {
            let start = model.new_int_var(0, 5, format!("s{i}"));
            let size = model.new_int_var(3, 3, format!("d{i}"));
            let end = model.new_int_var(0, 5, format!("e{i}"));
            intervals.push(model.new_interval(start, size, end, format!("iv{i}")));
        }
        model.add(Constraint::NoOverlap(intervals));

        // two size-3 intervals cannot share [0, 5]
        let sol = solve(&model);
        assert_eq!(sol.status, SolveStatus::Infeasible);
    }

    #[test]
    fn test_zero_size_intervals_do_not_conflict() {
        let mut model = CpModel::new("zero_size");
        let long_start = model.new_int_var(0, 0, "long_start");
        let long_size = model.new_int_var(4, 4, "long_size");
        let long_end = model.new_int_var(0, 4, "long_end");
        let empty_start = model.new_int_var(2, 2, "empty_start");
        let empty_size = model.new_int_var(0, 0, "empty_size");
        let empty_end = model.new_int_var(0, 4, "empty_end");
        let long = model.new_interval(long_start, long_size, long_end, "long");
        let empty = model.new_interval(empty_start, empty_size, empty_end, "empty");
        model.add(Constraint::NoOverlap(vec![long, empty]));

        let sol = solve(&model);
        assert!(sol.is_solution_found());
        assert_eq!(sol.int_value(long_end), Some(4));
        assert_eq!(sol.int_value(empty_end), Some(2));
    }

    #[test]
    fn test_invalid_model() {
        let mut model = CpModel::new("invalid");
        model.new_int_var(5, 1, "x");
        assert_eq!(solve(&model).status, SolveStatus::ModelInvalid);
    }

    #[test]
    fn test_out_of_range_domain() {
        let mut model = CpModel::new("range");
        model.new_int_var(0, i64::from(i32::MAX) + 1, "x");
        assert_eq!(solve(&model).status, SolveStatus::ModelInvalid);
    }

    #[test]
    fn test_constant_constraint() {
        let mut model = CpModel::new("constant");
        model.add(Constraint::le(LinearExpr::constant(3), 1));
        assert_eq!(solve(&model).status, SolveStatus::Infeasible);

        let mut model = CpModel::new("guarded_constant");
        let b = model.new_bool_var("b");
        model.add(Constraint::le(LinearExpr::constant(3), 1).only_enforce_if(b));
        let sol = solve(&model);
        assert!(sol.is_solution_found());
        assert_eq!(sol.bool_value(b), Some(false));
    }

    #[test]
    fn test_objective_reduced_by_gcd() {
        let mut model = CpModel::new("gcd");
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        model.add(Constraint::AtMostOne(vec![a, b]));
        model.maximize(
            LinearExpr::new()
                .with_term(a, 3_000_000_000)
                .with_term(b, 4_000_000_000),
        );

        let sol = solve(&model);
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.bool_value(b), Some(true));
        assert_eq!(sol.objective_value, Some(4_000_000_000));
    }

    #[test]
    fn test_declared_objective_bounds() {
        let mut model = CpModel::new("declared");
        let x = model.new_int_var(0, 10, "x");
        model.maximize(LinearExpr::from(x));
        model.set_objective_bounds(0, 5);

        let sol = solve(&model);
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.int_value(x), Some(5));
    }

    #[test]
    fn test_truncated_objective_is_not_optimal() {
        let mut model = CpModel::new("truncated");
        let big = model.new_bool_var("big");
        let small = model.new_bool_var("small");
        model.maximize(
            LinearExpr::new()
                .with_term(big, 4_000_000_000)
                .with_term(small, 1),
        );

        // no common divisor; the small term is lost to truncation
        let sol = solve(&model);
        assert_eq!(sol.status, SolveStatus::Feasible);
        assert_eq!(sol.bool_value(big), Some(true));
        assert!(sol.objective_value.unwrap() >= 4_000_000_000);
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(0, 12), 12);
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(5_555, 7_788), 11);
    }
}
