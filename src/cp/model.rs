//! Constraint model IR.
//!
//! A small, engine-neutral description of a constraint program: bounded
//! integer and boolean variables held in arenas, linear constraints,
//! enforcement (half-reification), intervals, no-overlap and domain
//! mapping, plus a linear objective. Engines translate this IR into their
//! own primitives (see [`super::CpSolver`]).
//!
//! The model is serializable so it can be exported for debugging.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Handle of an integer variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntVar(pub(crate) usize);

/// Handle of a boolean variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoolVar(pub(crate) usize);

/// Handle of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntervalId(pub(crate) usize);

impl IntVar {
    /// Arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl BoolVar {
    /// Arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl IntervalId {
    /// Arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A variable appearing in a linear term. Booleans count as 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Var {
    Int(IntVar),
    Bool(BoolVar),
}

impl From<IntVar> for Var {
    fn from(v: IntVar) -> Self {
        Var::Int(v)
    }
}

impl From<BoolVar> for Var {
    fn from(v: BoolVar) -> Self {
        Var::Bool(v)
    }
}

/// Declaration of an integer variable with domain `[lb, ub]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntVarDef {
    pub name: String,
    pub lb: i64,
    pub ub: i64,
}

/// Declaration of a boolean variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolVarDef {
    pub name: String,
}

/// An interval `[start, end)` with `end = start + size`.
///
/// Engines post the `end = start + size` relation themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalVar {
    pub name: String,
    pub start: IntVar,
    pub size: IntVar,
    pub end: IntVar,
}

/// `Σ coef · var + constant` with integer coefficients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearExpr {
    pub terms: Vec<(Var, i64)>,
    pub constant: i64,
}

impl LinearExpr {
    /// The zero expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// A constant expression.
    pub fn constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Sum of variables with coefficient 1.
    pub fn sum<V, I>(vars: I) -> Self
    where
        V: Into<Var>,
        I: IntoIterator<Item = V>,
    {
        Self {
            terms: vars.into_iter().map(|v| (v.into(), 1)).collect(),
            constant: 0,
        }
    }

    /// Adds `coef · var` (builder style).
    pub fn with_term(mut self, var: impl Into<Var>, coef: i64) -> Self {
        self.add_term(var, coef);
        self
    }

    /// Adds `coef · var`. Zero coefficients are dropped.
    pub fn add_term(&mut self, var: impl Into<Var>, coef: i64) {
        if coef != 0 {
            self.terms.push((var.into(), coef));
        }
    }

    /// Whether the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }
}

impl From<IntVar> for LinearExpr {
    fn from(var: IntVar) -> Self {
        LinearExpr::new().with_term(var, 1)
    }
}

impl From<BoolVar> for LinearExpr {
    fn from(var: BoolVar) -> Self {
        LinearExpr::new().with_term(var, 1)
    }
}

/// A model constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    /// `lb ≤ expr ≤ ub`; a missing side is unbounded.
    Linear {
        expr: LinearExpr,
        lb: Option<i64>,
        ub: Option<i64>,
    },

    /// At most one of the booleans is true.
    AtMostOne(Vec<BoolVar>),

    /// `constraint` must hold whenever `guard` is true; no effect otherwise.
    ///
    /// Only `Linear` and `AtMostOne` may be enforced.
    Enforced {
        guard: BoolVar,
        constraint: Box<Constraint>,
    },

    /// The intervals are pairwise disjoint. Zero-size intervals never
    /// conflict.
    NoOverlap(Vec<IntervalId>),

    /// `indicators[i] ⇔ var == offset + i`.
    MapDomain {
        var: IntVar,
        indicators: Vec<BoolVar>,
        offset: i64,
    },
}

impl Constraint {
    /// `expr ≤ ub`.
    pub fn le(expr: impl Into<LinearExpr>, ub: i64) -> Self {
        Self::Linear {
            expr: expr.into(),
            lb: None,
            ub: Some(ub),
        }
    }

    /// `expr ≥ lb`.
    pub fn ge(expr: impl Into<LinearExpr>, lb: i64) -> Self {
        Self::Linear {
            expr: expr.into(),
            lb: Some(lb),
            ub: None,
        }
    }

    /// `expr == value`.
    pub fn equals(expr: impl Into<LinearExpr>, value: i64) -> Self {
        Self::Linear {
            expr: expr.into(),
            lb: Some(value),
            ub: Some(value),
        }
    }

    /// Wraps this constraint so it only holds when `guard` is true.
    pub fn only_enforce_if(self, guard: BoolVar) -> Self {
        Self::Enforced {
            guard,
            constraint: Box::new(self),
        }
    }
}

/// Optimization direction and expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    /// Pure satisfaction.
    #[default]
    None,
    Maximize(LinearExpr),
    Minimize(LinearExpr),
}

/// Structural problems found in a model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("variable '{name}' has empty domain [{lb}, {ub}]")]
    EmptyDomain { name: String, lb: i64, ub: i64 },
    #[error("unknown integer variable #{0}")]
    UnknownIntVar(usize),
    #[error("unknown boolean variable #{0}")]
    UnknownBoolVar(usize),
    #[error("unknown interval #{0}")]
    UnknownInterval(usize),
    #[error("linear constraint has lb {lb} > ub {ub}")]
    EmptyRange { lb: i64, ub: i64 },
    #[error("only linear and at-most-one constraints can be enforced")]
    UnsupportedEnforcement,
    #[error("arithmetic overflow while bounding an expression")]
    Overflow,
}

/// A constraint program.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpModel {
    pub name: String,
    pub int_vars: Vec<IntVarDef>,
    pub bool_vars: Vec<BoolVarDef>,
    pub intervals: Vec<IntervalVar>,
    pub constraints: Vec<Constraint>,
    pub objective: Objective,
    /// Declared reachable range of the objective expression, when the
    /// builder knows one tighter than its per-term domain bounds.
    #[serde(default)]
    pub objective_bounds: Option<(i64, i64)>,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Declares an integer variable with domain `[lb, ub]`.
    pub fn new_int_var(&mut self, lb: i64, ub: i64, name: impl Into<String>) -> IntVar {
        self.int_vars.push(IntVarDef {
            name: name.into(),
            lb,
            ub,
        });
        IntVar(self.int_vars.len() - 1)
    }

    /// Declares a boolean variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        self.bool_vars.push(BoolVarDef { name: name.into() });
        BoolVar(self.bool_vars.len() - 1)
    }

    /// Declares an interval over existing start/size/end variables.
    pub fn new_interval(
        &mut self,
        start: IntVar,
        size: IntVar,
        end: IntVar,
        name: impl Into<String>,
    ) -> IntervalId {
        self.intervals.push(IntervalVar {
            name: name.into(),
            start,
            size,
            end,
        });
        IntervalId(self.intervals.len() - 1)
    }

    /// Adds a constraint.
    pub fn add(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Sets a maximization objective.
    pub fn maximize(&mut self, expr: LinearExpr) {
        self.objective = Objective::Maximize(expr);
    }

    /// Sets a minimization objective.
    pub fn minimize(&mut self, expr: LinearExpr) {
        self.objective = Objective::Minimize(expr);
    }

    /// Declares the reachable range of the objective.
    ///
    /// Must hold for every solution; engines may use it as the domain of
    /// the objective.
    pub fn set_objective_bounds(&mut self, lb: i64, ub: i64) {
        self.objective_bounds = Some((lb, ub));
    }

    /// Integer variable declaration.
    pub fn int_var(&self, var: IntVar) -> &IntVarDef {
        &self.int_vars[var.0]
    }

    /// Boolean variable declaration.
    pub fn bool_var(&self, var: BoolVar) -> &BoolVarDef {
        &self.bool_vars[var.0]
    }

    /// Interval declaration.
    pub fn interval(&self, id: IntervalId) -> &IntervalVar {
        &self.intervals[id.0]
    }

    pub fn int_var_count(&self) -> usize {
        self.int_vars.len()
    }

    pub fn bool_var_count(&self) -> usize {
        self.bool_vars.len()
    }

    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Domain bounds of a term variable.
    pub fn var_bounds(&self, var: Var) -> (i64, i64) {
        match var {
            Var::Int(v) => {
                let def = self.int_var(v);
                (def.lb, def.ub)
            }
            Var::Bool(_) => (0, 1),
        }
    }

    /// Smallest and largest value `expr` can take over the variable domains.
    pub fn expr_bounds(&self, expr: &LinearExpr) -> Result<(i64, i64), ModelError> {
        let mut lo = expr.constant;
        let mut hi = expr.constant;
        for &(var, coef) in &expr.terms {
            self.check_var(var)?;
            let (lb, ub) = self.var_bounds(var);
            let a = lb.checked_mul(coef).ok_or(ModelError::Overflow)?;
            let b = ub.checked_mul(coef).ok_or(ModelError::Overflow)?;
            lo = lo.checked_add(a.min(b)).ok_or(ModelError::Overflow)?;
            hi = hi.checked_add(a.max(b)).ok_or(ModelError::Overflow)?;
        }
        Ok((lo, hi))
    }

    /// Checks that the model is structurally sound.
    ///
    /// Engines call this before translating; builders call it to fail fast.
    pub fn validate(&self) -> Result<(), ModelError> {
        for def in &self.int_vars {
            if def.lb > def.ub {
                return Err(ModelError::EmptyDomain {
                    name: def.name.clone(),
                    lb: def.lb,
                    ub: def.ub,
                });
            }
        }

        for interval in &self.intervals {
            for var in [interval.start, interval.size, interval.end] {
                self.check_var(Var::Int(var))?;
            }
        }

        for constraint in &self.constraints {
            self.check_constraint(constraint, false)?;
        }

        match &self.objective {
            Objective::None => {}
            Objective::Maximize(expr) | Objective::Minimize(expr) => {
                self.expr_bounds(expr)?;
            }
        }
        if let Some((lb, ub)) = self.objective_bounds {
            if lb > ub {
                return Err(ModelError::EmptyRange { lb, ub });
            }
        }

        Ok(())
    }

    fn check_var(&self, var: Var) -> Result<(), ModelError> {
        match var {
            Var::Int(v) if v.0 >= self.int_vars.len() => Err(ModelError::UnknownIntVar(v.0)),
            Var::Bool(v) if v.0 >= self.bool_vars.len() => Err(ModelError::UnknownBoolVar(v.0)),
            _ => Ok(()),
        }
    }

    fn check_constraint(&self, constraint: &Constraint, enforced: bool) -> Result<(), ModelError> {
        match constraint {
            Constraint::Linear { expr, lb, ub } => {
                self.expr_bounds(expr)?;
                if let (Some(lb), Some(ub)) = (lb, ub) {
                    if lb > ub {
                        return Err(ModelError::EmptyRange { lb: *lb, ub: *ub });
                    }
                }
            }
            Constraint::AtMostOne(vars) => {
                for &v in vars {
                    self.check_var(Var::Bool(v))?;
                }
            }
            Constraint::Enforced { guard, constraint } => {
                self.check_var(Var::Bool(*guard))?;
                match constraint.as_ref() {
                    Constraint::Linear { .. } | Constraint::AtMostOne(_) => {
                        self.check_constraint(constraint, true)?;
                    }
                    _ => return Err(ModelError::UnsupportedEnforcement),
                }
            }
            Constraint::NoOverlap(ids) => {
                if enforced {
                    return Err(ModelError::UnsupportedEnforcement);
                }
                for id in ids {
                    if id.0 >= self.intervals.len() {
                        return Err(ModelError::UnknownInterval(id.0));
                    }
                }
            }
            Constraint::MapDomain {
                var, indicators, ..
            } => {
                if enforced {
                    return Err(ModelError::UnsupportedEnforcement);
                }
                self.check_var(Var::Int(*var))?;
                for &b in indicators {
                    self.check_var(Var::Bool(b))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_model() {
        let mut model = CpModel::new("test");
        let start = model.new_int_var(0, 10, "start");
        let size = model.new_int_var(0, 5, "size");
        let end = model.new_int_var(0, 15, "end");
        let active = model.new_bool_var("active");
        let iv = model.new_interval(start, size, end, "iv");

        model.add(Constraint::ge(size, 2).only_enforce_if(active));
        model.add(Constraint::NoOverlap(vec![iv]));
        model.maximize(LinearExpr::from(size).with_term(active, 3));

        assert_eq!(model.int_var_count(), 3);
        assert_eq!(model.bool_var_count(), 1);
        assert_eq!(model.interval_count(), 1);
        assert_eq!(model.constraint_count(), 2);
        assert_eq!(model.interval(iv).size, size);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_expr_bounds() {
        let mut model = CpModel::new("bounds");
        let x = model.new_int_var(-2, 3, "x");
        let b = model.new_bool_var("b");
        let expr = LinearExpr::constant(1).with_term(x, -2).with_term(b, 5);
        assert_eq!(model.expr_bounds(&expr), Ok((-5, 10)));
    }

    #[test]
    fn test_zero_coefficient_dropped() {
        let mut model = CpModel::new("zero");
        let b = model.new_bool_var("b");
        let expr = LinearExpr::new().with_term(b, 0);
        assert!(expr.is_constant());
    }

    #[test]
    fn test_validate_empty_domain() {
        let mut model = CpModel::new("bad");
        model.new_int_var(3, 1, "x");
        assert!(matches!(
            model.validate(),
            Err(ModelError::EmptyDomain { lb: 3, ub: 1, .. })
        ));
    }

    #[test]
    fn test_validate_dangling_reference() {
        let mut model = CpModel::new("bad");
        model.add(Constraint::le(IntVar(7), 1));
        assert_eq!(model.validate(), Err(ModelError::UnknownIntVar(7)));

        let mut model = CpModel::new("bad");
        model.add(Constraint::NoOverlap(vec![IntervalId(0)]));
        assert_eq!(model.validate(), Err(ModelError::UnknownInterval(0)));
    }

    #[test]
    fn test_validate_unsupported_enforcement() {
        let mut model = CpModel::new("bad");
        let b = model.new_bool_var("b");
        let x = model.new_int_var(0, 3, "x");
        model.add(
            Constraint::MapDomain {
                var: x,
                indicators: vec![],
                offset: 1,
            }
            .only_enforce_if(b),
        );
        assert_eq!(model.validate(), Err(ModelError::UnsupportedEnforcement));
    }

    #[test]
    fn test_validate_overflow() {
        let mut model = CpModel::new("big");
        let x = model.new_int_var(0, i64::MAX, "x");
        model.maximize(LinearExpr::from(x).with_term(x, 2));
        assert_eq!(model.validate(), Err(ModelError::Overflow));
    }

    #[test]
    fn test_validate_objective_bounds() {
        let mut model = CpModel::new("bounds");
        let x = model.new_int_var(0, 4, "x");
        model.maximize(LinearExpr::from(x));
        model.set_objective_bounds(0, 3);
        assert!(model.validate().is_ok());

        model.set_objective_bounds(3, 0);
        assert_eq!(model.validate(), Err(ModelError::EmptyRange { lb: 3, ub: 0 }));
    }

    #[test]
    fn test_serializes() {
        let mut model = CpModel::new("json");
        let x = model.new_int_var(0, 4, "x");
        model.add(Constraint::equals(x, 2));
        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains("\"json\""));
        let back: CpModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.constraints, model.constraints);
    }
}
