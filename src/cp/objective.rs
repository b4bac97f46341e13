//! Productivity objective.

use crate::curve;

use super::encoder::{AssignmentVars, ScheduleGrid};
use super::model::{LinearExpr, ModelError};

/// Ramp-weighted productivity of one assignment, scaled by
/// [`curve::SCALE`].
///
/// Each row is weighted with the coefficient vector of its own start day.
pub fn contribution_expr(vars: &AssignmentVars) -> LinearExpr {
    let grid = &vars.schedule;
    let mut expr = LinearExpr::new();
    for r in 0..grid.side() {
        let coefficients =
            curve::row_coefficients(ScheduleGrid::start_day(r), grid.side(), vars.productivity_ref);
        for (o, coef) in coefficients.into_iter().enumerate() {
            expr.add_term(grid.cell(r, o), coef);
        }
    }
    expr
}

/// Sum of every assignment's contribution.
pub fn productivity_objective(assignments: &[AssignmentVars]) -> LinearExpr {
    let mut total = LinearExpr::new();
    for vars in assignments {
        total.terms.extend(contribution_expr(vars).terms);
    }
    total
}

/// Reachable range of [`productivity_objective`].
///
/// At most one row of a grid is ever started and cells past the horizon are
/// fixed false, so a candidate contributes at most its best in-horizon row.
pub fn productivity_bounds(assignments: &[AssignmentVars]) -> Result<(i64, i64), ModelError> {
    let mut lo: i64 = 0;
    let mut hi: i64 = 0;
    for vars in assignments {
        let grid = &vars.schedule;
        let (mut best_lo, mut best_hi) = (0, 0);
        for r in 0..grid.side() {
            let coefficients =
                curve::row_coefficients(ScheduleGrid::start_day(r), grid.side(), vars.productivity_ref);
            let (mut row_lo, mut row_hi): (i64, i64) = (0, 0);
            for (o, coef) in coefficients.into_iter().enumerate() {
                if grid.is_beyond_horizon(r, o) {
                    continue;
                }
                if coef > 0 {
                    row_hi = row_hi.checked_add(coef).ok_or(ModelError::Overflow)?;
                } else {
                    row_lo = row_lo.checked_add(coef).ok_or(ModelError::Overflow)?;
                }
            }
            best_lo = best_lo.min(row_lo);
            best_hi = best_hi.max(row_hi);
        }
        lo = lo.checked_add(best_lo).ok_or(ModelError::Overflow)?;
        hi = hi.checked_add(best_hi).ok_or(ModelError::Overflow)?;
    }
    Ok((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::encoder::encode_schedule;
    use crate::cp::model::{CpModel, Var};
    use crate::models::CandidateKey;

    #[test]
    fn test_contribution_expr_coefficients() {
        let mut model = CpModel::new("objective");
        let vars = encode_schedule(&mut model, CandidateKey::new("P1", "M1"), 1000, 6);
        let expr = contribution_expr(&vars);

        let coef = |r: usize, o: usize| {
            expr.terms
                .iter()
                .find(|(v, _)| *v == Var::Bool(vars.schedule.cell(r, o)))
                .map(|(_, c)| *c)
        };
        // offset 0 carries no weight and is dropped
        assert_eq!(coef(0, 0), None);
        assert_eq!(coef(0, 1), Some(1000 * 5_555));
        assert_eq!(coef(2, 4), Some(1000 * curve::SCALE));
        assert_eq!(coef(5, 5), Some(1000 * 5_547));
        // 6 rows × 5 non-zero offsets
        assert_eq!(expr.terms.len(), 30);
    }

    #[test]
    fn test_objective_sums_candidates() {
        let mut model = CpModel::new("objective");
        let a = encode_schedule(&mut model, CandidateKey::new("P1", "M1"), 10, 3);
        let b = encode_schedule(&mut model, CandidateKey::new("P1", "M2"), 20, 2);
        let total = productivity_objective(&[a.clone(), b.clone()]);
        assert_eq!(
            total.terms.len(),
            contribution_expr(&a).terms.len() + contribution_expr(&b).terms.len()
        );
        assert_eq!(total.constant, 0);
    }

    #[test]
    fn test_zero_productivity_is_empty() {
        let mut model = CpModel::new("objective");
        let vars = encode_schedule(&mut model, CandidateKey::new("P1", "M1"), 0, 4);
        assert!(contribution_expr(&vars).is_constant());
    }

    #[test]
    fn test_bounds_take_best_row() {
        let mut model = CpModel::new("objective");
        let a = encode_schedule(&mut model, CandidateKey::new("P1", "M1"), 1000, 10);
        // row 0 keeps offsets 0..=8: 0 + 5555 + 7788 + 9930 + 10000 + 5547 + 4201 + 2962 + 10000
        assert_eq!(productivity_bounds(&[a.clone()]), Ok((0, 1000 * 55_983)));

        let b = encode_schedule(&mut model, CandidateKey::new("P2", "M1"), 2, 4);
        assert_eq!(
            productivity_bounds(&[a.clone(), b]),
            Ok((0, 1000 * 55_983 + 2 * 13_343))
        );

        let (_, loose_hi) = model.expr_bounds(&contribution_expr(&a)).unwrap();
        assert!(loose_hi > 1000 * 55_983);
    }

    #[test]
    fn test_bounds_of_empty_grid() {
        let mut model = CpModel::new("objective");
        let vars = encode_schedule(&mut model, CandidateKey::new("P1", "M1"), 1000, 0);
        assert_eq!(productivity_bounds(&[vars]), Ok((0, 0)));
        assert_eq!(productivity_bounds(&[]), Ok((0, 0)));
    }

    #[test]
    fn test_bounds_overflow() {
        let mut model = CpModel::new("objective");
        let vars = encode_schedule(
            &mut model,
            CandidateKey::new("P1", "M1"),
            curve::MAX_PRODUCTIVITY_REF,
            6,
        );
        assert_eq!(productivity_bounds(&[vars]), Err(ModelError::Overflow));
    }
}
