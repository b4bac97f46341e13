//! Triangular start/duration encoding of a candidate's schedule.
//!
//! Each candidate gets an `L×L` grid of booleans. Row `r` stands for
//! calendar start day `r + 1`; cell `(r, o)` means "started on day `r + 1`
//! and still active on day `r + 1 + o`". Rows are prefix-closed and at
//! most one row may start, so the grid jointly encodes the start day (which
//! row) and the duration (how long the prefix is).
//!
//! Day 0 is reserved for "not started": an inactive candidate has
//! `start = 0` and `duration = 0`.

use crate::models::CandidateKey;

use super::model::{BoolVar, Constraint, CpModel, IntVar, IntervalId, LinearExpr};

/// Boolean cell arena of one schedule, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleGrid {
    side: usize,
    cells: Vec<BoolVar>,
}

impl ScheduleGrid {
    /// Side length `L`.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Cell `(row, offset)`.
    ///
    /// # Panics
    /// Panics if `row` or `offset` is `≥ L`.
    pub fn cell(&self, row: usize, offset: usize) -> BoolVar {
        assert!(row < self.side && offset < self.side, "cell out of range");
        self.cells[row * self.side + offset]
    }

    /// Cells of one row, by offset.
    pub fn row(&self, row: usize) -> &[BoolVar] {
        &self.cells[row * self.side..(row + 1) * self.side]
    }

    /// The offset-0 cell of every row.
    pub fn start_indicators(&self) -> Vec<BoolVar> {
        (0..self.side).map(|r| self.cell(r, 0)).collect()
    }

    /// Calendar start day of a row (1-based).
    pub fn start_day(row: usize) -> i64 {
        row as i64 + 1
    }

    /// Whether a cell lies past the horizon: its active day would leave no
    /// room for an exclusive end `≤ L`.
    pub fn is_beyond_horizon(&self, row: usize, offset: usize) -> bool {
        row + offset + 1 >= self.side
    }
}

/// Model variables of one candidate.
#[derive(Debug, Clone)]
pub struct AssignmentVars {
    pub key: CandidateKey,
    pub productivity_ref: i64,
    pub is_active: BoolVar,
    pub not_is_active: BoolVar,
    pub start: IntVar,
    pub end: IntVar,
    pub duration: IntVar,
    pub interval: IntervalId,
    pub schedule: ScheduleGrid,
}

/// Allocates a candidate's variables and posts the structural schedule
/// constraints.
///
/// Posted constraints:
/// - row prefix property: `cell(r, o) ≤ cell(r, o - 1)`
/// - at most one start indicator
/// - per row, enforced by its start indicator: `Σ_o cell(r, o) = duration`
/// - `cell(r, 0) ⇔ start = r + 1` (no row ⇒ `start = 0`)
/// - `is_active = Σ_r cell(r, 0)` and `duration ≤ L · is_active`
/// - cells past the horizon fixed false
///
/// `horizon == 0` produces an empty grid and a candidate that can never be
/// active.
pub fn encode_schedule(
    model: &mut CpModel,
    key: CandidateKey,
    productivity_ref: i64,
    horizon: usize,
) -> AssignmentVars {
    let prefix = key.to_string();
    let l = horizon as i64;

    let is_active = model.new_bool_var(format!("is_active{prefix}"));
    let not_is_active = model.new_bool_var(format!("not_is_active{prefix}"));
    let start = model.new_int_var(0, l, format!("start{prefix}"));
    let duration = model.new_int_var(0, l, format!("duration{prefix}"));
    let end = model.new_int_var(0, 2 * l, format!("end{prefix}"));
    let interval = model.new_interval(start, duration, end, format!("interval{prefix}"));

    let mut cells = Vec::with_capacity(horizon * horizon);
    for r in 0..horizon {
        for o in 0..horizon {
            cells.push(model.new_bool_var(format!("schedule{prefix}[{r},{o}]")));
        }
    }
    let schedule = ScheduleGrid {
        side: horizon,
        cells,
    };

    for r in 0..horizon {
        for o in 1..horizon {
            let expr = LinearExpr::new()
                .with_term(schedule.cell(r, o), 1)
                .with_term(schedule.cell(r, o - 1), -1);
            model.add(Constraint::le(expr, 0));
        }
    }

    let starts = schedule.start_indicators();
    model.add(Constraint::AtMostOne(starts.clone()));

    for (r, &indicator) in starts.iter().enumerate() {
        let row_sum = LinearExpr::sum(schedule.row(r).iter().copied()).with_term(duration, -1);
        model.add(Constraint::equals(row_sum, 0).only_enforce_if(indicator));
    }

    model.add(Constraint::MapDomain {
        var: start,
        indicators: starts.clone(),
        offset: 1,
    });

    let activation = LinearExpr::sum(starts.iter().copied()).with_term(is_active, -1);
    model.add(Constraint::equals(activation, 0));

    let idle_duration = LinearExpr::from(duration).with_term(is_active, -l);
    model.add(Constraint::le(idle_duration, 0));

    let beyond: Vec<BoolVar> = (0..horizon)
        .flat_map(|r| (0..horizon).map(move |o| (r, o)))
        .filter(|&(r, o)| schedule.is_beyond_horizon(r, o))
        .map(|(r, o)| schedule.cell(r, o))
        .collect();
    if !beyond.is_empty() {
        model.add(Constraint::equals(LinearExpr::sum(beyond), 0));
    }

    tracing::debug!(candidate = %key, horizon, "encoded schedule grid");

    AssignmentVars {
        key,
        productivity_ref,
        is_active,
        not_is_active,
        start,
        end,
        duration,
        interval,
        schedule,
    }
}
