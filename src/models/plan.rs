//! Plan (decoded solution) model.
//!
//! A plan records, for every candidate of a solved run, whether the
//! placement runs, its `[start, end)` day interval and the realized
//! productivity, together with the concrete schedule matrix the engine
//! chose.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{CandidateKey, MechanicId, PartnerId};

/// A decoded schedule matrix.
///
/// Row `r` stands for start day `r + 1`; cell `(r, o)` is true when the
/// placement starting that day is still active `o` days later.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleMatrix {
    /// Side length `L`.
    pub side: usize,
    /// Row-major cells, `side * side` entries.
    pub cells: Vec<bool>,
}

impl ScheduleMatrix {
    /// Creates an all-false matrix.
    pub fn new(side: usize) -> Self {
        Self {
            side,
            cells: vec![false; side * side],
        }
    }

    /// Cell value, false when out of range.
    pub fn get(&self, row: usize, offset: usize) -> bool {
        row < self.side && offset < self.side && self.cells[row * self.side + offset]
    }

    /// Sets a cell.
    ///
    /// # Panics
    /// Panics if `row` or `offset` is out of range.
    pub fn set(&mut self, row: usize, offset: usize, value: bool) {
        assert!(row < self.side && offset < self.side, "cell out of range");
        self.cells[row * self.side + offset] = value;
    }

    /// The row whose start indicator is set, if any.
    pub fn chosen_row(&self) -> Option<usize> {
        (0..self.side).find(|&r| self.get(r, 0))
    }

    /// Number of true cells in a row.
    pub fn row_len(&self, row: usize) -> usize {
        (0..self.side).filter(|&o| self.get(row, o)).count()
    }

    /// Whether every row's true cells form a prefix.
    pub fn is_prefix_closed(&self) -> bool {
        (0..self.side).all(|r| (1..self.side).all(|o| !self.get(r, o) || self.get(r, o - 1)))
    }
}

/// The decoded outcome of one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    /// Candidate this placement belongs to.
    pub key: CandidateKey,
    /// Whether the placement runs.
    pub is_active: bool,
    /// First active day (1-based), 0 when inactive.
    pub start: i64,
    /// Exclusive end day.
    pub end: i64,
    /// Number of active days.
    pub duration: i64,
    /// Realized productivity under the ramp curve.
    pub productivity: f64,
    /// The engine's schedule matrix.
    pub schedule: ScheduleMatrix,
}

impl Placement {
    /// Interval size (end - start).
    #[inline]
    pub fn size(&self) -> i64 {
        self.end - self.start
    }

    /// Whether two placements share at least one day.
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.size() > 0 && other.size() > 0 && self.start < other.end && other.start < self.end
    }
}

/// A complete decoded plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    /// One placement per candidate, in catalogue order.
    pub placements: Vec<Placement>,
    /// Objective value reported by the engine (productivity units).
    pub objective_value: f64,
}

impl Plan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a placement.
    pub fn add_placement(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    /// Finds the placement of a candidate.
    pub fn placement(&self, key: &CandidateKey) -> Option<&Placement> {
        self.placements.iter().find(|p| &p.key == key)
    }

    /// Placements that run.
    pub fn active_placements(&self) -> Vec<&Placement> {
        self.placements.iter().filter(|p| p.is_active).collect()
    }

    /// All placements hosted by a partner.
    pub fn placements_for_partner(&self, partner: &PartnerId) -> Vec<&Placement> {
        self.placements
            .iter()
            .filter(|p| &p.key.partner == partner)
            .collect()
    }

    /// All placements running a mechanic.
    pub fn placements_for_mechanic(&self, mechanic: &MechanicId) -> Vec<&Placement> {
        self.placements
            .iter()
            .filter(|p| &p.key.mechanic == mechanic)
            .collect()
    }

    /// Days a partner hosts mechanics.
    pub fn partner_days(&self, partner: &PartnerId) -> i64 {
        self.placements_for_partner(partner)
            .iter()
            .map(|p| p.size())
            .sum()
    }

    /// Days a mechanic is deployed.
    pub fn mechanic_days(&self, mechanic: &MechanicId) -> i64 {
        self.placements_for_mechanic(mechanic)
            .iter()
            .map(|p| p.size())
            .sum()
    }

    /// Sum of realized productivity over all placements.
    pub fn total_productivity(&self) -> f64 {
        self.placements.iter().map(|p| p.productivity).sum()
    }

    /// Realized productivity grouped by partner.
    pub fn productivity_by_partner(&self) -> HashMap<PartnerId, f64> {
        let mut by_partner: HashMap<PartnerId, f64> = HashMap::new();
        for p in &self.placements {
            *by_partner.entry(p.key.partner.clone()).or_insert(0.0) += p.productivity;
        }
        by_partner
    }

    /// Number of placements.
    pub fn placement_count(&self) -> usize {
        self.placements.len()
    }
}
