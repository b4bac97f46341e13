//! Plan quality metrics and text rendering.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Active placements | Candidates with `is_active` |
//! | Total productivity | Sum of realized ramp-weighted productivity |
//! | Partner utilization | Promotion days / partner availability |
//! | Mechanic utilization | Promotion days / mechanic availability |

use std::collections::HashMap;
use std::fmt::Write;

use crate::cp::SolveStatistics;
use crate::models::{Catalogue, MechanicId, PartnerId, Plan};

/// Plan performance indicators.
#[derive(Debug, Clone)]
pub struct PlanKpi {
    /// Number of active placements.
    pub active_placements: usize,
    /// Sum of realized productivity.
    pub total_productivity: f64,
    /// Per-partner utilization (0.0..1.0).
    pub partner_utilization: HashMap<PartnerId, f64>,
    /// Per-mechanic utilization (0.0..1.0).
    pub mechanic_utilization: HashMap<MechanicId, f64>,
    /// Mean partner utilization.
    pub avg_partner_utilization: f64,
}

impl PlanKpi {
    /// Computes KPIs from a decoded plan and its catalogue.
    ///
    /// Entities with zero availability report 0.0 utilization.
    pub fn calculate(plan: &Plan, catalogue: &Catalogue) -> Self {
        let partner_utilization: HashMap<PartnerId, f64> = catalogue
            .partners
            .iter()
            .map(|p| {
                let used = plan.partner_days(&p.id);
                (p.id.clone(), ratio(used, p.availability))
            })
            .collect();

        let mechanic_utilization = catalogue
            .mechanics
            .iter()
            .map(|m| {
                let used = plan.mechanic_days(&m.id);
                (m.id.clone(), ratio(used, m.availability))
            })
            .collect();

        let avg_partner_utilization = if partner_utilization.is_empty() {
            0.0
        } else {
            let sum: f64 = partner_utilization.values().sum();
            sum / partner_utilization.len() as f64
        };

        Self {
            active_placements: plan.active_placements().len(),
            total_productivity: plan.total_productivity(),
            partner_utilization,
            mechanic_utilization,
            avg_partner_utilization,
        }
    }
}

fn ratio(used: i64, available: i64) -> f64 {
    if available <= 0 {
        0.0
    } else {
        used as f64 / available as f64
    }
}

/// Renders active placements, one per line, followed by the objective.
///
/// Placements keep catalogue order.
pub fn render_plan(plan: &Plan) -> String {
    let mut out = String::new();
    for p in plan.active_placements() {
        let _ = writeln!(
            out,
            "Partner {} with mechanic {} from day {} to {} resulting in {:.2}",
            p.key.partner, p.key.mechanic, p.start, p.end, p.productivity
        );
    }
    let _ = writeln!(out, "Objective value: {:.2}", plan.objective_value);
    out
}

/// Renders engine statistics. Unavailable counters print as `n/a`.
pub fn render_statistics(stats: &SolveStatistics) -> String {
    let counter = |c: Option<u64>| c.map_or_else(|| "n/a".to_string(), |v| v.to_string());
    format!(
        "Statistics\n  - conflicts: {}\n  - branches : {}\n  - wall time: {:.3} s\n",
        counter(stats.conflicts),
        counter(stats.branches),
        stats.wall_time.as_secs_f64()
    )
}
