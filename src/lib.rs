//! Promotion scheduling on a constraint engine.
//!
//! Decides which partner × mechanic promotions to run, on which start day
//! and for how long, so that ramp-weighted productivity is maximized under
//! partner and mechanic day capacities.
//!
//! # Modules
//!
//! - **`models`**: Domain types. `Partner`, `Mechanic`, `Candidate`,
//!   `Catalogue`, `SystemSettings`, `Plan`
//! - **`validation`**: Catalogue integrity checks (duplicate IDs, dangling refs,
//!   negative capacities)
//! - **`curve`**: The day-by-day productivity ramp
//! - **`cp`**: Model IR, schedule encoding, constraints, objective, engine
//!   adapters and the build → solve → decode lifecycle
//! - **`report`**: KPIs and plain-text rendering of plans and statistics
//!
//! # Example
//!
//! ```no_run
//! use promo_schedule::cp::{PromotionCpBuilder, PumpkinSolver, SolverConfig};
//! use promo_schedule::models::{Catalogue, Mechanic, Partner, SystemSettings};
//! use promo_schedule::report::render_plan;
//!
//! let catalogue = Catalogue::cartesian(
//!     vec![Partner::new("amz", 10), Partner::new("nike", 7)],
//!     vec![Mechanic::new("dz1", 10)],
//!     |_, _| 1000,
//! )
//! .with_settings(SystemSettings::new(3));
//!
//! let run = PromotionCpBuilder::new(&catalogue)?
//!     .solve(&PumpkinSolver::new(), &SolverConfig::default());
//! println!("{}", render_plan(&run.decode()?));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # References
//!
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod cp;
pub mod curve;
pub mod models;
pub mod report;
pub mod validation;
