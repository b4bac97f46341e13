//! Promotion scheduling domain models.
//!
//! Provides the data types describing a promotion allocation problem and
//! its decoded solution.
//!
//! | Type | Meaning |
//! |------|---------|
//! | Partner | Storefront hosting mechanics, with a day capacity |
//! | Mechanic | Promotional operation, with a day capacity across partners |
//! | Candidate | Partner × mechanic pairing with baseline productivity |
//! | Catalogue | Everything above plus `SystemSettings` |
//! | Plan | Decoded placements of a solved run |

mod candidate;
mod catalogue;
mod mechanic;
mod partner;
mod plan;
mod settings;

pub use candidate::{Candidate, CandidateKey};
pub use catalogue::{Catalogue, CatalogueError};
pub use mechanic::{Mechanic, MechanicId};
pub use partner::{Partner, PartnerId};
pub use plan::{Placement, Plan, ScheduleMatrix};
pub use settings::SystemSettings;
