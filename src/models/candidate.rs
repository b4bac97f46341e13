//! Candidate (partner × mechanic pairing) model.
//!
//! A candidate is a placement the optimizer may activate: one mechanic run
//! by one partner, with the per-day productivity the pairing reaches once
//! fully ramped up.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{MechanicId, PartnerId};

/// Composite lookup key of a candidate.
///
/// Keyed by the pair of identifiers, so ids containing separators such as
/// `_` can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateKey {
    /// Hosting partner.
    pub partner: PartnerId,
    /// Mechanic being run.
    pub mechanic: MechanicId,
}

impl CandidateKey {
    /// Creates a key from partner and mechanic identifiers.
    pub fn new(partner: impl Into<String>, mechanic: impl Into<String>) -> Self {
        Self {
            partner: PartnerId::new(partner),
            mechanic: MechanicId::new(mechanic),
        }
    }
}

impl fmt::Display for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.partner, self.mechanic)
    }
}

/// A partner × mechanic pairing eligible for activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Hosting partner.
    pub partner_id: PartnerId,
    /// Mechanic being run.
    pub mechanic_id: MechanicId,
    /// Baseline per-day productivity once the placement is fully ramped.
    pub productivity_ref: i64,
}

impl Candidate {
    /// Creates a candidate pairing.
    pub fn new(
        partner_id: impl Into<String>,
        mechanic_id: impl Into<String>,
        productivity_ref: i64,
    ) -> Self {
        Self {
            partner_id: PartnerId::new(partner_id),
            mechanic_id: MechanicId::new(mechanic_id),
            productivity_ref,
        }
    }

    /// The composite key of this pairing.
    pub fn key(&self) -> CandidateKey {
        CandidateKey {
            partner: self.partner_id.clone(),
            mechanic: self.mechanic_id.clone(),
        }
    }
}
