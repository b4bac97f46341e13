//! Problem catalogue.
//!
//! The fixed list of partners, mechanics and allowed pairings for a run,
//! together with the run's [`SystemSettings`]. Catalogues are plain data:
//! they can be built in code or loaded from JSON fixtures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Candidate, Mechanic, MechanicId, Partner, PartnerId, SystemSettings};

/// Errors raised while loading a catalogue.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// The JSON document could not be parsed.
    #[error("failed to parse catalogue: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Partners, mechanics and candidate pairings of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalogue {
    /// Partners that can host mechanics.
    pub partners: Vec<Partner>,
    /// Mechanics that can be deployed.
    pub mechanics: Vec<Mechanic>,
    /// Allowed pairings with their productivity.
    pub candidates: Vec<Candidate>,
    /// Run-wide settings.
    #[serde(default)]
    pub settings: SystemSettings,
}

impl Catalogue {
    /// Creates an empty catalogue with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a catalogue from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogueError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the full Cartesian product of partners and mechanics.
    ///
    /// `productivity` supplies `productivity_ref` for each pairing.
    pub fn cartesian<F>(partners: Vec<Partner>, mechanics: Vec<Mechanic>, productivity: F) -> Self
    where
        F: Fn(&Partner, &Mechanic) -> i64,
    {
        let mut candidates = Vec::with_capacity(partners.len() * mechanics.len());
        for partner in &partners {
            for mechanic in &mechanics {
                candidates.push(Candidate {
                    partner_id: partner.id.clone(),
                    mechanic_id: mechanic.id.clone(),
                    productivity_ref: productivity(partner, mechanic),
                });
            }
        }

        Self {
            partners,
            mechanics,
            candidates,
            settings: SystemSettings::default(),
        }
    }

    /// Adds a partner.
    pub fn with_partner(mut self, partner: Partner) -> Self {
        self.partners.push(partner);
        self
    }

    /// Adds a mechanic.
    pub fn with_mechanic(mut self, mechanic: Mechanic) -> Self {
        self.mechanics.push(mechanic);
        self
    }

    /// Adds a candidate pairing.
    pub fn with_candidate(mut self, candidate: Candidate) -> Self {
        self.candidates.push(candidate);
        self
    }

    /// Replaces the run settings.
    pub fn with_settings(mut self, settings: SystemSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Finds a partner by ID.
    pub fn partner(&self, id: &PartnerId) -> Option<&Partner> {
        self.partners.iter().find(|p| &p.id == id)
    }

    /// Finds a mechanic by ID.
    pub fn mechanic(&self, id: &MechanicId) -> Option<&Mechanic> {
        self.mechanics.iter().find(|m| &m.id == id)
    }

    /// Schedule horizon `L` of a candidate: the larger of its partner's and
    /// mechanic's availability. `None` if either reference is unknown.
    pub fn horizon(&self, candidate: &Candidate) -> Option<i64> {
        let partner = self.partner(&candidate.partner_id)?;
        let mechanic = self.mechanic(&candidate.mechanic_id)?;
        Some(partner.availability.max(mechanic.availability).max(0))
    }
}
