//! Mechanic model.
//!
//! A mechanic is a promotional operation (discount tier, cashback, bundle)
//! that partners run. Its availability caps the total number of days it can
//! be deployed, summed over every partner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a [`Mechanic`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MechanicId(pub String);

impl MechanicId {
    /// Creates a mechanic identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MechanicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MechanicId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A promotional mechanic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mechanic {
    /// Unique mechanic identifier.
    pub id: MechanicId,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Days this mechanic can be deployed across all partners.
    pub availability: i64,
}

impl Mechanic {
    /// Creates a mechanic with the given day capacity.
    pub fn new(id: impl Into<String>, availability: i64) -> Self {
        Self {
            id: MechanicId::new(id),
            name: String::new(),
            availability,
        }
    }

    /// Sets the mechanic name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Name for display, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}
