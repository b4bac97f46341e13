//! Partner model.
//!
//! Partners are the storefronts that host promotional mechanics. Each
//! partner has a day capacity: the total number of days it can host any
//! mechanic within the planning horizon. The capacity doubles as the
//! partner's calendar window, so no placement may end after it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a [`Partner`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartnerId(pub String);

impl PartnerId {
    /// Creates a partner identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartnerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A partner that can host mechanics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    /// Unique partner identifier.
    pub id: PartnerId,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Days this partner can host mechanics within the horizon.
    pub availability: i64,
    /// Domain-specific metadata.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl Partner {
    /// Creates a partner with the given day capacity.
    pub fn new(id: impl Into<String>, availability: i64) -> Self {
        Self {
            id: PartnerId::new(id),
            name: String::new(),
            availability,
            attributes: HashMap::new(),
        }
    }

    /// Sets the partner name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
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
