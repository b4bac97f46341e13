//! Process-wide tunables.

use serde::{Deserialize, Serialize};

/// Settings shared by every candidate of a run.
///
/// Passed by value into the model builder; nothing reads it globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSettings {
    /// Minimum number of consecutive days an active placement must run.
    pub min_duration: i64,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self { min_duration: 1 }
    }
}

impl SystemSettings {
    /// Creates settings with the given minimum duration.
    pub fn new(min_duration: i64) -> Self {
        Self { min_duration }
    }
}
