//! Service version model

use serde::Serialize;

/// Version as reported by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    pub version: String,
}

impl Version {
    /// Schema version label, e.g. `v2`
    pub fn from_schema(applied: i64) -> Self {
        Self {
            version: format!("v{}", applied),
        }
    }
}
