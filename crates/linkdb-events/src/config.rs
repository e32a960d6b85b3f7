use serde::{Deserialize, Serialize};

use crate::error::{EventError, EventResult};

/// Configuration for link database maintenance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkDatabaseConfig {
    /// Keep updating the index while a publish is in progress.
    ///
    /// Off by default: publishing rewrites many items at once and the index
    /// is rebuilt for the target afterwards.
    pub update_during_publish: bool,
    /// After stripping a removed version's references field by field,
    /// re-derive that version's records to catch anything an adapter left
    /// behind.
    pub reconcile_after_version_removal: bool,
}

impl Default for LinkDatabaseConfig {
    fn default() -> Self {
        Self {
            update_during_publish: false,
            reconcile_after_version_removal: true,
        }
    }
}

impl LinkDatabaseConfig {
    /// Parse from TOML; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> EventResult<Self> {
        toml::from_str(s).map_err(|e| EventError::Config(e.to_string()))
    }
}
