//! Runtime switches read from a TOML file.
//!
//! ```toml
//! [pgplus]
//! enableSqlPrint = true
//! allowGlobalUpdate = false
//! allowGlobalDelete = false
//! ```

use crate::error::{OrmError, OrmResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Behaviour switches shared by the CRUD façade and [`Scope`](crate::Scope).
///
/// Every switch defaults to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Emit every rendered statement as a `debug` event on `pgplus.sql`.
    pub enable_sql_print: bool,
    /// Permit UPDATE statements without a WHERE condition.
    pub allow_global_update: bool,
    /// Permit DELETE statements without a WHERE condition.
    pub allow_global_delete: bool,
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    pgplus: Settings,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from the `[pgplus]` table of a TOML file.
    pub fn load(path: impl AsRef<Path>) -> OrmResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            OrmError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            OrmError::Config(msg) => OrmError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parse settings from TOML text. A missing `[pgplus]` table yields defaults.
    pub fn from_toml_str(raw: &str) -> OrmResult<Self> {
        let file: SettingsFile = toml::from_str(raw)
            .map_err(|e| OrmError::Config(format!("failed to parse config: {e}")))?;
        Ok(file.pgplus)
    }

    pub fn enable_sql_print(mut self, enabled: bool) -> Self {
        self.enable_sql_print = enabled;
        self
    }

    pub fn allow_global_update(mut self, allowed: bool) -> Self {
        self.allow_global_update = allowed;
        self
    }

    pub fn allow_global_delete(mut self, allowed: bool) -> Self {
        self.allow_global_delete = allowed;
        self
    }
}
