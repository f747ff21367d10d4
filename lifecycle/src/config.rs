//! Settlement configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use optimus_types::SettlementParams;
use optimus_utils::LogFormat;

use crate::SettlementError;

/// Configuration for a settlement worker.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Token symbol payment requests are priced in.
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,

    /// Windows, thresholds and fees used by the engines.
    #[serde(default)]
    pub settlement: SettlementParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

fn default_token_symbol() -> String {
    "MOVE".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl SettlementConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SettlementError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettlementError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, SettlementError> {
        toml::from_str(s).map_err(|e| SettlementError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, SettlementError> {
        toml::to_string_pretty(self).map_err(|e| SettlementError::Config(e.to_string()))
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            token_symbol: default_token_symbol(),
            settlement: SettlementParams::default(),
        }
    }
}
