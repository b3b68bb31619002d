//! Configuration for the mapping workflow.
//!
//! These settings are embedded in the CLI configuration file and passed to
//! the workflow when a session is opened.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Workflow configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Two-phase commit settings.
    #[serde(default)]
    pub commit: CommitConfig,
    /// Snapshot export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Two-phase commit settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitConfig {
    /// Pause between "test successful" and "updating config", in milliseconds.
    #[serde(default = "default_status_delay_ms")]
    pub status_delay_ms: u64,
}

/// Snapshot export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Prefix of the exported artifact name.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// Directory the CLI writes exported artifacts to.
    #[serde(default = "default_directory")]
    pub directory: String,
}

fn default_status_delay_ms() -> u64 {
    2000
}

fn default_file_prefix() -> String {
    "oidc_config_backup_".to_string()
}

fn default_directory() -> String {
    ".".to_string()
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            status_delay_ms: default_status_delay_ms(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: default_file_prefix(),
            directory: default_directory(),
        }
    }
}

impl CommitConfig {
    /// Returns the status delay as a [`Duration`].
    #[must_use]
    pub const fn status_delay(&self) -> Duration {
        Duration::from_millis(self.status_delay_ms)
    }
}

impl Config {
    /// Validates the configuration.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::Config`] if the export prefix is empty or contains a
    /// path separator.
    pub fn validate(&self) -> Result<()> {
        let prefix = &self.export.file_prefix;
        if prefix.trim().is_empty() {
            return Err(Error::config("export.file_prefix must not be empty"));
        }
        if prefix.contains('/') || prefix.contains('\\') {
            return Err(Error::config(format!(
                "export.file_prefix must not contain a path separator: {prefix}"
            )));
        }
        if self.export.directory.trim().is_empty() {
            return Err(Error::config("export.directory must not be empty"));
        }
        Ok(())
    }
}
