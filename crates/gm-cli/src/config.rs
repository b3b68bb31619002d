//! CLI configuration.
//!
//! Stored as TOML in `~/.gm/gm.toml`. Workflow settings live in the
//! `[settings]` table.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Server URL (e.g., https://example.looker.com:19999).
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// API path prefix.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Output format.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Authentication configuration.
    pub auth: Option<AuthConfig>,

    /// Workflow settings.
    #[serde(default)]
    pub settings: gm_core::Config,
}

fn default_server_url() -> String {
    "http://localhost:19999".to_string()
}

fn default_api_prefix() -> String {
    "/api/4.0".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            api_prefix: default_api_prefix(),
            timeout_secs: default_timeout_secs(),
            output_format: OutputFormat::default(),
            auth: None,
            settings: gm_core::Config::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from file.
    ///
    /// ## Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if its settings are invalid.
    pub fn load() -> crate::CliResult<Self> {
        let config_path = Self::config_path()?;

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)?
        } else {
            Self::default()
        };
        config.settings.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML text.
    ///
    /// ## Errors
    ///
    /// Returns [`CliError::Config`](crate::CliError::Config) on malformed input.
    pub fn parse(content: &str) -> crate::CliResult<Self> {
        toml::from_str(content)
            .map_err(|e| crate::CliError::Config(format!("failed to parse config: {e}")))
    }

    /// Saves configuration to file.
    ///
    /// ## Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> crate::CliResult<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::CliError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Gets the configuration file path.
    ///
    /// ## Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn config_path() -> crate::CliResult<PathBuf> {
        let home = dirs_next::home_dir().ok_or_else(|| {
            crate::CliError::Config("could not determine home directory".to_string())
        })?;
        Ok(home.join(".gm").join("gm.toml"))
    }

    /// Gets the effective server URL (from args or config).
    #[must_use]
    pub fn effective_server(&self, arg_server: Option<&str>) -> String {
        arg_server.map_or_else(|| self.server_url.clone(), String::from)
    }

    /// Gets the effective API token (from args or config).
    #[must_use]
    pub fn effective_token(&self, arg_token: Option<&str>) -> Option<String> {
        arg_token
            .map(String::from)
            .or_else(|| self.auth.as_ref().and_then(|a| a.token.clone()))
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
    /// Quiet (minimal output).
    Quiet,
}

impl OutputFormat {
    /// Parses a format name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "table" => Some(Self::Table),
            "json" => Some(Self::Json),
            "yaml" => Some(Self::Yaml),
            "quiet" => Some(Self::Quiet),
            _ => None,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// API access token sent as a bearer token.
    pub token: Option<String>,
}
