//! Configuration management commands.

use crate::cli::ConfigCommand;
use crate::config::{AuthConfig, OutputFormat};
use crate::output::{info, success};
use crate::{CliConfig, CliError, CliResult};

/// Runs a config command.
///
/// ## Errors
///
/// Returns an error if the key or value is invalid or the file cannot be
/// written.
pub fn run_config(cmd: ConfigCommand, config: &mut CliConfig) -> CliResult<()> {
    match cmd {
        ConfigCommand::Show => show_config(config),
        ConfigCommand::Set { key, value } => {
            set_value(config, &key, &value)?;
            config.save()?;
            success(&format!("Set {key} = {}", displayed_value(&key, &value)));
            Ok(())
        }
        ConfigCommand::Init => init_config(config),
    }
}

fn show_config(config: &CliConfig) -> CliResult<()> {
    let config_path = CliConfig::config_path()?;

    info(&format!("Configuration file: {}", config_path.display()));
    println!();
    println!("server_url: {}", config.server_url);
    println!("api_prefix: {}", config.api_prefix);
    println!("timeout_secs: {}", config.timeout_secs);
    println!("output_format: {:?}", config.output_format);
    if config.auth.as_ref().is_some_and(|a| a.token.is_some()) {
        println!("auth.token: ****");
    }
    println!(
        "settings.commit.status_delay_ms: {}",
        config.settings.commit.status_delay_ms
    );
    println!(
        "settings.export.file_prefix: {}",
        config.settings.export.file_prefix
    );
    println!(
        "settings.export.directory: {}",
        config.settings.export.directory
    );

    Ok(())
}

/// Sets one configuration value in memory.
///
/// ## Errors
///
/// Returns [`CliError::InvalidArgument`] for an unknown key or a value that
/// does not parse, and [`CliError::Settings`] for invalid workflow settings.
pub fn set_value(config: &mut CliConfig, key: &str, value: &str) -> CliResult<()> {
    match key {
        "server_url" | "server" => config.server_url = value.to_string(),
        "api_prefix" => config.api_prefix = value.to_string(),
        "timeout_secs" | "timeout" => config.timeout_secs = parse_number(key, value)?,
        "output_format" | "output" => {
            config.output_format = OutputFormat::from_name(value).ok_or_else(|| {
                CliError::InvalidArgument(format!(
                    "Unknown output format: {value}. Supported: table, json, yaml, quiet"
                ))
            })?;
        }
        "token" | "auth.token" => {
            config.auth = if value.is_empty() || value == "none" {
                None
            } else {
                Some(AuthConfig {
                    token: Some(value.to_string()),
                })
            };
        }
        "status_delay_ms" | "settings.commit.status_delay_ms" => {
            config.settings.commit.status_delay_ms = parse_number(key, value)?;
        }
        "file_prefix" | "settings.export.file_prefix" => {
            config.settings.export.file_prefix = value.to_string();
        }
        "export_dir" | "settings.export.directory" => {
            config.settings.export.directory = value.to_string();
        }
        _ => {
            return Err(CliError::InvalidArgument(format!(
                "Unknown configuration key: {key}. Known keys: server_url, api_prefix, timeout_secs, output_format, token, status_delay_ms, file_prefix, export_dir"
            )));
        }
    }

    config.settings.validate()?;
    Ok(())
}

fn parse_number(key: &str, value: &str) -> CliResult<u64> {
    value
        .parse()
        .map_err(|_| CliError::InvalidArgument(format!("{key} must be a number: {value}")))
}

fn displayed_value<'a>(key: &str, value: &'a str) -> &'a str {
    if matches!(key, "token" | "auth.token") && !value.is_empty() {
        "****"
    } else {
        value
    }
}

fn init_config(config: &mut CliConfig) -> CliResult<()> {
    let config_path = CliConfig::config_path()?;

    info("Initializing gm configuration...");
    println!();

    if let Some(server) = prompt(&format!("Server URL [{}]: ", config.server_url))? {
        config.server_url = server;
    }

    if let Some(token) = prompt("API token [unchanged]: ")? {
        config.auth = Some(AuthConfig { token: Some(token) });
    }

    if let Some(format) = prompt(&format!(
        "Output format (table/json/yaml/quiet) [{:?}]: ",
        config.output_format
    ))? {
        config.output_format = OutputFormat::from_name(&format).unwrap_or(config.output_format);
    }

    config.save()?;

    println!();
    success(&format!("Configuration saved to: {}", config_path.display()));
    Ok(())
}

/// Reads one line; `None` keeps the current value.
fn prompt(message: &str) -> CliResult<Option<String>> {
    print!("{message}");
    std::io::Write::flush(&mut std::io::stdout())?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let trimmed = input.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_known_keys() {
        let mut config = CliConfig::default();

        set_value(&mut config, "server", "https://looker.example.com").unwrap();
        set_value(&mut config, "output", "json").unwrap();
        set_value(&mut config, "status_delay_ms", "0").unwrap();
        set_value(&mut config, "token", "abc").unwrap();

        assert_eq!(config.server_url, "https://looker.example.com");
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.settings.commit.status_delay_ms, 0);
        assert_eq!(config.effective_token(None).as_deref(), Some("abc"));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        let mut config = CliConfig::default();

        assert!(matches!(
            set_value(&mut config, "issuer", "x"),
            Err(CliError::InvalidArgument(_))
        ));
        assert!(matches!(
            set_value(&mut config, "timeout", "soon"),
            Err(CliError::InvalidArgument(_))
        ));
        assert!(matches!(
            set_value(&mut config, "file_prefix", "a/b"),
            Err(CliError::Settings(_))
        ));
    }

    #[test]
    fn token_is_masked_when_echoed() {
        assert_eq!(displayed_value("token", "secret"), "****");
        assert_eq!(displayed_value("server", "https://x"), "https://x");
    }
}
