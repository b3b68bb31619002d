//! Output formatting utilities.

use colored::Colorize;
use gm_mapping::{CommitStatus, StatusListener};
use tabled::{Table, Tabled, settings::Style};

use crate::CliError;
use crate::config::OutputFormat;

/// Heading printed above every failed operation.
pub const FAILURE_HEADING: &str = "The operation could not be completed due to the following error(s):";

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Prints a failed operation with one error per line.
pub fn failure(err: &CliError) {
    error(FAILURE_HEADING);
    for line in err.report_lines() {
        eprintln!("  {line}");
    }
}

/// Prints commit status changes as they happen.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleStatusListener;

impl StatusListener for ConsoleStatusListener {
    fn on_status(&self, status: CommitStatus) {
        match status {
            CommitStatus::TestFailed => eprintln!("{} {}", "…".red(), status),
            CommitStatus::Finished => println!("{} {}", "…".green(), status),
            _ => println!("{} {}", "…".dimmed(), status),
        }
    }
}

/// Outputs data in the specified format.
///
/// ## Errors
///
/// Returns an error if the data cannot be serialized.
pub fn output<T: Tabled + serde::Serialize>(
    data: &[T],
    format: OutputFormat,
) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                info("No mappings found.");
            } else {
                let table = Table::new(data).with(Style::rounded()).to_string();
                println!("{table}");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data)?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            for item in data {
                let json = serde_json::to_value(item)?;
                print_yaml_value(&json, 0);
                println!();
            }
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

/// Outputs a single item.
///
/// ## Errors
///
/// Returns an error if the item cannot be serialized.
pub fn output_single<T: serde::Serialize>(item: &T, format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table | OutputFormat::Yaml => {
            let json = serde_json::to_value(item)?;
            print_yaml_value(&json, 0);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item)?;
            println!("{json}");
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

/// Prints a JSON value as YAML-like output.
fn print_yaml_value(value: &serde_json::Value, indent: usize) {
    let prefix = "  ".repeat(indent);

    match value {
        serde_json::Value::Array(arr) => {
            for item in arr {
                print!("{prefix}- ");
                print_yaml_value(item, indent + 1);
            }
        }
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                if val.is_object() || val.is_array() {
                    println!("{prefix}{key}:");
                    print_yaml_value(val, indent + 1);
                } else {
                    println!("{prefix}{key}: {}", scalar(val));
                }
            }
        }
        other => println!("{}", scalar(other)),
    }
}

fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Prompts for confirmation.
///
/// ## Errors
///
/// Returns an error if stdin cannot be read.
pub fn confirm(message: &str) -> crate::CliResult<bool> {
    print!("{message} [y/N]: ");
    std::io::Write::flush(&mut std::io::stdout())?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y") || input.trim().eq_ignore_ascii_case("yes"))
}
