//! # gm
//!
//! Command-line administration of OIDC group-to-role mappings.

#![forbid(unsafe_code)]

use clap::Parser;
use gm_cli::{
    cli::{Cli, Command},
    commands::{
        run_add, run_bulk_add, run_config, run_delete, run_export, run_list, run_show, run_update,
    },
    config::CliConfig,
    output::{error, failure},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match CliConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };

    let server = cli.server.as_deref();
    let token = cli.token.as_deref();
    let format = cli.output.unwrap_or(config.output_format);

    let result = match cli.command {
        Command::List(args) => run_list(args, &config, server, token, format).await,
        Command::Show => run_show(&config, server, token, format).await,
        Command::Add(args) => run_add(args, &config, server, token).await,
        Command::BulkAdd(args) => run_bulk_add(args, &config, server, token).await,
        Command::Update(args) => run_update(args, &config, server, token).await,
        Command::Delete(args) => run_delete(args, &config, server, token).await,
        Command::Export(args) => run_export(args, &config, server, token).await,
        Command::Config(cmd) => run_config(cmd, &mut config),
    };

    if let Err(e) = result {
        failure(&e);
        std::process::exit(1);
    }
}

/// Logs to stderr; `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
