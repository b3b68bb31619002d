//! # gm-cli
//!
//! Command-line administration of OIDC group-to-role mappings.
//!
//! This crate provides:
//! - Listing and paging through the committed mappings
//! - Single and bulk adds, updates, and deletes, each confirmed before commit
//! - Display of the identity configuration details
//! - Export of the configuration as a JSON backup
//! - An HTTP [`ConfigAuthority`](gm_mapping::ConfigAuthority) for the remote store

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod authority;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use authority::HttpAuthority;
pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
