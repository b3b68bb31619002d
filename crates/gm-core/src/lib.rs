//! # gm-core
//!
//! Core configuration, error handling, and audit events for the group
//! mapping administrator.
//!
//! This crate provides foundational types shared by the model, workflow,
//! and CLI crates.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::Config;
pub use error::{Error, Result};
