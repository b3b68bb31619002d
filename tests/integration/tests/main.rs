//! End-to-end tests for mapping administration.
//!
//! Sessions run against an in-memory authority with a recording status
//! listener and a scheduler that never sleeps.

mod common;
mod export;
mod workflow;
