//! An administration session.
//!
//! Opening a session fetches the remote configuration once and seeds the
//! mapping store from it. Everything afterwards goes through the workflow.

use chrono::{DateTime, Utc};
use gm_core::Config;
use gm_model::{ConfigSnapshot, ConfigSummary};

use crate::authority::ConfigAuthority;
use crate::coordinator::ConfigPersistenceCoordinator;
use crate::error::{MappingError, MappingResult};
use crate::export::{SnapshotArtifact, download_snapshot};
use crate::store::MappingStore;
use crate::workflow::ActionWorkflow;

/// Mapping administration bound to one remote configuration.
pub struct MappingSession<A: ConfigAuthority> {
    workflow: ActionWorkflow<A>,
    file_prefix: String,
}

impl<A: ConfigAuthority> MappingSession<A> {
    /// Fetches the configuration and opens a session on it.
    ///
    /// ## Errors
    ///
    /// Returns [`MappingError::ConfigUnavailable`] if the configuration
    /// cannot be fetched.
    pub async fn open(
        coordinator: ConfigPersistenceCoordinator<A>,
        config: &Config,
    ) -> MappingResult<Self> {
        let snapshot = coordinator
            .authority()
            .fetch_config()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch identity configuration");
                MappingError::ConfigUnavailable(e.to_string())
            })?;

        tracing::info!(
            mappings = snapshot.mappings.len(),
            "Loaded identity configuration"
        );

        let store = MappingStore::new(snapshot.mappings.clone());
        Ok(Self {
            workflow: ActionWorkflow::new(store, coordinator, snapshot),
            file_prefix: config.export.file_prefix.clone(),
        })
    }

    /// Returns the committed store.
    #[must_use]
    pub const fn store(&self) -> &MappingStore {
        self.workflow.store()
    }

    /// Returns the last known configuration.
    #[must_use]
    pub const fn snapshot(&self) -> &ConfigSnapshot {
        self.workflow.snapshot()
    }

    /// Returns the displayed configuration details.
    #[must_use]
    pub fn summary(&self) -> ConfigSummary {
        self.snapshot().summary()
    }

    /// Returns the workflow.
    #[must_use]
    pub const fn workflow(&self) -> &ActionWorkflow<A> {
        &self.workflow
    }

    /// Returns the workflow for staging and confirming actions.
    pub fn workflow_mut(&mut self) -> &mut ActionWorkflow<A> {
        &mut self.workflow
    }

    /// Serializes the configuration with the current mappings.
    ///
    /// ## Errors
    ///
    /// Returns [`MappingError::Unexpected`] if serialization fails.
    pub fn download(&self, now: DateTime<Utc>) -> MappingResult<SnapshotArtifact> {
        download_snapshot(
            self.snapshot(),
            self.store().snapshot(),
            &self.file_prefix,
            now,
        )
    }
}
