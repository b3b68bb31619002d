//! Two-phase configuration commit.
//!
//! A candidate mapping list is first tested remotely, merged into the rest
//! of the current configuration. Only if the test passes is the mapping list
//! written. Each step is reported to a [`StatusListener`].
//!
//! ```text
//! RunningTest ──fail──▶ TestFailed
//!      │
//!      ▼
//! TestSuccessful ──(status delay)──▶ UpdatingConfig ──▶ Finished
//! ```
//!
//! A write that fails after a successful test leaves the remote store
//! unchanged and the caller's collection untouched. Nothing is retried.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gm_core::config::CommitConfig;
use gm_model::{ConfigSnapshot, MappingRecord, MappingsUpdate};
use serde::{Deserialize, Serialize};

use crate::authority::ConfigAuthority;
use crate::error::{AuthorityError, MappingError, MappingResult};

// ============================================================================
// Status
// ============================================================================

/// Progress of a commit, for user feedback only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitStatus {
    /// The candidate is being tested remotely.
    RunningTest,
    /// The remote test rejected the candidate.
    TestFailed,
    /// The remote test accepted the candidate.
    TestSuccessful,
    /// The mapping list is being written.
    UpdatingConfig,
    /// The mapping list was written.
    Finished,
}

impl fmt::Display for CommitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RunningTest => "Running Test",
            Self::TestFailed => "Test Failed",
            Self::TestSuccessful => "Test Successful",
            Self::UpdatingConfig => "Updating OIDC Config",
            Self::Finished => "Finished",
        };
        f.write_str(label)
    }
}

/// Receives commit status changes.
pub trait StatusListener: Send + Sync {
    /// Called on every status change.
    fn on_status(&self, status: CommitStatus);
}

/// Listener that logs status changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatusListener;

impl StatusListener for TracingStatusListener {
    fn on_status(&self, status: CommitStatus) {
        tracing::debug!(%status, "commit status");
    }
}

// ============================================================================
// Scheduling
// ============================================================================

/// Schedules the pause between a successful test and the write.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Waits for `duration`.
    async fn pause(&self, duration: Duration);
}

/// Scheduler backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Runs the validate-then-commit protocol against a [`ConfigAuthority`].
pub struct ConfigPersistenceCoordinator<A: ConfigAuthority> {
    authority: Arc<A>,
    scheduler: Arc<dyn Scheduler>,
    listener: Arc<dyn StatusListener>,
    status_delay: Duration,
}

impl<A: ConfigAuthority> ConfigPersistenceCoordinator<A> {
    /// Creates a coordinator using the tokio timer and a logging listener.
    #[must_use]
    pub fn new(authority: Arc<A>, config: &CommitConfig) -> Self {
        Self {
            authority,
            scheduler: Arc::new(TokioScheduler),
            listener: Arc::new(TracingStatusListener),
            status_delay: config.status_delay(),
        }
    }

    /// Replaces the scheduler.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Replaces the status listener.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn StatusListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Returns the authority.
    #[must_use]
    pub const fn authority(&self) -> &Arc<A> {
        &self.authority
    }

    /// Validates and then commits `candidate`.
    ///
    /// `base` supplies every configuration field other than the mapping
    /// list. On success the committed list is returned for the caller to
    /// adopt.
    ///
    /// ## Errors
    ///
    /// - [`MappingError::RemoteValidation`] if the test rejects the candidate
    /// - [`MappingError::Unexpected`] if the test call itself fails
    /// - [`MappingError::Persistence`] if the write fails after a passing test
    pub async fn commit(
        &self,
        base: &ConfigSnapshot,
        candidate: Vec<MappingRecord>,
    ) -> MappingResult<Vec<MappingRecord>> {
        self.run_test(base, &candidate).await?;
        self.write(candidate).await
    }

    async fn run_test(
        &self,
        base: &ConfigSnapshot,
        candidate: &[MappingRecord],
    ) -> MappingResult<()> {
        self.listener.on_status(CommitStatus::RunningTest);
        let candidate_config = base.with_mappings(candidate.to_vec());

        match self.authority.test_config(&candidate_config).await {
            Ok(()) => {
                self.listener.on_status(CommitStatus::TestSuccessful);
                Ok(())
            }
            Err(AuthorityError::Rejected { status, messages }) => {
                tracing::warn!(status, ?messages, "Candidate configuration rejected");
                self.listener.on_status(CommitStatus::TestFailed);
                Err(MappingError::RemoteValidation { messages })
            }
            Err(AuthorityError::Transport(detail)) => {
                tracing::error!(%detail, "Configuration test could not be run");
                self.listener.on_status(CommitStatus::TestFailed);
                Err(MappingError::Unexpected(detail))
            }
        }
    }

    async fn write(&self, candidate: Vec<MappingRecord>) -> MappingResult<Vec<MappingRecord>> {
        self.scheduler.pause(self.status_delay).await;
        self.listener.on_status(CommitStatus::UpdatingConfig);

        let update = MappingsUpdate::new(candidate);
        if let Err(err) = self.authority.persist_config(&update).await {
            tracing::error!(
                error = %err,
                "Configuration passed validation but the update failed; remote and local state may differ"
            );
            let detail = match err {
                AuthorityError::Rejected { messages, .. } => messages.join("\n"),
                AuthorityError::Transport(detail) => detail,
            };
            return Err(MappingError::Persistence(detail));
        }

        self.listener.on_status(CommitStatus::Finished);
        Ok(update.mappings)
    }
}
