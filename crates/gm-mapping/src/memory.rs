//! In-process configuration authority.
//!
//! Holds a [`ConfigSnapshot`] in memory and records every call. Failures can
//! be queued per operation to exercise the commit protocol's error paths.

use std::collections::VecDeque;

use async_trait::async_trait;
use gm_model::{ConfigSnapshot, MappingsUpdate};
use parking_lot::Mutex;

use crate::authority::ConfigAuthority;
use crate::error::{AuthorityError, AuthorityResult};

/// A call received by an [`InMemoryAuthority`].
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorityCall {
    /// `fetch_config`.
    Fetch,
    /// `test_config` with the candidate it was given.
    Test(ConfigSnapshot),
    /// `persist_config` with the update it was given.
    Persist(MappingsUpdate),
}

#[derive(Debug, Default)]
struct State {
    config: ConfigSnapshot,
    calls: Vec<AuthorityCall>,
    fetch_failures: VecDeque<AuthorityError>,
    test_failures: VecDeque<AuthorityError>,
    persist_failures: VecDeque<AuthorityError>,
}

/// Configuration authority backed by memory.
#[derive(Debug, Default)]
pub struct InMemoryAuthority {
    state: Mutex<State>,
}

impl InMemoryAuthority {
    /// Creates an authority holding `config`.
    #[must_use]
    pub fn new(config: ConfigSnapshot) -> Self {
        Self {
            state: Mutex::new(State {
                config,
                ..State::default()
            }),
        }
    }

    /// Makes the next `fetch_config` fail with `error`.
    pub fn fail_next_fetch(&self, error: AuthorityError) {
        self.state.lock().fetch_failures.push_back(error);
    }

    /// Makes the next `test_config` fail with `error`.
    pub fn fail_next_test(&self, error: AuthorityError) {
        self.state.lock().test_failures.push_back(error);
    }

    /// Makes the next `persist_config` fail with `error`.
    pub fn fail_next_persist(&self, error: AuthorityError) {
        self.state.lock().persist_failures.push_back(error);
    }

    /// Returns the stored configuration.
    #[must_use]
    pub fn config(&self) -> ConfigSnapshot {
        self.state.lock().config.clone()
    }

    /// Returns every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<AuthorityCall> {
        self.state.lock().calls.clone()
    }

    /// Returns how many `persist_config` calls were received.
    #[must_use]
    pub fn persist_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, AuthorityCall::Persist(_)))
            .count()
    }
}

#[async_trait]
impl ConfigAuthority for InMemoryAuthority {
    async fn fetch_config(&self) -> AuthorityResult<ConfigSnapshot> {
        let mut state = self.state.lock();
        state.calls.push(AuthorityCall::Fetch);
        if let Some(error) = state.fetch_failures.pop_front() {
            return Err(error);
        }
        Ok(state.config.clone())
    }

    async fn test_config(&self, candidate: &ConfigSnapshot) -> AuthorityResult<()> {
        let mut state = self.state.lock();
        state.calls.push(AuthorityCall::Test(candidate.clone()));
        if let Some(error) = state.test_failures.pop_front() {
            return Err(error);
        }
        if let Some(blank) = candidate.mappings.iter().find(|m| m.name.trim().is_empty()) {
            return Err(AuthorityError::rejected(
                422,
                format!("groups_with_role_ids: mapping '{}' has no name", blank.id),
            ));
        }
        Ok(())
    }

    async fn persist_config(&self, update: &MappingsUpdate) -> AuthorityResult<()> {
        let mut state = self.state.lock();
        state.calls.push(AuthorityCall::Persist(update.clone()));
        if let Some(error) = state.persist_failures.pop_front() {
            return Err(error);
        }
        state.config.mappings.clone_from(&update.mappings);
        Ok(())
    }
}
