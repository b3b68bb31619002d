//! Common test utilities and fixtures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gm_core::Config;
use gm_mapping::{
    CommitStatus, ConfigPersistenceCoordinator, InMemoryAuthority, MappingSession, Scheduler,
    StatusListener,
};
use gm_model::ConfigSnapshot;
use parking_lot::Mutex;
use serde_json::json;

/// Records commit statuses and pauses instead of sleeping.
#[derive(Debug, Default)]
pub struct Recorder {
    statuses: Mutex<Vec<CommitStatus>>,
    pauses: Mutex<Vec<Duration>>,
}

impl Recorder {
    /// Returns and clears the statuses seen so far.
    pub fn take_statuses(&self) -> Vec<CommitStatus> {
        std::mem::take(&mut *self.statuses.lock())
    }

    /// Returns the pauses requested so far.
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().clone()
    }
}

impl StatusListener for Recorder {
    fn on_status(&self, status: CommitStatus) {
        self.statuses.lock().push(status);
    }
}

#[async_trait]
impl Scheduler for Recorder {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().push(duration);
    }
}

/// An open session and its collaborators.
pub struct TestEnv {
    /// The session under test.
    pub session: MappingSession<InMemoryAuthority>,
    /// The remote authority.
    pub authority: Arc<InMemoryAuthority>,
    /// Status and pause recorder.
    pub recorder: Arc<Recorder>,
}

impl TestEnv {
    /// Opens a session on [`remote_config`].
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(remote_config()).await
    }

    /// Opens a session on `remote`.
    pub async fn with_config(remote: ConfigSnapshot) -> anyhow::Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("gm_mapping=debug,gm_core=info")
            .with_test_writer()
            .try_init();

        let authority = Arc::new(InMemoryAuthority::new(remote));
        let recorder = Arc::new(Recorder::default());
        let config = Config::default();
        let coordinator = ConfigPersistenceCoordinator::new(Arc::clone(&authority), &config.commit)
            .with_listener(recorder.clone())
            .with_scheduler(recorder.clone());

        let session = MappingSession::open(coordinator, &config).await?;
        Ok(Self {
            session,
            authority,
            recorder,
        })
    }
}

/// A remote configuration with two numeric-id mappings.
pub fn remote_config() -> ConfigSnapshot {
    serde_json::from_value(json!({
        "enabled": true,
        "audience": "looker-client",
        "issuer": "https://idp.example.com",
        "authorization_endpoint": "https://idp.example.com/authorize",
        "token_endpoint": "https://idp.example.com/token",
        "userinfo_endpoint": null,
        "scopes": ["openid", "profile", "groups"],
        "groups_attribute": "groups",
        "set_roles_from_groups": true,
        "groups_with_role_ids": [
            {
                "id": "10",
                "looker_group_id": "6",
                "looker_group_name": "Engineering",
                "name": "engineering",
                "role_ids": ["2"]
            },
            {
                "id": "12",
                "looker_group_id": null,
                "looker_group_name": "Sales",
                "name": "sales",
                "role_ids": ["3", "4"]
            }
        ],
        "can": {"update": true}
    }))
    .expect("fixture is a valid configuration")
}
