//! Remote configuration authority over HTTP.
//!
//! | Operation        | Request                               |
//! |------------------|---------------------------------------|
//! | `fetch_config`   | `GET {prefix}/oidc_config`            |
//! | `test_config`    | `POST {prefix}/oidc_test_configs`     |
//! | `persist_config` | `PATCH {prefix}/oidc_config`          |

use async_trait::async_trait;
use gm_mapping::{AuthorityResult, ConfigAuthority};
use gm_model::{ConfigSnapshot, MappingsUpdate};

use crate::commands::ApiClient;

const CONFIG_PATH: &str = "/oidc_config";
const TEST_PATH: &str = "/oidc_test_configs";

/// [`ConfigAuthority`] backed by the remote store's REST API.
pub struct HttpAuthority {
    client: ApiClient,
}

impl HttpAuthority {
    /// Creates an authority using `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConfigAuthority for HttpAuthority {
    async fn fetch_config(&self) -> AuthorityResult<ConfigSnapshot> {
        tracing::debug!(url = %self.client.url(CONFIG_PATH), "Fetching configuration");
        self.client.get(CONFIG_PATH).await
    }

    async fn test_config(&self, candidate: &ConfigSnapshot) -> AuthorityResult<()> {
        tracing::debug!(
            mappings = candidate.mappings.len(),
            "Testing candidate configuration"
        );
        self.client.post(TEST_PATH, candidate).await
    }

    async fn persist_config(&self, update: &MappingsUpdate) -> AuthorityResult<()> {
        tracing::debug!(mappings = update.mappings.len(), "Writing mapping list");
        self.client.patch(CONFIG_PATH, update).await
    }
}
