//! Remote configuration authority.
//!
//! The authority owns the persisted identity configuration and decides
//! whether a candidate configuration is valid. Implementations talk to the
//! remote store over the network; [`InMemoryAuthority`](crate::memory::InMemoryAuthority)
//! keeps everything in process.

use async_trait::async_trait;
use gm_model::{ConfigSnapshot, MappingsUpdate};

use crate::error::AuthorityResult;

/// Provider of the remote identity configuration.
///
/// Implementations must be thread-safe. Calls are never issued concurrently
/// by the workflow, but the authority may be shared between sessions.
#[async_trait]
pub trait ConfigAuthority: Send + Sync {
    /// Fetches the full current configuration.
    async fn fetch_config(&self) -> AuthorityResult<ConfigSnapshot>;

    /// Validates a candidate configuration without applying it.
    ///
    /// ## Errors
    ///
    /// Returns `AuthorityError::Rejected` with one message per failing field
    /// when the candidate is invalid.
    async fn test_config(&self, candidate: &ConfigSnapshot) -> AuthorityResult<()>;

    /// Writes a new mapping list.
    async fn persist_config(&self, update: &MappingsUpdate) -> AuthorityResult<()>;
}
