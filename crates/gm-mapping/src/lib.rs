//! # gm-mapping
//!
//! Group-to-role mapping administration.
//!
//! This crate provides:
//! - The committed mapping store and its pure edit operations
//! - Bulk text parsing with id assignment
//! - A pending-action workflow gated on explicit confirmation
//! - The two-phase validate-then-commit protocol against a remote
//!   [`ConfigAuthority`]
//!
//! ## Example
//!
//! ```ignore
//! let coordinator = ConfigPersistenceCoordinator::new(authority, &config.commit);
//! let mut session = MappingSession::open(coordinator, &config).await?;
//!
//! let prompt = session.workflow_mut().request_delete("12")?;
//! println!("{}", prompt.message);
//! session.workflow_mut().confirm().await;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod authority;
pub mod bulk;
pub mod coordinator;
pub mod error;
pub mod export;
pub mod form;
pub mod id;
pub mod memory;
pub mod session;
pub mod store;
pub mod workflow;

pub use authority::ConfigAuthority;
pub use bulk::{BulkParse, RejectedLine, parse_bulk_input};
pub use coordinator::{
    CommitStatus, ConfigPersistenceCoordinator, Scheduler, StatusListener, TokioScheduler,
    TracingStatusListener,
};
pub use error::{AuthorityError, AuthorityResult, MappingError, MappingResult};
pub use export::{SnapshotArtifact, download_snapshot};
pub use form::MappingForm;
pub use memory::{AuthorityCall, InMemoryAuthority};
pub use session::MappingSession;
pub use store::MappingStore;
pub use workflow::{
    ActionKind, ActionWorkflow, AddRequest, ConfirmOutcome, Confirmation, PendingAction,
    WorkflowState,
};
