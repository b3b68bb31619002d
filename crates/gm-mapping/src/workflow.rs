//! Pending-action state machine.
//!
//! At most one edit is pending at a time. A request stages the edit without
//! touching the committed collection; only [`ActionWorkflow::confirm`] runs
//! the commit, and only a successful commit replaces the collection.
//!
//! ```text
//!            request_*             confirm (ok)
//!   Idle ───────────────▶ Pending ─────────────▶ Idle (collection replaced)
//!    ▲                      │  │
//!    └──── cancel ──────────┘  └─ confirm (err) ─▶ Idle (error retained)
//! ```

use std::fmt;

use chrono::Utc;
use gm_core::event::{Event, EventType};
use gm_model::{ConfigSnapshot, MappingPatch, MappingRecord};
use serde::{Deserialize, Serialize};

use crate::authority::ConfigAuthority;
use crate::bulk::{RejectedLine, parse_bulk_input};
use crate::coordinator::ConfigPersistenceCoordinator;
use crate::error::{MappingError, MappingResult};
use crate::form::MappingForm;
use crate::id::single_record_id;
use crate::store::MappingStore;

/// Kind of a pending action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Add one or more mappings.
    Add,
    /// Update one mapping.
    Update,
    /// Delete one mapping.
    Delete,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("add"),
            Self::Update => f.write_str("update"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

/// Text shown when asking the administrator to confirm an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Short title.
    pub title: String,
    /// Full message.
    pub message: String,
}

/// A staged edit and its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PendingAction {
    /// Candidates to append, ids already assigned.
    Add {
        /// Candidate records in order.
        candidates: Vec<MappingRecord>,
    },
    /// Patch for one record.
    Update {
        /// Id of the record to update.
        target_id: String,
        /// Name of the record when the update was requested.
        target_name: String,
        /// Fields to change.
        patch: MappingPatch,
    },
    /// Removal of one record.
    Delete {
        /// Id of the record to delete.
        target_id: String,
        /// Name of the record when the deletion was requested.
        target_name: String,
    },
}

impl PendingAction {
    /// Returns the action kind.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Add { .. } => ActionKind::Add,
            Self::Update { .. } => ActionKind::Update,
            Self::Delete { .. } => ActionKind::Delete,
        }
    }

    /// Returns the ids of the records this action concerns.
    #[must_use]
    pub fn mapping_ids(&self) -> Vec<String> {
        match self {
            Self::Add { candidates } => candidates.iter().map(|c| c.id.clone()).collect(),
            Self::Update { target_id, .. } | Self::Delete { target_id, .. } => {
                vec![target_id.clone()]
            }
        }
    }

    /// Returns the confirmation prompt for this action.
    #[must_use]
    pub fn confirmation(&self) -> Confirmation {
        let (title, message) = match self {
            Self::Add { candidates } => (
                "Confirm New Mappings",
                format!("You are about to add {} new mapping(s).", candidates.len()),
            ),
            Self::Update { target_name, .. } => (
                "Confirm Update",
                format!("You are about to update the mapping for \"{target_name}\"."),
            ),
            Self::Delete { target_name, .. } => (
                "Confirm Deletion",
                format!(
                    "Are you sure you want to delete the mapping for \"{target_name}\"? This action cannot be undone."
                ),
            ),
        };
        Confirmation {
            title: title.to_string(),
            message,
        }
    }
}

/// Workflow state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WorkflowState {
    /// Nothing staged.
    #[default]
    Idle,
    /// An action awaits confirmation.
    Pending(PendingAction),
}

/// Input for an add request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddRequest {
    /// A single record from form input.
    Single(MappingForm),
    /// Raw bulk text, one mapping per line.
    Bulk(String),
}

/// Result of [`ActionWorkflow::confirm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// There was no pending action.
    NothingPending,
    /// The action was committed and the collection replaced.
    Committed(ActionKind),
    /// The action failed; see [`ActionWorkflow::last_error`].
    Failed(ActionKind),
}

impl ConfirmOutcome {
    /// Returns whether the action was committed.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// Stages, confirms and cancels mapping edits.
pub struct ActionWorkflow<A: ConfigAuthority> {
    store: MappingStore,
    coordinator: ConfigPersistenceCoordinator<A>,
    snapshot: ConfigSnapshot,
    state: WorkflowState,
    last_error: Option<MappingError>,
    rejected_lines: Vec<RejectedLine>,
}

impl<A: ConfigAuthority> ActionWorkflow<A> {
    /// Creates an idle workflow.
    ///
    /// `snapshot` supplies the configuration fields carried through every
    /// commit alongside the mapping list.
    #[must_use]
    pub fn new(
        store: MappingStore,
        coordinator: ConfigPersistenceCoordinator<A>,
        snapshot: ConfigSnapshot,
    ) -> Self {
        Self {
            store,
            coordinator,
            snapshot,
            state: WorkflowState::Idle,
            last_error: None,
            rejected_lines: Vec::new(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Returns the pending action, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingAction> {
        match &self.state {
            WorkflowState::Pending(action) => Some(action),
            WorkflowState::Idle => None,
        }
    }

    /// Returns whether an action awaits confirmation.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, WorkflowState::Pending(_))
    }

    /// Returns the committed store.
    #[must_use]
    pub const fn store(&self) -> &MappingStore {
        &self.store
    }

    /// Returns the configuration carried through commits.
    #[must_use]
    pub const fn snapshot(&self) -> &ConfigSnapshot {
        &self.snapshot
    }

    /// Returns the error of the last failed confirmation.
    #[must_use]
    pub const fn last_error(&self) -> Option<&MappingError> {
        self.last_error.as_ref()
    }

    /// Clears the retained error.
    pub fn dismiss_error(&mut self) -> Option<MappingError> {
        self.last_error.take()
    }

    /// Returns the bulk lines skipped by the last bulk add request.
    #[must_use]
    pub fn rejected_lines(&self) -> &[RejectedLine] {
        &self.rejected_lines
    }

    /// Stages an add and returns its confirmation prompt.
    ///
    /// A single add needs a name; its id is assigned now. Bulk text must
    /// not be blank and must yield at least one candidate. Skipped bulk
    /// lines are available from [`rejected_lines`](Self::rejected_lines).
    ///
    /// ## Errors
    ///
    /// Returns [`MappingError::LocalValidation`] and leaves the state
    /// unchanged if the input is not usable.
    pub fn request_add(&mut self, request: AddRequest) -> MappingResult<Confirmation> {
        let candidates = match request {
            AddRequest::Single(form) => {
                let name = form
                    .name()
                    .ok_or_else(|| MappingError::validation("Name is required."))?;
                let id = single_record_id(Utc::now(), name);
                let record = form
                    .to_record(id)
                    .ok_or_else(|| MappingError::validation("Name is required."))?;
                self.rejected_lines.clear();
                vec![record]
            }
            AddRequest::Bulk(text) => {
                if text.trim().is_empty() {
                    return Err(MappingError::validation("Bulk input cannot be empty."));
                }
                let parsed = parse_bulk_input(&text, &self.store.snapshot());
                if parsed.is_empty() {
                    self.rejected_lines = parsed.rejected;
                    return Err(MappingError::validation("No valid mappings to add."));
                }
                self.rejected_lines = parsed.rejected;
                parsed.records
            }
        };

        Ok(self.stage(PendingAction::Add { candidates }))
    }

    /// Stages an update of the record with id `target_id`.
    ///
    /// ## Errors
    ///
    /// - [`MappingError::NotFound`] if no record has `target_id`
    /// - [`MappingError::LocalValidation`] if the form clears the name
    pub fn request_update(
        &mut self,
        target_id: &str,
        form: &MappingForm,
    ) -> MappingResult<Confirmation> {
        let target = self
            .store
            .get(target_id)
            .ok_or_else(|| MappingError::not_found(target_id))?;

        let patch = form.to_patch();
        if patch.name.as_deref().is_some_and(str::is_empty) {
            return Err(MappingError::validation("Name is required."));
        }

        Ok(self.stage(PendingAction::Update {
            target_id: target.id,
            target_name: target.name,
            patch,
        }))
    }

    /// Stages deletion of the record with id `target_id`.
    ///
    /// ## Errors
    ///
    /// Returns [`MappingError::NotFound`] if no record has `target_id`.
    pub fn request_delete(&mut self, target_id: &str) -> MappingResult<Confirmation> {
        let target = self
            .store
            .get(target_id)
            .ok_or_else(|| MappingError::not_found(target_id))?;

        Ok(self.stage(PendingAction::Delete {
            target_id: target.id,
            target_name: target.name,
        }))
    }

    /// Discards the pending action. Does nothing when idle.
    pub fn cancel(&mut self) {
        if let WorkflowState::Pending(action) = std::mem::take(&mut self.state) {
            tracing::debug!(kind = %action.kind(), "Pending action cancelled");
        }
    }

    /// Commits the pending action.
    ///
    /// The workflow is idle afterwards whatever the outcome. On failure the
    /// committed collection is unchanged and the error is retained until
    /// dismissed or replaced by the next failure.
    pub async fn confirm(&mut self) -> ConfirmOutcome {
        let WorkflowState::Pending(action) = std::mem::take(&mut self.state) else {
            return ConfirmOutcome::NothingPending;
        };
        let kind = action.kind();
        let mapping_ids = action.mapping_ids();

        let result = match self.next_collection(action) {
            Ok(candidate) => self.coordinator.commit(&self.snapshot, candidate).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(committed) => {
                self.store.replace(committed.clone());
                self.snapshot.mappings = committed;
                self.last_error = None;
                Event::builder(committed_event(kind))
                    .success()
                    .mappings(mapping_ids)
                    .build()
                    .emit();
                ConfirmOutcome::Committed(kind)
            }
            Err(err) => {
                Event::builder(failed_event(&err))
                    .failure(err.to_string())
                    .mappings(mapping_ids)
                    .detail("action", kind.to_string())
                    .build()
                    .emit();
                self.last_error = Some(err);
                ConfirmOutcome::Failed(kind)
            }
        }
    }

    fn stage(&mut self, action: PendingAction) -> Confirmation {
        if let WorkflowState::Pending(previous) = &self.state {
            tracing::debug!(
                replaced = %previous.kind(),
                with = %action.kind(),
                "Replacing pending action"
            );
        }
        let confirmation = action.confirmation();
        self.state = WorkflowState::Pending(action);
        confirmation
    }

    fn next_collection(&self, action: PendingAction) -> MappingResult<Vec<MappingRecord>> {
        match action {
            PendingAction::Add { candidates } => self.store.add_many(candidates),
            PendingAction::Update {
                target_id, patch, ..
            } => self.store.update_one(&target_id, &patch),
            PendingAction::Delete { target_id, .. } => self.store.remove_one(&target_id),
        }
    }
}

const fn committed_event(kind: ActionKind) -> EventType {
    match kind {
        ActionKind::Add => EventType::MappingsAdded,
        ActionKind::Update => EventType::MappingUpdated,
        ActionKind::Delete => EventType::MappingDeleted,
    }
}

const fn failed_event(err: &MappingError) -> EventType {
    match err {
        MappingError::RemoteValidation { .. } | MappingError::Unexpected(_) => {
            EventType::ConfigTestFailed
        }
        MappingError::Persistence(_) => EventType::ConfigPersistFailed,
        _ => EventType::ActionRejected,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use gm_core::config::CommitConfig;

    use super::*;
    use crate::coordinator::Scheduler;
    use crate::error::AuthorityError;
    use crate::memory::InMemoryAuthority;

    struct NoDelay;

    #[async_trait]
    impl Scheduler for NoDelay {
        async fn pause(&self, _duration: Duration) {}
    }

    fn seed() -> Vec<MappingRecord> {
        vec![
            MappingRecord::new("10", "engineering")
                .with_external_group_ref("6")
                .with_role_ids(["2"]),
            MappingRecord::new("12", "sales").with_role_ids(["3", "4"]),
        ]
    }

    fn workflow() -> (ActionWorkflow<InMemoryAuthority>, Arc<InMemoryAuthority>) {
        let mut rest = serde_json::Map::new();
        rest.insert("enabled".to_string(), serde_json::json!(true));
        let snapshot = ConfigSnapshot::new(seed(), rest);
        let authority = Arc::new(InMemoryAuthority::new(snapshot.clone()));
        let coordinator =
            ConfigPersistenceCoordinator::new(Arc::clone(&authority), &CommitConfig::default())
                .with_scheduler(Arc::new(NoDelay));
        let workflow = ActionWorkflow::new(MappingStore::new(seed()), coordinator, snapshot);
        (workflow, authority)
    }

    #[tokio::test]
    async fn single_add_commits_one_record() {
        let (mut workflow, authority) = workflow();
        let form = MappingForm {
            role_ids: Some("5, 6".to_string()),
            ..MappingForm::named("ops")
        };

        workflow.request_add(AddRequest::Single(form)).unwrap();
        assert!(workflow.store().len() == 2, "pending add must not touch the store");

        let outcome = workflow.confirm().await;

        assert_eq!(outcome, ConfirmOutcome::Committed(ActionKind::Add));
        let records = workflow.store().snapshot();
        assert_eq!(records.len(), 3);
        let added = &records[2];
        assert_eq!(added.name, "ops");
        assert_eq!(added.external_group_name, "ops");
        assert_eq!(added.role_ids, vec!["5", "6"]);
        assert!(added.id.ends_with("-ops"));
        assert_eq!(authority.config().mappings, records);
        assert_eq!(workflow.state(), &WorkflowState::Idle);
    }

    #[test]
    fn single_add_requires_a_name() {
        let (mut workflow, _) = workflow();

        let err = workflow
            .request_add(AddRequest::Single(MappingForm::named(" ")))
            .unwrap_err();

        assert_eq!(err, MappingError::validation("Name is required."));
        assert!(!workflow.is_pending());
    }

    #[test]
    fn bulk_add_validates_input() {
        let (mut workflow, _) = workflow();

        let blank = workflow.request_add(AddRequest::Bulk("  \n ".to_string()));
        assert_eq!(
            blank.unwrap_err(),
            MappingError::validation("Bulk input cannot be empty.")
        );

        let none = workflow.request_add(AddRequest::Bulk("a,b\nc".to_string()));
        assert_eq!(
            none.unwrap_err(),
            MappingError::validation("No valid mappings to add.")
        );
        assert_eq!(workflow.rejected_lines().len(), 2);
        assert!(!workflow.is_pending());
    }

    #[test]
    fn bulk_add_stages_candidates_and_reports_skipped_lines() {
        let (mut workflow, _) = workflow();

        let input = "6,Test Group,My Custom Name,2,5\nbad\n,,Another Group,1";
        let confirmation = workflow
            .request_add(AddRequest::Bulk(input.to_string()))
            .unwrap();

        assert_eq!(confirmation.message, "You are about to add 2 new mapping(s).");
        assert_eq!(workflow.pending().unwrap().mapping_ids(), vec!["13", "15"]);
        assert_eq!(workflow.rejected_lines()[0].line, 2);
    }

    #[test]
    fn update_and_delete_require_an_existing_target() {
        let (mut workflow, _) = workflow();

        assert_eq!(
            workflow.request_delete("99").unwrap_err(),
            MappingError::not_found("99")
        );
        assert!(
            workflow
                .request_update("99", &MappingForm::named("x"))
                .unwrap_err()
                .is_local()
        );
        assert!(!workflow.is_pending());
    }

    #[test]
    fn update_cannot_clear_the_name() {
        let (mut workflow, _) = workflow();
        let err = workflow
            .request_update("10", &MappingForm::named(""))
            .unwrap_err();
        assert!(matches!(err, MappingError::LocalValidation(_)));
    }

    #[test]
    fn confirmation_text_names_the_target() {
        let (mut workflow, _) = workflow();

        let update = workflow
            .request_update("12", &MappingForm::named("revenue"))
            .unwrap();
        assert_eq!(update.title, "Confirm Update");
        assert_eq!(update.message, "You are about to update the mapping for \"sales\".");

        let delete = workflow.request_delete("10").unwrap();
        assert_eq!(delete.title, "Confirm Deletion");
        assert_eq!(
            delete.message,
            "Are you sure you want to delete the mapping for \"engineering\"? This action cannot be undone."
        );
    }

    #[tokio::test]
    async fn update_commits_merged_record() {
        let (mut workflow, _) = workflow();
        let form = MappingForm {
            external_group_name: Some("Revenue".to_string()),
            ..MappingForm::default()
        };

        workflow.request_update("12", &form).unwrap();
        assert!(workflow.confirm().await.is_committed());

        let updated = workflow.store().get("12").unwrap();
        assert_eq!(updated.external_group_name, "Revenue");
        assert_eq!(updated.name, "sales");
        assert_eq!(updated.role_ids, vec!["3", "4"]);
        assert_eq!(workflow.store().get("10"), Some(seed()[0].clone()));
    }

    #[tokio::test]
    async fn delete_commits_removal() {
        let (mut workflow, authority) = workflow();

        workflow.request_delete("10").unwrap();
        let outcome = workflow.confirm().await;

        assert_eq!(outcome, ConfirmOutcome::Committed(ActionKind::Delete));
        assert_eq!(workflow.store().snapshot(), vec![seed()[1].clone()]);
        assert_eq!(authority.config().mappings.len(), 1);
    }

    #[tokio::test]
    async fn cancel_discards_without_remote_calls() {
        let (mut workflow, authority) = workflow();

        workflow.cancel();
        assert_eq!(workflow.state(), &WorkflowState::Idle);

        workflow.request_delete("10").unwrap();
        workflow.cancel();

        assert_eq!(workflow.confirm().await, ConfirmOutcome::NothingPending);
        assert!(authority.calls().is_empty());
        assert_eq!(workflow.store().snapshot(), seed());
    }

    #[tokio::test]
    async fn latest_request_wins() {
        let (mut workflow, _) = workflow();

        workflow.request_delete("10").unwrap();
        workflow.request_delete("12").unwrap();
        workflow.confirm().await;

        assert!(workflow.store().contains("10"));
        assert!(!workflow.store().contains("12"));
    }

    #[tokio::test]
    async fn rejected_test_keeps_collection_and_retains_error() {
        let (mut workflow, authority) = workflow();
        authority.fail_next_test(AuthorityError::Rejected {
            status: 422,
            messages: vec!["role 9 missing".to_string(), "bad group".to_string()],
        });

        workflow.request_delete("10").unwrap();
        let outcome = workflow.confirm().await;

        assert_eq!(outcome, ConfirmOutcome::Failed(ActionKind::Delete));
        assert_eq!(workflow.store().snapshot(), seed());
        assert_eq!(authority.persist_count(), 0);
        assert_eq!(
            workflow.last_error().map(MappingError::display_message),
            Some("role 9 missing\nbad group".to_string())
        );
        assert!(!workflow.is_pending());

        assert!(workflow.dismiss_error().is_some());
        assert!(workflow.last_error().is_none());
    }

    #[tokio::test]
    async fn failed_write_keeps_collection() {
        let (mut workflow, authority) = workflow();
        authority.fail_next_persist(AuthorityError::transport("timeout"));

        workflow.request_delete("10").unwrap();
        workflow.confirm().await;

        assert_eq!(workflow.store().snapshot(), seed());
        assert!(matches!(
            workflow.last_error(),
            Some(MappingError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn colliding_bulk_ids_fail_before_any_remote_call() {
        let (mut workflow, authority) = workflow();
        workflow.store().replace(vec![MappingRecord::new("abc", "x")]);

        workflow
            .request_add(AddRequest::Bulk(",,a\n,,b".to_string()))
            .unwrap();
        let outcome = workflow.confirm().await;

        assert_eq!(outcome, ConfirmOutcome::Failed(ActionKind::Add));
        assert_eq!(workflow.last_error(), Some(&MappingError::duplicate("NaN")));
        assert!(authority.calls().is_empty());
    }

    #[test]
    fn failures_are_audited_by_where_they_stopped() {
        assert_eq!(
            failed_event(&MappingError::duplicate("NaN")),
            EventType::ActionRejected
        );
        assert_eq!(
            failed_event(&MappingError::not_found("10")),
            EventType::ActionRejected
        );
        assert_eq!(
            failed_event(&MappingError::RemoteValidation { messages: Vec::new() }),
            EventType::ConfigTestFailed
        );
        assert_eq!(
            failed_event(&MappingError::Persistence("timeout".to_string())),
            EventType::ConfigPersistFailed
        );
    }
}
