//! Pending action and two-phase commit tests.

use gm_mapping::{
    ActionKind, AddRequest, AuthorityCall, AuthorityError, CommitStatus, ConfirmOutcome,
    MappingError, MappingForm, WorkflowState,
};
use gm_model::MappingRecord;

use crate::common::TestEnv;

#[tokio::test]
async fn single_add_grows_collection_by_one() -> anyhow::Result<()> {
    let mut env = TestEnv::new().await?;
    let before = env.session.store().snapshot();

    let form = MappingForm {
        external_group_ref: Some("9".to_string()),
        role_ids: Some("2, 7".to_string()),
        ..MappingForm::named("support")
    };
    env.session
        .workflow_mut()
        .request_add(AddRequest::Single(form))?;
    let outcome = env.session.workflow_mut().confirm().await;

    assert_eq!(outcome, ConfirmOutcome::Committed(ActionKind::Add));
    let after = env.session.store().snapshot();
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(&after[..before.len()], &before[..]);

    let added = &after[before.len()];
    assert_eq!(added.name, "support");
    assert_eq!(added.external_group_name, "support");
    assert_eq!(added.external_group_ref.as_deref(), Some("9"));
    assert_eq!(added.role_ids, vec!["2", "7"]);
    Ok(())
}

#[tokio::test]
async fn bulk_add_appends_parsed_lines_in_order() -> anyhow::Result<()> {
    let mut env = TestEnv::new().await?;

    let confirmation = env.session.workflow_mut().request_add(AddRequest::Bulk(
        "6,Test Group,My Custom Name,2,5\n,,Another Group,1".to_string(),
    ))?;
    assert_eq!(confirmation.title, "Confirm New Mappings");
    assert!(env.session.workflow_mut().confirm().await.is_committed());

    let records = env.session.store().snapshot();
    assert_eq!(records.len(), 4);
    assert_eq!(
        records[2],
        MappingRecord::new("13", "My Custom Name")
            .with_external_group_ref("6")
            .with_external_group_name("Test Group")
            .with_role_ids(["2", "5"])
    );
    assert_eq!(
        records[3],
        MappingRecord::new("14", "Another Group")
            .with_external_group_ref("")
            .with_external_group_name("Another Group")
            .with_role_ids(["1"])
    );
    Ok(())
}

#[tokio::test]
async fn successful_commit_adopts_the_candidate() -> anyhow::Result<()> {
    let mut env = TestEnv::new().await?;

    env.session.workflow_mut().request_delete("10")?;
    env.session.workflow_mut().confirm().await;

    let calls = env.authority.calls();
    let Some(AuthorityCall::Persist(update)) = calls.last() else {
        anyhow::bail!("expected a persist call, got {calls:?}");
    };
    assert_eq!(env.session.store().snapshot(), update.mappings);
    assert_eq!(env.authority.config().mappings, update.mappings);
    assert_eq!(
        env.recorder.take_statuses(),
        vec![
            CommitStatus::RunningTest,
            CommitStatus::TestSuccessful,
            CommitStatus::UpdatingConfig,
            CommitStatus::Finished,
        ]
    );
    assert_eq!(env.recorder.pauses().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_call_carries_every_other_field() -> anyhow::Result<()> {
    let mut env = TestEnv::new().await?;
    let original = env.session.snapshot().clone();

    env.session.workflow_mut().request_delete("12")?;
    env.session.workflow_mut().confirm().await;

    let calls = env.authority.calls();
    let tested = calls
        .iter()
        .find_map(|c| match c {
            AuthorityCall::Test(candidate) => Some(candidate),
            _ => None,
        })
        .ok_or_else(|| anyhow::anyhow!("no test call"))?;
    assert_eq!(tested.rest, original.rest);
    assert_eq!(tested.mappings.len(), 1);
    Ok(())
}

#[tokio::test]
async fn rejected_candidate_leaves_collection_unchanged() -> anyhow::Result<()> {
    let mut env = TestEnv::new().await?;
    let before = env.session.store().snapshot();
    env.authority.fail_next_test(AuthorityError::Rejected {
        status: 422,
        messages: vec![
            "Role 99 does not exist".to_string(),
            "Group name must be unique".to_string(),
        ],
    });

    let form = MappingForm {
        role_ids: Some("99".to_string()),
        ..MappingForm::named("ghost")
    };
    env.session
        .workflow_mut()
        .request_add(AddRequest::Single(form))?;
    let outcome = env.session.workflow_mut().confirm().await;

    assert_eq!(outcome, ConfirmOutcome::Failed(ActionKind::Add));
    assert_eq!(env.session.store().snapshot(), before);
    assert_eq!(env.authority.persist_count(), 0);
    assert_eq!(
        env.recorder.take_statuses(),
        vec![CommitStatus::RunningTest, CommitStatus::TestFailed]
    );

    let error = env
        .session
        .workflow()
        .last_error()
        .ok_or_else(|| anyhow::anyhow!("error was not retained"))?;
    assert_eq!(
        error.display_message(),
        "Role 99 does not exist\nGroup name must be unique"
    );
    assert_eq!(env.session.workflow().state(), &WorkflowState::Idle);
    Ok(())
}

#[tokio::test]
async fn write_failure_after_passing_test_is_distinct() -> anyhow::Result<()> {
    let mut env = TestEnv::new().await?;
    let before = env.session.store().snapshot();
    env.authority
        .fail_next_persist(AuthorityError::rejected(503, "Service Unavailable"));

    env.session.workflow_mut().request_delete("10")?;
    env.session.workflow_mut().confirm().await;

    assert_eq!(env.session.store().snapshot(), before);
    assert_eq!(env.authority.config().mappings, before);
    assert!(matches!(
        env.session.workflow().last_error(),
        Some(MappingError::Persistence(_))
    ));
    Ok(())
}

#[tokio::test]
async fn failed_attempt_can_be_retried() -> anyhow::Result<()> {
    let mut env = TestEnv::new().await?;
    env.authority
        .fail_next_test(AuthorityError::transport("connection reset"));

    env.session.workflow_mut().request_delete("10")?;
    assert_eq!(
        env.session.workflow_mut().confirm().await,
        ConfirmOutcome::Failed(ActionKind::Delete)
    );
    assert!(matches!(
        env.session.workflow_mut().dismiss_error(),
        Some(MappingError::Unexpected(_))
    ));

    env.session.workflow_mut().request_delete("10")?;
    assert!(env.session.workflow_mut().confirm().await.is_committed());
    assert!(!env.session.store().contains("10"));
    assert!(env.session.workflow().last_error().is_none());
    Ok(())
}

#[tokio::test]
async fn update_changes_only_its_target() -> anyhow::Result<()> {
    let mut env = TestEnv::new().await?;
    let before = env.session.store().snapshot();

    let form = MappingForm {
        name: Some("revenue".to_string()),
        role_ids: Some(String::new()),
        ..MappingForm::default()
    };
    let confirmation = env.session.workflow_mut().request_update("12", &form)?;
    assert_eq!(
        confirmation.message,
        "You are about to update the mapping for \"sales\"."
    );
    env.session.workflow_mut().confirm().await;

    let after = env.session.store().snapshot();
    assert_eq!(after[0], before[0]);
    assert_eq!(after[1].id, "12");
    assert_eq!(after[1].name, "revenue");
    assert_eq!(after[1].external_group_name, "Sales");
    assert!(after[1].role_ids.is_empty());
    Ok(())
}

#[tokio::test]
async fn cancel_and_replacement_semantics() -> anyhow::Result<()> {
    let mut env = TestEnv::new().await?;

    env.session.workflow_mut().cancel();
    assert_eq!(env.session.workflow().state(), &WorkflowState::Idle);

    env.session.workflow_mut().request_delete("10")?;
    env.session
        .workflow_mut()
        .request_add(AddRequest::Single(MappingForm::named("ops")))?;
    env.session.workflow_mut().confirm().await;

    let names: Vec<String> = env
        .session
        .store()
        .snapshot()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["engineering", "sales", "ops"]);
    Ok(())
}

#[tokio::test]
async fn local_validation_never_reaches_the_authority() -> anyhow::Result<()> {
    let mut env = TestEnv::new().await?;
    let fetches = env.authority.calls().len();

    let workflow = env.session.workflow_mut();
    assert!(
        workflow
            .request_add(AddRequest::Single(MappingForm::default()))
            .is_err()
    );
    assert!(workflow.request_add(AddRequest::Bulk(String::new())).is_err());
    assert!(workflow.request_delete("missing").is_err());
    assert_eq!(workflow.confirm().await, ConfirmOutcome::NothingPending);

    assert_eq!(env.authority.calls().len(), fetches);
    Ok(())
}
