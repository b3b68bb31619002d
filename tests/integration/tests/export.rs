//! Snapshot download tests.

use chrono::{TimeZone, Utc};
use gm_mapping::AddRequest;
use gm_mapping::MappingForm;
use gm_model::ConfigSnapshot;

use crate::common::{TestEnv, remote_config};

#[tokio::test]
async fn download_round_trips_current_mappings() -> anyhow::Result<()> {
    let mut env = TestEnv::new().await?;
    env.session
        .workflow_mut()
        .request_add(AddRequest::Single(MappingForm::named("ops")))?;
    env.session.workflow_mut().confirm().await;

    let artifact = env.session.download(Utc::now())?;
    let parsed: ConfigSnapshot = serde_json::from_str(&artifact.contents)?;

    assert_eq!(parsed.mappings, env.session.store().snapshot());
    assert_eq!(parsed.rest, remote_config().rest);
    Ok(())
}

#[tokio::test]
async fn download_reflects_committed_state_only() -> anyhow::Result<()> {
    let mut env = TestEnv::new().await?;
    env.session.workflow_mut().request_delete("10")?;

    let artifact = env.session.download(Utc::now())?;
    let parsed: ConfigSnapshot = serde_json::from_str(&artifact.contents)?;

    assert_eq!(parsed.mappings.len(), 2);
    Ok(())
}

#[tokio::test]
async fn artifact_name_has_no_colons_or_dots_in_the_timestamp() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let now = Utc
        .with_ymd_and_hms(2025, 1, 31, 23, 59, 58)
        .single()
        .ok_or_else(|| anyhow::anyhow!("invalid timestamp"))?;

    let artifact = env.session.download(now)?;

    assert_eq!(
        artifact.file_name,
        "oidc_config_backup_2025-01-31T23-59-58-000Z.json"
    );
    Ok(())
}

#[tokio::test]
async fn summary_reads_pass_through_fields() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let summary = env.session.summary();

    assert!(summary.enabled);
    assert_eq!(summary.issuer.as_deref(), Some("https://idp.example.com"));
    assert_eq!(summary.userinfo_endpoint, None);
    assert_eq!(summary.scopes, vec!["openid", "profile", "groups"]);
    assert_eq!(summary.can_update, Some(true));
    Ok(())
}
