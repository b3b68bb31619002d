//! Mapping management commands.

use std::io::Read;

use colored::Colorize;
use gm_mapping::{
    AddRequest, ConfigAuthority, ConfirmOutcome, Confirmation, MappingForm, MappingSession,
};
use gm_model::MappingRecord;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{AddArgs, BulkAddArgs, DeleteArgs, ListArgs, UpdateArgs};
use crate::config::OutputFormat;
use crate::output::{confirm, info, output, success, warning};
use crate::{CliConfig, CliError, CliResult};

use super::open_session;

/// Mapping representation for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct MappingDisplay {
    /// Mapping id.
    #[tabled(rename = "ID")]
    pub id: String,
    /// External group reference.
    #[tabled(rename = "Group ID")]
    pub group_ref: String,
    /// External group name.
    #[tabled(rename = "Group Name")]
    pub group_name: String,
    /// Mapping name.
    #[tabled(rename = "Name")]
    pub name: String,
    /// Comma-separated role ids.
    #[tabled(rename = "Role IDs")]
    pub role_ids: String,
}

impl From<&MappingRecord> for MappingDisplay {
    fn from(record: &MappingRecord) -> Self {
        Self {
            id: record.id.clone(),
            group_ref: record.external_group_ref.clone().unwrap_or_default(),
            group_name: record.external_group_name.clone(),
            name: record.name.clone(),
            role_ids: record.role_ids_display(),
        }
    }
}

/// One page of mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    /// Records on this page.
    pub rows: &'a [MappingRecord],
    /// 1-based page number.
    pub number: usize,
    /// Total number of pages.
    pub total: usize,
}

/// Returns page `number` (1-based) of `records`.
///
/// Pages past the end are empty.
#[must_use]
pub fn paginate(records: &[MappingRecord], number: usize, per_page: usize) -> Page<'_> {
    let per_page = per_page.max(1);
    let number = number.max(1);
    let total = records.len().div_ceil(per_page);
    let start = (number - 1).saturating_mul(per_page).min(records.len());
    let end = start.saturating_add(per_page).min(records.len());

    Page {
        rows: &records[start..end],
        number,
        total,
    }
}

/// Lists the committed mappings.
///
/// ## Errors
///
/// Returns an error if the session cannot be opened.
pub async fn run_list(
    args: ListArgs,
    config: &CliConfig,
    server: Option<&str>,
    token: Option<&str>,
    format: OutputFormat,
) -> CliResult<()> {
    let session = open_session(config, server, token).await?;
    let records = session.store().snapshot();
    let page = paginate(&records, args.page, args.per_page);

    let rows: Vec<MappingDisplay> = page.rows.iter().map(MappingDisplay::from).collect();
    output(&rows, format)?;
    if format == OutputFormat::Table && page.total > 0 {
        info(&format!(
            "Page {} of {} ({} mappings)",
            page.number,
            page.total,
            records.len()
        ));
    }
    Ok(())
}

/// Adds a single mapping.
///
/// ## Errors
///
/// Returns an error if the input is invalid or the commit fails.
pub async fn run_add(
    args: AddArgs,
    config: &CliConfig,
    server: Option<&str>,
    token: Option<&str>,
) -> CliResult<()> {
    let form = MappingForm {
        external_group_ref: args.group_ref,
        external_group_name: args.group_name,
        name: Some(args.name),
        role_ids: args.roles,
    };

    let mut session = open_session(config, server, token).await?;
    let confirmation = session
        .workflow_mut()
        .request_add(AddRequest::Single(form))?;
    confirm_pending(&mut session, &confirmation, args.yes).await
}

/// Adds mappings from bulk text.
///
/// ## Errors
///
/// Returns an error if the input cannot be read, yields no mappings, or the
/// commit fails.
pub async fn run_bulk_add(
    args: BulkAddArgs,
    config: &CliConfig,
    server: Option<&str>,
    token: Option<&str>,
) -> CliResult<()> {
    let text = read_bulk_input(&args)?;

    let mut session = open_session(config, server, token).await?;
    let staged = session.workflow_mut().request_add(AddRequest::Bulk(text));
    for rejected in session.workflow().rejected_lines() {
        warning(&format!(
            "Skipping line {}: \"{}\" ({})",
            rejected.line, rejected.content, rejected.reason
        ));
    }
    confirm_pending(&mut session, &staged?, args.yes).await
}

/// Reads bulk text from `--file` or stdin.
///
/// Stdin is drained to EOF, so it cannot also answer the prompt; reading
/// from stdin requires `--yes`.
fn read_bulk_input(args: &BulkAddArgs) -> CliResult<String> {
    match &args.file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None if !args.yes => Err(CliError::InvalidArgument(
            "reading mappings from stdin requires --yes; use --file to be prompted".to_string(),
        )),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Updates a mapping.
///
/// ## Errors
///
/// Returns an error if the mapping does not exist, the input is invalid, or
/// the commit fails.
pub async fn run_update(
    args: UpdateArgs,
    config: &CliConfig,
    server: Option<&str>,
    token: Option<&str>,
) -> CliResult<()> {
    let form = MappingForm {
        external_group_ref: args.group_ref,
        external_group_name: args.group_name,
        name: args.name,
        role_ids: args.roles,
    };
    if form.to_patch().is_empty() {
        return Err(CliError::InvalidArgument(
            "nothing to update; pass at least one of --name, --group-ref, --group-name, --roles"
                .to_string(),
        ));
    }

    let mut session = open_session(config, server, token).await?;
    let confirmation = session.workflow_mut().request_update(&args.id, &form)?;
    confirm_pending(&mut session, &confirmation, args.yes).await
}

/// Deletes a mapping.
///
/// ## Errors
///
/// Returns an error if the mapping does not exist or the commit fails.
pub async fn run_delete(
    args: DeleteArgs,
    config: &CliConfig,
    server: Option<&str>,
    token: Option<&str>,
) -> CliResult<()> {
    let mut session = open_session(config, server, token).await?;
    let confirmation = session.workflow_mut().request_delete(&args.id)?;
    confirm_pending(&mut session, &confirmation, args.yes).await
}

/// Shows the prompt, then confirms or cancels the pending action.
async fn confirm_pending<A: ConfigAuthority>(
    session: &mut MappingSession<A>,
    confirmation: &Confirmation,
    assume_yes: bool,
) -> CliResult<()> {
    println!("{}", confirmation.title.bold());
    println!("{}", confirmation.message);

    if !assume_yes && !confirm("Proceed?")? {
        session.workflow_mut().cancel();
        warning("Operation cancelled");
        return Ok(());
    }

    let workflow = session.workflow_mut();
    match workflow.confirm().await {
        ConfirmOutcome::Committed(kind) => {
            success(&format!(
                "Mapping {kind} committed ({} mappings)",
                workflow.store().len()
            ));
            Ok(())
        }
        ConfirmOutcome::Failed(_) => match workflow.dismiss_error() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        },
        ConfirmOutcome::NothingPending => {
            info("Nothing to confirm");
            Ok(())
        }
    }
}
