//! Identity configuration details.

use gm_model::ConfigSummary;
use serde::Serialize;
use tabled::Tabled;

use crate::config::OutputFormat;
use crate::output::{output, output_single};
use crate::{CliConfig, CliResult};

use super::open_session;

/// One labelled configuration detail.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct DetailDisplay {
    /// Label.
    #[tabled(rename = "Setting")]
    pub setting: &'static str,
    /// Displayed value.
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Builds the labelled rows shown for `summary`.
#[must_use]
pub fn detail_rows(summary: &ConfigSummary) -> Vec<DetailDisplay> {
    let text = |value: Option<&String>| ConfigSummary::display(value).to_string();
    let flag = |value: bool| if value { "Yes" } else { "No" }.to_string();
    let row = |setting, value| DetailDisplay { setting, value };

    vec![
        row("Enabled", flag(summary.enabled)),
        row("Audience", text(summary.audience.as_ref())),
        row("Issuer", text(summary.issuer.as_ref())),
        row(
            "Authorization Endpoint",
            text(summary.authorization_endpoint.as_ref()),
        ),
        row("Token Endpoint", text(summary.token_endpoint.as_ref())),
        row("User Info Endpoint", text(summary.userinfo_endpoint.as_ref())),
        row(
            "Scopes",
            if summary.scopes.is_empty() {
                ConfigSummary::NOT_AVAILABLE.to_string()
            } else {
                summary.scopes.join(", ")
            },
        ),
        row("Groups Attribute", text(summary.groups_attribute.as_ref())),
        row("Set Roles from Groups", flag(summary.set_roles_from_groups)),
    ]
}

/// Shows the identity configuration details.
///
/// ## Errors
///
/// Returns an error if the session cannot be opened.
pub async fn run_show(
    config: &CliConfig,
    server: Option<&str>,
    token: Option<&str>,
    format: OutputFormat,
) -> CliResult<()> {
    let session = open_session(config, server, token).await?;
    let summary = session.summary();

    match format {
        OutputFormat::Table => output(&detail_rows(&summary), format),
        _ => output_single(&summary, format),
    }
}
