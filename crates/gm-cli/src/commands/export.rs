//! Configuration backup export.

use std::path::{Path, PathBuf};

use chrono::Utc;
use gm_mapping::SnapshotArtifact;

use crate::cli::ExportArgs;
use crate::output::success;
use crate::{CliConfig, CliResult};

use super::open_session;

/// Writes the current configuration, with the committed mappings, as a
/// JSON backup.
///
/// ## Errors
///
/// Returns an error if the session cannot be opened or the file cannot be
/// written.
pub async fn run_export(
    args: ExportArgs,
    config: &CliConfig,
    server: Option<&str>,
    token: Option<&str>,
) -> CliResult<()> {
    let session = open_session(config, server, token).await?;
    let artifact = session.download(Utc::now())?;

    let dir = args
        .dir
        .unwrap_or_else(|| PathBuf::from(&config.settings.export.directory));
    let path = write_artifact(&dir, &artifact)?;

    success(&format!(
        "Exported {} mappings to {}",
        session.store().len(),
        path.display()
    ));
    Ok(())
}

/// Writes `artifact` into `dir`, creating the directory if needed.
///
/// ## Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_artifact(dir: &Path, artifact: &SnapshotArtifact) -> CliResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&artifact.file_name);
    std::fs::write(&path, &artifact.contents)?;
    tracing::debug!(path = %path.display(), "Wrote snapshot");
    Ok(path)
}
