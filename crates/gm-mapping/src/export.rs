//! Snapshot download.

use chrono::{DateTime, SecondsFormat, Utc};
use gm_core::event::{Event, EventType};
use gm_model::{ConfigSnapshot, MappingRecord};
use serde::{Deserialize, Serialize};

use crate::error::{MappingError, MappingResult};

/// A serialized configuration snapshot ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotArtifact {
    /// Suggested file name.
    pub file_name: String,
    /// Indented JSON document.
    pub contents: String,
}

/// Serializes `snapshot` with its mapping list replaced by `mappings`.
///
/// The file name is `prefix` followed by the ISO-8601 time of `now` with
/// `:` and `.` replaced by `-`, and a `.json` extension.
///
/// ## Errors
///
/// Returns [`MappingError::Unexpected`] if the snapshot cannot be
/// serialized.
pub fn download_snapshot(
    snapshot: &ConfigSnapshot,
    mappings: Vec<MappingRecord>,
    prefix: &str,
    now: DateTime<Utc>,
) -> MappingResult<SnapshotArtifact> {
    let overlay = snapshot.with_mappings(mappings);
    let contents = serde_json::to_string_pretty(&overlay)
        .map_err(|e| MappingError::Unexpected(format!("Failed to serialize snapshot: {e}")))?;

    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    let file_name = format!("{prefix}{stamp}.json");

    Event::builder(EventType::SnapshotExported)
        .success()
        .mappings(overlay.mappings.iter().map(|m| m.id.clone()))
        .detail("file_name", file_name.clone())
        .build()
        .emit();

    Ok(SnapshotArtifact {
        file_name,
        contents,
    })
}
