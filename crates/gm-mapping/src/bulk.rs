//! Bulk mapping input.
//!
//! Each non-blank line describes one mapping as comma-separated fields:
//!
//! ```text
//! external_group_ref (optional), external_group_name (optional), name (required), role_ids...
//! 6,Test Group,My Custom Name,2,5
//! ,,Another Group,1
//! ```
//!
//! Malformed lines are skipped and reported; they never abort the batch.
//! Parsing is a pure function of the text and the current collection.

use gm_model::MappingRecord;
use serde::{Deserialize, Serialize};

use crate::id::{bulk_id_base, bulk_record_id};

/// Result of parsing bulk input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkParse {
    /// One candidate per accepted line, in input order.
    pub records: Vec<MappingRecord>,
    /// Lines that were skipped.
    pub rejected: Vec<RejectedLine>,
}

impl BulkParse {
    /// Returns whether no line produced a candidate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A bulk line that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedLine {
    /// 1-based line position in the input.
    pub line: usize,
    /// The trimmed line.
    pub content: String,
    /// Why the line was skipped.
    pub reason: String,
}

/// Parses bulk text into candidate records.
///
/// Ids are assigned from the largest numeric id in `existing` plus the
/// line's 1-based position, counting blank lines.
#[must_use]
pub fn parse_bulk_input(input: &str, existing: &[MappingRecord]) -> BulkParse {
    let base = bulk_id_base(existing);
    let mut result = BulkParse::default();

    for (index, line) in input.split('\n').enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts.len() < 3 || parts[2].is_empty() {
            tracing::warn!(
                line = index + 1,
                content = trimmed,
                "Skipping malformed bulk line: name is required (third comma-separated value)"
            );
            result.rejected.push(RejectedLine {
                line: index + 1,
                content: trimmed.to_string(),
                reason: "name is required (third comma-separated value)".to_string(),
            });
            continue;
        }

        let name = parts[2];
        let group_name = if parts[1].is_empty() { name } else { parts[1] };
        let role_ids = parts[3..]
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| (*r).to_string());

        result.records.push(
            MappingRecord::new(bulk_record_id(base, index + 1), name)
                .with_external_group_ref(parts[0])
                .with_external_group_name(group_name)
                .with_role_ids(role_ids),
        );
    }

    tracing::debug!(
        accepted = result.records.len(),
        rejected = result.rejected.len(),
        "Parsed bulk mapping input"
    );
    result
}
