//! Group-to-role mapping model.
//!
//! The wire names follow the remote configuration store
//! (`looker_group_id`, `looker_group_name`, `role_ids`).

use serde::{Deserialize, Serialize};

use crate::null_as_default;

/// An association between an identity-provider group and local roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    // === Identity ===
    /// Identifier, unique within the collection and never changed once set.
    ///
    /// Records fetched without an id carry an empty string.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    // === External group ===
    /// Free-form identifier of the group in the external system.
    #[serde(
        rename = "looker_group_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub external_group_ref: Option<String>,
    /// Display name of the external group; defaults to `name`.
    #[serde(
        rename = "looker_group_name",
        default,
        deserialize_with = "null_as_default"
    )]
    pub external_group_name: String,

    // === Mapping ===
    /// Name of the identity-provider group. Required and non-empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Local role ids, in the order they were entered.
    #[serde(default, deserialize_with = "null_as_default")]
    pub role_ids: Vec<String>,
}

impl MappingRecord {
    /// Creates a record whose external group name defaults to `name`.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            external_group_ref: None,
            external_group_name: name.clone(),
            name,
            role_ids: Vec::new(),
        }
    }

    /// Sets the external group reference.
    #[must_use]
    pub fn with_external_group_ref(mut self, group_ref: impl Into<String>) -> Self {
        self.external_group_ref = Some(group_ref.into());
        self
    }

    /// Sets the external group name.
    #[must_use]
    pub fn with_external_group_name(mut self, group_name: impl Into<String>) -> Self {
        self.external_group_name = group_name.into();
        self
    }

    /// Sets the role ids.
    #[must_use]
    pub fn with_role_ids<I, S>(mut self, role_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role_ids = role_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the role ids joined for display (`"2, 5"`).
    #[must_use]
    pub fn role_ids_display(&self) -> String {
        self.role_ids.join(", ")
    }
}

/// A partial update to a [`MappingRecord`].
///
/// Fields left as `None` keep their current value. The id is never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingPatch {
    /// New external group reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_group_ref: Option<String>,
    /// New external group name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_group_name: Option<String>,
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement role ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_ids: Option<Vec<String>>,
}

impl MappingPatch {
    /// Returns whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.external_group_ref.is_none()
            && self.external_group_name.is_none()
            && self.name.is_none()
            && self.role_ids.is_none()
    }

    /// Applies this patch to an existing record.
    pub fn apply_to(&self, record: &mut MappingRecord) {
        if let Some(ref v) = self.external_group_ref {
            record.external_group_ref = Some(v.clone());
        }
        if let Some(ref v) = self.external_group_name {
            record.external_group_name = v.clone();
        }
        if let Some(ref v) = self.name {
            record.name = v.clone();
        }
        if let Some(ref v) = self.role_ids {
            record.role_ids = v.clone();
        }
    }

    /// Returns a copy of `record` with this patch merged over it.
    #[must_use]
    pub fn merged(&self, record: &MappingRecord) -> MappingRecord {
        let mut merged = record.clone();
        self.apply_to(&mut merged);
        merged
    }
}

/// Splits a comma-separated role list, trimming entries and dropping empties.
#[must_use]
pub fn split_role_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
