//! Single-record form input.

use gm_model::{MappingPatch, MappingRecord, split_role_ids};
use serde::{Deserialize, Serialize};

/// Values entered for a single mapping.
///
/// Every field is raw text; `role_ids` is comma-separated. Blank optional
/// fields are treated as not entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingForm {
    /// External group reference.
    #[serde(default)]
    pub external_group_ref: Option<String>,
    /// External group name.
    #[serde(default)]
    pub external_group_name: Option<String>,
    /// Name (required when adding).
    #[serde(default)]
    pub name: Option<String>,
    /// Comma-separated role ids.
    #[serde(default)]
    pub role_ids: Option<String>,
}

impl MappingForm {
    /// Creates a form with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns the trimmed name, if one was entered.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        entered(self.name.as_ref())
    }

    /// Builds a new record with the given id.
    ///
    /// The external group name defaults to the name when left blank.
    /// Returns `None` if no name was entered.
    #[must_use]
    pub fn to_record(&self, id: impl Into<String>) -> Option<MappingRecord> {
        let name = self.name()?;
        let mut record = MappingRecord::new(id, name);
        if let Some(group_ref) = entered(self.external_group_ref.as_ref()) {
            record.external_group_ref = Some(group_ref.to_string());
        }
        if let Some(group_name) = entered(self.external_group_name.as_ref()) {
            record.external_group_name = group_name.to_string();
        }
        if let Some(roles) = &self.role_ids {
            record.role_ids = split_role_ids(roles);
        }
        Some(record)
    }

    /// Builds a patch from the entered fields.
    ///
    /// A present `role_ids` entry replaces the role list, even when it parses
    /// to no roles. Other blank fields are left unchanged.
    #[must_use]
    pub fn to_patch(&self) -> MappingPatch {
        MappingPatch {
            external_group_ref: entered(self.external_group_ref.as_ref()).map(String::from),
            external_group_name: entered(self.external_group_name.as_ref()).map(String::from),
            name: self.name.as_ref().map(|n| n.trim().to_string()),
            role_ids: self.role_ids.as_deref().map(split_role_ids),
        }
    }
}

fn entered(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_defaults_group_name_to_name() {
        let form = MappingForm {
            external_group_name: Some("  ".to_string()),
            role_ids: Some("2, 5".to_string()),
            ..MappingForm::named("engineering")
        };

        let record = form.to_record("1-engineering").unwrap();
        assert_eq!(record.external_group_name, "engineering");
        assert_eq!(record.role_ids, vec!["2", "5"]);
        assert!(record.external_group_ref.is_none());
    }

    #[test]
    fn record_requires_a_name() {
        assert!(MappingForm::default().to_record("x").is_none());
        assert!(MappingForm::named("   ").to_record("x").is_none());
    }

    #[test]
    fn patch_keeps_blank_fields_unchanged() {
        let form = MappingForm {
            external_group_name: Some(String::new()),
            role_ids: Some("7".to_string()),
            ..MappingForm::default()
        };

        let patch = form.to_patch();
        assert!(patch.external_group_name.is_none());
        assert!(patch.name.is_none());
        assert_eq!(patch.role_ids, Some(vec!["7".to_string()]));
    }

    #[test]
    fn patch_can_clear_roles() {
        let form = MappingForm {
            role_ids: Some(String::new()),
            ..MappingForm::default()
        };
        assert_eq!(form.to_patch().role_ids, Some(Vec::new()));
    }

    #[test]
    fn patch_carries_a_blank_name_for_validation() {
        let patch = MappingForm::named("  ").to_patch();
        assert_eq!(patch.name.as_deref(), Some(""));
    }
}
