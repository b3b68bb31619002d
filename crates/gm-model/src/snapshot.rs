//! Remote configuration snapshot.
//!
//! Only the mapping list is interpreted. Every other field of the remote
//! configuration is kept as opaque JSON, in its original order, and sent
//! back unchanged when a candidate configuration is tested.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mapping::MappingRecord;
use crate::null_as_default;

/// The full remote identity configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Group-to-role mappings.
    #[serde(
        rename = "groups_with_role_ids",
        default,
        deserialize_with = "null_as_default"
    )]
    pub mappings: Vec<MappingRecord>,

    /// All remaining fields, carried through unchanged.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl ConfigSnapshot {
    /// Creates a snapshot from its mapping list and pass-through fields.
    #[must_use]
    pub fn new(mappings: Vec<MappingRecord>, rest: Map<String, Value>) -> Self {
        Self { mappings, rest }
    }

    /// Returns a copy of this snapshot with the mapping list replaced.
    #[must_use]
    pub fn with_mappings(&self, mappings: Vec<MappingRecord>) -> Self {
        Self {
            mappings,
            rest: self.rest.clone(),
        }
    }

    /// Extracts the details shown to administrators.
    #[must_use]
    pub fn summary(&self) -> ConfigSummary {
        let text = |key: &str| {
            self.rest
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        let flag = |key: &str| self.rest.get(key).and_then(Value::as_bool).unwrap_or(false);

        ConfigSummary {
            enabled: flag("enabled"),
            audience: text("audience"),
            issuer: text("issuer"),
            authorization_endpoint: text("authorization_endpoint"),
            token_endpoint: text("token_endpoint"),
            userinfo_endpoint: text("userinfo_endpoint"),
            scopes: self
                .rest
                .get("scopes")
                .and_then(Value::as_array)
                .map(|scopes| {
                    scopes
                        .iter()
                        .filter_map(Value::as_str)
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            groups_attribute: text("groups_attribute"),
            set_roles_from_groups: flag("set_roles_from_groups"),
            can_update: self
                .rest
                .get("can")
                .and_then(|can| can.get("update"))
                .and_then(Value::as_bool),
        }
    }
}

/// The partial update sent when a validated mapping list is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingsUpdate {
    /// The complete new mapping list.
    #[serde(rename = "groups_with_role_ids")]
    pub mappings: Vec<MappingRecord>,
}

impl MappingsUpdate {
    /// Creates an update carrying the given mapping list.
    #[must_use]
    pub const fn new(mappings: Vec<MappingRecord>) -> Self {
        Self { mappings }
    }
}

/// Administrator-facing details of the identity configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSummary {
    /// Whether OIDC authentication is enabled.
    pub enabled: bool,
    /// Expected token audience (client id).
    pub audience: Option<String>,
    /// Identity provider identifier.
    pub issuer: Option<String>,
    /// URL for initiating authentication requests.
    pub authorization_endpoint: Option<String>,
    /// URL for exchanging authorization codes for tokens.
    pub token_endpoint: Option<String>,
    /// URL for retrieving user profile information.
    pub userinfo_endpoint: Option<String>,
    /// Scopes requested from the identity provider.
    pub scopes: Vec<String>,
    /// User attribute the groups are read from.
    pub groups_attribute: Option<String>,
    /// Whether roles are assigned from group memberships.
    pub set_roles_from_groups: bool,
    /// Whether the caller may update the configuration, when reported.
    pub can_update: Option<bool>,
}

impl ConfigSummary {
    /// Placeholder shown for unset values.
    pub const NOT_AVAILABLE: &'static str = "N/A";

    /// Returns the value or the `N/A` placeholder.
    #[must_use]
    pub fn display(value: Option<&String>) -> &str {
        value.map_or(Self::NOT_AVAILABLE, String::as_str)
    }
}
