//! # gm-model
//!
//! Domain models for OIDC group-to-role mappings.
//!
//! A [`MappingRecord`] associates an identity-provider group with a set of
//! local role ids. The full remote configuration is carried as a
//! [`ConfigSnapshot`], of which the mapping list is one field and every
//! other field is passed through untouched.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod mapping;
pub mod snapshot;

pub use mapping::{MappingPatch, MappingRecord, split_role_ids};
pub use snapshot::{ConfigSnapshot, ConfigSummary, MappingsUpdate};

use serde::{Deserialize, Deserializer};

/// Deserializes `null` as the type's default value.
///
/// The remote configuration store reports unset strings and lists as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
