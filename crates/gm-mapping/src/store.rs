//! The mapping store.
//!
//! The free functions are pure: they take the current collection and return
//! a new one, never mutating their input. [`MappingStore`] owns the live,
//! committed collection and only ever replaces it as a whole.

use std::collections::HashSet;
use std::sync::Arc;

use gm_model::{MappingPatch, MappingRecord};
use parking_lot::RwLock;

use crate::error::{MappingError, MappingResult};

/// Appends `candidates` to `collection`, preserving their order.
///
/// ## Errors
///
/// Returns [`MappingError::DuplicateId`] if a candidate id is already used
/// in `collection` or by an earlier candidate.
pub fn add_many(
    collection: &[MappingRecord],
    candidates: Vec<MappingRecord>,
) -> MappingResult<Vec<MappingRecord>> {
    let mut taken: HashSet<&str> = collection.iter().map(|r| r.id.as_str()).collect();
    for candidate in &candidates {
        if !taken.insert(candidate.id.as_str()) {
            return Err(MappingError::duplicate(candidate.id.clone()));
        }
    }

    let mut next = Vec::with_capacity(collection.len() + candidates.len());
    next.extend_from_slice(collection);
    next.extend(candidates);
    Ok(next)
}

/// Merges `patch` over the first record with id `id`.
///
/// ## Errors
///
/// Returns [`MappingError::NotFound`] if no record has `id`.
pub fn update_one(
    collection: &[MappingRecord],
    id: &str,
    patch: &MappingPatch,
) -> MappingResult<Vec<MappingRecord>> {
    let position = find(collection, id)?;

    let mut next = collection.to_vec();
    next[position] = patch.merged(&collection[position]);
    Ok(next)
}

/// Removes the first record with id `id`, keeping the others in order.
///
/// ## Errors
///
/// Returns [`MappingError::NotFound`] if no record has `id`.
pub fn remove_one(collection: &[MappingRecord], id: &str) -> MappingResult<Vec<MappingRecord>> {
    let position = find(collection, id)?;

    let mut next = collection.to_vec();
    next.remove(position);
    Ok(next)
}

// Fetched records without an id all share `""`, so only the first is addressed.
fn find(collection: &[MappingRecord], id: &str) -> MappingResult<usize> {
    collection
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| MappingError::not_found(id))
}

/// Shared handle to the committed mapping collection.
///
/// Clones share the same collection. Readers get a copy; the collection is
/// only changed through [`MappingStore::replace`].
#[derive(Debug, Clone, Default)]
pub struct MappingStore {
    records: Arc<RwLock<Vec<MappingRecord>>>,
}

impl MappingStore {
    /// Creates a store seeded with `records`.
    #[must_use]
    pub fn new(records: Vec<MappingRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Returns a copy of the committed collection.
    #[must_use]
    pub fn snapshot(&self) -> Vec<MappingRecord> {
        self.records.read().clone()
    }

    /// Returns the number of committed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Gets a record by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<MappingRecord> {
        self.records.read().iter().find(|r| r.id == id).cloned()
    }

    /// Checks whether a record with `id` exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.records.read().iter().any(|r| r.id == id)
    }

    /// Replaces the whole collection.
    pub fn replace(&self, records: Vec<MappingRecord>) {
        *self.records.write() = records;
    }

    /// Computes the collection with `candidates` appended. See [`add_many`].
    ///
    /// ## Errors
    ///
    /// Returns [`MappingError::DuplicateId`] on an id collision.
    pub fn add_many(&self, candidates: Vec<MappingRecord>) -> MappingResult<Vec<MappingRecord>> {
        add_many(&self.records.read(), candidates)
    }

    /// Computes the collection with one record patched. See [`update_one`].
    ///
    /// ## Errors
    ///
    /// Returns [`MappingError::NotFound`] if no record has `id`.
    pub fn update_one(&self, id: &str, patch: &MappingPatch) -> MappingResult<Vec<MappingRecord>> {
        update_one(&self.records.read(), id, patch)
    }

    /// Computes the collection with one record removed. See [`remove_one`].
    ///
    /// ## Errors
    ///
    /// Returns [`MappingError::NotFound`] if no record has `id`.
    pub fn remove_one(&self, id: &str) -> MappingResult<Vec<MappingRecord>> {
        remove_one(&self.records.read(), id)
    }
}
