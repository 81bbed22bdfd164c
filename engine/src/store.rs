//! Store - the flat, queryable in-memory state container.
//!
//! The store is a plain nested mapping of type to id to record. It has no
//! notion of collections as first-class entities: a collection is simply
//! the mapping for one type. All mutation goes through the primitives
//! here, which are pure and synchronous; network orchestration lives in
//! the client crate.

use crate::config::Config;
use crate::error::Result;
use crate::key::Target;
use crate::merge;
use crate::record::Record;
use crate::{RecordId, TypeName};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Nested mapping of type -> id -> record.
pub type StoreShape = HashMap<TypeName, HashMap<RecordId, Record>>;

/// The in-memory record store.
///
/// Invariant: the record reachable at `store[type][id]` has `tag.ty ==
/// type` and `tag.id == Some(id)`; the primitives key every insert from
/// the record's own tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(flatten)]
    pub(crate) records: StoreShape,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a record by type and id.
    pub fn get(&self, ty: &str, id: &str) -> Option<&Record> {
        self.records.get(ty).and_then(|collection| collection.get(id))
    }

    /// Get the collection for a type.
    pub fn collection(&self, ty: &str) -> Option<&HashMap<RecordId, Record>> {
        self.records.get(ty)
    }

    /// Types currently present in the store.
    pub fn types(&self) -> impl Iterator<Item = &TypeName> {
        self.records.keys()
    }

    pub fn contains(&self, ty: &str, id: &str) -> bool {
        self.get(ty, id).is_some()
    }

    /// Total record count across all types.
    pub fn len(&self) -> usize {
        self.records.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add records, merging or replacing per the configured default.
    pub fn add_records<I>(&mut self, records: I, config: &Config)
    where
        I: IntoIterator<Item = Record>,
    {
        merge::update_records(self, records, config.merge_records);
    }

    /// Add records, always replacing existing ones.
    pub fn replace_records<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = Record>,
    {
        merge::update_records(self, records, false);
    }

    /// Add records, always merging into existing ones.
    pub fn merge_records<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = Record>,
    {
        merge::update_records(self, records, true);
    }

    /// Delete the record a target resolves to. The target must resolve to
    /// a type and an id; deleting a record that is not in the store is a
    /// silent no-op.
    pub fn delete_record(&mut self, target: &Target) -> Result<()> {
        let (ty, id) = target.key_required()?;
        if let Some(collection) = self.records.get_mut(&ty) {
            collection.remove(&id);
        }
        Ok(())
    }

    /// Replace an entire type's collection with the given records,
    /// deleting everything else of that type.
    pub fn clear_records(&mut self, ty: &str, records: HashMap<RecordId, Record>) {
        self.records.insert(ty.to_string(), records);
    }
}
