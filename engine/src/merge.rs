//! Merge engine: the single path by which records land in the store.

use crate::record::Record;
use crate::store::Store;
use std::collections::hash_map::Entry;

/// Write records into the store, keyed by their tag identity.
///
/// With `merge` false an existing record is fully replaced; with `merge`
/// true the incoming record is shallow-merged over it (incoming wins on
/// conflicts, existing-only fields survive). Records without an id never
/// reach the store.
pub fn update_records<I>(store: &mut Store, records: I, merge: bool)
where
    I: IntoIterator<Item = Record>,
{
    for record in records {
        let Some(id) = record.tag.id.clone() else {
            continue;
        };
        let collection = store.records.entry(record.tag.ty.clone()).or_default();
        match collection.entry(id) {
            Entry::Occupied(mut existing) if merge => existing.get_mut().shallow_merge(record),
            Entry::Occupied(mut existing) => {
                existing.insert(record);
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
    }
}
