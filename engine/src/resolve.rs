//! Relationship resolution.
//!
//! Walks a record's relationship declarations and substitutes live store
//! records (cloned at resolution time) for the `{type, id}` refs, leaving
//! stubs where the target is absent. Resolution is one level deep unless
//! `recurse_relationships` is enabled; recursion threads a visited set of
//! `"type/id"` keys through the walk, so cyclic graphs terminate with a
//! stub at the point of re-entry.

use crate::config::Config;
use crate::document::{RelData, ResourceIdent};
use crate::normalize::Data;
use crate::record::{Record, ResolvedRel};
use crate::store::Store;
use std::collections::{HashMap, HashSet};

/// Populate `tag.rels` on a record from the store.
///
/// Each top-level call owns its own cycle guard; sibling resolutions share
/// no visited state.
pub fn resolve(record: &mut Record, store: &Store, config: &Config) {
    let mut visited = HashSet::new();
    if let Some(id) = record.tag.id.as_deref() {
        visited.insert(format!("{}/{}", record.tag.ty, id));
    }
    resolve_with(record, store, config, &mut visited);
}

/// Resolve every member of a normalized payload independently.
pub fn resolve_data(data: &mut Data, store: &Store, config: &Config) {
    match data {
        Data::One(record) => resolve(record, store, config),
        Data::Many { records, .. } => {
            for record in records.values_mut() {
                resolve(record, store, config);
            }
        }
        Data::Empty { .. } => {}
    }
}

fn resolve_with(record: &mut Record, store: &Store, config: &Config, visited: &mut HashSet<String>) {
    let Some(relationships) = record.tag.relationships.clone() else {
        return;
    };

    let mut rels = HashMap::with_capacity(relationships.len());
    for (name, rel) in relationships.iter() {
        let resolved = match &rel.data {
            // Declaration without data (links-only): nothing to resolve.
            None => continue,
            Some(RelData::Empty {}) => ResolvedRel::Empty {},
            Some(RelData::One(ident)) => {
                ResolvedRel::One(Box::new(resolve_ref(ident, store, config, visited)))
            }
            Some(RelData::Many(idents)) => {
                let mut members = HashMap::with_capacity(idents.len());
                for ident in idents {
                    members.insert(ident.id.clone(), resolve_ref(ident, store, config, visited));
                }
                ResolvedRel::Many(members)
            }
        };
        rels.insert(name.to_string(), resolved);
    }

    record.tag.rels = Some(rels);
}

fn resolve_ref(
    ident: &ResourceIdent,
    store: &Store,
    config: &Config,
    visited: &mut HashSet<String>,
) -> Record {
    let key = ident.path();
    if visited.contains(&key) {
        return Record::stub(&ident.ty, &ident.id);
    }

    match store.get(&ident.ty, &ident.id) {
        Some(found) => {
            let mut record = found.clone();
            if config.recurse_relationships {
                visited.insert(key);
                resolve_with(&mut record, store, config, visited);
            }
            record
        }
        None => Record::stub(&ident.ty, &ident.id),
    }
}
