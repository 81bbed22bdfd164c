//! # jsonapi-engine
//!
//! The normalization engine behind `jsonapi-client`: maps documents in the
//! JSON:API wire convention into and out of a flat, queryable in-memory
//! store.
//!
//! This crate is pure logic. It has no knowledge of HTTP, files, or any
//! host framework; network orchestration lives in the companion client
//! crate.
//!
//! ## Core Concepts
//!
//! ### Wire documents
//!
//! A [`Document`] carries primary data (one [`Resource`], a sequence, or
//! nothing) plus side-loaded resources under `included`. Resources declare
//! typed relationships to other resources; relationship declaration order
//! from the wire is preserved.
//!
//! ### Normalized records
//!
//! Normalization flattens a resource: attributes are lifted to the top
//! level of a [`Record`] and identity, relationships, links and meta move
//! under the reserved tag. Denormalization is the exact inverse - for any
//! wire resource the round trip is lossless.
//!
//! ### The store
//!
//! The [`Store`] is a nested mapping of type to id to record, mutated only
//! through small, pure primitives (add, replace, merge, delete, clear).
//! The merge engine decides per field whether incoming data overwrites or
//! merges into existing records.
//!
//! ### Relationship resolution
//!
//! [`resolve`] substitutes live store records for relationship refs,
//! leaving `{type, id}` stubs for absent targets. Resolution is one level
//! deep by default; with [`Config::recurse_relationships`] it follows the
//! graph, cutting cycles with a per-resolution visited set.
//!
//! ## Quick Start
//!
//! ```rust
//! use jsonapi_engine::{normalize_document, parse_document, Config, Store};
//! use serde_json::json;
//!
//! let config = Config::default();
//! let doc = parse_document(json!({
//!     "data": {"type": "widget", "id": "1", "attributes": {"name": "sprocket"}}
//! }))
//! .unwrap();
//!
//! let mut store = Store::new();
//! let data = normalize_document(&doc, &config);
//! store.add_records(data.into_records(), &config);
//!
//! let record = store.get("widget", "1").unwrap();
//! assert_eq!(record.attr("name"), Some(&json!("sprocket")));
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod key;
pub mod merge;
pub mod normalize;
pub mod record;
pub mod resolve;
pub mod store;

// Re-export main types at crate root
pub use config::Config;
pub use document::{
    Document, PrimaryData, RelData, Relationship, Relationships, Resource, ResourceIdent,
};
pub use error::{Error, Result};
pub use key::Target;
pub use normalize::{
    clean_patch, denormalize, normalize_document, normalize_included, normalize_resource,
    parse_document, Data, Provenance,
};
pub use record::{Record, RecordTag, ResolvedRel};
pub use resolve::{resolve, resolve_data};
pub use store::{Store, StoreShape};

/// Type aliases for clarity
pub type TypeName = String;
pub type RecordId = String;
