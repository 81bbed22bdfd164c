//! Normalized records - the flattened, store-resident form of a resource.

use crate::document::Relationships;
use crate::{RecordId, TypeName};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// The reserved metadata of a normalized record.
///
/// Everything that is not an attribute lives here: identity, relationship
/// declarations, links, meta, and the internal-only bookkeeping fields
/// (`rels`, `is_data`, `is_included`, `json`) that never travel back over
/// the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordTag {
    #[serde(rename = "type")]
    pub ty: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Relationships>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
    /// Resolved relationships, populated by the relationship resolver.
    /// Serialized for the flattened view, never read back in.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub rels: Option<HashMap<String, ResolvedRel>>,
    /// Provenance: this record arrived as primary data.
    #[serde(
        rename = "isData",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_data: bool,
    /// Provenance: this record arrived side-loaded under `included`.
    #[serde(
        rename = "isIncluded",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_included: bool,
    /// The original wire document, kept verbatim when `preserve_json` is
    /// enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
}

impl RecordTag {
    pub fn new(ty: impl Into<TypeName>) -> Self {
        Self {
            ty: ty.into(),
            ..Default::default()
        }
    }
}

/// A resolved relationship entry under `rels`.
///
/// A to-one relationship resolves to the related record (or a stub when
/// the target is not in the store); a to-many resolves to records keyed by
/// id. The `{}` declaration resolves to `Empty`, never to null or an empty
/// sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedRel {
    One(Box<Record>),
    Many(HashMap<RecordId, Record>),
    Empty {},
}

/// A normalized record: attributes lifted to the top level plus the
/// reserved metadata under `_jv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_jv")]
    pub tag: RecordTag,
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl Record {
    pub fn new(tag: RecordTag) -> Self {
        Self {
            tag,
            attrs: Map::new(),
        }
    }

    /// A relationship stub: bare identity, no attributes. Stands in for a
    /// relationship target that is absent from the store or cut off by
    /// cycle detection.
    pub fn stub(ty: impl Into<TypeName>, id: impl Into<RecordId>) -> Self {
        let mut tag = RecordTag::new(ty);
        tag.id = Some(id.into());
        Self::new(tag)
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Shallow merge: every top-level attribute and every present
    /// metadata sub-field of `incoming` overwrites the corresponding
    /// field here; fields only present on `self` are retained.
    pub fn shallow_merge(&mut self, incoming: Record) {
        for (key, value) in incoming.attrs {
            self.attrs.insert(key, value);
        }

        self.tag.ty = incoming.tag.ty;
        if incoming.tag.id.is_some() {
            self.tag.id = incoming.tag.id;
        }
        if incoming.tag.relationships.is_some() {
            self.tag.relationships = incoming.tag.relationships;
        }
        if incoming.tag.links.is_some() {
            self.tag.links = incoming.tag.links;
        }
        if incoming.tag.meta.is_some() {
            self.tag.meta = incoming.tag.meta;
        }
        if incoming.tag.rels.is_some() {
            self.tag.rels = incoming.tag.rels;
        }
        if incoming.tag.json.is_some() {
            self.tag.json = incoming.tag.json;
        }
        self.tag.is_data |= incoming.tag.is_data;
        self.tag.is_included |= incoming.tag.is_included;
    }

    /// The record's `self` link, if the server provided one.
    pub fn self_link(&self) -> Option<&str> {
        self.tag
            .links
            .as_ref()
            .and_then(|links| links.get("self"))
            .and_then(Value::as_str)
    }

    /// Render the flattened JSON view, with the reserved metadata under
    /// the configured tag name.
    pub fn to_flat_value(&self, jvtag: &str) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if jvtag != "_jv" {
            if let Value::Object(map) = &mut value {
                if let Some(tag) = map.remove("_jv") {
                    map.insert(jvtag.to_string(), tag);
                }
            }
        }
        value
    }

    /// Parse a flattened JSON view produced by [`Record::to_flat_value`].
    pub fn from_flat_value(mut value: Value, jvtag: &str) -> crate::Result<Self> {
        if jvtag != "_jv" {
            if let Value::Object(map) = &mut value {
                if let Some(tag) = map.remove(jvtag) {
                    map.insert("_jv".to_string(), tag);
                }
            }
        }
        serde_json::from_value(value).map_err(|e| crate::Error::Document(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn widget() -> Record {
        let mut tag = RecordTag::new("widget");
        tag.id = Some("1".into());
        tag.is_data = true;
        let mut record = Record::new(tag);
        record.attrs.insert("name".into(), json!("sprocket"));
        record.attrs.insert("color".into(), json!("black"));
        record
    }

    #[test]
    fn flattened_shape() {
        let value = serde_json::to_value(widget()).unwrap();
        assert_eq!(value["name"], json!("sprocket"));
        assert_eq!(value["_jv"]["type"], json!("widget"));
        assert_eq!(value["_jv"]["id"], json!("1"));
        assert_eq!(value["_jv"]["isData"], json!(true));
        assert!(value["_jv"].get("isIncluded").is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let record = widget();
        let value = serde_json::to_value(&record).unwrap();
        let parsed: Record = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn custom_jvtag() {
        let flat = widget().to_flat_value("_meta");
        assert!(flat.get("_jv").is_none());
        assert_eq!(flat["_meta"]["type"], json!("widget"));

        let parsed = Record::from_flat_value(flat, "_meta").unwrap();
        assert_eq!(parsed, widget());
    }

    #[test]
    fn shallow_merge_overwrites_and_retains() {
        let mut existing = widget();

        let mut tag = RecordTag::new("widget");
        tag.id = Some("1".into());
        let mut incoming = Record::new(tag);
        incoming.attrs.insert("name".into(), json!("gear"));
        incoming.attrs.insert("size".into(), json!("L"));

        existing.shallow_merge(incoming);

        assert_eq!(existing.attr("name"), Some(&json!("gear")));
        assert_eq!(existing.attr("size"), Some(&json!("L")));
        // Key only on the existing record survives
        assert_eq!(existing.attr("color"), Some(&json!("black")));
        // Absent incoming sub-fields leave existing metadata alone
        assert!(existing.tag.is_data);
    }

    #[test]
    fn stub_has_no_attributes() {
        let stub = Record::stub("widget", "2");
        assert!(stub.attrs.is_empty());
        assert_eq!(stub.tag.ty, "widget");
        assert_eq!(stub.tag.id.as_deref(), Some("2"));
    }

    #[test]
    fn self_link() {
        let mut record = widget();
        let mut links = Map::new();
        links.insert("self".into(), json!("weirdPath/1"));
        record.tag.links = Some(links);
        assert_eq!(record.self_link(), Some("weirdPath/1"));
    }
}
