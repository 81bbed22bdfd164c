//! Normalization and denormalization between the wire shape and the
//! flat store shape.
//!
//! Normalization lifts attributes to the top level of a [`Record`] and
//! tucks everything else under the reserved tag; denormalization is the
//! exact inverse, modulo the internal-only bookkeeping fields. For any wire
//! resource `r`, `denormalize(&normalize_resource(r, ..)) == r`.

use crate::config::Config;
use crate::document::{Document, PrimaryData, Resource};
use crate::error::{Error, Result};
use crate::record::{Record, RecordTag};
use crate::store::Store;
use crate::RecordId;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Where a resource appeared in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Under the document's primary `data`.
    Primary,
    /// Side-loaded under `included`.
    Included,
}

/// Normalized primary data: the shape handed to callers and fed into the
/// store.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// A single resource.
    One(Record),
    /// A collection keyed by id. `json` carries the preserved wire
    /// document when `preserve_json` is enabled.
    Many {
        records: HashMap<RecordId, Record>,
        json: Option<Value>,
    },
    /// No primary data (collection with no items, or a bare meta
    /// envelope). `json` as above.
    Empty { json: Option<Value> },
}

impl Data {
    /// The single record, if this is the single-resource shape.
    pub fn single(&self) -> Option<&Record> {
        match self {
            Data::One(record) => Some(record),
            _ => None,
        }
    }

    /// The collection map, if this is the collection shape.
    pub fn records(&self) -> Option<&HashMap<RecordId, Record>> {
        match self {
            Data::Many { records, .. } => Some(records),
            _ => None,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        match self {
            Data::One(record) if record.tag.id.as_deref() == Some(id) => Some(record),
            Data::Many { records, .. } => records.get(id),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Data::One(_) => 1,
            Data::Many { records, .. } => records.len(),
            Data::Empty { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into a record list for the store primitives.
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Data::One(record) => vec![record],
            Data::Many { records, .. } => records.into_values().collect(),
            Data::Empty { .. } => Vec::new(),
        }
    }
}

/// Normalize one wire resource into the flat record shape.
pub fn normalize_resource(resource: Resource, provenance: Provenance) -> Record {
    let mut tag = RecordTag::new(resource.ty);
    tag.id = resource.id;
    tag.relationships = resource.relationships;
    tag.links = resource.links;
    tag.meta = resource.meta;
    match provenance {
        Provenance::Primary => tag.is_data = true,
        Provenance::Included => tag.is_included = true,
    }

    Record {
        tag,
        attrs: resource.attributes.unwrap_or_default(),
    }
}

/// Normalize a document's primary data.
///
/// A single resource becomes [`Data::One`], an array becomes [`Data::Many`]
/// keyed by id (id-less members are dropped), and absent or empty primary
/// data becomes [`Data::Empty`]. With `preserve_json` the original document
/// rides along: on the tag for a single resource, at the collection level
/// otherwise.
pub fn normalize_document(doc: &Document, config: &Config) -> Data {
    let json = config.preserve_json.then(|| document_value(doc));

    match &doc.data {
        Some(PrimaryData::One(resource)) => {
            let mut record = normalize_resource(resource.clone(), Provenance::Primary);
            record.tag.json = json;
            Data::One(record)
        }
        Some(PrimaryData::Many(list)) if !list.is_empty() => {
            let mut records = HashMap::with_capacity(list.len());
            for resource in list {
                let record = normalize_resource(resource.clone(), Provenance::Primary);
                if let Some(id) = record.tag.id.clone() {
                    records.insert(id, record);
                }
            }
            Data::Many { records, json }
        }
        Some(PrimaryData::Many(_)) | None => Data::Empty { json },
    }
}

/// Normalize a document's side-loaded resources.
pub fn normalize_included(doc: &Document) -> Vec<Record> {
    doc.included
        .iter()
        .map(|resource| normalize_resource(resource.clone(), Provenance::Included))
        .collect()
}

/// Decode a raw response body into a [`Document`].
pub fn parse_document(value: Value) -> Result<Document> {
    serde_json::from_value(value).map_err(|e| Error::Document(e.to_string()))
}

/// Denormalize a record back to the wire shape, dropping the
/// internal-only fields (`rels`, provenance marks, preserved json).
pub fn denormalize(record: &Record) -> Resource {
    Resource {
        ty: record.tag.ty.clone(),
        id: record.tag.id.clone(),
        attributes: if record.attrs.is_empty() {
            None
        } else {
            Some(record.attrs.clone())
        },
        relationships: record.tag.relationships.clone(),
        links: record.tag.links.clone(),
        meta: record.tag.meta.clone(),
    }
}

/// Reduce a patch payload to the attributes that actually changed.
///
/// Attributes equal to the stored copy are dropped; the tag is stripped to
/// identity plus the sub-keys named in `props` (`links`, `meta`,
/// `relationships`). With no stored copy every attribute is kept.
pub fn clean_patch(record: &Record, store: Option<&Store>, props: &[String]) -> Record {
    let mut tag = RecordTag::new(record.tag.ty.clone());
    tag.id = record.tag.id.clone();
    for prop in props {
        match prop.as_str() {
            "links" => tag.links = record.tag.links.clone(),
            "meta" => tag.meta = record.tag.meta.clone(),
            "relationships" => tag.relationships = record.tag.relationships.clone(),
            _ => {}
        }
    }

    let stored = store.and_then(|s| {
        record
            .tag
            .id
            .as_deref()
            .and_then(|id| s.get(&record.tag.ty, id))
    });

    let mut attrs = Map::new();
    for (key, value) in &record.attrs {
        let unchanged = stored
            .map(|existing| existing.attr(key) == Some(value))
            .unwrap_or(false);
        if !unchanged {
            attrs.insert(key.clone(), value.clone());
        }
    }

    Record { tag, attrs }
}

fn document_value(doc: &Document) -> Value {
    serde_json::to_value(doc).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{RelData, Relationship, Relationships, ResourceIdent};
    use serde_json::json;

    fn widget_resource() -> Resource {
        serde_json::from_value(json!({
            "type": "widget",
            "id": "1",
            "attributes": {"name": "sprocket", "color": "black"},
            "relationships": {
                "widgets": {"data": {"type": "widget", "id": "2"}},
            },
            "links": {"self": "/widget/1"},
        }))
        .unwrap()
    }

    #[test]
    fn normalize_single() {
        let record = normalize_resource(widget_resource(), Provenance::Primary);

        assert_eq!(record.tag.ty, "widget");
        assert_eq!(record.tag.id.as_deref(), Some("1"));
        assert_eq!(record.attr("name"), Some(&json!("sprocket")));
        assert!(record.tag.is_data);
        assert!(!record.tag.is_included);
        assert_eq!(
            record
                .tag
                .relationships
                .as_ref()
                .and_then(|r| r.get("widgets"))
                .and_then(|r| r.data.clone()),
            Some(RelData::One(ResourceIdent::new("widget", "2")))
        );
    }

    #[test]
    fn normalize_included_marks_provenance() {
        let record = normalize_resource(widget_resource(), Provenance::Included);
        assert!(record.tag.is_included);
        assert!(!record.tag.is_data);
    }

    #[test]
    fn roundtrip_single() {
        let resource = widget_resource();
        let record = normalize_resource(resource.clone(), Provenance::Primary);
        assert_eq!(denormalize(&record), resource);
    }

    #[test]
    fn roundtrip_drops_internal_fields() {
        let resource = widget_resource();
        let mut record = normalize_resource(resource.clone(), Provenance::Primary);
        record.tag.json = Some(json!({"anything": true}));
        record.tag.rels = Some(Default::default());
        assert_eq!(denormalize(&record), resource);
    }

    #[test]
    fn normalize_collection() {
        let doc: Document = serde_json::from_value(json!({
            "data": [
                {"type": "widget", "id": "1", "attributes": {"name": "a"}},
                {"type": "widget", "id": "2", "attributes": {"name": "b"}},
            ]
        }))
        .unwrap();

        let data = normalize_document(&doc, &Config::default());
        let records = data.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records["1"].attr("name"), Some(&json!("a")));
        assert!(records["2"].tag.is_data);
    }

    #[test]
    fn normalize_empty_collection() {
        let doc: Document = serde_json::from_value(json!({"data": []})).unwrap();
        let data = normalize_document(&doc, &Config::default());
        assert_eq!(data, Data::Empty { json: None });
    }

    #[test]
    fn preserve_json_on_meta_only_response() {
        let value = json!({"meta": {"token": "123456"}});
        let doc = parse_document(value.clone()).unwrap();

        let config = Config {
            preserve_json: true,
            ..Default::default()
        };
        let data = normalize_document(&doc, &config);
        assert_eq!(
            data,
            Data::Empty {
                json: Some(value.clone())
            }
        );

        // and without the option the envelope is dropped
        let data = normalize_document(&doc, &Config::default());
        assert_eq!(data, Data::Empty { json: None });
    }

    #[test]
    fn preserve_json_on_single() {
        let doc: Document =
            serde_json::from_value(json!({"data": {"type": "widget", "id": "1"}})).unwrap();
        let config = Config {
            preserve_json: true,
            ..Default::default()
        };
        let data = normalize_document(&doc, &config);
        let record = data.single().unwrap();
        assert_eq!(
            record.tag.json,
            Some(json!({"data": {"type": "widget", "id": "1"}}))
        );
    }

    #[test]
    fn parse_document_rejects_garbage() {
        assert!(matches!(
            parse_document(json!({"data": 42})),
            Err(Error::Document(_))
        ));
    }

    #[test]
    fn clean_patch_drops_unchanged_attributes() {
        let mut store = Store::new();
        let record = normalize_resource(widget_resource(), Provenance::Primary);
        store.replace_records(vec![record.clone()]);

        let mut patch = record.clone();
        patch.attrs.insert("color".into(), json!("red"));

        let cleaned = clean_patch(&patch, Some(&store), &[]);
        assert_eq!(cleaned.attr("color"), Some(&json!("red")));
        assert!(cleaned.attr("name").is_none());
        assert!(cleaned.tag.links.is_none());
        assert!(cleaned.tag.relationships.is_none());
    }

    #[test]
    fn clean_patch_keeps_named_props() {
        let record = normalize_resource(widget_resource(), Provenance::Primary);
        let cleaned = clean_patch(&record, None, &["relationships".to_string()]);

        assert!(cleaned.tag.relationships.is_some());
        assert!(cleaned.tag.links.is_none());
        // no stored copy: all attributes kept
        assert_eq!(cleaned.attrs.len(), 2);
    }

    #[test]
    fn empty_relationship_data_survives_roundtrip() {
        let mut rels = Relationships::new();
        rels.insert(
            "widgets",
            Relationship {
                data: Some(RelData::Empty {}),
                ..Default::default()
            },
        );
        let mut resource = Resource::new("widget", Some("1".into()));
        resource.relationships = Some(rels);

        let record = normalize_resource(resource.clone(), Provenance::Primary);
        let back = denormalize(&record);
        assert_eq!(back, resource);
        assert_eq!(
            serde_json::to_value(&back).unwrap()["relationships"]["widgets"]["data"],
            json!({})
        );
    }
}
