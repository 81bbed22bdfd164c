//! Typed model of the wire format.
//!
//! A wire document carries one resource, a sequence of resources, or no
//! primary data at all, plus optional side-loaded resources under
//! `included`. Every optional field round-trips losslessly: keys absent on
//! the wire stay absent on re-serialization.

use crate::{RecordId, TypeName};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// A bare `{type, id}` reference to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdent {
    #[serde(rename = "type")]
    pub ty: TypeName,
    pub id: RecordId,
}

impl ResourceIdent {
    pub fn new(ty: impl Into<TypeName>, id: impl Into<RecordId>) -> Self {
        Self {
            ty: ty.into(),
            id: id.into(),
        }
    }

    /// The `"type/id"` key used for cycle detection and request paths.
    pub fn path(&self) -> String {
        format!("{}/{}", self.ty, self.id)
    }
}

/// The `data` entry of a relationship declaration.
///
/// `Empty` is the literal `{}` form: "relationship present but unset". It
/// is distinct from an absent `data` key and never collapses to `null` or
/// an empty sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelData {
    Many(Vec<ResourceIdent>),
    One(ResourceIdent),
    Empty {},
}

impl RelData {
    /// All refs in declaration order, whatever the arity.
    pub fn idents(&self) -> Vec<&ResourceIdent> {
        match self {
            RelData::Many(list) => list.iter().collect(),
            RelData::One(ident) => vec![ident],
            RelData::Empty {} => Vec::new(),
        }
    }
}

/// A single relationship declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RelData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl Relationship {
    pub fn one(ty: impl Into<TypeName>, id: impl Into<RecordId>) -> Self {
        Self {
            data: Some(RelData::One(ResourceIdent::new(ty, id))),
            ..Default::default()
        }
    }

    pub fn many(idents: Vec<ResourceIdent>) -> Self {
        Self {
            data: Some(RelData::Many(idents)),
            ..Default::default()
        }
    }
}

/// Relationship declarations of a resource, in wire declaration order.
///
/// Relationship-scoped actions issue one call per entry, sequentially, in
/// declaration order, so the order a server (or caller) wrote them in must
/// survive deserialization. Serialized as a JSON object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relationships(Vec<(String, Relationship)>);

impl Relationships {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append (or overwrite) a named relationship, keeping first-insertion
    /// order for existing names.
    pub fn insert(&mut self, name: impl Into<String>, rel: Relationship) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = rel,
            None => self.0.push((name, rel)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Relationship> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Relationship)> {
        self.0.iter().map(|(n, r)| (n.as_str(), r))
    }

    /// Relationship names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Relationship)> for Relationships {
    fn from_iter<I: IntoIterator<Item = (String, Relationship)>>(iter: I) -> Self {
        let mut rels = Relationships::new();
        for (name, rel) in iter {
            rels.insert(name, rel);
        }
        rels
    }
}

impl Serialize for Relationships {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, rel) in &self.0 {
            map.serialize_entry(name, rel)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Relationships {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RelVisitor;

        impl<'de> Visitor<'de> for RelVisitor {
            type Value = Relationships;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of relationship declarations")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, rel)) = access.next_entry::<String, Relationship>()? {
                    entries.push((name, rel));
                }
                Ok(Relationships(entries))
            }
        }

        deserializer.deserialize_map(RelVisitor)
    }
}

/// A single typed, identified object as transmitted over the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub ty: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Relationships>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl Resource {
    pub fn new(ty: impl Into<TypeName>, id: Option<RecordId>) -> Self {
        Self {
            ty: ty.into(),
            id,
            attributes: None,
            relationships: None,
            links: None,
            meta: None,
        }
    }
}

/// Primary data of a document: one resource or an ordered sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Many(Vec<Resource>),
    One(Resource),
}

/// A complete wire document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PrimaryData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rel_data_shapes() {
        let one: RelData = serde_json::from_value(json!({"type": "widget", "id": "2"})).unwrap();
        assert_eq!(one, RelData::One(ResourceIdent::new("widget", "2")));

        let many: RelData = serde_json::from_value(json!([{"type": "widget", "id": "2"}])).unwrap();
        assert_eq!(many.idents().len(), 1);

        let empty: RelData = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, RelData::Empty {});
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({}));
    }

    #[test]
    fn relationships_preserve_declaration_order() {
        let value = json!({
            "widgets": {"data": {"type": "widget", "id": "2"}},
            "doohickeys": {"data": {"type": "doohickey", "id": "3"}},
        });
        let rels: Relationships = serde_json::from_value(value).unwrap();
        assert_eq!(rels.names(), vec!["widgets", "doohickeys"]);
    }

    #[test]
    fn relationships_insert_overwrites_in_place() {
        let mut rels = Relationships::new();
        rels.insert("widgets", Relationship::one("widget", "2"));
        rels.insert("doohickeys", Relationship::one("doohickey", "3"));
        rels.insert("widgets", Relationship::one("widget", "9"));

        assert_eq!(rels.names(), vec!["widgets", "doohickeys"]);
        assert_eq!(
            rels.get("widgets").unwrap().data,
            Some(RelData::One(ResourceIdent::new("widget", "9")))
        );
    }

    #[test]
    fn document_roundtrip() {
        let value = json!({
            "data": {
                "type": "widget",
                "id": "1",
                "attributes": {"name": "sprocket", "color": "black"},
                "relationships": {
                    "widgets": {
                        "data": {"type": "widget", "id": "2"},
                        "links": {"related": "/widget/1/widgets"},
                    }
                },
                "links": {"self": "/widget/1"},
            }
        });

        let doc: Document = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&doc).unwrap(), value);
    }

    #[test]
    fn document_without_data() {
        let doc: Document = serde_json::from_value(json!({"meta": {"count": 0}})).unwrap();
        assert!(doc.data.is_none());
        assert!(doc.included.is_empty());
    }

    #[test]
    fn data_null_is_absent() {
        let rel: Relationship = serde_json::from_value(json!({"data": null})).unwrap();
        assert_eq!(rel.data, None);
    }
}
