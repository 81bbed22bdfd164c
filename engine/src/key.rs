//! Record key resolution.
//!
//! Operations accept several input shapes: a slash-delimited path string, a
//! normalized record, or a bare `{type, id}` reference. The shape is decided
//! once, at the entry boundary, by converting into a [`Target`]; everything
//! downstream works with the tagged form.

use crate::document::ResourceIdent;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::{RecordId, TypeName};

/// The canonical, tagged form of an operation target.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A path like `"widget"`, `"widget/1"` or `"/widget/1"`.
    Path(String),
    /// A normalized record; identity is taken from its tag.
    Record(Record),
    /// A bare type/id reference.
    Ident(ResourceIdent),
}

impl Target {
    /// Resolve to `(type, maybe id)`. Fails with
    /// [`Error::MissingIdentifier`] when no type can be determined.
    pub fn key(&self) -> Result<(TypeName, Option<RecordId>)> {
        let (ty, id) = self.raw_key();
        match ty {
            Some(ty) if !ty.is_empty() => Ok((ty, id.filter(|id| !id.is_empty()))),
            ty => Err(Error::MissingIdentifier { ty, id }),
        }
    }

    /// Resolve to `(type, id)`, failing with
    /// [`Error::MissingIdentifier`] when either part is missing.
    pub fn key_required(&self) -> Result<(TypeName, RecordId)> {
        match self.key()? {
            (ty, Some(id)) => Ok((ty, id)),
            (ty, None) => Err(Error::MissingIdentifier {
                ty: Some(ty),
                id: None,
            }),
        }
    }

    /// The record carried by this target, if any.
    pub fn record(&self) -> Option<&Record> {
        match self {
            Target::Record(record) => Some(record),
            _ => None,
        }
    }

    fn raw_key(&self) -> (Option<TypeName>, Option<RecordId>) {
        match self {
            Target::Path(path) => {
                // Leading slash is incorrect syntax, but tolerated.
                let mut segments = path
                    .trim_start_matches('/')
                    .split('/')
                    .filter(|s| !s.is_empty());
                (
                    segments.next().map(str::to_owned),
                    segments.next().map(str::to_owned),
                )
            }
            Target::Record(record) => {
                let ty = if record.tag.ty.is_empty() {
                    None
                } else {
                    Some(record.tag.ty.clone())
                };
                (ty, record.tag.id.clone())
            }
            Target::Ident(ident) => (Some(ident.ty.clone()), Some(ident.id.clone())),
        }
    }
}

impl From<&str> for Target {
    fn from(path: &str) -> Self {
        Target::Path(path.to_string())
    }
}

impl From<String> for Target {
    fn from(path: String) -> Self {
        Target::Path(path)
    }
}

impl From<Record> for Target {
    fn from(record: Record) -> Self {
        Target::Record(record)
    }
}

impl From<&Record> for Target {
    fn from(record: &Record) -> Self {
        Target::Record(record.clone())
    }
}

impl From<ResourceIdent> for Target {
    fn from(ident: ResourceIdent) -> Self {
        Target::Ident(ident)
    }
}

impl From<(&str, &str)> for Target {
    fn from((ty, id): (&str, &str)) -> Self {
        Target::Ident(ResourceIdent::new(ty, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordTag;

    #[test]
    fn path_type_only() {
        let target = Target::from("widget");
        assert_eq!(target.key().unwrap(), ("widget".to_string(), None));
    }

    #[test]
    fn path_type_and_id() {
        let target = Target::from("widget/1");
        assert_eq!(
            target.key_required().unwrap(),
            ("widget".to_string(), "1".to_string())
        );
    }

    #[test]
    fn path_leading_slash() {
        let target = Target::from("/widget/1");
        assert_eq!(
            target.key_required().unwrap(),
            ("widget".to_string(), "1".to_string())
        );
    }

    #[test]
    fn record_key() {
        let mut tag = RecordTag::new("widget");
        tag.id = Some("1".into());
        let target = Target::from(Record::new(tag));
        assert_eq!(
            target.key_required().unwrap(),
            ("widget".to_string(), "1".to_string())
        );
    }

    #[test]
    fn record_without_id() {
        let target = Target::from(Record::new(RecordTag::new("widget")));
        assert_eq!(target.key().unwrap(), ("widget".to_string(), None));
        assert!(matches!(
            target.key_required(),
            Err(Error::MissingIdentifier { .. })
        ));
    }

    #[test]
    fn empty_tag_is_missing() {
        let target = Target::from(Record::new(RecordTag::default()));
        assert!(matches!(
            target.key(),
            Err(Error::MissingIdentifier { ty: None, id: None })
        ));
    }

    #[test]
    fn ident_key() {
        let target = Target::from(("widget", "1"));
        assert_eq!(
            target.key_required().unwrap(),
            ("widget".to_string(), "1".to_string())
        );
    }
}
