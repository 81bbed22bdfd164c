//! Error types for the normalization engine.

use crate::{RecordId, TypeName};
use thiserror::Error;

/// All possible errors from the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// An operation needed a resource type (and usually an id) but the
    /// input did not carry one. Raised before any I/O is attempted.
    #[error("no type/id specified (type: {ty:?}, id: {id:?})")]
    MissingIdentifier {
        ty: Option<TypeName>,
        id: Option<RecordId>,
    },

    /// A relationship-scoped operation targeted a record that declares
    /// no relationships.
    #[error("no relationships specified for {ty}/{id}")]
    MissingRelationships { ty: TypeName, id: RecordId },

    /// A wire payload could not be interpreted as a document.
    #[error("malformed document: {0}")]
    Document(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::MissingIdentifier {
            ty: Some("widget".into()),
            id: None,
        };
        assert_eq!(
            err.to_string(),
            "no type/id specified (type: Some(\"widget\"), id: None)"
        );

        let err = Error::MissingRelationships {
            ty: "widget".into(),
            id: "1".into(),
        };
        assert_eq!(err.to_string(), "no relationships specified for widget/1");
    }
}
