//! Unified error handling for the client.

use crate::transport::TransportError;
use thiserror::Error;

/// All possible errors from client actions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Caller-side contract violation detected before any I/O.
    #[error(transparent)]
    Engine(#[from] jsonapi_engine::Error),

    /// Failure from the network collaborator, propagated unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Error {
    /// The HTTP status behind a transport failure, if there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport(err) => err.status,
            Error::Engine(_) => None,
        }
    }
}

/// Result type alias for client actions.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_passthrough() {
        let err = Error::from(TransportError::status(500, "boom"));
        assert_eq!(err.status(), Some(500));

        let err = Error::from(jsonapi_engine::Error::MissingIdentifier { ty: None, id: None });
        assert_eq!(err.status(), None);
    }
}
