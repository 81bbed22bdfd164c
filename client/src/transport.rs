//! Network transport abstraction.
//!
//! The orchestrator talks to the server through this trait so tests can
//! script responses and record call history without a real HTTP stack.
//! The only contract: 2xx resolves with the decoded body, everything else
//! rejects with the status attached.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// A transport-level response: HTTP status plus the decoded JSON body,
/// if the server sent one.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub data: Option<Value>,
}

impl Response {
    pub fn new(status: u16, data: Option<Value>) -> Self {
        Self { status, data }
    }

    /// An empty 2xx response (e.g. 204 No Content).
    pub fn no_content() -> Self {
        Self::new(204, None)
    }
}

/// A failure surfaced by the network collaborator: a non-2xx status or a
/// connection-level error (`status: None`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport error (status {status:?}): {message}")]
pub struct TransportError {
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

pub type TransportResult = std::result::Result<Response, TransportError>;

/// An HTTP client surface reduced to the four verbs the actions need.
///
/// Implementations never retry and never cache; sequencing and store
/// mutation policy belong to the orchestrator.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)]) -> TransportResult;
    async fn post(&self, path: &str, body: &Value) -> TransportResult;
    async fn patch(&self, path: &str, body: &Value) -> TransportResult;
    async fn delete(&self, path: &str, body: Option<&Value>) -> TransportResult;
}
