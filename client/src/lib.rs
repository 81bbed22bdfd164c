//! # jsonapi-client
//!
//! An async, store-backed client for servers speaking the JSON:API wire
//! convention. Normalization, merging and relationship resolution come
//! from [`jsonapi_engine`]; this crate adds the network side: a
//! [`Transport`] abstraction with a reqwest implementation, and a
//! [`Client`] orchestrating CRUD and relationship-scoped actions against
//! an in-memory [`Store`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jsonapi_client::{Client, HttpTransport};
//! use std::sync::Arc;
//!
//! # async fn run() -> jsonapi_client::Result<()> {
//! let transport = Arc::new(HttpTransport::new("http://localhost:3000/api"));
//! let client = Client::new(transport);
//!
//! // Fetch, normalize and store a record, then read it back.
//! client.get("widget/1").await?;
//! let widget = client.record(("widget", "1"))?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod status;
pub mod transport;

pub use client::{Client, RequestOptions};
pub use error::{Error, Result};
pub use http::HttpTransport;
pub use status::StatusCounter;
pub use transport::{Response, Transport, TransportError, TransportResult};

// The engine's vocabulary types, re-exported so callers need only one
// crate in their dependency tree.
pub use jsonapi_engine::{Config, Data, Record, RecordTag, Store, Target};
