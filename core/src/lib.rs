//! Fluent JSON client for HTTP endpoints.
//!
//! # Overview
//! A [`Client`] holds a base URL and a [`Transport`]. Each verb factory
//! returns a [`Request`] that collects path segments, query parameters,
//! headers, credentials, a JSON body and the accepted statuses, then
//! [`Request::send`] performs the call and optionally decodes the JSON
//! response into a caller-owned target.
//!
//! ```no_run
//! use endpoint_core::Client;
//! use serde::Deserialize;
//!
//! #[derive(Default, Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! let client = Client::new("http://api.test");
//! let mut user = User::default();
//! let status = client
//!     .get()
//!     .path(["users", "42"])
//!     .accept(404)
//!     .target(&mut user)
//!     .send()?;
//! # Ok::<(), endpoint_core::ApiError>(())
//! ```
//!
//! # Design
//! - The core is synchronous and adds no locking. Sharing a client between
//!   threads is exactly as safe as its transport; the default
//!   [`UreqTransport`] is.
//! - Network I/O is isolated behind [`Transport`], so the executor can be
//!   tested against a stub.
//! - Debug records go to an injected [`DebugSink`] instead of a global
//!   logger.

pub mod client;
pub mod debug;
pub mod error;
pub mod http;
pub mod request;
pub mod transport;

#[cfg(test)]
mod stub;

pub use client::Client;
pub use debug::{DebugSink, LogSink};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::Request;
pub use transport::{Transport, TransportError, UreqTransport};
