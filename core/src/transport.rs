//! The network boundary of the client.
//!
//! # Design
//! The executor never touches sockets. It hands a fully built `HttpRequest`
//! to a `Transport` and gets back a status, headers and a body reader. The
//! default implementation drives a `ureq` agent; tests and embedders can
//! plug in their own.
//!
//! A transport shared by one `Client` is used by every request the client
//! creates, possibly from several threads at once. Implementations must be
//! safe for that; this crate adds no locking of its own.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use crate::http::{HttpRequest, HttpResponse};

/// Any failure raised while sending a request or receiving its head.
pub type TransportError = Box<dyn Error + Send + Sync>;

/// Sends one request and returns the raw response.
///
/// Non-2xx statuses are responses, not errors: only failures to complete the
/// exchange (connection refused, DNS, timeouts, ...) return `Err`.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// Default transport backed by a `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Agent with a global deadline covering the whole exchange.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(timeout))
    }

    /// Wraps a caller-configured agent.
    ///
    /// The agent should be built with `http_status_as_error(false)`, otherwise
    /// 4xx/5xx responses surface as transport errors instead of reaching the
    /// accepted-status check.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }

    fn build(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self::with_agent(agent)
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = match request.body {
            Some(body) => self.agent.run(builder.body(body.into_bytes())?)?,
            None => self.agent.run(builder.body(())?)?,
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Ok(HttpResponse {
            status,
            headers,
            body: Box::new(response.into_body().into_reader()),
        })
    }
}
