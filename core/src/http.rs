//! HTTP request and response types exchanged with a [`Transport`].
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! executor builds an `HttpRequest` and interprets an `HttpResponse`; the
//! transport only moves bytes. Fields use owned types so a request can be
//! recorded, logged or handed to another thread without lifetime concerns.
//!
//! The response body is the one exception: it stays a reader so the executor
//! decides whether the body is read at all. Dropping the response releases
//! the underlying stream.
//!
//! [`Transport`]: crate::transport::Transport

use std::fmt;
use std::io::Read;

/// HTTP method for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    /// Any other verb, sent verbatim (`PATCH`, `PROPFIND`, ...).
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Other(method) => method,
        }
    }
}

impl From<&str> for HttpMethod {
    fn from(method: &str) -> Self {
        match method {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            other => HttpMethod::Other(other.to_string()),
        }
    }
}

impl From<String> for HttpMethod {
    fn from(method: String) -> Self {
        match method.as_str() {
            "GET" | "POST" | "PUT" | "DELETE" => HttpMethod::from(method.as_str()),
            _ => HttpMethod::Other(method),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute and already carries the encoded query string. Headers
/// keep insertion order and may repeat a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response as returned by a transport.
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Box<dyn Read>,
}

impl HttpResponse {
    /// First value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
