//! Error types returned by [`Request::send`](crate::Request::send).
//!
//! # Design
//! Every variant carries enough context to be logged on its own: status
//! failures name the status, method, URL and the full response text, decode
//! failures name the target type and a short preview of what came back.
//! Builder misuse (a path segment with a leading `/`) is not represented
//! here because it panics at the call site.

use std::fmt;

use crate::transport::TransportError;

/// Errors returned by `Request::send`.
#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be serialized to JSON. Nothing was sent.
    SerializationError(String),

    /// `base_url + path` is not a valid absolute URL. Nothing was sent.
    InvalidUrl { url: String, reason: String },

    /// The transport failed before a response arrived.
    Transport(TransportError),

    /// The server answered with a status outside the accepted set.
    HttpError {
        status: u16,
        method: String,
        url: String,
        body: String,
    },

    /// The status was not accepted and its body could not be read either.
    BodyReadError { status: u16, reason: String },

    /// The response body could not be decoded into the target.
    DeserializationError {
        reason: String,
        preview: String,
        target_type: &'static str,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::SerializationError(msg) => {
                write!(f, "serialization failed: {msg}")
            }
            ApiError::InvalidUrl { url, reason } => {
                write!(f, "invalid url {url}: {reason}")
            }
            ApiError::Transport(err) => write!(f, "transport error: {err}"),
            ApiError::HttpError {
                status,
                method,
                url,
                body,
            } => {
                write!(f, "response status {status} for request {method} {url}: {body}")
            }
            ApiError::BodyReadError { status, reason } => {
                write!(f, "response status {status}, failed to read body: {reason}")
            }
            ApiError::DeserializationError {
                reason,
                preview,
                target_type,
            } => {
                write!(
                    f,
                    "could not parse response as json: {reason} ({preview}) into {target_type}"
                )
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
