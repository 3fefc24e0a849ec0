//! Fluent description of one HTTP call and its execution.
//!
//! # Design
//! A `Request` is created by a [`Client`] verb factory, configured through
//! consuming builder calls and executed once by [`Request::send`], which
//! consumes it. Builder calls never fail: a body that cannot be serialized
//! is reported by `send` before anything goes on the wire, and a malformed
//! path segment panics immediately because it is a bug in the caller.
//!
//! `send` returns the received status on success. Only statuses in the
//! accepted set (`{200}` unless extended with [`Request::accept`]) count as
//! success. When a target is set the JSON body is decoded into it, except
//! for `404`, which leaves the target untouched.

use std::any;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::client::Client;
use crate::debug::{self, header_map, DebugRecord, HttpLog, RequestLog, ResponseLog};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

const JSON: &str = "application/json";
const NOT_FOUND: u16 = 404;
/// Characters of an undecodable body quoted in the error.
const PREVIEW_CHARS: usize = 100;

/// Anything a response body can be decoded into.
trait Target {
    fn decode(&mut self, bytes: &[u8]) -> Result<(), serde_json::Error>;
    fn type_name(&self) -> &'static str;
}

impl<T: DeserializeOwned> Target for T {
    fn decode(&mut self, bytes: &[u8]) -> Result<(), serde_json::Error> {
        *self = serde_json::from_slice(bytes)?;
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        any::type_name::<T>()
    }
}

/// One configurable, single-use HTTP call.
#[must_use = "a request does nothing until `send` is called"]
pub struct Request<'a> {
    client: &'a Client,
    method: HttpMethod,
    path: String,
    query: BTreeMap<String, Vec<String>>,
    headers: BTreeMap<String, String>,
    basic_auth_user: String,
    basic_auth_password: String,
    body: Option<Result<Value, serde_json::Error>>,
    accepted: BTreeSet<u16>,
    target: Option<&'a mut dyn Target>,
}

impl<'a> Request<'a> {
    pub(crate) fn new(client: &'a Client, method: HttpMethod) -> Self {
        Self {
            client,
            method,
            path: String::new(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            basic_auth_user: String::new(),
            basic_auth_password: String::new(),
            body: None,
            accepted: BTreeSet::from([200]),
            target: None,
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = HttpMethod::from(method.into());
        self
    }

    /// Sets the path to `/` followed by `segments` joined with `/`.
    /// An empty list leaves the current path alone.
    ///
    /// Segments are sent as URL path segments: characters outside the path
    /// set are percent-encoded and `.`/`..` segments are resolved, so
    /// `["a", "..", "b"]` reaches the server as `/b`.
    ///
    /// # Panics
    /// If any segment starts with `/`.
    pub fn path<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut path = String::new();
        for segment in segments {
            let segment = segment.as_ref();
            assert!(
                !segment.starts_with('/'),
                "path segment {segment:?} must not start with '/'"
            );
            path.push('/');
            path.push_str(segment);
        }
        if !path.is_empty() {
            self.path = path;
        }
        self
    }

    /// Adds a query parameter. Repeating a name adds another value.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Sets a header, replacing an earlier value for the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn authorization(self, value: impl Into<String>) -> Self {
        self.header("Authorization", value)
    }

    /// JSON body sent with the request.
    pub fn body<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.body = Some(serde_json::to_value(body));
        self
    }

    /// Adds `status` to the accepted set.
    pub fn accept(mut self, status: u16) -> Self {
        self.accepted.insert(status);
        self
    }

    /// Basic credentials, sent only when both parts are non-empty.
    pub fn basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth_user = user.into();
        self.basic_auth_password = password.into();
        self
    }

    /// Value that receives the decoded response body.
    pub fn target<T: DeserializeOwned + 'a>(mut self, target: &'a mut T) -> Self {
        self.target = Some(target);
        self
    }

    /// Executes the request and returns the received status.
    pub fn send(mut self) -> Result<u16, ApiError> {
        let body = self
            .body
            .take()
            .transpose()
            .map_err(|err| ApiError::SerializationError(err.to_string()))?;
        let url = self.url();
        let request = self.build_request(&url, body.as_ref())?;
        let request_headers = self
            .client
            .debug_id()
            .map(|_| header_map(&request.headers));

        log::debug!("sending {} {}", request.method, request.url);
        let HttpResponse {
            status,
            headers,
            body: mut response_body,
        } = self
            .client
            .transport()
            .send(request)
            .map_err(ApiError::Transport)?;
        log::debug!("{} {} answered {status}", self.method, url);

        if !self.accepted.contains(&status) {
            return Err(self.unexpected_status(status, url, &mut response_body));
        }

        let decoded = self.read_to_target(status, &mut response_body)?;

        if let (Some(service), Some(request_headers)) = (self.client.debug_id(), request_headers) {
            let record = DebugRecord {
                service,
                http: HttpLog {
                    request: RequestLog {
                        method: self.method.as_str(),
                        url: &url,
                        body: body.as_ref(),
                        headers: request_headers,
                    },
                    response: ResponseLog {
                        status,
                        body: decoded,
                        headers: header_map(&headers),
                    },
                },
            };
            debug::emit(self.client.debug_sink(), &record);
        }

        Ok(status)
    }

    /// `base_url + path`, without doubling the `/` between them.
    fn url(&self) -> String {
        let base_url = self.client.base_url();
        if self.path.is_empty() {
            base_url.to_string()
        } else {
            format!("{}{}", base_url.trim_end_matches('/'), self.path)
        }
    }

    fn build_request(&self, url: &str, body: Option<&Value>) -> Result<HttpRequest, ApiError> {
        let mut full_url = Url::parse(url).map_err(|err| ApiError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        full_url.set_query(None);
        if !self.query.is_empty() {
            let mut pairs = full_url.query_pairs_mut();
            for (name, values) in &self.query {
                for value in values {
                    pairs.append_pair(name, value);
                }
            }
        }

        let mut headers = Vec::new();
        if !self.basic_auth_user.is_empty() && !self.basic_auth_password.is_empty() {
            let credentials =
                STANDARD.encode(format!("{}:{}", self.basic_auth_user, self.basic_auth_password));
            headers.push(("Authorization".to_string(), format!("Basic {credentials}")));
        }
        headers.extend(
            self.headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        if self.target.is_some() {
            headers.push(("Accept".to_string(), JSON.to_string()));
        }
        if body.is_some() {
            headers.push(("Content-Type".to_string(), JSON.to_string()));
        }

        Ok(HttpRequest {
            method: self.method.clone(),
            url: full_url.into(),
            headers,
            body: body.map(Value::to_string),
        })
    }

    fn unexpected_status(&self, status: u16, url: String, body: &mut dyn Read) -> ApiError {
        let mut bytes = Vec::new();
        if let Err(err) = body.read_to_end(&mut bytes) {
            return ApiError::BodyReadError {
                status,
                reason: err.to_string(),
            };
        }
        ApiError::HttpError {
            status,
            method: self.method.to_string(),
            url,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Decodes the body into the target, if any. Returns the body as a
    /// generic JSON value when debug records are enabled.
    fn read_to_target(
        &mut self,
        status: u16,
        body: &mut dyn Read,
    ) -> Result<Option<Value>, ApiError> {
        let debugging = self.client.debug_id().is_some();
        let Some(target) = self.target.as_mut() else {
            return Ok(None);
        };
        if status == NOT_FOUND {
            return Ok(None);
        }

        let mut bytes = Vec::new();
        body.read_to_end(&mut bytes)
            .map_err(|err| ApiError::Transport(Box::new(err)))?;

        let target_type = target.type_name();
        target
            .decode(&bytes)
            .map_err(|err| ApiError::DeserializationError {
                reason: err.to_string(),
                preview: preview(&bytes),
                target_type,
            })?;

        Ok(if debugging {
            serde_json::from_slice(&bytes).ok()
        } else {
            None
        })
    }
}

fn preview(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
