//! Connection-level configuration and the request factory.
//!
//! # Design
//! `Client` holds the base URL, the transport and the debug settings, and
//! never performs I/O itself. Every verb factory returns a fresh `Request`
//! borrowing the client, so all requests share one transport. Cloning a
//! client is cheap and keeps sharing that transport.

use std::fmt;
use std::sync::Arc;

use crate::debug::{DebugSink, LogSink};
use crate::http::HttpMethod;
use crate::request::Request;
use crate::transport::{Transport, UreqTransport};

/// Factory for requests against one base URL.
///
/// Concurrent `send` calls through one client are as safe as its transport;
/// the default `UreqTransport` may be shared across threads.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    transport: Arc<dyn Transport>,
    debug_id: Option<String>,
    debug_sink: Arc<dyn DebugSink>,
}

impl Client {
    /// Client using the default `ureq` transport.
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, UreqTransport::new())
    }

    /// Client sending every request through `transport`.
    ///
    /// `base_url` is kept as given. A trailing `/` is dropped only when a
    /// request appends a path, so `http://h/api/` plus `users` goes to
    /// `http://h/api/users` and a request without a path goes to
    /// `http://h/api/`.
    pub fn with_transport(base_url: &str, transport: impl Transport + 'static) -> Self {
        Self {
            base_url: base_url.to_string(),
            transport: Arc::new(transport),
            debug_id: None,
            debug_sink: Arc::new(LogSink),
        }
    }

    /// Replaces the sink that receives debug lines.
    pub fn with_debug_sink(mut self, sink: impl DebugSink + 'static) -> Self {
        self.debug_sink = Arc::new(sink);
        self
    }

    /// Enables debug records for every request sent from now on, tagged with
    /// `id`. An empty id disables them again.
    pub fn debug(&mut self, id: &str) {
        self.debug_id = (!id.is_empty()).then(|| id.to_string());
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn debug_id(&self) -> Option<&str> {
        self.debug_id.as_deref()
    }

    pub fn get(&self) -> Request<'_> {
        self.request(HttpMethod::Get)
    }

    pub fn post(&self) -> Request<'_> {
        self.request(HttpMethod::Post)
    }

    pub fn put(&self) -> Request<'_> {
        self.request(HttpMethod::Put)
    }

    pub fn delete(&self) -> Request<'_> {
        self.request(HttpMethod::Delete)
    }

    /// Request with an arbitrary verb, standard or not.
    pub fn method(&self, method: impl Into<String>) -> Request<'_> {
        self.request(HttpMethod::from(method.into()))
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub(crate) fn debug_sink(&self) -> &dyn DebugSink {
        self.debug_sink.as_ref()
    }

    fn request(&self, method: HttpMethod) -> Request<'_> {
        Request::new(self, method)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("debug_id", &self.debug_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubTransport;

    #[test]
    fn verb_factories_set_method() {
        let stub = StubTransport::new();
        let c = Client::with_transport("http://api.test", stub.clone());
        c.get().send().unwrap();
        c.post().send().unwrap();
        c.put().send().unwrap();
        c.delete().send().unwrap();

        let methods: Vec<HttpMethod> = stub.requests().into_iter().map(|r| r.method).collect();
        assert_eq!(
            methods,
            vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete]
        );
    }

    #[test]
    fn method_accepts_non_standard_verbs() {
        let stub = StubTransport::new();
        let c = Client::with_transport("http://api.test", stub.clone());
        c.method("PURGE").send().unwrap();
        c.method("PUT").send().unwrap();

        let requests = stub.requests();
        assert_eq!(requests[0].method, HttpMethod::Other("PURGE".to_string()));
        assert_eq!(requests[1].method, HttpMethod::Put);
    }

    #[test]
    fn base_url_is_kept_verbatim() {
        let c = Client::with_transport("http://api.test/", StubTransport::new());
        assert_eq!(c.base_url(), "http://api.test/");
    }

    #[test]
    fn trailing_slash_is_dropped_only_when_a_path_follows() {
        let stub = StubTransport::new();
        let c = Client::with_transport("http://api.test/echo/", stub.clone());
        c.get().send().unwrap();
        c.get().path(["users"]).send().unwrap();

        let urls: Vec<String> = stub.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec!["http://api.test/echo/", "http://api.test/echo/users"]
        );
    }

    #[test]
    fn debug_is_off_until_enabled() {
        let mut c = Client::with_transport("http://api.test", StubTransport::new());
        assert_eq!(c.debug_id(), None);
        c.debug("users-service");
        assert_eq!(c.debug_id(), Some("users-service"));
        c.debug("");
        assert_eq!(c.debug_id(), None);
    }

    #[test]
    fn clones_share_the_transport() {
        let stub = StubTransport::new();
        let c = Client::with_transport("http://api.test", stub.clone());
        let copy = c.clone();
        c.get().send().unwrap();
        copy.get().send().unwrap();
        assert_eq!(stub.requests().len(), 2);
    }
}
