//! Structured request/response debug records.
//!
//! A client with a debug id emits one JSON line per successful `send`:
//!
//! ```json
//! {"service":"billing","http":{"request":{"method":"GET","url":"...","body":null,"headers":{}},
//!  "response":{"status":200,"body":{},"headers":{}}}}
//! ```
//!
//! Lines go to the client's `DebugSink`. The default sink forwards them to
//! the `log` facade, so nothing is printed unless the process installs a
//! logger.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Receiver for debug lines.
pub trait DebugSink: Send + Sync {
    fn record(&self, line: &str);
}

/// Forwards debug lines to `log::info!` under the `endpoint_core::debug`
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DebugSink for LogSink {
    fn record(&self, line: &str) {
        log::info!(target: "endpoint_core::debug", "{line}");
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DebugRecord<'a> {
    pub service: &'a str,
    pub http: HttpLog<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct HttpLog<'a> {
    pub request: RequestLog<'a>,
    pub response: ResponseLog,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestLog<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub body: Option<&'a Value>,
    pub headers: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResponseLog {
    pub status: u16,
    pub body: Option<Value>,
    pub headers: BTreeMap<String, Vec<String>>,
}

/// Groups repeated header names the way they appear on the wire.
pub(crate) fn header_map(headers: &[(String, String)]) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        map.entry(name.clone()).or_default().push(value.clone());
    }
    map
}

/// Serializes `record` and hands it to `sink`. Failures are only logged.
pub(crate) fn emit(sink: &dyn DebugSink, record: &DebugRecord<'_>) {
    match serde_json::to_string(record) {
        Ok(line) => sink.record(&line),
        Err(err) => log::warn!("failed to log request: {err}"),
    }
}
