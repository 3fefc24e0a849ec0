use std::collections::VecDeque;
use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, TransportError};

enum Reply {
    Response {
        status: u16,
        headers: Vec<(String, String)>,
        body: Box<dyn Read + Send>,
    },
    Failure(io::ErrorKind, String),
}

/// Records every request and answers from a queue of canned replies.
/// An empty queue answers `200` with an empty body.
pub(crate) struct StubTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.respond_with_headers(status, Vec::new(), body);
    }

    pub fn respond_with_headers(&self, status: u16, headers: Vec<(&str, &str)>, body: &str) {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        self.push(Reply::Response {
            status,
            headers,
            body: Box::new(Cursor::new(body.as_bytes().to_vec())),
        });
    }

    pub fn respond_with_reader(&self, status: u16, body: impl Read + Send + 'static) {
        self.push(Reply::Response {
            status,
            headers: Vec::new(),
            body: Box::new(body),
        });
    }

    pub fn fail(&self, kind: io::ErrorKind, message: &str) {
        self.push(Reply::Failure(kind, message.to_string()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

impl Transport for StubTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Response {
                status,
                headers,
                body,
            }) => Ok(HttpResponse {
                status,
                headers,
                body,
            }),
            Some(Reply::Failure(kind, message)) => Err(io::Error::new(kind, message).into()),
            None => Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: Box::new(io::empty()),
            }),
        }
    }
}

/// Body reader that flags when it is dropped.
pub(crate) struct TrackedBody {
    inner: Cursor<Vec<u8>>,
    dropped: Arc<AtomicBool>,
}

impl TrackedBody {
    pub fn new(body: &str) -> (Self, Arc<AtomicBool>) {
        let dropped = Arc::new(AtomicBool::new(false));
        let body = Self {
            inner: Cursor::new(body.as_bytes().to_vec()),
            dropped: dropped.clone(),
        };
        (body, dropped)
    }

    pub fn was_dropped(flag: &AtomicBool) -> bool {
        flag.load(Ordering::SeqCst)
    }
}

impl Read for TrackedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

/// Body reader that always fails.
pub(crate) struct BrokenBody;

impl Read for BrokenBody {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"))
    }
}
