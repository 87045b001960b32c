//! Canned-response transport for testing.

use crate::error::Result;
use crate::transport::{Response, Transport};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory [`Transport`] serving canned responses by exact URI.
///
/// Every requested URI is recorded, so tests can assert which requests were
/// (or weren't) made. Unknown URIs get a `404`. Routes can be replaced at any
/// time, which lets a test change what the remote reports between two sync
/// cycles.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Response>>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn with_response(self, uri: impl Into<String>, response: Response) -> Self {
        self.respond(uri, response);
        self
    }

    /// Serve `response` for `uri` from now on.
    pub fn respond(&self, uri: impl Into<String>, response: Response) {
        self.routes.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).insert(uri.into(), response);
    }

    /// Every URI requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    /// Forget the recorded requests, keeping the routes.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, uri: &str) -> Result<Response> {
        self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(uri.to_string());
        let routes = self.routes.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(routes.get(uri).cloned().unwrap_or_else(|| Response::status(404)))
    }
}
