//! Test doubles for courier tests
//!
//! Enabled with the `testing` feature. Courier crates pull it in as a
//! dev-dependency to replay carrier responses without a network.

use crate::error::{Error, Result};
use crate::traits::{HttpRequest, HttpResponse, HttpTransport};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A transport that replays queued responses in order
///
/// Every request is recorded. When the queue runs dry the transport
/// reports a connection failure.
#[derive(Default)]
pub struct CannedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
    call_count: AtomicUsize,
}

impl CannedTransport {
    /// Create a transport with nothing queued
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with `status` and `body`
    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Ok(HttpResponse::new(status, body)));
        self
    }

    /// Queue a connection-level failure
    pub fn fail(self, cause: impl Into<String>) -> Self {
        self.push(Err(Error::server(cause)));
        self
    }

    /// Number of requests issued so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Snapshot of every request issued so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn push(&self, outcome: Result<HttpResponse>) {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(outcome);
    }
}

#[async_trait::async_trait]
impl HttpTransport for CannedTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(Error::server("no canned response left")))
    }
}
