// # HTTP Transport Trait
//
// Couriers never talk to the network directly. Each outbound call is
// described as an [`HttpRequest`] and handed to an [`HttpTransport`]:
//
// - Production: `parcel-transport-http` (reqwest)
// - Tests: `parcel_core::testing::CannedTransport`
//
// ## Usage
//
// ```rust,ignore
// use parcel_core::traits::{HttpRequest, check_http};
//
// let request = HttpRequest::get("http://example.com/track")
//     .query("id", "RR123456789HK")
//     .no_redirects();
//
// let body = check_http(transport.get(&request).await)?;
// ```

use crate::error::{Error, Result};
use async_trait::async_trait;

/// The only status code treated as success
pub const HTTP_OK: u16 = 200;

/// Description of one outbound GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Endpoint URL without query string
    pub url: String,
    /// Query parameters, in insertion order
    pub query: Vec<(String, String)>,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    /// Whether 3xx responses are followed
    pub follow_redirects: bool,
}

impl HttpRequest {
    /// Start a GET request that follows redirects
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            follow_redirects: true,
        }
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a request header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Surface 3xx responses as-is instead of following them
    pub fn no_redirects(mut self) -> Self {
        self.follow_redirects = false;
        self
    }

    /// Look up a query parameter by name
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a header by name (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response handed back by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Trait for outbound HTTP implementations
///
/// # Contract
///
/// - Connection-level failures (DNS, refused, timeout) return
///   `Err(Error::Server { .. })`.
/// - Any HTTP status, including 3xx when redirects are disabled, returns
///   `Ok(HttpResponse)`; classifying it is [`check_http`]'s job.
/// - No retries. One call, one request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Shared transport check applied by every courier before parsing
///
/// A connection error or any status other than 200 becomes a generic
/// [`Error::Server`]. On success the body is returned.
pub fn check_http(outcome: Result<HttpResponse>) -> Result<String> {
    match outcome {
        Ok(response) if response.status == HTTP_OK => Ok(response.body),
        Ok(response) => {
            tracing::warn!("Unexpected HTTP status: {}", response.status);
            Err(Error::server(format!(
                "unexpected HTTP status {}",
                response.status
            )))
        }
        Err(Error::Server { cause }) => {
            tracing::warn!("HTTP request failed: {}", cause);
            Err(Error::Server { cause })
        }
        Err(other) => {
            tracing::warn!("HTTP request failed: {}", other);
            Err(Error::server(other.to_string()))
        }
    }
}
