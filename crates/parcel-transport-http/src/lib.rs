// # HTTP Transport
//
// reqwest-backed implementation of `parcel_core::HttpTransport`.
//
// ## Behavior
//
// - One GET per call, no retries
// - Per-request timeout from `TransportConfig` (default 30 seconds)
// - Redirect policy chosen per request: couriers that treat a redirect as
//   "not found" ask for `no_redirects()` and see the raw 3xx status
// - Connection-level failures become `Error::Server`; every HTTP status is
//   handed back untouched for `check_http` to classify

use async_trait::async_trait;
use parcel_core::config::TransportConfig;
use parcel_core::traits::{HttpRequest, HttpResponse, HttpTransport};
use parcel_core::{Error, Result};
use std::time::Duration;

/// HTTP transport for carrier endpoints
///
/// reqwest fixes the redirect policy per client, so two clients are kept:
/// one that follows redirects and one that never does.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// Follows up to 10 redirects
    client: reqwest::Client,
    /// Never follows redirects
    no_redirect_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(ReqwestTransport)`: Ready transport
    /// - `Err(Error::Config)`: Invalid settings or TLS backend failure
    pub fn new(config: &TransportConfig) -> Result<Self> {
        config.validate()?;

        let timeout = Duration::from_secs(config.timeout_secs);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let no_redirect_client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            no_redirect_client,
        })
    }

    fn client_for(&self, request: &HttpRequest) -> &reqwest::Client {
        if request.follow_redirects {
            &self.client
        } else {
            &self.no_redirect_client
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(
            "Http Request: {} (redirects: {})",
            request.url,
            if request.follow_redirects { "follow" } else { "off" }
        );

        let mut builder = self.client_for(request).get(&request.url).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::server(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::server(format!("Failed to read response: {}", e)))?;

        tracing::debug!("Http Response: {} ({} bytes)", status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request text
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (format!("http://{}/track", addr), handle)
    }

    fn transport() -> ReqwestTransport {
        ReqwestTransport::new(&TransportConfig::default().with_timeout_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn sends_query_and_headers() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
        )
        .await;

        let request = HttpRequest::get(url)
            .query("searchCriteria", "deliveryReference=1550 21234")
            .header("cookie", "tracking=session-1");
        let response = transport().get(&request).await.unwrap();

        assert_eq!(response, HttpResponse::new(200, "ok"));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("GET /track?searchCriteria=deliveryReference%3D1550+21234 "));
        assert!(raw.to_lowercase().contains("cookie: tracking=session-1"));
    }

    #[tokio::test]
    async fn redirects_are_surfaced_when_disabled() {
        let (url, server) = serve_once(
            "HTTP/1.1 302 Found\r\nLocation: /enquiry\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let request = HttpRequest::get(url).no_redirects();
        let response = transport().get(&request).await.unwrap();

        assert_eq!(response.status, 302);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn connection_failure_is_server_error() {
        // Bind then drop to get a port nobody is listening on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = HttpRequest::get(format!("http://{}/", addr));
        let err = transport().get(&request).await.unwrap_err();
        assert!(matches!(err, Error::Server { .. }));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = TransportConfig::default().with_timeout_secs(0);
        assert!(matches!(ReqwestTransport::new(&config), Err(Error::Config(_))));
    }
}
