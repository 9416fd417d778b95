//! HTTP client abstraction for talking to the AI service.
//!
//! This module provides a trait-based abstraction over HTTP clients, enabling
//! dependency injection and easy mocking in tests.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Status code and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for HTTP communication with the AI service.
///
/// Transport failures (refused connection, timeout) are returned as `Err`;
/// any response that arrives, whatever its status, is `Ok`.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use wurp::http_client::{HttpClient, ReqwestHttpClient};
///
/// let client = ReqwestHttpClient::new();
/// let response = client.get("http://localhost:5000/health", Duration::from_secs(5)).await?;
/// assert!(response.is_success());
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a GET request bounded by `timeout`.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `timeout` - Upper bound for the whole round trip
    ///
    /// # Returns
    ///
    /// The status code and body text of whatever response arrived.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be reached, the timeout expires,
    /// or the body cannot be read.
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse>;

    /// Sends a POST request with a JSON body bounded by `timeout`.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to send the request to
    /// * `headers` - Key-value pairs of headers to include
    /// * `body` - The JSON body to send
    /// * `timeout` - Upper bound for the whole round trip
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be read.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpResponse>;
}

/// HTTP client implementation using reqwest.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status().as_u16();
        Ok(HttpResponse::new(status, response.text().await?))
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpResponse> {
        let mut request = self.client.post(url).timeout(timeout);

        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let response = request.json(body).send().await?;
        let status = response.status().as_u16();
        Ok(HttpResponse::new(status, response.text().await?))
    }
}

/// Scripted HTTP double shared by the unit tests.
#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Mutex;

    /// One request as the mock received it.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub url: String,
        /// JSON body for POST requests.
        pub body: Option<serde_json::Value>,
        pub timeout: Duration,
    }

    /// Answers each request from the first route whose suffix matches the
    /// URL. Unmatched URLs fail like an unreachable host.
    #[derive(Default)]
    pub struct MockHttpClient {
        routes: Vec<(String, HttpResponse)>,
        requests: Mutex<Vec<RecordedCall>>,
    }

    impl MockHttpClient {
        pub fn unreachable() -> Self {
            Self::default()
        }

        pub fn with_route(mut self, suffix: &str, response: HttpResponse) -> Self {
            self.routes.push((suffix.to_string(), response));
            self
        }

        /// URLs requested so far, in order.
        pub fn calls(&self) -> Vec<String> {
            self.requests().into_iter().map(|call| call.url).collect()
        }

        pub fn requests(&self) -> Vec<RecordedCall> {
            self.requests.lock().unwrap().clone()
        }

        fn answer(&self, url: &str, body: Option<&serde_json::Value>, timeout: Duration) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(RecordedCall {
                url: url.to_string(),
                body: body.cloned(),
                timeout,
            });
            self.routes
                .iter()
                .find(|(suffix, _)| url.ends_with(suffix.as_str()))
                .map(|(_, response)| response.clone())
                .ok_or_else(|| anyhow!("connection refused: {}", url))
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
            self.answer(url, None, timeout)
        }

        async fn post_json(
            &self,
            url: &str,
            _headers: &[(&str, &str)],
            body: &serde_json::Value,
            timeout: Duration,
        ) -> Result<HttpResponse> {
            self.answer(url, Some(body), timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success_covers_2xx_only() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(503, "down").is_success());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = ReqwestHttpClient::new();
        // Port 9 (discard) on loopback is not expected to accept HTTP
        let result = client
            .get("http://127.0.0.1:9/health", Duration::from_millis(500))
            .await;
        assert!(result.is_err());
    }
}
