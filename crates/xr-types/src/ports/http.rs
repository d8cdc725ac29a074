//! HTTP client port.
//!
//! Lets xr-core fetch archives, probe the public IP and register the node
//! without depending on a specific HTTP library. The binary installs a
//! reqwest-backed implementation; tests install in-memory fakes.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// A simple HTTP request descriptor.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Full URL
    pub url: String,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Optional request body
    pub body: Option<Vec<u8>>,
    /// Timeout in seconds (0 = no timeout)
    pub timeout_secs: u64,
}

/// Supported HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A simple HTTP response descriptor.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers (lowercased keys)
    pub headers: HashMap<String, String>,
    /// Response body bytes
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a GET request with a timeout.
    pub fn get(url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout_secs,
        }
    }

    /// Create a POST request carrying a JSON body.
    pub fn post_json(url: impl Into<String>, body: Vec<u8>, timeout_secs: u64) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: HashMap::new(),
            body: Some(body),
            timeout_secs,
        }
        .with_header("Content-Type", "application/json")
    }

    /// Add a header to the request.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

impl HttpResponse {
    /// Check if the status code indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Boxed future returned by [`HttpClient::execute`].
pub type HttpFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HttpResponse, crate::CoreError>> + Send + 'a>>;

/// Port trait for performing HTTP requests.
///
/// Implementations must follow redirects and honour `timeout_secs`.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    fn execute(&self, req: HttpRequest) -> HttpFuture<'_>;
}
