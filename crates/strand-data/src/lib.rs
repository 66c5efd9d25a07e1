//! Outbound HTTP client for the Strand storefront.
//!
//! A small builder API over Spin's outbound HTTP host call, used for the
//! payment-provider integration:
//!
//! ```rust,ignore
//! use strand_data::FetchClient;
//!
//! let client = FetchClient::new().with_base_url("https://api.example.com");
//! let session: CheckoutSession = client
//!     .post("/v1/checkout")
//!     .json(&body)?
//!     .send()?
//!     .error_for_status()?
//!     .json()?;
//! ```
//!
//! Requests can only actually be sent from inside the Spin runtime; on
//! native targets `send` returns [`FetchError::Unsupported`]. Request
//! construction and response parsing work everywhere, which is what the
//! unit tests exercise.

mod error;
mod request;
mod response;

pub use error::FetchError;
pub use request::{Method, Request};
pub use response::Response;

use serde::Serialize;
use std::collections::HashMap;

/// HTTP client with an optional base URL and default headers.
#[derive(Debug, Clone, Default)]
pub struct FetchClient {
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
}

impl FetchClient {
    /// Create a new client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a base URL to every relative request path.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Include a header on every request.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Start a GET request.
    pub fn get(&self, url: impl Into<String>) -> Request {
        self.request(Method::Get, url)
    }

    /// Start a POST request.
    pub fn post(&self, url: impl Into<String>) -> Request {
        self.request(Method::Post, url)
    }

    /// Start a request with an arbitrary method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> Request {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) if !url.starts_with("http://") && !url.starts_with("https://") => {
                format!("{}{}", base.trim_end_matches('/'), url)
            }
            _ => url,
        };

        let mut request = Request::new(method, full_url);
        for (key, value) in &self.default_headers {
            request = request.header(key.clone(), value.clone());
        }
        request
    }
}

impl Request {
    /// Set the request body as JSON.
    pub fn json<T: Serialize>(self, value: &T) -> Result<Self, FetchError> {
        let body = serde_json::to_vec(value)?;
        Ok(self
            .header("Content-Type", "application/json")
            .body(body))
    }

    /// Send the request and return the response.
    #[cfg(target_arch = "wasm32")]
    pub fn send(self) -> Result<Response, FetchError> {
        use spin_sdk::http::{Method as SpinMethod, Request as SpinRequest};

        let method = match self.method {
            Method::Get => SpinMethod::Get,
            Method::Post => SpinMethod::Post,
            Method::Put => SpinMethod::Put,
            Method::Delete => SpinMethod::Delete,
        };

        let mut builder = SpinRequest::builder();
        builder.method(method);
        builder.uri(&self.url);
        for (key, value) in &self.headers {
            builder.header(key.as_str(), value.as_str());
        }
        let request = match self.body {
            Some(body) => builder
                .body(body)
                .map_err(|e| FetchError::Request(e.to_string()))?,
            None => builder.build(),
        };

        let response: spin_sdk::http::Response =
            spin_sdk::http::send(request).map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        let headers: HashMap<String, String> = response
            .headers()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        Ok(Response::new(status, headers, response.into_body()))
    }

    /// Send the request (native stub).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn send(self) -> Result<Response, FetchError> {
        Err(FetchError::Unsupported)
    }
}
