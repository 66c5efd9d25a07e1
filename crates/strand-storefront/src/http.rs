//! Minimal HTTP request/response types and cookie handling.
//!
//! The handlers are plain functions over these types; the Spin adapter
//! converts at the boundary. Keeping the types host-independent is what
//! lets the whole request path run in native tests.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use strand_commerce::CartId;

/// Name of the cookie carrying the durable cart identifier.
pub const CART_COOKIE: &str = "cartId";

/// Cookie lifetime: one year.
const CART_COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 365;

/// HTTP methods the storefront routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other,
}

impl Method {
    /// Parse a method string; anything unrouted collapses to `Other`.
    pub fn from_str(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            _ => Method::Other,
        }
    }
}

/// An inbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Add a header. Header names are stored lowercase.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into().to_lowercase(), value.into());
        self
    }

    /// Set a JSON body.
    pub fn with_json<T: Serialize>(mut self, value: &T) -> Self {
        self.body = serde_json::to_vec(value).unwrap_or_default();
        self
    }

    /// Attach a cart cookie, as a browser would send it back.
    pub fn with_cart_cookie(self, cart_id: &CartId) -> Self {
        self.with_header("cookie", format!("{}={}", CART_COOKIE, cart_id))
    }

    /// A cookie value from the `Cookie` header.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        let header = self.headers.get("cookie")?;
        header.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then_some(value)
        })
    }

    /// The cart identifier from the request's cookie, if any.
    pub fn cart_id(&self) -> Option<CartId> {
        self.cookie(CART_COOKIE)
            .filter(|v| !v.is_empty())
            .map(CartId::new)
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// An outbound response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A JSON response.
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    /// The `{"success": true}` mutation response.
    pub fn success() -> Self {
        Self::json(200, &serde_json::json!({ "success": true }))
    }

    /// An `{"error": message}` response.
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }))
    }

    /// Add a `Set-Cookie` header persisting the cart identifier for a
    /// year.
    pub fn with_cart_cookie(mut self, cart_id: &CartId) -> Self {
        self.headers.push((
            "set-cookie".to_string(),
            format!(
                "{}={}; Path=/; Max-Age={}; SameSite=Lax",
                CART_COOKIE, cart_id, CART_COOKIE_MAX_AGE
            ),
        ));
        self
    }

    /// Add a `Set-Cookie` header discarding the cart identifier.
    pub fn with_cleared_cart_cookie(mut self) -> Self {
        self.headers.push((
            "set-cookie".to_string(),
            format!("{}=; Path=/; Max-Age=0", CART_COOKIE),
        ));
        self
    }

    /// A `Set-Cookie` value, if this response carries one.
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == "set-cookie")
            .map(|(_, v)| v.as_str())
    }

    /// Parse the body as JSON.
    pub fn json_body(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
