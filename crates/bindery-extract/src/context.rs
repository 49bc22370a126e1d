//! The request view decoders read from.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, Uri};

/// The parts of an HTTP request a body decoder needs.
///
/// Binding stages build one per request after collecting the body; the
/// decoders never consume the original request.
///
/// # Example
///
/// ```rust
/// use bindery_extract::ExtractionContext;
/// use http::Method;
///
/// let ctx = ExtractionContext::builder()
///     .method(Method::POST)
///     .uri("/users?debug=1".parse().unwrap())
///     .header("content-type", "application/json")
///     .body(r#"{"name":"Logan"}"#)
///     .build();
///
/// assert_eq!(ctx.query_string(), Some("debug=1"));
/// assert_eq!(ctx.content_type(), Some("application/json"));
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl ExtractionContext {
    /// Creates a context.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
        }
    }

    /// Creates a context from request parts and a collected body.
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts, body: Bytes) -> Self {
        Self::new(
            parts.method.clone(),
            parts.uri.clone(),
            parts.headers.clone(),
            body,
        )
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder() -> ExtractionContextBuilder {
        ExtractionContextBuilder::new()
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the raw query string if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the Content-Type header value, if it is valid ASCII.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }
}

/// Builder for [`ExtractionContext`].
///
/// Defaults to `GET /` with no headers and an empty body.
#[derive(Debug, Default)]
pub struct ExtractionContextBuilder {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl ExtractionContextBuilder {
    /// Creates a builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = uri;
        self
    }

    /// Adds a header; invalid values are ignored.
    #[must_use]
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = value.parse() {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the context.
    #[must_use]
    pub fn build(self) -> ExtractionContext {
        ExtractionContext::new(self.method, self.uri, self.headers, self.body)
    }
}
