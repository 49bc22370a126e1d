//! Test response wrapper.

use crate::error::TestError;
use bindery_core::Errors;
use bindery_middleware::{MiddlewareContext, Response};
use bytes::Bytes;
use http::{header, HeaderMap, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use std::fmt;

/// A response together with the context the request ran with.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    context: MiddlewareContext,
}

impl TestResponse {
    /// Collects a middleware response.
    pub async fn from_http(response: Response) -> Result<Self, TestError> {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self::new(parts.status, parts.headers, body))
    }

    /// Creates a test response from raw parts, with an empty context.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
            context: MiddlewareContext::new(),
        }
    }

    /// Attaches the context the request ran with.
    #[must_use]
    pub fn with_context(mut self, context: MiddlewareContext) -> Self {
        self.context = context;
        self
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns a reference to the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Returns the context the request ran with.
    #[must_use]
    pub fn context(&self) -> &MiddlewareContext {
        &self.context
    }

    /// Returns a value a stage stored in the context, such as a bound model.
    #[must_use]
    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.context.get_extension::<T>()
    }

    /// Returns the errors stored by the last binding stage that ran.
    #[must_use]
    pub fn errors(&self) -> Option<&Errors> {
        self.context.get_extension::<Errors>()
    }

    /// Returns the messages of the stored binding errors, in order.
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.errors()
            .map(|errors| errors.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    // Assertion methods

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "expected status {expected}, got {}: {:?}",
            self.status, self.body
        );
        self
    }

    /// Asserts that the body contains `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body is not UTF-8 or doesn't contain the substring.
    pub fn assert_body_contains(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let body = self
            .text()
            .unwrap_or_else(|e| panic!("body is not text: {e}"));
        assert!(
            body.contains(expected),
            "body should contain '{expected}', got: {body}"
        );
        self
    }

    /// Asserts that a JSON field equals `expected`.
    ///
    /// `path` is dot separated; numeric segments index arrays
    /// (`errors.0.category`).
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON, or the field is missing or differs.
    pub fn assert_json_field(&self, path: impl AsRef<str>, expected: &serde_json::Value) -> &Self {
        let path = path.as_ref();
        let json: serde_json::Value = self
            .json()
            .unwrap_or_else(|e| panic!("body is not JSON: {e}"));
        let actual = json_path(&json, path)
            .unwrap_or_else(|| panic!("JSON path '{path}' not found in: {json}"));
        assert_eq!(actual, expected, "JSON field '{path}'");
        self
    }

    /// Asserts that binding ran and recorded no errors.
    ///
    /// # Panics
    ///
    /// Panics if no binding stage ran or errors were recorded.
    pub fn assert_no_binding_errors(&self) -> &Self {
        let errors = self
            .errors()
            .unwrap_or_else(|| panic!("no binding stage stored errors in the context"));
        assert!(
            errors.is_empty(),
            "expected no binding errors, got: {:?}",
            self.error_messages()
        );
        self
    }

    /// Asserts the number of recorded binding errors.
    ///
    /// # Panics
    ///
    /// Panics if no binding stage ran or the count differs.
    pub fn assert_binding_errors(&self, expected: usize) -> &Self {
        let errors = self
            .errors()
            .unwrap_or_else(|| panic!("no binding stage stored errors in the context"));
        assert_eq!(
            errors.len(),
            expected,
            "binding errors: {:?}",
            self.error_messages()
        );
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("request_id", &self.context.request_id())
            .finish()
    }
}

fn json_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = match segment.parse::<usize>() {
            Ok(index) => current.get(index)?,
            Err(_) => current.get(segment)?,
        };
    }
    Some(current)
}
