//! Test request building.
//!
//! Builder methods never panic: the first failure (a bad header, a value
//! that cannot be encoded) is kept and reported by [`TestRequestBuilder::build`].

use crate::error::TestError;
use crate::multipart::MultipartBody;
use bindery_middleware::Request;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use http_body_util::Full;
use serde::Serialize;

/// A test request that can be sent to a [`TestClient`](crate::TestClient).
#[derive(Debug, Clone)]
pub struct TestRequest {
    /// HTTP method
    pub method: Method,
    /// Request URI
    pub uri: Uri,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Bytes,
}

impl TestRequest {
    /// Creates a new GET request.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Creates a new POST request.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Creates a new PUT request.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Creates a new PATCH request.
    pub fn patch(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PATCH, uri)
    }

    /// Creates a new DELETE request.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }

    /// Converts this request to the middleware request type.
    pub fn into_http_request(self) -> Result<Request, TestError> {
        let mut request = http::Request::builder()
            .method(self.method)
            .uri(self.uri)
            .body(Full::new(self.body))
            .map_err(|e| TestError::RequestBuild(e.to_string()))?;
        *request.headers_mut() = self.headers;
        Ok(request)
    }
}

/// Builder for constructing test requests.
#[must_use]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Option<Bytes>,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: None,
            error: None,
        }
    }

    fn fail(mut self, error: TestError) -> Self {
        self.error.get_or_insert(error);
        self
    }

    /// Sets a header on the request, replacing earlier values.
    ///
    /// # Example
    ///
    /// ```
    /// use bindery_test::TestRequest;
    ///
    /// let request = TestRequest::get("/search?q=rust")
    ///     .header("X-Request-ID", "12345")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(request.headers["x-request-id"], "12345");
    /// ```
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = match HeaderName::try_from(name.as_ref()) {
            Ok(name) => name,
            Err(e) => return self.fail(TestError::InvalidHeader(e.to_string())),
        };
        let value = match HeaderValue::try_from(value.as_ref()) {
            Ok(value) => value,
            Err(e) => return self.fail(TestError::InvalidHeader(e.to_string())),
        };
        self.headers.insert(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the request body as JSON and the `Content-Type` to
    /// `application/json`.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.body = Some(Bytes::from(bytes));
                self.content_type("application/json")
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Sets the request body as YAML and the `Content-Type` to
    /// `application/x-yaml`.
    pub fn yaml<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_yaml::to_string(value) {
            Ok(text) => {
                self.body = Some(Bytes::from(text));
                self.content_type("application/x-yaml")
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Sets the request body as form-urlencoded pairs and the
    /// `Content-Type` to `application/x-www-form-urlencoded`.
    ///
    /// Repeated keys are written with a sequence of pairs:
    /// `.form(&[("tag", "a"), ("tag", "b")])`.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_urlencoded::to_string(value) {
            Ok(encoded) => {
                self.body = Some(Bytes::from(encoded));
                self.content_type("application/x-www-form-urlencoded")
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Sets a multipart body and its `Content-Type`, boundary included.
    pub fn multipart(mut self, body: &MultipartBody) -> Self {
        self.body = Some(body.to_bytes());
        self.content_type(body.content_type())
    }

    /// Builds the test request.
    pub fn build(self) -> Result<TestRequest, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let uri: Uri = self
            .uri
            .parse()
            .map_err(|e| TestError::RequestBuild(format!("invalid URI: {e}")))?;

        Ok(TestRequest {
            method: self.method,
            uri,
            headers: self.headers,
            body: self.body.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_methods() {
        assert_eq!(TestRequest::get("/").build().unwrap().method, Method::GET);
        assert_eq!(TestRequest::post("/").build().unwrap().method, Method::POST);
        assert_eq!(TestRequest::put("/").build().unwrap().method, Method::PUT);
        assert_eq!(TestRequest::patch("/").build().unwrap().method, Method::PATCH);
        assert_eq!(TestRequest::delete("/").build().unwrap().method, Method::DELETE);
    }

    #[test]
    fn test_json_body() {
        let request = TestRequest::post("/users")
            .json(&json!({"name": "Alice"}))
            .build()
            .unwrap();

        assert_eq!(request.headers["content-type"], "application/json");
        assert_eq!(request.body.as_ref(), b"{\"name\":\"Alice\"}");
    }

    #[test]
    fn test_yaml_body() {
        let request = TestRequest::put("/settings")
            .yaml(&json!({"replicas": 3}))
            .build()
            .unwrap();

        assert_eq!(request.headers["content-type"], "application/x-yaml");
        assert_eq!(request.body.as_ref(), b"replicas: 3\n");
    }

    #[test]
    fn test_form_body_keeps_repeated_keys() {
        let request = TestRequest::post("/search")
            .form(&[("tag", "a b"), ("tag", "c")])
            .build()
            .unwrap();

        assert_eq!(
            request.headers["content-type"],
            "application/x-www-form-urlencoded"
        );
        assert_eq!(request.body.as_ref(), b"tag=a+b&tag=c");
    }

    #[test]
    fn test_multipart_body() {
        let body = MultipartBody::new().text("title", "report");
        let request = TestRequest::post("/upload").multipart(&body).build().unwrap();

        assert_eq!(request.headers["content-type"], body.content_type());
        assert_eq!(request.body, body.to_bytes());
    }

    #[test]
    fn test_bad_header_reported_at_build() {
        let result = TestRequest::get("/").header("bad header", "x").build();
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }

    #[test]
    fn test_form_rejects_nested_values() {
        let result = TestRequest::post("/")
            .form(&json!({"nested": {"a": 1}}))
            .build();
        assert!(matches!(result, Err(TestError::Form(_))));
    }

    #[test]
    fn test_into_http_request() {
        let request = TestRequest::get("/users?page=2")
            .header("X-Test", "value")
            .build()
            .unwrap()
            .into_http_request()
            .unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri().query(), Some("page=2"));
        assert_eq!(request.headers()["x-test"], "value");
    }
}
