//! Test client running requests through a binding pipeline in memory.

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use bindery_middleware::{BoxFuture, MiddlewareContext, Pipeline, Request, Response, ResponseExt};
use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use std::sync::Arc;

/// Terminal handler type for the test client.
pub type TestHandler =
    Arc<dyn Fn(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// A test client for sending in-memory requests through a [`Pipeline`].
///
/// The context the request ran with is kept on the [`TestResponse`], so the
/// bound model and the binding errors can be inspected after the call.
///
/// # Example
///
/// ```ignore
/// use bindery_test::TestClient;
///
/// let client = TestClient::new(
///     Pipeline::builder().stage(JsonBinding::<SignUp>::new()).build(),
/// );
///
/// let response = client
///     .post("/signup")
///     .json(&json!({"username": "logan"}))
///     .send()
///     .await
///     .unwrap();
///
/// response.assert_status(StatusCode::OK);
/// assert_eq!(response.extension::<SignUp>().unwrap().username, "logan");
/// ```
#[must_use]
pub struct TestClient {
    pipeline: Pipeline,
    handler: TestHandler,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client whose terminal handler answers `200 OK`.
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            handler: Arc::new(|_ctx, _req| {
                Box::pin(async { Response::text(StatusCode::OK, "ok") })
            }),
            default_headers: Vec::new(),
        }
    }

    /// Creates a client that echoes the request body back.
    pub fn echo(pipeline: Pipeline) -> Self {
        Self::new(pipeline).with_handler(|_ctx, req| {
            Box::pin(async move {
                let body = match req.into_body().collect().await {
                    Ok(collected) => collected.to_bytes(),
                    Err(never) => match never {},
                };
                Response::new(Full::new(body))
            })
        })
    }

    /// Replaces the terminal handler.
    ///
    /// The handler reads what it needs from the context before returning its
    /// future.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response>
            + Send
            + Sync
            + 'static,
    {
        self.handler = Arc::new(handler);
        self
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Returns the pipeline requests run through.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    /// Sends a built request with a fresh context.
    pub async fn send(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        self.send_with(MiddlewareContext::new(), request).await
    }

    /// Sends a built request with the given context.
    pub async fn send_with(
        &self,
        mut ctx: MiddlewareContext,
        request: TestRequest,
    ) -> Result<TestResponse, TestError> {
        let handler = Arc::clone(&self.handler);
        let response = self
            .pipeline
            .process_with(&mut ctx, request.into_http_request()?, move |ctx, req| {
                handler(ctx, req)
            })
            .await;
        Ok(TestResponse::from_http(response).await?.with_context(ctx))
    }
}

/// A request builder bound to a test client.
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
    context: Option<MiddlewareContext>,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let mut builder = builder;
        for (name, value) in &client.default_headers {
            builder = builder.header(name, value);
        }
        Self {
            client,
            builder,
            context: None,
        }
    }

    /// Sets a header on the request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the request body as JSON.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets the request body as YAML.
    pub fn yaml<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.yaml(value);
        self
    }

    /// Sets the request body as form-urlencoded pairs.
    pub fn form<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.form(value);
        self
    }

    /// Sets a multipart body.
    pub fn multipart(mut self, body: &crate::MultipartBody) -> Self {
        self.builder = self.builder.multipart(body);
        self
    }

    /// Runs the request with `ctx` instead of a fresh context.
    pub fn context(mut self, ctx: MiddlewareContext) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Sends the request.
    pub async fn send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        let ctx = self.context.unwrap_or_default();
        self.client.send_with(ctx, request).await
    }
}
