//! End-to-end binding chain tests.
//!
//! These run several binding stages in one pipeline and check what the
//! terminal handler observes in the context.

use bindery_core::{Cancellation, ErrorCategory, Errors, Field, FieldKind, FormModel, ScalarSlot};
use bindery_middleware::{
    BindingOptions, BoxFuture, ErrorHandler, FormBinding, JsonBinding, MiddlewareContext,
    Pipeline, Request, Response, ResponseExt,
};
use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate)]
struct Comment {
    #[validate(length(min = 1, max = 140))]
    text: String,
}

#[derive(Debug, Default, Validate)]
struct Paging {
    #[validate(range(max = 100))]
    limit: u32,
}

fn limit(m: &mut Paging) -> &mut dyn ScalarSlot {
    &mut m.limit
}

impl FormModel for Paging {
    fn fields() -> &'static [Field<Self>] {
        static FIELDS: [Field<Paging>; 1] = [Field::new("limit", "limit", FieldKind::Scalar(limit))];
        &FIELDS
    }
}

fn comment_request(uri: &str, body: &str) -> Request {
    http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

/// Handler that renders what it saw in the context.
fn inspect(ctx: &mut MiddlewareContext, _request: Request) -> BoxFuture<'static, Response> {
    let text = ctx
        .get_extension::<Comment>()
        .map(|c| c.text.clone())
        .unwrap_or_default();
    let limit = ctx.get_extension::<Paging>().map_or(0, |p| p.limit);
    let errors = ctx.get_extension::<Errors>().map_or(0, Errors::len);
    Box::pin(async move {
        Response::json(
            StatusCode::OK,
            &serde_json::json!({ "text": text, "limit": limit, "errors": errors }),
        )
        .unwrap()
    })
}

async fn body_json(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_json_and_query_stages_share_request() {
    let pipeline = Pipeline::builder()
        .stage(JsonBinding::<Comment>::new())
        .stage(FormBinding::<Paging>::new())
        .build();

    let response = pipeline
        .process(
            MiddlewareContext::new(),
            comment_request("/comments?limit=20", r#"{"text": "first!"}"#),
            inspect,
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["text"], "first!");
    assert_eq!(json["limit"], 20);
    assert_eq!(json["errors"], 0);
}

#[tokio::test]
async fn test_later_stage_replaces_errors() {
    let pipeline = Pipeline::builder()
        .stage(JsonBinding::<Comment>::new())
        .stage(FormBinding::<Paging>::new())
        .build();

    let mut ctx = MiddlewareContext::new();
    pipeline
        .process_with(
            &mut ctx,
            comment_request("/comments?limit=500", r#"{"text": ""}"#),
            inspect,
        )
        .await;

    let errors = ctx.get_extension::<Errors>().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].category(), ErrorCategory::Validation);
    assert!(errors[0].to_string().contains("limit"));
}

#[tokio::test]
async fn test_error_handler_short_circuits() {
    let seen = Arc::new(Mutex::new(None));
    let observed = Arc::clone(&seen);
    let handler = ErrorHandler::new(move |ctx, errors| {
        *observed.lock().unwrap() = Some((ctx.request_id(), errors.len()));
        Box::pin(async { Ok(Response::text(StatusCode::BAD_REQUEST, "invalid comment")) })
    });

    let pipeline = Pipeline::builder()
        .stage(JsonBinding::<Comment>::with_options(
            BindingOptions::new().error_handler(handler),
        ))
        .stage(FormBinding::<Paging>::new())
        .build();

    let ctx = MiddlewareContext::new();
    let request_id = ctx.request_id();
    let response = pipeline
        .process(ctx, comment_request("/comments", "{"), inspect)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let (seen_id, count) = seen.lock().unwrap().unwrap();
    assert_eq!(seen_id, request_id);
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_cancelled_request_reports_cancellation() {
    let cancel = Cancellation::new();
    cancel.cancel();

    let pipeline = Pipeline::builder()
        .stage(JsonBinding::<Comment>::new())
        .build();
    let mut ctx = MiddlewareContext::new().with_cancellation(cancel);
    pipeline
        .process_with(
            &mut ctx,
            comment_request("/comments", r#"{"text": "ok"}"#),
            inspect,
        )
        .await;

    let errors = ctx.get_extension::<Errors>().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].to_string(), "validation cancelled");
}
