//! Request and response types used by the middleware chain.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;

/// The HTTP request type used in the middleware chain.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the middleware chain.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building simple responses.
pub trait ResponseExt {
    /// Creates a plain-text response.
    fn text(status: StatusCode, message: &str) -> Response;

    /// Creates a JSON response from a serializable value.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `value` cannot be encoded.
    fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> serde_json::Result<Response>;
}

impl ResponseExt for Response {
    fn text(status: StatusCode, message: &str) -> Response {
        with_body(
            status,
            "text/plain; charset=utf-8",
            Bytes::from(message.to_string()),
        )
    }

    fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> serde_json::Result<Response> {
        let body = serde_json::to_vec(value)?;
        Ok(with_body(status, "application/json", Bytes::from(body)))
    }
}

fn with_body(status: StatusCode, content_type: &'static str, body: Bytes) -> Response {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_response() {
        let response = Response::text(StatusCode::BAD_REQUEST, "invalid input");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_json_response() {
        let response =
            Response::json(StatusCode::UNPROCESSABLE_ENTITY, &serde_json::json!({"ok": false}))
                .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
