//! # Bindery Test
//!
//! In-memory test utilities for binding pipelines: no server, no sockets.
//!
//! - [`TestClient`] runs requests through a [`Pipeline`](bindery_middleware::Pipeline)
//!   and a terminal handler
//! - [`TestRequest`] builds requests with JSON, YAML, form or multipart bodies
//! - [`MultipartBody`] encodes `multipart/form-data` bodies
//! - [`TestResponse`] keeps the request context so bound models and
//!   binding errors can be asserted on
//!
//! ## Example
//!
//! ```ignore
//! use bindery_test::{MultipartBody, TestClient};
//!
//! #[tokio::test]
//! async fn test_upload() {
//!     let client = TestClient::new(
//!         Pipeline::builder().stage(MultipartBinding::<Upload>::new()).build(),
//!     );
//!
//!     let response = client
//!         .post("/upload")
//!         .multipart(&MultipartBody::new().file("document", "a.txt", "text/plain", "hi"))
//!         .send()
//!         .await
//!         .unwrap();
//!
//!     response.assert_no_binding_errors();
//!     assert!(response.extension::<Upload>().unwrap().document.is_some());
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/bindery-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod multipart;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest, TestHandler};
pub use error::TestError;
pub use multipart::{MultipartBody, DEFAULT_BOUNDARY};
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
