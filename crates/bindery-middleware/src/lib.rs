//! # Bindery Middleware
//!
//! The middleware chain and the per-encoding binding stages.
//!
//! Every stage receives the request-scoped [`MiddlewareContext`] by `&mut`,
//! the request, and a [`Next`] continuation. Binding stages decode the
//! request into a model and store the model and its
//! [`Errors`](bindery_core::Errors) as typed context extensions:
//!
//! ```text
//! Request → FormBinding<Csrf> → MultipartBinding<Upload> → Handler
//!              │                     │
//!              └── ctx: Csrf, Errors └── ctx: Upload, Errors, ParsedMultipart
//! ```
//!
//! | Stage | Encoding | Source |
//! |-------|----------|--------|
//! | [`JsonBinding`] | JSON | first value of the body |
//! | [`YamlBinding`] | YAML | first document of the body |
//! | [`FormBinding`] | URL-encoded | body pairs, then query pairs |
//! | [`MultipartBinding`] | multipart | parts, parsed once per request |
//!
//! ## Example
//!
//! ```ignore
//! use bindery_middleware::{BindingOptions, ErrorHandler, JsonBinding, Pipeline};
//!
//! let pipeline = Pipeline::builder()
//!     .stage(JsonBinding::<SignUp>::with_options(
//!         BindingOptions::new().error_handler(ErrorHandler::json(StatusCode::BAD_REQUEST)),
//!     ))
//!     .build();
//! ```

#![doc(html_root_url = "https://docs.rs/bindery-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod binding;
pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod types;

// Re-export main types at crate root
pub use binding::{
    Binding, BindingLimits, BindingOptions, DecodeInput, Encoding, ErrorHandler, Form,
    FormBinding, HandlerError, Json, JsonBinding, Multipart, MultipartBinding, ParsedMultipart,
    Yaml, YamlBinding,
};
pub use context::{MiddlewareContext, RequestId};
pub use middleware::{BoxFuture, Middleware, Next};
pub use pipeline::{BoxedMiddleware, Pipeline, PipelineBuilder};
pub use types::{Request, Response, ResponseExt};
