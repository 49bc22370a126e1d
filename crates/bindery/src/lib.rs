//! # Bindery
//!
//! **Request-data binding middleware**
//!
//! Bindery decodes an HTTP request into a typed model, validates it, and
//! hands both the model and any errors to the rest of the middleware chain:
//!
//! - **Four encodings** – JSON, YAML, URL-encoded forms (body and query) and
//!   multipart forms with file uploads
//! - **Static field tables** – `#[derive(FormModel)]` maps form keys onto
//!   nested, optional, sequence and file fields without runtime reflection
//! - **Error collection** – every decode, coercion and validation failure is
//!   recorded; nothing stops at the first bad field
//! - **Pluggable validation** – `#[validate(...)]` rules by default, any
//!   [`Validator`] on request
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bindery::prelude::*;
//!
//! #[derive(Debug, Clone, Default, FormModel, Validate)]
//! struct SignUp {
//!     #[validate(length(min = 3))]
//!     username: String,
//!     #[form(rename = "remember_me")]
//!     remember: bool,
//!     avatar: Option<UploadedFile>,
//! }
//!
//! let pipeline = Pipeline::builder()
//!     .stage(bindery::multipart_form_with::<SignUp>(
//!         BindingOptions::new().error_handler(ErrorHandler::json(StatusCode::BAD_REQUEST)),
//!     ))
//!     .build();
//!
//! let response = pipeline
//!     .process(MiddlewareContext::new(), request, |ctx, _req| {
//!         let user = ctx.get_extension::<SignUp>().cloned();
//!         Box::pin(async move { render(user) })
//!     })
//!     .await;
//! ```
//!
//! JSON and YAML models are decoded by serde. Mark them `#[serde(default)]`
//! so that fields missing from the body keep their zero value and surface as
//! validation errors, rather than failing the whole body:
//!
//! ```rust,ignore
//! #[derive(Debug, Default, Deserialize, Validate)]
//! #[serde(default)]
//! struct Comment {
//!     #[validate(length(min = 1))]
//!     body: String,
//!     rating: u8,
//! }
//!
//! let stage = bindery::json::<Comment>();
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → collect body → decode (JSON | YAML | form + query | multipart)
//!                              │
//!                              ▼
//!          map_form (forms) → validator → ctx: model + Errors
//!                                              │
//!           errors + handler → handler response ┴ otherwise → next stage
//! ```

#![doc(html_root_url = "https://docs.rs/bindery/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use bindery_config as config;
pub use bindery_core as core;
pub use bindery_extract as extract;
pub use bindery_middleware as middleware;
pub use bindery_telemetry as telemetry;
pub use validator;

pub use bindery_core::{
    BindingError, Cancellation, ErrorCategory, Errors, FormModel, UploadedFile,
    ValidationFailure, Validator, Violation,
};
pub use bindery_macros::FormModel;
pub use bindery_middleware::{
    BindingOptions, ErrorHandler, FormBinding, HandlerError, JsonBinding, MultipartBinding,
    YamlBinding,
};

use serde::de::DeserializeOwned;
use validator::Validate;

#[doc(hidden)]
pub mod __private {
    pub use bindery_core::{
        Field, FieldKind, FileSlot, FormModel, OptionalSlot, RecordSlot, ScalarSlot, SequenceSlot,
    };
}

/// JSON binding stage for `M`, validated with its `#[validate(...)]` rules.
///
/// `M` should carry `#[serde(default)]`; otherwise a body that omits any
/// field fails to decode as a whole.
///
/// # Panics
///
/// Panics if `M` is a reference or smart pointer.
#[must_use]
pub fn json<M>() -> JsonBinding<M>
where
    M: DeserializeOwned + Validate + Default + Send + Sync + 'static,
{
    JsonBinding::new()
}

/// JSON binding stage with explicit options.
#[must_use]
pub fn json_with<M>(options: BindingOptions<M>) -> JsonBinding<M>
where
    M: DeserializeOwned + Validate + Default + Send + Sync + 'static,
{
    JsonBinding::with_options(options)
}

/// YAML binding stage for `M`.
///
/// Same `#[serde(default)]` advice as [`json`].
#[must_use]
pub fn yaml<M>() -> YamlBinding<M>
where
    M: DeserializeOwned + Validate + Default + Send + Sync + 'static,
{
    YamlBinding::new()
}

/// YAML binding stage with explicit options.
#[must_use]
pub fn yaml_with<M>(options: BindingOptions<M>) -> YamlBinding<M>
where
    M: DeserializeOwned + Validate + Default + Send + Sync + 'static,
{
    YamlBinding::with_options(options)
}

/// URL-encoded form binding stage for `M`; the query string is merged in.
#[must_use]
pub fn form<M>() -> FormBinding<M>
where
    M: FormModel + Validate + Send + Sync,
{
    FormBinding::new()
}

/// URL-encoded form binding stage with explicit options.
#[must_use]
pub fn form_with<M>(options: BindingOptions<M>) -> FormBinding<M>
where
    M: FormModel + Validate + Send + Sync,
{
    FormBinding::with_options(options)
}

/// Multipart form binding stage for `M`.
#[must_use]
pub fn multipart_form<M>() -> MultipartBinding<M>
where
    M: FormModel + Validate + Send + Sync,
{
    MultipartBinding::new()
}

/// Multipart form binding stage with explicit options.
#[must_use]
pub fn multipart_form_with<M>(options: BindingOptions<M>) -> MultipartBinding<M>
where
    M: FormModel + Validate + Send + Sync,
{
    MultipartBinding::with_options(options)
}

/// Prelude module for convenient imports.
///
/// JSON and YAML models still need `serde::Deserialize`, and usually
/// `#[serde(default)]`, from the user's own serde dependency.
///
/// ```rust,ignore
/// use bindery::prelude::*;
/// ```
pub mod prelude {
    pub use bindery_core::{
        BindingError, Cancellation, ErrorCategory, Errors, FormModel, UploadedFile,
        ValidationFailure, Validator, Violation,
    };
    pub use bindery_macros::FormModel;
    pub use bindery_middleware::{
        BindingOptions, BoxFuture, ErrorHandler, FormBinding, HandlerError, JsonBinding,
        Middleware, MiddlewareContext, MultipartBinding, Next, Pipeline, Request, Response,
        ResponseExt, YamlBinding,
    };
    pub use http::StatusCode;
    pub use validator::Validate;
}
