//! Per-encoding binding stages.
//!
//! A [`Binding<M, E>`] is a [`Middleware`] stage that decodes the request
//! into a fresh `M::default()` using the encoding `E`, validates it, and
//! stores both the model and the [`Errors`] collection as typed context
//! extensions for the stages after it:
//!
//! ```text
//! collect body → E::decode → validator → ctx.set_extension(model, errors)
//!                                              │
//!              errors non-empty + error handler ├──→ handler response
//!                                              └──→ next stage
//! ```
//!
//! The request is forwarded with its body intact, so several binding stages
//! can run in one chain. Multipart forms are parsed once per request; later
//! multipart stages reuse the parsed form.
//!
//! # Example
//!
//! ```ignore
//! let pipeline = Pipeline::builder()
//!     .stage(JsonBinding::<SignUp>::with_options(
//!         BindingOptions::new().error_handler(ErrorHandler::json(StatusCode::BAD_REQUEST)),
//!     ))
//!     .build();
//! ```

mod form;
mod json;
mod multipart;
mod options;
mod yaml;

pub use form::Form;
pub use json::Json;
pub use multipart::{Multipart, ParsedMultipart};
pub use options::{BindingOptions, ErrorHandler, HandlerError};
pub use yaml::Yaml;

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use bindery_core::{BindingError, Errors, RuleValidator, Validator};
use bindery_extract::{ExtractionContext, MultipartConfig};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use validator::Validate;

/// Binding stage for JSON bodies.
pub type JsonBinding<M> = Binding<M, Json>;

/// Binding stage for YAML bodies.
pub type YamlBinding<M> = Binding<M, Yaml>;

/// Binding stage for URL-encoded forms and query strings.
pub type FormBinding<M> = Binding<M, Form>;

/// Binding stage for multipart forms.
pub type MultipartBinding<M> = Binding<M, Multipart>;

/// Type names of indirections that cannot be used as a model.
const POINTER_PREFIXES: &[&str] = &[
    "&",
    "alloc::boxed::Box<",
    "alloc::rc::Rc<",
    "alloc::sync::Arc<",
];

/// A request-body encoding that can populate models of type `M`.
pub trait Encoding<M>: Send + Sync + 'static {
    /// The encoding name used in logs and panic messages.
    const NAME: &'static str;

    /// Populates `model` from the request, appending failures to `errors`.
    fn decode<'a>(
        input: DecodeInput<'a>,
        model: &'a mut M,
        errors: &'a mut Errors,
    ) -> BoxFuture<'a, ()>;
}

/// Everything an encoding may read while decoding one request.
pub struct DecodeInput<'a> {
    /// The request-scoped context.
    pub ctx: &'a mut MiddlewareContext,
    /// The request with its collected body.
    pub request: &'a ExtractionContext,
    /// The stage's size limits.
    pub limits: &'a BindingLimits,
}

/// Size limits resolved for one binding stage.
#[derive(Debug, Clone)]
pub struct BindingLimits {
    max_form_size: u64,
    multipart: MultipartConfig,
}

impl BindingLimits {
    /// Maximum size of a URL-encoded body.
    #[must_use]
    pub fn max_form_size(&self) -> u64 {
        self.max_form_size
    }

    /// Multipart parsing limits.
    #[must_use]
    pub fn multipart(&self) -> &MultipartConfig {
        &self.multipart
    }
}

/// Middleware stage binding the request to a model of type `M`.
pub struct Binding<M, E> {
    error_handler: Option<ErrorHandler>,
    validator: Option<Arc<dyn Validator<M>>>,
    limits: BindingLimits,
    _marker: PhantomData<fn() -> (M, E)>,
}

impl<M, E> Binding<M, E>
where
    M: Validate + Default + Send + Sync + 'static,
    E: Encoding<M>,
{
    /// Creates a stage validating with the model's `#[validate(...)]` rules.
    ///
    /// # Panics
    ///
    /// Panics if `M` is a reference or smart pointer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(BindingOptions::default())
    }

    /// Like [`new`](Self::new), with explicit options. A validator set in
    /// `options` replaces the rule validator.
    #[must_use]
    pub fn with_options(options: BindingOptions<M>) -> Self {
        Self::resolve(options, Some(Arc::new(RuleValidator::<M>::new())))
    }
}

impl<T, E> Binding<Vec<T>, E>
where
    T: Validate + Send + Sync + 'static,
    E: Encoding<Vec<T>>,
{
    /// Creates a stage for a sequence model, validating every element.
    ///
    /// Violation paths are prefixed with the element position.
    #[must_use]
    pub fn each() -> Self {
        Self::each_with(BindingOptions::default())
    }

    /// Like [`each`](Self::each), with explicit options.
    #[must_use]
    pub fn each_with(options: BindingOptions<Vec<T>>) -> Self {
        Self::resolve(options, Some(Arc::new(RuleValidator::<Vec<T>>::each())))
    }
}

impl<M, E> Binding<M, E>
where
    M: Default + Send + Sync + 'static,
    E: Encoding<M>,
{
    /// Creates a stage that only validates through a validator set in the
    /// options, if any.
    #[must_use]
    pub fn unvalidated() -> Self {
        Self::unvalidated_with(BindingOptions::default())
    }

    /// Like [`unvalidated`](Self::unvalidated), with explicit options.
    #[must_use]
    pub fn unvalidated_with(options: BindingOptions<M>) -> Self {
        Self::resolve(options, None)
    }

    fn resolve(options: BindingOptions<M>, default_validator: Option<Arc<dyn Validator<M>>>) -> Self {
        ensure_not_pointer::<M>();

        let parts = options.into_parts();
        let mut multipart = MultipartConfig::new().max_memory(parts.max_memory);
        if let Some(dir) = parts.spill_dir {
            multipart = multipart.spill_dir(dir);
        }

        Self {
            error_handler: parts.error_handler,
            validator: parts.validator.or(default_validator),
            limits: BindingLimits {
                max_form_size: parts.max_form_size,
                multipart,
            },
            _marker: PhantomData,
        }
    }

    /// The resolved size limits.
    #[must_use]
    pub fn limits(&self) -> &BindingLimits {
        &self.limits
    }

    /// Returns `true` if a validator runs after decoding.
    #[must_use]
    pub fn validates(&self) -> bool {
        self.validator.is_some()
    }

    /// Returns `true` if an error handler is configured.
    #[must_use]
    pub fn has_error_handler(&self) -> bool {
        self.error_handler.is_some()
    }
}

fn ensure_not_pointer<M>() {
    let name = std::any::type_name::<M>();
    if POINTER_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
        panic!("binding: pointer can not be accepted as binding model");
    }
}

impl<M, E> Middleware for Binding<M, E>
where
    M: Default + Send + Sync + 'static,
    E: Encoding<M>,
{
    fn name(&self) -> &'static str {
        E::NAME
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let bytes: Bytes = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(never) => match never {},
            };
            let extraction = ExtractionContext::from_parts(&parts, bytes.clone());

            let mut model = M::default();
            let mut errors = Errors::new();
            let input = DecodeInput {
                ctx: &mut *ctx,
                request: &extraction,
                limits: &self.limits,
            };
            E::decode(input, &mut model, &mut errors).await;

            if let Some(validator) = &self.validator {
                if let Err(failure) = validator.validate(&model, ctx.cancellation()) {
                    errors.push(BindingError::validation(failure));
                }
            }

            tracing::debug!(
                binding = E::NAME,
                request_id = %ctx.request_id(),
                errors = errors.len(),
                "request bound"
            );

            ctx.set_extension(model);
            ctx.set_extension(errors.clone());

            if !errors.is_empty() {
                if let Some(handler) = &self.error_handler {
                    match handler.invoke(ctx, errors).await {
                        Ok(response) => return response,
                        Err(err) => panic!("binding::{}: {err}", E::NAME),
                    }
                }
            }

            next.run(ctx, Request::from_parts(parts, Full::new(bytes)))
                .await
        })
    }
}

impl<M, E> fmt::Debug for Binding<M, E>
where
    E: Encoding<M>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("encoding", &E::NAME)
            .field("model", &std::any::type_name::<M>())
            .field("validates", &self.validator.is_some())
            .field("error_handler", &self.error_handler.is_some())
            .field("limits", &self.limits)
            .finish()
    }
}
