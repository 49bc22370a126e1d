//! Per-stage binding options and error handlers.

use crate::context::MiddlewareContext;
use crate::middleware::BoxFuture;
use crate::types::{Response, ResponseExt};
use bindery_config::BinderyConfig;
use bindery_core::{Errors, Validator};
use bindery_extract::{DEFAULT_MAX_FORM_SIZE, DEFAULT_MAX_MEMORY};
use http::StatusCode;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by an [`ErrorHandler`].
///
/// A binding stage treats a failing error handler as a bug and panics.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Creates a handler error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("failed to render errors: {err}"))
    }
}

type HandlerFn = dyn Fn(&MiddlewareContext, Errors) -> BoxFuture<'static, Result<Response, HandlerError>>
    + Send
    + Sync;

/// Produces the response for a request whose binding failed.
///
/// The handler sees the context after the model and errors were stored in
/// it. Its response ends the chain.
#[derive(Clone)]
pub struct ErrorHandler {
    inner: Arc<HandlerFn>,
}

impl ErrorHandler {
    /// Wraps a handler function.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&MiddlewareContext, Errors) -> BoxFuture<'static, Result<Response, HandlerError>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            inner: Arc::new(handler),
        }
    }

    /// Responds with `status` and a JSON body `{"errors": [...]}`.
    #[must_use]
    pub fn json(status: StatusCode) -> Self {
        #[derive(Serialize)]
        struct Envelope<'a> {
            errors: &'a Errors,
        }

        Self::new(move |_ctx, errors| {
            Box::pin(async move {
                let response = Response::json(status, &Envelope { errors: &errors })?;
                Ok(response)
            })
        })
    }

    /// Runs the handler.
    pub fn invoke(
        &self,
        ctx: &MiddlewareContext,
        errors: Errors,
    ) -> BoxFuture<'static, Result<Response, HandlerError>> {
        (self.inner)(ctx, errors)
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandler").finish_non_exhaustive()
    }
}

/// Options for one binding stage, resolved once when the stage is built.
///
/// | Option | Default |
/// |---|---|
/// | error handler | none: errors are only stored in the context |
/// | validator | the constructor's default |
/// | multipart memory ceiling | 10 MiB |
/// | URL-encoded body ceiling | 10 MiB |
/// | spill directory | the system temporary directory |
pub struct BindingOptions<M> {
    error_handler: Option<ErrorHandler>,
    validator: Option<Arc<dyn Validator<M>>>,
    max_memory: u64,
    max_form_size: u64,
    spill_dir: Option<PathBuf>,
}

pub(crate) struct ResolvedOptions<M> {
    pub(crate) error_handler: Option<ErrorHandler>,
    pub(crate) validator: Option<Arc<dyn Validator<M>>>,
    pub(crate) max_memory: u64,
    pub(crate) max_form_size: u64,
    pub(crate) spill_dir: Option<PathBuf>,
}

impl<M> BindingOptions<M> {
    /// Creates options with every default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            error_handler: None,
            validator: None,
            max_memory: DEFAULT_MAX_MEMORY,
            max_form_size: DEFAULT_MAX_FORM_SIZE,
            spill_dir: None,
        }
    }

    /// Seeds the limits from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &BinderyConfig) -> Self {
        let mut options = Self::new()
            .max_memory(config.binding.max_memory)
            .max_form_size(config.binding.max_form_size);
        options.spill_dir = config.binding.spill_dir.clone();
        options
    }

    /// Sets the handler invoked when binding produced errors.
    #[must_use]
    pub fn error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Replaces the stage's default validator.
    #[must_use]
    pub fn validator<V>(mut self, validator: V) -> Self
    where
        V: Validator<M> + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Sets the multipart memory ceiling; `0` selects the default.
    #[must_use]
    pub fn max_memory(mut self, bytes: u64) -> Self {
        self.max_memory = if bytes == 0 { DEFAULT_MAX_MEMORY } else { bytes };
        self
    }

    /// Sets the URL-encoded body ceiling; `0` selects the default.
    #[must_use]
    pub fn max_form_size(mut self, bytes: u64) -> Self {
        self.max_form_size = if bytes == 0 {
            DEFAULT_MAX_FORM_SIZE
        } else {
            bytes
        };
        self
    }

    /// Sets the directory spilled uploads are written to.
    #[must_use]
    pub fn spill_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spill_dir = Some(dir.into());
        self
    }

    pub(crate) fn into_parts(self) -> ResolvedOptions<M> {
        ResolvedOptions {
            error_handler: self.error_handler,
            validator: self.validator,
            max_memory: self.max_memory,
            max_form_size: self.max_form_size,
            spill_dir: self.spill_dir,
        }
    }
}

impl<M> Default for BindingOptions<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for BindingOptions<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingOptions")
            .field("error_handler", &self.error_handler.is_some())
            .field("validator", &self.validator.is_some())
            .field("max_memory", &self.max_memory)
            .field("max_form_size", &self.max_form_size)
            .field("spill_dir", &self.spill_dir)
            .finish()
    }
}
