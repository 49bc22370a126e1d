//! The middleware trait and chain continuation.
//!
//! Each stage receives the request-scoped context by `&mut`, the request, and
//! a [`Next`] continuation. A stage either calls `next.run(...)` exactly once
//! or returns its own response, which ends the chain.
//!
//! # Example
//!
//! ```
//! use bindery_middleware::{BoxFuture, Middleware, MiddlewareContext, Next, Request, Response};
//!
//! struct RequireBody;
//!
//! impl Middleware for RequireBody {
//!     fn name(&self) -> &'static str {
//!         "require_body"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             tracing::debug!(request_id = %ctx.request_id(), "checking body");
//!             next.run(ctx, request).await
//!         })
//!     }
//! }
//! ```

use crate::context::MiddlewareContext;
use crate::types::{Request, Response};
use std::future::Future;
use std::pin::Pin;

/// A boxed future that returns a response.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Terminal handler invoked after the last stage.
pub(crate) type Handler<'a> =
    Box<dyn FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a>;

/// A stage of the middleware chain.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this stage, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request, calling `next` to continue the chain.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// Continuation to the rest of the chain.
///
/// Consumed by [`Next::run`], so it can be invoked at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(Handler<'a>),
}

impl<'a> Next<'a> {
    /// Continues with `middleware`, then `next`.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Ends the chain with a handler.
    pub(crate) fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next stage or the handler.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;

    struct Mark(&'static str);

    impl Middleware for Mark {
        fn name(&self) -> &'static str {
            self.0
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                let mut seen = ctx.remove_extension::<Vec<&'static str>>().unwrap_or_default();
                seen.push(self.0);
                ctx.set_extension(seen);
                next.run(ctx, request).await
            })
        }
    }

    fn ok_handler<'a>() -> Next<'a> {
        Next::handler(|ctx, _req| {
            let status = if ctx.has_extension::<Vec<&'static str>>() {
                StatusCode::OK
            } else {
                StatusCode::NO_CONTENT
            };
            Box::pin(async move {
                let mut response = Response::new(Full::new(Bytes::new()));
                *response.status_mut() = status;
                response
            })
        })
    }

    fn request() -> Request {
        http::Request::new(Full::new(Bytes::new()))
    }

    #[tokio::test]
    async fn test_next_handler() {
        let mut ctx = MiddlewareContext::new();
        let response = ok_handler().run(&mut ctx, request()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_chain_runs_in_order() {
        let first = Mark("first");
        let second = Mark("second");
        let next = Next::new(&first, Next::new(&second, ok_handler()));

        let mut ctx = MiddlewareContext::new();
        let response = next.run(&mut ctx, request()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            ctx.get_extension::<Vec<&'static str>>().unwrap(),
            &["first", "second"]
        );
    }
}
