//! Request-scoped middleware context.
//!
//! The [`MiddlewareContext`] is created once per request and handed to every
//! stage by `&mut`. Binding stages publish their results here as typed
//! extensions: the populated model under its own type and the error
//! collection under [`Errors`](bindery_core::Errors).

use bindery_core::Cancellation;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

/// Unique identifier of one request (UUID v7, time-ordered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Context that flows through the middleware chain.
///
/// # Example
///
/// ```
/// use bindery_middleware::context::MiddlewareContext;
///
/// #[derive(Debug, PartialEq)]
/// struct SignUp {
///     username: String,
/// }
///
/// let mut ctx = MiddlewareContext::new();
/// ctx.set_extension(SignUp { username: "logan".into() });
///
/// assert_eq!(ctx.get_extension::<SignUp>().unwrap().username, "logan");
/// assert!(!ctx.cancellation().is_cancelled());
/// ```
pub struct MiddlewareContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// When the request started processing.
    started_at: Instant,

    /// Cancellation latch handed to validators.
    cancellation: Cancellation,

    /// Type-erased extension data, one value per type.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a context with a fresh request ID and a latch that never fires
    /// unless cancelled explicitly.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with a specific request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            started_at: Instant::now(),
            cancellation: Cancellation::new(),
            extensions: HashMap::new(),
        }
    }

    /// Replaces the cancellation latch, e.g. with one armed by a timeout.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the cancellation latch of this request.
    #[must_use]
    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value, replacing any previous value of the
    /// same type.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MiddlewareContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareContext")
            .field("request_id", &self.request_id)
            .field("started_at", &self.started_at)
            .field("cancelled", &self.cancellation.is_cancelled())
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        #[derive(Debug, Clone, PartialEq)]
        struct Login {
            user: String,
        }

        let mut ctx = MiddlewareContext::new();
        assert!(!ctx.has_extension::<Login>());
        assert!(ctx.get_extension::<Login>().is_none());

        ctx.set_extension(Login { user: "a".into() });
        ctx.set_extension(Login { user: "b".into() });
        assert_eq!(ctx.get_extension::<Login>().unwrap().user, "b");

        let removed = ctx.remove_extension::<Login>();
        assert_eq!(removed, Some(Login { user: "b".into() }));
        assert!(!ctx.has_extension::<Login>());
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = MiddlewareContext::new();
        let b = MiddlewareContext::new();
        assert_ne!(a.request_id(), b.request_id());

        let id = RequestId::from_uuid(Uuid::nil());
        let ctx = MiddlewareContext::with_request_id(id);
        assert_eq!(ctx.request_id().to_string(), Uuid::nil().to_string());
    }

    #[test]
    fn test_with_cancellation_is_shared() {
        let cancel = Cancellation::new();
        let ctx = MiddlewareContext::new().with_cancellation(cancel.clone());

        cancel.cancel();
        assert!(ctx.cancellation().is_cancelled());
    }

    #[test]
    fn test_elapsed_time() {
        let ctx = MiddlewareContext::new();
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(ctx.elapsed() >= std::time::Duration::from_millis(10));
    }
}
