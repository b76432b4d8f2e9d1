//! Type-erased async delegates.
//!
//! - [`RequestDelegate`] - one stage of a middleware pipeline
//! - [`ResourceExecutionDelegate`] - the rest of an outer filter pipeline
//!
//! Both are cheap to clone (one `Arc`) and compare by identity with `ptr_eq`.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::{RequestContext, ResourceExecutedContext, Result};

type RequestFn =
    dyn for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static;

/// Async function handling a request: `(&mut RequestContext) -> Result<()>`.
///
/// # Example
///
/// ```
/// use weir_core::{RequestDelegate, StatusCode};
///
/// let hello = RequestDelegate::new(|ctx| {
///     Box::pin(async move {
///         ctx.response_mut().set_status(StatusCode::OK).write_str("Hello!");
///         Ok(())
///     })
/// });
/// ```
#[derive(Clone)]
pub struct RequestDelegate {
    inner: Arc<RequestFn>,
}

impl RequestDelegate {
    /// Wraps an async function.
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Delegate that completes immediately without touching the context.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|_| Box::pin(async { Ok(()) }))
    }

    /// Runs the delegate against `ctx`.
    pub fn call<'a>(&self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<()>> {
        (self.inner)(ctx)
    }

    /// Returns `true` if both handles point to the same function.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }
}

impl fmt::Debug for RequestDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDelegate").finish_non_exhaustive()
    }
}

type ResourceExecutionFn = dyn for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, ResourceExecutedContext>
    + Send
    + Sync
    + 'static;

/// Continuation running the remaining resource filters and the action.
///
/// The continuation never fails: errors raised further down are captured in
/// the returned [`ResourceExecutedContext`].
#[derive(Clone)]
pub struct ResourceExecutionDelegate {
    inner: Arc<ResourceExecutionFn>,
}

impl ResourceExecutionDelegate {
    /// Wraps an async continuation.
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, ResourceExecutedContext>
            + Send
            + Sync
            + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Runs the rest of the outer pipeline against `ctx`.
    pub fn call<'a>(&self, ctx: &'a mut RequestContext) -> BoxFuture<'a, ResourceExecutedContext> {
        (self.inner)(ctx)
    }

    /// Returns `true` if both handles point to the same continuation.
    #[must_use]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }
}

impl fmt::Debug for ResourceExecutionDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceExecutionDelegate")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::Error;

    #[tokio::test]
    async fn request_delegate_runs_against_context() {
        let delegate = RequestDelegate::new(|ctx| {
            Box::pin(async move {
                ctx.response_mut().set_status(StatusCode::ACCEPTED);
                Ok(())
            })
        });

        let mut ctx = RequestContext::default();
        delegate.call(&mut ctx).await.expect("delegate succeeds");
        assert_eq!(ctx.response().status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn request_delegate_returns_error() {
        let delegate =
            RequestDelegate::new(|_| Box::pin(async { Err(Error::handler("nope")) }));

        let mut ctx = RequestContext::default();
        let err = delegate.call(&mut ctx).await.expect_err("delegate fails");
        assert!(matches!(err, Error::Handler(message) if message == "nope"));
    }

    #[test]
    fn request_delegate_identity() {
        let a = RequestDelegate::noop();
        let b = a.clone();
        let c = RequestDelegate::noop();

        assert!(RequestDelegate::ptr_eq(&a, &b));
        assert!(!RequestDelegate::ptr_eq(&a, &c));
    }

    #[tokio::test]
    async fn resource_execution_delegate_returns_executed_context() {
        let next = ResourceExecutionDelegate::new(|_| {
            Box::pin(async { ResourceExecutedContext::default() })
        });
        let same = next.clone();

        let mut ctx = RequestContext::default();
        let executed = next.call(&mut ctx).await;

        assert!(!executed.canceled());
        assert!(executed.error().is_none());
        assert!(ResourceExecutionDelegate::ptr_eq(&next, &same));
    }
}
