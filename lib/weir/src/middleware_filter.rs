//! Resource filter running a nested middleware pipeline.
//!
//! [`MiddlewareFilter`] sits in the outer pipeline's resource-filter stage.
//! When it runs, it stores the outer context and continuation on the request
//! as a [`MiddlewareFilterFeature`], then hands the same request context to
//! its inner pipeline. Code inside the inner pipeline can look the feature up
//! to resume the outer pipeline; the filter never resumes it itself.

use std::sync::Arc;

use tracing::debug;

use crate::config::FilterConfig;
use crate::{
    BoxFuture, Error, FilterMetadata, RequestContext, RequestDelegate, ResourceExecutingContext,
    ResourceExecutionDelegate, ResourceFilter, Result,
};

/// Outer filter context and continuation, as seen from an inner pipeline.
///
/// # Example
///
/// ```ignore
/// // Inside inner middleware
/// if let Some(feature) = ctx.features().get::<MiddlewareFilterFeature>() {
///     let next = feature.resource_execution_delegate().clone();
///     let executed = next.call(ctx).await;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MiddlewareFilterFeature {
    resource_executing_context: Arc<ResourceExecutingContext>,
    resource_execution_delegate: ResourceExecutionDelegate,
}

impl MiddlewareFilterFeature {
    /// Creates the feature.
    #[must_use]
    pub fn new(
        resource_executing_context: Arc<ResourceExecutingContext>,
        resource_execution_delegate: ResourceExecutionDelegate,
    ) -> Self {
        Self {
            resource_executing_context,
            resource_execution_delegate,
        }
    }

    /// The outer filter context.
    #[must_use]
    pub fn resource_executing_context(&self) -> &Arc<ResourceExecutingContext> {
        &self.resource_executing_context
    }

    /// The rest of the outer pipeline.
    #[must_use]
    pub fn resource_execution_delegate(&self) -> &ResourceExecutionDelegate {
        &self.resource_execution_delegate
    }
}

/// Resource filter that runs an inner middleware pipeline.
///
/// # Example
///
/// ```ignore
/// use weir::{MiddlewareFilter, RequestDelegate, StatusCode};
///
/// let filter = MiddlewareFilter::new(RequestDelegate::new(|ctx| {
///     Box::pin(async move {
///         ctx.response_mut().set_status(StatusCode::OK).write_str("Hello!");
///         Ok(())
///     })
/// }));
/// ```
#[derive(Debug, Clone)]
pub struct MiddlewareFilter {
    pipeline: RequestDelegate,
    order: i32,
}

impl MiddlewareFilter {
    /// Creates a filter running `pipeline`.
    #[must_use]
    pub fn new(pipeline: RequestDelegate) -> Self {
        Self { pipeline, order: 0 }
    }

    /// Creates a filter from an optional pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArgumentNull`] when `pipeline` is `None`.
    pub fn try_new(pipeline: Option<RequestDelegate>) -> Result<Self> {
        pipeline
            .map(Self::new)
            .ok_or(Error::argument_null("request_delegate"))
    }

    /// Applies the filter settings of `config`.
    #[must_use]
    pub fn with_config(mut self, config: &FilterConfig) -> Self {
        self.order = config.order;
        self
    }

    /// The inner pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &RequestDelegate {
        &self.pipeline
    }

    /// Attaches a [`MiddlewareFilterFeature`] for `context` and `next`, then
    /// runs the inner pipeline against `ctx`.
    ///
    /// The feature replaces any previous one and stays attached whatever the
    /// outcome. Errors from the inner pipeline are returned as is.
    pub async fn execute(
        &self,
        ctx: &mut RequestContext,
        context: Arc<ResourceExecutingContext>,
        next: ResourceExecutionDelegate,
    ) -> Result<()> {
        let action = context.action().action_descriptor().name().to_string();
        let replaced = ctx
            .features_mut()
            .insert(MiddlewareFilterFeature::new(context, next))
            .is_some();
        debug!(%action, replaced, "entering inner pipeline");

        let result = self.pipeline.call(ctx).await;

        debug!(%action, ok = result.is_ok(), "left inner pipeline");
        result
    }
}

impl FilterMetadata for MiddlewareFilter {
    fn order(&self) -> i32 {
        self.order
    }
}

impl ResourceFilter for MiddlewareFilter {
    fn on_resource_execution<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        context: Arc<ResourceExecutingContext>,
        next: ResourceExecutionDelegate,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.execute(ctx, context, next))
    }
}
