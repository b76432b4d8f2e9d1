//! Outer pipeline: resource filters around an action.

use std::sync::{Arc, PoisonError};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{Instrument, Level, debug, span};

use crate::{
    ActionContext, FilterMetadata, RequestContext, RequestDelegate, ResourceExecutedContext,
    ResourceExecutingContext, ResourceExecutionDelegate, ResourceFilter, Result,
    UnhandledErrorSlot, ValueProviderFactory,
};

type Filters = Arc<[Arc<dyn ResourceFilter>]>;

/// Runs resource filters, sorted by order, around an action.
///
/// Each filter receives a continuation running the filters after it and then
/// the action. A filter that returns without calling its continuation
/// short-circuits the rest.
///
/// # Example
///
/// ```ignore
/// use weir::{ActionContext, MiddlewareFilter, RequestContext, ResourceInvoker};
///
/// let invoker = ResourceInvoker::new(ActionContext::default(), action)
///     .with_filter(Arc::new(MiddlewareFilter::new(pipeline)));
///
/// let mut ctx = RequestContext::default();
/// invoker.invoke(&mut ctx).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ResourceInvoker {
    action_context: ActionContext,
    filters: Filters,
    value_provider_factories: Vec<Arc<dyn ValueProviderFactory>>,
    action: RequestDelegate,
}

impl ResourceInvoker {
    /// Create an invoker running `action` without filters.
    #[must_use]
    pub fn new(action_context: ActionContext, action: RequestDelegate) -> Self {
        Self {
            action_context,
            filters: Arc::new([]),
            value_provider_factories: Vec::new(),
            action,
        }
    }

    /// Add a filter. Filters with equal order keep insertion order.
    #[must_use]
    pub fn with_filter(self, filter: Arc<dyn ResourceFilter>) -> Self {
        self.with_filters([filter])
    }

    /// Add several filters.
    #[must_use]
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = Arc<dyn ResourceFilter>>) -> Self {
        let mut all = self.filters.to_vec();
        all.extend(filters);
        all.sort_by_key(|filter| filter.order());
        self.filters = all.into();
        self
    }

    /// Add a value provider factory exposed to filters.
    #[must_use]
    pub fn with_value_provider_factory(mut self, factory: Arc<dyn ValueProviderFactory>) -> Self {
        self.value_provider_factories.push(factory);
        self
    }

    /// Filters in execution order.
    #[must_use]
    pub fn filters(&self) -> &[Arc<dyn ResourceFilter>] {
        &self.filters
    }

    /// Runs the filters and the action against `ctx`.
    ///
    /// An error raised by a filter, or by the action and left unhandled by
    /// every filter, is returned.
    pub async fn invoke(&self, ctx: &mut RequestContext) -> Result<()> {
        let action = self.action_context.action_descriptor().name().to_string();
        let span = span!(Level::DEBUG, "resource_invoker", %action, filters = self.filters.len());

        async move {
            if self.filters.is_empty() {
                debug!("no resource filters, running action");
                return self.action.call(ctx).await;
            }

            let metadata = self
                .filters
                .iter()
                .map(|filter| Arc::clone(filter) as Arc<dyn FilterMetadata>)
                .collect();
            let context = Arc::new(ResourceExecutingContext::new(
                self.action_context.clone(),
                metadata,
                self.value_provider_factories.clone(),
            ));

            let stage = Stage {
                filters: Arc::clone(&self.filters),
                index: 0,
                context,
                action: self.action.clone(),
            };
            let mut executed = stage.run(ctx).await;

            executed.take_error().map_or(Ok(()), Err)
        }
        .instrument(span)
        .await
    }

    /// Wrap the invoker as a delegate, e.g. to end another pipeline.
    #[must_use]
    pub fn into_request_delegate(self) -> RequestDelegate {
        let invoker = Arc::new(self);
        RequestDelegate::new(move |ctx| {
            let invoker = Arc::clone(&invoker);
            Box::pin(async move { invoker.invoke(ctx).await })
        })
    }
}

/// Position in the filter chain.
#[derive(Clone)]
struct Stage {
    filters: Filters,
    index: usize,
    context: Arc<ResourceExecutingContext>,
    action: RequestDelegate,
}

impl Stage {
    fn next(&self) -> Self {
        Self {
            index: self.index + 1,
            ..self.clone()
        }
    }

    fn into_delegate(self) -> ResourceExecutionDelegate {
        ResourceExecutionDelegate::new(move |ctx| {
            let stage = self.clone();
            Box::pin(async move { stage.run(ctx).await })
        })
    }

    async fn run(self, ctx: &mut RequestContext) -> ResourceExecutedContext {
        let executed = ResourceExecutedContext::from_executing(&self.context);

        let Some(filter) = self.filters.get(self.index).cloned() else {
            return match self.action.call(ctx).await {
                Ok(()) => executed,
                Err(err) => {
                    debug!(error = %err, "action failed");
                    executed.with_error(err)
                }
            };
        };

        let called = Arc::new(AtomicBool::new(false));
        let unhandled = UnhandledErrorSlot::default();
        let next = {
            let called = Arc::clone(&called);
            let unhandled = Arc::clone(&unhandled);
            let rest = self.next().into_delegate();
            ResourceExecutionDelegate::new(move |ctx| {
                called.store(true, Ordering::SeqCst);
                let rest = rest.clone();
                let unhandled = Arc::clone(&unhandled);
                Box::pin(async move {
                    rest.call(ctx)
                        .await
                        .with_unhandled_error_slot(unhandled)
                })
            })
        };

        let result = filter
            .on_resource_execution(ctx, Arc::clone(&self.context), next)
            .await;

        let leftover = unhandled.lock().unwrap_or_else(PoisonError::into_inner).take();
        let mut executed = match result {
            Ok(()) => match leftover {
                Some(err) => {
                    debug!(filter = ?filter, error = %err, "resource filter left an error unhandled");
                    executed.with_error(err)
                }
                None => executed,
            },
            Err(err) => {
                debug!(filter = ?filter, error = %err, "resource filter failed");
                executed.with_error(err)
            }
        };
        if !called.load(Ordering::SeqCst) {
            debug!(filter = ?filter, "resource filter short-circuited the pipeline");
            executed.set_canceled(true);
        }
        executed
    }
}
