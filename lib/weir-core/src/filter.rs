//! Resource-filter stage contracts.
//!
//! A resource filter wraps everything after it in the outer pipeline: it gets
//! a [`ResourceExecutingContext`] describing the action, and a
//! [`ResourceExecutionDelegate`] that runs the rest. Not calling the delegate
//! short-circuits the pipeline.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::BoxFuture;

use crate::{
    ActionContext, Error, Request, RequestContext, ResourceExecutionDelegate, Result,
};

/// Marker for anything that can sit in a filter list.
pub trait FilterMetadata: fmt::Debug + Send + Sync + 'static {
    /// Position in the pipeline; lower runs first (outermost).
    fn order(&self) -> i32 {
        0
    }
}

/// Filter surrounding the execution of the rest of the outer pipeline.
pub trait ResourceFilter: FilterMetadata {
    /// Runs this filter.
    ///
    /// Call `next` to run the remaining filters and the action; return
    /// without calling it to short-circuit.
    fn on_resource_execution<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        context: Arc<ResourceExecutingContext>,
        next: ResourceExecutionDelegate,
    ) -> BoxFuture<'a, Result<()>>;
}

/// Source of request values for the action (query string, form, ...).
pub trait ValueProviderFactory: fmt::Debug + Send + Sync + 'static {
    /// Short name of the value source (e.g. `"query"`).
    fn source(&self) -> &'static str;

    /// Key/value pairs this source provides for `request`.
    fn values(&self, request: &Request) -> Vec<(String, String)>;
}

/// Provides values from the URI query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryValueProviderFactory;

impl ValueProviderFactory for QueryValueProviderFactory {
    fn source(&self) -> &'static str {
        "query"
    }

    fn values(&self, request: &Request) -> Vec<(String, String)> {
        request
            .query()
            .and_then(|query| serde_urlencoded::from_str(query).ok())
            .unwrap_or_default()
    }
}

/// Snapshot handed to resource filters before the rest of the pipeline runs.
///
/// Shared as `Arc<ResourceExecutingContext>` and never mutated after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct ResourceExecutingContext {
    action: ActionContext,
    filters: Vec<Arc<dyn FilterMetadata>>,
    value_provider_factories: Vec<Arc<dyn ValueProviderFactory>>,
}

impl ResourceExecutingContext {
    /// Creates a context.
    #[must_use]
    pub fn new(
        action: ActionContext,
        filters: Vec<Arc<dyn FilterMetadata>>,
        value_provider_factories: Vec<Arc<dyn ValueProviderFactory>>,
    ) -> Self {
        Self {
            action,
            filters,
            value_provider_factories,
        }
    }

    /// Action being executed.
    #[must_use]
    pub const fn action(&self) -> &ActionContext {
        &self.action
    }

    /// Filters of the current pipeline.
    #[must_use]
    pub fn filters(&self) -> &[Arc<dyn FilterMetadata>] {
        &self.filters
    }

    /// Value provider factories available to the action.
    #[must_use]
    pub fn value_provider_factories(&self) -> &[Arc<dyn ValueProviderFactory>] {
        &self.value_provider_factories
    }

    /// First value for `key` across the value providers, in list order.
    #[must_use]
    pub fn value(&self, request: &Request, key: &str) -> Option<String> {
        self.value_provider_factories.iter().find_map(|factory| {
            factory
                .values(request)
                .into_iter()
                .find_map(|(k, v)| (k == key).then_some(v))
        })
    }
}

/// Slot receiving an error that left a [`ResourceExecutedContext`] unhandled.
pub type UnhandledErrorSlot = Arc<Mutex<Option<Error>>>;

/// Outcome of running the rest of the outer pipeline.
///
/// A filter owns the outcome its continuation returns. If the outcome is
/// dropped while it still holds an error not marked handled, the error moves
/// to the slot attached with [`with_unhandled_error_slot`](Self::with_unhandled_error_slot),
/// so the pipeline can raise it once the filter returns.
#[derive(Debug, Default)]
pub struct ResourceExecutedContext {
    action: ActionContext,
    filters: Vec<Arc<dyn FilterMetadata>>,
    canceled: bool,
    error: Option<Error>,
    error_handled: bool,
    unhandled_slot: Option<UnhandledErrorSlot>,
}

impl ResourceExecutedContext {
    /// Creates a successful outcome.
    #[must_use]
    pub fn new(action: ActionContext, filters: Vec<Arc<dyn FilterMetadata>>) -> Self {
        Self {
            action,
            filters,
            canceled: false,
            error: None,
            error_handled: false,
            unhandled_slot: None,
        }
    }

    /// Creates a successful outcome for the given executing context.
    #[must_use]
    pub fn from_executing(context: &ResourceExecutingContext) -> Self {
        Self::new(context.action.clone(), context.filters.clone())
    }

    /// Records an error raised by a later stage.
    #[must_use]
    pub fn with_error(mut self, error: Error) -> Self {
        self.error = Some(error);
        self
    }

    /// Attaches the slot receiving the error if it is dropped unhandled.
    #[must_use]
    pub fn with_unhandled_error_slot(mut self, slot: UnhandledErrorSlot) -> Self {
        self.unhandled_slot = Some(slot);
        self
    }

    /// Action that was executed.
    #[must_use]
    pub const fn action(&self) -> &ActionContext {
        &self.action
    }

    /// Filters of the pipeline.
    #[must_use]
    pub fn filters(&self) -> &[Arc<dyn FilterMetadata>] {
        &self.filters
    }

    /// Returns `true` if a later filter short-circuited the pipeline.
    #[must_use]
    pub const fn canceled(&self) -> bool {
        self.canceled
    }

    /// Marks the outcome as short-circuited.
    pub fn set_canceled(&mut self, canceled: bool) {
        self.canceled = canceled;
    }

    /// Error raised by a later stage, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Takes the error out of the outcome; the caller becomes responsible for it.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Returns `true` if a filter dealt with the error.
    #[must_use]
    pub const fn error_handled(&self) -> bool {
        self.error_handled
    }

    /// Marks the error as dealt with; it will not be raised again.
    pub fn set_error_handled(&mut self, handled: bool) {
        self.error_handled = handled;
    }

    /// Returns `true` if an error is present and nobody handled it.
    #[must_use]
    pub const fn has_unhandled_error(&self) -> bool {
        self.error.is_some() && !self.error_handled
    }
}

impl Drop for ResourceExecutedContext {
    fn drop(&mut self) {
        if self.error_handled {
            return;
        }
        if let (Some(slot), Some(error)) = (self.unhandled_slot.take(), self.error.take()) {
            *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
        }
    }
}
