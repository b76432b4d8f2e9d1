//! Factory producing [`MiddlewareFilter`]s for a pipeline configuration.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::config::FilterConfig;
use crate::middleware_filter::MiddlewareFilter;
use crate::pipelines::{MiddlewarePipelines, PipelineConfiguration};

/// Creates middleware filters running the pipeline described by `C`.
///
/// When the configuration is reusable (the default), the first filter created
/// is kept and handed out on every later call.
///
/// # Example
///
/// ```ignore
/// use weir::{MiddlewareFilterFactory, MiddlewarePipelines};
///
/// let pipelines = MiddlewarePipelines::new();
/// let factory = MiddlewareFilterFactory::<MyPipeline>::new();
/// let filter = factory.create_filter(&pipelines);
/// ```
pub struct MiddlewareFilterFactory<C> {
    config: FilterConfig,
    filter: OnceLock<Arc<MiddlewareFilter>>,
    _configuration: PhantomData<fn() -> C>,
}

impl<C> fmt::Debug for MiddlewareFilterFactory<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareFilterFactory")
            .field("configuration", &type_name::<C>())
            .field("config", &self.config)
            .field("created", &self.filter.get().is_some())
            .finish()
    }
}

impl<C> Default for MiddlewareFilterFactory<C> {
    fn default() -> Self {
        Self::with_config(FilterConfig::default())
    }
}

impl<C> MiddlewareFilterFactory<C> {
    /// Create a factory with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory with `config`.
    #[must_use]
    pub const fn with_config(config: FilterConfig) -> Self {
        Self {
            config,
            filter: OnceLock::new(),
            _configuration: PhantomData,
        }
    }

    /// Factory configuration.
    #[must_use]
    pub const fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Returns `true` if created filters may be shared.
    #[must_use]
    pub const fn is_reusable(&self) -> bool {
        self.config.reusable
    }
}

impl<C> MiddlewareFilterFactory<C>
where
    C: PipelineConfiguration + Default,
{
    /// Creates a filter running the pipeline for `C`, fetched from `pipelines`.
    ///
    /// A reusable factory returns the same instance on every call, whatever
    /// `pipelines` is passed later.
    pub fn create_filter(&self, pipelines: &MiddlewarePipelines) -> Arc<MiddlewareFilter> {
        if !self.config.reusable {
            return Arc::new(self.build(pipelines));
        }
        Arc::clone(self.filter.get_or_init(|| Arc::new(self.build(pipelines))))
    }

    fn build(&self, pipelines: &MiddlewarePipelines) -> MiddlewareFilter {
        debug!(configuration = type_name::<C>(), "creating middleware filter");
        MiddlewareFilter::new(pipelines.get::<C>()).with_config(&self.config)
    }
}
