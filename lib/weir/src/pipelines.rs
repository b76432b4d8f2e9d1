//! Pipeline configurations and the cache of built inner pipelines.

use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::config::FilterConfig;
use crate::middleware_filter::MiddlewareFilterFeature;
use crate::pipeline::PipelineBuilder;
use crate::{Error, RequestDelegate};

/// Describes the middleware of an inner pipeline.
///
/// The pipeline always ends by resuming the outer pipeline, so any terminal
/// set with [`PipelineBuilder::run`] is replaced.
///
/// # Example
///
/// ```ignore
/// use weir::middleware::LoggingLayer;
/// use weir::{PipelineBuilder, PipelineConfiguration};
///
/// #[derive(Default)]
/// struct Logged;
///
/// impl PipelineConfiguration for Logged {
///     fn configure(&self, builder: &mut PipelineBuilder) {
///         builder.layer(LoggingLayer::new());
///     }
/// }
/// ```
pub trait PipelineConfiguration: Send + Sync + 'static {
    /// Adds middleware to `builder`.
    fn configure(&self, builder: &mut PipelineBuilder);
}

/// Builds inner pipelines and caches them per configuration type.
#[derive(Debug, Default)]
pub struct MiddlewarePipelines {
    config: FilterConfig,
    cache: Mutex<HashMap<TypeId, RequestDelegate>>,
}

impl MiddlewarePipelines {
    /// Create an empty cache with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache building pipelines with `config`.
    #[must_use]
    pub fn with_config(config: FilterConfig) -> Self {
        Self {
            config,
            cache: Mutex::default(),
        }
    }

    /// Configuration used to build pipelines.
    #[must_use]
    pub const fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Pipeline for configuration type `C`, built on first use.
    pub fn get<C>(&self) -> RequestDelegate
    where
        C: PipelineConfiguration + Default,
    {
        self.get_or_build(&C::default())
    }

    /// Pipeline for the type of `configuration`, built from it on first use.
    ///
    /// Later calls for the same type return the cached pipeline and ignore
    /// `configuration`.
    pub fn get_or_build<C>(&self, configuration: &C) -> RequestDelegate
    where
        C: PipelineConfiguration,
    {
        let key = TypeId::of::<C>();
        if let Some(pipeline) = self.lock().get(&key) {
            debug!(configuration = type_name::<C>(), "reusing inner pipeline");
            return pipeline.clone();
        }

        // Built outside the lock: configuration code may request other pipelines.
        let pipeline = self.build_pipeline(configuration);
        debug!(configuration = type_name::<C>(), "built inner pipeline");

        self.lock().entry(key).or_insert(pipeline).clone()
    }

    /// Builds a fresh pipeline from `configuration`, bypassing the cache.
    pub fn build_pipeline(&self, configuration: &dyn PipelineConfiguration) -> RequestDelegate {
        let mut builder = PipelineBuilder::with_config(&self.config);
        configuration.configure(&mut builder);
        builder.run(resume_outer_pipeline());
        builder.build()
    }

    /// Number of cached pipelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no pipeline was built yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TypeId, RequestDelegate>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Terminal of every configured inner pipeline.
///
/// Fetches the [`MiddlewareFilterFeature`] and runs the outer continuation.
/// An unhandled error from the rest of the outer pipeline is returned to the
/// inner middleware.
fn resume_outer_pipeline() -> RequestDelegate {
    RequestDelegate::new(|ctx| {
        Box::pin(async move {
            let Some(next) = ctx
                .features()
                .get::<MiddlewareFilterFeature>()
                .map(|feature| feature.resource_execution_delegate().clone())
            else {
                warn!("inner pipeline ended outside of a middleware filter");
                return Err(Error::MissingFeature("MiddlewareFilterFeature"));
            };

            debug!("resuming outer pipeline");
            let mut executed = next.call(ctx).await;

            if executed.has_unhandled_error()
                && let Some(err) = executed.take_error()
            {
                debug!(error = %err, "outer pipeline failed");
                return Err(err);
            }
            Ok(())
        })
    })
}
