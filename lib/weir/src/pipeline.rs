//! Builder for inner middleware pipelines.
//!
//! Middleware are Tower layers over [`RequestDelegate`]: a layer receives the
//! delegate for the rest of the chain and returns the delegate for its own
//! stage. Layers are applied in order: first added = outermost.
//!
//! # Example
//!
//! ```ignore
//! use weir::middleware::LoggingLayer;
//! use weir::{PipelineBuilder, RequestDelegate, StatusCode};
//!
//! let mut builder = PipelineBuilder::new();
//! builder
//!     .layer(LoggingLayer::new())
//!     .use_fn(|ctx, next| {
//!         Box::pin(async move {
//!             if ctx.request().header("x-api-key").is_none() {
//!                 ctx.response_mut().set_status(StatusCode::UNAUTHORIZED);
//!                 return Ok(());
//!             }
//!             next.call(ctx).await
//!         })
//!     })
//!     .run(RequestDelegate::noop());
//! let pipeline = builder.build();
//! ```

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use tower::Layer;
use tower::layer::layer_fn;

use crate::config::FilterConfig;
use crate::{BoxFuture, Features, RequestContext, RequestDelegate, Result};

type BoxedLayer = Arc<dyn Fn(RequestDelegate) -> RequestDelegate + Send + Sync>;

/// Builder composing middleware into a single [`RequestDelegate`].
#[derive(Clone)]
pub struct PipelineBuilder {
    layers: Vec<BoxedLayer>,
    terminal: Option<RequestDelegate>,
    fallback_status: StatusCode,
    properties: Features,
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("layers_count", &self.layers.len())
            .field("has_terminal", &self.terminal.is_some())
            .field("fallback_status", &self.fallback_status)
            .field("properties", &self.properties)
            .finish()
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    /// Create an empty builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&FilterConfig::default())
    }

    /// Create an empty builder using the fallback status of `config`.
    #[must_use]
    pub fn with_config(config: &FilterConfig) -> Self {
        Self {
            layers: Vec::new(),
            terminal: None,
            fallback_status: config.fallback_status,
            properties: Features::new(),
        }
    }

    /// Create an empty builder sharing this builder's properties.
    #[must_use]
    pub fn new_nested(&self) -> Self {
        Self {
            layers: Vec::new(),
            terminal: None,
            fallback_status: self.fallback_status,
            properties: self.properties.clone(),
        }
    }

    /// Add a Tower layer to the pipeline.
    ///
    /// Composite layers built with [`tower::ServiceBuilder`] are accepted as
    /// long as every layer maps [`RequestDelegate`] to [`RequestDelegate`].
    pub fn layer<L>(&mut self, layer: L) -> &mut Self
    where
        L: Layer<RequestDelegate, Service = RequestDelegate> + Send + Sync + 'static,
    {
        self.layers
            .push(Arc::new(move |next: RequestDelegate| layer.layer(next)));
        self
    }

    /// Add middleware written as an async function of the context and the
    /// rest of the chain.
    ///
    /// Returning without calling `next` short-circuits the pipeline.
    pub fn use_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestContext, RequestDelegate) -> BoxFuture<'a, Result<()>>
            + Send
            + Sync
            + 'static,
    {
        let f = Arc::new(f);
        self.layer(layer_fn(move |next: RequestDelegate| {
            let f = Arc::clone(&f);
            RequestDelegate::new(move |ctx| (*f)(ctx, next.clone()))
        }))
    }

    /// Set the delegate ending the pipeline, replacing any previous one.
    pub fn run(&mut self, terminal: RequestDelegate) -> &mut Self {
        self.terminal = Some(terminal);
        self
    }

    /// Properties shared with configuration code.
    #[must_use]
    pub const fn properties(&self) -> &Features {
        &self.properties
    }

    /// Mutable access to the shared properties.
    pub fn properties_mut(&mut self) -> &mut Features {
        &mut self.properties
    }

    /// Number of middleware added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if no middleware was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Compose the pipeline.
    ///
    /// Without a terminal, the pipeline ends by setting the fallback status.
    #[must_use]
    pub fn build(&self) -> RequestDelegate {
        let terminal = self
            .terminal
            .clone()
            .unwrap_or_else(|| fallback(self.fallback_status));

        self.layers
            .iter()
            .rev()
            .fold(terminal, |next, layer| layer(next))
    }
}

fn fallback(status: StatusCode) -> RequestDelegate {
    RequestDelegate::new(move |ctx| {
        Box::pin(async move {
            ctx.response_mut().set_status(status);
            Ok(())
        })
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tower::ServiceBuilder;

    use super::*;

    /// Layer recording its name before and after the rest of the chain.
    #[derive(Clone)]
    struct Trace {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Layer<RequestDelegate> for Trace {
        type Service = RequestDelegate;

        fn layer(&self, next: RequestDelegate) -> RequestDelegate {
            let this = self.clone();
            RequestDelegate::new(move |ctx| {
                let this = this.clone();
                let next = next.clone();
                Box::pin(async move {
                    this.push(format!("{}:before", this.name));
                    let result = next.call(ctx).await;
                    this.push(format!("{}:after", this.name));
                    result
                })
            })
        }
    }

    impl Trace {
        fn push(&self, entry: String) {
            self.log
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(entry);
        }
    }

    fn entries(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        log.lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    #[tokio::test]
    async fn empty_pipeline_sets_fallback_status() {
        let pipeline = PipelineBuilder::new().build();

        let mut ctx = RequestContext::default();
        pipeline.call(&mut ctx).await.expect("fallback succeeds");

        assert_eq!(ctx.response().status(), StatusCode::NOT_FOUND);
        assert!(!ctx.response().has_started());
    }

    #[tokio::test]
    async fn fallback_status_comes_from_config() {
        let config = FilterConfig::builder()
            .fallback_status(StatusCode::NO_CONTENT)
            .build();
        let pipeline = PipelineBuilder::with_config(&config).build();

        let mut ctx = RequestContext::default();
        pipeline.call(&mut ctx).await.expect("fallback succeeds");

        assert_eq!(ctx.response().status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn first_layer_is_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut builder = PipelineBuilder::new();
        builder
            .layer(Trace {
                name: "outer",
                log: Arc::clone(&log),
            })
            .layer(Trace {
                name: "inner",
                log: Arc::clone(&log),
            })
            .run(RequestDelegate::noop());

        let mut ctx = RequestContext::default();
        builder.build().call(&mut ctx).await.expect("pipeline succeeds");

        assert_eq!(
            entries(&log),
            ["outer:before", "inner:before", "inner:after", "outer:after"]
        );
    }

    #[tokio::test]
    async fn service_builder_stack_is_a_layer() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let stack = ServiceBuilder::new()
            .layer(Trace {
                name: "a",
                log: Arc::clone(&log),
            })
            .layer(Trace {
                name: "b",
                log: Arc::clone(&log),
            })
            .into_inner();

        let mut builder = PipelineBuilder::new();
        builder.layer(stack).run(RequestDelegate::noop());

        let mut ctx = RequestContext::default();
        builder.build().call(&mut ctx).await.expect("pipeline succeeds");

        assert_eq!(entries(&log), ["a:before", "b:before", "b:after", "a:after"]);
    }

    #[tokio::test]
    async fn run_replaces_terminal() {
        let mut builder = PipelineBuilder::new();
        builder
            .run(RequestDelegate::new(|ctx| {
                Box::pin(async move {
                    ctx.response_mut().write_str("first");
                    Ok(())
                })
            }))
            .run(RequestDelegate::new(|ctx| {
                Box::pin(async move {
                    ctx.response_mut().write_str("second");
                    Ok(())
                })
            }));

        let mut ctx = RequestContext::default();
        builder.build().call(&mut ctx).await.expect("pipeline succeeds");

        assert_eq!(ctx.response().text().expect("utf-8"), "second");
    }

    #[tokio::test]
    async fn use_fn_can_short_circuit() {
        let mut builder = PipelineBuilder::new();
        builder
            .use_fn(|ctx, _next| {
                Box::pin(async move {
                    ctx.response_mut()
                        .set_status(StatusCode::UNAUTHORIZED)
                        .write_str("denied");
                    Ok(())
                })
            })
            .run(RequestDelegate::new(|ctx| {
                Box::pin(async move {
                    ctx.response_mut().write_str("unreachable");
                    Ok(())
                })
            }));

        let mut ctx = RequestContext::default();
        builder.build().call(&mut ctx).await.expect("pipeline succeeds");

        assert_eq!(ctx.response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ctx.response().text().expect("utf-8"), "denied");
    }

    #[tokio::test]
    async fn use_fn_can_call_through() {
        let mut builder = PipelineBuilder::new();
        builder
            .use_fn(|ctx, next| {
                Box::pin(async move {
                    ctx.response_mut().write_str("<");
                    next.call(ctx).await?;
                    ctx.response_mut().write_str(">");
                    Ok(())
                })
            })
            .run(RequestDelegate::new(|ctx| {
                Box::pin(async move {
                    ctx.response_mut().write_str("body");
                    Ok(())
                })
            }));

        let mut ctx = RequestContext::default();
        builder.build().call(&mut ctx).await.expect("pipeline succeeds");

        assert_eq!(ctx.response().text().expect("utf-8"), "<body>");
    }

    #[tokio::test]
    async fn middleware_can_rewrite_request() {
        let mut builder = PipelineBuilder::new();
        builder
            .use_fn(|ctx, next| {
                Box::pin(async move {
                    ctx.request_mut().headers_mut().insert(
                        http::header::HeaderName::from_static("x-tenant"),
                        http::header::HeaderValue::from_static("acme"),
                    );
                    next.call(ctx).await
                })
            })
            .run(RequestDelegate::new(|ctx| {
                Box::pin(async move {
                    let tenant = ctx.request().header("x-tenant").unwrap_or("none").to_string();
                    ctx.response_mut().write_str(&tenant);
                    Ok(())
                })
            }));

        let mut ctx = RequestContext::default();
        builder.build().call(&mut ctx).await.expect("pipeline succeeds");

        assert_eq!(ctx.response().text().expect("utf-8"), "acme");
    }

    #[test]
    fn nested_builder_shares_properties_only() {
        #[derive(Debug, Clone, PartialEq)]
        struct AppName(&'static str);

        let mut builder = PipelineBuilder::new();
        builder.properties_mut().insert(AppName("demo"));
        builder.use_fn(|ctx, next| next.call(ctx));

        let nested = builder.new_nested();
        assert_eq!(nested.properties().get::<AppName>(), Some(&AppName("demo")));
        assert!(nested.is_empty());
        assert_eq!(builder.len(), 1);
    }
}
