//! Nested middleware pipelines inside a resource-filter stage.
//!
//! A [`MiddlewareFilter`] is a resource filter whose body is an inner
//! middleware pipeline. When it runs, the outer filter context and
//! continuation are published on the request as a
//! [`MiddlewareFilterFeature`]; the pipelines built by
//! [`MiddlewarePipelines`] end by picking that feature up and resuming the
//! outer pipeline.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use weir::middleware::LoggingLayer;
//! use weir::prelude::*;
//!
//! #[derive(Default)]
//! struct Logged;
//!
//! impl PipelineConfiguration for Logged {
//!     fn configure(&self, builder: &mut PipelineBuilder) {
//!         builder.layer(LoggingLayer::new());
//!     }
//! }
//!
//! let pipelines = MiddlewarePipelines::new();
//! let filter = MiddlewareFilterFactory::<Logged>::new().create_filter(&pipelines);
//!
//! let invoker = ResourceInvoker::new(ActionContext::default(), action).with_filter(filter);
//! invoker.invoke(&mut RequestContext::default()).await?;
//! ```

mod config;
mod factory;
mod invoker;
pub mod middleware;
mod middleware_filter;
mod pipeline;
mod pipelines;
pub mod prelude;

pub use config::{FilterConfig, FilterConfigBuilder};
pub use factory::MiddlewareFilterFactory;
pub use invoker::ResourceInvoker;
pub use middleware_filter::{MiddlewareFilter, MiddlewareFilterFeature};
pub use pipeline::PipelineBuilder;
pub use pipelines::{MiddlewarePipelines, PipelineConfiguration};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use weir_core::{
    ActionContext, ActionDescriptor, BoxFuture, ConnectionInfo, Error, Features, FilterMetadata,
    QueryValueProviderFactory, Request, RequestBuilder, RequestContext, RequestDelegate,
    ResourceExecutedContext, ResourceExecutingContext, ResourceExecutionDelegate, ResourceFilter,
    Response, Result, RouteData, UnhandledErrorSlot, ValueProviderFactory,
};

// Re-export http types for methods, status codes and headers
pub use weir_core::{Method, StatusCode, Uri, header};
