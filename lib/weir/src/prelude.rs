//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types
//! for easy glob importing:
//!
//! ```ignore
//! use weir::prelude::*;
//! ```

pub use crate::{
    ActionContext, BoxFuture, Error, FilterConfig, MiddlewareFilter, MiddlewareFilterFactory,
    MiddlewareFilterFeature, MiddlewarePipelines, PipelineBuilder, PipelineConfiguration,
    RequestContext, RequestDelegate, ResourceExecutedContext, ResourceExecutingContext,
    ResourceExecutionDelegate, ResourceFilter, ResourceInvoker, Result, StatusCode,
};
