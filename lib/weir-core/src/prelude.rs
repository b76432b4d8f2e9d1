//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types
//! for easy glob importing:
//!
//! ```ignore
//! use weir_core::prelude::*;
//! ```

pub use crate::{
    ActionContext, BoxFuture, Error, Features, FilterMetadata, Method, Request, RequestContext,
    RequestDelegate, ResourceExecutedContext, ResourceExecutingContext, ResourceExecutionDelegate,
    ResourceFilter, Response, Result, StatusCode,
};
