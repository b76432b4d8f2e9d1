//! Core types and traits for weir nested middleware pipelines.
//!
//! This crate provides the foundational types used by weir:
//! - [`RequestContext`] - Per-request state: [`Request`], [`Response`], [`Features`]
//! - [`Features`] - Type-keyed feature map for cross-stage communication
//! - [`RequestDelegate`] - One stage of a middleware pipeline
//! - [`ResourceFilter`] and [`ResourceExecutionDelegate`] - Resource-filter stage contracts
//! - [`ResourceExecutingContext`] and [`ResourceExecutedContext`] - Filter stage snapshots
//! - [`ActionContext`], [`ActionDescriptor`], [`RouteData`] - Action metadata
//! - [`Error`] and [`Result`] - Error handling
//! - [`StatusCode`], [`Method`] and [`header`] - Re-exported from the `http` crate

mod action;
mod context;
mod delegate;
mod error;
mod features;
mod filter;
pub mod prelude;
mod request;
mod response;

pub use action::{ActionContext, ActionDescriptor, RouteData};
pub use context::{ConnectionInfo, RequestContext};
pub use delegate::{RequestDelegate, ResourceExecutionDelegate};
pub use error::{Error, Result};
pub use features::Features;
pub use filter::{
    FilterMetadata, QueryValueProviderFactory, ResourceExecutedContext, ResourceExecutingContext,
    ResourceFilter, UnhandledErrorSlot, ValueProviderFactory,
};
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types for methods, status codes and headers
pub use http::{Method, StatusCode, Uri, header};

// Re-export the boxed future used by delegates and filters
pub use futures_util::future::BoxFuture;
