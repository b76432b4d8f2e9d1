//! Tower middleware layers for inner pipelines.
//!
//! Every layer here maps a [`RequestDelegate`](crate::RequestDelegate) to a
//! [`RequestDelegate`](crate::RequestDelegate), so it can be passed to
//! [`PipelineBuilder::layer`](crate::PipelineBuilder::layer) alone or stacked
//! with [`ServiceBuilder`].
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `middleware-metrics` | `MetricsLayer` |
//!
//! # Available Layers
//!
//! - [`LoggingLayer`] - Logs requests and outcomes using `tracing`
//! - `MetricsLayer` - Records pipeline metrics (counters, histograms, gauges)
//!
//! # Example
//!
//! ```ignore
//! use weir::middleware::{LoggingLayer, ServiceBuilder};
//! use weir::PipelineBuilder;
//!
//! let stack = ServiceBuilder::new()
//!     .layer(LoggingLayer::new())
//!     .into_inner();
//!
//! let mut builder = PipelineBuilder::new();
//! builder.layer(stack);
//! ```

mod logging;
#[cfg(feature = "middleware-metrics")]
mod metrics;

pub use logging::{LogLevel, LoggingLayer};
#[cfg(feature = "middleware-metrics")]
pub use metrics::MetricsLayer;

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
