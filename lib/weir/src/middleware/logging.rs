//! Request logging middleware.
//!
//! This middleware logs requests going through an inner pipeline using the
//! `tracing` crate.

use std::time::Instant;

use tower::Layer;
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{BoxFuture, RequestContext, RequestDelegate, Result};

/// Layer that adds request logging.
///
/// # Example
///
/// ```ignore
/// use weir::middleware::LoggingLayer;
/// use weir::PipelineBuilder;
///
/// let mut builder = PipelineBuilder::new();
/// builder.layer(LoggingLayer::new());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// Log level for the logging middleware.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogLevel {
    /// Log at debug level (request headers included).
    Debug,
    /// Log at info level (summary only).
    #[default]
    Info,
}

impl LoggingLayer {
    /// Create a new logging layer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging layer that logs at debug level.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }
}

impl Layer<RequestDelegate> for LoggingLayer {
    type Service = RequestDelegate;

    fn layer(&self, inner: RequestDelegate) -> Self::Service {
        let logging = Logging {
            inner,
            level: self.level,
        };
        RequestDelegate::new(move |ctx| logging.handle(ctx))
    }
}

/// Pipeline stage that logs the request and its outcome.
#[derive(Debug, Clone)]
struct Logging {
    inner: RequestDelegate,
    level: LogLevel,
}

impl Logging {
    fn handle<'a>(&self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<()>> {
        let method = ctx.request().method().clone();
        let path = ctx.request().path().to_string();
        let level = self.level;

        let span = span!(Level::INFO, "pipeline_request", %method, %path);

        let inner = self.inner.clone();
        Box::pin(
            async move {
                let start = Instant::now();

                match level {
                    LogLevel::Debug => {
                        debug!(
                            method = %method,
                            path = %path,
                            headers = ?ctx.request().headers(),
                            "handling request"
                        );
                    }
                    LogLevel::Info => {
                        info!(method = %method, path = %path, "handling request");
                    }
                }

                let result = inner.call(ctx).await;

                // Saturating conversion to u64 (truncates after ~584 million years)
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(()) => {
                        let status = ctx.response().status().as_u16();
                        if ctx.response().is_client_error() || ctx.response().is_server_error() {
                            warn!(status, elapsed_ms, "request completed with HTTP error");
                        } else {
                            info!(status, elapsed_ms, "request completed");
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, elapsed_ms, "request failed");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}
