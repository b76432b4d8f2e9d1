//! Metrics middleware using the metrics crate facade.
//!
//! This middleware records inner pipeline metrics using the `metrics` crate,
//! which allows integration with various metrics backends (Prometheus, `StatsD`, etc.).

use std::time::Instant;

use tower::Layer;

use crate::{BoxFuture, RequestContext, RequestDelegate, Result};

/// Labels used for metrics.
const LABEL_METHOD: &str = "method";
const LABEL_STATUS: &str = "status";

/// Metric names.
const METRIC_REQUESTS_TOTAL: &str = "weir_pipeline_requests_total";
const METRIC_REQUEST_DURATION: &str = "weir_pipeline_request_duration_seconds";
const METRIC_REQUESTS_IN_FLIGHT: &str = "weir_pipeline_requests_in_flight";

/// Layer that records pipeline metrics.
///
/// Records the following metrics:
/// - `weir_pipeline_requests_total` (counter): Total number of requests, labeled by method and status
/// - `weir_pipeline_request_duration_seconds` (histogram): Request duration in seconds
/// - `weir_pipeline_requests_in_flight` (gauge): Number of requests currently in flight
///
/// # Example
///
/// ```ignore
/// use weir::middleware::MetricsLayer;
/// use weir::PipelineBuilder;
///
/// let mut builder = PipelineBuilder::new();
/// builder.layer(MetricsLayer::new());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsLayer {
    _private: (),
}

impl MetricsLayer {
    /// Create a new metrics layer.
    #[must_use]
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Layer<RequestDelegate> for MetricsLayer {
    type Service = RequestDelegate;

    fn layer(&self, inner: RequestDelegate) -> Self::Service {
        let metrics = Metrics { inner };
        RequestDelegate::new(move |ctx| metrics.handle(ctx))
    }
}

/// Pipeline stage that records metrics.
#[derive(Debug, Clone)]
struct Metrics {
    inner: RequestDelegate,
}

impl Metrics {
    fn handle<'a>(&self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<()>> {
        let method = ctx.request().method().to_string();
        let start = Instant::now();
        let inner = self.inner.clone();

        metrics::gauge!(METRIC_REQUESTS_IN_FLIGHT).increment(1.0);

        Box::pin(async move {
            let result = inner.call(ctx).await;

            metrics::gauge!(METRIC_REQUESTS_IN_FLIGHT).decrement(1.0);

            let duration = start.elapsed().as_secs_f64();
            metrics::histogram!(METRIC_REQUEST_DURATION, LABEL_METHOD => method.clone())
                .record(duration);

            let status = match &result {
                Ok(()) => ctx.response().status().as_u16().to_string(),
                Err(_) => "error".to_string(),
            };

            metrics::counter!(
                METRIC_REQUESTS_TOTAL,
                LABEL_METHOD => method,
                LABEL_STATUS => status
            )
            .increment(1);

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use http::StatusCode;

    use super::*;
    use crate::Error;

    fn counting(status: StatusCode, calls: &Arc<AtomicU32>) -> RequestDelegate {
        let calls = Arc::clone(calls);
        RequestDelegate::new(move |ctx| {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                ctx.response_mut().set_status(status);
                Ok(())
            })
        })
    }

    #[test]
    fn metrics_layer_default() {
        let _layer = MetricsLayer::default();
    }

    #[tokio::test]
    async fn metrics_stage_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let pipeline = MetricsLayer::new().layer(counting(StatusCode::OK, &calls));

        let mut ctx = RequestContext::default();
        pipeline.call(&mut ctx).await.expect("inner succeeds");

        assert_eq!(ctx.response().status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn metrics_stage_error_response() {
        let calls = Arc::new(AtomicU32::new(0));
        let pipeline = MetricsLayer::new().layer(counting(StatusCode::INTERNAL_SERVER_ERROR, &calls));

        let mut ctx = RequestContext::default();
        pipeline.call(&mut ctx).await.expect("inner succeeds");

        assert_eq!(ctx.response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn metrics_stage_error() {
        let pipeline = MetricsLayer::new()
            .layer(RequestDelegate::new(|_| Box::pin(async { Err(Error::handler("down")) })));

        let mut ctx = RequestContext::default();
        let result = pipeline.call(&mut ctx).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn metrics_stage_multiple_requests() {
        let calls = Arc::new(AtomicU32::new(0));
        let pipeline = MetricsLayer::new().layer(counting(StatusCode::OK, &calls));

        for _ in 0..5 {
            let mut ctx = RequestContext::default();
            pipeline.call(&mut ctx).await.expect("inner succeeds");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }
}
