//! Filter configuration types.

use http::StatusCode;

/// Configuration for middleware filters and the pipelines they run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Position of the filter in the outer pipeline; lower runs first.
    pub order: i32,
    /// Whether a factory may hand out the same filter instance every time.
    pub reusable: bool,
    /// Status set by an inner pipeline that has no terminal delegate.
    pub fallback_status: StatusCode,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            order: 0,
            reusable: true,
            fallback_status: StatusCode::NOT_FOUND,
        }
    }
}

impl FilterConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder::default()
    }
}

/// Builder for [`FilterConfig`].
#[derive(Debug, Clone, Default)]
pub struct FilterConfigBuilder {
    order: Option<i32>,
    reusable: Option<bool>,
    fallback_status: Option<StatusCode>,
}

impl FilterConfigBuilder {
    /// Set the filter order.
    #[must_use]
    pub const fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Set whether filter instances may be reused.
    #[must_use]
    pub const fn reusable(mut self, reusable: bool) -> Self {
        self.reusable = Some(reusable);
        self
    }

    /// Set the status used when an inner pipeline has no terminal.
    #[must_use]
    pub const fn fallback_status(mut self, status: StatusCode) -> Self {
        self.fallback_status = Some(status);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> FilterConfig {
        let defaults = FilterConfig::default();
        FilterConfig {
            order: self.order.unwrap_or(defaults.order),
            reusable: self.reusable.unwrap_or(defaults.reusable),
            fallback_status: self.fallback_status.unwrap_or(defaults.fallback_status),
        }
    }
}
