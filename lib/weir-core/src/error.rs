//! Error types for weir.

use derive_more::{Display, Error, From};

/// Main error type for weir pipelines.
///
/// The same type flows through every stage: inner middleware, the outer
/// continuation and the action. Adapters forward it untouched.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// A required constructor argument was absent.
    #[display("argument `{name}` must not be null")]
    #[from(skip)]
    ArgumentNull {
        /// Name of the missing argument.
        name: &'static str,
    },

    /// A feature expected on the request context was not set.
    #[display("feature `{_0}` is not set on the request context")]
    #[from(skip)]
    MissingFeature(#[error(not(source))] &'static str),

    /// Failure raised by a request handler or middleware.
    #[display("handler error: {_0}")]
    #[from(skip)]
    Handler(#[error(not(source))] String),

    /// Handler-level HTTP failure.
    #[display("HTTP error {status}: {message}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an argument-null error.
    #[must_use]
    pub const fn argument_null(name: &'static str) -> Self {
        Self::ArgumentNull { name }
    }

    /// Create a handler error.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }

    /// Create an HTTP error from status code and message.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns `true` if this is an argument-null error.
    #[must_use]
    pub const fn is_argument_null(&self) -> bool {
        matches!(self, Self::ArgumentNull { .. })
    }

    /// Returns `true` if a request feature was missing.
    #[must_use]
    pub const fn is_missing_feature(&self) -> bool {
        matches!(self, Self::MissingFeature(_))
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
