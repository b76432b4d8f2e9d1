//! Per-request feature map.
//!
//! Features are how stages of one request talk to each other: a stage stores
//! a value under its type, and any later stage (including one running in a
//! nested pipeline) can look it up by that type.
//!
//! # Example
//!
//! ```
//! use weir_core::Features;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct TenantId(u32);
//!
//! let mut features = Features::new();
//! assert!(features.insert(TenantId(1)).is_none());
//! assert_eq!(features.insert(TenantId(2)), Some(TenantId(1)));
//! assert_eq!(features.get::<TenantId>(), Some(&TenantId(2)));
//! ```

use http::Extensions;

/// Type-keyed map of request features.
///
/// Each type has at most one slot; inserting again replaces the previous
/// value.
#[derive(Debug, Clone, Default)]
pub struct Features {
    inner: Extensions,
}

impl Features {
    /// Creates an empty feature map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `feature` under its type, returning the value it replaced.
    pub fn insert<T>(&mut self, feature: T) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.inner.insert(feature)
    }

    /// Feature of type `T`, if set.
    #[must_use]
    pub fn get<T>(&self) -> Option<&T>
    where
        T: Send + Sync + 'static,
    {
        self.inner.get::<T>()
    }

    /// Mutable access to the feature of type `T`, if set.
    pub fn get_mut<T>(&mut self) -> Option<&mut T>
    where
        T: Send + Sync + 'static,
    {
        self.inner.get_mut::<T>()
    }

    /// Removes and returns the feature of type `T`.
    pub fn remove<T>(&mut self) -> Option<T>
    where
        T: Send + Sync + 'static,
    {
        self.inner.remove::<T>()
    }

    /// Returns `true` if a feature of type `T` is set.
    #[must_use]
    pub fn contains<T>(&self) -> bool
    where
        T: Send + Sync + 'static,
    {
        self.get::<T>().is_some()
    }

    /// Number of features set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no feature is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Removes every feature.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
