//! Action metadata carried through the resource-filter stage.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Route values captured for the current request (e.g. `controller`, `id`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteData {
    values: BTreeMap<String, String>,
}

impl RouteData {
    /// Creates empty route data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a route value, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Route value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Iterates over route values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for RouteData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Static description of the action selected for a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionDescriptor {
    /// Unique action identifier.
    pub id: String,
    /// Human-readable name, used in logs.
    pub display_name: Option<String>,
}

impl ActionDescriptor {
    /// Creates a descriptor with the given id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Display name, falling back to the id.
    #[must_use]
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

/// Route data and the selected action for one request.
#[derive(Debug, Clone, Default)]
pub struct ActionContext {
    route_data: RouteData,
    action_descriptor: Arc<ActionDescriptor>,
}

impl ActionContext {
    /// Creates an action context.
    #[must_use]
    pub fn new(route_data: RouteData, action_descriptor: Arc<ActionDescriptor>) -> Self {
        Self {
            route_data,
            action_descriptor,
        }
    }

    /// Route data.
    #[must_use]
    pub const fn route_data(&self) -> &RouteData {
        &self.route_data
    }

    /// Selected action.
    #[must_use]
    pub fn action_descriptor(&self) -> &Arc<ActionDescriptor> {
        &self.action_descriptor
    }
}
