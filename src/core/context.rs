//! Per-request context.
//!
//! A [`RequestContext`] carries the request identifier, the injected
//! dependencies a controller may look up by name, and the flash messages
//! that survive until the next request.

use crate::core::error::LookupError;
use crate::session::FlashBag;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Create a new random request ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a request ID from a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Named collaborators injected into a controller.
#[derive(Clone, Default)]
pub struct Dependencies {
    items: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Dependencies {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a dependency, replacing any previous one under the same key.
    pub fn insert<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.items.insert(key.into(), Arc::new(value));
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with<T>(mut self, key: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.insert(key, value);
        self
    }

    /// Look up a dependency by key and type.
    pub fn get<T>(&self, key: &str) -> Result<Arc<T>, LookupError>
    where
        T: Any + Send + Sync,
    {
        let item = self.items.get(key).ok_or_else(|| LookupError::NotFound {
            kind: "dependency",
            name: key.to_string(),
        })?;

        Arc::clone(item)
            .downcast::<T>()
            .map_err(|_| LookupError::TypeMismatch {
                kind: "dependency",
                name: key.to_string(),
            })
    }

    /// Check if a dependency is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Number of registered dependencies.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the container is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.items.keys().collect();
        keys.sort();
        f.debug_struct("Dependencies").field("keys", &keys).finish()
    }
}

/// State shared by everything handling one request.
#[derive(Debug, Default)]
pub struct RequestContext {
    /// Identifier used in log lines.
    pub id: RequestId,
    /// Injected collaborators.
    pub dependencies: Dependencies,
    /// Flash message carried to the next request.
    pub flash: FlashBag,
}

impl RequestContext {
    /// Create a context with the given dependencies.
    pub fn new(dependencies: Dependencies) -> Self {
        Self {
            id: RequestId::new(),
            dependencies,
            flash: FlashBag::default(),
        }
    }

    /// Shorthand for `self.dependencies.get`.
    pub fn dependency<T>(&self, key: &str) -> Result<Arc<T>, LookupError>
    where
        T: Any + Send + Sync,
    {
        self.dependencies.get(key)
    }
}
