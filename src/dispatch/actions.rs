//! Named action handlers of a controller.

use crate::core::types::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Handler invoked for one action, with the request's positional parameters.
pub type ActionHandler<C> = Arc<dyn Fn(&mut C, &[Value]) -> anyhow::Result<()> + Send + Sync>;

/// A controller exposes its actions through an [`ActionTable`].
pub trait Controller: Sized {
    /// Build the table of actions this controller answers to.
    fn actions() -> ActionTable<Self>;
}

/// Action name → handler lookup.
pub struct ActionTable<C> {
    actions: IndexMap<String, ActionHandler<C>>,
}

impl<C> ActionTable<C> {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            actions: IndexMap::new(),
        }
    }

    /// Register a handler, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut C, &[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(handler));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut C, &[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(name, handler);
        self
    }

    /// Get the handler for an action.
    pub fn get(&self, name: &str) -> Option<&ActionHandler<C>> {
        self.actions.get(name)
    }

    /// Check if an action is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Get all action names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(|s| s.as_str())
    }

    /// Unregister an action.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.actions.shift_remove(name).is_some()
    }

    /// Get the total number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<C> Default for ActionTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for ActionTable<C> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
        }
    }
}

impl<C> fmt::Debug for ActionTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionTable")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        total: i64,
    }

    fn add(counter: &mut Counter, params: &[Value]) -> anyhow::Result<()> {
        for p in params {
            counter.total += p.as_integer().unwrap_or(0);
        }
        Ok(())
    }

    #[test]
    fn test_register_and_invoke() {
        let table = ActionTable::new().with("add", add);
        assert!(table.contains("add"));

        let mut counter = Counter::default();
        let handler = table.get("add").unwrap();
        handler(&mut counter, &[Value::from(2), Value::from(3)]).unwrap();
        assert_eq!(counter.total, 5);
    }

    #[test]
    fn test_register_replaces() {
        let mut table: ActionTable<Counter> = ActionTable::new();
        table.register("reset", |c, _| {
            c.total = 1;
            Ok(())
        });
        table.register("reset", |c, _| {
            c.total = 0;
            Ok(())
        });
        assert_eq!(table.len(), 1);

        let mut counter = Counter { total: 9 };
        (table.get("reset").unwrap())(&mut counter, &[]).unwrap();
        assert_eq!(counter.total, 0);
    }

    #[test]
    fn test_names_and_unregister() {
        let mut table = ActionTable::new().with("a", add).with("b", add);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(table.unregister("a"));
        assert!(!table.contains("a"));
        assert!(!table.unregister("a"));
    }
}
