//! Rule registry mapping rule kinds to predicates.

use crate::core::types::Value;
use crate::validation::rules::Rule;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Predicate implementing one rule kind.
pub type RuleFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// What happens when a field names a rule kind that is not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownRulePolicy {
    /// Unregistered kinds are satisfied.
    #[default]
    Pass,
    /// Unregistered kinds are violated.
    Fail,
}

/// Registry entry containing the predicate.
#[derive(Clone)]
pub struct RegistryEntry {
    /// The predicate.
    pub check: RuleFn,
    /// Whether this rule is enabled. Disabled rules resolve like unknown ones.
    pub enabled: bool,
}

/// Registry for all available rule kinds.
///
/// Rules are keyed by their identifier; registering an existing kind
/// replaces its predicate, which also allows overriding a built-in.
#[derive(Clone)]
pub struct RuleRegistry {
    rules: IndexMap<String, RegistryEntry>,
    unknown: UnknownRulePolicy,
}

impl RuleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
            unknown: UnknownRulePolicy::default(),
        }
    }

    /// Create a registry pre-populated with built-in rules.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::validation::builtin::register_all(&mut registry);
        registry
    }

    /// Register a rule kind.
    pub fn register<F>(&mut self, rule: impl Into<Rule>, check: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let rule = rule.into();
        self.rules.insert(
            rule.as_str().to_string(),
            RegistryEntry {
                check: Arc::new(check),
                enabled: true,
            },
        );
    }

    /// Set the policy for unregistered kinds.
    pub fn set_unknown_policy(&mut self, policy: UnknownRulePolicy) {
        self.unknown = policy;
    }

    /// Policy for unregistered kinds.
    pub fn unknown_policy(&self) -> UnknownRulePolicy {
        self.unknown
    }

    /// Apply a rule to a value.
    pub fn check(&self, rule: &Rule, value: &Value) -> bool {
        match self.rules.get(rule.as_str()).filter(|e| e.enabled) {
            Some(entry) => (entry.check)(value),
            None => {
                log::trace!("rule '{}' is not registered; policy {:?}", rule, self.unknown);
                self.unknown == UnknownRulePolicy::Pass
            }
        }
    }

    /// Get a registry entry.
    pub fn get_entry(&self, rule: &str) -> Option<&RegistryEntry> {
        self.rules.get(rule)
    }

    /// Check if a rule kind is registered.
    pub fn contains(&self, rule: &str) -> bool {
        self.rules.contains_key(rule)
    }

    /// Get all registered rule identifiers in registration order.
    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(|s| s.as_str())
    }

    /// Enable or disable a rule.
    pub fn set_enabled(&mut self, rule: &str, enabled: bool) -> bool {
        if let Some(entry) = self.rules.get_mut(rule) {
            entry.enabled = enabled;
            true
        } else {
            false
        }
    }

    /// Unregister a rule.
    pub fn unregister(&mut self, rule: &str) -> bool {
        self.rules.shift_remove(rule).is_some()
    }

    /// Get the total number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("unknown", &self.unknown)
            .finish()
    }
}

/// Builder for creating a customized registry.
pub struct RegistryBuilder {
    registry: RuleRegistry,
    include_builtins: bool,
}

impl RegistryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            registry: RuleRegistry::new(),
            include_builtins: true,
        }
    }

    /// Include or exclude built-in rules.
    pub fn with_builtins(mut self, include: bool) -> Self {
        self.include_builtins = include;
        self
    }

    /// Set the policy for unregistered kinds.
    pub fn unknown_rules(mut self, policy: UnknownRulePolicy) -> Self {
        self.registry.set_unknown_policy(policy);
        self
    }

    /// Register a custom rule.
    pub fn register<F>(mut self, rule: impl Into<Rule>, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.registry.register(rule, check);
        self
    }

    /// Build the registry.
    ///
    /// Custom rules registered on the builder take precedence over built-ins
    /// of the same name.
    pub fn build(self) -> RuleRegistry {
        if !self.include_builtins {
            return self.registry;
        }
        let mut registry = RuleRegistry::with_builtins();
        registry.set_unknown_policy(self.registry.unknown);
        for (id, entry) in self.registry.rules {
            registry.rules.insert(id, entry);
        }
        registry
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
