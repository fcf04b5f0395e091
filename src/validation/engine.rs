//! Rule engine implementation.

use crate::core::types::{Fields, Value};
use crate::validation::registry::{RuleRegistry, UnknownRulePolicy};
use crate::validation::report::ValidationReport;
use crate::validation::rules::Rule;
use indexmap::IndexMap;
use std::sync::Arc;
use std::time::Instant;

/// Declarative per-field validator.
///
/// Fields are checked in the order they were first added, and each field's
/// rules in the order given. Every rule of a field is applied even after an
/// earlier one failed, so a field can collect several messages.
///
/// Custom messages are keyed by rule kind, not by field: a message set for
/// `required` is used for every field that lists `required`.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    fields: IndexMap<String, Vec<Rule>>,
    messages: IndexMap<Rule, String>,
    registry: Arc<RuleRegistry>,
}

impl RuleEngine {
    /// Create an engine using the built-in rules.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(RuleRegistry::with_builtins()))
    }

    /// Create an engine resolving rules through a shared registry.
    pub fn with_registry(registry: Arc<RuleRegistry>) -> Self {
        Self {
            fields: IndexMap::new(),
            messages: IndexMap::new(),
            registry,
        }
    }

    /// Set the rules for a field, replacing any previously set for it.
    pub fn add_rule<I>(&mut self, field: impl Into<String>, rules: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Rule>,
    {
        let rules: Vec<Rule> = rules.into_iter().map(Into::into).collect();
        self.fields.insert(field.into(), rules);
        self
    }

    /// Set the message used whenever `rule` fails, on any field.
    pub fn set_error_message(
        &mut self,
        rule: impl Into<Rule>,
        message: impl Into<String>,
    ) -> &mut Self {
        self.messages.insert(rule.into(), message.into());
        self
    }

    /// Register a custom rule kind for this engine.
    ///
    /// The engine's registry is copied on first write if it is shared.
    pub fn register_rule<F>(&mut self, rule: impl Into<Rule>, check: F) -> &mut Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.registry).register(rule, check);
        self
    }

    /// Set the policy for rule kinds that are not registered.
    pub fn set_unknown_policy(&mut self, policy: UnknownRulePolicy) -> &mut Self {
        Arc::make_mut(&mut self.registry).set_unknown_policy(policy);
        self
    }

    /// Rules currently set for a field.
    pub fn rules_for(&self, field: &str) -> Option<&[Rule]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Fields with rules, in evaluation order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The registry rules resolve through.
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Message that would be reported for `rule` failing on `field`.
    pub fn error_message(&self, field: &str, rule: &Rule) -> String {
        match self.messages.get(rule) {
            Some(custom) => custom.clone(),
            None => format!("Validation failed for rule '{}' on field '{}'.", rule, field),
        }
    }

    /// Validate data against every registered field.
    ///
    /// Missing keys are checked as [`Value::None`].
    pub fn validate(&self, data: &Fields) -> ValidationReport {
        let start = Instant::now();
        let mut report = ValidationReport::new();

        for (field, rules) in &self.fields {
            let value = data.get(field).unwrap_or(&Value::None);
            for rule in rules {
                if !self.registry.check(rule, value) {
                    report.add_error(field.as_str(), self.error_message(field, rule));
                }
            }
        }

        log::debug!(
            "validated {} field(s) in {:?}: {}",
            self.fields.len(),
            start.elapsed(),
            report.summary()
        );
        report
    }

    /// Validate a JSON object. Non-object input is validated as empty data.
    pub fn validate_json(&self, data: &serde_json::Value) -> ValidationReport {
        let fields = match Value::from(data.clone()) {
            Value::Map(map) => map,
            _ => Fields::new(),
        };
        self.validate(&fields)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}
