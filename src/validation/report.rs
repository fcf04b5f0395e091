//! Validation report.

use indexmap::IndexMap;
use serde::Serialize;

/// Field → violation messages produced by one validation run.
///
/// A field is present only when it has at least one message; the report
/// never holds an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    errors: IndexMap<String, Vec<String>>,
}

impl ValidationReport {
    /// Create a new empty report (success).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a violation message for a field.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Whether validation passed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages for a field, if it failed.
    pub fn errors_for(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// First message for a field, if it failed.
    pub fn first_error(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Check if a field failed.
    pub fn has_errors(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Names of the failed fields, in evaluation order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Iterate over `(field, messages)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Number of failed fields.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if no field failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of messages across all fields.
    pub fn message_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Consume the report into its underlying mapping.
    pub fn into_inner(self) -> IndexMap<String, Vec<String>> {
        self.errors
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        if self.is_valid() {
            "✓ All fields are valid".to_string()
        } else {
            format!(
                "✗ Validation failed: {} message(s) on {} field(s)",
                self.message_count(),
                self.len()
            )
        }
    }
}
