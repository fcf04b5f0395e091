//! Rule kind identifiers.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Fixed threshold of the `min_length` rule.
pub const MIN_LENGTH: usize = 6;

/// Fixed threshold of the `max_length` rule.
pub const MAX_LENGTH: usize = 255;

/// A validation rule kind.
///
/// Built-in kinds carry no parameters. Any other identifier is a
/// [`Rule::Custom`] kind resolved through the
/// [`RuleRegistry`](crate::validation::RuleRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rule {
    /// Value must be non-empty.
    Required,
    /// Value must be an email address.
    Email,
    /// Value must be a number or numeric string.
    Numeric,
    /// String form must be at least [`MIN_LENGTH`] bytes.
    MinLength,
    /// String form must be at most [`MAX_LENGTH`] bytes.
    MaxLength,
    /// Any other kind.
    Custom(String),
}

impl Rule {
    /// The identifier of this rule kind.
    pub fn as_str(&self) -> &str {
        match self {
            Rule::Required => "required",
            Rule::Email => "email",
            Rule::Numeric => "numeric",
            Rule::MinLength => "min_length",
            Rule::MaxLength => "max_length",
            Rule::Custom(name) => name,
        }
    }

    /// Whether this is one of the built-in kinds.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Rule::Custom(_))
    }

    /// All built-in kinds.
    pub fn builtins() -> [Rule; 5] {
        [
            Rule::Required,
            Rule::Email,
            Rule::Numeric,
            Rule::MinLength,
            Rule::MaxLength,
        ]
    }
}

impl FromStr for Rule {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Rule::from(s))
    }
}

impl From<&str> for Rule {
    fn from(s: &str) -> Self {
        match s {
            "required" => Rule::Required,
            "email" => Rule::Email,
            "numeric" => Rule::Numeric,
            "min_length" => Rule::MinLength,
            "max_length" => Rule::MaxLength,
            other => Rule::Custom(other.to_string()),
        }
    }
}

impl From<String> for Rule {
    fn from(s: String) -> Self {
        match Rule::from(s.as_str()) {
            Rule::Custom(_) => Rule::Custom(s),
            builtin => builtin,
        }
    }
}

impl From<&Rule> for Rule {
    fn from(rule: &Rule) -> Self {
        rule.clone()
    }
}

impl From<Rule> for String {
    fn from(rule: Rule) -> Self {
        match rule {
            Rule::Custom(name) => name,
            builtin => builtin.as_str().to_string(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a comma or pipe separated rule list such as `"required|email"`.
pub fn parse_rule_list(list: &str) -> Vec<Rule> {
    list.split(|c| c == ',' || c == '|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Rule::from)
        .collect()
}
