//! Built-in rule predicates.

use crate::core::types::Value;
use crate::validation::registry::RuleRegistry;
use crate::validation::rules::{Rule, MAX_LENGTH, MIN_LENGTH};
use regex::Regex;
use std::sync::OnceLock;

/// Maximum length of a whole address and of its local part.
const MAX_EMAIL_LENGTH: usize = 320;
const MAX_LOCAL_PART_LENGTH: usize = 64;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*",
            r"@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+",
            r"[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$",
        ))
        .expect("email pattern is valid")
    })
}

fn numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[ \t\n\r\x0B\x0C]*[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?[ \t\n\r\x0B\x0C]*$")
            .expect("numeric pattern is valid")
    })
}

/// `required`: the value is not empty.
pub fn required(value: &Value) -> bool {
    !value.is_empty()
}

/// `email`: the value is a string with address syntax.
pub fn email(value: &Value) -> bool {
    let Some(address) = value.as_str() else {
        return false;
    };
    if address.len() > MAX_EMAIL_LENGTH {
        return false;
    }
    match address.rsplit_once('@') {
        Some((local, _)) if local.len() <= MAX_LOCAL_PART_LENGTH => {
            email_pattern().is_match(address)
        }
        _ => false,
    }
}

/// `numeric`: the value is a number or a numeric-looking string.
pub fn numeric(value: &Value) -> bool {
    match value {
        Value::Integer(_) => true,
        Value::Float(_) => true,
        Value::String(s) => numeric_pattern().is_match(s),
        _ => false,
    }
}

/// `min_length`: the value's string form is at least [`MIN_LENGTH`] bytes.
pub fn min_length(value: &Value) -> bool {
    value
        .to_scalar_string()
        .is_some_and(|s| s.len() >= MIN_LENGTH)
}

/// `max_length`: the value's string form is at most [`MAX_LENGTH`] bytes.
pub fn max_length(value: &Value) -> bool {
    value
        .to_scalar_string()
        .is_some_and(|s| s.len() <= MAX_LENGTH)
}

/// Register all built-in rules.
pub fn register_all(registry: &mut RuleRegistry) {
    registry.register(Rule::Required, required);
    registry.register(Rule::Email, email);
    registry.register(Rule::Numeric, numeric);
    registry.register(Rule::MinLength, min_length);
    registry.register(Rule::MaxLength, max_length);
}
