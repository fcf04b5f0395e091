//! Rule-based input validation.
//!
//! A [`RuleEngine`] holds ordered rules per field and produces a
//! [`ValidationReport`]. Rule kinds resolve through a [`RuleRegistry`], so
//! applications can add their own kinds next to the built-in ones.

pub mod builtin;
pub mod engine;
pub mod registry;
pub mod report;
pub mod rules;

pub use engine::RuleEngine;
pub use registry::{RegistryBuilder, RuleFn, RuleRegistry, UnknownRulePolicy};
pub use report::ValidationReport;
pub use rules::{parse_rule_list, Rule, MAX_LENGTH, MIN_LENGTH};
