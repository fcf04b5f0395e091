//! # LiteForge - Request Dispatch and Validation
//!
//! LiteForge is a small web-application core. It runs a request through a
//! controller and validates user input against declarative rules.
//!
//! ## Features
//!
//! - **Dispatch Pipeline**: Global middleware, per-action before/after filters and named action handlers
//! - **Rule Engine**: Ordered per-field rules with custom messages and pluggable rule kinds
//! - **Collaborators**: SQLite-backed models, file views with layouts, flash messages and redirects
//! - **Tracing**: Every pipeline step can be observed through a callback and the `log` facade
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use liteforge::prelude::*;
//!
//! struct Users {
//!     created: Vec<String>,
//! }
//!
//! impl Controller for Users {
//!     fn actions() -> ActionTable<Self> {
//!         ActionTable::new().with("create", |users: &mut Users, params: &[Value]| {
//!             users.created.push(params[0].to_string());
//!             Ok(())
//!         })
//!     }
//! }
//!
//! let mut dispatcher = Dispatcher::for_controller(Users { created: Vec::new() });
//! dispatcher.register_middleware(|| true);
//! dispatcher.register_before_filter("create", || true);
//!
//! let outcome = dispatcher.execute("create", &[Value::from("ana")])?;
//! assert!(outcome.is_completed());
//!
//! let mut rules = RuleEngine::new();
//! rules
//!     .add_rule("email", ["required", "email"])
//!     .add_rule("password", ["required", "min_length"])
//!     .set_error_message("email", "Please provide a valid email.");
//!
//! let report = rules.validate(&fields([("email", "nope"), ("password", "abc")]));
//! assert!(!report.is_valid());
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Values, errors, the error boundary and the request context
//! - [`dispatch`]: The dispatcher, action tables, redirects and pipeline tracing
//! - [`validation`]: The rule engine, rule registry and built-in rules
//! - [`persistence`]: Database handle and table model
//! - [`view`]: View loading and rendering
//! - [`session`]: Flash messages
//! - [`config`] and [`logging`]: Application configuration and logger setup

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod dispatch;
pub mod logging;
pub mod persistence;
pub mod session;
pub mod validation;
pub mod view;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use liteforge::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{fields, Fields, Value, ValueKind};

    // Context
    pub use crate::core::context::{Dependencies, RequestContext, RequestId};

    // Errors
    pub use crate::core::error::{
        ConfigError, DatabaseError, DispatchError, ErrorBoundary, ForgeError, ForgeResult,
        LookupError, ViewError, GENERIC_ERROR_MESSAGE,
    };

    // Dispatch
    pub use crate::dispatch::{
        ActionHandler, ActionTable, Controller, DispatchOptions, Dispatcher, HaltStage,
        PipelineEvent, PipelineOutcome, Redirect,
    };

    // Validation
    pub use crate::validation::{
        RegistryBuilder, Rule, RuleEngine, RuleRegistry, UnknownRulePolicy, ValidationReport,
    };

    // Collaborators
    pub use crate::config::AppConfig;
    pub use crate::persistence::{Database, Model, Row};
    pub use crate::session::{FlashBag, FlashMessage, MessageKind};
    pub use crate::view::{View, ViewEngine};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
