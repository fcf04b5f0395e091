//! Error types for LiteForge.
//!
//! Uses thiserror for structured errors with context. Expected outcomes
//! (a halted pipeline, a failed validation) are never errors; everything
//! here is a configuration or lookup fault that ends up at the
//! [`ErrorBoundary`].

use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

/// Message shown to users when a request fails with a fault.
pub const GENERIC_ERROR_MESSAGE: &str =
    "Sorry, something went wrong. Please try again later.";

/// Top-level error type for LiteForge.
///
/// This enum encompasses all error categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("View error: {0}")]
    View(#[from] ViewError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised while running a controller action.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Action '{action}' not found")]
    ActionNotFound { action: String },

    #[error("Action '{action}' failed: {source}")]
    ActionFailed {
        action: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Errors from the persistence collaborator.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to open database at {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Invalid SQL identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("Nothing to write to table '{table}'")]
    EmptyFields { table: String },

    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Failed to encode column value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors from the view collaborator.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("View '{name}' not found")]
    NotFound { name: String },

    #[error("Layout '{name}' not found")]
    LayoutNotFound { name: String },

    #[error("Section '{open}' is still open; cannot start '{requested}'")]
    SectionAlreadyOpen { open: String, requested: String },

    #[error("No section is open")]
    NoOpenSection,

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Failed lookups of named collaborators (dependencies, libraries).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} '{name}' has a different type than requested")]
    TypeMismatch { kind: &'static str, name: String },
}

/// Errors while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

// ============================================================================
// Error Utilities
// ============================================================================

impl ForgeError {
    /// Whether this error comes from a missing named resource.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ForgeError::Dispatch(DispatchError::ActionNotFound { .. })
                | ForgeError::View(ViewError::NotFound { .. })
                | ForgeError::View(ViewError::LayoutNotFound { .. })
                | ForgeError::Lookup(LookupError::NotFound { .. })
        )
    }

    /// Get suggestion for fixing this error.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            ForgeError::Dispatch(DispatchError::ActionNotFound { action }) => Some(format!(
                "Register a handler for '{}' in the controller's action table",
                action
            )),
            ForgeError::View(ViewError::NotFound { name }) => {
                Some(format!("Check that the view file for '{}' exists", name))
            }
            ForgeError::View(ViewError::LayoutNotFound { name }) => Some(format!(
                "Check that the layout file for '{}' exists under layouts/",
                name
            )),
            ForgeError::Lookup(LookupError::NotFound { name, .. }) => {
                Some(format!("Insert '{}' into the dependency container", name))
            }
            ForgeError::Database(DatabaseError::Connect { path, .. }) => Some(format!(
                "Check that the database path '{}' is writable",
                path
            )),
            _ => None,
        }
    }
}

/// Result type alias for LiteForge operations.
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Result type alias for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Result type alias for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Result type alias for view operations.
pub type ViewResult<T> = Result<T, ViewError>;

// ============================================================================
// Error Boundary
// ============================================================================

/// Outer boundary of a request.
///
/// Faults that reach the boundary are logged with their full source chain
/// and replaced by [`GENERIC_ERROR_MESSAGE`] for the user.
pub struct ErrorBoundary;

impl ErrorBoundary {
    /// Log the error and return the user-facing message.
    pub fn handle(error: &(dyn StdError + 'static)) -> &'static str {
        log::error!("{}", Self::describe(error));
        GENERIC_ERROR_MESSAGE
    }

    /// Run a fallible request body, converting any fault to the generic message.
    pub fn run<T, E, F>(body: F) -> Result<T, &'static str>
    where
        F: FnOnce() -> Result<T, E>,
        E: StdError + 'static,
    {
        body().map_err(|e| Self::handle(&e))
    }

    /// Render an error and its source chain on one line.
    pub fn describe(error: &(dyn StdError + 'static)) -> String {
        let mut out = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            out.push_str(" | caused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}
