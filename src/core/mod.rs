//! Core types shared by the dispatcher, validator and collaborators.
//!
//! This module contains:
//! - The dynamic [`Value`] type for request data and rows
//! - Error types and the request error boundary
//! - The per-request context and dependency container

pub mod context;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use context::{Dependencies, RequestContext, RequestId};
pub use error::{
    ConfigError, DatabaseError, DispatchError, ErrorBoundary, ForgeError, LookupError, ViewError,
};
pub use types::{Fields, Value, ValueKind};
