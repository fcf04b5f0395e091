//! Persistence collaborator.
//!
//! A [`Database`] handle is opened once and injected; [`Model`] offers the
//! five table operations controllers use.

pub mod database;
pub mod model;

pub use database::Database;
pub use model::{Model, Row, ID_COLUMN};
