//! Shared database handle.
//!
//! The handle is constructed once by the application and injected wherever
//! it is needed. Clones share the same connection.

use crate::config::DatabaseConfig;
use crate::core::error::{DatabaseError, DatabaseResult};
use crate::core::types::{Fields, Value};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use parking_lot::Mutex;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql};
use std::fmt;
use std::sync::Arc;

/// A cloneable handle to one SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: String,
}

impl Database {
    /// Open the database described by the configuration.
    pub fn open(config: &DatabaseConfig) -> DatabaseResult<Self> {
        let conn = if config.path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(&config.path)
        }
        .map_err(|source| DatabaseError::Connect {
            path: config.path.clone(),
            source,
        })?;

        log::info!("opened database at {}", config.path);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: config.path.clone(),
        })
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> DatabaseResult<Self> {
        Self::open(&DatabaseConfig::default())
    }

    /// Location this handle was opened from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Run one or more statements with no parameters, e.g. schema setup.
    pub fn execute_batch(&self, sql: &str) -> DatabaseResult<()> {
        self.conn.lock().execute_batch(sql)?;
        Ok(())
    }

    /// Run a closure with exclusive access to the connection.
    pub fn with_connection<T, F>(&self, f: F) -> DatabaseResult<T>
    where
        F: FnOnce(&Connection) -> DatabaseResult<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database").field("path", &self.path).finish()
    }
}

// ============================================================================
// Value <-> SQLite
// ============================================================================

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::None => ToSqlOutput::from(rusqlite::types::Null),
            Value::Boolean(b) => ToSqlOutput::from(*b),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Float(f) => ToSqlOutput::from(*f),
            Value::String(s) => ToSqlOutput::from(s.as_str()),
            Value::Array(_) | Value::Map(_) => {
                let json = serde_json::to_string(self)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                ToSqlOutput::from(json)
            }
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::None,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Float(f),
            ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Value::String(STANDARD.encode(bytes)),
        }
    }
}

/// Read a result row into an ordered column → value mapping.
pub(crate) fn read_row(row: &rusqlite::Row<'_>, columns: &[String]) -> rusqlite::Result<Fields> {
    let mut fields = Fields::with_capacity(columns.len());
    for (index, name) in columns.iter().enumerate() {
        fields.insert(name.clone(), Value::from(row.get_ref(index)?));
    }
    Ok(fields)
}
