//! Table-level CRUD helpers.

use crate::core::error::{DatabaseError, DatabaseResult};
use crate::core::types::{Fields, Value};
use crate::persistence::database::{read_row, Database};
use regex::Regex;
use rusqlite::{params_from_iter, OptionalExtension};
use std::sync::OnceLock;

/// A row read from a table.
pub type Row = Fields;

/// Primary key column used by the id-based operations.
pub const ID_COLUMN: &str = "id";

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"))
}

/// Reject anything that is not a plain SQL identifier.
fn identifier(name: &str) -> DatabaseResult<&str> {
    if identifier_pattern().is_match(name) {
        Ok(name)
    } else {
        Err(DatabaseError::InvalidIdentifier(name.to_string()))
    }
}

/// Thin CRUD wrapper over an injected [`Database`].
///
/// Table and column names are checked to be plain identifiers; values are
/// always bound as parameters.
#[derive(Debug, Clone)]
pub struct Model {
    db: Database,
}

impl Model {
    /// Create a model over a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The underlying handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Fetch every row of a table.
    pub fn get_all(&self, table: &str) -> DatabaseResult<Vec<Row>> {
        let sql = format!("SELECT * FROM {}", identifier(table)?);
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let columns = column_names(&stmt);
            let rows = stmt
                .query_map([], |row| read_row(row, &columns))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Fetch one row by id.
    pub fn get_by_id(&self, table: &str, id: impl Into<Value>) -> DatabaseResult<Option<Row>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?1",
            identifier(table)?,
            ID_COLUMN
        );
        let id = id.into();
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let columns = column_names(&stmt);
            let row = stmt
                .query_row([&id], |row| read_row(row, &columns))
                .optional()?;
            Ok(row)
        })
    }

    /// Insert a row. Returns `true` once the statement has run.
    pub fn insert(&self, table: &str, data: &Fields) -> DatabaseResult<bool> {
        let table = identifier(table)?;
        if data.is_empty() {
            return Err(DatabaseError::EmptyFields {
                table: table.to_string(),
            });
        }

        let columns = data
            .keys()
            .map(|k| identifier(k))
            .collect::<DatabaseResult<Vec<_>>>()?;
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );

        let changed = self
            .db
            .with_connection(|conn| Ok(conn.execute(&sql, params_from_iter(data.values()))?))?;
        log::debug!("inserted {} row(s) into {}", changed, table);
        Ok(true)
    }

    /// Update the row with the given id. An `id` key in `data` is ignored.
    ///
    /// Returns `true` once the statement has run, even if no row has that id.
    pub fn update(&self, table: &str, data: &Fields, id: impl Into<Value>) -> DatabaseResult<bool> {
        let table = identifier(table)?;
        let assignments: Vec<(&str, &Value)> = data
            .iter()
            .filter(|(k, _)| k.as_str() != ID_COLUMN)
            .map(|(k, v)| identifier(k).map(|k| (k, v)))
            .collect::<DatabaseResult<_>>()?;
        if assignments.is_empty() {
            return Err(DatabaseError::EmptyFields {
                table: table.to_string(),
            });
        }

        let set: Vec<String> = assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            table,
            set.join(", "),
            ID_COLUMN,
            assignments.len() + 1
        );

        let id = id.into();
        let params = assignments.iter().map(|(_, v)| *v).chain(std::iter::once(&id));
        let changed = self
            .db
            .with_connection(|conn| Ok(conn.execute(&sql, params_from_iter(params))?))?;
        log::debug!("updated {} row(s) in {}", changed, table);
        Ok(true)
    }

    /// Delete the row with the given id. Returns `true` once the statement
    /// has run, even if no row has that id.
    pub fn delete(&self, table: &str, id: impl Into<Value>) -> DatabaseResult<bool> {
        let sql = format!("DELETE FROM {} WHERE {} = ?1", identifier(table)?, ID_COLUMN);
        let id = id.into();
        let changed = self
            .db
            .with_connection(|conn| Ok(conn.execute(&sql, [&id])?))?;
        log::debug!("deleted {} row(s) from {}", changed, table);
        Ok(true)
    }

    /// Row id of the most recent successful insert on this connection.
    pub fn last_insert_id(&self) -> i64 {
        self.db
            .with_connection(|conn| Ok(conn.last_insert_rowid()))
            .unwrap_or_default()
    }
}

fn column_names(stmt: &rusqlite::Statement<'_>) -> Vec<String> {
    stmt.column_names().into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::fields;

    fn users() -> Model {
        let db = Database::in_memory().unwrap();
        db.execute_batch(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT);",
        )
        .unwrap();
        Model::new(db)
    }

    #[test]
    fn test_insert_and_get() {
        let model = users();
        assert!(model
            .insert("users", &fields([("name", "Ana"), ("email", "ana@example.com")]))
            .unwrap());
        let id = model.last_insert_id();

        let row = model.get_by_id("users", id).unwrap().unwrap();
        assert_eq!(row["name"], Value::from("Ana"));
        assert_eq!(
            row.keys().collect::<Vec<_>>(),
            vec!["id", "name", "email"]
        );

        assert!(model.get_by_id("users", 999).unwrap().is_none());
    }

    #[test]
    fn test_get_all_preserves_order() {
        let model = users();
        model.insert("users", &fields([("name", "A")])).unwrap();
        model.insert("users", &fields([("name", "B")])).unwrap();

        let rows = model.get_all("users").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], Value::from("A"));
        assert!(rows[0]["email"].is_none());
    }

    #[test]
    fn test_update_and_delete() {
        let model = users();
        model.insert("users", &fields([("name", "A")])).unwrap();
        let id = model.last_insert_id();

        let changes = fields([("id", Value::from(12345)), ("name", Value::from("Renamed"))]);
        assert!(model.update("users", &changes, id).unwrap());
        assert_eq!(
            model.get_by_id("users", id).unwrap().unwrap()["name"],
            Value::from("Renamed")
        );

        assert!(model.delete("users", id).unwrap());
        assert!(model.get_by_id("users", id).unwrap().is_none());
    }

    #[test]
    fn test_writes_to_missing_ids_still_succeed() {
        let model = users();
        model.insert("users", &fields([("name", "A")])).unwrap();

        assert!(model.update("users", &fields([("name", "X")]), 999).unwrap());
        assert!(model.delete("users", 999).unwrap());

        let rows = model.get_all("users").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], Value::from("A"));
    }

    #[test]
    fn test_identifiers_are_checked() {
        let model = users();
        assert!(matches!(
            model.get_all("users; DROP TABLE users"),
            Err(DatabaseError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            model.insert("users", &fields([("name) VALUES ('x'); --", "y")])),
            Err(DatabaseError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_empty_writes_rejected() {
        let model = users();
        assert!(matches!(
            model.insert("users", &Fields::new()),
            Err(DatabaseError::EmptyFields { .. })
        ));
        assert!(matches!(
            model.update("users", &fields([("id", 1)]), 1),
            Err(DatabaseError::EmptyFields { .. })
        ));
    }

    #[test]
    fn test_query_errors_surface() {
        let model = users();
        assert!(matches!(
            model.get_all("missing_table"),
            Err(DatabaseError::Query(_))
        ));
    }
}
