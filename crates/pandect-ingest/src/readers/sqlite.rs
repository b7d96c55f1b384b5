//! SQLite table reading.

use std::path::Path;

use polars::prelude::*;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};

use crate::error::Result;

/// Quotes `name` as an SQL identifier, doubling embedded double quotes.
///
/// ```
/// use pandect_ingest::quote_identifier;
///
/// assert_eq!(quote_identifier("people"), "\"people\"");
/// assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Reads every row of `table` from a SQLite database opened read-only.
///
/// Column dtypes follow the stored values: integers only give `Int64`,
/// integers and reals `Float64`, anything else `String` (blobs as hex).
/// Columns holding only NULL get the `Null` dtype.
pub fn read_sqlite_table(path: &Path, table: &str) -> Result<DataFrame> {
    let connection = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    let query = format!("SELECT * FROM {}", quote_identifier(table));
    tracing::debug!(query = %query, "running sqlite query");

    let mut statement = connection.prepare(&query)?;
    let names: Vec<String> = statement
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    let mut rows = statement.query([])?;
    while let Some(row) = rows.next()? {
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get::<_, Value>(idx)?);
        }
    }

    let columns = names
        .iter()
        .zip(&cells)
        .map(|(name, values)| build_column(name, values))
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn build_column(name: &str, values: &[Value]) -> Column {
    let mut has_int = false;
    let mut has_real = false;
    let mut has_other = false;
    for value in values {
        match value {
            Value::Null => {}
            Value::Integer(_) => has_int = true,
            Value::Real(_) => has_real = true,
            Value::Text(_) | Value::Blob(_) => has_other = true,
        }
    }

    if has_other {
        let strings: Vec<Option<String>> = values.iter().map(value_to_string).collect();
        return Column::new(name.into(), strings);
    }
    if has_real {
        let numbers: Vec<Option<f64>> = values
            .iter()
            .map(|value| match value {
                Value::Integer(v) => Some(*v as f64),
                Value::Real(v) => Some(*v),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), numbers);
    }
    if has_int {
        let numbers: Vec<Option<i64>> = values
            .iter()
            .map(|value| match value {
                Value::Integer(v) => Some(*v),
                _ => None,
            })
            .collect();
        return Column::new(name.into(), numbers);
    }
    Column::full_null(name.into(), values.len(), &DataType::Null)
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(v) => Some(v.to_string()),
        Value::Real(v) => Some(v.to_string()),
        Value::Text(text) => Some(text.clone()),
        Value::Blob(bytes) => Some(hex::encode(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_db(dir: &TempDir, sql: &str) -> std::path::PathBuf {
        let path = dir.path().join("test.sqlite3");
        let connection = Connection::open(&path).unwrap();
        connection.execute_batch(sql).unwrap();
        path
    }

    #[test]
    fn test_read_table() {
        let dir = TempDir::new().unwrap();
        let path = create_db(
            &dir,
            "CREATE TABLE people (id INTEGER, name TEXT, score REAL);
             INSERT INTO people VALUES (1, 'Alice', 9.5), (2, 'Bob', NULL);",
        );

        let df = read_sqlite_table(&path, "people").unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("name").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("score").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("score").unwrap().null_count(), 1);
    }

    #[test]
    fn test_quoted_table_name() {
        let dir = TempDir::new().unwrap();
        let path = create_db(
            &dir,
            "CREATE TABLE \"odd \"\"name\" (x INTEGER);
             INSERT INTO \"odd \"\"name\" VALUES (7);",
        );

        let df = read_sqlite_table(&path, "odd \"name").unwrap();
        assert_eq!(df.shape(), (1, 1));
    }

    #[test]
    fn test_blob_is_hex() {
        let dir = TempDir::new().unwrap();
        let path = create_db(
            &dir,
            "CREATE TABLE b (data BLOB); INSERT INTO b VALUES (x'CAFE');",
        );

        let df = read_sqlite_table(&path, "b").unwrap();
        let value = df.column("data").unwrap().str().unwrap().get(0);
        assert_eq!(value, Some("cafe"));
    }

    #[test]
    fn test_missing_table_is_sqlite_error() {
        let dir = TempDir::new().unwrap();
        let path = create_db(&dir, "CREATE TABLE t (x INTEGER);");

        let err = read_sqlite_table(&path, "nope").unwrap_err();
        assert!(matches!(err, crate::LoadError::Sqlite(_)));
    }

    #[test]
    fn test_empty_table_keeps_columns() {
        let dir = TempDir::new().unwrap();
        let path = create_db(&dir, "CREATE TABLE t (x INTEGER, y TEXT);");

        let df = read_sqlite_table(&path, "t").unwrap();
        assert_eq!(df.shape(), (0, 2));
    }
}
