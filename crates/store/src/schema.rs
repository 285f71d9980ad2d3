//! Schema creation and additive migration
//!
//! Old and new stores must both open correctly with the same code. Optional
//! columns (`extra_fields`, `mtime`) were introduced after the first schema
//! revision, so opening inspects the live column set and issues a conditional
//! `ALTER TABLE ... ADD COLUMN` for anything missing. Columns are only ever
//! added — never dropped or renamed — which keeps stores written by older
//! revisions readable and vice versa.

use rusqlite::Connection;
use tracing::debug;

use crate::Result;

/// The record table name.
pub const TABLE: &str = "run_entries";

const CREATE_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS run_entries (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL UNIQUE,
    inputs TEXT NOT NULL,
    extra_fields TEXT,
    mtime REAL
)";

/// Optional columns introduced after the first schema revision, with their
/// SQLite types. Order matters only for readability.
const OPTIONAL_COLUMNS: &[(&str, &str)] = &[("extra_fields", "TEXT"), ("mtime", "REAL")];

/// Create the record table if absent and add any missing optional column.
///
/// Idempotent; safe (and expected) to call on every open.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_TABLE, [])?;

    let existing = column_names(conn)?;
    for (column, sql_type) in OPTIONAL_COLUMNS {
        if !existing.iter().any(|c| c == column) {
            debug!(column, "adding missing column to {}", TABLE);
            conn.execute(
                &format!("ALTER TABLE {} ADD COLUMN {} {}", TABLE, column, sql_type),
                [],
            )?;
        }
    }
    Ok(())
}

fn column_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", TABLE))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        let names = column_names(&conn).unwrap();
        assert!(names.iter().any(|c| c == "filename"));
        assert!(names.iter().any(|c| c == "mtime"));
    }

    #[test]
    fn legacy_table_gains_optional_columns() {
        let conn = Connection::open_in_memory().unwrap();
        // first-revision schema: no extra_fields, no mtime
        conn.execute(
            "CREATE TABLE run_entries (
                id INTEGER PRIMARY KEY,
                filename TEXT NOT NULL UNIQUE,
                inputs TEXT NOT NULL
            )",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO run_entries (filename, inputs) VALUES ('run1', '{\"dt\":0.05}')",
            [],
        )
        .unwrap();

        ensure_schema(&conn).unwrap();

        let names = column_names(&conn).unwrap();
        assert!(names.iter().any(|c| c == "extra_fields"));
        assert!(names.iter().any(|c| c == "mtime"));

        // existing rows untouched, new columns read as NULL
        let (inputs, mtime): (String, Option<f64>) = conn
            .query_row(
                "SELECT inputs, mtime FROM run_entries WHERE filename = 'run1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(inputs, "{\"dt\":0.05}");
        assert_eq!(mtime, None);
    }
}
