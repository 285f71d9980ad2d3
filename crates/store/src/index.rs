//! Record-level store operations

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::time::Duration;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::trace;

use rundex_core::{Entry, ExtraFields, Inputs, Value};

use crate::schema;
use crate::{Result, StoreError};

/// Default bounded wait for the SQLite lock when another process holds the
/// store open. After this the operation fails instead of blocking forever.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(300);

/// Handle to one catalog's database file.
///
/// Stateless beyond the connection: every operation reads or writes the
/// `run_entries` table directly, and every mutation commits as a single
/// statement.
pub struct IndexStore {
    conn: Connection,
}

impl IndexStore {
    /// Open (creating if necessary) the store at `path` and ensure the
    /// schema is current.
    pub fn open(path: &Path, lock_timeout: Duration) -> Result<IndexStore> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(lock_timeout)?;
        schema::ensure_schema(&conn)?;
        Ok(IndexStore { conn })
    }

    /// In-memory store, for tests.
    pub fn open_in_memory() -> Result<IndexStore> {
        let conn = Connection::open_in_memory()?;
        schema::ensure_schema(&conn)?;
        Ok(IndexStore { conn })
    }

    /// Insert or fully replace the record for `filename`.
    ///
    /// Replacement is total: prior inputs, extra fields, and mtime are all
    /// overwritten, never merged.
    pub fn upsert(
        &self,
        filename: &str,
        inputs: &Inputs,
        extra_fields: &ExtraFields,
        mtime: Option<f64>,
    ) -> Result<()> {
        let inputs_json = serde_json::to_string(inputs).map_err(|e| StoreError::Corrupt {
            filename: filename.to_string(),
            message: e.to_string(),
        })?;
        let extra_json = if extra_fields.is_empty() {
            None
        } else {
            Some(
                serde_json::to_string(extra_fields).map_err(|e| StoreError::Corrupt {
                    filename: filename.to_string(),
                    message: e.to_string(),
                })?,
            )
        };
        trace!(filename, "upsert");
        self.conn.execute(
            "INSERT OR REPLACE INTO run_entries (filename, inputs, extra_fields, mtime)
             VALUES (?1, ?2, ?3, ?4)",
            params![filename, inputs_json, extra_json, mtime],
        )?;
        Ok(())
    }

    /// Exact lookup by filename.
    pub fn get(&self, filename: &str) -> Result<Option<Entry>> {
        let row: Option<(String, Option<String>)> = self
            .conn
            .query_row(
                "SELECT inputs, extra_fields FROM run_entries WHERE filename = ?1",
                params![filename],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        match row {
            Some((inputs_json, extra_json)) => {
                Ok(Some(decode_entry(filename, &inputs_json, extra_json)?))
            }
            None => Ok(None),
        }
    }

    /// Remove the record if present. Deleting an absent filename is not an
    /// error.
    pub fn delete(&self, filename: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM run_entries WHERE filename = ?1",
            params![filename],
        )?;
        Ok(())
    }

    /// Total record count.
    pub fn count(&self) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM run_entries", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    /// All known run identifiers, for prune-set computation.
    pub fn list_filenames(&self) -> Result<BTreeSet<String>> {
        let mut stmt = self.conn.prepare("SELECT filename FROM run_entries")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<BTreeSet<_>, _>>()?;
        Ok(names)
    }

    /// Last-observed info-file mtimes, keyed by filename. Rows written by a
    /// schema revision without mtime tracking map to `None`.
    pub fn stored_mtimes(&self) -> Result<HashMap<String, Option<f64>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT filename, mtime FROM run_entries")?;
        let map = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get(1)?)))?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;
        Ok(map)
    }

    /// Storage-level narrowing pass for subset search.
    ///
    /// Adds one `json_extract(inputs, ?) = ?` predicate per constraint key,
    /// with both the JSON path and the comparison value bound as parameters.
    /// SQLite compares numerics leniently, so the returned set may contain
    /// false positives; callers must re-verify with [`Value`] equality.
    /// Result order is the table's natural (rowid) order.
    pub fn candidates(&self, constraint: &Inputs) -> Result<Vec<Entry>> {
        let mut sql = String::from("SELECT filename, inputs, extra_fields FROM run_entries");
        let mut bindings: Vec<SqlValue> = Vec::new();
        let mut predicates: Vec<&str> = Vec::new();

        for (key, value) in constraint {
            // A key containing a double quote cannot be expressed as a bound
            // JSON path; leave it to the exact in-memory pass.
            if key.contains('"') {
                continue;
            }
            predicates.push("json_extract(inputs, ?) = ?");
            bindings.push(SqlValue::Text(format!("$.\"{}\"", key)));
            bindings.push(sql_scalar(value));
        }
        if !predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(bindings), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(filename, inputs_json, extra_json)| {
                decode_entry(&filename, &inputs_json, extra_json)
            })
            .collect()
    }
}

fn sql_scalar(value: &Value) -> SqlValue {
    match value {
        // JSON booleans extract as SQLite integers 0/1
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(i) => SqlValue::Integer(*i),
        Value::Float(f) => SqlValue::Real(*f),
        Value::Str(s) => SqlValue::Text(s.clone()),
    }
}

fn decode_entry(filename: &str, inputs_json: &str, extra_json: Option<String>) -> Result<Entry> {
    let inputs: Inputs = serde_json::from_str(inputs_json).map_err(|e| StoreError::Corrupt {
        filename: filename.to_string(),
        message: format!("inputs: {}", e),
    })?;
    let extra_fields: ExtraFields = match extra_json {
        Some(text) => serde_json::from_str(&text).map_err(|e| StoreError::Corrupt {
            filename: filename.to_string(),
            message: format!("extra_fields: {}", e),
        })?,
        None => ExtraFields::new(),
    };
    Ok(Entry {
        filename: filename.to_string(),
        inputs,
        extra_fields,
    })
}
