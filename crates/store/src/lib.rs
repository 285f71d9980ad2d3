//! Index Store: durable record storage for the run catalog
//!
//! One SQLite database file per catalog prefix, holding a single
//! `run_entries` table keyed by filename. This crate owns:
//! - schema creation and additive migration ([`schema`])
//! - record-level operations: upsert, get, delete, count, list ([`IndexStore`])
//! - the storage-level candidate narrowing query for subset search
//!
//! ## Narrowing is not matching
//!
//! [`IndexStore::candidates`] filters with SQLite's `json_extract`, whose
//! comparison semantics are lenient (a stored float `1.0` compares equal to
//! an integer constraint `1`). The query engine re-verifies every candidate
//! in memory with exact typed equality; the narrowing pass only has to be a
//! superset of the true matches, never the source of truth.
//!
//! ## Durability model
//!
//! Every mutation commits as a single statement. There is no multi-statement
//! transaction spanning a reconciliation pass, so an interrupted scan leaves
//! a valid, if incomplete, store.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod index;
pub mod schema;

pub use index::{IndexStore, DEFAULT_LOCK_TIMEOUT};

use thiserror::Error;

/// Store-level failures. All of these are fatal to the calling operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite-level fault: lock timeout, disk error, corrupt database file
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored blob no longer deserializes; the database was tampered with
    /// or written by something other than this tool
    #[error("corrupt record for '{filename}': {message}")]
    Corrupt {
        /// The record's filename key
        filename: String,
        /// Decode failure detail
        message: String,
    },
}

/// Store-level result alias.
pub type Result<T> = std::result::Result<T, StoreError>;
