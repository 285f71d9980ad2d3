//! rundex engine: reconciliation, subset search, and diff over the Index Store
//!
//! The catalog's moving parts live here:
//! - [`reconcile`]: bring the store into agreement with the info files
//!   present in an output directory (insert/update/prune)
//! - [`search`]: two-pass subset matching — storage narrowing plus exact
//!   typed re-verification
//! - [`diff`]: differing-keys across a result set, and pairwise diff with
//!   horizontal/vertical renderings
//! - [`adapter`]: info-file parsing behind an extension-keyed registry
//! - [`config`]: layered named configs (input key types, search presets)
//! - [`catalog`]: the facade the CLI talks to, one store open per operation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod catalog;
pub mod config;
pub mod diff;
pub mod reconcile;
pub mod search;

pub use adapter::{AdapterRegistry, InfoAdapter, JsonInfoAdapter};
pub use catalog::{Catalog, DeleteReport, DiffLayout};
pub use config::{load_input_keys, load_named_config, load_search_presets, SearchPreset};
pub use diff::{differing_keys, pairwise_diff, render_horizontal, render_vertical, DiffRow, FieldState};
pub use reconcile::{UpdateOptions, UpdateReport};
pub use search::{find_by_subset, matches_subset};

use std::path::PathBuf;

use thiserror::Error;

use rundex_core::KindError;
use rundex_store::StoreError;

/// Engine-level failures.
///
/// Per-file parse problems during a scan are contained by the reconciler and
/// reported in its [`UpdateReport`]; everything here propagates to the
/// operation boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The output directory for the prefix does not exist; nothing was done
    #[error("output directory '{dir}' does not exist")]
    OutputDirMissing {
        /// The directory that was checked
        dir: String,
    },

    /// Lookup miss for get/diff: user-visible, not an internal fault
    #[error("no entry found for filename '{filename}'")]
    NotFound {
        /// The requested run identifier
        filename: String,
    },

    /// No adapter is registered for the file's extension
    #[error("unsupported info-file format: {}", path.display())]
    UnsupportedFormat {
        /// The offending file
        path: PathBuf,
    },

    /// An info file failed to parse
    #[error("failed to parse {}: {message}", path.display())]
    Parse {
        /// The offending file
        path: PathBuf,
        /// Parse failure detail
        message: String,
    },

    /// Bad configuration; reported before any store interaction
    #[error("configuration error: {0}")]
    Config(String),

    /// Declared-type fault from the configuration layer
    #[error(transparent)]
    Kind(#[from] KindError),

    /// Fatal store fault (lock timeout, disk error, corruption)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Filesystem fault outside the per-file scan containment
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a configuration file
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Engine-level result alias.
pub type Result<T> = std::result::Result<T, EngineError>;
