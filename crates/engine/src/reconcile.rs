//! Reconciler: bring the Index Store into agreement with the output directory
//!
//! ## Fast mode
//!
//! Fast mode skips re-parsing files the store already believes current. The
//! staleness gate compares the stored mtime against the file's current mtime
//! within [`MTIME_EPSILON`]; rows written before mtime tracking existed are
//! skipped unconditionally while the file is present. Fast mode trades
//! completeness for throughput — a content change under an unbumped mtime is
//! missed — so callers needing strict correctness run a full update.
//!
//! ## Partial progress
//!
//! Each upsert and each prune deletion commits on its own. An interrupted
//! scan leaves the store valid but incomplete; there is no rollback.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use tracing::{debug, info, warn};

use rundex_store::IndexStore;

use crate::adapter::AdapterRegistry;
use crate::{EngineError, Result};

/// Tolerance when comparing stored and filesystem mtimes, in seconds.
pub const MTIME_EPSILON: f64 = 1e-6;

/// Knobs for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Remove store records whose info file no longer exists
    pub prune: bool,
    /// Skip re-parsing files believed current (see module docs)
    pub fast: bool,
}

/// One file the scan could not parse; the scan continues past these.
#[derive(Debug)]
pub struct ParseFailure {
    /// The offending info file
    pub path: PathBuf,
    /// Failure detail
    pub message: String,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Run identifiers observed in the directory this pass
    pub seen: usize,
    /// Records inserted or refreshed
    pub updated: usize,
    /// Files skipped by the fast-mode staleness gate
    pub skipped: usize,
    /// Records pruned because their info file is gone
    pub pruned: Vec<String>,
    /// Files that failed to parse and were left untouched in the store
    pub failures: Vec<ParseFailure>,
}

impl UpdateReport {
    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "update complete: {} seen, {} updated, {} skipped, {} pruned, {} failed",
            self.seen,
            self.updated,
            self.skipped,
            self.pruned.len(),
            self.failures.len()
        )
    }
}

/// Scan `dir` for recognized info files and reconcile the store with them.
pub fn update_directory(
    store: &IndexStore,
    dir: &Path,
    registry: &AdapterRegistry,
    options: &UpdateOptions,
) -> Result<UpdateReport> {
    if !dir.is_dir() {
        return Err(EngineError::OutputDirMissing {
            dir: dir.display().to_string(),
        });
    }

    let stored_mtimes = if options.fast {
        store.stored_mtimes()?
    } else {
        Default::default()
    };

    let mut report = UpdateReport::default();
    let mut seen = BTreeSet::new();

    for dir_entry in std::fs::read_dir(dir)? {
        let dir_entry = dir_entry?;
        let file_name = dir_entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let Some(fileroot) = registry.fileroot_of(file_name) else {
            continue;
        };
        let path = dir_entry.path();
        seen.insert(fileroot.clone());

        let mtime = file_mtime(&path);

        if options.fast {
            if let Some(stored) = stored_mtimes.get(&fileroot) {
                let unchanged = match (stored, mtime) {
                    (Some(s), Some(m)) => (s - m).abs() <= MTIME_EPSILON,
                    // legacy row without mtime tracking: present means current
                    (None, _) => true,
                    // mtime unreadable now: assume changed
                    (Some(_), None) => false,
                };
                if unchanged {
                    debug!(fileroot, "fast mode: skipping current entry");
                    report.skipped += 1;
                    continue;
                }
            }
        }

        match registry.adapter_for(&path).and_then(|a| a.parse(&path)) {
            Ok((inputs, extra_fields)) => {
                store.upsert(&fileroot, &inputs, &extra_fields, mtime)?;
                report.updated += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to process info file");
                report.failures.push(ParseFailure {
                    path,
                    message: e.to_string(),
                });
            }
        }
    }
    report.seen = seen.len();

    if options.prune {
        let missing: Vec<String> = store
            .list_filenames()?
            .into_iter()
            .filter(|name| !seen.contains(name))
            .collect();
        for name in missing {
            info!(filename = %name, "pruning entry with no backing file");
            store.delete(&name)?;
            report.pruned.push(name);
        }
    }

    Ok(report)
}

fn file_mtime(path: &Path) -> Option<f64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    modified
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs_f64())
}
