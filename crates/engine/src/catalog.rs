//! Catalog facade
//!
//! One catalog per output prefix: the prefix names both the output directory
//! (`<prefix>/`) and the database file (`<prefix>.db`) beside it. Each
//! operation opens the store, does its work, and drops the connection, so a
//! catalog value is cheap and holds no lock between calls.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use rundex_core::{Entry, Inputs};
use rundex_store::{IndexStore, DEFAULT_LOCK_TIMEOUT};

use crate::adapter::AdapterRegistry;
use crate::diff::{pairwise_diff, render_horizontal, render_vertical};
use crate::reconcile::{update_directory, UpdateOptions, UpdateReport};
use crate::search::find_by_subset;
use crate::{EngineError, Result};

/// Pairwise diff rendering choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffLayout {
    /// Column-aligned table, one row per differing key
    #[default]
    Horizontal,
    /// One block per differing key
    Vertical,
}

impl FromStr for DiffLayout {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<DiffLayout> {
        match s {
            "horizontal" => Ok(DiffLayout::Horizontal),
            "vertical" => Ok(DiffLayout::Vertical),
            _ => Err(EngineError::Config(format!(
                "unknown diff layout '{}' (expected 'horizontal' or 'vertical')",
                s
            ))),
        }
    }
}

/// Outcome of a delete: which artifacts went away, and which refused to.
#[derive(Debug, Default)]
pub struct DeleteReport {
    /// Files removed from the output directory
    pub deleted_files: Vec<PathBuf>,
    /// Files that could not be removed; the record is deleted regardless
    pub failures: Vec<(PathBuf, String)>,
}

/// Entry point for every catalog operation.
pub struct Catalog {
    prefix: String,
    lock_timeout: Duration,
    registry: AdapterRegistry,
}

impl Catalog {
    /// Catalog for `prefix` with the standard adapters and lock timeout.
    pub fn new(prefix: impl Into<String>) -> Catalog {
        Catalog {
            prefix: prefix.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            registry: AdapterRegistry::standard(),
        }
    }

    /// Override the bounded lock wait.
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Catalog {
        self.lock_timeout = lock_timeout;
        self
    }

    /// The directory scanned for info files.
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.prefix)
    }

    /// The database file beside the output directory.
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.db", self.prefix))
    }

    /// Fail early when the output directory is absent, before any store
    /// file is created.
    pub fn check_output_dir(&self) -> Result<()> {
        let dir = self.output_dir();
        if dir.is_dir() {
            Ok(())
        } else {
            Err(EngineError::OutputDirMissing {
                dir: dir.display().to_string(),
            })
        }
    }

    fn open_store(&self) -> Result<IndexStore> {
        Ok(IndexStore::open(&self.db_path(), self.lock_timeout)?)
    }

    /// Reconcile the store with the output directory.
    pub fn update(&self, options: &UpdateOptions) -> Result<UpdateReport> {
        self.check_output_dir()?;
        let store = self.open_store()?;
        let report = update_directory(&store, &self.output_dir(), &self.registry, options)?;
        info!("{}", report.summary());
        Ok(report)
    }

    /// All entries whose inputs superset-match `constraint`.
    pub fn search(&self, constraint: &Inputs) -> Result<Vec<Entry>> {
        self.check_output_dir()?;
        let store = self.open_store()?;
        find_by_subset(&store, constraint)
    }

    /// Exact lookup; a miss is [`EngineError::NotFound`].
    pub fn get_entry(&self, filename: &str) -> Result<Entry> {
        let store = self.open_store()?;
        store
            .get(filename)?
            .ok_or_else(|| EngineError::NotFound {
                filename: filename.to_string(),
            })
    }

    /// Render the pairwise diff of two entries. Both must exist.
    pub fn diff(&self, filename1: &str, filename2: &str, layout: DiffLayout) -> Result<String> {
        let first = self.get_entry(filename1)?;
        let second = self.get_entry(filename2)?;
        let rows = pairwise_diff(&first.inputs, &second.inputs);
        Ok(match layout {
            DiffLayout::Horizontal => render_horizontal(filename1, filename2, &rows),
            DiffLayout::Vertical => render_vertical(filename1, filename2, &rows),
        })
    }

    /// Remove a run: its output artifacts, then its store record.
    ///
    /// Artifacts are the directory entries named exactly `filename` or
    /// starting with `filename` followed by `_` or `.`, so `run1` never
    /// claims `run10`'s files. Unremovable files are reported, not fatal;
    /// the record is deleted either way so a re-update can re-index
    /// whatever survived.
    pub fn delete(&self, filename: &str) -> Result<DeleteReport> {
        self.check_output_dir()?;
        let mut report = DeleteReport::default();

        for dir_entry in std::fs::read_dir(self.output_dir())? {
            let dir_entry = dir_entry?;
            let name = dir_entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !belongs_to(name, filename) {
                continue;
            }
            let path = dir_entry.path();
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    info!(path = %path.display(), "deleted output file");
                    report.deleted_files.push(path);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not delete output file");
                    report.failures.push((path, e.to_string()));
                }
            }
        }

        let store = self.open_store()?;
        store.delete(filename)?;
        Ok(report)
    }

    /// Total number of indexed entries.
    pub fn count(&self) -> Result<u64> {
        self.check_output_dir()?;
        let store = self.open_store()?;
        Ok(store.count()?)
    }
}

fn belongs_to(file_name: &str, fileroot: &str) -> bool {
    match file_name.strip_prefix(fileroot) {
        Some("") => true,
        Some(rest) => rest.starts_with('_') || rest.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn layout_parses_both_names() {
        assert_eq!(DiffLayout::from_str("horizontal").unwrap(), DiffLayout::Horizontal);
        assert_eq!(DiffLayout::from_str("vertical").unwrap(), DiffLayout::Vertical);
        assert!(DiffLayout::from_str("sideways").is_err());
    }

    #[test]
    fn artifact_ownership_respects_name_boundaries() {
        assert!(belongs_to("run1", "run1"));
        assert!(belongs_to("run1_info.json", "run1"));
        assert!(belongs_to("run1_samples.dat", "run1"));
        assert!(belongs_to("run1.log", "run1"));
        assert!(!belongs_to("run10_info.json", "run1"));
        assert!(!belongs_to("run1a_info.json", "run1"));
        assert!(!belongs_to("other_info.json", "run1"));
    }

    fn is_dir(path: &Path) -> bool {
        path.is_dir()
    }

    #[test]
    fn missing_output_dir_is_reported_before_store_creation() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent").display().to_string();
        let catalog = Catalog::new(&prefix);

        let err = catalog.update(&UpdateOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::OutputDirMissing { .. }));
        assert!(!is_dir(&catalog.output_dir()));
        assert!(!catalog.db_path().exists());

        // count is gated too; a bare count must not conjure a database file
        let err = catalog.count().unwrap_err();
        assert!(matches!(err, EngineError::OutputDirMissing { .. }));
        assert!(!catalog.db_path().exists());
    }
}
