//! End-to-end catalog tests over a real output directory and database file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use rundex_core::{inputs_from, Value};
use rundex_engine::{Catalog, DiffLayout, EngineError, UpdateOptions};

fn write_info(output_dir: &Path, fileroot: &str, body: &str) {
    fs::write(output_dir.join(format!("{}_info.json", fileroot)), body).unwrap();
}

/// A catalog rooted in a fresh tempdir, with the output directory created.
fn fresh_catalog(dir: &tempfile::TempDir) -> Catalog {
    let prefix = dir.path().join("output").display().to_string();
    fs::create_dir(dir.path().join("output")).unwrap();
    Catalog::new(prefix)
}

#[test]
fn update_indexes_every_info_file() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = fresh_catalog(&dir);
    let out = catalog.output_dir();
    write_info(&out, "run1", r#"{"inputs": {"omega": 0.057, "e0": 0.01}}"#);
    write_info(&out, "run2", r#"{"inputs": {"omega": 0.057, "e0": 0.02}}"#);
    // artifacts that are not info files are ignored
    fs::write(out.join("run1_samples.dat"), b"binary").unwrap();

    let report = catalog.update(&UpdateOptions::default()).unwrap();
    assert_eq!(report.seen, 2);
    assert_eq!(report.updated, 2);
    assert!(report.failures.is_empty());
    assert_eq!(catalog.count().unwrap(), 2);
}

#[test]
fn parse_failure_contained_to_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = fresh_catalog(&dir);
    let out = catalog.output_dir();
    write_info(&out, "good", r#"{"inputs": {"omega": 0.057}}"#);
    write_info(&out, "bad", "{ not json");

    let report = catalog.update(&UpdateOptions::default()).unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("bad_info.json"));

    // the good entry landed, the bad one did not
    assert!(catalog.get_entry("good").is_ok());
    assert!(matches!(
        catalog.get_entry("bad"),
        Err(EngineError::NotFound { .. })
    ));
}

#[test]
fn prune_removes_only_orphaned_records() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = fresh_catalog(&dir);
    let out = catalog.output_dir();
    write_info(&out, "run_a", r#"{"inputs": {"e0": 0.01}}"#);
    write_info(&out, "run_b", r#"{"inputs": {"e0": 0.02}}"#);
    write_info(&out, "run_c", r#"{"inputs": {"e0": 0.03}}"#);
    catalog.update(&UpdateOptions::default()).unwrap();

    fs::remove_file(out.join("run_a_info.json")).unwrap();

    // without prune the orphan stays
    catalog.update(&UpdateOptions::default()).unwrap();
    assert_eq!(catalog.count().unwrap(), 3);

    let report = catalog
        .update(&UpdateOptions {
            prune: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(report.pruned, vec!["run_a"]);
    assert_eq!(catalog.count().unwrap(), 2);
    assert!(catalog.get_entry("run_b").is_ok());
    assert!(catalog.get_entry("run_c").is_ok());
}

#[test]
fn fast_mode_skips_unchanged_and_reparses_touched() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = fresh_catalog(&dir);
    let out = catalog.output_dir();
    write_info(&out, "run1", r#"{"inputs": {"e0": 0.01}}"#);
    write_info(&out, "run2", r#"{"inputs": {"e0": 0.02}}"#);
    catalog.update(&UpdateOptions::default()).unwrap();

    let fast = UpdateOptions {
        fast: true,
        ..Default::default()
    };
    let report = catalog.update(&fast).unwrap();
    assert_eq!(report.skipped, 2);
    assert_eq!(report.updated, 0);

    // a rewrite bumps the mtime and forces a re-parse of that file only
    std::thread::sleep(Duration::from_millis(20));
    write_info(&out, "run1", r#"{"inputs": {"e0": 0.05}}"#);

    let report = catalog.update(&fast).unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        catalog.get_entry("run1").unwrap().inputs["e0"],
        Value::Float(0.05)
    );
}

#[test]
fn search_after_update_honors_types() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = fresh_catalog(&dir);
    let out = catalog.output_dir();
    write_info(
        &out,
        "run1",
        r#"{"inputs": {"omega": 0.057, "nsteps": 4000}}"#,
    );
    write_info(
        &out,
        "run2",
        r#"{"inputs": {"omega": 0.057, "nsteps": 8000}}"#,
    );
    write_info(&out, "run3", r#"{"inputs": {"omega": 0.06, "nsteps": 4000}}"#);
    catalog.update(&UpdateOptions::default()).unwrap();

    let hits = catalog
        .search(&inputs_from([("omega", Value::Float(0.057))]))
        .unwrap();
    let mut names: Vec<_> = hits.into_iter().map(|e| e.filename).collect();
    names.sort();
    assert_eq!(names, vec!["run1", "run2"]);

    // integer-typed literal in the file, integer-typed constraint required
    let hits = catalog
        .search(&inputs_from([("nsteps", Value::Int(4000))]))
        .unwrap();
    assert_eq!(hits.len(), 2);
    let hits = catalog
        .search(&inputs_from([("nsteps", Value::Float(4000.0))]))
        .unwrap();
    assert!(hits.is_empty());
}

#[test]
fn diff_renders_both_layouts() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = fresh_catalog(&dir);
    let out = catalog.output_dir();
    write_info(
        &out,
        "run1",
        r#"{"inputs": {"omega": 0.057, "e0": 0.01, "dt": 0.05}}"#,
    );
    write_info(
        &out,
        "run2",
        r#"{"inputs": {"omega": 0.057, "e0": 0.02, "dt": 0.05}}"#,
    );
    catalog.update(&UpdateOptions::default()).unwrap();

    let table = catalog.diff("run1", "run2", DiffLayout::Horizontal).unwrap();
    assert!(table.starts_with("Key"));
    assert!(table.contains("e0"));
    assert!(!table.contains("omega"));

    let blocks = catalog.diff("run1", "run2", DiffLayout::Vertical).unwrap();
    assert!(blocks.starts_with("Differences:"));
    assert!(blocks.contains("[1] = 0.01"));
    assert!(blocks.contains("[2] = 0.02"));

    assert!(matches!(
        catalog.diff("run1", "ghost", DiffLayout::Horizontal),
        Err(EngineError::NotFound { .. })
    ));
}

#[test]
fn delete_removes_artifacts_and_record_within_boundaries() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = fresh_catalog(&dir);
    let out = catalog.output_dir();
    write_info(&out, "run1", r#"{"inputs": {"e0": 0.01}}"#);
    write_info(&out, "run10", r#"{"inputs": {"e0": 0.02}}"#);
    fs::write(out.join("run1_samples.dat"), b"x").unwrap();
    fs::write(out.join("run1.log"), b"x").unwrap();
    catalog.update(&UpdateOptions::default()).unwrap();

    let report = catalog.delete("run1").unwrap();
    assert_eq!(report.deleted_files.len(), 3);
    assert!(report.failures.is_empty());

    // run10 untouched on disk and in the store
    assert!(out.join("run10_info.json").exists());
    assert!(catalog.get_entry("run10").is_ok());
    assert!(matches!(
        catalog.get_entry("run1"),
        Err(EngineError::NotFound { .. })
    ));

    // deleting again is a no-op for the record
    let report = catalog.delete("run1").unwrap();
    assert!(report.deleted_files.is_empty());
}

#[test]
fn database_survives_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("output").display().to_string();
    fs::create_dir(dir.path().join("output")).unwrap();

    {
        let catalog = Catalog::new(&prefix);
        write_info(
            &catalog.output_dir(),
            "run1",
            r#"{"inputs": {"omega": 0.057}, "host": "node7"}"#,
        );
        catalog.update(&UpdateOptions::default()).unwrap();
    }

    let catalog = Catalog::new(&prefix).with_lock_timeout(Duration::from_secs(5));
    let entry = catalog.get_entry("run1").unwrap();
    assert_eq!(entry.inputs["omega"], Value::Float(0.057));
    assert_eq!(entry.extra_fields["host"], serde_json::json!("node7"));
}
