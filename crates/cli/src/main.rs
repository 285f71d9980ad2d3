//! rundex CLI — maintain and query a catalog of simulation runs.
//!
//! The catalog lives beside the runs: outputs under `<prefix>/`, the index
//! in `<prefix>.db`. Query commands reconcile the index first (fast mode,
//! with pruning) unless `--no-update` is passed, so results reflect what is
//! actually on disk.

mod commands;
mod format;
mod parse;

use std::io::Write;
use std::process;
use std::str::FromStr;

use clap::ArgMatches;
use tracing_subscriber::EnvFilter;

use rundex_core::Inputs;
use rundex_engine::{
    load_input_keys, load_search_presets, Catalog, DiffLayout, EngineError, UpdateOptions,
};

use commands::build_cli;
use format::{
    format_match_count, format_matches, format_search, format_single, format_total_count,
    PrintStyle,
};
use parse::constraint_from;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), EngineError> {
    let input_keys = load_input_keys()?;
    let matches = build_cli(&input_keys).get_matches();

    let prefix = matches
        .get_one::<String>("prefix")
        .cloned()
        .unwrap_or_else(|| "output".to_string());
    let catalog = Catalog::new(prefix);

    match matches.subcommand() {
        Some(("update", m)) => {
            let options = UpdateOptions {
                prune: m.get_flag("prune"),
                fast: m.get_flag("fast"),
            };
            let report = catalog.update(&options)?;
            report_failures(&report);
            for name in &report.pruned {
                println!("Pruned '{}'.", name);
            }
            println!("{}", report.summary());
            Ok(())
        }

        Some(("print", m)) => {
            refresh_unless_skipped(&catalog, m)?;
            let constraint = constraint_from(m, &input_keys)?;
            let style = print_style(m)?;
            let entries = catalog.search(&constraint)?;
            println!("{}", format_matches(&entries, style, &collected(m, "show-field")));
            Ok(())
        }

        Some(("print-entry", m)) => {
            let filename = m.get_one::<String>("filename").unwrap();
            let style = print_style(m)?;
            match catalog.get_entry(filename) {
                Ok(entry) => {
                    println!("{}", format_single(&entry, style, &collected(m, "show-field")));
                    Ok(())
                }
                // a miss is an answer here, not a fault
                Err(EngineError::NotFound { filename }) => {
                    println!("No record found for filename '{}'.", filename);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }

        Some(("print-diff", m)) => {
            let layout = DiffLayout::from_str(m.get_one::<String>("style").unwrap())?;
            let text = catalog.diff(
                m.get_one::<String>("filename1").unwrap(),
                m.get_one::<String>("filename2").unwrap(),
                layout,
            )?;
            println!("{}", text);
            Ok(())
        }

        Some(("number", m)) => {
            refresh_unless_skipped(&catalog, m)?;
            let constraint = constraint_from(m, &input_keys)?;
            if constraint.is_empty() {
                println!("{}", format_total_count(catalog.count()?));
            } else {
                println!("{}", format_match_count(catalog.search(&constraint)?.len()));
            }
            Ok(())
        }

        Some(("search", m)) => {
            refresh_unless_skipped(&catalog, m)?;

            // without a preset, search runs on the filter flags alone
            let (mut constraint, print_keys) = match m.get_one::<String>("search-config") {
                Some(name) => {
                    let presets = load_search_presets()?;
                    let preset = presets.get(name).ok_or_else(|| {
                        let known: Vec<&str> = presets.keys().map(String::as_str).collect();
                        EngineError::Config(format!(
                            "unknown search preset '{}' (known: {})",
                            name,
                            if known.is_empty() {
                                "none".to_string()
                            } else {
                                known.join(", ")
                            }
                        ))
                    })?;
                    (preset.filters.clone(), preset.print_keys.clone())
                }
                None => (Inputs::new(), Vec::new()),
            };

            // flags override the preset's stored filters
            constraint.extend(constraint_from(m, &input_keys)?);
            let entries = catalog.search(&constraint)?;
            println!("{}", format_search(&entries, &print_keys));
            Ok(())
        }

        Some(("delete", m)) => {
            let filename = m.get_one::<String>("filename").unwrap();
            if !m.get_flag("force") && !confirm_delete(&catalog, filename)? {
                println!("Aborted.");
                return Ok(());
            }
            let report = catalog.delete(filename)?;
            for (path, message) in &report.failures {
                eprintln!("warning: could not delete {}: {}", path.display(), message);
            }
            println!(
                "Deleted {} file(s) for '{}'.",
                report.deleted_files.len(),
                filename
            );
            Ok(())
        }

        _ => Ok(()),
    }
}

/// Query commands see a freshly reconciled index unless told otherwise.
fn refresh_unless_skipped(catalog: &Catalog, matches: &ArgMatches) -> Result<(), EngineError> {
    if matches.get_flag("no-update") {
        return Ok(());
    }
    let report = catalog.update(&UpdateOptions {
        prune: true,
        fast: true,
    })?;
    report_failures(&report);
    Ok(())
}

fn report_failures(report: &rundex_engine::UpdateReport) {
    for failure in &report.failures {
        eprintln!("warning: {}: {}", failure.path.display(), failure.message);
    }
}

fn confirm_delete(catalog: &Catalog, filename: &str) -> Result<bool, EngineError> {
    print!(
        "Delete all files for '{}' under '{}'? [y/N] ",
        filename,
        catalog.output_dir().display()
    );
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn print_style(matches: &ArgMatches) -> Result<PrintStyle, EngineError> {
    let style = matches
        .get_one::<String>("print-style")
        .map(String::as_str)
        .unwrap_or("full");
    PrintStyle::from_str(style).map_err(EngineError::Config)
}

fn collected(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}
