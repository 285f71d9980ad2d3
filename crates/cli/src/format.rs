//! Human-readable rendering of query results.

use std::str::FromStr;

use rundex_core::{Entry, ExtraFields, Inputs};
use rundex_engine::differing_keys;

/// How `print` renders its matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintStyle {
    /// Filenames only
    Names,
    /// Numbered filenames
    Brief,
    /// Numbered filenames with the full inputs mapping
    #[default]
    Full,
    /// Numbered filenames with only the inputs that vary across the matches
    Diff,
}

impl FromStr for PrintStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<PrintStyle, String> {
        match s {
            "names" => Ok(PrintStyle::Names),
            "brief" => Ok(PrintStyle::Brief),
            "full" => Ok(PrintStyle::Full),
            "diff" => Ok(PrintStyle::Diff),
            _ => Err(format!(
                "unknown print style '{}' (expected names, brief, full, or diff)",
                s
            )),
        }
    }
}

/// Render a result set in the requested style.
pub fn format_matches(entries: &[Entry], style: PrintStyle, show_fields: &[String]) -> String {
    if entries.is_empty() {
        return "No matching records found.".to_string();
    }

    match style {
        PrintStyle::Names => {
            let mut lines = vec!["Matching entries:".to_string()];
            lines.extend(entries.iter().map(|e| e.filename.clone()));
            lines.join("\n")
        }
        PrintStyle::Brief => {
            let mut lines = vec!["Matching entries:".to_string()];
            lines.extend(
                entries
                    .iter()
                    .enumerate()
                    .map(|(i, e)| format!("{} Filename: {}", i + 1, e.filename)),
            );
            lines.join("\n")
        }
        PrintStyle::Full => {
            let mut lines = vec!["Matching entries:".to_string()];
            for (i, entry) in entries.iter().enumerate() {
                lines.push(entry_line(i + 1, entry, &entry.inputs, show_fields));
            }
            lines.join("\n")
        }
        PrintStyle::Diff => {
            let varying = differing_keys(entries);
            let mut lines = vec!["Differing Inputs:".to_string()];
            for (i, entry) in entries.iter().enumerate() {
                let reduced: Inputs = entry
                    .inputs
                    .iter()
                    .filter(|(k, _)| varying.contains(*k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                lines.push(entry_line(i + 1, entry, &reduced, show_fields));
            }
            lines.join("\n")
        }
    }
}

/// Render a preset's result set, restricted to its print keys (all inputs
/// when the preset names none).
pub fn format_search(entries: &[Entry], print_keys: &[String]) -> String {
    if entries.is_empty() {
        return "No matching records found.".to_string();
    }
    let mut lines = vec!["Matching entries:".to_string()];
    for (i, entry) in entries.iter().enumerate() {
        let shown: Inputs = if print_keys.is_empty() {
            entry.inputs.clone()
        } else {
            print_keys
                .iter()
                .filter_map(|k| entry.inputs.get(k).map(|v| (k.clone(), v.clone())))
                .collect()
        };
        lines.push(entry_line(i + 1, entry, &shown, &[]));
    }
    lines.join("\n")
}

/// Render one entry on its own. A lone entry has no peers to differ from,
/// so the diff style shows everything, like full.
pub fn format_single(entry: &Entry, style: PrintStyle, show_fields: &[String]) -> String {
    match style {
        PrintStyle::Names => entry.filename.clone(),
        PrintStyle::Brief => format!("Filename: {}", entry.filename),
        PrintStyle::Full | PrintStyle::Diff => {
            let mut lines = vec![
                format!("Filename: {}", entry.filename),
                "Inputs:".to_string(),
                pretty_inputs(&entry.inputs),
            ];
            for path in show_fields {
                lines.push(format!("{}: {}", path, lookup_field(&entry.extra_fields, path)));
            }
            lines.join("\n")
        }
    }
}

/// Count message for an unfiltered `number`.
pub fn format_total_count(n: u64) -> String {
    format!("Number of entries in the database: {}", n)
}

/// Count message for a filtered `number`.
pub fn format_match_count(n: usize) -> String {
    format!("Number of matching records: {}", n)
}

fn entry_line(index: usize, entry: &Entry, inputs: &Inputs, show_fields: &[String]) -> String {
    let mut line = format!(
        "{} Filename: {}  Inputs: {}",
        index,
        entry.filename,
        inline_inputs(inputs)
    );
    for path in show_fields {
        line.push_str(&format!(
            "  {}: {}",
            path,
            lookup_field(&entry.extra_fields, path)
        ));
    }
    line
}

fn inline_inputs(inputs: &Inputs) -> String {
    let pairs: Vec<String> = inputs.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
    format!("{{{}}}", pairs.join(", "))
}

fn pretty_inputs(inputs: &Inputs) -> String {
    inputs
        .iter()
        .map(|(k, v)| format!("    {} = {}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Walk a dotted path into the extra fields. Absent paths render as
/// `<missing>`, matching the diff sentinel.
fn lookup_field(extra: &ExtraFields, path: &str) -> String {
    let mut current: Option<&serde_json::Value> = None;
    for (i, segment) in path.split('.').enumerate() {
        current = if i == 0 {
            extra.get(segment)
        } else {
            current.and_then(|v| v.get(segment))
        };
        if current.is_none() {
            return "<missing>".to_string();
        }
    }
    match current {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "<missing>".to_string(),
    }
}
