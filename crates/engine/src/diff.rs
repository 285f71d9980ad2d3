//! Diff Engine
//!
//! Two related operations over entry inputs:
//! - across a whole collection: which keys vary at all (drives the compact
//!   "only show what differs" tabular display)
//! - between exactly two entries: the differing subset of the key union,
//!   rendered horizontally (column-aligned table) or vertically (per-key
//!   blocks)
//!
//! A key absent on one side is a tagged [`FieldState::Missing`], never a
//! reused domain value, so a real value can never be mistaken for absence.

use std::collections::BTreeSet;

use rundex_core::{Entry, Inputs, Value};

/// Rendered for an absent key.
const MISSING_DISPLAY: &str = "<missing>";

/// Emitted by the horizontal layout when nothing differs.
pub const NO_DIFF_HORIZONTAL: &str = "No differences found.";

/// Emitted by the vertical layout when nothing differs.
pub const NO_DIFF_VERTICAL: &str = "No differing parameters between the two entries.";

/// One side of a key comparison: either a stored scalar or the absence of
/// the key. Distinct from every legitimate value by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldState {
    /// The key is present with this value
    Present(Value),
    /// The key is absent on this side
    Missing,
}

impl FieldState {
    fn of(inputs: &Inputs, key: &str) -> FieldState {
        match inputs.get(key) {
            Some(v) => FieldState::Present(v.clone()),
            None => FieldState::Missing,
        }
    }
}

impl std::fmt::Display for FieldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldState::Present(v) => write!(f, "{}", v),
            FieldState::Missing => f.write_str(MISSING_DISPLAY),
        }
    }
}

/// One differing key between two entries.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow {
    /// The input key
    pub key: String,
    /// State in the first entry
    pub left: FieldState,
    /// State in the second entry
    pub right: FieldState,
}

/// The set of input keys on which at least two entries of the collection
/// disagree. A key missing from some entries counts as a disagreeing state.
/// An empty collection yields an empty set.
pub fn differing_keys(entries: &[Entry]) -> BTreeSet<String> {
    let all_keys: BTreeSet<&str> = entries
        .iter()
        .flat_map(|e| e.inputs.keys().map(String::as_str))
        .collect();

    let mut differing = BTreeSet::new();
    for key in all_keys {
        let mut states = entries.iter().map(|e| FieldState::of(&e.inputs, key));
        if let Some(first) = states.next() {
            if states.any(|s| s != first) {
                differing.insert(key.to_string());
            }
        }
    }
    differing
}

/// For the union of both key sets, the rows where the two sides differ,
/// sorted by key.
pub fn pairwise_diff(left: &Inputs, right: &Inputs) -> Vec<DiffRow> {
    let keys: BTreeSet<&str> = left
        .keys()
        .chain(right.keys())
        .map(String::as_str)
        .collect();

    keys.into_iter()
        .filter_map(|key| {
            let l = FieldState::of(left, key);
            let r = FieldState::of(right, key);
            (l != r).then(|| DiffRow {
                key: key.to_string(),
                left: l,
                right: r,
            })
        })
        .collect()
}

fn width(text: &str) -> usize {
    text.chars().count()
}

/// Column-aligned table: `Key | <name1> | <name2>`, one row per differing
/// key. Column width is the longest cell (header included) in that column,
/// left-justified, three spaces between columns.
pub fn render_horizontal(name1: &str, name2: &str, rows: &[DiffRow]) -> String {
    if rows.is_empty() {
        return NO_DIFF_HORIZONTAL.to_string();
    }

    let cells: Vec<(String, String, String)> = rows
        .iter()
        .map(|row| (row.key.clone(), row.left.to_string(), row.right.to_string()))
        .collect();

    let key_width = cells
        .iter()
        .map(|(k, _, _)| width(k))
        .chain([width("Key")])
        .max()
        .unwrap_or(0);
    let left_width = cells
        .iter()
        .map(|(_, l, _)| width(l))
        .chain([width(name1)])
        .max()
        .unwrap_or(0);
    let right_width = cells
        .iter()
        .map(|(_, _, r)| width(r))
        .chain([width(name2)])
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(cells.len() + 2);
    lines.push(format!(
        "{:<key_width$}   {:<left_width$}   {:<right_width$}",
        "Key", name1, name2
    ));
    lines.push("-".repeat(key_width + left_width + right_width + 6));
    for (key, left, right) in &cells {
        lines.push(format!(
            "{:<key_width$}   {:<left_width$}   {:<right_width$}",
            key, left, right
        ));
    }
    lines.join("\n")
}

/// Per-key blocks: a `Differences:` heading, `[1] = value` / `[2] = value`
/// under each differing key, then the two entry names.
pub fn render_vertical(name1: &str, name2: &str, rows: &[DiffRow]) -> String {
    if rows.is_empty() {
        return NO_DIFF_VERTICAL.to_string();
    }

    let mut lines = vec!["Differences:".to_string()];
    for row in rows {
        lines.push(format!(
            "- {}:\n    [1] = {}\n    [2] = {}",
            row.key, row.left, row.right
        ));
    }
    lines.push(String::new());
    lines.push("Filenames:".to_string());
    lines.push(format!("[1]: {}", name1));
    lines.push(format!("[2]: {}", name2));
    lines.join("\n")
}
