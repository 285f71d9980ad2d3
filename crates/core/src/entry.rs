//! The indexed unit: one record per simulation run

use std::collections::BTreeMap;

use crate::value::Value;

/// Flat mapping of input parameter name → scalar value.
///
/// This is the sole field used for filtering. Ordering is irrelevant to
/// matching; a `BTreeMap` keeps serialization and display deterministic.
pub type Inputs = BTreeMap<String, Value>;

/// Auxiliary metadata attached to a run, shown only on request.
///
/// Values may be arbitrarily nested JSON; extra fields never participate in
/// filtering. May be empty.
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;

/// One indexed run, keyed by filename.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Unique run identifier: the info-file name with its suffix stripped
    pub filename: String,
    /// The parameters that produced the run
    pub inputs: Inputs,
    /// Non-filtering metadata; empty when the info file carried none
    pub extra_fields: ExtraFields,
}

impl Entry {
    /// Create an entry with empty extra fields.
    pub fn new(filename: impl Into<String>, inputs: Inputs) -> Self {
        Entry {
            filename: filename.into(),
            inputs,
            extra_fields: ExtraFields::new(),
        }
    }
}

/// Build an [`Inputs`] mapping from `(key, value)` pairs.
///
/// Convenience for tests and callers constructing constraints by hand.
pub fn inputs_from<I, K, V>(pairs: I) -> Inputs
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
