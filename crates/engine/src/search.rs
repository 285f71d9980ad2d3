//! Subset Query Engine
//!
//! A record matches a constraint when its inputs mapping contains every
//! `(key, value)` pair of the constraint with exact type-and-value equality.
//! The store's `json_extract` narrowing runs first as an index-accelerated
//! coarse pass, then every candidate is re-verified here in memory. The
//! second pass is the correctness property: the narrowing layer is permitted
//! false positives, the result set is not.

use rundex_core::{Entry, Inputs};
use rundex_store::IndexStore;

use crate::Result;

/// True when `inputs` is a superset of `constraint` under exact typed
/// equality. An empty constraint matches everything.
pub fn matches_subset(inputs: &Inputs, constraint: &Inputs) -> bool {
    constraint
        .iter()
        .all(|(key, want)| inputs.get(key) == Some(want))
}

/// Every entry whose inputs superset-match `constraint`, in the store's
/// natural return order.
pub fn find_by_subset(store: &IndexStore, constraint: &Inputs) -> Result<Vec<Entry>> {
    let candidates = store.candidates(constraint)?;
    Ok(candidates
        .into_iter()
        .filter(|entry| matches_subset(&entry.inputs, constraint))
        .collect())
}
