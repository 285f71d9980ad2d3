//! ArgMatches → typed constraint conversion.
//!
//! Filter flag text is parsed by the key's declared kind, never guessed, so
//! `--nsteps 4000` becomes an integer constraint and `--omega 0.057` a float
//! one. A flag the user did not pass contributes nothing to the constraint.

use std::collections::BTreeMap;

use clap::ArgMatches;

use rundex_core::{Inputs, ScalarKind};
use rundex_engine::Result;

/// Collect the typed subset constraint from whichever filter flags were
/// passed.
pub fn constraint_from(
    matches: &ArgMatches,
    input_keys: &BTreeMap<String, ScalarKind>,
) -> Result<Inputs> {
    let mut constraint = Inputs::new();
    for (key, kind) in input_keys {
        if let Some(text) = matches.get_one::<String>(key.as_str()) {
            constraint.insert(key.clone(), kind.parse(text)?);
        }
    }
    Ok(constraint)
}
