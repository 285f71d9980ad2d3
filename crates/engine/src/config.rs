//! Layered named configuration
//!
//! A named config (`inputs`, `search`, ...) is a flat JSON object assembled
//! from up to three layers, later layers overriding earlier ones per
//! top-level key:
//!
//! 1. the packaged default (only `inputs` ships one)
//! 2. `<config dir>/rundex/<name>.json` in the user's configuration directory
//! 3. `rundex.<name>.json` in the working directory
//!
//! A *replace* variant short-circuits the layering entirely: if
//! `rundex.<name>.replace.json` exists in the working directory, or
//! `<name>.replace.json` in the user config directory, that single file is
//! the whole config. The working directory is checked first.
//!
//! Configs are validated eagerly — a bad declaration fails the whole load
//! before any store interaction.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use rundex_core::{Inputs, KindError, ScalarKind, Value};

use crate::{EngineError, Result};

/// Directory name under the user configuration root, and the prefix of
/// working-directory config files.
pub const APP_NAME: &str = "rundex";

const DEFAULT_INPUTS: &str = include_str!("../data/inputs.json");

type ConfigMap = serde_json::Map<String, serde_json::Value>;

/// One named search preset: a stored constraint plus the keys to show.
#[derive(Debug, Clone, Default)]
pub struct SearchPreset {
    /// The subset constraint to apply
    pub filters: Inputs,
    /// Input keys to display for each match; empty means the default view
    pub print_keys: Vec<String>,
}

/// Assemble the named config from its layers (see module docs).
pub fn load_named_config(name: &str) -> Result<ConfigMap> {
    for path in replace_candidates(name) {
        if let Some(map) = read_config_file(&path)? {
            debug!(config = name, path = %path.display(), "replace config found");
            return Ok(map);
        }
    }

    let mut merged = ConfigMap::new();
    if name == "inputs" {
        merged = parse_object(DEFAULT_INPUTS, Path::new("<packaged default>"))?;
    }
    for path in layer_candidates(name) {
        if let Some(map) = read_config_file(&path)? {
            debug!(config = name, path = %path.display(), "merging config layer");
            for (key, value) in map {
                merged.insert(key, value);
            }
        }
    }
    Ok(merged)
}

/// The declared scalar kind for every known input key.
pub fn load_input_keys() -> Result<BTreeMap<String, ScalarKind>> {
    input_keys_from(&load_named_config("inputs")?)
}

/// Named search presets from the `search_config` config.
pub fn load_search_presets() -> Result<BTreeMap<String, SearchPreset>> {
    presets_from(&load_named_config("search_config")?)
}

// ============================================================
// Layer resolution
// ============================================================

fn user_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join(APP_NAME))
}

fn replace_candidates(name: &str) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(format!("{}.{}.replace.json", APP_NAME, name))];
    if let Some(dir) = user_config_dir() {
        paths.push(dir.join(format!("{}.replace.json", name)));
    }
    paths
}

fn layer_candidates(name: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = user_config_dir() {
        paths.push(dir.join(format!("{}.json", name)));
    }
    paths.push(PathBuf::from(format!("{}.{}.json", APP_NAME, name)));
    paths
}

fn read_config_file(path: &Path) -> Result<Option<ConfigMap>> {
    match fs::read_to_string(path) {
        Ok(text) => parse_object(&text, path).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_object(text: &str, path: &Path) -> Result<ConfigMap> {
    let document: serde_json::Value =
        serde_json::from_str(text).map_err(|e| EngineError::Config(format!(
            "{}: {}",
            path.display(),
            e
        )))?;
    match document {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(EngineError::Config(format!(
            "{}: top level is not a JSON object",
            path.display()
        ))),
    }
}

// ============================================================
// Validation
// ============================================================

fn input_keys_from(map: &ConfigMap) -> Result<BTreeMap<String, ScalarKind>> {
    let mut keys = BTreeMap::new();
    for (key, declared) in map {
        let Some(kind_name) = declared.as_str() else {
            return Err(EngineError::Config(format!(
                "input key '{}': declared type must be a string, got {}",
                key, declared
            )));
        };
        let kind = ScalarKind::from_name(kind_name).ok_or_else(|| KindError::UnknownKind {
            key: key.clone(),
            kind: kind_name.to_string(),
        })?;
        keys.insert(key.clone(), kind);
    }
    Ok(keys)
}

fn presets_from(map: &ConfigMap) -> Result<BTreeMap<String, SearchPreset>> {
    let mut presets = BTreeMap::new();
    for (name, body) in map {
        let Some(body) = body.as_object() else {
            return Err(EngineError::Config(format!(
                "search preset '{}' is not an object",
                name
            )));
        };

        let mut preset = SearchPreset::default();
        if let Some(filters) = body.get("filters") {
            let Some(filters) = filters.as_object() else {
                return Err(EngineError::Config(format!(
                    "search preset '{}': 'filters' is not an object",
                    name
                )));
            };
            for (key, json) in filters {
                let value = Value::from_json(json).ok_or_else(|| {
                    EngineError::Config(format!(
                        "search preset '{}': filter '{}' is not a scalar",
                        name, key
                    ))
                })?;
                preset.filters.insert(key.clone(), value);
            }
        }
        if let Some(print_keys) = body.get("print_keys") {
            let Some(print_keys) = print_keys.as_array() else {
                return Err(EngineError::Config(format!(
                    "search preset '{}': 'print_keys' is not an array",
                    name
                )));
            };
            for key in print_keys {
                let Some(key) = key.as_str() else {
                    return Err(EngineError::Config(format!(
                        "search preset '{}': 'print_keys' entries must be strings",
                        name
                    )));
                };
                preset.print_keys.push(key.to_string());
            }
        }
        presets.insert(name.clone(), preset);
    }
    Ok(presets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(text: &str) -> ConfigMap {
        parse_object(text, Path::new("<test>")).unwrap()
    }

    #[test]
    fn packaged_default_is_a_valid_key_table() {
        let keys = input_keys_from(&object(DEFAULT_INPUTS)).unwrap();
        assert_eq!(keys["omega"], ScalarKind::Float);
        assert_eq!(keys["nsteps"], ScalarKind::Int);
        assert_eq!(keys["restart"], ScalarKind::Bool);
        assert_eq!(keys["integrator"], ScalarKind::Str);
    }

    #[test]
    fn unknown_declared_type_fails_the_whole_load() {
        let err = input_keys_from(&object(r#"{"omega": "complex"}"#)).unwrap_err();
        assert!(matches!(err, EngineError::Kind(KindError::UnknownKind { .. })));
    }

    #[test]
    fn non_string_declaration_is_a_config_error() {
        let err = input_keys_from(&object(r#"{"omega": 3}"#)).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn presets_carry_typed_filters_and_print_keys() {
        let presets = presets_from(&object(
            r#"{"strong_kick": {"filters": {"e0": 0.03, "nsteps": 4000}, "print_keys": ["omega", "dt"]}}"#,
        ))
        .unwrap();
        let preset = &presets["strong_kick"];
        assert_eq!(preset.filters["e0"], Value::Float(0.03));
        assert_eq!(preset.filters["nsteps"], Value::Int(4000));
        assert_eq!(preset.print_keys, vec!["omega", "dt"]);
    }

    #[test]
    fn preset_file_in_the_documented_format_keeps_its_print_keys() {
        let presets = presets_from(&object(r#"{"default": {"print_keys": ["omega"]}}"#)).unwrap();
        assert_eq!(presets["default"].print_keys, vec!["omega"]);
    }

    #[test]
    fn preset_filters_and_print_are_optional() {
        let presets = presets_from(&object(r#"{"all": {}}"#)).unwrap();
        assert!(presets["all"].filters.is_empty());
        assert!(presets["all"].print_keys.is_empty());
    }

    #[test]
    fn nested_filter_value_is_rejected() {
        let err = presets_from(&object(r#"{"bad": {"filters": {"grid": [1, 2]}}}"#)).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn top_level_non_object_is_rejected() {
        assert!(parse_object("[1, 2]", Path::new("<test>")).is_err());
        assert!(parse_object("not json", Path::new("<test>")).is_err());
    }
}
