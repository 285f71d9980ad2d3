//! Info-file adapters
//!
//! A run's metadata lives next to its output artifacts as
//! `<fileroot>_info.<ext>`. Adapters turn one such file into the flat inputs
//! mapping plus the auxiliary extra fields; the registry selects an adapter
//! by file extension and defines which directory entries the reconciler
//! recognizes at all.

use std::fs;
use std::path::Path;

use rundex_core::{ExtraFields, Inputs, Value};

use crate::{EngineError, Result};

/// The filename marker separating the run identifier from the extension.
pub const INFO_MARKER: &str = "_info.";

/// Parses one info file into `(inputs, extra_fields)`.
pub trait InfoAdapter: Send + Sync + std::fmt::Debug {
    /// The file extension this adapter handles, without the dot.
    fn extension(&self) -> &'static str;

    /// Parse the file. Inputs must be scalar-valued; extra fields may nest.
    fn parse(&self, path: &Path) -> Result<(Inputs, ExtraFields)>;
}

/// JSON info files: the top-level `inputs` object is the parameter mapping,
/// every other top-level key becomes an extra field.
#[derive(Debug)]
pub struct JsonInfoAdapter;

impl InfoAdapter for JsonInfoAdapter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn parse(&self, path: &Path) -> Result<(Inputs, ExtraFields)> {
        let text = fs::read_to_string(path).map_err(|e| EngineError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let document: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| EngineError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let serde_json::Value::Object(mut fields) = document else {
            return Err(EngineError::Parse {
                path: path.to_path_buf(),
                message: "top level is not a JSON object".to_string(),
            });
        };

        let inputs = match fields.remove("inputs") {
            Some(serde_json::Value::Object(raw)) => {
                let mut inputs = Inputs::new();
                for (key, json) in raw {
                    let value = Value::from_json(&json).ok_or_else(|| EngineError::Parse {
                        path: path.to_path_buf(),
                        message: format!("input '{}' is not a scalar", key),
                    })?;
                    inputs.insert(key, value);
                }
                inputs
            }
            Some(_) => {
                return Err(EngineError::Parse {
                    path: path.to_path_buf(),
                    message: "'inputs' is not an object".to_string(),
                })
            }
            None => Inputs::new(),
        };

        Ok((inputs, fields))
    }
}

/// Extension-keyed adapter lookup.
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn InfoAdapter>>,
}

impl AdapterRegistry {
    /// Registry with the standard adapters.
    pub fn standard() -> AdapterRegistry {
        AdapterRegistry {
            adapters: vec![Box::new(JsonInfoAdapter)],
        }
    }

    /// Empty registry; for composing a custom adapter set.
    pub fn empty() -> AdapterRegistry {
        AdapterRegistry {
            adapters: Vec::new(),
        }
    }

    /// Register an additional adapter.
    pub fn register(&mut self, adapter: Box<dyn InfoAdapter>) {
        self.adapters.push(adapter);
    }

    /// Select the adapter for `path` by its extension.
    pub fn adapter_for(&self, path: &Path) -> Result<&dyn InfoAdapter> {
        let ext = path.extension().and_then(|e| e.to_str());
        self.adapters
            .iter()
            .find(|a| Some(a.extension()) == ext)
            .map(|a| a.as_ref())
            .ok_or_else(|| EngineError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
    }

    /// If `file_name` follows the `<fileroot>_info.<ext>` convention for a
    /// registered extension, return the run identifier.
    pub fn fileroot_of(&self, file_name: &str) -> Option<String> {
        for adapter in &self.adapters {
            let suffix = format!("{}{}", INFO_MARKER, adapter.extension());
            if let Some(root) = file_name.strip_suffix(&suffix) {
                if !root.is_empty() {
                    return Some(root.to_string());
                }
            }
        }
        None
    }
}
