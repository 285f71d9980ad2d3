//! Scalar value type for run input parameters
//!
//! Inputs are flat mappings of key → scalar, where the scalar set is closed:
//! string, integer, float, boolean. The whole catalog hinges on equality over
//! these values being exact:
//!
//! - Different types are NEVER equal (no type coercion)
//! - `Int(1)` != `Float(1.0)` != `Bool(true)` != `Str("1")`
//! - Float uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`
//!
//! SQLite happily coerces between numeric representations, so [`Value`]
//! equality, not the storage engine's comparison, is the source of truth for
//! every query result.

use serde::{Deserialize, Serialize};

/// A single input parameter value.
///
/// Serializes untagged, so an inputs mapping round-trips as a plain JSON
/// object (`{"omega": 0.057, "nsteps": 4000}`) while preserving the exact
/// type of every value: a JSON integer literal deserializes as [`Value::Int`],
/// any other JSON number as [`Value::Float`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean true or false
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit IEEE-754 floating point
    Float(f64),
    /// UTF-8 string
    Str(String),
}

impl Value {
    /// Returns the type name as a string (for error messages).
    ///
    /// Names match the declared-type names of the configuration layer.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
        }
    }

    /// Convert a JSON scalar into a typed value.
    ///
    /// Returns `None` for null, arrays, and objects — those are not legal
    /// input parameter values. JSON integers map to `Int`, every other number
    /// to `Float` (integers too large for `i64` fall back to `Float`).
    pub fn from_json(json: &serde_json::Value) -> Option<Value> {
        match json {
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float)),
            serde_json::Value::String(s) => Some(Value::Str(s.clone())),
            _ => None,
        }
    }

    /// Convert to the equivalent JSON scalar.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // IEEE-754 equality: NaN != NaN, -0.0 == 0.0
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            // Different types: NEVER equal (no type coercion)
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            // {:?} keeps a decimal form (1.0, not 1) so a rendered diff cannot
            // conflate Int(1) with Float(1.0)
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
