//! Declared-type registry for input keys
//!
//! The configuration layer declares a scalar kind for every known input key
//! (`"omega": "float"`, `"restart": "bool"`, ...). Those declarations drive
//! the CLI filter flags: the text a user passes is parsed into a typed
//! [`Value`] by the declared kind, never guessed. Unknown kind names are
//! rejected up front, before any store interaction, because they invalidate
//! the whole constraint schema.

use thiserror::Error;

use crate::value::Value;

/// Errors from declared-type lookup and text parsing.
#[derive(Debug, Error)]
pub enum KindError {
    /// The configuration declared a type name outside the supported set
    #[error("unsupported declared type '{kind}' for input key '{key}' (supported: str, int, float, bool)")]
    UnknownKind {
        /// The input key with the bad declaration
        key: String,
        /// The unsupported type name
        kind: String,
    },

    /// Command-line text did not parse as the declared kind
    #[error("invalid {kind} value: '{text}'")]
    InvalidValue {
        /// The declared kind name
        kind: &'static str,
        /// The offending text
        text: String,
    },
}

/// The closed set of supported scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// UTF-8 string
    Str,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// Boolean
    Bool,
}

impl ScalarKind {
    /// Look up a declared type name. Returns `None` for unknown names; the
    /// caller attaches the offending key when reporting.
    pub fn from_name(name: &str) -> Option<ScalarKind> {
        match name {
            "str" => Some(ScalarKind::Str),
            "int" => Some(ScalarKind::Int),
            "float" => Some(ScalarKind::Float),
            "bool" => Some(ScalarKind::Bool),
            _ => None,
        }
    }

    /// The canonical name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Str => "str",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
        }
    }

    /// Parse command-line text into a typed value of this kind.
    pub fn parse(&self, text: &str) -> Result<Value, KindError> {
        match self {
            ScalarKind::Str => Ok(Value::Str(text.to_string())),
            ScalarKind::Int => text
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| KindError::InvalidValue {
                    kind: "int",
                    text: text.to_string(),
                }),
            ScalarKind::Float => text
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| KindError::InvalidValue {
                    kind: "float",
                    text: text.to_string(),
                }),
            ScalarKind::Bool => parse_bool(text).map(Value::Bool),
        }
    }
}

/// Lenient boolean parsing: `1/true/yes` and `0/false/no`, case-insensitive.
/// Empty input is `false`.
fn parse_bool(text: &str) -> Result<bool, KindError> {
    let trimmed = text.trim().to_ascii_lowercase();
    match trimmed.as_str() {
        "" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(KindError::InvalidValue {
            kind: "bool",
            text: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_resolve() {
        assert_eq!(ScalarKind::from_name("str"), Some(ScalarKind::Str));
        assert_eq!(ScalarKind::from_name("int"), Some(ScalarKind::Int));
        assert_eq!(ScalarKind::from_name("float"), Some(ScalarKind::Float));
        assert_eq!(ScalarKind::from_name("bool"), Some(ScalarKind::Bool));
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(ScalarKind::from_name("complex"), None);
        assert_eq!(ScalarKind::from_name("STR"), None);
    }

    #[test]
    fn parses_typed_values() {
        assert_eq!(ScalarKind::Int.parse("42").unwrap(), Value::Int(42));
        assert_eq!(
            ScalarKind::Float.parse("0.057").unwrap(),
            Value::Float(0.057)
        );
        assert_eq!(
            ScalarKind::Str.parse("0.057").unwrap(),
            Value::Str("0.057".into())
        );
    }

    #[test]
    fn float_text_does_not_parse_as_int() {
        assert!(ScalarKind::Int.parse("1.5").is_err());
    }

    #[test]
    fn bool_accepts_the_usual_spellings() {
        for text in ["1", "true", "YES", " True "] {
            assert_eq!(ScalarKind::Bool.parse(text).unwrap(), Value::Bool(true));
        }
        for text in ["0", "false", "no", ""] {
            assert_eq!(ScalarKind::Bool.parse(text).unwrap(), Value::Bool(false));
        }
        assert!(ScalarKind::Bool.parse("maybe").is_err());
    }
}
