//! Decoded configuration values.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A decoded configuration value of arbitrary shape.
///
/// Mirrors the JSON data model. Accessors are checked: asking for the wrong
/// shape yields [`ConfigError::TypeMismatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// JSON `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Integer or floating-point number
    Number(serde_json::Number),
    /// String
    String(String),
    /// Ordered list
    List(Vec<ConfigValue>),
    /// Nested mapping
    Map(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Name of the variant, used in mismatch errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    const fn mismatch(&self, expected: &'static str) -> ConfigError {
        ConfigError::TypeMismatch {
            expected,
            found: self.type_name(),
        }
    }

    /// Borrow as a string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TypeMismatch`] unless the value is a string.
    pub fn as_str(&self) -> ConfigResult<&str> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }

    /// Read as a boolean.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TypeMismatch`] unless the value is a boolean.
    pub fn as_bool(&self) -> ConfigResult<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(other.mismatch("bool")),
        }
    }

    /// Read as a signed integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TypeMismatch`] unless the value is a number
    /// representable as `i64`.
    pub fn as_i64(&self) -> ConfigResult<i64> {
        match self {
            Self::Number(n) => n.as_i64().ok_or_else(|| self.mismatch("integer")),
            other => Err(other.mismatch("integer")),
        }
    }

    /// Read as an unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TypeMismatch`] unless the value is a number
    /// representable as `u64`.
    pub fn as_u64(&self) -> ConfigResult<u64> {
        match self {
            Self::Number(n) => n.as_u64().ok_or_else(|| self.mismatch("unsigned integer")),
            other => Err(other.mismatch("unsigned integer")),
        }
    }

    /// Read as a float. Integers are widened.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TypeMismatch`] unless the value is a number.
    pub fn as_f64(&self) -> ConfigResult<f64> {
        match self {
            Self::Number(n) => n.as_f64().ok_or_else(|| self.mismatch("float")),
            other => Err(other.mismatch("float")),
        }
    }

    /// Borrow as a list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TypeMismatch`] unless the value is a list.
    pub fn as_list(&self) -> ConfigResult<&[Self]> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(other.mismatch("list")),
        }
    }

    /// Borrow as a mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TypeMismatch`] unless the value is a mapping.
    pub fn as_map(&self) -> ConfigResult<&BTreeMap<String, Self>> {
        match self {
            Self::Map(map) => Ok(map),
            other => Err(other.mismatch("map")),
        }
    }

    /// Look up a field when the value is a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }
}

/// Strings render verbatim, numbers in their shortest form, composites as
/// compact JSON.
impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::List(_) | Self::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
