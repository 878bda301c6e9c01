//! Raw attribute values and value-type detection.
//!
//! # Responsibility
//! - Represent any payload an extender attribute can hold.
//! - Classify payloads into the closed `integer|text` value-type set.
//! - Convert raw payloads at read time, never at write time.
//!
//! # Invariants
//! - `detect_value_type` never inspects anything beyond the raw payload and
//!   the explicit override.
//! - Numeric conversion is lossy and total: non-numeric text reads as `0`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Manifest string for the integer value type.
pub const VALUE_TYPE_INTEGER: &str = "integer";
/// Manifest string for the text value type.
pub const VALUE_TYPE_TEXT: &str = "text";

// ASCII whitespace only; `\s` would also accept Unicode spaces.
static NUMERIC_STRING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t\n\r\x0B\x0C]*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?[ \t\n\r\x0B\x0C]*$")
        .expect("numeric string pattern is valid")
});

static NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t\n\r\x0B\x0C]*([+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?)")
        .expect("numeric prefix pattern is valid")
});

/// Raw payload stored under one attribute name.
///
/// Serialized untagged so JSON fixtures read naturally (`42`, `"blue"`, `null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    /// The blank value written by a non-destructive unset.
    pub fn empty() -> Self {
        AttrValue::Text(String::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// Returns whether this payload counts as a number for type detection.
    ///
    /// Integers and floats always do; text does when the whole string (modulo
    /// surrounding ASCII whitespace) is a decimal number.
    pub fn is_numeric(&self) -> bool {
        match self {
            AttrValue::Int(_) => true,
            AttrValue::Float(v) => v.is_finite(),
            AttrValue::Text(s) => is_numeric_str(s),
            AttrValue::Null | AttrValue::Bool(_) => false,
        }
    }

    /// Lossy integer conversion used by typed reads.
    ///
    /// Text is read up to its longest leading numeric prefix; fractional
    /// parts are truncated and out-of-range values saturate.
    pub fn to_integer(&self) -> i64 {
        match self {
            AttrValue::Null => 0,
            AttrValue::Bool(v) => i64::from(*v),
            AttrValue::Int(v) => *v,
            AttrValue::Float(v) => float_to_integer(*v),
            AttrValue::Text(s) => text_to_integer(s),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Null => Ok(()),
            AttrValue::Bool(true) => write!(f, "1"),
            AttrValue::Bool(false) => Ok(()),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(i64::from(value))
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttrValue::Null, Into::into)
    }
}

/// Value-type tag governing how `value` is interpreted on read.
///
/// Only `Integer` and `Text` are readable. `Other` keeps whatever an explicit
/// override stored so the rejection happens at read time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer,
    Text,
    Other(String),
}

impl ValueType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Integer => VALUE_TYPE_INTEGER,
            Self::Text => VALUE_TYPE_TEXT,
            Self::Other(value) => value.as_str(),
        }
    }

    /// Parses a stored tag. Unknown tags are preserved as `Other`.
    pub fn parse(value: &str) -> Self {
        match value {
            VALUE_TYPE_INTEGER => Self::Integer,
            VALUE_TYPE_TEXT => Self::Text,
            other => Self::Other(other.to_string()),
        }
    }

    /// Applies this type to a raw payload.
    ///
    /// # Errors
    /// - `ValueError::UnsupportedValueType` for any tag outside `integer|text`.
    pub fn read(&self, raw: &AttrValue) -> Result<AttrValue, ValueError> {
        match self {
            Self::Integer => Ok(AttrValue::Int(raw.to_integer())),
            Self::Text => Ok(raw.clone()),
            Self::Other(value) => Err(ValueError::UnsupportedValueType(value.clone())),
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Detects the value type for `value`.
///
/// A non-empty `explicit_type` always wins and is returned unchanged.
/// Otherwise numbers and fully numeric strings are `integer`, everything else
/// is `text`. The stored payload is never converted here.
pub fn detect_value_type(value: &AttrValue, explicit_type: &str) -> ValueType {
    if !explicit_type.is_empty() {
        return ValueType::parse(explicit_type);
    }
    if value.is_numeric() {
        ValueType::Integer
    } else {
        ValueType::Text
    }
}

/// Typed-read errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    UnsupportedValueType(String),
}

impl Display for ValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedValueType(value) => {
                write!(f, "value type is not supported: `{value}`")
            }
        }
    }
}

impl Error for ValueError {}

fn is_numeric_str(value: &str) -> bool {
    NUMERIC_STRING.is_match(value)
}

fn float_to_integer(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    // `as` truncates toward zero and saturates at the i64 bounds.
    value as i64
}

fn text_to_integer(value: &str) -> i64 {
    let Some(captures) = NUMERIC_PREFIX.captures(value) else {
        return 0;
    };
    let number = &captures[1];
    if number.contains(['.', 'e', 'E']) {
        return number.parse::<f64>().map_or(0, float_to_integer);
    }
    match number.parse::<i64>() {
        Ok(parsed) => parsed,
        Err(_) if number.starts_with('-') => i64::MIN,
        Err(_) => i64::MAX,
    }
}
