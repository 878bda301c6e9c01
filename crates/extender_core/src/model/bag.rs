//! Ordered attribute bag backing one extender.
//!
//! # Responsibility
//! - Store attribute name/value pairs in insertion order.
//! - Provide typed get/set, a restartable cursor and a keyed view over the
//!   same entries.
//!
//! # Invariants
//! - Keys are never removed. `clear` blanks a value and keeps its key.
//! - The keyed view can only update keys that already exist.
//! - The cursor stores a position, never a copy of the entries.

use crate::model::value::{detect_value_type, AttrValue, ValueError, ValueType};

/// Attribute holding the payload.
pub const ATTR_VALUE: &str = "value";
/// Attribute holding the value-type tag.
pub const ATTR_VALUE_TYPE: &str = "value_type";

/// Insertion-ordered attribute storage with cursor state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeBag {
    entries: Vec<(String, AttrValue)>,
    position: usize,
    valid: bool,
}

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bag whose shape is fixed by `keys`, all set to `Null`.
    pub fn with_keys(keys: &[&str]) -> Self {
        Self {
            entries: keys
                .iter()
                .map(|key| ((*key).to_string(), AttrValue::Null))
                .collect(),
            position: 0,
            valid: false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns attribute names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Iterates `(name, raw value)` pairs in insertion order.
    ///
    /// Independent of the cursor; iterating here never moves it.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Reads one attribute.
    ///
    /// Absent and `Null` attributes read as `None`. `value` is converted by
    /// the bag's current value type; all other attributes pass through raw.
    ///
    /// # Errors
    /// - `ValueError::UnsupportedValueType` when reading `value` under a type
    ///   outside `integer|text`. Other attributes stay readable.
    pub fn get(&self, name: &str) -> Result<Option<AttrValue>, ValueError> {
        let Some(raw) = self.raw(name).filter(|value| !value.is_null()) else {
            return Ok(None);
        };
        if name != ATTR_VALUE {
            return Ok(Some(raw.clone()));
        }
        self.value_type().read(raw).map(Some)
    }

    /// Stores `value` under `name` and re-derives `value_type`.
    ///
    /// The value type is always derived from the current `value` entry, with
    /// a non-empty `explicit_type` taking precedence. Writing `value_type`
    /// itself stores the tag as given. Always succeeds.
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>, explicit_type: &str) -> bool {
        let value = value.into();
        if name == ATTR_VALUE_TYPE {
            self.upsert(name, value);
            return true;
        }

        self.upsert(name, value);
        let current = self.raw(ATTR_VALUE).cloned().unwrap_or(AttrValue::Null);
        let value_type = detect_value_type(&current, explicit_type);
        self.upsert(ATTR_VALUE_TYPE, AttrValue::Text(value_type.as_str().to_string()));
        true
    }

    /// Returns the current value-type tag.
    ///
    /// A missing tag is reported as an empty `Other` so reads of `value`
    /// fail instead of guessing.
    pub fn value_type(&self) -> ValueType {
        match self.raw(ATTR_VALUE_TYPE) {
            Some(AttrValue::Text(tag)) => ValueType::parse(tag),
            Some(AttrValue::Null) | None => ValueType::Other(String::new()),
            Some(other) => ValueType::parse(&other.to_string()),
        }
    }

    // Cursor protocol.

    /// Moves the cursor to the first entry.
    pub fn rewind(&mut self) {
        self.position = 0;
        self.valid = !self.entries.is_empty();
    }

    /// Returns whether the cursor points at an entry.
    ///
    /// Checked against live length, so the cursor cannot run past entries
    /// even if the bag changed since the last move.
    pub fn valid(&self) -> bool {
        self.valid && self.position < self.entries.len()
    }

    pub fn current(&self) -> Option<&AttrValue> {
        self.cursor_entry().map(|(_, value)| value)
    }

    pub fn key(&self) -> Option<&str> {
        self.cursor_entry().map(|(key, _)| key.as_str())
    }

    /// Advances the cursor. Once past the end it stays invalid until
    /// `rewind`.
    pub fn next(&mut self) {
        if !self.valid {
            return;
        }
        self.position += 1;
        self.valid = self.position < self.entries.len();
    }

    // Keyed view.

    pub fn exists(&self, key: &str) -> bool {
        self.index_of(key).is_some()
    }

    /// Raw passthrough read; no value-type conversion.
    pub fn read(&self, key: &str) -> Option<&AttrValue> {
        self.raw(key)
    }

    /// Overwrites an existing key. Returns `false` and changes nothing when
    /// the key is absent.
    pub fn write(&mut self, key: &str, value: impl Into<AttrValue>) -> bool {
        match self.index_of(key) {
            Some(index) => {
                self.entries[index].1 = value.into();
                true
            }
            None => false,
        }
    }

    /// Blanks an existing key's value, keeping the key. Returns `false` when
    /// the key is absent.
    pub fn clear(&mut self, key: &str) -> bool {
        self.write(key, AttrValue::empty())
    }

    fn cursor_entry(&self) -> Option<&(String, AttrValue)> {
        if !self.valid() {
            return None;
        }
        self.entries.get(self.position)
    }

    fn raw(&self, key: &str) -> Option<&AttrValue> {
        self.index_of(key).map(|index| &self.entries[index].1)
    }

    fn index_of(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(name, _)| name == key)
    }

    fn upsert(&mut self, key: &str, value: AttrValue) {
        match self.index_of(key) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }
}

impl<'a> IntoIterator for &'a AttributeBag {
    type Item = (&'a str, &'a AttrValue);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a AttrValue)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
