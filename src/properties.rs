// Copyright 2024-2026 The mqjms Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The per-message named-property collection and its coercion rules.

use std::fmt;

use crate::error::{Error, ErrorKind, Result};

/// A property value. The set of representable types is closed; anything an
/// application stores is one of these four.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
}

impl PropertyValue {
    /// Reads this value as a string.
    ///
    /// Numbers render in their canonical decimal form, booleans as
    /// `"true"`/`"false"`.
    pub fn as_string(&self) -> Result<String> {
        match self {
            PropertyValue::String(s) => Ok(s.clone()),
            PropertyValue::Int(v) => {
                let mut buf = itoa::Buffer::new();
                Ok(buf.format(*v).to_string())
            }
            PropertyValue::Double(v) => Ok(v.to_string()),
            PropertyValue::Bool(true) => Ok("true".to_string()),
            PropertyValue::Bool(false) => Ok("false".to_string()),
        }
    }

    /// Reads this value as a 64-bit integer.
    ///
    /// Strings must parse as a decimal integer; booleans map to `1`/`0`.
    /// Doubles do not narrow.
    pub fn as_int(&self) -> Result<i64> {
        match self {
            PropertyValue::Int(v) => Ok(*v),
            PropertyValue::String(s) => {
                s.parse().map_err(|_| Error::new(ErrorKind::BadType))
            }
            PropertyValue::Bool(b) => Ok(i64::from(*b)),
            PropertyValue::Double(_) => Err(Error::new(ErrorKind::BadType)),
        }
    }

    /// Reads this value as a double.
    ///
    /// Strings must parse as a number; booleans map to `1.0`/`0.0`.
    /// Integers do not widen.
    pub fn as_double(&self) -> Result<f64> {
        match self {
            PropertyValue::Double(v) => Ok(*v),
            PropertyValue::String(s) => {
                s.parse().map_err(|_| Error::new(ErrorKind::BadType))
            }
            PropertyValue::Bool(b) => Ok(f64::from(u8::from(*b))),
            PropertyValue::Int(_) => Err(Error::new(ErrorKind::BadType)),
        }
    }

    /// Reads this value as a boolean.
    ///
    /// Only the literal strings `"true"` and `"false"` convert; a numeric
    /// `1` (or `1.0`) is `true` and every other number is `false`.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            PropertyValue::Bool(b) => Ok(*b),
            PropertyValue::String(s) => match s.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(Error::new(ErrorKind::BadType)),
            },
            PropertyValue::Int(v) => Ok(*v == 1),
            PropertyValue::Double(v) => Ok(*v == 1.0),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{}", s),
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Double(v) => write!(f, "{}", v),
            PropertyValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> PropertyValue {
        PropertyValue::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> PropertyValue {
        PropertyValue::String(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> PropertyValue {
        PropertyValue::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> PropertyValue {
        PropertyValue::Double(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> PropertyValue {
        PropertyValue::Bool(v)
    }
}

/// An insertion-ordered, uniquely-keyed collection of typed properties.
///
/// Enumeration order is the order names were first set; re-setting an
/// existing name updates its value in place without moving it. A property
/// explicitly set to its type's zero value is present, which is a different
/// thing from the property being absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyBag {
    pub fn new() -> PropertyBag {
        PropertyBag::default()
    }

    /// Sets `name` to `value`, overwriting in place if it already exists.
    pub fn set(&mut self, name: &str, value: PropertyValue) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    /// Removes `name`. Removing an absent property is not an error.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    /// Returns the stored value for `name`, untyped.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Reads `name` as a string. `Ok(None)` means the property is absent;
    /// a present but uncoercible value is a "bad type" error.
    pub fn get_string(&self, name: &str) -> Result<Option<String>> {
        self.get(name).map(PropertyValue::as_string).transpose()
    }

    /// Reads `name` as a 64-bit integer.
    pub fn get_int(&self, name: &str) -> Result<Option<i64>> {
        self.get(name).map(PropertyValue::as_int).transpose()
    }

    /// Reads `name` as a double.
    pub fn get_double(&self, name: &str) -> Result<Option<f64>> {
        self.get(name).map(PropertyValue::as_double).transpose()
    }

    /// Reads `name` as a boolean.
    pub fn get_bool(&self, name: &str) -> Result<Option<bool>> {
        self.get(name).map(PropertyValue::as_bool).transpose()
    }

    /// True when `name` holds any value, including a zero value.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Property names in insertion order. Never contains duplicates.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Removes every property.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
