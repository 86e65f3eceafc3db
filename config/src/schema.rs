//! Field readers used by the normalizer.
//!
//! A [`Section`] is one mapping of the document plus its dotted path. Each
//! reader either returns the typed value, substitutes the supplied default,
//! or fails with a [`TypeError`] naming the field.

use crate::error::{Expected, TypeError};
use serde_yaml::{Mapping, Value};

/// Unsigned integer targets for numeric fields.
pub(crate) trait Integer: Copy + TryFrom<u64> {
    const MAX: u64;
}

impl Integer for u16 {
    const MAX: u64 = u16::MAX as u64;
}

impl Integer for u32 {
    const MAX: u64 = u32::MAX as u64;
}

impl Integer for u64 {
    const MAX: u64 = u64::MAX;
}

impl Integer for usize {
    const MAX: u64 = usize::MAX as u64;
}

/// String enumerations with a fixed member list.
pub(crate) trait Enumerated: Sized {
    const NAMES: &'static [&'static str];

    fn from_name(name: &str) -> Option<Self>;
}

pub(crate) struct Section<'a> {
    path: String,
    map: Option<&'a Mapping>,
}

impl<'a> Section<'a> {
    /// The document root. `null` (an empty file) reads as an empty mapping.
    pub fn root(value: &'a Value) -> Result<Self, TypeError> {
        match value {
            Value::Null => Ok(Self {
                path: String::new(),
                map: None,
            }),
            Value::Mapping(map) => Ok(Self {
                path: String::new(),
                map: Some(map),
            }),
            other => Err(TypeError {
                path: "<root>".to_string(),
                expected: Expected::Object,
                found: describe(other).to_string(),
            }),
        }
    }

    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|map| map.get(key))
    }

    fn mismatch(&self, key: &str, expected: Expected, found: impl Into<String>) -> TypeError {
        TypeError {
            path: self.child_path(key),
            expected,
            found: found.into(),
        }
    }

    /// Nested object without a default: absent yields `None`, `null` is rejected.
    pub fn section(&self, key: &str) -> Result<Option<Self>, TypeError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Mapping(map)) => Ok(Some(Self {
                path: self.child_path(key),
                map: Some(map),
            })),
            Some(other) => Err(self.mismatch(key, Expected::Object, describe(other))),
        }
    }

    /// Nested object that must be present.
    pub fn required_section(&self, key: &str) -> Result<Self, TypeError> {
        self.section(key)?
            .ok_or_else(|| self.mismatch(key, Expected::Object, "missing"))
    }

    /// Nullish object: absent and `null` both yield `None`.
    pub fn nullish_section(&self, key: &str) -> Result<Option<Self>, TypeError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.section(key),
        }
    }

    pub fn string(&self, key: &str) -> Result<String, TypeError> {
        match self.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(self.mismatch(key, Expected::String, describe(other))),
            None => Err(self.mismatch(key, Expected::String, "missing")),
        }
    }

    pub fn string_or(&self, key: &str, default: String) -> Result<String, TypeError> {
        match self.get(key) {
            None => Ok(default),
            Some(_) => self.string(key),
        }
    }

    /// Absent and `null` both yield `None`.
    pub fn nullable_string(&self, key: &str) -> Result<Option<String>, TypeError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.string(key).map(Some),
        }
    }

    pub fn min_length_string(&self, key: &str, min: usize) -> Result<String, TypeError> {
        let value = self.string(key)?;
        let len = value.chars().count();
        if len < min {
            return Err(self.mismatch(
                key,
                Expected::MinLength(min),
                format!("string of length {len}"),
            ));
        }
        Ok(value)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, TypeError> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.mismatch(key, Expected::Boolean, describe(other))),
        }
    }

    pub fn integer_or<T: Integer>(&self, key: &str, default: T) -> Result<T, TypeError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => self.integer(key, value),
        }
    }

    /// Absent and `null` both yield `None`.
    pub fn nullable_integer<T: Integer>(&self, key: &str) -> Result<Option<T>, TypeError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => self.integer(key, value).map(Some),
        }
    }

    fn integer<T: Integer>(&self, key: &str, value: &Value) -> Result<T, TypeError> {
        let expected = Expected::Integer { max: T::MAX };
        let Value::Number(number) = value else {
            return Err(self.mismatch(key, expected, describe(value)));
        };

        // 2^64 is exactly representable; `u64::MAX as f64` rounds up to it.
        const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;
        let whole = number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f < U64_LIMIT)
                .map(|f| f as u64)
        });

        whole
            .and_then(|n| T::try_from(n).ok())
            .ok_or_else(|| self.mismatch(key, expected, format!("number {number}")))
    }

    /// Numeric field that rejects NaN and infinities. Absent and `null`
    /// both yield `None`.
    pub fn nullable_finite_number(&self, key: &str) -> Result<Option<f64>, TypeError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(number)) => match number.as_f64() {
                Some(f) if f.is_finite() => Ok(Some(f)),
                _ => Err(self.mismatch(key, Expected::Finite, format!("number {number}"))),
            },
            Some(other) => Err(self.mismatch(key, Expected::Number, describe(other))),
        }
    }

    pub fn enum_or<E: Enumerated>(&self, key: &str, default: E) -> Result<E, TypeError> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::String(name)) => E::from_name(name)
                .ok_or_else(|| self.mismatch(key, Expected::OneOf(E::NAMES), format!("{name:?}"))),
            Some(other) => Err(self.mismatch(key, Expected::OneOf(E::NAMES), describe(other))),
        }
    }

    pub fn string_array_or(&self, key: &str, default: Vec<String>) -> Result<Vec<String>, TypeError> {
        let Some(items) = self.sequence(key)? else {
            return Ok(default);
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(TypeError {
                    path: format!("{}[{i}]", self.child_path(key)),
                    expected: Expected::String,
                    found: describe(other).to_string(),
                }),
            })
            .collect()
    }

    /// Array of objects; `parse` is applied to each element in order.
    pub fn object_array_or<T>(
        &self,
        key: &str,
        default: Vec<T>,
        parse: impl Fn(&Section<'a>) -> Result<T, TypeError>,
    ) -> Result<Vec<T>, TypeError> {
        let Some(items) = self.sequence(key)? else {
            return Ok(default);
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let path = format!("{}[{i}]", self.child_path(key));
                match item {
                    Value::Mapping(map) => parse(&Section {
                        path,
                        map: Some(map),
                    }),
                    other => Err(TypeError {
                        path,
                        expected: Expected::Object,
                        found: describe(other).to_string(),
                    }),
                }
            })
            .collect()
    }

    fn sequence(&self, key: &str) -> Result<Option<&'a [Value]>, TypeError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Sequence(items)) => Ok(Some(items.as_slice())),
            Some(other) => Err(self.mismatch(key, Expected::Array, describe(other))),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "array",
        Value::Mapping(_) => "object",
        Value::Tagged(_) => "tagged value",
    }
}
