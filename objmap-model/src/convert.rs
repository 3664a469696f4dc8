//! Conversions between Rust types and [`Value`]
//!
//! Implement [`FromValue`] to parse straight into a typed result and
//! [`ToValue`] to render from one. Class-backed types must return the *same*
//! class from every `descriptor()` call (keep it in a `OnceLock`), because
//! class descriptors compare by identity.
//!
//! A `FromValue` descriptor must be one the built-in strategies can
//! materialize, so there is no impl for `Value` (shape `any`) or for
//! `Option<T>` (scalar slots never hold `null`).

use crate::descriptor::TypeDescriptor;
use crate::error::{MapperError, Result};
use crate::value::Value;

/// Types that can be materialized from a [`Value`]
pub trait FromValue: Sized {
    /// Shape to materialize for this type
    fn descriptor() -> TypeDescriptor;

    /// Checked conversion; fails with [`MapperError::InvalidCast`]
    fn from_value(value: Value) -> Result<Self>;
}

/// Types that can be viewed as a [`Value`] for rendering
pub trait ToValue {
    /// Build the value view
    fn to_value(&self) -> Value;
}

fn mismatch<T>(expected: &str, value: &Value) -> Result<T> {
    Err(MapperError::invalid_cast(expected, value.type_name()))
}

impl FromValue for bool {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Bool
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => mismatch("bool", &other),
        }
    }
}

impl FromValue for i64 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Int
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            other => mismatch("int", &other),
        }
    }
}

impl FromValue for i32 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Int
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => i32::try_from(i)
                .map_err(|_| MapperError::invalid_cast("i32", format!("int {}", i))),
            other => mismatch("i32", &other),
        }
    }
}

impl FromValue for f64 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Float
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            other => mismatch("float", &other),
        }
    }
}

impl FromValue for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::String
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => mismatch("string", &other),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::sequence_of(T::descriptor())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Sequence(items) => items.iter().cloned().map(T::from_value).collect(),
            other => mismatch(&Self::descriptor().to_string(), &other),
        }
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl ToValue for i32 {
    fn to_value(&self) -> Value {
        Value::Int(*self as i64)
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}
