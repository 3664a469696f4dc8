//! In-memory object model produced by the reader and walked by the writer

use crate::descriptor::{BeanClass, RecordClass, TypeDescriptor};
use crate::error::{MapperError, Result};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A materialized value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    String(String),
    /// Frozen ordered sequence
    Sequence(Arc<[Value]>),
    /// Bean instance
    Bean(Bean),
    /// Record instance
    Record(Record),
    /// Handle with no textual form
    Opaque(Opaque),
}

impl Value {
    /// Short name of the runtime shape, used in error messages
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Sequence(_) => "sequence".to_string(),
            Value::Bean(bean) => bean.class().name().to_string(),
            Value::Record(record) => record.class().name().to_string(),
            Value::Opaque(opaque) => format!("opaque<{}>", opaque.label()),
        }
    }

    /// Whether this is `null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric payload widened to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Sequence items
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Bean instance
    pub fn as_bean(&self) -> Option<&Bean> {
        match self {
            Value::Bean(bean) => Some(bean),
            _ => None,
        }
    }

    /// Record instance
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Checked cast to `expected`
    pub fn expect_type(self, expected: &TypeDescriptor) -> Result<Value> {
        if expected.accepts(&self) {
            Ok(self)
        } else {
            Err(MapperError::invalid_cast(
                expected.to_string(),
                self.type_name(),
            ))
        }
    }

    /// Checked cast to an instance of `class`
    pub fn into_record_of(self, class: &Arc<RecordClass>) -> Result<Record> {
        match self {
            Value::Record(record) if record.class().id() == class.id() => Ok(record),
            other => Err(MapperError::invalid_cast(class.name(), other.type_name())),
        }
    }

    /// Checked cast to an instance of `class`
    pub fn into_bean_of(self, class: &Arc<BeanClass>) -> Result<Bean> {
        match self {
            Value::Bean(bean) if bean.class().id() == class.id() => Ok(bean),
            other => Err(MapperError::invalid_cast(class.name(), other.type_name())),
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

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items.into())
    }
}

impl From<Bean> for Value {
    fn from(bean: Bean) -> Self {
        Value::Bean(bean)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

/// Mutable instance of a bean class
///
/// A freshly constructed bean holds the zero value of every property.
#[derive(Debug, Clone)]
pub struct Bean {
    class: Arc<BeanClass>,
    slots: Vec<Value>,
}

impl Bean {
    /// Zero-argument constructor
    pub fn new(class: Arc<BeanClass>) -> Self {
        let slots = class
            .properties()
            .iter()
            .map(|p| p.ty().zero_value())
            .collect();
        Self { class, slots }
    }

    /// Class of this instance
    pub fn class(&self) -> &Arc<BeanClass> {
        &self.class
    }

    /// Invoke the setter for `name`
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let (idx, property) =
            self.class
                .setter(name)
                .ok_or_else(|| MapperError::UnknownProperty {
                    class: self.class.name().to_string(),
                    key: name.to_string(),
                })?;
        let value = property.ty().coerce(value).map_err(|rejected| {
            MapperError::invalid_cast(
                format!("{} for {}.{}", property.ty(), self.class.name(), name),
                rejected.type_name(),
            )
        })?;
        self.slots[idx] = value;
        Ok(())
    }

    /// Invoke the getter for `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        let idx = self.class.slot_of(name)?;
        self.class.properties()[idx]
            .access()
            .is_readable()
            .then(|| &self.slots[idx])
    }

    /// Raw slot access, bypassing accessor rules
    pub fn slot(&self, idx: usize) -> Option<&Value> {
        self.slots.get(idx)
    }
}

impl PartialEq for Bean {
    fn eq(&self, other: &Self) -> bool {
        self.class.id() == other.class.id() && self.slots == other.slots
    }
}

/// Immutable instance of a record class
#[derive(Debug, Clone)]
pub struct Record {
    class: Arc<RecordClass>,
    values: Arc<[Value]>,
}

impl Record {
    /// Canonical constructor: one value per component, in declared order
    pub fn new(class: Arc<RecordClass>, values: Vec<Value>) -> Result<Self> {
        if values.len() != class.arity() {
            return Err(MapperError::structural(format!(
                "record {} takes {} components, got {}",
                class.name(),
                class.arity(),
                values.len()
            )));
        }
        let values = class
            .components()
            .iter()
            .zip(values)
            .map(|(component, value)| {
                component.ty().coerce(value).map_err(|rejected| {
                    MapperError::invalid_cast(
                        format!("{} for {}.{}", component.ty(), class.name(), component.name()),
                        rejected.type_name(),
                    )
                })
            })
            .collect::<Result<Arc<[Value]>>>()?;
        Ok(Self { class, values })
    }

    /// Class of this instance
    pub fn class(&self) -> &Arc<RecordClass> {
        &self.class
    }

    /// Component values in declared order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Component `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.class.position_of(name).map(|idx| &self.values[idx])
    }

    /// Component `name` converted to `T`
    pub fn field<T: crate::convert::FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get(name).cloned().ok_or_else(|| MapperError::UnknownProperty {
            class: self.class.name().to_string(),
            key: name.to_string(),
        })?;
        T::from_value(value)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.class.id() == other.class.id() && self.values == other.values
    }
}

/// Opaque handle (a function, a resource) that has no textual form
#[derive(Clone)]
pub struct Opaque {
    label: Arc<str>,
    handle: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    /// Wrap `handle` under a descriptive label
    pub fn new<T: Any + Send + Sync>(label: impl Into<Arc<str>>, handle: T) -> Self {
        Self {
            label: label.into(),
            handle: Arc::new(handle),
        }
    }

    /// Descriptive label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Borrow the handle as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.handle.downcast_ref()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Opaque").field(&self.label).finish()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
    }
}
