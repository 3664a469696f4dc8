//! objmap model - Core types for the object mapping engine
//!
//! This crate provides the vocabulary shared by the reader and writer,
//! with no parsing or rendering logic of its own. It includes:
//!
//! - Type descriptors and class metadata
//! - The materialized value model
//! - Payload keys
//! - Error types
//! - Limits and record policy
//! - Typed conversions

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod convert;
pub mod descriptor;
pub mod error;
pub mod key;
pub mod limits;
pub mod value;

// Re-export commonly used types
pub use convert::{FromValue, ToValue};
pub use descriptor::{
    Access, BeanClass, ClassId, Component, Property, RecordClass, TypeDescriptor,
};
pub use error::{MapperError, Result};
pub use key::Key;
pub use limits::Limits;
pub use value::{Bean, Opaque, Record, Value};

/// Treatment of record components that never received a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordPolicy {
    /// Pass the component's zero value to the constructor
    #[default]
    Lenient,
    /// Fail with [`MapperError::MissingComponent`]
    Strict,
}

impl RecordPolicy {
    /// Whether missing components are an error
    pub fn is_strict(&self) -> bool {
        matches!(self, RecordPolicy::Strict)
    }
}

/// Options shared by every call on one mapper
#[derive(Debug, Clone, Default)]
pub struct MapperOptions {
    /// Parsing limits
    pub limits: Limits,
    /// Missing record component handling
    pub record_policy: RecordPolicy,
}

impl MapperOptions {
    /// Validate options against hard limits
    pub fn validate(&self) -> Result<()> {
        self.limits.validate()
    }
}
