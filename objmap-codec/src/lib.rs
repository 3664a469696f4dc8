//! objmap codec - Reader and writer engines
//!
//! This crate provides the mapping engines on both sides of the text:
//!
//! - Object builders and the bean, sequence and record strategies
//! - The type matcher registry that selects a strategy per shape
//! - The materialization stack machine driven by structural events
//! - The per-class property generator cache
//! - The compact writer

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod generator;
pub mod reader;
pub mod registry;
pub mod writer;

// Re-export commonly used types
pub use objmap_model::{
    Key, Limits, MapperError, MapperOptions, RecordPolicy, Result, TypeDescriptor, Value,
};

// Re-export our own types
pub use builder::{Aggregate, DynObjectBuilder, ObjectBuilder};
pub use generator::{GeneratorCache, PropertyGenerator};
pub use reader::{EventSink, Materializer};
pub use registry::{matchers, Registry, TypeMatcher};
pub use writer::Writer;
