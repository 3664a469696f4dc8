//! objmap I/O - Text entry points for the object mapping engine
//!
//! This crate connects the engine to JSON text:
//!
//! - The structural event scanner over `serde_json`
//! - The [`Mapper`] facade for parsing and rendering
//! - Schema files describing bean and record classes

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod mapper;
pub mod scanner;
pub mod schema;

// Re-export commonly used types
pub use mapper::Mapper;
pub use objmap_codec::{matchers, ObjectBuilder, Registry, TypeMatcher};
pub use objmap_model::{
    FromValue, Limits, MapperError, MapperOptions, RecordPolicy, Result, ToValue, TypeDescriptor,
    Value,
};
pub use scanner::scan;
pub use schema::{Schema, SchemaError, SchemaFile};

/// Materialize `text` as shape `root` with a default mapper
pub fn parse(text: &str, root: &TypeDescriptor) -> Result<Value> {
    Mapper::new().parse(text, root)
}

/// Render `value` with a default mapper
pub fn render(value: &Value) -> Result<String> {
    Mapper::new().render(value)
}
