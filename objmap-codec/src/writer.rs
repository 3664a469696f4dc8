//! Compact JSON writer
//!
//! Output has no insignificant whitespace beyond the `", "` property
//! separator and the `": "` key separator, and no trailing newline. Strings
//! are written between quotes exactly as stored: embedded quotes and control
//! characters are not escaped.

use crate::generator::GeneratorCache;
use objmap_model::{MapperError, Result, Value};
use std::sync::Arc;

/// Writer-side entry point
#[derive(Debug, Clone, Default)]
pub struct Writer {
    cache: Arc<GeneratorCache>,
}

impl Writer {
    /// Writer with its own generator cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer sharing `cache`
    pub fn with_cache(cache: Arc<GeneratorCache>) -> Self {
        Self { cache }
    }

    /// Generator cache in use
    pub fn cache(&self) -> &Arc<GeneratorCache> {
        &self.cache
    }

    /// Render `value` to text
    pub fn render(&self, value: &Value) -> Result<String> {
        let mut out = String::new();
        self.render_into(value, &mut out)?;
        Ok(out)
    }

    /// Append the rendering of `value` to `out`
    pub fn render_into(&self, value: &Value, out: &mut String) -> Result<()> {
        match value {
            Value::Null => out.push_str("null"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Int(i) => out.push_str(&i.to_string()),
            Value::Float(f) => render_float(*f, out)?,
            Value::String(s) => {
                out.push('"');
                out.push_str(s);
                out.push('"');
            }
            Value::Sequence(items) => {
                out.push('[');
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    self.render_into(item, out)?;
                }
                out.push(']');
            }
            Value::Bean(_) | Value::Record(_) => {
                let generators = self.cache.generators(value).ok_or_else(|| {
                    MapperError::UnsupportedScalarType(value.type_name())
                })?;
                out.push('{');
                for (idx, generator) in generators.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    generator.generate(self, value, out)?;
                }
                out.push('}');
            }
            Value::Opaque(_) => return Err(MapperError::UnsupportedScalarType(value.type_name())),
        }
        Ok(())
    }
}

/// Shortest round-trip form; integral values keep a `.0` so they read back
/// as floats
fn render_float(f: f64, out: &mut String) -> Result<()> {
    if !f.is_finite() {
        return Err(MapperError::UnsupportedScalarType(format!("float {}", f)));
    }
    let text = f.to_string();
    out.push_str(&text);
    if !text.contains('.') {
        out.push_str(".0");
    }
    Ok(())
}
