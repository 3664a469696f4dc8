//! Mapper entry points
//!
//! A [`Mapper`] owns the type matcher registry, the options applied to every
//! call, and the property generator cache shared with its clones. Each
//! parse builds a fresh materializer, so concurrent calls on one mapper
//! never see each other's state.

use crate::scanner;
use objmap_codec::{
    GeneratorCache, Materializer, PropertyGenerator, Registry, TypeMatcher, Writer,
};
use objmap_model::{
    FromValue, MapperError, MapperOptions, Record, Result, ToValue, TypeDescriptor, Value,
};
use std::sync::Arc;
use tracing::debug;

/// Bidirectional text/object mapper
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    registry: Registry,
    options: MapperOptions,
    writer: Writer,
}

impl Mapper {
    /// Mapper with default options and no registered matchers
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapper with custom options
    pub fn with_options(options: MapperOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            registry: Registry::with_record_policy(options.record_policy),
            options,
            writer: Writer::new(),
        })
    }

    /// Options in effect
    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    /// Registered matchers
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Generator cache shared by this mapper and its clones
    pub fn generator_cache(&self) -> &Arc<GeneratorCache> {
        self.writer.cache()
    }

    /// Add a matcher; later registrations take precedence
    pub fn register_type_matcher(&mut self, matcher: impl TypeMatcher + 'static) {
        self.registry.register(matcher);
        debug!(matchers = self.registry.len(), "registered type matcher");
    }

    /// Materialize `text` as a value of shape `root`
    pub fn parse(&self, text: &str, root: &TypeDescriptor) -> Result<Value> {
        let mut machine = Materializer::new(&self.registry, root.clone(), &self.options.limits);
        scanner::scan(text, &mut machine)?;
        let value = machine.finish()?;
        debug!(shape = %root, bytes = text.len(), "materialized document");
        Ok(value)
    }

    /// Materialize `text` as shape `root`, then check it against `expected`
    pub fn parse_expecting(
        &self,
        text: &str,
        root: &TypeDescriptor,
        expected: &TypeDescriptor,
    ) -> Result<Value> {
        self.parse(text, root)?.expect_type(expected)
    }

    /// Materialize `text` straight into `T`
    pub fn parse_as<T: FromValue>(&self, text: &str) -> Result<T> {
        T::from_value(self.parse(text, &T::descriptor())?)
    }

    /// Render `value` as compact JSON
    pub fn render(&self, value: &Value) -> Result<String> {
        self.writer.render(value)
    }

    /// Render a typed value
    pub fn render_as<T: ToValue + ?Sized>(&self, value: &T) -> Result<String> {
        self.render(&value.to_value())
    }

    /// Properties the writer emits for class shape `ty`, in emission order
    pub fn property_order(&self, ty: &TypeDescriptor) -> Result<Arc<[PropertyGenerator]>> {
        let prototype = match ty {
            TypeDescriptor::Bean(class) => Value::Bean(objmap_model::Bean::new(class.clone())),
            TypeDescriptor::Record(class) => {
                let zeros = class
                    .components()
                    .iter()
                    .map(|component| component.ty().zero_value())
                    .collect();
                Value::Record(Record::new(class.clone(), zeros)?)
            }
            other => {
                return Err(MapperError::structural(format!(
                    "{} has no properties",
                    other
                )))
            }
        };
        self.generator_cache()
            .generators(&prototype)
            .ok_or_else(|| MapperError::structural(format!("{} has no properties", ty)))
    }
}
