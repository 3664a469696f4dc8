//! Materialization stack machine
//!
//! The [`Materializer`] consumes structural events and keeps one
//! [`ParseContext`] per open aggregate. Opening an aggregate asks the
//! parent's builder for the child shape, resolves a builder for it and pushes
//! a fresh context; closing one seals it and hands the sealed value to the
//! parent through the same `populate` path scalars take. Nesting is tracked
//! on an explicit stack, never on the call stack.

use crate::builder::{Aggregate, DynObjectBuilder};
use crate::registry::Registry;
use objmap_model::{Key, Limits, MapperError, Result, TypeDescriptor, Value};
use smallvec::SmallVec;
use tracing::trace;

/// Push-style structural event contract
///
/// Arrays and keyed objects share the aggregate operations; the array
/// variants exist so scanners can report what they saw.
pub trait EventSink {
    /// An aggregate opens under `key` of the current parent
    fn start_aggregate(&mut self, key: Key<'_>) -> Result<()>;

    /// A scalar is stored under `key` of the current aggregate
    fn scalar(&mut self, key: Key<'_>, value: Value) -> Result<()>;

    /// The aggregate opened under `key` closes
    fn end_aggregate(&mut self, key: Key<'_>) -> Result<()>;

    /// An array opens under `key`
    fn start_array(&mut self, key: Key<'_>) -> Result<()> {
        self.start_aggregate(key)
    }

    /// The array opened under `key` closes
    fn end_array(&mut self, key: Key<'_>) -> Result<()> {
        self.end_aggregate(key)
    }
}

/// One open aggregate and the builder assembling it
struct ParseContext {
    builder: DynObjectBuilder,
    aggregate: Aggregate,
}

impl ParseContext {
    fn create(builder: DynObjectBuilder) -> Result<Self> {
        let aggregate = builder.supply()?;
        Ok(Self { builder, aggregate })
    }

    fn populate(&mut self, key: Key<'_>, value: Value) -> Result<()> {
        self.builder.populate(&mut self.aggregate, key, value)
    }

    fn finish(self) -> Result<Value> {
        self.builder.finish(self.aggregate)
    }
}

/// Reader-side entry point: assembles one document from events
pub struct Materializer<'r> {
    registry: &'r Registry,
    root: TypeDescriptor,
    max_depth: usize,
    stack: SmallVec<[ParseContext; 16]>,
    result: Option<Value>,
}

impl<'r> Materializer<'r> {
    /// Materializer for one document whose root has shape `root`
    pub fn new(registry: &'r Registry, root: TypeDescriptor, limits: &Limits) -> Self {
        Self {
            registry,
            root,
            max_depth: limits.max_depth,
            stack: SmallVec::new(),
            result: None,
        }
    }

    /// Number of currently open aggregates
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether the root aggregate has been sealed
    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    /// Sealed root value
    pub fn finish(self) -> Result<Value> {
        if !self.stack.is_empty() {
            return Err(MapperError::structural(format!(
                "document ended with {} aggregate(s) still open",
                self.stack.len()
            )));
        }
        self.result
            .ok_or_else(|| MapperError::structural("document contained no root aggregate"))
    }

    fn reject_after_root(&self) -> Result<()> {
        if self.result.is_some() {
            return Err(MapperError::structural(
                "event after the root aggregate was sealed",
            ));
        }
        Ok(())
    }
}

impl EventSink for Materializer<'_> {
    fn start_aggregate(&mut self, key: Key<'_>) -> Result<()> {
        self.reject_after_root()?;

        let ty = match self.stack.last() {
            None => self.root.clone(),
            Some(parent) => parent.builder.type_of(key)?,
        };

        if self.stack.len() >= self.max_depth {
            return Err(MapperError::LimitExceeded(format!(
                "nesting depth exceeds {}",
                self.max_depth
            )));
        }

        let builder = self.registry.resolve(&ty);
        trace!(depth = self.stack.len() + 1, %key, builder = builder.label(), "open aggregate");
        self.stack.push(ParseContext::create(builder)?);
        Ok(())
    }

    fn scalar(&mut self, key: Key<'_>, value: Value) -> Result<()> {
        self.reject_after_root()?;
        let top = self.stack.last_mut().ok_or_else(|| {
            MapperError::structural(format!("scalar under '{}' outside of any aggregate", key))
        })?;
        top.populate(key, value)
    }

    fn end_aggregate(&mut self, key: Key<'_>) -> Result<()> {
        let context = self.stack.pop().ok_or_else(|| {
            MapperError::structural(format!("end of '{}' without a matching start", key))
        })?;
        trace!(depth = self.stack.len(), %key, builder = context.builder.label(), "seal aggregate");
        let sealed = context.finish()?;

        match self.stack.last_mut() {
            None => {
                self.result = Some(sealed);
                Ok(())
            }
            Some(parent) => parent.populate(key, sealed),
        }
    }
}
