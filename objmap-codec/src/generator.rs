//! Property generator cache for the writer
//!
//! For every structured runtime class the writer needs the ordered list of
//! `(emitted name, accessor)` pairs it renders. The list is a pure function
//! of the class, so it is built on first use and kept for the lifetime of the
//! cache. Two threads racing on first use may both build a list; only the
//! first insert is kept and the outputs are identical either way.

use crate::writer::Writer;
use ahash::AHashMap;
use objmap_model::{BeanClass, ClassId, MapperError, RecordClass, Result, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
enum Accessor {
    BeanSlot(usize),
    RecordComponent(usize),
}

/// One property the writer emits for a class
#[derive(Debug, Clone)]
pub struct PropertyGenerator {
    name: String,
    prefix: String,
    accessor: Accessor,
}

impl PropertyGenerator {
    fn new(name: &str, accessor: Accessor) -> Self {
        Self {
            name: name.to_string(),
            prefix: format!("\"{}\": ", name),
            accessor,
        }
    }

    /// Emitted property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read this property from `instance`
    pub fn read<'v>(&self, instance: &'v Value) -> Option<&'v Value> {
        match (self.accessor, instance) {
            (Accessor::BeanSlot(idx), Value::Bean(bean)) => bean.slot(idx),
            (Accessor::RecordComponent(idx), Value::Record(record)) => record.values().get(idx),
            _ => None,
        }
    }

    /// Append `"name": <value>` for `instance`
    pub fn generate(&self, writer: &Writer, instance: &Value, out: &mut String) -> Result<()> {
        let value = self.read(instance).ok_or_else(|| {
            MapperError::structural(format!(
                "property '{}' does not belong to {}",
                self.name,
                instance.type_name()
            ))
        })?;
        out.push_str(&self.prefix);
        writer.render_into(value, out)
    }
}

/// Build-once, per-class cache of property generators
#[derive(Debug, Default)]
pub struct GeneratorCache {
    entries: RwLock<AHashMap<ClassId, Arc<[PropertyGenerator]>>>,
    builds: AtomicUsize,
}

impl GeneratorCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Generators for the class of `value`, or `None` if it is not structured
    pub fn generators(&self, value: &Value) -> Option<Arc<[PropertyGenerator]>> {
        let id = match value {
            Value::Bean(bean) => bean.class().id(),
            Value::Record(record) => record.class().id(),
            _ => return None,
        };

        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return Some(hit.clone());
        }

        // Built outside the lock; a racing builder produces the same list
        let built = match value {
            Value::Bean(bean) => Self::build_bean(bean.class()),
            Value::Record(record) => Self::build_record(record.class()),
            _ => return None,
        };

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(id).or_insert_with(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            debug!(class = %value.type_name(), properties = built.len(), "built property generators");
            built
        });
        Some(entry.clone())
    }

    /// Number of classes cached
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is cached yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many generator lists were inserted
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Readable properties in name order
    fn build_bean(class: &BeanClass) -> Arc<[PropertyGenerator]> {
        let mut readable: Vec<(usize, &objmap_model::Property)> = class
            .properties()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.access().is_readable())
            .collect();
        readable.sort_by(|a, b| a.1.name().cmp(b.1.name()));
        readable
            .into_iter()
            .map(|(idx, p)| PropertyGenerator::new(p.emitted_name(), Accessor::BeanSlot(idx)))
            .collect()
    }

    /// Components in declared order
    fn build_record(class: &RecordClass) -> Arc<[PropertyGenerator]> {
        class
            .components()
            .iter()
            .enumerate()
            .map(|(idx, c)| {
                PropertyGenerator::new(c.emitted_name(), Accessor::RecordComponent(idx))
            })
            .collect()
    }
}
