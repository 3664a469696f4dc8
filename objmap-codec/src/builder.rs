//! Object builders and the built-in assembly strategies
//!
//! An [`ObjectBuilder`] bundles the four operations needed to assemble one
//! shape: where nested values go (`type_of`), how to start an empty
//! aggregate (`supply`), how to add a member (`populate`) and how to seal the
//! aggregate into its final [`Value`] (`finish`). Builders are erased into a
//! [`DynObjectBuilder`] so aggregates of different Rust types can share one
//! context stack.

use objmap_model::{
    Bean, BeanClass, Key, MapperError, Record, RecordClass, RecordPolicy, Result,
    TypeDescriptor, Value,
};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased in-progress aggregate
pub type Aggregate = Box<dyn Any + Send>;

type TypeProviderFn = dyn Fn(Key<'_>) -> Result<TypeDescriptor> + Send + Sync;
type SupplierFn<A> = dyn Fn() -> Result<A> + Send + Sync;
type PopulaterFn<A> = dyn Fn(&mut A, Key<'_>, Value) -> Result<()> + Send + Sync;
type FinisherFn<A> = dyn Fn(A) -> Result<Value> + Send + Sync;

/// Assembly strategy for one shape, over aggregate type `A`
pub struct ObjectBuilder<A> {
    label: Arc<str>,
    type_provider: Arc<TypeProviderFn>,
    supplier: Arc<SupplierFn<A>>,
    populater: Arc<PopulaterFn<A>>,
    finisher: Arc<FinisherFn<A>>,
}

impl<A> Clone for ObjectBuilder<A> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            type_provider: self.type_provider.clone(),
            supplier: self.supplier.clone(),
            populater: self.populater.clone(),
            finisher: self.finisher.clone(),
        }
    }
}

impl<A> fmt::Debug for ObjectBuilder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBuilder")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<A: Send + 'static> ObjectBuilder<A> {
    /// Assemble a builder from its four operations
    pub fn new(
        label: impl Into<Arc<str>>,
        type_provider: impl Fn(Key<'_>) -> Result<TypeDescriptor> + Send + Sync + 'static,
        supplier: impl Fn() -> Result<A> + Send + Sync + 'static,
        populater: impl Fn(&mut A, Key<'_>, Value) -> Result<()> + Send + Sync + 'static,
        finisher: impl Fn(A) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            type_provider: Arc::new(type_provider),
            supplier: Arc::new(supplier),
            populater: Arc::new(populater),
            finisher: Arc::new(finisher),
        }
    }

    /// Description used in logs
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Shape of the nested value stored under `key`
    pub fn type_of(&self, key: Key<'_>) -> Result<TypeDescriptor> {
        (self.type_provider)(key)
    }

    /// Fresh, empty aggregate
    pub fn supply(&self) -> Result<A> {
        (self.supplier)()
    }

    /// Add `value` under `key`
    pub fn populate(&self, aggregate: &mut A, key: Key<'_>, value: Value) -> Result<()> {
        (self.populater)(aggregate, key, value)
    }

    /// Seal the aggregate
    pub fn finish(&self, aggregate: A) -> Result<Value> {
        (self.finisher)(aggregate)
    }

    /// Erase the aggregate type
    pub fn erase(self) -> DynObjectBuilder {
        DynObjectBuilder(Arc::new(self))
    }
}

impl ObjectBuilder<Bean> {
    /// Bean strategy: zero-argument constructor, setters, identity finish
    pub fn bean(class: Arc<BeanClass>) -> Self {
        let provider_class = class.clone();
        let supplier_class = class.clone();
        ObjectBuilder::new(
            format!("bean {}", class.name()),
            move |key| {
                let class = &provider_class;
                key.as_field()
                    .and_then(|name| class.setter(name))
                    .map(|(_, property)| property.ty().clone())
                    .ok_or_else(|| unknown_property(class.name(), key))
            },
            move || Ok(Bean::new(supplier_class.clone())),
            |bean: &mut Bean, key, value| match key.as_field() {
                Some(name) => bean.set(name, value),
                None => Err(unknown_property(bean.class().name(), key)),
            },
            |bean| Ok(Value::Bean(bean)),
        )
    }

    /// Bean strategy for a shape that has no class behind it
    ///
    /// Resolution must always produce a builder, so shapes with no aggregate
    /// form (scalars, unmatched named shapes) get one that refuses to start.
    pub fn unavailable(ty: TypeDescriptor) -> Self {
        let shape = ty.to_string();
        let reject = move || {
            MapperError::structural(format!("cannot open an aggregate for shape {}", shape))
        };
        let r1 = reject.clone();
        let r2 = reject.clone();
        let r3 = reject.clone();
        ObjectBuilder::new(
            format!("bean {}", ty),
            move |_| Err(r1()),
            move || Err(r2()),
            move |_, _, _| Err(r3()),
            move |_| Err(reject()),
        )
    }
}

impl ObjectBuilder<Vec<Value>> {
    /// Sequence strategy: every member has shape `element`, keys are ignored
    pub fn sequence(element: TypeDescriptor) -> Self {
        let provider_element = element.clone();
        let populater_element = element.clone();
        ObjectBuilder::new(
            format!("sequence [{}]", element),
            move |_| Ok(provider_element.clone()),
            || Ok(Vec::new()),
            move |items: &mut Vec<Value>, _, value| {
                let value = populater_element.coerce(value).map_err(|rejected| {
                    MapperError::invalid_cast(
                        format!("{} element", populater_element),
                        rejected.type_name(),
                    )
                })?;
                items.push(value);
                Ok(())
            },
            |items| Ok(Value::Sequence(items.into())),
        )
    }
}

impl ObjectBuilder<Vec<Option<Value>>> {
    /// Record strategy: one slot per component, canonical constructor on finish
    pub fn record(class: Arc<RecordClass>, policy: RecordPolicy) -> Self {
        let provider_class = class.clone();
        let supplier_class = class.clone();
        let populater_class = class.clone();
        let finisher_class = class.clone();
        ObjectBuilder::new(
            format!("record {}", class.name()),
            move |key| {
                let class = &provider_class;
                key.as_field()
                    .and_then(|name| class.component(name))
                    .map(|component| component.ty().clone())
                    .ok_or_else(|| unknown_property(class.name(), key))
            },
            move || Ok(vec![None; supplier_class.arity()]),
            move |slots: &mut Vec<Option<Value>>, key, value| {
                let class = &populater_class;
                let idx = key
                    .as_field()
                    .and_then(|name| class.position_of(name))
                    .ok_or_else(|| unknown_property(class.name(), key))?;
                slots[idx] = Some(value);
                Ok(())
            },
            move |slots| {
                let class = &finisher_class;
                let values = class
                    .components()
                    .iter()
                    .zip(slots)
                    .map(|(component, slot)| match slot {
                        Some(value) => Ok(value),
                        None if policy.is_strict() => Err(MapperError::MissingComponent {
                            record: class.name().to_string(),
                            component: component.name().to_string(),
                        }),
                        None => Ok(component.ty().zero_value()),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Record::new(class.clone(), values).map(Value::Record)
            },
        )
    }
}

fn unknown_property(class: &str, key: Key<'_>) -> MapperError {
    MapperError::UnknownProperty {
        class: class.to_string(),
        key: key.to_string(),
    }
}

/// Object-safe view of an [`ObjectBuilder`]
trait ErasedBuilder: Send + Sync {
    fn label(&self) -> &str;
    fn type_of(&self, key: Key<'_>) -> Result<TypeDescriptor>;
    fn supply(&self) -> Result<Aggregate>;
    fn populate(&self, aggregate: &mut Aggregate, key: Key<'_>, value: Value) -> Result<()>;
    fn finish(&self, aggregate: Aggregate) -> Result<Value>;
}

impl<A: Send + 'static> ErasedBuilder for ObjectBuilder<A> {
    fn label(&self) -> &str {
        ObjectBuilder::label(self)
    }

    fn type_of(&self, key: Key<'_>) -> Result<TypeDescriptor> {
        ObjectBuilder::type_of(self, key)
    }

    fn supply(&self) -> Result<Aggregate> {
        Ok(Box::new(ObjectBuilder::supply(self)?))
    }

    fn populate(&self, aggregate: &mut Aggregate, key: Key<'_>, value: Value) -> Result<()> {
        let aggregate = aggregate
            .downcast_mut::<A>()
            .ok_or_else(|| foreign_aggregate(&self.label))?;
        ObjectBuilder::populate(self, aggregate, key, value)
    }

    fn finish(&self, aggregate: Aggregate) -> Result<Value> {
        let aggregate = aggregate
            .downcast::<A>()
            .map_err(|_| foreign_aggregate(&self.label))?;
        ObjectBuilder::finish(self, *aggregate)
    }
}

fn foreign_aggregate(label: &str) -> MapperError {
    MapperError::structural(format!("aggregate was not produced by {}", label))
}

/// Type-erased [`ObjectBuilder`], cheap to clone
#[derive(Clone)]
pub struct DynObjectBuilder(Arc<dyn ErasedBuilder>);

impl DynObjectBuilder {
    /// Built-in strategy derived from the structure of `ty`
    pub fn structural(ty: &TypeDescriptor, policy: RecordPolicy) -> Self {
        match ty {
            TypeDescriptor::Bean(class) => ObjectBuilder::bean(class.clone()).erase(),
            TypeDescriptor::Sequence(element) => {
                ObjectBuilder::sequence(element.as_ref().clone()).erase()
            }
            TypeDescriptor::Record(class) => ObjectBuilder::record(class.clone(), policy).erase(),
            other => ObjectBuilder::unavailable(other.clone()).erase(),
        }
    }

    /// Description used in logs
    pub fn label(&self) -> &str {
        self.0.label()
    }

    /// Shape of the nested value stored under `key`
    pub fn type_of(&self, key: Key<'_>) -> Result<TypeDescriptor> {
        self.0.type_of(key)
    }

    /// Fresh, empty aggregate
    pub fn supply(&self) -> Result<Aggregate> {
        self.0.supply()
    }

    /// Add `value` under `key`
    pub fn populate(&self, aggregate: &mut Aggregate, key: Key<'_>, value: Value) -> Result<()> {
        self.0.populate(aggregate, key, value)
    }

    /// Seal the aggregate
    pub fn finish(&self, aggregate: Aggregate) -> Result<Value> {
        self.0.finish(aggregate)
    }
}

impl fmt::Debug for DynObjectBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DynObjectBuilder").field(&self.label()).finish()
    }
}

impl<A: Send + 'static> From<ObjectBuilder<A>> for DynObjectBuilder {
    fn from(builder: ObjectBuilder<A>) -> Self {
        builder.erase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Arc<RecordClass> {
        RecordClass::builder("Person")
            .component("name", TypeDescriptor::String)
            .component("age", TypeDescriptor::Int)
            .build()
    }

    #[test]
    fn test_record_strategy_assembles_in_declared_order() {
        let builder = ObjectBuilder::record(person(), RecordPolicy::Lenient);
        let mut slots = builder.supply().unwrap();
        assert_eq!(slots.len(), 2);

        // Populated out of declaration order
        builder.populate(&mut slots, Key::Field("age"), Value::Int(23)).unwrap();
        builder
            .populate(&mut slots, Key::Field("name"), "Ahmed".into())
            .unwrap();

        let value = builder.finish(slots).unwrap();
        let record = value.as_record().unwrap();
        assert_eq!(record.values(), &[Value::from("Ahmed"), Value::Int(23)]);
    }

    #[test]
    fn test_record_strategy_lenient_missing_component() {
        let builder = ObjectBuilder::record(person(), RecordPolicy::Lenient);
        let mut slots = builder.supply().unwrap();
        builder
            .populate(&mut slots, Key::Field("name"), "Ahmed".into())
            .unwrap();

        let value = builder.finish(slots).unwrap();
        assert_eq!(value.as_record().unwrap().get("age"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_record_strategy_strict_missing_component() {
        let builder = ObjectBuilder::record(person(), RecordPolicy::Strict);
        let slots = builder.supply().unwrap();
        let err = builder.finish(slots).unwrap_err();
        assert_eq!(
            err,
            MapperError::MissingComponent {
                record: "Person".to_string(),
                component: "name".to_string(),
            }
        );
    }

    #[test]
    fn test_record_strategy_unknown_key() {
        let builder = ObjectBuilder::record(person(), RecordPolicy::Lenient);
        let mut slots = builder.supply().unwrap();
        let err = builder
            .populate(&mut slots, Key::Field("email"), Value::Null)
            .unwrap_err();
        assert!(matches!(err, MapperError::UnknownProperty { ref key, .. } if key == "email"));
        assert!(builder.type_of(Key::Index(0)).is_err());
    }

    #[test]
    fn test_sequence_strategy_ignores_keys() {
        let builder = ObjectBuilder::sequence(TypeDescriptor::Int);
        assert_eq!(builder.type_of(Key::Index(7)).unwrap(), TypeDescriptor::Int);
        assert_eq!(builder.type_of(Key::Field("x")).unwrap(), TypeDescriptor::Int);

        let mut items = builder.supply().unwrap();
        builder.populate(&mut items, Key::Index(5), Value::Int(1)).unwrap();
        builder.populate(&mut items, Key::Index(0), Value::Int(2)).unwrap();
        let value = builder.finish(items).unwrap();
        assert_eq!(value.as_sequence().unwrap(), &[Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_sequence_strategy_rejects_wrong_element() {
        let builder = ObjectBuilder::sequence(TypeDescriptor::Int);
        let mut items = builder.supply().unwrap();
        let err = builder
            .populate(&mut items, Key::Index(0), "one".into())
            .unwrap_err();
        assert!(matches!(err, MapperError::InvalidCast { .. }));
    }

    #[test]
    fn test_bean_strategy() {
        let class = BeanClass::builder("Settings")
            .property("verbose", TypeDescriptor::Bool)
            .property("tags", TypeDescriptor::sequence_of(TypeDescriptor::String))
            .build();
        let builder = ObjectBuilder::bean(class);

        assert_eq!(
            builder.type_of(Key::Field("tags")).unwrap(),
            TypeDescriptor::sequence_of(TypeDescriptor::String)
        );

        let mut bean = builder.supply().unwrap();
        builder
            .populate(&mut bean, Key::Field("verbose"), Value::Bool(true))
            .unwrap();
        let value = builder.finish(bean).unwrap();
        assert_eq!(value.as_bean().unwrap().get("verbose"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_unavailable_builder_refuses_to_start() {
        let builder = DynObjectBuilder::structural(&TypeDescriptor::Int, RecordPolicy::Lenient);
        let err = builder.supply().unwrap_err();
        assert!(matches!(err, MapperError::StructuralMismatch(_)));
        assert_eq!(builder.label(), "bean int");
    }

    #[test]
    fn test_erased_builder_rejects_foreign_aggregate() {
        let seq = ObjectBuilder::sequence(TypeDescriptor::Int).erase();
        let rec = ObjectBuilder::record(person(), RecordPolicy::Lenient).erase();
        let mut aggregate = rec.supply().unwrap();
        let err = seq
            .populate(&mut aggregate, Key::Index(0), Value::Int(1))
            .unwrap_err();
        assert!(matches!(err, MapperError::StructuralMismatch(_)));
    }
}
