//! Type descriptors and class metadata
//!
//! A [`TypeDescriptor`] names the shape to materialize for a value. Class
//! descriptors ([`BeanClass`], [`RecordClass`]) are built once, ahead of any
//! parse, and shared behind `Arc`; two descriptors naming a class are equal
//! only if they name the same class instance.

use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-unique identity of a class descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ClassId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric id
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Handle naming a target shape
#[derive(Clone)]
pub enum TypeDescriptor {
    /// `true` / `false`
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit float (integers widen into it)
    Float,
    /// UTF-8 string (nullable)
    String,
    /// Any scalar; no assignability check
    Any,
    /// Ordered sequence of one element shape
    Sequence(Arc<TypeDescriptor>),
    /// Nominal class populated through setters
    Bean(Arc<BeanClass>),
    /// Fixed-arity record built through its canonical constructor
    Record(Arc<RecordClass>),
    /// Shape only a registered type matcher knows how to build
    Named(Arc<str>),
}

impl TypeDescriptor {
    /// Sequence of `element`
    pub fn sequence_of(element: TypeDescriptor) -> Self {
        TypeDescriptor::Sequence(Arc::new(element))
    }

    /// Descriptor for a shape supplied by a custom matcher
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        TypeDescriptor::Named(name.into())
    }

    /// Whether this is a scalar leaf shape
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Bool
                | TypeDescriptor::Int
                | TypeDescriptor::Float
                | TypeDescriptor::String
                | TypeDescriptor::Any
        )
    }

    /// Element shape of a sequence descriptor
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::Sequence(elem) => Some(elem),
            _ => None,
        }
    }

    /// Bean class, if this descriptor names one
    pub fn as_bean(&self) -> Option<&Arc<BeanClass>> {
        match self {
            TypeDescriptor::Bean(class) => Some(class),
            _ => None,
        }
    }

    /// Record class, if this descriptor names one
    pub fn as_record(&self) -> Option<&Arc<RecordClass>> {
        match self {
            TypeDescriptor::Record(class) => Some(class),
            _ => None,
        }
    }

    /// Value a slot of this shape holds before anything is written to it
    pub fn zero_value(&self) -> Value {
        match self {
            TypeDescriptor::Bool => Value::Bool(false),
            TypeDescriptor::Int => Value::Int(0),
            TypeDescriptor::Float => Value::Float(0.0),
            _ => Value::Null,
        }
    }

    /// Shallow assignability check of `value` against this shape
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeDescriptor::Any, _) | (TypeDescriptor::Named(_), _) => true,
            (TypeDescriptor::Bool, Value::Bool(_)) => true,
            (TypeDescriptor::Int, Value::Int(_)) => true,
            (TypeDescriptor::Float, Value::Float(_) | Value::Int(_)) => true,
            (TypeDescriptor::Bool | TypeDescriptor::Int | TypeDescriptor::Float, _) => false,
            (_, Value::Null) => true,
            (TypeDescriptor::String, Value::String(_)) => true,
            (TypeDescriptor::Sequence(_), Value::Sequence(_)) => true,
            (TypeDescriptor::Bean(class), Value::Bean(bean)) => bean.class().id() == class.id(),
            (TypeDescriptor::Record(class), Value::Record(record)) => {
                record.class().id() == class.id()
            }
            _ => false,
        }
    }

    /// Assign `value` to a slot of this shape, widening integers for float
    /// slots. Hands the value back if it is not assignable.
    pub fn coerce(&self, value: Value) -> std::result::Result<Value, Value> {
        match (self, value) {
            (TypeDescriptor::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
            (_, value) if self.accepts(&value) => Ok(value),
            (_, value) => Err(value),
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        use TypeDescriptor::*;
        match (self, other) {
            (Bool, Bool) | (Int, Int) | (Float, Float) | (String, String) | (Any, Any) => true,
            (Sequence(a), Sequence(b)) => a == b,
            (Bean(a), Bean(b)) => a.id() == b.id(),
            (Record(a), Record(b)) => a.id() == b.id(),
            (Named(a), Named(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            TypeDescriptor::Sequence(elem) => elem.hash(state),
            TypeDescriptor::Bean(class) => class.id().hash(state),
            TypeDescriptor::Record(class) => class.id().hash(state),
            TypeDescriptor::Named(name) => name.hash(state),
            _ => {}
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Bool => f.write_str("bool"),
            TypeDescriptor::Int => f.write_str("int"),
            TypeDescriptor::Float => f.write_str("float"),
            TypeDescriptor::String => f.write_str("string"),
            TypeDescriptor::Any => f.write_str("any"),
            TypeDescriptor::Sequence(elem) => write!(f, "[{}]", elem),
            TypeDescriptor::Bean(class) => f.write_str(class.name()),
            TypeDescriptor::Record(class) => f.write_str(class.name()),
            TypeDescriptor::Named(name) => f.write_str(name),
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self)
    }
}

/// Which accessors a bean property exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Getter and setter
    ReadWrite,
    /// Getter only
    ReadOnly,
    /// Setter only
    WriteOnly,
}

impl Access {
    /// Has a getter
    pub fn is_readable(self) -> bool {
        matches!(self, Access::ReadWrite | Access::ReadOnly)
    }

    /// Has a setter
    pub fn is_settable(self) -> bool {
        matches!(self, Access::ReadWrite | Access::WriteOnly)
    }
}

/// One property of a bean class
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    ty: TypeDescriptor,
    rename: Option<String>,
    access: Access,
}

impl Property {
    /// Read-write property
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            rename: None,
            access: Access::ReadWrite,
        }
    }

    /// Emit this property under `name` instead of its structural name
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self
    }

    /// Override the accessor set
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Structural name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// Declared rename, if any
    pub fn rename(&self) -> Option<&str> {
        self.rename.as_deref()
    }

    /// Name the writer emits
    pub fn emitted_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }

    /// Accessor set
    pub fn access(&self) -> Access {
        self.access
    }
}

/// Nominal class populated through a zero-argument constructor and setters
#[derive(Debug)]
pub struct BeanClass {
    id: ClassId,
    name: String,
    properties: Vec<Property>,
    index: HashMap<String, usize>,
}

impl BeanClass {
    /// Start describing a bean class
    pub fn builder(name: impl Into<String>) -> BeanClassBuilder {
        BeanClassBuilder {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Class identity
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Properties in declaration order
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Slot index of property `name`
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Property `name`, if declared
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.slot_of(name).map(|idx| &self.properties[idx])
    }

    /// Settable property `name` with its slot index
    pub fn setter(&self, name: &str) -> Option<(usize, &Property)> {
        let idx = self.slot_of(name)?;
        let property = &self.properties[idx];
        property.access.is_settable().then_some((idx, property))
    }
}

/// Builder for [`BeanClass`]
#[derive(Debug)]
pub struct BeanClassBuilder {
    name: String,
    properties: Vec<Property>,
}

impl BeanClassBuilder {
    /// Add a read-write property
    pub fn property(self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.property_with(Property::new(name, ty))
    }

    /// Add a fully described property; a repeated name replaces the earlier one
    pub fn property_with(mut self, property: Property) -> Self {
        match self.properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
        self
    }

    /// Finish the class
    pub fn build(self) -> Arc<BeanClass> {
        let index = self
            .properties
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.name.clone(), idx))
            .collect();
        Arc::new(BeanClass {
            id: ClassId::next(),
            name: self.name,
            properties: self.properties,
            index,
        })
    }
}

/// One component of a record class
#[derive(Debug, Clone)]
pub struct Component {
    name: String,
    ty: TypeDescriptor,
    rename: Option<String>,
}

impl Component {
    /// New component
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            rename: None,
        }
    }

    /// Emit this component under `name`
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self
    }

    /// Structural name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// Name the writer emits
    pub fn emitted_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }
}

/// Fixed-arity record with named components in declared order
#[derive(Debug)]
pub struct RecordClass {
    id: ClassId,
    name: String,
    components: Vec<Component>,
    index: HashMap<String, usize>,
}

impl RecordClass {
    /// Start describing a record class
    pub fn builder(name: impl Into<String>) -> RecordClassBuilder {
        RecordClassBuilder {
            name: name.into(),
            components: Vec::new(),
        }
    }

    /// Class identity
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Record name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Components in declared order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Number of components
    pub fn arity(&self) -> usize {
        self.components.len()
    }

    /// Position of component `name`
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Component `name`, if declared
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.position_of(name).map(|idx| &self.components[idx])
    }
}

/// Builder for [`RecordClass`]
#[derive(Debug)]
pub struct RecordClassBuilder {
    name: String,
    components: Vec<Component>,
}

impl RecordClassBuilder {
    /// Append a component
    pub fn component(self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.component_with(Component::new(name, ty))
    }

    /// Append a fully described component; a repeated name replaces the earlier one
    pub fn component_with(mut self, component: Component) -> Self {
        match self.components.iter_mut().find(|c| c.name == component.name) {
            Some(existing) => *existing = component,
            None => self.components.push(component),
        }
        self
    }

    /// Finish the class
    pub fn build(self) -> Arc<RecordClass> {
        let index = self
            .components
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.name.clone(), idx))
            .collect();
        Arc::new(RecordClass {
            id: ClassId::next(),
            name: self.name,
            components: self.components,
            index,
        })
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
    fn test_descriptor_display() {
        let seq = TypeDescriptor::sequence_of(TypeDescriptor::sequence_of(TypeDescriptor::Int));
        assert_eq!(seq.to_string(), "[[int]]");
        assert_eq!(TypeDescriptor::Record(person()).to_string(), "Person");
    }

    #[test]
    fn test_class_identity_equality() {
        let a = person();
        let b = person();
        assert_eq!(TypeDescriptor::Record(a.clone()), TypeDescriptor::Record(a.clone()));
        // Same shape, different class
        assert_ne!(TypeDescriptor::Record(a), TypeDescriptor::Record(b));
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(TypeDescriptor::Int.zero_value(), Value::Int(0));
        assert_eq!(TypeDescriptor::Bool.zero_value(), Value::Bool(false));
        assert_eq!(TypeDescriptor::Float.zero_value(), Value::Float(0.0));
        assert_eq!(TypeDescriptor::String.zero_value(), Value::Null);
        assert_eq!(TypeDescriptor::Record(person()).zero_value(), Value::Null);
    }

    #[test]
    fn test_accepts() {
        assert!(TypeDescriptor::Float.accepts(&Value::Int(3)));
        assert!(!TypeDescriptor::Int.accepts(&Value::Float(3.0)));
        assert!(!TypeDescriptor::Int.accepts(&Value::Null));
        assert!(TypeDescriptor::String.accepts(&Value::Null));
        assert!(TypeDescriptor::Any.accepts(&Value::from("x")));
        assert!(!TypeDescriptor::String.accepts(&Value::Int(1)));
    }

    #[test]
    fn test_coerce_widens_int_to_float() {
        assert_eq!(TypeDescriptor::Float.coerce(Value::Int(2)), Ok(Value::Float(2.0)));
        assert_eq!(TypeDescriptor::Any.coerce(Value::Int(2)), Ok(Value::Int(2)));
        assert_eq!(
            TypeDescriptor::Int.coerce(Value::from("2")),
            Err(Value::from("2"))
        );
    }

    #[test]
    fn test_bean_setter_respects_access() {
        let class = BeanClass::builder("Account")
            .property("owner", TypeDescriptor::String)
            .property_with(Property::new("id", TypeDescriptor::Int).with_access(Access::ReadOnly))
            .build();

        assert!(class.setter("owner").is_some());
        assert!(class.setter("id").is_none());
        assert!(class.property("id").is_some());
        assert!(class.setter("missing").is_none());
    }

    #[test]
    fn test_duplicate_component_replaces() {
        let class = RecordClass::builder("Point")
            .component("x", TypeDescriptor::Int)
            .component("x", TypeDescriptor::Float)
            .build();
        assert_eq!(class.arity(), 1);
        assert_eq!(class.components()[0].ty(), &TypeDescriptor::Float);
    }

    #[test]
    fn test_emitted_name() {
        let property = Property::new("firstName", TypeDescriptor::String).renamed("first_name");
        assert_eq!(property.emitted_name(), "first_name");
        assert_eq!(property.name(), "firstName");
    }
}
