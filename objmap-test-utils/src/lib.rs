//! objmap Test Utilities
//!
//! Shared fixture classes, value builders and document generators for the
//! objmap integration tests.

use objmap_model::{
    Access, Bean, BeanClass, FromValue, MapperError, Property, Record, RecordClass, Result,
    ToValue, TypeDescriptor, Value,
};
use std::sync::{Arc, OnceLock};

/// `record Person(name: string, age: int)`
pub fn person_class() -> Arc<RecordClass> {
    static CLASS: OnceLock<Arc<RecordClass>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            RecordClass::builder("Person")
                .component("name", TypeDescriptor::String)
                .component("age", TypeDescriptor::Int)
                .build()
        })
        .clone()
}

/// Bean `Pet` with a renamed property and one of each accessor kind
pub fn pet_class() -> Arc<BeanClass> {
    static CLASS: OnceLock<Arc<BeanClass>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            BeanClass::builder("Pet")
                .property("species", TypeDescriptor::String)
                .property("age", TypeDescriptor::Int)
                .property_with(Property::new("weight", TypeDescriptor::Float).renamed("kg"))
                .property_with(
                    Property::new("secret", TypeDescriptor::String).with_access(Access::WriteOnly),
                )
                .property_with(
                    Property::new("id", TypeDescriptor::Int).with_access(Access::ReadOnly),
                )
                .build()
        })
        .clone()
}

/// `record Line(label: string, points: [int])`
pub fn line_class() -> Arc<RecordClass> {
    static CLASS: OnceLock<Arc<RecordClass>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            RecordClass::builder("Line")
                .component("label", TypeDescriptor::String)
                .component("points", TypeDescriptor::sequence_of(TypeDescriptor::Int))
                .build()
        })
        .clone()
}

/// `record Chart(title: string, lines: [Line])`
pub fn chart_class() -> Arc<RecordClass> {
    static CLASS: OnceLock<Arc<RecordClass>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            RecordClass::builder("Chart")
                .component("title", TypeDescriptor::String)
                .component(
                    "lines",
                    TypeDescriptor::sequence_of(TypeDescriptor::Record(line_class())),
                )
                .build()
        })
        .clone()
}

/// Typed view of [`person_class`]
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    /// Name
    pub name: String,
    /// Age in years
    pub age: i64,
}

impl FromValue for Person {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Record(person_class())
    }

    fn from_value(value: Value) -> Result<Self> {
        let record = value.into_record_of(&person_class())?;
        Ok(Self {
            name: record.field("name")?,
            age: record.field("age")?,
        })
    }
}

impl ToValue for Person {
    fn to_value(&self) -> Value {
        Record::new(
            person_class(),
            vec![Value::from(self.name.as_str()), Value::Int(self.age)],
        )
        .map(Value::Record)
        .expect("Person fields match person_class components")
    }
}

/// Builder for record values that starts from zero values
pub struct RecordBuilder {
    class: Arc<RecordClass>,
    values: Vec<Value>,
}

impl RecordBuilder {
    /// Create a new record builder
    pub fn new(class: Arc<RecordClass>) -> Self {
        let values = class
            .components()
            .iter()
            .map(|component| component.ty().zero_value())
            .collect();
        Self { class, values }
    }

    /// Set a component by name
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        let position = self
            .class
            .position_of(name)
            .unwrap_or_else(|| panic!("{} has no component '{}'", self.class.name(), name));
        self.values[position] = value.into();
        self
    }

    /// Build the record
    pub fn build(self) -> Result<Value> {
        Record::new(self.class, self.values).map(Value::Record)
    }
}

/// Builder for bean values
pub struct BeanBuilder {
    bean: Bean,
    error: Option<MapperError>,
}

impl BeanBuilder {
    /// Create a new bean builder
    pub fn new(class: Arc<BeanClass>) -> Self {
        Self {
            bean: Bean::new(class),
            error: None,
        }
    }

    /// Set a property through its setter
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.bean.set(name, value.into()) {
                self.error = Some(err);
            }
        }
        self
    }

    /// Build the bean, reporting the first failed set
    pub fn build(self) -> Result<Value> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(Value::Bean(self.bean)),
        }
    }
}

/// Generate test documents with various patterns
pub struct TestDataGenerator;

impl TestDataGenerator {
    /// `count` people as a JSON array of `Person` objects
    pub fn people_document(count: usize) -> String {
        let people: Vec<serde_json::Value> = (0..count)
            .map(|i| serde_json::json!({ "name": format!("person_{}", i), "age": i % 90 }))
            .collect();
        serde_json::Value::Array(people).to_string()
    }

    /// Chart document with `lines` lines of `points` points each
    pub fn chart_document(lines: usize, points: usize) -> String {
        let lines: Vec<serde_json::Value> = (0..lines)
            .map(|l| {
                serde_json::json!({
                    "label": format!("line_{}", l),
                    "points": (0..points).map(|p| (l * points + p) as i64).collect::<Vec<_>>(),
                })
            })
            .collect();
        serde_json::json!({ "title": "chart", "lines": lines }).to_string()
    }

    /// `depth` nested arrays around a single `0`
    pub fn nested_arrays(depth: usize) -> (String, TypeDescriptor) {
        let mut text = "0".to_string();
        let mut ty = TypeDescriptor::Int;
        for _ in 0..depth {
            text = format!("[{}]", text);
            ty = TypeDescriptor::sequence_of(ty);
        }
        (text, ty)
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use objmap_model::Value;

    /// Assert that two values are equal, printing both on failure
    pub fn assert_value_equal(actual: &Value, expected: &Value, context: &str) {
        if actual != expected {
            panic!(
                "Value assertion failed in {}:\nExpected: {:?}\nActual: {:?}",
                context, expected, actual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_classes_are_stable() {
        assert_eq!(person_class().id(), person_class().id());
        assert_eq!(Person::descriptor(), Person::descriptor());
    }

    #[test]
    fn test_record_builder() {
        let value = RecordBuilder::new(person_class())
            .set("name", "Ahmed")
            .build()
            .unwrap();
        let record = value.as_record().unwrap();
        assert_eq!(record.get("name"), Some(&Value::from("Ahmed")));
        assert_eq!(record.get("age"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_bean_builder_reports_first_error() {
        let err = BeanBuilder::new(pet_class())
            .set("colour", "red")
            .set("age", 3i64)
            .build()
            .unwrap_err();
        assert!(matches!(err, MapperError::UnknownProperty { .. }));
    }

    #[test]
    fn test_person_roundtrip() {
        let person = Person {
            name: "Ahmed".to_string(),
            age: 23,
        };
        assert_eq!(Person::from_value(person.to_value()).unwrap(), person);
    }

    #[test]
    fn test_nested_arrays() {
        let (text, ty) = TestDataGenerator::nested_arrays(3);
        assert_eq!(text, "[[[0]]]");
        assert_eq!(ty.to_string(), "[[[int]]]");
    }
}
