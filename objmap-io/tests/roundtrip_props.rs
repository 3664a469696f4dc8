//! Property tests: render then parse returns an equal value

use objmap_io::{Mapper, TypeDescriptor, Value};
use objmap_model::{Record, RecordClass};
use objmap_test_utils::Person;
use proptest::prelude::*;
use std::sync::Arc;

fn measurement_class() -> Arc<RecordClass> {
    use std::sync::OnceLock;
    static CLASS: OnceLock<Arc<RecordClass>> = OnceLock::new();
    CLASS
        .get_or_init(|| {
            RecordClass::builder("Measurement")
                .component("station", TypeDescriptor::String)
                .component("ok", TypeDescriptor::Bool)
                .component("readings", TypeDescriptor::sequence_of(TypeDescriptor::Float))
                .component(
                    "grid",
                    TypeDescriptor::sequence_of(TypeDescriptor::sequence_of(TypeDescriptor::Int)),
                )
                .build()
        })
        .clone()
}

// Strings are written unescaped, so generated text stays clear of quotes
fn plain_string() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.-]{0,16}"
}

// Dyadic fractions print and parse back exactly
fn exact_float() -> impl Strategy<Value = f64> {
    (-1_000_000i64..1_000_000).prop_map(|n| n as f64 / 64.0)
}

fn measurement() -> impl Strategy<Value = Value> {
    (
        plain_string(),
        any::<bool>(),
        prop::collection::vec(exact_float(), 0..8),
        prop::collection::vec(prop::collection::vec(any::<i64>(), 0..4), 0..4),
    )
        .prop_map(|(station, ok, readings, grid)| {
            let readings = readings.into_iter().map(Value::Float).collect::<Vec<_>>();
            let grid = grid
                .into_iter()
                .map(|row| Value::from(row.into_iter().map(Value::Int).collect::<Vec<_>>()))
                .collect::<Vec<_>>();
            Value::Record(
                Record::new(
                    measurement_class(),
                    vec![
                        Value::from(station),
                        Value::Bool(ok),
                        Value::from(readings),
                        Value::from(grid),
                    ],
                )
                .unwrap(),
            )
        })
}

proptest! {
    #[test]
    fn person_round_trip(name in plain_string(), age in any::<i64>()) {
        let mapper = Mapper::new();
        let person = Person { name, age };
        let text = mapper.render_as(&person).unwrap();
        let back: Person = mapper.parse_as(&text).unwrap();
        prop_assert_eq!(back, person);
    }

    #[test]
    fn measurement_round_trip(value in measurement()) {
        let mapper = Mapper::new();
        let ty = TypeDescriptor::Record(measurement_class());
        let text = mapper.render(&value).unwrap();
        let back = mapper.parse(&text, &ty).unwrap();
        prop_assert_eq!(&back, &value);
        // Rendering is deterministic
        prop_assert_eq!(mapper.render(&back).unwrap(), text);
    }

    #[test]
    fn int_sequence_preserves_order(items in prop::collection::vec(any::<i64>(), 0..64)) {
        let parsed: Vec<i64> = Mapper::new()
            .parse_as(&serde_json::to_string(&items).unwrap())
            .unwrap();
        prop_assert_eq!(parsed, items);
    }
}
