//! End-to-end engine scenarios driven by hand-written event sequences

use objmap_codec::{
    matchers, EventSink, Key, Limits, Materializer, MapperError, ObjectBuilder, Registry,
    TypeDescriptor, Value, Writer,
};
use objmap_model::{BeanClass, RecordClass};
use std::sync::Arc;

fn line_class() -> Arc<RecordClass> {
    RecordClass::builder("Line")
        .component("label", TypeDescriptor::String)
        .component("points", TypeDescriptor::sequence_of(TypeDescriptor::Int))
        .build()
}

fn chart_class(line: &Arc<RecordClass>) -> Arc<RecordClass> {
    RecordClass::builder("Chart")
        .component("title", TypeDescriptor::String)
        .component(
            "lines",
            TypeDescriptor::sequence_of(TypeDescriptor::Record(line.clone())),
        )
        .build()
}

/// Emits `{"label": <label>, "points": [..]}` under `key`
fn emit_line(sink: &mut impl EventSink, key: Key<'_>, label: &str, points: &[i64]) {
    sink.start_aggregate(key).unwrap();
    sink.scalar(Key::Field("label"), label.into()).unwrap();
    sink.start_array(Key::Field("points")).unwrap();
    for (idx, point) in points.iter().enumerate() {
        sink.scalar(Key::Index(idx), Value::Int(*point)).unwrap();
    }
    sink.end_array(Key::Field("points")).unwrap();
    sink.end_aggregate(key).unwrap();
}

#[test]
fn record_of_sequence_of_records_of_sequences() {
    let line = line_class();
    let chart = chart_class(&line);
    let registry = Registry::new();
    let mut machine = Materializer::new(
        &registry,
        TypeDescriptor::Record(chart.clone()),
        &Limits::default(),
    );

    machine.start_aggregate(Key::Root).unwrap();
    machine.scalar(Key::Field("title"), "growth".into()).unwrap();
    machine.start_array(Key::Field("lines")).unwrap();
    emit_line(&mut machine, Key::Index(0), "a", &[1, 2, 3]);
    emit_line(&mut machine, Key::Index(1), "b", &[]);
    machine.end_array(Key::Field("lines")).unwrap();
    machine.end_aggregate(Key::Root).unwrap();

    let value = machine.finish().unwrap();
    let record = value.as_record().unwrap();
    assert_eq!(record.class().id(), chart.id());

    let lines = record.get("lines").unwrap().as_sequence().unwrap();
    assert_eq!(lines.len(), 2);
    let first = lines[0].as_record().unwrap();
    assert_eq!(first.get("label"), Some(&Value::from("a")));
    assert_eq!(
        first.get("points").unwrap().as_sequence().unwrap(),
        &[Value::Int(1), Value::Int(2), Value::Int(3)]
    );

    let text = Writer::new().render(&value).unwrap();
    assert_eq!(
        text,
        "{\"title\": \"growth\", \"lines\": [{\"label\": \"a\", \"points\": [1, 2, 3]}, \
         {\"label\": \"b\", \"points\": []}]}"
    );
}

#[test]
fn late_registered_matcher_takes_precedence() {
    let money = TypeDescriptor::named("Money");
    let cents = |label: &'static str| {
        ObjectBuilder::new(
            label,
            |_| Ok(TypeDescriptor::Int),
            || Ok(0i64),
            |total: &mut i64, _, value| {
                *total += value.as_i64().unwrap_or_default();
                Ok(())
            },
            move |total| Ok(Value::from(format!("{}:{}", label, total))),
        )
    };

    let mut registry = Registry::new();
    registry.register(matchers::exact(money.clone(), cents("A")));
    registry.register(matchers::exact(money.clone(), cents("B")));

    let mut machine = Materializer::new(&registry, money, &Limits::default());
    machine.start_aggregate(Key::Root).unwrap();
    machine.scalar(Key::Field("dollars"), Value::Int(300)).unwrap();
    machine.scalar(Key::Field("cents"), Value::Int(5)).unwrap();
    machine.end_aggregate(Key::Root).unwrap();

    assert_eq!(machine.finish().unwrap(), Value::from("B:305"));
}

#[test]
fn unregistered_shape_falls_back_to_bean() {
    let class = BeanClass::builder("Flag")
        .property("on", TypeDescriptor::Bool)
        .build();
    let registry = Registry::new();
    let mut machine = Materializer::new(
        &registry,
        TypeDescriptor::Bean(class.clone()),
        &Limits::default(),
    );
    machine.start_aggregate(Key::Root).unwrap();
    machine.scalar(Key::Field("on"), Value::Bool(true)).unwrap();
    machine.end_aggregate(Key::Root).unwrap();

    let value = machine.finish().unwrap();
    let bean = value.into_bean_of(&class).unwrap();
    assert_eq!(bean.get("on"), Some(&Value::Bool(true)));
}

#[test]
fn unknown_key_aborts_document() {
    let class = BeanClass::builder("Flag")
        .property("on", TypeDescriptor::Bool)
        .build();
    let registry = Registry::new();
    let mut machine =
        Materializer::new(&registry, TypeDescriptor::Bean(class), &Limits::default());
    machine.start_aggregate(Key::Root).unwrap();
    let err = machine
        .scalar(Key::Field("off"), Value::Bool(true))
        .unwrap_err();
    assert_eq!(
        err,
        MapperError::UnknownProperty {
            class: "Flag".to_string(),
            key: "off".to_string(),
        }
    );
}

#[test]
fn nested_unknown_key_reports_nested_class() {
    let line = line_class();
    let chart = chart_class(&line);
    let registry = Registry::new();
    let mut machine =
        Materializer::new(&registry, TypeDescriptor::Record(chart), &Limits::default());
    machine.start_aggregate(Key::Root).unwrap();
    machine.start_array(Key::Field("lines")).unwrap();
    machine.start_aggregate(Key::Index(0)).unwrap();
    let err = machine.scalar(Key::Field("color"), "red".into()).unwrap_err();
    assert!(matches!(err, MapperError::UnknownProperty { ref class, .. } if class == "Line"));
}
