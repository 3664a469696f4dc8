//! Structural event scanner over `serde_json`
//!
//! Tokenizing is left to `serde_json`; this module only translates what its
//! deserializer reports into [`EventSink`] calls. Errors raised by the sink
//! travel through serde as custom errors and are handed back unchanged.
//! `serde_json`'s recursion limit is switched off, so nesting depth is
//! bounded only by the sink (the materializer's [`Limits`](objmap_codec::Limits)).

use objmap_codec::{EventSink, Key, MapperError, Result, Value};
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;

/// Feed the structure of `text` to `sink`
pub fn scan<S: EventSink>(text: &str, sink: &mut S) -> Result<()> {
    let mut failure = None;
    let mut de = serde_json::Deserializer::from_str(text);
    // Nesting is bounded by the sink; the sink's depth limit must be the one that trips
    de.disable_recursion_limit();

    let seed = EventSeed {
        sink,
        failure: &mut failure,
        key: Key::Root,
    };
    let outcome = seed.deserialize(&mut de).and_then(|()| de.end());

    match (outcome, failure) {
        (Ok(()), _) => Ok(()),
        (Err(_), Some(sink_error)) => Err(sink_error),
        (Err(err), None) => Err(MapperError::MalformedInput(err.to_string())),
    }
}

struct EventSeed<'a, 'k, S> {
    sink: &'a mut S,
    failure: &'a mut Option<MapperError>,
    key: Key<'k>,
}

impl<S: EventSink> EventSeed<'_, '_, S> {
    /// Run one sink call, parking its error where [`scan`] can recover it
    fn emit<E: de::Error>(
        &mut self,
        event: impl FnOnce(&mut S, Key<'_>) -> Result<()>,
    ) -> std::result::Result<(), E> {
        event(self.sink, self.key).map_err(|err| {
            let message = err.to_string();
            *self.failure = Some(err);
            E::custom(message)
        })
    }

    fn child<'c, 'k2>(&'c mut self, key: Key<'k2>) -> EventSeed<'c, 'k2, S> {
        EventSeed {
            sink: &mut *self.sink,
            failure: &mut *self.failure,
            key,
        }
    }
}

impl<'de, S: EventSink> DeserializeSeed<'de> for EventSeed<'_, '_, S> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de, S: EventSink> Visitor<'de> for EventSeed<'_, '_, S> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(mut self) -> std::result::Result<(), E> {
        self.emit(|sink, key| sink.scalar(key, Value::Null))
    }

    fn visit_bool<E: de::Error>(mut self, v: bool) -> std::result::Result<(), E> {
        self.emit(|sink, key| sink.scalar(key, Value::Bool(v)))
    }

    fn visit_i64<E: de::Error>(mut self, v: i64) -> std::result::Result<(), E> {
        self.emit(|sink, key| sink.scalar(key, Value::Int(v)))
    }

    fn visit_u64<E: de::Error>(mut self, v: u64) -> std::result::Result<(), E> {
        let value = match i64::try_from(v) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Float(v as f64),
        };
        self.emit(|sink, key| sink.scalar(key, value))
    }

    fn visit_f64<E: de::Error>(mut self, v: f64) -> std::result::Result<(), E> {
        self.emit(|sink, key| sink.scalar(key, Value::Float(v)))
    }

    fn visit_str<E: de::Error>(mut self, v: &str) -> std::result::Result<(), E> {
        self.emit(|sink, key| sink.scalar(key, Value::from(v)))
    }

    fn visit_string<E: de::Error>(mut self, v: String) -> std::result::Result<(), E> {
        self.emit(|sink, key| sink.scalar(key, Value::String(v)))
    }

    fn visit_seq<A: SeqAccess<'de>>(mut self, mut seq: A) -> std::result::Result<(), A::Error> {
        self.emit(|sink, key| sink.start_array(key))?;
        let mut index = 0;
        while seq.next_element_seed(self.child(Key::Index(index)))?.is_some() {
            index += 1;
        }
        self.emit(|sink, key| sink.end_array(key))
    }

    fn visit_map<A: MapAccess<'de>>(mut self, mut map: A) -> std::result::Result<(), A::Error> {
        self.emit(|sink, key| sink.start_aggregate(key))?;
        while let Some(field) = map.next_key::<String>()? {
            map.next_value_seed(self.child(Key::Field(&field)))?;
        }
        self.emit(|sink, key| sink.end_aggregate(key))
    }
}
