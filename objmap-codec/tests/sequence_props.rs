//! Property tests for the sequence strategy and the materializer stack

use objmap_codec::{EventSink, Key, Limits, Materializer, Registry, TypeDescriptor, Value};
use proptest::prelude::*;

proptest! {
    #[test]
    fn sequence_keeps_event_order(items in prop::collection::vec(any::<i64>(), 0..128)) {
        let registry = Registry::new();
        let ty = TypeDescriptor::sequence_of(TypeDescriptor::Int);
        let mut machine = Materializer::new(&registry, ty, &Limits::default());

        machine.start_array(Key::Root).unwrap();
        for (idx, item) in items.iter().enumerate() {
            machine.scalar(Key::Index(idx), Value::Int(*item)).unwrap();
        }
        machine.end_array(Key::Root).unwrap();

        let value = machine.finish().unwrap();
        let expected: Vec<Value> = items.iter().copied().map(Value::Int).collect();
        prop_assert_eq!(value.as_sequence().unwrap(), expected.as_slice());
    }

    #[test]
    fn depth_tracks_open_aggregates(depth in 1usize..40) {
        let registry = Registry::new();
        let mut ty = TypeDescriptor::Int;
        for _ in 0..depth {
            ty = TypeDescriptor::sequence_of(ty);
        }
        let mut machine = Materializer::new(&registry, ty, &Limits::default());

        machine.start_array(Key::Root).unwrap();
        for level in 1..depth {
            prop_assert_eq!(machine.depth(), level);
            machine.start_array(Key::Index(0)).unwrap();
        }
        prop_assert_eq!(machine.depth(), depth);
        for _ in 1..depth {
            machine.end_array(Key::Index(0)).unwrap();
        }
        machine.end_array(Key::Root).unwrap();

        prop_assert_eq!(machine.depth(), 0);
        prop_assert!(machine.is_complete());
        prop_assert!(machine.finish().is_ok());
    }
}
