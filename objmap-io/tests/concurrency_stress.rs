//! Concurrent parse and render calls on one shared mapper

use objmap_io::{Mapper, TypeDescriptor};
use objmap_test_utils::{chart_class, Person, TestDataGenerator};
use rayon::prelude::*;

#[test]
fn shared_mapper_across_threads() {
    let mapper = Mapper::new();
    let ty = TypeDescriptor::Record(chart_class());
    let documents: Vec<String> = (1..=32)
        .map(|n| TestDataGenerator::chart_document(n % 5, n))
        .collect();

    let rendered: Vec<String> = documents
        .par_iter()
        .map(|text| {
            let value = mapper.parse(text, &ty).unwrap();
            mapper.render(&value).unwrap()
        })
        .collect();

    for (text, out) in documents.iter().zip(&rendered) {
        let expected = mapper.render(&mapper.parse(text, &ty).unwrap()).unwrap();
        assert_eq!(out, &expected);
    }
    // Chart and Line, each built exactly once
    assert_eq!(mapper.generator_cache().len(), 2);
    assert_eq!(mapper.generator_cache().builds(), 2);
}

#[test]
fn typed_parses_in_parallel() {
    let mapper = Mapper::new();
    let text = TestDataGenerator::people_document(50);
    let totals: Vec<usize> = (0..16)
        .into_par_iter()
        .map(|_| mapper.parse_as::<Vec<Person>>(&text).unwrap().len())
        .collect();
    assert!(totals.iter().all(|&n| n == 50));
}
