#![allow(dead_code)]

use dataconv::{Mapping, Number, Tree};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Keys that are valid XML element names (and never start with "xml").
pub fn arb_key() -> BoxedStrategy<String> {
    proptest::string::string_regex("[a-w][a-z0-9_]{0,6}")
        .expect("valid key regex")
        .boxed()
}

/// Any finite number, in all three sign classes.
///
/// Floats are multiples of 1/64 so their shortest decimal form is short and
/// parses back exactly.
pub fn arb_number() -> BoxedStrategy<Number> {
    prop_oneof![
        any::<u64>().prop_map(Number::PosInt),
        (i64::MIN..0i64).prop_map(Number::NegInt),
        (-1_000_000i64..1_000_000i64).prop_map(|n| Number::Float(n as f64 / 64.0)),
    ]
    .boxed()
}

/// Scalars whose strings include XML-special characters and edge whitespace.
pub fn arb_scalar() -> BoxedStrategy<Tree> {
    prop_oneof![
        Just(Tree::Null),
        any::<bool>().prop_map(Tree::Bool),
        arb_number().prop_map(Tree::Number),
        proptest::string::string_regex("[a-zA-Z0-9 <>&'\"_.-]{0,12}")
            .expect("valid string regex")
            .prop_map(Tree::String),
    ]
    .boxed()
}

/// Arbitrary trees with a mapping root.
pub fn arb_tree() -> BoxedStrategy<Tree> {
    let value = arb_scalar().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..5).prop_map(Tree::Sequence),
            arb_mapping_of(inner, 0..5).prop_map(Tree::Mapping),
        ]
    });

    arb_mapping_of(value.boxed(), 1..5)
        .prop_map(Tree::Mapping)
        .boxed()
}

/// Trees that XML can carry without changing shape: mapping root, no empty
/// or one-item sequences, no nested sequences, no empty mappings, and
/// strings without edge whitespace.
pub fn arb_xml_shaped_tree() -> BoxedStrategy<Tree> {
    let scalar = prop_oneof![
        Just(Tree::Null),
        any::<bool>().prop_map(Tree::Bool),
        arb_number().prop_map(Tree::Number),
        proptest::string::string_regex("[a-zA-Z0-9<>&_.-]{0,12}")
            .expect("valid string regex")
            .prop_map(Tree::String),
    ];

    let value = scalar.prop_recursive(3, 32, 4, |inner| {
        arb_xml_mapping_of(inner).prop_map(Tree::Mapping)
    });

    arb_xml_mapping_of(value.boxed()).prop_map(Tree::Mapping).boxed()
}

fn arb_mapping_of(
    value: BoxedStrategy<Tree>,
    size: std::ops::Range<usize>,
) -> impl Strategy<Value = Mapping> {
    proptest::collection::vec((arb_key(), value), size)
        .prop_map(|entries| entries.into_iter().collect())
}

fn arb_xml_mapping_of(value: BoxedStrategy<Tree>) -> impl Strategy<Value = Mapping> {
    let entry_value = prop_oneof![
        3 => value.clone(),
        1 => proptest::collection::vec(value, 2..4).prop_map(Tree::Sequence),
    ];

    proptest::collection::vec((arb_key(), entry_value), 1..4)
        .prop_map(|entries| entries.into_iter().collect())
}

/// The tree as XML reads it back: every scalar becomes its text.
pub fn stringify_scalars(tree: &Tree) -> Tree {
    match tree {
        Tree::Sequence(items) => Tree::Sequence(items.iter().map(stringify_scalars).collect()),
        Tree::Mapping(mapping) => Tree::Mapping(
            mapping
                .iter()
                .map(|(key, value)| (key, stringify_scalars(value)))
                .collect(),
        ),
        scalar => Tree::String(scalar.scalar_text().unwrap_or_default()),
    }
}
