//! Build-time validation through the public builder API.

mod support;

use support::*;
use trellis_runtime::prelude::*;

#[test]
fn test_duplicate_source_value_rejected() {
    let mut builder = DataGraph::builder();
    let result = builder
        .source()
        .with_value(ColumnId::text("word"))
        .unwrap()
        .with_value(ColumnId::int("word"));
    assert!(matches!(
        result,
        Err(GraphError::DuplicateValue { name }) if name == "word"
    ));
}

#[test]
fn test_build_without_result_fails() {
    let mut builder = DataGraph::builder();
    builder
        .source()
        .with_value(ColumnId::text("word"))
        .unwrap()
        .build()
        .unwrap();
    assert!(matches!(builder.build(), Err(GraphError::NoResult)));
}

#[test]
fn test_token_from_another_builder_is_dangling() {
    let mut other = DataGraph::builder();
    let foreign = other
        .source()
        .with_value(ColumnId::int("value"))
        .unwrap()
        .with_value(ColumnId::int("extra"))
        .unwrap()
        .build()
        .unwrap();

    let mut builder = DataGraph::builder();
    builder
        .source()
        .with_value(ColumnId::text("word"))
        .unwrap()
        .build()
        .unwrap();

    // The foreign handle's node is not registered on `builder`.
    let result = builder.add_transform(
        AddConstant::new(&foreign, &ColumnId::int("extra"), ColumnId::int("out"), 1).unwrap(),
    );
    assert!(matches!(result, Err(GraphError::DanglingReference { .. })));
}

#[test]
fn test_merge_rejects_colliding_names() {
    let mut builder = DataGraph::builder();
    let left = builder
        .source()
        .with_value(ColumnId::int("value"))
        .unwrap()
        .build()
        .unwrap();
    let right = builder
        .source()
        .with_value(ColumnId::int("value"))
        .unwrap()
        .build()
        .unwrap();

    assert!(matches!(
        builder.merge(&[&left, &right]),
        Err(GraphError::DuplicateValue { name }) if name == "value"
    ));
}

#[test]
fn test_merge_skips_train_only_values() {
    let mut builder = DataGraph::builder();
    let source = builder
        .source()
        .with_value(ColumnId::text("word"))
        .unwrap()
        .with_train_only_value(ColumnId::bool("label"))
        .unwrap()
        .build()
        .unwrap();

    let merged = builder.merge(&[&source]).unwrap();
    assert_eq!(merged.outputs().len(), 1);
    assert_eq!(merged.outputs()[0].name(), "word");
}

#[test]
fn test_column_subset_validation() {
    let mut builder = DataGraph::builder();
    let source = builder
        .source()
        .with_value(ColumnId::int("value"))
        .unwrap()
        .build()
        .unwrap();

    // Keeping the same source column twice is a duplicate.
    let result = ColumnSubset::builder(&source)
        .keep(&ColumnId::int("value"))
        .unwrap()
        .keep_renamed(&ColumnId::int("value"), "copy");
    assert!(matches!(result, Err(GraphError::DuplicateValue { .. })));

    // Keeping an undeclared column fails at build.
    let result = ColumnSubset::builder(&source)
        .keep(&ColumnId::int("absent"))
        .unwrap()
        .build();
    assert!(matches!(result, Err(GraphError::UnknownValue { .. })));

    // An empty subset is unusable.
    assert!(matches!(
        ColumnSubset::builder(&source).build(),
        Err(GraphError::InvalidGraph(_))
    ));
}

#[test]
fn test_drop_columns_validation() {
    let mut builder = DataGraph::builder();
    let source = builder
        .source()
        .with_value(ColumnId::int("a"))
        .unwrap()
        .with_value(ColumnId::int("b"))
        .unwrap()
        .build()
        .unwrap();

    let dropped = DropColumns::new(&source, &["a"]).unwrap();
    assert_eq!(dropped.outputs().len(), 1);
    assert_eq!(dropped.outputs()[0].name(), "b");

    assert!(matches!(
        DropColumns::new(&source, &["a", "b"]),
        Err(GraphError::InvalidGraph(_))
    ));
}

#[test]
fn test_handles_expose_declarations() {
    let mut builder = DataGraph::builder();
    let source = builder
        .source()
        .with_value(ColumnId::text("word"))
        .unwrap()
        .with_train_only_value(ColumnId::bool("label"))
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(source.outputs().len(), 2);
    assert!(source.is_train_only("label"));
    assert!(!source.is_train_only("word"));

    let token = source.token(&ColumnId::bool("label")).unwrap();
    assert_eq!(token.producer(), source.id());
    assert_eq!(token.name(), "label");
    assert_eq!(token.kind(), ValueKind::Bool);
}
