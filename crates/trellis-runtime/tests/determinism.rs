//! Output determinism across worker counts, repeated runs, and row order.

mod support;

use support::*;
use trellis_runtime::prelude::*;

/// A diamond-shaped pipeline with a supervised learner at the join, wide
/// enough that worker scheduling order actually varies between runs.
fn build_pipeline() -> (DataGraph, ColumnId) {
    let mut builder = DataGraph::builder();
    let source = builder
        .source()
        .with_value(ColumnId::text("word"))
        .unwrap()
        .with_train_only_value(ColumnId::bool("label"))
        .unwrap()
        .build()
        .unwrap();

    let lowered = ColumnId::text("lowered");
    let lower = builder
        .add_transform(LowerCase::new(&source, &ColumnId::text("word"), lowered.clone()).unwrap())
        .unwrap();

    let prediction = ColumnId::bool("prediction");
    let seen = builder
        .add_transform(
            TrueIfSeen::new(
                (&lower, &lowered),
                (&source, &ColumnId::bool("label")),
                prediction.clone(),
            )
            .unwrap(),
        )
        .unwrap();

    let kept_word = ColumnId::text("lowered");
    let word_branch = builder.keep_columns(&lower, &[kept_word]).unwrap();
    let merged = builder.merge(&[&word_branch, &seen]).unwrap();
    builder.set_result(&merged);
    (builder.build().unwrap(), prediction)
}

fn training_rows() -> Vec<Vec<Value>> {
    vec![
        vec!["Alpha".into(), true.into()],
        vec!["beta".into(), false.into()],
        vec!["GAMMA".into(), true.into()],
        vec!["delta".into(), false.into()],
    ]
}

fn test_rows() -> Vec<Vec<Value>> {
    vec![
        vec!["ALPHA".into()],
        vec!["beta".into()],
        vec!["epsilon".into()],
        vec!["gamma".into()],
    ]
}

#[tokio::test(flavor = "multi_thread")]
async fn test_training_output_identical_across_worker_counts() {
    let mut reference = None;
    for workers in [1, 2, 8] {
        let (graph, _) = build_pipeline();
        let engine = engine(workers);
        let input = graph.create_training_source(training_rows()).unwrap();
        let output = graph.train_transform(input, &engine).await.unwrap();
        match &reference {
            None => reference = Some(output),
            Some(expected) => assert_eq!(&output, expected, "workers = {workers}"),
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_inference_output_identical_across_repeated_runs() {
    let (graph, prediction) = build_pipeline();

    let train_engine = engine(2);
    let input = graph.create_training_source(training_rows()).unwrap();
    graph.train_transform(input, &train_engine).await.unwrap();

    let mut reference = None;
    for workers in [1, 2, 8] {
        let engine = engine(workers);
        for run in 0..100 {
            let input = graph.create_source(test_rows()).unwrap();
            let output = graph.transform(input, &engine).await.unwrap();
            match &reference {
                None => {
                    assert_eq!(
                        bool_column(&output, &prediction),
                        vec![true, false, false, true]
                    );
                    reference = Some(output);
                }
                Some(expected) => {
                    assert_eq!(&output, expected, "workers = {workers}, run = {run}");
                }
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_row_order_preserved_at_any_worker_count() {
    for workers in [1, 8] {
        let mut builder = DataGraph::builder();
        let source = builder
            .source()
            .with_value(ColumnId::int("n"))
            .unwrap()
            .build()
            .unwrap();
        let shifted = ColumnId::int("shifted");
        let add = builder
            .add_transform(
                AddConstant::new(&source, &ColumnId::int("n"), shifted.clone(), 100).unwrap(),
            )
            .unwrap();
        builder.set_result(&add);
        let graph = builder.build().unwrap();

        let rows: Vec<Vec<Value>> = (0..250).map(|n| vec![Value::Int(n)]).collect();
        let input = graph.create_source(rows).unwrap();
        let output = graph.transform(input, &engine(workers)).await.unwrap();

        assert_eq!(output.num_rows(), 250);
        let expected: Vec<i64> = (100..350).collect();
        assert_eq!(int_column(&output, &shifted), expected);
    }
}
