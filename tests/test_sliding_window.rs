//! Integration test: sliding window aggregation

use moving_transform::{
    AggregationSelection, MetaValue, RowRetention, SlidingWindowEngine, Table, TransformWarning,
    Variable,
};

fn series() -> Table {
    Table::builder()
        .attribute(Variable::continuous("x"), vec![1.0, 2.0, 3.0, 4.0, 5.0])
        .attribute(Variable::continuous("z"), vec![5.0, 4.0, 3.0, 2.0, 1.0])
        .class_var(Variable::continuous("y"), vec![0.0, 1.0, 0.0, 1.0, 1.0])
        .build()
        .unwrap()
}

fn column(table: &Table, name: &str) -> Vec<f64> {
    table.column(name).unwrap().to_vec()
}

#[test]
fn test_mean_aligned_to_window_end() {
    let selection = AggregationSelection::new().with("x", &["mean"]).unwrap();
    let engine = SlidingWindowEngine::new(3, RowRetention::KeepAligned).unwrap();
    let table = engine.compute(&series(), &selection).unwrap().table.unwrap();

    assert_eq!(column(&table, "x (Mean value)"), vec![2.0, 3.0, 4.0]);
    assert_eq!(table.ids().to_vec(), vec![2, 3, 4]);
    assert_eq!(table.y().column(0).to_vec(), vec![0.0, 1.0, 1.0]);
}

#[test]
fn test_output_layout() {
    let selection = AggregationSelection::new()
        .with("y", &["max"])
        .unwrap()
        .with("x", &["sum", "mean"])
        .unwrap();
    let engine = SlidingWindowEngine::new(2, RowRetention::KeepAligned).unwrap();
    let table = engine.compute(&series(), &selection).unwrap().table.unwrap();

    let names: Vec<&str> = table.domain().attributes().iter().map(|v| v.name()).collect();
    assert_eq!(
        names,
        vec!["x", "x (Mean value)", "x (Sum)", "z", "y (Maximum)"]
    );
    assert_eq!(table.domain().class_vars()[0].name(), "y");
}

#[test]
fn test_discard_outputs_only_aggregates() {
    let selection = AggregationSelection::new().with("z", &["min", "span"]).unwrap();
    let engine = SlidingWindowEngine::new(4, RowRetention::Discard).unwrap();
    let output = engine.compute(&series(), &selection).unwrap();
    assert!(output.warnings.is_empty());
    let table = output.table.unwrap();

    assert_eq!(table.domain().attributes().len(), 2);
    assert!(table.domain().class_vars().is_empty());
    assert_eq!(column(&table, "z (Minimum)"), vec![2.0, 1.0]);
    assert_eq!(column(&table, "z (Span)"), vec![3.0, 3.0]);
}

#[test]
fn test_cumulative_sum_by_retention() {
    let selection = AggregationSelection::new().with("x", &["cumsum"]).unwrap();
    let running = SlidingWindowEngine::new(3, RowRetention::KeepAll)
        .unwrap()
        .compute(&series(), &selection)
        .unwrap()
        .table
        .unwrap();
    assert_eq!(
        column(&running, "x (Cumulative sum)"),
        vec![1.0, 3.0, 6.0, 10.0, 15.0]
    );

    // Without every row kept the kind reduces each window
    let windowed = SlidingWindowEngine::new(3, RowRetention::Discard)
        .unwrap()
        .compute(&series(), &selection)
        .unwrap()
        .table
        .unwrap();
    assert_eq!(column(&windowed, "x (Cumulative sum)"), vec![6.0, 9.0, 12.0]);
}

#[test]
fn test_names_avoid_existing_columns() {
    let table = Table::builder()
        .attribute(Variable::continuous("x"), vec![1.0, 2.0, 3.0])
        .attribute(Variable::continuous("x (Sum)"), vec![0.0, 0.0, 0.0])
        .build()
        .unwrap();
    let selection = AggregationSelection::new().with("x", &["sum"]).unwrap();
    let engine = SlidingWindowEngine::new(2, RowRetention::KeepAligned).unwrap();
    let output = engine.compute(&table, &selection).unwrap().table.unwrap();

    assert_eq!(column(&output, "x (Sum) (1)"), vec![3.0, 5.0]);
    assert_eq!(column(&output, "x (Sum)"), vec![0.0, 0.0]);
}

#[test]
fn test_missing_values_skipped() {
    let table = Table::builder()
        .attribute(Variable::continuous("x"), vec![1.0, f64::NAN, 3.0, f64::NAN, f64::NAN])
        .build()
        .unwrap();
    let selection = AggregationSelection::new().with("x", &["mean", "defined"]).unwrap();
    let engine = SlidingWindowEngine::new(2, RowRetention::Discard).unwrap();
    let output = engine.compute(&table, &selection).unwrap().table.unwrap();

    let mean = column(&output, "x (Mean value)");
    assert!((mean[0] - 1.0).abs() < 1e-6);
    assert!((mean[1] - 3.0).abs() < 1e-6);
    assert!((mean[2] - 3.0).abs() < 1e-6);
    assert!(mean[3].is_nan());
    assert_eq!(column(&output, "x (Defined count)"), vec![1.0, 1.0, 1.0, 0.0]);
    let count = output.domain().get("x (Defined count)").unwrap();
    assert_eq!(count.number_of_decimals(), Some(0));
}

#[test]
fn test_discrete_variable_kinds() {
    let table = Table::builder()
        .attribute(
            Variable::discrete("c", ["low", "high"]),
            vec![0.0, 1.0, 1.0, 0.0],
        )
        .build()
        .unwrap();
    let selection = AggregationSelection::new().with("c", &["mode", "mean"]).unwrap();
    let engine = SlidingWindowEngine::new(3, RowRetention::Discard).unwrap();
    let output = engine.compute(&table, &selection).unwrap();

    assert_eq!(
        output.warnings,
        vec![TransformWarning::UnsupportedForDiscrete(vec![
            "c (Mean value)".to_string()
        ])]
    );
    let table = output.table.unwrap();
    let mode = table.domain().get("c (Mode)").unwrap();
    assert!(mode.is_discrete());
    assert_eq!(table.column("c (Mode)").unwrap().to_vec(), vec![1.0, 1.0]);
}

#[test]
fn test_window_too_large() {
    let selection = AggregationSelection::new().with("x", &["mean"]).unwrap();
    let engine = SlidingWindowEngine::new(6, RowRetention::Discard).unwrap();
    let output = engine.compute(&series(), &selection).unwrap();

    assert!(output.has_warning(&TransformWarning::WindowTooLarge));
    assert_eq!(output.table.unwrap().n_rows(), 0);
}

#[test]
fn test_time_variable_not_aggregated() {
    let table = Table::builder()
        .attribute(Variable::time("t"), vec![0.0, 60.0, 120.0])
        .attribute(Variable::continuous("x"), vec![1.0, 2.0, 3.0])
        .time_variable("t")
        .build()
        .unwrap();
    let selection = AggregationSelection::new()
        .with("t", &["mean"])
        .unwrap()
        .with("x", &["mean"])
        .unwrap();
    let engine = SlidingWindowEngine::new(2, RowRetention::KeepAligned).unwrap();
    let output = engine.compute(&table, &selection).unwrap().table.unwrap();

    assert!(output.domain().get("t (Mean value)").is_none());
    assert_eq!(output.time_variable().unwrap().name(), "t");
    assert_eq!(column(&output, "t"), vec![60.0, 120.0]);
}

#[test]
fn test_idempotent() {
    let selection = AggregationSelection::new()
        .with("x", &["std", "median", "exp. MA"])
        .unwrap()
        .with("z", &["lin. MA"])
        .unwrap();
    let engine = SlidingWindowEngine::new(3, RowRetention::KeepAligned).unwrap();
    let first = engine.compute(&series(), &selection).unwrap().table.unwrap();
    let second = engine.compute(&series(), &selection).unwrap().table.unwrap();

    assert_eq!(first.domain(), second.domain());
    let bits = |t: &Table| t.x().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&first), bits(&second));
}

fn weighted() -> Table {
    Table::builder()
        .attribute(Variable::continuous("x"), vec![1.0, 2.0, 3.0, 4.0, 5.0])
        .meta(
            Variable::text("tag"),
            vec!["a".into(), "b".into(), "c".into(), "d".into(), MetaValue::Missing],
        )
        .weights(vec![0.1, 0.2, 0.3, 0.4, 0.5])
        .build()
        .unwrap()
}

#[test]
fn test_weights_and_metas_follow_retained_rows() {
    let selection = AggregationSelection::new().with("x", &["sum"]).unwrap();
    let compute = |retention: RowRetention| {
        let engine = SlidingWindowEngine::new(3, retention).unwrap();
        engine.compute(&weighted(), &selection).unwrap().table.unwrap()
    };

    let aligned = compute(RowRetention::KeepAligned);
    assert_eq!(aligned.weights().unwrap().to_vec(), vec![0.3, 0.4, 0.5]);
    assert_eq!(
        aligned.metas().column(0).to_vec(),
        vec![MetaValue::from("c"), MetaValue::from("d"), MetaValue::Missing]
    );

    let all = compute(RowRetention::KeepAll);
    assert_eq!(all.weights().unwrap().to_vec(), vec![0.1, 0.2, 0.3, 0.4, 0.5]);
    assert_eq!(all.metas().nrows(), 5);

    let discard = compute(RowRetention::Discard);
    assert!(discard.weights().is_none());
    assert!(discard.domain().metas().is_empty());
    assert_eq!(discard.metas().ncols(), 0);
}
