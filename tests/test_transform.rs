//! Integration test: method dispatch and configuration

use moving_transform::prelude::*;
use moving_transform::{Method, MetaValue, INSTANCE_COUNT};
use polars::prelude::*;

fn sensor_df() -> DataFrame {
    df!(
        "ts" => &[0.0, 3600.0, 7200.0, 10800.0, 14400.0, 18000.0],
        "temperature" => &[20.0, 21.0, 23.0, 22.0, 24.0, 26.0],
        "state" => &["idle", "run", "run", "idle", "run", "run"],
        "alarm" => &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]
    )
    .unwrap()
}

fn sensor_table() -> Table {
    Table::from_dataframe(&sensor_df(), Some("ts"), &["alarm"]).unwrap()
}

#[test]
fn test_sliding_window_from_dataframe() {
    let selection = AggregationSelection::new()
        .with("temperature", &["mean", "max"])
        .unwrap()
        .with("state", &["mode"])
        .unwrap();
    let config = TransformConfig::new().with_sliding_window(3, RowRetention::KeepAligned);
    let output = MovingTransform::new(config)
        .apply(&sensor_table(), &selection)
        .unwrap();
    assert!(output.warnings.is_empty());

    let df = output.table.unwrap().to_dataframe().unwrap();
    assert_eq!(df.height(), 4);
    let names: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "ts",
            "temperature",
            "temperature (Mean value)",
            "temperature (Maximum)",
            "state",
            "state (Mode)",
            "alarm"
        ]
    );
    let mode = df.column("state (Mode)").unwrap().as_materialized_series().clone();
    assert_eq!(mode.str().unwrap().get(0), Some("run"));
    let mean = df.column("temperature (Mean value)").unwrap().as_materialized_series().clone();
    assert!((mean.f64().unwrap().get(0).unwrap() - 64.0 / 3.0).abs() < 1e-6);
}

#[test]
fn test_blocks_keep_metas() {
    let table = Table::builder()
        .attribute(Variable::continuous("x"), vec![1.0, 2.0, 3.0, 4.0])
        .meta(
            Variable::text("note"),
            vec!["a".into(), "b".into(), MetaValue::Missing, "d".into()],
        )
        .build()
        .unwrap();
    let selection = AggregationSelection::new().with("x", &["var"]).unwrap();
    let config = TransformConfig::new().with_blocks(2, ReferenceRow::Last);
    let result = MovingTransform::new(config)
        .apply(&table, &selection)
        .unwrap()
        .table
        .unwrap();

    assert_eq!(result.metas().column(0).to_vec(), vec![MetaValue::from("b"), MetaValue::from("d")]);
    let var = result.column("x (Variance)").unwrap().to_vec();
    assert!((var[0] - 0.25).abs() < 1e-6);
    assert!((var[1] - 0.25).abs() < 1e-6);
}

#[test]
fn test_periods_through_dispatcher() {
    let config = TransformConfig::new().with_periods("Hour of day", true);
    let selection = AggregationSelection::new().with("temperature", &["sum"]).unwrap();
    let output = MovingTransform::new(config)
        .apply(&sensor_table(), &selection)
        .unwrap();
    let table = output.table.unwrap();

    assert_eq!(table.n_rows(), 6);
    assert_eq!(table.column(INSTANCE_COUNT).unwrap().to_vec(), vec![1.0; 6]);
    assert_eq!(
        table.column("Hour of day").unwrap().to_vec(),
        vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]
    );
}

#[test]
fn test_unknown_variable_is_an_error() {
    let selection = AggregationSelection::new().with("pressure", &["mean"]).unwrap();
    let result = MovingTransform::default().apply(&sensor_table(), &selection);
    assert!(matches!(result, Err(MovingTransformError::UnknownVariable(name)) if name == "pressure"));
}

#[test]
fn test_unknown_kind_is_an_error() {
    let mut selection = AggregationSelection::new();
    assert!(matches!(
        selection.select("temperature", "kurtosis"),
        Err(MovingTransformError::UnknownAggregationKind(_))
    ));

    let deserialized: AggregationSelection =
        serde_json::from_str(r#"{"kinds": {"temperature": ["kurtosis"]}}"#).unwrap();
    let result = MovingTransform::default().apply(&sensor_table(), &deserialized);
    assert!(matches!(result, Err(MovingTransformError::UnknownAggregationKind(_))));
}

#[test]
fn test_no_aggregations_selected() {
    for config in [
        TransformConfig::new().with_sliding_window(2, RowRetention::KeepAll),
        TransformConfig::new().with_blocks(2, ReferenceRow::First),
    ] {
        let output = MovingTransform::new(config)
            .apply(&sensor_table(), &AggregationSelection::new())
            .unwrap();
        assert!(output.table.is_none());
        assert!(output.has_warning(&TransformWarning::NoAggregationsSelected));
    }
}

#[test]
fn test_config_file_round_trip() {
    let config = TransformConfig::new().with_blocks(3, ReferenceRow::Middle);
    let json = config.to_json().unwrap();
    assert!(json.contains("\"SequentialBlocks\""));

    let restored = TransformConfig::from_json(&json).unwrap();
    assert_eq!(restored, config);
    assert_eq!(restored.method, Method::SequentialBlocks);
    assert_eq!(MovingTransform::new(restored).config().blocks.block_width, 3);
}

#[test]
fn test_warning_messages() {
    assert_eq!(
        TransformWarning::NoAggregationsSelected.to_string(),
        "No (applicable) aggregations are selected"
    );
    assert_eq!(TransformWarning::WindowTooLarge.to_string(), "Window width is too large");
    assert_eq!(TransformWarning::BlockTooLarge.to_string(), "Block width is too large");
}
