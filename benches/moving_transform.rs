use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use moving_transform::prelude::*;
use rand::prelude::*;

const HOUR: f64 = 3_600.0;

fn create_series(n_rows: usize, n_features: usize) -> Table {
    let mut rng = rand::thread_rng();
    let mut builder = Table::builder().attribute(
        Variable::time("time"),
        (0..n_rows).map(|i| 1_600_000_000.0 + i as f64 * HOUR).collect(),
    );
    for i in 0..n_features {
        let values: Vec<f64> = (0..n_rows).map(|_| rng.gen::<f64>() * 10.0).collect();
        builder = builder.attribute(Variable::continuous(format!("feature_{}", i)), values);
    }
    builder.time_variable("time").build().unwrap()
}

fn selection(n_features: usize, kinds: &[&str]) -> AggregationSelection {
    (0..n_features).fold(AggregationSelection::new(), |selection, i| {
        selection.with(&format!("feature_{}", i), kinds).unwrap()
    })
}

fn bench_sliding_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("sliding_window");
    let kinds = ["mean", "median", "std", "exp. MA"];

    for n_rows in [1000, 10000].iter() {
        let table = create_series(*n_rows, 5);
        let selection = selection(5, &kinds);
        for width in [5, 50].iter() {
            let transform = MovingTransform::new(
                TransformConfig::new().with_sliding_window(*width, RowRetention::KeepAligned),
            );
            group.bench_with_input(
                BenchmarkId::new(format!("width_{}", width), n_rows),
                &table,
                |b, table| b.iter(|| transform.apply(black_box(table), &selection).unwrap()),
            );
        }
    }

    group.finish();
}

fn bench_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("blocks");
    let table = create_series(10000, 5);
    let selection = selection(5, &["sum", "mode", "geometric"]);
    let transform =
        MovingTransform::new(TransformConfig::new().with_blocks(24, ReferenceRow::Middle));

    group.bench_function("block_24", |b| {
        b.iter(|| transform.apply(black_box(&table), &selection).unwrap())
    });
    group.finish();
}

fn bench_periods(c: &mut Criterion) {
    let mut group = c.benchmark_group("periods");
    let table = create_series(10000, 5);
    let selection = selection(5, &["mean", "max"]);

    for period in ["Days", "Day of week", "Hour of day"].iter() {
        let transform = MovingTransform::new(TransformConfig::new().with_periods(*period, true));
        group.bench_with_input(BenchmarkId::new("period", period), &table, |b, table| {
            b.iter(|| transform.apply(black_box(table), &selection).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sliding_window, bench_blocks, bench_periods);
criterion_main!(benches);
