use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use house_price_pipeline::training::{TrainEngine, TrainingConfig};
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const NEIGHBORHOODS: [&str; 5] = ["NAmes", "CollgCr", "OldTown", "Edwards", "Somerst"];

fn create_house_data(n_rows: usize, n_numeric: usize) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    let mut columns: Vec<Column> = (0..n_numeric)
        .map(|i| {
            let values: Vec<f64> = (0..n_rows).map(|_| rng.gen::<f64>() * 1000.0).collect();
            Column::new(format!("feature_{}", i).into(), values)
        })
        .collect();

    let neighborhood: Vec<&str> = (0..n_rows)
        .map(|_| NEIGHBORHOODS[rng.gen_range(0..NEIGHBORHOODS.len())])
        .collect();
    columns.push(Column::new("Neighborhood".into(), neighborhood));

    // Target as sum of features + noise
    let target: Vec<f64> = (0..n_rows)
        .map(|row| {
            let sum: f64 = columns[..n_numeric]
                .iter()
                .map(|c| c.f64().unwrap().get(row).unwrap_or(0.0))
                .sum();
            sum * 50.0 + rng.gen::<f64>() * 100.0
        })
        .collect();
    columns.push(Column::new("SalePrice".into(), target));

    DataFrame::new(columns).unwrap()
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10);

    for n_rows in [1000, 5000, 10000].iter() {
        let df = create_house_data(*n_rows, 10);

        group.bench_with_input(BenchmarkId::new("fit", n_rows), &df, |b, df| {
            let engine = TrainEngine::new(TrainingConfig::new().with_id_column(None)).unwrap();
            b.iter(|| engine.fit(black_box(df)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("fit_poly2", n_rows), &df, |b, df| {
            let config = TrainingConfig::new()
                .with_id_column(None)
                .with_polynomial_degree(2);
            let engine = TrainEngine::new(config).unwrap();
            b.iter(|| engine.fit(black_box(df)).unwrap())
        });
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    // Fit once
    let train_df = create_house_data(5000, 10);
    let engine = TrainEngine::new(TrainingConfig::new().with_id_column(None)).unwrap();
    let pipeline = engine.fit(&train_df).unwrap();

    for n_rows in [100, 1000, 10000].iter() {
        let df = create_house_data(*n_rows, 10);

        group.bench_with_input(BenchmarkId::new("predict", n_rows), &df, |b, df| {
            b.iter(|| pipeline.predict(black_box(df)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
