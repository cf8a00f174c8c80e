//! Integration tests for data processing: loading files, params, and artifacts

use house_price_pipeline::export::{ResultSink, METRICS_FILE, POLY_PIPELINE_FILE};
use house_price_pipeline::training::{TrainEngine, TrainingConfig};
use house_price_pipeline::utils::{save_csv, DataLoader};
use house_price_pipeline::PipelineError;
use polars::prelude::*;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Fixtures
// ============================================================================

fn write_houses_csv(dir: &TempDir) -> std::path::PathBuf {
    let mut csv = String::from("Id,LotArea,OverallQual,LotFrontage,Street,Alley,SalePrice\n");
    for i in 0..40 {
        let frontage = if i % 7 == 0 { "NA".to_string() } else { format!("{}", 50 + i % 30) };
        let street = if i % 5 == 0 { "Grvl" } else { "Pave" };
        let alley = match i % 6 {
            0 => "Grvl",
            1 => "Pave",
            _ => "NA",
        };
        let price = 50000 + i * 3000 + (i % 10) * 5000;
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            i + 1,
            7000 + i * 150,
            i % 10 + 1,
            frontage,
            street,
            alley,
            price
        ));
    }
    let path = dir.path().join("train.csv");
    fs::write(&path, csv).unwrap();
    path
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_csv_na_markers_are_missing() {
    let dir = TempDir::new().unwrap();
    let path = write_houses_csv(&dir);
    let df = DataLoader::new().load_auto(&path).unwrap();

    assert_eq!(df.shape(), (40, 7));
    assert_eq!(df.column("LotFrontage").unwrap().null_count(), 6);
    assert!(matches!(
        df.column("LotFrontage").unwrap().dtype(),
        DataType::Int64 | DataType::Float64
    ));
    assert!(df.column("Alley").unwrap().null_count() > 0);
}

#[test]
fn test_parquet_roundtrip_trains() {
    let dir = TempDir::new().unwrap();
    let csv_path = write_houses_csv(&dir);
    let mut df = DataLoader::new().load_csv(&csv_path).unwrap();

    let pq_path = dir.path().join("train.parquet");
    let file = fs::File::create(&pq_path).unwrap();
    ParquetWriter::new(file).finish(&mut df).unwrap();

    let loaded = DataLoader::new().load_auto(&pq_path).unwrap();
    assert_eq!(loaded.shape(), df.shape());

    let engine = TrainEngine::new(TrainingConfig::default()).unwrap();
    assert!(engine.run(&loaded).is_ok());
}

// ============================================================================
// Params file
// ============================================================================

#[test]
fn test_params_file_drives_config() {
    let dir = TempDir::new().unwrap();
    let params = dir.path().join("params.yaml");
    fs::write(
        &params,
        "training:\n  test_size: 0.25\n  random_state: 7\nmodel_poly:\n  degree: 2\n",
    )
    .unwrap();

    let config = TrainingConfig::from_params_file(&params).unwrap();
    assert_eq!(config.test_size, 0.25);
    assert_eq!(config.random_state, 7);
    assert_eq!(config.polynomial_degree, Some(2));
}

#[test]
fn test_malformed_params_file() {
    let dir = TempDir::new().unwrap();
    let params = dir.path().join("params.yaml");
    fs::write(&params, "training: [not, a, mapping]\n").unwrap();

    assert!(matches!(
        TrainingConfig::from_params_file(&params),
        Err(PipelineError::ConfigError(_))
    ));
}

// ============================================================================
// Artifacts
// ============================================================================

#[test]
fn test_train_persist_reload_predict() {
    let dir = TempDir::new().unwrap();
    let path = write_houses_csv(&dir);
    let df = DataLoader::new().load_auto(&path).unwrap();

    let engine = TrainEngine::new(TrainingConfig::default()).unwrap();
    let run = engine.run(&df).unwrap();
    assert_eq!(run.n_test, 8);

    let sink = ResultSink::new(dir.path().join("models"));
    sink.persist(&run.pipeline, &run.metrics).unwrap();

    let text = fs::read_to_string(dir.path().join("models").join(METRICS_FILE)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["dataset_size"], 32);
    assert!(value["rmse"].as_f64().unwrap() >= 0.0);
    assert!(value["r2_score"].as_f64().unwrap() <= 1.0);

    let reloaded = sink.load_pipeline().unwrap();
    let features = df.drop("SalePrice").unwrap();
    let predictions = reloaded.predict(&features).unwrap();
    assert_eq!(predictions.len(), 40);

    let mut out = DataFrame::new(vec![
        df.column("Id").unwrap().clone(),
        Column::new("SalePrice".into(), predictions.to_vec()),
    ])
    .unwrap();
    let out_path = dir.path().join("predictions").join("predictions.csv");
    save_csv(&mut out, &out_path).unwrap();
    assert_eq!(DataLoader::new().load_csv(&out_path).unwrap().height(), 40);
}

#[test]
fn test_polynomial_artifact_names() {
    let dir = TempDir::new().unwrap();
    let path = write_houses_csv(&dir);
    let df = DataLoader::new().load_auto(&path).unwrap();

    let engine = TrainEngine::new(TrainingConfig::new().with_polynomial_degree(2)).unwrap();
    let run = engine.run(&df).unwrap();

    let sink = ResultSink::new(dir.path()).with_polynomial_names();
    sink.persist(&run.pipeline, &run.metrics).unwrap();

    assert!(dir.path().join(POLY_PIPELINE_FILE).exists());
    assert!(!dir.path().join(METRICS_FILE).exists());
    assert_eq!(sink.load_pipeline().unwrap().polynomial_degree(), Some(2));
}
