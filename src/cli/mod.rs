//! House price CLI module
//!
//! Command-line interface for training, batch prediction and data inspection.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::export::{load_pipeline, ResultSink};
use crate::preprocessing::{classify_columns, ColumnKind};
use crate::training::{TrainEngine, TrainingConfig};
use crate::utils::{save_csv, DataLoader};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "house-price")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and apply a house sale price regression pipeline")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split, fit, evaluate and persist a pipeline
    Train {
        /// Input data file (CSV, TSV, JSON lines, or Parquet)
        #[arg(short, long)]
        data: PathBuf,

        /// YAML params file with `training` and optional `model_poly` sections
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// Directory receiving the model and metrics artifacts
        #[arg(short, long, default_value = "models")]
        output_dir: PathBuf,

        /// Target column name
        #[arg(short, long)]
        target: Option<String>,

        /// Identifier column excluded from features
        #[arg(long, conflicts_with = "no_id")]
        id_column: Option<String>,

        /// The table has no identifier column
        #[arg(long)]
        no_id: bool,

        /// Polynomial degree over numeric features
        #[arg(long)]
        degree: Option<u32>,

        /// Fraction of rows held out for evaluation
        #[arg(long)]
        test_size: Option<f64>,

        /// Seed for the train/test shuffle
        #[arg(long)]
        random_state: Option<u64>,
    },

    /// Make predictions using a persisted pipeline
    Predict {
        /// Persisted pipeline artifact
        #[arg(short, long)]
        model: PathBuf,

        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Output predictions file (CSV)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show data information and the feature column partition
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Target column name
        #[arg(short, long, default_value = "SalePrice")]
        target: String,

        /// Identifier column name
        #[arg(long, default_value = "Id")]
        id_column: String,
    },
}

/// Command-line overrides for a training run
#[derive(Debug, Clone, Default)]
pub struct TrainOverrides {
    pub target: Option<String>,
    pub id_column: Option<String>,
    pub no_id: bool,
    pub degree: Option<u32>,
    pub test_size: Option<f64>,
    pub random_state: Option<u64>,
}

/// Merge defaults, the optional params file and the command-line flags, in
/// increasing precedence.
pub fn build_config(params: Option<&Path>, overrides: &TrainOverrides) -> anyhow::Result<TrainingConfig> {
    let mut config = match params {
        Some(path) => TrainingConfig::from_params_file(path)?,
        None => TrainingConfig::default(),
    };

    if let Some(target) = &overrides.target {
        config = config.with_target(target.clone());
    }
    if overrides.no_id {
        config = config.with_id_column(None);
    } else if let Some(id) = &overrides.id_column {
        config = config.with_id_column(Some(id.clone()));
    }
    if let Some(degree) = overrides.degree {
        config = config.with_polynomial_degree(degree);
    }
    if let Some(test_size) = overrides.test_size {
        config = config.with_test_size(test_size);
    }
    if let Some(seed) = overrides.random_state {
        config = config.with_random_state(seed);
    }

    config.validate()?;
    Ok(config)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(data_path: &Path, output_dir: &Path, config: TrainingConfig) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let df = DataLoader::new().load_auto(data_path)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    let label = match config.polynomial_degree {
        Some(d) => format!("polynomial regression (degree {})", d),
        None => "linear regression".to_string(),
    };
    let sink = if config.polynomial_degree.is_some() {
        ResultSink::new(output_dir).with_polynomial_names()
    } else {
        ResultSink::new(output_dir)
    };

    step_run(&format!("Training {}", label.cyan()));
    let engine = TrainEngine::new(config)?;
    let run = engine.run(&df)?;
    step_done(&format!("{:.3}s", run.training_time_secs));

    // persisted only after the whole run succeeded
    sink.persist(&run.pipeline, &run.metrics)?;
    step_ok(&format!("Saved {}", sink.pipeline_path().display()));
    step_ok(&format!("Saved {}", sink.metrics_path().display()));

    println!();
    kv("Train rows", &run.n_train.to_string());
    kv("Test rows", &run.n_test.to_string());
    kv("Features", &run.pipeline.feature_names().len().to_string());
    println!("  {:<16} {}", muted("RMSE"), format!("{:.4}", run.metrics.rmse).white().bold());
    println!("  {:<16} {}", muted("R²"), format!("{:.4}", run.metrics.r2_score).white().bold());
    println!();

    Ok(())
}

pub fn cmd_predict(model_path: &Path, data_path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading pipeline");
    let pipeline = load_pipeline(model_path)?;
    step_done(&format!("{} features", pipeline.feature_names().len()));

    step_run("Loading data");
    let df = DataLoader::new().load_auto(data_path)?;
    step_done(&format!("{} rows", df.height()));

    let start = Instant::now();
    let predictions = pipeline.predict(&df)?;
    step_ok(&format!("Predicted {} rows in {:?}", predictions.len(), start.elapsed()));

    let mut columns = Vec::with_capacity(2);
    if let Some(id) = pipeline.id_column().and_then(|name| df.column(name).ok()) {
        columns.push(id.clone());
    }
    columns.push(Column::new(pipeline.target_column().into(), predictions.to_vec()));
    let mut out = DataFrame::new(columns)?;

    match output {
        Some(path) => {
            save_csv(&mut out, path)?;
            step_ok(&format!("Saved {}", path.display()));
        }
        None => println!("\n{}", out),
    }
    println!();

    Ok(())
}

pub fn cmd_info(data_path: &Path, target: &str, id_column: &str) -> anyhow::Result<()> {
    section("Data Info");

    let df = DataLoader::new().load_auto(data_path)?;

    kv("File", &data_path.display().to_string());
    kv("Rows", &df.height().to_string());
    kv("Columns", &df.width().to_string());
    kv("Memory", &format!("{:.2} MB", df.estimated_size() as f64 / 1024.0 / 1024.0));
    println!();

    let features: Vec<String> = df
        .get_column_names_str()
        .into_iter()
        .filter(|name| *name != target && *name != id_column)
        .map(str::to_string)
        .collect();
    let partition = classify_columns(&df.select(features)?)?;

    println!("  {:<20} {:<12} {:>6} {:>8}", muted("Column"), muted("Kind"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(50)));

    for spec in partition.columns() {
        let col = df.column(&spec.name)?;
        let kind = match spec.kind {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        };
        println!(
            "  {:<20} {:<12} {:>6} {:>8}",
            spec.name,
            kind.truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    println!();
    kv("Numeric", &partition.numeric().len().to_string());
    kv("Categorical", &partition.categorical().len().to_string());
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_override_params_file() {
        let mut params = NamedTempFile::new().unwrap();
        writeln!(params, "training:\n  test_size: 0.3\n  random_state: 7\nmodel_poly:\n  degree: 2").unwrap();

        let overrides = TrainOverrides {
            random_state: Some(11),
            no_id: true,
            ..Default::default()
        };
        let config = build_config(Some(params.path()), &overrides).unwrap();

        assert_eq!(config.test_size, 0.3);
        assert_eq!(config.random_state, 11);
        assert_eq!(config.polynomial_degree, Some(2));
        assert_eq!(config.id_column, None);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = TrainOverrides {
            degree: Some(0),
            ..Default::default()
        };
        assert!(build_config(None, &overrides).is_err());
    }

    #[test]
    fn test_cli_parses_train() {
        let cli = Cli::try_parse_from([
            "house-price", "train", "--data", "train.csv", "--degree", "2", "--no-id",
        ])
        .unwrap();
        match cli.command {
            Commands::Train { degree, no_id, output_dir, .. } => {
                assert_eq!(degree, Some(2));
                assert!(no_id);
                assert_eq!(output_dir, PathBuf::from("models"));
            }
            _ => panic!("expected train"),
        }
    }
}
