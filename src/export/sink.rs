//! Persistence of the fitted pipeline and its metrics record

use crate::error::{PipelineError, Result};
use crate::training::FittedPipeline;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const PIPELINE_FILE: &str = "model.json";
pub const METRICS_FILE: &str = "metrics.json";
pub const POLY_PIPELINE_FILE: &str = "model_poly.json";
pub const POLY_METRICS_FILE: &str = "metrics_poly.json";

/// Persisted evaluation summary of one training run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Number of training rows
    pub dataset_size: usize,
    pub rmse: f64,
    pub r2_score: f64,
}

/// Writes training artifacts into one output directory.
///
/// Each artifact is written to a temporary file next to its destination and
/// renamed into place, so a reader never observes a half-written file.
/// Existing artifacts are overwritten.
#[derive(Debug, Clone)]
pub struct ResultSink {
    dir: PathBuf,
    pipeline_file: String,
    metrics_file: String,
}

impl ResultSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pipeline_file: PIPELINE_FILE.to_string(),
            metrics_file: METRICS_FILE.to_string(),
        }
    }

    /// Use the `*_poly` artifact names
    pub fn with_polynomial_names(self) -> Self {
        self.with_pipeline_file(POLY_PIPELINE_FILE)
            .with_metrics_file(POLY_METRICS_FILE)
    }

    pub fn with_pipeline_file(mut self, name: impl Into<String>) -> Self {
        self.pipeline_file = name.into();
        self
    }

    pub fn with_metrics_file(mut self, name: impl Into<String>) -> Self {
        self.metrics_file = name.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pipeline_path(&self) -> PathBuf {
        self.dir.join(&self.pipeline_file)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.dir.join(&self.metrics_file)
    }

    /// Write the fitted pipeline artifact
    pub fn save_pipeline(&self, pipeline: &FittedPipeline) -> Result<PathBuf> {
        let path = self.pipeline_path();
        self.write_atomic(&path, |writer| {
            serde_json::to_writer(writer, pipeline)?;
            Ok(())
        })?;
        info!(path = %path.display(), "Saved fitted pipeline");
        Ok(path)
    }

    /// Write the metrics record as JSON with a 4-space indent
    pub fn save_metrics(&self, metrics: &MetricsRecord) -> Result<PathBuf> {
        let path = self.metrics_path();
        self.write_atomic(&path, |writer| {
            let mut ser =
                serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
            metrics.serialize(&mut ser)?;
            Ok(())
        })?;
        info!(path = %path.display(), "Saved metrics");
        Ok(path)
    }

    /// Write the pipeline, then the metrics record.
    ///
    /// The two writes are not atomic together; a metrics failure after the
    /// pipeline landed is reported as [`PipelineError::PartialPersist`].
    pub fn persist(&self, pipeline: &FittedPipeline, metrics: &MetricsRecord) -> Result<()> {
        let written = self.save_pipeline(pipeline)?;
        self.save_metrics(metrics)
            .map_err(|err| PipelineError::PartialPersist {
                written: written.display().to_string(),
                failed: self.metrics_path().display().to_string(),
                reason: err.to_string(),
            })?;
        Ok(())
    }

    pub fn load_pipeline(&self) -> Result<FittedPipeline> {
        load_pipeline(self.pipeline_path())
    }

    pub fn load_metrics(&self) -> Result<MetricsRecord> {
        let file = File::open(self.metrics_path())?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    fn write_atomic<F>(&self, path: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<&mut File>) -> Result<()>,
    {
        fs::create_dir_all(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            write(&mut writer)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        debug!(tmp = %tmp.path().display(), dest = %path.display(), "Renaming artifact into place");
        tmp.persist(path)?;
        Ok(())
    }
}

/// Read a fitted pipeline artifact from any path
pub fn load_pipeline(path: impl AsRef<Path>) -> Result<FittedPipeline> {
    let file = File::open(path.as_ref())?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
