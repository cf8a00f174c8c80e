//! Artifact export
//!
//! Persists the fitted pipeline and the metrics record of a training run as
//! JSON, and reads them back for batch prediction.

mod sink;

pub use sink::{
    load_pipeline, MetricsRecord, ResultSink, METRICS_FILE, PIPELINE_FILE, POLY_METRICS_FILE,
    POLY_PIPELINE_FILE,
};
