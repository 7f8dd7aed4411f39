use crate::{
    config::Config,
    convert::Converter,
    error::Result,
    fetch::build_client,
    merge::ExternalMerger,
    metrics,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Conversion pipeline with its shared HTTP client and merge tool
    pub converter: Converter,
    /// Prometheus exposition handle
    pub metrics: PrometheusHandle,
    /// Process start, for uptime reporting
    pub started_at: Instant,
    /// Monotonic job counter, keeps job directories unique within a millisecond
    jobs: Arc<AtomicU64>,
}

impl AppState {
    /// Create state with the configured external merge tool
    pub fn new(config: Config) -> Result<Self> {
        let client = build_client(Some(config.fetch_timeout))?;
        let merger = ExternalMerger::new(config.merge_tool.clone(), config.merge_format.clone())
            .with_timeout(config.merge_timeout);

        Ok(Self::with_converter(
            config,
            Converter::new(client, Arc::new(merger)),
        ))
    }

    /// Create state around an existing converter
    pub fn with_converter(config: Config, converter: Converter) -> Self {
        Self {
            config: Arc::new(config),
            converter,
            metrics: metrics::init(),
            started_at: Instant::now(),
            jobs: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A fresh, not yet created directory for one conversion.
    ///
    /// Output filenames only depend on rendition and clip ids, so concurrent
    /// conversions must never share a directory.
    pub fn next_job_dir(&self) -> PathBuf {
        let seq = self.jobs.fetch_add(1, Ordering::Relaxed);
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3f");
        self.config.download_dir.join(format!("job-{}-{}", stamp, seq))
    }
}
