//! Conversion pipeline.
//!
//! `Fetch → Parse → Rank → Write → Merge → Cleanup`, stopping at the first
//! failure. Intermediate artifacts are only removed once the merge tool has
//! produced the final container.

use crate::error::{Result, SegmuxError};
use crate::fetch::fetch_manifest;
use crate::hls::{DirectorySink, write_playlists};
use crate::manifest::parse_manifest;
use crate::merge::MergeTool;
use crate::metrics;
use crate::rank::rank;
use reqwest::Client;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

/// Playlist set written to disk, ready for the merge tool.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedConversion {
    pub clip_id: String,
    pub output_dir: PathBuf,
    pub master_path: PathBuf,
    /// Every intermediate file, master playlist included
    pub artifacts: Vec<PathBuf>,
}

/// Result of a complete conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub clip_id: String,
    /// The merged container file
    pub output: PathBuf,
}

/// Runs conversions with a shared HTTP client and merge tool.
#[derive(Clone)]
pub struct Converter {
    client: Client,
    merger: Arc<dyn MergeTool>,
}

impl Converter {
    pub fn new(client: Client, merger: Arc<dyn MergeTool>) -> Self {
        Self { client, merger }
    }

    /// Fetch, parse, rank and write the playlist set into `output_dir`.
    pub async fn prepare(&self, manifest_url: &str, output_dir: &Path) -> Result<PreparedConversion> {
        let url = Url::parse(manifest_url)
            .map_err(|e| SegmuxError::InvalidUrl(format!("{}: {}", manifest_url, e)))?;

        let body = fetch_manifest(&self.client, &url).await?;
        let manifest = rank(parse_manifest(&body)?);

        metrics::record_renditions("video", manifest.video.len());
        metrics::record_renditions("audio", manifest.audio.len());

        let dir = output_dir.to_path_buf();
        let (set, clip_id) = tokio::task::spawn_blocking(move || -> Result<_> {
            let mut sink = DirectorySink::create(&dir)?;
            let set = write_playlists(&manifest, &url, &mut sink)?;
            Ok((set, manifest.clip_id))
        })
        .await
        .map_err(|e| SegmuxError::Filesystem(io::Error::other(e)))??;

        let artifacts = set
            .artifact_names()
            .map(|name| output_dir.join(name))
            .collect();

        Ok(PreparedConversion {
            clip_id,
            output_dir: output_dir.to_path_buf(),
            master_path: output_dir.join(&set.master),
            artifacts,
        })
    }

    /// Run the whole pipeline for one manifest URL.
    ///
    /// On success only the merged container remains in `output_dir`; on
    /// failure the error of the first failing stage is returned.
    pub async fn convert(&self, manifest_url: &str, output_dir: &Path) -> Result<Conversion> {
        let start = Instant::now();
        let result = self.run(manifest_url, output_dir).await;

        match &result {
            Ok(conversion) => {
                info!(
                    "Converted clip {} in {:.1}s",
                    conversion.clip_id,
                    start.elapsed().as_secs_f64()
                );
                metrics::record_conversion("ok", start);
            }
            Err(e) => {
                warn!("Conversion of {} failed: {}", manifest_url, e);
                metrics::record_conversion(e.kind(), start);
            }
        }

        result
    }

    async fn run(&self, manifest_url: &str, output_dir: &Path) -> Result<Conversion> {
        let prepared = self.prepare(manifest_url, output_dir).await?;

        let output = self
            .merger
            .merge(&prepared.master_path, &prepared.clip_id, &prepared.output_dir)
            .await?;

        let removed = cleanup(&prepared.artifacts).await;
        debug!(
            "Removed {}/{} intermediate files",
            removed,
            prepared.artifacts.len()
        );

        Ok(Conversion {
            clip_id: prepared.clip_id,
            output,
        })
    }
}

/// Remove intermediate files, best effort. Returns how many were removed.
///
/// Missing files are skipped; other failures are logged and ignored.
pub async fn cleanup(paths: &[PathBuf]) -> usize {
    let mut removed = 0;
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Skipping cleanup of missing {}", path.display());
            }
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }
    removed
}
