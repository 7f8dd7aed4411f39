use crate::{
    error::{Result, SegmuxError},
    metrics,
    server::{state::AppState, url_validation::validate_manifest_url},
};
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Body of `POST /convert`
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    /// Manifest (`playlist.json`) URL
    pub url: String,
}

/// Convert a manifest and answer with the merged container file.
///
/// Each request runs in its own job directory, which is removed once the
/// response body has been read into memory.
pub async fn convert(
    State(state): State<AppState>,
    Json(request): Json<ConvertRequest>,
) -> Result<Response> {
    let start = Instant::now();
    info!("Conversion requested for {}", request.url);

    let result = run(&state, request.url.trim()).await;

    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status_code(),
    };
    metrics::record_request("convert", status.as_u16());
    metrics::record_duration("convert", start);

    result
}

async fn run(state: &AppState, url: &str) -> Result<Response> {
    validate_manifest_url(url, state.config.allow_private_urls)?;

    let job_dir = state.next_job_dir();
    let result = match state.converter.convert(url, &job_dir).await {
        Ok(conversion) => tokio::fs::read(&conversion.output)
            .await
            .map(|bytes| attachment(&conversion.output, bytes))
            .map_err(SegmuxError::from),
        Err(e) => Err(e),
    };

    if let Err(e) = tokio::fs::remove_dir_all(&job_dir).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove job directory {}: {}", job_dir.display(), e);
        }
    }

    result
}

fn attachment(path: &Path, bytes: Vec<u8>) -> Response {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());

    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some("mkv") => "video/x-matroska",
        Some("mp4") => "video/mp4",
        Some("ts") => "video/mp2t",
        _ => "application/octet-stream",
    };

    info!("Sending {} ({} bytes)", filename, bytes.len());

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(bytes),
    )
        .into_response()
}
