use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Every way a conversion run can fail.
///
/// Fetch, parse, filesystem and external-tool failures are all terminal: a run
/// either produces the full playlist set plus merged output, or nothing.
#[derive(Error, Debug)]
pub enum SegmuxError {
    #[error("Manifest fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Manifest fetch returned HTTP {status} for {url}")]
    FetchStatus { url: String, status: u16 },

    #[error("Failed to parse manifest: {0}")]
    Parse(String),

    #[error("Manifest contains no audio or video renditions")]
    NoRenditions,

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("{tool} failed: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<serde_json::Error> for SegmuxError {
    fn from(e: serde_json::Error) -> Self {
        SegmuxError::Parse(format!("invalid JSON: {}", e))
    }
}

impl From<base64::DecodeError> for SegmuxError {
    fn from(e: base64::DecodeError) -> Self {
        SegmuxError::Parse(format!("invalid init_segment: {}", e))
    }
}

impl SegmuxError {
    /// True for failures caused by the manifest content itself.
    pub fn is_parse(&self) -> bool {
        matches!(self, SegmuxError::Parse(_) | SegmuxError::NoRenditions)
    }

    /// True for failures reaching the manifest origin.
    pub fn is_fetch(&self) -> bool {
        matches!(self, SegmuxError::Fetch(_) | SegmuxError::FetchStatus { .. })
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SegmuxError::Fetch(_) | SegmuxError::FetchStatus { .. } => "fetch",
            SegmuxError::Parse(_) | SegmuxError::NoRenditions => "parse",
            SegmuxError::Filesystem(_) => "filesystem",
            SegmuxError::ExternalTool { .. } => "external_tool",
            SegmuxError::InvalidUrl(_) => "invalid_url",
        }
    }

    pub(crate) fn status_code(&self) -> StatusCode {
        match self {
            SegmuxError::Fetch(_) | SegmuxError::FetchStatus { .. } => StatusCode::BAD_GATEWAY,
            SegmuxError::Parse(_) | SegmuxError::NoRenditions => StatusCode::UNPROCESSABLE_ENTITY,
            SegmuxError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            SegmuxError::Filesystem(_) | SegmuxError::ExternalTool { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for SegmuxError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        error!("Request failed ({}): {}", status, self);

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, SegmuxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_errors_map_to_bad_gateway() {
        let err = SegmuxError::FetchStatus {
            url: "https://example.com/playlist.json".to_string(),
            status: 404,
        };
        assert!(err.is_fetch());
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn parse_errors_map_to_unprocessable() {
        assert!(SegmuxError::NoRenditions.is_parse());
        assert_eq!(
            SegmuxError::NoRenditions.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SegmuxError = json_err.into();
        assert!(err.is_parse());
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn tool_and_io_errors_map_to_internal() {
        let tool = SegmuxError::ExternalTool {
            tool: "N_m3u8DL-RE".to_string(),
            message: "exited with status 1".to_string(),
        };
        assert_eq!(tool.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(tool.to_string(), "N_m3u8DL-RE failed: exited with status 1");

        let io: SegmuxError = std::io::Error::other("disk full").into();
        assert_eq!(io.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_url_maps_to_bad_request() {
        let err = SegmuxError::InvalidUrl("ftp://example.com".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
