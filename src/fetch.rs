//! Manifest download.
//!
//! One GET per conversion, no retries. A transport error or non-2xx status
//! ends the run.

use crate::error::{Result, SegmuxError};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Build the HTTP client used for manifest fetches.
pub fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder()
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(concat!("segmux/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Fetch manifest text from `url`.
///
/// # Errors
///
/// [`SegmuxError::Fetch`] on transport failure, [`SegmuxError::FetchStatus`]
/// when the origin answers with a non-success status.
pub async fn fetch_manifest(client: &Client, url: &Url) -> Result<String> {
    info!("Fetching manifest from {}", url);

    let response = client.get(url.clone()).send().await.map_err(|e| {
        warn!("Manifest fetch failed for {}: {}", url, e);
        SegmuxError::Fetch(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!("Manifest fetch returned {} for {}", status, url);
        return Err(SegmuxError::FetchStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    info!("Fetched manifest ({} bytes)", body.len());
    Ok(body)
}
