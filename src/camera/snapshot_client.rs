use crate::camera_config::CameraConfig;
use crate::common::file_utils;
use crate::errors::FetchError;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::{debug, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

const DEFAULT_EXTENSION: &str = ".jpg";

/// One successful fetch attempt: the file that was written, its size, and
/// the wall-clock instant baked into its name.
#[derive(Debug, Clone)]
pub struct SavedSnapshot {
    pub path: PathBuf,
    pub bytes: usize,
    pub captured_at: DateTime<Local>,
}

/// Fetches snapshot images over HTTP and persists them. One client is
/// shared across all poll loops; the underlying connection pool is
/// per-host, so cameras stay independent.
#[derive(Clone)]
pub struct SnapshotClient {
    http: Client,
}

impl SnapshotClient {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build the snapshot HTTP client")?;
        Ok(Self { http })
    }

    /// Performs exactly one fetch attempt for `camera` and writes the body
    /// to a timestamped file under `camera_dir`. Every failure mode comes
    /// back as a `FetchError` kind; the caller decides what a failed cycle
    /// means.
    pub async fn fetch_and_save(
        &self,
        camera: &CameraConfig,
        camera_dir: &Path,
        timestamp_format: &str,
    ) -> Result<SavedSnapshot, FetchError> {
        debug!("[{}] Fetching snapshot from {}", camera.name, camera.url);

        let response = self
            .http
            .get(&camera.url)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let extension = match extension_for_content_type(content_type.as_deref()) {
            Some(ext) => ext,
            None => {
                warn!(
                    "[{}] Could not determine image type from headers, defaulting to {}",
                    camera.name, DEFAULT_EXTENSION
                );
                DEFAULT_EXTENSION
            }
        };

        let body = response.bytes().await.map_err(classify_request_error)?;

        let captured_at = Local::now();
        let filename = file_utils::generate_timestamped_filename(
            &camera.name,
            &captured_at,
            timestamp_format,
            extension,
        );
        let path = camera_dir.join(filename);

        let mut file = File::create(&path).await.map_err(|e| FetchError::Io {
            path: path.clone(),
            source: e,
        })?;
        file.write_all(&body).await.map_err(|e| FetchError::Io {
            path: path.clone(),
            source: e,
        })?;
        file.flush().await.map_err(|e| FetchError::Io {
            path: path.clone(),
            source: e,
        })?;

        Ok(SavedSnapshot {
            path,
            bytes: body.len(),
            captured_at,
        })
    }
}

fn classify_request_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err)
    }
}

/// Maps a Content-Type header to a file extension for the image types
/// cameras are known to emit. `None` means the caller falls back to the
/// default and warns.
fn extension_for_content_type(content_type: Option<&str>) -> Option<&'static str> {
    let content_type = content_type?.to_ascii_lowercase();
    if content_type.contains("image/jpeg") {
        Some(".jpg")
    } else if content_type.contains("image/png") {
        Some(".png")
    } else if content_type.contains("image/gif") {
        Some(".gif")
    } else if content_type.contains("image/bmp") {
        Some(".bmp")
    } else {
        None
    }
}
