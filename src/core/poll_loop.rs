use crate::camera::snapshot_client::SnapshotClient;
use crate::camera_config::CameraConfig;
use crate::core::shutdown::{ShutdownController, WaitOutcome};
use crate::errors::FetchError;
use log::{debug, error, info};
use std::path::PathBuf;
use tokio::time::Instant;

/// Recurring snapshot task for a single camera.
///
/// Each iteration takes its deadline from the monotonic clock before the
/// fetch begins, so fetch latency is subtracted from the following wait
/// and the cadence stays close to the configured interval. A fetch that
/// overruns the interval leads straight into the next cycle. The only
/// state shared with sibling loops is the shutdown signal.
pub async fn run_poll_loop(
    camera: CameraConfig,
    client: SnapshotClient,
    camera_dir: PathBuf,
    timestamp_format: String,
    shutdown: ShutdownController,
) {
    let interval = camera.interval();
    info!(
        "📡 Starting polling for camera '{}' (interval: {}s)",
        camera.name, camera.interval_seconds
    );

    while !shutdown.is_shutdown_requested() {
        let deadline = Instant::now() + interval;

        match client
            .fetch_and_save(&camera, &camera_dir, &timestamp_format)
            .await
        {
            Ok(saved) => {
                info!(
                    "✅ [{}] Saved snapshot ({} bytes) to {}",
                    camera.name,
                    saved.bytes,
                    saved.path.display()
                );
            }
            Err(FetchError::Timeout) => {
                error!(
                    "⏰ [{}] Timed out fetching snapshot from {}",
                    camera.name, camera.url
                );
            }
            Err(FetchError::HttpStatus(status)) => {
                error!(
                    "❌ [{}] Camera answered with HTTP {} for {}",
                    camera.name, status, camera.url
                );
            }
            Err(FetchError::Network(e)) => {
                error!(
                    "❌ [{}] Failed to fetch snapshot from {}: {}",
                    camera.name, camera.url, e
                );
            }
            Err(FetchError::Io { path, source }) => {
                error!(
                    "❌ [{}] Failed to save snapshot to {}: {}",
                    camera.name,
                    path.display(),
                    source
                );
            }
        }

        // Never negative: an overrun fetch starts the next cycle immediately.
        let remaining = deadline.saturating_duration_since(Instant::now());
        debug!(
            "[{}] Sleeping {:?} until the next scheduled fetch",
            camera.name, remaining
        );
        if let WaitOutcome::ShutdownRequested = shutdown.wait_or_shutdown(remaining).await {
            break;
        }
    }

    info!("🏁 Polling stopped for camera '{}'", camera.name);
}
