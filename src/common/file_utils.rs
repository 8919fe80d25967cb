use crate::camera_config::CameraConfig;
use crate::common::timestamp_utils;
use crate::errors::AppError;
use chrono::{DateTime, Local};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Builds `{base}_{timestamp}{ext}`. `extension` carries its leading dot.
pub fn generate_timestamped_filename(
    base_name: &str,      // e.g., camera name
    timestamp: &DateTime<Local>,
    timestamp_format: &str, // from config, e.g., "%Y%m%d_%H%M%S"
    extension: &str,      // e.g., ".jpg", ".png"
) -> String {
    format!(
        "{}_{}{}",
        base_name,
        timestamp_utils::format_local_timestamp(timestamp, timestamp_format),
        extension
    )
}

pub fn ensure_output_directory(dir_path: &Path) -> Result<PathBuf, AppError> {
    if !dir_path.exists() {
        debug!("Directory '{}' does not exist, attempting to create it.", dir_path.display());
        std::fs::create_dir_all(dir_path).map_err(|e| {
            AppError::Io(format!(
                "Failed to create directory '{}': {}",
                dir_path.display(),
                e
            ))
        })?;
    } else if !dir_path.is_dir() {
        return Err(AppError::Io(format!(
            "Path '{}' exists but is not a directory.",
            dir_path.display()
        )));
    }
    Ok(dir_path.to_path_buf())
}

/// Creates the save root plus one subdirectory per camera. Pre-existing
/// directories are not an error; any creation failure is fatal to the
/// caller because no camera can persist images without its directory.
pub fn provision_camera_directories(save_dir: &Path, cameras: &[CameraConfig]) -> Result<(), AppError> {
    ensure_output_directory(save_dir)?;
    info!("📁 Main save directory: '{}'", save_dir.display());
    for camera in cameras {
        let camera_dir = ensure_output_directory(&save_dir.join(&camera.name))?;
        debug!(
            "Ensured directory exists for camera '{}': '{}'",
            camera.name,
            camera_dir.display()
        );
    }
    Ok(())
}
