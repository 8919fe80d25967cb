use crate::app_config::ApplicationConfig;
use crate::camera_config::CameraConfig;
use crate::errors::AppError;
use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::time::Instant;

#[derive(Debug, Deserialize, Clone)]
pub struct MasterConfig {
    #[serde(rename = "application", default)]
    pub app_settings: ApplicationConfig,
    #[serde(default)]
    pub cameras: Vec<CameraConfig>,
}

pub fn load_config(path: &str) -> Result<MasterConfig> {
    debug!("📄 Attempting to load config from: {}", path);
    let start_time = Instant::now();

    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file '{}'", path))?;

    let config: MasterConfig = serde_yaml::from_str(&config_str)
        .with_context(|| format!("Failed to parse YAML configuration from '{}'", path))?;

    validate_master_config(&config).context("Configuration validation failed")?;

    info!(
        "✅ Loaded and validated configuration from '{}' in {:?}",
        path,
        start_time.elapsed()
    );
    Ok(config)
}

/// Camera names double as directory names and log-correlation keys, so
/// they must be unique and usable as a single path component.
pub fn validate_master_config(config: &MasterConfig) -> Result<(), AppError> {
    debug!("🕵️ Validating configuration...");

    if config.app_settings.save_dir.is_empty() {
        return Err(AppError::Config("save_dir cannot be empty".to_string()));
    }
    if config.app_settings.request_timeout_seconds == 0 {
        return Err(AppError::Config(
            "request_timeout_seconds must be at least 1".to_string(),
        ));
    }
    if config.app_settings.video_fps <= 0.0 {
        return Err(AppError::Config(format!(
            "video_fps must be positive, got {}",
            config.app_settings.video_fps
        )));
    }

    let mut camera_names = HashSet::new();
    for (idx, camera) in config.cameras.iter().enumerate() {
        if camera.name.is_empty() {
            return Err(AppError::Config(format!(
                "Camera name cannot be empty for camera #{}",
                idx + 1
            )));
        }
        if camera.name.contains('/') || camera.name.contains('\\') || camera.name == "." || camera.name == ".." {
            return Err(AppError::Config(format!(
                "Camera name '{}' cannot be used as a directory name",
                camera.name
            )));
        }
        if !camera_names.insert(&camera.name) {
            return Err(AppError::Config(format!(
                "Duplicate camera name found: {}",
                camera.name
            )));
        }
        let url = Url::parse(&camera.url).map_err(|e| {
            AppError::Config(format!(
                "Invalid URL '{}' for camera '{}': {}",
                camera.url, camera.name, e
            ))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AppError::Config(format!(
                "Unsupported URL scheme '{}' for camera '{}'; only http and https are polled",
                url.scheme(),
                camera.name
            )));
        }
        if camera.interval_seconds == 0 {
            return Err(AppError::Config(format!(
                "Polling interval for camera '{}' must be at least 1 second",
                camera.name
            )));
        }
        debug!("Camera '{}' validated successfully.", camera.name);
    }

    Ok(())
}
