use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApplicationConfig {
    pub save_dir: String,
    pub request_timeout_seconds: u64,
    pub filename_timestamp_format: String, // strftime format string
    pub log_level: Option<String>, // Optional so the CLI flag can take precedence
    pub video_format: String, // Container, e.g., "mp4", "avi"
    pub video_codec: String,  // e.g., "mp4v", "mjpg", "avc1"
    pub video_fps: f64,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        ApplicationConfig {
            save_dir: "./camera_images".to_string(),
            request_timeout_seconds: 15,
            filename_timestamp_format: "%Y%m%d_%H%M%S".to_string(),
            log_level: Some("info".to_string()),
            video_format: "mp4".to_string(),
            video_codec: "mp4v".to_string(),
            video_fps: 24.0,
        }
    }
}

impl ApplicationConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
