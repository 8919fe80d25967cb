use chrono::{DateTime, Local};

// Render a local timestamp with the configured strftime format.
pub fn format_local_timestamp(timestamp: &DateTime<Local>, format_str: &str) -> String {
    timestamp.format(format_str).to_string()
}
