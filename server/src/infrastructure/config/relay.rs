//! Session relay settings.

use serde::Deserialize;

/// Settings for the CopyAnywhere relay.
#[derive(Debug, Deserialize, Clone)]
pub struct RelaySettings {
    /// Path prefix in front of the session name, e.g. `/api/ws`.
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    /// Seconds between keep-alive pings on each connection.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,
    /// Optional cap on session name length in bytes.
    pub max_session_name_len: Option<usize>,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            path_prefix: default_path_prefix(),
            ping_interval_secs: default_ping_interval(),
            max_session_name_len: None,
        }
    }
}

fn default_path_prefix() -> String {
    "/api/ws".to_string()
}

fn default_ping_interval() -> u64 {
    30
}
