//! Configuration management for the server.
//!
//! Settings come from built-in defaults overlaid with environment variables
//! prefixed `COPYANYWHERE`, using `__` between nested keys:
//!
//! ```text
//! COPYANYWHERE__SERVER__PORT=8080
//! COPYANYWHERE__AUTH__PASSWORD=hunter2
//! COPYANYWHERE__RELAY__MAX_SESSION_NAME_LEN=128
//! ```

pub mod auth;
pub mod database;
pub mod relay;
pub mod server;
pub mod storage;
pub mod telemetry;

pub use auth::AuthSettings;
pub use database::DatabaseSettings;
pub use relay::RelaySettings;
pub use server::ServerSettings;
pub use storage::StorageSettings;
pub use telemetry::TelemetrySettings;

use config::{Config, ConfigError, Environment, Map};
use serde::Deserialize;

const ENV_PREFIX: &str = "COPYANYWHERE";

/// Top-level configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Server settings.
    pub server: ServerSettings,
    /// Telemetry settings.
    pub telemetry: TelemetrySettings,
    /// Notes database settings.
    pub database: DatabaseSettings,
    /// Upload storage settings.
    pub storage: StorageSettings,
    /// Access gate settings.
    #[serde(default)]
    pub auth: AuthSettings,
    /// Relay settings.
    #[serde(default)]
    pub relay: RelaySettings,
}

impl Settings {
    /// Loads settings from defaults and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be built, deserialized or
    /// fails validation.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(Environment::with_prefix(ENV_PREFIX).separator("__"))
    }

    /// Loads settings from defaults and an explicit variable map instead of
    /// the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`Settings::new`].
    pub fn from_env_map(vars: Map<String, String>) -> Result<Self, ConfigError> {
        Self::load(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .source(Some(vars)),
        )
    }

    fn load(env: Environment) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("telemetry.service_name", "copyanywhere-server")?
            .set_default("telemetry.sampling_ratio", 1.0)?
            .set_default("database.url", "sqlite://notes.db?mode=rwc")?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("storage.max_upload_bytes", 100 * 1024 * 1024)?
            .add_source(env)
            .build()?;

        let settings: Self = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let prefix = self.relay.path_prefix.trim_end_matches('/');
        if !prefix.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "relay.path_prefix must be an absolute path below '/', got '{}'",
                self.relay.path_prefix
            )));
        }
        Ok(())
    }
}

/// Helper for strong typing addresses
pub struct BindAddress(pub String, pub u16);

impl BindAddress {
    /// Converts the bind address to a `SocketAddr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the IP address string cannot be parsed.
    pub fn to_socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        let ip = self
            .0
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid IP address '{}': {e}", self.0))?;
        Ok(std::net::SocketAddr::new(ip, self.1))
    }
}

impl From<&ServerSettings> for BindAddress {
    fn from(server: &ServerSettings) -> Self {
        Self(server.host.clone(), server.port)
    }
}
