//! Access gate settings.

use secrecy::SecretString;
use serde::Deserialize;

/// Shared password protecting the gated routes.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthSettings {
    /// Gated routes deny every request while this is unset.
    pub password: Option<SecretString>,
}
