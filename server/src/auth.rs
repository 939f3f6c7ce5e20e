//! Password gate for the routes that list files or edit notes.
//!
//! The relay never consults this gate; anyone who knows a session name may
//! join it.

use axum::http::{HeaderMap, HeaderValue, header};
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::api::ApiError;
use crate::infrastructure::audit::{AuditEvent, log_audit};

/// Header carrying the shared password.
pub const PASSWORD_HEADER: &str = "x-access-password";

/// Cookie carrying a login token issued by [`AccessGate::login`].
pub const SESSION_COOKIE: &str = "copyanywhere_session";

/// Answers "is this request authorized" for gated routes.
///
/// A request is authorized by the password itself (header or bearer token)
/// or by a login cookie. Login tokens live in memory and do not survive a
/// restart.
#[derive(Clone)]
pub struct AccessGate {
    digest: Option<[u8; 32]>,
    logins: Arc<Mutex<HashSet<[u8; 32]>>>,
}

impl AccessGate {
    /// Builds a gate for `password`. With `None`, every gated request is refused.
    #[must_use]
    pub fn new(password: Option<&SecretString>) -> Self {
        Self {
            digest: password.map(|p| hash(p.expose_secret())),
            logins: Arc::default(),
        }
    }

    /// Whether the request presents the configured password, either in
    /// [`PASSWORD_HEADER`] or as an `Authorization: Bearer` token, or a
    /// live [`SESSION_COOKIE`].
    #[must_use]
    pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
        if presented_password(headers).is_some_and(|candidate| self.password_matches(candidate)) {
            return true;
        }
        session_token(headers).is_some_and(|token| self.logins.lock().contains(&hash(token)))
    }

    /// Like [`AccessGate::is_authorized`], but audits refusals and maps them
    /// to [`ApiError::Unauthorized`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the password is missing or wrong.
    pub fn require(&self, headers: &HeaderMap, resource: &str) -> Result<(), ApiError> {
        if self.is_authorized(headers) {
            return Ok(());
        }
        log_audit(AuditEvent::AccessDenied {
            resource: resource.to_string(),
            credentials_present: presented_password(headers).is_some()
                || session_token(headers).is_some(),
        });
        Err(ApiError::Unauthorized)
    }

    /// Exchanges the password for a fresh login token, or `None` if it is wrong.
    #[must_use]
    pub fn login(&self, password: &str) -> Option<String> {
        if !self.password_matches(password) {
            log_audit(AuditEvent::AccessDenied {
                resource: "/api/auth/login".to_string(),
                credentials_present: true,
            });
            return None;
        }
        let token = Uuid::new_v4().simple().to_string();
        self.logins.lock().insert(hash(&token));
        info!("Login token issued");
        Some(token)
    }

    /// Revokes the login cookie carried by `headers`, if any.
    pub fn logout(&self, headers: &HeaderMap) {
        if let Some(token) = session_token(headers) {
            self.logins.lock().remove(&hash(token));
        }
    }

    fn password_matches(&self, candidate: &str) -> bool {
        let Some(expected) = &self.digest else {
            return false;
        };
        let actual = hash(candidate);
        // Digests have a fixed length, so this only leaks equality.
        actual
            .iter()
            .zip(expected.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

/// `Set-Cookie` value carrying `token`.
#[must_use]
pub fn session_cookie(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax"
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("copyanywhere_session=; Path=/"))
}

/// `Set-Cookie` value that clears the login cookie.
#[must_use]
pub fn expired_session_cookie() -> HeaderValue {
    HeaderValue::from_static("copyanywhere_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn presented_password(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(PASSWORD_HEADER) {
        return value.to_str().ok();
    }
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

fn hash(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(password: &str) -> AccessGate {
        AccessGate::new(Some(&SecretString::from(password)))
    }

    fn headers(name: &str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn accepts_matching_password_header() {
        assert!(gate("hunter2").is_authorized(&headers(PASSWORD_HEADER, "hunter2")));
    }

    #[test]
    fn accepts_bearer_token() {
        assert!(gate("hunter2").is_authorized(&headers("authorization", "Bearer hunter2")));
    }

    #[test]
    fn rejects_wrong_or_missing_password() {
        let gate = gate("hunter2");
        assert!(!gate.is_authorized(&headers(PASSWORD_HEADER, "hunter3")));
        assert!(!gate.is_authorized(&HeaderMap::new()));
        assert!(matches!(
            gate.require(&HeaderMap::new(), "/api/files"),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn login_cookie_authorizes_until_logout() {
        let gate = gate("hunter2");
        assert!(gate.login("wrong").is_none());

        let token = gate.login("hunter2").unwrap();
        let cookie = headers("cookie", &format!("theme=dark; {SESSION_COOKIE}={token}"));
        assert!(gate.is_authorized(&cookie));
        assert!(!gate.is_authorized(&headers("cookie", &format!("{SESSION_COOKIE}=forged"))));

        gate.logout(&cookie);
        assert!(!gate.is_authorized(&cookie));
    }

    #[test]
    fn login_cookie_header_round_trips() {
        let value = session_cookie("abc");
        assert!(value.to_str().unwrap().starts_with("copyanywhere_session=abc;"));
        assert!(expired_session_cookie().to_str().unwrap().contains("Max-Age=0"));
    }

    #[test]
    fn unconfigured_gate_refuses_everyone() {
        let gate = AccessGate::new(None);
        assert!(!gate.is_authorized(&headers(PASSWORD_HEADER, "")));
        assert!(gate.login("").is_none());
    }
}
