//! Maps relay upgrade paths to session names.

use thiserror::Error;

use crate::ws::types::SessionName;

/// Why an upgrade path could not be routed to a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The path does not start with the relay prefix.
    #[error("path is outside the relay prefix")]
    ForeignPath,
    /// Nothing, or an empty segment, follows the prefix.
    #[error("missing session name")]
    MissingSession,
    /// More than one segment follows the prefix.
    #[error("session name must be a single path segment")]
    NestedPath,
    /// The name exceeds the configured length cap.
    #[error("session name is longer than {limit} bytes")]
    TooLong {
        /// Configured cap.
        limit: usize,
    },
}

/// Extracts the session name from `<prefix>/<session>` paths.
#[derive(Debug, Clone)]
pub struct SessionRouter {
    prefix: String,
    max_name_len: Option<usize>,
}

impl SessionRouter {
    /// Creates a router for `prefix`. Trailing slashes on the prefix are ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        while prefix.ends_with('/') {
            prefix.pop();
        }
        Self {
            prefix,
            max_name_len: None,
        }
    }

    /// Caps session names at `limit` bytes. Unset means any length.
    #[must_use]
    pub fn with_max_name_len(mut self, limit: Option<usize>) -> Self {
        self.max_name_len = limit;
        self
    }

    /// The prefix this router answers for, without a trailing slash.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolves `path` to a session name.
    ///
    /// The segment is taken verbatim: no percent-decoding, no case folding.
    /// A query string, if present, is not part of the name.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when the path is not exactly one non-empty
    /// segment below the prefix.
    pub fn route(&self, path: &str) -> Result<SessionName, RouteError> {
        let path = path.split_once('?').map_or(path, |(path, _)| path);
        let rest = path
            .strip_prefix(self.prefix.as_str())
            .ok_or(RouteError::ForeignPath)?;

        let segment = match rest {
            "" => return Err(RouteError::MissingSession),
            rest => rest.strip_prefix('/').ok_or(RouteError::ForeignPath)?,
        };

        if segment.is_empty() {
            return Err(RouteError::MissingSession);
        }
        if segment.contains('/') {
            return Err(RouteError::NestedPath);
        }
        if let Some(limit) = self.max_name_len {
            if segment.len() > limit {
                return Err(RouteError::TooLong { limit });
            }
        }

        Ok(SessionName::from(segment))
    }
}
