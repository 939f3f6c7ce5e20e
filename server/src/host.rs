//! Shared state handed to every handler.

use anyhow::{Context, Result};
use secrecy::ExposeSecret;

use crate::auth::AccessGate;
use crate::infrastructure::config::Settings;
use crate::store::{FileStore, NoteStore};
use crate::ws::Relay;

/// Everything the handlers share: the relay plus the supporting stores.
pub struct HostState {
    relay: Relay,
    files: FileStore,
    notes: NoteStore,
    gate: AccessGate,
    max_upload_bytes: usize,
}

impl HostState {
    /// Opens the stores named in `settings` and builds a fresh relay.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload directory or the notes database cannot
    /// be opened.
    pub async fn new(settings: &Settings) -> Result<Self> {
        let files = FileStore::open(&settings.storage.upload_dir)
            .await
            .context("Failed to open upload directory")?;
        let notes = NoteStore::connect(
            settings.database.url.expose_secret(),
            settings.database.max_connections,
        )
        .await
        .context("Failed to open notes database")?;

        Ok(Self::from_parts(settings, files, notes))
    }

    /// Assembles state from already opened stores.
    #[must_use]
    pub fn from_parts(settings: &Settings, files: FileStore, notes: NoteStore) -> Self {
        Self {
            relay: Relay::new(&settings.relay),
            files,
            notes,
            gate: AccessGate::new(settings.auth.password.as_ref()),
            max_upload_bytes: settings.storage.max_upload_bytes,
        }
    }

    /// The session relay.
    #[must_use]
    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    /// Uploaded files.
    #[must_use]
    pub fn files(&self) -> &FileStore {
        &self.files
    }

    /// Notes and folders.
    #[must_use]
    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    /// Password gate for protected routes.
    #[must_use]
    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Body limit for uploads.
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}
