//! Upload storage settings.

use serde::Deserialize;
use std::path::PathBuf;

/// Where uploaded files live and how large they may be.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    /// Directory holding uploaded files. Created at startup.
    pub upload_dir: PathBuf,
    /// Request body cap for uploads.
    pub max_upload_bytes: usize,
}
