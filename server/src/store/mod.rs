//! Persistence for the supporting features: uploaded files and notes.

pub mod files;
pub mod notes;

pub use files::{FileStore, FileStoreError, StoredFile};
pub use notes::{Folder, Note, NoteInput, NoteStore, NoteStoreError};
