//! Notes and folders in SQLite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;
use tracing::{debug, info};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS folders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content TEXT NOT NULL,
    folder_id INTEGER REFERENCES folders(id),
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS notes_folder_id ON notes(folder_id);
";

/// Errors from the notes store.
#[derive(Debug, Error)]
pub enum NoteStoreError {
    /// A note must have non-blank content.
    #[error("note content must not be empty")]
    EmptyContent,
    /// A folder must have a non-blank name.
    #[error("folder name must not be empty")]
    EmptyName,
    /// The referenced folder does not exist.
    #[error("folder {0} does not exist")]
    UnknownFolder(i64),
    /// Database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A folder grouping notes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Row id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A single note.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Row id.
    pub id: i64,
    /// Note body.
    pub content: String,
    /// Folder, if filed.
    pub folder_id: Option<i64>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating or editing a note.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInput {
    /// Note body.
    pub content: String,
    /// Folder to file the note under.
    #[serde(default)]
    pub folder_id: Option<i64>,
}

/// SQLite-backed notes store.
#[derive(Debug, Clone)]
pub struct NoteStore {
    pool: SqlitePool,
}

impl NoteStore {
    /// Connects to `url` and creates the schema if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or the schema fails.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, NoteStoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await?;
        Self::from_pool(pool).await
    }

    /// Wraps an existing pool and creates the schema if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, NoteStoreError> {
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        info!("Notes schema ready");
        Ok(Self { pool })
    }

    /// All folders, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub async fn list_folders(&self) -> Result<Vec<Folder>, NoteStoreError> {
        let folders = sqlx::query_as::<_, Folder>(
            "SELECT id, name, created_at FROM folders ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(folders)
    }

    /// Creates a folder.
    ///
    /// # Errors
    ///
    /// Returns [`NoteStoreError::EmptyName`] for a blank name.
    pub async fn create_folder(&self, name: &str) -> Result<Folder, NoteStoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NoteStoreError::EmptyName);
        }
        let folder = sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (name, created_at) VALUES (?, ?) RETURNING id, name, created_at",
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        debug!(folder_id = folder.id, "Folder created");
        Ok(folder)
    }

    /// Deletes a folder; its notes are kept without a folder.
    /// Returns whether the folder existed.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub async fn delete_folder(&self, id: i64) -> Result<bool, NoteStoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE notes SET folder_id = NULL WHERE folder_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM folders WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }

    /// Notes newest first, optionally restricted to one folder.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub async fn list_notes(&self, folder_id: Option<i64>) -> Result<Vec<Note>, NoteStoreError> {
        let notes = match folder_id {
            Some(folder_id) => {
                sqlx::query_as::<_, Note>(
                    "SELECT id, content, folder_id, created_at FROM notes \
                     WHERE folder_id = ? ORDER BY id DESC",
                )
                .bind(folder_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Note>(
                    "SELECT id, content, folder_id, created_at FROM notes ORDER BY id DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(notes)
    }

    /// Creates a note.
    ///
    /// # Errors
    ///
    /// Returns an error for blank content or an unknown folder.
    pub async fn create_note(&self, input: &NoteInput) -> Result<Note, NoteStoreError> {
        self.validate(input).await?;
        let note = sqlx::query_as::<_, Note>(
            "INSERT INTO notes (content, folder_id, created_at) VALUES (?, ?, ?) \
             RETURNING id, content, folder_id, created_at",
        )
        .bind(&input.content)
        .bind(input.folder_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        debug!(note_id = note.id, "Note created");
        Ok(note)
    }

    /// Replaces a note's content and folder. Returns `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error for blank content or an unknown folder.
    pub async fn update_note(&self, id: i64, input: &NoteInput) -> Result<Option<Note>, NoteStoreError> {
        self.validate(input).await?;
        let note = sqlx::query_as::<_, Note>(
            "UPDATE notes SET content = ?, folder_id = ? WHERE id = ? \
             RETURNING id, content, folder_id, created_at",
        )
        .bind(&input.content)
        .bind(input.folder_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    /// Deletes a note. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub async fn delete_note(&self, id: i64) -> Result<bool, NoteStoreError> {
        let deleted = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn validate(&self, input: &NoteInput) -> Result<(), NoteStoreError> {
        if input.content.trim().is_empty() {
            return Err(NoteStoreError::EmptyContent);
        }
        if let Some(folder_id) = input.folder_id {
            let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM folders WHERE id = ?")
                .bind(folder_id)
                .fetch_one(&self.pool)
                .await?;
            if exists == 0 {
                return Err(NoteStoreError::UnknownFolder(folder_id));
            }
        }
        Ok(())
    }
}
