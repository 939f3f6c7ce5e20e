//! Notes and folders routes. Editing and deleting are gated.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, put},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::ApiError;
use crate::host::HostState;
use crate::store::{Folder, Note, NoteInput};

/// Query string for listing notes.
#[derive(Debug, Deserialize)]
pub struct NotesQuery {
    /// Restrict to one folder.
    pub folder_id: Option<i64>,
}

/// Body for creating a folder.
#[derive(Debug, Deserialize)]
pub struct NewFolder {
    /// Folder name.
    pub name: String,
}

async fn list_folders(State(state): State<Arc<HostState>>) -> Result<Json<Vec<Folder>>, ApiError> {
    Ok(Json(state.notes().list_folders().await?))
}

async fn create_folder(
    State(state): State<Arc<HostState>>,
    Json(body): Json<NewFolder>,
) -> Result<(StatusCode, Json<Folder>), ApiError> {
    let folder = state.notes().create_folder(&body.name).await?;
    Ok((StatusCode::CREATED, Json(folder)))
}

async fn delete_folder(
    State(state): State<Arc<HostState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.gate().require(&headers, "/api/folders")?;
    if state.notes().delete_folder(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Folder not found".to_string()))
    }
}

async fn list_notes(
    State(state): State<Arc<HostState>>,
    Query(query): Query<NotesQuery>,
) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.notes().list_notes(query.folder_id).await?))
}

async fn create_note(
    State(state): State<Arc<HostState>>,
    Json(input): Json<NoteInput>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let note = state.notes().create_note(&input).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn update_note(
    State(state): State<Arc<HostState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<NoteInput>,
) -> Result<Json<Note>, ApiError> {
    state.gate().require(&headers, "/api/notes")?;
    state
        .notes()
        .update_note(id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))
}

async fn delete_note(
    State(state): State<Arc<HostState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.gate().require(&headers, "/api/notes")?;
    if state.notes().delete_note(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Note not found".to_string()))
    }
}

/// Notes and folders routes.
pub fn router(state: Arc<HostState>) -> Router {
    Router::new()
        .route("/api/folders", get(list_folders).post(create_folder))
        .route("/api/folders/{id}", delete(delete_folder))
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/{id}", put(update_note).delete(delete_note))
        .with_state(state)
}
