//! Upload, listing, download and preview routes.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;

use crate::api::ApiError;
use crate::host::HostState;
use crate::store::StoredFile;

/// Response body for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Always `true`.
    pub success: bool,
    /// Name the file was stored under.
    pub filename: String,
}

/// Stores the multipart field named `file`.
pub async fn upload(
    State(state): State<Arc<HostState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let Some(original) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let data = field.bytes().await?;
        let filename = state.files().save(&original, &data).await?;
        return Ok(Json(UploadResponse {
            success: true,
            filename,
        }));
    }
    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

/// Lists stored files. Gated.
pub async fn list(
    State(state): State<Arc<HostState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<StoredFile>>, ApiError> {
    state.gate().require(&headers, "/api/files")?;
    Ok(Json(state.files().list().await?))
}

/// Sends a stored file as an attachment.
pub async fn download(
    State(state): State<Arc<HostState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let data = state.files().read(&filename).await?;
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        ascii_filename(&filename)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// Sends a stored file inline so the browser can render it.
pub async fn preview(
    State(state): State<Arc<HostState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let data = state.files().read(&filename).await?;
    let disposition = HeaderValue::from_str(&format!(
        "inline; filename=\"{}\"",
        ascii_filename(&filename)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("inline"));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type_for(&filename))),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// Guesses a media type from the file extension.
fn content_type_for(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "json" => "application/json",
        "html" | "htm" => "text/html; charset=utf-8",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

fn ascii_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File routes with the configured upload limit applied.
pub fn router(state: Arc<HostState>) -> Router {
    let limit = state.max_upload_bytes();
    Router::new()
        .route("/api/upload", post(upload).layer(DefaultBodyLimit::max(limit)))
        .route("/api/files", get(list))
        .route("/api/download/{filename}", get(download))
        .route("/api/preview/{filename}", get(preview))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_names_are_header_safe() {
        assert_eq!(ascii_filename("1-report.pdf"), "1-report.pdf");
        assert_eq!(ascii_filename("1-my \"best\".txt"), "1-my _best_.txt");
        assert_eq!(ascii_filename("1-résumé.txt"), "1-r_sum_.txt");
    }

    #[test]
    fn preview_type_follows_extension() {
        assert_eq!(content_type_for("1-photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("1-scan.pdf"), "application/pdf");
        assert_eq!(content_type_for("1-readme.md"), "text/markdown; charset=utf-8");
        assert_eq!(content_type_for("1-archive.tar.gz"), "application/octet-stream");
        assert_eq!(content_type_for("1-Makefile"), "application/octet-stream");
    }
}
