//! HTTP tests for files, notes, login and the access gate.

mod common;

use anyhow::Result;
use common::{PASSWORD, TestServer};
use copyanywhere_server::auth::PASSWORD_HEADER;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

#[tokio::test]
async fn health_endpoints_respond() -> Result<()> {
    let server = TestServer::start().await?;
    let body = reqwest::get(server.http("/health/live")).await?.text().await?;
    assert_eq!(body, "OK");
    Ok(())
}

#[tokio::test]
async fn upload_list_and_download() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();

    let form = Form::new().part("file", Part::bytes(b"hello file".to_vec()).file_name("notes.txt"));
    let uploaded: Value = client
        .post(server.http("/api/upload"))
        .multipart(form)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(uploaded["success"], json!(true));
    let filename = uploaded["filename"].as_str().unwrap_or_default().to_owned();
    assert!(filename.ends_with("-notes.txt"));

    let listing: Value = client
        .get(server.http("/api/files"))
        .header(PASSWORD_HEADER, PASSWORD)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(listing[0]["name"], json!(filename));
    assert_eq!(listing[0]["size"], json!(10));
    assert!(listing[0]["uploadDate"].is_string());

    let download = client
        .get(server.http(&format!("/api/download/{filename}")))
        .send()
        .await?;
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(download.bytes().await?.as_ref(), b"hello file");
    Ok(())
}

#[tokio::test]
async fn upload_without_file_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let form = Form::new().text("other", "value");
    let response = reqwest::Client::new()
        .post(server.http("/api/upload"))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await?, "No file uploaded");
    Ok(())
}

#[tokio::test]
async fn missing_download_is_not_found() -> Result<()> {
    let server = TestServer::start().await?;
    let response = reqwest::get(server.http("/api/download/nope.bin")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn file_listing_requires_password() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();

    let anonymous = client.get(server.http("/api/files")).send().await?;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let wrong = client
        .get(server.http("/api/files"))
        .header(PASSWORD_HEADER, "guess")
        .send()
        .await?;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let bearer = client
        .get(server.http("/api/files"))
        .bearer_auth(PASSWORD)
        .send()
        .await?;
    assert_eq!(bearer.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn notes_with_folders() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();

    let folder: Value = client
        .post(server.http("/api/folders"))
        .json(&json!({ "name": "ideas" }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let folder_id = folder["id"].as_i64().unwrap_or_default();

    let note: Value = client
        .post(server.http("/api/notes"))
        .json(&json!({ "content": "ship it", "folderId": folder_id }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let note_id = note["id"].as_i64().unwrap_or_default();
    assert_eq!(note["folderId"], json!(folder_id));

    let filed: Value = client
        .get(server.http(&format!("/api/notes?folder_id={folder_id}")))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(filed.as_array().map(Vec::len), Some(1));

    let unauthorized_edit = client
        .put(server.http(&format!("/api/notes/{note_id}")))
        .json(&json!({ "content": "sneaky" }))
        .send()
        .await?;
    assert_eq!(unauthorized_edit.status(), StatusCode::UNAUTHORIZED);

    let edited: Value = client
        .put(server.http(&format!("/api/notes/{note_id}")))
        .header(PASSWORD_HEADER, PASSWORD)
        .json(&json!({ "content": "shipped" }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    assert_eq!(edited["content"], json!("shipped"));
    assert_eq!(edited["folderId"], Value::Null);

    let deleted = client
        .delete(server.http(&format!("/api/notes/{note_id}")))
        .header(PASSWORD_HEADER, PASSWORD)
        .send()
        .await?;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = client
        .delete(server.http(&format!("/api/notes/{note_id}")))
        .header(PASSWORD_HEADER, PASSWORD)
        .send()
        .await?;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn blank_note_is_bad_request() -> Result<()> {
    let server = TestServer::start().await?;
    let response = reqwest::Client::new()
        .post(server.http("/api/notes"))
        .json(&json!({ "content": "  " }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn preview_serves_inline_with_guessed_type() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();

    let form = Form::new().part("file", Part::bytes(b"# heading".to_vec()).file_name("readme.md"));
    let uploaded: Value = client
        .post(server.http("/api/upload"))
        .multipart(form)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let filename = uploaded["filename"].as_str().unwrap_or_default().to_owned();

    let preview = client
        .get(server.http(&format!("/api/preview/{filename}")))
        .send()
        .await?;
    assert_eq!(preview.status(), StatusCode::OK);
    let headers = preview.headers();
    assert_eq!(headers[CONTENT_TYPE], "text/markdown; charset=utf-8");
    assert!(headers[CONTENT_DISPOSITION].to_str()?.starts_with("inline"));
    assert_eq!(preview.bytes().await?.as_ref(), b"# heading");

    let missing = client.get(server.http("/api/preview/nope.png")).send().await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn wrong_login_is_refused() -> Result<()> {
    let server = TestServer::start().await?;
    let response = reqwest::Client::new()
        .post(server.http("/api/auth/login"))
        .json(&json!({ "password": "guess" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(SET_COOKIE).is_none());
    let body: Value = response.json().await?;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Invalid password"));
    Ok(())
}

#[tokio::test]
async fn login_cookie_opens_gated_routes() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();

    let anonymous: Value = client
        .get(server.http("/api/auth-status"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(anonymous["isAuthenticated"], json!(false));

    let login = client
        .post(server.http("/api/auth/login"))
        .json(&json!({ "password": PASSWORD }))
        .send()
        .await?
        .error_for_status()?;
    let cookie = login
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap_or_default()
        .to_owned();
    assert!(cookie.starts_with("copyanywhere_session="));
    let body: Value = login.json().await?;
    assert_eq!(body["success"], json!(true));

    let status: Value = client
        .get(server.http("/api/auth-status"))
        .header(COOKIE, &cookie)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(status["isAuthenticated"], json!(true));

    let listing = client
        .get(server.http("/api/files"))
        .header(COOKIE, &cookie)
        .send()
        .await?;
    assert_eq!(listing.status(), StatusCode::OK);

    let logout = client
        .post(server.http("/api/auth/logout"))
        .header(COOKIE, &cookie)
        .send()
        .await?;
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);

    let after = client
        .get(server.http("/api/files"))
        .header(COOKIE, &cookie)
        .send()
        .await?;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
