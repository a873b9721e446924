use axum::{
    Json,
    extract::{Multipart, Query, State, multipart::MultipartRejection, rejection::JsonRejection},
    response::Redirect,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use drivebridge_services::{DriveError, DriveFile, drive::UploadFile};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    error::ApiError,
    extractors::{
        auth::AdminUser,
        nonce::{NONCE_ACTION, NonceVerified},
    },
    render::{escape_file, escape_html},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SaveCredentialsRequest {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub file_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    #[serde(default)]
    pub name: String,
}

/// POST /api/v1/drive/save-credentials
pub async fn save_credentials(
    State(state): State<AppState>,
    NonceVerified(admin): NonceVerified,
    body: Result<Json<SaveCredentialsRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let client_id = body.client_id.trim();
    let client_secret = body.client_secret.trim();
    if client_id.is_empty() || client_secret.is_empty() {
        return Err(ApiError::BadRequest(
            "Both client_id and client_secret are required".to_string(),
        ));
    }

    let saved = state
        .session
        .credentials()
        .save(client_id, client_secret)
        .await?;
    info!(user = %admin.username, "Drive client credentials saved");

    Ok(Json(serde_json::json!({
        "success": true,
        "client_id": saved.client_id,
        "client_secret": saved.client_secret,
    })))
}

/// POST /api/v1/drive/auth
pub async fn start_auth(
    State(state): State<AppState>,
    _admin: NonceVerified,
) -> Result<Json<serde_json::Value>, ApiError> {
    let auth_url = state.session.start_auth().await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "authUrl": auth_url,
    })))
}

/// GET|POST /api/v1/drive/callback
/// Provider redirect target. Not gated: the provider's redirect carries no
/// admin token.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, ApiError> {
    if let Some(error) = query.error {
        warn!(%error, "Provider reported an authorization error");
        return Err(DriveError::TokenExchangeFailed(error).into());
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| DriveError::TokenExchangeFailed("missing authorization code".to_string()))?;

    state.session.handle_callback(&code).await?;

    Ok(Redirect::to(&state.settings.drive.post_auth_redirect))
}

/// GET /api/v1/drive/files
/// The token check runs before the capability check, so callers without a
/// connected account always see `no_access_token`.
pub async fn list_files(
    State(state): State<AppState>,
    admin: Result<AdminUser, ApiError>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Only orders the token check ahead of the capability check; the proxy
    // call below checks the token again.
    state.session.ensure_valid_token().await?;
    admin?;

    let files: Vec<DriveFile> = state
        .drive
        .list_files()
        .await?
        .into_iter()
        .map(escape_file)
        .collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "files": files,
    })))
}

/// POST /api/v1/drive/upload
/// Multipart form with a single `file` field.
pub async fn upload(
    State(state): State<AppState>,
    _admin: NonceVerified,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.session.ensure_valid_token().await?;
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .unwrap_or("unnamed")
            .to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;

        upload = Some(UploadFile {
            name,
            mime_type,
            content: content.to_vec(),
        });
        break;
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("No file was uploaded".to_string()))?;
    let file = state.drive.upload_file(upload).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "file": escape_file(file),
    })))
}

/// GET /api/v1/drive/download?file_id=
/// The body comes back base64-encoded inside the JSON envelope.
pub async fn download(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<DownloadQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.session.ensure_valid_token().await?;

    let file_id = query
        .file_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("file_id is required".to_string()))?;

    let file = state
        .drive
        .download_file(&file_id, state.settings.drive.max_download_bytes)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "filename": escape_html(&file.filename),
        "mimeType": file.mime_type,
        "size": file.size,
        "content": STANDARD.encode(&file.content),
    })))
}

/// POST /api/v1/drive/create-folder
pub async fn create_folder(
    State(state): State<AppState>,
    _admin: NonceVerified,
    body: Result<Json<CreateFolderRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.session.ensure_valid_token().await?;
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Folder name is required".to_string()));
    }

    let folder = state.drive.create_folder(name).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "folder": escape_file(folder),
    })))
}

/// GET /api/v1/drive/status
/// Connection state for the admin page, plus a fresh nonce for its requests.
pub async fn status(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Json<serde_json::Value> {
    let status = state.session.status().await;
    let nonce = state.nonces.create(&admin.username, NONCE_ACTION);

    Json(serde_json::json!({
        "success": true,
        "hasCredentials": status.has_credentials,
        "authenticated": status.authenticated,
        "nonce": nonce,
    }))
}

/// POST /api/v1/drive/disconnect
pub async fn disconnect(
    State(state): State<AppState>,
    NonceVerified(admin): NonceVerified,
) -> Result<Json<serde_json::Value>, ApiError> {
    let disconnected = state.session.disconnect().await?;
    info!(user = %admin.username, disconnected, "Drive disconnect requested");

    Ok(Json(serde_json::json!({
        "success": true,
        "disconnected": disconnected,
    })))
}
