use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const GOOD_CODE: &str = "4/0good-code";
pub const VALID_ACCESS: &str = "ya29.valid";
pub const EXCHANGED_ACCESS: &str = "ya29.exchanged";
pub const REFRESHED_ACCESS: &str = "ya29.refreshed";
pub const EXCHANGED_REFRESH: &str = "1//exchanged-refresh";
pub const UNSIZED_FILE: &str = "unsized654";

/// In-process stand-in for the Google OAuth2 and Drive v3 endpoints.
#[derive(Default)]
pub struct FakeGoogle {
    pub exchange_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub api_calls: AtomicUsize,
    pub fail_refresh: AtomicBool,
    pub refresh_delay_ms: AtomicU64,
    pub files: Mutex<Vec<Value>>,
    pub bearer_tokens: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<(Value, Vec<u8>)>>,
}

impl FakeGoogle {
    pub async fn spawn() -> (String, Arc<Self>) {
        let fake = Arc::new(Self::default());

        let app = Router::new()
            .route("/token", post(token))
            .route("/drive/v3/files", get(list_files).post(create_file))
            .route("/drive/v3/files/{id}", get(get_file))
            .route("/upload/drive/v3/files", post(upload_file))
            .with_state(fake.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Google");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), fake)
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn last_bearer(&self) -> Option<String> {
        self.bearer_tokens.lock().unwrap().last().cloned()
    }
}

fn oauth_error(error: &str, description: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": error, "error_description": description })),
    )
        .into_response()
}

fn api_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "code": status.as_u16(), "message": message } })),
    )
        .into_response()
}

fn authorize(fake: &FakeGoogle, headers: &HeaderMap) -> Result<(), Response> {
    fake.api_calls.fetch_add(1, Ordering::SeqCst);
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();
    fake.bearer_tokens.lock().unwrap().push(bearer.clone());

    if [VALID_ACCESS, EXCHANGED_ACCESS, REFRESHED_ACCESS].contains(&bearer.as_str()) {
        Ok(())
    } else {
        Err(api_error(StatusCode::UNAUTHORIZED, "Invalid Credentials"))
    }
}

async fn token(
    State(fake): State<Arc<FakeGoogle>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") => {
            fake.exchange_calls.fetch_add(1, Ordering::SeqCst);
            if form.get("code").map(String::as_str) != Some(GOOD_CODE) {
                return oauth_error("invalid_grant", "Malformed auth code.");
            }
            Json(json!({
                "access_token": EXCHANGED_ACCESS,
                "refresh_token": EXCHANGED_REFRESH,
                "expires_in": 3599,
                "token_type": "Bearer",
            }))
            .into_response()
        }
        Some("refresh_token") => {
            fake.refresh_calls.fetch_add(1, Ordering::SeqCst);
            let delay = fake.refresh_delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            if fake.fail_refresh.load(Ordering::SeqCst) {
                return oauth_error("invalid_grant", "Token has been expired or revoked.");
            }
            Json(json!({
                "access_token": REFRESHED_ACCESS,
                "expires_in": 3599,
                "token_type": "Bearer",
            }))
            .into_response()
        }
        _ => oauth_error("unsupported_grant_type", "Invalid grant_type"),
    }
}

async fn list_files(State(fake): State<Arc<FakeGoogle>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&fake, &headers) {
        return resp;
    }
    let files = fake.files.lock().unwrap().clone();
    Json(json!({ "files": files })).into_response()
}

async fn create_file(
    State(fake): State<Arc<FakeGoogle>>,
    headers: HeaderMap,
    Json(meta): Json<Value>,
) -> Response {
    if let Err(resp) = authorize(&fake, &headers) {
        return resp;
    }
    Json(json!({
        "id": "folderid789",
        "name": meta["name"],
        "mimeType": meta["mimeType"],
        "webViewLink": "https://drive.google.com/drive/folders/folderid789",
    }))
    .into_response()
}

async fn get_file(
    State(fake): State<Arc<FakeGoogle>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = authorize(&fake, &headers) {
        return resp;
    }
    let media = query.get("alt").map(String::as_str) == Some("media");

    match id.as_str() {
        "fileid321" if media => {
            ([(header::CONTENT_TYPE, "text/plain")], "file-content").into_response()
        }
        "fileid321" => Json(json!({
            "id": "fileid321",
            "name": "downloaded.txt",
            "mimeType": "text/plain",
            "size": "789",
        }))
        .into_response(),
        // Google Docs exports and shortcuts come back without a size
        UNSIZED_FILE if media => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            vec![b'x'; 4096],
        )
            .into_response(),
        UNSIZED_FILE => Json(json!({
            "id": UNSIZED_FILE,
            "name": "export.bin",
            "mimeType": "application/octet-stream",
        }))
        .into_response(),
        _ => api_error(StatusCode::NOT_FOUND, &format!("File not found: {}.", id)),
    }
}

async fn upload_file(
    State(fake): State<Arc<FakeGoogle>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    if let Err(resp) = authorize(&fake, &headers) {
        return resp;
    }
    if query.get("uploadType").map(String::as_str) != Some("multipart") {
        return api_error(StatusCode::BAD_REQUEST, "Unsupported uploadType");
    }

    let boundary = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_once("boundary="))
        .map(|(_, b)| b.to_string())
        .unwrap_or_default();

    let Some((meta, content)) = parse_related(&body, &boundary) else {
        return api_error(StatusCode::BAD_REQUEST, "Malformed multipart body");
    };

    let response = json!({
        "id": "uploaded456",
        "name": meta["name"],
        "mimeType": meta["mimeType"],
        "size": content.len().to_string(),
        "webViewLink": "https://drive.google.com/file/d/uploaded456/view",
    });
    fake.uploads.lock().unwrap().push((meta, content));
    Json(response).into_response()
}

fn parse_related(body: &[u8], boundary: &str) -> Option<(Value, Vec<u8>)> {
    if boundary.is_empty() {
        return None;
    }
    let delimiter = format!("--{}", boundary);
    let text = String::from_utf8_lossy(body);
    let mut parts = text
        .split(delimiter.as_str())
        .filter(|p| !p.is_empty() && !p.starts_with("--"));

    let meta_part = parts.next()?;
    let content_part = parts.next()?;

    let meta = meta_part.split_once("\r\n\r\n")?.1.trim_end_matches("\r\n");
    let content = content_part.split_once("\r\n\r\n")?.1.strip_suffix("\r\n")?;

    Some((serde_json::from_str(meta).ok()?, content.as_bytes().to_vec()))
}
