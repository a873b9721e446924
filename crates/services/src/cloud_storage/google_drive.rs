use std::time::Duration;

use async_trait::async_trait;
use drivebridge_config::DriveSettings;
use reqwest::{Client, Response};
use sha2::{Digest, Sha256};

use super::{DriveClient, NewFile, RemoteError, RemoteFile, TokenGrant};
use crate::drive::Credentials;

const FILE_FIELDS: &str = "id,name,mimeType,size,modifiedTime,webViewLink";

/// Google OAuth2 + Drive v3 over plain HTTPS.
pub struct GoogleDriveClient {
    client: Client,
    auth_endpoint: String,
    token_endpoint: String,
    api_base: String,
    upload_base: String,
    page_size: u32,
}

#[derive(serde::Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteFile>,
}

impl GoogleDriveClient {
    pub fn new(settings: &DriveSettings) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            auth_endpoint: settings.auth_endpoint.clone(),
            token_endpoint: settings.token_endpoint.clone(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            upload_base: settings.upload_base.trim_end_matches('/').to_string(),
            page_size: settings.page_size,
        })
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.api_base, urlencoding::encode(file_id))
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenGrant, RemoteError> {
        let resp = self.client.post(&self.token_endpoint).form(form).send().await?;
        let grant = check_status(resp).await?.json::<TokenGrant>().await?;
        if grant.access_token.is_empty() {
            return Err(RemoteError::Decode(
                "Token response carried no access_token".to_string(),
            ));
        }
        Ok(grant)
    }
}

#[async_trait]
impl DriveClient for GoogleDriveClient {
    fn build_auth_url(
        &self,
        credentials: &Credentials,
        redirect_uri: &str,
        scopes: &[String],
    ) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.auth_endpoint,
            urlencoding::encode(&credentials.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes.join(" ")),
        )
    }

    async fn exchange_code(
        &self,
        credentials: &Credentials,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenGrant, RemoteError> {
        self.token_request(&[
            ("code", code),
            ("client_id", &credentials.client_id),
            ("client_secret", &credentials.client_secret),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    async fn refresh_token(
        &self,
        credentials: &Credentials,
        refresh_token: &str,
    ) -> Result<TokenGrant, RemoteError> {
        self.token_request(&[
            ("client_id", &credentials.client_id),
            ("client_secret", &credentials.client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn list_files(&self, access_token: &str) -> Result<Vec<RemoteFile>, RemoteError> {
        let fields = format!("files({})", FILE_FIELDS);
        let page_size = self.page_size.to_string();

        let resp = self
            .client
            .get(format!("{}/files", self.api_base))
            .bearer_auth(access_token)
            .query(&[
                ("q", "trashed = false"),
                ("orderBy", "modifiedTime desc"),
                ("fields", fields.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?;

        let list = check_status(resp).await?.json::<FileList>().await?;
        Ok(list.files)
    }

    async fn create_file(
        &self,
        access_token: &str,
        metadata: &NewFile,
        content: Option<&[u8]>,
    ) -> Result<RemoteFile, RemoteError> {
        let meta = serde_json::json!({
            "name": metadata.name,
            "mimeType": metadata.mime_type,
        });

        let request = match content {
            None => self
                .client
                .post(format!("{}/files", self.api_base))
                .query(&[("fields", FILE_FIELDS)])
                .json(&meta),
            Some(bytes) => {
                let boundary = multipart_boundary(bytes);
                let body = multipart_related_body(&boundary, &meta, &metadata.mime_type, bytes);
                self.client
                    .post(format!("{}/files", self.upload_base))
                    .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
                    .header(
                        reqwest::header::CONTENT_TYPE,
                        format!("multipart/related; boundary={}", boundary),
                    )
                    .body(body)
            }
        };

        let resp = request.bearer_auth(access_token).send().await?;
        Ok(check_status(resp).await?.json::<RemoteFile>().await?)
    }

    async fn get_file_metadata(
        &self,
        access_token: &str,
        file_id: &str,
    ) -> Result<RemoteFile, RemoteError> {
        let resp = self
            .client
            .get(self.file_url(file_id))
            .bearer_auth(access_token)
            .query(&[("fields", FILE_FIELDS)])
            .send()
            .await?;

        Ok(check_status(resp).await?.json::<RemoteFile>().await?)
    }

    async fn get_file_content(
        &self,
        access_token: &str,
        file_id: &str,
        max_bytes: u64,
    ) -> Result<Vec<u8>, RemoteError> {
        let resp = self
            .client
            .get(self.file_url(file_id))
            .bearer_auth(access_token)
            .query(&[("alt", "media")])
            .send()
            .await?;

        let mut resp = check_status(resp).await?;
        if resp.content_length().is_some_and(|len| len > max_bytes) {
            return Err(RemoteError::TooLarge { limit: max_bytes });
        }

        let mut content = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            if (content.len() + chunk.len()) as u64 > max_bytes {
                return Err(RemoteError::TooLarge { limit: max_bytes });
            }
            content.extend_from_slice(&chunk);
        }
        Ok(content)
    }
}

async fn check_status(resp: Response) -> Result<Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = provider_message(&body)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "unknown error".to_string());

    Err(RemoteError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Pulls the human-readable part out of a Google error body. Drive API errors
/// nest it under `error.message`; OAuth token errors use `error` +
/// `error_description`.
fn provider_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = json.get("error")?;

    if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
        return Some(message.to_string());
    }

    let code = error.as_str()?;
    match json.get("error_description").and_then(|d| d.as_str()) {
        Some(description) => Some(format!("{}: {}", code, description)),
        None => Some(code.to_string()),
    }
}

/// First salted content hash that does not itself occur in `content`.
fn multipart_boundary(content: &[u8]) -> String {
    let mut salt = 0u32;
    loop {
        let candidate = boundary_candidate(content, salt);
        if !contains_subslice(content, candidate.as_bytes()) {
            return candidate;
        }
        salt = salt.wrapping_add(1);
    }
}

fn boundary_candidate(content: &[u8], salt: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hasher.update(salt.to_be_bytes());
    format!("drivebridge-{}", hex::encode(&hasher.finalize()[..12]))
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

fn multipart_related_body(
    boundary: &str,
    metadata: &serde_json::Value,
    mime_type: &str,
    content: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
