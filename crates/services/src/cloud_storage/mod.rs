pub mod google_drive;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::drive::Credentials;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// A file object as returned by the provider.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, deserialize_with = "deserialize_size")]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified_time: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
}

/// Metadata for a file or folder about to be created.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub mime_type: String,
}

/// Token endpoint response, before it is turned into stored token state.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Request timed out")]
    Timeout,
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Provider returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid provider response: {0}")]
    Decode(String),
    #[error("File exceeds the {limit} byte download limit")]
    TooLarge { limit: u64 },
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

/// OAuth2 + file storage operations the drive layer needs from a provider.
#[async_trait]
pub trait DriveClient: Send + Sync {
    fn build_auth_url(&self, credentials: &Credentials, redirect_uri: &str, scopes: &[String])
    -> String;
    async fn exchange_code(
        &self,
        credentials: &Credentials,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenGrant, RemoteError>;
    async fn refresh_token(
        &self,
        credentials: &Credentials,
        refresh_token: &str,
    ) -> Result<TokenGrant, RemoteError>;
    async fn list_files(&self, access_token: &str) -> Result<Vec<RemoteFile>, RemoteError>;
    async fn create_file(
        &self,
        access_token: &str,
        metadata: &NewFile,
        content: Option<&[u8]>,
    ) -> Result<RemoteFile, RemoteError>;
    async fn get_file_metadata(
        &self,
        access_token: &str,
        file_id: &str,
    ) -> Result<RemoteFile, RemoteError>;
    /// Fails with [`RemoteError::TooLarge`] as soon as the body passes
    /// `max_bytes`, without buffering the rest.
    async fn get_file_content(
        &self,
        access_token: &str,
        file_id: &str,
        max_bytes: u64,
    ) -> Result<Vec<u8>, RemoteError>;
}

/// Drive v3 reports `size` as a decimal string.
fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Text(String),
        Number(u64),
    }

    match Option::<Size>::deserialize(deserializer)? {
        Some(Size::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
        Some(Size::Number(n)) => Ok(Some(n)),
        None => Ok(None),
    }
}
