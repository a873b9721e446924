use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;

use super::{Credentials, SessionConfig};
use crate::cloud_storage::{DriveClient, NewFile, RemoteError, RemoteFile, TokenGrant};

/// Scripted provider that records which remote calls were made.
#[derive(Default)]
pub struct MockDriveClient {
    pub fail_exchange: bool,
    pub fail_refresh: bool,
    pub rotate_refresh: bool,
    pub refresh_delay: Option<Duration>,
    pub fail_api: bool,
    /// Overrides the lifetime handed out by exchanges and refreshes.
    pub grant_expires_in: Option<i64>,
    pub files: Vec<RemoteFile>,
    pub content: Vec<u8>,
    pub(super) calls: Mutex<Vec<&'static str>>,
    pub(super) tokens_seen: Mutex<Vec<String>>,
}

impl MockDriveClient {
    pub fn session_config() -> SessionConfig {
        SessionConfig {
            redirect_uri: "http://localhost/callback".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/drive.file".to_string()],
            expiry_skew: chrono::Duration::seconds(30),
        }
    }

    pub fn calls_to(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.lock().unwrap().clone()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }

    fn api_call(&self, name: &'static str, access_token: &str) -> Result<(), RemoteError> {
        self.record(name);
        self.tokens_seen.lock().unwrap().push(access_token.to_string());
        if self.fail_api {
            return Err(RemoteError::Status {
                status: 500,
                message: "Internal Error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DriveClient for MockDriveClient {
    fn build_auth_url(
        &self,
        credentials: &Credentials,
        redirect_uri: &str,
        scopes: &[String],
    ) -> String {
        format!(
            "https://accounts.example/auth?client_id={}&redirect_uri={}&scope={}",
            credentials.client_id,
            redirect_uri,
            scopes.join(" ")
        )
    }

    async fn exchange_code(
        &self,
        _credentials: &Credentials,
        _code: &str,
        _redirect_uri: &str,
    ) -> Result<TokenGrant, RemoteError> {
        self.record("exchange_code");
        if self.fail_exchange {
            return Err(RemoteError::Status {
                status: 400,
                message: "invalid_grant: Bad Request".to_string(),
            });
        }
        Ok(TokenGrant {
            access_token: "exchanged-access".to_string(),
            refresh_token: Some("exchanged-refresh".to_string()),
            expires_in: self.grant_expires_in.unwrap_or(3600),
        })
    }

    async fn refresh_token(
        &self,
        _credentials: &Credentials,
        _refresh_token: &str,
    ) -> Result<TokenGrant, RemoteError> {
        self.record("refresh_token");
        if let Some(delay) = self.refresh_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_refresh {
            return Err(RemoteError::Status {
                status: 400,
                message: "invalid_grant: Token has been expired or revoked.".to_string(),
            });
        }
        Ok(TokenGrant {
            access_token: "refreshed-access".to_string(),
            refresh_token: self.rotate_refresh.then(|| "rotated-refresh".to_string()),
            expires_in: self.grant_expires_in.unwrap_or(3600),
        })
    }

    async fn list_files(&self, access_token: &str) -> Result<Vec<RemoteFile>, RemoteError> {
        self.api_call("list_files", access_token)?;
        Ok(self.files.clone())
    }

    async fn create_file(
        &self,
        access_token: &str,
        metadata: &NewFile,
        content: Option<&[u8]>,
    ) -> Result<RemoteFile, RemoteError> {
        self.api_call("create_file", access_token)?;
        Ok(RemoteFile {
            id: if content.is_some() { "uploaded123" } else { "folderid789" }.to_string(),
            name: metadata.name.clone(),
            mime_type: metadata.mime_type.clone(),
            size: content.map(|c| c.len() as u64),
            modified_time: None,
            web_view_link: Some("https://drive.google.com/file/d/x/view".to_string()),
        })
    }

    async fn get_file_metadata(
        &self,
        access_token: &str,
        file_id: &str,
    ) -> Result<RemoteFile, RemoteError> {
        self.api_call("get_file_metadata", access_token)?;
        self.files
            .iter()
            .find(|f| f.id == file_id)
            .cloned()
            .ok_or_else(|| RemoteError::Status {
                status: 404,
                message: format!("File not found: {}.", file_id),
            })
    }

    async fn get_file_content(
        &self,
        access_token: &str,
        _file_id: &str,
        max_bytes: u64,
    ) -> Result<Vec<u8>, RemoteError> {
        self.api_call("get_file_content", access_token)?;
        if self.content.len() as u64 > max_bytes {
            return Err(RemoteError::TooLarge { limit: max_bytes });
        }
        Ok(self.content.clone())
    }
}
