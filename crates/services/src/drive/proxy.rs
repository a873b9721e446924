use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::{DriveError, SessionManager};
use crate::cloud_storage::{DriveClient, FOLDER_MIME_TYPE, NewFile, RemoteError, RemoteFile};

/// A Drive file as handed to API callers. Lives for one response only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
}

impl From<RemoteFile> for DriveFile {
    fn from(f: RemoteFile) -> Self {
        Self {
            id: f.id,
            name: f.name,
            mime_type: f.mime_type,
            size: f.size,
            modified_time: f.modified_time,
            web_view_link: f.web_view_link,
        }
    }
}

/// A file to upload. `name` is client-supplied and passed through as is.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub filename: String,
    pub mime_type: String,
    pub size: u64,
    pub content: Vec<u8>,
}

/// Remote file operations. Each one obtains a valid access token from the
/// session first and fails with the session's error when there is none.
pub struct DriveProxy {
    session: Arc<SessionManager>,
    client: Arc<dyn DriveClient>,
}

impl DriveProxy {
    pub fn new(session: Arc<SessionManager>, client: Arc<dyn DriveClient>) -> Self {
        Self { session, client }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub async fn list_files(&self) -> Result<Vec<DriveFile>, DriveError> {
        let token = self.session.ensure_valid_token().await?;

        let files = self
            .client
            .list_files(&token)
            .await
            .map_err(|e| remote_failure("list_files", e))?;

        Ok(files.into_iter().map(DriveFile::from).collect())
    }

    pub async fn upload_file(&self, file: UploadFile) -> Result<DriveFile, DriveError> {
        let token = self.session.ensure_valid_token().await?;

        let metadata = NewFile {
            name: file.name,
            mime_type: file.mime_type,
        };
        let created = self
            .client
            .create_file(&token, &metadata, Some(&file.content))
            .await
            .map_err(|e| remote_failure("upload_file", e))?;

        info!(file_id = %created.id, size = file.content.len(), "File uploaded to Drive");
        Ok(created.into())
    }

    /// Fetches metadata and then the body. Files larger than `max_bytes` are
    /// refused up front when the size is known, otherwise while streaming.
    pub async fn download_file(
        &self,
        file_id: &str,
        max_bytes: u64,
    ) -> Result<DownloadedFile, DriveError> {
        let token = self.session.ensure_valid_token().await?;

        let metadata = self
            .client
            .get_file_metadata(&token, file_id)
            .await
            .map_err(|e| remote_failure("get_file_metadata", e))?;

        if metadata.size.is_some_and(|size| size > max_bytes) {
            return Err(too_large(max_bytes));
        }

        let content = self
            .client
            .get_file_content(&token, file_id, max_bytes)
            .await
            .map_err(|e| remote_failure("get_file_content", e))?;

        Ok(DownloadedFile {
            filename: metadata.name,
            mime_type: metadata.mime_type,
            size: content.len() as u64,
            content,
        })
    }

    pub async fn create_folder(&self, name: &str) -> Result<DriveFile, DriveError> {
        let token = self.session.ensure_valid_token().await?;

        let metadata = NewFile {
            name: name.to_string(),
            mime_type: FOLDER_MIME_TYPE.to_string(),
        };
        let created = self
            .client
            .create_file(&token, &metadata, None)
            .await
            .map_err(|e| remote_failure("create_folder", e))?;

        info!(folder_id = %created.id, "Folder created on Drive");
        Ok(created.into())
    }
}

fn remote_failure(operation: &'static str, err: RemoteError) -> DriveError {
    warn!(operation, error = %err, "Drive API call failed");
    if err.is_not_found() {
        DriveError::FileNotFound(err.to_string())
    } else {
        DriveError::DriveApi(err.to_string())
    }
}

fn too_large(max_bytes: u64) -> DriveError {
    DriveError::DriveApi(format!(
        "file exceeds the {} byte download limit",
        max_bytes
    ))
}
