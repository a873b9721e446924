use thiserror::Error;

/// Every failure the drive layer reports. The set is closed: provider text
/// only ever travels as the detail string, never as the code.
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Google Drive client credentials are not configured")]
    MissingCredentials,
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),
    #[error("Not connected to Google Drive, authorization is required")]
    NoAccessToken,
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Google Drive API error: {0}")]
    DriveApi(String),
}

impl DriveError {
    pub fn code(&self) -> &'static str {
        match self {
            DriveError::MissingCredentials => "missing_credentials",
            DriveError::TokenExchangeFailed(_) => "token_exchange_failed",
            DriveError::NoAccessToken => "no_access_token",
            DriveError::FileNotFound(_) => "file_not_found",
            DriveError::DriveApi(_) => "drive_api_error",
        }
    }
}
