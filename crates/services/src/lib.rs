pub mod auth;
pub mod cloud_storage;
pub mod drive;
pub mod nonce;

pub use auth::AuthService;
pub use cloud_storage::google_drive::GoogleDriveClient;
pub use drive::{DriveError, DriveFile, DriveProxy, SessionManager};
pub use nonce::NonceService;
