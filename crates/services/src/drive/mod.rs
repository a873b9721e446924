pub mod credentials;
pub mod error;
pub mod proxy;
pub mod session;
pub mod token;

#[cfg(test)]
mod mock;

pub use credentials::{CredentialStore, Credentials};
pub use error::DriveError;
pub use proxy::{DownloadedFile, DriveFile, DriveProxy, UploadFile};
pub use session::{SessionConfig, SessionManager, SessionStatus};
pub use token::{GrantError, TokenState, TokenStore};
