use std::{fmt, sync::Arc};

use drivebridge_db::{OptionStore, StoreResult, TypedOption};
use serde::{Deserialize, Serialize};

pub const CREDENTIALS_KEY: &str = "drive_credentials";

/// OAuth client registration for the connected Google account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

/// Stores the client id and secret together as one record.
pub struct CredentialStore {
    option: TypedOption<Credentials>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn OptionStore>) -> Self {
        Self {
            option: TypedOption::new(store, CREDENTIALS_KEY),
        }
    }

    pub async fn save(&self, client_id: &str, client_secret: &str) -> StoreResult<Credentials> {
        let credentials = Credentials {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        };
        self.option.save(&credentials).await?;
        Ok(credentials)
    }

    pub async fn load(&self) -> StoreResult<Option<Credentials>> {
        self.option.load().await
    }

    pub async fn clear(&self) -> StoreResult<bool> {
        self.option.clear().await
    }
}
