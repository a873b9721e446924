use std::{fmt, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use drivebridge_db::{OptionStore, StoreResult, TypedOption};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cloud_storage::TokenGrant;

pub const TOKEN_KEY: &str = "drive_token";

/// Why a token grant could not become stored token state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrantError {
    #[error("provider did not return a refresh token")]
    MissingRefreshToken,
    #[error("provider returned an unusable expiry of {0} seconds")]
    InvalidExpiry(i64),
}

/// Access token, refresh token and expiry, always stored together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl TokenState {
    /// Builds the next state from a token grant. Google omits the refresh
    /// token on most refreshes, so `previous_refresh` is kept in that case.
    /// `expires_in` comes from the provider and must be a non-negative
    /// number of seconds that still lands on a representable timestamp.
    pub fn from_grant(
        grant: TokenGrant,
        previous_refresh: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, GrantError> {
        let refresh_token = grant
            .refresh_token
            .filter(|t| !t.is_empty())
            .or_else(|| previous_refresh.map(str::to_string))
            .ok_or(GrantError::MissingRefreshToken)?;

        let expires_at = Some(grant.expires_in)
            .filter(|secs| *secs >= 0)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(GrantError::InvalidExpiry(grant.expires_in))?;

        Ok(Self {
            access_token: grant.access_token,
            refresh_token,
            expires_at,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        self.expires_at - skew <= now
    }
}

pub struct TokenStore {
    option: TypedOption<TokenState>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn OptionStore>) -> Self {
        Self {
            option: TypedOption::new(store, TOKEN_KEY),
        }
    }

    pub async fn load(&self) -> StoreResult<Option<TokenState>> {
        self.option.load().await
    }

    pub async fn save(&self, state: &TokenState) -> StoreResult<()> {
        self.option.save(state).await
    }

    pub async fn clear(&self) -> StoreResult<bool> {
        self.option.clear().await
    }
}
