use std::sync::Arc;

use chrono::{Duration, Utc};
use drivebridge_config::DriveSettings;
use drivebridge_db::{OptionStore, StoreResult};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{CredentialStore, Credentials, DriveError, TokenState, TokenStore};
use crate::cloud_storage::DriveClient;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Tokens this close to expiry are treated as expired.
    pub expiry_skew: Duration,
}

impl From<&DriveSettings> for SessionConfig {
    fn from(settings: &DriveSettings) -> Self {
        Self {
            redirect_uri: settings.redirect_uri.clone(),
            scopes: settings.scopes.clone(),
            expiry_skew: Duration::seconds(settings.expiry_skew_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub has_credentials: bool,
    pub authenticated: bool,
}

/// Owns the OAuth lifecycle of the single connected Drive account.
pub struct SessionManager {
    client: Arc<dyn DriveClient>,
    credentials: CredentialStore,
    tokens: TokenStore,
    config: SessionConfig,
    refresh_lock: Mutex<()>,
}

impl SessionManager {
    pub fn new(
        client: Arc<dyn DriveClient>,
        store: Arc<dyn OptionStore>,
        config: SessionConfig,
    ) -> Self {
        Self {
            client,
            credentials: CredentialStore::new(store.clone()),
            tokens: TokenStore::new(store),
            config,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Builds the provider consent URL. Makes no network call.
    pub async fn start_auth(&self) -> Result<String, DriveError> {
        let credentials = self.load_credentials().await?;
        Ok(self
            .client
            .build_auth_url(&credentials, &self.config.redirect_uri, &self.config.scopes))
    }

    /// Exchanges an authorization code and stores the resulting tokens. The
    /// previous token state is left alone if anything fails.
    pub async fn handle_callback(&self, code: &str) -> Result<(), DriveError> {
        let credentials = self.load_credentials().await.map_err(|_| {
            DriveError::TokenExchangeFailed("client credentials are not configured".to_string())
        })?;

        // Serialized with refresh so a refresh running on the old grant can
        // neither overwrite nor clear the new one.
        let _guard = self.refresh_lock.lock().await;

        let grant = self
            .client
            .exchange_code(&credentials, code, &self.config.redirect_uri)
            .await
            .map_err(|e| {
                warn!(error = %e, "Authorization code exchange failed");
                DriveError::TokenExchangeFailed(e.to_string())
            })?;

        let state = TokenState::from_grant(grant, None, Utc::now())
            .map_err(|e| DriveError::TokenExchangeFailed(e.to_string()))?;

        self.tokens.save(&state).await.map_err(|e| {
            warn!(error = %e, "Failed to store exchanged token");
            DriveError::TokenExchangeFailed(format!("failed to store token: {}", e))
        })?;

        info!(expires_at = %state.expires_at, "Google Drive authorization completed");
        Ok(())
    }

    /// Returns an access token that is not expired, refreshing it first if
    /// needed. Never-authorized, unreadable and revoked states all surface as
    /// [`DriveError::NoAccessToken`].
    pub async fn ensure_valid_token(&self) -> Result<String, DriveError> {
        let state = self.load_token().await?;
        if !state.is_expired(Utc::now(), self.config.expiry_skew) {
            return Ok(state.access_token);
        }

        // At most one refresh in flight. Whoever waited re-reads the state
        // and uses the token the first caller stored.
        let _guard = self.refresh_lock.lock().await;

        let state = self.load_token().await?;
        if !state.is_expired(Utc::now(), self.config.expiry_skew) {
            debug!("Token was refreshed by a concurrent request");
            return Ok(state.access_token);
        }

        match self.refresh(&state).await {
            Ok(refreshed) => Ok(refreshed.access_token),
            Err(reason) => {
                warn!(%reason, "Token refresh failed");
                self.clear_if_unchanged(&state.refresh_token).await;
                Err(DriveError::NoAccessToken)
            }
        }
    }

    pub async fn status(&self) -> SessionStatus {
        let has_credentials = matches!(self.credentials.load().await, Ok(Some(_)));
        let authenticated = matches!(self.tokens.load().await, Ok(Some(_)));
        SessionStatus {
            has_credentials,
            authenticated,
        }
    }

    /// Forgets the stored tokens. Credentials are kept.
    pub async fn disconnect(&self) -> StoreResult<bool> {
        let _guard = self.refresh_lock.lock().await;
        let removed = self.tokens.clear().await?;
        if removed {
            info!("Google Drive disconnected");
        }
        Ok(removed)
    }

    async fn refresh(&self, state: &TokenState) -> Result<TokenState, String> {
        let credentials = match self.credentials.load().await {
            Ok(Some(credentials)) => credentials,
            Ok(None) => return Err("client credentials are not configured".to_string()),
            Err(e) => return Err(e.to_string()),
        };

        let grant = self
            .client
            .refresh_token(&credentials, &state.refresh_token)
            .await
            .map_err(|e| e.to_string())?;

        let refreshed = TokenState::from_grant(grant, Some(&state.refresh_token), Utc::now())
            .map_err(|e| e.to_string())?;

        self.tokens.save(&refreshed).await.map_err(|e| e.to_string())?;

        info!(expires_at = %refreshed.expires_at, "Access token refreshed");
        Ok(refreshed)
    }

    /// Clears the stored token only while it still carries `refresh_token`.
    async fn clear_if_unchanged(&self, refresh_token: &str) {
        match self.tokens.load().await {
            Ok(Some(current)) if current.refresh_token != refresh_token => {
                debug!("Stored token was replaced during refresh, keeping it");
            }
            Ok(None) => {}
            _ => {
                if let Err(e) = self.tokens.clear().await {
                    warn!(error = %e, "Failed to clear stored token");
                }
            }
        }
    }

    async fn load_credentials(&self) -> Result<Credentials, DriveError> {
        match self.credentials.load().await {
            Ok(Some(credentials)) => Ok(credentials),
            Ok(None) => Err(DriveError::MissingCredentials),
            Err(e) => {
                warn!(error = %e, "Stored credentials are unreadable");
                Err(DriveError::MissingCredentials)
            }
        }
    }

    async fn load_token(&self) -> Result<TokenState, DriveError> {
        match self.tokens.load().await {
            Ok(Some(state)) => Ok(state),
            Ok(None) => Err(DriveError::NoAccessToken),
            Err(e) => {
                warn!(error = %e, "Stored token is unreadable");
                Err(DriveError::NoAccessToken)
            }
        }
    }
}
