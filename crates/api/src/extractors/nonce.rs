use axum::{extract::FromRequestParts, http::request::Parts};

use super::auth::AdminUser;
use crate::{error::ApiError, state::AppState};

pub const NONCE_HEADER: &str = "x-drive-nonce";
pub const NONCE_ACTION: &str = "drive";

/// An [`AdminUser`] whose request also carries a valid nonce. Required on
/// every state-changing route.
#[derive(Debug, Clone)]
pub struct NonceVerified(pub AdminUser);

impl FromRequestParts<AppState> for NonceVerified {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let admin = AdminUser::from_request_parts(parts, state).await?;

        let nonce = parts
            .headers
            .get(NONCE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::InvalidNonce)?;

        if !state.nonces.verify(nonce, &admin.username, NONCE_ACTION) {
            return Err(ApiError::InvalidNonce);
        }

        Ok(NonceVerified(admin))
    }
}
