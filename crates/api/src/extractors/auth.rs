use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use drivebridge_services::auth::Claims;

use crate::{error::ApiError, state::AppState};

/// An authenticated caller allowed to administer the Drive connection.
/// Token comes from the Authorization header or the `access_token` cookie.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Try Authorization header first
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|s| s.to_string())
            // Then try cookie
            .or_else(|| {
                parts
                    .headers
                    .get(header::COOKIE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|cookies| {
                        cookies.split(';').find_map(|cookie| {
                            cookie
                                .trim()
                                .strip_prefix("access_token=")
                                .map(|s| s.to_string())
                        })
                    })
            })
            .ok_or_else(|| {
                ApiError::Unauthorized("You are not currently logged in.".to_string())
            })?;

        let claims = state.auth.verify_token(&token)?;

        if !claims.role.can_administer() {
            return Err(ApiError::Forbidden(
                "Sorry, you are not allowed to do that.".to_string(),
            ));
        }

        Ok(AdminUser {
            username: claims.sub.clone(),
            claims,
        })
    }
}
