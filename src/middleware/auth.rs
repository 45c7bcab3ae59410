use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::error::error_body;
use crate::services::identity::IdentityError;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidToken)?;

        let identity = state.identity.verify(token).await.map_err(|e| match e {
            IdentityError::Rejected => AuthError::InvalidToken,
            IdentityError::Unavailable(reason) => {
                tracing::error!("Identity provider unavailable: {}", reason);
                AuthError::ProviderUnavailable
            }
        })?;

        Ok(AuthUser {
            user_id: identity.user_id,
        })
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ProviderUnavailable,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Authorization token is required",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid or expired authorization token",
            ),
            AuthError::ProviderUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "auth_unavailable",
                "Authentication service is unavailable",
            ),
        };

        error_body(status, code, message)
    }
}
