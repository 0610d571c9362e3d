//! Token Extractor
//!
//! Resolves `Authorization` headers to a [`CurrentUser`] in protected handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::{AppError, ErrorCode};

use crate::auth::{CurrentUser, extract_token};
use crate::core::ServerState;
use crate::db::repository::auth_token;
use crate::security_log;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => extract_token(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                return Err(AppError::not_authenticated());
            }
        };

        let user = auth_token::find_user(&state.pool, token).await?;
        match user {
            Some(user) if user.is_active => {
                let current = CurrentUser(user);
                parts.extensions.insert(current.clone());
                Ok(current)
            }
            Some(user) => {
                security_log!("WARN", "auth_inactive", user_id = user.id);
                Err(AppError::with_message(
                    ErrorCode::AccountDisabled,
                    "User inactive or deleted.",
                ))
            }
            None => {
                security_log!("WARN", "auth_failed", uri = format!("{:?}", parts.uri));
                Err(AppError::invalid_token("Invalid token."))
            }
        }
    }
}
