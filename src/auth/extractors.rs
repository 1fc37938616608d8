use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::services::CredentialManager;
use crate::error::AppError;

fn bearer_token(parts: &Parts) -> Option<Result<&str, AppError>> {
    let header = parts.headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok().and_then(|auth| {
        auth.strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
    });
    Some(token.map(str::trim).ok_or_else(|| {
        warn!("invalid auth scheme");
        AppError::InvalidToken
    }))
}

/// Extracts and validates the bearer token, returning the user ID.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    CredentialManager: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            warn!("missing Authorization header");
            AppError::InvalidToken
        })??;
        let user_id = CredentialManager::from_ref(state).validate_token(token)?;
        Ok(AuthUser(user_id))
    }
}

/// Like [`AuthUser`], but a request without an `Authorization` header is
/// anonymous instead of rejected.
pub struct MaybeAuthUser(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    CredentialManager: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            None => Ok(MaybeAuthUser(None)),
            Some(token) => {
                let user_id = CredentialManager::from_ref(state).validate_token(token?)?;
                Ok(MaybeAuthUser(Some(user_id)))
            }
        }
    }
}
