use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::accounts::repo::StoreError;

/// Every failure a flow can report to its caller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("password and confirmation do not match")]
    PasswordMismatch,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid password")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn missing(field: &str) -> Self {
        AppError::Validation(format!("{field} is required"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PasswordMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AppError::DuplicateEmail,
            StoreError::Other(e) => AppError::Internal(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_distinct_status() {
        let errors = [
            AppError::missing("name"),
            AppError::PasswordMismatch,
            AppError::DuplicateEmail,
            AppError::UserNotFound,
            AppError::InvalidCredentials,
            AppError::InvalidToken,
            AppError::Internal(anyhow::anyhow!("boom")),
        ];
        let mut statuses: Vec<u16> = errors.iter().map(|e| e.status().as_u16()).collect();
        statuses.sort_unstable();
        statuses.dedup();
        assert_eq!(statuses.len(), errors.len());
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let resp = AppError::Internal(anyhow::anyhow!("connection refused on 10.0.0.3")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "internal server error");
    }

    #[test]
    fn validation_message_names_field() {
        assert_eq!(AppError::missing("phone").to_string(), "phone is required");
    }

    #[test]
    fn store_duplicate_maps_to_duplicate_email() {
        let err: AppError = StoreError::DuplicateEmail.into();
        assert!(matches!(err, AppError::DuplicateEmail));
    }
}
