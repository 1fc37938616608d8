use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{AuthResponse, EditUserRequest, EditUserResponse, LoginRequest, PublicUser, RegisterRequest},
    services,
};
use crate::{
    auth::{AuthUser, MaybeAuthUser},
    error::AppError,
    extract::JsonBody,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/checkuser", get(check_user))
        .route("/users/edit", patch(edit_user))
        .route("/users/:id", get(get_user_by_id))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let resp = services::register(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    Ok(Json(services::login(&state, payload).await?))
}

#[instrument(skip(state, payload))]
pub async fn edit_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<EditUserRequest>,
) -> Result<Json<EditUserResponse>, AppError> {
    Ok(Json(services::edit_user(&state, user_id, payload).await?))
}

#[instrument(skip(state))]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(services::get_user(&state, &id).await?))
}

#[instrument(skip(state))]
pub async fn check_user(
    State(state): State<AppState>,
    MaybeAuthUser(user_id): MaybeAuthUser,
) -> Result<Json<Option<PublicUser>>, AppError> {
    Ok(Json(services::check_user(&state, user_id).await?))
}
