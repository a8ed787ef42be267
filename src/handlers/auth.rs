use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::json_body;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::services::auth::{LoginRequest, RegisterRequest};

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = json_body(body)?;
    let response = state.auth.register(&request).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = json_body(body)?;
    let response = state.auth.login(&request).await?;

    Ok(Json(response))
}

pub async fn available_names(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.auth.available_names().await?))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth.current_user(user.id).await?;

    Ok(Json(json!({ "user": user })))
}
