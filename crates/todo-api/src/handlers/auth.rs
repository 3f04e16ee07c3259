use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .register(&input.username, &input.email, &input.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let access_token = state.users.login(&input.email, &input.password).await?;
    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
    }))
}
