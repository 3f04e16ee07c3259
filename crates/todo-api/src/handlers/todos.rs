use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, AuthUser};
use crate::models::{CreateTodoRequest, ListTodosQuery, TodoView, TodosResponse, UpdateTodoRequest};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{TodoFilter, TodoId, TodoPatch};

pub async fn list_todos(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiQuery(query): ApiQuery<ListTodosQuery>,
) -> Result<Json<TodosResponse>, ApiError> {
    let filter = match query.filter.as_deref() {
        Some(raw) => raw.parse::<TodoFilter>()?,
        None => TodoFilter::All,
    };

    let todos = state.todos.list(filter, &user_id).await?;
    Ok(Json(TodosResponse::from(todos)))
}

pub async fn get_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TodoView>, ApiError> {
    let todo = state.todos.get(&TodoId::from_string(id), &user_id).await?;
    Ok(Json(todo.into()))
}

pub async fn create_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(input): ApiJson<CreateTodoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if input.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
    }

    let todo = state.todos.create(input.title, &user_id).await?;
    Ok((StatusCode::CREATED, Json(TodoView::from(todo))))
}

pub async fn update_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateTodoRequest>,
) -> Result<Json<TodoView>, ApiError> {
    if matches!(input.title.as_deref(), Some(title) if title.trim().is_empty()) {
        return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
    }

    let patch = TodoPatch::from(input);
    let todo = state
        .todos
        .update(&TodoId::from_string(id), patch, &user_id)
        .await?;
    Ok(Json(todo.into()))
}

/// 成功時は 200 と空ボディ
pub async fn delete_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .todos
        .delete(&TodoId::from_string(id), &user_id)
        .await?;
    Ok(StatusCode::OK)
}
