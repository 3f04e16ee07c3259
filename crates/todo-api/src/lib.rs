//! HTTP API（axum）
//!
//! `/todos` 配下はすべて Bearer トークン必須。Todo は呼び出しユーザーの所有分のみ扱う。

pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod state;
pub mod users;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;
pub use users::UserService;

/// ルータを構築して返します。
pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/todos",
            get(handlers::todos::list_todos).post(handlers::todos::create_todo),
        )
        .route(
            "/todos/:id",
            get(handlers::todos::get_todo)
                .put(handlers::todos::update_todo)
                .delete(handlers::todos::delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
