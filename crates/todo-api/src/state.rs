use crate::users::UserService;
use domain::{TodoRepository, TodoService, UserRepository};
use shared::TokenIssuer;
use std::sync::Arc;

/// アプリケーションの共有状態
/// ストアは起動時に明示的に構築して渡す。
#[derive(Clone)]
pub struct AppState {
    pub todos: TodoService,
    pub users: UserService,
}

impl AppState {
    pub fn new(
        todo_repo: Arc<dyn TodoRepository>,
        user_repo: Arc<dyn UserRepository>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            todos: TodoService::new(todo_repo),
            users: UserService::new(user_repo, tokens),
        }
    }
}
