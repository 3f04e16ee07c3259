use chrono::{DateTime, Utc};
use domain::{Todo, TodoPatch};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl From<UpdateTodoRequest> for TodoPatch {
    fn from(req: UpdateTodoRequest) -> Self {
        TodoPatch {
            title: req.title,
            completed: req.completed,
        }
    }
}

/// GET /todos のクエリ
#[derive(Debug, Default, Deserialize)]
pub struct ListTodosQuery {
    pub filter: Option<String>,
}

/// Todo のレスポンス表現（所有者は含めない）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoView {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Todo> for TodoView {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id.as_str().to_string(),
            title: todo.title,
            completed: todo.completed,
            created_at: todo.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodosResponse {
    pub todos: Vec<TodoView>,
    pub total: usize,
}

impl From<Vec<Todo>> for TodosResponse {
    fn from(todos: Vec<Todo>) -> Self {
        let todos: Vec<TodoView> = todos.into_iter().map(TodoView::from).collect();
        Self {
            total: todos.len(),
            todos,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}
