//! インメモリ実装（開発/テスト用）
//!
//! 各ストアは自身の `Mutex` で変更を直列化する。`.await` をまたいでロックを保持しない。

use async_trait::async_trait;
use domain::{
    DomainError, DomainResult, Todo, TodoFilter, TodoId, TodoRepository, User, UserId,
    UserRepository,
};
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> DomainResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| DomainError::Storage("in-memory store lock poisoned".to_string()))
}

/// 挿入順を保持する Todo ストア
#[derive(Default)]
pub struct InMemoryTodoRepository {
    todos: Mutex<Vec<Todo>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn list(&self, owner: &UserId, filter: TodoFilter) -> DomainResult<Vec<Todo>> {
        let todos = lock(&self.todos)?;
        Ok(todos
            .iter()
            .filter(|t| t.is_owned_by(owner) && filter.matches(t))
            .cloned()
            .collect())
    }

    async fn find(&self, id: &TodoId, owner: &UserId) -> DomainResult<Option<Todo>> {
        let todos = lock(&self.todos)?;
        Ok(todos
            .iter()
            .find(|t| &t.id == id && t.is_owned_by(owner))
            .cloned())
    }

    async fn insert(&self, todo: &Todo) -> DomainResult<()> {
        let mut todos = lock(&self.todos)?;
        if todos.iter().any(|t| t.id == todo.id) {
            return Err(DomainError::Storage(format!(
                "duplicate todo id {}",
                todo.id
            )));
        }
        todos.push(todo.clone());
        Ok(())
    }

    async fn update(&self, todo: &Todo) -> DomainResult<u64> {
        let mut todos = lock(&self.todos)?;
        match todos
            .iter_mut()
            .find(|t| t.id == todo.id && t.is_owned_by(&todo.owner))
        {
            Some(existing) => {
                existing.title = todo.title.clone();
                existing.completed = todo.completed;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: &TodoId, owner: &UserId) -> DomainResult<u64> {
        let mut todos = lock(&self.todos)?;
        let before = todos.len();
        todos.retain(|t| !(&t.id == id && t.is_owned_by(owner)));
        Ok((before - todos.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> DomainResult<()> {
        let mut users = lock(&self.users)?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let users = lock(&self.users)?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> DomainResult<Option<User>> {
        let users = lock(&self.users)?;
        Ok(users.iter().find(|u| &u.id == id).cloned())
    }
}
