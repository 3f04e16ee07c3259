//! Todo 管理サービス
//!
//! すべての操作は呼び出しユーザーで絞り込まれる。他ユーザーの Todo は
//! 存在しないものとして扱う（NotFound と区別しない）。

use crate::errors::{DomainError, DomainResult};
use crate::repository::TodoRepository;
use crate::todo::{Todo, TodoFilter, TodoId, TodoPatch};
use crate::user::UserId;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct TodoService {
    repo: Arc<dyn TodoRepository>,
}

impl TodoService {
    pub fn new(repo: Arc<dyn TodoRepository>) -> Self {
        Self { repo }
    }

    /// 一覧取得。filter の全分岐で所有者条件を適用する。
    pub async fn list(&self, filter: TodoFilter, caller: &UserId) -> DomainResult<Vec<Todo>> {
        let todos = self.repo.list(caller, filter).await?;
        debug!(
            user_id = %caller,
            filter = %filter,
            count = todos.len(),
            "Listed todos"
        );
        Ok(todos)
    }

    pub async fn get(&self, id: &TodoId, caller: &UserId) -> DomainResult<Todo> {
        match self.repo.find(id, caller).await? {
            Some(todo) => Ok(todo),
            None => {
                warn!(user_id = %caller, todo_id = %id, "Todo not found");
                Err(DomainError::NotFound)
            }
        }
    }

    /// タイトルの重複は許可する
    pub async fn create(&self, title: impl Into<String>, caller: &UserId) -> DomainResult<Todo> {
        let todo = Todo::new(title, caller.clone());
        self.repo.insert(&todo).await?;
        info!(user_id = %caller, todo_id = %todo.id, "Todo created");
        Ok(todo)
    }

    /// 指定フィールドのみ更新する。対象は `get` と同じ条件で解決する。
    pub async fn update(
        &self,
        id: &TodoId,
        patch: TodoPatch,
        caller: &UserId,
    ) -> DomainResult<Todo> {
        let mut todo = self.get(id, caller).await?;
        if patch.is_empty() {
            return Ok(todo);
        }

        todo.apply_patch(patch);
        // 取得と更新の間に削除された場合
        if self.repo.update(&todo).await? == 0 {
            warn!(user_id = %caller, todo_id = %id, "Todo vanished before update");
            return Err(DomainError::NotFound);
        }

        info!(
            user_id = %caller,
            todo_id = %id,
            completed = todo.completed,
            "Todo updated"
        );
        Ok(todo)
    }

    pub async fn delete(&self, id: &TodoId, caller: &UserId) -> DomainResult<()> {
        let affected = self.repo.delete(id, caller).await?;
        if affected == 0 {
            warn!(user_id = %caller, todo_id = %id, "Todo not found for delete");
            return Err(DomainError::NotFound);
        }
        info!(user_id = %caller, todo_id = %id, "Todo deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// find は成功するが update/delete は常に 0 行を返すストア
    #[derive(Default)]
    struct VanishingRepo {
        todo: Mutex<Option<Todo>>,
    }

    #[async_trait]
    impl TodoRepository for VanishingRepo {
        async fn list(&self, _owner: &UserId, _filter: TodoFilter) -> DomainResult<Vec<Todo>> {
            Ok(vec![])
        }

        async fn find(&self, _id: &TodoId, _owner: &UserId) -> DomainResult<Option<Todo>> {
            Ok(self.todo.lock().unwrap().clone())
        }

        async fn insert(&self, todo: &Todo) -> DomainResult<()> {
            *self.todo.lock().unwrap() = Some(todo.clone());
            Ok(())
        }

        async fn update(&self, _todo: &Todo) -> DomainResult<u64> {
            Ok(0)
        }

        async fn delete(&self, _id: &TodoId, _owner: &UserId) -> DomainResult<u64> {
            Ok(0)
        }
    }

    struct BrokenRepo;

    #[async_trait]
    impl TodoRepository for BrokenRepo {
        async fn list(&self, _owner: &UserId, _filter: TodoFilter) -> DomainResult<Vec<Todo>> {
            Err(DomainError::Storage("disk full".into()))
        }

        async fn find(&self, _id: &TodoId, _owner: &UserId) -> DomainResult<Option<Todo>> {
            Err(DomainError::Storage("disk full".into()))
        }

        async fn insert(&self, _todo: &Todo) -> DomainResult<()> {
            Err(DomainError::Storage("disk full".into()))
        }

        async fn update(&self, _todo: &Todo) -> DomainResult<u64> {
            Err(DomainError::Storage("disk full".into()))
        }

        async fn delete(&self, _id: &TodoId, _owner: &UserId) -> DomainResult<u64> {
            Err(DomainError::Storage("disk full".into()))
        }
    }

    #[tokio::test]
    async fn update_reports_not_found_when_row_disappears() {
        let service = TodoService::new(Arc::new(VanishingRepo::default()));
        let user = UserId::new();
        let todo = service.create("task", &user).await.unwrap();

        let err = service
            .update(
                &todo.id,
                TodoPatch {
                    title: None,
                    completed: Some(true),
                },
                &user,
            )
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[tokio::test]
    async fn empty_patch_returns_record_without_writing() {
        let service = TodoService::new(Arc::new(VanishingRepo::default()));
        let user = UserId::new();
        let todo = service.create("task", &user).await.unwrap();

        // update が呼ばれれば 0 行で NotFound になるはず
        let same = service
            .update(&todo.id, TodoPatch::default(), &user)
            .await
            .unwrap();
        assert_eq!(same, todo);
    }

    #[tokio::test]
    async fn delete_with_zero_rows_is_not_found() {
        let service = TodoService::new(Arc::new(VanishingRepo::default()));
        let err = service
            .delete(&TodoId::new(), &UserId::new())
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[tokio::test]
    async fn storage_errors_propagate_unchanged() {
        let service = TodoService::new(Arc::new(BrokenRepo));
        let user = UserId::new();

        let expected = DomainError::Storage("disk full".into());
        assert_eq!(
            service.list(TodoFilter::All, &user).await.unwrap_err(),
            expected
        );
        assert_eq!(service.create("x", &user).await.unwrap_err(), expected);
        assert_eq!(
            service.get(&TodoId::new(), &user).await.unwrap_err(),
            expected
        );
        assert_eq!(
            service.delete(&TodoId::new(), &user).await.unwrap_err(),
            expected
        );
    }
}
