use crate::db::{storage_error, Database};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{DomainError, DomainResult, Todo, TodoFilter, TodoId, TodoRepository, UserId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const TODO_SELECT_SQL: &str = "SELECT id, title, completed, created_at, user_id FROM todos";

/// SQLite 版 Todo リポジトリ
///
/// すべての文に `user_id = ?` 条件を付ける。
#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn list(&self, owner: &UserId, filter: TodoFilter) -> DomainResult<Vec<Todo>> {
        let rows = match filter.completed() {
            None => {
                sqlx::query(&format!("{TODO_SELECT_SQL} WHERE user_id = ?1"))
                    .bind(owner.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            Some(completed) => {
                sqlx::query(&format!(
                    "{TODO_SELECT_SQL} WHERE user_id = ?1 AND completed = ?2"
                ))
                .bind(owner.as_str())
                .bind(completed)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(storage_error)?;

        rows.iter().map(parse_todo_row).collect()
    }

    async fn find(&self, id: &TodoId, owner: &UserId) -> DomainResult<Option<Todo>> {
        let row = sqlx::query(&format!("{TODO_SELECT_SQL} WHERE id = ?1 AND user_id = ?2"))
            .bind(id.as_str())
            .bind(owner.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(parse_todo_row).transpose()
    }

    async fn insert(&self, todo: &Todo) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO todos (id, title, completed, created_at, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(todo.id.as_str())
        .bind(&todo.title)
        .bind(todo.completed)
        .bind(todo.created_at.to_rfc3339())
        .bind(todo.owner.as_str())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn update(&self, todo: &Todo) -> DomainResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE todos SET
                title = ?3,
                completed = ?4
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(todo.id.as_str())
        .bind(todo.owner.as_str())
        .bind(&todo.title)
        .bind(todo.completed)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &TodoId, owner: &UserId) -> DomainResult<u64> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1 AND user_id = ?2")
            .bind(id.as_str())
            .bind(owner.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected())
    }
}

fn parse_todo_row(row: &SqliteRow) -> DomainResult<Todo> {
    let id: String = row.try_get("id").map_err(storage_error)?;
    let title: String = row.try_get("title").map_err(storage_error)?;
    let completed: bool = row.try_get("completed").map_err(storage_error)?;

    let created_at: String = row.try_get("created_at").map_err(storage_error)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| DomainError::Storage(format!("Invalid created_at '{created_at}': {e}")))?
        .with_timezone(&Utc);

    let user_id: String = row.try_get("user_id").map_err(storage_error)?;

    Ok(Todo {
        id: TodoId::from_string(id),
        title,
        completed,
        created_at,
        owner: UserId::from_string(user_id)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteUserRepository;
    use domain::{User, UserRepository};

    async fn setup() -> (Database, SqliteTodoRepository, UserId) {
        let db = Database::in_memory().await.unwrap();
        let users = SqliteUserRepository::new(&db);
        let user = User::new("alice", "alice@example.com", "hash");
        users.insert(&user).await.unwrap();
        (db.clone(), SqliteTodoRepository::new(&db), user.id)
    }

    #[tokio::test]
    async fn insert_then_find_round_trips_all_columns() {
        let (_db, repo, owner) = setup().await;
        let todo = Todo::new("buy milk", owner.clone());
        repo.insert(&todo).await.unwrap();

        let found = repo.find(&todo.id, &owner).await.unwrap();
        assert_eq!(found, Some(todo));
    }

    #[tokio::test]
    async fn find_requires_matching_owner() {
        let (_db, repo, owner) = setup().await;
        let todo = Todo::new("secret", owner);
        repo.insert(&todo).await.unwrap();

        let stranger = UserId::new();
        assert_eq!(repo.find(&todo.id, &stranger).await.unwrap(), None);
        assert_eq!(repo.delete(&todo.id, &stranger).await.unwrap(), 0);

        let mut hijacked = todo.clone();
        hijacked.owner = stranger;
        hijacked.title = "mine now".into();
        assert_eq!(repo.update(&hijacked).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_and_delete_report_rows_affected() {
        let (_db, repo, owner) = setup().await;
        let mut todo = Todo::new("task", owner.clone());
        repo.insert(&todo).await.unwrap();

        todo.completed = true;
        assert_eq!(repo.update(&todo).await.unwrap(), 1);
        let found = repo.find(&todo.id, &owner).await.unwrap().unwrap();
        assert!(found.completed);

        assert_eq!(repo.delete(&todo.id, &owner).await.unwrap(), 1);
        assert_eq!(repo.delete(&todo.id, &owner).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_applies_completed_filter_per_owner() {
        let (_db, repo, owner) = setup().await;
        let open = Todo::new("open", owner.clone());
        let mut done = Todo::new("done", owner.clone());
        done.completed = true;
        repo.insert(&open).await.unwrap();
        repo.insert(&done).await.unwrap();

        let all = repo.list(&owner, TodoFilter::All).await.unwrap();
        assert_eq!(all.len(), 2);

        let active = repo.list(&owner, TodoFilter::Active).await.unwrap();
        assert_eq!(active, vec![open]);

        let completed = repo.list(&owner, TodoFilter::Completed).await.unwrap();
        assert_eq!(completed, vec![done]);
    }

    #[tokio::test]
    async fn corrupt_timestamp_surfaces_as_storage_error() {
        let (db, repo, owner) = setup().await;
        sqlx::query(
            "INSERT INTO todos (id, title, completed, created_at, user_id) VALUES ('bad', 'x', 0, 'yesterday', ?1)",
        )
        .bind(owner.as_str())
        .execute(db.pool())
        .await
        .unwrap();

        let err = repo
            .find(&TodoId::from_string("bad"), &owner)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
