use crate::db::{storage_error, Database};
use async_trait::async_trait;
use domain::{DomainError, DomainResult, User, UserId, UserRepository};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::warn;

const USER_SELECT_SQL: &str = "SELECT id, username, email, password_hash FROM users";

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert(&self, user: &User) -> DomainResult<()> {
        let result = sqlx::query(
            "INSERT INTO users (id, username, email, password_hash) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(user.id.as_str())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // email の UNIQUE 制約
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                warn!(email = %user.email, "Duplicate email on insert");
                Err(DomainError::Conflict(
                    "User with this email already exists".to_string(),
                ))
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query(&format!("{USER_SELECT_SQL} WHERE email = ?1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(parse_user_row).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> DomainResult<Option<User>> {
        let row = sqlx::query(&format!("{USER_SELECT_SQL} WHERE id = ?1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(parse_user_row).transpose()
    }
}

fn parse_user_row(row: &SqliteRow) -> DomainResult<User> {
    let id: String = row.try_get("id").map_err(storage_error)?;

    Ok(User {
        id: UserId::from_string(id)?,
        username: row.try_get("username").map_err(storage_error)?,
        email: row.try_get("email").map_err(storage_error)?,
        password_hash: row.try_get("password_hash").map_err(storage_error)?,
    })
}
