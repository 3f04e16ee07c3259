//! SQLite 接続の初期化
//!
//! 接続時にマイグレーションを適用し、外部キー制約を有効にする。

use domain::DomainError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{error, info};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// `sqlite://todo.db` 形式の URL で接続する（ファイルがなければ作成）
    pub async fn connect(url: &str) -> Result<Self, DomainError> {
        info!(url = %url, "Opening database");

        let options = SqliteConnectOptions::from_str(url)
            .map_err(storage_error)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(storage_error)?;

        Self::migrate(pool).await
    }

    /// テスト・ローカル実行用のインメモリ DB
    ///
    /// `sqlite::memory:` は接続ごとに別 DB になるため、接続は 1 本に固定し破棄しない。
    pub async fn in_memory() -> Result<Self, DomainError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(storage_error)?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(storage_error)?;

        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self, DomainError> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Migration failed");
                DomainError::Storage(format!("Migration failed: {e}"))
            })?;

        info!("Database ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// sqlx のエラーをドメインエラーへ変換（詳細はログのみに残す）
pub(crate) fn storage_error(err: sqlx::Error) -> DomainError {
    error!(error = %err, "Database error");
    DomainError::Storage(err.to_string())
}
