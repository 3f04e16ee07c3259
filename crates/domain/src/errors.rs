use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// ドメイン層のエラー
///
/// 所有者が異なる Todo へのアクセスも `NotFound` として扱い、
/// 他ユーザーのデータの存在を漏らさない。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Todo not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    // ユーザー登録時のメールアドレス重複
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// クライアント起因のエラーかどうか
    pub fn is_client_error(&self) -> bool {
        !matches!(self, DomainError::Storage(_))
    }
}
