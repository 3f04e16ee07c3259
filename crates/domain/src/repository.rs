//! 永続化層の抽象
//!
//! Todo 系の操作はすべて所有者で絞り込む。所有者条件を持たない検索は提供しない。

use crate::errors::DomainResult;
use crate::todo::{Todo, TodoFilter, TodoId};
use crate::user::{User, UserId};
use async_trait::async_trait;

#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// 所有者の Todo を取得（順序はストアの既定順）
    async fn list(&self, owner: &UserId, filter: TodoFilter) -> DomainResult<Vec<Todo>>;

    /// id と所有者の両方が一致するものだけを返す
    async fn find(&self, id: &TodoId, owner: &UserId) -> DomainResult<Option<Todo>>;

    async fn insert(&self, todo: &Todo) -> DomainResult<()>;

    /// title / completed を保存し、影響行数を返す
    async fn update(&self, todo: &Todo) -> DomainResult<u64>;

    /// 影響行数を返す（0 = 該当なし）
    async fn delete(&self, id: &TodoId, owner: &UserId) -> DomainResult<u64>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// メールアドレス重複時は `DomainError::Conflict`
    async fn insert(&self, user: &User) -> DomainResult<()>;

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    async fn find_by_id(&self, id: &UserId) -> DomainResult<Option<User>>;
}
