use crate::errors::DomainError;
use crate::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Todo の識別子（ULID 文字列）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    /// 外部入力（パスパラメータ等）から作成
    /// 形式は検証しない。存在しない ID は検索時に NotFound となる。
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ULID に埋め込まれた生成時刻（ミリ秒）
    pub fn timestamp_ms(&self) -> Option<u64> {
        Ulid::from_string(&self.0).ok().map(|ulid| ulid.timestamp_ms())
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Todo 本体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    /// 所有ユーザー（作成者）
    pub owner: UserId,
}

impl Todo {
    /// 新規 Todo を作成（completed=false, created_at=現在時刻）
    pub fn new(title: impl Into<String>, owner: UserId) -> Self {
        Self {
            id: TodoId::new(),
            title: title.into(),
            completed: false,
            created_at: Utc::now(),
            owner,
        }
    }

    /// 指定されたフィールドのみ上書きする
    /// id / created_at / owner は変更しない
    pub fn apply_patch(&mut self, patch: TodoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }
}

/// 部分更新の内容
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

/// 一覧取得時の絞り込み条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoFilter {
    /// 指定なし
    #[default]
    All,
    /// 未完了のみ
    Active,
    /// 完了済みのみ
    Completed,
}

impl TodoFilter {
    /// completed カラムに対する条件。`All` は条件なし。
    pub fn completed(self) -> Option<bool> {
        match self {
            TodoFilter::All => None,
            TodoFilter::Active => Some(false),
            TodoFilter::Completed => Some(true),
        }
    }

    pub fn matches(self, todo: &Todo) -> bool {
        self.completed()
            .map_or(true, |completed| todo.completed == completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TodoFilter::All => "all",
            TodoFilter::Active => "active",
            TodoFilter::Completed => "completed",
        }
    }
}

impl FromStr for TodoFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(TodoFilter::All),
            "active" => Ok(TodoFilter::Active),
            "completed" => Ok(TodoFilter::Completed),
            other => Err(DomainError::Validation(format!(
                "Unknown filter '{other}', expected 'active' or 'completed'"
            ))),
        }
    }
}

impl fmt::Display for TodoFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
