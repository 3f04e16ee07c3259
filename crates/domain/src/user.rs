use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ユーザーID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// 新しいユーザーIDを生成
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// 文字列からユーザーIDを作成
    pub fn from_string(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::Validation(
                "User ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ユーザーアカウント
///
/// パスワードはソルト付きハッシュ（PHC 文字列）のみ保持し、シリアライズしない。
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }
}

// ハッシュをログに出さない
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_rejects_blank() {
        assert!(UserId::from_string("   ").is_err());
        assert_eq!(UserId::from_string("u-1").unwrap().as_str(), "u-1");
    }

    #[test]
    fn test_password_hash_is_not_serialized_or_debug_printed() {
        let user = User::new("alice", "alice@example.com", "$argon2id$secret");

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("password_hash").is_none());

        let debug = format!("{user:?}");
        assert!(!debug.contains("argon2id"));
    }
}
