//! ユーザー登録・ログイン・トークン認証

use domain::{DomainError, DomainResult, User, UserId, UserRepository};
use once_cell::sync::OnceCell;
use shared::{hash_password, verify_password, TokenIssuer};
use std::sync::Arc;
use tracing::{info, warn};

const MIN_PASSWORD_LEN: usize = 8;

/// 未登録メールでのログイン時に検証するハッシュ（初回に生成）
static DUMMY_HASH: OnceCell<String> = OnceCell::new();

fn dummy_hash() -> DomainResult<&'static str> {
    DUMMY_HASH
        .get_or_try_init(|| hash_password("dummy-password-for-unknown-users"))
        .map(String::as_str)
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    tokens: TokenIssuer,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, tokens: TokenIssuer) -> Self {
        Self { repo, tokens }
    }

    /// メールアドレスは前後空白を除いて小文字で保存する
    pub async fn register(&self, username: &str, email: &str, password: &str) -> DomainResult<User> {
        let username = username.trim();
        let email = normalize_email(email);

        if username.is_empty() {
            return Err(DomainError::Validation("Username cannot be empty".into()));
        }
        if !email.contains('@') {
            return Err(DomainError::Validation(format!("Invalid email: {email}")));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.repo.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "Registration with existing email");
            return Err(DomainError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| DomainError::Storage(format!("Hashing task failed: {e}")))??;

        let user = User::new(username, email, password_hash);
        self.repo.insert(&user).await?;
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// 成功時はアクセストークンを返す。メール不明とパスワード不一致は区別しない。
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<String> {
        let invalid = || DomainError::Unauthenticated("Invalid credentials".to_string());

        let email = normalize_email(email);
        let password = password.to_string();

        let Some(user) = self.repo.find_by_email(&email).await? else {
            // 登録有無で応答時間が変わらないよう同じコストの検証を行う
            let _ = tokio::task::spawn_blocking(move || {
                dummy_hash().map(|hash| verify_password(&password, hash))
            })
            .await;
            return Err(invalid());
        };

        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| DomainError::Storage(format!("Verification task failed: {e}")))?;
        if !matches {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(invalid());
        }

        let token = self.tokens.issue(&user)?;
        info!(user_id = %user.id, "User logged in");
        Ok(token)
    }

    /// トークンを検証し、対象ユーザーが現存することも確認する
    pub async fn authenticate(&self, token: &str) -> DomainResult<UserId> {
        let claims = self.tokens.verify(token)?;
        let user_id = claims.user_id()?;

        match self.repo.find_by_id(&user_id).await? {
            Some(user) => Ok(user.id),
            None => {
                warn!(user_id = %user_id, "Token subject no longer exists");
                Err(DomainError::Unauthenticated("Unknown user".to_string()))
            }
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
