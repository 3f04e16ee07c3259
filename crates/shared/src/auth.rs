use chrono::{Duration, Utc};
use domain::{DomainError, User, UserId};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, DomainError> {
        UserId::from_string(self.sub.clone())
            .map_err(|_| DomainError::Unauthenticated("Invalid token subject".to_string()))
    }
}

/// HS256 アクセストークンの発行と検証
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            // 範囲外は `issue` 側で Storage エラーにする
            ttl: Duration::try_seconds(ttl_secs).unwrap_or(Duration::MAX),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, DomainError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| DomainError::Storage("Token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| DomainError::Storage(format!("Failed to sign token: {e}")))
    }

    /// 署名・有効期限を検証してクレームを返す
    pub fn verify(&self, token: &str) -> Result<Claims, DomainError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                warn!(error = %e, "JWT トークン検証失敗");
                DomainError::Unauthenticated("Invalid or expired token".to_string())
            })
    }
}

/// `Authorization` ヘッダーから Bearer トークンを取り出す（スキーム名は大文字小文字を区別しない）
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("alice", "alice@example.com", "hash")
    }

    #[test]
    fn issued_token_verifies_and_carries_user_id() {
        let issuer = TokenIssuer::new(b"secret", 3600);
        let user = user();

        let token = issuer.issue(&user).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenIssuer::new(b"one", 3600).issue(&user()).unwrap();
        let err = TokenIssuer::new(b"two", 3600).verify(&token).unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        // 既定の leeway（60 秒）を超えて期限切れ
        let issuer = TokenIssuer::new(b"secret", -3600);
        let token = issuer.issue(&user()).unwrap();
        assert!(matches!(
            issuer.verify(&token),
            Err(DomainError::Unauthenticated(_))
        ));
    }

    #[test]
    fn overflowing_ttl_is_an_error_not_a_panic() {
        let issuer = TokenIssuer::new(b"secret", 9_000_000_000_000_000);
        assert!(matches!(
            issuer.issue(&user()),
            Err(DomainError::Storage(_))
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let issuer = TokenIssuer::new(b"secret", 3600);
        assert!(issuer.verify("not.a.jwt").is_err());
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("BEARER abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearerabc.def"), None);
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token("abc.def"), None);
    }
}
