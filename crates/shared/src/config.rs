use std::env;
use thiserror::Error;

const DEFAULT_JWT_SECRET: &str = "dev-only-insecure-secret";

/// トークン有効期間の上限（30 日）
pub const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("{0} must be set when ENVIRONMENT=prod")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// アクセストークンの有効期間（秒）
    pub token_ttl_secs: i64,
    pub port: u16,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 環境変数の取得元を差し替え可能にした版（テスト用）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string());

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == "prod" => return Err(ConfigError::Missing("JWT_SECRET")),
            None => DEFAULT_JWT_SECRET.to_string(),
        };

        Ok(Config {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://todo.db".to_string()),
            jwt_secret,
            token_ttl_secs: parse_token_ttl(&lookup)?,
            port: parse_or("PORT", &lookup, 3000)?,
            environment,
        })
    }
}

/// 1 秒以上 `MAX_TOKEN_TTL_SECS` 以下のみ受け付ける
fn parse_token_ttl<F>(lookup: &F) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let ttl: i64 = parse_or("TOKEN_TTL_SECS", lookup, 3600)?;
    if !(1..=MAX_TOKEN_TTL_SECS).contains(&ttl) {
        return Err(ConfigError::InvalidValue {
            name: "TOKEN_TTL_SECS",
            value: ttl.to_string(),
        });
    }
    Ok(ttl)
}

fn parse_or<T, F>(name: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}
