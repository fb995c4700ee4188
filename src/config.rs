/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, JWT_SECRET, CORS 許可、token 寿命など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::services::auth::token::{TokenSettings, ttl_in_range};

const DEFAULT_ISSUER: &str = "paperless.dev";
const ACCESS_TOKEN_TTL_SECONDS: u64 = 24 * 60 * 60; // 24h
const REFRESH_TOKEN_TTL_SECONDS: u64 = 30 * 24 * 60 * 60; // 30 days

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub http_body_limit_bytes: usize,
    pub http_timeout_seconds: u64,

    pub sqids_min_length: usize,
    pub sqids_alphabet: String,

    pub jwt_secret: String,
    pub auth_issuer: String,
    pub auth_audience: String,
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
    pub token_leeway_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // database_url / jwt_secret は伏せる
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("http_body_limit_bytes", &self.http_body_limit_bytes)
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .field("auth_issuer", &self.auth_issuer)
            .field("auth_audience", &self.auth_audience)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("token_leeway_seconds", &self.token_leeway_seconds)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (env in production, a map in tests).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match get("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let app_env = get("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let http_body_limit_bytes = get("HTTP_BODY_LIMIT_BYTES")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);
        let http_timeout_seconds = parse_seconds(&get, "HTTP_TIMEOUT_SECONDS", 30)?;

        let sqids_min_length = get("SQIDS_MIN_LENGTH")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);

        let sqids_alphabet = get("SQIDS_ALPHABET").unwrap_or_else(|| {
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string()
        });

        // Fail fast: a server without a signing secret must not start.
        let jwt_secret = get("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let auth_issuer = get("AUTH_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string());
        let auth_audience = get("AUTH_AUDIENCE").unwrap_or_else(|| DEFAULT_ISSUER.to_string());

        let access_token_ttl_seconds =
            parse_ttl(&get, "ACCESS_TOKEN_TTL_SECONDS", ACCESS_TOKEN_TTL_SECONDS)?;
        let refresh_token_ttl_seconds =
            parse_ttl(&get, "REFRESH_TOKEN_TTL_SECONDS", REFRESH_TOKEN_TTL_SECONDS)?;
        let token_leeway_seconds = parse_seconds(&get, "TOKEN_LEEWAY_SECONDS", 0)?;

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            http_body_limit_bytes,
            http_timeout_seconds,
            sqids_min_length,
            sqids_alphabet,
            jwt_secret,
            auth_issuer,
            auth_audience,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            token_leeway_seconds,
        })
    }

    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings {
            secret: self.jwt_secret.clone(),
            issuer: self.auth_issuer.clone(),
            audience: self.auth_audience.clone(),
            access_ttl_seconds: self.access_token_ttl_seconds,
            refresh_ttl_seconds: self.refresh_token_ttl_seconds,
            leeway_seconds: self.token_leeway_seconds,
        }
    }
}

fn parse_seconds<F>(get: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(v) => v.parse::<u64>().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_ttl<F>(get: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let seconds = parse_seconds(get, key, default)?;
    if !ttl_in_range(seconds) {
        return Err(ConfigError::Invalid(key));
    }
    Ok(seconds)
}
