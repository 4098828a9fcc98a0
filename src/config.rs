/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, JWT secrets/TTL, CORS 許可など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - secret は Debug に出さない
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

const DEV_JWT_SECRET: &str = "fallback-secret-change-in-production";
const DEV_JWT_REFRESH_SECRET: &str = "fallback-refresh-secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(std::env::var("APP_ENV").ok())
    }

    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
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
    pub app_env: AppEnv,

    pub database_url: String,
    pub database_max_connections: u32,
    pub database_acquire_timeout: Duration,
    pub redis_url: String,

    pub cors_allowed_origins: Vec<String>,

    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub auth_issuer: String,
    pub auth_audience: String,
    pub token_leeway_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print secrets (JWT keys, DB credentials in URLs)
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database_max_connections", &self.database_max_connections)
            .field("database_acquire_timeout", &self.database_acquire_timeout)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("auth_issuer", &self.auth_issuer)
            .field("auth_audience", &self.auth_audience)
            .field("token_leeway_seconds", &self.token_leeway_seconds)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (process env in production).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = get("PORT").and_then(|s| s.parse().ok()).unwrap_or(3001);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV"));

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let database_max_connections = get("DATABASE_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let database_acquire_timeout = Duration::from_secs(
            get("DATABASE_ACQUIRE_TIMEOUT_SECONDS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5),
        );

        let redis_url = get("REDIS_URL").unwrap_or_else(|| "redis://localhost:6379".to_string());

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .or_else(|| get("FRONTEND_URL"))
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret = non_empty(get("JWT_SECRET"));
        let jwt_refresh_secret = non_empty(get("JWT_REFRESH_SECRET"));

        if app_env.is_production() {
            if jwt_secret.is_none() {
                return Err(ConfigError::Missing("JWT_SECRET"));
            }
            if jwt_refresh_secret.is_none() {
                return Err(ConfigError::Missing("JWT_REFRESH_SECRET"));
            }
        } else if jwt_secret.is_none() || jwt_refresh_secret.is_none() {
            warn!("JWT secrets not configured, using fallback values. THIS IS INSECURE!");
        }

        let jwt_secret = jwt_secret.unwrap_or_else(|| DEV_JWT_SECRET.to_string());
        let jwt_refresh_secret =
            jwt_refresh_secret.unwrap_or_else(|| DEV_JWT_REFRESH_SECRET.to_string());

        // A shared secret would let one token kind pass the other's signature check.
        if jwt_secret == jwt_refresh_secret {
            return Err(ConfigError::Invalid("JWT_REFRESH_SECRET"));
        }

        let access_token_ttl = match get("JWT_EXPIRES_IN") {
            Some(raw) => parse_ttl(&raw).ok_or(ConfigError::Invalid("JWT_EXPIRES_IN"))?,
            None => Duration::from_secs(15 * 60),
        };

        let refresh_token_ttl = match get("JWT_REFRESH_EXPIRES_IN") {
            Some(raw) => parse_ttl(&raw).ok_or(ConfigError::Invalid("JWT_REFRESH_EXPIRES_IN"))?,
            None => Duration::from_secs(7 * 24 * 60 * 60),
        };

        let auth_issuer = get("AUTH_ISSUER").unwrap_or_else(|| "alumni-platform".to_string());
        let auth_audience =
            get("AUTH_AUDIENCE").unwrap_or_else(|| "alumni-platform-api".to_string());

        let token_leeway_seconds = get("TOKEN_LEEWAY_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            database_acquire_timeout,
            redis_url,
            cors_allowed_origins,
            jwt_secret,
            jwt_refresh_secret,
            access_token_ttl,
            refresh_token_ttl,
            auth_issuer,
            auth_audience,
            token_leeway_seconds,
        })
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Parse a lifetime like `900`, `30s`, `15m`, `12h` or `7d`.
///
/// Zero is rejected.
pub fn parse_ttl(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);

    let n: u64 = digits.parse().ok()?;
    let multiplier = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return None,
    };

    let secs = n.checked_mul(multiplier)?;
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/alumni"),
        ("JWT_SECRET", "access"),
        ("JWT_REFRESH_SECRET", "refresh"),
    ];

    #[test]
    fn parse_ttl_units() {
        assert_eq!(parse_ttl("900"), Some(Duration::from_secs(900)));
        assert_eq!(parse_ttl("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_ttl("15m"), Some(Duration::from_secs(900)));
        assert_eq!(parse_ttl("12h"), Some(Duration::from_secs(43_200)));
        assert_eq!(parse_ttl("7d"), Some(Duration::from_secs(604_800)));
        assert_eq!(parse_ttl(" 15m "), Some(Duration::from_secs(900)));
    }

    #[test]
    fn parse_ttl_rejects_nonsense() {
        for raw in ["", "0", "0m", "m", "15w", "-5m", "1.5h", "abc"] {
            assert_eq!(parse_ttl(raw), None, "{raw}");
        }
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(BASE)).unwrap();

        assert_eq!(config.addr.port(), 3001);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.access_token_ttl, Duration::from_secs(15 * 60));
        assert_eq!(config.refresh_token_ttl, Duration::from_secs(7 * 24 * 60 * 60));
        assert_eq!(config.auth_issuer, "alumni-platform");
        assert_eq!(config.auth_audience, "alumni-platform-api");
        assert_eq!(config.token_leeway_seconds, 0);
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn database_url_is_required() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "a")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn development_falls_back_to_insecure_secrets() {
        let config =
            Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/alumni")]))
                .unwrap();

        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.jwt_refresh_secret, DEV_JWT_REFRESH_SECRET);
    }

    #[test]
    fn production_requires_both_secrets() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/alumni"),
            ("APP_ENV", "production"),
            ("JWT_SECRET", "access"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::Missing("JWT_REFRESH_SECRET")));
    }

    #[test]
    fn shared_secret_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/alumni"),
            ("JWT_SECRET", "same"),
            ("JWT_REFRESH_SECRET", "same"),
        ]))
        .unwrap_err();

        assert!(matches!(err, ConfigError::Invalid("JWT_REFRESH_SECRET")));
    }

    #[test]
    fn bad_ttl_fails_startup() {
        let mut pairs = BASE.to_vec();
        pairs.push(("JWT_EXPIRES_IN", "soon"));

        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("JWT_EXPIRES_IN")));
    }

    #[test]
    fn debug_redacts_secrets() {
        let out = format!("{:?}", Config::from_lookup(lookup(BASE)).unwrap());

        assert!(!out.contains("postgres://"));
        assert!(!out.contains("\"access\""));
        assert!(!out.contains("\"refresh\""));
    }
}
