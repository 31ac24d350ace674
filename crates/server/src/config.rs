use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Signing configuration for issued access tokens.
#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    /// HMAC key shared by signing and verification. Never logged.
    pub secret: String,
    /// Access token lifetime in seconds
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime: i64,
    /// Optional `iss` claim stamped on and required from every token
    #[serde(default)]
    pub issuer: Option<String>,
}

/// Per-client-IP request budget applied to every API route.
#[derive(Clone, Debug, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window and address
    #[serde(default = "default_rate_limit_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds
    #[serde(default = "default_rate_limit_window_secs")]
    pub window_secs: u64,
    /// Key on the first `X-Forwarded-For` entry instead of the peer address.
    /// Only enable behind a proxy that overwrites the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_rate_limit_max_requests(),
            window_secs: default_rate_limit_window_secs(),
            trust_forwarded_for: false,
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub redis_url: String,
    /// Shared secret expected in `x-client-registration-token` on `POST /oauth/register`.
    pub client_registration_token: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_rate_limit_max_requests() -> u32 {
    100
}

fn default_rate_limit_window_secs() -> u64 {
    60
}

fn default_access_token_lifetime() -> i64 {
    3600
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl AppConfig {
    /// Check the invariants the rest of the service relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < 32 {
            return Err(ConfigError::Validation(
                "jwt.secret must be at least 32 bytes".into(),
            ));
        }
        if self.jwt.access_token_lifetime <= 0 {
            return Err(ConfigError::Validation(
                "jwt.access_token_lifetime must be > 0".into(),
            ));
        }
        if self.client_registration_token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "client_registration_token must not be empty".into(),
            ));
        }
        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Validation(
                "rate_limit.max_requests and rate_limit.window_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Load application configuration from `config.yaml` + environment overrides.
///
/// Any environment variable matching the key path separated by double
/// underscores (e.g. `JWT__SECRET`) overrides the file value; top-level keys
/// map directly (`DATABASE_URL`, `REDIS_URL`). The file is optional so a
/// container can be configured from the environment alone.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml").required(false))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

/// Convenience helper for binaries wanting the panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(secret: &str, lifetime: i64, registration_token: &str) -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".into(),
            redis_url: "redis://127.0.0.1/".into(),
            client_registration_token: registration_token.into(),
            listen_addr: default_listen_addr(),
            jwt: JwtConfig {
                secret: secret.into(),
                access_token_lifetime: lifetime,
                issuer: None,
            },
            rate_limit: RateLimitConfig::default(),
        }
    }

    #[test]
    fn accepts_sane_config() {
        let cfg = config_with("0123456789abcdef0123456789abcdef", 3600, "admin");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_short_jwt_secret() {
        let cfg = config_with("too-short", 3600, "admin");
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("jwt.secret"));
    }

    #[test]
    fn rejects_non_positive_lifetime() {
        let cfg = config_with("0123456789abcdef0123456789abcdef", 0, "admin");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_blank_registration_token() {
        let cfg = config_with("0123456789abcdef0123456789abcdef", 60, "   ");
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("client_registration_token"));
    }

    #[test]
    fn rejects_zero_rate_limit() {
        let mut cfg = config_with("0123456789abcdef0123456789abcdef", 60, "admin");
        cfg.rate_limit.max_requests = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("rate_limit"));
    }
}
