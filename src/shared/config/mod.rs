//! Application configuration module
//!
//! Configuration is layered: defaults, then an optional TOML file named by
//! `STANDUP_CONFIG`, then environment variables. `AppConfig::load` applies
//! all three; tests usually go through `AppConfig::builder()` directly.
//!
//! # Environment
//!
//! | Variable | Default |
//! |---|---|
//! | `SERVER_PORT` | `3000` |
//! | `DATABASE_URL` | unset (in-memory store) |
//! | `JWT_SECRET` | random per process |
//! | `ACCESS_TOKEN_TTL_SECS` | `3600` |
//! | `BROADCAST_INTERVAL_MS` | `1000` |
//! | `PUSH_TIMEOUT_MS` | `5000` |
//! | `ALLOWED_ORIGINS` | empty (any origin) |

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an optional TOML config file
pub const CONFIG_FILE_ENV: &str = "STANDUP_CONFIG";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 60 * 60;
const DEFAULT_BROADCAST_INTERVAL_MS: u64 = 1000;
const DEFAULT_PUSH_TIMEOUT_MS: u64 = 5000;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server binds on
    pub server_port: u16,
    /// PostgreSQL connection string; `None` selects the in-memory store
    pub database_url: Option<String>,
    /// HMAC secret for access tokens
    pub jwt_secret: String,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Period of the session broadcast loop
    pub broadcast_interval: Duration,
    /// Upper bound for a single websocket push
    pub push_timeout: Duration,
    /// Accepted websocket `Origin` hosts; empty accepts any origin
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from the optional config file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let builder = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) if !path.trim().is_empty() => AppConfigBuilder::from_file(path.trim())?,
            _ => AppConfigBuilder::default(),
        };
        builder.with_env()?.build()
    }

    /// Load configuration from the environment only
    pub fn from_env() -> Result<Self, ConfigError> {
        AppConfigBuilder::default().with_env()?.build()
    }

    /// Parse a TOML document into a configuration
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        AppConfigBuilder::from_toml_str(contents)?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("jwt_secret"));
        }
        if self.access_token_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "access_token_ttl_secs",
                value: "0".to_string(),
            });
        }
        if self.broadcast_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "broadcast_interval_ms",
                value: "0".to_string(),
            });
        }
        if self.push_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "push_timeout_ms",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Whether a websocket `Origin` header value is accepted
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        if self.allowed_origins.is_empty() {
            return true;
        }
        let Some(origin) = origin else {
            return false;
        };
        let host = origin
            .split("://")
            .last()
            .unwrap_or(origin)
            .trim_end_matches('/');
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == host || allowed == origin)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfigBuilder::default().build_unchecked()
    }
}

/// On-disk representation; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    server_port: Option<u16>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    access_token_ttl_secs: Option<u64>,
    broadcast_interval_ms: Option<u64>,
    push_timeout_ms: Option<u64>,
    allowed_origins: Option<Vec<String>>,
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_port: Option<u16>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    access_token_ttl: Option<Duration>,
    broadcast_interval: Option<Duration>,
    push_timeout: Option<Duration>,
    allowed_origins: Option<Vec<String>>,
}

impl AppConfigBuilder {
    /// Start from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Start from a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(contents)?;
        Ok(Self {
            server_port: file.server_port,
            database_url: file.database_url,
            jwt_secret: file.jwt_secret,
            access_token_ttl: file.access_token_ttl_secs.map(Duration::from_secs),
            broadcast_interval: file.broadcast_interval_ms.map(Duration::from_millis),
            push_timeout: file.push_timeout_ms.map(Duration::from_millis),
            allowed_origins: file.allowed_origins,
        })
    }

    /// Apply environment variable overrides
    pub fn with_env(mut self) -> Result<Self, ConfigError> {
        if let Some(port) = env_parse::<u16>("SERVER_PORT")? {
            self.server_port = Some(port);
        }
        if let Some(url) = env_string("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(secret) = env_string("JWT_SECRET") {
            self.jwt_secret = Some(secret);
        }
        if let Some(secs) = env_parse::<u64>("ACCESS_TOKEN_TTL_SECS")? {
            self.access_token_ttl = Some(Duration::from_secs(secs));
        }
        if let Some(ms) = env_parse::<u64>("BROADCAST_INTERVAL_MS")? {
            self.broadcast_interval = Some(Duration::from_millis(ms));
        }
        if let Some(ms) = env_parse::<u64>("PUSH_TIMEOUT_MS")? {
            self.push_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(origins) = env_string("ALLOWED_ORIGINS") {
            self.allowed_origins = Some(
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }
        Ok(self)
    }

    /// Set the server port
    pub fn server_port(mut self, port: u16) -> Self {
        self.server_port = Some(port);
        self
    }

    /// Set the database URL
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Set the access token signing secret
    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    /// Set the access token lifetime
    pub fn access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = Some(ttl);
        self
    }

    /// Set the broadcast tick period
    pub fn broadcast_interval(mut self, interval: Duration) -> Self {
        self.broadcast_interval = Some(interval);
        self
    }

    /// Set the per-push timeout
    pub fn push_timeout(mut self, timeout: Duration) -> Self {
        self.push_timeout = Some(timeout);
        self
    }

    /// Set the accepted websocket origins
    pub fn allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = Some(origins);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    fn build_unchecked(self) -> AppConfig {
        let jwt_secret = self.jwt_secret.unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set. Using a random secret; tokens will not survive a restart.");
            random_secret()
        });

        AppConfig {
            server_port: self.server_port.unwrap_or(DEFAULT_PORT),
            database_url: self.database_url.filter(|url| !url.trim().is_empty()),
            jwt_secret,
            access_token_ttl: self
                .access_token_ttl
                .unwrap_or(Duration::from_secs(DEFAULT_ACCESS_TOKEN_TTL_SECS)),
            broadcast_interval: self
                .broadcast_interval
                .unwrap_or(Duration::from_millis(DEFAULT_BROADCAST_INTERVAL_MS)),
            push_timeout: self
                .push_timeout
                .unwrap_or(Duration::from_millis(DEFAULT_PUSH_TIMEOUT_MS)),
            allowed_origins: self.allowed_origins.unwrap_or_default(),
        }
    }
}

fn random_secret() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env_string(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const ENV_KEYS: [&str; 8] = [
        "SERVER_PORT",
        "DATABASE_URL",
        "JWT_SECRET",
        "ACCESS_TOKEN_TTL_SECS",
        "BROADCAST_INTERVAL_MS",
        "PUSH_TIMEOUT_MS",
        "ALLOWED_ORIGINS",
        CONFIG_FILE_ENV,
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::builder().jwt_secret("secret").build().unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.database_url, None);
        assert_eq!(config.access_token_ttl, Duration::from_secs(3600));
        assert_eq!(config.broadcast_interval, Duration::from_secs(1));
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_random_secret_when_missing() {
        let a = AppConfig::builder().build().unwrap();
        let b = AppConfig::builder().build().unwrap();
        assert_eq!(a.jwt_secret.len(), 48);
        assert_ne!(a.jwt_secret, b.jwt_secret);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = AppConfig::builder()
            .broadcast_interval(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_from_toml_str() {
        let config = AppConfig::from_toml_str(
            r#"
            server_port = 5050
            jwt_secret = "from-file"
            broadcast_interval_ms = 250
            allowed_origins = ["broccoli.buzz"]
            "#,
        )
        .unwrap();
        assert_eq!(config.server_port, 5050);
        assert_eq!(config.jwt_secret, "from-file");
        assert_eq!(config.broadcast_interval, Duration::from_millis(250));
        assert_eq!(config.allowed_origins, vec!["broccoli.buzz"]);
    }

    #[test]
    fn test_unknown_toml_key_rejected() {
        let result = AppConfig::from_toml_str("unknown_key = 1");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_port = 5050\njwt_secret = \"file\"").unwrap();

        std::env::set_var(CONFIG_FILE_ENV, file.path());
        std::env::set_var("SERVER_PORT", "6060");
        std::env::set_var("ALLOWED_ORIGINS", "a.example, b.example");

        let config = AppConfig::load().unwrap();
        clear_env();

        assert_eq!(config.server_port, 6060);
        assert_eq!(config.jwt_secret, "file");
        assert_eq!(config.allowed_origins, vec!["a.example", "b.example"]);
    }

    #[test]
    #[serial]
    fn test_invalid_env_value() {
        clear_env();
        std::env::set_var("SERVER_PORT", "not-a-port");
        let result = AppConfig::from_env();
        clear_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "SERVER_PORT", .. })
        ));
    }

    #[test]
    fn test_origin_allowed() {
        let open = AppConfig::builder().jwt_secret("s").build().unwrap();
        assert!(open.origin_allowed(None));

        let strict = AppConfig::builder()
            .jwt_secret("s")
            .allowed_origins(vec!["broccoli.buzz".to_string()])
            .build()
            .unwrap();
        assert!(strict.origin_allowed(Some("https://broccoli.buzz")));
        assert!(!strict.origin_allowed(Some("https://evil.example")));
        assert!(!strict.origin_allowed(None));
    }
}
