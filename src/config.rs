//! Client configuration.

use crate::utils::retry::RetryConfig;
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default HaoZhu API server.
pub const DEFAULT_SERVER: &str = "https://api.haozhuma.com";
/// Default backup server.
pub const DEFAULT_BACKUP_SERVER: &str = "https://api.haozhuyun.com";

/// Prefix of every environment variable read by [`HaozhuConfig::from_env`].
pub const ENV_PREFIX: &str = "HAOZHU_";

/// Error while building a configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// An environment variable holds a value that cannot be parsed.
    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },

    /// The configuration is internally inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for [`HaozhuClient`](crate::HaozhuClient).
///
/// Build it in code, or resolve it once from `HAOZHU_*` environment
/// variables with [`HaozhuConfig::from_env`], then pass it to the client.
///
/// ```rust
/// use haozhu::HaozhuConfig;
/// use std::time::Duration;
///
/// let config = HaozhuConfig::default()
///     .with_credentials("user", "secret")
///     .with_timeout(Duration::from_secs(10))
///     .with_log_requests(true);
///
/// assert_eq!(config.username, "user");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct HaozhuConfig {
    /// Account user name.
    pub username: String,
    /// Account password.
    pub password: SecretString,
    /// Token from an earlier login. When set, login is skipped.
    pub token: SecretString,
    /// API server base URL.
    pub server: Url,
    /// Backup API server base URL. Not used by the client itself.
    pub backup_server: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry policy for transport failures.
    pub retry: RetryConfig,
    /// Log every request URL and response body at debug level.
    pub log_requests: bool,
    /// Log filter for applications that install a subscriber (default: "info").
    pub log_level: String,
    /// Default project id.
    pub sid: u64,
    /// Default developer account for revenue sharing.
    pub author: Option<String>,
}

fn default_url(raw: &str) -> Url {
    Url::parse(raw).expect("built-in server URL is valid")
}

impl Default for HaozhuConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: SecretString::from(String::new()),
            token: SecretString::from(String::new()),
            server: default_url(DEFAULT_SERVER),
            backup_server: default_url(DEFAULT_BACKUP_SERVER),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            log_requests: false,
            log_level: "info".to_string(),
            sid: 0,
            author: None,
        }
    }
}

impl HaozhuConfig {
    /// Resolve a configuration from `HAOZHU_*` environment variables.
    ///
    /// Unset or empty variables keep their defaults. Loading a `.env` file
    /// (e.g. with `dotenvy`) is left to the application.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `HAOZHU_USERNAME` | empty |
    /// | `HAOZHU_PASSWORD` | empty |
    /// | `HAOZHU_TOKEN` | empty |
    /// | `HAOZHU_SERVER` | `https://api.haozhuma.com` |
    /// | `HAOZHU_BACKUP_SERVER` | `https://api.haozhuyun.com` |
    /// | `HAOZHU_TIMEOUT` | 30 (seconds) |
    /// | `HAOZHU_MAX_RETRIES` | 3 |
    /// | `HAOZHU_RETRY_DELAY` | 1.0 (seconds) |
    /// | `HAOZHU_LOG_LEVEL` | info |
    /// | `HAOZHU_LOG_REQUESTS` | false |
    /// | `HAOZHU_SID` | 0 |
    /// | `HAOZHU_AUTHOR` | empty |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve a configuration from an arbitrary variable source.
    ///
    /// `lookup` receives full variable names such as `HAOZHU_SERVER`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, key)).filter(|v| !v.trim().is_empty())
        };
        let mut config = Self::default();

        if let Some(v) = get("USERNAME") {
            config.username = v;
        }
        if let Some(v) = get("PASSWORD") {
            config.password = SecretString::from(v);
        }
        if let Some(v) = get("TOKEN") {
            config.token = SecretString::from(v);
        }
        if let Some(v) = get("SERVER") {
            config.server = parse_var("SERVER", &v)?;
        }
        if let Some(v) = get("BACKUP_SERVER") {
            config.backup_server = parse_var("BACKUP_SERVER", &v)?;
        }
        if let Some(v) = get("TIMEOUT") {
            config.timeout = Duration::from_secs(parse_var("TIMEOUT", &v)?);
        }
        if let Some(v) = get("MAX_RETRIES") {
            config.retry.max_attempts = parse_var("MAX_RETRIES", &v)?;
        }
        if let Some(v) = get("RETRY_DELAY") {
            let secs: f64 = parse_var("RETRY_DELAY", &v)?;
            config.retry.delay =
                Duration::try_from_secs_f64(secs).map_err(|e| invalid("RETRY_DELAY", &v, e))?;
        }
        if let Some(v) = get("LOG_LEVEL") {
            config.log_level = v.trim().to_lowercase();
        }
        if let Some(v) = get("LOG_REQUESTS") {
            config.log_requests = parse_bool("LOG_REQUESTS", &v)?;
        }
        if let Some(v) = get("SID") {
            config.sid = parse_var("SID", &v)?;
        }
        if let Some(v) = get("AUTHOR") {
            config.author = Some(v);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values that would make every request fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be greater than zero".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max retry attempts must be at least 1".into(),
            ));
        }
        if self.server.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!(
                "server URL '{}' cannot be used as a base",
                self.server
            )));
        }
        Ok(())
    }

    /// Set user name and password.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = SecretString::from(password.into());
        self
    }

    /// Set a token from an earlier login.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = SecretString::from(token.into());
        self
    }

    /// Set the API server base URL.
    pub fn with_server(mut self, server: Url) -> Self {
        self.server = server;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Enable or disable request logging.
    pub fn with_log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    /// Set the default project id.
    pub fn with_sid(mut self, sid: u64) -> Self {
        self.sid = sid;
        self
    }

    /// Set the default developer account for revenue sharing.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Returns true if a token is configured.
    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().is_empty()
    }
}

fn invalid(var: &str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        var: format!("{}{}", ENV_PREFIX, var),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    value.trim().parse().map_err(|e| invalid(var, value, e))
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(var, value, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = HaozhuConfig::default();
        assert_eq!(config.server.as_str(), "https://api.haozhuma.com/");
        assert_eq!(config.backup_server.as_str(), "https://api.haozhuyun.com/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay, Duration::from_secs(1));
        assert!(!config.log_requests);
        assert!(!config.has_token());
        assert_eq!(config.sid, 0);
        assert!(config.author.is_none());
    }

    #[test]
    fn test_config_from_lookup() {
        let config = HaozhuConfig::from_lookup(lookup(&[
            ("HAOZHU_USERNAME", "alice"),
            ("HAOZHU_PASSWORD", "s3cret"),
            ("HAOZHU_TOKEN", "tok"),
            ("HAOZHU_SERVER", "http://localhost:8080"),
            ("HAOZHU_TIMEOUT", "5"),
            ("HAOZHU_MAX_RETRIES", "4"),
            ("HAOZHU_RETRY_DELAY", "0.5"),
            ("HAOZHU_LOG_LEVEL", "DEBUG"),
            ("HAOZHU_LOG_REQUESTS", "true"),
            ("HAOZHU_SID", "12345"),
            ("HAOZHU_AUTHOR", "dev"),
        ]))
        .unwrap();

        assert_eq!(config.username, "alice");
        assert_eq!(config.password.expose_secret(), "s3cret");
        assert_eq!(config.token.expose_secret(), "tok");
        assert_eq!(config.server.as_str(), "http://localhost:8080/");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.delay, Duration::from_millis(500));
        assert_eq!(config.log_level, "debug");
        assert!(config.log_requests);
        assert_eq!(config.sid, 12345);
        assert_eq!(config.author.as_deref(), Some("dev"));
    }

    #[test]
    fn test_config_empty_values_keep_defaults() {
        let config =
            HaozhuConfig::from_lookup(lookup(&[("HAOZHU_TIMEOUT", ""), ("HAOZHU_SID", " ")]))
                .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.sid, 0);
    }

    #[test]
    fn test_config_invalid_values() {
        let err = HaozhuConfig::from_lookup(lookup(&[("HAOZHU_TIMEOUT", "soon")])).unwrap_err();
        match err {
            ConfigError::InvalidValue { var, value, .. } => {
                assert_eq!(var, "HAOZHU_TIMEOUT");
                assert_eq!(value, "soon");
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }

        assert!(HaozhuConfig::from_lookup(lookup(&[("HAOZHU_SERVER", "not a url")])).is_err());
        assert!(HaozhuConfig::from_lookup(lookup(&[("HAOZHU_LOG_REQUESTS", "maybe")])).is_err());
        assert!(HaozhuConfig::from_lookup(lookup(&[("HAOZHU_RETRY_DELAY", "-1")])).is_err());
    }

    #[test]
    fn test_config_validate() {
        assert!(
            HaozhuConfig::default()
                .with_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            HaozhuConfig::default()
                .with_retry(RetryConfig::default().with_max_attempts(0))
                .validate()
                .is_err()
        );
        assert!(
            HaozhuConfig::from_lookup(lookup(&[("HAOZHU_MAX_RETRIES", "0")])).is_err()
        );
    }

    #[test]
    fn test_config_debug_redacts_secrets() {
        let config = HaozhuConfig::default()
            .with_credentials("alice", "hunter2")
            .with_token("abcdef");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("abcdef"));
        assert!(debug.contains("alice"));
    }
}
