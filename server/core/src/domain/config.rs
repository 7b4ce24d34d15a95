// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Server configuration
//!
//! Loaded from YAML with a discovery chain, then patched from the
//! environment so container deployments can override individual values.
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 3000
//!   environment: production
//! database:
//!   backend: postgres
//!   uri: postgres://app:secret@db:5432/school
//! auth:
//!   jwt_secret: change-me
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV_VAR: &str = "SCHOOLHOUSE_CONFIG_PATH";
const DEV_JWT_SECRET: &str = "schoolhouse-dev-secret";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            "test" => Some(Environment::Test),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub environment: Environment,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Connection URI. Unset means every data route answers 503.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Reconnection policy knobs, all in seconds except the attempt count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    #[serde(default = "default_startup_attempts")]
    pub startup_attempts: u32,
    #[serde(default = "default_backoff_increment")]
    pub backoff_increment_secs: u64,
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
    #[serde(default = "default_health_interval")]
    pub health_interval_secs: u64,
}

impl ConnectionConfig {
    pub fn backoff_increment(&self) -> Duration {
        Duration::from_secs(self.backoff_increment_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            startup_attempts: default_startup_attempts(),
            backoff_increment_secs: default_backoff_increment(),
            wait_timeout_secs: default_wait_timeout(),
            reconnect_delay_secs: default_reconnect_delay(),
            health_interval_secs: default_health_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Any origin whose host ends with one of these is accepted.
    #[serde(default)]
    pub allowed_suffixes: Vec<String>,
}

impl CorsConfig {
    pub fn allows(&self, origin: &str) -> bool {
        if self.allowed_origins.iter().any(|o| o == origin) {
            return true;
        }
        let host = origin
            .split("://")
            .nth(1)
            .unwrap_or(origin)
            .split(':')
            .next()
            .unwrap_or_default();
        self.allowed_suffixes
            .iter()
            .any(|suffix| host.ends_with(suffix.as_str()))
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            allowed_suffixes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Prometheus exporter port; disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_port: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_startup_attempts() -> u32 {
    3
}

fn default_backoff_increment() -> u64 {
    2
}

fn default_wait_timeout() -> u64 {
    10
}

fn default_reconnect_delay() -> u64 {
    5
}

fn default_health_interval() -> u64 {
    30
}

fn default_jwt_secret() -> String {
    DEV_JWT_SECRET.to_string()
}

fn default_token_ttl() -> u64 {
    24
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    [3000, 3001, 4173, 5173, 5174]
        .iter()
        .flat_map(|port| {
            [
                format!("http://localhost:{}", port),
                format!("http://127.0.0.1:{}", port),
            ]
        })
        .collect()
}

impl ServerConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover a configuration file:
    /// 1. `SCHOOLHOUSE_CONFIG_PATH`
    /// 2. `./schoolhouse.yaml`
    /// 3. `~/.schoolhouse/config.yaml`
    /// 4. `/etc/schoolhouse/config.yaml`
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./schoolhouse.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".schoolhouse").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/schoolhouse/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, falling back to defaults.
    /// An explicit path that cannot be read is an error.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?
        } else if let Some(path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", path);
            Self::from_yaml_file(path)?
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(uri) = lookup("SCHOOLHOUSE_DATABASE_URL").or_else(|| lookup("DATABASE_URL")) {
            tracing::info!("Environment override: database.uri");
            self.database.uri = Some(uri);
        }

        if let Some(secret) = lookup("SCHOOLHOUSE_JWT_SECRET") {
            tracing::info!("Environment override: auth.jwt_secret");
            self.auth.jwt_secret = secret;
        }

        if let Some(env) = lookup("SCHOOLHOUSE_ENV") {
            match Environment::parse(&env) {
                Some(parsed) => self.server.environment = parsed,
                None => tracing::warn!(
                    "Invalid value for SCHOOLHOUSE_ENV: '{}'. Expected development/production/test. Ignoring.",
                    env
                ),
            }
        }

        if let Some(host) = lookup("SCHOOLHOUSE_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("SCHOOLHOUSE_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(
                    "Invalid value for SCHOOLHOUSE_PORT: '{}'. Ignoring.",
                    port
                ),
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be non-zero");
        }

        if self.auth.jwt_secret.trim().is_empty() {
            anyhow::bail!("auth.jwt_secret cannot be empty");
        }

        if self.server.environment == Environment::Production
            && self.auth.jwt_secret == DEV_JWT_SECRET
        {
            anyhow::bail!("auth.jwt_secret must be set explicitly in production");
        }

        if self.auth.token_ttl_hours == 0 {
            anyhow::bail!("auth.token_ttl_hours must be at least 1");
        }

        if self.connection.startup_attempts == 0 {
            anyhow::bail!("connection.startup_attempts must be at least 1");
        }

        if self.connection.wait_timeout_secs == 0 {
            anyhow::bail!("connection.wait_timeout_secs must be at least 1");
        }

        if self.connection.health_interval_secs == 0 {
            anyhow::bail!("connection.health_interval_secs must be at least 1");
        }

        if self.database.backend == BackendKind::Postgres {
            if let Some(uri) = &self.database.uri {
                if !(uri.starts_with("postgres://") || uri.starts_with("postgresql://")) {
                    anyhow::bail!(
                        "database.uri must use the postgres:// or postgresql:// scheme for the postgres backend"
                    );
                }
            }
        }

        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.server.environment == Environment::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.backend, BackendKind::Postgres);
        assert!(config.database.uri.is_none());
        assert_eq!(config.connection.startup_attempts, 3);
        assert_eq!(config.connection.reconnect_delay(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = ServerConfig::from_yaml_str(
            "server:\n  port: 8080\ndatabase:\n  backend: memory\n",
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.backend, BackendKind::Memory);
        assert_eq!(config.connection.wait_timeout_secs, 10);
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schoolhouse.yaml");

        let mut config = ServerConfig::default();
        config.database.uri = Some("postgres://app@localhost/school".to_string());
        config.observability.metrics_port = Some(9100);
        config.to_yaml_file(&path).unwrap();

        let loaded = ServerConfig::load_or_default(Some(path)).unwrap();
        assert_eq!(loaded.observability.metrics_port, Some(9100));
        assert_eq!(loaded.server, config.server);
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = ServerConfig::load_or_default(Some(dir.path().join("absent.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "postgres://fallback/db"),
            ("SCHOOLHOUSE_DATABASE_URL", "postgres://primary/db"),
            ("SCHOOLHOUSE_ENV", "production"),
            ("SCHOOLHOUSE_PORT", "not-a-port"),
            ("SCHOOLHOUSE_JWT_SECRET", "s3cret"),
        ]);
        let mut config = ServerConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.uri.as_deref(), Some("postgres://primary/db"));
        assert_eq!(config.server.environment, Environment::Production);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.jwt_secret, "s3cret");
    }

    #[test]
    fn test_validation() {
        let mut config = ServerConfig::default();

        config.server.environment = Environment::Production;
        assert!(config.validate().is_err());
        config.auth.jwt_secret = "real-secret".to_string();
        assert!(config.validate().is_ok());

        config.connection.startup_attempts = 0;
        assert!(config.validate().is_err());
        config.connection.startup_attempts = 3;

        config.database.uri = Some("mongodb://localhost/school".to_string());
        assert!(config.validate().is_err());
        config.database.backend = BackendKind::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cors_suffix_matching() {
        let cors = CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
            allowed_suffixes: vec![".vercel.app".to_string()],
        };
        assert!(cors.allows("http://localhost:5173"));
        assert!(cors.allows("https://school-preview.vercel.app"));
        assert!(!cors.allows("https://evil.example.com"));
    }
}
