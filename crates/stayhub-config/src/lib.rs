// ============================================================================
// Stayhub Config - Centralized configuration management
// ============================================================================
//
// Configuration for the marketplace service, loaded from environment
// variables (and an optional .env file) with defaults for everything except
// the database URL.
//
// ============================================================================

mod constants;
mod database;
mod logging;
mod notifications;
mod realtime;

pub use constants::{
    DEFAULT_NOTIFICATION_LIMIT, MAX_MESSAGE_CONTENT_CHARS, MAX_NOTIFICATION_LIMIT,
    MAX_WS_FRAME_SIZE, SECONDS_PER_MINUTE,
};
pub use database::DbConfig;
pub use logging::LoggingConfig;
pub use notifications::NotificationConfig;
pub use realtime::RealtimeConfig;

use anyhow::Result;
use constants::{DEFAULT_PORT, DEFAULT_WS_PORT};

/// Which storage implementation backs the stores
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process-local storage, lost on restart
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("Unknown STORAGE_BACKEND: {}", other),
        }
    }
}

/// Main configuration structure
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub storage_backend: StorageBackend,
    /// JSON file of listings and users loaded into the in-memory directory
    pub directory_seed_file: Option<String>,

    pub port: u16,
    pub bind_address: String,
    pub ws_port: u16,
    pub ws_bind_address: String,
    pub rust_log: String,

    // Sub-configurations
    pub db: DbConfig,
    pub logging: LoggingConfig,
    pub realtime: RealtimeConfig,
    pub notifications: NotificationConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let storage_backend: StorageBackend = std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;

        // Memory backend never touches the database
        let database_url = match storage_backend {
            StorageBackend::Postgres => std::env::var("DATABASE_URL")?,
            StorageBackend::Memory => std::env::var("DATABASE_URL").unwrap_or_default(),
        };

        let port = env_parse("PORT", DEFAULT_PORT);
        let ws_port = env_parse("WS_PORT", DEFAULT_WS_PORT);

        if ws_port == port {
            anyhow::bail!("WS_PORT must differ from PORT (both are {})", port);
        }

        Ok(Self {
            database_url,
            storage_backend,
            directory_seed_file: std::env::var("DIRECTORY_SEED_FILE").ok(),
            port,
            bind_address: format!("[::]:{}", port),
            ws_port,
            ws_bind_address: format!("[::]:{}", ws_port),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            db: DbConfig::from_env(),
            logging: LoggingConfig::from_env()?,
            realtime: RealtimeConfig::from_env(),
            notifications: NotificationConfig::from_env(),
        })
    }
}

/// Parse `name` from the environment. Unset falls back to `default`
/// silently; set but unparseable falls back with a warning.
pub(crate) fn env_parse<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    var = name,
                    value = %raw,
                    error = %e,
                    default = %default,
                    "Invalid value in environment, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

/// Like [`env_parse`], but values below `min` also fall back to `default`
pub(crate) fn env_parse_at_least<T>(name: &str, default: T, min: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + PartialOrd + Copy,
    T::Err: std::fmt::Display,
{
    let value = env_parse(name, default);
    if value < min {
        tracing::warn!(
            var = name,
            value = %value,
            min = %min,
            default = %default,
            "Value below minimum, using default"
        );
        return default;
    }
    value
}

impl Default for Config {
    /// In-memory configuration on the default ports; used by tests and local runs
    fn default() -> Self {
        Self {
            database_url: String::new(),
            storage_backend: StorageBackend::Memory,
            directory_seed_file: None,
            port: DEFAULT_PORT,
            bind_address: format!("[::]:{}", DEFAULT_PORT),
            ws_port: DEFAULT_WS_PORT,
            ws_bind_address: format!("[::]:{}", DEFAULT_WS_PORT),
            rust_log: "info".to_string(),
            db: DbConfig::default(),
            logging: LoggingConfig::default(),
            realtime: RealtimeConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parsing() {
        assert_eq!(
            "postgres".parse::<StorageBackend>().unwrap(),
            StorageBackend::Postgres
        );
        assert_eq!(
            "Memory".parse::<StorageBackend>().unwrap(),
            StorageBackend::Memory
        );
        assert!("mongo".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_notification_limit_clamping() {
        let cfg = NotificationConfig::default();
        assert_eq!(cfg.clamp_limit(None), DEFAULT_NOTIFICATION_LIMIT);
        assert_eq!(cfg.clamp_limit(Some(0)), 1);
        assert_eq!(cfg.clamp_limit(Some(5000)), MAX_NOTIFICATION_LIMIT);
        assert_eq!(cfg.clamp_limit(Some(7)), 7);
    }

    #[test]
    fn test_notification_limits_reject_non_positive() {
        let cfg = NotificationConfig::new(0, 0);
        assert_eq!(cfg.max_limit, MAX_NOTIFICATION_LIMIT);
        assert_eq!(cfg.default_limit, 1);
        assert_eq!(cfg.clamp_limit(None), 1);
        assert_eq!(cfg.clamp_limit(Some(-3)), 1);

        let cfg = NotificationConfig::new(50, 10);
        assert_eq!(cfg.default_limit, 10);
        assert_eq!(cfg.clamp_limit(None), 10);
    }

    #[test]
    fn test_clamp_limit_survives_hand_built_config() {
        let cfg = NotificationConfig {
            default_limit: -1,
            max_limit: -5,
        };
        assert_eq!(cfg.clamp_limit(None), 1);
        assert_eq!(cfg.clamp_limit(Some(40)), 1);
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        // Names unique to this test; nothing else reads them
        std::env::set_var("STAYHUB_TEST_PARSE_GARBAGE", "twelve");
        std::env::set_var("STAYHUB_TEST_PARSE_ZERO", "0");
        std::env::set_var("STAYHUB_TEST_PARSE_OK", " 42 ");

        assert_eq!(env_parse("STAYHUB_TEST_PARSE_GARBAGE", 7u64), 7);
        assert_eq!(env_parse("STAYHUB_TEST_PARSE_UNSET", 9u16), 9);
        assert_eq!(env_parse("STAYHUB_TEST_PARSE_OK", 1i64), 42);
        assert_eq!(env_parse_at_least("STAYHUB_TEST_PARSE_ZERO", 10u64, 1), 10);
        assert_eq!(env_parse_at_least("STAYHUB_TEST_PARSE_OK", 10u64, 1), 42);
    }
}
