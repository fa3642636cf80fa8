// ============================================================================
// Database Configuration
// ============================================================================

use crate::env_parse_at_least;

/// Database connection pool configuration
#[derive(Clone, Debug)]
pub struct DbConfig {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Timeout for acquiring a connection from the pool (seconds)
    pub acquire_timeout_secs: u64,
    /// Timeout for idle connections before they are closed (seconds)
    pub idle_timeout_secs: u64,
}

impl DbConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            max_connections: env_parse_at_least("DB_MAX_CONNECTIONS", 10, 1),
            acquire_timeout_secs: env_parse_at_least("DB_ACQUIRE_TIMEOUT_SECS", 30, 1),
            idle_timeout_secs: env_parse_at_least("DB_IDLE_TIMEOUT_SECS", 600, 1),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}
