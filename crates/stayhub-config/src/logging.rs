// ============================================================================
// Logging Configuration
// ============================================================================

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log raw user ids instead of salted hashes (development only)
    pub enable_user_identifiers: bool,
    pub hash_salt: String,
}

impl LoggingConfig {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            enable_user_identifiers: std::env::var("LOG_USER_IDENTIFIERS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            hash_salt: {
                let salt = std::env::var("LOG_HASH_SALT")
                    .unwrap_or_else(|_| "default-salt-please-change".to_string());
                if salt.is_empty() || salt == "default-salt-please-change" {
                    anyhow::bail!("LOG_HASH_SALT must be set to a unique, secret value");
                }
                salt
            },
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_user_identifiers: false,
            hash_salt: "local-development-salt".to_string(),
        }
    }
}
