// ============================================================================
// Notification Feed Configuration
// ============================================================================

use crate::constants::{DEFAULT_NOTIFICATION_LIMIT, MAX_NOTIFICATION_LIMIT};
use crate::env_parse;

#[derive(Clone, Debug)]
pub struct NotificationConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl NotificationConfig {
    /// Limits normalized so that `1 <= default_limit <= max_limit`.
    /// A non-positive `max_limit` falls back to [`MAX_NOTIFICATION_LIMIT`].
    pub fn new(default_limit: i64, max_limit: i64) -> Self {
        let max_limit = if max_limit < 1 {
            tracing::warn!(
                max_limit,
                fallback = MAX_NOTIFICATION_LIMIT,
                "NOTIFICATIONS_MAX_LIMIT must be positive, using default"
            );
            MAX_NOTIFICATION_LIMIT
        } else {
            max_limit
        };

        Self {
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }

    pub(crate) fn from_env() -> Self {
        Self::new(
            env_parse("NOTIFICATIONS_DEFAULT_LIMIT", DEFAULT_NOTIFICATION_LIMIT),
            env_parse("NOTIFICATIONS_MAX_LIMIT", MAX_NOTIFICATION_LIMIT),
        )
    }

    /// Clamp a caller-supplied page size into `1..=max_limit`
    pub fn clamp_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_NOTIFICATION_LIMIT,
            max_limit: MAX_NOTIFICATION_LIMIT,
        }
    }
}
