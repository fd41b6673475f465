//! # Configuration State
//!
//! Application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TONERDESK_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use serde::{Deserialize, Serialize};
use tonerdesk_core::{DEFAULT_LOW_LEVEL_PCT, DEFAULT_ORDER_LEAD_TIME_DAYS};

/// Application configuration.
///
/// Most fields have sensible defaults for a small office; deployments
/// tune them through environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Office name shown in report headers.
    pub office_name: String,

    /// Toner level (whole percent) at or below which a printer is flagged
    /// in fleet reports.
    pub low_level_pct: i64,

    /// Days of supplier lead time. A printer projected to run dry within
    /// this window with no stock on hand gets an "order suggested" flag.
    pub order_lead_time_days: i64,

    /// Days after which mirrored outbox entries are eligible for cleanup.
    pub outbox_retention_days: u32,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            office_name: "Main Office".to_string(),
            low_level_pct: DEFAULT_LOW_LEVEL_PCT,
            order_lead_time_days: DEFAULT_ORDER_LEAD_TIME_DAYS,
            outbox_retention_days: 30,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `TONERDESK_OFFICE_NAME`: Override office name
    /// - `TONERDESK_LOW_LEVEL_PCT`: Override the low-level threshold
    /// - `TONERDESK_LEAD_TIME_DAYS`: Override the order lead time
    pub fn from_env() -> Self {
        let mut config = ConfigState::default();

        if let Ok(name) = std::env::var("TONERDESK_OFFICE_NAME") {
            config.office_name = name;
        }

        if let Ok(pct) = std::env::var("TONERDESK_LOW_LEVEL_PCT") {
            if let Ok(pct) = pct.parse::<i64>() {
                config.low_level_pct = pct.clamp(0, 100);
            }
        }

        if let Ok(days) = std::env::var("TONERDESK_LEAD_TIME_DAYS") {
            if let Ok(days) = days.parse::<i64>() {
                config.order_lead_time_days = days.max(0);
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigState::default();
        assert_eq!(config.low_level_pct, DEFAULT_LOW_LEVEL_PCT);
        assert_eq!(config.order_lead_time_days, DEFAULT_ORDER_LEAD_TIME_DAYS);
        assert!(!config.office_name.is_empty());
    }
}
