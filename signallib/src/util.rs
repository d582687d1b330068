use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::deriv::{default_markets, DerivSettings, Market};
use crate::models::{DEFAULT_COLLECTION_TIMEOUT, DEFAULT_TICK_COUNT};
use crate::telegram::TelegramSettings;

pub const SETTINGS_PATH: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

fn default_tick_count() -> usize {
    DEFAULT_TICK_COUNT
}

fn default_collection_timeout_secs() -> u64 {
    DEFAULT_COLLECTION_TIMEOUT.as_secs()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_signal_valid_minutes() -> i64 {
    5
}

// Africa/Nairobi
fn default_utc_offset_minutes() -> i32 {
    180
}

fn default_delete_after_minutes() -> u64 {
    50
}

const MAX_SIGNAL_VALID_MINUTES: i64 = 24 * 60;
// Telegram refuses to delete messages older than 48 hours
const MAX_DELETE_AFTER_MINUTES: u64 = 48 * 60;

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub deriv: DerivSettings,
    pub telegram: TelegramSettings,
    #[serde(default = "default_markets")]
    pub markets: Vec<Market>,
    #[serde(default = "default_tick_count")]
    pub tick_count: usize,
    #[serde(default = "default_collection_timeout_secs")]
    pub collection_timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_signal_valid_minutes")]
    pub signal_valid_minutes: i64,
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_delete_after_minutes")]
    pub delete_after_minutes: u64,
}

impl Settings {
    pub fn collection_timeout(&self) -> Duration {
        Duration::from_secs(self.collection_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn delete_after(&self) -> Duration {
        Duration::from_secs(self.delete_after_minutes.saturating_mul(60))
    }

    /// How long an announced signal stays valid; `None` if the setting is out of range.
    pub fn signal_validity(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_minutes(self.signal_valid_minutes)
    }

    pub fn utc_offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes).unwrap_or_else(|| Utc.fix())
    }

    /// Display name for `symbol`, falling back to the symbol itself.
    pub fn market_name<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.markets
            .iter()
            .find(|m| m.symbol == symbol)
            .map(|m| m.name.as_str())
            .unwrap_or(symbol)
    }

    fn validate(self) -> Result<Self, SettingsError> {
        if self.markets.is_empty() {
            return Err(SettingsError::Invalid("no markets configured".to_string()));
        }
        if self.tick_count == 0 {
            return Err(SettingsError::Invalid("tick_count must be positive".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(SettingsError::Invalid("poll_interval_ms must be positive".to_string()));
        }
        if !(1..=MAX_SIGNAL_VALID_MINUTES).contains(&self.signal_valid_minutes) {
            return Err(SettingsError::Invalid(format!(
                "signal_valid_minutes must be between 1 and {}: {}",
                MAX_SIGNAL_VALID_MINUTES, self.signal_valid_minutes
            )));
        }
        if !(1..=MAX_DELETE_AFTER_MINUTES).contains(&self.delete_after_minutes) {
            return Err(SettingsError::Invalid(format!(
                "delete_after_minutes must be between 1 and {}: {}",
                MAX_DELETE_AFTER_MINUTES, self.delete_after_minutes
            )));
        }
        if offset_from_minutes(self.utc_offset_minutes).is_none() {
            return Err(SettingsError::Invalid(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )));
        }
        Ok(self)
    }
}

pub fn parse_settings(text: &str) -> Result<Settings, SettingsError> {
    serde_json::from_str::<Settings>(text)?.validate()
}

pub fn read_settings(path: impl AsRef<Path>) -> Result<Settings, SettingsError> {
    let settings = std::fs::read_to_string(path)?;
    parse_settings(&settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"{
        "deriv": {"app_id": "1089"},
        "telegram": {"bot_token": "123:abc", "chat_id": "-100"}
    }"#;

    #[test]
    fn defaults_are_applied() {
        let settings = parse_settings(MINIMAL).unwrap();
        assert_eq!(settings.tick_count, 5000);
        assert_eq!(settings.collection_timeout(), Duration::from_secs(20));
        assert_eq!(settings.poll_interval(), Duration::from_secs(1));
        assert_eq!(settings.signal_valid_minutes, 5);
        assert_eq!(settings.delete_after(), Duration::from_secs(50 * 60));
        assert_eq!(settings.utc_offset().local_minus_utc(), 3 * 3600);
        let symbols: Vec<&str> = settings.markets.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["R_10", "R_25", "R_50", "R_75", "R_100"]);
    }

    #[test]
    fn market_names_are_looked_up() {
        let settings = parse_settings(MINIMAL).unwrap();
        assert_eq!(settings.market_name("R_75"), "Volatility 75 Index");
        assert_eq!(settings.market_name("1HZ10V"), "1HZ10V");
    }

    #[test]
    fn rejects_empty_market_list() {
        let text = r#"{
            "deriv": {"app_id": "1089"},
            "telegram": {"bot_token": "t", "chat_id": "c"},
            "markets": []
        }"#;
        assert!(matches!(parse_settings(text), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn rejects_out_of_range_offset() {
        let text = r#"{
            "deriv": {"app_id": "1089"},
            "telegram": {"bot_token": "t", "chat_id": "c"},
            "utc_offset_minutes": 100000
        }"#;
        assert!(matches!(parse_settings(text), Err(SettingsError::Invalid(_))));
    }

    fn with_field(field: &str, value: &str) -> String {
        format!(
            r#"{{
                "deriv": {{"app_id": "1089"}},
                "telegram": {{"bot_token": "t", "chat_id": "c"}},
                "{}": {}
            }}"#,
            field, value
        )
    }

    #[test]
    fn rejects_out_of_range_validity() {
        let max = i64::MAX.to_string();
        for value in ["0", "-5", "1441", max.as_str()] {
            let text = with_field("signal_valid_minutes", value);
            assert!(
                matches!(parse_settings(&text), Err(SettingsError::Invalid(_))),
                "accepted signal_valid_minutes = {}",
                value
            );
        }
        assert!(parse_settings(&with_field("signal_valid_minutes", "1440")).is_ok());
    }

    #[test]
    fn rejects_out_of_range_delete_delay() {
        let max = u64::MAX.to_string();
        for value in ["0", "2881", max.as_str()] {
            let text = with_field("delete_after_minutes", value);
            assert!(
                matches!(parse_settings(&text), Err(SettingsError::Invalid(_))),
                "accepted delete_after_minutes = {}",
                value
            );
        }
        // Negative values do not fit the field at all
        assert!(matches!(
            parse_settings(&with_field("delete_after_minutes", "-1")),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn unvalidated_durations_do_not_overflow() {
        let mut settings = parse_settings(MINIMAL).unwrap();
        settings.delete_after_minutes = u64::MAX;
        settings.signal_valid_minutes = i64::MAX;
        assert_eq!(settings.delete_after(), Duration::from_secs(u64::MAX));
        assert!(settings.signal_validity().is_none());
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let settings = read_settings(file.path()).unwrap();
        assert_eq!(settings.deriv.app_id, "1089");
        assert_eq!(settings.telegram.chat_id, "-100");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            read_settings("/nonexistent/settings.json"),
            Err(SettingsError::Io(_))
        ));
    }
}
