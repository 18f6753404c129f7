//! Session configuration

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::log::{MessageLogConfig, MessageLoggerConfig};

/// Tunables of a [`DashboardSession`](crate::session::DashboardSession)
///
/// Every field has a default, so `{}` is a valid config.
///
/// ```
/// use dashboard_dispatch_core::config::SessionConfig;
///
/// let config = SessionConfig::from_json_str(
///     r#"{"generateCorrelationIds": false, "eventLog": {"exclude": ["CommandStarted"]}}"#,
/// )
/// .unwrap();
/// assert!(!config.generate_correlation_ids);
/// assert_eq!(config.log_capacity, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Assign a fresh correlation id to commands submitted without one
    pub generate_correlation_ids: bool,
    /// Which commands are traced and kept in the command log
    pub command_log: MessageLoggerConfig,
    /// Which events are traced and kept in the event log
    pub event_log: MessageLoggerConfig,
    /// Which slice actions are traced
    pub action_log: MessageLoggerConfig,
    /// Entries kept per log
    pub log_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            generate_correlation_ids: true,
            command_log: MessageLoggerConfig::default(),
            event_log: MessageLoggerConfig::default(),
            action_log: MessageLoggerConfig::default(),
            log_capacity: 100,
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn command_log_config(&self) -> MessageLogConfig {
        MessageLogConfig::new(self.log_capacity, self.command_log.clone())
    }

    pub fn event_log_config(&self) -> MessageLogConfig {
        MessageLogConfig::new(self.log_capacity, self.event_log.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(SessionConfig::from_json_str("{}").unwrap(), SessionConfig::default());
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = SessionConfig::from_json_str(r#"{"logCapacity": "many"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SessionConfig::load("/nonexistent/dashboard-session.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_log_configs_share_capacity() {
        let config = SessionConfig::from_json_str(
            r#"{"logCapacity": 5, "commandLog": {"include": ["Change*"]}}"#,
        )
        .unwrap();

        let commands = config.command_log_config();
        assert_eq!(commands.capacity, 5);
        assert!(commands.filter.should_log("ChangeKpiWidgetHeader"));
        assert!(!commands.filter.should_log("LoadDashboard"));
        assert_eq!(config.event_log_config().capacity, 5);
    }
}
