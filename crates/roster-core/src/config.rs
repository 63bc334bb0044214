//! Roster core configuration.
//!
//! Configuration is loaded from environment variables. Every field has a default,
//! so an empty environment yields a usable configuration.

use crate::roster::NameRules;
use common::config::{ObservabilityConfig, DEFAULT_LOG_LEVEL};
use common::types::AttendeeId;
use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default reconciler mailbox capacity.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 500;

/// Default buffer for join/departure notices.
pub const DEFAULT_NOTICE_CAPACITY: usize = 64;

/// Delimiter between the organisation prefix and the name in external user ids.
pub const DEFAULT_NAME_DELIMITER: char = '#';

/// Attendee id suffix reserved for content-share pseudo-attendees.
pub const DEFAULT_CONTENT_SHARE_SUFFIX: &str = "#content";

/// Marker appended to content-share display names.
pub const DEFAULT_CONTENT_SHARE_MARKER: &str = "<<Content>>";

/// Fallback display name when the external user id is malformed.
pub const DEFAULT_PLACEHOLDER_NAME: &str = "Unknown";

/// How a mute/unmute batch is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MuteBatchPolicy {
    /// Apply the first non-local element, then stop.
    #[default]
    FirstMatch,
    /// Apply every non-local element in array order.
    All,
}

impl MuteBatchPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first" | "first_match" => Some(Self::FirstMatch),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Roster core configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// The local attendee, once session credentials are known.
    pub local_attendee_id: Option<AttendeeId>,

    /// Display-name derivation rules.
    pub names: NameRules,

    /// Reconciler mailbox capacity (default: 500).
    pub mailbox_capacity: usize,

    /// Join/departure notice broadcast capacity (default: 64).
    pub notice_capacity: usize,

    /// Mute batch handling (default: first match).
    pub mute_batch_policy: MuteBatchPolicy,

    /// Logging configuration.
    pub observability: ObservabilityConfig,

    /// Replay input file for `roster-replay`; stdin when unset.
    pub replay_file: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            local_attendee_id: None,
            names: NameRules::default(),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            notice_capacity: DEFAULT_NOTICE_CAPACITY,
            mute_batch_policy: MuteBatchPolicy::default(),
            observability: ObservabilityConfig::default(),
            replay_file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let local_attendee_id = vars
            .get("ROSTER_LOCAL_ATTENDEE_ID")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(AttendeeId::from);

        let delimiter = match vars.get("ROSTER_NAME_DELIMITER") {
            Some(raw) => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => {
                        return Err(ConfigError::InvalidValue(
                            "ROSTER_NAME_DELIMITER must be a single character".to_string(),
                        ))
                    }
                }
            }
            None => DEFAULT_NAME_DELIMITER,
        };

        let content_share_suffix = vars
            .get("ROSTER_CONTENT_SHARE_SUFFIX")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONTENT_SHARE_SUFFIX.to_string());

        let content_share_marker = vars
            .get("ROSTER_CONTENT_SHARE_MARKER")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONTENT_SHARE_MARKER.to_string());

        let placeholder_name = vars
            .get("ROSTER_PLACEHOLDER_NAME")
            .cloned()
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER_NAME.to_string());

        let mailbox_capacity = vars
            .get("ROSTER_MAILBOX_CAPACITY")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAILBOX_CAPACITY);
        if mailbox_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "ROSTER_MAILBOX_CAPACITY must be greater than zero".to_string(),
            ));
        }

        let notice_capacity = vars
            .get("ROSTER_NOTICE_CAPACITY")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_NOTICE_CAPACITY);
        if notice_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "ROSTER_NOTICE_CAPACITY must be greater than zero".to_string(),
            ));
        }

        let mute_batch_policy = match vars.get("ROSTER_MUTE_BATCH_POLICY") {
            Some(raw) => MuteBatchPolicy::parse(raw).ok_or_else(|| {
                ConfigError::InvalidValue(format!("ROSTER_MUTE_BATCH_POLICY: {raw}"))
            })?,
            None => MuteBatchPolicy::default(),
        };

        let observability = ObservabilityConfig {
            log_level: vars
                .get("ROSTER_LOG_LEVEL")
                .cloned()
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            json_logs: vars
                .get("ROSTER_JSON_LOGS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        };

        let replay_file = vars.get("ROSTER_REPLAY_FILE").cloned();

        Ok(Config {
            local_attendee_id,
            names: NameRules {
                delimiter,
                content_share_suffix,
                content_share_marker,
                placeholder_name,
            },
            mailbox_capacity,
            notice_capacity,
            mute_batch_policy,
            observability,
            replay_file,
        })
    }

    /// Set the local attendee id.
    #[must_use]
    pub fn with_local_attendee(mut self, id: impl Into<AttendeeId>) -> Self {
        self.local_attendee_id = Some(id.into());
        self
    }

    /// Set the mute batch policy.
    #[must_use]
    pub fn with_mute_batch_policy(mut self, policy: MuteBatchPolicy) -> Self {
        self.mute_batch_policy = policy;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_success_with_defaults() {
        let config = Config::from_vars(&HashMap::new()).expect("Config should load successfully");

        assert!(config.local_attendee_id.is_none());
        assert_eq!(config.names.delimiter, DEFAULT_NAME_DELIMITER);
        assert_eq!(config.names.content_share_suffix, DEFAULT_CONTENT_SHARE_SUFFIX);
        assert_eq!(config.names.content_share_marker, DEFAULT_CONTENT_SHARE_MARKER);
        assert_eq!(config.names.placeholder_name, DEFAULT_PLACEHOLDER_NAME);
        assert_eq!(config.mailbox_capacity, DEFAULT_MAILBOX_CAPACITY);
        assert_eq!(config.notice_capacity, DEFAULT_NOTICE_CAPACITY);
        assert_eq!(config.mute_batch_policy, MuteBatchPolicy::FirstMatch);
        assert_eq!(config.observability.log_level, "info");
        assert!(!config.observability.json_logs);
        assert!(config.replay_file.is_none());
    }

    #[test]
    fn test_from_vars_success_with_custom_values() {
        let vars = HashMap::from([
            ("ROSTER_LOCAL_ATTENDEE_ID".to_string(), "self-1".to_string()),
            ("ROSTER_NAME_DELIMITER".to_string(), "|".to_string()),
            ("ROSTER_CONTENT_SHARE_SUFFIX".to_string(), "+share".to_string()),
            ("ROSTER_CONTENT_SHARE_MARKER".to_string(), "[screen]".to_string()),
            ("ROSTER_PLACEHOLDER_NAME".to_string(), "Guest".to_string()),
            ("ROSTER_MAILBOX_CAPACITY".to_string(), "32".to_string()),
            ("ROSTER_NOTICE_CAPACITY".to_string(), "8".to_string()),
            ("ROSTER_MUTE_BATCH_POLICY".to_string(), "all".to_string()),
            ("ROSTER_LOG_LEVEL".to_string(), "debug".to_string()),
            ("ROSTER_JSON_LOGS".to_string(), "true".to_string()),
            ("ROSTER_REPLAY_FILE".to_string(), "/tmp/events.jsonl".to_string()),
        ]);

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.local_attendee_id, Some(AttendeeId::new("self-1")));
        assert_eq!(config.names.delimiter, '|');
        assert_eq!(config.names.content_share_suffix, "+share");
        assert_eq!(config.names.content_share_marker, "[screen]");
        assert_eq!(config.names.placeholder_name, "Guest");
        assert_eq!(config.mailbox_capacity, 32);
        assert_eq!(config.notice_capacity, 8);
        assert_eq!(config.mute_batch_policy, MuteBatchPolicy::All);
        assert_eq!(config.observability.log_level, "debug");
        assert!(config.observability.json_logs);
        assert_eq!(config.replay_file.as_deref(), Some("/tmp/events.jsonl"));
    }

    #[test]
    fn test_blank_local_attendee_is_unset() {
        let vars = HashMap::from([("ROSTER_LOCAL_ATTENDEE_ID".to_string(), "  ".to_string())]);
        let config = Config::from_vars(&vars).unwrap();
        assert!(config.local_attendee_id.is_none());
    }

    #[test]
    fn test_invalid_mute_policy_rejected() {
        let vars = HashMap::from([(
            "ROSTER_MUTE_BATCH_POLICY".to_string(),
            "sometimes".to_string(),
        )]);
        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_zero_mailbox_capacity_rejected() {
        let vars = HashMap::from([("ROSTER_MAILBOX_CAPACITY".to_string(), "0".to_string())]);
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_multi_char_delimiter_rejected() {
        let vars = HashMap::from([("ROSTER_NAME_DELIMITER".to_string(), "##".to_string())]);
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_local_attendee("me")
            .with_mute_batch_policy(MuteBatchPolicy::All);
        assert_eq!(config.local_attendee_id, Some(AttendeeId::new("me")));
        assert_eq!(config.mute_batch_policy, MuteBatchPolicy::All);
    }
}
