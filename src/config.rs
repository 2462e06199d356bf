//! Dispatch configuration.
//!
//! Recognized environment variables:
//!
//! - `AUTH_ENABLED`: only the literal string `"false"` disables dispatch;
//!   anything else (including unset) leaves it enabled.
//! - `AUTH_STRATEGY`: `first_match` (default) or `all_required`.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// How the handler chain is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Stop at the first handler that returns a successful result.
    #[default]
    FirstMatch,
    /// Every handler must return a successful result.
    AllRequired,
}

impl Strategy {
    /// Wire name of this strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstMatch => "first_match",
            Self::AllRequired => "all_required",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_match" => Ok(Self::FirstMatch),
            "all_required" => Ok(Self::AllRequired),
            other => Err(ParseStrategyError(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized strategy name.
#[derive(Debug, Clone)]
pub struct ParseStrategyError(String);

impl fmt::Display for ParseStrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown auth strategy `{}` (expected `first_match` or `all_required`)",
            self.0
        )
    }
}

impl std::error::Error for ParseStrategyError {}

/// Configuration for the auth dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Whether dispatch runs at all; when false, `handle()` is a no-op.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Chain evaluation strategy.
    #[serde(default)]
    pub strategy: Strategy,
}

fn default_enabled() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: Strategy::FirstMatch,
        }
    }
}

impl AuthConfig {
    /// Config with dispatch turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Config for first-match evaluation (the default).
    pub fn first_match() -> Self {
        Self::default()
    }

    /// Config for all-required evaluation.
    pub fn all_required() -> Self {
        Self {
            strategy: Strategy::AllRequired,
            ..Default::default()
        }
    }

    /// Build a config from `AUTH_ENABLED` / `AUTH_STRATEGY`.
    pub fn from_env() -> Self {
        Self::from_values(
            env::var("AUTH_ENABLED").ok().as_deref(),
            env::var("AUTH_STRATEGY").ok().as_deref(),
        )
    }

    /// Build a config from raw option values.
    ///
    /// Only the literal `"false"` disables dispatch. An unrecognized
    /// strategy is logged and replaced with the default rather than
    /// silently producing a chain that matches neither branch.
    pub fn from_values(enabled: Option<&str>, strategy: Option<&str>) -> Self {
        let enabled = enabled != Some("false");

        let strategy = match strategy {
            None | Some("") => Strategy::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("{}; falling back to {}", e, Strategy::default());
                Strategy::default()
            }),
        };

        Self { enabled, strategy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = AuthConfig::default();
        assert!(config.enabled);
        assert_eq!(config.strategy, Strategy::FirstMatch);
    }

    #[test]
    fn test_config_disabled() {
        let config = AuthConfig::disabled();
        assert!(!config.enabled);
    }

    #[test]
    fn test_config_all_required() {
        let config = AuthConfig::all_required();
        assert!(config.enabled);
        assert_eq!(config.strategy, Strategy::AllRequired);
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(
            "first_match".parse::<Strategy>().unwrap(),
            Strategy::FirstMatch
        );
        assert_eq!(
            "all_required".parse::<Strategy>().unwrap(),
            Strategy::AllRequired
        );
        assert!("majority".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_strategy_parse_error_display() {
        let err = "majority".parse::<Strategy>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown auth strategy `majority` (expected `first_match` or `all_required`)"
        );
    }

    #[test]
    fn test_from_values_only_literal_false_disables() {
        assert!(!AuthConfig::from_values(Some("false"), None).enabled);
        assert!(AuthConfig::from_values(Some("0"), None).enabled);
        assert!(AuthConfig::from_values(Some("no"), None).enabled);
        assert!(AuthConfig::from_values(None, None).enabled);
    }

    #[test]
    fn test_from_values_strategy() {
        let config = AuthConfig::from_values(None, Some("all_required"));
        assert_eq!(config.strategy, Strategy::AllRequired);

        // Unrecognized strategy falls back to the default.
        let config = AuthConfig::from_values(None, Some("majority"));
        assert_eq!(config.strategy, Strategy::FirstMatch);

        let config = AuthConfig::from_values(None, Some(""));
        assert_eq!(config.strategy, Strategy::FirstMatch);
    }

    #[test]
    fn test_config_serde() {
        let config: AuthConfig =
            serde_json::from_str(r#"{"strategy": "all_required"}"#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.strategy, Strategy::AllRequired);

        let config: AuthConfig = serde_json::from_str(r#"{"enabled": false}"#).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.strategy, Strategy::FirstMatch);
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::FirstMatch.to_string(), "first_match");
        assert_eq!(Strategy::AllRequired.to_string(), "all_required");
    }
}
