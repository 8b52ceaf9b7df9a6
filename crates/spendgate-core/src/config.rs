//! Configuration types for the `SpendGate` spend governor.
//!
//! Two layers live here:
//!
//! - [`GovernorConfig`] - The validated, immutable settings a governor runs with
//! - [`Config`] - The on-disk file format, which produces a [`GovernorConfig`]
//!   through [`Config::governor_config`]
//!
//! # Configuration File
//!
//! Configuration is stored in TOML format at `~/.spendgate/config.toml`.
//!
//! # Default TOML Output
//!
//! ```toml
//! [governor]
//! daily_limit = 5.0
//! enforcement = "per_transaction"
//!
//! [history]
//! enabled = true
//! path = "history.db"
//! ```
//!
//! # Examples
//!
//! ```
//! use spendgate_core::config::{Config, EnforcementMode};
//!
//! let config = Config::default();
//! let governor = config.governor_config().expect("default config is valid");
//! assert_eq!(governor.enforcement(), EnforcementMode::PerTransaction);
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// EnforcementMode
// ============================================================================

/// How the daily limit is applied to a new transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementMode {
    /// Reject any single transaction whose amount exceeds the limit.
    /// Earlier spend in the window is not considered.
    #[default]
    PerTransaction,

    /// Reject when spend already in the rolling window plus the new amount
    /// exceeds the limit.
    Cumulative,
}

impl EnforcementMode {
    /// The configuration-file spelling of this mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PerTransaction => "per_transaction",
            Self::Cumulative => "cumulative",
        }
    }
}

impl fmt::Display for EnforcementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// GovernorConfig
// ============================================================================

/// Validated governor settings. Immutable once built.
///
/// # Examples
///
/// ```
/// use spendgate_core::config::{EnforcementMode, GovernorConfig};
///
/// let config = GovernorConfig::new(5.0)
///     .expect("positive limit")
///     .with_enforcement(EnforcementMode::Cumulative);
/// assert_eq!(config.enforcement(), EnforcementMode::Cumulative);
///
/// assert!(GovernorConfig::new(0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GovernorConfig {
    daily_limit: f64,
    enforcement: EnforcementMode,
}

impl GovernorConfig {
    /// Creates a per-transaction configuration with the given limit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for field `daily_limit` if the
    /// limit is zero, negative, or not finite.
    pub fn new(daily_limit: f64) -> Result<Self, ConfigError> {
        if !daily_limit.is_finite() || daily_limit <= 0.0 {
            return Err(ConfigError::invalid_value(
                "daily_limit",
                daily_limit.to_string(),
            ));
        }

        Ok(Self {
            daily_limit,
            enforcement: EnforcementMode::default(),
        })
    }

    /// Sets the enforcement mode.
    #[must_use]
    pub const fn with_enforcement(mut self, enforcement: EnforcementMode) -> Self {
        self.enforcement = enforcement;
        self
    }

    /// The configured limit.
    #[must_use]
    pub const fn daily_limit(&self) -> f64 {
        self.daily_limit
    }

    /// The configured enforcement mode.
    #[must_use]
    pub const fn enforcement(&self) -> EnforcementMode {
        self.enforcement
    }
}

// ============================================================================
// File configuration
// ============================================================================

/// Top-level configuration file for `SpendGate`.
///
/// # Examples
///
/// ```
/// use spendgate_core::config::{Config, EnforcementMode};
///
/// let toml_str = r#"
/// [governor]
/// daily_limit = 25.0
/// enforcement = "cumulative"
/// "#;
///
/// let config: Config = toml::from_str(toml_str).expect("valid TOML");
/// assert_eq!(config.governor.enforcement, EnforcementMode::Cumulative);
/// assert!(config.history.enabled);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Spend limit settings.
    #[serde(default)]
    pub governor: GovernorSettings,

    /// Transaction history persistence.
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Returns the default daily limit (5.0).
#[must_use]
const fn default_daily_limit() -> f64 {
    5.0
}

/// Returns whether history persistence is on by default (`true`).
#[must_use]
const fn default_history_enabled() -> bool {
    true
}

/// Returns the default history database path, relative to the base directory.
#[must_use]
fn default_history_path() -> String {
    "history.db".to_string()
}

/// The `[governor]` section.
///
/// Values here are unchecked until [`Config::validate`] or
/// [`Config::governor_config`] runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GovernorSettings {
    /// Maximum spend permitted by the policy.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: f64,

    /// How the limit is applied.
    #[serde(default)]
    pub enforcement: EnforcementMode,
}

impl Default for GovernorSettings {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
            enforcement: EnforcementMode::default(),
        }
    }
}

/// The `[history]` section.
///
/// A relative `path` is resolved against the `SpendGate` base directory; a
/// path starting with `~` is expanded to the home directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Persist accepted transactions and replay them on startup.
    #[serde(default = "default_history_enabled")]
    pub enabled: bool,

    /// SQLite database file.
    #[serde(default = "default_history_path")]
    pub path: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_history_enabled(),
            path: default_history_path(),
        }
    }
}

impl Config {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if:
    /// - `governor.daily_limit` is not a positive, finite number
    /// - `history.path` is empty while history is enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limit = self.governor.daily_limit;
        if !limit.is_finite() || limit <= 0.0 {
            return Err(ConfigError::invalid_value(
                "governor.daily_limit",
                limit.to_string(),
            ));
        }

        if self.history.enabled && self.history.path.trim().is_empty() {
            return Err(ConfigError::invalid_value("history.path", "<empty>"));
        }

        Ok(())
    }

    /// Builds the validated [`GovernorConfig`] described by the `[governor]` section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the daily limit is invalid.
    pub fn governor_config(&self) -> Result<GovernorConfig, ConfigError> {
        Ok(GovernorConfig::new(self.governor.daily_limit)?
            .with_enforcement(self.governor.enforcement))
    }

    /// Returns the default configuration as a commented TOML string.
    #[must_use]
    pub fn default_toml() -> String {
        r#"[governor]
# Maximum spend permitted by the policy, in the unit of account (e.g. USDC).
daily_limit = 5.0
# "per_transaction" rejects any single transaction above the limit.
# "cumulative" rejects when the rolling 24h total would exceed the limit.
enforcement = "per_transaction"

[history]
enabled = true
# Relative paths resolve against the SpendGate base directory.
path = "history.db"
"#
        .to_string()
    }

    /// Returns a builder for creating a configuration.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for [`Config`].
///
/// # Examples
///
/// ```
/// use spendgate_core::config::{ConfigBuilder, EnforcementMode};
///
/// let config = ConfigBuilder::new()
///     .daily_limit(20.0)
///     .enforcement(EnforcementMode::Cumulative)
///     .history_enabled(false)
///     .build();
///
/// assert!(!config.history.enabled);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a builder seeded with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the daily limit.
    #[must_use]
    pub const fn daily_limit(mut self, limit: f64) -> Self {
        self.config.governor.daily_limit = limit;
        self
    }

    /// Sets the enforcement mode.
    #[must_use]
    pub const fn enforcement(mut self, mode: EnforcementMode) -> Self {
        self.config.governor.enforcement = mode;
        self
    }

    /// Turns history persistence on or off.
    #[must_use]
    pub const fn history_enabled(mut self, enabled: bool) -> Self {
        self.config.history.enabled = enabled;
        self
    }

    /// Sets the history database path.
    #[must_use]
    pub fn history_path(mut self, path: impl Into<String>) -> Self {
        self.config.history.path = path.into();
        self
    }

    /// Builds the configuration. No validation is performed.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}
