//! Freshness policy configuration.
//!
//! Defaults match the process-wide thresholds: data is stale after 24 hours,
//! purged after 72 hours, and a prefetch cycle makes up to three attempts.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Age at which a cached entry should trigger a background refresh.
pub const STALE_THRESHOLD: Duration = Duration::from_secs(24 * 60 * 60);

/// Age at which a cached entry is no longer servable and is purged.
pub const EXPIRY_THRESHOLD: Duration = Duration::from_secs(72 * 60 * 60);

/// Immediate attempts a single prefetch cycle makes before giving up.
pub const PREFETCH_ATTEMPTS: u32 = 3;

/// Tunable freshness policy.
///
/// # Examples
///
/// ```
/// use help_articles::config::FreshnessConfig;
///
/// let config = FreshnessConfig::from_json_str(r#"{"stale_after_secs": 60}"#).unwrap();
/// assert_eq!(config.stale_after().as_secs(), 60);
/// assert_eq!(config.prefetch_attempts, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessConfig {
    pub stale_after_secs: u64,
    pub expire_after_secs: u64,
    pub prefetch_attempts: u32,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: STALE_THRESHOLD.as_secs(),
            expire_after_secs: EXPIRY_THRESHOLD.as_secs(),
            prefetch_attempts: PREFETCH_ATTEMPTS,
        }
    }
}

impl FreshnessConfig {
    /// Parses and validates a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] if the thresholds are inconsistent.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise the
    /// same errors as [`from_json_str`](Self::from_json_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&content)
    }

    /// Checks that `0 < stale < expiry` and that prefetch makes at least one attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stale_after_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "stale_after_secs",
                reason: "must be non-zero".to_owned(),
            });
        }
        if self.stale_after_secs >= self.expire_after_secs {
            return Err(ConfigError::Invalid {
                field: "expire_after_secs",
                reason: format!(
                    "must be greater than stale_after_secs ({})",
                    self.stale_after_secs
                ),
            });
        }
        if self.prefetch_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "prefetch_attempts",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    pub fn expire_after(&self) -> Duration {
        Duration::from_secs(self.expire_after_secs)
    }
}
