//! Configuration management for capability probing.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Probe configuration.
///
/// This is loaded from `~/.config/capprobe/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Platform cache availability settings
    pub platform_cache: PlatformCacheConfig,
    /// Advanced currency probe settings
    pub currency: CurrencyConfig,
    /// Session-derived settings
    pub session: SessionConfig,
}

impl ProbeConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    /// - A value fails validation
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if missing.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `CAPPROBE_DISABLE_PLATFORM_CACHE`: Force the platform cache off (true/false)
    /// - `CAPPROBE_SCOPE_PREFIX`: Override the default partition scope prefix
    /// - `CAPPROBE_CURRENCY_POLICY`: `fresh` or `memoized`
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides in place.
    ///
    /// Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CAPPROBE_DISABLE_PLATFORM_CACHE") {
            if let Ok(disabled) = val.parse() {
                self.platform_cache.disabled = disabled;
                tracing::debug!("Override platform_cache.disabled from env: {}", disabled);
            }
        }

        if let Ok(val) = std::env::var("CAPPROBE_SCOPE_PREFIX") {
            tracing::debug!("Override platform_cache.scope_prefix from env: {}", val);
            self.platform_cache.scope_prefix = val;
        }

        if let Ok(val) = std::env::var("CAPPROBE_CURRENCY_POLICY") {
            if let Some(policy) = CurrencyProbePolicy::parse(&val) {
                self.currency.policy = policy;
                tracing::debug!("Override currency.policy from env: {:?}", policy);
            }
        }
    }

    /// Check values that serde alone cannot constrain.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.platform_cache.scope_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "platform_cache.scope_prefix".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.currency.row_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "currency.row_limit".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.session.modern_theme_marker.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "session.modern_theme_marker".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path.parent().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_path".to_string(),
            reason: "no parent directory".to_string(),
        })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/capprobe/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "capprobe", "capprobe").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Platform cache availability settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformCacheConfig {
    /// Force the platform cache to report unavailable
    pub disabled: bool,
    /// Scope prefix used when composing the default partition id
    pub scope_prefix: String,
}

impl Default for PlatformCacheConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            scope_prefix: "local".to_string(),
        }
    }
}

/// Whether the advanced currency probe re-queries on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyProbePolicy {
    /// Query on every call; entitlement may change mid-session
    #[default]
    Fresh,
    /// Query once per context and reuse the answer
    Memoized,
}

impl CurrencyProbePolicy {
    /// Parse `fresh` / `memoized`, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fresh" => Some(Self::Fresh),
            "memoized" => Some(Self::Memoized),
            _ => None,
        }
    }
}

/// Advanced currency probe settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    /// Memoization policy for the probe
    pub policy: CurrencyProbePolicy,
    /// Row limit passed to the dated conversion rate query
    pub row_limit: usize,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            policy: CurrencyProbePolicy::Fresh,
            row_limit: 1,
        }
    }
}

/// Session-derived settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Theme marker matched case-insensitively against the session UI theme
    pub modern_theme_marker: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            modern_theme_marker: "Theme4".to_string(),
        }
    }
}
