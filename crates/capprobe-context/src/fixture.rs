//! TOML-described environment for local development and tests.
//!
//! A [`FixtureEnvironment`] implements every collaborator trait from a
//! [`FixtureSpec`] and counts how often each one is called.
//!
//! ```toml
//! partition = "Main"
//!
//! [[environment]]
//! id = "00D000000000001AAA"
//! name = "Acme"
//! organization_type = "Enterprise Edition"
//! instance_name = "NA42"
//! fiscal_year_start_month = 1
//! locale_key = "en_US"
//! time_zone_key = "America/Los_Angeles"
//!
//! [session]
//! ui_theme = "Theme4d"
//! multi_currency = true
//! ```

use crate::context::Collaborators;
use crate::sources::{
    CachePartitionMetadataSource, CacheReachabilityProbe, CurrencyConversionRateSource,
    EnvironmentDescriptorSource, PartitionDescriptor, SessionInfoSource, SocialApiProbe,
    SocialProbeOutcome, SourceResult,
};
use capprobe_core::{ConfigError, EnvironmentRecord, PartitionId, Result, SourceError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Scripted answers for every collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSpec {
    /// Records returned by the environment source
    pub environment: Vec<EnvironmentRecord>,
    /// If set, the environment source fails with this message
    pub environment_error: Option<String>,
    /// Session facts
    pub session: FixtureSession,
    /// Developer name of the default-scope partition, if one exists
    pub partition: Option<String>,
    /// If set, the partition lookup fails with this message
    pub partition_error: Option<String>,
    /// Cache reachability
    pub cache: FixtureCache,
    /// Social API probe behavior
    pub social: FixtureSocial,
    /// Dated conversion rate query behavior
    pub currency: FixtureCurrency,
}

/// Session facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSession {
    /// Current user id
    pub user_id: String,
    /// UI theme string
    pub ui_theme: String,
    /// Running under a test harness
    pub running_test: bool,
    /// Basic multi-currency enabled
    pub multi_currency: bool,
}

impl Default for FixtureSession {
    fn default() -> Self {
        Self {
            user_id: "005000000000001AAA".to_string(),
            ui_theme: "Theme3".to_string(),
            running_test: false,
            multi_currency: false,
        }
    }
}

/// Cache reachability behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureCache {
    /// If set, every reachability check fails with this message
    pub unreachable: Option<String>,
}

/// Social API probe behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSocial {
    /// Outcome of the probe call
    pub outcome: SocialProbeOutcome,
    /// If set, the call fails with an unexpected fault instead
    pub fault: Option<String>,
}

impl Default for FixtureSocial {
    fn default() -> Self {
        Self {
            outcome: SocialProbeOutcome::UnsupportedInIsolation,
            fault: None,
        }
    }
}

/// Dated conversion rate query behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureCurrency {
    /// Rows the query finds
    pub dated_rates: usize,
    /// If set, the query is rejected as unsupported with this message
    pub unsupported: Option<String>,
}

/// How many times each collaborator was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// Environment source fetches
    pub environment: usize,
    /// Partition metadata queries
    pub partitions: usize,
    /// Reachability checks
    pub reachability: usize,
    /// Social API probe calls
    pub social: usize,
    /// Dated conversion rate queries
    pub currency_rates: usize,
}

#[derive(Debug, Default)]
struct Counters {
    environment: AtomicUsize,
    partitions: AtomicUsize,
    reachability: AtomicUsize,
    social: AtomicUsize,
    currency_rates: AtomicUsize,
}

/// An in-memory environment driven by a [`FixtureSpec`].
#[derive(Debug)]
pub struct FixtureEnvironment {
    spec: FixtureSpec,
    counters: Counters,
}

impl FixtureEnvironment {
    /// Wrap a spec.
    #[must_use]
    pub fn new(spec: FixtureSpec) -> Arc<Self> {
        Arc::new(Self {
            spec,
            counters: Counters::default(),
        })
    }

    /// Parse a spec from TOML.
    pub fn from_toml(contents: &str) -> Result<Arc<Self>> {
        let spec: FixtureSpec = toml::from_str(contents).map_err(ConfigError::from)?;
        Ok(Self::new(spec))
    }

    /// Read and parse a spec file.
    pub fn from_path(path: &Path) -> Result<Arc<Self>> {
        tracing::debug!("Loading fixture from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// The spec this environment answers from.
    #[must_use]
    pub fn spec(&self) -> &FixtureSpec {
        &self.spec
    }

    /// Collaborator handles backed by this environment.
    #[must_use]
    pub fn collaborators(self: &Arc<Self>) -> Collaborators {
        Collaborators {
            environment: self.clone(),
            partitions: self.clone(),
            reachability: self.clone(),
            session: self.clone(),
            social: self.clone(),
            currency_rates: self.clone(),
        }
    }

    /// Calls made so far.
    #[must_use]
    pub fn calls(&self) -> CallCounts {
        CallCounts {
            environment: self.counters.environment.load(Ordering::SeqCst),
            partitions: self.counters.partitions.load(Ordering::SeqCst),
            reachability: self.counters.reachability.load(Ordering::SeqCst),
            social: self.counters.social.load(Ordering::SeqCst),
            currency_rates: self.counters.currency_rates.load(Ordering::SeqCst),
        }
    }
}

impl EnvironmentDescriptorSource for FixtureEnvironment {
    fn fetch_environment(&self) -> SourceResult<Vec<EnvironmentRecord>> {
        self.counters.environment.fetch_add(1, Ordering::SeqCst);
        match &self.spec.environment_error {
            Some(message) => Err(SourceError::Unavailable(message.clone())),
            None => Ok(self.spec.environment.clone()),
        }
    }
}

impl CachePartitionMetadataSource for FixtureEnvironment {
    fn find_default_partition(&self, limit: usize) -> SourceResult<Option<PartitionDescriptor>> {
        self.counters.partitions.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.spec.partition_error {
            return Err(SourceError::Query(message.clone()));
        }
        if limit == 0 {
            return Ok(None);
        }
        Ok(self
            .spec
            .partition
            .as_ref()
            .map(|developer_name| PartitionDescriptor {
                developer_name: developer_name.clone(),
            }))
    }
}

impl CacheReachabilityProbe for FixtureEnvironment {
    fn check_partition(&self, partition: &PartitionId) -> SourceResult<()> {
        self.counters.reachability.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.spec.cache.unreachable {
            return Err(SourceError::Unavailable(message.clone()));
        }
        match &self.spec.partition {
            Some(name) if name == partition.developer_name() => Ok(()),
            _ => Err(SourceError::NotFound(format!("partition {partition}"))),
        }
    }
}

impl SessionInfoSource for FixtureEnvironment {
    fn user_id(&self) -> String {
        self.spec.session.user_id.clone()
    }

    fn ui_theme(&self) -> String {
        self.spec.session.ui_theme.clone()
    }

    fn is_running_test(&self) -> bool {
        self.spec.session.running_test
    }

    fn is_multi_currency_enabled(&self) -> bool {
        self.spec.session.multi_currency
    }
}

impl SocialApiProbe for FixtureEnvironment {
    fn post_probe(&self) -> SourceResult<SocialProbeOutcome> {
        self.counters.social.fetch_add(1, Ordering::SeqCst);
        match &self.spec.social.fault {
            Some(message) => Err(SourceError::Unavailable(message.clone())),
            None => Ok(self.spec.social.outcome),
        }
    }
}

impl CurrencyConversionRateSource for FixtureEnvironment {
    fn count_dated_rates(&self, limit: usize) -> SourceResult<usize> {
        self.counters.currency_rates.fetch_add(1, Ordering::SeqCst);
        match &self.spec.currency.unsupported {
            Some(message) => Err(SourceError::Unsupported(message.clone())),
            None => Ok(self.spec.currency.dated_rates.min(limit)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
partition = "Main"

[[environment]]
id = "00D000000000001AAA"
name = "Acme"
organization_type = "Enterprise Edition"
instance_name = "NA42"
fiscal_year_start_month = 2
locale_key = "en_US"
time_zone_key = "America/Los_Angeles"

[session]
ui_theme = "Theme4d"
multi_currency = true

[social]
outcome = "accepted"

[currency]
dated_rates = 4
"#;

    #[test]
    fn test_parse_minimal_fixture() {
        let env = FixtureEnvironment::from_toml(MINIMAL).expect("parse fixture");
        let spec = env.spec();

        assert_eq!(spec.environment.len(), 1);
        assert_eq!(spec.environment[0].fiscal_year_start_month, 2);
        assert_eq!(spec.environment[0].namespace_prefix, None);
        assert_eq!(spec.partition.as_deref(), Some("Main"));
        assert_eq!(spec.social.outcome, SocialProbeOutcome::Accepted);
        assert!(spec.session.multi_currency);
        assert!(!spec.session.running_test);
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let env = FixtureEnvironment::from_toml("").expect("parse empty fixture");
        let spec = env.spec();

        assert!(spec.environment.is_empty());
        assert!(spec.partition.is_none());
        assert_eq!(spec.social.outcome, SocialProbeOutcome::UnsupportedInIsolation);
        assert_eq!(spec.currency.dated_rates, 0);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = FixtureEnvironment::from_toml("partition = [").expect_err("bad TOML");
        assert!(matches!(err, capprobe_core::ProbeError::Config(_)));
    }

    #[test]
    fn test_counts_calls() {
        let env = FixtureEnvironment::from_toml(MINIMAL).expect("parse fixture");
        let partition = PartitionId::compose("local", "Main").expect("partition id");

        env.fetch_environment().expect("environment");
        env.find_default_partition(1).expect("partition");
        env.check_partition(&partition).expect("reachable");
        env.post_probe().expect("social");
        assert_eq!(env.count_dated_rates(1), Ok(1));

        assert_eq!(
            env.calls(),
            CallCounts {
                environment: 1,
                partitions: 1,
                reachability: 1,
                social: 1,
                currency_rates: 1,
            }
        );
    }

    #[test]
    fn test_unknown_partition_unreachable() {
        let env = FixtureEnvironment::from_toml(MINIMAL).expect("parse fixture");
        let other = PartitionId::compose("local", "Other").expect("partition id");
        assert!(matches!(
            env.check_partition(&other),
            Err(SourceError::NotFound(_))
        ));
    }
}
