//! External collaborator traits.
//!
//! A capability context never talks to the platform directly; every remote
//! lookup, side-effecting call or conditional query goes through one of these
//! traits. Implementations must be thread-safe (Send + Sync) so a context can
//! be shared across callers.

use capprobe_core::{EnvironmentRecord, PartitionId, SourceError};
use serde::{Deserialize, Serialize};

/// Result type returned by collaborators.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Supplies the environment attribute record.
pub trait EnvironmentDescriptorSource: Send + Sync {
    /// Fetch the environment records.
    ///
    /// A well-formed environment returns exactly one record.
    fn fetch_environment(&self) -> SourceResult<Vec<EnvironmentRecord>>;
}

/// A cache partition as described by the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionDescriptor {
    /// Developer name of the partition (e.g. `Main`)
    pub developer_name: String,
}

/// Looks up provisioned cache partitions.
pub trait CachePartitionMetadataSource: Send + Sync {
    /// Find a partition in the empty (default) namespace scope.
    ///
    /// `limit` caps the rows the underlying query may return; the resolver
    /// always passes 1.
    fn find_default_partition(&self, limit: usize) -> SourceResult<Option<PartitionDescriptor>>;
}

/// Live reachability check against the cache subsystem.
pub trait CacheReachabilityProbe: Send + Sync {
    /// Succeeds if the partition can be used right now.
    fn check_partition(&self, partition: &PartitionId) -> SourceResult<()>;
}

/// Facts about the current session.
pub trait SessionInfoSource: Send + Sync {
    /// Current user id.
    fn user_id(&self) -> String;

    /// UI theme the platform is rendering for this session.
    fn ui_theme(&self) -> String;

    /// Whether the process is executing under a test harness.
    fn is_running_test(&self) -> bool;

    /// Whether basic multi-currency support is enabled.
    fn is_multi_currency_enabled(&self) -> bool;
}

/// Outcome of the social API probe call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialProbeOutcome {
    /// The call went through: full dataset is visible
    Accepted,
    /// The call was rejected as unsupported: the run is data-isolated
    UnsupportedInIsolation,
}

/// Side-effecting call whose rejection signals data isolation.
pub trait SocialApiProbe: Send + Sync {
    /// Issue the probe call.
    ///
    /// Returns `Err` only for faults other than the isolation rejection.
    fn post_probe(&self) -> SourceResult<SocialProbeOutcome>;
}

/// Conditional query against dated currency conversion rates.
pub trait CurrencyConversionRateSource: Send + Sync {
    /// Count dated conversion rate rows, up to `limit`.
    ///
    /// Environments without the advanced extension reject the query.
    fn count_dated_rates(&self, limit: usize) -> SourceResult<usize>;
}
