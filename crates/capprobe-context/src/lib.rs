//! capprobe context - memoized, fail-safe capability probes for one
//! execution environment.
//!
//! A [`CapabilityContext`] answers "what is this environment, and which
//! optional features can I use here?" through injected collaborators,
//! running each expensive lookup at most once per context.
//!
//! # Modules
//!
//! - [`sources`] - Collaborator traits the context probes through
//! - [`snapshot`] - Load-once environment snapshot
//! - [`partition`] - Default cache partition with tri-state memoization
//! - [`isolation`] - Full-dataset vs data-isolated test run probe
//! - [`platform_cache`] - Fail-safe platform cache availability
//! - [`currency`] - Advanced multi-currency management probe
//! - [`context`] - The facade
//! - [`fixture`] - TOML-described environment for development and tests
//!
//! # Example
//!
//! ```rust
//! use capprobe_context::{CapabilityContext, FixtureEnvironment};
//! use capprobe_core::ProbeConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let env = FixtureEnvironment::from_toml(r#"
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
//! "#)?;
//!
//! let ctx = CapabilityContext::new(env.collaborators(), &ProbeConfig::default());
//! assert_eq!(ctx.name()?, "Acme");
//! assert!(ctx.is_platform_cache_enabled());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod context;
pub mod currency;
pub mod fixture;
pub mod isolation;
pub mod partition;
pub mod platform_cache;
pub mod snapshot;
pub mod sources;

pub use context::{CapabilityContext, Collaborators};
pub use currency::AdvancedCurrencyManagementProbe;
pub use fixture::{CallCounts, FixtureEnvironment, FixtureSpec};
pub use isolation::TestIsolationProbe;
pub use partition::{CachePartitionResolver, PartitionState};
pub use platform_cache::PlatformCacheAvailabilityCheck;
pub use snapshot::EnvironmentSnapshotLoader;
pub use sources::{
    CachePartitionMetadataSource, CacheReachabilityProbe, CurrencyConversionRateSource,
    EnvironmentDescriptorSource, PartitionDescriptor, SessionInfoSource, SocialApiProbe,
    SocialProbeOutcome, SourceResult,
};
