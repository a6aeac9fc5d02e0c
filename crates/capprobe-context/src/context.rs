//! The capability context facade.

use crate::currency::AdvancedCurrencyManagementProbe;
use crate::isolation::TestIsolationProbe;
use crate::partition::{CachePartitionResolver, PartitionState};
use crate::platform_cache::PlatformCacheAvailabilityCheck;
use crate::snapshot::EnvironmentSnapshotLoader;
use crate::sources::{
    CachePartitionMetadataSource, CacheReachabilityProbe, CurrencyConversionRateSource,
    EnvironmentDescriptorSource, SessionInfoSource, SocialApiProbe,
};
use capprobe_core::{
    CapabilityId, CapabilityReport, EnvironmentId, EnvironmentSnapshot, FiscalMonth, ProbeConfig,
    Result,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// The external collaborators a context probes through.
#[derive(Clone)]
pub struct Collaborators {
    /// Environment attribute record
    pub environment: Arc<dyn EnvironmentDescriptorSource>,
    /// Cache partition metadata
    pub partitions: Arc<dyn CachePartitionMetadataSource>,
    /// Live cache reachability
    pub reachability: Arc<dyn CacheReachabilityProbe>,
    /// Session facts
    pub session: Arc<dyn SessionInfoSource>,
    /// Isolation-signalling social API call
    pub social: Arc<dyn SocialApiProbe>,
    /// Dated currency conversion rates
    pub currency_rates: Arc<dyn CurrencyConversionRateSource>,
}

/// Single entry point for environment attributes and capability probes.
///
/// One context corresponds to one logical execution scope. Expensive lookups
/// run at most once per context and their answers never refresh; create a new
/// context for a fresh view. A context can be shared across threads: each
/// memoized lookup still runs once and every caller sees the first answer.
///
/// Snapshot accessors load the environment snapshot on first call (a remote
/// lookup) and fail only if that load fails. Capability checks never fail.
pub struct CapabilityContext {
    snapshot: EnvironmentSnapshotLoader,
    partitions: CachePartitionResolver,
    isolation: TestIsolationProbe,
    currency: AdvancedCurrencyManagementProbe,
    reachability: Arc<dyn CacheReachabilityProbe>,
    session: Arc<dyn SessionInfoSource>,
    platform_cache_disabled: AtomicBool,
    modern_theme_marker: String,
}

impl CapabilityContext {
    /// Create a context over the given collaborators.
    #[must_use]
    pub fn new(collaborators: Collaborators, config: &ProbeConfig) -> Self {
        let Collaborators {
            environment,
            partitions,
            reachability,
            session,
            social,
            currency_rates,
        } = collaborators;

        Self {
            snapshot: EnvironmentSnapshotLoader::new(environment),
            partitions: CachePartitionResolver::new(
                partitions,
                config.platform_cache.scope_prefix.clone(),
            ),
            isolation: TestIsolationProbe::new(Arc::clone(&session), social),
            currency: AdvancedCurrencyManagementProbe::new(
                Arc::clone(&session),
                currency_rates,
                &config.currency,
            ),
            reachability,
            session,
            platform_cache_disabled: AtomicBool::new(config.platform_cache.disabled),
            modern_theme_marker: config.session.modern_theme_marker.to_lowercase(),
        }
    }

    /// The environment snapshot, loaded on first call.
    pub fn snapshot(&self) -> Result<&EnvironmentSnapshot> {
        self.snapshot.get()
    }

    /// Environment identifier.
    pub fn id(&self) -> Result<&EnvironmentId> {
        Ok(self.snapshot()?.id())
    }

    /// Environment display name.
    pub fn name(&self) -> Result<&str> {
        Ok(self.snapshot()?.name())
    }

    /// Whether this is a sandbox environment.
    pub fn is_sandbox(&self) -> Result<bool> {
        Ok(self.snapshot()?.is_sandbox())
    }

    /// Whether the environment has a namespace prefix.
    pub fn has_namespace_prefix(&self) -> Result<bool> {
        Ok(self.snapshot()?.has_namespace_prefix())
    }

    /// Namespace prefix, `None` when empty.
    pub fn namespace_prefix(&self) -> Result<Option<&str>> {
        Ok(self.snapshot()?.namespace_prefix())
    }

    /// Organization type label.
    pub fn org_type(&self) -> Result<&str> {
        Ok(self.snapshot()?.organization_type())
    }

    /// Whether the environment is read-only.
    pub fn is_read_only(&self) -> Result<bool> {
        Ok(self.snapshot()?.is_read_only())
    }

    /// Instance name.
    pub fn instance_name(&self) -> Result<&str> {
        Ok(self.snapshot()?.instance_name())
    }

    /// Alias of [`Self::instance_name`].
    pub fn pod_name(&self) -> Result<&str> {
        self.instance_name()
    }

    /// Fiscal-year start month.
    pub fn fiscal_year_start_month(&self) -> Result<FiscalMonth> {
        Ok(self.snapshot()?.fiscal_year_start_month())
    }

    /// Default locale key.
    pub fn locale(&self) -> Result<&str> {
        Ok(self.snapshot()?.locale_key())
    }

    /// Default timezone key.
    pub fn time_zone_key(&self) -> Result<&str> {
        Ok(self.snapshot()?.time_zone_key())
    }

    /// Current user id.
    #[must_use]
    pub fn user_id(&self) -> String {
        self.session.user_id()
    }

    /// Whether the session renders the modern UI theme.
    ///
    /// Case-insensitive substring match against the configured theme marker.
    #[must_use]
    pub fn lightning_enabled(&self) -> bool {
        self.session
            .ui_theme()
            .to_lowercase()
            .contains(&self.modern_theme_marker)
    }

    /// Whether basic multi-currency support is enabled.
    #[must_use]
    pub fn multi_currency_enabled(&self) -> bool {
        self.session.is_multi_currency_enabled()
    }

    /// Force [`Self::is_platform_cache_enabled`] to `false`.
    ///
    /// For environments where the cache subsystem cannot be exercised.
    pub fn set_platform_cache_disabled(&self, disabled: bool) {
        self.platform_cache_disabled.store(disabled, Ordering::SeqCst);
    }

    /// Whether the platform cache override is set.
    #[must_use]
    pub fn is_platform_cache_disabled(&self) -> bool {
        self.platform_cache_disabled.load(Ordering::SeqCst)
    }

    /// Whether the platform cache can be used. Never fails; unknown is `false`.
    ///
    /// The partition lookup runs on first call only; the isolation probe and
    /// reachability check run every call.
    #[must_use]
    pub fn is_platform_cache_enabled(&self) -> bool {
        PlatformCacheAvailabilityCheck::new(
            self.is_platform_cache_disabled(),
            &self.isolation,
            &self.partitions,
            self.reachability.as_ref(),
        )
        .is_enabled()
    }

    /// Resolution state of the default cache partition.
    #[must_use]
    pub fn cache_partition_state(&self) -> PartitionState {
        self.partitions.state()
    }

    /// Whether a running test can see the full dataset.
    ///
    /// `false` outside a test harness, without probing.
    ///
    /// # Errors
    /// Propagates unexpected faults from the social API probe.
    pub fn is_see_all_data_true(&self) -> Result<bool> {
        self.isolation.sees_all_data()
    }

    /// Whether a running test only sees test-created data.
    ///
    /// # Errors
    /// Propagates unexpected faults from the social API probe.
    pub fn is_isolated_test_run(&self) -> Result<bool> {
        self.isolation.is_isolated_test_run()
    }

    /// Whether advanced multi-currency management is enabled. Never fails.
    #[must_use]
    pub fn is_advanced_multi_currency_management_enabled(&self) -> bool {
        self.currency.is_enabled()
    }

    /// Probe every capability and collect the answers.
    ///
    /// # Errors
    /// Fails only if the environment snapshot cannot be loaded. An isolation
    /// probe fault leaves [`CapabilityId::SeeAllData`] out of the report.
    pub fn capability_report(&self) -> Result<CapabilityReport> {
        let mut report = CapabilityReport::new(self.id()?.clone());

        for capability in CapabilityId::fail_safe() {
            let available = match capability {
                CapabilityId::PlatformCache => self.is_platform_cache_enabled(),
                CapabilityId::MultiCurrency => self.multi_currency_enabled(),
                CapabilityId::AdvancedMultiCurrency => {
                    self.is_advanced_multi_currency_management_enabled()
                }
                CapabilityId::ModernTheme => self.lightning_enabled(),
                CapabilityId::SeeAllData => continue,
            };
            report.record(*capability, available);
        }

        match self.is_see_all_data_true() {
            Ok(sees_all) => report.record(CapabilityId::SeeAllData, sees_all),
            Err(error) => warn!(%error, "isolation probe failed, omitting from report"),
        }

        Ok(report)
    }
}

impl std::fmt::Debug for CapabilityContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityContext")
            .field("snapshot", &self.snapshot)
            .field("partitions", &self.partitions)
            .field("currency", &self.currency)
            .field("platform_cache_disabled", &self.is_platform_cache_disabled())
            .finish_non_exhaustive()
    }
}
