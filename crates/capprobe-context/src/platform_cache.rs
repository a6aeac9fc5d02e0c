//! Fail-safe platform cache availability.

use crate::isolation::TestIsolationProbe;
use crate::partition::CachePartitionResolver;
use crate::sources::CacheReachabilityProbe;
use tracing::{debug, warn};

/// Composes the override flag, isolation probe, partition resolver and a
/// live reachability check into one answer.
///
/// Borrows its parts from the owning context so memoized state stays there.
pub struct PlatformCacheAvailabilityCheck<'a> {
    disabled: bool,
    isolation: &'a TestIsolationProbe,
    resolver: &'a CachePartitionResolver,
    reachability: &'a dyn CacheReachabilityProbe,
}

impl<'a> PlatformCacheAvailabilityCheck<'a> {
    /// Assemble a check.
    #[must_use]
    pub fn new(
        disabled: bool,
        isolation: &'a TestIsolationProbe,
        resolver: &'a CachePartitionResolver,
        reachability: &'a dyn CacheReachabilityProbe,
    ) -> Self {
        Self {
            disabled,
            isolation,
            resolver,
            reachability,
        }
    }

    /// Whether the platform cache can be used. Never fails; unknown is `false`.
    pub fn is_enabled(&self) -> bool {
        if self.disabled {
            debug!("platform cache disabled by override");
            return false;
        }

        match self.isolation.sees_all_data() {
            Ok(false) => {}
            Ok(true) => {
                debug!("platform cache unavailable when the full dataset is visible");
                return false;
            }
            Err(error) => {
                warn!(%error, "isolation probe failed, treating platform cache as unavailable");
                return false;
            }
        }

        let Some(partition) = self.resolver.resolve() else {
            debug!("no cache partition available");
            return false;
        };

        match self.reachability.check_partition(partition) {
            Ok(()) => true,
            Err(error) => {
                warn!(%partition, %error, "cache partition unreachable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{
        CachePartitionMetadataSource, PartitionDescriptor, SessionInfoSource, SocialApiProbe,
        SocialProbeOutcome, SourceResult,
    };
    use capprobe_core::{PartitionId, SourceError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Session(bool);

    impl SessionInfoSource for Session {
        fn user_id(&self) -> String {
            "005000000000001".to_string()
        }

        fn ui_theme(&self) -> String {
            "Theme4d".to_string()
        }

        fn is_running_test(&self) -> bool {
            self.0
        }

        fn is_multi_currency_enabled(&self) -> bool {
            false
        }
    }

    struct Social(SourceResult<SocialProbeOutcome>);

    impl SocialApiProbe for Social {
        fn post_probe(&self) -> SourceResult<SocialProbeOutcome> {
            self.0.clone()
        }
    }

    struct Partitions {
        name: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl CachePartitionMetadataSource for Partitions {
        fn find_default_partition(
            &self,
            _limit: usize,
        ) -> SourceResult<Option<PartitionDescriptor>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.name.map(|name| PartitionDescriptor {
                developer_name: name.to_string(),
            }))
        }
    }

    struct Reachability {
        response: SourceResult<()>,
        calls: AtomicUsize,
    }

    impl CacheReachabilityProbe for Reachability {
        fn check_partition(&self, partition: &PartitionId) -> SourceResult<()> {
            assert_eq!(partition.as_str(), "local.Main");
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    struct Harness {
        isolation: TestIsolationProbe,
        resolver: CachePartitionResolver,
        partitions: Arc<Partitions>,
        reachability: Reachability,
    }

    impl Harness {
        fn new(
            running_test: bool,
            social: SourceResult<SocialProbeOutcome>,
            partition: Option<&'static str>,
            reachable: SourceResult<()>,
        ) -> Self {
            let partitions = Arc::new(Partitions {
                name: partition,
                calls: AtomicUsize::new(0),
            });
            Self {
                isolation: TestIsolationProbe::new(
                    Arc::new(Session(running_test)),
                    Arc::new(Social(social)),
                ),
                resolver: CachePartitionResolver::new(partitions.clone(), "local"),
                partitions,
                reachability: Reachability {
                    response: reachable,
                    calls: AtomicUsize::new(0),
                },
            }
        }

        fn healthy() -> Self {
            Self::new(false, Ok(SocialProbeOutcome::Accepted), Some("Main"), Ok(()))
        }

        fn check(&self, disabled: bool) -> PlatformCacheAvailabilityCheck<'_> {
            PlatformCacheAvailabilityCheck::new(
                disabled,
                &self.isolation,
                &self.resolver,
                &self.reachability,
            )
        }
    }

    #[test]
    fn test_all_probes_pass() {
        let harness = Harness::healthy();
        assert!(harness.check(false).is_enabled());
    }

    #[test]
    fn test_override_wins() {
        let harness = Harness::healthy();
        assert!(!harness.check(true).is_enabled());
        assert_eq!(harness.partitions.calls.load(Ordering::SeqCst), 0);
        assert_eq!(harness.reachability.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_full_dataset_disables_cache() {
        let harness = Harness::new(true, Ok(SocialProbeOutcome::Accepted), Some("Main"), Ok(()));
        assert!(!harness.check(false).is_enabled());
        assert_eq!(harness.reachability.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_isolated_test_run_allows_cache() {
        let harness = Harness::new(
            true,
            Ok(SocialProbeOutcome::UnsupportedInIsolation),
            Some("Main"),
            Ok(()),
        );
        assert!(harness.check(false).is_enabled());
    }

    #[test]
    fn test_isolation_fault_is_swallowed() {
        let harness = Harness::new(
            true,
            Err(SourceError::Query("unexpected".to_string())),
            Some("Main"),
            Ok(()),
        );
        assert!(!harness.check(false).is_enabled());
    }

    #[test]
    fn test_missing_partition() {
        let harness = Harness::new(false, Ok(SocialProbeOutcome::Accepted), None, Ok(()));
        assert!(!harness.check(false).is_enabled());
        assert!(!harness.check(false).is_enabled());
        assert_eq!(harness.partitions.calls.load(Ordering::SeqCst), 1);
        assert_eq!(harness.reachability.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unreachable_cache() {
        let harness = Harness::new(
            false,
            Ok(SocialProbeOutcome::Accepted),
            Some("Main"),
            Err(SourceError::Unavailable("capacity check failed".to_string())),
        );
        assert!(!harness.check(false).is_enabled());
    }

    #[test]
    fn test_reachability_checked_every_call() {
        let harness = Harness::healthy();
        for _ in 0..3 {
            assert!(harness.check(false).is_enabled());
        }
        assert_eq!(harness.partitions.calls.load(Ordering::SeqCst), 1);
        assert_eq!(harness.reachability.calls.load(Ordering::SeqCst), 3);
    }
}
