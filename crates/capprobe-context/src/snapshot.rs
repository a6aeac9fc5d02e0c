//! Load-once environment snapshot.

use crate::sources::EnvironmentDescriptorSource;
use capprobe_core::{EnvironmentSnapshot, ProbeError, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, info};

/// Fetches the environment snapshot at most once.
///
/// A failed load is not cached; the next call retries the source.
pub struct EnvironmentSnapshotLoader {
    source: Arc<dyn EnvironmentDescriptorSource>,
    snapshot: OnceCell<EnvironmentSnapshot>,
}

impl EnvironmentSnapshotLoader {
    /// Create a loader over an environment source.
    #[must_use]
    pub fn new(source: Arc<dyn EnvironmentDescriptorSource>) -> Self {
        Self {
            source,
            snapshot: OnceCell::new(),
        }
    }

    /// Get the snapshot, fetching it on first call.
    ///
    /// # Errors
    /// Returns error if the source fails, returns other than exactly one
    /// record, or the record does not validate.
    pub fn get(&self) -> Result<&EnvironmentSnapshot> {
        self.snapshot.get_or_try_init(|| self.load())
    }

    /// Whether the snapshot has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.snapshot.get().is_some()
    }

    fn load(&self) -> Result<EnvironmentSnapshot> {
        debug!("fetching environment snapshot");
        let mut records = self
            .source
            .fetch_environment()
            .map_err(|e| ProbeError::collaborator("environment source", e))?;

        if records.len() != 1 {
            return Err(ProbeError::SnapshotCardinality {
                count: records.len(),
            });
        }

        let snapshot = EnvironmentSnapshot::try_from(records.remove(0))?;
        info!(
            environment_id = %snapshot.id(),
            instance = snapshot.instance_name(),
            sandbox = snapshot.is_sandbox(),
            "environment snapshot loaded"
        );
        Ok(snapshot)
    }
}

impl std::fmt::Debug for EnvironmentSnapshotLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentSnapshotLoader")
            .field("snapshot", &self.snapshot.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceResult;
    use capprobe_core::{EnvironmentRecord, SourceError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedSource {
        responses: Mutex<Vec<SourceResult<Vec<EnvironmentRecord>>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(responses: Vec<SourceResult<Vec<EnvironmentRecord>>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl EnvironmentDescriptorSource for ScriptedSource {
        fn fetch_environment(&self) -> SourceResult<Vec<EnvironmentRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn record() -> EnvironmentRecord {
        EnvironmentRecord {
            id: "00D000000000001".to_string(),
            name: "Acme".to_string(),
            namespace_prefix: Some(String::new()),
            organization_type: "Enterprise Edition".to_string(),
            is_sandbox: true,
            is_read_only: false,
            instance_name: "CS42".to_string(),
            fiscal_year_start_month: 4,
            locale_key: "en_GB".to_string(),
            time_zone_key: "Europe/London".to_string(),
        }
    }

    #[test]
    fn test_loads_once() {
        let source = ScriptedSource::new(vec![Ok(vec![record()])]);
        let loader = EnvironmentSnapshotLoader::new(source.clone());

        assert!(!loader.is_loaded());
        for _ in 0..5 {
            let snapshot = loader.get().expect("load snapshot");
            assert_eq!(snapshot.name(), "Acme");
        }
        assert!(loader.is_loaded());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wrong_cardinality_is_fatal() {
        let source = ScriptedSource::new(vec![Ok(vec![]), Ok(vec![record(), record()])]);
        let loader = EnvironmentSnapshotLoader::new(source);

        let err = loader.get().expect_err("zero records");
        assert!(matches!(err, ProbeError::SnapshotCardinality { count: 0 }));
        let err = loader.get().expect_err("two records");
        assert!(matches!(err, ProbeError::SnapshotCardinality { count: 2 }));
    }

    #[test]
    fn test_failure_is_not_cached() {
        let source = ScriptedSource::new(vec![
            Err(SourceError::Unavailable("metadata store offline".to_string())),
            Ok(vec![record()]),
        ]);
        let loader = EnvironmentSnapshotLoader::new(source.clone());

        let err = loader.get().expect_err("first load fails");
        assert!(matches!(err, ProbeError::Source { .. }));
        assert!(!loader.is_loaded());

        assert!(loader.get().is_ok());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
