//! Default cache partition discovery with tri-state memoization.

use crate::sources::CachePartitionMetadataSource;
use capprobe_core::PartitionId;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolution state of the default cache partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionState {
    /// The metadata source has not been queried yet
    Unset,
    /// A partition was found
    Resolved(PartitionId),
    /// The query ran and no usable partition exists
    Failed,
}

/// Resolves the default cache partition, querying the metadata source at
/// most once per instance whether or not the query succeeds.
pub struct CachePartitionResolver {
    source: Arc<dyn CachePartitionMetadataSource>,
    scope_prefix: String,
    outcome: OnceCell<Option<PartitionId>>,
}

impl CachePartitionResolver {
    /// Create a resolver composing ids under `scope_prefix`.
    #[must_use]
    pub fn new(
        source: Arc<dyn CachePartitionMetadataSource>,
        scope_prefix: impl Into<String>,
    ) -> Self {
        Self {
            source,
            scope_prefix: scope_prefix.into(),
            outcome: OnceCell::new(),
        }
    }

    /// Resolve the partition id, querying on first call only.
    ///
    /// Not-found, query errors and malformed names all resolve to `None`.
    pub fn resolve(&self) -> Option<&PartitionId> {
        self.outcome.get_or_init(|| self.lookup()).as_ref()
    }

    /// Current resolution state, without triggering a query.
    #[must_use]
    pub fn state(&self) -> PartitionState {
        match self.outcome.get() {
            None => PartitionState::Unset,
            Some(Some(id)) => PartitionState::Resolved(id.clone()),
            Some(None) => PartitionState::Failed,
        }
    }

    fn lookup(&self) -> Option<PartitionId> {
        debug!("querying default cache partition");
        let descriptor = match self.source.find_default_partition(1) {
            Ok(Some(descriptor)) => descriptor,
            Ok(None) => {
                debug!("no cache partition in default scope");
                return None;
            }
            Err(error) => {
                warn!(%error, "cache partition lookup failed");
                return None;
            }
        };

        match PartitionId::compose(&self.scope_prefix, &descriptor.developer_name) {
            Ok(id) => {
                debug!(partition = %id, "cache partition resolved");
                Some(id)
            }
            Err(error) => {
                warn!(%error, "cache partition name rejected");
                None
            }
        }
    }
}

impl std::fmt::Debug for CachePartitionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachePartitionResolver")
            .field("scope_prefix", &self.scope_prefix)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
