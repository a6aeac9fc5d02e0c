//! Data-isolation probe for test runs.

use crate::sources::{SessionInfoSource, SocialApiProbe, SocialProbeOutcome};
use capprobe_core::{ProbeError, Result};
use std::sync::Arc;
use tracing::debug;

/// Determines whether a running test can see the full dataset.
///
/// Evaluated fresh on every call; test configuration may change between
/// invocations in a suite.
pub struct TestIsolationProbe {
    session: Arc<dyn SessionInfoSource>,
    social: Arc<dyn SocialApiProbe>,
}

impl TestIsolationProbe {
    /// Create a probe over the session and social API collaborators.
    #[must_use]
    pub fn new(session: Arc<dyn SessionInfoSource>, social: Arc<dyn SocialApiProbe>) -> Self {
        Self { session, social }
    }

    /// Whether the full dataset is visible to the running test.
    ///
    /// Outside a test harness this is `false` and the social API is not
    /// called. Under test, an accepted probe call means `true`; the isolation
    /// rejection means `false`.
    ///
    /// # Errors
    /// Any other social API fault propagates.
    pub fn sees_all_data(&self) -> Result<bool> {
        if !self.session.is_running_test() {
            return Ok(false);
        }

        let outcome = self
            .social
            .post_probe()
            .map_err(|e| ProbeError::collaborator("social API probe", e))?;

        debug!(?outcome, "isolation probe answered");
        Ok(outcome == SocialProbeOutcome::Accepted)
    }

    /// Whether a test is running with only test-created data visible.
    ///
    /// Always `false` outside a test harness.
    ///
    /// # Errors
    /// Any social API fault other than the isolation rejection propagates.
    pub fn is_isolated_test_run(&self) -> Result<bool> {
        if !self.session.is_running_test() {
            return Ok(false);
        }
        self.sees_all_data().map(|sees_all| !sees_all)
    }
}

impl std::fmt::Debug for TestIsolationProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestIsolationProbe").finish_non_exhaustive()
    }
}
