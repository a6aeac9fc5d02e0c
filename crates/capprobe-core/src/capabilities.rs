//! Capability identifiers and the capability report.
//!
//! A [`CapabilityReport`] is a point-in-time record of what a capability
//! context answered for each probe, suitable for logging or serializing to
//! JSON for diagnostics.

use crate::types::{EnvironmentId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifies an optional platform capability that can be probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityId {
    /// Server-side platform cache with a usable default partition
    PlatformCache,
    /// Basic multi-currency support
    MultiCurrency,
    /// Advanced multi-currency management (dated conversion rates)
    AdvancedMultiCurrency,
    /// Modern UI theme active for the current session
    ModernTheme,
    /// Test run can see the full dataset
    SeeAllData,
}

impl CapabilityId {
    /// Get a human-readable name for this capability.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PlatformCache => "Platform Cache",
            Self::MultiCurrency => "Multi-Currency",
            Self::AdvancedMultiCurrency => "Advanced Multi-Currency Management",
            Self::ModernTheme => "Modern UI Theme",
            Self::SeeAllData => "Full Dataset Visible",
        }
    }

    /// Get a description of what this capability means.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::PlatformCache => {
                "A default cache partition exists and the cache subsystem is reachable"
            }
            Self::MultiCurrency => "The environment stores amounts in more than one currency",
            Self::AdvancedMultiCurrency => "Dated currency conversion rates are enabled",
            Self::ModernTheme => "The current session renders the modern UI theme",
            Self::SeeAllData => "A running test can see pre-existing environment data",
        }
    }

    /// Capabilities that never fail: unknown resolves to unavailable.
    #[must_use]
    pub fn fail_safe() -> &'static [CapabilityId] {
        &[
            Self::PlatformCache,
            Self::MultiCurrency,
            Self::AdvancedMultiCurrency,
            Self::ModernTheme,
        ]
    }

    /// Get all capabilities that could be reported.
    #[must_use]
    pub fn all() -> &'static [CapabilityId] {
        &[
            Self::PlatformCache,
            Self::MultiCurrency,
            Self::AdvancedMultiCurrency,
            Self::ModernTheme,
            Self::SeeAllData,
        ]
    }
}

/// Snapshot of probe answers for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityReport {
    /// Environment the report was produced for
    pub environment_id: EnvironmentId,
    /// Probe answers; a missing entry means the probe was not answerable
    pub capabilities: BTreeMap<CapabilityId, bool>,
    /// When the report was generated
    pub generated_at: Timestamp,
}

impl CapabilityReport {
    /// Create an empty report for an environment.
    #[must_use]
    pub fn new(environment_id: EnvironmentId) -> Self {
        Self {
            environment_id,
            capabilities: BTreeMap::new(),
            generated_at: Timestamp::now(),
        }
    }

    /// Record the answer for a capability.
    pub fn record(&mut self, capability: CapabilityId, available: bool) {
        tracing::debug!(?capability, available, "recording capability");
        self.capabilities.insert(capability, available);
    }

    /// Check if a capability was reported available.
    ///
    /// Unreported capabilities count as unavailable.
    #[must_use]
    pub fn is_available(&self, capability: CapabilityId) -> bool {
        self.capabilities.get(&capability).copied().unwrap_or(false)
    }

    /// Get all capabilities reported available.
    #[must_use]
    pub fn available(&self) -> Vec<CapabilityId> {
        self.capabilities
            .iter()
            .filter(|(_, available)| **available)
            .map(|(capability, _)| *capability)
            .collect()
    }
}
