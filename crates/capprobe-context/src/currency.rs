//! Advanced multi-currency management probe.

use crate::sources::{CurrencyConversionRateSource, SessionInfoSource};
use capprobe_core::{CurrencyConfig, CurrencyProbePolicy};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::debug;

/// Determines whether dated currency conversion rates are enabled.
///
/// With [`CurrencyProbePolicy::Fresh`] every call re-runs the query; with
/// [`CurrencyProbePolicy::Memoized`] the first answer is kept for the
/// lifetime of the probe.
pub struct AdvancedCurrencyManagementProbe {
    session: Arc<dyn SessionInfoSource>,
    rates: Arc<dyn CurrencyConversionRateSource>,
    policy: CurrencyProbePolicy,
    row_limit: usize,
    memo: OnceCell<bool>,
}

impl AdvancedCurrencyManagementProbe {
    /// Create a probe with the given settings.
    #[must_use]
    pub fn new(
        session: Arc<dyn SessionInfoSource>,
        rates: Arc<dyn CurrencyConversionRateSource>,
        config: &CurrencyConfig,
    ) -> Self {
        Self {
            session,
            rates,
            policy: config.policy,
            row_limit: config.row_limit.max(1),
            memo: OnceCell::new(),
        }
    }

    /// Whether advanced multi-currency management is enabled. Never fails.
    pub fn is_enabled(&self) -> bool {
        match self.policy {
            CurrencyProbePolicy::Fresh => self.probe(),
            CurrencyProbePolicy::Memoized => *self.memo.get_or_init(|| self.probe()),
        }
    }

    fn probe(&self) -> bool {
        if !self.session.is_multi_currency_enabled() {
            return false;
        }

        match self.rates.count_dated_rates(self.row_limit) {
            Ok(rows) => rows > 0,
            Err(error) => {
                // An absent extension rejects the query outright.
                debug!(%error, "dated conversion rate query rejected");
                false
            }
        }
    }
}

impl std::fmt::Debug for AdvancedCurrencyManagementProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvancedCurrencyManagementProbe")
            .field("policy", &self.policy)
            .field("row_limit", &self.row_limit)
            .field("memo", &self.memo.get())
            .finish_non_exhaustive()
    }
}
