//! Core projection engine for yearly net-worth projections

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, warn};

use super::cache::{CacheStats, ProjectionCache, ProjectionKey};
use super::detailed::{build_detailed_projections, DetailedProjections};
use super::metrics::{self, PortfolioMetrics};
use super::points::{ScenarioProjections, YearPoint};
use super::Settings;
use crate::amortization::AmortizationCalculator;
use crate::assumptions::{TypeLookup, TypeRegistry};
use crate::portfolio::{AssetType, Liability, Portfolio};
use crate::scenario::{Scenario, ScenarioRateTable};

/// Value after `years` of annual compounding at `rate_percent`
pub(crate) fn compound(value: f64, rate_percent: f64, years: u32) -> f64 {
    value * (1.0 + rate_percent / 100.0).powi(years as i32)
}

/// Scenario rate for an asset type; tracks inflation when the table has no entry
pub(crate) fn scenario_rate(
    rates: &ScenarioRateTable,
    asset_type: AssetType,
    scenario: Scenario,
    settings: &Settings,
) -> f64 {
    rates.rate(asset_type, scenario).unwrap_or_else(|| {
        warn!("No {scenario} rate for {asset_type}, assuming it tracks inflation");
        settings.inflation
    })
}

/// Total outstanding balance of all liabilities after `elapsed_years`
///
/// Loan balances follow their amortization schedule and do not depend on the scenario.
pub fn calculate_liabilities_value(liabilities: &[Liability], elapsed_years: f64) -> f64 {
    liabilities
        .iter()
        .map(|l| AmortizationCalculator::calculate_remaining_balance(l, elapsed_years))
        .sum()
}

/// Main projection engine
///
/// Holds the type registry and a memoization cache. The cache sits behind a mutex held
/// across lookup, computation and insertion, so the engine can be shared between
/// threads and a given input is computed at most once.
pub struct ProjectionEngine<R: TypeLookup = TypeRegistry> {
    registry: R,
    cache: Mutex<ProjectionCache>,
}

impl<R: TypeLookup> ProjectionEngine<R> {
    /// Create an engine with an unbounded cache
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            cache: Mutex::new(ProjectionCache::new()),
        }
    }

    /// Create an engine whose cache keeps at most `capacity` results
    pub fn with_cache_capacity(registry: R, capacity: usize) -> Self {
        Self {
            registry,
            cache: Mutex::new(ProjectionCache::with_capacity(capacity)),
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Rate table derived from the registry at the given inflation
    pub fn rate_table(&self, inflation: f64) -> ScenarioRateTable {
        ScenarioRateTable::from_registry(&self.registry, inflation)
    }

    /// Project all three scenarios, reusing a cached result for identical inputs
    ///
    /// The returned projections are shared with the cache and must be treated as
    /// read-only.
    pub fn calculate_projections(
        &self,
        portfolio: &Portfolio,
        rates: &ScenarioRateTable,
        settings: &Settings,
    ) -> Arc<ScenarioProjections> {
        let key = ProjectionKey::new(portfolio, rates, settings);
        let mut cache = self.lock_cache();

        if let Some(cached) = cache.get(&key) {
            debug!("Projection cache hit ({} entries)", cache.len());
            return cached;
        }

        debug!(
            "Projection cache miss: {} assets, {} liabilities, {} years",
            portfolio.assets().len(),
            portfolio.liabilities().len(),
            settings.horizon_years
        );

        let projections = Arc::new(ScenarioProjections {
            pessimistic: self.calculate_scenario_projection(portfolio, rates, Scenario::Pessimistic, settings),
            base: self.calculate_scenario_projection(portfolio, rates, Scenario::Base, settings),
            optimistic: self.calculate_scenario_projection(portfolio, rates, Scenario::Optimistic, settings),
        });
        cache.insert(key, Arc::clone(&projections));

        projections
    }

    /// Project one scenario, years 0 through the horizon (uncached)
    pub fn calculate_scenario_projection(
        &self,
        portfolio: &Portfolio,
        rates: &ScenarioRateTable,
        scenario: Scenario,
        settings: &Settings,
    ) -> Vec<YearPoint> {
        // Group once; each type compounds independently at its own rate
        let mut by_type: BTreeMap<AssetType, f64> = BTreeMap::new();
        for asset in portfolio.assets() {
            *by_type.entry(asset.asset_type).or_insert(0.0) += asset.value;
        }
        let type_rates: Vec<(AssetType, f64, f64)> = by_type
            .into_iter()
            .map(|(t, value)| (t, value, scenario_rate(rates, t, scenario, settings)))
            .collect();

        (0..=settings.horizon_years)
            .map(|year| {
                let breakdown: BTreeMap<AssetType, f64> = type_rates
                    .iter()
                    .map(|&(t, value, rate)| (t, compound(value, rate, year)))
                    .collect();
                let nominal: f64 = breakdown.values().sum();
                let liabilities = calculate_liabilities_value(portfolio.liabilities(), year as f64);
                let net_worth = nominal - liabilities;

                YearPoint {
                    year,
                    nominal,
                    real: settings.to_real(net_worth, year),
                    breakdown,
                    liabilities,
                    net_worth,
                }
            })
            .collect()
    }

    /// Metrics on gross asset value (portfolios without debt)
    pub fn calculate_metrics(
        &self,
        portfolio: &Portfolio,
        projections: &ScenarioProjections,
        settings: &Settings,
    ) -> PortfolioMetrics {
        metrics::calculate_metrics(&self.registry, portfolio, projections, settings)
    }

    /// Metrics on net worth, including the debt-to-assets ratio
    pub fn calculate_metrics_with_liabilities(
        &self,
        portfolio: &Portfolio,
        projections: &ScenarioProjections,
        settings: &Settings,
    ) -> PortfolioMetrics {
        metrics::calculate_metrics_with_liabilities(&self.registry, portfolio, projections, settings)
    }

    /// Pick the metrics variant matching the portfolio
    pub fn portfolio_metrics(
        &self,
        portfolio: &Portfolio,
        projections: &ScenarioProjections,
        settings: &Settings,
    ) -> PortfolioMetrics {
        if portfolio.has_liabilities() {
            self.calculate_metrics_with_liabilities(portfolio, projections, settings)
        } else {
            self.calculate_metrics(portfolio, projections, settings)
        }
    }

    /// Per-asset series across all scenarios plus the liability schedule (uncached)
    pub fn calculate_detailed_projections(
        &self,
        portfolio: &Portfolio,
        rates: &ScenarioRateTable,
        settings: &Settings,
    ) -> DetailedProjections {
        build_detailed_projections(portfolio, rates, settings)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats()
    }

    /// Drop all cached projections, e.g. after structural portfolio edits
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    fn lock_cache(&self) -> MutexGuard<'_, ProjectionCache> {
        // Entries are immutable once inserted, so a poisoned cache is still consistent
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ProjectionEngine<TypeRegistry> {
    fn default() -> Self {
        Self::new(TypeRegistry::default_registry())
    }
}
