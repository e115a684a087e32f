//! Return scenarios and the scenario runner
//!
//! A scenario is one of three fixed return assumptions applied to every asset class for
//! the whole horizon. The three branches are a deterministic fan-out around the base
//! case, not draws from a distribution, so they carry no confidence-interval meaning.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assumptions::{TypeLookup, TypeRegistry};
use crate::error::Result;
use crate::portfolio::{AssetType, Portfolio};
use crate::projection::{PortfolioMetrics, ProjectionEngine, ScenarioProjections, Settings};

/// Scenario label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Pessimistic,
    Base,
    Optimistic,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Pessimistic, Scenario::Base, Scenario::Optimistic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Pessimistic => "pessimistic",
            Scenario::Base => "base",
            Scenario::Optimistic => "optimistic",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annual percentages for each scenario
///
/// Used both for absolute returns (rate table) and for adjustments over inflation
/// (registry).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReturns {
    pub pessimistic: f64,
    pub base: f64,
    pub optimistic: f64,
}

impl ScenarioReturns {
    pub fn new(pessimistic: f64, base: f64, optimistic: f64) -> Self {
        Self {
            pessimistic,
            base,
            optimistic,
        }
    }

    /// Same value in every scenario
    pub fn flat(rate: f64) -> Self {
        Self::new(rate, rate, rate)
    }

    pub fn get(&self, scenario: Scenario) -> f64 {
        match scenario {
            Scenario::Pessimistic => self.pessimistic,
            Scenario::Base => self.base,
            Scenario::Optimistic => self.optimistic,
        }
    }

    /// Shift every scenario by the same number of percentage points
    pub fn shifted(&self, points: f64) -> Self {
        Self::new(self.pessimistic + points, self.base + points, self.optimistic + points)
    }
}

/// Annual return (percent) per asset type and scenario
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRateTable {
    rates: BTreeMap<AssetType, ScenarioReturns>,
}

impl ScenarioRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build `inflation + adjustment` for every asset type
    ///
    /// Types missing from the registry get a zero adjustment, i.e. they track inflation.
    pub fn from_registry<R: TypeLookup + ?Sized>(registry: &R, inflation: f64) -> Self {
        let rates = AssetType::ALL
            .iter()
            .map(|&t| (t, registry.inflation_adjustment(t).shifted(inflation)))
            .collect();
        Self { rates }
    }

    pub fn with_rate(mut self, asset_type: AssetType, returns: ScenarioReturns) -> Self {
        self.set(asset_type, returns);
        self
    }

    pub fn set(&mut self, asset_type: AssetType, returns: ScenarioReturns) {
        self.rates.insert(asset_type, returns);
    }

    pub fn get(&self, asset_type: AssetType) -> Option<&ScenarioReturns> {
        self.rates.get(&asset_type)
    }

    pub fn rate(&self, asset_type: AssetType, scenario: Scenario) -> Option<f64> {
        self.rates.get(&asset_type).map(|r| r.get(scenario))
    }

    /// Entries in asset-type order
    pub fn iter(&self) -> impl Iterator<Item = (&AssetType, &ScenarioReturns)> {
        self.rates.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Everything a caller needs to display one portfolio's projection
#[derive(Debug, Clone)]
pub struct ProjectionOutcome {
    pub rates: ScenarioRateTable,
    pub projections: Arc<ScenarioProjections>,
    pub metrics: PortfolioMetrics,
}

/// Runs projections with rate tables derived from the engine's registry
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let outcome = runner.run(&portfolio, &Settings::default());
/// println!("risk score {}", outcome.metrics.risk_score);
/// ```
pub struct ScenarioRunner<R: TypeLookup = TypeRegistry> {
    engine: ProjectionEngine<R>,
}

impl ScenarioRunner<TypeRegistry> {
    /// Runner over the built-in registry
    pub fn new() -> Self {
        Self::with_registry(TypeRegistry::default_registry())
    }

    /// Runner over a registry loaded from CSV files
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        Ok(Self::with_registry(TypeRegistry::from_csv_path(path)?))
    }
}

impl Default for ScenarioRunner<TypeRegistry> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: TypeLookup> ScenarioRunner<R> {
    pub fn with_registry(registry: R) -> Self {
        Self::with_engine(ProjectionEngine::new(registry))
    }

    pub fn with_engine(engine: ProjectionEngine<R>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ProjectionEngine<R> {
        &self.engine
    }

    /// Project a portfolio with rates derived from the registry and the settings' inflation
    pub fn run(&self, portfolio: &Portfolio, settings: &Settings) -> ProjectionOutcome {
        let rates = ScenarioRateTable::from_registry(self.engine.registry(), settings.inflation);
        self.run_with_rates(portfolio, rates, settings)
    }

    /// Project a portfolio with an explicit rate table
    pub fn run_with_rates(&self, portfolio: &Portfolio, rates: ScenarioRateTable, settings: &Settings) -> ProjectionOutcome {
        let projections = self.engine.calculate_projections(portfolio, &rates, settings);
        let metrics = self.engine.portfolio_metrics(portfolio, &projections, settings);
        ProjectionOutcome {
            rates,
            projections,
            metrics,
        }
    }
}

impl<R: TypeLookup + Sync> ScenarioRunner<R> {
    /// Project many portfolios in parallel over the shared engine
    pub fn run_batch(&self, portfolios: &[Portfolio], settings: &Settings) -> Vec<ProjectionOutcome> {
        info!("Projecting {} portfolios over {} years", portfolios.len(), settings.horizon_years);
        portfolios
            .par_iter()
            .map(|portfolio| self.run(portfolio, settings))
            .collect()
    }
}
