//! Net-worth projection engine
//!
//! This library provides:
//! - Portfolio modeling of assets and amortizing liabilities
//! - Fixed-rate loan amortization (payments, balances, schedules)
//! - Yearly nominal and inflation-adjusted projections under pessimistic, base and
//!   optimistic return scenarios, memoized per engine
//! - Growth and risk metrics (CAGR, scenario dispersion, drawdown, risk score)
//! - Type registry for per-asset-class return adjustments and risk levels

pub mod amortization;
pub mod assumptions;
pub mod error;
pub mod portfolio;
pub mod projection;
pub mod report;
pub mod scenario;

// Re-export commonly used types
pub use amortization::AmortizationCalculator;
pub use assumptions::{TypeLookup, TypeRegistry};
pub use error::{Error, Result};
pub use portfolio::{Asset, AssetType, Liability, LiabilityType, Portfolio};
pub use projection::{PortfolioMetrics, ProjectionEngine, ScenarioProjections, Settings, YearPoint};
pub use scenario::{Scenario, ScenarioRateTable, ScenarioReturns, ScenarioRunner};
