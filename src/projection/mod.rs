//! Projection engine for yearly net-worth projections under three scenarios

mod cache;
mod detailed;
mod engine;
mod metrics;
mod points;
mod settings;

pub use cache::{CacheStats, ProjectionCache, ProjectionKey};
pub use detailed::{AssetScenarioPoint, AssetSeries, DetailedProjections, LiabilityPoint};
pub use engine::{calculate_liabilities_value, ProjectionEngine};
pub use metrics::{compound_annual_growth, max_drawdown, risk_score, scenario_dispersion, PortfolioMetrics};
pub use points::{ProjectionSummary, ScenarioProjections, YearPoint};
pub use settings::{Settings, MAX_HORIZON_YEARS};
