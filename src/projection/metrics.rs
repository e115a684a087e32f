//! Growth and risk metrics derived from scenario projections
//!
//! Volatility here is the spread between the optimistic and pessimistic outcomes, not a
//! statistical standard deviation, and drawdown is measured on the deterministic
//! pessimistic path.

use serde::{Deserialize, Serialize};

use super::{ScenarioProjections, Settings};
use crate::assumptions::TypeLookup;
use crate::portfolio::Portfolio;
use crate::scenario::Scenario;

/// Cap on the risk score's volatility adjustment
const MAX_VOLATILITY_ADJUSTMENT: f64 = 2.0;

/// Growth and risk indicators for a projected portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Compound annual growth rate in percent; `None` when undefined
    pub growth_rate: Option<f64>,

    /// Scenario dispersion in percent of the current value
    pub volatility: f64,

    /// Largest peak-to-trough drop on the pessimistic path, in percent
    pub max_drawdown: f64,

    /// 1 (lowest) to 10 (highest)
    pub risk_score: u8,

    /// Outstanding debt over gross assets, in percent; only set for leveraged portfolios
    pub debt_to_assets_ratio: Option<f64>,

    /// Value the metrics are measured from: gross assets, or net worth when leveraged
    pub current_value: f64,

    pub final_pessimistic: f64,
    pub final_base: f64,
    pub final_optimistic: f64,
}

/// Compound annual growth rate in percent
///
/// Returns 0 when `current` or `years` is not positive.
pub fn compound_annual_growth(current: f64, future: f64, years: u32) -> f64 {
    if current <= 0.0 || years == 0 {
        return 0.0;
    }
    ((future / current).powf(1.0 / years as f64) - 1.0) * 100.0
}

/// Half the optimistic-pessimistic spread relative to `current`, in percent
///
/// Returns 0 when `current` is zero.
pub fn scenario_dispersion(pessimistic_final: f64, optimistic_final: f64, current: f64) -> f64 {
    let denominator = 2.0 * current.abs();
    if denominator == 0.0 {
        return 0.0;
    }
    (optimistic_final - pessimistic_final) / denominator * 100.0
}

/// Largest percentage drop from a running peak to any later value
///
/// Non-positive peaks are skipped since a percentage drop from them has no meaning.
pub fn max_drawdown<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for value in values {
        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            worst = worst.max((peak - value) / peak * 100.0);
        }
    }

    worst
}

/// Value-weighted asset risk plus a capped volatility adjustment, clamped to 1..=10
pub fn risk_score<R: TypeLookup + ?Sized>(portfolio: &Portfolio, registry: &R, volatility: f64) -> u8 {
    let total: f64 = portfolio.assets().iter().map(|a| a.value).sum();

    let weighted = if total > 0.0 {
        portfolio
            .assets()
            .iter()
            .map(|a| a.value / total * registry.risk_weight(a.asset_type))
            .sum()
    } else {
        0.0
    };

    let volatility = if volatility.is_finite() { volatility } else { 0.0 };
    let adjustment = (volatility / 20.0).clamp(0.0, MAX_VOLATILITY_ADJUSTMENT);
    (weighted + adjustment).round().clamp(1.0, 10.0) as u8
}

fn final_nominal(projections: &ScenarioProjections, scenario: Scenario) -> f64 {
    projections.final_point(scenario).map(|p| p.nominal).unwrap_or(0.0)
}

fn final_net_worth(projections: &ScenarioProjections, scenario: Scenario) -> f64 {
    projections.final_point(scenario).map(|p| p.net_worth).unwrap_or(0.0)
}

/// Metrics on gross asset value, for portfolios without debt
pub fn calculate_metrics<R: TypeLookup + ?Sized>(
    registry: &R,
    portfolio: &Portfolio,
    projections: &ScenarioProjections,
    settings: &Settings,
) -> PortfolioMetrics {
    let current_value: f64 = portfolio.assets().iter().map(|a| a.value).sum();
    let final_pessimistic = final_nominal(projections, Scenario::Pessimistic);
    let final_base = final_nominal(projections, Scenario::Base);
    let final_optimistic = final_nominal(projections, Scenario::Optimistic);

    let volatility = if current_value > 0.0 {
        scenario_dispersion(final_pessimistic, final_optimistic, current_value)
    } else {
        0.0
    };

    PortfolioMetrics {
        growth_rate: Some(compound_annual_growth(current_value, final_base, settings.horizon_years)),
        volatility,
        max_drawdown: max_drawdown(projections.pessimistic.iter().map(|p| p.nominal)),
        risk_score: risk_score(portfolio, registry, volatility),
        debt_to_assets_ratio: None,
        current_value,
        final_pessimistic,
        final_base,
        final_optimistic,
    }
}

/// Metrics on net worth, for portfolios carrying debt
///
/// Growth rate is `None` whenever current or final base net worth is not positive: a
/// compound rate between values of different sign, or from zero, is undefined.
///
/// Today's net worth subtracts each loan's `current_balance`, while the projected
/// trajectory amortizes every loan from its full principal at year 0. Growth rate and
/// volatility are measured from today's net worth, so for a part-repaid loan they start
/// above the trajectory's own year-0 point.
pub fn calculate_metrics_with_liabilities<R: TypeLookup + ?Sized>(
    registry: &R,
    portfolio: &Portfolio,
    projections: &ScenarioProjections,
    settings: &Settings,
) -> PortfolioMetrics {
    let current_assets: f64 = portfolio.assets().iter().map(|a| a.value).sum();
    let current_liabilities: f64 = portfolio.liabilities().iter().map(|l| l.current_balance()).sum();
    let current_net_worth = current_assets - current_liabilities;

    let final_pessimistic = final_net_worth(projections, Scenario::Pessimistic);
    let final_base = final_net_worth(projections, Scenario::Base);
    let final_optimistic = final_net_worth(projections, Scenario::Optimistic);

    let growth_rate = if settings.horizon_years == 0 {
        Some(0.0)
    } else if current_net_worth > 0.0 && final_base > 0.0 {
        Some(compound_annual_growth(current_net_worth, final_base, settings.horizon_years))
    } else {
        None
    };

    let volatility = scenario_dispersion(final_pessimistic, final_optimistic, current_net_worth);

    let debt_to_assets_ratio = if current_assets > 0.0 {
        current_liabilities / current_assets * 100.0
    } else {
        0.0
    };

    PortfolioMetrics {
        growth_rate,
        volatility,
        max_drawdown: max_drawdown(projections.pessimistic.iter().map(|p| p.net_worth)),
        risk_score: risk_score(portfolio, registry, volatility),
        debt_to_assets_ratio: Some(debt_to_assets_ratio),
        current_value: current_net_worth,
        final_pessimistic,
        final_base,
        final_optimistic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::TypeRegistry;
    use crate::portfolio::{Asset, AssetType, Liability, LiabilityType};
    use crate::projection::ProjectionEngine;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cagr() {
        assert_abs_diff_eq!(compound_annual_growth(100.0, 121.0, 2), 10.0, epsilon = 1e-9);
        assert_eq!(compound_annual_growth(0.0, 121.0, 2), 0.0);
        assert_eq!(compound_annual_growth(-5.0, 121.0, 2), 0.0);
        assert_eq!(compound_annual_growth(100.0, 121.0, 0), 0.0);
    }

    #[test]
    fn test_dispersion() {
        assert_abs_diff_eq!(scenario_dispersion(90.0, 130.0, 100.0), 20.0);
        assert_eq!(scenario_dispersion(90.0, 130.0, 0.0), 0.0);
        // Negative base uses its magnitude
        assert_abs_diff_eq!(scenario_dispersion(-120.0, -80.0, -100.0), 20.0);
    }

    #[test]
    fn test_max_drawdown() {
        assert_eq!(max_drawdown(vec![100.0, 110.0, 120.0]), 0.0);
        assert_abs_diff_eq!(max_drawdown(vec![100.0, 200.0, 150.0, 180.0, 100.0]), 50.0);
        assert_abs_diff_eq!(max_drawdown(vec![100.0, 80.0, 300.0, 240.0]), 20.0);
        assert_eq!(max_drawdown(Vec::new()), 0.0);
        // No percentage drop from a non-positive peak
        assert_eq!(max_drawdown(vec![-10.0, -20.0]), 0.0);
    }

    #[test]
    fn test_risk_score_weighting() {
        let registry = TypeRegistry::default_registry();
        let all_cash = Portfolio::new(vec![Asset::new("c", AssetType::Cash, "Cash", 1000.0)], vec![]).unwrap();
        let all_stocks = Portfolio::new(vec![Asset::new("s", AssetType::Stocks, "Stocks", 1000.0)], vec![]).unwrap();
        let half = Portfolio::new(
            vec![
                Asset::new("s", AssetType::Stocks, "Stocks", 500.0),
                Asset::new("b", AssetType::Bonds, "Bonds", 500.0),
            ],
            vec![],
        )
        .unwrap();

        assert_eq!(risk_score(&all_cash, &registry, 0.0), 1);
        assert_eq!(risk_score(&all_stocks, &registry, 0.0), 6);
        assert_eq!(risk_score(&half, &registry, 0.0), 4);
        // Volatility adjustment is capped at +2
        assert_eq!(risk_score(&all_stocks, &registry, 500.0), 8);
        // Empty portfolio still scores the minimum
        assert_eq!(risk_score(&Portfolio::default(), &registry, 0.0), 1);
    }

    #[test]
    fn test_non_finite_volatility_ignored() {
        let registry = TypeRegistry::default_registry();
        let stocks = Portfolio::new(vec![Asset::new("s", AssetType::Stocks, "Stocks", 1000.0)], vec![]).unwrap();
        assert_eq!(risk_score(&stocks, &registry, f64::NAN), 6);
        assert_eq!(risk_score(&stocks, &registry, f64::INFINITY), 6);
        assert_eq!(risk_score(&Portfolio::default(), &registry, f64::NAN), 1);
    }

    fn indebted_portfolio() -> Portfolio {
        Portfolio::new(
            vec![Asset::new("c", AssetType::Cash, "Cash", 10_000.0)],
            vec![Liability::new("b", LiabilityType::Business, 100_000.0, 11.0, 10).with_current_balance(5_000.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_growth_undefined_when_net_worth_turns_negative() {
        let engine = ProjectionEngine::default();
        let portfolio = indebted_portfolio();
        let settings = Settings {
            horizon_years: 5,
            ..Default::default()
        };
        let projections = engine.calculate_projections(&portfolio, &engine.rate_table(settings.inflation), &settings);

        let metrics = calculate_metrics_with_liabilities(engine.registry(), &portfolio, &projections, &settings);
        assert_eq!(metrics.current_value, 5_000.0);
        assert!(metrics.final_base < 0.0);
        assert_eq!(metrics.growth_rate, None);
    }

    #[test]
    fn test_growth_zero_for_zero_horizon_with_debt() {
        let engine = ProjectionEngine::default();
        let portfolio = indebted_portfolio();
        let settings = Settings {
            horizon_years: 0,
            ..Default::default()
        };
        let projections = engine.calculate_projections(&portfolio, &engine.rate_table(settings.inflation), &settings);

        // Year 0 net worth is negative, yet a zero horizon reports no growth
        let metrics = calculate_metrics_with_liabilities(engine.registry(), &portfolio, &projections, &settings);
        assert!(metrics.final_base < 0.0);
        assert_eq!(metrics.growth_rate, Some(0.0));
    }

    #[test]
    fn test_unknown_type_uses_medium_weight() {
        let stocks = Portfolio::new(vec![Asset::new("s", AssetType::Stocks, "Stocks", 1000.0)], vec![]).unwrap();
        assert_eq!(risk_score(&stocks, &TypeRegistry::empty(), 0.0), 4);
    }
}
