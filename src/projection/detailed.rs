//! Per-asset projections across all scenarios
//!
//! Unlike the aggregate projection, each asset is compounded on its own so a caller can
//! inspect individual holdings side by side.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::engine::{calculate_liabilities_value, compound, scenario_rate};
use super::Settings;
use crate::amortization::AmortizationCalculator;
use crate::portfolio::{AssetType, Portfolio};
use crate::scenario::{Scenario, ScenarioRateTable};

/// Value of one asset at one year under each scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetScenarioPoint {
    pub year: u32,
    pub pessimistic: f64,
    pub base: f64,
    pub optimistic: f64,
}

/// Full series for one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSeries {
    pub asset_id: String,
    pub name: String,
    pub asset_type: AssetType,
    pub points: Vec<AssetScenarioPoint>,
}

/// Outstanding debt at one year; identical in every scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityPoint {
    pub year: u32,
    pub total: f64,
    /// Balance per liability id
    pub balances: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedProjections {
    /// Series keyed by asset id
    pub assets: BTreeMap<String, AssetSeries>,
    pub liabilities: Vec<LiabilityPoint>,
}

pub(crate) fn build_detailed_projections(
    portfolio: &Portfolio,
    rates: &ScenarioRateTable,
    settings: &Settings,
) -> DetailedProjections {
    let years = 0..=settings.horizon_years;

    let assets = portfolio
        .assets()
        .iter()
        .map(|asset| {
            let [pessimistic_rate, base_rate, optimistic_rate] =
                Scenario::ALL.map(|s| scenario_rate(rates, asset.asset_type, s, settings));

            let points = years
                .clone()
                .map(|year| AssetScenarioPoint {
                    year,
                    pessimistic: compound(asset.value, pessimistic_rate, year),
                    base: compound(asset.value, base_rate, year),
                    optimistic: compound(asset.value, optimistic_rate, year),
                })
                .collect();

            let series = AssetSeries {
                asset_id: asset.id.clone(),
                name: asset.name.clone(),
                asset_type: asset.asset_type,
                points,
            };
            (asset.id.clone(), series)
        })
        .collect();

    let liabilities = years
        .map(|year| LiabilityPoint {
            year,
            total: calculate_liabilities_value(portfolio.liabilities(), year as f64),
            balances: portfolio
                .liabilities()
                .iter()
                .map(|l| {
                    (
                        l.id.clone(),
                        AmortizationCalculator::calculate_remaining_balance(l, year as f64),
                    )
                })
                .collect(),
        })
        .collect();

    DetailedProjections { assets, liabilities }
}
