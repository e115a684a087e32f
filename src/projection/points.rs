//! Projection output structures

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::portfolio::AssetType;
use crate::scenario::Scenario;

/// Portfolio state at one projected year under one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearPoint {
    /// Years from today (0 = present, no growth applied)
    pub year: u32,

    /// Gross asset value before inflation adjustment
    pub nominal: f64,

    /// Net worth deflated to present-day money
    pub real: f64,

    /// Nominal value per asset type present in the portfolio
    pub breakdown: BTreeMap<AssetType, f64>,

    /// Outstanding liability balances
    pub liabilities: f64,

    pub net_worth: f64,
}

/// One trajectory per scenario, each `horizon_years + 1` points long
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjections {
    pub pessimistic: Vec<YearPoint>,
    pub base: Vec<YearPoint>,
    pub optimistic: Vec<YearPoint>,
}

impl ScenarioProjections {
    pub fn get(&self, scenario: Scenario) -> &[YearPoint] {
        match scenario {
            Scenario::Pessimistic => &self.pessimistic,
            Scenario::Base => &self.base,
            Scenario::Optimistic => &self.optimistic,
        }
    }

    pub fn final_point(&self, scenario: Scenario) -> Option<&YearPoint> {
        self.get(scenario).last()
    }

    /// Number of projected years after the present
    pub fn horizon_years(&self) -> u32 {
        self.base.len().saturating_sub(1) as u32
    }

    /// Summary statistics for one scenario
    pub fn summary(&self, scenario: Scenario) -> ProjectionSummary {
        let points = self.get(scenario);
        let initial_net_worth = points.first().map(|p| p.net_worth).unwrap_or(0.0);
        let last = points.last();
        let final_net_worth = last.map(|p| p.net_worth).unwrap_or(0.0);
        let peak_net_worth = points
            .iter()
            .map(|p| p.net_worth)
            .fold(f64::NEG_INFINITY, f64::max);

        ProjectionSummary {
            scenario,
            years: self.horizon_years(),
            final_nominal: last.map(|p| p.nominal).unwrap_or(0.0),
            final_real: last.map(|p| p.real).unwrap_or(0.0),
            final_net_worth,
            peak_net_worth: if peak_net_worth.is_finite() { peak_net_worth } else { 0.0 },
            total_growth: final_net_worth - initial_net_worth,
        }
    }
}

/// Summary statistics for one scenario trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub scenario: Scenario,
    pub years: u32,
    pub final_nominal: f64,
    pub final_real: f64,
    pub final_net_worth: f64,
    pub peak_net_worth: f64,
    /// Change in net worth from year 0 to the final year
    pub total_growth: f64,
}
