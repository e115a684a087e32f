//! Flat tabular output of projections
//!
//! One row per scenario and year, with calendar years counted from the report's
//! start year. Written with the csv crate.

use std::io::Write;

use chrono::{Datelike, Local};
use serde::Serialize;

use crate::error::Result;
use crate::portfolio::AssetType;
use crate::projection::ScenarioProjections;
use crate::scenario::Scenario;

/// One CSV row of a projection report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub scenario: Scenario,
    pub year: u32,
    pub calendar_year: i32,
    pub nominal: f64,
    pub real: f64,
    pub liabilities: f64,
    pub net_worth: f64,
    pub stocks: f64,
    pub bonds: f64,
    pub cash: f64,
    pub realty: f64,
}

/// Current calendar year in local time
pub fn current_year() -> i32 {
    Local::now().year()
}

/// Flatten projections into report rows, scenario by scenario
pub fn report_rows(projections: &ScenarioProjections, start_year: i32) -> Vec<ReportRow> {
    Scenario::ALL
        .iter()
        .flat_map(|&scenario| {
            projections.get(scenario).iter().map(move |point| {
                let by_type = |t: AssetType| point.breakdown.get(&t).copied().unwrap_or(0.0);
                ReportRow {
                    scenario,
                    year: point.year,
                    calendar_year: start_year + point.year as i32,
                    nominal: round_cents(point.nominal),
                    real: round_cents(point.real),
                    liabilities: round_cents(point.liabilities),
                    net_worth: round_cents(point.net_worth),
                    stocks: round_cents(by_type(AssetType::Stocks)),
                    bonds: round_cents(by_type(AssetType::Bonds)),
                    cash: round_cents(by_type(AssetType::Cash)),
                    realty: round_cents(by_type(AssetType::Realty)),
                }
            })
        })
        .collect()
}

fn round_cents(amount: f64) -> f64 {
    crate::amortization::round_currency(amount)
}

/// Write report rows as CSV with a header line
pub fn write_csv<W: Write>(writer: W, rows: &[ReportRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
