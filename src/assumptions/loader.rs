//! CSV-based registry loader
//!
//! Reads type metadata from `asset_types.csv` and `liability_types.csv`. Rows may be
//! omitted; the registry then falls back to defaults for those types at lookup time.

use std::io::Read;
use std::path::Path;

use csv::Reader;
use serde::Deserialize;

use super::{AssetTypeInfo, LiabilityTypeInfo};
use crate::error::{Error, Result};
use crate::portfolio::{AssetType, LiabilityType};
use crate::scenario::ScenarioReturns;

/// Default directory for registry files
pub const DEFAULT_REGISTRY_PATH: &str = "data/registry";

/// Raw row of asset_types.csv
#[derive(Debug, Deserialize)]
struct AssetTypeRow {
    #[serde(rename = "type")]
    asset_type: String,
    name: String,
    pessimistic: f64,
    base: f64,
    optimistic: f64,
    risk_level: String,
}

/// Raw row of liability_types.csv
#[derive(Debug, Deserialize)]
struct LiabilityTypeRow {
    #[serde(rename = "type")]
    liability_type: String,
    name: String,
    default_rate: f64,
    default_term_years: u32,
    max_term_years: u32,
}

pub fn load_asset_types(dir: &Path) -> Result<Vec<(AssetType, AssetTypeInfo)>> {
    let reader = std::fs::File::open(dir.join("asset_types.csv"))?;
    load_asset_types_from_reader(reader)
}

pub fn load_asset_types_from_reader<R: Read>(reader: R) -> Result<Vec<(AssetType, AssetTypeInfo)>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut entries = Vec::new();

    for (idx, result) in csv_reader.deserialize().enumerate() {
        let row: AssetTypeRow = result?;
        let asset_type: AssetType = row.asset_type.parse()?;
        let risk_level = row.risk_level.parse().map_err(|_| Error::MalformedRow {
            row: idx + 1,
            reason: format!("unknown risk level {}", row.risk_level),
        })?;

        entries.push((
            asset_type,
            AssetTypeInfo {
                name: row.name,
                inflation_adjustment: ScenarioReturns::new(row.pessimistic, row.base, row.optimistic),
                risk_level,
            },
        ));
    }

    Ok(entries)
}

pub fn load_liability_types(dir: &Path) -> Result<Vec<(LiabilityType, LiabilityTypeInfo)>> {
    let reader = std::fs::File::open(dir.join("liability_types.csv"))?;
    load_liability_types_from_reader(reader)
}

pub fn load_liability_types_from_reader<R: Read>(reader: R) -> Result<Vec<(LiabilityType, LiabilityTypeInfo)>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut entries = Vec::new();

    for (idx, result) in csv_reader.deserialize().enumerate() {
        let row: LiabilityTypeRow = result?;
        let liability_type: LiabilityType = row.liability_type.parse()?;
        if row.default_term_years == 0 || row.default_term_years > row.max_term_years {
            return Err(Error::MalformedRow {
                row: idx + 1,
                reason: format!(
                    "default term {} must be in 1..={}",
                    row.default_term_years, row.max_term_years
                ),
            });
        }

        entries.push((
            liability_type,
            LiabilityTypeInfo {
                name: row.name,
                default_rate: row.default_rate,
                default_term_years: row.default_term_years,
                max_term_years: row.max_term_years,
            },
        ));
    }

    Ok(entries)
}
