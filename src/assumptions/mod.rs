//! Asset and liability type metadata
//!
//! The registry is the engine's only source of per-type policy: how each asset class
//! is expected to perform relative to inflation under each scenario, how risky it is,
//! and the usual terms for each kind of loan. It is passed to the engine as a value
//! implementing [`TypeLookup`]; lookups for types the registry does not know fail soft.

pub mod loader;

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::portfolio::{AssetType, LiabilityType};
use crate::scenario::ScenarioReturns;

/// Relative risk of an asset class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Weight used by the risk score (1-10 scale before volatility adjustment)
    pub fn weight(&self) -> f64 {
        match self {
            RiskLevel::VeryLow => 1.0,
            RiskLevel::Low => 2.0,
            RiskLevel::Medium => 4.0,
            RiskLevel::High => 6.0,
        }
    }
}

impl FromStr for RiskLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "very_low" => Ok(RiskLevel::VeryLow),
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(Error::MalformedRow {
                row: 0,
                reason: format!("unknown risk level {other}"),
            }),
        }
    }
}

/// Metadata for one asset class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetTypeInfo {
    pub name: String,

    /// Annual return over inflation, in percentage points, per scenario
    pub inflation_adjustment: ScenarioReturns,

    pub risk_level: RiskLevel,
}

/// Metadata for one kind of loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityTypeInfo {
    pub name: String,

    /// Typical annual rate in percent
    pub default_rate: f64,

    pub default_term_years: u32,

    pub max_term_years: u32,
}

impl LiabilityTypeInfo {
    /// Terms used when the registry has no entry for a loan type
    pub fn fallback(liability_type: LiabilityType) -> Self {
        Self {
            name: liability_type.as_str().to_string(),
            default_rate: 10.0,
            default_term_years: 10,
            max_term_years: 30,
        }
    }
}

/// Lookup capability the engine depends on
///
/// Only the two required methods need implementing; the provided accessors add the
/// fail-soft defaults used during projection.
pub trait TypeLookup {
    fn asset_info(&self, asset_type: AssetType) -> Option<&AssetTypeInfo>;

    fn liability_info(&self, liability_type: LiabilityType) -> Option<&LiabilityTypeInfo>;

    /// Scenario adjustments over inflation; zero for unknown types
    fn inflation_adjustment(&self, asset_type: AssetType) -> ScenarioReturns {
        match self.asset_info(asset_type) {
            Some(info) => info.inflation_adjustment,
            None => {
                warn!("No registry entry for asset type {asset_type}, using zero adjustment");
                ScenarioReturns::default()
            }
        }
    }

    /// Risk weight; medium for unknown types
    fn risk_weight(&self, asset_type: AssetType) -> f64 {
        match self.asset_info(asset_type) {
            Some(info) => info.risk_level.weight(),
            None => {
                warn!("No registry entry for asset type {asset_type}, using medium risk weight");
                RiskLevel::Medium.weight()
            }
        }
    }

    /// Default loan terms; [`LiabilityTypeInfo::fallback`] for unknown types
    fn liability_defaults(&self, liability_type: LiabilityType) -> LiabilityTypeInfo {
        self.liability_info(liability_type)
            .cloned()
            .unwrap_or_else(|| LiabilityTypeInfo::fallback(liability_type))
    }
}

/// In-memory type registry
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    assets: HashMap<AssetType, AssetTypeInfo>,
    liabilities: HashMap<LiabilityType, LiabilityTypeInfo>,
}

impl TypeRegistry {
    /// Registry with no entries; every lookup falls back to defaults
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in registry used when no registry files are supplied
    pub fn default_registry() -> Self {
        let mut registry = Self::empty();

        registry.insert_asset(AssetType::Stocks, AssetTypeInfo {
            name: "Stocks".to_string(),
            inflation_adjustment: ScenarioReturns::new(-4.0, 4.0, 10.0),
            risk_level: RiskLevel::High,
        });
        registry.insert_asset(AssetType::Bonds, AssetTypeInfo {
            name: "Bonds".to_string(),
            inflation_adjustment: ScenarioReturns::new(-1.0, 1.5, 3.0),
            risk_level: RiskLevel::Low,
        });
        registry.insert_asset(AssetType::Cash, AssetTypeInfo {
            name: "Cash".to_string(),
            inflation_adjustment: ScenarioReturns::new(-2.0, -1.0, 0.0),
            risk_level: RiskLevel::VeryLow,
        });
        registry.insert_asset(AssetType::Realty, AssetTypeInfo {
            name: "Real estate".to_string(),
            inflation_adjustment: ScenarioReturns::new(-2.0, 1.0, 4.0),
            risk_level: RiskLevel::Medium,
        });

        registry.insert_liability(LiabilityType::Mortgage, LiabilityTypeInfo {
            name: "Mortgage".to_string(),
            default_rate: 8.5,
            default_term_years: 20,
            max_term_years: 30,
        });
        registry.insert_liability(LiabilityType::Consumer, LiabilityTypeInfo {
            name: "Consumer loan".to_string(),
            default_rate: 15.0,
            default_term_years: 5,
            max_term_years: 7,
        });
        registry.insert_liability(LiabilityType::Auto, LiabilityTypeInfo {
            name: "Auto loan".to_string(),
            default_rate: 12.0,
            default_term_years: 5,
            max_term_years: 7,
        });
        registry.insert_liability(LiabilityType::Business, LiabilityTypeInfo {
            name: "Business loan".to_string(),
            default_rate: 11.0,
            default_term_years: 10,
            max_term_years: 15,
        });

        registry
    }

    /// Load the registry from `asset_types.csv` and `liability_types.csv` in a directory
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let assets = loader::load_asset_types(path)?;
        let liabilities = loader::load_liability_types(path)?;
        Ok(Self {
            assets: assets.into_iter().collect(),
            liabilities: liabilities.into_iter().collect(),
        })
    }

    pub fn insert_asset(&mut self, asset_type: AssetType, info: AssetTypeInfo) {
        self.assets.insert(asset_type, info);
    }

    pub fn insert_liability(&mut self, liability_type: LiabilityType, info: LiabilityTypeInfo) {
        self.liabilities.insert(liability_type, info);
    }

    pub fn asset_types(&self) -> impl Iterator<Item = (&AssetType, &AssetTypeInfo)> {
        self.assets.iter()
    }
}

impl TypeLookup for TypeRegistry {
    fn asset_info(&self, asset_type: AssetType) -> Option<&AssetTypeInfo> {
        self.assets.get(&asset_type)
    }

    fn liability_info(&self, liability_type: LiabilityType) -> Option<&LiabilityTypeInfo> {
        self.liabilities.get(&liability_type)
    }
}
