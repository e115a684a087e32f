//! Portfolio data structures: assets, liabilities, and derived totals

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::validation;
use crate::amortization::AmortizationCalculator;
use crate::assumptions::TypeLookup;
use crate::error::{Error, Result};

/// Asset class of a holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Stocks,
    Bonds,
    Cash,
    Realty,
}

impl AssetType {
    pub const ALL: [AssetType; 4] = [
        AssetType::Stocks,
        AssetType::Bonds,
        AssetType::Cash,
        AssetType::Realty,
    ];

    /// Tag used in input files and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Stocks => "stocks",
            AssetType::Bonds => "bonds",
            AssetType::Cash => "cash",
            AssetType::Realty => "realty",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stocks" => Ok(AssetType::Stocks),
            "bonds" => Ok(AssetType::Bonds),
            "cash" => Ok(AssetType::Cash),
            "realty" => Ok(AssetType::Realty),
            other => Err(Error::UnknownAssetType(other.to_string())),
        }
    }
}

/// Kind of debt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiabilityType {
    Mortgage,
    Consumer,
    Auto,
    Business,
}

impl LiabilityType {
    pub const ALL: [LiabilityType; 4] = [
        LiabilityType::Mortgage,
        LiabilityType::Consumer,
        LiabilityType::Auto,
        LiabilityType::Business,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LiabilityType::Mortgage => "mortgage",
            LiabilityType::Consumer => "consumer",
            LiabilityType::Auto => "auto",
            LiabilityType::Business => "business",
        }
    }
}

impl fmt::Display for LiabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LiabilityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mortgage" => Ok(LiabilityType::Mortgage),
            "consumer" => Ok(LiabilityType::Consumer),
            "auto" => Ok(LiabilityType::Auto),
            "business" => Ok(LiabilityType::Business),
            other => Err(Error::UnknownLiabilityType(other.to_string())),
        }
    }
}

/// A single holding in the portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier within the portfolio
    pub id: String,

    #[serde(rename = "type")]
    pub asset_type: AssetType,

    /// Display name
    pub name: String,

    /// Current market value (never negative in a validated portfolio)
    pub value: f64,
}

impl Asset {
    pub fn new(id: impl Into<String>, asset_type: AssetType, name: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            asset_type,
            name: name.into(),
            value,
        }
    }
}

/// A fixed-rate amortizing loan
///
/// The loan terms are private so the monthly payment can never go stale: every
/// change to principal, rate or term goes through [`Liability::set_terms`], which
/// recomputes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Liability {
    pub id: String,

    #[serde(rename = "type")]
    pub liability_type: LiabilityType,

    /// Original loan amount
    principal: f64,

    /// Annual interest rate in percent (8.5 = 8.5%)
    rate: f64,

    /// Loan term in whole years
    term_years: u32,

    /// Derived from principal, rate and term
    monthly_payment: f64,

    /// Outstanding balance today, kept within [0, principal]
    current_balance: f64,
}

impl Liability {
    /// Create a new loan with the outstanding balance equal to the principal
    pub fn new(
        id: impl Into<String>,
        liability_type: LiabilityType,
        principal: f64,
        rate: f64,
        term_years: u32,
    ) -> Self {
        Self {
            id: id.into(),
            liability_type,
            principal,
            rate,
            term_years,
            monthly_payment: AmortizationCalculator::calculate_monthly_payment(principal, rate, term_years),
            current_balance: principal.max(0.0),
        }
    }

    /// Create a loan using the registry's default rate and term for its type
    ///
    /// Falls back to [`LiabilityTypeInfo::fallback`](crate::assumptions::LiabilityTypeInfo::fallback)
    /// when the registry has no entry for the type.
    pub fn with_defaults<R: TypeLookup + ?Sized>(
        id: impl Into<String>,
        liability_type: LiabilityType,
        principal: f64,
        registry: &R,
    ) -> Self {
        let info = registry.liability_defaults(liability_type);
        Self::new(id, liability_type, principal, info.default_rate, info.default_term_years)
    }

    /// Set the outstanding balance, clamped to [0, principal]
    pub fn with_current_balance(mut self, balance: f64) -> Self {
        self.set_current_balance(balance);
        self
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    pub fn monthly_payment(&self) -> f64 {
        self.monthly_payment
    }

    pub fn current_balance(&self) -> f64 {
        self.current_balance
    }

    /// Replace the loan terms and recompute the monthly payment
    pub fn set_terms(&mut self, principal: f64, rate: f64, term_years: u32) {
        self.principal = principal;
        self.rate = rate;
        self.term_years = term_years;
        self.monthly_payment = AmortizationCalculator::calculate_monthly_payment(principal, rate, term_years);
        self.current_balance = self.current_balance.min(principal.max(0.0));
    }

    /// Set the outstanding balance, clamped to [0, principal]
    pub fn set_current_balance(&mut self, balance: f64) {
        self.current_balance = balance.max(0.0).min(self.principal.max(0.0));
    }
}

/// A user's assets and liabilities with cached totals
///
/// The totals are recomputed after every mutation, so reading them is always
/// consistent with the lists. The projection engine still sums the lists itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Portfolio {
    assets: Vec<Asset>,
    liabilities: Vec<Liability>,
    total_value: f64,
    total_liabilities: f64,
    net_worth: f64,
}

impl Portfolio {
    /// Build a validated portfolio
    pub fn new(assets: Vec<Asset>, liabilities: Vec<Liability>) -> Result<Self> {
        let mut portfolio = Self::default();
        for asset in assets {
            portfolio.add_asset(asset)?;
        }
        for liability in liabilities {
            portfolio.add_liability(liability)?;
        }
        Ok(portfolio)
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn liabilities(&self) -> &[Liability] {
        &self.liabilities
    }

    /// Sum of asset values
    pub fn total_value(&self) -> f64 {
        self.total_value
    }

    /// Sum of outstanding liability balances
    pub fn total_liabilities(&self) -> f64 {
        self.total_liabilities
    }

    pub fn net_worth(&self) -> f64 {
        self.net_worth
    }

    pub fn has_liabilities(&self) -> bool {
        !self.liabilities.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.liabilities.is_empty()
    }

    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn liability(&self, id: &str) -> Option<&Liability> {
        self.liabilities.iter().find(|l| l.id == id)
    }

    pub fn add_asset(&mut self, asset: Asset) -> Result<()> {
        validation::validate_asset(&asset)?;
        self.ensure_unique_id(&asset.id)?;
        self.assets.push(asset);
        self.recalculate_totals();
        Ok(())
    }

    pub fn set_asset_value(&mut self, id: &str, value: f64) -> Result<()> {
        let asset = self
            .assets
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        validation::validate_asset_value(id, value)?;
        asset.value = value;
        self.recalculate_totals();
        Ok(())
    }

    pub fn remove_asset(&mut self, id: &str) -> Result<Asset> {
        let idx = self
            .assets
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let removed = self.assets.remove(idx);
        self.recalculate_totals();
        Ok(removed)
    }

    pub fn add_liability(&mut self, liability: Liability) -> Result<()> {
        validation::validate_liability(&liability)?;
        self.ensure_unique_id(&liability.id)?;
        self.liabilities.push(liability);
        self.recalculate_totals();
        Ok(())
    }

    /// Change a loan's terms; the monthly payment is recomputed and the balance
    /// re-clamped to the new principal
    pub fn update_liability_terms(&mut self, id: &str, principal: f64, rate: f64, term_years: u32) -> Result<()> {
        let liability = self
            .liabilities
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let mut updated = liability.clone();
        updated.set_terms(principal, rate, term_years);
        validation::validate_liability(&updated)?;
        *liability = updated;

        self.recalculate_totals();
        Ok(())
    }

    pub fn set_liability_balance(&mut self, id: &str, balance: f64) -> Result<()> {
        let liability = self
            .liabilities
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        if !balance.is_finite() || balance < 0.0 || balance > liability.principal {
            return Err(Error::InvalidLiability {
                id: id.to_string(),
                reason: format!("balance {balance} outside [0, {}]", liability.principal),
            });
        }
        liability.set_current_balance(balance);
        self.recalculate_totals();
        Ok(())
    }

    pub fn remove_liability(&mut self, id: &str) -> Result<Liability> {
        let idx = self
            .liabilities
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let removed = self.liabilities.remove(idx);
        self.recalculate_totals();
        Ok(removed)
    }

    fn ensure_unique_id(&self, id: &str) -> Result<()> {
        let taken = self.assets.iter().any(|a| a.id == id) || self.liabilities.iter().any(|l| l.id == id);
        if taken {
            return Err(Error::DuplicateId(id.to_string()));
        }
        Ok(())
    }

    fn recalculate_totals(&mut self) {
        self.total_value = self.assets.iter().map(|a| a.value).sum();
        self.total_liabilities = self.liabilities.iter().map(|l| l.current_balance).sum();
        self.net_worth = self.total_value - self.total_liabilities;
    }
}
