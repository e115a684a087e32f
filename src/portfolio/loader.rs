//! Load portfolios from JSON documents or CSV files
//!
//! Every record goes through [`Portfolio`]'s validating constructors, so loaded loans
//! always carry a freshly derived monthly payment.

use std::io::Read;
use std::path::Path;

use csv::Reader;
use serde::Deserialize;

use super::{Asset, AssetType, Liability, LiabilityType, Portfolio};
use crate::error::{Error, Result};
use crate::projection::Settings;

/// Portfolio plus the settings saved alongside it, if any
#[derive(Debug, Clone)]
pub struct PortfolioDocument {
    pub portfolio: Portfolio,
    pub settings: Option<Settings>,
}

#[derive(Debug, Deserialize)]
struct LiabilityRecord {
    id: String,
    #[serde(rename = "type")]
    liability_type: LiabilityType,
    principal: f64,
    rate: f64,
    term_years: u32,
    #[serde(default)]
    current_balance: Option<f64>,
}

impl LiabilityRecord {
    fn into_liability(self) -> Liability {
        let liability = Liability::new(self.id, self.liability_type, self.principal, self.rate, self.term_years);
        match self.current_balance {
            Some(balance) => liability.with_current_balance(balance),
            None => liability,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DocumentRecord {
    #[serde(default)]
    settings: Option<Settings>,
    #[serde(default)]
    assets: Vec<Asset>,
    #[serde(default)]
    liabilities: Vec<LiabilityRecord>,
}

/// Load a JSON portfolio document from a file
pub fn load_portfolio_json<P: AsRef<Path>>(path: P) -> Result<PortfolioDocument> {
    let file = std::fs::File::open(path)?;
    load_portfolio_json_from_reader(file)
}

/// Load a JSON portfolio document from any reader
pub fn load_portfolio_json_from_reader<R: Read>(reader: R) -> Result<PortfolioDocument> {
    let record: DocumentRecord = serde_json::from_reader(reader)?;
    if let Some(settings) = &record.settings {
        settings.validate()?;
    }

    let liabilities = record.liabilities.into_iter().map(LiabilityRecord::into_liability).collect();
    Ok(PortfolioDocument {
        portfolio: Portfolio::new(record.assets, liabilities)?,
        settings: record.settings,
    })
}

/// Raw CSV row; one asset or one liability per row
#[derive(Debug, Deserialize)]
struct CsvRow {
    kind: String,
    id: String,
    #[serde(rename = "type")]
    type_tag: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    principal: Option<f64>,
    #[serde(default)]
    rate: Option<f64>,
    #[serde(default)]
    term_years: Option<u32>,
    #[serde(default)]
    current_balance: Option<f64>,
}

enum Entry {
    Asset(Asset),
    Liability(Liability),
}

impl CsvRow {
    fn into_entry(self, row: usize) -> Result<Entry> {
        let missing = |field: &str| Error::MalformedRow {
            row,
            reason: format!("missing {field}"),
        };

        match self.kind.trim().to_ascii_lowercase().as_str() {
            "asset" => {
                let asset_type: AssetType = self.type_tag.parse()?;
                let value = self.value.ok_or_else(|| missing("value"))?;
                let name = self.name.unwrap_or_else(|| asset_type.to_string());
                Ok(Entry::Asset(Asset::new(self.id, asset_type, name, value)))
            }
            "liability" => {
                let liability_type: LiabilityType = self.type_tag.parse()?;
                let principal = self.principal.ok_or_else(|| missing("principal"))?;
                let rate = self.rate.ok_or_else(|| missing("rate"))?;
                let term_years = self.term_years.ok_or_else(|| missing("term_years"))?;
                let liability = Liability::new(self.id, liability_type, principal, rate, term_years);
                Ok(Entry::Liability(match self.current_balance {
                    Some(balance) => liability.with_current_balance(balance),
                    None => liability,
                }))
            }
            other => Err(Error::MalformedRow {
                row,
                reason: format!("unknown kind {other}"),
            }),
        }
    }
}

/// Load a portfolio from a CSV file
pub fn load_portfolio_csv<P: AsRef<Path>>(path: P) -> Result<Portfolio> {
    let reader = Reader::from_path(path)?;
    collect_csv(reader)
}

/// Load a portfolio from any CSV reader
pub fn load_portfolio_csv_from_reader<R: Read>(reader: R) -> Result<Portfolio> {
    collect_csv(Reader::from_reader(reader))
}

fn collect_csv<R: Read>(mut reader: Reader<R>) -> Result<Portfolio> {
    let mut portfolio = Portfolio::default();

    for (idx, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        match row.into_entry(idx + 1)? {
            Entry::Asset(asset) => portfolio.add_asset(asset)?,
            Entry::Liability(liability) => portfolio.add_liability(liability)?,
        }
    }

    Ok(portfolio)
}

/// Load a portfolio document, choosing the format from the file extension
pub fn load_portfolio<P: AsRef<Path>>(path: P) -> Result<PortfolioDocument> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        Ok(PortfolioDocument {
            portfolio: load_portfolio_csv(path)?,
            settings: None,
        })
    } else {
        load_portfolio_json(path)
    }
}
