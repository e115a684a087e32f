//! Portfolio data structures, validation and loading

mod data;
pub mod loader;
pub mod validation;

pub use data::{Asset, AssetType, Liability, LiabilityType, Portfolio};
pub use loader::{load_portfolio, load_portfolio_csv, load_portfolio_json, PortfolioDocument};
