//! Input validation for assets and liabilities
//!
//! The projection engine tolerates malformed data; these checks run where portfolios
//! are built and edited so bad input is reported to the user instead.

use super::{Asset, Liability, Portfolio};
use crate::assumptions::TypeLookup;
use crate::error::{Error, Result};

/// Highest annual rate accepted for a loan, in percent
pub const MAX_LIABILITY_RATE: f64 = 100.0;

/// Longest loan term accepted, in years
pub const MAX_TERM_YEARS: u32 = 100;

pub fn validate_asset(asset: &Asset) -> Result<()> {
    if asset.id.trim().is_empty() {
        return Err(Error::InvalidAsset {
            id: asset.id.clone(),
            reason: "empty id".to_string(),
        });
    }
    validate_asset_value(&asset.id, asset.value)
}

pub fn validate_asset_value(id: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidAsset {
            id: id.to_string(),
            reason: format!("value must be a non-negative amount, got {value}"),
        });
    }
    Ok(())
}

pub fn validate_liability(liability: &Liability) -> Result<()> {
    let fail = |reason: String| Error::InvalidLiability {
        id: liability.id.clone(),
        reason,
    };

    if liability.id.trim().is_empty() {
        return Err(fail("empty id".to_string()));
    }
    if !liability.principal().is_finite() || liability.principal() <= 0.0 {
        return Err(fail(format!("principal must be positive, got {}", liability.principal())));
    }
    if !liability.rate().is_finite() || liability.rate() <= 0.0 || liability.rate() > MAX_LIABILITY_RATE {
        return Err(fail(format!(
            "rate must be in (0, {MAX_LIABILITY_RATE}], got {}",
            liability.rate()
        )));
    }
    if liability.term_years() == 0 || liability.term_years() > MAX_TERM_YEARS {
        return Err(fail(format!(
            "term must be in 1..={MAX_TERM_YEARS} years, got {}",
            liability.term_years()
        )));
    }
    if liability.current_balance() > liability.principal() {
        return Err(fail("current balance exceeds principal".to_string()));
    }
    Ok(())
}

/// Check every loan's term against the registry's maximum for its type
///
/// Types the registry does not know are not capped.
pub fn validate_against_registry<R: TypeLookup + ?Sized>(portfolio: &Portfolio, registry: &R) -> Result<()> {
    for liability in portfolio.liabilities() {
        if let Some(info) = registry.liability_info(liability.liability_type) {
            if liability.term_years() > info.max_term_years {
                return Err(Error::InvalidLiability {
                    id: liability.id.clone(),
                    reason: format!(
                        "term of {} years exceeds the {} maximum of {}",
                        liability.term_years(),
                        info.name,
                        info.max_term_years
                    ),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::TypeRegistry;
    use crate::portfolio::{AssetType, LiabilityType};

    #[test]
    fn test_liability_checks() {
        assert!(validate_liability(&Liability::new("ok", LiabilityType::Mortgage, 100.0, 5.0, 10)).is_ok());
        assert!(validate_liability(&Liability::new("p", LiabilityType::Mortgage, 0.0, 5.0, 10)).is_err());
        assert!(validate_liability(&Liability::new("r", LiabilityType::Mortgage, 100.0, 0.0, 10)).is_err());
        assert!(validate_liability(&Liability::new("r", LiabilityType::Mortgage, 100.0, 150.0, 10)).is_err());
        assert!(validate_liability(&Liability::new("t", LiabilityType::Mortgage, 100.0, 5.0, 0)).is_err());
        assert!(validate_liability(&Liability::new(" ", LiabilityType::Mortgage, 100.0, 5.0, 10)).is_err());
    }

    #[test]
    fn test_term_upper_bound() {
        assert!(validate_liability(&Liability::new("t", LiabilityType::Mortgage, 100.0, 5.0, MAX_TERM_YEARS)).is_ok());
        assert!(validate_liability(&Liability::new("t", LiabilityType::Mortgage, 100.0, 5.0, MAX_TERM_YEARS + 1)).is_err());
    }

    #[test]
    fn test_asset_checks() {
        assert!(validate_asset(&Asset::new("a", AssetType::Cash, "c", 0.0)).is_ok());
        assert!(validate_asset(&Asset::new("a", AssetType::Cash, "c", f64::NAN)).is_err());
        assert!(validate_asset(&Asset::new("", AssetType::Cash, "c", 1.0)).is_err());
    }

    #[test]
    fn test_registry_term_cap() {
        let registry = TypeRegistry::default_registry();
        let ok = Portfolio::new(vec![], vec![Liability::new("m", LiabilityType::Mortgage, 1.0e5, 8.5, 30)]).unwrap();
        assert!(validate_against_registry(&ok, &registry).is_ok());

        let too_long = Portfolio::new(vec![], vec![Liability::new("c", LiabilityType::Consumer, 1.0e4, 15.0, 20)]).unwrap();
        assert!(validate_against_registry(&too_long, &registry).is_err());

        // Unknown types are not capped
        assert!(validate_against_registry(&too_long, &TypeRegistry::empty()).is_ok());
    }
}
