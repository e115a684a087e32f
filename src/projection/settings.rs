//! Projection settings

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longest horizon the input layer accepts
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Global settings for a projection run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Years projected after the present (year 0)
    pub horizon_years: u32,

    /// Annual inflation in percent (4.0 = 4%)
    pub inflation: f64,

    /// Whether displays should prefer inflation-adjusted values
    pub show_real_values: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            horizon_years: 10,
            inflation: 4.0,
            show_real_values: true,
        }
    }
}

impl Settings {
    /// Cumulative inflation factor from year 0 to `year`
    pub fn deflator(&self, year: u32) -> f64 {
        (1.0 + self.inflation / 100.0).powi(year as i32)
    }

    /// Convert a nominal amount at `year` to present-day money
    ///
    /// Amounts are returned unchanged when the deflator is not positive.
    pub fn to_real(&self, amount: f64, year: u32) -> f64 {
        let deflator = self.deflator(year);
        if deflator > 0.0 {
            amount / deflator
        } else {
            amount
        }
    }

    /// Reject settings the input layer should never pass to the engine
    pub fn validate(&self) -> Result<()> {
        if self.horizon_years > MAX_HORIZON_YEARS {
            return Err(Error::InvalidSettings(format!(
                "horizon of {} years exceeds {MAX_HORIZON_YEARS}",
                self.horizon_years
            )));
        }
        if !self.inflation.is_finite() || self.inflation <= -100.0 {
            return Err(Error::InvalidSettings(format!(
                "inflation must be above -100%, got {}",
                self.inflation
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_real_conversion() {
        let settings = Settings {
            inflation: 10.0,
            ..Default::default()
        };
        assert_eq!(settings.to_real(1000.0, 0), 1000.0);
        assert_relative_eq!(settings.to_real(1210.0, 2), 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_validate() {
        assert!(Settings::default().validate().is_ok());
        assert!(Settings { horizon_years: 101, ..Default::default() }.validate().is_err());
        assert!(Settings { inflation: -100.0, ..Default::default() }.validate().is_err());
        assert!(Settings { inflation: f64::NAN, ..Default::default() }.validate().is_err());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"horizon_years": 25}"#).unwrap();
        assert_eq!(settings.horizon_years, 25);
        assert_eq!(settings.inflation, 4.0);
        assert!(settings.show_real_values);
    }
}
