//! Exchange-rate and price-index capabilities used by currency columns.

use crate::domain::error::HammerfinError;
use chrono::NaiveDate;

pub trait ExchangeRatePort {
    /// Units of `to` per one unit of `from`.
    fn exchange_rate(&self, from: &str, to: &str) -> Result<f64, HammerfinError>;
}

pub trait PriceIndexPort {
    /// Factor turning a nominal amount observed on `at` into `base_period`
    /// purchasing power.
    fn deflator(
        &self,
        currency: &str,
        at: NaiveDate,
        base_period: &str,
    ) -> Result<f64, HammerfinError>;
}

/// Stand-in used when no provider has been supplied. Every lookup fails with
/// [`HammerfinError::NotConfigured`], so values are never relabelled without
/// being rescaled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

impl ExchangeRatePort for Unconfigured {
    fn exchange_rate(&self, _from: &str, _to: &str) -> Result<f64, HammerfinError> {
        Err(HammerfinError::NotConfigured {
            capability: "exchange rate provider",
        })
    }
}

impl PriceIndexPort for Unconfigured {
    fn deflator(
        &self,
        _currency: &str,
        _at: NaiveDate,
        _base_period: &str,
    ) -> Result<f64, HammerfinError> {
        Err(HammerfinError::NotConfigured {
            capability: "price index provider",
        })
    }
}
