//! In-memory exchange-rate and price-index tables.

use crate::domain::error::HammerfinError;
use crate::ports::rate_port::{ExchangeRatePort, PriceIndexPort};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

/// Fixed exchange rates. A pair also answers its inverse when only the
/// opposite direction was given.
#[derive(Debug, Clone, Default)]
pub struct StaticRates {
    rates: HashMap<(String, String), f64>,
}

impl StaticRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: f64) -> Self {
        self.rates
            .insert((from.to_uppercase(), to.to_uppercase()), rate);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl ExchangeRatePort for StaticRates {
    fn exchange_rate(&self, from: &str, to: &str) -> Result<f64, HammerfinError> {
        let (from, to) = (from.to_uppercase(), to.to_uppercase());
        if from == to {
            return Ok(1.0);
        }
        if let Some(rate) = self.rates.get(&(from.clone(), to.clone())) {
            return Ok(*rate);
        }
        match self.rates.get(&(to.clone(), from.clone())) {
            Some(rate) if *rate != 0.0 => Ok(1.0 / rate),
            _ => Err(HammerfinError::RateUnavailable { from, to }),
        }
    }
}

/// Yearly price-index levels per currency. The deflator for an observation
/// in year `y` is `level(base) / level(y)`; the base period is a year.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceIndex {
    levels: HashMap<(String, i32), f64>,
}

impl StaticPriceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, currency: &str, year: i32, level: f64) -> Self {
        self.levels.insert((currency.to_uppercase(), year), level);
        self
    }

    fn level(&self, currency: &str, year: i32) -> Result<f64, HammerfinError> {
        self.levels
            .get(&(currency.to_uppercase(), year))
            .copied()
            .ok_or_else(|| HammerfinError::PriceIndexUnavailable {
                currency: currency.to_string(),
                period: year.to_string(),
            })
    }
}

impl PriceIndexPort for StaticPriceIndex {
    fn deflator(
        &self,
        currency: &str,
        at: NaiveDate,
        base_period: &str,
    ) -> Result<f64, HammerfinError> {
        let base_year: i32 =
            base_period
                .trim()
                .parse()
                .map_err(|_| HammerfinError::PriceIndexUnavailable {
                    currency: currency.to_string(),
                    period: base_period.to_string(),
                })?;
        Ok(self.level(currency, base_year)? / self.level(currency, at.year())?)
    }
}
