//! Risk/return statistics over a daily return series.
//!
//! Degenerate inputs are not errors: an empty series, a zero standard
//! deviation or a Sortino series with no losses produce NaN or infinity.

use crate::domain::stats;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// (mean * 252 - rf) / (population std * sqrt(252))
pub fn sharpe_ratio(returns: &[f64], risk_free: f64) -> f64 {
    let excess = stats::mean(returns) * TRADING_DAYS_PER_YEAR - risk_free;
    excess / (stats::std(returns, 0) * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Sharpe numerator over the population std of the negative returns only.
pub fn sortino_ratio(returns: &[f64], risk_free: f64) -> f64 {
    let excess = stats::mean(returns) * TRADING_DAYS_PER_YEAR - risk_free;
    let losses: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    excess / (stats::std(&losses, 0) * TRADING_DAYS_PER_YEAR.sqrt())
}

/// cumprod(1 + v) - 1
pub fn cumulative_returns(values: &[f64]) -> Vec<f64> {
    let growth: Vec<f64> = values.iter().map(|v| 1.0 + v).collect();
    stats::cumprod(&growth).into_iter().map(|g| g - 1.0).collect()
}

/// Running peak of cumulative return minus cumulative return.
pub fn drawdown_series(returns: &[f64]) -> Vec<f64> {
    let cumulative = cumulative_returns(returns);
    stats::cummax(&cumulative)
        .into_iter()
        .zip(&cumulative)
        .map(|(peak, r)| peak - r)
        .collect()
}

pub fn max_drawdown(returns: &[f64]) -> f64 {
    stats::max(&drawdown_series(returns))
}

/// Not annualized: (mean daily return - rf) / |max drawdown|.
pub fn calmar_ratio(returns: &[f64], risk_free: f64) -> f64 {
    (stats::mean(returns) - risk_free) / max_drawdown(returns).abs()
}
