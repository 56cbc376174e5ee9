//! NaN-skipping reductions and accumulations over `f64` slices.
//!
//! Missing values (NaN) are ignored by every reduction; a reduction over no
//! valid values is NaN. Accumulations leave NaN in place and carry on with the
//! last valid state.

pub fn mean(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Standard deviation with `ddof` delta degrees of freedom (0 = population).
pub fn std(values: &[f64], ddof: usize) -> f64 {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.len() <= ddof {
        return f64::NAN;
    }
    let m = valid.iter().sum::<f64>() / valid.len() as f64;
    let variance =
        valid.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (valid.len() - ddof) as f64;
    variance.sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::min)
        .unwrap_or(f64::NAN)
}

pub fn max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::max)
        .unwrap_or(f64::NAN)
}

pub fn cumprod(values: &[f64]) -> Vec<f64> {
    let mut acc = 1.0;
    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else {
                acc *= v;
                acc
            }
        })
        .collect()
}

pub fn cummax(values: &[f64]) -> Vec<f64> {
    let mut acc = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else {
                acc = acc.max(v);
                acc
            }
        })
        .collect()
}
