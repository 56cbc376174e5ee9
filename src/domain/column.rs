//! Tagged column: a numeric series with an optional fin-dtype and an index.
//!
//! A `Column` is not internally synchronized; fills mutate in place and need
//! exclusive access.

use crate::domain::dtype::{Currency, DTypeKind, FinDType};
use crate::domain::error::HammerfinError;
use crate::ports::rate_port::{ExchangeRatePort, PriceIndexPort};
use chrono::NaiveDateTime;
use std::fmt;

/// Row labels shared by a column or by every column of a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Index {
    /// Positional labels `0..len`.
    Range(usize),
    Time(Vec<NaiveDateTime>),
}

impl Index {
    pub fn len(&self) -> usize {
        match self {
            Index::Range(n) => *n,
            Index::Time(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_time(&self) -> Option<&[NaiveDateTime]> {
        match self {
            Index::Time(t) => Some(t),
            Index::Range(_) => None,
        }
    }

    pub fn take(&self, rows: &[usize]) -> Index {
        match self {
            Index::Range(_) => Index::Range(rows.len()),
            Index::Time(t) => Index::Time(rows.iter().map(|&i| t[i]).collect()),
        }
    }

    pub fn label(&self, row: usize) -> String {
        match self {
            Index::Range(_) => row.to_string(),
            Index::Time(t) => t[row].format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    values: Vec<f64>,
    dtype: Option<FinDType>,
    index: Index,
}

impl Column {
    pub fn new(values: Vec<f64>) -> Self {
        let index = Index::Range(values.len());
        Self {
            values,
            dtype: None,
            index,
        }
    }

    pub fn time_series(index: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self, HammerfinError> {
        Self::new(values).with_index(Index::Time(index))
    }

    pub fn with_dtype(mut self, dtype: FinDType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    pub fn with_index(mut self, index: Index) -> Result<Self, HammerfinError> {
        if index.len() != self.values.len() {
            return Err(HammerfinError::LengthMismatch {
                expected: self.values.len(),
                actual: index.len(),
            });
        }
        self.index = index;
        Ok(self)
    }

    pub(crate) fn from_parts(values: Vec<f64>, dtype: Option<FinDType>, index: Index) -> Self {
        debug_assert_eq!(values.len(), index.len());
        Self {
            values,
            dtype,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn dtype(&self) -> Option<&FinDType> {
        self.dtype.as_ref()
    }

    pub fn fin_dtype(&self) -> Result<&FinDType, HammerfinError> {
        self.dtype.as_ref().ok_or(HammerfinError::MissingDType)
    }

    pub fn is_fin_dtype(&self) -> Result<bool, HammerfinError> {
        self.fin_dtype().map(|_| true)
    }

    pub fn currency(&self) -> Result<&Currency, HammerfinError> {
        let dtype = self.fin_dtype()?;
        dtype.as_currency().ok_or(HammerfinError::WrongDType {
            expected: DTypeKind::Currency,
            actual: dtype.kind(),
        })
    }

    pub fn is_currency_dtype(&self) -> Result<bool, HammerfinError> {
        self.currency().map(|_| true)
    }

    pub fn time_index(&self) -> Result<&[NaiveDateTime], HammerfinError> {
        self.index.as_time().ok_or(HammerfinError::RequiresTimeIndex)
    }

    pub fn nan_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    pub fn fill_nan(&mut self, value: f64) {
        for v in self.values.iter_mut().filter(|v| v.is_nan()) {
            *v = value;
        }
    }

    /// Replace each NaN with the last non-NaN value before it. Leading NaNs stay.
    pub fn forward_fill(&mut self) {
        let mut last = f64::NAN;
        for v in self.values.iter_mut() {
            if v.is_nan() {
                *v = last;
            } else {
                last = *v;
            }
        }
    }

    pub fn add(&self, other: &Column) -> Result<Column, HammerfinError> {
        self.combine(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Column) -> Result<Column, HammerfinError> {
        self.combine(other, |a, b| a - b)
    }

    pub fn scale(&self, factor: f64) -> Column {
        Column {
            values: self.values.iter().map(|v| v * factor).collect(),
            dtype: self.dtype.clone(),
            index: self.index.clone(),
        }
    }

    /// Equal tags are inherited; a single untagged operand drops the tag;
    /// two different tags are refused. Two time indices must be identical.
    fn combine(&self, other: &Column, op: impl Fn(f64, f64) -> f64) -> Result<Column, HammerfinError> {
        if self.len() != other.len() {
            return Err(HammerfinError::LengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        if let (Index::Time(a), Index::Time(b)) = (&self.index, &other.index) {
            if a != b {
                return Err(HammerfinError::MisalignedIndex);
            }
        }
        let dtype = match (&self.dtype, &other.dtype) {
            (Some(a), Some(b)) if a == b => Some(a.clone()),
            (Some(a), Some(b)) => {
                return Err(HammerfinError::DTypeMismatch {
                    left: a.to_string(),
                    right: b.to_string(),
                });
            }
            _ => None,
        };
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(&a, &b)| op(a, b))
            .collect();
        Ok(Column {
            values,
            dtype,
            index: self.index.clone(),
        })
    }

    /// Rescale every value into `target` and retag. The rate comes from
    /// `rates`; there is no relabel-only path.
    pub fn convert_currency(
        &self,
        target: &str,
        rates: &dyn ExchangeRatePort,
    ) -> Result<Column, HammerfinError> {
        let currency = self.currency()?;
        let new_tag = currency.converted_to(target);
        if new_tag.code() == currency.code() {
            return Ok(self.clone());
        }
        let rate = rates.exchange_rate(currency.code(), new_tag.code())?;
        Ok(Column {
            values: self.values.iter().map(|v| v * rate).collect(),
            dtype: Some(FinDType::Currency(new_tag)),
            index: self.index.clone(),
        })
    }

    /// Deflate nominal values into `base_period` purchasing power, one
    /// deflator per observation date.
    pub fn adjust_for_inflation(
        &self,
        base_period: &str,
        price_index: &dyn PriceIndexPort,
    ) -> Result<Column, HammerfinError> {
        let currency = self.currency()?;
        if currency.inflation_adjusted() {
            let target = currency.adjusted_to(base_period);
            if *currency == target {
                return Ok(self.clone());
            }
            return Err(HammerfinError::DTypeMismatch {
                left: currency.to_string(),
                right: target.to_string(),
            });
        }
        let times = self.time_index()?;
        let values = self
            .values
            .iter()
            .zip(times)
            .map(|(&v, t)| {
                price_index
                    .deflator(currency.code(), t.date(), base_period)
                    .map(|d| v * d)
            })
            .collect::<Result<Vec<f64>, HammerfinError>>()?;
        Ok(Column {
            values,
            dtype: Some(FinDType::Currency(currency.adjusted_to(base_period))),
            index: self.index.clone(),
        })
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.values.iter().enumerate() {
            writeln!(f, "{}    {}", self.index.label(i), v)?;
        }
        write!(f, "Length: {}", self.values.len())?;
        if let Some(dtype) = &self.dtype {
            write!(f, "\nfin-dtype: {}", dtype)?;
        }
        Ok(())
    }
}
