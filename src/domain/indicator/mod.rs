//! Financial indicator engine over time-indexed columns and tables.
//!
//! Ratio indicators first resample to one value per calendar day (see
//! [`resample`]), then restrict to the inclusive `[start, end]` day range,
//! then reduce. The cumulative return works on the raw series. Every column
//! of a table goes through the same computation as a single column.
//!
//! The values are read as periodic returns (0.01 = +1%). `risk_free` is an
//! annual rate for Sharpe and Sortino and a per-period rate for Calmar.

pub mod ratios;
pub mod resample;

use crate::domain::column::{Column, Index};
use crate::domain::error::HammerfinError;
use crate::domain::table::Table;
use chrono::NaiveDate;
use resample::DailySeries;
use std::fmt;

pub use ratios::TRADING_DAYS_PER_YEAR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sharpe,
    Sortino,
    Calmar,
    MaxDrawdown,
}

impl IndicatorKind {
    /// Order of [`Indicators::indicators`] output.
    pub const ALL: [IndicatorKind; 4] = [
        IndicatorKind::Sharpe,
        IndicatorKind::Sortino,
        IndicatorKind::Calmar,
        IndicatorKind::MaxDrawdown,
    ];
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Sharpe => write!(f, "sharpe"),
            IndicatorKind::Sortino => write!(f, "sortino"),
            IndicatorKind::Calmar => write!(f, "calmar"),
            IndicatorKind::MaxDrawdown => write!(f, "max_drawdown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSummary<S> {
    pub entries: Vec<(IndicatorKind, S)>,
}

impl<S> IndicatorSummary<S> {
    pub fn get(&self, kind: IndicatorKind) -> Option<&S> {
        self.entries.iter().find(|(k, _)| *k == kind).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(IndicatorKind, S)> {
        self.entries.iter()
    }
}

/// One value per numeric column, in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct PerColumn<T>(pub Vec<(String, T)>);

impl<T> PerColumn<T> {
    pub fn get(&self, column: &str) -> Option<&T> {
        self.0.iter().find(|(n, _)| n == column).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, T)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Indicators shared by anything holding time-indexed numeric values.
///
/// All methods fail with [`HammerfinError::RequiresTimeIndex`] before doing
/// any work when the receiver has no time index. Non-finite results are
/// returned as-is.
pub trait Indicators {
    type Scalar;
    type Series;

    fn sharpe(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        risk_free: f64,
    ) -> Result<Self::Scalar, HammerfinError>;

    fn sortino(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        risk_free: f64,
    ) -> Result<Self::Scalar, HammerfinError>;

    fn calmar(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        risk_free: f64,
    ) -> Result<Self::Scalar, HammerfinError>;

    fn drawdowns(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self::Series, HammerfinError>;

    fn max_drawdown(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self::Scalar, HammerfinError>;

    fn cumulative(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self::Series, HammerfinError>;

    fn indicators(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        risk_free: f64,
    ) -> Result<IndicatorSummary<Self::Scalar>, HammerfinError> {
        let entries = vec![
            (IndicatorKind::Sharpe, self.sharpe(start, end, risk_free)?),
            (IndicatorKind::Sortino, self.sortino(start, end, risk_free)?),
            (IndicatorKind::Calmar, self.calmar(start, end, risk_free)?),
            (IndicatorKind::MaxDrawdown, self.max_drawdown(start, end)?),
        ];
        Ok(IndicatorSummary { entries })
    }
}

fn daily(
    column: &Column,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<DailySeries, HammerfinError> {
    let times = column.time_index()?;
    Ok(resample::daily_last(times, column.values()).restrict(start, end))
}

impl Indicators for Column {
    type Scalar = f64;
    type Series = Column;

    fn sharpe(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        risk_free: f64,
    ) -> Result<f64, HammerfinError> {
        let series = daily(self, start, end)?;
        Ok(ratios::sharpe_ratio(&series.values, risk_free))
    }

    fn sortino(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        risk_free: f64,
    ) -> Result<f64, HammerfinError> {
        let series = daily(self, start, end)?;
        Ok(ratios::sortino_ratio(&series.values, risk_free))
    }

    fn calmar(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        risk_free: f64,
    ) -> Result<f64, HammerfinError> {
        let series = daily(self, start, end)?;
        Ok(ratios::calmar_ratio(&series.values, risk_free))
    }

    fn drawdowns(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Column, HammerfinError> {
        let series = daily(self, start, end)?;
        let index = series.index();
        Column::new(ratios::drawdown_series(&series.values)).with_index(Index::Time(index))
    }

    fn max_drawdown(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<f64, HammerfinError> {
        let series = daily(self, start, end)?;
        Ok(ratios::max_drawdown(&series.values))
    }

    fn cumulative(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Column, HammerfinError> {
        let times = self.time_index()?;
        let (index, values): (Vec<_>, Vec<f64>) = times
            .iter()
            .zip(self.values())
            .filter(|(t, _)| {
                let day = t.date();
                start.is_none_or(|s| day >= s) && end.is_none_or(|e| day <= e)
            })
            .map(|(t, v)| (*t, *v))
            .unzip();
        Column::new(ratios::cumulative_returns(&values)).with_index(Index::Time(index))
    }
}

/// Apply `f` to every numeric column of `table` as a time-indexed column.
fn per_column<T>(
    table: &Table,
    f: impl Fn(&Column) -> Result<T, HammerfinError>,
) -> Result<PerColumn<T>, HammerfinError> {
    table.time_index()?;
    let mut out = Vec::new();
    for (name, _) in table.numeric_columns() {
        let column = table.column(name)?;
        out.push((name.to_string(), f(&column)?));
    }
    Ok(PerColumn(out))
}

/// Collect per-column series sharing one index into an untagged table.
fn series_table(columns: PerColumn<Column>, empty_index: Index) -> Result<Table, HammerfinError> {
    let mut columns = columns.0.into_iter().peekable();
    let index = columns
        .peek()
        .map(|(_, c)| c.index().clone())
        .unwrap_or(empty_index);
    let mut table = Table::new(index);
    for (name, column) in columns {
        table.insert(&name, column)?;
    }
    Ok(table)
}

impl Indicators for Table {
    type Scalar = PerColumn<f64>;
    type Series = Table;

    fn sharpe(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        risk_free: f64,
    ) -> Result<PerColumn<f64>, HammerfinError> {
        per_column(self, |c| c.sharpe(start, end, risk_free))
    }

    fn sortino(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        risk_free: f64,
    ) -> Result<PerColumn<f64>, HammerfinError> {
        per_column(self, |c| c.sortino(start, end, risk_free))
    }

    fn calmar(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        risk_free: f64,
    ) -> Result<PerColumn<f64>, HammerfinError> {
        per_column(self, |c| c.calmar(start, end, risk_free))
    }

    fn drawdowns(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Table, HammerfinError> {
        let columns = per_column(self, |c| c.drawdowns(start, end))?;
        series_table(columns, Index::Time(Vec::new()))
    }

    fn max_drawdown(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PerColumn<f64>, HammerfinError> {
        per_column(self, |c| c.max_drawdown(start, end))
    }

    fn cumulative(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Table, HammerfinError> {
        let columns = per_column(self, |c| c.cumulative(start, end))?;
        series_table(columns, Index::Time(Vec::new()))
    }
}
