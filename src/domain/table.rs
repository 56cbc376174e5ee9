//! Tagged table: named columns over one shared index, with a fin-dtype
//! side-table and the history of applied preprocessing steps.
//!
//! Every change to the column set goes through `put`/`remove`, which keep the
//! dtype side-table in step with the columns: a dtype entry exists only for a
//! column that is present. A `Table` is not internally synchronized.

use crate::domain::column::{Column, Index};
use crate::domain::dates;
use crate::domain::dtype::FinDType;
use crate::domain::error::HammerfinError;
use crate::domain::frame::{ColumnData, Frame};
use crate::domain::processing::{OneHotEncoder, ProcessingStep, Scaler};
use crate::ports::data_port::{DataPort, LoadOptions};
use crate::ports::rate_port::{ExchangeRatePort, PriceIndexPort};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Table {
    index: Index,
    columns: Vec<(String, ColumnData)>,
    dtypes: BTreeMap<String, FinDType>,
    processing_steps: Vec<Arc<dyn ProcessingStep>>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new(Index::Range(0))
    }
}

impl Table {
    pub fn new(index: Index) -> Self {
        Self {
            index,
            columns: Vec::new(),
            dtypes: BTreeMap::new(),
            processing_steps: Vec::new(),
        }
    }

    pub fn from_frame(frame: Frame) -> Result<Self, HammerfinError> {
        let mut table = Table::new(Index::Range(frame.row_count()));
        for (name, data) in frame.columns {
            table.put(&name, data, None)?;
        }
        Ok(table)
    }

    pub fn load(
        path: &Path,
        source: &dyn DataPort,
        options: &LoadOptions,
    ) -> Result<Self, HammerfinError> {
        Self::from_frame(source.load(path, options)?)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _)| n == name)
    }

    fn put(
        &mut self,
        name: &str,
        data: ColumnData,
        dtype: Option<FinDType>,
    ) -> Result<(), HammerfinError> {
        if self.columns.is_empty() && matches!(self.index, Index::Range(_)) {
            self.index = Index::Range(data.len());
        }
        if data.len() != self.index.len() {
            return Err(HammerfinError::LengthMismatch {
                expected: self.index.len(),
                actual: data.len(),
            });
        }
        match self.position(name) {
            Some(i) => self.columns[i].1 = data,
            None => self.columns.push((name.to_string(), data)),
        }
        match dtype {
            Some(dtype) => {
                self.dtypes.insert(name.to_string(), dtype);
            }
            None => {
                self.dtypes.remove(name);
            }
        }
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<ColumnData, HammerfinError> {
        let i = self
            .position(name)
            .ok_or_else(|| HammerfinError::ColumnNotFound(name.to_string()))?;
        self.dtypes.remove(name);
        Ok(self.columns.remove(i).1)
    }

    /// Insert or replace `name`, recording the column's fin-dtype (or clearing
    /// a stale one). A time-indexed column must carry the table's index; the
    /// first column inserted into an empty table sets it.
    pub fn insert(&mut self, name: &str, column: Column) -> Result<(), HammerfinError> {
        if let Index::Time(_) = column.index() {
            if self.columns.is_empty() {
                self.index = column.index().clone();
            } else if column.index() != &self.index {
                return Err(HammerfinError::IndexMismatch(name.to_string()));
            }
        }
        let dtype = column.dtype().cloned();
        self.put(name, ColumnData::Numeric(column.into_values()), dtype)
    }

    pub fn insert_text(&mut self, name: &str, values: Vec<String>) -> Result<(), HammerfinError> {
        self.put(name, ColumnData::Text(values), None)
    }

    /// Numeric column `name` carrying its recorded fin-dtype and the table index.
    pub fn column(&self, name: &str) -> Result<Column, HammerfinError> {
        match self.data(name)? {
            ColumnData::Numeric(values) => Ok(Column::from_parts(
                values.clone(),
                self.dtypes.get(name).cloned(),
                self.index.clone(),
            )),
            ColumnData::Text(_) => Err(HammerfinError::NotNumeric(name.to_string())),
        }
    }

    pub fn text_column(&self, name: &str) -> Result<&[String], HammerfinError> {
        match self.data(name)? {
            ColumnData::Text(values) => Ok(values),
            ColumnData::Numeric(_) => Err(HammerfinError::NotText(name.to_string())),
        }
    }

    pub fn data(&self, name: &str) -> Result<&ColumnData, HammerfinError> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
            .ok_or_else(|| HammerfinError::ColumnNotFound(name.to_string()))
    }

    pub fn drop_column(&mut self, name: &str) -> Result<(), HammerfinError> {
        self.remove(name).map(|_| ())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn dtype(&self, name: &str) -> Option<&FinDType> {
        self.dtypes.get(name)
    }

    pub fn dtypes(&self) -> impl Iterator<Item = (&str, &FinDType)> {
        self.dtypes.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub(crate) fn entries(&self) -> &[(String, ColumnData)] {
        &self.columns
    }

    /// Numeric columns in table order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns.iter().filter_map(|(n, d)| match d {
            ColumnData::Numeric(v) => Some((n.as_str(), v.as_slice())),
            ColumnData::Text(_) => None,
        })
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn time_index(&self) -> Result<&[NaiveDateTime], HammerfinError> {
        self.index.as_time().ok_or(HammerfinError::RequiresTimeIndex)
    }

    pub fn set_time_index(&mut self, times: Vec<NaiveDateTime>) -> Result<(), HammerfinError> {
        if times.len() != self.index.len() {
            return Err(HammerfinError::LengthMismatch {
                expected: self.index.len(),
                actual: times.len(),
            });
        }
        self.index = Index::Time(times);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.columns.len())
    }

    pub fn nan_count(&self) -> usize {
        self.columns.iter().map(|(_, d)| d.missing_count()).sum()
    }

    pub fn processing_steps(&self) -> &[Arc<dyn ProcessingStep>] {
        &self.processing_steps
    }

    fn with_columns(&self, index: Index, columns: Vec<(String, ColumnData)>) -> Table {
        let dtypes = columns
            .iter()
            .filter_map(|(n, _)| self.dtypes.get(n).map(|d| (n.clone(), d.clone())))
            .collect();
        Table {
            index,
            columns,
            dtypes,
            processing_steps: self.processing_steps.clone(),
        }
    }

    pub fn select_columns(&self, names: &[&str]) -> Result<Table, HammerfinError> {
        let columns = names
            .iter()
            .map(|&n| self.data(n).map(|d| (n.to_string(), d.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.with_columns(self.index.clone(), columns))
    }

    pub fn take_rows(&self, rows: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|(n, d)| (n.clone(), d.take(rows)))
            .collect();
        self.with_columns(self.index.take(rows), columns)
    }

    pub fn filter(&self, mask: &[bool]) -> Result<Table, HammerfinError> {
        if mask.len() != self.row_count() {
            return Err(HammerfinError::LengthMismatch {
                expected: self.row_count(),
                actual: mask.len(),
            });
        }
        let rows: Vec<usize> = (0..mask.len()).filter(|&i| mask[i]).collect();
        Ok(self.take_rows(&rows))
    }

    /// Rows whose calendar day lies in `[start, end]`; `None` leaves that side open.
    pub fn between(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Table, HammerfinError> {
        let times = self.time_index()?;
        let rows: Vec<usize> = times
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                let day = t.date();
                start.is_none_or(|s| day >= s) && end.is_none_or(|e| day <= e)
            })
            .map(|(i, _)| i)
            .collect();
        Ok(self.take_rows(&rows))
    }

    /// Promote the first date-like column to the time index and drop it from
    /// the columns. Text columns qualify when their first cell parses as a
    /// date, numeric ones when it is a whole number of epoch seconds.
    /// Returns the promoted column's name, or `None` when nothing qualified
    /// (or the index already is a time index).
    pub fn find_date(&mut self) -> Result<Option<String>, HammerfinError> {
        if self.index.as_time().is_some() {
            return Ok(None);
        }
        let candidate = self.columns.iter().find(|(_, d)| match d {
            ColumnData::Text(v) => v.first().and_then(|s| dates::parse_timestamp(s)).is_some(),
            ColumnData::Numeric(v) => v.first().and_then(|&x| dates::from_epoch_seconds(x)).is_some(),
        });
        let Some((name, data)) = candidate else {
            tracing::info!("no datetime column found");
            return Ok(None);
        };
        let name = name.clone();
        let times = match data {
            ColumnData::Text(v) => v
                .iter()
                .map(|s| {
                    dates::parse_timestamp(s).ok_or_else(|| HammerfinError::InvalidDate {
                        value: s.clone(),
                        reason: format!("column '{}' mixes date and non-date values", name),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            ColumnData::Numeric(v) => v
                .iter()
                .map(|&x| {
                    dates::from_epoch_seconds(x).ok_or_else(|| HammerfinError::InvalidDate {
                        value: x.to_string(),
                        reason: format!("column '{}' is not epoch seconds throughout", name),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        self.remove(&name)?;
        self.index = Index::Time(times);
        tracing::info!(column = %name, "column set as index");
        Ok(Some(name))
    }

    /// Log the table's shape, column names and missing values.
    pub fn log_summary(&self) {
        let (rows, cols) = self.shape();
        tracing::info!("table has {} rows and {} columns", rows, cols);
        tracing::info!("table columns are {:?}", self.column_names());
        let missing = self.nan_count();
        if missing > 0 {
            tracing::warn!("table contains {} NaN values", missing);
        } else {
            tracing::info!("table has no NaN values");
        }
    }

    /// Fit `step` on this table, record it and replace the contents with
    /// its output.
    pub fn apply_step<S: ProcessingStep + 'static>(
        &mut self,
        mut step: S,
    ) -> Result<&mut Self, HammerfinError> {
        step.fit(self)?;
        let transformed = step.transform(self)?;
        self.index = transformed.index;
        self.columns = transformed.columns;
        self.dtypes = transformed.dtypes;
        self.processing_steps.push(Arc::new(step));
        Ok(self)
    }

    pub fn scale(&mut self, scaler: Scaler) -> Result<&mut Self, HammerfinError> {
        self.apply_step(scaler)
    }

    pub fn one_hot_encode(&mut self, encoder: OneHotEncoder) -> Result<&mut Self, HammerfinError> {
        self.apply_step(encoder)
    }

    /// Replay every recorded step, in fit order, on a copy of `other`.
    pub fn apply_processing(&self, other: &Table) -> Result<Table, HammerfinError> {
        let mut out = other.clone();
        for step in &self.processing_steps {
            out = step.transform(&out)?;
        }
        Ok(out)
    }

    pub fn convert_currency(
        &mut self,
        name: &str,
        target: &str,
        rates: &dyn ExchangeRatePort,
    ) -> Result<(), HammerfinError> {
        let converted = self.column(name)?.convert_currency(target, rates)?;
        self.insert(name, converted)
    }

    pub fn adjust_for_inflation(
        &mut self,
        name: &str,
        base_period: &str,
        price_index: &dyn PriceIndexPort,
    ) -> Result<(), HammerfinError> {
        let adjusted = self
            .column(name)?
            .adjust_for_inflation(base_period, price_index)?;
        self.insert(name, adjusted)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index")?;
        for (name, _) in &self.columns {
            write!(f, "\t{}", name)?;
        }
        writeln!(f)?;
        for row in 0..self.row_count() {
            write!(f, "{}", self.index.label(row))?;
            for (_, data) in &self.columns {
                match data {
                    ColumnData::Numeric(v) => write!(f, "\t{}", v[row])?,
                    ColumnData::Text(v) => write!(f, "\t{}", v[row])?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "[{} rows x {} columns]", self.row_count(), self.columns.len())?;
        for (name, dtype) in &self.dtypes {
            write!(f, "\n{}: fin-dtype {}", name, dtype)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn usd() -> FinDType {
        FinDType::currency("USD")
    }

    fn sample_table() -> Table {
        let mut table = Table::new(Index::Time(vec![ts(1), ts(2), ts(3)]));
        table
            .insert("price", Column::new(vec![10.0, 11.0, 12.0]).with_dtype(usd()))
            .unwrap();
        table.insert("volume", Column::new(vec![1.0, 2.0, 3.0])).unwrap();
        table
            .insert_text("sector", vec!["a".into(), "b".into(), "a".into()])
            .unwrap();
        table
    }

    #[test]
    fn insert_then_column_keeps_tag() {
        let table = sample_table();
        let price = table.column("price").unwrap();
        assert_eq!(price.dtype(), Some(&usd()));
        assert_eq!(price.index(), table.index());
        assert_eq!(table.column("volume").unwrap().dtype(), None);
    }

    #[test]
    fn replace_updates_tag() {
        let mut table = sample_table();
        let eur = FinDType::currency("EUR");
        table
            .insert("price", Column::new(vec![1.0, 2.0, 3.0]).with_dtype(eur.clone()))
            .unwrap();
        assert_eq!(table.dtype("price"), Some(&eur));

        table.insert("price", Column::new(vec![1.0, 2.0, 3.0])).unwrap();
        assert_eq!(table.dtype("price"), None);
        assert_eq!(table.column_names(), vec!["price", "volume", "sector"]);
    }

    #[test]
    fn drop_removes_tag_entry() {
        let mut table = sample_table();
        table.drop_column("price").unwrap();
        assert!(table.dtype("price").is_none());
        table.insert("price", Column::new(vec![0.0, 0.0, 0.0])).unwrap();
        assert_eq!(table.column("price").unwrap().dtype(), None);
    }

    #[test]
    fn drop_missing_column_errors() {
        let mut table = sample_table();
        assert!(matches!(
            table.drop_column("nope"),
            Err(HammerfinError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn insert_rejects_wrong_length() {
        let mut table = sample_table();
        assert!(matches!(
            table.insert("short", Column::new(vec![1.0])),
            Err(HammerfinError::LengthMismatch {
                expected: 3,
                actual: 1
            })
        ));
        assert!(!table.contains("short"));
    }

    #[test]
    fn insert_rejects_foreign_time_index() {
        let mut table = sample_table();
        let other = Column::time_series(vec![ts(4), ts(5), ts(6)], vec![1.0, 2.0, 3.0]).unwrap();
        assert!(matches!(
            table.insert("other", other),
            Err(HammerfinError::IndexMismatch(_))
        ));
    }

    #[test]
    fn first_time_series_sets_index() {
        let mut table = Table::default();
        let col = Column::time_series(vec![ts(1), ts(2)], vec![1.0, 2.0]).unwrap();
        table.insert("a", col).unwrap();
        assert_eq!(table.time_index().unwrap(), &[ts(1), ts(2)]);
    }

    #[test]
    fn text_column_is_not_numeric() {
        let table = sample_table();
        assert!(matches!(
            table.column("sector"),
            Err(HammerfinError::NotNumeric(_))
        ));
        assert_eq!(table.text_column("sector").unwrap().len(), 3);
    }

    #[test]
    fn select_columns_drops_other_tags() {
        let table = sample_table();
        let selected = table.select_columns(&["volume"]).unwrap();
        assert_eq!(selected.dtypes().count(), 0);
        let selected = table.select_columns(&["price"]).unwrap();
        assert_eq!(selected.dtype("price"), Some(&usd()));
    }

    #[test]
    fn filter_and_take_rows_preserve_tags() {
        let table = sample_table();
        let filtered = table.filter(&[true, false, true]).unwrap();
        let price = filtered.column("price").unwrap();
        assert_eq!(price.values(), &[10.0, 12.0]);
        assert_eq!(price.dtype(), Some(&usd()));
        assert_eq!(filtered.time_index().unwrap(), &[ts(1), ts(3)]);

        let copy = table.clone();
        assert_eq!(copy.column("price").unwrap().dtype(), Some(&usd()));
    }

    #[test]
    fn between_is_inclusive() {
        let table = sample_table();
        let sub = table.between(Some(ts(2).date()), None).unwrap();
        assert_eq!(sub.row_count(), 2);
        let sub = table.between(None, Some(ts(2).date())).unwrap();
        assert_eq!(sub.row_count(), 2);
    }

    #[test]
    fn between_requires_time_index() {
        let table = Table::from_frame(
            Frame::new().with_column("a", ColumnData::Numeric(vec![1.0])),
        )
        .unwrap();
        assert!(matches!(
            table.between(None, None),
            Err(HammerfinError::RequiresTimeIndex)
        ));
    }

    #[test]
    fn from_frame_checks_lengths() {
        let frame = Frame::new()
            .with_column("a", ColumnData::Numeric(vec![1.0, 2.0]))
            .with_column("b", ColumnData::Numeric(vec![1.0]));
        assert!(matches!(
            Table::from_frame(frame),
            Err(HammerfinError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn find_date_promotes_text_dates() {
        let frame = Frame::new()
            .with_column("ticker", ColumnData::Text(vec!["X".into(), "X".into()]))
            .with_column(
                "date",
                ColumnData::Text(vec!["2024-01-01".into(), "2024-01-02".into()]),
            )
            .with_column("close", ColumnData::Numeric(vec![1.0, 2.0]));
        let mut table = Table::from_frame(frame).unwrap();
        assert_eq!(table.find_date().unwrap(), Some("date".to_string()));
        assert_eq!(table.time_index().unwrap(), &[ts(1), ts(2)]);
        assert_eq!(table.column_names(), vec!["ticker", "close"]);
    }

    #[test]
    fn find_date_promotes_epoch_seconds() {
        let frame = Frame::new()
            .with_column("ts", ColumnData::Numeric(vec![1_704_067_200.0, 1_704_153_600.0]))
            .with_column("close", ColumnData::Numeric(vec![1.0, 2.0]));
        let mut table = Table::from_frame(frame).unwrap();
        assert_eq!(table.find_date().unwrap(), Some("ts".to_string()));
        assert_eq!(table.time_index().unwrap(), &[ts(1), ts(2)]);
    }

    #[test]
    fn find_date_without_candidate() {
        let frame = Frame::new().with_column("close", ColumnData::Numeric(vec![1.0]));
        let mut table = Table::from_frame(frame).unwrap();
        assert_eq!(table.find_date().unwrap(), None);
        assert!(table.time_index().is_err());
    }

    #[test]
    fn display_lists_dtypes() {
        let text = sample_table().to_string();
        assert!(text.contains("[3 rows x 3 columns]"));
        assert!(text.contains("price: fin-dtype currency('USD')"));
    }

    #[test]
    fn shape_and_nan_count() {
        let mut table = sample_table();
        table
            .insert("gaps", Column::new(vec![f64::NAN, 1.0, f64::NAN]))
            .unwrap();
        assert_eq!(table.shape(), (3, 4));
        assert_eq!(table.nan_count(), 2);
    }
}
