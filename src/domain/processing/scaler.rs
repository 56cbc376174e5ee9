//! Column scaling: standard (z-score) or min-max.

use crate::domain::column::Column;
use crate::domain::error::HammerfinError;
use crate::domain::frame::ColumnData;
use crate::domain::processing::ProcessingStep;
use crate::domain::stats;
use crate::domain::table::Table;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMethod {
    #[default]
    Standard,
    MinMax,
}

impl FromStr for ScaleMethod {
    type Err = HammerfinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(ScaleMethod::Standard),
            "minmax" => Ok(ScaleMethod::MinMax),
            _ => Err(HammerfinError::InvalidScaleMethod(s.to_string())),
        }
    }
}

impl fmt::Display for ScaleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleMethod::Standard => write!(f, "standard"),
            ScaleMethod::MinMax => write!(f, "minmax"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScaleParams {
    Standard { mean: f64, std: f64 },
    MinMax { min: f64, max: f64 },
}

/// Numeric columns are scaled with their per-column method, or the default
/// one. Per-column methods match column names case-insensitively when no
/// exact match exists. Text columns are skipped at fit time. Scaled columns
/// lose their fin-dtype: the values no longer carry currency semantics.
#[derive(Debug, Clone, Default)]
pub struct Scaler {
    default_method: ScaleMethod,
    methods: BTreeMap<String, ScaleMethod>,
    skip: Vec<String>,
    text_columns: Vec<String>,
    params: BTreeMap<String, ScaleParams>,
}

impl Scaler {
    pub fn new(default_method: ScaleMethod) -> Self {
        Self {
            default_method,
            ..Self::default()
        }
    }

    pub fn with_method(mut self, column: &str, method: ScaleMethod) -> Self {
        self.methods.insert(column.to_string(), method);
        self
    }

    pub fn skip<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(columns.into_iter().map(Into::into));
        self
    }

    fn method_for(&self, column: &str) -> ScaleMethod {
        self.methods
            .get(column)
            .or_else(|| {
                self.methods
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(column))
                    .map(|(_, method)| method)
            })
            .copied()
            .unwrap_or(self.default_method)
    }

    fn skips(&self, column: &str) -> bool {
        self.skip.iter().chain(&self.text_columns).any(|s| s == column)
    }
}

impl ProcessingStep for Scaler {
    fn name(&self) -> &'static str {
        "scaler"
    }

    fn fit(&mut self, table: &Table) -> Result<(), HammerfinError> {
        self.params.clear();
        self.text_columns.clear();
        for (name, data) in table.entries() {
            if self.skips(name) {
                continue;
            }
            let ColumnData::Numeric(values) = data else {
                self.text_columns.push(name.clone());
                continue;
            };
            let params = match self.method_for(name) {
                ScaleMethod::Standard => ScaleParams::Standard {
                    mean: stats::mean(values),
                    std: stats::std(values, 1),
                },
                ScaleMethod::MinMax => ScaleParams::MinMax {
                    min: stats::min(values),
                    max: stats::max(values),
                },
            };
            self.params.insert(name.clone(), params);
        }
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table, HammerfinError> {
        let mut out = table.clone();
        for (name, data) in table.entries() {
            if self.skips(name) {
                continue;
            }
            let ColumnData::Numeric(values) = data else {
                continue;
            };
            let params = self
                .params
                .get(name)
                .ok_or_else(|| HammerfinError::NotFitted(name.clone()))?;
            let scaled: Vec<f64> = match *params {
                ScaleParams::Standard { mean, std } => {
                    if std == 0.0 {
                        tracing::warn!(
                            column = %name,
                            "standard deviation was 0 during fit; column left unchanged"
                        );
                        continue;
                    }
                    values.iter().map(|v| (v - mean) / std).collect()
                }
                ScaleParams::MinMax { min, max } => {
                    if max == min {
                        tracing::warn!(
                            column = %name,
                            "max and min were equal during fit; column left unchanged"
                        );
                        continue;
                    }
                    values.iter().map(|v| (v - min) / (max - min)).collect()
                }
            };
            out.insert(name, Column::new(scaled))?;
        }
        Ok(out)
    }
}

impl fmt::Display for Scaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scaler(default_method={}, method={{", self.default_method)?;
        for (i, (column, method)) in self.methods.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", column, method)?;
        }
        let skip: Vec<&String> = self.skip.iter().chain(&self.text_columns).collect();
        write!(f, "}}, skip={:?})", skip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dtype::FinDType;
    use approx::assert_relative_eq;

    fn table() -> Table {
        let mut t = Table::default();
        t.insert(
            "price",
            Column::new(vec![1.0, 2.0, 3.0]).with_dtype(FinDType::currency("USD")),
        )
        .unwrap();
        t.insert("flat", Column::new(vec![5.0, 5.0, 5.0])).unwrap();
        t.insert_text("tag", vec!["a".into(), "b".into(), "c".into()])
            .unwrap();
        t
    }

    #[test]
    fn parse_methods() {
        assert_eq!("standard".parse::<ScaleMethod>().unwrap(), ScaleMethod::Standard);
        assert_eq!("MinMax".parse::<ScaleMethod>().unwrap(), ScaleMethod::MinMax);
        assert!(matches!(
            "robust".parse::<ScaleMethod>(),
            Err(HammerfinError::InvalidScaleMethod(_))
        ));
    }

    #[test]
    fn standard_uses_sample_std() {
        let mut scaler = Scaler::new(ScaleMethod::Standard);
        scaler.fit(&table()).unwrap();
        let out = scaler.transform(&table()).unwrap();
        let price = out.column("price").unwrap();
        assert_relative_eq!(price.values()[0], -1.0);
        assert_relative_eq!(price.values()[2], 1.0);
        assert_eq!(price.dtype(), None);
    }

    #[test]
    fn minmax_per_column() {
        let mut scaler = Scaler::new(ScaleMethod::Standard).with_method("price", ScaleMethod::MinMax);
        scaler.fit(&table()).unwrap();
        let out = scaler.transform(&table()).unwrap();
        assert_eq!(out.column("price").unwrap().values(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn degenerate_column_left_unchanged() {
        let mut scaler = Scaler::new(ScaleMethod::Standard);
        scaler.fit(&table()).unwrap();
        let out = scaler.transform(&table()).unwrap();
        assert_eq!(out.column("flat").unwrap().values(), &[5.0, 5.0, 5.0]);
    }

    #[test]
    fn skipped_columns_untouched() {
        let mut scaler = Scaler::new(ScaleMethod::Standard).skip(["price"]);
        scaler.fit(&table()).unwrap();
        let out = scaler.transform(&table()).unwrap();
        let price = out.column("price").unwrap();
        assert_eq!(price.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(price.dtype(), Some(&FinDType::currency("USD")));
    }

    #[test]
    fn text_columns_are_skipped_at_fit() {
        let mut scaler = Scaler::new(ScaleMethod::Standard);
        scaler.fit(&table()).unwrap();
        assert!(scaler.to_string().contains("\"tag\""));
    }

    #[test]
    fn per_column_method_ignores_case() {
        let mut t = Table::default();
        t.insert("Close", Column::new(vec![1.0, 2.0, 3.0])).unwrap();
        let mut scaler = Scaler::new(ScaleMethod::Standard).with_method("close", ScaleMethod::MinMax);
        scaler.fit(&t).unwrap();
        let out = scaler.transform(&t).unwrap();
        assert_eq!(out.column("Close").unwrap().values(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn refit_resets_learned_state() {
        let mut scaler = Scaler::new(ScaleMethod::Standard);
        scaler.fit(&table()).unwrap();
        scaler.fit(&table()).unwrap();
        assert_eq!(scaler.to_string().matches("\"tag\"").count(), 1);

        let mut other = Table::default();
        other.insert("volume", Column::new(vec![2.0, 4.0])).unwrap();
        scaler.fit(&other).unwrap();
        assert!(matches!(
            scaler.transform(&table()),
            Err(HammerfinError::NotFitted(c)) if c == "price"
        ));
    }

    #[test]
    fn unfitted_numeric_column_errors() {
        let mut scaler = Scaler::new(ScaleMethod::Standard);
        scaler.fit(&table()).unwrap();
        let mut other = table();
        other.insert("extra", Column::new(vec![1.0, 2.0, 3.0])).unwrap();
        assert!(matches!(
            scaler.transform(&other),
            Err(HammerfinError::NotFitted(c)) if c == "extra"
        ));
    }

    #[test]
    fn display() {
        let scaler = Scaler::new(ScaleMethod::MinMax).with_method("a", ScaleMethod::Standard);
        assert_eq!(
            scaler.to_string(),
            "Scaler(default_method=minmax, method={a: standard}, skip=[])"
        );
    }
}
