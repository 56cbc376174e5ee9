//! One-hot encoding of categorical text columns.

use crate::domain::column::Column;
use crate::domain::error::HammerfinError;
use crate::domain::frame::ColumnData;
use crate::domain::processing::ProcessingStep;
use crate::domain::table::Table;
use std::fmt;

pub const DEFAULT_MAX_UNIQUE: usize = 10;

/// Distinct non-empty values in first-appearance order.
fn unique_values(values: &[String]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for v in values {
        if !v.is_empty() && !seen.contains(&v.as_str()) {
            seen.push(v);
        }
    }
    seen
}

/// Replaces each fitted text column `c` by one 0/1 column `c_<value>` per
/// category seen at fit. Values unseen at fit are logged and encoded as all
/// zeros.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    max_unique: usize,
    skip: Vec<String>,
    categories: Vec<(String, Vec<String>)>,
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNIQUE)
    }
}

impl OneHotEncoder {
    pub fn new(max_unique: usize) -> Self {
        Self {
            max_unique,
            skip: Vec::new(),
            categories: Vec::new(),
        }
    }

    pub fn skip<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Fitted categories per encoded column.
    pub fn categories(&self) -> &[(String, Vec<String>)] {
        &self.categories
    }
}

impl ProcessingStep for OneHotEncoder {
    fn name(&self) -> &'static str {
        "one_hot_encoder"
    }

    fn fit(&mut self, table: &Table) -> Result<(), HammerfinError> {
        let mut categories = Vec::new();
        for (name, data) in table.entries() {
            if self.skip.contains(name) {
                continue;
            }
            let ColumnData::Text(values) = data else {
                continue;
            };
            let unique = unique_values(values);
            if unique.len() > self.max_unique {
                return Err(HammerfinError::TooManyCategories {
                    column: name.clone(),
                    max_unique: self.max_unique,
                });
            }
            categories.push((name.clone(), unique.into_iter().map(String::from).collect()));
        }
        self.categories = categories;
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table, HammerfinError> {
        let mut out = table.clone();
        for (name, fitted) in &self.categories {
            let values = table.text_column(name)?;
            for value in unique_values(values) {
                if !fitted.iter().any(|c| c == value) {
                    tracing::warn!(
                        column = %name,
                        category = %value,
                        "unseen category during fit; this category will be ignored"
                    );
                }
            }
            for category in fitted {
                let encoded_name = format!("{}_{}", name, category);
                if out.contains(&encoded_name) {
                    return Err(HammerfinError::DuplicateColumn(encoded_name));
                }
                let encoded = values
                    .iter()
                    .map(|v| if v == category { 1.0 } else { 0.0 })
                    .collect();
                out.insert(&encoded_name, Column::new(encoded))?;
            }
            out.drop_column(name)?;
        }
        Ok(out)
    }
}

impl fmt::Display for OneHotEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OneHotEncoder(max_unique={}, skip={:?})",
            self.max_unique, self.skip
        )
    }
}
