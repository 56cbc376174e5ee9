//! Generic tabular value handed over by data sources.

/// Storage of one column, independent of any fin-dtype.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }

    pub fn take(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(v) => ColumnData::Numeric(rows.iter().map(|&i| v[i]).collect()),
            ColumnData::Text(v) => ColumnData::Text(rows.iter().map(|&i| v[i].clone()).collect()),
        }
    }

    /// Missing cells: NaN for numeric columns, empty strings for text.
    pub fn missing_count(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.iter().filter(|x| x.is_nan()).count(),
            ColumnData::Text(v) => v.iter().filter(|s| s.is_empty()).count(),
        }
    }
}

/// Rows × named columns, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub columns: Vec<(String, ColumnData)>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: &str, data: ColumnData) -> Self {
        self.columns.push((name.to_string(), data));
        self
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_selects_rows_in_order() {
        let data = ColumnData::Text(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(
            data.take(&[2, 0]),
            ColumnData::Text(vec!["c".into(), "a".into()])
        );
    }

    #[test]
    fn missing_count_numeric_and_text() {
        assert_eq!(ColumnData::Numeric(vec![1.0, f64::NAN]).missing_count(), 1);
        assert_eq!(
            ColumnData::Text(vec![String::new(), "x".into()]).missing_count(),
            1
        );
    }

    #[test]
    fn frame_row_count() {
        let frame = Frame::new().with_column("a", ColumnData::Numeric(vec![1.0, 2.0]));
        assert_eq!(frame.row_count(), 2);
        assert_eq!(Frame::new().row_count(), 0);
    }
}
