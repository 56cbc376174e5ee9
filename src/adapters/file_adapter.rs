//! File data adapter: picks a reader from the file extension.

use crate::domain::error::HammerfinError;
use crate::domain::frame::{ColumnData, Frame};
use crate::ports::data_port::{DataPort, LoadOptions};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Excel,
    Json,
    Pickle,
    Feather,
    Parquet,
}

pub const SUPPORTED_EXTENSIONS: [&str; 7] =
    [".csv", ".xls", ".xlsx", ".json", ".pkl", ".feather", ".parquet"];

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, HammerfinError> {
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        match extension.as_str() {
            ".csv" => Ok(SourceFormat::Csv),
            ".xls" | ".xlsx" => Ok(SourceFormat::Excel),
            ".json" => Ok(SourceFormat::Json),
            ".pkl" => Ok(SourceFormat::Pickle),
            ".feather" => Ok(SourceFormat::Feather),
            ".parquet" => Ok(SourceFormat::Parquet),
            _ => Err(HammerfinError::UnsupportedExtension {
                extension,
                supported: SUPPORTED_EXTENSIONS.join(", "),
            }),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Csv => write!(f, "csv"),
            SourceFormat::Excel => write!(f, "excel"),
            SourceFormat::Json => write!(f, "json"),
            SourceFormat::Pickle => write!(f, "pickle"),
            SourceFormat::Feather => write!(f, "feather"),
            SourceFormat::Parquet => write!(f, "parquet"),
        }
    }
}

/// Builds a column from raw cells: numeric when every non-empty cell parses
/// as a number (empty cells become NaN), text otherwise.
fn infer_column(cells: Vec<String>) -> ColumnData {
    let parsed: Option<Vec<f64>> = cells
        .iter()
        .map(|c| {
            let c = c.trim();
            if c.is_empty() {
                Some(f64::NAN)
            } else {
                c.parse::<f64>().ok()
            }
        })
        .collect();
    match parsed {
        Some(values) if cells.iter().any(|c| !c.trim().is_empty()) => ColumnData::Numeric(values),
        _ => ColumnData::Text(cells),
    }
}

fn load_error(path: &Path, reason: impl fmt::Display) -> HammerfinError {
    HammerfinError::Load {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileDataAdapter;

impl FileDataAdapter {
    pub fn new() -> Self {
        Self
    }

    fn read_csv(&self, path: &Path, options: &LoadOptions) -> Result<Frame, HammerfinError> {
        let content = fs::read_to_string(path).map_err(|e| load_error(path, e))?;
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(options.has_headers)
            .from_reader(content.as_bytes());

        let mut names: Vec<String> = if options.has_headers {
            rdr.headers()
                .map_err(|e| load_error(path, format!("CSV header error: {}", e)))?
                .iter()
                .map(|h| h.trim().to_string())
                .collect()
        } else {
            Vec::new()
        };

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); names.len()];
        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| load_error(path, format!("CSV parse error: {}", e)))?;
            if names.is_empty() && row == 0 {
                names = (0..record.len()).map(|i| i.to_string()).collect();
                cells = vec![Vec::new(); names.len()];
            }
            if record.len() != names.len() {
                return Err(load_error(
                    path,
                    format!(
                        "row {} has {} fields, expected {}",
                        row + 1,
                        record.len(),
                        names.len()
                    ),
                ));
            }
            for (column, field) in cells.iter_mut().zip(record.iter()) {
                column.push(field.to_string());
            }
        }

        Ok(Frame {
            columns: names.into_iter().zip(cells.into_iter().map(infer_column)).collect(),
        })
    }

    /// Either an array of records (`[{"a": 1}, ...]`) or an object of
    /// columns (`{"a": [1, ...]}`).
    fn read_json(&self, path: &Path) -> Result<Frame, HammerfinError> {
        let content = fs::read_to_string(path).map_err(|e| load_error(path, e))?;
        let root: Value = serde_json::from_str(&content).map_err(|e| load_error(path, e))?;

        let mut names: Vec<String> = Vec::new();
        let mut cells: Vec<Vec<String>> = Vec::new();
        match root {
            Value::Array(records) => {
                for record in &records {
                    let Value::Object(fields) = record else {
                        return Err(load_error(path, "expected an array of objects"));
                    };
                    for key in fields.keys() {
                        if !names.contains(key) {
                            names.push(key.clone());
                        }
                    }
                }
                cells = names
                    .iter()
                    .map(|n| records.iter().map(|r| json_cell(r.get(n))).collect())
                    .collect();
            }
            Value::Object(columns) => {
                for (name, values) in columns {
                    let Value::Array(values) = values else {
                        return Err(load_error(path, format!("column '{}' is not an array", name)));
                    };
                    cells.push(values.iter().map(|v| json_cell(Some(v))).collect());
                    names.push(name);
                }
            }
            _ => return Err(load_error(path, "expected a JSON array or object")),
        }

        let frame = Frame {
            columns: names.into_iter().zip(cells.into_iter().map(infer_column)).collect(),
        };
        if frame.columns.iter().any(|(_, c)| c.len() != frame.row_count()) {
            return Err(load_error(path, "columns have different lengths"));
        }
        Ok(frame)
    }
}

fn json_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl DataPort for FileDataAdapter {
    fn load(&self, path: &Path, options: &LoadOptions) -> Result<Frame, HammerfinError> {
        let format = SourceFormat::from_path(path)?;
        tracing::debug!(path = %path.display(), %format, "loading table");
        match format {
            SourceFormat::Csv => self.read_csv(path, options),
            SourceFormat::Json => self.read_json(path),
            SourceFormat::Excel
            | SourceFormat::Pickle
            | SourceFormat::Feather
            | SourceFormat::Parquet => Err(HammerfinError::FormatUnavailable {
                extension: format.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn extension_detection_is_case_insensitive() {
        assert_eq!(
            SourceFormat::from_path(Path::new("a/B.CSV")).unwrap(),
            SourceFormat::Csv
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("x.xlsx")).unwrap(),
            SourceFormat::Excel
        );
    }

    #[test]
    fn unsupported_extension_names_it() {
        match SourceFormat::from_path(Path::new("prices.foo")) {
            Err(HammerfinError::UnsupportedExtension {
                extension,
                supported,
            }) => {
                assert_eq!(extension, ".foo");
                for ext in SUPPORTED_EXTENSIONS {
                    assert!(supported.contains(ext));
                }
            }
            other => panic!("expected UnsupportedExtension, got {:?}", other),
        }
    }

    #[test]
    fn csv_infers_numeric_and_text() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "prices.csv",
            "date,close,sector\n2024-01-01,1.5,tech\n2024-01-02,,energy\n",
        );
        let frame = FileDataAdapter::new()
            .load(&path, &LoadOptions::default())
            .unwrap();
        assert_eq!(frame.row_count(), 2);
        assert_eq!(frame.columns[0].0, "date");
        assert!(!frame.columns[0].1.is_numeric());
        match &frame.columns[1].1 {
            ColumnData::Numeric(v) => {
                assert_eq!(v[0], 1.5);
                assert!(v[1].is_nan());
            }
            other => panic!("expected numeric, got {:?}", other),
        }
    }

    #[test]
    fn csv_custom_delimiter_without_headers() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "raw.csv", "1;2\n3;4\n");
        let options = LoadOptions {
            delimiter: b';',
            has_headers: false,
        };
        let frame = FileDataAdapter::new().load(&path, &options).unwrap();
        assert_eq!(frame.columns[0].0, "0");
        assert_eq!(frame.columns[1].1, ColumnData::Numeric(vec![2.0, 4.0]));
    }

    #[test]
    fn json_records() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "r.json",
            r#"[{"date": "2024-01-01", "ret": 0.01}, {"date": "2024-01-02", "ret": null}]"#,
        );
        let frame = FileDataAdapter::new()
            .load(&path, &LoadOptions::default())
            .unwrap();
        assert_eq!(frame.columns[0].0, "date");
        match &frame.columns[1].1 {
            ColumnData::Numeric(v) => {
                assert_eq!(v[0], 0.01);
                assert!(v[1].is_nan());
            }
            other => panic!("expected numeric, got {:?}", other),
        }
    }

    #[test]
    fn json_columns() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "c.json", r#"{"a": [1, 2], "b": ["x", "y"]}"#);
        let frame = FileDataAdapter::new()
            .load(&path, &LoadOptions::default())
            .unwrap();
        assert_eq!(frame.columns[0].1, ColumnData::Numeric(vec![1.0, 2.0]));
        assert_eq!(
            frame.columns[1].1,
            ColumnData::Text(vec!["x".into(), "y".into()])
        );
    }

    #[test]
    fn binary_formats_have_no_reader() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "t.parquet", "");
        assert!(matches!(
            FileDataAdapter::new().load(&path, &LoadOptions::default()),
            Err(HammerfinError::FormatUnavailable { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let result = FileDataAdapter::new().load(Path::new("/nonexistent/x.csv"), &LoadOptions::default());
        assert!(matches!(result, Err(HammerfinError::Load { .. })));
    }
}
