#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use hammerfin::domain::column::Column;
use hammerfin::domain::error::HammerfinError;
use hammerfin::domain::frame::{ColumnData, Frame};
use hammerfin::ports::data_port::{DataPort, LoadOptions};
use hammerfin::ports::rate_port::ExchangeRatePort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const SAMPLE_RETURNS: [f64; 5] = [0.01, -0.02, 0.03, -0.01, 0.00];

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Midnight timestamps on consecutive calendar days from 2024-01-01 (a Monday).
pub fn days(n: usize) -> Vec<NaiveDateTime> {
    let start = date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap();
    (0..n).map(|i| start + Duration::days(i as i64)).collect()
}

pub fn returns_column(values: &[f64]) -> Column {
    Column::time_series(days(values.len()), values.to_vec()).unwrap()
}

/// Data source returning a fixed frame and recording the paths asked for.
pub struct MockDataPort {
    pub frame: Frame,
    pub requested: RefCell<Vec<PathBuf>>,
}

impl MockDataPort {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            requested: RefCell::new(Vec::new()),
        }
    }

    pub fn prices() -> Self {
        Self::new(
            Frame::new()
                .with_column(
                    "date",
                    ColumnData::Text(vec![
                        "2024-01-01".into(),
                        "2024-01-02".into(),
                        "2024-01-03".into(),
                    ]),
                )
                .with_column("close", ColumnData::Numeric(vec![100.0, 101.0, 99.0]))
                .with_column(
                    "sector",
                    ColumnData::Text(vec!["tech".into(), "energy".into(), "tech".into()]),
                ),
        )
    }
}

impl DataPort for MockDataPort {
    fn load(&self, path: &Path, _options: &LoadOptions) -> Result<Frame, HammerfinError> {
        self.requested.borrow_mut().push(path.to_path_buf());
        Ok(self.frame.clone())
    }
}

pub struct MockRates {
    pub rates: HashMap<(String, String), f64>,
}

impl MockRates {
    pub fn new() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: f64) -> Self {
        self.rates.insert((from.to_string(), to.to_string()), rate);
        self
    }
}

impl ExchangeRatePort for MockRates {
    fn exchange_rate(&self, from: &str, to: &str) -> Result<f64, HammerfinError> {
        self.rates
            .get(&(from.to_string(), to.to_string()))
            .copied()
            .ok_or_else(|| HammerfinError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
            })
    }
}

pub fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// In-memory sink for `tracing` output.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Run `f` with a fmt subscriber writing into this buffer.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
