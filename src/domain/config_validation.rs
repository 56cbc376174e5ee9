//! Configuration validation.
//!
//! Reads and checks every section before any data is loaded:
//! `[load]`, `[tags]`, `[indicators]`, `[scaling]`, `[encoding]` and `[rates]`.

use crate::domain::dates;
use crate::domain::dtype::FinDType;
use crate::domain::error::HammerfinError;
use crate::domain::processing::{OneHotEncoder, ScaleMethod, Scaler};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::LoadOptions;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadSettings {
    pub options: LoadOptions,
    pub find_date: bool,
    /// Currency every tagged column is converted to after loading.
    pub convert_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSettings {
    pub risk_free: f64,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// One configured exchange rate: units of `to` per unit of `from`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateEntry {
    pub from: String,
    pub to: String,
    pub rate: f64,
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> HammerfinError {
    HammerfinError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), HammerfinError> {
    load_settings(config)?;
    tags_from_config(config)?;
    indicator_settings(config)?;
    scaler_from_config(config)?;
    encoder_from_config(config)?;
    rates_from_config(config)?;
    Ok(())
}

pub fn load_settings(config: &dyn ConfigPort) -> Result<LoadSettings, HammerfinError> {
    let delimiter = match config.get_string("load", "delimiter").as_deref() {
        None => b',',
        Some("tab") => b'\t',
        Some(d) if d.len() == 1 && d.is_ascii() => d.as_bytes()[0],
        Some(d) => {
            return Err(invalid(
                "load",
                "delimiter",
                format!("delimiter must be a single ASCII character or 'tab', got '{}'", d),
            ));
        }
    };
    Ok(LoadSettings {
        options: LoadOptions {
            delimiter,
            has_headers: config.get_bool("load", "has_headers", true),
        },
        find_date: config.get_bool("load", "find_date", true),
        convert_to: match config.get_string("load", "convert_to") {
            None => None,
            Some(code) => Some(currency_code("load", "convert_to", &code)?),
        },
    })
}

fn currency_code(section: &str, key: &str, code: &str) -> Result<String, HammerfinError> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid(
            section,
            key,
            format!("'{}' is not a three-letter currency code", code),
        ));
    }
    Ok(code.to_uppercase())
}

/// `[tags]` entries of the form `close = usd`: the column is tagged as
/// that currency after loading.
pub fn tags_from_config(config: &dyn ConfigPort) -> Result<Vec<(String, FinDType)>, HammerfinError> {
    config
        .keys("tags")
        .into_iter()
        .map(|column| {
            let code = config.get_string("tags", &column).unwrap_or_default();
            let code = currency_code("tags", &column, &code)?;
            Ok((column, FinDType::currency(&code)))
        })
        .collect()
}

fn parse_bound(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, HammerfinError> {
    match config.get_string("indicators", key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => dates::parse_date(&s)
            .map(Some)
            .ok_or_else(|| invalid("indicators", key, format!("invalid date '{}'", s))),
    }
}

pub fn indicator_settings(config: &dyn ConfigPort) -> Result<IndicatorSettings, HammerfinError> {
    let risk_free = match config.get_string("indicators", "risk_free") {
        None => 0.0,
        Some(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid("indicators", "risk_free", format!("not a number: '{}'", s)))?,
    };
    if !risk_free.is_finite() || risk_free <= -1.0 || risk_free >= 1.0 {
        return Err(invalid(
            "indicators",
            "risk_free",
            "risk_free must be a rate between -1 and 1",
        ));
    }
    let start = parse_bound(config, "start")?;
    let end = parse_bound(config, "end")?;
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(invalid("indicators", "end", "end must not be before start"));
        }
    }
    Ok(IndicatorSettings {
        risk_free,
        start,
        end,
    })
}

/// `None` when the `[scaling]` section sets no `method`.
pub fn scaler_from_config(config: &dyn ConfigPort) -> Result<Option<Scaler>, HammerfinError> {
    let Some(method) = config.get_string("scaling", "method") else {
        return Ok(None);
    };
    let method: ScaleMethod = method.parse()?;
    let mut scaler = Scaler::new(method).skip(parse_list(config.get_string("scaling", "skip")));
    for key in config.keys("scaling") {
        if let Some(column) = key.strip_prefix("method.") {
            let value = config.get_string("scaling", &key).unwrap_or_default();
            scaler = scaler.with_method(column, value.parse()?);
        }
    }
    Ok(Some(scaler))
}

/// `None` unless `[encoding] enabled = true`.
pub fn encoder_from_config(config: &dyn ConfigPort) -> Result<Option<OneHotEncoder>, HammerfinError> {
    if !config.get_bool("encoding", "enabled", false) {
        return Ok(None);
    }
    let max_unique = config.get_int("encoding", "max_unique", 10);
    if max_unique <= 0 {
        return Err(invalid(
            "encoding",
            "max_unique",
            "max_unique must be positive",
        ));
    }
    Ok(Some(
        OneHotEncoder::new(max_unique as usize)
            .skip(parse_list(config.get_string("encoding", "skip"))),
    ))
}

/// `[rates]` entries of the form `usd_eur = 0.92`.
pub fn rates_from_config(config: &dyn ConfigPort) -> Result<Vec<RateEntry>, HammerfinError> {
    let mut rates = Vec::new();
    for key in config.keys("rates") {
        let Some((from, to)) = key.split_once('_') else {
            return Err(invalid("rates", &key, "key must be FROM_TO, e.g. usd_eur"));
        };
        let from = currency_code("rates", &key, from)?;
        let to = currency_code("rates", &key, to)?;
        let rate = config
            .get_string("rates", &key)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|r| r.is_finite() && *r > 0.0)
            .ok_or_else(|| invalid("rates", &key, "rate must be a positive number"))?;
        rates.push(RateEntry { from, to, rate });
    }
    Ok(rates)
}
