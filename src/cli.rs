//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::file_adapter::FileDataAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::static_rates::StaticRates;
use crate::domain::config_validation::{
    encoder_from_config, indicator_settings, load_settings, rates_from_config,
    scaler_from_config, tags_from_config, validate_config, IndicatorSettings, LoadSettings,
};
use crate::domain::error::HammerfinError;
use crate::domain::indicator::{IndicatorKind, Indicators};
use crate::domain::table::Table;
use crate::ports::config_port::ConfigPort;
use crate::ports::rate_port::{ExchangeRatePort, Unconfigured};

#[derive(Parser, Debug)]
#[command(name = "hammerfin", about = "Financial indicators for tabular time series")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute Sharpe, Sortino, Calmar and max drawdown per numeric column
    Indicators {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Only compute for this column
        #[arg(long)]
        column: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        risk_free: Option<f64>,
    },
    /// Show shape, columns, fin-dtypes and date range of a data file
    Info {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Apply the configured encoding and scaling and print the result
    Process {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Indicators {
            input,
            config,
            column,
            start,
            end,
            risk_free,
        } => run_indicators(
            &input,
            config.as_ref(),
            column.as_deref(),
            Overrides {
                start,
                end,
                risk_free,
            },
        ),
        Command::Info { input, config } => run_info(&input, config.as_ref()),
        Command::Process { input, config } => run_process(&input, &config),
        Command::Validate { config } => run_validate(&config),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, HammerfinError> {
    FileConfigAdapter::from_file(path).map_err(|e| HammerfinError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// An empty config when no path is given.
fn load_optional_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, HammerfinError> {
    match path {
        Some(p) => {
            let adapter = load_config(p)?;
            validate_config(&adapter)?;
            Ok(adapter)
        }
        None => FileConfigAdapter::from_string("").map_err(|reason| HammerfinError::ConfigParse {
            file: "<empty>".into(),
            reason,
        }),
    }
}

/// Exchange rates from `[rates]`, or [`Unconfigured`] when none are given.
pub fn build_rates(config: &dyn ConfigPort) -> Result<Box<dyn ExchangeRatePort>, HammerfinError> {
    let entries = rates_from_config(config)?;
    if entries.is_empty() {
        return Ok(Box::new(Unconfigured));
    }
    let rates = entries
        .iter()
        .fold(StaticRates::new(), |rates, e| rates.with_rate(&e.from, &e.to, e.rate));
    Ok(Box::new(rates))
}

/// Load `input`, promote its date column, tag the `[tags]` columns and
/// convert them when `[load] convert_to` is set.
pub fn load_table(input: &Path, config: &dyn ConfigPort) -> Result<Table, HammerfinError> {
    let LoadSettings {
        options,
        find_date,
        convert_to,
    } = load_settings(config)?;
    tracing::info!(path = %input.display(), "loading data");
    let mut table = Table::load(input, &FileDataAdapter::new(), &options)?;
    if find_date {
        table.find_date()?;
    }
    // INI keys come back lower-cased
    for (key, dtype) in tags_from_config(config)? {
        let name = table
            .column_names()
            .into_iter()
            .find(|c| c.to_lowercase() == key)
            .map(str::to_string)
            .unwrap_or(key);
        let column = table.column(&name)?.with_dtype(dtype);
        table.insert(&name, column)?;
    }
    if let Some(target) = convert_to {
        let rates = build_rates(config)?;
        let tagged: Vec<String> = table.dtypes().map(|(n, _)| n.to_string()).collect();
        for name in tagged {
            table.convert_currency(&name, &target, &*rates)?;
        }
    }
    table.log_summary();
    Ok(table)
}

struct Overrides {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    risk_free: Option<f64>,
}

impl Overrides {
    fn apply(self, settings: IndicatorSettings) -> IndicatorSettings {
        IndicatorSettings {
            risk_free: self.risk_free.unwrap_or(settings.risk_free),
            start: self.start.or(settings.start),
            end: self.end.or(settings.end),
        }
    }
}

fn format_value(v: f64) -> String {
    if v.is_finite() {
        format!("{:.6}", v)
    } else {
        v.to_string()
    }
}

fn run_indicators(
    input: &Path,
    config_path: Option<&PathBuf>,
    column: Option<&str>,
    overrides: Overrides,
) -> Result<(), HammerfinError> {
    let config = load_optional_config(config_path)?;
    let settings = overrides.apply(indicator_settings(&config)?);
    let table = load_table(input, &config)?;
    if table.index().as_time().is_none() {
        return Err(HammerfinError::NoDateColumn);
    }
    let IndicatorSettings {
        risk_free,
        start,
        end,
    } = settings;

    let rows: Vec<(String, Vec<f64>)> = match column {
        Some(name) => {
            let summary = table.column(name)?.indicators(start, end, risk_free)?;
            vec![(
                name.to_string(),
                summary.iter().map(|(_, v)| *v).collect(),
            )]
        }
        None => {
            let summary = table.indicators(start, end, risk_free)?;
            table
                .numeric_columns()
                .map(|(name, _)| {
                    let values = IndicatorKind::ALL
                        .iter()
                        .map(|kind| {
                            summary
                                .get(*kind)
                                .and_then(|per_column| per_column.get(name))
                                .copied()
                                .unwrap_or(f64::NAN)
                        })
                        .collect();
                    (name.to_string(), values)
                })
                .collect()
        }
    };

    print!("column");
    for kind in IndicatorKind::ALL {
        print!("\t{}", kind);
    }
    println!();
    for (name, values) in rows {
        print!("{}", name);
        for v in values {
            print!("\t{}", format_value(v));
        }
        println!();
    }
    Ok(())
}

fn run_info(input: &Path, config_path: Option<&PathBuf>) -> Result<(), HammerfinError> {
    let config = load_optional_config(config_path)?;
    let table = load_table(input, &config)?;
    let (rows, cols) = table.shape();
    println!("rows: {}", rows);
    println!("columns: {}", cols);
    for name in table.column_names() {
        let kind = if table.data(name)?.is_numeric() {
            "numeric"
        } else {
            "text"
        };
        match table.dtype(name) {
            Some(dtype) => println!("  {} ({}): {}", name, kind, dtype),
            None => println!("  {} ({})", name, kind),
        }
    }
    match table.index().as_time() {
        Some(times) => {
            let first = times.iter().min();
            let last = times.iter().max();
            if let (Some(first), Some(last)) = (first, last) {
                println!("date range: {} to {}", first.date(), last.date());
            }
        }
        None => println!("date range: none (no date column)"),
    }
    println!("missing values: {}", table.nan_count());
    Ok(())
}

fn run_process(input: &Path, config_path: &Path) -> Result<(), HammerfinError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;
    let mut table = load_table(input, &config)?;
    if let Some(encoder) = encoder_from_config(&config)? {
        table.one_hot_encode(encoder)?;
    }
    if let Some(scaler) = scaler_from_config(&config)? {
        table.scale(scaler)?;
    }
    for step in table.processing_steps() {
        tracing::info!(step = step.name(), "applied {}", step);
    }
    println!("{}", table);
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), HammerfinError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;
    println!("{}: OK", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_take_precedence() {
        let settings = IndicatorSettings {
            risk_free: 0.01,
            start: NaiveDate::from_ymd_opt(2024, 1, 1),
            end: None,
        };
        let applied = Overrides {
            start: None,
            end: NaiveDate::from_ymd_opt(2024, 6, 30),
            risk_free: Some(0.03),
        }
        .apply(settings);
        assert_eq!(applied.risk_free, 0.03);
        assert_eq!(applied.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(applied.end, NaiveDate::from_ymd_opt(2024, 6, 30));
    }

    #[test]
    fn empty_rates_are_unconfigured() {
        let config = FileConfigAdapter::from_string("").unwrap();
        let rates = build_rates(&config).unwrap();
        assert!(matches!(
            rates.exchange_rate("USD", "EUR"),
            Err(HammerfinError::NotConfigured { .. })
        ));
    }

    #[test]
    fn configured_rates_are_used() {
        let config = FileConfigAdapter::from_string("[rates]\nusd_eur = 0.5\n").unwrap();
        let rates = build_rates(&config).unwrap();
        assert_eq!(rates.exchange_rate("EUR", "USD").unwrap(), 2.0);
    }

    #[test]
    fn format_keeps_non_finite() {
        assert_eq!(format_value(0.5), "0.500000");
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "inf");
    }
}
