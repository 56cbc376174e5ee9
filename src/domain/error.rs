//! Domain error types.

use crate::domain::dtype::DTypeKind;

/// Top-level error type for hammerfin.
///
/// Numeric degeneracy (zero standard deviation, empty ranges, Sortino without
/// losses) is never reported here: it surfaces as NaN or infinity in the
/// returned values.
#[derive(Debug, thiserror::Error)]
pub enum HammerfinError {
    #[error("operation requires a time index")]
    RequiresTimeIndex,

    #[error("column has no fin-dtype")]
    MissingDType,

    #[error("wrong fin-dtype: expected {expected}, got {actual}")]
    WrongDType {
        expected: DTypeKind,
        actual: DTypeKind,
    },

    #[error("fin-dtype mismatch: {left} vs {right}")]
    DTypeMismatch { left: String, right: String },

    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("index of column '{0}' does not match the table index")]
    IndexMismatch(String),

    #[error("operands have different time indices")]
    MisalignedIndex,

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("column '{0}' is not a text column")]
    NotText(String),

    #[error("no date-like column found")]
    NoDateColumn,

    #[error("invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("{capability} is not configured")]
    NotConfigured { capability: &'static str },

    #[error("exchange rate unavailable: {from} -> {to}")]
    RateUnavailable { from: String, to: String },

    #[error("price index unavailable for {currency} at {period}")]
    PriceIndexUnavailable { currency: String, period: String },

    #[error("Scaler method must be 'standard' or 'minmax', got '{0}'")]
    InvalidScaleMethod(String),

    #[error(
        "column '{column}' has more than {max_unique} unique values; drop this column or reduce its unique values"
    )]
    TooManyCategories { column: String, max_unique: usize },

    #[error("column '{0}' was not seen during fit")]
    NotFitted(String),

    #[error("unsupported file extension: {extension}. Supported extensions are {supported}")]
    UnsupportedExtension {
        extension: String,
        supported: String,
    },

    #[error("no reader available for {extension} files")]
    FormatUnavailable { extension: String },

    #[error("failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&HammerfinError> for std::process::ExitCode {
    fn from(err: &HammerfinError) -> Self {
        let code: u8 = match err {
            HammerfinError::Io(_)
            | HammerfinError::Load { .. }
            | HammerfinError::UnsupportedExtension { .. }
            | HammerfinError::FormatUnavailable { .. } => 1,
            HammerfinError::ConfigParse { .. }
            | HammerfinError::ConfigInvalid { .. }
            | HammerfinError::InvalidScaleMethod(_) => 2,
            HammerfinError::RequiresTimeIndex
            | HammerfinError::MissingDType
            | HammerfinError::WrongDType { .. }
            | HammerfinError::DTypeMismatch { .. } => 3,
            HammerfinError::NotConfigured { .. }
            | HammerfinError::RateUnavailable { .. }
            | HammerfinError::PriceIndexUnavailable { .. } => 4,
            HammerfinError::LengthMismatch { .. }
            | HammerfinError::IndexMismatch(_)
            | HammerfinError::MisalignedIndex
            | HammerfinError::DuplicateColumn(_)
            | HammerfinError::ColumnNotFound(_)
            | HammerfinError::NotNumeric(_)
            | HammerfinError::NotText(_)
            | HammerfinError::NoDateColumn
            | HammerfinError::InvalidDate { .. }
            | HammerfinError::TooManyCategories { .. }
            | HammerfinError::NotFitted(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
