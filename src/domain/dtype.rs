//! Financial dtypes: semantic tags layered on a primitive storage type.
//!
//! A tag is plain data. Two tags are equal when all their attributes are equal,
//! and the `Display` form encodes every attribute, so equal tags always render
//! identically.

use std::fmt;

/// Primitive representation of tagged values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    Float64,
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageType::Float64 => write!(f, "float64"),
        }
    }
}

/// Variant name of a [`FinDType`], used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DTypeKind {
    Currency,
    Returns,
}

impl fmt::Display for DTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DTypeKind::Currency => write!(f, "currency"),
            DTypeKind::Returns => write!(f, "returns"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FinDType {
    /// Monetary amounts in a single currency.
    Currency(Currency),
    /// Periodic fractional returns (0.01 is +1%).
    Returns,
}

impl FinDType {
    pub fn currency(code: &str) -> Self {
        FinDType::Currency(Currency::new(code))
    }

    pub fn storage_type(&self) -> StorageType {
        StorageType::Float64
    }

    pub fn kind(&self) -> DTypeKind {
        match self {
            FinDType::Currency(_) => DTypeKind::Currency,
            FinDType::Returns => DTypeKind::Returns,
        }
    }

    pub fn as_currency(&self) -> Option<&Currency> {
        match self {
            FinDType::Currency(c) => Some(c),
            FinDType::Returns => None,
        }
    }
}

impl fmt::Display for FinDType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinDType::Currency(c) => write!(f, "{}", c),
            FinDType::Returns => write!(f, "returns"),
        }
    }
}

impl From<Currency> for FinDType {
    fn from(c: Currency) -> Self {
        FinDType::Currency(c)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Currency {
    code: String,
    inflation_adjusted: bool,
    base_period: Option<String>,
}

impl Currency {
    /// Nominal amounts in `code` (ISO 4217, upper-cased).
    pub fn new(code: &str) -> Self {
        Self {
            code: code.trim().to_uppercase(),
            inflation_adjusted: false,
            base_period: None,
        }
    }

    pub fn with_inflation(code: &str, inflation_adjusted: bool, base_period: Option<&str>) -> Self {
        Self {
            code: code.trim().to_uppercase(),
            inflation_adjusted,
            base_period: base_period.map(str::to_string),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn inflation_adjusted(&self) -> bool {
        self.inflation_adjusted
    }

    pub fn base_period(&self) -> Option<&str> {
        self.base_period.as_deref()
    }

    /// Same tag in `target` currency. Only the label changes here; rescaling
    /// the values is the caller's job (see `Column::convert_currency`).
    pub fn converted_to(&self, target: &str) -> Self {
        Self {
            code: target.trim().to_uppercase(),
            inflation_adjusted: self.inflation_adjusted,
            base_period: self.base_period.clone(),
        }
    }

    pub fn adjusted_to(&self, base_period: &str) -> Self {
        Self {
            code: self.code.clone(),
            inflation_adjusted: true,
            base_period: Some(base_period.to_string()),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.inflation_adjusted, &self.base_period) {
            (false, None) => write!(f, "currency('{}')", self.code),
            (true, Some(base)) => write!(f, "currency('{}', inflation-base={})", self.code, base),
            (true, None) => write!(f, "currency('{}', inflation-adjusted)", self.code),
            (false, Some(base)) => write!(f, "currency('{}', base={})", self.code, base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn currency_display_nominal() {
        assert_eq!(FinDType::currency("usd").to_string(), "currency('USD')");
    }

    #[test]
    fn currency_display_inflation_base() {
        let c = Currency::new("USD").adjusted_to("2020");
        assert_eq!(c.to_string(), "currency('USD', inflation-base=2020)");
    }

    #[test]
    fn currency_display_adjusted_without_base() {
        let c = Currency::with_inflation("EUR", true, None);
        assert_eq!(c.to_string(), "currency('EUR', inflation-adjusted)");
    }

    #[test]
    fn returns_display() {
        assert_eq!(FinDType::Returns.to_string(), "returns");
        assert_eq!(FinDType::Returns.storage_type(), StorageType::Float64);
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(FinDType::currency("USD"), FinDType::currency("USD"));
        assert_ne!(FinDType::currency("USD"), FinDType::currency("EUR"));
        assert_ne!(
            FinDType::currency("USD"),
            FinDType::Currency(Currency::new("USD").adjusted_to("2020"))
        );
        assert_ne!(FinDType::currency("USD"), FinDType::Returns);
    }

    #[test]
    fn converted_to_keeps_inflation_attributes() {
        let c = Currency::new("USD").adjusted_to("2019").converted_to("gbp");
        assert_eq!(c.code(), "GBP");
        assert!(c.inflation_adjusted());
        assert_eq!(c.base_period(), Some("2019"));
    }

    #[test]
    fn as_currency_only_for_currency() {
        assert!(FinDType::currency("JPY").as_currency().is_some());
        assert!(FinDType::Returns.as_currency().is_none());
    }

    proptest! {
        #[test]
        fn same_attributes_same_tag_and_repr(
            code in "[A-Z]{3}",
            adjusted in any::<bool>(),
            base in proptest::option::of("[0-9]{4}"),
        ) {
            let a = Currency::with_inflation(&code, adjusted, base.as_deref());
            let b = Currency::with_inflation(&code, adjusted, base.as_deref());
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.to_string(), b.to_string());
        }
    }
}
