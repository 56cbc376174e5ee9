//! Preprocessing steps applied to a [`Table`] and recorded in its processing
//! history.
//!
//! A step learns its parameters in `fit` and must be a pure function of that
//! fitted state in `transform`, so the history can be replayed on new data.

pub mod one_hot;
pub mod scaler;

use crate::domain::error::HammerfinError;
use crate::domain::table::Table;
use std::fmt;

pub use one_hot::OneHotEncoder;
pub use scaler::{ScaleMethod, Scaler};

pub trait ProcessingStep: fmt::Debug + fmt::Display + Send + Sync {
    fn name(&self) -> &'static str;

    fn fit(&mut self, table: &Table) -> Result<(), HammerfinError>;

    fn transform(&self, table: &Table) -> Result<Table, HammerfinError>;
}
