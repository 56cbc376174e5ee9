//! Data source port trait.

use crate::domain::error::HammerfinError;
use crate::domain::frame::Frame;
use std::path::Path;

/// Format-specific reading options. Formats that have no use for an option
/// ignore it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub has_headers: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
        }
    }
}

pub trait DataPort {
    fn load(&self, path: &Path, options: &LoadOptions) -> Result<Frame, HammerfinError>;
}
