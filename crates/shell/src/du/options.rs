//! Options for disk-usage computation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Unit that every reported size is expressed in.
///
/// Scaling is decimal: `kb` divides by 1000, not 1024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    /// Raw byte counts.
    #[default]
    Bytes,
    /// Kilobytes (1e3 bytes).
    Kb,
    /// Megabytes (1e6 bytes).
    Mb,
    /// Gigabytes (1e9 bytes).
    Gb,
}

impl SizeUnit {
    /// Divisor applied to a byte count.
    pub fn divisor(&self) -> f64 {
        match self {
            SizeUnit::Bytes => 1.0,
            SizeUnit::Kb => 1e3,
            SizeUnit::Mb => 1e6,
            SizeUnit::Gb => 1e9,
        }
    }

    /// Convert a byte count into this unit.
    pub fn convert(&self, bytes: u64) -> f64 {
        bytes as f64 / self.divisor()
    }

    /// Lowercase name of the unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeUnit::Bytes => "bytes",
            SizeUnit::Kb => "kb",
            SizeUnit::Mb => "mb",
            SizeUnit::Gb => "gb",
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized unit name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown size unit: {0} (expected bytes, kb, mb or gb)")]
pub struct ParseSizeUnitError(pub String);

impl FromStr for SizeUnit {
    type Err = ParseSizeUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bytes" => Ok(SizeUnit::Bytes),
            "kb" => Ok(SizeUnit::Kb),
            "mb" => Ok(SizeUnit::Mb),
            "gb" => Ok(SizeUnit::Gb),
            _ => Err(ParseSizeUnitError(s.to_string())),
        }
    }
}

/// Options for [`compute_usage`](super::compute_usage).
///
/// Deserializes from the camelCase shape callers pass around, e.g.
/// `{"followSymlinks": true, "unit": "kb"}`. The older `symLinks` and
/// `format` keys are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DuOptions {
    /// Resolve symlinks and count what they point at instead of the link.
    #[serde(alias = "symLinks")]
    pub follow_symlinks: bool,
    /// Unit for every reported size.
    #[serde(alias = "format")]
    pub unit: SizeUnit,
    /// Checked between traversal steps.
    #[serde(skip)]
    pub cancel: Option<CancellationToken>,
}

impl DuOptions {
    /// Set whether symlinks are followed.
    pub fn with_follow_symlinks(mut self, follow_symlinks: bool) -> Self {
        self.follow_symlinks = follow_symlinks;
        self
    }

    /// Set the reporting unit.
    pub fn with_unit(mut self, unit: SizeUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Attach a cancellation token.
    ///
    /// # Arguments
    /// * `token` - Cancelling it makes the running traversal fail with `Cancelled`
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Check whether the attached token (if any) has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, CancellationToken::is_cancelled)
    }
}
