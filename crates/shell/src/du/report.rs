//! Disk-usage report types.

use serde::Serialize;

use super::options::SizeUnit;

/// One visited path and its (converted) aggregate size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageEntry {
    /// Path as visited.
    pub path: String,
    /// Size in the report's unit.
    pub size: f64,
}

/// Complete result of a disk-usage computation.
///
/// Entries are in emission order: every directory follows all of its
/// descendants, and `total` equals the last entry's size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReport {
    /// Entries in post-order.
    pub entries: Vec<UsageEntry>,
    /// Aggregate size of the starting path.
    pub total: f64,
}

impl UsageReport {
    /// Build a report from byte counts, converting every size to `unit`.
    ///
    /// # Arguments
    /// * `sizes` - (path, bytes) pairs in emission order
    /// * `total` - Byte total of the starting path
    /// * `unit` - Reporting unit
    pub fn from_bytes(sizes: Vec<(String, u64)>, total: u64, unit: SizeUnit) -> Self {
        let entries: Vec<UsageEntry> = sizes
            .into_iter()
            .map(|(path, bytes)| UsageEntry {
                path,
                size: unit.convert(bytes),
            })
            .collect();
        Self {
            entries,
            total: unit.convert(total),
        }
    }

    /// Look up the entry for `path`.
    pub fn get(&self, path: &str) -> Option<&UsageEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the report has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
