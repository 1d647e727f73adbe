//! Configuration options for the virtual filesystem.

use crate::resolver::DEFAULT_MAX_SYMLINK_EXPANSIONS;

/// Configuration for a [`crate::Filesystem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsOptions {
    /// Maximum symlink expansions during one path resolution before
    /// `SymlinkLoop` is reported.
    pub max_symlink_expansions: usize,
}

impl Default for VfsOptions {
    fn default() -> Self {
        Self {
            max_symlink_expansions: DEFAULT_MAX_SYMLINK_EXPANSIONS,
        }
    }
}

impl VfsOptions {
    /// Set the symlink expansion bound.
    ///
    /// # Arguments
    /// * `max_symlink_expansions` - Expansions allowed per resolution
    pub fn with_max_symlink_expansions(mut self, max_symlink_expansions: usize) -> Self {
        self.max_symlink_expansions = max_symlink_expansions;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options: VfsOptions = VfsOptions::default();
        assert_eq!(options.max_symlink_expansions, 40);
    }

    #[test]
    fn test_builder() {
        let options: VfsOptions = VfsOptions::default().with_max_symlink_expansions(8);
        assert_eq!(options.max_symlink_expansions, 8);
    }
}
