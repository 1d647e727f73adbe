//! Symlink inode implementation.

/// Symlink inode payload.
///
/// The target is stored verbatim; it is only interpreted by the resolver.
#[derive(Debug, Clone)]
pub struct INodeSymlink {
    /// Target path (absolute or relative to the link's directory).
    target: String,
}

impl INodeSymlink {
    /// Create a new symlink payload.
    ///
    /// # Arguments
    /// * `target` - Target path as given by the caller
    pub fn new(target: String) -> Self {
        Self { target }
    }

    /// Get the symlink target path.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Length of the stored target string in characters.
    pub fn size(&self) -> u64 {
        self.target.chars().count() as u64
    }
}
