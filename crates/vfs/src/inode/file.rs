//! File inode implementation.

use std::collections::TryReserveError;
use std::time::SystemTime;

/// File inode payload holding the whole content in memory.
#[derive(Debug, Clone)]
pub struct INodeFile {
    /// File content.
    content: Vec<u8>,
    /// Modification time.
    mtime: SystemTime,
}

impl INodeFile {
    /// Create a new file with the given content.
    ///
    /// # Arguments
    /// * `content` - Initial file bytes
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            mtime: SystemTime::now(),
        }
    }

    /// Get the file content.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Get the file size in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Get the modification time.
    pub fn mtime(&self) -> SystemTime {
        self.mtime
    }

    /// Replace the whole content.
    pub fn set_content(&mut self, content: Vec<u8>) {
        self.content = content;
        self.touch();
    }

    /// Append to the content.
    pub fn append(&mut self, data: &[u8]) {
        self.content.extend_from_slice(data);
        self.touch();
    }

    /// Truncate or zero-extend to `len` bytes.
    ///
    /// # Errors
    /// The allocation error when the content cannot grow to `len`; the
    /// content is left unchanged.
    pub fn truncate(&mut self, len: usize) -> Result<(), TryReserveError> {
        if let Some(additional) = len.checked_sub(self.content.len()) {
            self.content.try_reserve_exact(additional)?;
        }
        self.content.resize(len, 0);
        self.touch();
        Ok(())
    }

    /// Bump the modification time without changing content.
    pub fn touch(&mut self) {
        self.mtime = SystemTime::now();
    }
}

impl Default for INodeFile {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
