//! Error types for the VFS crate.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inode::INodeId;

/// Stable, matchable error code carried by every [`VfsError`].
///
/// Callers should branch on the code rather than on the rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// A path segment does not exist.
    NotFound,
    /// A directory was required but something else was found.
    NotADirectory,
    /// `readlink` on something that is not a symlink.
    NotASymlink,
    /// The symlink expansion bound was exceeded.
    SymlinkLoop,
    /// The name already exists in the target directory.
    AlreadyExists,
    /// A file operation was attempted on a directory.
    IsADirectory,
    /// The directory still has entries.
    DirectoryNotEmpty,
    /// The path or name is malformed for the requested operation.
    InvalidPath,
    /// The root directory cannot be removed or moved.
    Busy,
    /// The operation was cancelled cooperatively.
    Cancelled,
    /// A file cannot grow to the requested length.
    FileTooLarge,
    /// An aggregated size does not fit in 64 bits.
    Overflow,
}

impl ErrorCode {
    /// Stable name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NotFound",
            ErrorCode::NotADirectory => "NotADirectory",
            ErrorCode::NotASymlink => "NotASymlink",
            ErrorCode::SymlinkLoop => "SymlinkLoop",
            ErrorCode::AlreadyExists => "AlreadyExists",
            ErrorCode::IsADirectory => "IsADirectory",
            ErrorCode::DirectoryNotEmpty => "DirectoryNotEmpty",
            ErrorCode::InvalidPath => "InvalidPath",
            ErrorCode::Busy => "Busy",
            ErrorCode::Cancelled => "Cancelled",
            ErrorCode::FileTooLarge => "FileTooLarge",
            ErrorCode::Overflow => "Overflow",
        }
    }

    /// Historical POSIX errno name for the code (e.g. `ENOENT`).
    pub fn errno(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "ENOENT",
            ErrorCode::NotADirectory => "ENOTDIR",
            ErrorCode::NotASymlink => "EINVAL",
            ErrorCode::SymlinkLoop => "ELOOP",
            ErrorCode::AlreadyExists => "EEXIST",
            ErrorCode::IsADirectory => "EISDIR",
            ErrorCode::DirectoryNotEmpty => "ENOTEMPTY",
            ErrorCode::InvalidPath => "EINVAL",
            ErrorCode::Busy => "EBUSY",
            ErrorCode::Cancelled => "ECANCELED",
            ErrorCode::FileTooLarge => "EFBIG",
            ErrorCode::Overflow => "EOVERFLOW",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during VFS operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    /// Path segment absent.
    #[error("No such file or directory: {path}")]
    NotFound {
        /// The path being resolved.
        path: String,
    },

    /// Expected a directory.
    #[error("Not a directory: {path}")]
    NotADirectory {
        /// The path being resolved.
        path: String,
    },

    /// `readlink` target is not a symlink.
    #[error("Not a symbolic link: {path}")]
    NotASymlink {
        /// The path passed to readlink.
        path: String,
    },

    /// Too many symlink expansions while resolving a path.
    #[error("Too many levels of symbolic links resolving {path} (limit {limit})")]
    SymlinkLoop {
        /// The path being resolved.
        path: String,
        /// The expansion bound that was exceeded.
        limit: usize,
    },

    /// A followed symlink leads back into a directory already being walked.
    #[error("Symbolic link cycle through directory: {path}")]
    SymlinkCycle {
        /// The path where the cycle was detected.
        path: String,
    },

    /// Duplicate name on insert.
    #[error("File exists: {path}")]
    AlreadyExists {
        /// The path (or name) that already exists.
        path: String,
    },

    /// File operation on a directory.
    #[error("Is a directory: {path}")]
    IsADirectory {
        /// The offending path.
        path: String,
    },

    /// Directory still has entries.
    #[error("Directory not empty: {path}")]
    DirectoryNotEmpty {
        /// The directory path.
        path: String,
    },

    /// Malformed path or name.
    #[error("Invalid path {path}: {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The root cannot be removed or moved.
    #[error("Resource busy: {path}")]
    Busy {
        /// The offending path.
        path: String,
    },

    /// Requested file length cannot be held in memory.
    #[error("File too large: {path} ({len} bytes requested)")]
    FileTooLarge {
        /// The file path.
        path: String,
        /// The requested length.
        len: u64,
    },

    /// A size sum exceeded `u64::MAX`.
    #[error("Value too large: size of {path} overflows")]
    Overflow {
        /// The path whose aggregate overflowed.
        path: String,
    },

    /// Inode id no longer present in the arena.
    #[error("Inode not found: {0}")]
    InodeNotFound(INodeId),

    /// Inode is not a directory.
    #[error("Inode is not a directory: {0}")]
    InodeNotADirectory(INodeId),

    /// Traversal cancelled between steps.
    #[error("Operation cancelled")]
    Cancelled,
}

impl VfsError {
    /// Create a `NotFound` error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a `NotADirectory` error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory { path: path.into() }
    }

    /// Create an `AlreadyExists` error.
    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }

    /// Create an `IsADirectory` error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory { path: path.into() }
    }

    /// Create an `InvalidPath` error.
    ///
    /// # Arguments
    /// * `path` - The rejected path
    /// * `reason` - Human readable reason
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// The matchable code for this error.
    ///
    /// Inode-level variants map onto the path-level code they correspond to.
    pub fn code(&self) -> ErrorCode {
        match self {
            VfsError::NotFound { .. } | VfsError::InodeNotFound(_) => ErrorCode::NotFound,
            VfsError::NotADirectory { .. } | VfsError::InodeNotADirectory(_) => {
                ErrorCode::NotADirectory
            }
            VfsError::NotASymlink { .. } => ErrorCode::NotASymlink,
            VfsError::SymlinkLoop { .. } | VfsError::SymlinkCycle { .. } => {
                ErrorCode::SymlinkLoop
            }
            VfsError::AlreadyExists { .. } => ErrorCode::AlreadyExists,
            VfsError::IsADirectory { .. } => ErrorCode::IsADirectory,
            VfsError::DirectoryNotEmpty { .. } => ErrorCode::DirectoryNotEmpty,
            VfsError::InvalidPath { .. } => ErrorCode::InvalidPath,
            VfsError::Busy { .. } => ErrorCode::Busy,
            VfsError::Cancelled => ErrorCode::Cancelled,
            VfsError::FileTooLarge { .. } => ErrorCode::FileTooLarge,
            VfsError::Overflow { .. } => ErrorCode::Overflow,
        }
    }

    /// Check if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.code() == ErrorCode::NotFound
    }

    /// Attach a path to an inode-level error raised by the namespace.
    ///
    /// Path-level errors are returned unchanged.
    pub(crate) fn at_path(self, path: &str) -> Self {
        match self {
            VfsError::InodeNotFound(_) => VfsError::not_found(path),
            VfsError::InodeNotADirectory(_) => VfsError::not_a_directory(path),
            VfsError::AlreadyExists { .. } => VfsError::already_exists(path),
            VfsError::DirectoryNotEmpty { .. } => VfsError::DirectoryNotEmpty {
                path: path.to_string(),
            },
            other => other,
        }
    }
}
