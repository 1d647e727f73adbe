//! Core INode types.

use serde::{Deserialize, Serialize};

use super::dir::INodeDir;
use super::file::INodeFile;
use super::symlink::INodeSymlink;

/// Unique identifier for an inode.
pub type INodeId = u64;

/// Root directory inode ID (always 1, matching FUSE convention).
pub const ROOT_INODE: INodeId = 1;

/// Type of inode entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum INodeType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

/// Kind-specific payload of an inode.
#[derive(Debug, Clone)]
pub enum INodeData {
    /// Regular file content.
    File(INodeFile),
    /// Ordered directory entries.
    Directory(INodeDir),
    /// Symlink target string.
    Symlink(INodeSymlink),
}

/// One filesystem object in the namespace arena.
///
/// Inodes never point at each other directly; directories hold child ids and
/// symlinks hold target strings, so the arena is trivially freeable.
#[derive(Debug, Clone)]
pub struct INode {
    /// Inode ID.
    id: INodeId,
    /// Number of directory entries referencing this inode.
    nlink: u32,
    /// Kind-specific data.
    data: INodeData,
}

impl INode {
    /// Create a new inode with a link count of zero.
    ///
    /// The count is raised when the namespace inserts the inode under a name.
    pub fn new(id: INodeId, data: INodeData) -> Self {
        Self { id, nlink: 0, data }
    }

    /// Get the inode ID.
    pub fn id(&self) -> INodeId {
        self.id
    }

    /// Get the link count.
    pub fn nlink(&self) -> u32 {
        self.nlink
    }

    pub(crate) fn link(&mut self) {
        self.nlink += 1;
    }

    /// Drop one link, returning the remaining count.
    pub(crate) fn unlink(&mut self) -> u32 {
        self.nlink = self.nlink.saturating_sub(1);
        self.nlink
    }

    /// Get the inode type.
    pub fn inode_type(&self) -> INodeType {
        match &self.data {
            INodeData::File(_) => INodeType::File,
            INodeData::Directory(_) => INodeType::Directory,
            INodeData::Symlink(_) => INodeType::Symlink,
        }
    }

    /// Size in bytes: content length for files, 0 for directories, target
    /// length for symlinks.
    pub fn size(&self) -> u64 {
        match &self.data {
            INodeData::File(file) => file.size(),
            INodeData::Directory(_) => 0,
            INodeData::Symlink(link) => link.size(),
        }
    }

    /// Get the kind-specific data.
    pub fn data(&self) -> &INodeData {
        &self.data
    }

    /// Borrow as a directory, if it is one.
    pub fn as_dir(&self) -> Option<&INodeDir> {
        match &self.data {
            INodeData::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    pub(crate) fn as_dir_mut(&mut self) -> Option<&mut INodeDir> {
        match &mut self.data {
            INodeData::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    pub(crate) fn as_file_mut(&mut self) -> Option<&mut INodeFile> {
        match &mut self.data {
            INodeData::File(file) => Some(file),
            _ => None,
        }
    }

    /// Symlink target, if this is a symlink.
    pub fn symlink_target(&self) -> Option<&str> {
        match &self.data {
            INodeData::Symlink(link) => Some(link.target()),
            _ => None,
        }
    }
}
