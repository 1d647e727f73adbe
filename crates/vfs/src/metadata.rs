//! Metadata projection of inodes.

use serde::{Deserialize, Serialize};

use crate::inode::{INode, INodeId, INodeType};

/// What `stat`/`lstat` report about a filesystem object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Inode ID (stable for the object's lifetime).
    pub ino: INodeId,
    /// Object kind.
    pub kind: INodeType,
    /// Content length for files, 0 for directories, target length for symlinks.
    pub size: u64,
    /// Number of directory entries referencing the inode.
    pub nlink: u32,
    /// Symlink target, only for symlinks.
    pub target: Option<String>,
}

impl Metadata {
    /// Project an inode.
    pub fn from_inode(inode: &INode) -> Self {
        Self {
            ino: inode.id(),
            kind: inode.inode_type(),
            size: inode.size(),
            nlink: inode.nlink(),
            target: inode.symlink_target().map(str::to_string),
        }
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == INodeType::File
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == INodeType::Directory
    }

    /// Check if this is a symlink.
    pub fn is_symlink(&self) -> bool {
        self.kind == INodeType::Symlink
    }
}
