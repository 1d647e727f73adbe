//! INode primitives for the virtual filesystem.
//!
//! This module provides the core data structures for representing files,
//! directories, and symlinks, and the arena that owns them.

mod dir;
mod file;
mod namespace;
mod symlink;
mod types;

pub use dir::INodeDir;
pub use file::INodeFile;
pub use namespace::Namespace;
pub use symlink::INodeSymlink;
pub use types::{INode, INodeData, INodeId, INodeType, ROOT_INODE};
