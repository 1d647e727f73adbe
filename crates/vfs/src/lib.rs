//! In-process virtual filesystem with POSIX-like semantics.
//!
//! This crate provides a hierarchical namespace of files, directories and
//! symbolic links held entirely in memory, with path resolution that expands
//! symlinks (bounded, so cycles fail with `SymlinkLoop` instead of looping).
//!
//! # Architecture
//!
//! ```text
//! Layer 3: Filesystem (consistency controller, async API, Snapshot)
//! Layer 2: Primitives (stat, lstat, readdir, readlink) via Resolver
//! Layer 1: Namespace (inode arena + ordered directory entries)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use rusty_memfs_vfs::Filesystem;
//!
//! let fs = Filesystem::new();
//! fs.mkdir("/d1").await?;
//! fs.write_file("/d1/f1", "things alongside stuff").await?;
//! fs.symlink("/d1/f1", "/link").await?;
//! assert_eq!(fs.stat("/link").await?.size, 22);
//! assert_eq!(fs.lstat("/link").await?.size, 6);
//! ```

pub mod error;
pub mod filesystem;
pub mod inode;
pub mod metadata;
pub mod options;
pub mod path;
pub mod primitives;
pub mod resolver;

pub use error::{ErrorCode, VfsError};
pub use filesystem::{Filesystem, Snapshot};
pub use inode::{INode, INodeId, INodeType, Namespace, ROOT_INODE};
pub use metadata::Metadata;
pub use options::VfsOptions;
pub use primitives::{FsPrimitives, View};
pub use resolver::{ResolveMode, Resolved, Resolver, DEFAULT_MAX_SYMLINK_EXPANSIONS};
