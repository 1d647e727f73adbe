//! Read primitives: `stat`, `lstat`, `readdir`, `readlink`.
//!
//! [`FsPrimitives`] is the narrow contract consumers such as the disk-usage
//! engine depend on. [`View`] implements the primitives synchronously over
//! one borrowed namespace state; the async implementations wrap it.

use async_trait::async_trait;

use crate::inode::{INodeData, INodeDir, Namespace};
use crate::metadata::Metadata;
use crate::resolver::{ResolveMode, Resolved, Resolver};
use crate::VfsError;

/// Read-only filesystem contract.
///
/// Every call either succeeds or reports a [`VfsError`] whose
/// [`code`](VfsError::code) callers can match on.
#[async_trait]
pub trait FsPrimitives: Send + Sync {
    /// Metadata of the object at `path`, following a final symlink.
    async fn stat(&self, path: &str) -> Result<Metadata, VfsError>;

    /// Metadata of the object at `path` without following a final symlink.
    async fn lstat(&self, path: &str) -> Result<Metadata, VfsError>;

    /// Entry names of the directory at `path`, in listing order.
    async fn readdir(&self, path: &str) -> Result<Vec<String>, VfsError>;

    /// Target string of the symlink at `path`.
    async fn readlink(&self, path: &str) -> Result<String, VfsError>;
}

/// Synchronous primitives over one namespace state.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    resolver: Resolver<'a>,
}

impl<'a> View<'a> {
    /// Create a view.
    ///
    /// # Arguments
    /// * `ns` - Namespace state
    /// * `max_expansions` - Symlink expansion bound for every resolution
    pub fn new(ns: &'a Namespace, max_expansions: usize) -> Self {
        Self {
            resolver: Resolver::new(ns, max_expansions),
        }
    }

    /// The resolver backing this view.
    pub fn resolver(&self) -> &Resolver<'a> {
        &self.resolver
    }

    fn metadata(&self, path: &str, mode: ResolveMode) -> Result<Metadata, VfsError> {
        let resolved: Resolved = self.resolver.resolve(path, mode)?;
        let ns: &Namespace = self.resolver.namespace();
        Ok(Metadata::from_inode(ns.get(resolved.id)?))
    }

    /// Deep-resolving metadata.
    pub fn stat(&self, path: &str) -> Result<Metadata, VfsError> {
        self.metadata(path, ResolveMode::Deep)
    }

    /// Shallow-resolving metadata.
    pub fn lstat(&self, path: &str) -> Result<Metadata, VfsError> {
        self.metadata(path, ResolveMode::Shallow)
    }

    /// Directory listing in insertion order.
    ///
    /// # Errors
    /// `NotADirectory` if `path` does not resolve to a directory.
    pub fn readdir(&self, path: &str) -> Result<Vec<String>, VfsError> {
        let resolved: Resolved = self.resolver.resolve(path, ResolveMode::Deep)?;
        let ns: &Namespace = self.resolver.namespace();
        let dir: &INodeDir = ns.dir(resolved.id).map_err(|e: VfsError| e.at_path(path))?;
        Ok(dir.names())
    }

    /// Symlink target.
    ///
    /// # Errors
    /// `NotASymlink` if `path` is not a symlink.
    pub fn readlink(&self, path: &str) -> Result<String, VfsError> {
        let resolved: Resolved = self.resolver.resolve(path, ResolveMode::Shallow)?;
        let ns: &Namespace = self.resolver.namespace();
        ns.get(resolved.id)?
            .symlink_target()
            .map(str::to_string)
            .ok_or_else(|| VfsError::NotASymlink {
                path: path.to_string(),
            })
    }

    /// Whole content of the file at `path`.
    ///
    /// # Errors
    /// `IsADirectory` for directories.
    pub fn read_file(&self, path: &str) -> Result<Vec<u8>, VfsError> {
        let resolved: Resolved = self.resolver.resolve(path, ResolveMode::Deep)?;
        let ns: &Namespace = self.resolver.namespace();
        match ns.get(resolved.id)?.data() {
            INodeData::File(file) => Ok(file.content().to_vec()),
            _ => Err(VfsError::is_a_directory(path)),
        }
    }

    /// Check whether `path` resolves (following symlinks).
    pub fn exists(&self, path: &str) -> bool {
        self.stat(path).is_ok()
    }
}
