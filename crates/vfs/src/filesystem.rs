//! The filesystem handle: consistency controller over the namespace.
//!
//! # Consistency model
//!
//! The namespace sits behind one fair `tokio::sync::RwLock`. Every mutation
//! resolves its paths and applies all of its changes while holding the write
//! guard, so mutations are totally ordered in admission order and no reader
//! can observe a half-applied change. A mutation's future completes only
//! after the guard is released, so any read issued afterwards sees it.
//!
//! Reads take the read guard for one primitive at a time. Callers that need
//! several reads to agree (for example a recursive traversal) take a
//! [`Snapshot`], which holds the read guard until dropped.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OwnedRwLockReadGuard, RwLock};
use tracing::debug;

use crate::inode::{INodeData, INodeDir, INodeFile, INodeId, INodeSymlink, INodeType, Namespace};
use crate::metadata::Metadata;
use crate::options::VfsOptions;
use crate::path::{join_path, names_root, split_path, validate_path};
use crate::primitives::{FsPrimitives, View};
use crate::resolver::{ResolveMode, Resolved, Resolver};
use crate::VfsError;

/// Shared handle to one in-process filesystem.
///
/// Cloning is cheap; clones operate on the same namespace.
#[derive(Debug, Clone)]
pub struct Filesystem {
    /// The single shared mutable resource.
    namespace: Arc<RwLock<Namespace>>,
    /// Configuration.
    options: VfsOptions,
}

impl Filesystem {
    /// Create an empty filesystem (root directory only) with default options.
    pub fn new() -> Self {
        Self::with_options(VfsOptions::default())
    }

    /// Create an empty filesystem with the given options.
    pub fn with_options(options: VfsOptions) -> Self {
        Self {
            namespace: Arc::new(RwLock::new(Namespace::new())),
            options,
        }
    }

    /// Get the configuration.
    pub fn options(&self) -> &VfsOptions {
        &self.options
    }

    /// Take a consistent read-only view of the whole namespace.
    ///
    /// Mutations issued while the snapshot is alive wait until it is dropped.
    pub async fn snapshot(&self) -> Snapshot {
        Snapshot {
            guard: self.namespace.clone().read_owned().await,
            max_expansions: self.options.max_symlink_expansions,
        }
    }

    async fn read<T>(&self, f: impl FnOnce(View<'_>) -> Result<T, VfsError>) -> Result<T, VfsError> {
        let ns = self.namespace.read().await;
        f(View::new(&ns, self.options.max_symlink_expansions))
    }

    async fn mutate<T>(
        &self,
        op: &'static str,
        path: &str,
        f: impl FnOnce(&mut Namespace, usize) -> Result<T, VfsError>,
    ) -> Result<T, VfsError> {
        let mut ns = self.namespace.write().await;
        let result: Result<T, VfsError> = f(&mut ns, self.options.max_symlink_expansions);
        match &result {
            Ok(_) => debug!(op, path, "applied mutation"),
            Err(e) => debug!(op, path, error = %e, "rejected mutation"),
        }
        result
    }

    /// Metadata of `path`, following symlinks.
    pub async fn stat(&self, path: &str) -> Result<Metadata, VfsError> {
        self.read(|view: View<'_>| view.stat(path)).await
    }

    /// Metadata of `path`, not following a final symlink.
    pub async fn lstat(&self, path: &str) -> Result<Metadata, VfsError> {
        self.read(|view: View<'_>| view.lstat(path)).await
    }

    /// Entry names of a directory in listing (insertion) order.
    pub async fn readdir(&self, path: &str) -> Result<Vec<String>, VfsError> {
        self.read(|view: View<'_>| view.readdir(path)).await
    }

    /// Target string of a symlink.
    pub async fn readlink(&self, path: &str) -> Result<String, VfsError> {
        self.read(|view: View<'_>| view.readlink(path)).await
    }

    /// Whole content of a file.
    pub async fn read_file(&self, path: &str) -> Result<Vec<u8>, VfsError> {
        self.read(|view: View<'_>| view.read_file(path)).await
    }

    /// Check whether `path` resolves (following symlinks).
    pub async fn exists(&self, path: &str) -> bool {
        self.read(|view: View<'_>| Ok(view.exists(path)))
            .await
            .unwrap_or(false)
    }

    /// Create or replace a file's content.
    ///
    /// A final symlink is followed; the parent directory must exist.
    ///
    /// # Errors
    /// `IsADirectory` if the path names a directory, `NotFound` if the parent
    /// (or a symlink's target) is missing.
    pub async fn write_file(&self, path: &str, data: impl Into<Vec<u8>>) -> Result<(), VfsError> {
        let data: Vec<u8> = data.into();
        self.mutate("write_file", path, |ns: &mut Namespace, max: usize| {
            put_file(ns, max, path, data, false).map(|_| ())
        })
        .await
    }

    /// Append to a file, creating it when missing.
    pub async fn append_file(&self, path: &str, data: impl Into<Vec<u8>>) -> Result<(), VfsError> {
        let data: Vec<u8> = data.into();
        self.mutate("append_file", path, |ns: &mut Namespace, max: usize| {
            put_file(ns, max, path, data, true).map(|_| ())
        })
        .await
    }

    /// Truncate or zero-extend an existing file.
    ///
    /// # Errors
    /// `IsADirectory` for directories, `FileTooLarge` when the content cannot
    /// grow to `len` (the file is left unchanged).
    pub async fn truncate(&self, path: &str, len: u64) -> Result<(), VfsError> {
        self.mutate("truncate", path, |ns: &mut Namespace, max: usize| {
            let too_large = || VfsError::FileTooLarge {
                path: path.to_string(),
                len,
            };
            let target: usize = usize::try_from(len).map_err(|_| too_large())?;
            let resolved: Resolved = Resolver::new(ns, max).resolve(path, ResolveMode::Deep)?;
            ns.get_mut(resolved.id)?
                .as_file_mut()
                .ok_or_else(|| VfsError::is_a_directory(path))?
                .truncate(target)
                .map_err(|_| too_large())
        })
        .await
    }

    /// Refresh a file's modification time, creating it empty when missing.
    ///
    /// Runs as one mutation. A dangling symlink gets its target created, as
    /// with `open(O_CREAT)`. Directories are left alone.
    ///
    /// # Arguments
    /// * `path` - File to touch
    /// * `create` - Create the file when it does not exist
    ///
    /// # Errors
    /// `NotFound` when `create` is set and the parent directory is missing,
    /// `SymlinkLoop` when a chain of dangling links exceeds the bound.
    pub async fn touch(&self, path: &str, create: bool) -> Result<(), VfsError> {
        self.mutate("touch", path, |ns: &mut Namespace, max: usize| {
            let mut current: String = path.to_string();
            for _ in 0..=max {
                let found: Result<Resolved, VfsError> =
                    Resolver::new(ns, max).resolve(&current, ResolveMode::Deep);
                match found {
                    Ok(resolved) => {
                        if let Some(file) = ns.get_mut(resolved.id)?.as_file_mut() {
                            file.touch();
                        }
                        return Ok(());
                    }
                    Err(e) if !e.is_not_found() => return Err(e),
                    Err(_) if !create => return Ok(()),
                    Err(_) => {}
                }

                let (parent, name) = Resolver::new(ns, max).resolve_parent(&current)?;
                let link: INodeId = match ns.lookup(parent, &name) {
                    Ok(id) => id,
                    Err(_) => {
                        ns.insert(parent, &name, INodeData::File(INodeFile::default()))
                            .map_err(|e: VfsError| e.at_path(path))?;
                        return Ok(());
                    }
                };
                // The entry exists but does not resolve: a dangling link.
                let target: String = ns
                    .get(link)?
                    .symlink_target()
                    .map(str::to_string)
                    .ok_or_else(|| VfsError::not_found(path))?;
                current = if target.starts_with('/') {
                    target
                } else {
                    join_path(split_path(&current).0, &target)
                };
            }
            Err(VfsError::SymlinkLoop {
                path: path.to_string(),
                limit: max,
            })
        })
        .await
    }

    /// Create a directory. The parent must exist.
    ///
    /// # Errors
    /// `AlreadyExists` if the name is taken (including by a dangling symlink).
    pub async fn mkdir(&self, path: &str) -> Result<(), VfsError> {
        self.mutate("mkdir", path, |ns: &mut Namespace, max: usize| {
            if is_root(path)? {
                return Err(VfsError::already_exists(path));
            }
            let (parent, name) = Resolver::new(ns, max).resolve_parent(path)?;
            ns.insert(parent, &name, INodeData::Directory(INodeDir::new(parent)))
                .map_err(|e: VfsError| e.at_path(path))?;
            Ok(())
        })
        .await
    }

    /// Create a symlink at `path` pointing to `target`.
    ///
    /// The target is stored verbatim and need not exist.
    pub async fn symlink(&self, target: &str, path: &str) -> Result<(), VfsError> {
        self.mutate("symlink", path, |ns: &mut Namespace, max: usize| {
            if target.is_empty() {
                return Err(VfsError::invalid_path(target, "empty symlink target"));
            }
            if is_root(path)? {
                return Err(VfsError::already_exists(path));
            }
            let (parent, name) = Resolver::new(ns, max).resolve_parent(path)?;
            ns.insert(
                parent,
                &name,
                INodeData::Symlink(INodeSymlink::new(target.to_string())),
            )
            .map_err(|e: VfsError| e.at_path(path))?;
            Ok(())
        })
        .await
    }

    /// Add a hard link `new_path` to the file or symlink at `existing`.
    ///
    /// # Errors
    /// `IsADirectory` when `existing` is a directory.
    pub async fn link(&self, existing: &str, new_path: &str) -> Result<(), VfsError> {
        self.mutate("link", new_path, |ns: &mut Namespace, max: usize| {
            let resolver: Resolver<'_> = Resolver::new(ns, max);
            let source: Resolved = resolver.resolve(existing, ResolveMode::Shallow)?;
            if ns.get(source.id)?.inode_type() == INodeType::Directory {
                return Err(VfsError::is_a_directory(existing));
            }
            if is_root(new_path)? {
                return Err(VfsError::already_exists(new_path));
            }
            let (parent, name) = resolver.resolve_parent(new_path)?;
            ns.link(parent, &name, source.id)
                .map_err(|e: VfsError| e.at_path(new_path))
        })
        .await
    }

    /// Remove a file or symlink entry.
    ///
    /// # Errors
    /// `IsADirectory` for directories (use [`Filesystem::rmdir`]).
    pub async fn unlink(&self, path: &str) -> Result<(), VfsError> {
        self.mutate("unlink", path, |ns: &mut Namespace, max: usize| {
            let (parent, name, id) = locate_entry(ns, max, path)?;
            if ns.get(id)?.inode_type() == INodeType::Directory {
                return Err(VfsError::is_a_directory(path));
            }
            ns.remove(parent, &name).map_err(|e: VfsError| e.at_path(path))?;
            Ok(())
        })
        .await
    }

    /// Remove an empty directory.
    ///
    /// # Errors
    /// `NotADirectory` if the entry is not a directory (a symlink to one
    /// included), `DirectoryNotEmpty` if it has entries.
    pub async fn rmdir(&self, path: &str) -> Result<(), VfsError> {
        self.mutate("rmdir", path, |ns: &mut Namespace, max: usize| {
            let (parent, name, id) = locate_entry(ns, max, path)?;
            let empty: bool = ns
                .dir(id)
                .map_err(|e: VfsError| e.at_path(path))?
                .is_empty();
            if !empty {
                return Err(VfsError::DirectoryNotEmpty {
                    path: path.to_string(),
                });
            }
            ns.remove(parent, &name).map_err(|e: VfsError| e.at_path(path))?;
            Ok(())
        })
        .await
    }

    /// Remove an entry and, for a directory, everything beneath it, in one
    /// mutation.
    ///
    /// A final symlink is removed itself, never its target.
    pub async fn remove_recursive(&self, path: &str) -> Result<(), VfsError> {
        self.mutate("remove_recursive", path, |ns: &mut Namespace, max: usize| {
            let (parent, name, _) = locate_entry(ns, max, path)?;
            ns.remove(parent, &name).map_err(|e: VfsError| e.at_path(path))?;
            Ok(())
        })
        .await
    }

    /// Atomically move the entry at `old_path` to `new_path`.
    ///
    /// An existing destination is replaced when the kinds are compatible
    /// (file over file, directory over empty directory).
    ///
    /// # Errors
    /// - `InvalidPath` when moving a directory beneath itself
    /// - `IsADirectory` / `NotADirectory` on incompatible kinds
    /// - `DirectoryNotEmpty` when the destination directory has entries
    pub async fn rename(&self, old_path: &str, new_path: &str) -> Result<(), VfsError> {
        self.mutate("rename", old_path, |ns: &mut Namespace, max: usize| {
            let (old_parent, old_name, id) = locate_entry(ns, max, old_path)?;
            if is_root(new_path)? {
                return Err(VfsError::Busy {
                    path: new_path.to_string(),
                });
            }
            let (new_parent, new_name) = Resolver::new(ns, max).resolve_parent(new_path)?;
            if old_parent == new_parent && old_name == new_name {
                return Ok(());
            }

            let source_is_dir: bool = ns.get(id)?.inode_type() == INodeType::Directory;
            if source_is_dir && ns.is_ancestor(id, new_parent) {
                return Err(VfsError::invalid_path(
                    new_path,
                    "cannot move a directory beneath itself",
                ));
            }

            if let Ok(existing) = ns.lookup(new_parent, &new_name) {
                if existing == id {
                    return Ok(());
                }
                match (source_is_dir, ns.dir(existing).ok()) {
                    (true, None) => return Err(VfsError::not_a_directory(new_path)),
                    (false, Some(_)) => return Err(VfsError::is_a_directory(new_path)),
                    (true, Some(dir)) if !dir.is_empty() => {
                        return Err(VfsError::DirectoryNotEmpty {
                            path: new_path.to_string(),
                        })
                    }
                    _ => {}
                }
                ns.remove(new_parent, &new_name)?;
            }

            ns.move_entry(old_parent, &old_name, new_parent, &new_name)
                .map_err(|e: VfsError| e.at_path(new_path))?;
            Ok(())
        })
        .await
    }

    /// Number of live inodes, root included.
    pub async fn inode_count(&self) -> usize {
        self.namespace.read().await.inode_count()
    }
}

impl Default for Filesystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FsPrimitives for Filesystem {
    async fn stat(&self, path: &str) -> Result<Metadata, VfsError> {
        Filesystem::stat(self, path).await
    }

    async fn lstat(&self, path: &str) -> Result<Metadata, VfsError> {
        Filesystem::lstat(self, path).await
    }

    async fn readdir(&self, path: &str) -> Result<Vec<String>, VfsError> {
        Filesystem::readdir(self, path).await
    }

    async fn readlink(&self, path: &str) -> Result<String, VfsError> {
        Filesystem::readlink(self, path).await
    }
}

/// A consistent, read-only view of the namespace.
///
/// Holds the read guard; writers queue behind it until it is dropped, other
/// readers are unaffected.
#[derive(Debug)]
pub struct Snapshot {
    guard: OwnedRwLockReadGuard<Namespace>,
    max_expansions: usize,
}

impl Snapshot {
    /// Synchronous primitives over the snapshot.
    pub fn view(&self) -> View<'_> {
        View::new(&self.guard, self.max_expansions)
    }

    /// The underlying namespace state.
    pub fn namespace(&self) -> &Namespace {
        &self.guard
    }
}

#[async_trait]
impl FsPrimitives for Snapshot {
    async fn stat(&self, path: &str) -> Result<Metadata, VfsError> {
        self.view().stat(path)
    }

    async fn lstat(&self, path: &str) -> Result<Metadata, VfsError> {
        self.view().lstat(path)
    }

    async fn readdir(&self, path: &str) -> Result<Vec<String>, VfsError> {
        self.view().readdir(path)
    }

    async fn readlink(&self, path: &str) -> Result<String, VfsError> {
        self.view().readlink(path)
    }
}

fn is_root(path: &str) -> Result<bool, VfsError> {
    validate_path(path)?;
    Ok(names_root(path))
}

/// Find the entry named by `path` without following a final symlink.
///
/// # Returns
/// (parent directory, entry name, inode).
///
/// # Errors
/// `Busy` for the root, `NotFound` when the entry is missing.
fn locate_entry(
    ns: &Namespace,
    max: usize,
    path: &str,
) -> Result<(INodeId, String, INodeId), VfsError> {
    if is_root(path)? {
        return Err(VfsError::Busy {
            path: path.to_string(),
        });
    }
    let (parent, name) = Resolver::new(ns, max).resolve_parent(path)?;
    let id: INodeId = ns
        .lookup(parent, &name)
        .map_err(|_| VfsError::not_found(path))?;
    Ok((parent, name, id))
}

/// Write (or append) `data` to the file named by `path`, creating it when
/// the final entry is missing.
fn put_file(
    ns: &mut Namespace,
    max: usize,
    path: &str,
    data: Vec<u8>,
    append: bool,
) -> Result<INodeId, VfsError> {
    if is_root(path)? {
        return Err(VfsError::is_a_directory(path));
    }

    let resolver: Resolver<'_> = Resolver::new(ns, max);
    let (parent, name) = resolver.resolve_parent(path)?;
    let existing: Option<INodeId> = match ns.lookup(parent, &name) {
        Ok(id) if ns.get(id)?.inode_type() == INodeType::Symlink => {
            Some(resolver.resolve(path, ResolveMode::Deep)?.id)
        }
        Ok(id) => Some(id),
        Err(_) => None,
    };

    match existing {
        Some(id) => {
            let file: &mut INodeFile = ns
                .get_mut(id)?
                .as_file_mut()
                .ok_or_else(|| VfsError::is_a_directory(path))?;
            if append {
                file.append(&data);
            } else {
                file.set_content(data);
            }
            Ok(id)
        }
        None => ns
            .insert(parent, &name, INodeData::File(INodeFile::new(data)))
            .map_err(|e: VfsError| e.at_path(path)),
    }
}
