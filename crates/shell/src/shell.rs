//! Shell-style utilities over a [`Filesystem`].

use rusty_memfs_vfs::path::{join_path, resolve_against, validate_path};
use rusty_memfs_vfs::{ErrorCode, Filesystem, Metadata, Snapshot, VfsError};
use tracing::debug;

use crate::du::{compute_usage, DuOptions, UsageReport};
use crate::ls::{list_dir, LsEntry};

/// A working directory bound to a filesystem handle.
///
/// Every path argument may be absolute or relative to the working
/// directory. Shells are cheap to clone and clones share the filesystem
/// but not the working directory.
#[derive(Debug, Clone)]
pub struct Shell {
    fs: Filesystem,
    cwd: String,
}

impl Shell {
    /// Create a shell rooted at `/`.
    pub fn new(fs: Filesystem) -> Self {
        Self {
            fs,
            cwd: String::from("/"),
        }
    }

    /// The underlying filesystem handle.
    pub fn filesystem(&self) -> &Filesystem {
        &self.fs
    }

    /// Current working directory.
    pub fn pwd(&self) -> &str {
        &self.cwd
    }

    /// Absolute, normalized form of `path`.
    ///
    /// # Errors
    /// `InvalidPath` for an empty path or one containing NUL.
    pub fn resolve(&self, path: &str) -> Result<String, VfsError> {
        validate_path(path)?;
        Ok(resolve_against(&self.cwd, path))
    }

    /// Change the working directory.
    ///
    /// # Errors
    /// `NotADirectory` if `path` resolves to something other than a directory.
    pub async fn cd(&mut self, path: &str) -> Result<(), VfsError> {
        let target: String = self.resolve(path)?;
        let meta: Metadata = self.fs.stat(&target).await?;
        if !meta.is_dir() {
            return Err(VfsError::not_a_directory(target));
        }
        debug!(from = %self.cwd, to = %target, "cd");
        self.cwd = target;
        Ok(())
    }

    /// List a directory.
    ///
    /// # Arguments
    /// * `path` - Directory to list
    /// * `recursive` - Include nested directory contents
    pub async fn ls(&self, path: &str, recursive: bool) -> Result<Vec<LsEntry>, VfsError> {
        let dir: String = self.resolve(path)?;
        let snapshot: Snapshot = self.fs.snapshot().await;
        list_dir(&snapshot, dir, recursive).await
    }

    /// Concatenate the contents of several files, separated by newlines.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    /// `InvalidPath` when `paths` is empty, otherwise the first read failure.
    pub async fn cat(&self, paths: &[&str]) -> Result<String, VfsError> {
        if paths.is_empty() {
            return Err(VfsError::invalid_path("", "missing file argument"));
        }

        let mut absolute: Vec<String> = Vec::with_capacity(paths.len());
        for path in paths {
            absolute.push(self.resolve(path)?);
        }

        let snapshot: Snapshot = self.fs.snapshot().await;
        let mut parts: Vec<String> = Vec::with_capacity(absolute.len());
        for path in &absolute {
            let data: Vec<u8> = snapshot.view().read_file(path)?;
            parts.push(String::from_utf8_lossy(&data).into_owned());
        }
        Ok(parts.join("\n"))
    }

    /// Create an empty file, or refresh an existing one's modification time.
    ///
    /// Existing content is never changed and directories are left alone.
    /// Touching a dangling symlink creates its target.
    ///
    /// # Arguments
    /// * `path` - File to touch
    /// * `update_only` - Do not create the file when it is missing
    pub async fn touch(&self, path: &str, update_only: bool) -> Result<(), VfsError> {
        let file: String = self.resolve(path)?;
        self.fs.touch(&file, !update_only).await
    }

    /// Create a directory and every missing ancestor.
    ///
    /// Existing directories (or symlinks to directories) along the way are
    /// fine.
    ///
    /// # Errors
    /// `NotADirectory` if some component exists and is not a directory.
    pub async fn mkdirp(&self, path: &str) -> Result<(), VfsError> {
        let dir: String = self.resolve(path)?;
        let mut current: String = String::from("/");

        for component in dir.split('/').filter(|c: &&str| !c.is_empty()) {
            current = join_path(&current, component);
            match self.fs.stat(&current).await {
                Ok(meta) if meta.is_dir() => continue,
                Ok(_) => return Err(VfsError::not_a_directory(current)),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
            match self.fs.mkdir(&current).await {
                Ok(()) => {}
                // Lost a race with another creator; fine if it made a directory.
                Err(e) if e.code() == ErrorCode::AlreadyExists => {
                    if !self.fs.stat(&current).await?.is_dir() {
                        return Err(VfsError::not_a_directory(current));
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Remove a file, symlink or directory.
    ///
    /// # Arguments
    /// * `path` - Entry to remove (a final symlink is removed, not its target)
    /// * `recursive` - Allow removing a non-empty directory with its contents
    ///
    /// # Errors
    /// `DirectoryNotEmpty` for a non-empty directory without `recursive`,
    /// `Busy` for the root.
    pub async fn rm(&self, path: &str, recursive: bool) -> Result<(), VfsError> {
        let entry: String = self.resolve(path)?;
        if recursive {
            return self.fs.remove_recursive(&entry).await;
        }
        let meta: Metadata = self.fs.lstat(&entry).await?;
        if meta.is_dir() {
            self.fs.rmdir(&entry).await
        } else {
            self.fs.unlink(&entry).await
        }
    }

    /// Disk usage of `path` over one consistent snapshot.
    ///
    /// Entry paths are absolute and normalized.
    pub async fn du(&self, path: &str, options: &DuOptions) -> Result<UsageReport, VfsError> {
        let start: String = self.resolve(path)?;
        let snapshot: Snapshot = self.fs.snapshot().await;
        compute_usage(&snapshot, &start, options).await
    }
}
