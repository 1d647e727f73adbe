//! Directory listings.

use futures::future::{BoxFuture, FutureExt};
use rusty_memfs_vfs::path::join_path;
use rusty_memfs_vfs::{FsPrimitives, INodeType, Metadata, VfsError};
use serde::Serialize;

/// One listed directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LsEntry {
    /// Entry name within its directory.
    pub name: String,
    /// Kind of the entry itself (symlinks are not followed).
    pub kind: INodeType,
    /// `lstat` size of the entry.
    pub size: u64,
    /// Nested listing, only for directories in a recursive listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<LsEntry>>,
}

/// List the directory at `path` in listing order.
///
/// Symlinked directories are reported as symlinks and never descended into.
///
/// # Arguments
/// * `fs` - Primitives to read through
/// * `path` - Directory to list (a symlink to a directory is followed)
/// * `recursive` - Fill `contents` for every nested directory
///
/// # Errors
/// `NotADirectory` if `path` is not a directory, or any primitive failure.
pub fn list_dir<P>(
    fs: &P,
    path: String,
    recursive: bool,
) -> BoxFuture<'_, Result<Vec<LsEntry>, VfsError>>
where
    P: FsPrimitives + ?Sized,
{
    async move {
        let names: Vec<String> = fs.readdir(&path).await?;
        let mut entries: Vec<LsEntry> = Vec::with_capacity(names.len());

        for name in names {
            let child: String = join_path(&path, &name);
            let meta: Metadata = fs.lstat(&child).await?;
            let contents: Option<Vec<LsEntry>> = if recursive && meta.is_dir() {
                Some(list_dir(fs, child, true).await?)
            } else {
                None
            };
            entries.push(LsEntry {
                name,
                kind: meta.kind,
                size: meta.size,
                contents,
            });
        }

        Ok(entries)
    }
    .boxed()
}
