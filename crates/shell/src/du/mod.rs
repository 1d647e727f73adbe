//! Disk-usage aggregation.
//!
//! [`compute_usage`] walks a tree depth-first over any [`FsPrimitives`]
//! implementation and emits one entry per visited path in post-order:
//! children in listing order, then the directory itself with the sum of its
//! children. Sizes are accumulated as exact byte counts and converted to the
//! requested unit only when the report is built.
//!
//! The walk is all-or-nothing. The first primitive failure (or a
//! cancellation) aborts it and the entries gathered so far are dropped.
//!
//! Run it against a [`Snapshot`](rusty_memfs_vfs::Snapshot) when the tree
//! may be mutated concurrently; a plain `Filesystem` only guarantees each
//! individual primitive call is consistent.

mod options;
mod report;

pub use options::{DuOptions, ParseSizeUnitError, SizeUnit};
pub use report::{UsageEntry, UsageReport};

use futures::future::{BoxFuture, FutureExt};
use rusty_memfs_vfs::path::{join_path, validate_path};
use rusty_memfs_vfs::{FsPrimitives, INodeId, Metadata, VfsError};
use tracing::{debug, trace, warn};

/// Compute the disk usage of `path`.
///
/// # Arguments
/// * `fs` - Primitives to read the tree through
/// * `path` - Starting path; entry paths are built by appending `/name` to it
/// * `options` - Symlink handling, unit and cancellation
///
/// # Returns
/// The full report. `total` equals the starting path's own entry.
///
/// # Errors
/// - The first error reported by `stat`, `lstat` or `readdir` (e.g. `NotFound`
///   for a missing start path or a dangling link while following symlinks)
/// - `SymlinkCycle` if a followed link leads back into a directory being walked
/// - `Overflow` if a directory's aggregate does not fit in a `u64`
/// - `Cancelled` if the token in `options` fires
pub async fn compute_usage<P>(
    fs: &P,
    path: &str,
    options: &DuOptions,
) -> Result<UsageReport, VfsError>
where
    P: FsPrimitives + ?Sized,
{
    validate_path(path)?;

    let mut walk: Walk<'_, P> = Walk {
        fs,
        options,
        sizes: Vec::new(),
        ancestors: Vec::new(),
    };
    let total: u64 = walk.visit(path.to_string()).await?;

    debug!(
        path,
        entries = walk.sizes.len(),
        total_bytes = total,
        "computed disk usage"
    );
    Ok(UsageReport::from_bytes(walk.sizes, total, options.unit))
}

/// Per-call traversal state.
struct Walk<'a, P: ?Sized> {
    fs: &'a P,
    options: &'a DuOptions,
    /// (path, bytes) in emission order.
    sizes: Vec<(String, u64)>,
    /// Directory inodes on the current descent.
    ancestors: Vec<INodeId>,
}

impl<'a, P> Walk<'a, P>
where
    P: FsPrimitives + ?Sized,
{
    /// Visit `path`, emit its subtree, and return the subtree's byte total.
    fn visit(&mut self, path: String) -> BoxFuture<'_, Result<u64, VfsError>> {
        async move {
            if self.options.is_cancelled() {
                warn!(path = %path, "disk usage cancelled");
                return Err(VfsError::Cancelled);
            }

            let mut meta: Metadata = self.fs.lstat(&path).await?;
            if meta.is_symlink() {
                if !self.options.follow_symlinks {
                    trace!(path = %path, size = meta.size, "symlink leaf");
                    self.sizes.push((path, meta.size));
                    return Ok(meta.size);
                }
                meta = self.fs.stat(&path).await?;
                trace!(path = %path, ino = meta.ino, "followed symlink");
            }

            let size: u64 = if meta.is_dir() {
                if self.ancestors.contains(&meta.ino) {
                    return Err(VfsError::SymlinkCycle { path });
                }
                self.ancestors.push(meta.ino);
                let names: Vec<String> = self.fs.readdir(&path).await?;
                let mut sum: u64 = 0;
                for name in names {
                    let child: u64 = self.visit(join_path(&path, &name)).await?;
                    sum = sum
                        .checked_add(child)
                        .ok_or_else(|| VfsError::Overflow { path: path.clone() })?;
                }
                self.ancestors.pop();
                sum
            } else {
                meta.size
            };

            trace!(path = %path, size, "emit");
            self.sizes.push((path, size));
            Ok(size)
        }
        .boxed()
    }
}
