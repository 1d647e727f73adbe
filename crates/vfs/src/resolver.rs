//! Path resolution against the namespace, including symlink expansion.
//!
//! # Algorithm
//!
//! The resolver keeps the chain of directories walked so far and a queue of
//! segments still to walk. When a followed segment turns out to be a
//! symlink, its target's segments are pushed onto the front of the queue
//! (absolute targets also reset the chain to the root), so nested and
//! relative links expand in place without recursion. Every expansion counts
//! against a bound; exceeding it fails with `SymlinkLoop`.

use std::collections::VecDeque;

use tracing::{trace, warn};

use crate::inode::{INodeData, INodeId, Namespace, ROOT_INODE};
use crate::path::{split_path, validate_entry_name, validate_path};
use crate::VfsError;

/// Default bound on symlink expansions during a single resolution.
///
/// Matches the Linux `MAXSYMLINKS` value.
pub const DEFAULT_MAX_SYMLINK_EXPANSIONS: usize = 40;

/// How the final path segment is treated when it is a symlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// `lstat`-style: the final segment may remain a symlink.
    Shallow,
    /// `stat`-style: a final symlink is followed to its ultimate target.
    Deep,
}

/// Outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Inode the path resolved to.
    pub id: INodeId,
    /// Directory holding the entry that produced `id` (root for the root).
    pub parent_id: INodeId,
    /// Entry name within `parent_id` (empty for the root).
    pub name: String,
}

/// Resolves path strings to inodes within one namespace state.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    ns: &'a Namespace,
    max_expansions: usize,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over a namespace.
    ///
    /// # Arguments
    /// * `ns` - Namespace state to resolve against
    /// * `max_expansions` - Symlink expansion bound
    pub fn new(ns: &'a Namespace, max_expansions: usize) -> Self {
        Self { ns, max_expansions }
    }

    /// The namespace this resolver reads.
    pub fn namespace(&self) -> &'a Namespace {
        self.ns
    }

    /// Resolve `path` to an inode.
    ///
    /// Relative paths start at the root.
    ///
    /// # Errors
    /// - `NotFound` if a segment is absent
    /// - `NotADirectory` if a non-final segment is a file
    /// - `SymlinkLoop` if more than `max_expansions` links are expanded
    pub fn resolve(&self, path: &str, mode: ResolveMode) -> Result<Resolved, VfsError> {
        validate_path(path)?;

        // (inode, entry name) for every directory from the root down.
        let mut chain: Vec<(INodeId, String)> = vec![(ROOT_INODE, String::new())];
        let mut pending: VecDeque<String> = path.split('/').map(str::to_string).collect();
        let mut leaf: Option<(INodeId, String)> = None;
        let mut expansions: usize = 0;

        while let Some(segment) = pending.pop_front() {
            match segment.as_str() {
                "" | "." => continue,
                ".." => {
                    if chain.len() > 1 {
                        chain.pop();
                    }
                    continue;
                }
                _ => {}
            }

            let dir_id: INodeId = self.current(&chain);
            let child: INodeId = self
                .ns
                .lookup(dir_id, &segment)
                .map_err(|e: VfsError| match e {
                    VfsError::NotFound { .. } => VfsError::not_found(path),
                    other => other.at_path(path),
                })?;
            let is_last: bool = pending.is_empty();

            match self.ns.get(child)?.data() {
                INodeData::Directory(_) => chain.push((child, segment)),
                INodeData::Symlink(link) if !is_last || mode == ResolveMode::Deep => {
                    expansions += 1;
                    if expansions > self.max_expansions {
                        warn!(path, limit = self.max_expansions, "symlink expansion bound exceeded");
                        return Err(VfsError::SymlinkLoop {
                            path: path.to_string(),
                            limit: self.max_expansions,
                        });
                    }
                    let target: &str = link.target();
                    trace!(path, link = %segment, target, expansions, "expanding symlink");
                    if target.starts_with('/') {
                        chain.truncate(1);
                    }
                    for part in target.split('/').rev() {
                        pending.push_front(part.to_string());
                    }
                }
                _ if is_last => leaf = Some((child, segment)),
                _ => return Err(VfsError::not_a_directory(path)),
            }
        }

        Ok(match leaf {
            Some((id, name)) => Resolved {
                id,
                parent_id: self.current(&chain),
                name,
            },
            None => {
                let (id, name) = chain.last().cloned().unwrap_or((ROOT_INODE, String::new()));
                let parent_id: INodeId = if chain.len() > 1 {
                    chain[chain.len() - 2].0
                } else {
                    ROOT_INODE
                };
                Resolved { id, parent_id, name }
            }
        })
    }

    /// Resolve the directory that would hold `path`'s final entry.
    ///
    /// The path is split at its last segment and the parent string is
    /// deep-resolved exactly like any other lookup, so `..` inside it is
    /// interpreted after symlink expansion. The parent must be a directory.
    ///
    /// # Returns
    /// (parent directory inode, final entry name).
    ///
    /// # Errors
    /// `InvalidPath` when the final name is empty, `.` or `..` (the root
    /// included), plus any resolution error for the parent.
    pub fn resolve_parent(&self, path: &str) -> Result<(INodeId, String), VfsError> {
        validate_path(path)?;
        let (parent, name) = split_path(path);
        validate_entry_name(path, name)?;

        let resolved: Resolved = self.resolve(parent, ResolveMode::Deep)?;
        self.ns
            .dir(resolved.id)
            .map_err(|e: VfsError| e.at_path(parent))?;
        Ok((resolved.id, name.to_string()))
    }

    fn current(&self, chain: &[(INodeId, String)]) -> INodeId {
        chain.last().map(|(id, _)| *id).unwrap_or(ROOT_INODE)
    }
}
