//! Inode arena and directory tree.

use std::collections::HashMap;

use tracing::trace;

use super::dir::INodeDir;
use super::types::{INode, INodeData, INodeId, INodeType, ROOT_INODE};
use crate::VfsError;

/// Authoritative store of inodes and directory entries.
///
/// Inodes live in an arena keyed by a stable id. Directories hold ordered
/// name → id maps, so the tree reachable from the root is always acyclic;
/// symlinks only store target strings.
///
/// All methods take `&self`/`&mut self`, so atomicity between mutations comes
/// from whoever owns the namespace (see [`crate::Filesystem`]).
#[derive(Debug, Clone)]
pub struct Namespace {
    /// Next inode ID to allocate.
    next_id: INodeId,
    /// All inodes by ID.
    inodes: HashMap<INodeId, INode>,
}

impl Namespace {
    /// Create a namespace holding only the root directory.
    pub fn new() -> Self {
        let mut root: INode =
            INode::new(ROOT_INODE, INodeData::Directory(INodeDir::new(ROOT_INODE)));
        // The root is referenced by the namespace itself.
        root.link();

        let mut inodes: HashMap<INodeId, INode> = HashMap::new();
        inodes.insert(ROOT_INODE, root);

        Self {
            next_id: ROOT_INODE + 1,
            inodes,
        }
    }

    /// Allocate a new inode ID.
    fn allocate_id(&mut self) -> INodeId {
        let id: INodeId = self.next_id;
        self.next_id += 1;
        id
    }

    /// Get an inode by ID.
    ///
    /// # Errors
    /// `InodeNotFound` if the id is not in the arena.
    pub fn get(&self, id: INodeId) -> Result<&INode, VfsError> {
        self.inodes.get(&id).ok_or(VfsError::InodeNotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: INodeId) -> Result<&mut INode, VfsError> {
        self.inodes.get_mut(&id).ok_or(VfsError::InodeNotFound(id))
    }

    /// Get the root directory.
    pub fn root(&self) -> Result<&INode, VfsError> {
        self.get(ROOT_INODE)
    }

    /// Borrow a directory payload by ID.
    ///
    /// # Errors
    /// `InodeNotFound` or `InodeNotADirectory`.
    pub fn dir(&self, id: INodeId) -> Result<&INodeDir, VfsError> {
        self.get(id)?
            .as_dir()
            .ok_or(VfsError::InodeNotADirectory(id))
    }

    fn dir_mut(&mut self, id: INodeId) -> Result<&mut INodeDir, VfsError> {
        self.get_mut(id)?
            .as_dir_mut()
            .ok_or(VfsError::InodeNotADirectory(id))
    }

    /// Look up a name inside a directory.
    ///
    /// # Arguments
    /// * `parent_id` - Directory inode ID
    /// * `name` - Entry name
    ///
    /// # Returns
    /// The child inode ID.
    ///
    /// # Errors
    /// `NotFound` when the name is absent, `InodeNotADirectory` when the
    /// parent is not a directory.
    pub fn lookup(&self, parent_id: INodeId, name: &str) -> Result<INodeId, VfsError> {
        self.dir(parent_id)?
            .get_child(name)
            .ok_or_else(|| VfsError::not_found(name))
    }

    /// Ordered entries of a directory.
    pub fn children(&self, dir_id: INodeId) -> Result<Vec<(String, INodeId)>, VfsError> {
        Ok(self.dir(dir_id)?.children())
    }

    /// Create a new inode and link it under `parent_id` as `name`.
    ///
    /// New directories record `parent_id` as their parent.
    ///
    /// # Returns
    /// The new inode ID.
    ///
    /// # Errors
    /// `AlreadyExists` on a duplicate name, `InodeNotADirectory` when the
    /// parent is not a directory.
    pub fn insert(
        &mut self,
        parent_id: INodeId,
        name: &str,
        mut data: INodeData,
    ) -> Result<INodeId, VfsError> {
        if self.dir(parent_id)?.get_child(name).is_some() {
            return Err(VfsError::already_exists(name));
        }

        if let INodeData::Directory(dir) = &mut data {
            dir.set_parent_id(parent_id);
        }

        let id: INodeId = self.allocate_id();
        self.inodes.insert(id, INode::new(id, data));
        self.link(parent_id, name, id)?;
        trace!(parent_id, entry = name, id, "inserted inode");
        Ok(id)
    }

    /// Add another directory entry for an existing inode.
    ///
    /// # Errors
    /// `AlreadyExists` on a duplicate name, `InodeNotFound` when `id` is
    /// absent.
    pub fn link(&mut self, parent_id: INodeId, name: &str, id: INodeId) -> Result<(), VfsError> {
        self.get(id)?;
        if !self.dir_mut(parent_id)?.add_child(name.to_string(), id) {
            return Err(VfsError::already_exists(name));
        }
        self.get_mut(id)?.link();
        Ok(())
    }

    /// Remove the entry `name` from `parent_id`.
    ///
    /// The inode is destroyed when no entries reference it any more; a
    /// destroyed directory releases its own children the same way.
    ///
    /// # Returns
    /// The inode ID the entry pointed at.
    pub fn remove(&mut self, parent_id: INodeId, name: &str) -> Result<INodeId, VfsError> {
        let id: INodeId = self
            .dir_mut(parent_id)?
            .remove_child(name)
            .ok_or_else(|| VfsError::not_found(name))?;
        self.release(id);
        trace!(parent_id, entry = name, id, "removed entry");
        Ok(id)
    }

    /// Move an entry between directories in one step.
    ///
    /// The destination name must be free; replacing an existing destination
    /// is the caller's job.
    pub fn move_entry(
        &mut self,
        old_parent: INodeId,
        old_name: &str,
        new_parent: INodeId,
        new_name: &str,
    ) -> Result<INodeId, VfsError> {
        let id: INodeId = self.lookup(old_parent, old_name)?;
        if self.dir(new_parent)?.get_child(new_name).is_some() {
            return Err(VfsError::already_exists(new_name));
        }

        self.dir_mut(old_parent)?.remove_child(old_name);
        self.dir_mut(new_parent)?.add_child(new_name.to_string(), id);
        if let Some(dir) = self.get_mut(id)?.as_dir_mut() {
            dir.set_parent_id(new_parent);
        }
        Ok(id)
    }

    /// Check whether `ancestor` is `dir_id` or one of its parent directories.
    pub fn is_ancestor(&self, ancestor: INodeId, dir_id: INodeId) -> bool {
        let mut current: INodeId = dir_id;
        loop {
            if current == ancestor {
                return true;
            }
            match self.dir(current) {
                Ok(dir) if current != ROOT_INODE => current = dir.parent_id(),
                _ => return false,
            }
        }
    }

    /// Get the total number of inodes.
    pub fn inode_count(&self) -> usize {
        self.inodes.len()
    }

    /// Drop one link to `id`, destroying it (and any owned children) when
    /// the count reaches zero.
    fn release(&mut self, id: INodeId) {
        let mut pending: Vec<INodeId> = vec![id];
        while let Some(current) = pending.pop() {
            let remaining: u32 = match self.inodes.get_mut(&current) {
                Some(inode) => inode.unlink(),
                None => continue,
            };
            if remaining > 0 {
                continue;
            }
            if let Some(inode) = self.inodes.remove(&current) {
                if inode.inode_type() == INodeType::Directory {
                    if let Some(dir) = inode.as_dir() {
                        pending.extend(dir.children().into_iter().map(|(_, child)| child));
                    }
                }
            }
        }
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inode::{INodeFile, INodeSymlink};

    fn file(content: &[u8]) -> INodeData {
        INodeData::File(INodeFile::new(content.to_vec()))
    }

    fn dir() -> INodeData {
        INodeData::Directory(INodeDir::new(ROOT_INODE))
    }

    #[test]
    fn test_new_namespace_has_root() {
        let ns: Namespace = Namespace::new();
        let root: &INode = ns.root().unwrap();
        assert_eq!(root.id(), ROOT_INODE);
        assert_eq!(root.inode_type(), INodeType::Directory);
        assert_eq!(ns.inode_count(), 1);
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut ns: Namespace = Namespace::new();
        let d1: INodeId = ns.insert(ROOT_INODE, "d1", dir()).unwrap();
        let f1: INodeId = ns.insert(d1, "f1", file(b"things")).unwrap();

        assert_eq!(ns.lookup(ROOT_INODE, "d1").unwrap(), d1);
        assert_eq!(ns.lookup(d1, "f1").unwrap(), f1);
        assert_eq!(ns.get(f1).unwrap().size(), 6);
        assert_eq!(ns.dir(d1).unwrap().parent_id(), ROOT_INODE);
        assert_eq!(ns.get(f1).unwrap().nlink(), 1);
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let mut ns: Namespace = Namespace::new();
        ns.insert(ROOT_INODE, "a", file(b"")).unwrap();
        let err: VfsError = ns.insert(ROOT_INODE, "a", dir()).unwrap_err();
        assert!(matches!(err, VfsError::AlreadyExists { .. }));
        assert_eq!(ns.inode_count(), 2);
    }

    #[test]
    fn test_insert_into_file_fails() {
        let mut ns: Namespace = Namespace::new();
        let f: INodeId = ns.insert(ROOT_INODE, "f", file(b"x")).unwrap();
        let err: VfsError = ns.insert(f, "child", file(b"")).unwrap_err();
        assert_eq!(err, VfsError::InodeNotADirectory(f));
    }

    #[test]
    fn test_lookup_missing() {
        let ns: Namespace = Namespace::new();
        assert!(ns.lookup(ROOT_INODE, "nope").unwrap_err().is_not_found());
        assert_eq!(
            ns.lookup(42, "x").unwrap_err(),
            VfsError::InodeNotFound(42)
        );
    }

    #[test]
    fn test_remove_frees_subtree() {
        let mut ns: Namespace = Namespace::new();
        let d: INodeId = ns.insert(ROOT_INODE, "d", dir()).unwrap();
        let inner: INodeId = ns.insert(d, "inner", dir()).unwrap();
        ns.insert(inner, "f", file(b"abc")).unwrap();
        ns.insert(d, "l", INodeData::Symlink(INodeSymlink::new("/d".into())))
            .unwrap();
        assert_eq!(ns.inode_count(), 5);

        ns.remove(ROOT_INODE, "d").unwrap();
        assert_eq!(ns.inode_count(), 1);
        assert!(ns.get(inner).is_err());
    }

    #[test]
    fn test_hard_link_keeps_inode_alive() {
        let mut ns: Namespace = Namespace::new();
        let f: INodeId = ns.insert(ROOT_INODE, "a", file(b"data")).unwrap();
        ns.link(ROOT_INODE, "b", f).unwrap();
        assert_eq!(ns.get(f).unwrap().nlink(), 2);

        ns.remove(ROOT_INODE, "a").unwrap();
        assert_eq!(ns.lookup(ROOT_INODE, "b").unwrap(), f);
        assert_eq!(ns.get(f).unwrap().nlink(), 1);

        ns.remove(ROOT_INODE, "b").unwrap();
        assert!(ns.get(f).is_err());
    }

    #[test]
    fn test_move_entry_updates_parent() {
        let mut ns: Namespace = Namespace::new();
        let a: INodeId = ns.insert(ROOT_INODE, "a", dir()).unwrap();
        let b: INodeId = ns.insert(ROOT_INODE, "b", dir()).unwrap();

        ns.move_entry(ROOT_INODE, "a", b, "moved").unwrap();
        assert_eq!(ns.lookup(b, "moved").unwrap(), a);
        assert_eq!(ns.dir(a).unwrap().parent_id(), b);
        assert!(ns.lookup(ROOT_INODE, "a").is_err());
        assert!(ns.is_ancestor(b, a));
        assert!(ns.is_ancestor(ROOT_INODE, a));
        assert!(!ns.is_ancestor(a, b));
    }
}
