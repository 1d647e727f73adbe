//! Directory inode implementation.

use std::collections::HashMap;

use super::types::INodeId;

/// Directory inode payload.
///
/// Entries keep insertion order, which is the order returned by listings.
#[derive(Debug, Clone)]
pub struct INodeDir {
    /// Parent directory inode ID (root is its own parent).
    parent_id: INodeId,
    /// Child names in insertion order.
    order: Vec<String>,
    /// Child entries: name → inode ID.
    children: HashMap<String, INodeId>,
}

impl INodeDir {
    /// Create an empty directory.
    ///
    /// # Arguments
    /// * `parent_id` - Parent directory inode ID
    pub fn new(parent_id: INodeId) -> Self {
        Self {
            parent_id,
            order: Vec::new(),
            children: HashMap::new(),
        }
    }

    /// Get the parent directory inode ID.
    pub fn parent_id(&self) -> INodeId {
        self.parent_id
    }

    pub(crate) fn set_parent_id(&mut self, parent_id: INodeId) {
        self.parent_id = parent_id;
    }

    /// Add a child entry at the end of the listing.
    ///
    /// # Arguments
    /// * `name` - Child entry name
    /// * `id` - Child inode ID
    ///
    /// # Returns
    /// False if the name was already present (nothing is changed).
    pub fn add_child(&mut self, name: String, id: INodeId) -> bool {
        if self.children.contains_key(&name) {
            return false;
        }
        self.order.push(name.clone());
        self.children.insert(name, id);
        true
    }

    /// Get a child inode ID by name.
    pub fn get_child(&self, name: &str) -> Option<INodeId> {
        self.children.get(name).copied()
    }

    /// Child names in listing order.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// All children as (name, inode_id) pairs in listing order.
    pub fn children(&self) -> Vec<(String, INodeId)> {
        self.order
            .iter()
            .filter_map(|name: &String| {
                self.children
                    .get(name)
                    .map(|id: &INodeId| (name.clone(), *id))
            })
            .collect()
    }

    /// Get the number of children.
    pub fn child_count(&self) -> usize {
        self.order.len()
    }

    /// Check whether the directory has no entries.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Remove a child entry.
    ///
    /// # Returns
    /// The removed child inode ID, or None if not found.
    pub fn remove_child(&mut self, name: &str) -> Option<INodeId> {
        let id: INodeId = self.children.remove(name)?;
        self.order.retain(|n: &String| n != name);
        Some(id)
    }
}
