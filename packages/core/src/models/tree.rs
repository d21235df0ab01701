//! Path-Indexed Group Tree
//!
//! [`GroupTree`] is an arena of [`GroupNode`]s keyed by identifier. Parent links
//! are identifiers, never references, so there are no ownership cycles and a
//! node's full path is computed by walking the parent chain iteratively.
//!
//! # Invariants
//!
//! - Every non-root group has a parent that was already in the tree when the
//!   group was inserted.
//! - Child names are unique per parent, leaf names are unique per parent.
//! - The path index holds exactly one entry per group (root included) and
//!   every entry points at a group in the arena.
//!
//! All mutation goes through [`GroupTree::insert_group`] and
//! [`GroupTree::attach_leaf`], which check these before touching anything.

use super::group::{GroupNode, LeafResource, ROOT_ID};
use std::collections::HashMap;
use thiserror::Error;

/// Name given to the root group unless configured otherwise
pub const DEFAULT_ROOT_NAME: &str = "ROOT";

/// Rejected tree mutation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("group {id} has no parent identifier")]
    MissingParent { id: String },

    #[error("parent {parent_id} of {id} is not in the tree")]
    UnknownParent { id: String, parent_id: String },

    #[error("group identifier {id} is already in the tree")]
    DuplicateId { id: String },

    #[error("group {parent_id} already has a child group named '{name}'")]
    DuplicateGroupName { parent_id: String, name: String },

    #[error("group {parent_id} already has a connection named '{name}'")]
    DuplicateLeafName { parent_id: String, name: String },

    #[error("path '{path}' is already indexed")]
    PathCollision { path: String },

    #[error("path index is inconsistent with the tree: {0}")]
    IndexMismatch(String),
}

/// Arena of groups plus the full-path index
#[derive(Debug, Clone)]
pub struct GroupTree {
    root_name: String,
    groups: HashMap<String, GroupNode>,
    path_index: HashMap<String, String>,
}

impl Default for GroupTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupTree {
    /// A tree holding only the root, named [`DEFAULT_ROOT_NAME`]
    pub fn new() -> Self {
        Self::with_root_name(DEFAULT_ROOT_NAME)
    }

    /// A tree holding only the root, displayed and addressed as `root_name`
    pub fn with_root_name(root_name: impl Into<String>) -> Self {
        let root_name = root_name.into();
        let mut groups = HashMap::new();
        groups.insert(ROOT_ID.to_string(), GroupNode::root(root_name.clone()));
        let mut path_index = HashMap::new();
        path_index.insert(root_name.clone(), ROOT_ID.to_string());

        Self {
            root_name,
            groups,
            path_index,
        }
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn root(&self) -> &GroupNode {
        &self.groups[ROOT_ID]
    }

    pub fn get(&self, id: &str) -> Option<&GroupNode> {
        self.groups.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.groups.contains_key(id)
    }

    /// Number of groups, root included
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.groups.values().map(|g| g.leaves().len()).sum()
    }

    /// The child of `parent_id` named `name`
    pub fn child(&self, parent_id: &str, name: &str) -> Option<&GroupNode> {
        self.groups
            .get(parent_id)
            .and_then(|parent| parent.child_id(name))
            .and_then(|child_id| self.groups.get(child_id))
    }

    /// Look a group up by its full path (`ROOT/DC1/Rack10`)
    pub fn find_by_path(&self, full_path: &str) -> Option<&GroupNode> {
        self.path_index
            .get(full_path)
            .and_then(|id| self.groups.get(id))
    }

    /// All indexed paths, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.path_index.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Full path of `id`, walking parent identifiers up to the root
    pub fn path_of(&self, id: &str) -> Option<String> {
        let mut names = Vec::new();
        let mut current = self.groups.get(id)?;
        loop {
            names.push(current.name());
            match current.parent_id() {
                Some(parent_id) => current = self.groups.get(parent_id)?,
                None => break,
            }
        }
        names.reverse();
        Some(names.join("/"))
    }

    /// Full path a child `name` of `parent_id` would get, if it can be inserted
    ///
    /// Rejects an unknown parent, a sibling with the same name and a path that
    /// is already indexed (a group whose own name contains `/`).
    pub fn check_insertable(&self, parent_id: &str, name: &str) -> Result<String, TreeError> {
        let parent = self
            .groups
            .get(parent_id)
            .ok_or_else(|| TreeError::UnknownParent {
                id: name.to_string(),
                parent_id: parent_id.to_string(),
            })?;
        if parent.child_id(name).is_some() {
            return Err(TreeError::DuplicateGroupName {
                parent_id: parent_id.to_string(),
                name: name.to_string(),
            });
        }

        let parent_path = self
            .path_of(parent_id)
            .ok_or_else(|| TreeError::IndexMismatch(format!("no path for {parent_id}")))?;
        let path = format!("{parent_path}/{name}");
        if self.path_index.contains_key(&path) {
            return Err(TreeError::PathCollision { path });
        }
        Ok(path)
    }

    /// Insert a group below its (already present) parent and index its path
    pub fn insert_group(&mut self, node: GroupNode) -> Result<&GroupNode, TreeError> {
        let id = node.id().to_string();
        let parent_id = node
            .parent_id()
            .ok_or_else(|| TreeError::MissingParent { id: id.clone() })?
            .to_string();

        if self.groups.contains_key(&id) {
            return Err(TreeError::DuplicateId { id });
        }
        let path = self
            .check_insertable(&parent_id, node.name())
            .map_err(|e| match e {
                TreeError::UnknownParent { parent_id, .. } => TreeError::UnknownParent {
                    id: id.clone(),
                    parent_id,
                },
                other => other,
            })?;

        if let Some(parent) = self.groups.get_mut(&parent_id) {
            parent.link_child(node.name(), &id);
        }
        self.path_index.insert(path, id.clone());
        self.groups.insert(id.clone(), node);
        Ok(&self.groups[&id])
    }

    /// Attach a leaf to the group named by its `parent_id`
    pub fn attach_leaf(&mut self, leaf: LeafResource) -> Result<&LeafResource, TreeError> {
        let parent_id = leaf.parent_id.clone();
        let name = leaf.name.clone();
        let parent = self
            .groups
            .get_mut(&parent_id)
            .ok_or_else(|| TreeError::UnknownParent {
                id: leaf.id.clone(),
                parent_id: parent_id.clone(),
            })?;

        if !parent.attach_leaf(leaf) {
            return Err(TreeError::DuplicateLeafName { parent_id, name });
        }
        parent
            .leaf(&name)
            .ok_or_else(|| TreeError::IndexMismatch(format!("leaf '{name}' vanished")))
    }

    /// Check that the path index and the arena describe the same set of groups
    pub fn verify_index(&self) -> Result<(), TreeError> {
        if self.path_index.len() != self.groups.len() {
            return Err(TreeError::IndexMismatch(format!(
                "{} paths for {} groups",
                self.path_index.len(),
                self.groups.len()
            )));
        }
        for (path, id) in &self.path_index {
            match self.path_of(id) {
                Some(computed) if &computed == path => {}
                Some(computed) => {
                    return Err(TreeError::IndexMismatch(format!(
                        "{path} points at {id} whose path is {computed}"
                    )))
                }
                None => {
                    return Err(TreeError::IndexMismatch(format!(
                        "{path} points at missing group {id}"
                    )))
                }
            }
        }
        Ok(())
    }

    /// Depth-first dump: each group, then its connections, then its child groups
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<(&str, usize)> = vec![(ROOT_ID, 0)];

        while let Some((id, depth)) = stack.pop() {
            let Some(group) = self.groups.get(id) else {
                continue;
            };
            let indent = "  ".repeat(depth);
            out.push_str(&format!(
                "{indent}- Group: {} (ID: {})\n",
                group.name(),
                group.id()
            ));
            for leaf in group.leaves() {
                out.push_str(&format!(
                    "{indent}  * Connection: {} (ID: {})\n",
                    leaf.name, leaf.id
                ));
            }
            for child_id in group.child_ids().iter().rev() {
                stack.push((child_id.as_str(), depth + 1));
            }
        }

        out
    }
}
