//! Group and Leaf Node Structures
//!
//! A [`GroupNode`] is one connection group in the remote hierarchy. It never
//! owns other groups: children are stored by identifier and the nodes
//! themselves live in the [`GroupTree`](super::GroupTree) arena. Leaf
//! resources (connections) have no dependents, so a group owns its leaves
//! directly.
//!
//! Identity is always the identifier. Names are only unique among the
//! children of one parent.

use super::records::{Attributes, LeafSpec};
use std::collections::HashMap;

/// Identifier of the synthetic root group. Never created remotely.
pub const ROOT_ID: &str = "ROOT";

/// Default group type assigned to groups created by the importer
pub const ORGANIZATIONAL: &str = "ORGANIZATIONAL";

/// A terminal, non-container resource attached to a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafResource {
    pub id: String,
    pub name: String,
    pub parent_id: String,
    /// Protocol tag (`ssh`, `rdp`, `vnc`, ...)
    pub kind: String,
    pub attributes: Attributes,
}

impl LeafResource {
    /// Build the leaf that results from creating `spec` under `parent_id`
    pub fn from_spec(id: impl Into<String>, parent_id: impl Into<String>, spec: &LeafSpec) -> Self {
        Self {
            id: id.into(),
            name: spec.name.clone(),
            parent_id: parent_id.into(),
            kind: spec.kind.clone(),
            attributes: spec.attributes.clone(),
        }
    }
}

/// One connection group
#[derive(Debug, Clone)]
pub struct GroupNode {
    id: String,
    name: String,
    parent_id: Option<String>,
    kind: String,
    attributes: Attributes,
    /// Child group ids in insertion order
    children: Vec<String>,
    /// Child name → child id
    child_names: HashMap<String, String>,
    /// Leaves in insertion order
    leaves: Vec<LeafResource>,
    /// Leaf name → position in `leaves`
    leaf_names: HashMap<String, usize>,
}

impl GroupNode {
    /// The root group for a hierarchy whose root is displayed as `name`
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(ROOT_ID, name, None, ORGANIZATIONAL, Attributes::new())
    }

    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: Option<String>,
        kind: impl Into<String>,
        attributes: Attributes,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id,
            kind: kind.into(),
            attributes,
            children: Vec::new(),
            child_names: HashMap::new(),
            leaves: Vec::new(),
            leaf_names: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent group id, `None` only for the root
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Child group ids in insertion order
    pub fn child_ids(&self) -> &[String] {
        &self.children
    }

    /// Id of the child group named `name`, if any
    pub fn child_id(&self, name: &str) -> Option<&str> {
        self.child_names.get(name).map(String::as_str)
    }

    pub fn leaves(&self) -> &[LeafResource] {
        &self.leaves
    }

    /// Leaf named `name`, if any
    pub fn leaf(&self, name: &str) -> Option<&LeafResource> {
        self.leaf_names.get(name).map(|&idx| &self.leaves[idx])
    }

    /// Register a child id under `name`. Returns false when the name is taken.
    pub(crate) fn link_child(&mut self, name: &str, child_id: &str) -> bool {
        if self.child_names.contains_key(name) {
            return false;
        }
        self.child_names.insert(name.to_string(), child_id.to_string());
        self.children.push(child_id.to_string());
        true
    }

    /// Attach a leaf. Returns false when a leaf with that name already exists.
    pub(crate) fn attach_leaf(&mut self, leaf: LeafResource) -> bool {
        if self.leaf_names.contains_key(&leaf.name) {
            return false;
        }
        self.leaf_names.insert(leaf.name.clone(), self.leaves.len());
        self.leaves.push(leaf);
        true
    }
}

impl PartialEq for GroupNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GroupNode {}
