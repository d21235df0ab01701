//! Flat Record Types
//!
//! Records exchanged with the outside world before they become part of a
//! [`GroupTree`](super::GroupTree):
//!
//! - [`SnapshotRecord`] - one existing group or connection as listed by the remote
//! - [`ImportRow`] - one desired connection produced by the CSV reader
//! - [`LeafSpec`] - the creation payload handed to a `LeafCreationPort`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque string attributes carried through to the remote unchanged
pub type Attributes = BTreeMap<String, String>;

/// One entry of the remote snapshot (group or connection)
///
/// `parent_id` is `None` only for records the remote lists without a parent;
/// such records can never attach and end up reported as orphans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    /// Group type (`ORGANIZATIONAL`, `BALANCING`) or connection protocol
    pub kind: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl SnapshotRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: Option<&str>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: parent_id.map(str::to_string),
            kind: kind.into(),
            attributes: Attributes::new(),
        }
    }
}

/// One desired connection, addressed by its slash-separated site path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    /// Desired group chain, e.g. `DC1/Rack10`
    pub site: String,
    /// Connection name
    pub name: String,
    /// Connection protocol
    pub kind: String,
    /// Connection parameters (hostname, port, credentials, extras)
    #[serde(default)]
    pub attributes: Attributes,
}

impl ImportRow {
    pub fn new(site: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            name: name.into(),
            kind: kind.into(),
            attributes: Attributes::new(),
        }
    }

    /// Builder-style attribute insertion
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The leaf payload this row asks for
    pub fn leaf_spec(&self) -> LeafSpec {
        LeafSpec {
            name: self.name.clone(),
            kind: self.kind.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

/// Payload for creating a leaf resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSpec {
    pub name: String,
    pub kind: String,
    pub attributes: Attributes,
}

impl LeafSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            attributes: Attributes::new(),
        }
    }
}
