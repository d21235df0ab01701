//! Data Models
//!
//! This module contains the data structures the importer reconciles:
//!
//! - `GroupNode` / `LeafResource` - one connection group / one connection
//! - `GroupTree` - arena of groups with a full-path index
//! - `SitePath` - normalized slash-separated group chain
//! - Flat records (`SnapshotRecord`, `ImportRow`, `LeafSpec`) exchanged with
//!   the remote and the CSV reader

mod group;
mod records;
mod site_path;
mod tree;

pub use group::{GroupNode, LeafResource, ORGANIZATIONAL, ROOT_ID};
pub use records::{Attributes, ImportRow, LeafSpec, SnapshotRecord};
pub use site_path::{PathError, SitePath};
pub use tree::{GroupTree, TreeError, DEFAULT_ROOT_NAME};
