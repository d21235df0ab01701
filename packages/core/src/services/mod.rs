//! Reconciliation Services
//!
//! This module contains the reconciliation logic:
//!
//! - `TreeBuilder` - Links an unordered remote snapshot into a `GroupTree`
//! - `PathResolver` - Finds or creates the group chain for a site path
//! - `LeafReconciler` - Creates a connection only when it is missing
//! - `ImportService` - Sequences authentication, snapshot load and per-row import
//!
//! Services talk to the remote exclusively through the ports in
//! [`crate::remote`] and never retain the tree beyond a call.

pub mod error;
pub mod import_service;
pub mod leaf_reconciler;
pub mod path_resolver;
pub mod tree_builder;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ImportError;
pub use import_service::{ImportOutcome, ImportService, ImportState, ImportSummary, RowFailure};
pub use leaf_reconciler::{EnsuredLeaf, LeafReconciler};
pub use path_resolver::{PathResolver, ResolvedPath};
pub use tree_builder::{SnapshotWarning, TreeBuild, TreeBuilder};
