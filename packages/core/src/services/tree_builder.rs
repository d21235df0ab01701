//! Snapshot Tree Builder
//!
//! Turns the unordered group and connection listings of the remote into a
//! linked, path-indexed [`GroupTree`].
//!
//! # Algorithm
//!
//! The remote lists groups in no particular order, so a group may appear
//! before its parent. Group records are kept in a pending queue which is
//! scanned repeatedly. Each pass first selects the records whose parent was
//! in the tree when the pass began, then attaches them in identifier order, so
//! a group always waits one pass after its parent. Every tree depth is thus
//! attached in a single pass. The loop stops at the first pass that attaches
//! nothing. Whatever is still pending then is an orphan: its parent never
//! resolved, directly or transitively (dangling references, cycles, records
//! without a parent). Orphans are reported and dropped, never fatal.
//!
//! Connections have no dependents, so they are attached in a single pass
//! once the group tree is stable.
//!
//! The queue is sorted by identifier before the first pass, which makes the
//! result independent of listing order: the same snapshot in any permutation
//! produces the same tree, the same path index and the same warnings. When two
//! records conflict (same identifier, or same name under one parent) the one
//! with the lower identifier in string order wins. Siblings always become
//! ready in the same pass, which is what makes that rule hold.
//!
//! Worst case is O(n²) record checks for a chain listed leaf-first.

use crate::models::{GroupNode, GroupTree, LeafResource, SnapshotRecord, TreeError, DEFAULT_ROOT_NAME};
use std::cmp::Ordering;
use std::fmt;

/// Non-fatal problem found while building the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotWarning {
    /// Group whose parent never resolved
    OrphanGroup(SnapshotRecord),
    /// Connection whose parent group is not in the tree
    OrphanLeaf(SnapshotRecord),
    /// Group whose parent resolved but which conflicts with an attached group
    RejectedGroup {
        record: SnapshotRecord,
        reason: TreeError,
    },
    /// Connection that conflicts with an attached connection
    RejectedLeaf {
        record: SnapshotRecord,
        reason: TreeError,
    },
}

impl SnapshotWarning {
    pub fn is_orphan(&self) -> bool {
        matches!(self, Self::OrphanGroup(_) | Self::OrphanLeaf(_))
    }

    pub fn record(&self) -> &SnapshotRecord {
        match self {
            Self::OrphanGroup(record) | Self::OrphanLeaf(record) => record,
            Self::RejectedGroup { record, .. } | Self::RejectedLeaf { record, .. } => record,
        }
    }
}

impl fmt::Display for SnapshotWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parent = |record: &SnapshotRecord| {
            record
                .parent_id
                .clone()
                .unwrap_or_else(|| "<none>".to_string())
        };
        match self {
            Self::OrphanGroup(record) => write!(
                f,
                "orphaned group '{}' (ID: {}): parent {} not found",
                record.name,
                record.id,
                parent(record)
            ),
            Self::OrphanLeaf(record) => write!(
                f,
                "orphaned connection '{}' (ID: {}): parent {} not found",
                record.name,
                record.id,
                parent(record)
            ),
            Self::RejectedGroup { record, reason } => write!(
                f,
                "skipped group '{}' (ID: {}): {}",
                record.name, record.id, reason
            ),
            Self::RejectedLeaf { record, reason } => write!(
                f,
                "skipped connection '{}' (ID: {}): {}",
                record.name, record.id, reason
            ),
        }
    }
}

/// Result of building a tree from a snapshot
#[derive(Debug, Clone)]
pub struct TreeBuild {
    pub tree: GroupTree,
    pub warnings: Vec<SnapshotWarning>,
    /// Number of scans over the pending group queue
    pub passes: usize,
}

impl TreeBuild {
    pub fn orphans(&self) -> impl Iterator<Item = &SnapshotRecord> {
        self.warnings
            .iter()
            .filter(|w| w.is_orphan())
            .map(SnapshotWarning::record)
    }
}

/// Builds a [`GroupTree`] from listing results
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    root_name: String,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_NAME)
    }
}

impl TreeBuilder {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
        }
    }

    /// Build the tree; never fails, problems are returned as warnings
    pub fn build(&self, groups: Vec<SnapshotRecord>, leaves: Vec<SnapshotRecord>) -> TreeBuild {
        let mut tree = GroupTree::with_root_name(self.root_name.clone());
        let mut warnings = Vec::new();

        let mut pending = groups;
        pending.sort_by(record_order);

        let mut passes = 0;
        while !pending.is_empty() {
            passes += 1;

            // Readiness is judged against the tree as it was when the pass began
            let (ready, deferred): (Vec<_>, Vec<_>) = pending.into_iter().partition(|record| {
                record
                    .parent_id
                    .as_deref()
                    .is_some_and(|parent_id| tree.contains(parent_id))
            });
            pending = deferred;

            let mut attached = 0;
            for record in ready {
                let node = GroupNode::new(
                    record.id.clone(),
                    record.name.clone(),
                    record.parent_id.clone(),
                    record.kind.clone(),
                    record.attributes.clone(),
                );
                match tree.insert_group(node) {
                    Ok(_) => attached += 1,
                    Err(reason) => warnings.push(SnapshotWarning::RejectedGroup { record, reason }),
                }
            }

            tracing::debug!(
                "Snapshot pass {}: attached {} groups, {} pending",
                passes,
                attached,
                pending.len()
            );
            if attached == 0 {
                break;
            }
        }
        warnings.extend(pending.into_iter().map(SnapshotWarning::OrphanGroup));

        let mut leaves = leaves;
        leaves.sort_by(record_order);
        for record in leaves {
            let parent_id = match record.parent_id.as_deref() {
                Some(parent_id) if tree.contains(parent_id) => parent_id.to_string(),
                _ => {
                    warnings.push(SnapshotWarning::OrphanLeaf(record));
                    continue;
                }
            };

            let leaf = LeafResource {
                id: record.id.clone(),
                name: record.name.clone(),
                parent_id,
                kind: record.kind.clone(),
                attributes: record.attributes.clone(),
            };
            if let Err(reason) = tree.attach_leaf(leaf) {
                warnings.push(SnapshotWarning::RejectedLeaf { record, reason });
            }
        }

        for warning in &warnings {
            tracing::warn!("Snapshot: {}", warning);
        }
        tracing::info!(
            "Built hierarchy with {} groups and {} connections ({} warnings, {} passes)",
            tree.group_count() - 1,
            tree.leaf_count(),
            warnings.len(),
            passes
        );

        TreeBuild {
            tree,
            warnings,
            passes,
        }
    }
}

/// Identifier first; the remaining fields only break ties between records
/// that share an identifier
fn record_order(a: &SnapshotRecord, b: &SnapshotRecord) -> Ordering {
    a.id.cmp(&b.id)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.parent_id.cmp(&b.parent_id))
        .then_with(|| a.kind.cmp(&b.kind))
        .then_with(|| a.attributes.cmp(&b.attributes))
}
