//! Import Orchestrator
//!
//! Sequences one import run against a remote hierarchy:
//!
//! ```text
//! Unauthenticated -> Authenticated -> SnapshotLoaded -> Importing -> Completed
//!        \________________\___________________________________________-> Aborted
//! ```
//!
//! Authentication and snapshot failures are fatal: the run moves to
//! `Aborted` and nothing is imported. Once the snapshot is loaded every row is
//! handled in isolation. A row that fails (malformed site, group or connection
//! creation error) is logged, recorded in the summary and skipped; the next
//! row proceeds as usual.
//!
//! Rows are processed strictly one after another. Later rows reuse groups
//! created by earlier ones, so the in-memory tree stays the single source of
//! truth for what already exists.
//!
//! A service drives exactly one run. The tree it builds is handed back in the
//! [`ImportOutcome`] and nothing is kept between runs.

use crate::config::ImporterConfig;
use crate::models::{GroupTree, ImportRow, SitePath};
use crate::remote::RemoteHierarchy;
use crate::services::error::ImportError;
use crate::services::leaf_reconciler::{EnsuredLeaf, LeafReconciler};
use crate::services::path_resolver::PathResolver;
use crate::services::tree_builder::{SnapshotWarning, TreeBuild, TreeBuilder};
use serde::Serialize;
use std::sync::Arc;

/// Lifecycle of an import run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    Unauthenticated,
    Authenticated,
    SnapshotLoaded,
    Importing,
    Completed,
    Aborted,
}

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    /// 1-based position of the row in the input
    pub row: usize,
    pub site: String,
    pub name: String,
    pub error: String,
}

/// Per-run accounting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Rows whose connection exists after the run
    pub succeeded: usize,
    pub total: usize,
    pub groups_created: usize,
    pub leaves_created: usize,
    /// Rows whose connection was already present
    pub leaves_existing: usize,
    pub failures: Vec<RowFailure>,
}

impl ImportSummary {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// True when there was input and none of it could be imported
    pub fn nothing_imported(&self) -> bool {
        self.total > 0 && self.succeeded == 0
    }
}

/// Everything a completed run produces
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub summary: ImportSummary,
    pub warnings: Vec<SnapshotWarning>,
    /// Final state of the hierarchy, for display
    pub tree: GroupTree,
}

/// Drives one import run
pub struct ImportService {
    remote: Arc<dyn RemoteHierarchy>,
    config: ImporterConfig,
    state: ImportState,
}

impl ImportService {
    pub fn new(remote: Arc<dyn RemoteHierarchy>, config: ImporterConfig) -> Self {
        Self {
            remote,
            config,
            state: ImportState::Unauthenticated,
        }
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    pub fn config(&self) -> &ImporterConfig {
        &self.config
    }

    /// Authenticate, load the snapshot, then import every row
    ///
    /// Returns an error only for fatal failures. Row failures are reported in
    /// [`ImportSummary::failures`].
    pub async fn run(&mut self, rows: Vec<ImportRow>) -> Result<ImportOutcome, ImportError> {
        if self.state != ImportState::Unauthenticated {
            return Err(ImportError::invalid_state(format!(
                "an import run can only start once (current state: {:?})",
                self.state
            )));
        }

        let prefix = match self.parent_prefix() {
            Ok(prefix) => prefix,
            Err(e) => {
                self.state = ImportState::Aborted;
                return Err(e);
            }
        };

        if let Err(e) = self.remote.authenticate().await {
            self.state = ImportState::Aborted;
            tracing::error!("Authentication failed: {}", e);
            return Err(ImportError::Authentication(e));
        }
        self.transition(ImportState::Authenticated);

        let build = match self.load_snapshot().await {
            Ok(build) => build,
            Err(e) => {
                self.state = ImportState::Aborted;
                tracing::error!("{}", e);
                return Err(e);
            }
        };
        let mut tree = build.tree;
        self.transition(ImportState::SnapshotLoaded);

        self.transition(ImportState::Importing);
        let groups_before = tree.group_count();
        let mut summary = ImportSummary {
            total: rows.len(),
            ..Default::default()
        };

        for (index, row) in rows.iter().enumerate() {
            match self.import_row(&mut tree, prefix.as_ref(), row).await {
                Ok(ensured) => {
                    summary.succeeded += 1;
                    if ensured.created {
                        summary.leaves_created += 1;
                        tracing::info!(
                            "Created connection '{}' in '{}' (ID: {})",
                            row.name,
                            row.site,
                            ensured.leaf.id
                        );
                    } else {
                        summary.leaves_existing += 1;
                        tracing::info!(
                            "Connection '{}' already exists in '{}' (ID: {})",
                            row.name,
                            row.site,
                            ensured.leaf.id
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(
                        "Row {} ({} / {}) failed: {}",
                        index + 1,
                        row.site,
                        row.name,
                        e
                    );
                    summary.failures.push(RowFailure {
                        row: index + 1,
                        site: row.site.clone(),
                        name: row.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        summary.groups_created = tree.group_count() - groups_before;
        self.transition(ImportState::Completed);
        tracing::info!(
            "Imported {}/{} connections ({} groups created, {} connections created, {} already present)",
            summary.succeeded,
            summary.total,
            summary.groups_created,
            summary.leaves_created,
            summary.leaves_existing
        );

        Ok(ImportOutcome {
            summary,
            warnings: build.warnings,
            tree,
        })
    }

    fn parent_prefix(&self) -> Result<Option<SitePath>, ImportError> {
        let Some(raw) = self.config.parent_group.as_deref() else {
            return Ok(None);
        };
        SitePath::parse(raw, &self.config.root_name)
            .map(Some)
            .map_err(|e| ImportError::invalid_state(format!("parent group '{raw}' is unusable: {e}")))
    }

    async fn load_snapshot(&self) -> Result<TreeBuild, ImportError> {
        let groups = self
            .remote
            .list_groups()
            .await
            .map_err(ImportError::SnapshotLoad)?;
        let leaves = self
            .remote
            .list_leaves()
            .await
            .map_err(ImportError::SnapshotLoad)?;
        tracing::debug!(
            "Snapshot lists {} groups and {} connections",
            groups.len(),
            leaves.len()
        );
        Ok(TreeBuilder::new(self.config.root_name.clone()).build(groups, leaves))
    }

    async fn import_row(
        &self,
        tree: &mut GroupTree,
        prefix: Option<&SitePath>,
        row: &ImportRow,
    ) -> Result<EnsuredLeaf, ImportError> {
        let path = SitePath::parse(&row.site, tree.root_name())?;
        let path = match prefix {
            Some(prefix) => path.under(prefix),
            None => path,
        };

        let resolved = PathResolver::new(self.remote.as_ref())
            .resolve_path(tree, &path)
            .await?;
        LeafReconciler::new(self.remote.as_ref())
            .ensure_leaf(tree, &resolved.group_id, &row.leaf_spec())
            .await
    }

    fn transition(&mut self, next: ImportState) {
        tracing::debug!("Import state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
