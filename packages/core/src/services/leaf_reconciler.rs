//! Leaf Reconciliation
//!
//! Ensures a connection exists under a resolved group. Reconciliation is
//! presence-only: an existing connection with the requested name is returned
//! as it is, even when its protocol or attributes differ from the request.

use crate::models::{GroupTree, LeafResource, LeafSpec};
use crate::remote::LeafCreationPort;
use crate::services::error::ImportError;

/// A connection that is known to exist after [`LeafReconciler::ensure_leaf`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredLeaf {
    pub leaf: LeafResource,
    /// False when the connection was already present
    pub created: bool,
}

/// Creates connections that are missing from a group
pub struct LeafReconciler<'a, P: LeafCreationPort + ?Sized> {
    port: &'a P,
}

impl<'a, P: LeafCreationPort + ?Sized> LeafReconciler<'a, P> {
    pub fn new(port: &'a P) -> Self {
        Self { port }
    }

    pub async fn ensure_leaf(
        &self,
        tree: &mut GroupTree,
        parent_id: &str,
        spec: &LeafSpec,
    ) -> Result<EnsuredLeaf, ImportError> {
        let parent = tree.get(parent_id).ok_or_else(|| {
            ImportError::invalid_state(format!("group {parent_id} is not in the hierarchy"))
        })?;

        if let Some(existing) = parent.leaf(&spec.name) {
            if existing.kind != spec.kind {
                tracing::debug!(
                    "Connection '{}' under {} uses {} instead of {}, leaving it unchanged",
                    spec.name,
                    parent_id,
                    existing.kind,
                    spec.kind
                );
            }
            return Ok(EnsuredLeaf {
                leaf: existing.clone(),
                created: false,
            });
        }

        let id = self
            .port
            .create_leaf(spec, parent_id)
            .await
            .map_err(|e| ImportError::leaf_creation(&spec.name, parent_id, e))?;

        let leaf = tree
            .attach_leaf(LeafResource::from_spec(id, parent_id, spec))?
            .clone();
        Ok(EnsuredLeaf {
            leaf,
            created: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SnapshotRecord, ROOT_ID};
    use crate::remote::RemoteError;
    use crate::services::testing::FakeRemote;
    use crate::services::TreeBuilder;

    fn ssh(name: &str) -> LeafSpec {
        let mut spec = LeafSpec::new(name, "ssh");
        spec.attributes.insert("hostname".into(), "10.0.0.1".into());
        spec
    }

    #[tokio::test]
    async fn test_missing_leaf_is_created_and_attached() {
        let remote = FakeRemote::new();
        let mut tree = GroupTree::new();

        let ensured = LeafReconciler::new(&remote)
            .ensure_leaf(&mut tree, ROOT_ID, &ssh("web-01"))
            .await
            .unwrap();

        assert!(ensured.created);
        assert_eq!(ensured.leaf.id, "c1");
        assert_eq!(ensured.leaf.parent_id, ROOT_ID);
        assert_eq!(ensured.leaf.attributes["hostname"], "10.0.0.1");
        assert_eq!(tree.root().leaf("web-01"), Some(&ensured.leaf));
        assert_eq!(
            remote.created_leaves(),
            vec![("web-01".to_string(), ROOT_ID.to_string())]
        );
    }

    #[tokio::test]
    async fn test_second_ensure_returns_same_leaf_without_call() {
        let remote = FakeRemote::new();
        let mut tree = GroupTree::new();
        let reconciler = LeafReconciler::new(&remote);

        let first = reconciler
            .ensure_leaf(&mut tree, ROOT_ID, &ssh("web-01"))
            .await
            .unwrap();
        let second = reconciler
            .ensure_leaf(&mut tree, ROOT_ID, &ssh("web-01"))
            .await
            .unwrap();

        assert_eq!(first.leaf, second.leaf);
        assert!(!second.created);
        assert_eq!(remote.leaf_calls(), 1);
        assert_eq!(tree.leaf_count(), 1);
    }

    #[tokio::test]
    async fn test_existing_leaf_with_other_attributes_is_left_alone() {
        let mut record = SnapshotRecord::new("77", "web-01", Some(ROOT_ID), "rdp");
        record.attributes.insert("hostname".into(), "192.168.1.5".into());
        let mut tree = TreeBuilder::default().build(vec![], vec![record]).tree;
        let remote = FakeRemote::new();

        let ensured = LeafReconciler::new(&remote)
            .ensure_leaf(&mut tree, ROOT_ID, &ssh("web-01"))
            .await
            .unwrap();

        assert!(!ensured.created);
        assert_eq!(ensured.leaf.id, "77");
        assert_eq!(ensured.leaf.kind, "rdp");
        assert_eq!(ensured.leaf.attributes["hostname"], "192.168.1.5");
        assert_eq!(remote.leaf_calls(), 0);
    }

    #[tokio::test]
    async fn test_creation_failure_names_leaf_and_parent() {
        let remote = FakeRemote::new().fail_leaf("web-01");
        let mut tree = GroupTree::new();

        let err = LeafReconciler::new(&remote)
            .ensure_leaf(&mut tree, ROOT_ID, &ssh("web-01"))
            .await
            .unwrap_err();

        match err {
            ImportError::LeafCreation {
                name,
                parent_id,
                source,
            } => {
                assert_eq!(name, "web-01");
                assert_eq!(parent_id, ROOT_ID);
                assert!(matches!(source, RemoteError::Api { status: 400, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(tree.leaf_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_parent_is_rejected_before_any_call() {
        let remote = FakeRemote::new();
        let mut tree = GroupTree::new();

        let err = LeafReconciler::new(&remote)
            .ensure_leaf(&mut tree, "404", &ssh("web-01"))
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::InvalidState(_)));
        assert_eq!(remote.leaf_calls(), 0);
    }
}
