//! Site Path Resolution
//!
//! Walks a [`GroupTree`] from the root along a [`SitePath`], creating every
//! missing segment through a [`GroupCreationPort`] and recording it in the
//! tree before descending into it.
//!
//! Because created groups are inserted immediately, later rows sharing a
//! prefix reuse them: a path is created remotely at most once per run, and a
//! path that already exists costs zero remote calls.
//!
//! If a creation fails the walk stops there. Segments created earlier in the
//! same walk are real remote groups and stay in the tree. A segment whose path
//! the tree cannot take (an existing group named with a `/` already occupies
//! it) is rejected before the remote call, so it is never created remotely.

use crate::models::{Attributes, GroupNode, GroupTree, SitePath, ORGANIZATIONAL, ROOT_ID};
use crate::remote::GroupCreationPort;
use crate::services::error::ImportError;

/// Outcome of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Identifier of the terminal group
    pub group_id: String,
    /// Identifiers of groups created during this call, outermost first
    pub created: Vec<String>,
}

/// Resolves site paths, creating missing groups
pub struct PathResolver<'a, P: GroupCreationPort + ?Sized> {
    port: &'a P,
}

impl<'a, P: GroupCreationPort + ?Sized> PathResolver<'a, P> {
    pub fn new(port: &'a P) -> Self {
        Self { port }
    }

    /// Normalize `raw` against the tree's root name and resolve it
    pub async fn resolve(
        &self,
        tree: &mut GroupTree,
        raw: &str,
    ) -> Result<ResolvedPath, ImportError> {
        let path = SitePath::parse(raw, tree.root_name())?;
        self.resolve_path(tree, &path).await
    }

    /// Resolve an already normalized path
    pub async fn resolve_path(
        &self,
        tree: &mut GroupTree,
        path: &SitePath,
    ) -> Result<ResolvedPath, ImportError> {
        if let Some(existing) = tree.find_by_path(&path.full_path(tree.root_name())) {
            return Ok(ResolvedPath {
                group_id: existing.id().to_string(),
                created: Vec::new(),
            });
        }

        let mut current = ROOT_ID.to_string();
        let mut created = Vec::new();

        for segment in path.segments() {
            if let Some(child) = tree.child(&current, segment) {
                tracing::debug!("Segment '{}' exists as {}", segment, child.id());
                current = child.id().to_string();
                continue;
            }

            tree.check_insertable(&current, segment)?;
            let id = self
                .port
                .create_group(segment, &current)
                .await
                .map_err(|e| ImportError::group_creation(segment, &current, e))?;

            tree.insert_group(GroupNode::new(
                id.clone(),
                segment.clone(),
                Some(current.clone()),
                ORGANIZATIONAL,
                Attributes::new(),
            ))?;
            tracing::debug!("Segment '{}' created as {} under {}", segment, id, current);

            created.push(id.clone());
            current = id;
        }

        Ok(ResolvedPath {
            group_id: current,
            created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SnapshotRecord, TreeError};
    use crate::remote::RemoteError;
    use crate::services::testing::FakeRemote;
    use crate::services::TreeBuilder;

    #[tokio::test]
    async fn test_empty_tree_creates_each_segment_in_order() {
        let remote = FakeRemote::new();
        let mut tree = GroupTree::new();

        let resolved = PathResolver::new(&remote)
            .resolve(&mut tree, "DC1/Rack10")
            .await
            .unwrap();

        assert_eq!(
            remote.created_groups(),
            vec![
                ("DC1".to_string(), "ROOT".to_string()),
                ("Rack10".to_string(), "g1".to_string()),
            ]
        );
        assert_eq!(resolved.created, vec!["g1", "g2"]);
        assert_eq!(resolved.group_id, "g2");
        assert_eq!(tree.path_of(&resolved.group_id).as_deref(), Some("ROOT/DC1/Rack10"));
        tree.verify_index().unwrap();
    }

    #[tokio::test]
    async fn test_same_path_twice_creates_once() {
        let remote = FakeRemote::new();
        let mut tree = GroupTree::new();
        let resolver = PathResolver::new(&remote);

        let first = resolver.resolve(&mut tree, "DC1/Rack10").await.unwrap();
        let second = resolver.resolve(&mut tree, "ROOT/DC1/Rack10").await.unwrap();

        assert_eq!(first.group_id, second.group_id);
        assert!(second.created.is_empty());
        assert_eq!(remote.group_calls(), 2);
    }

    #[tokio::test]
    async fn test_shared_prefix_reuses_created_groups() {
        let remote = FakeRemote::new();
        let mut tree = GroupTree::new();
        let resolver = PathResolver::new(&remote);

        resolver.resolve(&mut tree, "DC1/Rack10").await.unwrap();
        let sibling = resolver.resolve(&mut tree, "DC1/Rack11").await.unwrap();

        assert_eq!(sibling.created.len(), 1);
        assert_eq!(remote.group_calls(), 3);
        assert_eq!(tree.get("g1").map(|g| g.child_ids().len()), Some(2));
    }

    #[tokio::test]
    async fn test_existing_snapshot_path_needs_no_calls() {
        let build = TreeBuilder::default().build(
            vec![
                SnapshotRecord::new("5", "Rack10", Some("4"), "ORGANIZATIONAL"),
                SnapshotRecord::new("4", "DC1", Some("ROOT"), "ORGANIZATIONAL"),
            ],
            vec![],
        );
        let mut tree = build.tree;
        let remote = FakeRemote::new();

        let resolved = PathResolver::new(&remote)
            .resolve(&mut tree, "DC1/Rack10")
            .await
            .unwrap();

        assert_eq!(resolved.group_id, "5");
        assert_eq!(remote.group_calls(), 0);
    }

    #[tokio::test]
    async fn test_partial_prefix_only_creates_missing_tail() {
        let build = TreeBuilder::default().build(
            vec![SnapshotRecord::new("4", "DC1", Some("ROOT"), "ORGANIZATIONAL")],
            vec![],
        );
        let mut tree = build.tree;
        let remote = FakeRemote::new();

        PathResolver::new(&remote)
            .resolve(&mut tree, "DC1/Rack10/Shelf")
            .await
            .unwrap();

        assert_eq!(
            remote.created_groups(),
            vec![
                ("Rack10".to_string(), "4".to_string()),
                ("Shelf".to_string(), "g1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_root_path_resolves_to_root() {
        let remote = FakeRemote::new();
        let mut tree = GroupTree::new();

        let resolved = PathResolver::new(&remote)
            .resolve(&mut tree, "ROOT")
            .await
            .unwrap();

        assert_eq!(resolved.group_id, ROOT_ID);
        assert_eq!(remote.group_calls(), 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_earlier_segments() {
        let remote = FakeRemote::new().fail_group("Rack10");
        let mut tree = GroupTree::new();

        let err = PathResolver::new(&remote)
            .resolve(&mut tree, "DC1/Rack10/Shelf")
            .await
            .unwrap_err();

        match err {
            ImportError::GroupCreation {
                segment,
                parent_id,
                source,
            } => {
                assert_eq!(segment, "Rack10");
                assert_eq!(parent_id, "g1");
                assert!(matches!(source, RemoteError::Api { status: 500, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(tree.find_by_path("ROOT/DC1").is_some());
        assert!(tree.find_by_path("ROOT/DC1/Rack10").is_none());
        tree.verify_index().unwrap();
    }

    #[tokio::test]
    async fn test_colliding_segment_is_never_created_remotely() {
        let build = TreeBuilder::default().build(
            vec![SnapshotRecord::new("1", "a/b", Some("ROOT"), "ORGANIZATIONAL")],
            vec![],
        );
        let mut tree = build.tree;
        let remote = FakeRemote::new();
        let resolver = PathResolver::new(&remote);

        for site in ["a/b/x", "a/b/y"] {
            let err = resolver.resolve(&mut tree, site).await.unwrap_err();
            assert!(matches!(
                err,
                ImportError::Hierarchy(TreeError::PathCollision { ref path }) if path == "ROOT/a/b"
            ));
        }

        assert_eq!(
            remote.created_groups(),
            vec![("a".to_string(), "ROOT".to_string())]
        );
        assert_eq!(remote.group_calls(), 1);
        tree.verify_index().unwrap();
    }

    #[tokio::test]
    async fn test_malformed_path_makes_no_calls() {
        let remote = FakeRemote::new();
        let mut tree = GroupTree::new();

        let err = PathResolver::new(&remote)
            .resolve(&mut tree, "DC1//Rack10")
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::MalformedPath(_)));
        assert_eq!(remote.group_calls(), 0);
    }
}
