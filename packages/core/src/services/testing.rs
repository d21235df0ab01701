//! Recording fake of the remote hierarchy for service tests

use crate::models::{LeafSpec, SnapshotRecord};
use crate::remote::{
    Authenticator, GroupCreationPort, GroupLister, LeafCreationPort, LeafLister, RemoteError,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
struct Calls {
    authentications: usize,
    listings: usize,
    group_attempts: usize,
    leaf_attempts: usize,
    next_group: usize,
    next_leaf: usize,
    created_groups: Vec<(String, String)>,
    created_leaves: Vec<(String, String)>,
}

/// In-memory remote that hands out `g1, g2, ...` for groups and
/// `c1, c2, ...` for connections, and fails on request
#[derive(Default)]
pub(crate) struct FakeRemote {
    groups: Vec<SnapshotRecord>,
    leaves: Vec<SnapshotRecord>,
    reject_auth: bool,
    fail_listing: bool,
    failing_groups: HashSet<String>,
    failing_leaves: HashSet<String>,
    calls: Mutex<Calls>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, groups: Vec<SnapshotRecord>, leaves: Vec<SnapshotRecord>) -> Self {
        self.groups = groups;
        self.leaves = leaves;
        self
    }

    pub fn reject_auth(mut self) -> Self {
        self.reject_auth = true;
        self
    }

    pub fn fail_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Fail every attempt to create a group with this name
    pub fn fail_group(mut self, name: &str) -> Self {
        self.failing_groups.insert(name.to_string());
        self
    }

    /// Fail every attempt to create a connection with this name
    pub fn fail_leaf(mut self, name: &str) -> Self {
        self.failing_leaves.insert(name.to_string());
        self
    }

    pub fn authentications(&self) -> usize {
        self.calls.lock().unwrap().authentications
    }

    pub fn listings(&self) -> usize {
        self.calls.lock().unwrap().listings
    }

    /// Group creation attempts, failed ones included
    pub fn group_calls(&self) -> usize {
        self.calls.lock().unwrap().group_attempts
    }

    /// Connection creation attempts, failed ones included
    pub fn leaf_calls(&self) -> usize {
        self.calls.lock().unwrap().leaf_attempts
    }

    /// Successfully created groups as `(name, parent_id)`
    pub fn created_groups(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().created_groups.clone()
    }

    /// Successfully created connections as `(name, parent_id)`
    pub fn created_leaves(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().created_leaves.clone()
    }
}

#[async_trait]
impl Authenticator for FakeRemote {
    async fn authenticate(&self) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().authentications += 1;
        if self.reject_auth {
            return Err(RemoteError::authentication_rejected("status 403: invalid credentials"));
        }
        Ok(())
    }
}

#[async_trait]
impl GroupLister for FakeRemote {
    async fn list_groups(&self) -> Result<Vec<SnapshotRecord>, RemoteError> {
        self.calls.lock().unwrap().listings += 1;
        if self.fail_listing {
            return Err(RemoteError::api(500, "listing unavailable"));
        }
        Ok(self.groups.clone())
    }
}

#[async_trait]
impl LeafLister for FakeRemote {
    async fn list_leaves(&self) -> Result<Vec<SnapshotRecord>, RemoteError> {
        self.calls.lock().unwrap().listings += 1;
        if self.fail_listing {
            return Err(RemoteError::api(500, "listing unavailable"));
        }
        Ok(self.leaves.clone())
    }
}

#[async_trait]
impl GroupCreationPort for FakeRemote {
    async fn create_group(&self, name: &str, parent_id: &str) -> Result<String, RemoteError> {
        let mut calls = self.calls.lock().unwrap();
        calls.group_attempts += 1;
        if self.failing_groups.contains(name) {
            return Err(RemoteError::api(500, format!("cannot create group {name}")));
        }
        calls.next_group += 1;
        calls
            .created_groups
            .push((name.to_string(), parent_id.to_string()));
        Ok(format!("g{}", calls.next_group))
    }
}

#[async_trait]
impl LeafCreationPort for FakeRemote {
    async fn create_leaf(&self, spec: &LeafSpec, parent_id: &str) -> Result<String, RemoteError> {
        let mut calls = self.calls.lock().unwrap();
        calls.leaf_attempts += 1;
        if self.failing_leaves.contains(&spec.name) {
            return Err(RemoteError::api(400, format!("cannot create connection {}", spec.name)));
        }
        calls.next_leaf += 1;
        calls
            .created_leaves
            .push((spec.name.clone(), parent_id.to_string()));
        Ok(format!("c{}", calls.next_leaf))
    }
}
