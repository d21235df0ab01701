//! Remote Hierarchy Collaborators
//!
//! The reconciliation core never talks HTTP itself. It consumes the remote
//! hierarchy through five narrow ports:
//!
//! - [`Authenticator`] - establish a session
//! - [`GroupLister`] / [`LeafLister`] - snapshot the existing groups and connections
//! - [`GroupCreationPort`] / [`LeafCreationPort`] - create what is missing
//!
//! [`GuacamoleClient`] implements all of them against the Guacamole REST API;
//! tests substitute recording fakes.
//!
//! All calls are awaited one at a time by the import loop. Implementations
//! must be `Send + Sync` so the client can sit behind an `Arc`.

mod error;
mod guacamole;

pub use error::RemoteError;
pub use guacamole::GuacamoleClient;

use crate::models::{LeafSpec, SnapshotRecord};
use async_trait::async_trait;

/// Establishes a session with the remote
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<(), RemoteError>;
}

/// Lists every existing group (the root itself excluded), in no particular order
#[async_trait]
pub trait GroupLister: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<SnapshotRecord>, RemoteError>;
}

/// Lists every existing connection, in no particular order
#[async_trait]
pub trait LeafLister: Send + Sync {
    async fn list_leaves(&self) -> Result<Vec<SnapshotRecord>, RemoteError>;
}

/// Creates one group under an existing parent
#[async_trait]
pub trait GroupCreationPort: Send + Sync {
    /// Returns the identifier the remote assigned to the new group
    async fn create_group(&self, name: &str, parent_id: &str) -> Result<String, RemoteError>;
}

/// Creates one connection under an existing group
#[async_trait]
pub trait LeafCreationPort: Send + Sync {
    /// Returns the identifier the remote assigned to the new connection
    async fn create_leaf(&self, spec: &LeafSpec, parent_id: &str) -> Result<String, RemoteError>;
}

/// Everything the import orchestrator needs from the remote
pub trait RemoteHierarchy:
    Authenticator + GroupLister + LeafLister + GroupCreationPort + LeafCreationPort
{
}

impl<T> RemoteHierarchy for T where
    T: Authenticator + GroupLister + LeafLister + GroupCreationPort + LeafCreationPort
{
}
