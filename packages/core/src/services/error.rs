//! Service Layer Error Types
//!
//! Errors raised while reconciling an import. Two scopes exist:
//!
//! - **Fatal**: the run cannot proceed (authentication, snapshot listing, misuse
//!   of the orchestrator). The run is aborted and no row is imported.
//! - **Row-scoped**: one row could not be imported. The orchestrator logs it,
//!   counts it as failed and moves on to the next row.

use crate::models::{PathError, TreeError};
use crate::remote::RemoteError;
use thiserror::Error;

/// Import errors
#[derive(Error, Debug)]
pub enum ImportError {
    /// Authentication with the remote failed
    #[error("Authentication failed: {0}")]
    Authentication(#[source] RemoteError),

    /// Listing existing groups or connections failed
    #[error("Failed to load remote snapshot: {0}")]
    SnapshotLoad(#[source] RemoteError),

    /// The orchestrator was driven out of order
    #[error("Invalid import state: {0}")]
    InvalidState(String),

    /// The site path of a row is empty or has an empty segment
    #[error("Malformed site path: {0}")]
    MalformedPath(#[from] PathError),

    /// Creating one group segment failed
    #[error("Failed to create group '{segment}' under {parent_id}: {source}")]
    GroupCreation {
        segment: String,
        parent_id: String,
        #[source]
        source: RemoteError,
    },

    /// Creating a connection failed
    #[error("Failed to create connection '{name}' under {parent_id}: {source}")]
    LeafCreation {
        name: String,
        parent_id: String,
        #[source]
        source: RemoteError,
    },

    /// A created object could not be recorded in the in-memory tree
    #[error("Hierarchy constraint violated: {0}")]
    Hierarchy(#[from] TreeError),
}

impl ImportError {
    /// Create a group creation error
    pub fn group_creation(
        segment: impl Into<String>,
        parent_id: impl Into<String>,
        source: RemoteError,
    ) -> Self {
        Self::GroupCreation {
            segment: segment.into(),
            parent_id: parent_id.into(),
            source,
        }
    }

    /// Create a leaf creation error
    pub fn leaf_creation(
        name: impl Into<String>,
        parent_id: impl Into<String>,
        source: RemoteError,
    ) -> Self {
        Self::LeafCreation {
            name: name.into(),
            parent_id: parent_id.into(),
            source,
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Whether this error aborts the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Authentication(_) | Self::SnapshotLoad(_) | Self::InvalidState(_)
        )
    }
}
