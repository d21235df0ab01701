//! Guacamole Import Core
//!
//! This crate reconciles a flat list of desired connections, each addressed by
//! a slash-separated site path, against the connection group hierarchy of an
//! Apache Guacamole server. Only what is missing gets created.
//!
//! # Architecture
//!
//! - **Arena tree**: groups live in a flat map keyed by identifier, parents are
//!   referenced by identifier and every group has a full-path index entry
//! - **Fixpoint snapshot load**: the remote lists groups in any order; records
//!   are attached in repeated passes until nothing changes
//! - **Ports**: the services only see narrow async traits, the HTTP client is
//!   one implementation of them
//! - **Row isolation**: a failing row is counted and skipped, never fatal
//!
//! # Modules
//!
//! - [`models`] - Group tree, site paths and flat records
//! - [`services`] - Tree builder, path resolver, leaf reconciler, import orchestrator
//! - [`remote`] - Remote ports and the Guacamole REST client
//! - [`input`] - Connection CSV reader
//! - [`config`] - Client and importer configuration

pub mod config;
pub mod input;
pub mod models;
pub mod remote;
pub mod services;

// Re-export commonly used types
pub use config::{ConfigError, GuacamoleConfig, ImportSettings, ImporterConfig};
pub use input::{read_rows, InputError, ParsedCsv};
pub use models::*;
pub use remote::{GuacamoleClient, RemoteError, RemoteHierarchy};
pub use services::*;
