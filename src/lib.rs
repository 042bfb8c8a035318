//! esbootstrap
//!
//! Provisions an Elasticsearch cluster from a resource tree: index lifecycle
//! policies, component and index templates, legacy templates, ingest
//! pipelines, indices with their settings and mappings, aliases and seed data.
//!
//! # Module Structure
//!
//! - [`resource`] - Resource tree access, naming and kind registry
//! - [`cluster`] - HTTP access to the cluster
//! - [`provision`] - Orchestrator, generic updater and data seeding
//! - [`config`] - User configuration and run options
//! - [`error`] - Error types

pub mod cluster;
pub mod config;
pub mod error;
pub mod provision;
pub mod resource;

pub use cluster::ClusterClient;
pub use config::{Config, Layout, ProvisionOptions};
pub use error::{ProvisionError, Result};
pub use provision::{Outcome, ProvisionReport, Provisioner};
pub use resource::{ArchiveSource, DirectorySource, ResourceKind, ResourceSource};
