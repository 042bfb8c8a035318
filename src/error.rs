//! Error types for provisioning runs
//!
//! Absence is never an error here: a missing resource tree, kind directory or
//! settings file is reported as an empty list or `None` by the resource layer.
//! Everything below aborts the run at the first occurrence.

use crate::resource::ResourceKind;
use std::io;
use std::path::PathBuf;

/// Result type alias for provisioning operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Errors that stop a provisioning run
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The cluster answered a write or probe with an unexpected status
    #[error("{kind} [{name}] rejected by the cluster: {status} {reason}")]
    Rejected {
        kind: ResourceKind,
        name: String,
        status: u16,
        reason: String,
    },

    /// The cluster accepted the call but answered `acknowledged: false`
    #[error("{kind} [{name}] was not acknowledged by the cluster")]
    NotAcknowledged { kind: ResourceKind, name: String },

    /// Connectivity or protocol failure below HTTP status level
    #[error("{method} {path} failed: {source}")]
    Transport {
        method: String,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Reading the resource tree failed for a reason other than absence
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The resource archive is unreadable
    #[error("cannot read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The cluster base URL does not parse
    #[error("invalid cluster url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ProvisionError {
    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a rejection error from a status code and response body
    pub fn rejected(kind: ResourceKind, name: &str, status: u16, body: &str) -> Self {
        Self::Rejected {
            kind,
            name: name.to_string(),
            status,
            reason: crate::cluster::http::error_reason(body),
        }
    }

    /// Kind and name of the resource the error is about, when there is one
    pub fn resource(&self) -> Option<(ResourceKind, &str)> {
        match self {
            Self::Rejected { kind, name, .. } | Self::NotAcknowledged { kind, name } => {
                Some((*kind, name.as_str()))
            }
            _ => None,
        }
    }
}
