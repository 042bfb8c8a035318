//! Resource abstraction layer
//!
//! Everything about the resource tree itself, independent of the cluster.
//!
//! # Architecture
//!
//! - [`source`] - Lists and reads entries of a directory or zip archive
//! - [`catalog`] - Derives sorted resource names per kind from a source
//! - [`content`] - Loads resource files with `${VAR}` interpolation
//! - [`naming`] - Normalizes date-math and rollover index names
//! - [`registry`] - Resource kinds and their updater descriptors
//!
//! # Example
//!
//! ```ignore
//! use esbootstrap::config::Layout;
//! use esbootstrap::resource::{Catalog, DirectorySource, ResourceKind};
//!
//! let source = DirectorySource::new("src/main/resources");
//! let layout = Layout::default();
//! let catalog = Catalog::new(&source, "elasticsearch", &layout);
//! let templates = catalog.list_names(ResourceKind::IndexTemplate)?;
//! ```

pub mod catalog;
pub mod content;
pub mod naming;
pub mod registry;
pub mod source;

pub use catalog::Catalog;
pub use content::{interpolate, ContentReader};
pub use naming::normalize;
pub use registry::{ExistenceStrategy, ForcePolicy, IndexUpdate, KindDescriptor, ResourceKind};
pub use source::{ArchiveSource, DirectorySource, ResourceSource, SourceEntry};
