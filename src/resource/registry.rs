//! Resource kind registry
//!
//! Every kind of resource the provisioner knows about, with the strategy
//! used to probe it and the way `force` applies to it. The updater is
//! generic over this table instead of carrying per-kind code.

use crate::cluster::client;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of resources found in a resource tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    LifecyclePolicy,
    ComponentTemplate,
    IndexTemplate,
    LegacyTemplate,
    IngestPipeline,
    Index,
    AliasSet,
    BulkData,
    JsonData,
}

impl ResourceKind {
    /// All kinds, in the order they are provisioned
    pub const ALL: [ResourceKind; 9] = [
        ResourceKind::LifecyclePolicy,
        ResourceKind::ComponentTemplate,
        ResourceKind::IndexTemplate,
        ResourceKind::LegacyTemplate,
        ResourceKind::IngestPipeline,
        ResourceKind::Index,
        ResourceKind::AliasSet,
        ResourceKind::BulkData,
        ResourceKind::JsonData,
    ];

    /// Kinds stored as one `<name>.json` file per resource in their own directory
    pub const NAMED: [ResourceKind; 5] = [
        ResourceKind::LifecyclePolicy,
        ResourceKind::ComponentTemplate,
        ResourceKind::IndexTemplate,
        ResourceKind::LegacyTemplate,
        ResourceKind::IngestPipeline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::LifecyclePolicy => "lifecycle policy",
            ResourceKind::ComponentTemplate => "component template",
            ResourceKind::IndexTemplate => "index template",
            ResourceKind::LegacyTemplate => "legacy template",
            ResourceKind::IngestPipeline => "ingest pipeline",
            ResourceKind::Index => "index",
            ResourceKind::AliasSet => "alias set",
            ResourceKind::BulkData => "bulk data",
            ResourceKind::JsonData => "json data",
        }
    }

    /// Plural heading used in listings and summaries
    pub fn heading(&self) -> &'static str {
        match self {
            ResourceKind::LifecyclePolicy => "Lifecycle policies",
            ResourceKind::ComponentTemplate => "Component templates",
            ResourceKind::IndexTemplate => "Index templates",
            ResourceKind::LegacyTemplate => "Legacy templates",
            ResourceKind::IngestPipeline => "Ingest pipelines",
            ResourceKind::Index => "Indices",
            ResourceKind::AliasSet => "Aliases",
            ResourceKind::BulkData => "Bulk data",
            ResourceKind::JsonData => "Json documents",
        }
    }

    /// Descriptor driving the updater for this kind
    pub fn descriptor(&self) -> KindDescriptor {
        use ExistenceStrategy::*;
        use ForcePolicy::*;

        let (existence, force, endpoint): (Option<ExistenceStrategy>, ForcePolicy, fn(&str) -> String) =
            match self {
                ResourceKind::LifecyclePolicy => {
                    (Some(GetUnlessNotFound), DeleteThenCreate, client::lifecycle_policy_path)
                }
                ResourceKind::ComponentTemplate => {
                    (Some(HeadStatus), DeleteThenCreate, client::component_template_path)
                }
                ResourceKind::IndexTemplate => {
                    (Some(HeadStatus), DeleteThenCreate, client::index_template_path)
                }
                ResourceKind::LegacyTemplate => {
                    (Some(HeadStatus), DeleteThenCreate, client::legacy_template_path)
                }
                ResourceKind::IngestPipeline => {
                    (Some(GetUnlessNotFound), DeleteThenCreate, client::pipeline_path)
                }
                ResourceKind::Index => (Some(GetPattern), DropDataThenCreate, client::index_path),
                ResourceKind::AliasSet => (None, AlwaysApply, aliases_endpoint),
                ResourceKind::BulkData => (None, AlwaysApply, bulk_endpoint),
                ResourceKind::JsonData => (None, AlwaysApply, client::document_path),
            };

        KindDescriptor {
            kind: *self,
            existence,
            force,
            endpoint,
        }
    }
}

fn aliases_endpoint(_: &str) -> String {
    client::aliases_path()
}

/// An empty index name targets the cluster-wide bulk endpoint
fn bulk_endpoint(index: &str) -> String {
    client::bulk_path(Some(index).filter(|i| !i.is_empty()))
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the cluster is asked whether a resource exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistenceStrategy {
    /// `HEAD`: 200 means present, 404 means absent
    HeadStatus,
    /// `GET`: a 2xx answer with a payload means present, 404 means absent
    GetUnlessNotFound,
    /// `GET` on the normalized wildcard pattern: anything but `{}` or 404 means present
    GetPattern,
}

/// What `force` does to a resource that already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcePolicy {
    /// Delete the definition, then create it again
    DeleteThenCreate,
    /// Delete the index with all of its documents, then create it again
    DropDataThenCreate,
    /// No existence check: the resource is sent on every run
    AlwaysApply,
}

/// Per-kind behavior of the generic updater
#[derive(Clone, Copy)]
pub struct KindDescriptor {
    pub kind: ResourceKind,
    pub existence: Option<ExistenceStrategy>,
    pub force: ForcePolicy,
    /// API path for a resource name
    pub endpoint: fn(&str) -> String,
}

impl KindDescriptor {
    pub fn endpoint(&self, name: &str) -> String {
        (self.endpoint)(name)
    }
}

impl fmt::Debug for KindDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindDescriptor")
            .field("kind", &self.kind)
            .field("existence", &self.existence)
            .field("force", &self.force)
            .finish()
    }
}

/// Incremental changes applied to an existing index on every run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexUpdate {
    Settings,
    Mapping,
}

impl IndexUpdate {
    pub fn endpoint(&self, index: &str) -> String {
        match self {
            IndexUpdate::Settings => client::index_settings_path(index),
            IndexUpdate::Mapping => client::index_mapping_path(index),
        }
    }
}

impl fmt::Display for IndexUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexUpdate::Settings => f.write_str("settings update"),
            IndexUpdate::Mapping => f.write_str("mapping update"),
        }
    }
}
