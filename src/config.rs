//! Configuration Management
//!
//! Connection defaults persisted in the user config directory, and the
//! immutable values a provisioning run is parameterized with.

use crate::resource::ResourceKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default cluster URL
pub const DEFAULT_URL: &str = "http://localhost:9200";

/// Default root namespace of the resource tree
pub const DEFAULT_ROOT: &str = "elasticsearch";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Cluster base URL
    #[serde(default)]
    pub url: Option<String>,
    /// Root namespace inside the resource source
    #[serde(default)]
    pub root: Option<String>,
    /// Directory holding the resource tree
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Zip archive holding the resource tree (wins over `dir`)
    #[serde(default)]
    pub archive: Option<PathBuf>,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Naming convention overrides
    #[serde(default)]
    pub layout: Option<Layout>,
}

impl Config {
    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("esbootstrap").join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config file {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Cannot read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Get effective cluster URL (CLI > config > default)
    pub fn effective_url(&self, cli: Option<&str>) -> String {
        cli.map(|s| s.to_string())
            .or_else(|| self.url.clone())
            .unwrap_or_else(|| DEFAULT_URL.to_string())
    }

    /// Get effective root namespace (CLI > config > default)
    pub fn effective_root(&self, cli: Option<&str>) -> String {
        cli.map(|s| s.to_string())
            .or_else(|| self.root.clone())
            .unwrap_or_else(|| DEFAULT_ROOT.to_string())
    }

    /// Get effective layout (config overrides > default)
    pub fn effective_layout(&self) -> Layout {
        self.layout.clone().unwrap_or_default()
    }
}

/// Naming conventions of a resource tree
///
/// ```text
/// <root>/
///   _index_lifecycles/<policy>.json
///   _component_templates/<template>.json
///   _index_templates/<template>.json
///   _template/<template>.json            (legacy)
///   _pipelines/<pipeline>.json
///   _aliases.json
///   _data/*.ndjson                       (replayed on every run)
///   <index>/_settings.json
///   <index>/_update_settings.json
///   <index>/_update_mapping.json
///   <index>/_data/*.ndjson, *.json       (replayed when the index is created)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub lifecycle_policies_dir: String,
    pub component_templates_dir: String,
    pub index_templates_dir: String,
    pub legacy_templates_dir: String,
    pub pipelines_dir: String,
    pub index_settings_file: String,
    pub update_settings_file: String,
    pub update_mapping_file: String,
    pub aliases_file: String,
    pub data_dir: String,
    pub json_extension: String,
    pub bulk_extension: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            lifecycle_policies_dir: "_index_lifecycles".to_string(),
            component_templates_dir: "_component_templates".to_string(),
            index_templates_dir: "_index_templates".to_string(),
            legacy_templates_dir: "_template".to_string(),
            pipelines_dir: "_pipelines".to_string(),
            index_settings_file: "_settings.json".to_string(),
            update_settings_file: "_update_settings.json".to_string(),
            update_mapping_file: "_update_mapping.json".to_string(),
            aliases_file: "_aliases.json".to_string(),
            data_dir: "_data".to_string(),
            json_extension: ".json".to_string(),
            bulk_extension: ".ndjson".to_string(),
        }
    }
}

impl Layout {
    /// Directory holding one file per resource, for kinds stored that way
    pub fn kind_dir(&self, kind: ResourceKind) -> Option<&str> {
        match kind {
            ResourceKind::LifecyclePolicy => Some(self.lifecycle_policies_dir.as_str()),
            ResourceKind::ComponentTemplate => Some(self.component_templates_dir.as_str()),
            ResourceKind::IndexTemplate => Some(self.index_templates_dir.as_str()),
            ResourceKind::LegacyTemplate => Some(self.legacy_templates_dir.as_str()),
            ResourceKind::IngestPipeline => Some(self.pipelines_dir.as_str()),
            ResourceKind::Index
            | ResourceKind::AliasSet
            | ResourceKind::BulkData
            | ResourceKind::JsonData => None,
        }
    }

    /// Top-level entries of a root that are never index names
    pub fn reserved_names(&self) -> [&str; 7] {
        [
            self.lifecycle_policies_dir.as_str(),
            self.component_templates_dir.as_str(),
            self.index_templates_dir.as_str(),
            self.legacy_templates_dir.as_str(),
            self.pipelines_dir.as_str(),
            self.aliases_file.as_str(),
            self.data_dir.as_str(),
        ]
    }
}

/// Immutable parameters of a provisioning run
#[derive(Debug, Clone)]
pub struct ProvisionOptions {
    /// Root namespace inside the resource source
    pub root: String,
    /// Naming conventions
    pub layout: Layout,
    /// Variables available to `${NAME}` placeholders
    pub environment: HashMap<String, String>,
}

impl ProvisionOptions {
    /// Options for a root, with the default layout and the process environment
    pub fn new(root: &str) -> Self {
        Self {
            root: root.trim_matches('/').to_string(),
            layout: Layout::default(),
            environment: std::env::vars().collect(),
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = environment;
        self
    }
}

impl Default for ProvisionOptions {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_values_precedence() {
        let config = Config {
            url: Some("http://es:9200".to_string()),
            ..Default::default()
        };
        assert_eq!(config.effective_url(Some("http://cli:9200")), "http://cli:9200");
        assert_eq!(config.effective_url(None), "http://es:9200");
        assert_eq!(Config::default().effective_url(None), DEFAULT_URL);
        assert_eq!(config.effective_root(None), DEFAULT_ROOT);
    }

    #[test]
    fn test_load_from_missing_file_gives_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/esbootstrap/config.json"));
        assert!(config.url.is_none());
        assert!(config.root.is_none());
    }

    #[test]
    fn test_load_from_file_with_partial_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"url": "http://es:9200", "root": "models/app", "layout": {"data_dir": "_seed"}}"#,
        )
        .unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.url.as_deref(), Some("http://es:9200"));
        assert_eq!(config.effective_root(None), "models/app");

        let layout = config.effective_layout();
        assert_eq!(layout.data_dir, "_seed");
        assert_eq!(layout.index_settings_file, "_settings.json");
    }

    #[test]
    fn test_load_from_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).url.is_none());
    }

    #[test]
    fn test_layout_kind_dirs() {
        let layout = Layout::default();
        assert_eq!(layout.kind_dir(ResourceKind::ComponentTemplate), Some("_component_templates"));
        assert_eq!(layout.kind_dir(ResourceKind::LegacyTemplate), Some("_template"));
        assert_eq!(layout.kind_dir(ResourceKind::Index), None);
        assert!(layout.reserved_names().contains(&"_aliases.json"));
        assert!(layout.reserved_names().contains(&"_data"));
    }

    #[test]
    fn test_provision_options_trim_root() {
        let options = ProvisionOptions::new("/models/app/");
        assert_eq!(options.root, "models/app");
    }
}
