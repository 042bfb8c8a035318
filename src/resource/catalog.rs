//! Resource Catalog
//!
//! Maps a root namespace and a resource kind to the sorted list of resource
//! names found in the tree. Names are recomputed on every call.

use super::registry::ResourceKind;
use super::source::{join_path, ResourceSource, SourceEntry};
use crate::config::Layout;
use crate::error::Result;

/// Name lookups over one root of a resource source
pub struct Catalog<'a> {
    source: &'a dyn ResourceSource,
    root: &'a str,
    layout: &'a Layout,
}

impl<'a> Catalog<'a> {
    pub fn new(source: &'a dyn ResourceSource, root: &'a str, layout: &'a Layout) -> Self {
        Self {
            source,
            root,
            layout,
        }
    }

    pub fn root(&self) -> &str {
        self.root
    }

    /// Names of the resources of `kind`, sorted lexicographically
    ///
    /// - one-file-per-resource kinds: file names without the `.json` extension
    /// - indices: first-level directories of the root, minus reserved names
    /// - aliases: the aliases file name, when present
    /// - bulk data: root-level bulk files (index bulk files are looked up per index)
    /// - json data: always empty, json documents only exist below an index
    pub fn list_names(&self, kind: ResourceKind) -> Result<Vec<String>> {
        match kind {
            ResourceKind::Index => self.index_names(),
            ResourceKind::AliasSet => Ok(self
                .aliases_file()?
                .map(|_| vec![self.layout.aliases_file.clone()])
                .unwrap_or_default()),
            ResourceKind::BulkData => self.bulk_files(None),
            ResourceKind::JsonData => Ok(Vec::new()),
            named => {
                let Some(dir) = self.layout.kind_dir(named) else {
                    return Ok(Vec::new());
                };
                let prefix = join_path(&[self.root, dir]);
                tracing::debug!("Looking for {} resources under [{}]", named, prefix);

                let ext = &self.layout.json_extension;
                let names = self
                    .source
                    .list(&prefix)?
                    .into_iter()
                    .filter(|e| !e.is_dir)
                    .filter_map(|e| e.name.strip_suffix(ext.as_str()).map(|n| n.to_string()))
                    .filter(|n| !n.is_empty())
                    .collect();
                Ok(names)
            }
        }
    }

    /// Index names: first-level directories of the root that are not reserved
    pub fn index_names(&self) -> Result<Vec<String>> {
        tracing::debug!("Looking for indices under [{}]", self.root);
        let reserved = self.layout.reserved_names();

        let names = self
            .source
            .list(self.root)?
            .into_iter()
            .filter(|e| e.is_dir && !reserved.contains(&e.name.as_str()))
            .map(|e| e.name)
            .collect();
        Ok(names)
    }

    /// Seed files with the given extension, sorted by file name
    ///
    /// Looks under `<root>/<index>/_data/`, or `<root>/_data/` without index.
    pub fn data_files(&self, index: Option<&str>, extension: &str) -> Result<Vec<String>> {
        let prefix = self.data_dir(index);
        tracing::debug!("Looking for [{}] files under [{}]", extension, prefix);

        let files = self
            .source
            .list(&prefix)?
            .into_iter()
            .filter(|e: &SourceEntry| !e.is_dir && e.name.ends_with(extension))
            .map(|e| e.name)
            .collect();
        Ok(files)
    }

    /// Bulk seed files of an index (or of the root), sorted by file name
    pub fn bulk_files(&self, index: Option<&str>) -> Result<Vec<String>> {
        self.data_files(index, &self.layout.bulk_extension)
    }

    /// Single-document seed files of an index, bulk files excluded
    pub fn document_files(&self, index: &str) -> Result<Vec<String>> {
        let bulk = self.layout.bulk_extension.as_str();
        Ok(self
            .data_files(Some(index), &self.layout.json_extension)?
            .into_iter()
            .filter(|f| !f.ends_with(bulk))
            .collect())
    }

    // =========================================================================
    // Paths
    // =========================================================================

    /// `<root>/<kind dir>/<name>.json`
    pub fn resource_path(&self, kind: ResourceKind, name: &str) -> Option<String> {
        let dir = self.layout.kind_dir(kind)?;
        let file = format!("{}{}", name, self.layout.json_extension);
        Some(join_path(&[self.root, dir, &file]))
    }

    /// `<root>/<index>/<file>`
    pub fn index_file_path(&self, index: &str, file: &str) -> String {
        join_path(&[self.root, index, file])
    }

    /// `<root>/<index>/_data` or `<root>/_data`
    pub fn data_dir(&self, index: Option<&str>) -> String {
        join_path(&[self.root, index.unwrap_or(""), &self.layout.data_dir])
    }

    /// `<root>/<index>/_data/<file>` or `<root>/_data/<file>`
    pub fn data_file_path(&self, index: Option<&str>, file: &str) -> String {
        join_path(&[&self.data_dir(index), file])
    }

    /// `<root>/_aliases.json`
    pub fn aliases_path(&self) -> String {
        join_path(&[self.root, &self.layout.aliases_file])
    }

    /// The aliases file entry, when the root has one
    fn aliases_file(&self) -> Result<Option<SourceEntry>> {
        Ok(self
            .source
            .list(self.root)?
            .into_iter()
            .find(|e| !e.is_dir && e.name == self.layout.aliases_file))
    }
}
