//! Resource sources
//!
//! A resource tree lives either in a plain directory or inside a zip
//! archive shipped with the application. Both are exposed through
//! [`ResourceSource`], which only knows about `/`-separated relative paths.

use crate::error::{ProvisionError, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One first-level entry below a listed prefix
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceEntry {
    pub name: String,
    pub is_dir: bool,
}

impl SourceEntry {
    pub fn file(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_dir: false,
        }
    }

    pub fn dir(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_dir: true,
        }
    }
}

/// Read access to a resource tree
pub trait ResourceSource: Send + Sync {
    /// First-level entries under `prefix`, sorted by name, without duplicates
    ///
    /// A missing prefix is an empty listing, not an error. Hidden entries
    /// (leading `.`) are skipped.
    fn list(&self, prefix: &str) -> Result<Vec<SourceEntry>>;

    /// Raw content of the file at `path`, `None` when there is no such file
    fn read(&self, path: &str) -> Result<Option<String>>;

    /// Where the tree comes from, for logs
    fn describe(&self) -> String;
}

impl<T: ResourceSource + ?Sized> ResourceSource for Box<T> {
    fn list(&self, prefix: &str) -> Result<Vec<SourceEntry>> {
        (**self).list(prefix)
    }

    fn read(&self, path: &str) -> Result<Option<String>> {
        (**self).read(path)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Join `/`-separated path parts, ignoring empty ones
pub fn join_path(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Collapse entries into a sorted map; a name seen as a directory stays a directory
fn collect_entries(entries: impl IntoIterator<Item = SourceEntry>) -> Vec<SourceEntry> {
    let mut merged: BTreeMap<String, bool> = BTreeMap::new();
    for entry in entries {
        if entry.name.is_empty() || entry.name.starts_with('.') {
            continue;
        }
        *merged.entry(entry.name).or_insert(false) |= entry.is_dir;
    }

    merged
        .into_iter()
        .map(|(name, is_dir)| SourceEntry { name, is_dir })
        .collect()
}

// =========================================================================
// Directory source
// =========================================================================

/// Resource tree stored in a directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    base: PathBuf,
}

impl DirectorySource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|p| !p.is_empty())
            .fold(self.base.clone(), |acc, part| acc.join(part))
    }
}

impl ResourceSource for DirectorySource {
    fn list(&self, prefix: &str) -> Result<Vec<SourceEntry>> {
        let dir = self.resolve(prefix);
        if !dir.is_dir() {
            tracing::trace!("No directory at {:?}", dir);
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry.map_err(|e| ProvisionError::io(&dir, io::Error::from(e)))?;
            let Some(name) = entry.file_name().to_str() else {
                tracing::warn!("Skipping non UTF-8 entry {:?}", entry.path());
                continue;
            };
            entries.push(SourceEntry {
                name: name.to_string(),
                is_dir: entry.file_type().is_dir(),
            });
        }

        Ok(collect_entries(entries))
    }

    fn read(&self, path: &str) -> Result<Option<String>> {
        let file = self.resolve(path);
        if !file.is_file() {
            return Ok(None);
        }

        match std::fs::read_to_string(&file) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ProvisionError::io(file, e)),
        }
    }

    fn describe(&self) -> String {
        format!("directory {}", self.base.display())
    }
}

// =========================================================================
// Archive source
// =========================================================================

/// Resource tree stored in a zip archive (jar files included)
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    path: PathBuf,
    names: Vec<String>,
}

impl ArchiveSource {
    /// Open an archive and index its entry names
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let archive = Self::open_archive(&path)?;
        let names = archive
            .file_names()
            .map(|n| n.trim_start_matches("./").to_string())
            .collect();

        Ok(Self { path, names })
    }

    fn open_archive(path: &Path) -> Result<zip::ZipArchive<File>> {
        let file = File::open(path).map_err(|e| ProvisionError::io(path, e))?;
        zip::ZipArchive::new(file).map_err(|source| ProvisionError::Archive {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ResourceSource for ArchiveSource {
    fn list(&self, prefix: &str) -> Result<Vec<SourceEntry>> {
        let prefix = match join_path(&[prefix]) {
            p if p.is_empty() => p,
            p => format!("{}/", p),
        };

        let entries = self.names.iter().filter_map(|name| {
            let rest = name.strip_prefix(&prefix)?;
            match rest.split_once('/') {
                // "dir/" or "dir/file": the first segment is a directory
                Some((dir, _)) => Some(SourceEntry::dir(dir)),
                None => Some(SourceEntry::file(rest)),
            }
        });

        Ok(collect_entries(entries))
    }

    fn read(&self, path: &str) -> Result<Option<String>> {
        let path = join_path(&[path]);
        let Some(name) = self
            .names
            .iter()
            .find(|n| n.as_str() == path && !n.ends_with('/'))
        else {
            return Ok(None);
        };

        let mut archive = Self::open_archive(&self.path)?;
        let mut entry = match archive.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(source) => {
                return Err(ProvisionError::Archive {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .map_err(|e| ProvisionError::io(self.path.join(&path), e))?;

        Ok(Some(content))
    }

    fn describe(&self) -> String {
        format!("archive {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(base: &Path, rel: &str, content: &str) {
        let path = base.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn zip_with(entries: &[(&str, &str)]) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut zip = zip::ZipWriter::new(file.reopen().unwrap());
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, content) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, options).unwrap();
            } else {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
        }
        zip.finish().unwrap();
        file
    }

    #[test]
    fn test_join_path_skips_empty_parts() {
        assert_eq!(join_path(&["elasticsearch", "", "twitter"]), "elasticsearch/twitter");
        assert_eq!(join_path(&["/a/", "b/"]), "a/b");
        assert_eq!(join_path(&["", ""]), "");
    }

    #[test]
    fn test_directory_list_is_sorted_and_typed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "es/twitter/_settings.json", "{}");
        write(dir.path(), "es/_aliases.json", "{}");
        write(dir.path(), "es/.hidden", "");
        write(dir.path(), "es/person/_settings.json", "{}");

        let source = DirectorySource::new(dir.path());
        let entries = source.list("es").unwrap();
        assert_eq!(
            entries,
            vec![
                SourceEntry::file("_aliases.json"),
                SourceEntry::dir("person"),
                SourceEntry::dir("twitter"),
            ]
        );
    }

    #[test]
    fn test_directory_missing_prefix_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path());
        assert!(source.list("nothing/here").unwrap().is_empty());
        assert_eq!(source.read("nothing/here.json").unwrap(), None);
    }

    #[test]
    fn test_directory_read() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "es/twitter/_settings.json", r#"{"settings":{}}"#);

        let source = DirectorySource::new(dir.path());
        assert_eq!(
            source.read("es/twitter/_settings.json").unwrap().as_deref(),
            Some(r#"{"settings":{}}"#)
        );
        // A directory is not a readable resource
        assert_eq!(source.read("es/twitter").unwrap(), None);
    }

    #[test]
    fn test_archive_list_collapses_file_and_directory_entries() {
        let archive = zip_with(&[
            ("es/", ""),
            ("es/twitter/", ""),
            ("es/twitter/_settings.json", "{}"),
            ("es/twitter/_data/_bulk.ndjson", "{}"),
            ("es/_index_templates/template_1.json", "{}"),
            ("es/_aliases.json", "{}"),
            ("other/ignored.json", "{}"),
        ]);

        let source = ArchiveSource::open(archive.path()).unwrap();
        assert_eq!(
            source.list("es").unwrap(),
            vec![
                SourceEntry::file("_aliases.json"),
                SourceEntry::dir("_index_templates"),
                SourceEntry::dir("twitter"),
            ]
        );
        assert_eq!(
            source.list("es/twitter/").unwrap(),
            vec![SourceEntry::dir("_data"), SourceEntry::file("_settings.json")]
        );
        assert!(source.list("missing").unwrap().is_empty());
    }

    #[test]
    fn test_archive_read() {
        let archive = zip_with(&[("es/_pipelines/p1.json", r#"{"processors":[]}"#)]);
        let source = ArchiveSource::open(archive.path()).unwrap();

        assert_eq!(
            source.read("es/_pipelines/p1.json").unwrap().as_deref(),
            Some(r#"{"processors":[]}"#)
        );
        assert_eq!(source.read("es/_pipelines/p2.json").unwrap(), None);
    }

    #[test]
    fn test_archive_open_rejects_non_zip() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "not a zip").unwrap();
        assert!(matches!(
            ArchiveSource::open(file.path()),
            Err(ProvisionError::Archive { .. })
        ));
    }
}
