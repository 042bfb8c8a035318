//! Data seeding
//!
//! Seed files live in `_data` directories:
//!
//! - `<root>/<index>/_data/*.ndjson` bulk files and `*.json` documents are
//!   loaded only into indices created during the current run
//! - `<root>/_data/*.ndjson` bulk files are sent to `/_bulk` on every run
//!
//! Files are sent as stored, without variable interpolation, in name order.

use super::report::ProvisionReport;
use super::updater::Updater;
use crate::cluster::http::Payload;
use crate::error::Result;
use crate::resource::source::join_path;
use crate::resource::{Catalog, ContentReader, ResourceKind};

/// Loads seed files through an [`Updater`]
pub struct Seeder<'a> {
    updater: &'a Updater<'a>,
    catalog: &'a Catalog<'a>,
    reader: &'a ContentReader<'a>,
}

impl<'a> Seeder<'a> {
    pub fn new(
        updater: &'a Updater<'a>,
        catalog: &'a Catalog<'a>,
        reader: &'a ContentReader<'a>,
    ) -> Self {
        Self {
            updater,
            catalog,
            reader,
        }
    }

    /// Bulk files first, then json documents, for one freshly created index
    pub async fn seed_index(&self, index: &str, report: &mut ProvisionReport) -> Result<()> {
        let bulk_files = self.catalog.bulk_files(Some(index))?;
        for file in &bulk_files {
            self.send(ResourceKind::BulkData, Some(index), file, report)
                .await?;
        }

        let json_files = self.catalog.document_files(index)?;
        for file in &json_files {
            self.send(ResourceKind::JsonData, Some(index), file, report)
                .await?;
        }

        if bulk_files.is_empty() && json_files.is_empty() {
            tracing::debug!("No seed data for index [{}]", index);
        }
        Ok(())
    }

    /// Root-level bulk files, replayed on every run
    pub async fn seed_root(&self, report: &mut ProvisionReport) -> Result<()> {
        let files = self.catalog.list_names(ResourceKind::BulkData)?;
        if !files.is_empty() {
            tracing::info!(
                "Replaying {} root bulk file(s) from [{}]",
                files.len(),
                self.catalog.data_dir(None)
            );
        }
        for file in &files {
            self.send(ResourceKind::BulkData, None, file, report).await?;
        }
        Ok(())
    }

    async fn send(
        &self,
        kind: ResourceKind,
        index: Option<&str>,
        file: &str,
        report: &mut ProvisionReport,
    ) -> Result<()> {
        let path = self.catalog.data_file_path(index, file);
        let Some(content) = self.reader.read_raw(&path)? else {
            tracing::warn!("Seed file [{}] disappeared, skipping it", path);
            return Ok(());
        };

        let name = join_path(&[index.unwrap_or(""), file]);
        let payload = match kind {
            ResourceKind::BulkData => Payload::NdJson(&content),
            _ => Payload::Json(&content),
        };
        let outcome = self
            .updater
            .submit(kind, index.unwrap_or(""), &name, payload)
            .await?;
        report.record(kind, &name, outcome);

        Ok(())
    }
}
