//! Provisioning engine
//!
//! Brings a cluster in line with a resource tree, one kind after the other,
//! in dependency order:
//!
//! 1. index lifecycle policies
//! 2. component templates
//! 3. index templates
//! 4. legacy templates
//! 5. ingest pipelines
//! 6. indices, then their settings and mapping updates
//! 7. aliases
//! 8. seed data
//!
//! The first failure stops the run. Resources applied before it stay applied.
//!
//! # Module Structure
//!
//! - [`updater`] - Generic probe / create / replace state machine
//! - [`seed`] - Bulk and single document loading
//! - [`report`] - Outcome of every resource touched by a run
//!
//! # Example
//!
//! ```ignore
//! use esbootstrap::cluster::ClusterClient;
//! use esbootstrap::config::ProvisionOptions;
//! use esbootstrap::provision::Provisioner;
//! use esbootstrap::resource::DirectorySource;
//!
//! let client = ClusterClient::new("http://localhost:9200", None)?;
//! let provisioner = Provisioner::new(
//!     client,
//!     DirectorySource::new("src/main/resources"),
//!     ProvisionOptions::default(),
//! );
//! let report = provisioner.provision(false).await?;
//! println!("{}", report);
//! ```

pub mod report;
pub mod seed;
pub mod updater;

pub use report::{ProvisionReport, ReportEntry};
pub use updater::{Outcome, Updater};

use crate::cluster::ClusterClient;
use crate::config::ProvisionOptions;
use crate::error::Result;
use crate::resource::{Catalog, ContentReader, IndexUpdate, ResourceKind, ResourceSource};
use seed::Seeder;

/// State of a single provisioning run
#[derive(Debug, Default)]
pub struct RunContext {
    /// Replace existing resources (destroys index data)
    pub force: bool,
    /// Indices created or recreated so far, in creation order
    pub created_indices: Vec<String>,
    report: ProvisionReport,
}

impl RunContext {
    pub fn new(force: bool) -> Self {
        Self {
            force,
            ..Default::default()
        }
    }

    fn record(&mut self, kind: ResourceKind, name: &str, outcome: Outcome) {
        if kind == ResourceKind::Index && outcome.is_created() {
            self.created_indices.push(name.to_string());
        }
        self.report.record(kind, name, outcome);
    }

    pub fn into_report(self) -> ProvisionReport {
        self.report
    }
}

/// Applies one resource root to one cluster
pub struct Provisioner {
    client: ClusterClient,
    source: Box<dyn ResourceSource>,
    options: ProvisionOptions,
}

impl Provisioner {
    pub fn new(
        client: ClusterClient,
        source: impl ResourceSource + 'static,
        options: ProvisionOptions,
    ) -> Self {
        Self {
            client,
            source: Box::new(source),
            options,
        }
    }

    pub fn client(&self) -> &ClusterClient {
        &self.client
    }

    pub fn options(&self) -> &ProvisionOptions {
        &self.options
    }

    /// Name lookups over the configured root
    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(
            self.source.as_ref(),
            &self.options.root,
            &self.options.layout,
        )
    }

    fn reader(&self) -> ContentReader<'_> {
        ContentReader::new(self.source.as_ref(), &self.options.environment)
    }

    /// Apply every resource of the root
    ///
    /// Without `force`, existing resources are left untouched and the run is
    /// idempotent (root-level bulk files aside). With `force`, existing
    /// resources are deleted and created again, index data included.
    pub async fn provision(&self, force: bool) -> Result<ProvisionReport> {
        tracing::info!(
            "Provisioning [{}] from {} into {} (force: {})",
            self.options.root,
            self.source.describe(),
            self.client.base_url(),
            force
        );

        let mut ctx = RunContext::new(force);
        let catalog = self.catalog();
        let reader = self.reader();
        let updater = Updater::new(&self.client);

        for kind in ResourceKind::NAMED {
            self.apply_named(kind, &catalog, &reader, &updater, &mut ctx)
                .await?;
        }
        self.apply_indices(&catalog, &reader, &updater, &mut ctx)
            .await?;
        self.apply_aliases(&catalog, &reader, &updater, &mut ctx)
            .await?;

        let seeder = Seeder::new(&updater, &catalog, &reader);
        for index in ctx.created_indices.clone() {
            seeder.seed_index(&index, &mut ctx.report).await?;
        }
        seeder.seed_root(&mut ctx.report).await?;

        let report = ctx.into_report();
        tracing::info!(
            "Provisioning of [{}] done: {} created, {} replaced, {} skipped, {} applied",
            self.options.root,
            report.count(Outcome::Created),
            report.count(Outcome::Replaced),
            report.count(Outcome::Skipped),
            report.count(Outcome::Applied)
        );

        Ok(report)
    }

    // =========================================================================
    // Steps
    // =========================================================================

    /// Lifecycle policies, templates and pipelines: one file per resource
    async fn apply_named(
        &self,
        kind: ResourceKind,
        catalog: &Catalog<'_>,
        reader: &ContentReader<'_>,
        updater: &Updater<'_>,
        ctx: &mut RunContext,
    ) -> Result<()> {
        let names = catalog.list_names(kind)?;
        if names.is_empty() {
            tracing::debug!("No {} to apply", kind.heading());
            return Ok(());
        }
        if kind == ResourceKind::LegacyTemplate {
            tracing::warn!(
                "Legacy templates are deprecated, consider moving {:?} to index templates",
                names
            );
        }

        for name in &names {
            let Some(path) = catalog.resource_path(kind, name) else {
                continue;
            };
            let Some(content) = reader.read(&path)? else {
                tracing::warn!("{} [{}] has no content at [{}], skipping it", kind, name, path);
                continue;
            };
            let outcome = updater
                .reconcile(kind, name, Some(&content), ctx.force)
                .await?;
            ctx.record(kind, name, outcome);
        }

        Ok(())
    }

    /// Create missing indices, then push their settings and mapping updates
    async fn apply_indices(
        &self,
        catalog: &Catalog<'_>,
        reader: &ContentReader<'_>,
        updater: &Updater<'_>,
        ctx: &mut RunContext,
    ) -> Result<()> {
        let layout = &self.options.layout;

        for index in catalog.index_names()? {
            let settings = reader.read(&catalog.index_file_path(&index, &layout.index_settings_file))?;
            let outcome = updater
                .reconcile(ResourceKind::Index, &index, settings.as_deref(), ctx.force)
                .await?;
            ctx.record(ResourceKind::Index, &index, outcome);

            for (update, file) in [
                (IndexUpdate::Settings, &layout.update_settings_file),
                (IndexUpdate::Mapping, &layout.update_mapping_file),
            ] {
                let path = catalog.index_file_path(&index, file);
                if let Some(content) = reader.read(&path)? {
                    let outcome = updater.apply_update(update, &index, &content).await?;
                    ctx.record(ResourceKind::Index, &index, outcome);
                }
            }
        }

        Ok(())
    }

    async fn apply_aliases(
        &self,
        catalog: &Catalog<'_>,
        reader: &ContentReader<'_>,
        updater: &Updater<'_>,
        ctx: &mut RunContext,
    ) -> Result<()> {
        let Some(content) = reader.read(&catalog.aliases_path())? else {
            tracing::debug!("No aliases to apply");
            return Ok(());
        };

        let name = &self.options.layout.aliases_file;
        let outcome = updater
            .reconcile(ResourceKind::AliasSet, name, Some(&content), ctx.force)
            .await?;
        ctx.record(ResourceKind::AliasSet, name, outcome);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_context_tracks_created_indices_only() {
        let mut ctx = RunContext::new(true);
        ctx.record(ResourceKind::Index, "twitter", Outcome::Created);
        ctx.record(ResourceKind::Index, "person", Outcome::Skipped);
        ctx.record(ResourceKind::Index, "logs", Outcome::Replaced);
        ctx.record(ResourceKind::Index, "twitter", Outcome::Applied);
        ctx.record(ResourceKind::IndexTemplate, "twitter", Outcome::Created);

        assert!(ctx.force);
        assert_eq!(ctx.created_indices, vec!["twitter", "logs"]);
        assert_eq!(ctx.into_report().entries.len(), 5);
    }
}
