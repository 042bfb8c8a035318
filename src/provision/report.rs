//! Run report
//!
//! What a provisioning run did, resource by resource, in the order it was
//! done.

use super::updater::Outcome;
use crate::resource::ResourceKind;
use serde::Serialize;
use std::fmt;

/// One applied resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub kind: ResourceKind,
    pub name: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisionReport {
    pub entries: Vec<ReportEntry>,
}

impl ProvisionReport {
    pub fn record(&mut self, kind: ResourceKind, name: &str, outcome: Outcome) {
        self.entries.push(ReportEntry {
            kind,
            name: name.to_string(),
            outcome,
        });
    }

    /// Number of entries with the given outcome
    pub fn count(&self, outcome: Outcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }

    pub fn entries_for(&self, kind: ResourceKind) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Names of the indices created (or recreated) by the run
    pub fn created_indices(&self) -> Vec<&str> {
        self.entries_for(ResourceKind::Index)
            .filter(|e| e.outcome.is_created())
            .map(|e| e.name.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ProvisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{:<10} {:<20} {}", entry.outcome, entry.kind, entry.name)?;
        }
        write!(
            f,
            "{} created, {} replaced, {} skipped, {} applied",
            self.count(Outcome::Created),
            self.count(Outcome::Replaced),
            self.count(Outcome::Skipped),
            self.count(Outcome::Applied)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_created_indices() {
        let mut report = ProvisionReport::default();
        report.record(ResourceKind::IndexTemplate, "template_1", Outcome::Created);
        report.record(ResourceKind::Index, "twitter", Outcome::Created);
        report.record(ResourceKind::Index, "person", Outcome::Skipped);
        report.record(ResourceKind::Index, "logs", Outcome::Replaced);
        report.record(ResourceKind::Index, "twitter", Outcome::Applied);

        assert_eq!(report.count(Outcome::Created), 2);
        assert_eq!(report.count(Outcome::Skipped), 1);
        assert_eq!(report.created_indices(), vec!["twitter", "logs"]);
        assert_eq!(report.entries_for(ResourceKind::Index).count(), 4);
    }

    #[test]
    fn test_display_summary_line() {
        let mut report = ProvisionReport::default();
        assert!(report.is_empty());
        report.record(ResourceKind::AliasSet, "_aliases.json", Outcome::Applied);

        let text = report.to_string();
        assert!(text.contains("_aliases.json"));
        assert!(text.ends_with("0 created, 0 replaced, 0 skipped, 1 applied"));
    }
}
