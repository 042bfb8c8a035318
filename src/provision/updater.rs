//! Generic resource updater
//!
//! One state machine for every kind, driven by its [`KindDescriptor`](crate::resource::KindDescriptor):
//!
//! ```text
//! Unknown --probe--> Absent  --create-----------------> Created
//!                    Present --force: delete, create--> Replaced
//!                    Present --no force---------------> Skipped
//! ```
//!
//! Kinds without a probe (aliases, seed data) and index settings/mapping
//! updates are sent unconditionally and end as `Applied`.

use crate::cluster::client;
use crate::cluster::http::{sanitize_for_log, ClusterResponse, Payload};
use crate::cluster::ClusterClient;
use crate::error::{ProvisionError, Result};
use crate::resource::naming::normalize;
use crate::resource::{ExistenceStrategy, ForcePolicy, IndexUpdate, ResourceKind};
use serde::Serialize;
use std::fmt;

/// Final state of one resource in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Did not exist and was created
    Created,
    /// Already existed and was left alone
    Skipped,
    /// Already existed and was deleted then created again (force)
    Replaced,
    /// Sent without an existence check
    Applied,
}

impl Outcome {
    /// Whether the resource was (re)created during this run
    pub fn is_created(&self) -> bool {
        matches!(self, Outcome::Created | Outcome::Replaced)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Created => "created",
            Outcome::Skipped => "skipped",
            Outcome::Replaced => "replaced",
            Outcome::Applied => "applied",
        };
        f.write_str(s)
    }
}

/// Applies resources of any kind to the cluster
pub struct Updater<'a> {
    client: &'a ClusterClient,
}

impl<'a> Updater<'a> {
    pub fn new(client: &'a ClusterClient) -> Self {
        Self { client }
    }

    /// Create the resource when absent; with `force`, replace it when present
    pub async fn reconcile(
        &self,
        kind: ResourceKind,
        name: &str,
        content: Option<&str>,
        force: bool,
    ) -> Result<Outcome> {
        let descriptor = kind.descriptor();

        if descriptor.force == ForcePolicy::AlwaysApply {
            let payload = content.map(Payload::Json);
            let response = self.client.post(&descriptor.endpoint(name), payload).await?;
            check(kind, name, &response)?;
            return Ok(Outcome::Applied);
        }

        if !self.exists(kind, name).await? {
            tracing::debug!("{} [{}] doesn't exist. Creating it.", kind, name);
            self.create(kind, name, content).await?;
            tracing::info!("Created {} [{}]", kind, name);
            return Ok(Outcome::Created);
        }

        if !force {
            tracing::debug!("{} [{}] already exists.", kind, name);
            return Ok(Outcome::Skipped);
        }

        match descriptor.force {
            ForcePolicy::DropDataThenCreate => tracing::warn!(
                "{} [{}] already exists but force is set. Removing it with all its data!",
                kind,
                name
            ),
            _ => tracing::debug!(
                "{} [{}] already exists but force is set. Removing it.",
                kind,
                name
            ),
        }
        self.delete(kind, name).await?;
        self.create(kind, name, content).await?;
        tracing::info!("Replaced {} [{}]", kind, name);

        Ok(Outcome::Replaced)
    }

    /// Probe the cluster for the resource, using the kind's existence strategy
    pub async fn exists(&self, kind: ResourceKind, name: &str) -> Result<bool> {
        let descriptor = kind.descriptor();
        let Some(strategy) = descriptor.existence else {
            return Ok(false);
        };

        let response = match strategy {
            ExistenceStrategy::HeadStatus => self.client.head(&descriptor.endpoint(name)).await?,
            ExistenceStrategy::GetUnlessNotFound => {
                self.client.get(&descriptor.endpoint(name)).await?
            }
            ExistenceStrategy::GetPattern => {
                // A literal GET on a date-math name only finds today's index
                let pattern = normalize(name);
                tracing::trace!("Checking index [{}] with pattern [{}]", name, pattern);
                self.client.get(&client::index_path(&pattern)).await?
            }
        };

        if response.is_not_found() {
            return Ok(false);
        }
        if !response.is_success() {
            return Err(reject(kind, name, &response));
        }

        Ok(match strategy {
            ExistenceStrategy::HeadStatus => true,
            ExistenceStrategy::GetUnlessNotFound => !response.body.trim().is_empty(),
            ExistenceStrategy::GetPattern => response.has_payload(),
        })
    }

    /// Apply an index settings or mapping update, whatever `force` says
    pub async fn apply_update(
        &self,
        update: IndexUpdate,
        index: &str,
        content: &str,
    ) -> Result<Outcome> {
        tracing::debug!("Applying {} to index [{}]", update, index);
        let response = self
            .client
            .put(&update.endpoint(index), Some(Payload::Json(content)))
            .await?;
        check(ResourceKind::Index, index, &response)?;
        tracing::info!("Applied {} to index [{}]", update, index);

        Ok(Outcome::Applied)
    }

    /// Send a seed data file to an index (or to the cluster when `index` is empty)
    pub async fn submit(
        &self,
        kind: ResourceKind,
        index: &str,
        name: &str,
        payload: Payload<'_>,
    ) -> Result<Outcome> {
        let endpoint = kind.descriptor().endpoint(index);
        let response = self.client.post(&endpoint, Some(payload)).await?;
        check(kind, name, &response)?;

        if let Some(failed) = bulk_failures(&response) {
            tracing::warn!(
                "{} [{}]: {} item(s) were rejected by the cluster",
                kind,
                name,
                failed
            );
        }
        tracing::info!("Loaded {} [{}]", kind, name);

        Ok(Outcome::Applied)
    }

    async fn create(&self, kind: ResourceKind, name: &str, content: Option<&str>) -> Result<()> {
        let endpoint = kind.descriptor().endpoint(name);
        let response = self.client.put(&endpoint, content.map(Payload::Json)).await?;
        check(kind, name, &response)
    }

    async fn delete(&self, kind: ResourceKind, name: &str) -> Result<()> {
        let endpoint = kind.descriptor().endpoint(name);
        let response = self.client.delete(&endpoint).await?;
        if response.is_success() || response.is_not_found() {
            return Ok(());
        }
        Err(reject(kind, name, &response))
    }
}

/// Fail on non-success statuses and on `acknowledged: false`
fn check(kind: ResourceKind, name: &str, response: &ClusterResponse) -> Result<()> {
    if !response.is_success() {
        return Err(reject(kind, name, response));
    }
    if !response.is_acknowledged() {
        tracing::error!("{} [{}] was not acknowledged", kind, name);
        return Err(ProvisionError::NotAcknowledged {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn reject(kind: ResourceKind, name: &str, response: &ClusterResponse) -> ProvisionError {
    tracing::error!(
        "Could not apply {} [{}]: {} - {}",
        kind,
        name,
        response.status,
        sanitize_for_log(&response.body)
    );
    ProvisionError::rejected(kind, name, response.status.as_u16(), &response.body)
}

/// Number of failed items in a bulk response that reports `errors: true`
fn bulk_failures(response: &ClusterResponse) -> Option<usize> {
    let json = response.json()?;
    if !json.get("errors")?.as_bool()? {
        return None;
    }
    let failed = json
        .get("items")
        .and_then(|items| items.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_object()?.values().next())
                .filter(|action| action.get("error").is_some())
                .count()
        })
        .unwrap_or(0);
    Some(failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn response(status: u16, body: &str) -> ClusterResponse {
        ClusterResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_check_accepts_acknowledged_success() {
        assert!(check(ResourceKind::IndexTemplate, "t", &response(200, r#"{"acknowledged":true}"#)).is_ok());
        assert!(check(ResourceKind::JsonData, "d", &response(201, r#"{"result":"created"}"#)).is_ok());
    }

    #[test]
    fn test_check_rejects_error_status() {
        let err = check(ResourceKind::Index, "twitter", &response(400, "{}")).unwrap_err();
        assert!(matches!(err, ProvisionError::Rejected { status: 400, .. }));
    }

    #[test]
    fn test_check_rejects_unacknowledged() {
        let err = check(
            ResourceKind::ComponentTemplate,
            "component1",
            &response(200, r#"{"acknowledged":false}"#),
        )
        .unwrap_err();
        assert!(matches!(err, ProvisionError::NotAcknowledged { .. }));
    }

    #[test]
    fn test_bulk_failures() {
        assert_eq!(bulk_failures(&response(200, r#"{"errors":false,"items":[]}"#)), None);
        assert_eq!(
            bulk_failures(&response(
                200,
                r#"{"errors":true,"items":[{"index":{"status":201}},{"index":{"status":400,"error":{"type":"x"}}}]}"#
            )),
            Some(1)
        );
        assert_eq!(bulk_failures(&response(200, "")), None);
    }

    #[test]
    fn test_outcome_is_created() {
        assert!(Outcome::Created.is_created());
        assert!(Outcome::Replaced.is_created());
        assert!(!Outcome::Skipped.is_created());
        assert!(!Outcome::Applied.is_created());
    }
}
