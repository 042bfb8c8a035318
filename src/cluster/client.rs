//! Cluster Client
//!
//! Main client for talking to the cluster, combining the base URL with the
//! HTTP layer, plus the endpoint builders used by the provisioning engine.

use super::http::{ClusterHttpClient, ClusterResponse, Payload};
use crate::error::Result;
use crate::resource::naming::path_segment;
use reqwest::Method;
use std::time::Duration;
use url::Url;

/// Main cluster client
#[derive(Clone)]
pub struct ClusterClient {
    pub http: ClusterHttpClient,
    base_url: String,
}

impl ClusterClient {
    /// Create a new cluster client for the given base URL
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let parsed = Url::parse(base_url).map_err(crate::error::ProvisionError::from)?;
        if parsed.cannot_be_a_base() {
            return Err(anyhow::anyhow!("Cluster url must be absolute: {}", base_url));
        }

        let http = ClusterHttpClient::new(timeout)?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for an API path (which starts with `/`)
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<ClusterResponse> {
        self.http.send(Method::GET, &self.url(path), None).await
    }

    pub async fn head(&self, path: &str) -> Result<ClusterResponse> {
        self.http.send(Method::HEAD, &self.url(path), None).await
    }

    pub async fn put(&self, path: &str, payload: Option<Payload<'_>>) -> Result<ClusterResponse> {
        self.http.send(Method::PUT, &self.url(path), payload).await
    }

    pub async fn post(&self, path: &str, payload: Option<Payload<'_>>) -> Result<ClusterResponse> {
        self.http.send(Method::POST, &self.url(path), payload).await
    }

    pub async fn delete(&self, path: &str) -> Result<ClusterResponse> {
        self.http.send(Method::DELETE, &self.url(path), None).await
    }
}

// =========================================================================
// Template and policy endpoints
// =========================================================================

/// `/_ilm/policy/{name}`
pub fn lifecycle_policy_path(name: &str) -> String {
    format!("/_ilm/policy/{}", path_segment(name))
}

/// `/_component_template/{name}`
pub fn component_template_path(name: &str) -> String {
    format!("/_component_template/{}", path_segment(name))
}

/// `/_index_template/{name}`
pub fn index_template_path(name: &str) -> String {
    format!("/_index_template/{}", path_segment(name))
}

/// `/_template/{name}` (legacy templates)
pub fn legacy_template_path(name: &str) -> String {
    format!("/_template/{}", path_segment(name))
}

/// `/_ingest/pipeline/{name}`
pub fn pipeline_path(name: &str) -> String {
    format!("/_ingest/pipeline/{}", path_segment(name))
}

// =========================================================================
// Index endpoints
// =========================================================================

/// `/{index}`, with date-math expressions percent-encoded as one segment
pub fn index_path(index: &str) -> String {
    format!("/{}", path_segment(index))
}

/// `/{index}/_settings`
pub fn index_settings_path(index: &str) -> String {
    format!("{}/_settings", index_path(index))
}

/// `/{index}/_mapping`
pub fn index_mapping_path(index: &str) -> String {
    format!("{}/_mapping", index_path(index))
}

/// `/_aliases`
pub fn aliases_path() -> String {
    "/_aliases".to_string()
}

// =========================================================================
// Document endpoints
// =========================================================================

/// `/{index}/_bulk`, or `/_bulk` when no index is given
pub fn bulk_path(index: Option<&str>) -> String {
    match index {
        Some(index) => format!("{}/_bulk", index_path(index)),
        None => "/_bulk".to_string(),
    }
}

/// `/{index}/_doc`
pub fn document_path(index: &str) -> String {
    format!("{}/_doc", index_path(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = ClusterClient::new("http://localhost:9200/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9200");
        assert_eq!(client.url("/_aliases"), "http://localhost:9200/_aliases");
    }

    #[test]
    fn test_new_keeps_path_prefix() {
        let client = ClusterClient::new("https://proxy.example.com/es/", None).unwrap();
        assert_eq!(client.url("/twitter"), "https://proxy.example.com/es/twitter");
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(ClusterClient::new("not a url", None).is_err());
    }

    #[test]
    fn test_template_paths() {
        assert_eq!(lifecycle_policy_path("hot-warm"), "/_ilm/policy/hot-warm");
        assert_eq!(component_template_path("component1"), "/_component_template/component1");
        assert_eq!(index_template_path("template_1"), "/_index_template/template_1");
        assert_eq!(legacy_template_path("twitter_template"), "/_template/twitter_template");
        assert_eq!(pipeline_path("twitter_pipeline"), "/_ingest/pipeline/twitter_pipeline");
    }

    #[test]
    fn test_index_paths_encode_date_math() {
        assert_eq!(index_path("twitter"), "/twitter");
        assert_eq!(
            index_path("<my-index-{now/d}>"),
            "/%3Cmy-index-%7Bnow%2Fd%7D%3E"
        );
        // Already encoded names are not double encoded
        assert_eq!(
            index_path("%3Cmy-index-%7Bnow%2Fd%7D%3E"),
            "/%3Cmy-index-%7Bnow%2Fd%7D%3E"
        );
        assert_eq!(index_settings_path("twitter"), "/twitter/_settings");
        assert_eq!(index_mapping_path("twitter"), "/twitter/_mapping");
    }

    #[test]
    fn test_document_paths() {
        assert_eq!(bulk_path(Some("twitter")), "/twitter/_bulk");
        assert_eq!(bulk_path(None), "/_bulk");
        assert_eq!(document_path("twitter"), "/twitter/_doc");
        assert_eq!(aliases_path(), "/_aliases");
    }
}
