//! Metrics query pipeline
//!
//! A Prometheus query against a metrics storage takes three calls that must
//! run in order: look up the storage endpoint, pick an access key, then query
//! the endpoint with that key as a bearer token.
//!
//! ```ignore
//! let ctx = StorageStep::new(&monitoring, "42")
//!     .resolve()
//!     .await?
//!     .select_key()
//!     .await?;
//! let labels = ctx.into_client(http).labels().await?;
//! ```

use sakpanel_cloud::{BackendKind, CloudError, Result};
use sakpanel_cloud_sakura::{MonitoringClient, PrometheusClient};
use std::fmt;

/// Step 1: storage to resolve
pub struct StorageStep<'a> {
    monitoring: &'a MonitoringClient,
    storage_id: String,
}

impl<'a> StorageStep<'a> {
    pub fn new(monitoring: &'a MonitoringClient, storage_id: impl Into<String>) -> Self {
        Self {
            monitoring,
            storage_id: storage_id.into(),
        }
    }

    pub async fn resolve(self) -> Result<ResolvedStorage<'a>> {
        let storage = self.monitoring.metrics_storage(&self.storage_id).await?;
        if storage.endpoint.trim().is_empty() {
            return Err(CloudError::backend(
                BackendKind::Monitoring,
                None,
                format!("metrics storage {} has no endpoint", self.storage_id),
            ));
        }
        tracing::debug!("Resolved metrics storage {}", self.storage_id);
        Ok(ResolvedStorage {
            monitoring: self.monitoring,
            storage_id: self.storage_id,
            endpoint: storage.endpoint,
        })
    }
}

/// Step 2: storage with a known endpoint
pub struct ResolvedStorage<'a> {
    monitoring: &'a MonitoringClient,
    storage_id: String,
    endpoint: String,
}

impl ResolvedStorage<'_> {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The first key in upstream order wins.
    pub async fn select_key(self) -> Result<MetricsQueryContext> {
        let keys = self.monitoring.metrics_access_keys(&self.storage_id).await?;
        let key = keys.into_iter().next().ok_or(CloudError::NoAccessKey {
            storage_id: self.storage_id,
        })?;
        Ok(MetricsQueryContext {
            endpoint: self.endpoint,
            token: key.token,
        })
    }
}

/// Step 3: everything a Prometheus query needs
pub struct MetricsQueryContext {
    pub endpoint: String,
    pub token: String,
}

impl fmt::Debug for MetricsQueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsQueryContext")
            .field("endpoint", &self.endpoint)
            .field("token", &"***")
            .finish()
    }
}

impl MetricsQueryContext {
    pub fn into_client(self, http: reqwest::Client) -> PrometheusClient {
        PrometheusClient::new(http, &self.endpoint, self.token)
    }
}

/// Run the first two steps for `storage_id`.
pub async fn query_context(
    monitoring: &MonitoringClient,
    storage_id: &str,
) -> Result<MetricsQueryContext> {
    StorageStep::new(monitoring, storage_id)
        .resolve()
        .await?
        .select_key()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_debug_hides_token() {
        let ctx = MetricsQueryContext {
            endpoint: "https://metrics.example".to_string(),
            token: "prom-token".to_string(),
        };
        let debug = format!("{:?}", ctx);
        assert!(debug.contains("metrics.example"));
        assert!(!debug.contains("prom-token"));
    }

    #[test]
    fn test_context_normalizes_endpoint() {
        let ctx = MetricsQueryContext {
            endpoint: "metrics.example:9090".to_string(),
            token: "t".to_string(),
        };
        let client = ctx.into_client(reqwest::Client::new());
        assert_eq!(client.endpoint(), "https://metrics.example:9090");
    }
}
