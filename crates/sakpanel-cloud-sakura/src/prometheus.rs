//! Prometheus query client for a Monitoring Suite metrics storage
//!
//! Authenticated with a storage access key as a bearer token. Every response
//! envelope must report `status: "success"`, even on HTTP 200.

use crate::transport::{Auth, HttpBackend, ensure_scheme, join_url};
use reqwest::Method;
use sakpanel_cloud::view::de;
use sakpanel_cloud::{BackendKind, CloudError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Per-request timeout for Prometheus queries
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

const PUBLISHER_LABEL: &str = "sakuracloud_publisher";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrometheusLabel {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRangeParams {
    pub query: String,
    /// Unix seconds
    pub start: i64,
    /// Unix seconds
    pub end: i64,
    /// Duration string such as `15s`
    pub step: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRangeData {
    #[serde(default, deserialize_with = "de::null_default")]
    pub result_type: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub result: Vec<MatrixSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixSeries {
    #[serde(default, deserialize_with = "de::null_default")]
    pub metric: BTreeMap<String, String>,
    /// `[unix_seconds, "value"]` pairs
    #[serde(default, deserialize_with = "de::null_default")]
    pub values: Vec<(f64, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRangeResponse {
    pub status: String,
    pub data: QueryRangeData,
}

/// Prefix `https://` unless the endpoint already names a scheme.
pub fn normalize_endpoint(endpoint: &str) -> String {
    ensure_scheme(endpoint)
}

#[derive(Debug, Clone)]
pub struct PrometheusClient {
    http: HttpBackend,
    endpoint: String,
}

impl PrometheusClient {
    pub fn new(http: reqwest::Client, endpoint: &str, token: impl Into<String>) -> Self {
        Self {
            http: HttpBackend::new(http, BackendKind::Monitoring, Auth::Bearer(token.into())),
            endpoint: normalize_endpoint(endpoint),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// All metric names
    pub async fn labels(&self) -> Result<Vec<PrometheusLabel>> {
        let names: Vec<String> = self.query("label/__name__/values", &[]).await?;
        Ok(names
            .into_iter()
            .map(|name| PrometheusLabel { name })
            .collect())
    }

    pub async fn query_range(&self, params: &QueryRangeParams) -> Result<QueryRangeResponse> {
        let query = [
            ("query", params.query.clone()),
            ("start", params.start.to_string()),
            ("end", params.end.to_string()),
            ("step", params.step.clone()),
        ];
        let data: QueryRangeData = self.query("query_range", &query).await?;
        Ok(QueryRangeResponse {
            status: "success".to_string(),
            data,
        })
    }

    /// Values of the `sakuracloud_publisher` label
    pub async fn publishers(&self) -> Result<Vec<String>> {
        self.query(&format!("label/{}/values", PUBLISHER_LABEL), &[])
            .await
    }

    /// Metric names emitted by one publisher
    pub async fn metrics_by_publisher(&self, publisher: &str) -> Result<Vec<String>> {
        let selector = format!(
            "{{{}=\"{}\"}}",
            PUBLISHER_LABEL,
            publisher.replace('\\', "\\\\").replace('"', "\\\"")
        );
        self.query("label/__name__/values", &[("match[]", selector)])
            .await
    }

    async fn query<T: DeserializeOwned + Default>(&self, api: &str, query: &[(&str, String)]) -> Result<T> {
        let url = join_url(&self.endpoint, &format!("prometheus/api/v1/{}", api));
        let request = self
            .http
            .request(Method::GET, &url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(QUERY_TIMEOUT)
            .query(query);
        let envelope: Envelope<T> = self.http.json(request).await?;
        envelope.into_data()
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    #[serde(default, deserialize_with = "de::null_default")]
    status: String,
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

impl<T: Default> Envelope<T> {
    fn into_data(self) -> Result<T> {
        if self.status != "success" {
            let message = match self.error.filter(|e| !e.is_empty()) {
                Some(error) => format!("Prometheus query failed with status {}: {}", self.status, error),
                None => format!("Prometheus query failed with status: {}", self.status),
            };
            return Err(CloudError::backend(BackendKind::Monitoring, Some(200), message));
        }
        Ok(self.data.unwrap_or_default())
    }
}
