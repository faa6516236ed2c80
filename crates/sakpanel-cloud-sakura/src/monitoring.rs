//! Monitoring Suite control API
//!
//! Log, metrics and trace storages plus their routings, and the metrics
//! storage detail and access keys the Prometheus query pipeline starts from.

use crate::transport::{Auth, Credentials, HttpBackend, join_url};
use reqwest::Method;
use sakpanel_cloud::view::de;
use sakpanel_cloud::{BackendKind, CloudError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Upper bound on pages followed for one list call
const MAX_PAGES: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingInfo {
    pub id: String,
    pub uid: String,
    /// `publisher_code (variant)`
    pub name: String,
}

/// A log, metrics or trace storage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub routings: Vec<RoutingInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsStorageDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Prometheus endpoint, possibly without a scheme
    pub endpoint: String,
}

#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsAccessKey {
    pub id: String,
    pub uid: String,
    pub token: String,
    pub description: String,
}

impl fmt::Debug for MetricsAccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsAccessKey")
            .field("id", &self.id)
            .field("uid", &self.uid)
            .field("token", &"***")
            .field("description", &self.description)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum StorageKind {
    Logs,
    Metrics,
    Traces,
}

impl StorageKind {
    fn as_str(self) -> &'static str {
        match self {
            StorageKind::Logs => "logs",
            StorageKind::Metrics => "metrics",
            StorageKind::Traces => "traces",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitoringClient {
    http: HttpBackend,
    base: String,
}

impl MonitoringClient {
    pub fn new(http: reqwest::Client, base: impl Into<String>, creds: &Credentials) -> Self {
        Self {
            http: HttpBackend::new(http, BackendKind::Monitoring, Auth::basic(creds)),
            base: base.into(),
        }
    }

    pub async fn logs(&self) -> Result<Vec<StorageInfo>> {
        self.storages_with_routings(StorageKind::Logs).await
    }

    pub async fn metrics(&self) -> Result<Vec<StorageInfo>> {
        self.storages_with_routings(StorageKind::Metrics).await
    }

    /// Trace storages carry no routings
    pub async fn traces(&self) -> Result<Vec<StorageInfo>> {
        let storages: Vec<ApiStorage> = self.list_all("traces/storages/").await?;
        Ok(storages
            .into_iter()
            .map(|s| s.into_info(Vec::new()))
            .collect())
    }

    pub async fn metrics_storage(&self, storage_id: &str) -> Result<MetricsStorageDetail> {
        let id = storage_id_arg(storage_id)?;
        let url = join_url(&self.base, &format!("metrics/storages/{}/", id));
        let storage: ApiMetricsStorage = self.http.get_json(&url).await?;
        Ok(MetricsStorageDetail {
            id: storage.id,
            name: storage.name,
            description: storage.description,
            endpoint: storage.endpoints.map(|e| e.address).unwrap_or_default(),
        })
    }

    /// Access keys in upstream order
    pub async fn metrics_access_keys(&self, storage_id: &str) -> Result<Vec<MetricsAccessKey>> {
        let id = storage_id_arg(storage_id)?;
        let keys: Vec<ApiAccessKey> = self
            .list_all(&format!("metrics/storages/{}/keys/", id))
            .await?;
        Ok(keys
            .into_iter()
            .map(|k| MetricsAccessKey {
                id: k.id,
                uid: k.uid,
                token: k.token,
                description: k.description,
            })
            .collect())
    }

    async fn storages_with_routings(&self, kind: StorageKind) -> Result<Vec<StorageInfo>> {
        let storages: Vec<ApiStorage> = self
            .list_all(&format!("{}/storages/", kind.as_str()))
            .await?;

        // Storages are still listed when routings cannot be fetched.
        let routings: Vec<ApiRouting> = match self
            .list_all(&format!("{}/routings/", kind.as_str()))
            .await
        {
            Ok(routings) => routings,
            Err(e) => {
                tracing::debug!("Listing {} routings failed: {}", kind.as_str(), e);
                Vec::new()
            }
        };

        let mut by_storage = group_routings(routings, kind);
        Ok(storages
            .into_iter()
            .map(|s| {
                let routings = by_storage.remove(&s.id).unwrap_or_default();
                s.into_info(routings)
            })
            .collect())
    }

    /// Follow `?page=N` until the upstream stops returning `next`.
    async fn list_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = join_url(&self.base, path);
        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            let mut request = self.http.request(Method::GET, &url);
            if page > 1 {
                request = request.query(&[("page", page)]);
            }
            let result: Paginated<T> = self.http.json(request).await?;
            items.extend(result.results);

            if result.next.as_deref().is_none_or(str::is_empty) {
                break;
            }
            if page >= MAX_PAGES {
                tracing::warn!(
                    "Stopped listing {} after {} pages; the result is incomplete",
                    path,
                    MAX_PAGES
                );
                break;
            }
            page += 1;
        }
        Ok(items)
    }
}

fn group_routings(routings: Vec<ApiRouting>, kind: StorageKind) -> HashMap<String, Vec<RoutingInfo>> {
    let mut map: HashMap<String, Vec<RoutingInfo>> = HashMap::new();
    for routing in routings {
        let storage = match kind {
            StorageKind::Logs => routing.log_storage.as_ref(),
            StorageKind::Metrics => routing.metrics_storage.as_ref(),
            StorageKind::Traces => None,
        };
        let Some(storage) = storage else {
            continue;
        };
        map.entry(storage.id.clone())
            .or_default()
            .push(RoutingInfo {
                id: routing.id,
                uid: routing.uid,
                name: format!("{} ({})", routing.publisher_code, routing.variant),
            });
    }
    map
}

/// Storage IDs are integers upstream
fn storage_id_arg(storage_id: &str) -> Result<i64> {
    storage_id
        .trim()
        .parse::<i64>()
        .map_err(|_| CloudError::invalid_id("storage ID", storage_id))
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Paginated<T> {
    #[serde(default = "Vec::new", deserialize_with = "de::null_default")]
    results: Vec<T>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiStorage {
    #[serde(default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    description: String,
}

impl ApiStorage {
    fn into_info(self, routings: Vec<RoutingInfo>) -> StorageInfo {
        StorageInfo {
            id: self.id,
            name: self.name,
            description: self.description,
            routings,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiRouting {
    #[serde(default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    uid: String,
    #[serde(default, deserialize_with = "de::null_default")]
    publisher_code: String,
    #[serde(default, deserialize_with = "de::null_default")]
    variant: String,
    #[serde(default)]
    log_storage: Option<ApiStorageRef>,
    #[serde(default)]
    metrics_storage: Option<ApiStorageRef>,
}

#[derive(Debug, Deserialize)]
struct ApiStorageRef {
    #[serde(default, deserialize_with = "de::string_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiMetricsStorage {
    #[serde(default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    description: String,
    #[serde(default)]
    endpoints: Option<ApiEndpoints>,
}

#[derive(Debug, Deserialize)]
struct ApiEndpoints {
    #[serde(default, deserialize_with = "de::null_default")]
    address: String,
}

#[derive(Debug, Deserialize)]
struct ApiAccessKey {
    #[serde(default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    uid: String,
    #[serde(default, deserialize_with = "de::null_default")]
    token: String,
    #[serde(default, deserialize_with = "de::null_default")]
    description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routing(id: i64, storage_key: &str, storage_id: i64) -> ApiRouting {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "uid": format!("uid-{}", id),
            "publisher_code": "apprun",
            "variant": "default",
            storage_key: {"id": storage_id},
        }))
        .unwrap()
    }

    #[test]
    fn test_group_routings_by_storage() {
        let routings = vec![
            routing(1, "metrics_storage", 10),
            routing(2, "metrics_storage", 10),
            routing(3, "metrics_storage", 20),
            routing(4, "log_storage", 10),
        ];
        let map = group_routings(routings, StorageKind::Metrics);
        assert_eq!(map["10"].len(), 2);
        assert_eq!(map["10"][0].name, "apprun (default)");
        assert_eq!(map["20"][0].id, "3");
        assert_eq!(map.values().map(Vec::len).sum::<usize>(), 3);
    }

    #[test]
    fn test_storage_id_arg() {
        assert_eq!(storage_id_arg(" 42 ").unwrap(), 42);
        assert!(matches!(
            storage_id_arg("abc"),
            Err(CloudError::InvalidIdentifier { what: "storage ID", .. })
        ));
    }

    #[test]
    fn test_access_key_debug_redacts_token() {
        let key = MetricsAccessKey {
            id: "1".into(),
            uid: "u".into(),
            token: "secret-token".into(),
            description: String::new(),
        };
        assert!(!format!("{:?}", key).contains("secret-token"));
    }
}
