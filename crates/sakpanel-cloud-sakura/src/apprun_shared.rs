//! AppRun shared API client
//!
//! Every call must answer 200; any other status is surfaced as a backend
//! error with the status attached. A 200 without a body is an empty result.

use crate::transport::{Auth, Credentials, HttpBackend, join_url};
use reqwest::{Method, StatusCode};
use sakpanel_cloud::view::{de, format_timestamp};
use sakpanel_cloud::{BackendKind, CloudError, ResourceFamily, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedAppInfo {
    pub id: String,
    pub name: String,
    pub status: String,
    pub public_url: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    pub name: String,
    pub image: String,
    pub max_cpu: String,
    pub max_memory: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedAppDetailInfo {
    pub id: String,
    pub name: String,
    pub status: String,
    pub public_url: String,
    pub port: i64,
    pub min_scale: i64,
    pub max_scale: i64,
    pub timeout_seconds: i64,
    pub created_at: String,
    pub components: Vec<ComponentInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedVersionInfo {
    pub id: String,
    pub name: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficInfo {
    pub version_name: String,
    pub is_latest_version: bool,
    pub percent: i64,
}

/// AppRun shared API handle
#[derive(Debug, Clone)]
pub struct AppRunSharedClient {
    http: HttpBackend,
    base: String,
}

impl AppRunSharedClient {
    pub fn new(http: reqwest::Client, base: impl Into<String>, creds: &Credentials) -> Self {
        Self {
            http: HttpBackend::new(http, BackendKind::AppRunShared, Auth::basic(creds)),
            base: base.into(),
        }
    }

    pub async fn applications(&self) -> Result<Vec<SharedAppInfo>> {
        let result: Option<DataResponse<ApiApplication>> = self.get("applications").await?;
        Ok(data(result)
            .into_iter()
            .map(|a| SharedAppInfo {
                id: a.id,
                name: a.name,
                status: a.status,
                public_url: a.public_url,
                created_at: format_timestamp(a.created_at.as_deref()),
            })
            .collect())
    }

    pub async fn application(&self, app_id: &str) -> Result<SharedAppDetailInfo> {
        let app_id = path_segment(app_id)?;
        let result: Option<ApiApplicationDetail> =
            self.get(&format!("applications/{}", app_id)).await?;
        let app = result.ok_or_else(|| CloudError::NotFound {
            family: ResourceFamily::AppRunShared,
            id: app_id.to_string(),
        })?;

        Ok(SharedAppDetailInfo {
            id: app.id,
            name: app.name,
            status: app.status,
            public_url: app.public_url,
            port: app.port,
            min_scale: app.min_scale,
            max_scale: app.max_scale,
            timeout_seconds: app.timeout_seconds,
            created_at: format_timestamp(app.created_at.as_deref()),
            components: app
                .components
                .into_iter()
                .map(|c| ComponentInfo {
                    name: c.name,
                    image: c
                        .deploy_source
                        .and_then(|s| s.container_registry)
                        .map(|r| r.image)
                        .unwrap_or_default(),
                    max_cpu: c.max_cpu,
                    max_memory: c.max_memory,
                })
                .collect(),
        })
    }

    pub async fn application_status(&self, app_id: &str) -> Result<String> {
        let app_id = path_segment(app_id)?;
        let result: Option<ApiStatus> = self
            .get(&format!("applications/{}/status", app_id))
            .await?;
        Ok(result.map(|s| s.status).unwrap_or_default())
    }

    pub async fn versions(&self, app_id: &str) -> Result<Vec<SharedVersionInfo>> {
        let app_id = path_segment(app_id)?;
        let result: Option<DataResponse<ApiVersion>> = self
            .get(&format!("applications/{}/versions", app_id))
            .await?;
        Ok(data(result)
            .into_iter()
            .map(|v| SharedVersionInfo {
                id: v.id,
                name: v.name,
                status: v.status,
                created_at: format_timestamp(v.created_at.as_deref()),
            })
            .collect())
    }

    pub async fn traffics(&self, app_id: &str) -> Result<Vec<TrafficInfo>> {
        let app_id = path_segment(app_id)?;
        let result: Option<DataResponse<ApiTraffic>> = self
            .get(&format!("applications/{}/traffics", app_id))
            .await?;
        Ok(data(result)
            .into_iter()
            .map(|t| TrafficInfo {
                version_name: t.version_name,
                is_latest_version: t.is_latest_version,
                percent: t.percent,
            })
            .collect())
    }

    /// Whether the account has signed up for AppRun shared
    pub async fn has_user(&self) -> Result<bool> {
        let url = join_url(&self.base, "user");
        let (status, body) = self
            .http
            .send_raw(self.http.request(Method::GET, &url))
            .await?;
        match status {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            other => Err(self.http.status_error(other, &body)),
        }
    }

    /// GET requiring exactly 200. `None` for an empty body.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = join_url(&self.base, path);
        let (status, body) = self
            .http
            .send_raw(self.http.request(Method::GET, &url))
            .await?;
        if status != StatusCode::OK {
            return Err(self.http.status_error(status, &body));
        }
        self.http.decode(status, &body)
    }
}

fn data<T>(response: Option<DataResponse<T>>) -> Vec<T> {
    response.map(|r| r.data).unwrap_or_default()
}

/// Application IDs are opaque strings; reject anything that would change the path.
fn path_segment(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() || id.contains(['/', '?', '#']) || id == "." || id == ".." {
        return Err(CloudError::invalid_id("application ID", id));
    }
    Ok(id)
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct DataResponse<T> {
    #[serde(default = "Vec::new", deserialize_with = "de::null_default")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ApiApplication {
    #[serde(default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    status: String,
    #[serde(default, deserialize_with = "de::null_default")]
    public_url: String,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiApplicationDetail {
    #[serde(default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    status: String,
    #[serde(default, deserialize_with = "de::null_default")]
    public_url: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    port: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    min_scale: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    max_scale: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    timeout_seconds: i64,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    components: Vec<ApiComponent>,
}

#[derive(Debug, Deserialize)]
struct ApiComponent {
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    max_cpu: String,
    #[serde(default, deserialize_with = "de::null_default")]
    max_memory: String,
    #[serde(default)]
    deploy_source: Option<ApiDeploySource>,
}

#[derive(Debug, Deserialize)]
struct ApiDeploySource {
    #[serde(default)]
    container_registry: Option<ApiContainerRegistry>,
}

#[derive(Debug, Deserialize)]
struct ApiContainerRegistry {
    #[serde(default, deserialize_with = "de::null_default")]
    image: String,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default, deserialize_with = "de::null_default")]
    status: String,
}

#[derive(Debug, Deserialize)]
struct ApiVersion {
    #[serde(default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    status: String,
    #[serde(default)]
    created_at: Option<String>,
}

/// Either `{version_name, percent}` or `{is_latest_version, percent}`
#[derive(Debug, Deserialize)]
struct ApiTraffic {
    #[serde(default, deserialize_with = "de::null_default")]
    version_name: String,
    #[serde(default, deserialize_with = "de::flag")]
    is_latest_version: bool,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    percent: i64,
}
