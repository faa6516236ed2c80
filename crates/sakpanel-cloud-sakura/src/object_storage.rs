//! Object storage control API
//!
//! Sites and account access keys come from the profile-authenticated control
//! API. Buckets and objects live behind each site's S3 endpoint and need an
//! object storage access key pair instead (see [`crate::s3`]).

use crate::s3::S3Session;
use crate::transport::{Auth, Credentials, HttpBackend, join_url};
use sakpanel_cloud::view::{de, format_timestamp};
use sakpanel_cloud::{BackendKind, CloudError, ResourceFamily, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub id: String,
    pub display_name: String,
    /// S3 endpoint, possibly without a scheme
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessKeyInfo {
    pub id: String,
    pub site_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketInfo {
    pub name: String,
    pub site_id: String,
    pub creation_date: String,
}

#[derive(Debug, Clone)]
pub struct ObjectStorageClient {
    http: HttpBackend,
    base: String,
}

impl ObjectStorageClient {
    pub fn new(http: reqwest::Client, base: impl Into<String>, creds: &Credentials) -> Self {
        Self {
            http: HttpBackend::new(http, BackendKind::ObjectStorage, Auth::basic(creds)),
            base: base.into(),
        }
    }

    pub async fn sites(&self) -> Result<Vec<SiteInfo>> {
        let result: DataResponse<ApiSite> = self
            .http
            .get_json(&join_url(&self.base, "fed/v1/clusters"))
            .await?;
        Ok(result
            .data
            .into_iter()
            .map(|s| SiteInfo {
                id: s.id,
                display_name: s.display_name_ja,
                endpoint: s.s3_endpoint,
            })
            .collect())
    }

    /// Account access keys of a site. Secrets are never returned.
    pub async fn access_keys(&self, site_id: &str) -> Result<Vec<AccessKeyInfo>> {
        let site_id = site_id_arg(site_id)?;
        let result: DataResponse<ApiAccessKey> = self
            .http
            .get_json(&join_url(&self.base, &format!("{}/v2/account/keys", site_id)))
            .await?;
        Ok(result
            .data
            .into_iter()
            .map(|k| AccessKeyInfo {
                id: k.id,
                site_id: site_id.to_string(),
                created_at: format_timestamp(k.created_at.as_deref()),
            })
            .collect())
    }

    /// S3 session for a site, resolved through the site list
    pub async fn session(&self, site_id: &str, access_key: &str, secret_key: &str) -> Result<S3Session> {
        let site_id = site_id_arg(site_id)?;
        let site = self
            .sites()
            .await?
            .into_iter()
            .find(|s| s.id == site_id)
            .ok_or_else(|| CloudError::NotFound {
                family: ResourceFamily::ObjectStorage,
                id: site_id.to_string(),
            })?;
        Ok(S3Session::new(&site.endpoint, access_key, secret_key))
    }

    /// Buckets visible to an access key on one site
    pub async fn buckets(&self, site_id: &str, access_key: &str, secret_key: &str) -> Result<Vec<BucketInfo>> {
        let session = self.session(site_id, access_key, secret_key).await?;
        let site_id = site_id.trim();
        Ok(session
            .list_buckets()
            .await?
            .into_iter()
            .map(|b| BucketInfo {
                name: b.name,
                site_id: site_id.to_string(),
                creation_date: b.creation_date,
            })
            .collect())
    }
}

/// Site IDs are short slugs such as `isk01`
fn site_id_arg(site_id: &str) -> Result<&str> {
    let site_id = site_id.trim();
    if site_id.is_empty()
        || !site_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CloudError::invalid_id("site ID", site_id));
    }
    Ok(site_id)
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
struct ApiSite {
    #[serde(default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    display_name_ja: String,
    #[serde(default, deserialize_with = "de::null_default")]
    s3_endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ApiAccessKey {
    #[serde(default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default)]
    created_at: Option<String>,
}
