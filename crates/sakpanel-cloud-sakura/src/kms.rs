//! KMS key listing

use crate::transport::{Auth, Credentials, HttpBackend, join_url};
use sakpanel_cloud::view::{de, format_timestamp};
use sakpanel_cloud::{BackendKind, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub key_origin: String,
    /// 0 when the key has no version yet
    pub latest_version: i64,
    pub tags: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct KmsClient {
    http: HttpBackend,
    base: String,
}

impl KmsClient {
    pub fn new(http: reqwest::Client, base: impl Into<String>, creds: &Credentials) -> Self {
        Self {
            http: HttpBackend::new(http, BackendKind::Kms, Auth::basic(creds)),
            base: base.into(),
        }
    }

    pub async fn list_keys(&self) -> Result<Vec<KeyInfo>> {
        let result: KeysResponse = self.http.get_json(&join_url(&self.base, "keys")).await?;
        Ok(result.keys.into_iter().map(ApiKey::into_info).collect())
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct KeysResponse {
    #[serde(rename = "Keys", default, deserialize_with = "de::null_default")]
    keys: Vec<ApiKey>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiKey {
    #[serde(rename = "ID", default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    description: String,
    #[serde(default, deserialize_with = "de::null_default")]
    status: String,
    #[serde(default, deserialize_with = "de::null_default")]
    key_origin: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    latest_version: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    tags: Vec<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl ApiKey {
    fn into_info(self) -> KeyInfo {
        KeyInfo {
            id: self.id,
            name: self.name,
            description: self.description,
            status: self.status,
            key_origin: self.key_origin,
            latest_version: self.latest_version,
            tags: self.tags,
            created_at: format_timestamp(self.created_at.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_without_version() {
        let raw = r#"{"Keys": [
            {"ID": "110000000001", "Name": "k1", "Status": "active", "KeyOrigin": "generated",
             "LatestVersion": null, "Tags": null, "CreatedAt": "2024-07-01T00:00:00Z"},
            {"ID": 110000000002, "Name": "k2", "LatestVersion": 3}
        ]}"#;
        let result: KeysResponse = serde_json::from_str(raw).unwrap();
        let keys: Vec<KeyInfo> = result.keys.into_iter().map(ApiKey::into_info).collect();
        assert_eq!(keys[0].latest_version, 0);
        assert!(keys[0].tags.is_empty());
        assert_eq!(keys[1].id, "110000000002");
        assert_eq!(keys[1].latest_version, 3);
        assert_eq!(keys[1].created_at, "");
    }
}
