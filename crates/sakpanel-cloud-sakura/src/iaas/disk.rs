//! Disks and archives

use super::IaasClient;
use sakpanel_cloud::view::{de, format_timestamp};
use sakpanel_cloud::{Result, Scope};
use serde::{Deserialize, Serialize};

/// Archives owned by the account; public OS images are never listed.
const USER_SCOPE: &str = "user";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub zone: String,
    pub size_gb: i64,
    pub disk_plan_name: String,
    pub connection: String,
    pub server_id: String,
    pub server_name: String,
    pub tags: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub size_gb: i64,
    pub scope: String,
    pub availability: String,
    pub tags: Vec<String>,
    pub created_at: String,
}

pub struct DiskService<'a> {
    client: &'a IaasClient,
}

impl<'a> DiskService<'a> {
    pub(super) fn new(client: &'a IaasClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, zone: &str) -> Result<Vec<DiskInfo>> {
        let scope = Scope::Zone(zone.to_string());
        let result: FindDisksResponse = self.client.find(&scope, "disk", None).await?;
        Ok(result.disks.into_iter().map(|d| d.into_info(zone)).collect())
    }
}

pub struct ArchiveService<'a> {
    client: &'a IaasClient,
}

impl<'a> ArchiveService<'a> {
    pub(super) fn new(client: &'a IaasClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, zone: &str) -> Result<Vec<ArchiveInfo>> {
        let scope = Scope::Zone(zone.to_string());
        let result: FindArchivesResponse = self.client.find(&scope, "archive", None).await?;
        let total = result.archives.len();
        let archives = user_archives(result.archives);
        tracing::debug!(
            "Archives in {}: {} user-scoped of {}",
            zone,
            archives.len(),
            total
        );
        Ok(archives)
    }
}

fn user_archives(archives: Vec<ApiArchive>) -> Vec<ArchiveInfo> {
    archives
        .into_iter()
        .filter(|a| a.scope == USER_SCOPE)
        .map(ApiArchive::into_info)
        .collect()
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct FindDisksResponse {
    #[serde(rename = "Disks", default, deserialize_with = "de::null_default")]
    disks: Vec<ApiDisk>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiDisk {
    #[serde(rename = "ID", default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    description: String,
    #[serde(rename = "SizeMB", default, deserialize_with = "de::lenient_i64")]
    size_mb: i64,
    #[serde(default)]
    plan: Option<ApiNamedRef>,
    #[serde(default, deserialize_with = "de::null_default")]
    connection: String,
    #[serde(default)]
    server: Option<ApiNamedRef>,
    #[serde(default, deserialize_with = "de::null_default")]
    tags: Vec<String>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiNamedRef {
    #[serde(rename = "ID", default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
}

impl ApiDisk {
    fn into_info(self, zone: &str) -> DiskInfo {
        let (server_id, server_name) = self
            .server
            .map(|s| (s.id, s.name))
            .unwrap_or_default();

        DiskInfo {
            id: self.id,
            name: self.name,
            description: self.description,
            zone: zone.to_string(),
            size_gb: self.size_mb / 1024,
            disk_plan_name: self.plan.map(|p| p.name).unwrap_or_default(),
            connection: self.connection,
            server_id,
            server_name,
            tags: self.tags,
            created_at: format_timestamp(self.created_at.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FindArchivesResponse {
    #[serde(rename = "Archives", default, deserialize_with = "de::null_default")]
    archives: Vec<ApiArchive>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiArchive {
    #[serde(rename = "ID", default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    description: String,
    #[serde(rename = "SizeMB", default, deserialize_with = "de::lenient_i64")]
    size_mb: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    scope: String,
    #[serde(default, deserialize_with = "de::null_default")]
    availability: String,
    #[serde(default, deserialize_with = "de::null_default")]
    tags: Vec<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl ApiArchive {
    fn into_info(self) -> ArchiveInfo {
        ArchiveInfo {
            id: self.id,
            name: self.name,
            description: self.description,
            size_gb: self.size_mb / 1024,
            scope: self.scope,
            availability: self.availability,
            tags: self.tags,
            created_at: format_timestamp(self.created_at.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive(id: &str, scope: &str) -> ApiArchive {
        serde_json::from_value(serde_json::json!({
            "ID": id,
            "Name": format!("archive-{}", id),
            "SizeMB": 20480,
            "Scope": scope,
            "Availability": "available",
        }))
        .unwrap()
    }

    #[test]
    fn test_user_archives_keeps_only_user_scope() {
        let cases: Vec<(Vec<(&str, &str)>, Vec<&str>)> = vec![
            (vec![], vec![]),
            (vec![("1", "shared")], vec![]),
            (vec![("1", "user")], vec!["1"]),
            (vec![("1", "user"), ("2", "shared")], vec!["1"]),
            (vec![("1", "shared"), ("2", "user")], vec!["2"]),
            (vec![("1", "user"), ("2", "user"), ("3", "shared")], vec!["1", "2"]),
            (vec![("1", "shared"), ("2", "User"), ("3", "")], vec![]),
        ];

        for (input, expected) in cases {
            let archives = input.iter().map(|(id, scope)| archive(id, scope)).collect();
            let ids: Vec<String> = user_archives(archives).into_iter().map(|a| a.id).collect();
            assert_eq!(ids, expected, "input: {:?}", input);
        }
    }

    #[test]
    fn test_archive_size_in_gb() {
        let info = archive("9", "user").into_info();
        assert_eq!(info.size_gb, 20);
        assert_eq!(info.scope, "user");
        assert!(info.tags.is_empty());
    }

    #[test]
    fn test_disk_mapping() {
        let raw = r#"{
            "ID": 113500000001,
            "Name": "disk01",
            "SizeMB": 40960,
            "Plan": {"ID": 4, "Name": "SSDプラン"},
            "Connection": "virtio",
            "Server": {"ID": 113600000001, "Name": "web01"},
            "Tags": ["prod"],
            "CreatedAt": "2024-02-01T10:00:00+09:00"
        }"#;
        let disk: ApiDisk = serde_json::from_str(raw).unwrap();
        let info = disk.into_info("is1b");
        assert_eq!(info.size_gb, 40);
        assert_eq!(info.disk_plan_name, "SSDプラン");
        assert_eq!(info.server_id, "113600000001");
        assert_eq!(info.server_name, "web01");

        let detached: ApiDisk =
            serde_json::from_str(r#"{"ID":"2","Server":null,"Plan":null}"#).unwrap();
        let info = detached.into_info("is1b");
        assert_eq!(info.server_id, "");
        assert_eq!(info.disk_plan_name, "");
    }
}
