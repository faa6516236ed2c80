//! Server listing and power control

use super::{IaasClient, resource_id};
use reqwest::Method;
use sakpanel_cloud::view::{de, format_timestamp};
use sakpanel_cloud::{ResourceFamily, Result, Scope};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub zone: String,
    pub cpu: i64,
    /// GB
    pub memory: i64,
    pub status: String,
    pub ip_addresses: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: String,
}

pub struct ServerService<'a> {
    client: &'a IaasClient,
}

impl<'a> ServerService<'a> {
    pub(super) fn new(client: &'a IaasClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, zone: &str) -> Result<Vec<ServerInfo>> {
        let scope = Scope::Zone(zone.to_string());
        let result: FindServersResponse = self.client.find(&scope, "server", None).await?;
        tracing::debug!("Found {} servers in {}", result.servers.len(), zone);
        Ok(result
            .servers
            .into_iter()
            .map(|s| s.into_info(zone))
            .collect())
    }

    pub async fn get(&self, zone: &str, id: &str) -> Result<ServerInfo> {
        let scope = Scope::Zone(zone.to_string());
        let result: ReadServerResponse = self
            .client
            .read(ResourceFamily::Server, &scope, "server", id)
            .await?;
        Ok(result.server.into_info(zone))
    }

    /// Instance status (`up`, `down`, `cleaning`, ...)
    pub async fn status(&self, zone: &str, id: &str) -> Result<String> {
        Ok(self.get(zone, id).await?.status)
    }

    pub async fn power_on(&self, zone: &str, id: &str) -> Result<()> {
        let id = resource_id(id)?;
        tracing::debug!("Booting server {} in {}", id, zone);
        self.client
            .call(
                Method::PUT,
                &Scope::Zone(zone.to_string()),
                &format!("server/{}/power", id),
                None,
            )
            .await
    }

    /// Graceful ACPI shutdown
    pub async fn power_off(&self, zone: &str, id: &str) -> Result<()> {
        self.shutdown(zone, id, false).await
    }

    pub async fn force_stop(&self, zone: &str, id: &str) -> Result<()> {
        self.shutdown(zone, id, true).await
    }

    async fn shutdown(&self, zone: &str, id: &str, force: bool) -> Result<()> {
        let id = resource_id(id)?;
        tracing::debug!("Shutting down server {} in {} (force={})", id, zone, force);
        self.client
            .call(
                Method::DELETE,
                &Scope::Zone(zone.to_string()),
                &format!("server/{}/power", id),
                Some(json!({ "Force": force })),
            )
            .await
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct FindServersResponse {
    #[serde(rename = "Servers", default, deserialize_with = "de::null_default")]
    servers: Vec<ApiServer>,
}

#[derive(Debug, Deserialize)]
struct ReadServerResponse {
    #[serde(rename = "Server")]
    server: ApiServer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiServer {
    #[serde(rename = "ID", default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    description: String,
    #[serde(default)]
    server_plan: Option<ApiServerPlan>,
    #[serde(default)]
    instance: Option<ApiInstance>,
    #[serde(default, deserialize_with = "de::null_default")]
    interfaces: Vec<ApiInterface>,
    #[serde(default, deserialize_with = "de::null_default")]
    tags: Vec<String>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiServerPlan {
    #[serde(rename = "CPU", default, deserialize_with = "de::lenient_i64")]
    cpu: i64,
    #[serde(rename = "MemoryMB", default, deserialize_with = "de::lenient_i64")]
    memory_mb: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiInstance {
    #[serde(rename = "Status", default, deserialize_with = "de::null_default")]
    pub(super) status: String,
}

#[derive(Debug, Deserialize)]
struct ApiInterface {
    #[serde(rename = "IPAddress", default)]
    ip_address: Option<String>,
    #[serde(rename = "UserIPAddress", default)]
    user_ip_address: Option<String>,
}

impl ApiServer {
    fn into_info(self, zone: &str) -> ServerInfo {
        let (cpu, memory_mb) = self
            .server_plan
            .map(|p| (p.cpu, p.memory_mb))
            .unwrap_or_default();
        let ip_addresses = self
            .interfaces
            .into_iter()
            .filter_map(|i| i.ip_address.or(i.user_ip_address))
            .filter(|ip| !ip.is_empty())
            .collect();

        ServerInfo {
            id: self.id,
            name: self.name,
            description: self.description,
            zone: zone.to_string(),
            cpu,
            memory: memory_mb / 1024,
            status: self.instance.map(|i| i.status).unwrap_or_default(),
            ip_addresses,
            tags: self.tags,
            created_at: format_timestamp(self.created_at.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_mapping() {
        let raw = r#"{
            "ID": 113600012345,
            "Name": "web01",
            "Description": null,
            "ServerPlan": {"CPU": 2, "MemoryMB": 4096},
            "Instance": {"Status": "up"},
            "Interfaces": [
                {"IPAddress": "203.0.113.10"},
                {"IPAddress": null, "UserIPAddress": "192.168.0.11"},
                {"IPAddress": null}
            ],
            "Tags": null,
            "CreatedAt": "2024-01-10T12:00:00+09:00"
        }"#;
        let server: ApiServer = serde_json::from_str(raw).unwrap();
        let info = server.into_info("tk1b");

        assert_eq!(info.id, "113600012345");
        assert_eq!(info.description, "");
        assert_eq!(info.zone, "tk1b");
        assert_eq!(info.cpu, 2);
        assert_eq!(info.memory, 4);
        assert_eq!(info.status, "up");
        assert_eq!(info.ip_addresses, vec!["203.0.113.10", "192.168.0.11"]);
        assert!(info.tags.is_empty());
        assert_eq!(info.created_at, "2024-01-10T03:00:00Z");
    }

    #[test]
    fn test_server_without_instance() {
        let server: ApiServer = serde_json::from_str(r#"{"ID":"1","Name":"x"}"#).unwrap();
        let info = server.into_info("is1a");
        assert_eq!(info.status, "");
        assert_eq!(info.created_at, "");
        assert_eq!(info.memory, 0);
    }
}
