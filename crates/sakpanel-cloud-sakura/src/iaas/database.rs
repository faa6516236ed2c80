//! Database appliances

use super::{IaasClient, class_filter};
use super::server::ApiInstance;
use sakpanel_cloud::view::{de, format_timestamp};
use sakpanel_cloud::{Result, Scope};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub zone: String,
    pub status: String,
    pub ip_addresses: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: String,
    pub plan_id: String,
    pub default_route: String,
    pub network_mask_len: i64,
}

pub struct DatabaseService<'a> {
    client: &'a IaasClient,
}

impl<'a> DatabaseService<'a> {
    pub(super) fn new(client: &'a IaasClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, zone: &str) -> Result<Vec<DatabaseInfo>> {
        let scope = Scope::Zone(zone.to_string());
        let result: FindAppliancesResponse = self
            .client
            .find(&scope, "appliance", Some(class_filter("Class", "database")))
            .await?;
        Ok(result
            .appliances
            .into_iter()
            .filter(|a| a.class.is_empty() || a.class == "database")
            .map(|a| a.into_info(zone))
            .collect())
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct FindAppliancesResponse {
    #[serde(rename = "Appliances", default, deserialize_with = "de::null_default")]
    appliances: Vec<ApiDatabase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiDatabase {
    #[serde(rename = "ID", default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    class: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    description: String,
    #[serde(default)]
    plan: Option<ApiPlanRef>,
    #[serde(default)]
    instance: Option<ApiInstance>,
    #[serde(default)]
    remark: Option<ApiRemark>,
    #[serde(default, deserialize_with = "de::null_default")]
    tags: Vec<String>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPlanRef {
    #[serde(rename = "ID", default, deserialize_with = "de::string_id")]
    id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiRemark {
    #[serde(default, deserialize_with = "de::null_default")]
    servers: Vec<ApiRemarkServer>,
    #[serde(default)]
    network: Option<ApiRemarkNetwork>,
}

#[derive(Debug, Deserialize)]
struct ApiRemarkServer {
    #[serde(rename = "IPAddress", default, deserialize_with = "de::null_default")]
    ip_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiRemarkNetwork {
    #[serde(default, deserialize_with = "de::null_default")]
    default_route: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    network_mask_len: i64,
}

impl ApiDatabase {
    fn into_info(self, zone: &str) -> DatabaseInfo {
        let remark = self.remark.unwrap_or_default();
        let ip_addresses = remark
            .servers
            .into_iter()
            .map(|s| s.ip_address)
            .filter(|ip| !ip.is_empty())
            .collect();
        let (default_route, network_mask_len) = remark
            .network
            .map(|n| (n.default_route, n.network_mask_len))
            .unwrap_or_default();

        DatabaseInfo {
            id: self.id,
            name: self.name,
            description: self.description,
            zone: zone.to_string(),
            status: self.instance.map(|i| i.status).unwrap_or_default(),
            ip_addresses,
            tags: self.tags,
            created_at: format_timestamp(self.created_at.as_deref()),
            plan_id: self.plan.map(|p| p.id).unwrap_or_default(),
            default_route,
            network_mask_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_mapping() {
        let raw = r#"{
            "ID": "113700000001",
            "Class": "database",
            "Name": "db01",
            "Plan": {"ID": 10},
            "Instance": {"Status": "up"},
            "Remark": {
                "Servers": [{"IPAddress": "192.168.0.20"}],
                "Network": {"DefaultRoute": "192.168.0.1", "NetworkMaskLen": 24}
            },
            "Tags": ["@MariaDB"],
            "CreatedAt": "2024-04-01T00:00:00Z"
        }"#;
        let db: ApiDatabase = serde_json::from_str(raw).unwrap();
        let info = db.into_info("tk1a");
        assert_eq!(info.plan_id, "10");
        assert_eq!(info.status, "up");
        assert_eq!(info.ip_addresses, vec!["192.168.0.20"]);
        assert_eq!(info.default_route, "192.168.0.1");
        assert_eq!(info.network_mask_len, 24);
        assert_eq!(info.created_at, "2024-04-01T00:00:00Z");
    }

    #[test]
    fn test_database_without_remark() {
        let db: ApiDatabase = serde_json::from_str(r#"{"ID":1,"Remark":null}"#).unwrap();
        let info = db.into_info("tk1a");
        assert!(info.ip_addresses.is_empty());
        assert_eq!(info.network_mask_len, 0);
    }
}
