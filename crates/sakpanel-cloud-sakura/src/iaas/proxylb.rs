//! Enhanced load balancers (ProxyLB)

use super::common_service::{ApiItem, CommonServiceItems};
use super::{IaasClient, resource_id};
use sakpanel_cloud::view::{de, format_timestamp};
use sakpanel_cloud::{ResourceFamily, Result, Scope};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyLbInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub plan: String,
    pub region: String,
    pub fqdn: String,
    #[serde(rename = "virtualIPAddress")]
    pub virtual_ip_address: String,
    pub proxy_networks: Vec<String>,
    #[serde(rename = "useVIPFailover")]
    pub use_vip_failover: bool,
    pub bind_ports: Vec<ProxyLbBindPortInfo>,
    pub servers: Vec<ProxyLbServerInfo>,
    pub created_at: String,
    pub modified_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyLbBindPortInfo {
    pub port: i64,
    pub proxy_mode: String,
    pub redirect_to_https: bool,
    pub support_http2: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyLbServerInfo {
    pub ip_address: String,
    pub port: i64,
    pub server_group: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyLbHealthInfo {
    pub active_conn: i64,
    pub cps: f64,
    pub current_vip: String,
    pub servers: Vec<ProxyLbServerStatusInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyLbServerStatusInfo {
    pub ip_address: String,
    pub port: i64,
    pub status: String,
    pub active_conn: i64,
    pub cps: f64,
}

pub struct ProxyLbService<'a> {
    client: &'a IaasClient,
}

impl<'a> ProxyLbService<'a> {
    pub(super) fn new(client: &'a IaasClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<ProxyLbInfo>> {
        let items: Vec<ApiProxyLb> = CommonServiceItems::new(self.client)
            .find_class("proxylb")
            .await?;
        Ok(items.into_iter().map(into_info).collect())
    }

    pub async fn get(&self, id: &str) -> Result<ProxyLbInfo> {
        let item: ApiProxyLb = CommonServiceItems::new(self.client)
            .read_item(ResourceFamily::ProxyLb, id)
            .await?;
        Ok(into_info(item))
    }

    /// Live connection and backend status
    pub async fn health(&self, id: &str) -> Result<ProxyLbHealthInfo> {
        let id = resource_id(id)?;
        let result: HealthResponse = self
            .client
            .get(&Scope::Global, &format!("commonserviceitem/{}/health", id))
            .await?;
        let health = result.proxy_lb.unwrap_or_default();

        Ok(ProxyLbHealthInfo {
            active_conn: health.active_conn,
            cps: health.cps,
            current_vip: health.current_vip,
            servers: health
                .servers
                .into_iter()
                .map(|s| ProxyLbServerStatusInfo {
                    ip_address: s.ip_address,
                    port: s.port,
                    status: s.status,
                    active_conn: s.active_conn,
                    cps: s.cps,
                })
                .collect(),
        })
    }
}

/// `cloud/proxylb/plain/100` -> `100`
fn plan_from_service_class(service_class: &str) -> String {
    service_class
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn into_info(item: ApiProxyLb) -> ProxyLbInfo {
    let settings = item
        .settings
        .and_then(|s| s.proxy_lb)
        .unwrap_or_default();
    let status = item.status.unwrap_or_default();

    ProxyLbInfo {
        id: item.id,
        name: item.name,
        description: item.description,
        tags: item.tags,
        plan: plan_from_service_class(&item.service_class),
        region: status.region,
        fqdn: status.fqdn,
        virtual_ip_address: status.virtual_ip_address,
        proxy_networks: status.proxy_networks,
        use_vip_failover: status.use_vip_failover,
        bind_ports: settings
            .bind_ports
            .into_iter()
            .map(|b| ProxyLbBindPortInfo {
                port: b.port,
                proxy_mode: b.proxy_mode,
                redirect_to_https: b.redirect_to_https,
                support_http2: b.support_http2,
            })
            .collect(),
        servers: settings
            .servers
            .into_iter()
            .map(|s| ProxyLbServerInfo {
                ip_address: s.ip_address,
                port: s.port,
                server_group: s.server_group,
                enabled: s.enabled,
            })
            .collect(),
        created_at: format_timestamp(item.created_at.as_deref()),
        modified_at: format_timestamp(item.modified_at.as_deref()),
    }
}

// ============================================================================
// API Types
// ============================================================================

type ApiProxyLb = ApiItem<ApiProxyLbSettings, ApiProxyLbStatus>;

#[derive(Debug, Default, Deserialize)]
struct ApiProxyLbSettings {
    #[serde(rename = "ProxyLB", default)]
    proxy_lb: Option<ApiProxyLbBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiProxyLbBody {
    #[serde(default, deserialize_with = "de::null_default")]
    bind_ports: Vec<ApiBindPort>,
    #[serde(default, deserialize_with = "de::null_default")]
    servers: Vec<ApiProxyLbServer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiBindPort {
    #[serde(default, deserialize_with = "de::lenient_i64")]
    port: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    proxy_mode: String,
    #[serde(rename = "RedirectToHttps", default, deserialize_with = "de::flag")]
    redirect_to_https: bool,
    #[serde(rename = "SupportHttp2", default, deserialize_with = "de::flag")]
    support_http2: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiProxyLbServer {
    #[serde(rename = "IPAddress", default, deserialize_with = "de::null_default")]
    ip_address: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    port: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    server_group: String,
    #[serde(default, deserialize_with = "de::flag")]
    enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiProxyLbStatus {
    #[serde(rename = "FQDN", default, deserialize_with = "de::null_default")]
    fqdn: String,
    #[serde(rename = "VirtualIPAddress", default, deserialize_with = "de::null_default")]
    virtual_ip_address: String,
    #[serde(default, deserialize_with = "de::null_default")]
    proxy_networks: Vec<String>,
    #[serde(rename = "UseVIPFailover", default, deserialize_with = "de::flag")]
    use_vip_failover: bool,
    #[serde(default, deserialize_with = "de::null_default")]
    region: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(rename = "ProxyLB", default)]
    proxy_lb: Option<ApiHealth>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiHealth {
    #[serde(default, deserialize_with = "de::lenient_i64")]
    active_conn: i64,
    #[serde(rename = "CPS", default, deserialize_with = "de::lenient_f64")]
    cps: f64,
    #[serde(rename = "CurrentVIP", default, deserialize_with = "de::null_default")]
    current_vip: String,
    #[serde(default, deserialize_with = "de::null_default")]
    servers: Vec<ApiServerStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiServerStatus {
    #[serde(rename = "IPAddress", default, deserialize_with = "de::null_default")]
    ip_address: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    port: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    status: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    active_conn: i64,
    #[serde(rename = "CPS", default, deserialize_with = "de::lenient_f64")]
    cps: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_from_service_class() {
        assert_eq!(plan_from_service_class("cloud/proxylb/plain/100"), "100");
        assert_eq!(plan_from_service_class(""), "");
    }

    #[test]
    fn test_proxylb_mapping() {
        let raw = r#"{
            "ID": "112400000001",
            "Name": "elb",
            "ServiceClass": "cloud/proxylb/plain/500",
            "Provider": {"Class": "proxylb"},
            "Settings": {"ProxyLB": {
                "BindPorts": [{"Port": 443, "ProxyMode": "https", "RedirectToHttps": false, "SupportHttp2": true}],
                "Servers": [{"IPAddress": "203.0.113.20", "Port": 80, "ServerGroup": "", "Enabled": true}]
            }},
            "Status": {
                "FQDN": "site-112400000001.proxylb3.sakura.ne.jp",
                "VirtualIPAddress": "203.0.113.200",
                "ProxyNetworks": ["198.51.100.0/28"],
                "UseVIPFailover": true,
                "Region": "tk1"
            },
            "Tags": null,
            "CreatedAt": "2024-06-01T09:00:00+09:00",
            "ModifiedAt": null
        }"#;
        let item: ApiProxyLb = serde_json::from_str(raw).unwrap();
        let info = into_info(item);
        assert_eq!(info.plan, "500");
        assert_eq!(info.region, "tk1");
        assert!(info.use_vip_failover);
        assert_eq!(info.bind_ports[0].port, 443);
        assert!(info.bind_ports[0].support_http2);
        assert!(info.servers[0].enabled);
        assert!(info.tags.is_empty());
        assert_eq!(info.modified_at, "");

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["virtualIPAddress"], "203.0.113.200");
        assert_eq!(json["useVIPFailover"], true);
    }
}
