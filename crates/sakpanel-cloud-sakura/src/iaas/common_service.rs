//! Global resources served as IaaS common service items
//!
//! DNS zones, GSLB, simple monitors, certificate authorities, container
//! registries and enhanced databases share one endpoint
//! (`/commonserviceitem`) and are told apart by `Provider.Class`.

use super::{IaasClient, class_filter, resource_id};
use sakpanel_cloud::view::{de, format_timestamp};
use sakpanel_cloud::{ResourceFamily, Result, Scope};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub rdata: String,
    pub ttl: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    /// DNS zone name (e.g. `example.com`)
    pub zone: String,
    pub records: Vec<DnsRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GslbServerInfo {
    pub ip_address: String,
    pub enabled: bool,
    pub weight: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GslbHealthCheckInfo {
    pub protocol: String,
    pub host_header: String,
    pub path: String,
    pub response_code: i64,
    pub port: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GslbInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub fqdn: String,
    pub sorry_server: String,
    pub servers: Vec<GslbServerInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<GslbHealthCheckInfo>,
    pub delay_loop: i64,
    pub weighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub common_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleMonitorInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub target: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRegistryInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub fqdn: String,
    /// `readwrite`, `readonly` or `none`
    pub access_level: String,
    pub virtual_domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRegistryUserInfo {
    pub user_name: String,
    pub permission: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedDbInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub database_name: String,
    pub database_type: String,
    pub region: String,
    pub host_name: String,
    pub port: i64,
    pub created_at: String,
}

/// Service over `/commonserviceitem`
pub struct CommonServiceItems<'a> {
    client: &'a IaasClient,
}

impl<'a> CommonServiceItems<'a> {
    pub(super) fn new(client: &'a IaasClient) -> Self {
        Self { client }
    }

    pub async fn list_dns(&self) -> Result<Vec<DnsInfo>> {
        let items: Vec<ApiItem<ApiDnsSettings, ApiDnsStatus>> = self.find_class("dns").await?;
        Ok(items.into_iter().map(ApiItem::into_dns).collect())
    }

    pub async fn get_dns(&self, id: &str) -> Result<DnsInfo> {
        let item = self.read_item(ResourceFamily::Dns, id).await?;
        Ok(ApiItem::<ApiDnsSettings, ApiDnsStatus>::into_dns(item))
    }

    pub async fn list_gslb(&self) -> Result<Vec<GslbInfo>> {
        let items: Vec<ApiItem<ApiGslbSettings, ApiFqdnStatus>> = self.find_class("gslb").await?;
        Ok(items.into_iter().map(ApiItem::into_gslb).collect())
    }

    pub async fn get_gslb(&self, id: &str) -> Result<GslbInfo> {
        let item = self.read_item(ResourceFamily::Gslb, id).await?;
        Ok(ApiItem::<ApiGslbSettings, ApiFqdnStatus>::into_gslb(item))
    }

    pub async fn list_certificates(&self) -> Result<Vec<CertificateInfo>> {
        let items: Vec<ApiItem<serde_json::Value, ApiCaStatus>> =
            self.find_class("certificateauthority").await?;
        Ok(items
            .into_iter()
            .map(|item| {
                let status = item.status.unwrap_or_default();
                let common_name = status
                    .subject
                    .map(|s| s.common_name)
                    .filter(|cn| !cn.is_empty())
                    .unwrap_or(status.common_name);
                CertificateInfo {
                    id: item.id,
                    name: item.name,
                    description: item.description,
                    common_name,
                }
            })
            .collect())
    }

    pub async fn list_simple_monitors(&self) -> Result<Vec<SimpleMonitorInfo>> {
        let items: Vec<ApiItem<ApiSimpleMonitorSettings, ApiSimpleMonitorStatus>> =
            self.find_class("simplemon").await?;
        Ok(items
            .into_iter()
            .map(|item| SimpleMonitorInfo {
                id: item.id,
                name: item.name,
                description: item.description,
                target: item.status.unwrap_or_default().target,
                enabled: item
                    .settings
                    .and_then(|s| s.simple_monitor)
                    .map(|m| m.enabled)
                    .unwrap_or_default(),
            })
            .collect())
    }

    pub async fn list_container_registries(&self) -> Result<Vec<ContainerRegistryInfo>> {
        let items: Vec<ApiItem<ApiRegistrySettings, ApiFqdnStatus>> =
            self.find_class("containerregistry").await?;
        Ok(items
            .into_iter()
            .map(|item| {
                let settings = item
                    .settings
                    .and_then(|s| s.container_registry)
                    .unwrap_or_default();
                ContainerRegistryInfo {
                    id: item.id,
                    name: item.name,
                    description: item.description,
                    fqdn: item.status.unwrap_or_default().fqdn,
                    access_level: settings.public,
                    virtual_domain: settings.virtual_domain,
                }
            })
            .collect())
    }

    pub async fn container_registry_users(
        &self,
        id: &str,
    ) -> Result<Vec<ContainerRegistryUserInfo>> {
        let id = resource_id(id)?;
        let result: RegistryUsersResponse = self
            .client
            .get(
                &Scope::Global,
                &format!("commonserviceitem/{}/containerregistry/users", id),
            )
            .await?;
        Ok(result
            .container_registry
            .map(|r| r.users)
            .unwrap_or_default()
            .into_iter()
            .map(|u| ContainerRegistryUserInfo {
                user_name: u.user_name,
                permission: u.permission,
            })
            .collect())
    }

    pub async fn list_enhanced_dbs(&self) -> Result<Vec<EnhancedDbInfo>> {
        let items: Vec<ApiItem<serde_json::Value, ApiEnhancedDbStatus>> =
            self.find_class("enhanceddb").await?;
        Ok(items
            .into_iter()
            .map(|item| {
                let status = item.status.unwrap_or_default();
                EnhancedDbInfo {
                    id: item.id,
                    name: item.name,
                    description: item.description,
                    tags: item.tags,
                    database_name: status.database_name,
                    database_type: status.database_type,
                    region: status.region,
                    host_name: status.host_name,
                    port: status.port,
                    created_at: format_timestamp(item.created_at.as_deref()),
                }
            })
            .collect())
    }

    /// All items of one provider class
    pub(super) async fn find_class<S, T>(&self, class: &str) -> Result<Vec<ApiItem<S, T>>>
    where
        S: DeserializeOwned,
        T: DeserializeOwned,
    {
        let result: FindItemsResponse<S, T> = self
            .client
            .find(
                &Scope::Global,
                "commonserviceitem",
                Some(class_filter("Provider.Class", class)),
            )
            .await?;
        tracing::debug!(
            "Found {} common service items of class {}",
            result.items.len(),
            class
        );
        Ok(result
            .items
            .into_iter()
            .filter(|item| item.class().is_none_or(|c| c == class))
            .collect())
    }

    pub(super) async fn read_item<S, T>(
        &self,
        family: ResourceFamily,
        id: &str,
    ) -> Result<ApiItem<S, T>>
    where
        S: DeserializeOwned,
        T: DeserializeOwned,
    {
        let result: ReadItemResponse<S, T> = self
            .client
            .read(family, &Scope::Global, "commonserviceitem", id)
            .await?;
        Ok(result.item)
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "S: Deserialize<'de>, T: Deserialize<'de>"))]
struct FindItemsResponse<S, T> {
    #[serde(
        rename = "CommonServiceItems",
        default = "Vec::new",
        deserialize_with = "de::null_default"
    )]
    items: Vec<ApiItem<S, T>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "S: Deserialize<'de>, T: Deserialize<'de>"))]
struct ReadItemResponse<S, T> {
    #[serde(rename = "CommonServiceItem")]
    item: ApiItem<S, T>,
}

/// One common service item; `S` and `T` type the class-specific
/// `Settings` and `Status` blocks.
#[derive(Debug, Deserialize)]
#[serde(
    rename_all = "PascalCase",
    bound(deserialize = "S: Deserialize<'de>, T: Deserialize<'de>")
)]
pub(super) struct ApiItem<S, T> {
    #[serde(rename = "ID", default, deserialize_with = "de::string_id")]
    pub(super) id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub(super) name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub(super) description: String,
    #[serde(default, deserialize_with = "de::null_default")]
    pub(super) tags: Vec<String>,
    #[serde(default, deserialize_with = "de::null_default")]
    pub(super) service_class: String,
    #[serde(default)]
    pub(super) provider: Option<ApiProvider>,
    #[serde(default = "Option::default")]
    pub(super) settings: Option<S>,
    #[serde(default = "Option::default")]
    pub(super) status: Option<T>,
    #[serde(default)]
    pub(super) created_at: Option<String>,
    #[serde(default)]
    pub(super) modified_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiProvider {
    #[serde(rename = "Class", default, deserialize_with = "de::null_default")]
    class: String,
}

impl<S, T> ApiItem<S, T> {
    fn class(&self) -> Option<&str> {
        self.provider
            .as_ref()
            .map(|p| p.class.as_str())
            .filter(|c| !c.is_empty())
    }
}

impl ApiItem<ApiDnsSettings, ApiDnsStatus> {
    fn into_dns(self) -> DnsInfo {
        let records = self
            .settings
            .and_then(|s| s.dns)
            .map(|d| d.resource_record_sets)
            .unwrap_or_default()
            .into_iter()
            .map(|r| DnsRecord {
                name: r.name,
                record_type: r.record_type,
                rdata: r.rdata,
                ttl: r.ttl,
            })
            .collect();

        DnsInfo {
            id: self.id,
            name: self.name,
            description: self.description,
            zone: self.status.unwrap_or_default().zone,
            records,
        }
    }
}

impl ApiItem<ApiGslbSettings, ApiFqdnStatus> {
    fn into_gslb(self) -> GslbInfo {
        let gslb = self.settings.and_then(|s| s.gslb).unwrap_or_default();
        let servers = gslb
            .servers
            .into_iter()
            .map(|s| GslbServerInfo {
                ip_address: s.ip_address,
                enabled: s.enabled,
                weight: s.weight,
            })
            .collect();
        let health_check = gslb.health_check.map(|h| GslbHealthCheckInfo {
            protocol: h.protocol,
            host_header: h.host,
            path: h.path,
            response_code: h.status,
            port: h.port,
        });

        GslbInfo {
            id: self.id,
            name: self.name,
            description: self.description,
            fqdn: self.status.unwrap_or_default().fqdn,
            sorry_server: gslb.sorry_server,
            servers,
            health_check,
            delay_loop: gslb.delay_loop,
            weighted: gslb.weighted,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiFqdnStatus {
    #[serde(rename = "FQDN", default, deserialize_with = "de::null_default")]
    fqdn: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiDnsSettings {
    #[serde(rename = "DNS", default)]
    dns: Option<ApiDnsBody>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiDnsBody {
    #[serde(rename = "ResourceRecordSets", default, deserialize_with = "de::null_default")]
    resource_record_sets: Vec<ApiDnsRecord>,
}

#[derive(Debug, Deserialize)]
struct ApiDnsRecord {
    #[serde(rename = "Name", default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(rename = "Type", default, deserialize_with = "de::null_default")]
    record_type: String,
    #[serde(rename = "RData", default, deserialize_with = "de::null_default")]
    rdata: String,
    #[serde(rename = "TTL", default, deserialize_with = "de::lenient_i64")]
    ttl: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ApiDnsStatus {
    #[serde(rename = "Zone", default, deserialize_with = "de::null_default")]
    zone: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiGslbSettings {
    #[serde(rename = "GSLB", default)]
    gslb: Option<ApiGslbBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiGslbBody {
    #[serde(default, deserialize_with = "de::lenient_i64")]
    delay_loop: i64,
    #[serde(default, deserialize_with = "de::flag")]
    weighted: bool,
    #[serde(default, deserialize_with = "de::null_default")]
    sorry_server: String,
    #[serde(default)]
    health_check: Option<ApiGslbHealthCheck>,
    #[serde(default, deserialize_with = "de::null_default")]
    servers: Vec<ApiGslbServer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiGslbHealthCheck {
    #[serde(default, deserialize_with = "de::null_default")]
    protocol: String,
    #[serde(default, deserialize_with = "de::null_default")]
    host: String,
    #[serde(default, deserialize_with = "de::null_default")]
    path: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    status: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    port: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiGslbServer {
    #[serde(rename = "IPAddress", default, deserialize_with = "de::null_default")]
    ip_address: String,
    #[serde(default, deserialize_with = "de::flag")]
    enabled: bool,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    weight: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiCaStatus {
    #[serde(default)]
    subject: Option<ApiCaSubject>,
    #[serde(default, deserialize_with = "de::null_default")]
    common_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiCaSubject {
    #[serde(rename = "CommonName", default, deserialize_with = "de::null_default")]
    common_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSimpleMonitorSettings {
    #[serde(rename = "SimpleMonitor", default)]
    simple_monitor: Option<ApiSimpleMonitorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiSimpleMonitorBody {
    #[serde(rename = "Enabled", default, deserialize_with = "de::flag")]
    enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSimpleMonitorStatus {
    #[serde(rename = "Target", default, deserialize_with = "de::null_default")]
    target: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiRegistrySettings {
    #[serde(rename = "ContainerRegistry", default)]
    container_registry: Option<ApiRegistryBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiRegistryBody {
    #[serde(default, deserialize_with = "de::null_default")]
    public: String,
    #[serde(default, deserialize_with = "de::null_default")]
    virtual_domain: String,
}

#[derive(Debug, Deserialize)]
struct RegistryUsersResponse {
    #[serde(rename = "ContainerRegistry", default)]
    container_registry: Option<ApiRegistryUsers>,
}

#[derive(Debug, Deserialize)]
struct ApiRegistryUsers {
    #[serde(rename = "Users", default, deserialize_with = "de::null_default")]
    users: Vec<ApiRegistryUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiRegistryUser {
    #[serde(default, deserialize_with = "de::null_default")]
    user_name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    permission: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiEnhancedDbStatus {
    #[serde(default, deserialize_with = "de::null_default")]
    database_name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    database_type: String,
    #[serde(default, deserialize_with = "de::null_default")]
    region: String,
    #[serde(default, deserialize_with = "de::null_default")]
    host_name: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    port: i64,
}
