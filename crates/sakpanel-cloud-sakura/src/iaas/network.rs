//! Switches and packet filters

use super::IaasClient;
use sakpanel_cloud::view::de;
use sakpanel_cloud::{ResourceFamily, Result, Scope};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub server_count: i64,
    pub network_mask_len: i64,
    pub default_route: String,
    pub scope: String,
    /// Filled by `get` only
    pub subnets: Vec<SwitchSubnetInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchSubnetInfo {
    pub id: String,
    pub network_address: String,
    pub network_mask_len: i64,
    pub default_route: String,
    pub next_hop: String,
    pub static_route: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketFilterInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Filled by `get` only
    pub rules: Vec<PacketFilterRuleInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketFilterRuleInfo {
    pub protocol: String,
    pub source_network: String,
    pub source_port: String,
    pub destination_port: String,
    pub action: String,
    pub description: String,
}

pub struct SwitchService<'a> {
    client: &'a IaasClient,
}

impl<'a> SwitchService<'a> {
    pub(super) fn new(client: &'a IaasClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, zone: &str) -> Result<Vec<SwitchInfo>> {
        let scope = Scope::Zone(zone.to_string());
        let result: FindSwitchesResponse = self.client.find(&scope, "switch", None).await?;
        Ok(result
            .switches
            .into_iter()
            .map(|sw| sw.into_info(false))
            .collect())
    }

    pub async fn get(&self, zone: &str, id: &str) -> Result<SwitchInfo> {
        let scope = Scope::Zone(zone.to_string());
        let result: ReadSwitchResponse = self
            .client
            .read(ResourceFamily::Switch, &scope, "switch", id)
            .await?;
        Ok(result.switch.into_info(true))
    }
}

pub struct PacketFilterService<'a> {
    client: &'a IaasClient,
}

impl<'a> PacketFilterService<'a> {
    pub(super) fn new(client: &'a IaasClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, zone: &str) -> Result<Vec<PacketFilterInfo>> {
        let scope = Scope::Zone(zone.to_string());
        let result: FindPacketFiltersResponse =
            self.client.find(&scope, "packetfilter", None).await?;
        Ok(result
            .packet_filters
            .into_iter()
            .map(|pf| pf.into_info(false))
            .collect())
    }

    pub async fn get(&self, zone: &str, id: &str) -> Result<PacketFilterInfo> {
        let scope = Scope::Zone(zone.to_string());
        let result: ReadPacketFilterResponse = self
            .client
            .read(ResourceFamily::PacketFilter, &scope, "packetfilter", id)
            .await?;
        Ok(result.packet_filter.into_info(true))
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct FindSwitchesResponse {
    #[serde(rename = "Switches", default, deserialize_with = "de::null_default")]
    switches: Vec<ApiSwitch>,
}

#[derive(Debug, Deserialize)]
struct ReadSwitchResponse {
    #[serde(rename = "Switch")]
    switch: ApiSwitch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiSwitch {
    #[serde(rename = "ID", default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    description: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    server_count: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    scope: String,
    #[serde(default)]
    user_subnet: Option<ApiUserSubnet>,
    #[serde(default, deserialize_with = "de::null_default")]
    subnets: Vec<ApiSubnet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiUserSubnet {
    #[serde(default, deserialize_with = "de::null_default")]
    default_route: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    network_mask_len: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiSubnet {
    #[serde(rename = "ID", default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    network_address: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    network_mask_len: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    default_route: String,
    #[serde(default, deserialize_with = "de::null_default")]
    next_hop: String,
    #[serde(default, deserialize_with = "de::null_default")]
    static_route: String,
}

impl ApiSwitch {
    fn into_info(self, with_subnets: bool) -> SwitchInfo {
        // The user subnet wins; router-backed switches only describe it in Subnets[0].
        let (network_mask_len, default_route) = match (&self.user_subnet, self.subnets.first()) {
            (Some(user), _) if user.network_mask_len > 0 => {
                (user.network_mask_len, user.default_route.clone())
            }
            (_, Some(first)) => (first.network_mask_len, first.default_route.clone()),
            _ => (0, String::new()),
        };
        let subnets = if with_subnets {
            self.subnets
                .into_iter()
                .map(|s| SwitchSubnetInfo {
                    id: s.id,
                    network_address: s.network_address,
                    network_mask_len: s.network_mask_len,
                    default_route: s.default_route,
                    next_hop: s.next_hop,
                    static_route: s.static_route,
                })
                .collect()
        } else {
            Vec::new()
        };

        SwitchInfo {
            id: self.id,
            name: self.name,
            description: self.description,
            server_count: self.server_count,
            network_mask_len,
            default_route,
            scope: self.scope,
            subnets,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FindPacketFiltersResponse {
    #[serde(rename = "PacketFilters", default, deserialize_with = "de::null_default")]
    packet_filters: Vec<ApiPacketFilter>,
}

#[derive(Debug, Deserialize)]
struct ReadPacketFilterResponse {
    #[serde(rename = "PacketFilter")]
    packet_filter: ApiPacketFilter,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiPacketFilter {
    #[serde(rename = "ID", default, deserialize_with = "de::string_id")]
    id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    description: String,
    #[serde(default, deserialize_with = "de::null_default")]
    expression: Vec<ApiExpression>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiExpression {
    #[serde(default, deserialize_with = "de::null_default")]
    protocol: String,
    #[serde(default, deserialize_with = "de::null_default")]
    source_network: String,
    #[serde(default, deserialize_with = "de::null_default")]
    source_port: String,
    #[serde(default, deserialize_with = "de::null_default")]
    destination_port: String,
    #[serde(default, deserialize_with = "de::null_default")]
    action: String,
    #[serde(default, deserialize_with = "de::null_default")]
    description: String,
}

impl ApiPacketFilter {
    fn into_info(self, with_rules: bool) -> PacketFilterInfo {
        let rules = if with_rules {
            self.expression
                .into_iter()
                .map(|e| PacketFilterRuleInfo {
                    protocol: e.protocol,
                    source_network: e.source_network,
                    source_port: e.source_port,
                    destination_port: e.destination_port,
                    action: e.action,
                    description: e.description,
                })
                .collect()
        } else {
            Vec::new()
        };

        PacketFilterInfo {
            id: self.id,
            name: self.name,
            description: self.description,
            rules,
        }
    }
}
