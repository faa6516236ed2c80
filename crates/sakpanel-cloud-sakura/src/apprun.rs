//! AppRun dedicated API client
//!
//! Clusters, applications and their versions, and the auto scaling groups,
//! load balancers and nodes behind a cluster. Every list call carries a
//! bounded `maxItems` and returns a [`Page`].

use crate::transport::{Auth, Credentials, HttpBackend, join_url};
use reqwest::Method;
use sakpanel_cloud::view::{de, format_unix};
use sakpanel_cloud::{BackendKind, CloudError, Page, PageBound, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

const CLUSTERS: PageBound = PageBound::new(5, 30);
const APPLICATIONS: PageBound = PageBound::new(1, 30);
const VERSIONS: PageBound = PageBound::new(1, 30);
const AUTO_SCALING_GROUPS: PageBound = PageBound::new(1, 30);
const LOAD_BALANCERS: PageBound = PageBound::new(2, 30);
const WORKER_NODES: PageBound = PageBound::new(2, 100);
const LOAD_BALANCER_NODES: PageBound = PageBound::new(2, 30);

/// Page size and continuation cursor for a list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub max_items: Option<u32>,
    pub cursor: Option<String>,
}

impl ListParams {
    pub fn cursor(cursor: impl Into<String>) -> Self {
        Self {
            max_items: None,
            cursor: Some(cursor.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub id: String,
    pub cluster_id: String,
    pub name: String,
    /// 0 when no version is active
    pub active_version: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppVersionInfo {
    pub version: i64,
    pub image: String,
    pub active_node_count: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposedPortInfo {
    pub target_port: i64,
    pub load_balancer_port: i64,
    pub use_lets_encrypt: bool,
    /// Comma-separated host names
    pub hosts: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarInfo {
    pub key: String,
    pub value: String,
    pub secret: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppVersionDetailInfo {
    pub version: i64,
    pub cpu: i64,
    pub memory: i64,
    pub scaling_mode: String,
    pub fixed_scale: i64,
    pub min_scale: i64,
    pub max_scale: i64,
    pub scale_in_threshold: i64,
    pub scale_out_threshold: i64,
    pub image: String,
    pub cmd: Vec<String>,
    pub active_node_count: i64,
    pub created_at: String,
    pub exposed_ports: Vec<ExposedPortInfo>,
    pub env: Vec<EnvVarInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AsgInfo {
    pub id: String,
    pub name: String,
    pub zone: String,
    pub min_nodes: i64,
    pub max_nodes: i64,
    pub worker_node_count: i64,
    pub interfaces: Vec<AsgInterface>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AsgInterface {
    pub index: i64,
    pub upstream: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LbInfo {
    pub id: String,
    pub name: String,
    pub service_class_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInterface {
    pub index: i64,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerNodeInfo {
    pub id: String,
    pub status: String,
    pub draining: bool,
    pub interfaces: Vec<NodeInterface>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LbNodeInfo {
    pub id: String,
    pub status: String,
    pub interfaces: Vec<NodeInterface>,
}

/// AppRun dedicated API handle
#[derive(Debug, Clone)]
pub struct AppRunClient {
    http: HttpBackend,
    base: String,
}

impl AppRunClient {
    pub fn new(http: reqwest::Client, base: impl Into<String>, creds: &Credentials) -> Self {
        Self {
            http: HttpBackend::new(http, BackendKind::AppRunDedicated, Auth::basic(creds)),
            base: base.into(),
        }
    }

    pub async fn clusters(&self, params: ListParams) -> Result<Page<ClusterInfo>> {
        let (page_size, result): (_, ClustersResponse) =
            self.list("clusters", CLUSTERS, &params, &[]).await?;
        let items = result
            .clusters
            .into_iter()
            .map(|c| ClusterInfo {
                id: c.cluster_id,
                name: c.name,
            })
            .collect();
        Ok(Page::new(items, page_size, result.next_cursor))
    }

    /// Applications, optionally narrowed to one cluster
    pub async fn applications(
        &self,
        cluster_id: Option<&str>,
        params: ListParams,
    ) -> Result<Page<AppInfo>> {
        let cluster_id = cluster_id
            .filter(|c| !c.trim().is_empty())
            .map(|c| parse_uuid("cluster ID", c))
            .transpose()?;
        let filter: Vec<(&str, String)> = cluster_id
            .map(|id| vec![("clusterID", id.to_string())])
            .unwrap_or_default();

        let (page_size, result): (_, ApplicationsResponse) = self
            .list("applications", APPLICATIONS, &params, &filter)
            .await?;
        let items = result
            .applications
            .into_iter()
            .map(|a| AppInfo {
                id: a.application_id,
                cluster_id: a.cluster_id,
                name: a.name,
                active_version: a.active_version,
            })
            .collect();
        Ok(Page::new(items, page_size, result.next_cursor))
    }

    pub async fn versions(
        &self,
        application_id: &str,
        params: ListParams,
    ) -> Result<Page<AppVersionInfo>> {
        let app = parse_uuid("application ID", application_id)?;
        let (page_size, result): (_, VersionsResponse) = self
            .list(&format!("applications/{}/versions", app), VERSIONS, &params, &[])
            .await?;
        let items = result
            .versions
            .into_iter()
            .map(|v| AppVersionInfo {
                version: v.version,
                image: v.image,
                active_node_count: v.active_node_count,
                created_at: format_unix(v.created),
            })
            .collect();
        Ok(Page::new(items, page_size, result.next_cursor))
    }

    pub async fn version(&self, application_id: &str, version: u32) -> Result<AppVersionDetailInfo> {
        let app = parse_uuid("application ID", application_id)?;
        let url = join_url(&self.base, &format!("applications/{}/versions/{}", app, version));
        let result: VersionResponse = self.http.get_json(&url).await?;
        Ok(result.application_version.into_info())
    }

    pub async fn set_active_version(&self, application_id: &str, version: u32) -> Result<()> {
        self.patch_active_version(application_id, Some(version)).await
    }

    pub async fn clear_active_version(&self, application_id: &str) -> Result<()> {
        self.patch_active_version(application_id, None).await
    }

    async fn patch_active_version(&self, application_id: &str, version: Option<u32>) -> Result<()> {
        let app = parse_uuid("application ID", application_id)?;
        tracing::debug!("Setting active version of {} to {:?}", app, version);
        let url = join_url(&self.base, &format!("applications/{}", app));
        let request = self
            .http
            .request(Method::PATCH, &url)
            .json(&json!({ "activeVersion": version }));
        self.http.unit(request).await
    }

    pub async fn auto_scaling_groups(
        &self,
        cluster_id: &str,
        params: ListParams,
    ) -> Result<Page<AsgInfo>> {
        let cluster = parse_uuid("cluster ID", cluster_id)?;
        let (page_size, result): (_, AsgsResponse) = self
            .list(
                &format!("clusters/{}/auto-scaling-groups", cluster),
                AUTO_SCALING_GROUPS,
                &params,
                &[],
            )
            .await?;
        let items = result
            .auto_scaling_groups
            .into_iter()
            .map(|a| AsgInfo {
                id: a.auto_scaling_group_id,
                name: a.name,
                zone: a.zone,
                min_nodes: a.min_nodes,
                max_nodes: a.max_nodes,
                worker_node_count: a.worker_node_count,
                interfaces: a
                    .interfaces
                    .into_iter()
                    .map(|i| AsgInterface {
                        index: i.interface_index,
                        upstream: i.upstream,
                    })
                    .collect(),
            })
            .collect();
        Ok(Page::new(items, page_size, result.next_cursor))
    }

    pub async fn load_balancers(
        &self,
        cluster_id: &str,
        asg_id: &str,
        params: ListParams,
    ) -> Result<Page<LbInfo>> {
        let path = asg_path(cluster_id, asg_id)?;
        let (page_size, result): (_, LbsResponse) = self
            .list(
                &format!("{}/load-balancers", path),
                LOAD_BALANCERS,
                &params,
                &[],
            )
            .await?;
        let items = result
            .load_balancers
            .into_iter()
            .map(|lb| LbInfo {
                id: lb.load_balancer_id,
                name: lb.name,
                service_class_path: lb.service_class_path,
            })
            .collect();
        Ok(Page::new(items, page_size, result.next_cursor))
    }

    pub async fn worker_nodes(
        &self,
        cluster_id: &str,
        asg_id: &str,
        params: ListParams,
    ) -> Result<Page<WorkerNodeInfo>> {
        let path = asg_path(cluster_id, asg_id)?;
        let (page_size, result): (_, WorkerNodesResponse) = self
            .list(&format!("{}/worker-nodes", path), WORKER_NODES, &params, &[])
            .await?;
        let items = result
            .worker_nodes
            .into_iter()
            .map(|n| WorkerNodeInfo {
                id: n.worker_node_id,
                status: n.status,
                draining: n.draining,
                interfaces: n
                    .network_interfaces
                    .into_iter()
                    .map(ApiNodeInterface::into_info)
                    .collect(),
            })
            .collect();
        Ok(Page::new(items, page_size, result.next_cursor))
    }

    pub async fn load_balancer_nodes(
        &self,
        cluster_id: &str,
        asg_id: &str,
        lb_id: &str,
        params: ListParams,
    ) -> Result<Page<LbNodeInfo>> {
        let path = asg_path(cluster_id, asg_id)?;
        let lb = parse_uuid("load balancer ID", lb_id)?;
        let (page_size, result): (_, LbNodesResponse) = self
            .list(
                &format!("{}/load-balancers/{}/nodes", path, lb),
                LOAD_BALANCER_NODES,
                &params,
                &[],
            )
            .await?;
        let items = result
            .load_balancer_nodes
            .into_iter()
            .map(|n| LbNodeInfo {
                id: n.load_balancer_node_id,
                status: n.status,
                interfaces: n
                    .interfaces
                    .into_iter()
                    .map(ApiNodeInterface::into_info)
                    .collect(),
            })
            .collect();
        Ok(Page::new(items, page_size, result.next_cursor))
    }

    /// `GET {path}?maxItems=N[&cursor=..]` with the page size clamped to `bound`
    async fn list<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        bound: PageBound,
        params: &ListParams,
        extra: &[(&str, String)],
    ) -> Result<(u32, T)> {
        let page_size = bound.clamp(params.max_items);
        let mut query: Vec<(&str, String)> = vec![("maxItems", page_size.to_string())];
        if let Some(cursor) = params.cursor.as_deref().filter(|c| !c.is_empty()) {
            query.push(("cursor", cursor.to_string()));
        }
        query.extend(extra.iter().cloned());

        let url = join_url(&self.base, path);
        let result = self
            .http
            .json(self.http.request(Method::GET, &url).query(&query))
            .await?;
        Ok((page_size, result))
    }
}

fn parse_uuid(what: &'static str, value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| CloudError::invalid_id(what, value))
}

fn asg_path(cluster_id: &str, asg_id: &str) -> Result<String> {
    let cluster = parse_uuid("cluster ID", cluster_id)?;
    let asg = parse_uuid("auto scaling group ID", asg_id)?;
    Ok(format!("clusters/{}/auto-scaling-groups/{}", cluster, asg))
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClustersResponse {
    #[serde(default, deserialize_with = "de::null_default")]
    clusters: Vec<ApiCluster>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCluster {
    #[serde(rename = "clusterID", default, deserialize_with = "de::string_id")]
    cluster_id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApplicationsResponse {
    #[serde(default, deserialize_with = "de::null_default")]
    applications: Vec<ApiApplication>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiApplication {
    #[serde(rename = "applicationID", default, deserialize_with = "de::string_id")]
    application_id: String,
    #[serde(rename = "clusterID", default, deserialize_with = "de::string_id")]
    cluster_id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    active_version: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionsResponse {
    #[serde(default, deserialize_with = "de::null_default")]
    versions: Vec<ApiVersionSummary>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiVersionSummary {
    #[serde(default, deserialize_with = "de::lenient_i64")]
    version: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    image: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    active_node_count: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    created: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionResponse {
    application_version: ApiVersionDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiVersionDetail {
    #[serde(default, deserialize_with = "de::lenient_i64")]
    version: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    cpu: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    memory: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    scaling_mode: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    fixed_scale: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    min_scale: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    max_scale: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    scale_in_threshold: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    scale_out_threshold: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    image: String,
    #[serde(default, deserialize_with = "de::null_default")]
    cmd: Vec<String>,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    active_node_count: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    created: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    exposed_ports: Vec<ApiExposedPort>,
    #[serde(default, deserialize_with = "de::null_default")]
    env: Vec<ApiEnvVar>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiExposedPort {
    #[serde(default, deserialize_with = "de::lenient_i64")]
    target_port: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    load_balancer_port: i64,
    #[serde(default, deserialize_with = "de::flag")]
    use_lets_encrypt: bool,
    #[serde(default, deserialize_with = "de::null_default")]
    host: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiEnvVar {
    #[serde(default, deserialize_with = "de::null_default")]
    key: String,
    #[serde(default, deserialize_with = "de::null_default")]
    value: String,
    #[serde(default, deserialize_with = "de::flag")]
    secret: bool,
}

impl ApiVersionDetail {
    fn into_info(self) -> AppVersionDetailInfo {
        AppVersionDetailInfo {
            version: self.version,
            cpu: self.cpu,
            memory: self.memory,
            scaling_mode: self.scaling_mode,
            fixed_scale: self.fixed_scale,
            min_scale: self.min_scale,
            max_scale: self.max_scale,
            scale_in_threshold: self.scale_in_threshold,
            scale_out_threshold: self.scale_out_threshold,
            image: self.image,
            cmd: self.cmd,
            active_node_count: self.active_node_count,
            created_at: format_unix(self.created),
            exposed_ports: self
                .exposed_ports
                .into_iter()
                .map(|p| ExposedPortInfo {
                    target_port: p.target_port,
                    load_balancer_port: p.load_balancer_port,
                    use_lets_encrypt: p.use_lets_encrypt,
                    hosts: p.host.join(", "),
                })
                .collect(),
            env: self
                .env
                .into_iter()
                .map(|e| EnvVarInfo {
                    key: e.key,
                    value: e.value,
                    secret: e.secret,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AsgsResponse {
    #[serde(default, deserialize_with = "de::null_default")]
    auto_scaling_groups: Vec<ApiAsg>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAsg {
    #[serde(rename = "autoScalingGroupID", default, deserialize_with = "de::string_id")]
    auto_scaling_group_id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    zone: String,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    min_nodes: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    max_nodes: i64,
    #[serde(default, deserialize_with = "de::lenient_i64")]
    worker_node_count: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    interfaces: Vec<ApiAsgInterface>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAsgInterface {
    #[serde(default, deserialize_with = "de::lenient_i64")]
    interface_index: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    upstream: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LbsResponse {
    #[serde(default, deserialize_with = "de::null_default")]
    load_balancers: Vec<ApiLb>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiLb {
    #[serde(rename = "loadBalancerID", default, deserialize_with = "de::string_id")]
    load_balancer_id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    service_class_path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkerNodesResponse {
    #[serde(default, deserialize_with = "de::null_default")]
    worker_nodes: Vec<ApiWorkerNode>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiWorkerNode {
    #[serde(rename = "workerNodeID", default, deserialize_with = "de::string_id")]
    worker_node_id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    status: String,
    #[serde(default, deserialize_with = "de::flag")]
    draining: bool,
    #[serde(default, deserialize_with = "de::null_default")]
    network_interfaces: Vec<ApiNodeInterface>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LbNodesResponse {
    #[serde(default, deserialize_with = "de::null_default")]
    load_balancer_nodes: Vec<ApiLbNode>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiLbNode {
    #[serde(rename = "loadBalancerNodeID", default, deserialize_with = "de::string_id")]
    load_balancer_node_id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    status: String,
    #[serde(default, deserialize_with = "de::null_default")]
    interfaces: Vec<ApiNodeInterface>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiNodeInterface {
    #[serde(default, deserialize_with = "de::lenient_i64")]
    interface_index: i64,
    #[serde(default, deserialize_with = "de::null_default")]
    addresses: Vec<ApiAddress>,
}

#[derive(Debug, Deserialize)]
struct ApiAddress {
    #[serde(default, deserialize_with = "de::null_default")]
    address: String,
}

impl ApiNodeInterface {
    fn into_info(self) -> NodeInterface {
        NodeInterface {
            index: self.interface_index,
            addresses: self.addresses.into_iter().map(|a| a.address).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        assert_eq!(CLUSTERS.clamp(None), 30);
        assert_eq!(CLUSTERS.clamp(Some(1)), 5);
        assert_eq!(WORKER_NODES.clamp(None), 100);
        assert_eq!(LOAD_BALANCERS.clamp(Some(1)), 2);
        assert_eq!(APPLICATIONS.clamp(Some(500)), 30);
    }

    #[test]
    fn test_parse_uuid() {
        let id = parse_uuid("cluster ID", " 0f0e8b7c-3c33-4f3b-9a57-1f1d1c0b0a09 ").unwrap();
        assert_eq!(id.to_string(), "0f0e8b7c-3c33-4f3b-9a57-1f1d1c0b0a09");
        assert!(matches!(
            parse_uuid("cluster ID", "not-a-uuid"),
            Err(CloudError::InvalidIdentifier { what: "cluster ID", .. })
        ));
    }

    #[test]
    fn test_version_detail_mapping() {
        let raw = r#"{"applicationVersion": {
            "version": 3,
            "cpu": 1000,
            "memory": 2048,
            "scalingMode": "cpu",
            "fixedScale": null,
            "minScale": 1,
            "maxScale": 4,
            "image": "registry.example/app:3",
            "cmd": null,
            "activeNodeCount": 2,
            "created": 1700000000,
            "exposedPorts": [{
                "targetPort": 8080,
                "loadBalancerPort": null,
                "useLetsEncrypt": true,
                "host": ["a.example.com", "b.example.com"]
            }],
            "env": [{"key": "TOKEN", "value": null, "secret": true}]
        }}"#;
        let result: VersionResponse = serde_json::from_str(raw).unwrap();
        let info = result.application_version.into_info();
        assert_eq!(info.fixed_scale, 0);
        assert!(info.cmd.is_empty());
        assert_eq!(info.created_at, "2023-11-14T22:13:20Z");
        assert_eq!(info.exposed_ports[0].load_balancer_port, 0);
        assert_eq!(info.exposed_ports[0].hosts, "a.example.com, b.example.com");
        assert_eq!(info.env[0].value, "");
        assert!(info.env[0].secret);
    }

    #[test]
    fn test_application_without_active_version() {
        let raw = r#"{"applications": [{
            "applicationID": "8c1c2d4e-0000-4000-8000-000000000001",
            "clusterID": "8c1c2d4e-0000-4000-8000-000000000002",
            "name": "api",
            "activeVersion": null
        }], "nextCursor": null}"#;
        let result: ApplicationsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(result.applications[0].active_version, 0);
        assert!(result.next_cursor.is_none());
    }
}
