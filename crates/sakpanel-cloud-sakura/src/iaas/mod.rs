//! IaaS API client
//!
//! Zone-scoped resources live under `/cloud/zone/{zone}/api/cloud/1.1`; global
//! resources use the same API through the `is1a` zone path. Authentication is
//! the profile's token/secret pair as HTTP basic auth.

mod auth;
mod bill;
mod common_service;
mod database;
mod disk;
mod network;
mod proxylb;
mod server;

pub use auth::{AuthInfo, AuthStatusService, validate_credentials};
pub use bill::{BillDetailInfo, BillInfo, BillService};
pub use common_service::{
    CertificateInfo, CommonServiceItems, ContainerRegistryInfo, ContainerRegistryUserInfo,
    DnsInfo, DnsRecord, EnhancedDbInfo, GslbHealthCheckInfo, GslbInfo, GslbServerInfo,
    SimpleMonitorInfo,
};
pub use database::{DatabaseInfo, DatabaseService};
pub use disk::{ArchiveInfo, ArchiveService, DiskInfo, DiskService};
pub use network::{
    PacketFilterInfo, PacketFilterRuleInfo, PacketFilterService, SwitchInfo, SwitchService,
    SwitchSubnetInfo,
};
pub use proxylb::{
    ProxyLbBindPortInfo, ProxyLbHealthInfo, ProxyLbInfo, ProxyLbServerInfo, ProxyLbService,
    ProxyLbServerStatusInfo,
};
pub use server::{ServerInfo, ServerService};

use crate::endpoints::Endpoints;
use crate::transport::{Auth, Credentials, HttpBackend, join_url};
use reqwest::Method;
use sakpanel_cloud::{BackendKind, CloudError, ResourceFamily, Result, Scope};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// IaaS API handle bound to one profile's credentials
#[derive(Debug, Clone)]
pub struct IaasClient {
    http: HttpBackend,
    endpoints: Endpoints,
}

impl IaasClient {
    pub fn new(http: reqwest::Client, endpoints: &Endpoints, creds: &Credentials) -> Self {
        Self {
            http: HttpBackend::new(http, BackendKind::GenericCloud, Auth::basic(creds)),
            endpoints: endpoints.clone(),
        }
    }

    pub fn servers(&self) -> ServerService<'_> {
        ServerService::new(self)
    }

    pub fn switches(&self) -> SwitchService<'_> {
        SwitchService::new(self)
    }

    pub fn packet_filters(&self) -> PacketFilterService<'_> {
        PacketFilterService::new(self)
    }

    pub fn disks(&self) -> DiskService<'_> {
        DiskService::new(self)
    }

    pub fn archives(&self) -> ArchiveService<'_> {
        ArchiveService::new(self)
    }

    pub fn databases(&self) -> DatabaseService<'_> {
        DatabaseService::new(self)
    }

    /// DNS, GSLB, certificates, simple monitors, container registries, enhanced DB
    pub fn common_service_items(&self) -> CommonServiceItems<'_> {
        CommonServiceItems::new(self)
    }

    pub fn proxy_lbs(&self) -> ProxyLbService<'_> {
        ProxyLbService::new(self)
    }

    pub fn bills(&self) -> BillService<'_> {
        BillService::new(self)
    }

    pub fn auth_status(&self) -> AuthStatusService<'_> {
        AuthStatusService::new(self)
    }

    fn url(&self, scope: &Scope, path: &str) -> String {
        join_url(&self.endpoints.iaas(scope.api_zone()), path)
    }

    /// `GET {path}` with an optional JSON search condition in the query string
    pub(crate) async fn find<T: DeserializeOwned>(
        &self,
        scope: &Scope,
        path: &str,
        condition: Option<Value>,
    ) -> Result<T> {
        let mut url = url::Url::parse(&self.url(scope, path))
            .map_err(|e| CloudError::backend(BackendKind::GenericCloud, None, e.to_string()))?;
        if let Some(condition) = condition {
            url.set_query(Some(&condition.to_string()));
        }
        self.http
            .json(self.http.request(Method::GET, url.as_str()))
            .await
    }

    /// `GET {path}/{id}`; an upstream 404 becomes `NotFound`
    pub(crate) async fn read<T: DeserializeOwned>(
        &self,
        family: ResourceFamily,
        scope: &Scope,
        path: &str,
        id: &str,
    ) -> Result<T> {
        let id = resource_id(id)?;
        let url = self.url(scope, &format!("{}/{}", path, id));
        self.http
            .get_json(&url)
            .await
            .map_err(|e| not_found(e, family, id))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, scope: &Scope, path: &str) -> Result<T> {
        self.http.get_json(&self.url(scope, path)).await
    }

    pub(crate) async fn call(
        &self,
        method: Method,
        scope: &Scope,
        path: &str,
        body: Option<Value>,
    ) -> Result<()> {
        let mut request = self.http.request(method, &self.url(scope, path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.http.unit(request).await
    }

    pub(crate) async fn billing<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.http
            .get_json(&join_url(&self.endpoints.billing, path))
            .await
    }
}

/// Sakura resource IDs are numeric; anything else never reaches the URL.
pub(crate) fn resource_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(CloudError::invalid_id("resource ID", id));
    }
    Ok(id)
}

fn not_found(err: CloudError, family: ResourceFamily, id: &str) -> CloudError {
    match err {
        CloudError::Backend {
            status: Some(404), ..
        } => CloudError::NotFound {
            family,
            id: id.to_string(),
        },
        other => other,
    }
}

/// Search condition selecting appliances or common service items by class
pub(crate) fn class_filter(key: &str, class: &str) -> Value {
    serde_json::json!({ "Filter": { key: class } })
}
