//! GUI-facing gateway
//!
//! Every operation takes a profile name, resolves the client for its resource
//! family through the [`ClientFactory`] and returns view models. Errors are
//! [`CloudError`]s; render them with [`CloudError::payload`].

use crate::factory::{BackendClient, ClientFactory, RegistryConnector};
use crate::metrics;
use crate::vault::{SecretKey, SecretNamespace, SecretString, Vault};
use sakpanel_cloud::{CloudError, Page, ResourceFamily, Result, ZoneInfo, resolve_scope, zones};
use sakpanel_cloud_sakura::apprun::{
    AppInfo, AppVersionDetailInfo, AppVersionInfo, AsgInfo, ClusterInfo, LbInfo, LbNodeInfo,
    WorkerNodeInfo,
};
use sakpanel_cloud_sakura::apprun_shared::{
    SharedAppDetailInfo, SharedAppInfo, SharedVersionInfo, TrafficInfo,
};
use sakpanel_cloud_sakura::iaas::{
    ArchiveInfo, AuthInfo, BillDetailInfo, BillInfo, CertificateInfo, ContainerRegistryInfo,
    ContainerRegistryUserInfo, DatabaseInfo, DiskInfo, DnsInfo, EnhancedDbInfo, GslbInfo,
    PacketFilterInfo, ProxyLbHealthInfo, ProxyLbInfo, ServerInfo, SimpleMonitorInfo, SwitchInfo,
};
use sakpanel_cloud_sakura::kms::KeyInfo;
use sakpanel_cloud_sakura::monitoring::{MetricsAccessKey, MetricsStorageDetail, StorageInfo};
use sakpanel_cloud_sakura::object_storage::{AccessKeyInfo, BucketInfo, SiteInfo};
use sakpanel_cloud_sakura::prometheus::{PrometheusLabel, QueryRangeResponse};
use sakpanel_cloud_sakura::registry::{RegistryImage, RegistryTag};
use sakpanel_cloud_sakura::s3::{JsonlPreview, ListObjectsResult, TextPreview};
use sakpanel_cloud_sakura::{
    AppRunClient, AppRunSharedClient, Credentials, Endpoints, IaasClient, KmsClient,
    ListObjectsParams, ListParams, MonitoringClient, ObjectStorageClient, PrometheusClient,
    QueryRangeParams, RegistryClient, S3Session, validate_credentials,
};
use sakpanel_config::{Profile, ProfileCredentials, ProfileStore};
use std::path::Path;

/// Text previews read at most this many bytes
pub const TEXT_PREVIEW_BYTES: u64 = 1024 * 1024;
/// Compressed bytes read for a JSONL preview
pub const JSONL_PREVIEW_BYTES: u64 = 1024 * 1024;
/// JSONL previews stop after this many lines
pub const JSONL_PREVIEW_LINES: usize = 100;

#[derive(Debug, Clone)]
pub struct Gateway {
    factory: ClientFactory,
    vault: Vault,
}

impl Gateway {
    pub fn new(profiles: ProfileStore, endpoints: Endpoints, vault: Vault) -> Result<Self> {
        Ok(Self {
            factory: ClientFactory::new(profiles, endpoints)?,
            vault,
        })
    }

    /// Profiles from `~/.usacloud`, production endpoints, OS keychain
    pub fn from_env() -> Result<Self> {
        Self::new(ProfileStore::from_env()?, Endpoints::default(), Vault::keyring())
    }

    pub fn factory(&self) -> &ClientFactory {
        &self.factory
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    fn profiles(&self) -> &ProfileStore {
        self.factory.profiles()
    }

    /// IaaS client plus the zone a zoned family should address
    fn zoned(
        &self,
        profile: &str,
        family: ResourceFamily,
        zone: Option<&str>,
    ) -> Result<(IaasClient, String)> {
        let (profile, client) = self.factory.client::<IaasClient>(profile, family)?;
        let scope = resolve_scope(family, zone, profile.default_zone.as_deref())?;
        Ok((client, scope.api_zone().to_string()))
    }

    fn global<C>(&self, profile: &str, family: ResourceFamily) -> Result<C>
    where
        C: TryFrom<BackendClient, Error = CloudError>,
    {
        let (_, client) = self.factory.client::<C>(profile, family)?;
        Ok(client)
    }

    // ========================================================================
    // Profiles
    // ========================================================================

    pub fn list_profiles(&self) -> Result<Vec<Profile>> {
        Ok(self.profiles().list_profiles()?)
    }

    pub fn current_profile(&self) -> String {
        self.profiles().current_profile_name()
    }

    pub fn set_current_profile(&self, name: &str) -> Result<()> {
        Ok(self.profiles().set_current(name)?)
    }

    pub fn profile_credentials(&self, name: &str) -> Result<ProfileCredentials> {
        Ok(self.profiles().credentials(name)?)
    }

    pub fn create_profile(&self, name: &str, creds: &ProfileCredentials) -> Result<()> {
        Ok(self.profiles().create_profile(name, creds)?)
    }

    pub fn update_profile(
        &self,
        old_name: &str,
        new_name: &str,
        creds: &ProfileCredentials,
    ) -> Result<()> {
        Ok(self.profiles().update_profile(old_name, new_name, creds)?)
    }

    pub fn delete_profile(&self, name: &str) -> Result<()> {
        Ok(self.profiles().delete_profile(name)?)
    }

    /// Never fails; unreadable profiles fall back to `is1a`.
    pub fn default_zone(&self, profile: &str) -> String {
        self.profiles().default_zone(profile)
    }

    pub fn zones(&self) -> Vec<ZoneInfo> {
        zones()
    }

    /// Check a token pair against the auth-status API without touching any profile.
    pub async fn validate_credentials(&self, token: &str, secret: &str) -> Result<AuthInfo> {
        validate_credentials(
            self.factory.http().clone(),
            self.factory.endpoints(),
            &Credentials::new(token, secret),
        )
        .await
    }

    pub async fn auth_info(&self, profile: &str) -> Result<AuthInfo> {
        let client: IaasClient = self.global(profile, ResourceFamily::AuthStatus)?;
        client.auth_status().read().await
    }

    // ========================================================================
    // Zoned IaaS resources
    // ========================================================================

    pub async fn list_servers(&self, profile: &str, zone: Option<&str>) -> Result<Vec<ServerInfo>> {
        let (client, zone) = self.zoned(profile, ResourceFamily::Server, zone)?;
        client.servers().list(&zone).await
    }

    pub async fn get_server(&self, profile: &str, zone: Option<&str>, id: &str) -> Result<ServerInfo> {
        let (client, zone) = self.zoned(profile, ResourceFamily::Server, zone)?;
        client.servers().get(&zone, id).await
    }

    pub async fn server_status(&self, profile: &str, zone: Option<&str>, id: &str) -> Result<String> {
        let (client, zone) = self.zoned(profile, ResourceFamily::Server, zone)?;
        client.servers().status(&zone, id).await
    }

    pub async fn power_on_server(&self, profile: &str, zone: Option<&str>, id: &str) -> Result<()> {
        let (client, zone) = self.zoned(profile, ResourceFamily::Server, zone)?;
        client.servers().power_on(&zone, id).await
    }

    pub async fn power_off_server(&self, profile: &str, zone: Option<&str>, id: &str) -> Result<()> {
        let (client, zone) = self.zoned(profile, ResourceFamily::Server, zone)?;
        client.servers().power_off(&zone, id).await
    }

    pub async fn force_stop_server(&self, profile: &str, zone: Option<&str>, id: &str) -> Result<()> {
        let (client, zone) = self.zoned(profile, ResourceFamily::Server, zone)?;
        client.servers().force_stop(&zone, id).await
    }

    pub async fn list_switches(&self, profile: &str, zone: Option<&str>) -> Result<Vec<SwitchInfo>> {
        let (client, zone) = self.zoned(profile, ResourceFamily::Switch, zone)?;
        client.switches().list(&zone).await
    }

    pub async fn get_switch(&self, profile: &str, zone: Option<&str>, id: &str) -> Result<SwitchInfo> {
        let (client, zone) = self.zoned(profile, ResourceFamily::Switch, zone)?;
        client.switches().get(&zone, id).await
    }

    pub async fn list_packet_filters(
        &self,
        profile: &str,
        zone: Option<&str>,
    ) -> Result<Vec<PacketFilterInfo>> {
        let (client, zone) = self.zoned(profile, ResourceFamily::PacketFilter, zone)?;
        client.packet_filters().list(&zone).await
    }

    pub async fn get_packet_filter(
        &self,
        profile: &str,
        zone: Option<&str>,
        id: &str,
    ) -> Result<PacketFilterInfo> {
        let (client, zone) = self.zoned(profile, ResourceFamily::PacketFilter, zone)?;
        client.packet_filters().get(&zone, id).await
    }

    pub async fn list_disks(&self, profile: &str, zone: Option<&str>) -> Result<Vec<DiskInfo>> {
        let (client, zone) = self.zoned(profile, ResourceFamily::Disk, zone)?;
        client.disks().list(&zone).await
    }

    /// User-scope archives only
    pub async fn list_archives(&self, profile: &str, zone: Option<&str>) -> Result<Vec<ArchiveInfo>> {
        let (client, zone) = self.zoned(profile, ResourceFamily::Archive, zone)?;
        client.archives().list(&zone).await
    }

    pub async fn list_databases(&self, profile: &str, zone: Option<&str>) -> Result<Vec<DatabaseInfo>> {
        let (client, zone) = self.zoned(profile, ResourceFamily::Database, zone)?;
        client.databases().list(&zone).await
    }

    // ========================================================================
    // Global IaaS resources
    // ========================================================================

    pub async fn list_dns(&self, profile: &str) -> Result<Vec<DnsInfo>> {
        let client: IaasClient = self.global(profile, ResourceFamily::Dns)?;
        client.common_service_items().list_dns().await
    }

    pub async fn get_dns(&self, profile: &str, id: &str) -> Result<DnsInfo> {
        let client: IaasClient = self.global(profile, ResourceFamily::Dns)?;
        client.common_service_items().get_dns(id).await
    }

    pub async fn list_gslb(&self, profile: &str) -> Result<Vec<GslbInfo>> {
        let client: IaasClient = self.global(profile, ResourceFamily::Gslb)?;
        client.common_service_items().list_gslb().await
    }

    pub async fn get_gslb(&self, profile: &str, id: &str) -> Result<GslbInfo> {
        let client: IaasClient = self.global(profile, ResourceFamily::Gslb)?;
        client.common_service_items().get_gslb(id).await
    }

    pub async fn list_certificates(&self, profile: &str) -> Result<Vec<CertificateInfo>> {
        let client: IaasClient = self.global(profile, ResourceFamily::Certificate)?;
        client.common_service_items().list_certificates().await
    }

    pub async fn list_simple_monitors(&self, profile: &str) -> Result<Vec<SimpleMonitorInfo>> {
        let client: IaasClient = self.global(profile, ResourceFamily::SimpleMonitor)?;
        client.common_service_items().list_simple_monitors().await
    }

    pub async fn list_container_registries(
        &self,
        profile: &str,
    ) -> Result<Vec<ContainerRegistryInfo>> {
        let client: IaasClient = self.global(profile, ResourceFamily::ContainerRegistry)?;
        client.common_service_items().list_container_registries().await
    }

    pub async fn container_registry_users(
        &self,
        profile: &str,
        id: &str,
    ) -> Result<Vec<ContainerRegistryUserInfo>> {
        let client: IaasClient = self.global(profile, ResourceFamily::ContainerRegistry)?;
        client.common_service_items().container_registry_users(id).await
    }

    pub async fn list_enhanced_dbs(&self, profile: &str) -> Result<Vec<EnhancedDbInfo>> {
        let client: IaasClient = self.global(profile, ResourceFamily::EnhancedDb)?;
        client.common_service_items().list_enhanced_dbs().await
    }

    pub async fn list_proxy_lbs(&self, profile: &str) -> Result<Vec<ProxyLbInfo>> {
        let client: IaasClient = self.global(profile, ResourceFamily::ProxyLb)?;
        client.proxy_lbs().list().await
    }

    pub async fn get_proxy_lb(&self, profile: &str, id: &str) -> Result<ProxyLbInfo> {
        let client: IaasClient = self.global(profile, ResourceFamily::ProxyLb)?;
        client.proxy_lbs().get(id).await
    }

    pub async fn proxy_lb_health(&self, profile: &str, id: &str) -> Result<ProxyLbHealthInfo> {
        let client: IaasClient = self.global(profile, ResourceFamily::ProxyLb)?;
        client.proxy_lbs().health(id).await
    }

    /// Bills of `account_id`, or of the profile's own account when `None`
    pub async fn list_bills(&self, profile: &str, account_id: Option<&str>) -> Result<Vec<BillInfo>> {
        let client: IaasClient = self.global(profile, ResourceFamily::Bill)?;
        let account_id = match account_id {
            Some(id) => id.to_string(),
            None => client.auth_status().read().await?.account_id,
        };
        client.bills().list_by_contract(&account_id).await
    }

    /// Bill line items; `member_code` defaults to the profile's own.
    pub async fn bill_details(
        &self,
        profile: &str,
        member_code: Option<&str>,
        bill_id: &str,
    ) -> Result<Vec<BillDetailInfo>> {
        let client: IaasClient = self.global(profile, ResourceFamily::Bill)?;
        let member_code = match member_code {
            Some(code) => code.to_string(),
            None => client.auth_status().read().await?.member_code,
        };
        client.bills().details(&member_code, bill_id).await
    }

    // ========================================================================
    // KMS
    // ========================================================================

    pub async fn list_kms_keys(&self, profile: &str) -> Result<Vec<KeyInfo>> {
        let client: KmsClient = self.global(profile, ResourceFamily::KmsKey)?;
        client.list_keys().await
    }

    // ========================================================================
    // Monitoring Suite
    // ========================================================================

    fn monitoring(&self, profile: &str) -> Result<MonitoringClient> {
        self.global(profile, ResourceFamily::MonitoringStorage)
    }

    pub async fn list_log_storages(&self, profile: &str) -> Result<Vec<StorageInfo>> {
        self.monitoring(profile)?.logs().await
    }

    pub async fn list_metrics_storages(&self, profile: &str) -> Result<Vec<StorageInfo>> {
        self.monitoring(profile)?.metrics().await
    }

    pub async fn list_trace_storages(&self, profile: &str) -> Result<Vec<StorageInfo>> {
        self.monitoring(profile)?.traces().await
    }

    pub async fn metrics_storage(&self, profile: &str, storage_id: &str) -> Result<MetricsStorageDetail> {
        self.monitoring(profile)?.metrics_storage(storage_id).await
    }

    pub async fn metrics_access_keys(
        &self,
        profile: &str,
        storage_id: &str,
    ) -> Result<Vec<MetricsAccessKey>> {
        self.monitoring(profile)?.metrics_access_keys(storage_id).await
    }

    async fn prometheus(&self, profile: &str, storage_id: &str) -> Result<PrometheusClient> {
        let monitoring = self.monitoring(profile)?;
        let ctx = metrics::query_context(&monitoring, storage_id).await?;
        Ok(ctx.into_client(self.factory.http().clone()))
    }

    pub async fn metric_labels(&self, profile: &str, storage_id: &str) -> Result<Vec<PrometheusLabel>> {
        self.prometheus(profile, storage_id).await?.labels().await
    }

    pub async fn query_metrics(
        &self,
        profile: &str,
        storage_id: &str,
        params: &QueryRangeParams,
    ) -> Result<QueryRangeResponse> {
        self.prometheus(profile, storage_id)
            .await?
            .query_range(params)
            .await
    }

    pub async fn metric_publishers(&self, profile: &str, storage_id: &str) -> Result<Vec<String>> {
        self.prometheus(profile, storage_id).await?.publishers().await
    }

    pub async fn metrics_by_publisher(
        &self,
        profile: &str,
        storage_id: &str,
        publisher: &str,
    ) -> Result<Vec<String>> {
        self.prometheus(profile, storage_id)
            .await?
            .metrics_by_publisher(publisher)
            .await
    }

    // ========================================================================
    // AppRun dedicated
    // ========================================================================

    fn apprun(&self, profile: &str) -> Result<AppRunClient> {
        self.global(profile, ResourceFamily::AppRunDedicated)
    }

    pub async fn apprun_clusters(&self, profile: &str, params: ListParams) -> Result<Page<ClusterInfo>> {
        self.apprun(profile)?.clusters(params).await
    }

    pub async fn apprun_applications(
        &self,
        profile: &str,
        cluster_id: Option<&str>,
        params: ListParams,
    ) -> Result<Page<AppInfo>> {
        self.apprun(profile)?.applications(cluster_id, params).await
    }

    pub async fn apprun_versions(
        &self,
        profile: &str,
        application_id: &str,
        params: ListParams,
    ) -> Result<Page<AppVersionInfo>> {
        self.apprun(profile)?.versions(application_id, params).await
    }

    pub async fn apprun_version(
        &self,
        profile: &str,
        application_id: &str,
        version: u32,
    ) -> Result<AppVersionDetailInfo> {
        self.apprun(profile)?.version(application_id, version).await
    }

    pub async fn apprun_set_active_version(
        &self,
        profile: &str,
        application_id: &str,
        version: u32,
    ) -> Result<()> {
        self.apprun(profile)?
            .set_active_version(application_id, version)
            .await
    }

    pub async fn apprun_clear_active_version(&self, profile: &str, application_id: &str) -> Result<()> {
        self.apprun(profile)?
            .clear_active_version(application_id)
            .await
    }

    pub async fn apprun_auto_scaling_groups(
        &self,
        profile: &str,
        cluster_id: &str,
        params: ListParams,
    ) -> Result<Page<AsgInfo>> {
        self.apprun(profile)?
            .auto_scaling_groups(cluster_id, params)
            .await
    }

    pub async fn apprun_load_balancers(
        &self,
        profile: &str,
        cluster_id: &str,
        asg_id: &str,
        params: ListParams,
    ) -> Result<Page<LbInfo>> {
        self.apprun(profile)?
            .load_balancers(cluster_id, asg_id, params)
            .await
    }

    pub async fn apprun_worker_nodes(
        &self,
        profile: &str,
        cluster_id: &str,
        asg_id: &str,
        params: ListParams,
    ) -> Result<Page<WorkerNodeInfo>> {
        self.apprun(profile)?
            .worker_nodes(cluster_id, asg_id, params)
            .await
    }

    pub async fn apprun_load_balancer_nodes(
        &self,
        profile: &str,
        cluster_id: &str,
        asg_id: &str,
        lb_id: &str,
        params: ListParams,
    ) -> Result<Page<LbNodeInfo>> {
        self.apprun(profile)?
            .load_balancer_nodes(cluster_id, asg_id, lb_id, params)
            .await
    }

    // ========================================================================
    // AppRun shared
    // ========================================================================

    fn apprun_shared(&self, profile: &str) -> Result<AppRunSharedClient> {
        self.global(profile, ResourceFamily::AppRunShared)
    }

    pub async fn shared_applications(&self, profile: &str) -> Result<Vec<SharedAppInfo>> {
        self.apprun_shared(profile)?.applications().await
    }

    pub async fn shared_application(&self, profile: &str, app_id: &str) -> Result<SharedAppDetailInfo> {
        self.apprun_shared(profile)?.application(app_id).await
    }

    pub async fn shared_application_status(&self, profile: &str, app_id: &str) -> Result<String> {
        self.apprun_shared(profile)?.application_status(app_id).await
    }

    pub async fn shared_versions(&self, profile: &str, app_id: &str) -> Result<Vec<SharedVersionInfo>> {
        self.apprun_shared(profile)?.versions(app_id).await
    }

    pub async fn shared_traffics(&self, profile: &str, app_id: &str) -> Result<Vec<TrafficInfo>> {
        self.apprun_shared(profile)?.traffics(app_id).await
    }

    pub async fn shared_has_user(&self, profile: &str) -> Result<bool> {
        self.apprun_shared(profile)?.has_user().await
    }

    // ========================================================================
    // Object storage
    // ========================================================================

    fn object_storage(&self, profile: &str) -> Result<ObjectStorageClient> {
        self.global(profile, ResourceFamily::ObjectStorage)
    }

    pub async fn object_storage_sites(&self, profile: &str) -> Result<Vec<SiteInfo>> {
        self.object_storage(profile)?.sites().await
    }

    pub async fn object_storage_access_keys(
        &self,
        profile: &str,
        site_id: &str,
    ) -> Result<Vec<AccessKeyInfo>> {
        self.object_storage(profile)?.access_keys(site_id).await
    }

    /// S3 session with the secret key saved for `access_key`
    async fn s3_session(&self, profile: &str, site_id: &str, access_key: &str) -> Result<S3Session> {
        let client = self.object_storage(profile)?;
        let secret = self
            .vault
            .get(&object_storage_key(site_id, access_key))
            .await?;
        client.session(site_id, access_key, secret.expose()).await
    }

    pub async fn list_buckets(
        &self,
        profile: &str,
        site_id: &str,
        access_key: &str,
    ) -> Result<Vec<BucketInfo>> {
        let client = self.object_storage(profile)?;
        let secret = self
            .vault
            .get(&object_storage_key(site_id, access_key))
            .await?;
        client.buckets(site_id, access_key, secret.expose()).await
    }

    pub async fn list_objects(
        &self,
        profile: &str,
        site_id: &str,
        access_key: &str,
        bucket: &str,
        params: ListObjectsParams,
    ) -> Result<ListObjectsResult> {
        self.s3_session(profile, site_id, access_key)
            .await?
            .list_objects(bucket, params)
            .await
    }

    /// Stream one object to `dest`; returns the bytes written.
    pub async fn download_object(
        &self,
        profile: &str,
        site_id: &str,
        access_key: &str,
        bucket: &str,
        key: &str,
        dest: &Path,
    ) -> Result<u64> {
        self.s3_session(profile, site_id, access_key)
            .await?
            .download(bucket, key, dest)
            .await
    }

    pub async fn preview_text(
        &self,
        profile: &str,
        site_id: &str,
        access_key: &str,
        bucket: &str,
        key: &str,
    ) -> Result<TextPreview> {
        self.s3_session(profile, site_id, access_key)
            .await?
            .preview_text(bucket, key, TEXT_PREVIEW_BYTES)
            .await
    }

    pub async fn preview_gzip_jsonl(
        &self,
        profile: &str,
        site_id: &str,
        access_key: &str,
        bucket: &str,
        key: &str,
    ) -> Result<JsonlPreview> {
        self.s3_session(profile, site_id, access_key)
            .await?
            .preview_gzip_jsonl(bucket, key, JSONL_PREVIEW_BYTES, JSONL_PREVIEW_LINES)
            .await
    }

    // ========================================================================
    // Vault
    // ========================================================================

    pub async fn save_object_storage_secret(
        &self,
        site_id: &str,
        access_key: &str,
        secret: SecretString,
    ) -> Result<()> {
        self.vault
            .save(&object_storage_key(site_id, access_key), secret)
            .await
    }

    pub async fn has_object_storage_secret(&self, site_id: &str, access_key: &str) -> bool {
        self.vault.has(&object_storage_key(site_id, access_key)).await
    }

    pub async fn delete_object_storage_secret(&self, site_id: &str, access_key: &str) -> Result<()> {
        self.vault.delete(&object_storage_key(site_id, access_key)).await
    }

    pub async fn save_registry_password(
        &self,
        registry_id: &str,
        username: &str,
        password: SecretString,
    ) -> Result<()> {
        self.vault
            .save(&registry_key(registry_id, username), password)
            .await
    }

    pub async fn has_registry_password(&self, registry_id: &str, username: &str) -> bool {
        self.vault.has(&registry_key(registry_id, username)).await
    }

    pub async fn delete_registry_password(&self, registry_id: &str, username: &str) -> Result<()> {
        self.vault.delete(&registry_key(registry_id, username)).await
    }

    // ========================================================================
    // Container registry images
    // ========================================================================

    /// Registry client for `fqdn`
    ///
    /// Signs in as `username` when a password is saved for it, otherwise
    /// anonymously.
    async fn registry(
        &self,
        profile: &str,
        registry_id: &str,
        fqdn: &str,
        username: Option<&str>,
    ) -> Result<RegistryClient> {
        let connector: RegistryConnector = self.global(profile, ResourceFamily::RegistryImage)?;
        let Some(username) = username.map(str::trim).filter(|u| !u.is_empty()) else {
            return Ok(connector.open(fqdn, "", ""));
        };

        match self.vault.get(&registry_key(registry_id, username)).await {
            Ok(password) => Ok(connector.open(fqdn, username, password.expose())),
            Err(CloudError::SecretNotFound { .. }) => {
                tracing::debug!("No saved password for {}, using anonymous access", username);
                Ok(connector.open(fqdn, "", ""))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn registry_images(
        &self,
        profile: &str,
        registry_id: &str,
        fqdn: &str,
        username: Option<&str>,
    ) -> Result<Vec<RegistryImage>> {
        self.registry(profile, registry_id, fqdn, username)
            .await?
            .images()
            .await
    }

    pub async fn registry_tags(
        &self,
        profile: &str,
        registry_id: &str,
        fqdn: &str,
        username: Option<&str>,
        image: &str,
    ) -> Result<Vec<RegistryTag>> {
        self.registry(profile, registry_id, fqdn, username)
            .await?
            .tags(image)
            .await
    }
}

fn object_storage_key(site_id: &str, access_key: &str) -> SecretKey {
    SecretKey::new(SecretNamespace::ObjectStorage, site_id.trim(), access_key.trim())
}

fn registry_key(registry_id: &str, username: &str) -> SecretKey {
    SecretKey::new(SecretNamespace::ContainerRegistry, registry_id.trim(), username.trim())
}
