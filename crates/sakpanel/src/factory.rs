//! Client factory
//!
//! Resolves a profile and hands out the backend client for a resource family.
//! Every client shares the factory's pooled `reqwest::Client`; constructing
//! one never performs an authentication round trip.

use sakpanel_cloud::{BackendKind, CloudError, ResourceFamily, Result};
use sakpanel_cloud_sakura::{
    AppRunClient, AppRunSharedClient, Credentials, Endpoints, IaasClient, KmsClient,
    MonitoringClient, ObjectStorageClient, RegistryClient,
};
use sakpanel_config::{Profile, ProfileStore};

const USER_AGENT: &str = concat!("sakpanel/", env!("CARGO_PKG_VERSION"));

/// Registry access is keyed by FQDN and registry user, not by profile.
#[derive(Debug, Clone)]
pub struct RegistryConnector {
    http: reqwest::Client,
}

impl RegistryConnector {
    /// Anonymous unless both `username` and `password` are non-empty.
    pub fn open(&self, fqdn: &str, username: &str, password: &str) -> RegistryClient {
        RegistryClient::new(self.http.clone(), fqdn, username, password)
    }
}

/// One client per upstream backend
#[derive(Debug, Clone)]
pub enum BackendClient {
    GenericCloud(IaasClient),
    AppRunDedicated(AppRunClient),
    AppRunShared(AppRunSharedClient),
    Kms(KmsClient),
    Monitoring(MonitoringClient),
    ObjectStorage(ObjectStorageClient),
    Registry(RegistryConnector),
}

impl BackendClient {
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendClient::GenericCloud(_) => BackendKind::GenericCloud,
            BackendClient::AppRunDedicated(_) => BackendKind::AppRunDedicated,
            BackendClient::AppRunShared(_) => BackendKind::AppRunShared,
            BackendClient::Kms(_) => BackendKind::Kms,
            BackendClient::Monitoring(_) => BackendKind::Monitoring,
            BackendClient::ObjectStorage(_) => BackendKind::ObjectStorage,
            BackendClient::Registry(_) => BackendKind::Registry,
        }
    }
}

macro_rules! impl_try_from_backend {
    ($($variant:ident => $client:ty),* $(,)?) => {
        $(
            impl TryFrom<BackendClient> for $client {
                type Error = CloudError;

                fn try_from(client: BackendClient) -> Result<Self> {
                    match client {
                        BackendClient::$variant(inner) => Ok(inner),
                        other => Err(CloudError::backend(
                            other.kind(),
                            None,
                            format!(
                                "expected a {} client, got {}",
                                BackendKind::$variant,
                                other.kind()
                            ),
                        )),
                    }
                }
            }
        )*
    };
}

impl_try_from_backend! {
    GenericCloud => IaasClient,
    AppRunDedicated => AppRunClient,
    AppRunShared => AppRunSharedClient,
    Kms => KmsClient,
    Monitoring => MonitoringClient,
    ObjectStorage => ObjectStorageClient,
    Registry => RegistryConnector,
}

#[derive(Debug, Clone)]
pub struct ClientFactory {
    http: reqwest::Client,
    endpoints: Endpoints,
    profiles: ProfileStore,
}

impl ClientFactory {
    pub fn new(profiles: ProfileStore, endpoints: Endpoints) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CloudError::backend(BackendKind::GenericCloud, None, e.to_string()))?;
        Ok(Self {
            http,
            endpoints,
            profiles,
        })
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Load `profile_name` and build the client that serves `family`.
    pub fn connect(
        &self,
        profile_name: &str,
        family: ResourceFamily,
    ) -> Result<(Profile, BackendClient)> {
        let profile = self.profiles.load_profile(profile_name)?;
        let creds = Credentials::new(&profile.access_token, &profile.access_token_secret);
        let backend = family.backend();
        tracing::debug!(
            "Connecting {} for {} via profile {}",
            backend.as_str(),
            family,
            profile.name
        );

        let http = self.http.clone();
        let client = match backend {
            BackendKind::GenericCloud => {
                BackendClient::GenericCloud(IaasClient::new(http, &self.endpoints, &creds))
            }
            BackendKind::AppRunDedicated => BackendClient::AppRunDedicated(AppRunClient::new(
                http,
                self.endpoints.apprun_dedicated.clone(),
                &creds,
            )),
            BackendKind::AppRunShared => BackendClient::AppRunShared(AppRunSharedClient::new(
                http,
                self.endpoints.apprun_shared.clone(),
                &creds,
            )),
            BackendKind::Kms => {
                BackendClient::Kms(KmsClient::new(http, self.endpoints.kms.clone(), &creds))
            }
            BackendKind::Monitoring => BackendClient::Monitoring(MonitoringClient::new(
                http,
                self.endpoints.monitoring.clone(),
                &creds,
            )),
            BackendKind::ObjectStorage => BackendClient::ObjectStorage(ObjectStorageClient::new(
                http,
                self.endpoints.object_storage.clone(),
                &creds,
            )),
            BackendKind::Registry => BackendClient::Registry(RegistryConnector { http }),
        };
        Ok((profile, client))
    }

    /// [`connect`](Self::connect) narrowed to one client type
    pub fn client<C>(&self, profile_name: &str, family: ResourceFamily) -> Result<(Profile, C)>
    where
        C: TryFrom<BackendClient, Error = CloudError>,
    {
        let (profile, client) = self.connect(profile_name, family)?;
        Ok((profile, C::try_from(client)?))
    }

    pub fn registry(&self) -> RegistryConnector {
        RegistryConnector {
            http: self.http.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn factory_with_profile() -> (tempfile::TempDir, ClientFactory) {
        let dir = tempfile::tempdir().unwrap();
        let profile = dir.path().join("work");
        fs::create_dir_all(&profile).unwrap();
        fs::write(
            profile.join("config.json"),
            r#"{"AccessToken":"tok","AccessTokenSecret":"sec","Zone":"tk1b"}"#,
        )
        .unwrap();
        let factory = ClientFactory::new(
            ProfileStore::new(dir.path()),
            Endpoints::for_host("http://127.0.0.1:1"),
        )
        .unwrap();
        (dir, factory)
    }

    #[test]
    fn test_connect_picks_backend_from_family() {
        let (_dir, factory) = factory_with_profile();
        for family in ResourceFamily::ALL {
            let (profile, client) = factory.connect("work", family).unwrap();
            assert_eq!(profile.name, "work");
            assert_eq!(client.kind(), family.backend());
        }
    }

    #[test]
    fn test_connect_missing_profile() {
        let (_dir, factory) = factory_with_profile();
        let err = factory.connect("absent", ResourceFamily::Server).unwrap_err();
        assert!(matches!(err, CloudError::ProfileNotFound(ref name) if name == "absent"));
    }

    #[test]
    fn test_typed_client_mismatch() {
        let (_dir, factory) = factory_with_profile();
        let result = factory.client::<KmsClient>("work", ResourceFamily::Server);
        assert!(matches!(
            result,
            Err(CloudError::Backend { kind: BackendKind::GenericCloud, .. })
        ));

        let (_, kms) = factory
            .client::<KmsClient>("work", ResourceFamily::KmsKey)
            .unwrap();
        drop(kms);
    }
}
