//! Upstream base URLs

/// Public API host
pub const SAKURA_API_HOST: &str = "https://secure.sakura.ad.jp";

/// Base URLs for every profile-authenticated backend
///
/// Fixed per backend in production; tests point them at a mock server with
/// [`Endpoints::for_host`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// `{root}/{zone}/api/cloud/1.1`
    pub iaas_zone_root: String,
    /// Billing API (system API, is1a)
    pub billing: String,
    pub apprun_dedicated: String,
    pub apprun_shared: String,
    pub kms: String,
    pub monitoring: String,
    /// Object storage control API (sites and account keys)
    pub object_storage: String,
}

impl Endpoints {
    pub fn for_host(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        Self {
            iaas_zone_root: format!("{}/cloud/zone", host),
            billing: format!("{}/cloud/zone/is1a/api/system/1.0", host),
            apprun_dedicated: format!("{}/cloud/api/apprun-dedicated/1.0", host),
            apprun_shared: format!("{}/cloud/api/apprun/1.0/apprun/api", host),
            kms: format!("{}/cloud/api/kms/1.0", host),
            monitoring: format!("{}/cloud/api/monitoring/1.0", host),
            object_storage: format!("{}/cloud/zone/is1a/api/objectstorage/1.0", host),
        }
    }

    /// IaaS API base for one zone
    pub fn iaas(&self, zone: &str) -> String {
        format!("{}/{}/api/cloud/1.1", self.iaas_zone_root, zone)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::for_host(SAKURA_API_HOST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.iaas("tk1b"),
            "https://secure.sakura.ad.jp/cloud/zone/tk1b/api/cloud/1.1"
        );
        assert_eq!(
            endpoints.apprun_shared,
            "https://secure.sakura.ad.jp/cloud/api/apprun/1.0/apprun/api"
        );
    }

    #[test]
    fn test_for_host_trims_slash() {
        let endpoints = Endpoints::for_host("http://127.0.0.1:8080/");
        assert_eq!(
            endpoints.apprun_dedicated,
            "http://127.0.0.1:8080/cloud/api/apprun-dedicated/1.0"
        );
    }
}
