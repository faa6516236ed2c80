//! Zone/scope classification of resource families

use crate::backend::BackendKind;
use crate::error::{CloudError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Zone used when neither the caller nor the profile names one.
pub const DEFAULT_ZONE: &str = sakpanel_config::DEFAULT_ZONE;

/// Zone path segment used to address global resources on the IaaS API.
pub const GLOBAL_API_ZONE: &str = "is1a";

/// A Sakura Cloud zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneInfo {
    pub id: &'static str,
    pub name: &'static str,
}

pub const ZONES: [ZoneInfo; 5] = [
    ZoneInfo { id: "is1a", name: "石狩第1ゾーン" },
    ZoneInfo { id: "is1b", name: "石狩第2ゾーン" },
    ZoneInfo { id: "tk1a", name: "東京第1ゾーン" },
    ZoneInfo { id: "tk1b", name: "東京第2ゾーン" },
    ZoneInfo { id: "tk1v", name: "サンドボックス" },
];

pub fn zones() -> Vec<ZoneInfo> {
    ZONES.to_vec()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Existence and IDs are local to one zone
    Zoned,
    /// Addressed independently of zone
    Global,
}

/// A resolved call scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Zone(String),
    Global,
}

impl Scope {
    pub fn zone(&self) -> Option<&str> {
        match self {
            Scope::Zone(zone) => Some(zone),
            Scope::Global => None,
        }
    }

    /// Zone segment for IaaS URLs
    pub fn api_zone(&self) -> &str {
        match self {
            Scope::Zone(zone) => zone,
            Scope::Global => GLOBAL_API_ZONE,
        }
    }
}

/// Resource families exposed through the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceFamily {
    Server,
    Switch,
    PacketFilter,
    Disk,
    Archive,
    Database,
    Dns,
    Gslb,
    Certificate,
    SimpleMonitor,
    ContainerRegistry,
    EnhancedDb,
    ProxyLb,
    Bill,
    AuthStatus,
    KmsKey,
    MonitoringStorage,
    AppRunDedicated,
    AppRunShared,
    ObjectStorage,
    RegistryImage,
}

impl ResourceFamily {
    pub const ALL: [ResourceFamily; 21] = [
        ResourceFamily::Server,
        ResourceFamily::Switch,
        ResourceFamily::PacketFilter,
        ResourceFamily::Disk,
        ResourceFamily::Archive,
        ResourceFamily::Database,
        ResourceFamily::Dns,
        ResourceFamily::Gslb,
        ResourceFamily::Certificate,
        ResourceFamily::SimpleMonitor,
        ResourceFamily::ContainerRegistry,
        ResourceFamily::EnhancedDb,
        ResourceFamily::ProxyLb,
        ResourceFamily::Bill,
        ResourceFamily::AuthStatus,
        ResourceFamily::KmsKey,
        ResourceFamily::MonitoringStorage,
        ResourceFamily::AppRunDedicated,
        ResourceFamily::AppRunShared,
        ResourceFamily::ObjectStorage,
        ResourceFamily::RegistryImage,
    ];

    pub fn scope(self) -> ScopeKind {
        match self {
            ResourceFamily::Server
            | ResourceFamily::Switch
            | ResourceFamily::PacketFilter
            | ResourceFamily::Disk
            | ResourceFamily::Archive
            | ResourceFamily::Database => ScopeKind::Zoned,
            _ => ScopeKind::Global,
        }
    }

    pub fn backend(self) -> BackendKind {
        match self {
            ResourceFamily::KmsKey => BackendKind::Kms,
            ResourceFamily::MonitoringStorage => BackendKind::Monitoring,
            ResourceFamily::AppRunDedicated => BackendKind::AppRunDedicated,
            ResourceFamily::AppRunShared => BackendKind::AppRunShared,
            ResourceFamily::ObjectStorage => BackendKind::ObjectStorage,
            ResourceFamily::RegistryImage => BackendKind::Registry,
            _ => BackendKind::GenericCloud,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceFamily::Server => "server",
            ResourceFamily::Switch => "switch",
            ResourceFamily::PacketFilter => "packet-filter",
            ResourceFamily::Disk => "disk",
            ResourceFamily::Archive => "archive",
            ResourceFamily::Database => "database",
            ResourceFamily::Dns => "dns",
            ResourceFamily::Gslb => "gslb",
            ResourceFamily::Certificate => "certificate",
            ResourceFamily::SimpleMonitor => "simple-monitor",
            ResourceFamily::ContainerRegistry => "container-registry",
            ResourceFamily::EnhancedDb => "enhanced-db",
            ResourceFamily::ProxyLb => "proxy-lb",
            ResourceFamily::Bill => "bill",
            ResourceFamily::AuthStatus => "auth-status",
            ResourceFamily::KmsKey => "kms-key",
            ResourceFamily::MonitoringStorage => "monitoring-storage",
            ResourceFamily::AppRunDedicated => "apprun-dedicated",
            ResourceFamily::AppRunShared => "apprun-shared",
            ResourceFamily::ObjectStorage => "object-storage",
            ResourceFamily::RegistryImage => "registry-image",
        }
    }
}

impl fmt::Display for ResourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceFamily {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ResourceFamily::ALL
            .into_iter()
            .find(|family| family.as_str() == s)
            .ok_or_else(|| format!("unknown resource family: {}", s))
    }
}

fn non_blank(zone: Option<&str>) -> Option<&str> {
    zone.map(str::trim).filter(|z| !z.is_empty())
}

/// Zone names end up as a URL path segment.
fn checked_zone(zone: &str) -> Result<String> {
    if !zone.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return Err(CloudError::invalid_id("zone", zone));
    }
    Ok(zone.to_string())
}

/// Default zone: explicit argument, then the profile's zone, then `is1a`.
pub fn resolve_zone(explicit: Option<&str>, profile_zone: Option<&str>) -> Result<String> {
    if let Some(zone) = non_blank(explicit) {
        return checked_zone(zone);
    }
    if let Some(zone) = non_blank(profile_zone) {
        tracing::debug!("Using profile default zone {}", zone);
        return checked_zone(zone);
    }
    tracing::debug!("No zone given, falling back to {}", DEFAULT_ZONE);
    Ok(DEFAULT_ZONE.to_string())
}

/// Resolve the call scope for a resource family.
///
/// Global families ignore any zone argument.
pub fn resolve_scope(
    family: ResourceFamily,
    explicit: Option<&str>,
    profile_zone: Option<&str>,
) -> Result<Scope> {
    match family.scope() {
        ScopeKind::Zoned => Ok(Scope::Zone(resolve_zone(explicit, profile_zone)?)),
        ScopeKind::Global => {
            if let Some(zone) = non_blank(explicit) {
                tracing::debug!("Ignoring zone {} for global family {}", zone, family);
            }
            Ok(Scope::Global)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoned_scope_prefers_explicit_zone() {
        let scope = resolve_scope(ResourceFamily::Server, Some("tk1b"), Some("is1b")).unwrap();
        assert_eq!(scope, Scope::Zone("tk1b".to_string()));
    }

    #[test]
    fn test_zoned_scope_uses_profile_zone() {
        let scope = resolve_scope(ResourceFamily::Disk, None, Some("is1b")).unwrap();
        assert_eq!(scope, Scope::Zone("is1b".to_string()));

        let scope = resolve_scope(ResourceFamily::Disk, Some(""), Some("tk1a")).unwrap();
        assert_eq!(scope, Scope::Zone("tk1a".to_string()));
    }

    #[test]
    fn test_zoned_scope_falls_back_to_default_zone() {
        let scope = resolve_scope(ResourceFamily::Archive, None, None).unwrap();
        assert_eq!(scope, Scope::Zone(DEFAULT_ZONE.to_string()));

        let scope = resolve_scope(ResourceFamily::Archive, None, Some("  ")).unwrap();
        assert_eq!(scope.zone(), Some(DEFAULT_ZONE));
    }

    #[test]
    fn test_global_scope_ignores_zone() {
        let scope = resolve_scope(ResourceFamily::Dns, Some("tk1a"), Some("is1b")).unwrap();
        assert_eq!(scope, Scope::Global);
        assert_eq!(scope.api_zone(), GLOBAL_API_ZONE);
    }

    #[test]
    fn test_zone_must_be_a_path_segment() {
        for bad in ["../x", "tk1b?", "is1a/server", "tk1b#", "TK1B"] {
            let err = resolve_scope(ResourceFamily::Server, Some(bad), None).unwrap_err();
            assert_eq!(err.kind(), "invalidIdentifier", "{}", bad);
        }
        let err = resolve_scope(ResourceFamily::Disk, None, Some("is1a/../x")).unwrap_err();
        assert!(matches!(err, CloudError::InvalidIdentifier { what: "zone", .. }));

        // global families never put the zone in a URL
        let scope = resolve_scope(ResourceFamily::Dns, Some("../x"), None).unwrap();
        assert_eq!(scope, Scope::Global);
    }

    #[test]
    fn test_zoned_families_use_generic_backend() {
        for family in ResourceFamily::ALL {
            if family.scope() == ScopeKind::Zoned {
                assert_eq!(family.backend(), BackendKind::GenericCloud, "{}", family);
            }
        }
    }

    #[test]
    fn test_family_names_round_trip() {
        for family in ResourceFamily::ALL {
            assert_eq!(family.as_str().parse::<ResourceFamily>(), Ok(family));
        }
        assert!("nope".parse::<ResourceFamily>().is_err());
    }

    #[test]
    fn test_zone_table() {
        let ids: Vec<_> = zones().iter().map(|z| z.id).collect();
        assert_eq!(ids, vec!["is1a", "is1b", "tk1a", "tk1b", "tk1v"]);
    }
}
