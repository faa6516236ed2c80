//! Upstream backend kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the independently versioned upstream APIs the gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackendKind {
    /// IaaS API (servers, switches, DNS, bills, ...)
    GenericCloud,
    AppRunDedicated,
    AppRunShared,
    Kms,
    /// Monitoring Suite, including the Prometheus-compatible query endpoint
    Monitoring,
    ObjectStorage,
    /// Docker Registry HTTP API v2
    Registry,
}

impl BackendKind {
    pub const ALL: [BackendKind; 7] = [
        BackendKind::GenericCloud,
        BackendKind::AppRunDedicated,
        BackendKind::AppRunShared,
        BackendKind::Kms,
        BackendKind::Monitoring,
        BackendKind::ObjectStorage,
        BackendKind::Registry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::GenericCloud => "genericCloud",
            BackendKind::AppRunDedicated => "appRunDedicated",
            BackendKind::AppRunShared => "appRunShared",
            BackendKind::Kms => "kms",
            BackendKind::Monitoring => "monitoring",
            BackendKind::ObjectStorage => "objectStorage",
            BackendKind::Registry => "registry",
        }
    }

    /// Label used in error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::GenericCloud => "IaaS",
            BackendKind::AppRunDedicated => "AppRun dedicated",
            BackendKind::AppRunShared => "AppRun shared",
            BackendKind::Kms => "KMS",
            BackendKind::Monitoring => "Monitoring Suite",
            BackendKind::ObjectStorage => "Object Storage",
            BackendKind::Registry => "Container Registry",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
