//! Sakura Cloud backends for sakpanel
//!
//! One client per upstream API, each wrapping a shared pooled
//! `reqwest::Client`, plus the resource services that normalize upstream
//! payloads into view models.
//!
//! # Backends
//!
//! - IaaS (servers, networks, disks, DNS/GSLB, ProxyLB, bills, ...)
//! - AppRun dedicated and AppRun shared
//! - KMS
//! - Monitoring Suite and its Prometheus query endpoint
//! - Object storage control API and the S3 data plane
//! - Container registry (Docker Registry HTTP API v2)
//!
//! # Example
//!
//! ```ignore
//! use sakpanel_cloud_sakura::{Credentials, Endpoints, IaasClient};
//!
//! let creds = Credentials::new(token, secret);
//! let client = IaasClient::new(reqwest::Client::new(), &Endpoints::default(), &creds);
//!
//! let servers = client.servers().list("tk1b").await?;
//! ```

pub mod apprun;
pub mod apprun_shared;
pub mod endpoints;
pub mod iaas;
pub mod kms;
pub mod monitoring;
pub mod object_storage;
pub mod prometheus;
pub mod registry;
pub mod s3;
pub mod transport;

pub use apprun::{AppRunClient, ListParams};
pub use apprun_shared::AppRunSharedClient;
pub use endpoints::Endpoints;
pub use iaas::{IaasClient, validate_credentials};
pub use kms::KmsClient;
pub use monitoring::MonitoringClient;
pub use object_storage::ObjectStorageClient;
pub use prometheus::{PrometheusClient, QueryRangeParams, normalize_endpoint};
pub use registry::RegistryClient;
pub use s3::{ListObjectsParams, S3Session};
pub use transport::{Auth, Credentials, HttpBackend};
