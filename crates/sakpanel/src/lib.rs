//! sakpanel
//!
//! Profile-scoped gateway to the Sakura Cloud APIs. [`Gateway`] resolves the
//! credential profile and zone for each call, picks the backend client for the
//! resource family and returns normalized view models.
//!
//! # Example
//!
//! ```ignore
//! use sakpanel::Gateway;
//!
//! let gateway = Gateway::from_env()?;
//! let profile = gateway.current_profile();
//! let servers = gateway.list_servers(&profile, None).await?;
//! ```

pub mod factory;
pub mod gateway;
pub mod metrics;
pub mod vault;

pub use factory::{BackendClient, ClientFactory, RegistryConnector};
pub use gateway::Gateway;
pub use metrics::{MetricsQueryContext, ResolvedStorage, StorageStep};
pub use vault::{
    KeyringStore, MemoryStore, SecretKey, SecretNamespace, SecretStore, SecretString, Vault,
};

// Lower layers
pub use sakpanel_cloud as cloud;
pub use sakpanel_cloud_sakura as sakura;
pub use sakpanel_config as config;
