//! sakpanel cloud gateway core
//!
//! Types shared by every backend adapter: the error taxonomy, backend kinds,
//! the zone/scope table and the helpers that normalize upstream payloads into
//! view models.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              sakpanel (Gateway, CLI)             │
//! │   ClientFactory · Vault · metrics pipeline       │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                sakpanel-cloud                    │
//! │  ┌──────────────┐ ┌──────────────┐ ┌─────────┐  │
//! │  │  CloudError  │ │ Scope table  │ │  view   │  │
//! │  └──────────────┘ └──────────────┘ └─────────┘  │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼────────────────┐
//! │sakpanel-config│ │ sakpanel-cloud-sakura  │
//! │  (profiles)   │ │ (backends + services)  │
//! └───────────────┘ └────────────────────────┘
//! ```

pub mod backend;
pub mod error;
pub mod page;
pub mod scope;
pub mod view;

// Re-exports
pub use backend::BackendKind;
pub use error::{CloudError, ErrorPayload, Result};
pub use page::{Page, PageBound};
pub use scope::{
    DEFAULT_ZONE, GLOBAL_API_ZONE, ResourceFamily, Scope, ScopeKind, ZoneInfo, resolve_scope,
    resolve_zone, zones,
};
