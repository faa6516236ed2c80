//! Account behind a token pair

use super::IaasClient;
use crate::endpoints::Endpoints;
use crate::transport::Credentials;
use sakpanel_cloud::view::de;
use sakpanel_cloud::{Result, Scope};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfo {
    pub account_id: String,
    pub account_name: String,
    pub member_code: String,
}

pub struct AuthStatusService<'a> {
    client: &'a IaasClient,
}

impl<'a> AuthStatusService<'a> {
    pub(super) fn new(client: &'a IaasClient) -> Self {
        Self { client }
    }

    pub async fn read(&self) -> Result<AuthInfo> {
        let status: ApiAuthStatus = self.client.get(&Scope::Global, "auth-status").await?;
        Ok(AuthInfo {
            account_id: status.account_id,
            account_name: status.account_name,
            member_code: status.member_code,
        })
    }
}

/// Check a token pair before it is written to a profile.
pub async fn validate_credentials(
    http: reqwest::Client,
    endpoints: &Endpoints,
    creds: &Credentials,
) -> Result<AuthInfo> {
    let client = IaasClient::new(http, endpoints, creds);
    let info = client.auth_status().read().await?;
    tracing::debug!("Credentials valid for account {}", info.account_id);
    Ok(info)
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiAuthStatus {
    #[serde(rename = "AccountID", default, deserialize_with = "de::string_id")]
    account_id: String,
    #[serde(default, deserialize_with = "de::null_default")]
    account_name: String,
    #[serde(default, deserialize_with = "de::null_default")]
    member_code: String,
}
