//! Gateway error types

use crate::backend::BackendKind;
use crate::scope::ResourceFamily;
use sakpanel_config::ConfigError;
use serde::Serialize;
use thiserror::Error;

/// Gateway errors
///
/// Empty results are never errors; every variant here means the call failed.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Profile {name} is corrupt: {reason}")]
    ProfileCorrupt { name: String, reason: String },

    #[error(transparent)]
    Config(ConfigError),

    #[error("{kind} API error{}: {message}", status_suffix(.status))]
    Backend {
        kind: BackendKind,
        status: Option<u16>,
        message: String,
    },

    #[error("No access key found for metrics storage {storage_id}")]
    NoAccessKey { storage_id: String },

    #[error("Invalid {what}: {value:?}")]
    InvalidIdentifier { what: &'static str, value: String },

    #[error("Secret not found: {account}")]
    SecretNotFound { account: String },

    #[error("Keychain error: {0}")]
    Vault(String),

    #[error("{family} not found: {id}")]
    NotFound { family: ResourceFamily, id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" (status {})", code))
        .unwrap_or_default()
}

impl From<ConfigError> for CloudError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound(name) => CloudError::ProfileNotFound(name),
            ConfigError::ProfileCorrupt { name, reason } => {
                CloudError::ProfileCorrupt { name, reason }
            }
            other => CloudError::Config(other),
        }
    }
}

impl CloudError {
    pub fn backend(kind: BackendKind, status: Option<u16>, message: impl Into<String>) -> Self {
        CloudError::Backend {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn invalid_id(what: &'static str, value: impl Into<String>) -> Self {
        CloudError::InvalidIdentifier {
            what,
            value: value.into(),
        }
    }

    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            CloudError::ProfileNotFound(_) => "profileNotFound",
            CloudError::ProfileCorrupt { .. } => "profileCorrupt",
            CloudError::Config(_) => "config",
            CloudError::Backend { .. } => "backendError",
            CloudError::NoAccessKey { .. } => "noAccessKey",
            CloudError::InvalidIdentifier { .. } => "invalidIdentifier",
            CloudError::SecretNotFound { .. } => "secretNotFound",
            CloudError::Vault(_) => "vault",
            CloudError::NotFound { .. } => "notFound",
            CloudError::Io(_) => "io",
            CloudError::Json(_) => "json",
        }
    }

    /// HTTP status carried by a backend error
    pub fn status(&self) -> Option<u16> {
        match self {
            CloudError::Backend { status, .. } => *status,
            _ => None,
        }
    }

    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            CloudError::ProfileNotFound(name) => format!(
                "プロファイル {} が見つかりません。\n\
                 usacloud config でプロファイルを作成してください。",
                name
            ),
            CloudError::ProfileCorrupt { name, reason } => format!(
                "プロファイル {} の設定ファイルを読み込めません: {}\n\
                 ~/.usacloud/{}/config.json を確認してください。",
                name, reason, name
            ),
            CloudError::NoAccessKey { storage_id } => format!(
                "メトリクスストレージ {} にアクセスキーがありません。\n\
                 コントロールパネルでアクセスキーを発行してください。",
                storage_id
            ),
            CloudError::Backend {
                kind,
                status: Some(401),
                ..
            } => format!(
                "{} API の認証に失敗しました。\n\
                 アクセストークンとシークレットを確認してください。",
                kind
            ),
            _ => self.to_string(),
        }
    }

    /// GUI 向けの構造化エラー
    pub fn payload(&self) -> ErrorPayload {
        let backend = match self {
            CloudError::Backend { kind, .. } => Some(*kind),
            _ => None,
        };
        ErrorPayload {
            kind: self.kind(),
            message: self.user_message(),
            backend,
            status: self.status(),
        }
    }
}

/// Serializable form of [`CloudError`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_keep_their_kind() {
        let err: CloudError = ConfigError::ProfileNotFound("work".to_string()).into();
        assert!(matches!(err, CloudError::ProfileNotFound(ref name) if name == "work"));

        let err: CloudError = ConfigError::ProfileCorrupt {
            name: "work".to_string(),
            reason: "eof".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "profileCorrupt");

        let err: CloudError = ConfigError::InvalidProfileName("..".to_string()).into();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_backend_error_display() {
        let err = CloudError::backend(BackendKind::AppRunShared, Some(503), "unavailable");
        assert_eq!(
            err.to_string(),
            "AppRun shared API error (status 503): unavailable"
        );

        let err = CloudError::backend(BackendKind::Kms, None, "connection reset");
        assert_eq!(err.to_string(), "KMS API error: connection reset");
    }

    #[test]
    fn test_payload_serialization() {
        let err = CloudError::backend(BackendKind::Monitoring, Some(500), "boom");
        let json = serde_json::to_value(err.payload()).unwrap();
        assert_eq!(json["kind"], "backendError");
        assert_eq!(json["backend"], "monitoring");
        assert_eq!(json["status"], 500);

        let err = CloudError::NoAccessKey {
            storage_id: "42".to_string(),
        };
        let json = serde_json::to_value(err.payload()).unwrap();
        assert_eq!(json["kind"], "noAccessKey");
        assert!(json.get("status").is_none());
    }
}
