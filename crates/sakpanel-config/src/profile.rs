use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// usacloud の `config.json`
///
/// 型付けするのは認証情報とゾーンのみ。それ以外のキーは `extra` に保持し、
/// 書き戻し時に失わないようにする。
#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct ProfileConfig {
    #[serde(rename = "AccessToken", default)]
    pub access_token: String,
    #[serde(rename = "AccessTokenSecret", default)]
    pub access_token_secret: String,
    #[serde(rename = "Zone", default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProfileConfig {
    pub(crate) fn from_credentials(creds: &ProfileCredentials) -> Self {
        let mut config = Self {
            access_token: String::new(),
            access_token_secret: String::new(),
            zone: None,
            extra: serde_json::Map::new(),
        };
        config.apply(creds);
        config
    }

    pub(crate) fn apply(&mut self, creds: &ProfileCredentials) {
        self.access_token = creds.access_token.clone();
        self.access_token_secret = creds.access_token_secret.clone();
        self.zone = non_empty(&creds.zone);
    }

    pub(crate) fn zone(&self) -> Option<String> {
        self.zone.as_deref().and_then(|z| non_empty(z))
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// 名前付きの認証プロファイル
///
/// シリアライズ時 (GUI 向けの一覧表示) には認証情報を含めない。
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    #[serde(skip)]
    pub access_token: String,
    #[serde(skip)]
    pub access_token_secret: String,
    #[serde(serialize_with = "zone_or_empty")]
    pub default_zone: Option<String>,
    pub is_current: bool,
}

impl Profile {
    pub(crate) fn from_config(name: &str, config: &ProfileConfig, is_current: bool) -> Self {
        Self {
            name: name.to_string(),
            access_token: config.access_token.clone(),
            access_token_secret: config.access_token_secret.clone(),
            default_zone: config.zone(),
            is_current,
        }
    }

    /// 編集フォーム向けの認証情報
    pub fn credentials(&self) -> ProfileCredentials {
        ProfileCredentials {
            access_token: self.access_token.clone(),
            access_token_secret: self.access_token_secret.clone(),
            zone: self.default_zone.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("access_token", &"***")
            .field("access_token_secret", &"***")
            .field("default_zone", &self.default_zone)
            .field("is_current", &self.is_current)
            .finish()
    }
}

fn zone_or_empty<S: Serializer>(zone: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(zone.as_deref().unwrap_or_default())
}

/// プロファイルの作成・更新に使う認証情報
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCredentials {
    pub access_token: String,
    pub access_token_secret: String,
    #[serde(default)]
    pub zone: String,
}

impl ProfileCredentials {
    pub fn new(
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
        zone: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
            zone: zone.into(),
        }
    }
}

impl fmt::Debug for ProfileCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileCredentials")
            .field("access_token", &"***")
            .field("access_token_secret", &"***")
            .field("zone", &self.zone)
            .finish()
    }
}
