use crate::error::{ConfigError, Result};
use crate::profile::{Profile, ProfileConfig, ProfileCredentials};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// プロファイルディレクトリの親を上書きする環境変数 (usacloud と共通)
pub const PROFILE_DIR_ENV: &str = "SAKURACLOUD_PROFILE_DIR";

/// current ポインタもプロファイルも無いときに使うプロファイル名
pub const FALLBACK_PROFILE: &str = "default";

/// ゾーン未設定のプロファイルで使うゾーン
pub const DEFAULT_ZONE: &str = "is1a";

const USACLOUD_DIR: &str = ".usacloud";
const CONFIG_FILE: &str = "config.json";
const CURRENT_FILE: &str = "current";

/// usacloud 形式のプロファイルディレクトリ
///
/// ```text
/// ~/.usacloud/
///   current            # カレントプロファイル名
///   default/config.json
///   work/config.json
/// ```
///
/// 状態はキャッシュせず、呼び出しのたびにディスクを読み直す。
#[derive(Debug, Clone)]
pub struct ProfileStore {
    root: PathBuf,
}

impl ProfileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 環境変数 `SAKURACLOUD_PROFILE_DIR`、なければホームディレクトリから解決
    pub fn from_env() -> Result<Self> {
        if let Some(dir) = std::env::var(PROFILE_DIR_ENV).ok().filter(|d| !d.is_empty()) {
            return Ok(Self::new(PathBuf::from(dir).join(USACLOUD_DIR)));
        }

        let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
        Ok(Self::new(home.join(USACLOUD_DIR)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn profile_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn config_path(&self, name: &str) -> PathBuf {
        self.profile_dir(name).join(CONFIG_FILE)
    }

    fn current_path(&self) -> PathBuf {
        self.root.join(CURRENT_FILE)
    }

    /// config.json を持つ非隠しディレクトリ名を名前順で列挙
    fn profile_names(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') || !entry.path().is_dir() {
                continue;
            }
            if !self.config_path(&name).is_file() {
                continue;
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    /// current ファイルの中身 (フォールバックなし)
    fn read_pointer(&self) -> Option<String> {
        let content = fs::read_to_string(self.current_path()).ok()?;
        let name = content.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    /// プロファイル一覧
    ///
    /// 壊れた config.json を持つプロファイルも一覧には含める (ゾーンは空)。
    pub fn list_profiles(&self) -> Result<Vec<Profile>> {
        let names = self.profile_names()?;
        let current = self.current_from(&names);

        let profiles = names
            .iter()
            .map(|name| {
                let is_current = *name == current;
                match self.read_config(name) {
                    Ok(config) => Profile::from_config(name, &config, is_current),
                    Err(e) => {
                        tracing::debug!("Listing profile {} without config: {}", name, e);
                        Profile {
                            name: name.clone(),
                            access_token: String::new(),
                            access_token_secret: String::new(),
                            default_zone: None,
                            is_current,
                        }
                    }
                }
            })
            .collect();
        Ok(profiles)
    }

    /// カレントプロファイル名
    ///
    /// current ファイル → 最初のプロファイル → `"default"` の順にフォールバックする。
    /// 失敗はここで吸収し、呼び出し元には伝播しない。
    pub fn current_profile_name(&self) -> String {
        let names = self.profile_names().unwrap_or_default();
        self.current_from(&names)
    }

    fn current_from(&self, names: &[String]) -> String {
        if let Some(name) = self.read_pointer() {
            if names.contains(&name) {
                return name;
            }
            tracing::debug!("Current pointer names missing profile {}", name);
        }
        match names.first() {
            Some(first) => {
                tracing::debug!("No current pointer, falling back to {}", first);
                first.clone()
            }
            None => FALLBACK_PROFILE.to_string(),
        }
    }

    fn read_config(&self, name: &str) -> Result<ProfileConfig> {
        let path = self.config_path(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ConfigError::ProfileNotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| ConfigError::ProfileCorrupt {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// プロファイルを読み込む
    ///
    /// 認証情報が欠けている設定は補完せず `ProfileCorrupt` とする。
    pub fn load_profile(&self, name: &str) -> Result<Profile> {
        validate_name(name)?;
        let config = self.read_config(name)?;

        if config.access_token.is_empty() || config.access_token_secret.is_empty() {
            return Err(ConfigError::ProfileCorrupt {
                name: name.to_string(),
                reason: "AccessToken または AccessTokenSecret がありません".to_string(),
            });
        }

        let is_current = self.current_profile_name() == name;
        tracing::debug!("Loaded profile {}", name);
        Ok(Profile::from_config(name, &config, is_current))
    }

    /// 編集フォーム向けの認証情報
    pub fn credentials(&self, name: &str) -> Result<ProfileCredentials> {
        Ok(self.load_profile(name)?.credentials())
    }

    /// プロファイルの既定ゾーン
    ///
    /// プロファイルが読めない、またはゾーン未設定なら `is1a`。
    pub fn default_zone(&self, name: &str) -> String {
        match self.load_profile(name) {
            Ok(profile) => profile.default_zone.unwrap_or_else(|| DEFAULT_ZONE.to_string()),
            Err(e) => {
                tracing::debug!("Default zone for {} falls back to {}: {}", name, DEFAULT_ZONE, e);
                DEFAULT_ZONE.to_string()
            }
        }
    }

    /// current ポインタを書き換える
    pub fn set_current(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        if !self.config_path(name).is_file() {
            return Err(ConfigError::ProfileNotFound(name.to_string()));
        }

        fs::create_dir_all(&self.root)?;
        write_atomic(&self.current_path(), name.as_bytes())?;
        tracing::debug!("Current profile set to {}", name);
        Ok(())
    }

    /// プロファイルを新規作成
    pub fn create_profile(&self, name: &str, creds: &ProfileCredentials) -> Result<()> {
        validate_name(name)?;
        if self.profile_dir(name).exists() {
            return Err(ConfigError::ProfileAlreadyExists(name.to_string()));
        }

        fs::create_dir_all(self.profile_dir(name))?;
        self.write_config(name, &ProfileConfig::from_credentials(creds))?;
        tracing::info!("Created profile {}", name);
        Ok(())
    }

    /// プロファイルを更新
    ///
    /// 名前が変わる場合は新規作成 → current の付け替え → 旧プロファイル削除の順で行う。
    pub fn update_profile(
        &self,
        old_name: &str,
        new_name: &str,
        creds: &ProfileCredentials,
    ) -> Result<()> {
        validate_name(old_name)?;
        validate_name(new_name)?;

        if old_name != new_name {
            if !self.config_path(old_name).is_file() {
                return Err(ConfigError::ProfileNotFound(old_name.to_string()));
            }
            self.create_profile(new_name, creds)?;
            if self.read_pointer().as_deref() == Some(old_name) {
                self.set_current(new_name)?;
            }
            return self.delete_profile(old_name);
        }

        let mut config = self.read_config(old_name)?;
        config.apply(creds);
        self.write_config(old_name, &config)?;
        tracing::info!("Updated profile {}", old_name);
        Ok(())
    }

    /// プロファイルを削除
    pub fn delete_profile(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        let dir = self.profile_dir(name);
        if !dir.is_dir() {
            return Err(ConfigError::ProfileNotFound(name.to_string()));
        }

        fs::remove_dir_all(&dir)?;
        if self.read_pointer().as_deref() == Some(name) {
            fs::remove_file(self.current_path())?;
        }
        tracing::info!("Deleted profile {}", name);
        Ok(())
    }

    fn write_config(&self, name: &str, config: &ProfileConfig) -> Result<()> {
        let content = serde_json::to_vec_pretty(config).map_err(|e| ConfigError::ProfileCorrupt {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        write_atomic(&self.config_path(name), &content)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(ConfigError::InvalidProfileName(name.to_string()));
    }
    Ok(())
}

/// 一時ファイルに書いてから rename する
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(CONFIG_FILE);
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&tmp, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn write_profile(root: &Path, name: &str, body: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CONFIG_FILE), body).unwrap();
    }

    fn store_with(profiles: &[(&str, &str)]) -> (TempDir, ProfileStore) {
        let temp_dir = tempfile::tempdir().unwrap();
        for (name, body) in profiles {
            write_profile(temp_dir.path(), name, body);
        }
        let store = ProfileStore::new(temp_dir.path());
        (temp_dir, store)
    }

    #[test]
    fn test_load_profile_round_trip() {
        let (_dir, store) = store_with(&[(
            "work",
            r#"{"AccessToken":"tok","AccessTokenSecret":"sec","Zone":"tk1b"}"#,
        )]);

        let profile = store.load_profile("work").unwrap();
        assert_eq!(profile.name, "work");
        assert_eq!(profile.access_token, "tok");
        assert_eq!(profile.access_token_secret, "sec");
        assert_eq!(profile.default_zone.as_deref(), Some("tk1b"));
        assert!(profile.is_current);
    }

    #[test]
    fn test_load_profile_without_zone() {
        let (_dir, store) = store_with(&[(
            "work",
            r#"{"AccessToken":"tok","AccessTokenSecret":"sec"}"#,
        )]);

        let profile = store.load_profile("work").unwrap();
        assert_eq!(profile.default_zone, None);
    }

    #[test]
    fn test_default_zone_from_profile() {
        let (_dir, store) = store_with(&[(
            "work",
            r#"{"AccessToken":"tok","AccessTokenSecret":"sec","Zone":"tk1b"}"#,
        )]);
        assert_eq!(store.default_zone("work"), "tk1b");
    }

    #[test]
    fn test_default_zone_falls_back() {
        let (_dir, store) = store_with(&[
            ("nozone", r#"{"AccessToken":"tok","AccessTokenSecret":"sec","Zone":"  "}"#),
            ("broken", "{"),
        ]);
        assert_eq!(store.default_zone("nozone"), DEFAULT_ZONE);
        assert_eq!(store.default_zone("broken"), DEFAULT_ZONE);
        assert_eq!(store.default_zone("missing"), DEFAULT_ZONE);
    }

    #[test]
    fn test_load_missing_profile() {
        let (_dir, store) = store_with(&[]);
        let result = store.load_profile("nope");
        assert!(matches!(result, Err(ConfigError::ProfileNotFound(name)) if name == "nope"));
    }

    #[test]
    fn test_load_corrupt_profile() {
        let (_dir, store) = store_with(&[("broken", "{not json")]);
        let result = store.load_profile("broken");
        assert!(matches!(result, Err(ConfigError::ProfileCorrupt { .. })));
    }

    #[test]
    fn test_load_profile_missing_secret_is_corrupt() {
        let (_dir, store) = store_with(&[("half", r#"{"AccessToken":"tok"}"#)]);
        let result = store.load_profile("half");
        assert!(matches!(result, Err(ConfigError::ProfileCorrupt { .. })));
    }

    #[test]
    fn test_load_rejects_path_traversal() {
        let (_dir, store) = store_with(&[]);
        assert!(matches!(
            store.load_profile("../etc"),
            Err(ConfigError::InvalidProfileName(_))
        ));
    }

    #[test]
    fn test_list_skips_hidden_and_incomplete_dirs() {
        let (dir, store) = store_with(&[
            ("beta", r#"{"AccessToken":"b","AccessTokenSecret":"b"}"#),
            ("alpha", r#"{"AccessToken":"a","AccessTokenSecret":"a","Zone":"is1b"}"#),
            (".hidden", r#"{"AccessToken":"h","AccessTokenSecret":"h"}"#),
        ]);
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("current"), "beta\n").unwrap();

        let profiles = store.list_profiles().unwrap();
        let names: Vec<_> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(profiles[0].default_zone.as_deref(), Some("is1b"));
        assert!(!profiles[0].is_current);
        assert!(profiles[1].is_current);
    }

    #[test]
    fn test_list_missing_root_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(temp_dir.path().join("absent"));
        assert!(store.list_profiles().unwrap().is_empty());
    }

    #[test]
    fn test_list_includes_corrupt_profile() {
        let (_dir, store) = store_with(&[("broken", "{")]);
        let profiles = store.list_profiles().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].default_zone, None);
    }

    #[test]
    fn test_current_profile_fallbacks() {
        let (dir, store) = store_with(&[]);
        assert_eq!(store.current_profile_name(), FALLBACK_PROFILE);

        write_profile(
            dir.path(),
            "zeta",
            r#"{"AccessToken":"z","AccessTokenSecret":"z"}"#,
        );
        write_profile(
            dir.path(),
            "main",
            r#"{"AccessToken":"m","AccessTokenSecret":"m"}"#,
        );
        assert_eq!(store.current_profile_name(), "main");

        fs::write(dir.path().join("current"), "  zeta \n").unwrap();
        assert_eq!(store.current_profile_name(), "zeta");
    }

    #[test]
    fn test_stale_current_pointer_falls_back() {
        let (dir, store) = store_with(&[
            ("alpha", r#"{"AccessToken":"a","AccessTokenSecret":"a"}"#),
            ("beta", r#"{"AccessToken":"b","AccessTokenSecret":"b"}"#),
        ]);
        fs::write(dir.path().join("current"), "ghost").unwrap();

        assert_eq!(store.current_profile_name(), "alpha");
        let profiles = store.list_profiles().unwrap();
        let current: Vec<_> = profiles.iter().filter(|p| p.is_current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].name, "alpha");
    }

    #[test]
    fn test_set_current_requires_existing_profile() {
        let (_dir, store) = store_with(&[("a", r#"{"AccessToken":"a","AccessTokenSecret":"a"}"#)]);
        assert!(matches!(
            store.set_current("b"),
            Err(ConfigError::ProfileNotFound(_))
        ));

        store.set_current("a").unwrap();
        assert_eq!(store.current_profile_name(), "a");
    }

    #[test]
    fn test_create_and_duplicate() {
        let (_dir, store) = store_with(&[]);
        let creds = ProfileCredentials::new("tok", "sec", "is1a");
        store.create_profile("new", &creds).unwrap();

        let loaded = store.credentials("new").unwrap();
        assert_eq!(loaded.access_token, "tok");
        assert_eq!(loaded.zone, "is1a");

        assert!(matches!(
            store.create_profile("new", &creds),
            Err(ConfigError::ProfileAlreadyExists(_))
        ));
    }

    #[test]
    fn test_update_in_place_preserves_extra_keys() {
        let (dir, store) = store_with(&[(
            "work",
            r#"{"AccessToken":"old","AccessTokenSecret":"old","DefaultOutputType":"table"}"#,
        )]);

        store
            .update_profile("work", "work", &ProfileCredentials::new("new", "new", "tk1a"))
            .unwrap();

        let raw = fs::read_to_string(dir.path().join("work").join(CONFIG_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["AccessToken"], "new");
        assert_eq!(value["Zone"], "tk1a");
        assert_eq!(value["DefaultOutputType"], "table");
    }

    #[test]
    fn test_rename_moves_current_pointer() {
        let (dir, store) = store_with(&[(
            "old",
            r#"{"AccessToken":"t","AccessTokenSecret":"s"}"#,
        )]);
        store.set_current("old").unwrap();

        store
            .update_profile("old", "renamed", &ProfileCredentials::new("t", "s", ""))
            .unwrap();

        assert!(!dir.path().join("old").exists());
        assert_eq!(store.current_profile_name(), "renamed");
        assert!(store.load_profile("renamed").unwrap().is_current);
    }

    #[test]
    fn test_delete_clears_pointer() {
        let (dir, store) = store_with(&[
            ("a", r#"{"AccessToken":"a","AccessTokenSecret":"a"}"#),
            ("b", r#"{"AccessToken":"b","AccessTokenSecret":"b"}"#),
        ]);
        store.set_current("b").unwrap();

        store.delete_profile("b").unwrap();
        assert!(!dir.path().join("current").exists());
        assert_eq!(store.current_profile_name(), "a");

        assert!(matches!(
            store.delete_profile("b"),
            Err(ConfigError::ProfileNotFound(_))
        ));
    }

    #[test]
    #[serial]
    fn test_from_env_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        let parent = temp_dir.path().to_str().unwrap().to_string();

        temp_env::with_var(PROFILE_DIR_ENV, Some(parent), || {
            let store = ProfileStore::from_env().unwrap();
            assert_eq!(store.root(), temp_dir.path().join(".usacloud"));
        });
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_to_home() {
        temp_env::with_var(PROFILE_DIR_ENV, None::<&str>, || {
            let store = ProfileStore::from_env().unwrap();
            assert!(store.root().ends_with(".usacloud"));
        });
    }
}
