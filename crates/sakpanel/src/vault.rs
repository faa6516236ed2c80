//! Secret vault for object storage keys and registry passwords
//!
//! Secrets live in the OS keychain under one service name. Each entry is
//! addressed by `"<namespace>/<scope>/<principal>"`, for example
//! `objectstorage/isk01/AKID123`.

use sakpanel_cloud::{CloudError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Keychain service name for every entry
pub const SERVICE: &str = "sakpanel";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretNamespace {
    /// Object storage secret keys, scoped by site, keyed by access key ID
    ObjectStorage,
    /// Registry passwords, scoped by registry, keyed by user name
    ContainerRegistry,
}

impl SecretNamespace {
    pub fn as_str(self) -> &'static str {
        match self {
            SecretNamespace::ObjectStorage => "objectstorage",
            SecretNamespace::ContainerRegistry => "containerregistry",
        }
    }
}

/// Address of one secret
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretKey {
    pub namespace: SecretNamespace,
    pub scope_id: String,
    pub principal: String,
}

impl SecretKey {
    pub fn new(
        namespace: SecretNamespace,
        scope_id: impl Into<String>,
        principal: impl Into<String>,
    ) -> Self {
        Self {
            namespace,
            scope_id: scope_id.into(),
            principal: principal.into(),
        }
    }

    /// Keychain account string
    pub fn account(&self) -> String {
        format!(
            "{}/{}/{}",
            self.namespace.as_str(),
            self.scope_id,
            self.principal
        )
    }
}

/// A secret that never shows up in `Debug` output
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl From<String> for SecretString {
    fn from(secret: String) -> Self {
        Self(secret)
    }
}

/// Synchronous keychain backend
///
/// Implementations return `SecretNotFound` for a missing entry on `get` and
/// `delete`.
pub trait SecretStore: Send + Sync + 'static {
    fn set(&self, account: &str, secret: &str) -> Result<()>;
    fn get(&self, account: &str) -> Result<String>;
    fn delete(&self, account: &str) -> Result<()>;
}

/// OS keychain through the `keyring` crate
#[derive(Debug, Clone, Default)]
pub struct KeyringStore;

impl KeyringStore {
    fn entry(account: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(SERVICE, account).map_err(|e| keyring_error(account, e))
    }
}

fn keyring_error(account: &str, err: keyring::Error) -> CloudError {
    match err {
        keyring::Error::NoEntry => CloudError::SecretNotFound {
            account: account.to_string(),
        },
        other => CloudError::Vault(other.to_string()),
    }
}

impl SecretStore for KeyringStore {
    fn set(&self, account: &str, secret: &str) -> Result<()> {
        Self::entry(account)?
            .set_password(secret)
            .map_err(|e| keyring_error(account, e))
    }

    fn get(&self, account: &str) -> Result<String> {
        Self::entry(account)?
            .get_password()
            .map_err(|e| keyring_error(account, e))
    }

    fn delete(&self, account: &str) -> Result<()> {
        Self::entry(account)?
            .delete_credential()
            .map_err(|e| keyring_error(account, e))
    }
}

/// In-process store for tests and keychain-less environments
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| CloudError::Vault("memory store lock poisoned".to_string()))
    }
}

impl SecretStore for MemoryStore {
    fn set(&self, account: &str, secret: &str) -> Result<()> {
        self.entries()?
            .insert(account.to_string(), secret.to_string());
        Ok(())
    }

    fn get(&self, account: &str) -> Result<String> {
        self.entries()?
            .get(account)
            .cloned()
            .ok_or_else(|| CloudError::SecretNotFound {
                account: account.to_string(),
            })
    }

    fn delete(&self, account: &str) -> Result<()> {
        self.entries()?
            .remove(account)
            .map(|_| ())
            .ok_or_else(|| CloudError::SecretNotFound {
                account: account.to_string(),
            })
    }
}

enum WriteOp {
    Save(SecretString),
    Delete,
}

/// Async facade over a [`SecretStore`]
///
/// Keychain calls run on the blocking pool. Writes to the same key are
/// serialized; reads take no lock. A started write runs to completion on its
/// own task even if the caller stops waiting.
#[derive(Clone)]
pub struct Vault {
    store: Arc<dyn SecretStore>,
    locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl fmt::Debug for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault").finish_non_exhaustive()
    }
}

impl Vault {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Vault on the OS keychain
    pub fn keyring() -> Self {
        Self::new(Arc::new(KeyringStore))
    }

    pub async fn save(&self, key: &SecretKey, secret: SecretString) -> Result<()> {
        self.write(key, WriteOp::Save(secret)).await
    }

    pub async fn get(&self, key: &SecretKey) -> Result<SecretString> {
        let store = Arc::clone(&self.store);
        let account = key.account();
        tracing::debug!("Reading secret {}", account);
        tokio::task::spawn_blocking(move || store.get(&account))
            .await
            .map_err(|e| CloudError::Vault(e.to_string()))?
            .map(SecretString::from)
    }

    /// Deleting a missing secret is `SecretNotFound`.
    pub async fn delete(&self, key: &SecretKey) -> Result<()> {
        self.write(key, WriteOp::Delete).await
    }

    pub async fn has(&self, key: &SecretKey) -> bool {
        self.get(key).await.is_ok()
    }

    async fn write(&self, key: &SecretKey, op: WriteOp) -> Result<()> {
        let account = key.account();
        let lock = self.lock_for(&account)?;
        let store = Arc::clone(&self.store);
        let locks = Arc::clone(&self.locks);

        let task = tokio::spawn(async move {
            let guard = Arc::clone(&lock).lock_owned().await;
            let target = account.clone();
            let result = tokio::task::spawn_blocking(move || match op {
                WriteOp::Save(secret) => {
                    tracing::debug!("Saving secret {}", target);
                    store.set(&target, secret.expose())
                }
                WriteOp::Delete => {
                    tracing::debug!("Deleting secret {}", target);
                    store.delete(&target)
                }
            })
            .await
            .map_err(|e| CloudError::Vault(e.to_string()));
            drop(guard);
            release_lock(&locks, &account, lock);
            result?
        });

        task.await.map_err(|e| CloudError::Vault(e.to_string()))?
    }

    fn lock_for(&self, account: &str) -> Result<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| CloudError::Vault("vault lock map poisoned".to_string()))?;
        Ok(Arc::clone(locks.entry(account.to_string()).or_default()))
    }
}

/// Drop the per-key lock once no other writer holds or waits on it.
///
/// Clones are only taken under the map lock, so the count is stable here.
fn release_lock(
    locks: &Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    account: &str,
    lock: Arc<tokio::sync::Mutex<()>>,
) {
    let Ok(mut locks) = locks.lock() else {
        return;
    };
    // one reference in the map, one here
    if Arc::strong_count(&lock) == 2 {
        locks.remove(account);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_vault() -> Vault {
        Vault::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_account_format() {
        let key = SecretKey::new(SecretNamespace::ObjectStorage, "isk01", "AKID123");
        assert_eq!(key.account(), "objectstorage/isk01/AKID123");

        let key = SecretKey::new(SecretNamespace::ContainerRegistry, "113600000001", "ci");
        assert_eq!(key.account(), "containerregistry/113600000001/ci");
    }

    #[test]
    fn test_secret_string_debug() {
        let secret = SecretString::new("hunter2");
        assert_eq!(format!("{:?}", secret), "***");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[tokio::test]
    async fn test_round_trip_and_delete() {
        let vault = memory_vault();
        let key = SecretKey::new(SecretNamespace::ObjectStorage, "isk01", "AKID123");

        assert!(!vault.has(&key).await);
        vault.save(&key, SecretString::new("s3cr3t")).await.unwrap();
        assert!(vault.has(&key).await);
        assert_eq!(vault.get(&key).await.unwrap().expose(), "s3cr3t");

        vault.delete(&key).await.unwrap();
        assert!(!vault.has(&key).await);
        assert!(matches!(
            vault.get(&key).await,
            Err(CloudError::SecretNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let vault = memory_vault();
        let key = SecretKey::new(SecretNamespace::ContainerRegistry, "1", "nobody");
        let err = vault.delete(&key).await.unwrap_err();
        assert_eq!(err.kind(), "secretNotFound");
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let vault = memory_vault();
        let key = SecretKey::new(SecretNamespace::ObjectStorage, "isk01", "AKID");

        vault.save(&key, SecretString::new("first")).await.unwrap();
        vault.save(&key, SecretString::new("second")).await.unwrap();
        assert_eq!(vault.get(&key).await.unwrap().expose(), "second");
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_one_key() {
        let vault = memory_vault();
        let key = SecretKey::new(SecretNamespace::ObjectStorage, "isk01", "AKID");

        let writes: Vec<_> = (0..8)
            .map(|n| {
                let vault = vault.clone();
                let key = key.clone();
                tokio::spawn(async move { vault.save(&key, SecretString::new(format!("v{}", n))).await })
            })
            .collect();
        for write in writes {
            write.await.unwrap().unwrap();
        }

        let value = vault.get(&key).await.unwrap();
        assert!(value.expose().starts_with('v'));
        assert!(vault.locks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_locks_are_released() {
        let vault = memory_vault();
        for n in 0..4 {
            let key = SecretKey::new(
                SecretNamespace::ContainerRegistry,
                "113600000001",
                format!("user{}", n),
            );
            vault.save(&key, SecretString::new("pw")).await.unwrap();
        }
        let missing = SecretKey::new(SecretNamespace::ObjectStorage, "isk01", "GONE");
        assert!(vault.delete(&missing).await.is_err());

        assert!(vault.locks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_namespaces_do_not_collide() {
        let vault = memory_vault();
        let storage = SecretKey::new(SecretNamespace::ObjectStorage, "a", "b");
        let registry = SecretKey::new(SecretNamespace::ContainerRegistry, "a", "b");

        vault.save(&storage, SecretString::new("one")).await.unwrap();
        assert!(!vault.has(&registry).await);
    }
}
