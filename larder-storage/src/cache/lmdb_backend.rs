//! LMDB-backed key-value store.
//!
//! Uses the heed crate (Rust bindings for LMDB) so cached recommendations
//! and pantry invalidation marks survive process restarts, the way a
//! browser's local storage survives a page reload.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The store uses:
//! - Read transactions for `get`
//! - Write transactions for `set`, `remove` and `clear_user`

use std::path::Path;

use async_trait::async_trait;
use heed::types::Str;
use heed::{Database, Env, EnvOpenOptions};
use larder_core::{StoreError, UserKey};

use super::traits::{KeyValueStore, StoreResult};
use super::user_key::UserScopedKey;

/// Error type for LMDB store operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert LmdbStoreError to StoreError.
impl From<LmdbStoreError> for StoreError {
    fn from(e: LmdbStoreError) -> Self {
        match e {
            LmdbStoreError::Io(_) | LmdbStoreError::EnvOpen(_) => StoreError::Io {
                reason: e.to_string(),
            },
            LmdbStoreError::DbOpen(_) | LmdbStoreError::Transaction(_) => {
                StoreError::Transaction {
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn txn_err(e: heed::Error) -> LmdbStoreError {
    LmdbStoreError::Transaction(e.to_string())
}

/// Persistent string store in a single unnamed LMDB database.
///
/// # Example
///
/// ```ignore
/// use larder_storage::cache::{LmdbKeyValueStore, RecommendationCache};
///
/// let store = LmdbKeyValueStore::new("/var/cache/larder", 16)?;
/// let cache = RecommendationCache::new(store, backend);
/// ```
pub struct LmdbKeyValueStore {
    env: Env,
    db: Database<Str, Str>,
}

impl LmdbKeyValueStore {
    /// Open (or create) a store under `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the LMDB
    /// environment or database cannot be opened.
    pub fn new<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbStoreError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env.write_txn().map_err(txn_err)?;
        let db: Database<Str, Str> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;
        wtxn.commit().map_err(txn_err)?;

        Ok(Self { env, db })
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<u64, LmdbStoreError> {
        let rtxn = self.env.read_txn().map_err(txn_err)?;
        self.db.len(&rtxn).map_err(txn_err)
    }

    pub fn is_empty(&self) -> Result<bool, LmdbStoreError> {
        Ok(self.len()? == 0)
    }

    /// Delete every key owned by `user`. Returns the number removed.
    ///
    /// Deletes exact keys rather than a key prefix, since a user name may
    /// itself contain the scope separator.
    pub fn clear_user(&self, user: &UserKey) -> Result<u64, LmdbStoreError> {
        let mut wtxn = self.env.write_txn().map_err(txn_err)?;
        let mut deleted = 0u64;
        for key in UserScopedKey::all_for(user) {
            if self.db.delete(&mut wtxn, &key.encode()).map_err(txn_err)? {
                deleted += 1;
            }
        }
        wtxn.commit().map_err(txn_err)?;

        Ok(deleted)
    }
}

#[async_trait]
impl KeyValueStore for LmdbKeyValueStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let rtxn = self.env.read_txn().map_err(txn_err)?;
        let value = self.db.get(&rtxn, key).map_err(txn_err)?;
        Ok(value.map(str::to_string))
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut wtxn = self.env.write_txn().map_err(txn_err)?;
        self.db.put(&mut wtxn, key, value).map_err(txn_err)?;
        wtxn.commit().map_err(txn_err)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let mut wtxn = self.env.write_txn().map_err(txn_err)?;
        self.db.delete(&mut wtxn, key).map_err(txn_err)?;
        wtxn.commit().map_err(txn_err)?;
        Ok(())
    }
}
