//! RocksDB scope store
//!
//! Scopes are stored as JSON documents keyed by ID. A second column family
//! indexes default scopes; RocksDB iterates keys in byte order, which is the
//! ID order `list_default` needs.

use crate::change::Change;
use crate::error::{Result, ScopeError};
use crate::store::ScopeStore;
use crate::types::Scope;
use async_trait::async_trait;
use parking_lot::Mutex;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, WriteOptions, DB,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Column family names
pub const CF_SCOPES: &str = "scopes";
pub const CF_DEFAULT_INDEX: &str = "default_scopes";

/// Storage configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Database path
    pub path: PathBuf,

    /// Max open files
    pub max_open_files: i32,

    /// Sync the write-ahead log on every write
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/scopes"),
            max_open_files: 512,
            sync_writes: false,
        }
    }
}

/// RocksDB scope store implementation
#[derive(Clone)]
pub struct RocksDbScopeStore {
    db: Arc<DB>,
    // Serialises read-modify-write cycles; readers never take it.
    write_lock: Arc<Mutex<()>>,
    sync_writes: bool,
}

impl RocksDbScopeStore {
    /// Open or create a store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = RocksDbConfig {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        };
        Self::open_with_config(config)
    }

    /// Open with custom configuration
    pub fn open_with_config(config: RocksDbConfig) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(config.max_open_files);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_SCOPES, Options::default()),
            ColumnFamilyDescriptor::new(CF_DEFAULT_INDEX, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| ScopeError::Storage(format!("Failed to open RocksDB: {}", e)))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
            sync_writes: config.sync_writes,
        })
    }

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| ScopeError::Storage(format!("Column family not found: {}", name)))
    }

    fn read_scope(&self, id: &str) -> Result<Option<Scope>> {
        let cf_scopes = self.cf_handle(CF_SCOPES)?;
        let bytes = self
            .db
            .get_cf(cf_scopes, id.as_bytes())
            .map_err(|e| ScopeError::Storage(format!("Failed to read scope {}: {}", id, e)))?;

        bytes
            .map(|bytes| serde_json::from_slice(&bytes).map_err(ScopeError::from))
            .transpose()
    }

    /// Add the document write and index maintenance for `scope` to `batch`
    fn stage_scope(&self, batch: &mut WriteBatch, scope: &Scope) -> Result<()> {
        let cf_scopes = self.cf_handle(CF_SCOPES)?;
        let cf_defaults = self.cf_handle(CF_DEFAULT_INDEX)?;

        batch.put_cf(cf_scopes, scope.id.as_bytes(), serde_json::to_vec(scope)?);
        if scope.is_default {
            batch.put_cf(cf_defaults, scope.id.as_bytes(), b"");
        } else {
            batch.delete_cf(cf_defaults, scope.id.as_bytes());
        }
        Ok(())
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.sync_writes);
        self.db
            .write_opt(batch, &write_opts)
            .map_err(|e| ScopeError::Storage(format!("Failed to write batch: {}", e)))
    }

    /// Run `f` on the blocking pool; RocksDB I/O and the write lock both block
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| ScopeError::Storage(format!("RocksDB task failed: {}", e)))?
    }

    fn create_blocking(&self, scope: Scope) -> Result<()> {
        let _guard = self.write_lock.lock();
        if self.read_scope(&scope.id)?.is_some() {
            return Err(ScopeError::AlreadyExists(scope.id));
        }

        let mut batch = WriteBatch::default();
        self.stage_scope(&mut batch, &scope)?;
        self.write(batch)
    }

    fn get_multi_blocking(&self, ids: &[String]) -> Result<HashMap<String, Scope>> {
        let mut results = HashMap::new();
        for id in ids {
            if let Some(scope) = self.read_scope(id)? {
                results.insert(id.clone(), scope);
            }
        }
        Ok(results)
    }

    fn list_default_blocking(&self) -> Result<Vec<Scope>> {
        let cf_defaults = self.cf_handle(CF_DEFAULT_INDEX)?;

        let mut results = Vec::new();
        for item in self.db.iterator_cf(cf_defaults, IteratorMode::Start) {
            let (key, _) =
                item.map_err(|e| ScopeError::Storage(format!("Failed to scan default scopes: {}", e)))?;
            let id = String::from_utf8(key.to_vec())
                .map_err(|e| ScopeError::Serialization(format!("Invalid scope ID in index: {}", e)))?;

            // An index entry can outlive its document only if a write was
            // interrupted; skip it rather than fail the listing.
            if let Some(scope) = self.read_scope(&id)? {
                results.push(scope);
            }
        }
        Ok(results)
    }

    fn update_blocking(&self, id: &str, change: &Change) -> Result<()> {
        let _guard = self.write_lock.lock();
        let Some(scope) = self.read_scope(id)? else {
            return Ok(());
        };

        let mut batch = WriteBatch::default();
        self.stage_scope(&mut batch, &change.apply_to(&scope))?;
        self.write(batch)
    }

    fn delete_blocking(&self, id: &str) -> Result<()> {
        let cf_scopes = self.cf_handle(CF_SCOPES)?;
        let cf_defaults = self.cf_handle(CF_DEFAULT_INDEX)?;

        let _guard = self.write_lock.lock();
        let mut batch = WriteBatch::default();
        batch.delete_cf(cf_scopes, id.as_bytes());
        batch.delete_cf(cf_defaults, id.as_bytes());
        self.write(batch)
    }
}

#[async_trait]
impl ScopeStore for RocksDbScopeStore {
    async fn create(&self, scope: Scope) -> Result<()> {
        self.blocking(move |store| store.create_blocking(scope)).await
    }

    async fn get_multi(&self, ids: &[String]) -> Result<HashMap<String, Scope>> {
        let ids = ids.to_vec();
        self.blocking(move |store| store.get_multi_blocking(&ids)).await
    }

    async fn list_default(&self) -> Result<Vec<Scope>> {
        self.blocking(|store| store.list_default_blocking()).await
    }

    async fn update(&self, id: &str, change: &Change) -> Result<()> {
        if change.is_empty() {
            return Ok(());
        }

        let id = id.to_string();
        let change = change.clone();
        self.blocking(move |store| store.update_blocking(&id, &change)).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.blocking(move |store| store.delete_blocking(&id)).await
    }
}
