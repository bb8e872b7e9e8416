pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::kv::KeyValueCollection;
use crate::core::prefs::Preferences;
use anyhow::{Context, Result, anyhow};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};
use tracing::debug;

/// Exchange rates keyed by currency code.
pub const RATES: &str = "rates";
/// Watchlist positions keyed by currency code.
pub const ACTIVE_RATES: &str = "active_rates";
/// Application flags such as the first launch marker.
pub const APP_PREFS: &str = "app_prefs";

/// A key-value store that can hold multiple named collections.
///
/// Backed by a fjall keyspace when opened from disk, otherwise every
/// collection lives in memory.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Keyspace>,
}

impl KeyValueStore {
    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        debug!("Opened store at {}", path.display());

        Ok(Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: Some(keyspace),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let path = config.default_data_path()?.join("store");
        Self::open(&path)
    }

    /// Returns the named collection, creating it on first use.
    pub fn get_collection(&self, name: &str) -> Result<Arc<dyn KeyValueCollection>> {
        if let Some(collection) = self
            .collections
            .read()
            .map_err(|e| anyhow!("Store lock poisoned: {e}"))?
            .get(name)
        {
            return Ok(Arc::clone(collection));
        }

        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Store lock poisoned: {e}"))?;
        if let Some(collection) = collections.get(name) {
            return Ok(Arc::clone(collection));
        }

        let collection: Arc<dyn KeyValueCollection> = match &self.keyspace {
            Some(keyspace) => {
                let partition = keyspace
                    .open_partition(name, PartitionCreateOptions::default())
                    .with_context(|| format!("Failed to open collection: {name}"))?;
                Arc::new(DiskCollection::new(keyspace.clone(), partition))
            }
            None => Arc::new(MemoryCollection::new()),
        };
        debug!(name, "Created collection");
        collections.insert(name.to_string(), Arc::clone(&collection));
        Ok(collection)
    }

    pub fn preferences(&self, name: &str) -> Result<Preferences> {
        Ok(Preferences::new(name, self.get_collection(name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_in_memory_collections_are_shared_by_name() {
        let store = KeyValueStore::in_memory();
        let rates = store.preferences(RATES).unwrap();
        let mut editor = rates.edit();
        editor.put_float("USD", 1.0);
        editor.commit().unwrap();

        let again = store.preferences(RATES).unwrap();
        assert_eq!(again.get_float("USD", 0.0).unwrap(), 1.0);

        let other = store.preferences(ACTIVE_RATES).unwrap();
        assert!(other.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_disk_store_persists_across_open() {
        let dir = tempdir().unwrap();
        {
            let store = KeyValueStore::open(dir.path()).unwrap();
            let order = store.preferences(ACTIVE_RATES).unwrap();
            let mut editor = order.edit();
            editor.put_int("JPY", 0);
            editor.commit().unwrap();
        }

        let store = KeyValueStore::open(dir.path()).unwrap();
        let order = store.preferences(ACTIVE_RATES).unwrap();
        assert_eq!(order.get_int("JPY").unwrap(), Some(0));
    }
}
