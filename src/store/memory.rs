use crate::core::kv::{KeyValueCollection, WriteBatch, WriteOp};
use anyhow::{Result, anyhow};
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory collection using a BTreeMap behind a RwLock
#[derive(Default)]
pub struct MemoryCollection {
    inner: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueCollection for MemoryCollection {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let map = self
            .inner
            .read()
            .map_err(|e| anyhow!("Memory collection poisoned: {e}"))?;
        let value = map.get(key).cloned();
        debug!(key, hit = value.is_some(), "Memory GET");
        Ok(value)
    }

    fn entries(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let map = self
            .inner
            .read()
            .map_err(|e| anyhow!("Memory collection poisoned: {e}"))?;
        Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn apply(&self, batch: WriteBatch) -> Result<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|e| anyhow!("Memory collection poisoned: {e}"))?;
        if batch.clear {
            map.clear();
            debug!("Memory CLEAR");
        }
        for op in batch.ops {
            match op {
                WriteOp::Put(key, value) => {
                    debug!(key, "Memory PUT");
                    map.insert(key, value);
                }
                WriteOp::Remove(key) => {
                    debug!(key, "Memory REMOVE");
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(key: &str, value: &[u8]) -> WriteOp {
        WriteOp::Put(key.to_string(), value.to_vec())
    }

    #[test]
    fn test_memory_get_put() {
        let collection = MemoryCollection::new();

        // Initially, collection is empty
        assert!(collection.get("key1").unwrap().is_none());

        collection
            .apply(WriteBatch {
                clear: false,
                ops: vec![put("key1", &[1, 2, 3])],
            })
            .unwrap();

        assert_eq!(collection.get("key1").unwrap(), Some(vec![1, 2, 3]));
        assert!(collection.get("key2").unwrap().is_none());
    }

    #[test]
    fn test_memory_entries_sorted_by_key() {
        let collection = MemoryCollection::new();
        collection
            .apply(WriteBatch {
                clear: false,
                ops: vec![put("b", &[2]), put("a", &[1]), put("c", &[3])],
            })
            .unwrap();

        let keys: Vec<String> = collection
            .entries()
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_memory_clear_runs_before_ops() {
        let collection = MemoryCollection::new();
        collection
            .apply(WriteBatch {
                clear: false,
                ops: vec![put("old", &[0])],
            })
            .unwrap();

        collection
            .apply(WriteBatch {
                clear: true,
                ops: vec![put("new", &[1]), WriteOp::Remove("missing".to_string())],
            })
            .unwrap();

        assert!(collection.get("old").unwrap().is_none());
        assert_eq!(collection.get("new").unwrap(), Some(vec![1]));
    }
}
