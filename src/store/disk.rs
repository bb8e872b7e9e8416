use crate::core::kv::{KeyValueCollection, WriteBatch, WriteOp};
use anyhow::Result;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use tracing::{debug, warn};

/// A collection stored in one fjall partition.
///
/// Batches are written through a keyspace write batch so a clear and the
/// puts that follow it land in a single journal entry.
pub struct DiskCollection {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Keyspace, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }
}

impl KeyValueCollection for DiskCollection {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.partition.get(key.as_bytes())?.map(|v| v.to_vec());
        debug!(key, hit = value.is_some(), "Disk GET");
        Ok(value)
    }

    fn entries(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let mut entries = Vec::new();
        for item in self.partition.iter() {
            let (key, value) = item?;
            match String::from_utf8(key.to_vec()) {
                Ok(key) => entries.push((key, value.to_vec())),
                Err(e) => warn!("Skipping non UTF-8 key: {}", e),
            }
        }
        Ok(entries)
    }

    fn apply(&self, batch: WriteBatch) -> Result<()> {
        let mut tx = self.keyspace.batch();
        if batch.clear {
            for key in self.partition.keys() {
                let key = key?;
                tx.remove(&self.partition, &*key);
            }
            debug!("Disk CLEAR");
        }
        for op in batch.ops {
            match op {
                WriteOp::Put(key, value) => {
                    debug!(key, "Disk PUT");
                    tx.insert(&self.partition, key.as_bytes(), value.as_slice());
                }
                WriteOp::Remove(key) => {
                    debug!(key, "Disk REMOVE");
                    tx.remove(&self.partition, key.as_bytes());
                }
            }
        }
        tx.commit()?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::PartitionCreateOptions;
    use tempfile::tempdir;

    fn open(path: &std::path::Path) -> DiskCollection {
        let keyspace = fjall::Config::new(path).open().unwrap();
        let partition = keyspace
            .open_partition("test", PartitionCreateOptions::default())
            .unwrap();
        DiskCollection::new(keyspace, partition)
    }

    fn put(key: &str, value: &[u8]) -> WriteOp {
        WriteOp::Put(key.to_string(), value.to_vec())
    }

    #[test]
    fn test_disk_get_put() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

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
    fn test_disk_clear_and_rewrite() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        collection
            .apply(WriteBatch {
                clear: false,
                ops: vec![put("a", &[0]), put("b", &[1])],
            })
            .unwrap();
        collection
            .apply(WriteBatch {
                clear: true,
                ops: vec![put("c", &[0])],
            })
            .unwrap();

        let entries = collection.entries().unwrap();
        assert_eq!(entries, vec![("c".to_string(), vec![0])]);
    }

    #[test]
    fn test_disk_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let collection = open(dir.path());
            collection
                .apply(WriteBatch {
                    clear: false,
                    ops: vec![put("USD", &[9]), WriteOp::Remove("none".to_string())],
                })
                .unwrap();
        }

        let collection = open(dir.path());
        assert_eq!(collection.get("USD").unwrap(), Some(vec![9]));
    }
}
