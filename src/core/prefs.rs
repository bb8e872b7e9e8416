//! Typed preferences on top of a [`KeyValueCollection`].

use super::codec;
use super::kv::{KeyValueCollection, WriteBatch, WriteOp};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A named collection with typed accessors for rates, positions and timestamps.
#[derive(Clone)]
pub struct Preferences {
    name: String,
    collection: Arc<dyn KeyValueCollection>,
}

impl Preferences {
    pub fn new(name: impl Into<String>, collection: Arc<dyn KeyValueCollection>) -> Self {
        Self {
            name: name.into(),
            collection,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_all(&self) -> Result<BTreeMap<String, Vec<u8>>> {
        let entries = self
            .collection
            .entries()
            .with_context(|| format!("Failed to read preferences: {}", self.name))?;
        Ok(entries.into_iter().collect())
    }

    /// Reads a rate, falling back to `default` when it is absent or malformed.
    pub fn get_float(&self, key: &str, default: f64) -> Result<f64> {
        let Some(bytes) = self.get_raw(key)? else {
            return Ok(default);
        };
        match codec::decode_rate(&bytes) {
            Some(rate) => Ok(rate),
            None => {
                warn!(prefs = %self.name, key, len = bytes.len(), "Malformed float value");
                Ok(default)
            }
        }
    }

    pub fn get_int(&self, key: &str) -> Result<Option<u32>> {
        let Some(bytes) = self.get_raw(key)? else {
            return Ok(None);
        };
        let value = codec::decode_position(&bytes);
        if value.is_none() {
            warn!(prefs = %self.name, key, len = bytes.len(), "Malformed int value");
        }
        Ok(value)
    }

    pub fn get_timestamp(&self, key: &str) -> Result<Option<i64>> {
        Ok(self
            .get_raw(key)?
            .and_then(|bytes| codec::decode_timestamp(&bytes)))
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get_raw(key)?.is_some())
    }

    pub fn edit(&self) -> Editor<'_> {
        Editor {
            prefs: self,
            batch: WriteBatch::default(),
        }
    }

    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.collection
            .get(key)
            .with_context(|| format!("Failed to read key {key} from {}", self.name))
    }
}

/// Pending changes to a [`Preferences`] collection, written by [`Editor::commit`].
pub struct Editor<'a> {
    prefs: &'a Preferences,
    batch: WriteBatch,
}

impl Editor<'_> {
    /// Drops everything already in the collection, including puts queued so far.
    pub fn clear(&mut self) -> &mut Self {
        self.batch.clear = true;
        self.batch.ops.clear();
        self
    }

    pub fn put_float(&mut self, key: &str, value: f64) -> &mut Self {
        self.put(key, codec::encode_rate(value))
    }

    pub fn put_int(&mut self, key: &str, value: u32) -> &mut Self {
        self.put(key, codec::encode_position(value))
    }

    pub fn put_timestamp(&mut self, key: &str, seconds: i64) -> &mut Self {
        self.put(key, codec::encode_timestamp(seconds))
    }

    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.batch.ops.push(WriteOp::Remove(key.to_string()));
        self
    }

    pub fn commit(self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        debug!(
            prefs = %self.prefs.name,
            clear = self.batch.clear,
            ops = self.batch.ops.len(),
            "Committing preferences"
        );
        self.prefs
            .collection
            .apply(self.batch)
            .with_context(|| format!("Failed to commit preferences: {}", self.prefs.name))
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> &mut Self {
        self.batch.ops.push(WriteOp::Put(key.to_string(), value));
        self
    }
}
