//! Key-value storage abstractions

use anyhow::Result;

/// A single mutation queued in a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Put(String, Vec<u8>),
    Remove(String),
}

/// A set of mutations applied to a collection in one commit.
///
/// When `clear` is set the collection is emptied before `ops` run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    pub clear: bool,
    pub ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn is_empty(&self) -> bool {
        !self.clear && self.ops.is_empty()
    }
}

/// A flat, string-keyed collection of opaque byte values.
pub trait KeyValueCollection: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// All entries, ordered by key.
    fn entries(&self) -> Result<Vec<(String, Vec<u8>)>>;

    /// Applies every mutation of `batch` or none of them.
    fn apply(&self, batch: WriteBatch) -> Result<()>;
}
