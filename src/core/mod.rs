//! Core types and storage abstractions

pub mod codec;
pub mod config;
pub mod currency;
pub mod kv;
pub mod log;
pub mod prefs;

// Re-export main types for cleaner imports
pub use currency::Currency;
pub use kv::{KeyValueCollection, WriteBatch, WriteOp};
pub use prefs::Preferences;
