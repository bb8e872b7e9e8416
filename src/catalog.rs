//! Builds the sorted list of every currency known to the rate store.

use crate::core::{Currency, Preferences, codec};
use anyhow::Result;
use tracing::{debug, warn};

/// Loads every `code -> rate` pair, sorted by code.
///
/// Values that do not decode as a rate load as `0.0`.
pub fn load_catalog(rates: &Preferences) -> Result<Vec<Currency>> {
    let mut catalog: Vec<Currency> = rates
        .get_all()?
        .into_iter()
        .map(|(code, bytes)| {
            let rate = codec::decode_rate(&bytes).unwrap_or_else(|| {
                warn!(code, len = bytes.len(), "Malformed rate, defaulting to 0.0");
                0.0
            });
            Currency::new(code, rate)
        })
        .collect();

    // Stores do not all guarantee key order
    catalog.sort_by(|a, b| a.code().cmp(b.code()));
    debug!(count = catalog.len(), "Loaded catalog");
    Ok(catalog)
}

/// Case-insensitive substring match on the currency code.
pub fn filter_catalog<'a>(catalog: &'a [Currency], query: &str) -> Vec<&'a Currency> {
    let query = query.trim().to_uppercase();
    catalog
        .iter()
        .filter(|c| c.code().to_uppercase().contains(&query))
        .collect()
}
