//! Persists the watchlist order as `code -> position` entries.

use crate::core::{Currency, Preferences, codec};
use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Outcome of [`OrderStore::restore`].
///
/// `skipped` counts entries whose position could not be decoded; `relocated`
/// counts entries whose position was out of range or already taken and which
/// were appended after the correctly placed ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoredSelection {
    pub currencies: Vec<Currency>,
    pub skipped: usize,
    pub relocated: usize,
}

impl RestoredSelection {
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.relocated == 0
    }
}

pub struct OrderStore {
    order: Preferences,
}

impl OrderStore {
    pub fn new(order: Preferences) -> Self {
        Self { order }
    }

    /// Replaces the whole record with `code(i) -> i`, in one commit.
    pub fn flush(&self, active: &[Currency]) -> Result<()> {
        let mut editor = self.order.edit();
        editor.clear();
        for (i, currency) in active.iter().enumerate() {
            let position = u32::try_from(i).context("Watchlist too large to persist")?;
            editor.put_int(currency.code(), position);
        }
        editor.commit()?;
        debug!(count = active.len(), "Flushed watchlist order");
        Ok(())
    }

    /// Rebuilds the watchlist, taking each rate from `rates` rather than the record.
    pub fn restore(&self, rates: &Preferences) -> Result<RestoredSelection> {
        let entries = self.order.get_all()?;
        let mut arena: Vec<Option<Currency>> = vec![None; entries.len()];
        let mut misplaced: Vec<(u32, Currency)> = Vec::new();
        let mut skipped = 0;

        for (code, bytes) in entries {
            let Some(position) = codec::decode_position(&bytes) else {
                warn!(code, len = bytes.len(), "Undecodable position, skipping");
                skipped += 1;
                continue;
            };
            let rate = rates.get_float(&code, 0.0)?;
            let currency = Currency::new(code, rate);

            match arena.get_mut(position as usize) {
                Some(slot) if slot.is_none() => *slot = Some(currency),
                _ => {
                    warn!(code = currency.code(), position, "Position out of place, relocating");
                    misplaced.push((position, currency));
                }
            }
        }

        misplaced.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.code().cmp(b.1.code())));
        let relocated = misplaced.len();

        let mut currencies: Vec<Currency> = arena.into_iter().flatten().collect();
        currencies.extend(misplaced.into_iter().map(|(_, currency)| currency));
        debug!(count = currencies.len(), skipped, relocated, "Restored watchlist order");

        Ok(RestoredSelection {
            currencies,
            skipped,
            relocated,
        })
    }
}
