//! The watchlist screen controller: lifecycle, selection and persistence.
//!
//! The host drives the controller explicitly:
//!
//! ```text
//! Created -> attach -> Attached -> create -> Visible <-> stop/start <-> Stopped
//!                                                  \-> destroy -> Destroyed
//! ```
//!
//! `create` restores the watchlist from transient saved state when the host
//! has one, otherwise from the persisted order record. `stop` flushes it,
//! together with the first launch marker when defaults were seeded.

use crate::catalog::load_catalog;
use crate::core::config::AppConfig;
use crate::core::{Currency, Preferences};
use crate::order_store::OrderStore;
use crate::store::{self, KeyValueStore};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::Range;
use tracing::{debug, info, warn};

pub const FIRST_LAUNCH_DONE: &str = "first_launch_done";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Attached,
    Visible,
    Stopped,
    Destroyed,
}

impl Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Lifecycle::Created => "created",
                Lifecycle::Attached => "attached",
                Lifecycle::Visible => "visible",
                Lifecycle::Stopped => "stopped",
                Lifecycle::Destroyed => "destroyed",
            }
        )
    }
}

/// Transient state handed back to [`WatchlistScreen::create`] when the
/// screen is recreated without a cold start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub active: Vec<Currency>,
    pub catalog: Vec<Currency>,
}

/// Receives redraw hints when watchlist positions change.
pub trait ChangeListener {
    fn positions_changed(&self, positions: Range<usize>);
}

/// Storage and settings the screen needs once attached.
#[derive(Clone)]
pub struct ScreenContext {
    pub rates: Preferences,
    pub order: Preferences,
    pub app: Preferences,
    pub default_currencies: Vec<String>,
}

impl ScreenContext {
    pub fn from_store(store: &KeyValueStore, config: &AppConfig) -> Result<Self> {
        Ok(Self {
            rates: store.preferences(store::RATES)?,
            order: store.preferences(store::ACTIVE_RATES)?,
            app: store.preferences(store::APP_PREFS)?,
            default_currencies: config.default_currencies.clone(),
        })
    }
}

pub struct WatchlistScreen {
    state: Lifecycle,
    context: Option<ScreenContext>,
    catalog: Vec<Currency>,
    active: Vec<Currency>,
    listener: Option<Box<dyn ChangeListener>>,
    first_launch_pending: bool,
}

impl WatchlistScreen {
    pub fn new_instance() -> Self {
        Self {
            state: Lifecycle::Created,
            context: None,
            catalog: Vec::new(),
            active: Vec::new(),
            listener: None,
            first_launch_pending: false,
        }
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn catalog(&self) -> &[Currency] {
        &self.catalog
    }

    pub fn active(&self) -> &[Currency] {
        &self.active
    }

    /// Catalog entries not yet on the watchlist.
    pub fn selectable(&self) -> Vec<&Currency> {
        self.catalog
            .iter()
            .filter(|c| !self.contains(c.code()))
            .collect()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.active.iter().any(|c| c.code() == code)
    }

    pub fn set_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.listener = Some(listener);
    }

    pub fn attach(&mut self, context: ScreenContext) -> Result<()> {
        self.expect_state(Lifecycle::Created, "attach")?;
        self.catalog = load_catalog(&context.rates)?;
        self.context = Some(context);
        self.transition(Lifecycle::Attached);
        Ok(())
    }

    pub fn create(&mut self, saved: Option<SavedState>) -> Result<()> {
        self.expect_state(Lifecycle::Attached, "create")?;
        match saved {
            Some(saved) => {
                debug!(count = saved.active.len(), "Restoring from saved state");
                self.active = saved.active;
                self.catalog = saved.catalog;
            }
            None => self.cold_start()?,
        }
        self.transition(Lifecycle::Visible);
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        self.expect_state(Lifecycle::Stopped, "start")?;
        self.transition(Lifecycle::Visible);
        Ok(())
    }

    pub fn save_state(&self) -> Result<SavedState> {
        if !matches!(self.state, Lifecycle::Visible | Lifecycle::Stopped) {
            bail!("Cannot save state while {}", self.state);
        }
        Ok(SavedState {
            active: self.active.clone(),
            catalog: self.catalog.clone(),
        })
    }

    /// Flushes the watchlist to the order record.
    pub fn stop(&mut self) -> Result<()> {
        self.expect_state(Lifecycle::Visible, "stop")?;
        let context = self.context()?;
        OrderStore::new(context.order.clone()).flush(&self.active)?;
        if self.first_launch_pending {
            let mut editor = context.app.edit();
            editor.put_int(FIRST_LAUNCH_DONE, 1);
            editor.commit()?;
            debug!("First launch marker saved");
            self.first_launch_pending = false;
        }
        self.transition(Lifecycle::Stopped);
        Ok(())
    }

    pub fn destroy(&mut self) -> Result<()> {
        if self.state == Lifecycle::Destroyed {
            bail!("Screen already destroyed");
        }
        if self.state == Lifecycle::Visible {
            warn!("Destroying a visible screen, watchlist changes are not flushed");
        }
        self.context = None;
        self.listener = None;
        self.transition(Lifecycle::Destroyed);
        Ok(())
    }

    /// Appends `currency` unless its code is already on the watchlist.
    ///
    /// Returns whether the watchlist changed.
    pub fn add_active_currency(&mut self, currency: Currency) -> Result<bool> {
        self.expect_state(Lifecycle::Visible, "add a currency")?;
        if self.contains(currency.code()) {
            info!(code = currency.code(), "Currency already on watchlist");
            return Ok(false);
        }
        info!(code = currency.code(), "Adding currency");
        self.active.push(currency);
        self.notify(0..self.active.len());
        Ok(true)
    }

    /// Puts `currency` back at `position`, as when a removal is undone.
    ///
    /// Returns whether the watchlist changed; duplicates are rejected.
    pub fn insert_active_currency(&mut self, position: usize, currency: Currency) -> Result<bool> {
        self.expect_state(Lifecycle::Visible, "insert a currency")?;
        let len = self.active.len();
        if position > len {
            bail!("Position out of range: {position} (watchlist has {len} entries)");
        }
        if self.contains(currency.code()) {
            info!(code = currency.code(), "Currency already on watchlist");
            return Ok(false);
        }
        info!(code = currency.code(), position, "Inserting currency");
        self.active.insert(position, currency);
        self.notify(position..self.active.len());
        Ok(true)
    }

    pub fn remove_active_currency(&mut self, code: &str) -> Result<Option<Currency>> {
        self.expect_state(Lifecycle::Visible, "remove a currency")?;
        let Some(position) = self.active.iter().position(|c| c.code() == code) else {
            return Ok(None);
        };
        let old_len = self.active.len();
        let removed = self.active.remove(position);
        info!(code, position, "Removed currency");
        self.notify(position..old_len);
        Ok(Some(removed))
    }

    pub fn remove_all(&mut self) -> Result<()> {
        self.expect_state(Lifecycle::Visible, "remove all currencies")?;
        let old_len = self.active.len();
        self.active.clear();
        info!(count = old_len, "Removed all currencies");
        self.notify(0..old_len);
        Ok(())
    }

    pub fn swap_currencies(&mut self, from: usize, to: usize) -> Result<()> {
        self.expect_state(Lifecycle::Visible, "reorder currencies")?;
        let len = self.active.len();
        if from >= len || to >= len {
            bail!("Position out of range: {from} -> {to} (watchlist has {len} entries)");
        }
        self.active.swap(from, to);
        debug!(from, to, "Swapped currencies");
        self.notify(from.min(to)..from.max(to) + 1);
        Ok(())
    }

    fn cold_start(&mut self) -> Result<()> {
        let context = self.context()?.clone();
        let restored = OrderStore::new(context.order.clone()).restore(&context.rates)?;
        if !restored.is_clean() {
            warn!(
                skipped = restored.skipped,
                relocated = restored.relocated,
                "Watchlist order record was corrupted"
            );
        }
        self.active = restored.currencies;

        let first_launch = !context.app.contains(FIRST_LAUNCH_DONE)?;
        if first_launch && self.active.is_empty() {
            self.active = self.seed_defaults(&context.default_currencies);
            info!(count = self.active.len(), "First launch, seeded default currencies");
        }
        // Without rates there was nothing to seed, so the next launch retries
        self.first_launch_pending = first_launch && !self.catalog.is_empty();
        Ok(())
    }

    fn seed_defaults(&self, codes: &[String]) -> Vec<Currency> {
        let mut seeded: Vec<Currency> = Vec::new();
        for code in codes {
            if seeded.iter().any(|c| c.code() == code.as_str()) {
                continue;
            }
            match self.catalog.iter().find(|c| c.code() == code.as_str()) {
                Some(currency) => seeded.push(currency.clone()),
                None => warn!(code, "Default currency not in catalog"),
            }
        }
        seeded
    }

    fn context(&self) -> Result<&ScreenContext> {
        match &self.context {
            Some(context) => Ok(context),
            None => bail!("Screen is not attached"),
        }
    }

    fn expect_state(&self, expected: Lifecycle, action: &str) -> Result<()> {
        if self.state != expected {
            bail!("Cannot {action} while {}, expected {expected}", self.state);
        }
        Ok(())
    }

    fn transition(&mut self, next: Lifecycle) {
        debug!(from = %self.state, to = %next, "Lifecycle transition");
        self.state = next;
    }

    fn notify(&self, positions: Range<usize>) {
        if let Some(listener) = &self.listener {
            listener.positions_changed(positions);
        }
    }
}
