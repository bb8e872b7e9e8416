use super::import::rates_updated_at;
use super::ui;
use crate::catalog::filter_catalog;
use crate::core::Currency;
use crate::core::config::AppConfig;
use crate::selection::{ScreenContext, WatchlistScreen};
use crate::store::{self, KeyValueStore};
use anyhow::{Context, Result, bail};
use tracing::debug;

/// Runs `action` against a freshly created screen and flushes it afterwards.
///
/// Every CLI invocation is a cold start: the watchlist comes back from the
/// order record and goes back into it when the screen stops.
fn with_screen<T>(
    store: &KeyValueStore,
    config: &AppConfig,
    action: impl FnOnce(&mut WatchlistScreen) -> Result<T>,
) -> Result<T> {
    let mut screen = WatchlistScreen::new_instance();
    screen.attach(ScreenContext::from_store(store, config)?)?;
    screen.create(None)?;

    let result = action(&mut screen)?;

    screen.stop()?;
    screen.destroy()?;
    Ok(result)
}

fn to_index(position: usize, len: usize) -> Result<usize> {
    if position == 0 || position > len {
        bail!("Position {position} is out of range, watchlist has {len} entries");
    }
    Ok(position - 1)
}

pub fn show_catalog(
    store: &KeyValueStore,
    config: &AppConfig,
    filter: Option<&str>,
) -> Result<String> {
    with_screen(store, config, |screen| {
        let currencies = match filter {
            Some(query) => filter_catalog(screen.catalog(), query),
            None => screen.catalog().iter().collect(),
        };
        debug!(count = currencies.len(), "Showing catalog");
        Ok(ui::currency_table("Catalog", currencies, false))
    })
}

pub fn show_watchlist(store: &KeyValueStore, config: &AppConfig) -> Result<String> {
    let app = store.preferences(store::APP_PREFS)?;
    let updated_at = rates_updated_at(&app)?;

    with_screen(store, config, |screen| {
        let mut output = ui::currency_table("Watchlist", screen.active(), true);
        let footer = match updated_at {
            Some(ts) => format!("Rates as of {}", ts.format("%Y-%m-%d %H:%M UTC")),
            None => "No rates imported yet".to_string(),
        };
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(&footer, ui::StyleType::Subtle)
        ));
        Ok(output)
    })
}

pub fn add(store: &KeyValueStore, config: &AppConfig, codes: &[String]) -> Result<String> {
    with_screen(store, config, |screen| {
        let mut picked: Vec<Currency> = Vec::new();
        for code in codes {
            let code = code.trim().to_uppercase();
            let currency = screen
                .catalog()
                .iter()
                .find(|c| c.code() == code)
                .cloned()
                .with_context(|| format!("Unknown currency code: {code}"))?;
            picked.push(currency);
        }

        let mut lines = Vec::new();
        for currency in picked {
            let code = currency.code().to_string();
            if screen.add_active_currency(currency)? {
                lines.push(format!("Added {code}"));
            } else {
                lines.push(ui::style_text(
                    &format!("{code} is already on the watchlist"),
                    ui::StyleType::Subtle,
                ));
            }
        }
        Ok(lines.join("\n"))
    })
}

pub fn remove(store: &KeyValueStore, config: &AppConfig, code: &str) -> Result<String> {
    let code = code.trim().to_uppercase();
    with_screen(store, config, |screen| {
        match screen.remove_active_currency(&code)? {
            Some(_) => Ok(format!("Removed {code}")),
            None => Ok(ui::style_text(
                &format!("{code} is not on the watchlist"),
                ui::StyleType::Error,
            )),
        }
    })
}

/// Swaps the entries at 1-based positions `from` and `to`.
pub fn move_currency(
    store: &KeyValueStore,
    config: &AppConfig,
    from: usize,
    to: usize,
) -> Result<String> {
    with_screen(store, config, |screen| {
        let len = screen.active().len();
        let (from, to) = (to_index(from, len)?, to_index(to, len)?);
        screen.swap_currencies(from, to)?;
        Ok(ui::currency_table("Watchlist", screen.active(), true))
    })
}

pub fn clear(store: &KeyValueStore, config: &AppConfig) -> Result<String> {
    with_screen(store, config, |screen| {
        let count = screen.active().len();
        screen.remove_all()?;
        Ok(format!("Removed {count} currencies"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (KeyValueStore, AppConfig) {
        let store = KeyValueStore::in_memory();
        let rates = store.preferences(store::RATES).unwrap();
        let mut editor = rates.edit();
        editor
            .put_float("USD", 1.0)
            .put_float("EUR", 0.9)
            .put_float("JPY", 110.0);
        editor.commit().unwrap();
        let config = AppConfig {
            data_path: None,
            default_currencies: Vec::new(),
        };
        (store, config)
    }

    fn order(store: &KeyValueStore) -> Vec<String> {
        let mut entries: Vec<(u32, String)> = store
            .preferences(store::ACTIVE_RATES)
            .unwrap()
            .get_all()
            .unwrap()
            .into_iter()
            .map(|(code, bytes)| (crate::core::codec::decode_position(&bytes).unwrap(), code))
            .collect();
        entries.sort();
        entries.into_iter().map(|(_, code)| code).collect()
    }

    #[test]
    fn test_add_move_remove_persist_between_invocations() {
        let (store, config) = setup();

        add(&store, &config, &["usd".to_string(), "JPY".to_string()]).unwrap();
        assert_eq!(order(&store), vec!["USD", "JPY"]);

        move_currency(&store, &config, 1, 2).unwrap();
        assert_eq!(order(&store), vec!["JPY", "USD"]);

        remove(&store, &config, "jpy").unwrap();
        assert_eq!(order(&store), vec!["USD"]);

        clear(&store, &config).unwrap();
        assert!(order(&store).is_empty());
    }

    #[test]
    fn test_unknown_code_leaves_watchlist_untouched() {
        let (store, config) = setup();
        add(&store, &config, &["EUR".to_string()]).unwrap();

        let err = add(&store, &config, &["USD".to_string(), "XYZ".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unknown currency code: XYZ"));
        assert_eq!(order(&store), vec!["EUR"]);
    }

    #[test]
    fn test_move_rejects_bad_positions() {
        let (store, config) = setup();
        add(&store, &config, &["EUR".to_string()]).unwrap();
        assert!(move_currency(&store, &config, 0, 1).is_err());
        assert!(move_currency(&store, &config, 1, 2).is_err());
    }

    #[test]
    fn test_show_catalog_with_filter() {
        let (store, config) = setup();
        let output = show_catalog(&store, &config, Some("jp")).unwrap();
        assert!(output.contains("JPY"));
        assert!(!output.contains("USD"));
    }

    #[test]
    fn test_failed_action_skips_flush() {
        let (store, config) = setup();
        add(&store, &config, &["EUR".to_string()]).unwrap();

        let err = with_screen::<()>(&store, &config, |screen| {
            screen.remove_all()?;
            bail!("Interrupted")
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Interrupted");
        assert_eq!(order(&store), vec!["EUR"]);
    }

    #[test]
    fn test_failed_first_command_keeps_defaults() {
        let (store, mut config) = setup();
        config.default_currencies = vec!["JPY".to_string(), "USD".to_string()];

        assert!(move_currency(&store, &config, 1, 9).is_err());
        assert!(order(&store).is_empty());

        show_watchlist(&store, &config).unwrap();
        assert_eq!(order(&store), vec!["JPY", "USD"]);
    }

    #[test]
    fn test_show_watchlist_before_import_defers_defaults() {
        let store = KeyValueStore::in_memory();
        let config = AppConfig {
            data_path: None,
            default_currencies: vec!["EUR".to_string()],
        };
        show_watchlist(&store, &config).unwrap();
        assert!(order(&store).is_empty());

        let rates = store.preferences(store::RATES).unwrap();
        let mut editor = rates.edit();
        editor.put_float("EUR", 0.9);
        editor.commit().unwrap();

        show_watchlist(&store, &config).unwrap();
        assert_eq!(order(&store), vec!["EUR"]);
    }

    #[test]
    fn test_show_watchlist_without_import() {
        let (store, config) = setup();
        add(&store, &config, &["EUR".to_string()]).unwrap();
        let output = show_watchlist(&store, &config).unwrap();
        assert!(output.contains("EUR"));
        assert!(output.contains("No rates imported yet"));
    }
}
