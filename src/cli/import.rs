use crate::core::Preferences;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

pub const RATES_TIMESTAMP: &str = "rates_timestamp";

/// Parses a JSON object of `code -> rate` pairs. Codes are upper-cased.
pub fn parse_rates(json: &str) -> Result<BTreeMap<String, f64>> {
    let raw: BTreeMap<String, f64> =
        serde_json::from_str(json).context("Rates must be a JSON object of code -> number")?;

    let mut rates = BTreeMap::new();
    for (code, rate) in raw {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            bail!("Empty currency code in rates");
        }
        if !rate.is_finite() || rate < 0.0 {
            bail!("Invalid rate for {code}: {rate}");
        }
        if rates.insert(code.clone(), rate).is_some() {
            bail!("Duplicate currency code in rates: {code}");
        }
    }
    Ok(rates)
}

/// Replaces the rate store with `rates` and stamps the import time.
pub fn import_rates(
    rates_prefs: &Preferences,
    app_prefs: &Preferences,
    rates: &BTreeMap<String, f64>,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut editor = rates_prefs.edit();
    editor.clear();
    for (code, rate) in rates {
        editor.put_float(code, *rate);
    }
    editor.commit()?;

    let mut editor = app_prefs.edit();
    editor.put_timestamp(RATES_TIMESTAMP, now.timestamp());
    editor.commit()?;

    info!(count = rates.len(), "Imported rates");
    Ok(())
}

pub fn import_rates_from_path(
    rates_prefs: &Preferences,
    app_prefs: &Preferences,
    path: &Path,
) -> Result<usize> {
    debug!("Reading rates from {}", path.display());
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rates file: {}", path.display()))?;
    let rates = parse_rates(&json)
        .with_context(|| format!("Failed to parse rates file: {}", path.display()))?;
    import_rates(rates_prefs, app_prefs, &rates, Utc::now())?;
    Ok(rates.len())
}

pub fn rates_updated_at(app_prefs: &Preferences) -> Result<Option<DateTime<Utc>>> {
    Ok(app_prefs
        .get_timestamp(RATES_TIMESTAMP)?
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryCollection;
    use std::sync::Arc;

    fn prefs(name: &str) -> Preferences {
        Preferences::new(name, Arc::new(MemoryCollection::new()))
    }

    #[test]
    fn test_parse_rates() {
        let rates = parse_rates(r#"{"usd": 1.0, "EUR": 0.9, " JPY ": 110}"#).unwrap();
        assert_eq!(rates.len(), 3);
        assert_eq!(rates["USD"], 1.0);
        assert_eq!(rates["JPY"], 110.0);
    }

    #[test]
    fn test_parse_rates_rejects_bad_input() {
        assert!(parse_rates("[1, 2]").is_err());
        assert!(parse_rates(r#"{"USD": -1.0}"#).is_err());
        assert!(parse_rates(r#"{"": 1.0}"#).is_err());
        assert!(parse_rates(r#"{"usd": 1.0, "USD": 2.0}"#).is_err());
    }

    #[test]
    fn test_import_replaces_previous_rates() {
        let rates = prefs("rates");
        let app = prefs("app");
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        import_rates(&rates, &app, &parse_rates(r#"{"USD": 1.0, "GBP": 0.8}"#).unwrap(), now)
            .unwrap();
        import_rates(&rates, &app, &parse_rates(r#"{"USD": 1.0}"#).unwrap(), now).unwrap();

        let all = rates.get_all().unwrap();
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["USD"]);
        assert_eq!(rates_updated_at(&app).unwrap(), Some(now));
    }

    #[test]
    fn test_no_timestamp_before_first_import() {
        assert_eq!(rates_updated_at(&prefs("app")).unwrap(), None);
    }
}
