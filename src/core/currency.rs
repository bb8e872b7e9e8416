//! Currency value type shared by the catalog and the watchlist

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A currency code paired with its exchange rate against the base unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    code: String,
    rate: f64,
}

impl Currency {
    pub fn new(code: impl Into<String>, rate: f64) -> Self {
        Self {
            code: code.into(),
            rate,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.code, self.rate)
    }
}
