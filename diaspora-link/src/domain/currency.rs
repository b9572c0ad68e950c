//! Currencies a trip can be priced in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown currency code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported currency: {0}")]
pub struct UnsupportedCurrency(String);

/// A supported pricing currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Tnd,
    Dzd,
    Chf,
    Mad,
    Usd,
}

impl Currency {
    pub const ALL: [Currency; 6] = [
        Currency::Eur,
        Currency::Tnd,
        Currency::Dzd,
        Currency::Chf,
        Currency::Mad,
        Currency::Usd,
    ];

    /// ISO 4217 code.
    pub fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Tnd => "TND",
            Currency::Dzd => "DZD",
            Currency::Chf => "CHF",
            Currency::Mad => "MAD",
            Currency::Usd => "USD",
        }
    }

    /// Symbol used when displaying prices.
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Tnd => "د.ت",
            Currency::Dzd => "د.ج",
            Currency::Chf => "CHF",
            Currency::Mad => "د.م",
            Currency::Usd => "$",
        }
    }
}

impl FromStr for Currency {
    type Err = UnsupportedCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| UnsupportedCurrency(s.to_string()))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Price per kilogram in a given currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub per_kg: f64,
    pub currency: Currency,
}

impl Price {
    pub fn new(per_kg: f64, currency: Currency) -> Self {
        Self { per_kg, currency }
    }
}
