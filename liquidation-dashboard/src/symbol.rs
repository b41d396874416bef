//! Fixed symbol catalog
//!
//! Every symbol that can appear in filter state or on screen is a member of
//! this enum, so catalog membership is enforced by the type system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NormalizeError;

/// Quote currency suffix stripped from raw pair names ("BTCUSDT" -> "BTC").
pub const QUOTE_SUFFIX: &str = "usdt";

/// Canonical short ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Symbol {
    Btc,
    Eth,
    Sol,
    Bnb,
    Doge,
    Xrp,
    Ada,
    Avax,
}

impl Symbol {
    /// Catalog in display order
    pub const ALL: [Symbol; 8] = [
        Symbol::Btc,
        Symbol::Eth,
        Symbol::Sol,
        Symbol::Bnb,
        Symbol::Doge,
        Symbol::Xrp,
        Symbol::Ada,
        Symbol::Avax,
    ];

    /// Lowercase catalog key (e.g. "btc")
    pub fn key(&self) -> &'static str {
        match self {
            Symbol::Btc => "btc",
            Symbol::Eth => "eth",
            Symbol::Sol => "sol",
            Symbol::Bnb => "bnb",
            Symbol::Doge => "doge",
            Symbol::Xrp => "xrp",
            Symbol::Ada => "ada",
            Symbol::Avax => "avax",
        }
    }

    /// Canonical display string (e.g. "BTC")
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Btc => "BTC",
            Symbol::Eth => "ETH",
            Symbol::Sol => "SOL",
            Symbol::Bnb => "BNB",
            Symbol::Doge => "DOGE",
            Symbol::Xrp => "XRP",
            Symbol::Ada => "ADA",
            Symbol::Avax => "AVAX",
        }
    }

    /// Look up a symbol by its exact lowercase catalog key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|symbol| symbol.key() == key)
    }

    /// Resolve a raw trading pair ("BTCUSDT", "ethusdt") or bare base ("SOL").
    pub fn from_pair(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        let base = lower.strip_suffix(QUOTE_SUFFIX).unwrap_or(&lower);
        Self::from_key(base)
    }

    /// Pair label shown on funding cards (e.g. "BTC/USDT")
    pub fn pair_label(&self) -> String {
        format!("{}/USDT", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_pair(s).ok_or_else(|| NormalizeError::UnknownSymbol(s.to_string()))
    }
}
