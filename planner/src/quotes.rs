//! File-backed market data for proportional weighting.
//!
//! A quotes file maps symbols to their last price and traded volume:
//!
//! ```json
//! {
//!   "AAPL":    { "price": 190.25, "volume": 52000000 },
//!   "BTC-USD": { "price": 64000.0, "volume": 21000 }
//! }
//! ```

use std::path::Path;

use allocbook::{
    EqualWeights, MarketProxyWeights, ProviderError, Quote, QuoteSource, WeightProvider,
};
use log::{info, warn};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Deserialize)]
struct QuoteRecord {
    price: f64,
    volume: f64,
}

/// Quotes loaded from a JSON file. Lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct QuotesFile {
    quotes: FxHashMap<String, Quote>,
}

impl QuotesFile {
    /// Load a quotes file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::QuotesRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let quotes = Self::from_json(&contents)?;
        info!("Loaded {} quotes from {}", quotes.len(), path.display());
        Ok(quotes)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self> {
        let records: FxHashMap<String, QuoteRecord> = serde_json::from_str(json)?;
        let quotes = records
            .into_iter()
            .map(|(symbol, r)| {
                (
                    symbol.trim().to_ascii_uppercase(),
                    Quote {
                        price: r.price,
                        volume: r.volume,
                    },
                )
            })
            .collect();
        Ok(Self { quotes })
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl QuoteSource for QuotesFile {
    fn quote(&self, symbol: &str) -> std::result::Result<Quote, ProviderError> {
        self.quotes
            .get(&symbol.trim().to_ascii_uppercase())
            .copied()
            .ok_or_else(|| ProviderError::MissingQuote(symbol.to_string()))
    }
}

/// Pick the weight provider for a run.
///
/// `override_path` wins over the configured quotes file. Without any quotes
/// file, or when the file cannot be loaded, weights are uniform.
pub fn weight_provider(config: &Config, override_path: Option<&Path>) -> Box<dyn WeightProvider> {
    let path = override_path.or(config.weights.quotes_file.as_deref());
    let Some(path) = path else {
        info!("No quotes file configured; proportional modes use equal weights");
        return Box::new(EqualWeights);
    };
    match QuotesFile::load(path) {
        Ok(quotes) => Box::new(MarketProxyWeights::with_multipliers(
            quotes,
            config.multipliers(),
        )),
        Err(e) => {
            warn!("{e}; falling back to uniform weights");
            Box::new(EqualWeights)
        }
    }
}
