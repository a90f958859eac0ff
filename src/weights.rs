//! Weight vectors and the providers that produce them.
//!
//! The engine only reads a `symbol -> weight` map. Where the weights come
//! from (equal weights, a market-data proxy) is up to a [`WeightProvider`],
//! and provider failures stop at [`weights_or_uniform`].

use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::error::ProviderError;
use crate::types::Symbol;

/// Relative, non-negative weight per symbol.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeightVector {
    weights: FxHashMap<Symbol, f64>,
}

impl WeightVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight 1 for every non-empty symbol.
    pub fn uniform(symbols: &[Symbol]) -> Self {
        symbols
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| (s.clone(), 1.0))
            .collect()
    }

    /// Insert a weight. Negative and non-finite weights are stored as 0.
    pub fn insert(&mut self, symbol: impl Into<Symbol>, weight: f64) {
        let weight = if weight.is_finite() && weight > 0.0 {
            weight
        } else {
            0.0
        };
        self.weights.insert(symbol.into(), weight);
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.weights.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of every weight in the vector.
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(s, w)| (s.as_str(), *w))
    }
}

impl<S: Into<Symbol>> FromIterator<(S, f64)> for WeightVector {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut v = WeightVector::new();
        for (s, w) in iter {
            v.insert(s, w);
        }
        v
    }
}

/// Source of relative weights for a list of symbols.
pub trait WeightProvider {
    fn weights(&self, symbols: &[Symbol]) -> Result<WeightVector, ProviderError>;
}

/// Fetch weights, falling back to uniform weights on any provider error.
///
/// This is the provider boundary: callers get a usable vector no matter what
/// the market-data side did.
pub fn weights_or_uniform(provider: &dyn WeightProvider, symbols: &[Symbol]) -> WeightVector {
    match provider.weights(symbols) {
        Ok(weights) => weights,
        Err(e) => {
            warn!("Weight fetch failed ({e}); using uniform weights");
            WeightVector::uniform(symbols)
        }
    }
}

/// Equal weight for every symbol.
#[derive(Clone, Copy, Debug, Default)]
pub struct EqualWeights;

impl WeightProvider for EqualWeights {
    fn weights(&self, symbols: &[Symbol]) -> Result<WeightVector, ProviderError> {
        Ok(WeightVector::uniform(symbols))
    }
}

/// Last price and traded volume for one symbol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub volume: f64,
}

/// Market data needed by [`MarketProxyWeights`].
pub trait QuoteSource {
    /// Quote for `symbol`. Return [`ProviderError::MissingQuote`] for symbols
    /// the source does not know; any other error aborts the whole fetch.
    fn quote(&self, symbol: &str) -> Result<Quote, ProviderError>;
}

/// Heuristic multipliers applied on top of price × volume.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyMultipliers {
    /// Applied to every symbol in `large_caps`.
    pub large_cap: f64,
    pub btc_dominance: f64,
    pub eth_dominance: f64,
    /// Applied to crypto pairs other than BTC and ETH.
    pub alt_crypto_discount: f64,
    pub large_caps: Vec<Symbol>,
}

impl Default for ProxyMultipliers {
    fn default() -> Self {
        Self {
            large_cap: 3.0,
            btc_dominance: 4.0,
            eth_dominance: 2.0,
            alt_crypto_discount: 0.5,
            large_caps: [
                "AAPL", "MSFT", "NVDA", "GOOGL", "GOOG", "AMZN", "META", "TSLA", "AVGO",
                "BRK.B",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl ProxyMultipliers {
    /// Multiplier for one symbol.
    pub fn for_symbol(&self, symbol: &str) -> f64 {
        let upper = symbol.trim().to_ascii_uppercase();
        if let Some(base) = crypto_base(&upper) {
            return match base {
                "BTC" => self.btc_dominance,
                "ETH" => self.eth_dominance,
                _ => self.alt_crypto_discount,
            };
        }
        if self.large_caps.iter().any(|s| s.eq_ignore_ascii_case(&upper)) {
            self.large_cap
        } else {
            1.0
        }
    }
}

/// Base asset of a crypto pair (`BTC-USD`, `ETHUSDT`, `SOL/USD`), if any.
fn crypto_base(symbol: &str) -> Option<&str> {
    for suffix in ["-USD", "/USD", "-USDT", "USDT"] {
        if let Some(base) = symbol.strip_suffix(suffix) {
            if !base.is_empty() {
                return Some(base);
            }
        }
    }
    match symbol {
        "BTC" | "ETH" => Some(symbol),
        _ => None,
    }
}

/// Market-cap proxy: `price × volume × multiplier` per symbol.
///
/// Symbols without a quote are left out of the vector; the engine imputes
/// them at the mean weight.
#[derive(Clone, Debug)]
pub struct MarketProxyWeights<S> {
    source: S,
    multipliers: ProxyMultipliers,
}

impl<S: QuoteSource> MarketProxyWeights<S> {
    pub fn new(source: S) -> Self {
        Self::with_multipliers(source, ProxyMultipliers::default())
    }

    pub fn with_multipliers(source: S, multipliers: ProxyMultipliers) -> Self {
        Self {
            source,
            multipliers,
        }
    }

    pub fn multipliers(&self) -> &ProxyMultipliers {
        &self.multipliers
    }
}

impl<S: QuoteSource> WeightProvider for MarketProxyWeights<S> {
    fn weights(&self, symbols: &[Symbol]) -> Result<WeightVector, ProviderError> {
        let mut weights = WeightVector::new();
        for symbol in symbols.iter().filter(|s| !s.trim().is_empty()) {
            let quote = match self.source.quote(symbol) {
                Ok(q) => q,
                Err(ProviderError::MissingQuote(_)) => {
                    debug!("No quote for {symbol}; leaving weight unset");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if !quote.price.is_finite() || quote.price < 0.0 {
                return Err(ProviderError::InvalidQuote {
                    symbol: symbol.clone(),
                    reason: format!("price {}", quote.price),
                });
            }
            if !quote.volume.is_finite() || quote.volume < 0.0 {
                return Err(ProviderError::InvalidQuote {
                    symbol: symbol.clone(),
                    reason: format!("volume {}", quote.volume),
                });
            }
            let weight = quote.price * quote.volume * self.multipliers.for_symbol(symbol);
            weights.insert(symbol.clone(), weight);
        }
        Ok(weights)
    }
}
