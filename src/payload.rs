//! Strategy-configuration payload: `{symbol, allocation}[]` plus cash.
//!
//! This is the shape handed to the external save API:
//!
//! ```json
//! {
//!   "allocations": [
//!     { "symbol": "AAPL", "allocation": 45.0 },
//!     { "symbol": "MSFT", "allocation": 45.0 }
//!   ],
//!   "cash_balance_percent": 10.0
//! }
//! ```
//!
//! Requires the `payload` feature.

use serde::{Deserialize, Serialize};

use crate::error::PayloadError;
use crate::set::{AllocationEntry, AllocationSet};
use crate::types::{FULL_ALLOCATION, Symbol};

/// One row of the payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub symbol: Symbol,
    pub allocation: f64,
}

/// Serialized form of an [`AllocationSet`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyAllocation {
    pub allocations: Vec<AllocationLine>,
    pub cash_balance_percent: f64,
}

impl From<&AllocationSet> for StrategyAllocation {
    fn from(set: &AllocationSet) -> Self {
        Self {
            allocations: set
                .entries()
                .iter()
                .map(|e| AllocationLine {
                    symbol: e.symbol.clone(),
                    allocation: e.percentage,
                })
                .collect(),
            cash_balance_percent: set.cash_percentage(),
        }
    }
}

impl StrategyAllocation {
    /// Check every number is finite and within `[0, 100]`.
    pub fn check(&self) -> Result<(), PayloadError> {
        if !in_range(self.cash_balance_percent) {
            return Err(PayloadError::InvalidCash(self.cash_balance_percent));
        }
        for line in &self.allocations {
            if !in_range(line.allocation) {
                return Err(PayloadError::InvalidAllocation {
                    symbol: line.symbol.clone(),
                    value: line.allocation,
                });
            }
        }
        Ok(())
    }

    /// Rebuild the allocation set, checking the numbers first.
    pub fn into_set(self) -> Result<AllocationSet, PayloadError> {
        self.check()?;
        let entries = self
            .allocations
            .into_iter()
            .map(|line| AllocationEntry::new(line.symbol, line.allocation))
            .collect();
        Ok(AllocationSet::from_entries(entries, self.cash_balance_percent))
    }

    pub fn to_json(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PayloadError> {
        let payload: StrategyAllocation = serde_json::from_str(json)?;
        payload.check()?;
        Ok(payload)
    }
}

fn in_range(value: f64) -> bool {
    value.is_finite() && (0.0..=FULL_ALLOCATION).contains(&value)
}

impl AllocationSet {
    /// Serialize into the strategy-configuration payload shape.
    pub fn to_payload(&self) -> StrategyAllocation {
        StrategyAllocation::from(self)
    }
}
