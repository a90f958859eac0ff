//! Allocation data model: entries plus a cash reserve.

use crate::types::{FULL_ALLOCATION, Symbol, clamp_percent};

/// One asset's share of capital.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocationEntry {
    /// Asset symbol. Empty for a row the user has not filled in yet.
    pub symbol: Symbol,
    /// Share of total capital, in `[0, 100]`.
    pub percentage: f64,
}

impl AllocationEntry {
    pub fn new(symbol: impl Into<Symbol>, percentage: f64) -> Self {
        Self {
            symbol: symbol.into(),
            percentage: clamp_percent(percentage),
        }
    }

    /// A freshly added row: no symbol, 0%.
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// Returns true if no symbol has been chosen.
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.symbol.trim().is_empty()
    }
}

/// An ordered list of entries plus a cash percentage.
///
/// A set is ready to save when cash plus entries add up to 100 (see
/// [`validate`](crate::validate)). Engine operations never mutate a set in
/// place; they return a new one.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocationSet {
    entries: Vec<AllocationEntry>,
    cash_percentage: f64,
}

impl AllocationSet {
    /// An empty set with no cash reserve.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty set holding `cash` percent in cash.
    pub fn with_cash(cash: f64) -> Self {
        Self {
            entries: Vec::new(),
            cash_percentage: clamp_percent(cash),
        }
    }

    /// Build a set from existing entries. Values are clamped to `[0, 100]`
    /// but not rebalanced.
    pub fn from_entries(entries: Vec<AllocationEntry>, cash: f64) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| AllocationEntry::new(e.symbol, e.percentage))
            .collect();
        Self {
            entries,
            cash_percentage: clamp_percent(cash),
        }
    }

    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    pub fn cash_percentage(&self) -> f64 {
        self.cash_percentage
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry percentages (cash excluded).
    pub fn entries_total(&self) -> f64 {
        self.entries.iter().map(|e| e.percentage).sum()
    }

    /// Cash plus every entry.
    pub fn total(&self) -> f64 {
        self.cash_percentage + self.entries_total()
    }

    /// The non-cash budget: `100 - cash`.
    pub fn available(&self) -> f64 {
        FULL_ALLOCATION - self.cash_percentage
    }

    /// Percentage held in `symbol`, summed over rows carrying that symbol.
    pub fn percentage_of(&self, symbol: &str) -> Option<f64> {
        let mut found = None;
        for e in self.entries.iter().filter(|e| e.symbol == symbol) {
            *found.get_or_insert(0.0) += e.percentage;
        }
        found
    }

    /// Symbols in row order, placeholders included.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.entries.iter().map(|e| e.symbol.clone()).collect()
    }

    pub(crate) fn from_parts(entries: Vec<AllocationEntry>, cash_percentage: f64) -> Self {
        Self {
            entries,
            cash_percentage,
        }
    }

    pub(crate) fn into_entries(self) -> Vec<AllocationEntry> {
        self.entries
    }
}
