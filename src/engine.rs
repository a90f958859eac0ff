//! Rebalancing operations.
//!
//! Every function here is pure: it takes a set (plus parameters) and returns
//! a new set. Results are settled to two decimals once, at the end of each
//! call, so repeated edits never accumulate drift.

use log::debug;

use crate::error::AllocationError;
use crate::mode::{AllocationMode, EditOrigin};
use crate::set::{AllocationEntry, AllocationSet};
use crate::types::{FULL_UNITS, Symbol, from_units, settle, to_units};
use crate::weights::WeightVector;

/// Result of [`edit_entry`]: the new set and the (possibly switched) mode.
#[derive(Clone, Debug, PartialEq)]
pub struct Edit {
    pub set: AllocationSet,
    pub mode: AllocationMode,
}

/// Distribute `100 - cash` across the entries by `weights`.
///
/// With no weights, or weights summing to zero, every entry gets an equal
/// share. An entry whose symbol has no weight is treated as carrying the mean
/// of the weights that are present, so a freshly added row is never starved.
pub fn apply_weights(
    set: &AllocationSet,
    weights: Option<&WeightVector>,
    cash: f64,
) -> AllocationSet {
    let cash_units = to_units(cash);
    let budget = FULL_UNITS - cash_units;
    let mut entries = set.clone().into_entries();
    if entries.is_empty() {
        return AllocationSet::from_parts(entries, from_units(cash_units));
    }

    let raw: Vec<f64> = match weights.and_then(|w| resolve_weights(&entries, w)) {
        Some(resolved) => {
            let total: f64 = resolved.iter().sum();
            resolved
                .iter()
                .map(|w| from_units(budget) * w / total)
                .collect()
        }
        None => {
            debug!("No usable weights; splitting evenly across {} entries", entries.len());
            even(entries.len(), budget)
        }
    };

    write_units(&mut entries, &settle(&raw, budget));
    AllocationSet::from_parts(entries, from_units(cash_units))
}

/// Per-entry weights with missing symbols imputed at the mean.
///
/// `None` when nothing usable is left (no weights, or a zero total).
fn resolve_weights(entries: &[AllocationEntry], weights: &WeightVector) -> Option<Vec<f64>> {
    let found: Vec<Option<f64>> = entries.iter().map(|e| weights.get(&e.symbol)).collect();
    let known: Vec<f64> = found.iter().flatten().copied().collect();
    if known.is_empty() {
        return None;
    }
    let mean = known.iter().sum::<f64>() / known.len() as f64;
    let resolved: Vec<f64> = found.into_iter().map(|w| w.unwrap_or(mean)).collect();

    let total: f64 = resolved.iter().sum();
    if total > 0.0 && total.is_finite() {
        Some(resolved)
    } else {
        None
    }
}

/// Change the cash reserve and rescale the entries to the new budget.
///
/// Entries keep their relative weighting. If they currently sum to zero the
/// budget is split evenly instead of dividing by zero.
pub fn set_cash(set: &AllocationSet, new_cash: f64) -> AllocationSet {
    let cash_units = to_units(new_cash);
    let budget = FULL_UNITS - cash_units;
    let mut entries = set.clone().into_entries();
    if entries.is_empty() {
        return AllocationSet::from_parts(entries, from_units(cash_units));
    }

    let current: f64 = entries.iter().map(|e| e.percentage).sum();
    let raw: Vec<f64> = if current > 0.0 {
        let factor = from_units(budget) / current;
        entries.iter().map(|e| e.percentage * factor).collect()
    } else {
        even(entries.len(), budget)
    };

    write_units(&mut entries, &settle(&raw, budget));
    AllocationSet::from_parts(entries, from_units(cash_units))
}

/// Set one entry's percentage.
///
/// A slider edit outside `Custom` switches the mode to `Custom` first. The
/// new value is clamped so the entry cannot push the total past 100:
///
/// - in `Custom`, the cap is `100 - cash - (all other entries)` and no other
///   entry moves;
/// - in the automatic modes, the cap is `100 - cash - (entries ranked ahead
///   of it)`, and the entries other than the edited one are rescaled from
///   their previous proportions to fill what is left. If they summed to zero
///   they split it evenly; if nothing is left they go to zero.
pub fn edit_entry(
    set: &AllocationSet,
    mode: AllocationMode,
    index: usize,
    new_percentage: f64,
    origin: EditOrigin,
) -> Result<Edit, AllocationError> {
    check_index(set, index)?;

    let mode = if origin == EditOrigin::Slider && mode != AllocationMode::Custom {
        debug!("Slider moved on entry {index}; switching {mode} -> custom");
        AllocationMode::Custom
    } else {
        mode
    };

    let cash_units = to_units(set.cash_percentage());
    let budget = FULL_UNITS - cash_units;
    let requested = to_units(new_percentage);
    let mut entries = set.clone().into_entries();

    if mode == AllocationMode::Custom {
        let others: i64 = entries
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, e)| to_units(e.percentage))
            .sum();
        let value = requested.min((budget - others).max(0));
        entries[index].percentage = from_units(value);
        return Ok(Edit {
            set: AllocationSet::from_parts(entries, from_units(cash_units)),
            mode,
        });
    }

    let ahead: i64 = entries[..index]
        .iter()
        .map(|e| to_units(e.percentage))
        .sum();
    let value = requested.min((budget - ahead).max(0));
    let remaining = budget - value;

    let others: Vec<f64> = entries
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, e)| e.percentage)
        .collect();
    let others_total: f64 = others.iter().sum();

    let raw: Vec<f64> = if remaining <= 0 {
        vec![0.0; others.len()]
    } else if others_total > 0.0 {
        let factor = from_units(remaining) / others_total;
        others.iter().map(|p| p * factor).collect()
    } else {
        even(others.len(), remaining)
    };
    let settled = settle(&raw, remaining.max(0));

    entries[index].percentage = from_units(value);
    let mut rest = settled.into_iter();
    for (i, entry) in entries.iter_mut().enumerate() {
        if i == index {
            continue;
        }
        if let Some(units) = rest.next() {
            entry.percentage = from_units(units);
        }
    }

    Ok(Edit {
        set: AllocationSet::from_parts(entries, from_units(cash_units)),
        mode,
    })
}

/// Append an empty 0% row.
///
/// When this is the first row and the mode balances automatically, it
/// immediately receives the whole non-cash budget (via [`apply_weights`]).
pub fn add_entry(
    set: &AllocationSet,
    mode: AllocationMode,
    weights: Option<&WeightVector>,
) -> AllocationSet {
    let cash = set.cash_percentage();
    let mut entries = set.clone().into_entries();
    entries.push(AllocationEntry::placeholder());
    let added = AllocationSet::from_parts(entries, cash);

    if added.len() == 1 && mode.is_auto() {
        let weights = if mode.uses_weights() { weights } else { None };
        return apply_weights(&added, weights, cash);
    }
    added
}

/// Delete a row and hand its share to the survivors.
///
/// In the automatic modes the survivors are rescaled proportionally to their
/// current percentages so the total stays at 100 (evenly, if they are all at
/// zero). In `Custom` nothing else moves.
pub fn remove_entry(
    set: &AllocationSet,
    mode: AllocationMode,
    index: usize,
) -> Result<AllocationSet, AllocationError> {
    check_index(set, index)?;

    let cash = set.cash_percentage();
    let mut entries = set.clone().into_entries();
    let removed = entries.remove(index);
    debug!(
        "Removed entry {index} ('{}', {:.2}%)",
        removed.symbol, removed.percentage
    );

    if !mode.is_auto() || entries.is_empty() {
        return Ok(AllocationSet::from_parts(entries, cash));
    }

    let budget = FULL_UNITS - to_units(cash);
    let survivors: f64 = entries.iter().map(|e| e.percentage).sum();
    let raw: Vec<f64> = if survivors > 0.0 {
        let factor = from_units(budget) / survivors;
        entries.iter().map(|e| e.percentage * factor).collect()
    } else {
        even(entries.len(), budget)
    };
    write_units(&mut entries, &settle(&raw, budget));
    Ok(AllocationSet::from_parts(entries, cash))
}

/// Rename a row. Percentages are untouched.
pub fn set_symbol(
    set: &AllocationSet,
    index: usize,
    symbol: impl Into<Symbol>,
) -> Result<AllocationSet, AllocationError> {
    check_index(set, index)?;
    let symbol: Symbol = symbol.into();
    let cash = set.cash_percentage();
    let mut entries = set.clone().into_entries();
    entries[index].symbol = symbol.trim().to_string();
    Ok(AllocationSet::from_parts(entries, cash))
}

fn check_index(set: &AllocationSet, index: usize) -> Result<(), AllocationError> {
    if index >= set.len() {
        return Err(AllocationError::IndexOutOfRange {
            index,
            len: set.len(),
        });
    }
    Ok(())
}

/// `budget` hundredths split evenly, as raw percentages.
fn even(count: usize, budget: i64) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    vec![from_units(budget) / count as f64; count]
}

fn write_units(entries: &mut [AllocationEntry], units: &[i64]) {
    for (entry, &u) in entries.iter_mut().zip(units) {
        entry.percentage = from_units(u);
    }
}
