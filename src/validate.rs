//! Validation gate: decides whether an allocation may be saved.

use crate::error::ValidationError;
use crate::set::AllocationSet;
use crate::types::{DEFAULT_TOLERANCE, FULL_ALLOCATION};

/// Checks the sum-to-100 invariant and that every funded row has a symbol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidationGate {
    tolerance: f64,
}

impl Default for ValidationGate {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl ValidationGate {
    /// Gate with a custom tolerance. Non-finite or non-positive values fall
    /// back to the default.
    pub fn new(tolerance: f64) -> Self {
        if tolerance.is_finite() && tolerance > 0.0 {
            Self { tolerance }
        } else {
            Self::default()
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Every reason the set cannot be saved, in row order, total last.
    pub fn problems(&self, set: &AllocationSet) -> Vec<ValidationError> {
        let mut problems: Vec<ValidationError> = set
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.percentage > 0.0 && e.is_placeholder())
            .map(|(index, e)| ValidationError::MissingSymbol {
                index,
                percentage: e.percentage,
            })
            .collect();

        let total = set.total();
        if (FULL_ALLOCATION - total).abs() >= self.tolerance {
            problems.push(ValidationError::TotalMismatch {
                total,
                tolerance: self.tolerance,
            });
        }
        problems
    }

    /// `Ok` when the set may be saved, otherwise the first problem found.
    pub fn check(&self, set: &AllocationSet) -> Result<(), ValidationError> {
        match self.problems(set).into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }

    pub fn is_valid(&self, set: &AllocationSet) -> bool {
        self.problems(set).is_empty()
    }
}

/// [`ValidationGate::is_valid`] with the default 0.1 tolerance.
pub fn is_valid(set: &AllocationSet) -> bool {
    ValidationGate::default().is_valid(set)
}

/// [`ValidationGate::check`] with the default 0.1 tolerance.
pub fn validate(set: &AllocationSet) -> Result<(), ValidationError> {
    ValidationGate::default().check(set)
}
