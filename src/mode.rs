//! Allocation modes and edit origins.

use std::fmt;
use std::str::FromStr;

use crate::error::AllocationError;

/// How an allocation set is balanced.
///
/// The four automatic modes keep cash plus entries at 100% after every
/// operation. `Custom` leaves each entry alone; the total is only advisory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AllocationMode {
    /// Every entry gets an equal share of the non-cash budget.
    #[default]
    EvenSplit,

    /// Entries are weighted by an external weight vector.
    Proportional,

    /// Even split with a majority of capital held as cash.
    MajorityCashEven,

    /// Proportional split with a majority of capital held as cash.
    MajorityCashProportional,

    /// Manual sliders, no automatic balancing.
    Custom,
}

impl AllocationMode {
    pub const ALL: [AllocationMode; 5] = [
        AllocationMode::EvenSplit,
        AllocationMode::Proportional,
        AllocationMode::MajorityCashEven,
        AllocationMode::MajorityCashProportional,
        AllocationMode::Custom,
    ];

    /// Returns true for the modes that rebalance automatically.
    #[inline]
    pub fn is_auto(self) -> bool {
        !matches!(self, AllocationMode::Custom)
    }

    /// Returns true if this mode needs a weight vector.
    #[inline]
    pub fn uses_weights(self) -> bool {
        matches!(
            self,
            AllocationMode::Proportional | AllocationMode::MajorityCashProportional
        )
    }

    /// Returns true for the majority-cash variants.
    #[inline]
    pub fn is_majority_cash(self) -> bool {
        matches!(
            self,
            AllocationMode::MajorityCashEven | AllocationMode::MajorityCashProportional
        )
    }

    /// Cash percentage installed when this mode is selected.
    ///
    /// `Custom` has no default and keeps whatever cash is already set.
    pub fn default_cash(self, defaults: &ModeDefaults) -> Option<f64> {
        match self {
            AllocationMode::Custom => None,
            m if m.is_majority_cash() => Some(defaults.majority_cash),
            _ => Some(defaults.standard_cash),
        }
    }

    /// Stable kebab-case name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            AllocationMode::EvenSplit => "even",
            AllocationMode::Proportional => "proportional",
            AllocationMode::MajorityCashEven => "majority-cash-even",
            AllocationMode::MajorityCashProportional => "majority-cash-proportional",
            AllocationMode::Custom => "custom",
        }
    }
}

impl fmt::Display for AllocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocationMode {
    type Err = AllocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "even" | "even-split" => Ok(AllocationMode::EvenSplit),
            "proportional" => Ok(AllocationMode::Proportional),
            "majority-cash-even" => Ok(AllocationMode::MajorityCashEven),
            "majority-cash-proportional" => Ok(AllocationMode::MajorityCashProportional),
            "custom" => Ok(AllocationMode::Custom),
            _ => Err(AllocationError::UnknownMode(s.to_string())),
        }
    }
}

/// Cash percentages installed by mode selection.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeDefaults {
    /// Cash for `EvenSplit` and `Proportional`.
    pub standard_cash: f64,
    /// Cash for the majority-cash variants.
    pub majority_cash: f64,
}

impl Default for ModeDefaults {
    fn default() -> Self {
        Self {
            standard_cash: 0.0,
            majority_cash: 60.0,
        }
    }
}

/// Where an edit came from. Dragging a slider opts out of auto-balancing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EditOrigin {
    Slider,
    #[default]
    TypedInput,
}

impl fmt::Display for EditOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOrigin::Slider => write!(f, "slider"),
            EditOrigin::TypedInput => write!(f, "typed"),
        }
    }
}
