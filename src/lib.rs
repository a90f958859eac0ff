//! # allocbook
//!
//! A deterministic percentage-allocation engine for strategy configuration.
//!
//! An [`AllocationSet`] holds one percentage per asset plus a cash reserve.
//! The engine keeps cash plus entries at exactly 100% while assets are added,
//! removed, reweighted, or edited, under five [`AllocationMode`]s.
//!
//! ## Features
//!
//! - **Even and proportional splits**: distribute the non-cash budget equally
//!   or by an external [`WeightVector`]
//! - **Cash changes**: rescale every entry, keeping relative weights
//! - **Edits**: clamp the edited entry and rescale the others, or leave them
//!   alone in `Custom` mode
//! - **No drift**: results are settled to two decimals with largest-remainder
//!   rounding, so totals stay exact across repeated edits
//! - **Validation gate**: decide whether a set may be saved
//!
//! ## Quick Start
//!
//! ```
//! use allocbook::{AllocationMode, EditOrigin, EqualWeights, ModeDefaults, Session};
//!
//! let mut session = Session::new(AllocationMode::EvenSplit, ModeDefaults::default());
//!
//! for (i, symbol) in ["AAPL", "MSFT", "NVDA"].iter().enumerate() {
//!     session.add_entry();
//!     session.set_symbol(i, *symbol).unwrap();
//! }
//! session.select_mode(AllocationMode::EvenSplit, &EqualWeights);
//! session.set_cash(10.0);
//!
//! assert_eq!(session.set().percentage_of("AAPL"), Some(30.0));
//! assert!(session.is_valid());
//!
//! // Typing a value rebalances the other rows
//! session.edit_entry(0, 50.0, EditOrigin::TypedInput).unwrap();
//! assert_eq!(session.set().percentage_of("MSFT"), Some(20.0));
//! assert!(session.is_valid());
//!
//! // Dragging a slider switches to manual control
//! session.edit_entry(1, 10.0, EditOrigin::Slider).unwrap();
//! assert_eq!(session.mode(), AllocationMode::Custom);
//! assert!(!session.is_valid());
//! ```
//!
//! ## Pure Functions
//!
//! The [`engine`] functions take a set and return a new one, so they can be
//! called without a session:
//!
//! ```
//! use allocbook::{AllocationEntry, AllocationMode, AllocationSet, WeightVector, engine};
//!
//! let set = AllocationSet::from_entries(
//!     vec![
//!         AllocationEntry::new("A", 0.0),
//!         AllocationEntry::new("B", 0.0),
//!         AllocationEntry::new("C", 0.0),
//!     ],
//!     0.0,
//! );
//! let weights: WeightVector = [("A", 2.0), ("B", 1.0), ("C", 1.0)].into_iter().collect();
//!
//! let set = engine::apply_weights(&set, Some(&weights), 0.0);
//! assert_eq!(set.percentage_of("A"), Some(50.0));
//!
//! let set = engine::remove_entry(&set, AllocationMode::Proportional, 0).unwrap();
//! assert_eq!(set.percentage_of("B"), Some(50.0));
//! assert_eq!(set.percentage_of("C"), Some(50.0));
//! ```
//!
//! ## Modes
//!
//! | Mode | Default cash | Balancing |
//! |------|--------------|-----------|
//! | **EvenSplit** | standard (0%) | equal shares |
//! | **Proportional** | standard (0%) | by weight |
//! | **MajorityCashEven** | majority (60%) | equal shares |
//! | **MajorityCashProportional** | majority (60%) | by weight |
//! | **Custom** | unchanged | none, total is advisory |

pub mod engine;
mod error;
mod mode;
#[cfg(feature = "payload")]
pub mod payload;
mod session;
mod set;
mod types;
pub mod validate;
pub mod weights;

// Re-export public API
pub use engine::Edit;
#[cfg(feature = "payload")]
pub use error::PayloadError;
pub use error::{AllocationError, ProviderError, ValidationError};
pub use mode::{AllocationMode, EditOrigin, ModeDefaults};
#[cfg(feature = "payload")]
pub use payload::{AllocationLine, StrategyAllocation};
pub use session::Session;
pub use set::{AllocationEntry, AllocationSet};
pub use types::{DEFAULT_TOLERANCE, FULL_ALLOCATION, Symbol, clamp_percent, round2};
pub use validate::{ValidationGate, is_valid, validate};
pub use weights::{
    EqualWeights, MarketProxyWeights, ProxyMultipliers, Quote, QuoteSource, WeightProvider,
    WeightVector, weights_or_uniform,
};
