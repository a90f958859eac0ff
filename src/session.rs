//! Stateful wrapper driving one allocation flow.
//!
//! [`Session`] owns the [`AllocationSet`] and the current [`AllocationMode`]
//! and routes every interaction through the pure functions in
//! [`engine`](crate::engine). Mode changes follow a small state machine:
//!
//! - selecting an automatic mode installs its default cash and recomputes
//!   every entry from scratch;
//! - a slider edit moves the session into `Custom`; nothing moves it back
//!   except an explicit mode selection.

use log::{debug, info};

use crate::engine;
use crate::error::{AllocationError, ValidationError};
use crate::mode::{AllocationMode, EditOrigin, ModeDefaults};
use crate::set::AllocationSet;
use crate::types::Symbol;
use crate::validate::ValidationGate;
use crate::weights::{WeightProvider, WeightVector, weights_or_uniform};

/// One allocation flow: a set, its mode, and the rules applied to it.
#[derive(Clone, Debug)]
pub struct Session {
    set: AllocationSet,
    mode: AllocationMode,
    defaults: ModeDefaults,
    gate: ValidationGate,
}

impl Session {
    /// Start an empty flow in `mode`, with that mode's default cash.
    pub fn new(mode: AllocationMode, defaults: ModeDefaults) -> Self {
        let cash = mode.default_cash(&defaults).unwrap_or(0.0);
        Self {
            set: AllocationSet::with_cash(cash),
            mode,
            defaults,
            gate: ValidationGate::default(),
        }
    }

    /// Resume a flow from an existing set. Nothing is recomputed.
    pub fn from_set(set: AllocationSet, mode: AllocationMode, defaults: ModeDefaults) -> Self {
        Self {
            set,
            mode,
            defaults,
            gate: ValidationGate::default(),
        }
    }

    /// Replace the validation gate (e.g. a configured tolerance).
    pub fn with_gate(mut self, gate: ValidationGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn set(&self) -> &AllocationSet {
        &self.set
    }

    pub fn mode(&self) -> AllocationMode {
        self.mode
    }

    pub fn defaults(&self) -> &ModeDefaults {
        &self.defaults
    }

    pub fn gate(&self) -> &ValidationGate {
        &self.gate
    }

    /// Consume the session, keeping the set.
    pub fn into_set(self) -> AllocationSet {
        self.set
    }

    /// Switch mode.
    ///
    /// Automatic modes install their default cash and run a full
    /// [`engine::apply_weights`], fetching weights from `provider` when the
    /// mode needs them. Selecting `Custom` keeps the current numbers.
    pub fn select_mode(&mut self, mode: AllocationMode, provider: &dyn WeightProvider) {
        info!("Mode {} -> {}", self.mode, mode);
        self.mode = mode;
        if let Some(cash) = mode.default_cash(&self.defaults) {
            self.reweight(provider, cash);
        }
    }

    /// Re-run the current automatic mode against fresh weights. No-op in
    /// `Custom`.
    pub fn refresh_weights(&mut self, provider: &dyn WeightProvider) {
        if self.mode.is_auto() {
            let cash = self.set.cash_percentage();
            self.reweight(provider, cash);
        }
    }

    fn reweight(&mut self, provider: &dyn WeightProvider, cash: f64) {
        let weights = self.fetch_weights(provider);
        self.set = engine::apply_weights(&self.set, weights.as_ref(), cash);
    }

    fn fetch_weights(&self, provider: &dyn WeightProvider) -> Option<WeightVector> {
        if !self.mode.uses_weights() {
            return None;
        }
        let symbols = self.set.symbols();
        let weights = weights_or_uniform(provider, &symbols);
        debug!("Fetched {} weights for {} symbols", weights.len(), symbols.len());
        Some(weights)
    }

    pub fn set_cash(&mut self, cash: f64) {
        self.set = engine::set_cash(&self.set, cash);
    }

    /// Edit one entry. A slider edit switches the session to `Custom`.
    pub fn edit_entry(
        &mut self,
        index: usize,
        percentage: f64,
        origin: EditOrigin,
    ) -> Result<(), AllocationError> {
        let edit = engine::edit_entry(&self.set, self.mode, index, percentage, origin)?;
        if edit.mode != self.mode {
            info!("Mode {} -> {} (slider)", self.mode, edit.mode);
        }
        self.set = edit.set;
        self.mode = edit.mode;
        Ok(())
    }

    /// Append an empty row; the first row in an automatic mode gets the
    /// whole non-cash budget.
    pub fn add_entry(&mut self) {
        self.set = engine::add_entry(&self.set, self.mode, None);
    }

    pub fn remove_entry(&mut self, index: usize) -> Result<(), AllocationError> {
        self.set = engine::remove_entry(&self.set, self.mode, index)?;
        Ok(())
    }

    pub fn set_symbol(
        &mut self,
        index: usize,
        symbol: impl Into<Symbol>,
    ) -> Result<(), AllocationError> {
        self.set = engine::set_symbol(&self.set, index, symbol)?;
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.gate.is_valid(&self.set)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.gate.check(&self.set)
    }

    /// Serialize the set for the external save API.
    #[cfg(feature = "payload")]
    pub fn to_payload(&self) -> crate::payload::StrategyAllocation {
        self.set.to_payload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::weights::EqualWeights;

    struct Fixed(Vec<(&'static str, f64)>);

    impl WeightProvider for Fixed {
        fn weights(&self, _symbols: &[Symbol]) -> Result<WeightVector, ProviderError> {
            Ok(self.0.iter().copied().collect())
        }
    }

    struct Broken;

    impl WeightProvider for Broken {
        fn weights(&self, _symbols: &[Symbol]) -> Result<WeightVector, ProviderError> {
            Err(ProviderError::Unavailable("timeout".into()))
        }
    }

    fn with_symbols(mode: AllocationMode, symbols: &[&str]) -> Session {
        let mut session = Session::new(mode, ModeDefaults::default());
        for (i, s) in symbols.iter().enumerate() {
            session.add_entry();
            session.set_symbol(i, *s).unwrap();
        }
        session
    }

    #[test]
    fn new_session_uses_mode_cash() {
        let s = Session::new(AllocationMode::MajorityCashEven, ModeDefaults::default());
        assert_eq!(s.set().cash_percentage(), 60.0);
        assert!(s.set().is_empty());
    }

    #[test]
    fn select_proportional_applies_weights() {
        let mut s = with_symbols(AllocationMode::EvenSplit, &["A", "B", "C"]);
        s.select_mode(
            AllocationMode::Proportional,
            &Fixed(vec![("A", 2.0), ("B", 1.0), ("C", 1.0)]),
        );
        assert_eq!(s.set().percentage_of("A"), Some(50.0));
        assert_eq!(s.set().percentage_of("B"), Some(25.0));
        assert!(s.is_valid());
    }

    #[test]
    fn select_majority_cash_even() {
        let mut s = with_symbols(AllocationMode::EvenSplit, &["A", "B"]);
        s.select_mode(AllocationMode::MajorityCashEven, &EqualWeights);
        assert_eq!(s.set().cash_percentage(), 60.0);
        assert_eq!(s.set().percentage_of("A"), Some(20.0));
        assert_eq!(s.set().percentage_of("B"), Some(20.0));
    }

    #[test]
    fn provider_failure_falls_back_to_uniform() {
        let mut s = with_symbols(AllocationMode::EvenSplit, &["A", "B"]);
        s.select_mode(AllocationMode::Proportional, &Broken);
        assert_eq!(s.set().percentage_of("A"), Some(50.0));
        assert_eq!(s.set().percentage_of("B"), Some(50.0));
    }

    #[test]
    fn slider_then_add_does_not_redistribute() {
        let mut s = with_symbols(AllocationMode::EvenSplit, &["A"]);
        assert_eq!(s.set().percentage_of("A"), Some(100.0));

        s.edit_entry(0, 70.0, EditOrigin::Slider).unwrap();
        assert_eq!(s.mode(), AllocationMode::Custom);

        s.add_entry();
        assert_eq!(s.set().percentage_of("A"), Some(70.0));
        assert_eq!(s.set().entries()[1].percentage, 0.0);
        assert!(!s.is_valid());

        s.edit_entry(1, 30.0, EditOrigin::TypedInput).unwrap();
        s.set_symbol(1, "B").unwrap();
        assert!(s.is_valid());
    }

    #[test]
    fn explicit_custom_keeps_numbers() {
        let mut s = with_symbols(AllocationMode::EvenSplit, &["A"]);
        s.set_cash(20.0);
        s.select_mode(AllocationMode::Custom, &EqualWeights);
        assert_eq!(s.mode(), AllocationMode::Custom);
        assert_eq!(s.set().percentage_of("A"), Some(80.0));
    }

    #[test]
    fn refresh_is_noop_in_custom() {
        let mut s = with_symbols(AllocationMode::Custom, &["A", "B"]);
        s.refresh_weights(&Fixed(vec![("A", 1.0), ("B", 9.0)]));
        assert_eq!(s.set().entries_total(), 0.0);
    }

    #[test]
    fn out_of_range_propagates() {
        let mut s = with_symbols(AllocationMode::EvenSplit, &["A"]);
        assert!(s.remove_entry(5).is_err());
        assert!(s.edit_entry(5, 1.0, EditOrigin::TypedInput).is_err());
        assert_eq!(s.set().len(), 1);
    }

    #[test]
    fn validate_reports_gap() {
        let mut s = with_symbols(AllocationMode::Custom, &["A"]);
        s.edit_entry(0, 40.0, EditOrigin::TypedInput).unwrap();
        assert!(matches!(
            s.validate(),
            Err(ValidationError::TotalMismatch { .. })
        ));
    }
}
