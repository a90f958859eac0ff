//! Scripted edit sessions.
//!
//! A script replays the interactions of one allocation flow:
//!
//! ```json
//! {
//!   "mode": "even",
//!   "steps": [
//!     { "op": "add", "symbol": "AAPL" },
//!     { "op": "add", "symbol": "MSFT" },
//!     { "op": "set_cash", "cash": 10 },
//!     { "op": "edit", "index": 0, "percentage": 60, "origin": "typed_input" },
//!     { "op": "select_mode", "mode": "proportional" }
//!   ]
//! }
//! ```

use std::path::Path;

use allocbook::{AllocationError, AllocationMode, EditOrigin, Session, WeightProvider};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::audit::{self, AuditLog};
use crate::error::{Error, Result};

/// A sequence of steps plus the mode the flow starts in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub mode: Option<String>,
    pub steps: Vec<Step>,
}

/// One user interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    SelectMode {
        mode: String,
    },
    SetCash {
        cash: f64,
    },
    Add {
        #[serde(default)]
        symbol: Option<String>,
    },
    Remove {
        index: usize,
    },
    SetSymbol {
        index: usize,
        symbol: String,
    },
    Edit {
        index: usize,
        percentage: f64,
        #[serde(default)]
        origin: EditOrigin,
    },
    RefreshWeights,
}

impl Script {
    /// Load a script file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::InputRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Starting mode, `EvenSplit` when unset.
    pub fn initial_mode(&self) -> std::result::Result<AllocationMode, AllocationError> {
        match &self.mode {
            Some(m) => m.parse(),
            None => Ok(AllocationMode::default()),
        }
    }
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::SelectMode { .. } => "select_mode",
            Step::SetCash { .. } => "set_cash",
            Step::Add { .. } => "add",
            Step::Remove { .. } => "remove",
            Step::SetSymbol { .. } => "set_symbol",
            Step::Edit { .. } => "edit",
            Step::RefreshWeights => "refresh_weights",
        }
    }

    /// Apply this step to the session.
    pub fn apply(
        &self,
        session: &mut Session,
        provider: &dyn WeightProvider,
    ) -> std::result::Result<(), AllocationError> {
        match self {
            Step::SelectMode { mode } => session.select_mode(mode.parse()?, provider),
            Step::SetCash { cash } => session.set_cash(*cash),
            Step::Add { symbol } => {
                session.add_entry();
                if let Some(symbol) = symbol {
                    session.set_symbol(session.set().len() - 1, symbol.as_str())?;
                }
            }
            Step::Remove { index } => session.remove_entry(*index)?,
            Step::SetSymbol { index, symbol } => session.set_symbol(*index, symbol.as_str())?,
            Step::Edit {
                index,
                percentage,
                origin,
            } => session.edit_entry(*index, *percentage, *origin)?,
            Step::RefreshWeights => session.refresh_weights(provider),
        }
        Ok(())
    }
}

/// Replay every step against `session`, recording each one to `audit`.
///
/// Stops at the first step that fails; steps are numbered from 1.
pub fn replay(
    script: &Script,
    session: &mut Session,
    provider: &dyn WeightProvider,
    mut audit: Option<&mut AuditLog>,
) -> Result<()> {
    for (i, step) in script.steps.iter().enumerate() {
        let n = i + 1;
        step.apply(session, provider)
            .map_err(|source| Error::Step { step: n, source })?;
        debug!(
            "step {n} {}: total {:.2}% ({})",
            step.name(),
            session.set().total(),
            session.mode()
        );
        if let Some(log) = audit.as_deref_mut() {
            audit::log_step(log, n, step.name(), session.mode(), session.set())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocbook::{EqualWeights, ModeDefaults};

    fn sample() -> &'static str {
        r#"{
            "mode": "even",
            "steps": [
                { "op": "add", "symbol": "AAPL" },
                { "op": "add", "symbol": "MSFT" },
                { "op": "select_mode", "mode": "even" },
                { "op": "set_cash", "cash": 10 },
                { "op": "edit", "index": 0, "percentage": 60 }
            ]
        }"#
    }

    #[test]
    fn parse_script() {
        let script = Script::from_json(sample()).unwrap();
        assert_eq!(script.steps.len(), 5);
        assert_eq!(script.initial_mode().unwrap(), AllocationMode::EvenSplit);
        assert_eq!(
            script.steps[4],
            Step::Edit {
                index: 0,
                percentage: 60.0,
                origin: EditOrigin::TypedInput
            }
        );
    }

    #[test]
    fn replay_script() {
        let script = Script::from_json(sample()).unwrap();
        let mut session = Session::new(script.initial_mode().unwrap(), ModeDefaults::default());
        replay(&script, &mut session, &EqualWeights, None).unwrap();

        assert_eq!(session.set().percentage_of("AAPL"), Some(60.0));
        assert_eq!(session.set().percentage_of("MSFT"), Some(30.0));
        assert_eq!(session.set().cash_percentage(), 10.0);
        assert!(session.is_valid());
    }

    #[test]
    fn slider_origin_parses() {
        let step: Step = serde_json::from_str(
            r#"{"op":"edit","index":1,"percentage":5,"origin":"slider"}"#,
        )
        .unwrap();
        assert_eq!(step.name(), "edit");
        assert!(matches!(
            step,
            Step::Edit {
                origin: EditOrigin::Slider,
                ..
            }
        ));
    }

    #[test]
    fn bad_step_reports_number() {
        let script = Script::from_json(
            r#"{"steps":[{"op":"add"},{"op":"remove","index":4}]}"#,
        )
        .unwrap();
        let mut session = Session::new(AllocationMode::EvenSplit, ModeDefaults::default());
        let err = replay(&script, &mut session, &EqualWeights, None).unwrap_err();
        assert!(matches!(err, Error::Step { step: 2, .. }));
    }

    #[test]
    fn unknown_mode_rejected() {
        let script = Script::from_json(r#"{"mode":"yolo","steps":[]}"#).unwrap();
        assert!(script.initial_mode().is_err());
    }
}
