//! Planner workflows: plan → display → validate → write.
//!
//! This ties the config, the weight provider, the engine session, and the
//! audit trail together for each CLI command.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use allocbook::{AllocationMode, AllocationSet, Session, StrategyAllocation, ValidationGate};
use log::info;

use crate::audit::{self, AuditLog};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::quotes;
use crate::script::{self, Script};

/// Options for `allocate plan`.
pub struct PlanOptions {
    pub symbols: Vec<String>,
    pub mode: AllocationMode,
    pub cash: Option<f64>,
    pub quotes: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub force: bool,
}

/// Normalise and check a symbol list: trimmed, upper-cased, unique, non-empty.
pub fn normalize_symbols(symbols: &[String]) -> Result<Vec<String>> {
    if symbols.is_empty() {
        return Err(Error::Input("at least one symbol is required".into()));
    }
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(symbols.len());
    for raw in symbols {
        let symbol = raw.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(Error::Input("empty symbol".into()));
        }
        if !seen.insert(symbol.clone()) {
            return Err(Error::Input(format!("duplicate symbol: {symbol}")));
        }
        out.push(symbol);
    }
    Ok(out)
}

/// Build a session for `symbols` in `mode`, weighting with `provider`.
pub fn build_session(
    config: &Config,
    symbols: &[String],
    mode: AllocationMode,
    cash: Option<f64>,
    provider: &dyn allocbook::WeightProvider,
) -> Result<Session> {
    if mode == AllocationMode::Custom {
        return Err(Error::Input(
            "custom mode cannot plan automatically; use replay".into(),
        ));
    }
    let mut session = Session::new(mode, config.mode_defaults()).with_gate(config.gate());
    for (i, symbol) in symbols.iter().enumerate() {
        session.add_entry();
        session
            .set_symbol(i, symbol.as_str())
            .map_err(|source| Error::Step { step: i + 1, source })?;
    }
    session.select_mode(mode, provider);
    if let Some(cash) = cash {
        session.set_cash(cash);
    }
    Ok(session)
}

/// Compute an allocation, show it, and optionally write the payload.
pub fn run_plan(config: &Config, opts: &PlanOptions) -> Result<Session> {
    let symbols = normalize_symbols(&opts.symbols)?;
    let provider = quotes::weight_provider(config, opts.quotes.as_deref());
    let session = build_session(config, &symbols, opts.mode, opts.cash, provider.as_ref())?;

    display_allocation(session.set(), session.mode(), session.gate());
    session.validate()?;

    if let Some(out) = &opts.out {
        write_payload(&session.to_payload(), out, opts.force)?;
        println!("\nWrote {}", out.display());
    }
    Ok(session)
}

/// Parse a saved payload and run the validation gate over it.
pub fn run_check(config: &Config, path: &Path) -> Result<AllocationSet> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::InputRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let set = StrategyAllocation::from_json(&contents)?.into_set()?;
    let gate = config.gate();

    display_allocation(&set, AllocationMode::Custom, &gate);
    gate.check(&set)?;
    Ok(set)
}

/// Replay a script, recording every step in the audit trail.
pub fn run_replay(config: &Config, path: &Path, quotes_path: Option<&Path>) -> Result<Session> {
    let script = Script::load(path)?;
    let mode = script
        .initial_mode()
        .map_err(|source| Error::Step { step: 0, source })?;
    let provider = quotes::weight_provider(config, quotes_path);

    let mut audit = AuditLog::open(&config.audit_path())?;
    audit::log_run_started(&mut audit, "replay", &path.display().to_string())?;

    let mut session = Session::new(mode, config.mode_defaults()).with_gate(config.gate());
    script::replay(&script, &mut session, provider.as_ref(), Some(&mut audit))?;
    info!("Replayed {} steps", script.steps.len());

    let problems = session.gate().problems(session.set());
    audit::log_validation(&mut audit, &problems)?;
    audit::log_run_completed(&mut audit, script.steps.len(), problems.is_empty())?;

    display_allocation(session.set(), session.mode(), session.gate());
    if let Some(problem) = problems.into_iter().next() {
        return Err(Error::Invalid(problem));
    }
    Ok(session)
}

/// Write the payload as pretty JSON, asking before overwriting unless `force`.
fn write_payload(payload: &StrategyAllocation, out: &Path, force: bool) -> Result<()> {
    if out.exists() && !force {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("{} exists. Overwrite?", out.display()))
            .default(false)
            .interact()
            .map_err(|e| Error::Aborted(format!("confirmation prompt failed: {e}")))?;
        if !confirmed {
            return Err(Error::Aborted("output file left unchanged".into()));
        }
    }
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out, payload.to_json()?)?;
    Ok(())
}

/// Print the allocation table and the running total readout.
pub fn display_allocation(set: &AllocationSet, mode: AllocationMode, gate: &ValidationGate) {
    println!("\nAllocation ({mode}):");
    println!("  {:<12} {:>8}", "Symbol", "Pct");
    for e in set.entries() {
        let symbol = if e.is_placeholder() { "-" } else { e.symbol.as_str() };
        println!("  {:<12} {:>7.2}%", symbol, e.percentage);
    }
    println!("  {:<12} {:>7.2}%", "CASH", set.cash_percentage());
    println!("  {:<12} {:>7.2}%", "TOTAL", set.total());

    let problems = gate.problems(set);
    if problems.is_empty() {
        println!("  [OK] ready to save");
    } else {
        for p in &problems {
            println!("  [!!] {p}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocbook::EqualWeights;

    fn syms(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalize() {
        assert_eq!(
            normalize_symbols(&syms(&[" aapl", "Msft"])).unwrap(),
            syms(&["AAPL", "MSFT"])
        );
        assert!(normalize_symbols(&[]).is_err());
        assert!(normalize_symbols(&syms(&["A", "a"])).is_err());
        assert!(normalize_symbols(&syms(&["A", " "])).is_err());
    }

    #[test]
    fn build_even() {
        let s = build_session(
            &Config::default(),
            &syms(&["A", "B", "C", "D"]),
            AllocationMode::EvenSplit,
            Some(20.0),
            &EqualWeights,
        )
        .unwrap();
        for e in s.set().entries() {
            assert_eq!(e.percentage, 20.0);
        }
        assert!(s.is_valid());
    }

    #[test]
    fn build_majority_cash_uses_config() {
        let config = Config::from_toml("[modes]\nmajority_cash = 75.0\n").unwrap();
        let s = build_session(
            &config,
            &syms(&["A", "B"]),
            AllocationMode::MajorityCashEven,
            None,
            &EqualWeights,
        )
        .unwrap();
        assert_eq!(s.set().cash_percentage(), 75.0);
        assert_eq!(s.set().percentage_of("A"), Some(12.5));
    }

    #[test]
    fn custom_plan_rejected() {
        assert!(build_session(
            &Config::default(),
            &syms(&["A"]),
            AllocationMode::Custom,
            None,
            &EqualWeights,
        )
        .is_err());
    }

    #[test]
    fn write_and_check_payload() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out").join("payload.json");
        let opts = PlanOptions {
            symbols: syms(&["SPY", "TLT"]),
            mode: AllocationMode::EvenSplit,
            cash: Some(10.0),
            quotes: None,
            out: Some(out.clone()),
            force: true,
        };
        run_plan(&Config::default(), &opts).unwrap();

        let set = run_check(&Config::default(), &out).unwrap();
        assert_eq!(set.percentage_of("SPY"), Some(45.0));
        assert_eq!(set.cash_percentage(), 10.0);
    }

    #[test]
    fn check_rejects_invalid_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"{"allocations":[{"symbol":"A","allocation":50}],"cash_balance_percent":10}"#,
        )
        .unwrap();
        assert!(matches!(
            run_check(&Config::default(), &path),
            Err(Error::Invalid(_))
        ));
    }
}
