//! Integration tests for planner workflows: replay with audit trail, quotes
//! weighting, and payload checks.

use allocbook::{AllocationMode, EditOrigin};
use allocbook_planner::config::Config;
use allocbook_planner::error::Error;
use allocbook_planner::plan::{PlanOptions, run_check, run_plan, run_replay};
use allocbook_planner::script::{Script, Step};

fn config_in(dir: &std::path::Path) -> Config {
    let toml = format!(
        "[logging]\ndir = \"{}\"\naudit_file = \"audit.jsonl\"\n",
        dir.display()
    );
    Config::from_toml(&toml).unwrap()
}

fn write(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn quotes_json() -> &'static str {
    r#"{
        "AAPL": { "price": 100.0, "volume": 10.0 },
        "XYZ":  { "price": 100.0, "volume": 30.0 }
    }"#
}

// ============================================================================
// replay
// ============================================================================

#[test]
fn replay_writes_audit_trail() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let script = write(
        dir.path(),
        "script.json",
        r#"{
            "mode": "even",
            "steps": [
                { "op": "add", "symbol": "SPY" },
                { "op": "add", "symbol": "TLT" },
                { "op": "add", "symbol": "GLD" },
                { "op": "select_mode", "mode": "even" },
                { "op": "set_cash", "cash": 10 },
                { "op": "remove", "index": 2 }
            ]
        }"#,
    );

    let session = run_replay(&config, &script, None).unwrap();
    assert_eq!(session.set().percentage_of("SPY"), Some(45.0));
    assert_eq!(session.set().percentage_of("TLT"), Some(45.0));
    assert_eq!(session.set().cash_percentage(), 10.0);

    let audit = std::fs::read_to_string(config.audit_path()).unwrap();
    let events: Vec<serde_json::Value> = audit
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    // run_started + 6 steps + validation + run_completed
    assert_eq!(events.len(), 9);
    assert_eq!(events[0]["event"], "run_started");
    assert_eq!(events[6]["op"], "remove");
    assert_eq!(events[6]["step"], 6);
    assert_eq!(events[7]["valid"], true);
    assert_eq!(events[8]["event"], "run_completed");
}

#[test]
fn replay_ending_invalid_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let script = Script {
        mode: Some("even".into()),
        steps: vec![
            Step::Add {
                symbol: Some("A".into()),
            },
            Step::Add {
                symbol: Some("B".into()),
            },
            Step::Edit {
                index: 0,
                percentage: 10.0,
                origin: EditOrigin::Slider,
            },
        ],
    };
    let path = write(
        dir.path(),
        "script.json",
        &serde_json::to_string(&script).unwrap(),
    );

    let err = run_replay(&config, &path, None).unwrap_err();
    assert!(matches!(err, Error::Invalid(_)));

    let audit = std::fs::read_to_string(config.audit_path()).unwrap();
    assert!(audit.contains("\"mode\":\"custom\""));
    assert!(audit.contains("\"valid\":false"));
}

#[test]
fn replay_with_quotes_weights_proportionally() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let quotes = write(dir.path(), "quotes.json", quotes_json());
    let script = write(
        dir.path(),
        "script.json",
        r#"{
            "mode": "proportional",
            "steps": [
                { "op": "add", "symbol": "XYZ" },
                { "op": "add", "symbol": "MISSING" },
                { "op": "refresh_weights" }
            ]
        }"#,
    );

    let session = run_replay(&config, &script, Some(&quotes)).unwrap();
    assert_eq!(session.mode(), AllocationMode::Proportional);
    // MISSING has no quote → imputed at the mean (XYZ's weight)
    assert_eq!(session.set().percentage_of("XYZ"), Some(50.0));
    assert_eq!(session.set().percentage_of("MISSING"), Some(50.0));
}

// ============================================================================
// plan
// ============================================================================

#[test]
fn plan_proportional_with_large_cap_boost() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let quotes = write(dir.path(), "quotes.json", quotes_json());

    let opts = PlanOptions {
        symbols: vec!["aapl".into(), "xyz".into()],
        mode: AllocationMode::Proportional,
        cash: None,
        quotes: Some(quotes),
        out: None,
        force: true,
    };
    let session = run_plan(&config, &opts).unwrap();
    // AAPL: 100×10×3 = 3000, XYZ: 100×30×1 = 3000
    assert_eq!(session.set().percentage_of("AAPL"), Some(50.0));
    assert_eq!(session.set().percentage_of("XYZ"), Some(50.0));
}

#[test]
fn plan_duplicate_symbols_rejected() {
    let opts = PlanOptions {
        symbols: vec!["SPY".into(), "spy".into()],
        mode: AllocationMode::EvenSplit,
        cash: None,
        quotes: None,
        out: None,
        force: true,
    };
    assert!(matches!(
        run_plan(&Config::default(), &opts),
        Err(Error::Input(_))
    ));
}

#[test]
fn plan_round_trips_through_check() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("payload.json");
    let opts = PlanOptions {
        symbols: vec!["A".into(), "B".into(), "C".into()],
        mode: AllocationMode::MajorityCashEven,
        cash: None,
        quotes: None,
        out: Some(out.clone()),
        force: true,
    };
    let session = run_plan(&Config::default(), &opts).unwrap();
    let checked = run_check(&Config::default(), &out).unwrap();
    assert_eq!(&checked, session.set());
}
