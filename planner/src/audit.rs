//! JSONL audit trail logging.
//!
//! Each replay appends events to an audit.jsonl file, one JSON object per
//! line: the run start, every applied step with the resulting allocation,
//! the validation verdict, and the run end.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use allocbook::{AllocationMode, AllocationSet, ValidationError};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Log a simple event with no additional data.
    pub fn log_simple(&mut self, event: &'static str) -> Result<()> {
        self.log(event, serde_json::json!({}))
    }
}

fn snapshot(set: &AllocationSet) -> serde_json::Value {
    let entries: Vec<_> = set
        .entries()
        .iter()
        .map(|e| serde_json::json!({ "symbol": e.symbol, "pct": e.percentage }))
        .collect();
    serde_json::json!({
        "entries": entries,
        "cash": set.cash_percentage(),
        "total": set.total(),
    })
}

/// Convenience: log a run start event.
pub fn log_run_started(audit: &mut AuditLog, command: &str, source: &str) -> Result<()> {
    audit.log(
        "run_started",
        serde_json::json!({
            "command": command,
            "source": source,
        }),
    )
}

/// Convenience: log one applied step and the allocation it produced.
pub fn log_step(
    audit: &mut AuditLog,
    step: usize,
    op: &str,
    mode: AllocationMode,
    set: &AllocationSet,
) -> Result<()> {
    audit.log(
        "step_applied",
        serde_json::json!({
            "step": step,
            "op": op,
            "mode": mode.as_str(),
            "allocation": snapshot(set),
        }),
    )
}

/// Convenience: log the validation verdict.
pub fn log_validation(audit: &mut AuditLog, problems: &[ValidationError]) -> Result<()> {
    let details: Vec<String> = problems.iter().map(|p| p.to_string()).collect();
    audit.log(
        "validation",
        serde_json::json!({
            "valid": problems.is_empty(),
            "problems": details,
        }),
    )
}

/// Convenience: log run completion.
pub fn log_run_completed(audit: &mut AuditLog, steps: usize, valid: bool) -> Result<()> {
    audit.log(
        "run_completed",
        serde_json::json!({
            "steps": steps,
            "valid": valid,
        }),
    )
}
