//! allocbook-planner: command-line allocation planner built on allocbook.
//!
//! Builds allocation sets from a symbol list and a mode, weighting them from
//! a quotes file when the mode calls for it, validates saved payloads, and
//! replays scripted edit sessions with a JSONL audit trail.

pub mod audit;
pub mod config;
pub mod error;
pub mod plan;
pub mod quotes;
pub mod script;
