#![forbid(unsafe_code)]

//! Deterministic replay harness for holdpick gesture traces.
//!
//! A trace is a JSONL file: a header describing the viewport, anchor, recent
//! items, and configuration, followed by input, tick, and composer records.
//! [`replay`] runs it through a fresh composer and returns every
//! UI-visible event plus a checksum chain that pins the whole run down.

pub mod cli;
pub mod error;
pub mod replay;
pub mod trace;

pub use cli::run_from_env;
pub use error::{HarnessError, Result};
pub use replay::{Observation, ReplayReport, replay};
pub use trace::{Trace, TraceHeader, TraceItem, TraceRecord};
