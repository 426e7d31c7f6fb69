//! # Propagation Tracing (tb-04)
//!
//! Reconstructs when each tank first heard of, and then accepted, one marked
//! transaction, and reduces those timestamps to a single propagation time:
//! latest acceptance minus earliest announcement.
//!
//! ## Strategies
//!
//! | Strategy | Source | Armed before broadcast |
//! |----------|--------|------------------------|
//! | [`LogTracer`] | live log lines of each tank | subscribes to every log stream |
//! | [`StateQueryTracer`] | the tank's pending-set record | waits on the release gate |
//!
//! Tanks are polled by one task each. The origin tank is never traced.

pub mod domain;
pub mod errors;
pub mod log_scan;
pub mod tracer;

pub use domain::{reduce, MarkedTransaction, PropagationEstimate, PropagationRecord};
pub use errors::TraceError;
pub use log_scan::{parse_timestamp, LogPatterns, LogScanner};
pub use tracer::{
    LogTracer, PropagationTracer, StateQueryTracer, TraceOutcome, TraceRound, TracerKind,
};
