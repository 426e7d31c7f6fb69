//! # Domain Layer for Sync Barriers
//!
//! Per-tank decision logic, free of timers and I/O.

mod report;
mod stall;

pub use report::*;
pub use stall::*;
