//! # Domain Layer for Topology Generation
//!
//! Pure logic, no I/O. Randomness is injected by the caller so that a seeded
//! RNG reproduces a graph exactly.

mod config;
mod generator;
mod graph;
mod invariants;

pub use config::*;
pub use generator::*;
pub use graph::*;
pub use invariants::*;
