//! # Topology Generator (tb-01)
//!
//! Builds the random outbound-link graph of a tank network and renders it as
//! the network document consumed by the cluster layer.
//!
//! ## Rules
//!
//! | Rule | Description |
//! |------|-------------|
//! | Fan-out | Every node opens exactly `outbound` connections |
//! | Reachability | Peers are drawn only from the first `reachable` nodes |
//! | No self loop | A node never connects to itself |
//! | No duplicates | `A→B` forbids a second `A→B` and any `B→A` |
//!
//! ## Module Structure
//!
//! ```text
//! tb-01-topology/
//! ├── domain/      # TopologyConfig, TopologyGraph, generator, invariants
//! ├── document.rs  # YAML network document
//! └── errors.rs
//! ```

pub mod document;
pub mod domain;
pub mod errors;

pub use document::{NetworkDocument, NodeEntry, DEFAULT_OUTPUT_PATH};
pub use domain::{
    check_all_invariants, generate, InvariantViolation, TopologyConfig, TopologyGraph,
    DEFAULT_OUTBOUND, MAX_ATTEMPTS,
};
pub use errors::TopologyError;
